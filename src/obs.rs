//! Optional observability helpers for the strategy's stages.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `okta_strategy.stage` with a `stage` field,
//!   plus the per-step debug events switched on by `ProviderConfig::debug_logging`.
//! - Enable `metrics` to increment the `okta_strategy_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.
//!
//! Secrets (passwords, session tokens, access tokens) are never recorded.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stages of an `authenticate` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthStage {
	/// Username/password exchange against the Authentication API.
	CredentialExchange,
	/// Redirect to the authorization endpoint.
	Authorization,
	/// Callback handling and authorization-code exchange.
	Callback,
	/// Profile lookup at the userinfo endpoint.
	UserInfo,
}
impl AuthStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthStage::CredentialExchange => "credential_exchange",
			AuthStage::Authorization => "authorization",
			AuthStage::Callback => "callback",
			AuthStage::UserInfo => "userinfo",
		}
	}
}
impl Display for AuthStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a stage span and records attempt plus success or failure.
pub(crate) async fn observe<T, Fut>(stage: AuthStage, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = StageSpan::new(stage);

	record_stage_outcome(stage, StageOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_stage_outcome(stage, StageOutcome::Success),
		Err(_) => record_stage_outcome(stage, StageOutcome::Failure),
	}

	result
}
