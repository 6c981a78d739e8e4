// self
use crate::{_prelude::*, obs::AuthStage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// Span wrapper used around each strategy stage.
#[derive(Clone, Debug)]
pub struct StageSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StageSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: AuthStage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("okta_strategy.stage", stage = stage.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event for `stage` when debug logging is switched on.
///
/// Messages must never contain credentials or tokens.
pub fn debug_event(enabled: bool, stage: AuthStage, message: &str) {
	if !enabled {
		return;
	}

	#[cfg(feature = "tracing")]
	tracing::debug!(stage = stage.as_str(), "{message}");
	#[cfg(not(feature = "tracing"))]
	let _ = (stage, message);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn debug_event_is_silent_when_disabled() {
		debug_event(false, AuthStage::CredentialExchange, "exchanging credentials");
		debug_event(true, AuthStage::CredentialExchange, "exchanging credentials");
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = StageSpan::new(AuthStage::Authorization);
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
