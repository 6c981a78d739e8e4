//! Token set returned by the authorization-code exchange.

// self
use crate::{
	_prelude::*,
	auth::{ScopeList, Secret},
};

/// Tokens issued by Okta's token endpoint, handed to the verify callback.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenSet {
	/// Access token used for the userinfo lookup.
	pub access_token: Secret,
	/// Refresh token, when `offline_access` was granted.
	pub refresh_token: Option<Secret>,
	/// Token type reported by Okta (normally `Bearer`).
	pub token_type: String,
	/// Scopes echoed back by the token endpoint, if any.
	pub scope: Option<ScopeList>,
	/// Instant at which the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from `expires_in`, when Okta supplied one.
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenSet {
	/// Returns `true` if the access token expired at the provided instant.
	///
	/// Tokens without an expiry never report as expired.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Remaining lifetime relative to `instant`, clamped at zero.
	pub fn expires_in_at(&self, instant: OffsetDateTime) -> Option<Duration> {
		self.expires_at.map(|expires_at| (expires_at - instant).max(Duration::ZERO))
	}
}
impl Debug for TokenSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSet")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
