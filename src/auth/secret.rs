//! Redacting wrapper for session tokens, access tokens, and client secrets.

// self
use crate::_prelude::*;

/// Secret string that never prints its value.
///
/// Okta session tokens, OAuth tokens, and the client secret all travel through this type so
/// that `Debug` output and tracing fields stay free of credentials. Serialization is kept
/// so token sets can be stored in a session by the verify callback.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns true when the wrapped value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for Secret {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = Secret::new("00Hk-session-token");

		assert_eq!(format!("{secret:?}"), "Secret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.expose(), "00Hk-session-token");
	}

	#[test]
	fn serializes_as_plain_string() {
		let secret = Secret::from("abc123");

		assert_eq!(serde_json::to_string(&secret).expect("Secret should serialize."), "\"abc123\"");
		assert!(!secret.is_empty());
	}
}
