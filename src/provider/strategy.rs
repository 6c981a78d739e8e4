//! OAuth2 capability hooks that specialize the generic authorization-code flow.
//!
//! A provider plugs into [`crate::flows::AuthorizationCodeFlow`] by implementing
//! [`OAuth2Hooks`]: it names itself, contributes extra authorization parameters, resolves the
//! user profile for an access token, and optionally reclassifies token endpoint failures.
//! Every per-request input arrives through [`AuthorizationContext`], so implementations hold
//! no mutable state and can serve concurrent requests.

// crates.io
use url::form_urlencoded::Serializer;
// self
use crate::{_prelude::*, auth::Secret};

/// Boxed future returned by [`OAuth2Hooks::user_profile`].
pub type ProfileFuture<'a, P> = Pin<Box<dyn Future<Output = Result<P>> + 'a + Send>>;

/// Capability interface consumed by the authorization-code flow.
///
/// Only [`classify_token_error`](OAuth2Hooks::classify_token_error) has a default; it applies
/// the RFC 6749 heuristics in [`classify_token_error_default`].
pub trait OAuth2Hooks: Send + Sync {
	/// Profile type produced for a successful login.
	type Profile: Send;

	/// Strategy name recorded in the session after a successful login.
	fn name(&self) -> &str;

	/// Extra query parameters appended to the authorization redirect.
	fn authorization_params(&self, ctx: &AuthorizationContext) -> AuthorizationParams;

	/// Resolves the profile that belongs to `access_token`.
	fn user_profile<'a>(&'a self, access_token: &'a Secret) -> ProfileFuture<'a, Self::Profile>;

	/// Maps a token endpoint failure into a canonical category.
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		classify_token_error_default(ctx)
	}
}

/// Per-request inputs for [`OAuth2Hooks::authorization_params`].
///
/// Values live for exactly one `authenticate` call and are never shared between requests.
#[derive(Clone, Debug, Default)]
pub struct AuthorizationContext {
	/// Okta session token obtained from the Authentication API, if any.
	pub session_token: Option<Secret>,
}
impl AuthorizationContext {
	/// Context carrying a freshly exchanged session token.
	pub fn with_session_token(session_token: Secret) -> Self {
		Self { session_token: Some(session_token) }
	}
}

/// Ordered key/value pairs appended to the authorization URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationParams(Vec<(String, String)>);
impl AuthorizationParams {
	/// Appends a parameter, keeping insertion order.
	pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.0.push((key.into(), value.into()));
	}

	/// Returns the first value stored for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Iterates over parameters in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Returns true when no parameters are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Form-encodes the parameters (`scope=openid&sessionToken=...`).
	pub fn to_query_string(&self) -> String {
		let mut serializer = Serializer::new(String::new());

		serializer.extend_pairs(self.iter());

		serializer.finish()
	}
}
impl<K, V> FromIterator<(K, V)> for AuthorizationParams
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

/// Canonical token endpoint error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// The authorization code was rejected (bad, expired, or reused).
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Requested scopes exceed what the client may obtain.
	InsufficientScope,
	/// Failure is temporary and may succeed on a new attempt.
	Transient,
}

/// Context passed to hooks when classifying token errors.
///
/// The struct keeps only primitive data so hooks stay decoupled from the HTTP client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
	/// Preview of the response body for non-JSON payloads.
	pub body_preview: Option<String>,
}
impl ProviderErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Adds a body preview, truncated to a bounded number of characters.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}
}

/// Heuristic classification used when a hook does not override it.
///
/// Structured OAuth fields win, then body text hints, then the HTTP status code.
pub fn classify_token_error_default(ctx: &ProviderErrorContext) -> ProviderErrorKind {
	if let Some(kind) =
		classify_oauth_error(ctx.oauth_error.as_deref(), ctx.error_description.as_deref())
	{
		return kind;
	}
	if let Some(kind) = classify_body(ctx.body_preview.as_deref()) {
		return kind;
	}

	classify_status(ctx.http_status)
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ProviderErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = body.chars().take(ProviderErrorContext::BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

fn classify_oauth_error(
	oauth_error: Option<&str>,
	error_description: Option<&str>,
) -> Option<ProviderErrorKind> {
	oauth_error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_exact_value))
		.or_else(|| classify_body(error_description))
}

fn match_exact_value(value: &str) -> Option<ProviderErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("access_denied") {
		Some(ProviderErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(ProviderErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("invalid_scope")
		|| value.eq_ignore_ascii_case("insufficient_scope")
	{
		Some(ProviderErrorKind::InsufficientScope)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(ProviderErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<ProviderErrorKind> {
	let lowered = body?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") => Some(ProviderErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(ProviderErrorKind::InvalidClient),
		text if text.contains("insufficient_scope") || text.contains("invalid_scope") =>
			Some(ProviderErrorKind::InsufficientScope),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(ProviderErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(400 | 404 | 410) => ProviderErrorKind::InvalidGrant,
		Some(401) => ProviderErrorKind::InvalidClient,
		Some(403) => ProviderErrorKind::InsufficientScope,
		_ => ProviderErrorKind::Transient,
	}
}
