//! Strategy-level error types shared across the flow, the Okta endpoints, and session stores.

// self
use crate::_prelude::*;

/// Strategy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical strategy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session store failure.
	#[error("{0}")]
	Session(
		#[from]
		#[source]
		crate::session::SessionError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Inbound request failed validation; surfaced to the caller as HTTP 400.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Remote response did not match the expected JSON shape.
	#[error(transparent)]
	Malformed(#[from] MalformedResponseError),
	/// Temporary upstream failure.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS, timeouts outside the token endpoint).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A URL could not be constructed.
	#[error("URL could not be parsed.")]
	UrlParse(#[from] url::ParseError),

	/// Okta answered an Authentication API or userinfo call with a non-success status.
	#[error("Okta {endpoint} endpoint responded with HTTP {status}: {body}")]
	RemoteAuth {
		/// Endpoint label (`authn`, `userinfo`).
		endpoint: &'static str,
		/// HTTP status code returned by Okta.
		status: u16,
		/// Response body, verbatim.
		body: String,
	},
	/// Provider rejected the grant (e.g., bad or reused authorization code).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider- or strategy-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider- or strategy-supplied reason string.
		reason: String,
	},
	/// Token endpoint rejected the requested scopes.
	#[error("Requested scopes are not permitted: {reason}.")]
	InsufficientScope {
		/// Provider- or strategy-supplied reason string.
		reason: String,
	},
	/// The authorization server redirected back with an `error` parameter.
	#[error("Authorization was denied: {error}.")]
	AuthorizationDenied {
		/// OAuth `error` code from the callback query.
		error: String,
		/// Optional `error_description` from the callback query.
		description: Option<String>,
	},
	/// The callback request is missing data required to finish the flow.
	#[error("Invalid authorization callback: {reason}.")]
	InvalidCallback {
		/// What was missing.
		reason: &'static str,
	},
	/// The `state` returned on the callback does not match the pending authorization.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// The caller-supplied verify callback failed.
	#[error("Verify callback failed.")]
	Verify {
		/// Underlying application error.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps an application error raised inside a verify callback.
	pub fn verify(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Verify { source: Box::new(src) }
	}

	/// Returns the structured HTTP response for errors the strategy answers directly.
	///
	/// Only validation failures map to a response; everything else is left to the host
	/// framework's generic error handling.
	pub fn to_response(&self) -> Option<ErrorResponse> {
		match self {
			Self::Validation(e) => Some(e.to_response()),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised while building the strategy.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Request body could not be encoded.
	#[error("Request body could not be encoded.")]
	RequestEncode {
		/// Underlying serializer failure.
		#[source]
		source: serde_json::Error,
	},
	/// Neither an issuer nor an Okta domain was configured.
	#[error("Either an issuer or an Okta domain must be configured.")]
	MissingTenantRoot,
	/// A required configuration field is missing or blank.
	#[error("Configuration field `{field}` is required.")]
	MissingField {
		/// Field name.
		field: &'static str,
	},
	/// A tenant root URL could not be parsed.
	#[error("The {field} value `{value}` is not a valid URL.")]
	InvalidTenantRoot {
		/// Field name (`issuer`, `okta_domain`).
		field: &'static str,
		/// Raw configured value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A tenant root uses a scheme other than http(s).
	#[error("The {field} URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Field name (`issuer`, `okta_domain`).
		field: &'static str,
		/// Offending URL.
		url: String,
	},
	/// A derived endpoint URL is not usable by the OAuth client.
	#[error("Derived endpoint is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The Authentication API is only reachable in custom login form mode.
	#[error("The Okta Authentication API is disabled; enable the custom login form first.")]
	AuthenticationApiDisabled,
	/// Requested scopes cannot be normalized.
	#[error("Configured scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// A session or cookie identifier is invalid.
	#[error("Identifier is invalid.")]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Inbound request validation failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// The login form submission lacks an email or a password.
	#[error("Bad request, missing email and password.")]
	MissingCredentials,
	/// The login form body could not be decoded.
	#[error("Bad request, malformed form body: {reason}.")]
	MalformedForm {
		/// Decoder failure.
		reason: String,
	},
}
impl ValidationError {
	/// HTTP status code reported for validation failures.
	pub const STATUS: u16 = 400;

	/// Renders the JSON error response handed back to the browser.
	pub fn to_response(&self) -> ErrorResponse {
		let body = serde_json::json!({ "message": self.to_string() }).to_string();

		ErrorResponse { status: Self::STATUS, content_type: ErrorResponse::JSON_CONTENT_TYPE, body }
	}
}

/// Framework-agnostic HTTP error response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header value.
	pub content_type: &'static str,
	/// Serialized body.
	pub body: String,
}
impl ErrorResponse {
	/// Content type used for JSON error bodies.
	pub const JSON_CONTENT_TYPE: &'static str = "application/json; charset=utf-8";
}

/// Remote JSON payloads that do not match the expected schema.
#[derive(Debug, ThisError)]
pub enum MalformedResponseError {
	/// Body could not be parsed into the expected structure.
	#[error("Okta {endpoint} endpoint returned malformed JSON.")]
	Json {
		/// Endpoint label.
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A required field is absent or empty.
	#[error("Okta {endpoint} response is missing `{field}`{}.", .detail.as_ref().map(|d| format!(" ({d})")).unwrap_or_default())]
	MissingField {
		/// Endpoint label.
		endpoint: &'static str,
		/// Missing field name.
		field: &'static str,
		/// Extra context (e.g. the Okta transaction status).
		detail: Option<String>,
	},
}

/// Temporary failure variants.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected but non-fatal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Provider- or strategy-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// An outbound call exceeded the configured timeout.
	#[error("Request to the Okta {endpoint} endpoint timed out.")]
	Timeout {
		/// Endpoint label.
		endpoint: &'static str,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the Okta {endpoint} endpoint.")]
	Network {
		/// Endpoint label.
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling Okta.")]
	Io(#[from] std::io::Error),
	/// Transport reported a failure without further detail.
	#[error("HTTP client error occurred while calling the Okta {endpoint} endpoint: {message}")]
	Other {
		/// Endpoint label.
		endpoint: &'static str,
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}
