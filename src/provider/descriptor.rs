//! Okta provider configuration and the endpoint set derived from it.
//!
//! Two deployment shapes are supported as explicit configuration variants: an issuer-rooted
//! custom authorization server (`{issuer}/v1/...`) and an org-domain-rooted default
//! authorization server (`{domain}/oauth2/default/v1/...`).

/// Builder API and serde support for provider configuration.
pub mod builder;

pub use builder::*;

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::{ScopeList, Secret},
	error::ConfigError,
};

/// Timeout applied to every outbound Okta call unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);

const AUTHN_PATH: &str = "/api/v1/authn";
const DEFAULT_AUTHORIZATION_SERVER_PATH: &str = "/oauth2/default";

/// Client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	#[default]
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Root from which every Okta endpoint is derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TenantRoot {
	/// Custom authorization server identified by its issuer URL.
	Issuer {
		/// Issuer URL, e.g. `https://acme.okta.com/oauth2/aus1234`.
		issuer: Url,
		/// Org domain hosting the Authentication API; defaults to the issuer's origin.
		okta_domain: Option<Url>,
	},
	/// Org domain using the `default` authorization server.
	OktaDomain(Url),
}
impl TenantRoot {
	/// Base URL that the `/v1/{authorize,token,userinfo}` paths hang off.
	pub fn oauth_root(&self) -> String {
		match self {
			Self::Issuer { issuer, .. } => trimmed(issuer).to_owned(),
			Self::OktaDomain(domain) =>
				format!("{}{DEFAULT_AUTHORIZATION_SERVER_PATH}", trimmed(domain)),
		}
	}

	/// Base URL of the org hosting the Authentication API.
	pub fn authn_root(&self) -> String {
		match self {
			Self::Issuer { okta_domain: Some(domain), .. } => trimmed(domain).to_owned(),
			Self::Issuer { issuer, okta_domain: None } => issuer.origin().ascii_serialization(),
			Self::OktaDomain(domain) => trimmed(domain).to_owned(),
		}
	}
}

/// Endpoint set derived once from a [`TenantRoot`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OktaEndpoints {
	/// Authorization endpoint used for the browser redirect.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// OIDC userinfo endpoint.
	pub userinfo: Url,
	/// Authentication API endpoint, present only in custom login form mode.
	pub authentication: Option<Url>,
}
impl OktaEndpoints {
	/// Derives all endpoints for the tenant root.
	pub fn derive(tenant: &TenantRoot, custom_login_form: bool) -> Result<Self, ConfigError> {
		let oauth_root = tenant.oauth_root();
		let authentication = if custom_login_form {
			Some(endpoint(&tenant.authn_root(), AUTHN_PATH)?)
		} else {
			None
		};

		Ok(Self {
			authorization: endpoint(&oauth_root, "/v1/authorize")?,
			token: endpoint(&oauth_root, "/v1/token")?,
			userinfo: endpoint(&oauth_root, "/v1/userinfo")?,
			authentication,
		})
	}
}

/// Immutable Okta provider configuration consumed by the strategy.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "RawProviderConfig")]
pub struct ProviderConfig {
	/// Tenant root every endpoint derives from.
	pub tenant: TenantRoot,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: Secret,
	/// Callback URL: absolute, a path (`/auth/okta/callback`), or a bare host.
	pub callback_url: String,
	/// Scopes requested on the authorization redirect.
	pub scope: ScopeList,
	/// Collect credentials with an application-rendered form instead of Okta's hosted page.
	pub custom_login_form: bool,
	/// Emit debug events for each step of the flow.
	pub debug_logging: bool,
	/// Upper bound for every outbound Okta call.
	pub request_timeout: StdDuration,
	/// Client authentication used at the token endpoint.
	pub client_auth_method: ClientAuthMethod,
	/// Endpoints derived from [`Self::tenant`].
	pub endpoints: OktaEndpoints,
}
impl ProviderConfig {
	/// Creates an empty builder.
	pub fn builder() -> ProviderConfigBuilder {
		ProviderConfigBuilder::default()
	}
}

fn trimmed(url: &Url) -> &str {
	url.as_str().trim_end_matches('/')
}

fn endpoint(root: &str, path: &str) -> Result<Url, ConfigError> {
	Url::parse(&format!("{root}{path}")).map_err(|source| ConfigError::InvalidEndpoint { source })
}
