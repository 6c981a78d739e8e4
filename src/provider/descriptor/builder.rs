// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::{ScopeList, Secret},
	error::ConfigError,
	provider::{ClientAuthMethod, DEFAULT_REQUEST_TIMEOUT, OktaEndpoints, ProviderConfig, TenantRoot},
};

/// Builder for [`ProviderConfig`] values.
#[derive(Debug, Default)]
pub struct ProviderConfigBuilder {
	/// Issuer URL of a custom authorization server.
	pub issuer: Option<String>,
	/// Okta org domain.
	pub okta_domain: Option<String>,
	/// OAuth 2.0 client identifier.
	pub client_id: Option<String>,
	/// OAuth 2.0 client secret.
	pub client_secret: Option<Secret>,
	/// Callback URL, absolute or relative.
	pub callback_url: Option<String>,
	/// Space-delimited scope override.
	pub scope: Option<String>,
	/// Enables the custom login form.
	pub custom_login_form: bool,
	/// Enables debug events.
	pub debug_logging: bool,
	/// Outbound request timeout override.
	pub request_timeout: Option<StdDuration>,
	/// Token endpoint client authentication.
	pub client_auth_method: ClientAuthMethod,
}
impl ProviderConfigBuilder {
	/// Sets the issuer of a custom authorization server.
	pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
		self.issuer = Some(issuer.into());

		self
	}

	/// Sets the Okta org domain.
	pub fn okta_domain(mut self, domain: impl Into<String>) -> Self {
		self.okta_domain = Some(domain.into());

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, client_secret: impl Into<Secret>) -> Self {
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Sets the callback URL.
	pub fn callback_url(mut self, callback_url: impl Into<String>) -> Self {
		self.callback_url = Some(callback_url.into());

		self
	}

	/// Overrides the requested scopes (space-delimited).
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Toggles the custom login form mode.
	pub fn custom_login_form(mut self, enabled: bool) -> Self {
		self.custom_login_form = enabled;

		self
	}

	/// Toggles debug events.
	pub fn debug_logging(mut self, enabled: bool) -> Self {
		self.debug_logging = enabled;

		self
	}

	/// Overrides the outbound request timeout.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Overrides the token endpoint client authentication.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Consumes the builder, validates inputs, and derives the endpoint set.
	pub fn build(self) -> Result<ProviderConfig, ConfigError> {
		let issuer = non_blank(self.issuer);
		let okta_domain = non_blank(self.okta_domain);
		let tenant = match (issuer, okta_domain) {
			(Some(issuer), domain) => TenantRoot::Issuer {
				issuer: parse_root("issuer", &issuer)?,
				okta_domain: domain.map(|value| parse_root("okta_domain", &value)).transpose()?,
			},
			(None, Some(domain)) => TenantRoot::OktaDomain(parse_root("okta_domain", &domain)?),
			(None, None) => return Err(ConfigError::MissingTenantRoot),
		};
		let client_id =
			non_blank(self.client_id).ok_or(ConfigError::MissingField { field: "client_id" })?;
		let client_secret = self
			.client_secret
			.filter(|secret| !secret.is_empty())
			.ok_or(ConfigError::MissingField { field: "client_secret" })?;
		let callback_url = non_blank(self.callback_url)
			.ok_or(ConfigError::MissingField { field: "callback_url" })?;
		let scope = match non_blank(self.scope) {
			Some(raw) => raw.parse::<ScopeList>()?,
			None => ScopeList::default(),
		};
		let endpoints = OktaEndpoints::derive(&tenant, self.custom_login_form)?;

		Ok(ProviderConfig {
			tenant,
			client_id,
			client_secret,
			callback_url,
			scope,
			custom_login_form: self.custom_login_form,
			debug_logging: self.debug_logging,
			request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
			client_auth_method: self.client_auth_method,
			endpoints,
		})
	}
}

/// Wire shape accepted when deserializing a [`ProviderConfig`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawProviderConfig {
	issuer: Option<String>,
	okta_domain: Option<String>,
	#[serde(alias = "clientID")]
	client_id: String,
	client_secret: Secret,
	#[serde(alias = "callbackURL")]
	callback_url: String,
	scope: Option<String>,
	#[serde(default)]
	with_custom_login_form: bool,
	#[serde(default)]
	debug: bool,
	request_timeout_secs: Option<u64>,
	#[serde(default)]
	client_auth_method: ClientAuthMethod,
}
impl TryFrom<RawProviderConfig> for ProviderConfig {
	type Error = ConfigError;

	fn try_from(raw: RawProviderConfig) -> Result<Self, Self::Error> {
		let mut builder = ProviderConfig::builder()
			.client_id(raw.client_id)
			.client_secret(raw.client_secret)
			.callback_url(raw.callback_url)
			.custom_login_form(raw.with_custom_login_form)
			.debug_logging(raw.debug)
			.client_auth_method(raw.client_auth_method);

		builder.issuer = raw.issuer;
		builder.okta_domain = raw.okta_domain;
		builder.scope = raw.scope;
		builder.request_timeout = raw.request_timeout_secs.map(StdDuration::from_secs);

		builder.build()
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_root(field: &'static str, value: &str) -> Result<Url, ConfigError> {
	let candidate =
		if value.contains("://") { value.to_owned() } else { format!("https://{value}") };
	let url = Url::parse(&candidate).map_err(|source| ConfigError::InvalidTenantRoot {
		field,
		value: value.to_owned(),
		source,
	})?;

	if !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::UnsupportedScheme { field, url: url.to_string() });
	}

	Ok(url)
}
