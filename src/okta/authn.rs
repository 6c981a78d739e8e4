//! Okta Authentication API exchange used by the custom login form.

// crates.io
use oauth2::http::{
	Method, Request,
	header::{ACCEPT, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::{ConfigError, MalformedResponseError},
	http::TokenHttpClient,
	oauth::{self, TransportErrorMapper},
	obs::{self, AuthStage},
	okta::{OktaStrategy, parse_json},
};

/// Endpoint label used for Authentication API errors.
pub const AUTHN_ENDPOINT: &str = "authn";

#[derive(Serialize)]
struct AuthnRequest<'a> {
	username: &'a str,
	password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthnResponse {
	session_token: Option<String>,
	status: Option<String>,
}

impl<U, C, M> OktaStrategy<U, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges an email/password pair for a one-time Okta session token.
	///
	/// Fails with [`ConfigError::AuthenticationApiDisabled`] unless the custom login form is
	/// enabled. Non-success responses surface as [`Error::RemoteAuth`] with the body verbatim;
	/// transactions that stop short of `SUCCESS` (for example `MFA_REQUIRED`) carry no session
	/// token and are reported as [`MalformedResponseError::MissingField`].
	pub async fn exchange_credentials(&self, username: &str, password: &str) -> Result<Secret> {
		let endpoint = self
			.config
			.endpoints
			.authentication
			.as_ref()
			.ok_or(ConfigError::AuthenticationApiDisabled)?;

		obs::debug_event(
			self.config.debug_logging,
			AuthStage::CredentialExchange,
			"posting credentials to the Authentication API",
		);

		let body = serde_json::to_vec(&AuthnRequest { username, password })
			.map_err(|source| ConfigError::RequestEncode { source })?;
		let request = Request::builder()
			.method(Method::POST)
			.uri(endpoint.as_str())
			.header(CONTENT_TYPE, "application/json")
			.header(ACCEPT, "application/json")
			.body(body)
			.map_err(ConfigError::from)?;
		let response = oauth::dispatch(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			AUTHN_ENDPOINT,
			request,
		)
		.await?;
		let status = response.status();

		if !status.is_success() {
			return Err(Error::RemoteAuth {
				endpoint: AUTHN_ENDPOINT,
				status: status.as_u16(),
				body: String::from_utf8_lossy(response.body()).into_owned(),
			});
		}

		let parsed: AuthnResponse = parse_json(AUTHN_ENDPOINT, response.body())?;

		match parsed.session_token.filter(|token| !token.is_empty()) {
			Some(token) => {
				obs::debug_event(
					self.config.debug_logging,
					AuthStage::CredentialExchange,
					"received session token",
				);

				Ok(Secret::new(token))
			},
			None => Err(MalformedResponseError::MissingField {
				endpoint: AUTHN_ENDPOINT,
				field: "sessionToken",
				detail: parsed.status.map(|status| format!("status {status}")),
			}
			.into()),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_body_uses_okta_field_names() {
		let body = serde_json::to_value(AuthnRequest { username: "a@x.io", password: "pw" })
			.expect("Request should serialize.");

		assert_eq!(body, serde_json::json!({ "username": "a@x.io", "password": "pw" }));
	}

	#[test]
	fn response_tolerates_extra_fields() {
		let parsed: AuthnResponse = parse_json(
			AUTHN_ENDPOINT,
			br#"{"status":"MFA_REQUIRED","stateToken":"st","_embedded":{}}"#,
		)
		.expect("Response should parse.");

		assert!(parsed.session_token.is_none());
		assert_eq!(parsed.status.as_deref(), Some("MFA_REQUIRED"));
	}
}
