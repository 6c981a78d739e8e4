//! Okta userinfo claims and the normalized profile handed to verify callbacks.

// crates.io
use oauth2::http::{
	Method, Request,
	header::{ACCEPT, AUTHORIZATION},
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

/// Endpoint label used for userinfo errors.
pub const USERINFO_ENDPOINT: &str = "userinfo";
/// Provider label carried by every [`OktaProfile`].
pub const OKTA_PROVIDER: &str = "okta";

/// Claims returned by Okta's OIDC userinfo endpoint.
///
/// Okta omits claims whose scope was not granted, so everything except `sub` is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OktaUserInfo {
	/// Subject identifier.
	pub sub: Option<String>,
	/// Full name.
	pub name: Option<String>,
	/// Preferred username, usually the login email.
	pub preferred_username: Option<String>,
	/// Casual name.
	pub nickname: Option<String>,
	/// Given name.
	pub given_name: Option<String>,
	/// Middle name.
	pub middle_name: Option<String>,
	/// Family name.
	pub family_name: Option<String>,
	/// Profile page URL.
	pub profile: Option<String>,
	/// Time zone.
	pub zoneinfo: Option<String>,
	/// Locale.
	pub locale: Option<String>,
	/// Last update; Okta sends epoch seconds, some authorization servers send strings.
	pub updated_at: Option<serde_json::Value>,
	/// Email address.
	pub email: Option<String>,
	/// Whether the email address was verified.
	pub email_verified: Option<bool>,
}

/// Name parts of an [`OktaProfile`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileName {
	/// Family name, empty when not granted.
	pub family_name: String,
	/// Given name, empty when not granted.
	pub given_name: String,
	/// Middle name, empty when not granted.
	pub middle_name: String,
}

/// Normalized Okta user profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OktaProfile {
	/// Always `okta`.
	pub provider: String,
	/// Okta user id (`sub`).
	pub id: String,
	/// `name`, falling back to `preferred_username`, then the empty string.
	pub display_name: String,
	/// Name parts.
	pub name: ProfileName,
	/// Email address, empty when not granted.
	pub email: String,
}
impl TryFrom<OktaUserInfo> for OktaProfile {
	type Error = MalformedResponseError;

	fn try_from(info: OktaUserInfo) -> Result<Self, Self::Error> {
		let id = info.sub.filter(|sub| !sub.is_empty()).ok_or(MalformedResponseError::MissingField {
			endpoint: USERINFO_ENDPOINT,
			field: "sub",
			detail: None,
		})?;

		Ok(Self {
			provider: OKTA_PROVIDER.to_owned(),
			id,
			display_name: info.name.or(info.preferred_username).unwrap_or_default(),
			name: ProfileName {
				family_name: info.family_name.unwrap_or_default(),
				given_name: info.given_name.unwrap_or_default(),
				middle_name: info.middle_name.unwrap_or_default(),
			},
			email: info.email.unwrap_or_default(),
		})
	}
}

impl<U, C, M> OktaStrategy<U, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches userinfo for `access_token` and normalizes it.
	pub async fn fetch_user_profile(&self, access_token: &Secret) -> Result<OktaProfile> {
		obs::debug_event(self.config.debug_logging, AuthStage::UserInfo, "requesting userinfo");

		let request = Request::builder()
			.method(Method::GET)
			.uri(self.config.endpoints.userinfo.as_str())
			.header(AUTHORIZATION, format!("Bearer {}", access_token.expose()))
			.header(ACCEPT, "application/json")
			.body(Vec::new())
			.map_err(ConfigError::from)?;
		let response = oauth::dispatch(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			USERINFO_ENDPOINT,
			request,
		)
		.await?;

		if !response.status().is_success() {
			return Err(Error::RemoteAuth {
				endpoint: USERINFO_ENDPOINT,
				status: response.status().as_u16(),
				body: String::from_utf8_lossy(response.body()).into_owned(),
			});
		}

		let info: OktaUserInfo = parse_json(USERINFO_ENDPOINT, response.body())?;

		Ok(OktaProfile::try_from(info)?)
	}
}
