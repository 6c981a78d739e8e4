//! The Okta strategy: custom login form handling on top of the authorization-code flow.
//!
//! [`OktaStrategy`] implements [`OAuth2Hooks`] and drives [`AuthorizationCodeFlow`]. With the
//! custom login form enabled it first trades the submitted email and password for an Okta
//! session token, which travels to the authorization redirect in a per-call
//! [`AuthorizationContext`] so the hosted Okta login page is skipped.

pub mod authn;
pub mod profile;

pub use authn::*;
pub use profile::*;

// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::{MalformedResponseError, ValidationError},
	flows::{AuthorizationCodeFlow, ClientRegistration},
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{ReqwestTransportErrorMapper, TransportErrorMapper},
	obs::{self, AuthStage},
	provider::{
		AuthorizationContext, AuthorizationParams, OAuth2Hooks, ProfileFuture, ProviderConfig,
	},
	request::{AuthOutcome, AuthRequest, AuthenticateOptions},
	session::SessionStore,
	verify::VerifyCallback,
};

/// Name under which the strategy records successful logins.
pub const OKTA_STRATEGY_NAME: &str = "okta";

/// Okta authentication strategy producing application users of type `U`.
///
/// The strategy is immutable after construction and may be shared (for example behind an
/// `Arc`) across concurrent requests.
pub struct OktaStrategy<U, C = ReqwestHttpClient, M = ReqwestTransportErrorMapper>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	config: ProviderConfig,
	flow: AuthorizationCodeFlow<C, M>,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	verify: Arc<dyn VerifyCallback<U, OktaProfile>>,
}
impl<U> OktaStrategy<U> {
	/// Creates a strategy with a reqwest transport bounded by the configured timeout.
	pub fn new<V>(config: ProviderConfig, verify: V) -> Result<Self>
	where
		V: 'static + VerifyCallback<U, OktaProfile>,
	{
		let http_client = ReqwestHttpClient::with_timeout(config.request_timeout)?;

		Self::with_http_client(config, verify, http_client, ReqwestTransportErrorMapper)
	}
}
impl<U, C, M> OktaStrategy<U, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a strategy that reuses the caller-provided transport + mapper pair.
	///
	/// The transport's own timeout applies; `config.request_timeout` is not re-applied.
	pub fn with_http_client<V>(
		config: ProviderConfig,
		verify: V,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self>
	where
		V: 'static + VerifyCallback<U, OktaProfile>,
	{
		let http_client = http_client.into();
		let transport_mapper = mapper.into();
		let registration = ClientRegistration {
			client_id: config.client_id.clone(),
			client_secret: config.client_secret.clone(),
			authorization_endpoint: config.endpoints.authorization.clone(),
			token_endpoint: config.endpoints.token.clone(),
			callback_url: config.callback_url.clone(),
			client_auth_method: config.client_auth_method,
		};
		let flow = AuthorizationCodeFlow::new(
			registration,
			Arc::clone(&http_client),
			Arc::clone(&transport_mapper),
		)?
		.with_debug_logging(config.debug_logging);

		Ok(Self { config, flow, http_client, transport_mapper, verify: Arc::new(verify) })
	}

	/// Validated configuration backing the strategy.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Resolves the configured callback URL against the current request URL.
	pub fn callback_url_from(&self, current: &Url) -> Result<Url> {
		self.flow.callback_url(current)
	}

	/// Authenticates `request`.
	///
	/// Without the custom login form the call is delegated to the authorization-code flow.
	/// With it, the session is checked for a cached user first; requests outside the callback
	/// path must then carry `email` and `password` form fields, which are exchanged for a
	/// session token before the flow continues.
	pub async fn authenticate(
		&self,
		request: &AuthRequest,
		sessions: &dyn SessionStore,
		options: &AuthenticateOptions,
	) -> Result<AuthOutcome<U>>
	where
		U: Send + Serialize + DeserializeOwned,
	{
		if !self.config.custom_login_form {
			return self
				.flow
				.authenticate(
					self,
					self.verify.as_ref(),
					request,
					sessions,
					options,
					&AuthorizationContext::default(),
				)
				.await;
		}

		let session = sessions.get_session(request.cookie.as_deref()).await?;

		if let Some(user) = session.get::<U>(&options.session_key)? {
			return self.flow.success(self.name(), user, session, sessions, options).await;
		}

		let callback_url = self.callback_url_from(&request.url)?;
		let ctx = if request.url.path() != callback_url.path() {
			let form = request.form().await?;
			let (Some(email), Some(password)) = (
				form.get("email").filter(|value| !value.is_empty()),
				form.get("password").filter(|value| !value.is_empty()),
			) else {
				return Err(ValidationError::MissingCredentials.into());
			};
			let session_token = obs::observe(
				AuthStage::CredentialExchange,
				self.exchange_credentials(email, password),
			)
			.await?;

			AuthorizationContext::with_session_token(session_token)
		} else {
			AuthorizationContext::default()
		};

		self.flow
			.continue_with_session(
				self,
				self.verify.as_ref(),
				request,
				session,
				sessions,
				options,
				&ctx,
			)
			.await
	}
}
impl<U, C, M> OAuth2Hooks for OktaStrategy<U, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	type Profile = OktaProfile;

	fn name(&self) -> &str {
		OKTA_STRATEGY_NAME
	}

	fn authorization_params(&self, ctx: &AuthorizationContext) -> AuthorizationParams {
		let mut params = AuthorizationParams::default();
		let session_token = ctx.session_token.as_ref().map(Secret::expose).unwrap_or_default();

		params.push("scope", self.config.scope.normalized());
		params.push("sessionToken", session_token);

		params
	}

	fn user_profile<'a>(&'a self, access_token: &'a Secret) -> ProfileFuture<'a, OktaProfile> {
		Box::pin(self.fetch_user_profile(access_token))
	}
}
impl<U, C, M> Debug for OktaStrategy<U, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OktaStrategy").field("config", &self.config).field("flow", &self.flow).finish()
	}
}

pub(crate) fn parse_json<T>(endpoint: &'static str, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| MalformedResponseError::Json { endpoint, source }.into())
}
