//! Generic OAuth 2.0 authorization-code flow driven by [`OAuth2Hooks`].
//!
//! The flow owns everything that is not provider specific: the redirect to the
//! authorization endpoint with state and PKCE, callback validation, the code exchange, the
//! verify callback, and the session bookkeeping of the success and failure paths.

pub mod authorization;

pub use authorization::*;

// self
use crate::{
	_prelude::*,
	auth::Secret,
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{BasicFacade, ReqwestTransportErrorMapper, TransportErrorMapper},
	obs::{self, AuthStage},
	provider::{AuthorizationContext, ClientAuthMethod, OAuth2Hooks},
	request::{AuthOutcome, AuthRequest, AuthenticateOptions},
	session::{Session, SessionStore},
	verify::{VerifyCallback, VerifyParams},
};

/// Session key holding the [`PendingAuthorization`] between redirect and callback.
pub const PENDING_AUTHORIZATION_KEY: &str = "oauth2:state";

/// Client registration consumed by [`AuthorizationCodeFlow`].
#[derive(Clone, Debug)]
pub struct ClientRegistration {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: Secret,
	/// Authorization endpoint.
	pub authorization_endpoint: Url,
	/// Token endpoint.
	pub token_endpoint: Url,
	/// Callback URL: absolute, a path, or a bare host.
	pub callback_url: String,
	/// Client authentication used at the token endpoint.
	pub client_auth_method: ClientAuthMethod,
}

/// Authorization-code flow bound to one client registration.
///
/// The flow is immutable after construction; all per-request data is passed in, so one
/// instance serves concurrent requests.
pub struct AuthorizationCodeFlow<C = ReqwestHttpClient, M = ReqwestTransportErrorMapper>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	facade: BasicFacade<C, M>,
	client_id: String,
	callback_url: String,
	authorization_endpoint: Url,
	debug_logging: bool,
}
impl<C, M> AuthorizationCodeFlow<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a flow that reuses the caller-provided transport + mapper pair.
	pub fn new(
		registration: ClientRegistration,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let facade = BasicFacade::from_registration(&registration, http_client, mapper)?;

		Ok(Self {
			facade,
			client_id: registration.client_id,
			callback_url: registration.callback_url,
			authorization_endpoint: registration.authorization_endpoint,
			debug_logging: false,
		})
	}

	/// Toggles per-step debug events.
	pub fn with_debug_logging(mut self, enabled: bool) -> Self {
		self.debug_logging = enabled;

		self
	}

	/// Resolves the configured callback URL against the current request URL.
	pub fn callback_url(&self, current: &Url) -> Result<Url> {
		resolve_callback_url(&self.callback_url, current)
	}

	/// Runs the flow for `request`, short-circuiting when the session already holds a user.
	pub async fn authenticate<H, U>(
		&self,
		hooks: &H,
		verify: &dyn VerifyCallback<U, H::Profile>,
		request: &AuthRequest,
		sessions: &dyn SessionStore,
		options: &AuthenticateOptions,
		ctx: &AuthorizationContext,
	) -> Result<AuthOutcome<U>>
	where
		H: OAuth2Hooks,
		U: Send + Serialize + DeserializeOwned,
	{
		let session = sessions.get_session(request.cookie.as_deref()).await?;

		if let Some(user) = session.get::<U>(&options.session_key)? {
			return self.success(hooks.name(), user, session, sessions, options).await;
		}

		self.continue_with_session(hooks, verify, request, session, sessions, options, ctx).await
	}

	/// Runs the flow with an already loaded session.
	///
	/// Requests outside the callback path are redirected to the authorization endpoint;
	/// callback requests are validated, exchanged, and verified.
	#[allow(clippy::too_many_arguments)]
	pub async fn continue_with_session<H, U>(
		&self,
		hooks: &H,
		verify: &dyn VerifyCallback<U, H::Profile>,
		request: &AuthRequest,
		session: Session,
		sessions: &dyn SessionStore,
		options: &AuthenticateOptions,
		ctx: &AuthorizationContext,
	) -> Result<AuthOutcome<U>>
	where
		H: OAuth2Hooks,
		U: Send + Serialize + DeserializeOwned,
	{
		let callback_url = self.callback_url(&request.url)?;

		if request.url.path() != callback_url.path() {
			obs::debug_event(
				self.debug_logging,
				AuthStage::Authorization,
				"redirecting to the authorization endpoint",
			);

			return obs::observe(
				AuthStage::Authorization,
				self.redirect_to_authorization(hooks, session, sessions, ctx, callback_url),
			)
			.await;
		}

		let mut session = session;
		let had_pending = session.has(PENDING_AUTHORIZATION_KEY);

		obs::debug_event(self.debug_logging, AuthStage::Callback, "handling authorization callback");

		let result = obs::observe(
			AuthStage::Callback,
			self.complete_callback(hooks, verify, request, &mut session),
		)
		.await;
		let redirects = match &result {
			Ok(_) => options.success_redirect.is_some(),
			Err(_) => options.failure_redirect.is_some(),
		};

		// The consumed pending authorization is persisted even when no redirect commits the
		// session.
		if had_pending && !session.has(PENDING_AUTHORIZATION_KEY) && !redirects {
			sessions.commit_session(&session).await?;
		}

		match result {
			Ok(user) => self.success(hooks.name(), user, session, sessions, options).await,
			Err(e) => self.failure(e, session, sessions, options).await,
		}
	}

	async fn redirect_to_authorization<H, U>(
		&self,
		hooks: &H,
		mut session: Session,
		sessions: &dyn SessionStore,
		ctx: &AuthorizationContext,
		redirect_uri: Url,
	) -> Result<AuthOutcome<U>>
	where
		H: OAuth2Hooks,
	{
		let pending = PendingAuthorization::generate(redirect_uri);
		let location = pending.authorize_url(
			&self.authorization_endpoint,
			&self.client_id,
			&hooks.authorization_params(ctx),
		);

		session.set(PENDING_AUTHORIZATION_KEY, &pending)?;

		let set_cookie = sessions.commit_session(&session).await?;

		Ok(AuthOutcome::Redirect { location: location.into(), set_cookie: Some(set_cookie) })
	}

	async fn complete_callback<H, U>(
		&self,
		hooks: &H,
		verify: &dyn VerifyCallback<U, H::Profile>,
		request: &AuthRequest,
		session: &mut Session,
	) -> Result<U>
	where
		H: OAuth2Hooks,
	{
		if let Some(error) = request.query_param("error") {
			return Err(Error::AuthorizationDenied {
				error,
				description: request.query_param("error_description"),
			});
		}

		let code = non_empty(request.query_param("code"))
			.ok_or(Error::InvalidCallback { reason: "missing code" })?;
		let state = non_empty(request.query_param("state"))
			.ok_or(Error::InvalidCallback { reason: "missing state" })?;
		let pending = session
			.get::<PendingAuthorization>(PENDING_AUTHORIZATION_KEY)?
			.ok_or(Error::InvalidCallback { reason: "no pending authorization in session" })?;

		session.unset(PENDING_AUTHORIZATION_KEY);
		pending.validate_state(&state)?;

		let tokens = self
			.facade
			.exchange_authorization_code(hooks, &code, pending.code_verifier(), &pending.redirect_uri)
			.await?;

		obs::debug_event(self.debug_logging, AuthStage::UserInfo, "fetching user profile");

		let profile =
			obs::observe(AuthStage::UserInfo, hooks.user_profile(&tokens.access_token)).await?;

		verify.verify(VerifyParams { tokens, profile, request_url: request.url.clone() }).await
	}

	/// Completes a successful login.
	///
	/// With a success redirect the user and strategy name are stored in the session, which is
	/// committed; otherwise the user is returned directly.
	pub async fn success<U>(
		&self,
		strategy_name: &str,
		user: U,
		mut session: Session,
		sessions: &dyn SessionStore,
		options: &AuthenticateOptions,
	) -> Result<AuthOutcome<U>>
	where
		U: Send + Serialize,
	{
		let Some(location) = options.success_redirect.as_ref() else {
			return Ok(AuthOutcome::Authenticated(user));
		};

		session.set(options.session_key.as_ref(), &user)?;
		session.set(options.session_strategy_key.as_ref(), strategy_name)?;

		let set_cookie = sessions.commit_session(&session).await?;

		Ok(AuthOutcome::Redirect { location: location.clone(), set_cookie: Some(set_cookie) })
	}

	/// Completes a failed login.
	///
	/// With a failure redirect the error message is flashed into the session, which is
	/// committed; otherwise the error is returned.
	pub async fn failure<U>(
		&self,
		error: Error,
		mut session: Session,
		sessions: &dyn SessionStore,
		options: &AuthenticateOptions,
	) -> Result<AuthOutcome<U>> {
		let Some(location) = options.failure_redirect.as_ref() else {
			return Err(error);
		};

		session.flash(
			options.session_error_key.as_ref(),
			&serde_json::json!({ "message": error.to_string() }),
		)?;

		let set_cookie = sessions.commit_session(&session).await?;

		Ok(AuthOutcome::Redirect { location: location.clone(), set_cookie: Some(set_cookie) })
	}
}
impl<C, M> Debug for AuthorizationCodeFlow<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationCodeFlow")
			.field("client_id", &self.client_id)
			.field("callback_url", &self.callback_url)
			.field("authorization_endpoint", &self.authorization_endpoint)
			.finish()
	}
}

/// Resolves a configured callback URL against the URL of the current request.
///
/// Absolute `http:`/`https:` values are used as-is, values starting with `/` are joined onto
/// the request URL, and anything else is treated as `host[/path]` under the request's scheme.
pub fn resolve_callback_url(configured: &str, current: &Url) -> Result<Url> {
	let url = if configured.starts_with("http:") || configured.starts_with("https:") {
		Url::parse(configured)?
	} else if configured.starts_with('/') {
		current.join(configured)?
	} else {
		Url::parse(&format!("{}://{configured}", current.scheme()))?
	};

	Ok(url)
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.is_empty())
}
