// crates.io
use httpmock::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
// self
use okta_strategy::{
	_preludet::build_test_strategy,
	error::Error,
	okta::{OktaProfile, OktaStrategy},
	provider::{ClientAuthMethod, ProviderConfig},
	request::{AuthOutcome, AuthRequest, AuthenticateOptions},
	session::{MemorySessionStore, SessionStore},
	url::Url,
	verify::VerifyParams,
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";
const TOKEN_PATH: &str = "/oauth2/default/v1/token";
const USERINFO_PATH: &str = "/oauth2/default/v1/userinfo";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct AppUser {
	id: String,
	display_name: String,
	email: String,
	access_token: String,
}

fn config(server: &MockServer) -> ProviderConfig {
	ProviderConfig::builder()
		.okta_domain(server.base_url())
		.client_id(CLIENT_ID)
		.client_secret(CLIENT_SECRET)
		.callback_url("/auth/okta/callback")
		.client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.expect("Provider config should build for the mock tenant.")
}

fn build_strategy(server: &MockServer) -> OktaStrategy<AppUser> {
	let (strategy, _) =
		build_test_strategy(config(server), |params: VerifyParams<OktaProfile>| async move {
			Ok::<_, Error>(AppUser {
				id: params.profile.id,
				display_name: params.profile.display_name,
				email: params.profile.email,
				access_token: params.tokens.access_token.expose().to_owned(),
			})
		});

	strategy
}

// Runs the redirect leg and returns the session cookie pair plus the issued state.
async fn start_login(
	strategy: &OktaStrategy<AppUser>,
	sessions: &MemorySessionStore,
) -> (String, String) {
	let outcome = strategy
		.authenticate(
			&AuthRequest::parse("http://app.test/login").expect("Login URL should parse."),
			sessions,
			&AuthenticateOptions::default(),
		)
		.await
		.expect("Login should redirect to Okta.");
	let AuthOutcome::Redirect { location, set_cookie: Some(set_cookie) } = outcome else {
		panic!("Login should redirect with a session cookie.");
	};
	let state = Url::parse(&location)
		.expect("Authorization URL should parse.")
		.query_pairs()
		.find(|(key, _)| key == "state")
		.map(|(_, value)| value.into_owned())
		.expect("Authorization URL should carry state.");
	let cookie = set_cookie.split(';').next().expect("Set-Cookie should carry a pair.").to_owned();

	(cookie, state)
}

fn callback(query: &str, cookie: &str) -> AuthRequest {
	AuthRequest::parse(&format!("http://app.test/auth/okta/callback?{query}"))
		.expect("Callback URL should parse.")
		.with_cookie(cookie)
}

#[tokio::test]
async fn callback_exchanges_code_and_stores_the_user() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded")
				.body_includes("grant_type=authorization_code")
				.body_includes("code=code-1")
				.body_includes("code_verifier=")
				.body_includes("client_secret=secret-it");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "at-1",
				"token_type": "Bearer",
				"expires_in": 3600,
				"scope": "openid profile email",
				"id_token": "ignored"
			}));
		})
		.await;
	let userinfo = server
		.mock_async(|when, then| {
			when.method(GET).path(USERINFO_PATH).header("authorization", "Bearer at-1");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"sub": "00u1",
				"name": "Ada Lovelace",
				"preferred_username": "ada@x.io",
				"email": "ada@x.io",
				"updated_at": 1_700_000_000
			}));
		})
		.await;
	let strategy = build_strategy(&server);
	let sessions = MemorySessionStore::default();
	let (cookie, state) = start_login(&strategy, &sessions).await;
	let options = AuthenticateOptions::default().success_redirect("/dashboard");
	let outcome = strategy
		.authenticate(&callback(&format!("code=code-1&state={state}"), &cookie), &sessions, &options)
		.await
		.expect("Callback should complete the login.");

	token.assert_async().await;
	userinfo.assert_async().await;

	assert_eq!(outcome.location(), Some("/dashboard"));

	let session = sessions.get_session(Some(&cookie)).await.expect("Session should load.");
	let user = session
		.get::<AppUser>("user")
		.expect("Stored user should deserialize.")
		.expect("User should be stored in the session.");

	assert_eq!(user.id, "00u1");
	assert_eq!(user.display_name, "Ada Lovelace");
	assert_eq!(user.access_token, "at-1");
	assert_eq!(session.get::<String>("strategy").expect("Strategy should load."), Some("okta".into()));
	assert!(!session.has("oauth2:state"));
}

#[tokio::test]
async fn display_name_falls_back_to_preferred_username() {
	let server = MockServer::start_async().await;
	let _token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "access_token": "at-2", "token_type": "Bearer" }));
		})
		.await;
	let _userinfo = server
		.mock_async(|when, then| {
			when.method(GET).path(USERINFO_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "sub": "00u2", "preferred_username": "grace@x.io" }));
		})
		.await;
	let strategy = build_strategy(&server);
	let sessions = MemorySessionStore::default();
	let (cookie, state) = start_login(&strategy, &sessions).await;
	let user = strategy
		.authenticate(
			&callback(&format!("code=code-2&state={state}"), &cookie),
			&sessions,
			&AuthenticateOptions::default(),
		)
		.await
		.expect("Callback should complete the login.")
		.into_user()
		.expect("Without a success redirect the user is returned directly.");

	assert_eq!(user.display_name, "grace@x.io");
	assert_eq!(user.email, "");
}

#[tokio::test]
async fn state_mismatch_fails_without_calling_the_token_endpoint() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(500);
		})
		.await;
	let strategy = build_strategy(&server);
	let sessions = MemorySessionStore::default();
	let (cookie, _) = start_login(&strategy, &sessions).await;
	let err = strategy
		.authenticate(
			&callback("code=code-1&state=forged", &cookie),
			&sessions,
			&AuthenticateOptions::default(),
		)
		.await
		.expect_err("Forged state should fail.");

	assert!(matches!(err, Error::StateMismatch));

	token.assert_hits_async(0).await;
}

#[tokio::test]
async fn failed_callbacks_consume_the_pending_authorization() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(500);
		})
		.await;
	let strategy = build_strategy(&server);
	let sessions = MemorySessionStore::default();
	let (cookie, state) = start_login(&strategy, &sessions).await;
	let err = strategy
		.authenticate(
			&callback("code=code-1&state=forged", &cookie),
			&sessions,
			&AuthenticateOptions::default(),
		)
		.await
		.expect_err("Forged state should fail.");

	assert!(matches!(err, Error::StateMismatch));

	let session = sessions.get_session(Some(&cookie)).await.expect("Session should load.");

	assert!(!session.has("oauth2:state"));

	let err = strategy
		.authenticate(
			&callback(&format!("code=code-1&state={state}"), &cookie),
			&sessions,
			&AuthenticateOptions::default(),
		)
		.await
		.expect_err("The original state should no longer be accepted.");

	assert!(matches!(err, Error::InvalidCallback { .. }));

	token.assert_hits_async(0).await;
}

#[tokio::test]
async fn completed_callbacks_cannot_be_replayed() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "access_token": "at-5", "token_type": "Bearer" }));
		})
		.await;
	let _userinfo = server
		.mock_async(|when, then| {
			when.method(GET).path(USERINFO_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "sub": "00u5", "name": "Mary Somerville" }));
		})
		.await;
	let strategy = build_strategy(&server);
	let sessions = MemorySessionStore::default();
	let (cookie, state) = start_login(&strategy, &sessions).await;
	let request = callback(&format!("code=code-5&state={state}"), &cookie);
	let user = strategy
		.authenticate(&request, &sessions, &AuthenticateOptions::default())
		.await
		.expect("Callback should complete the login.")
		.into_user()
		.expect("Without a success redirect the user is returned directly.");

	assert_eq!(user.id, "00u5");

	let err = strategy
		.authenticate(&request, &sessions, &AuthenticateOptions::default())
		.await
		.expect_err("Replaying a completed callback should fail.");

	assert!(matches!(err, Error::InvalidCallback { .. }));

	token.assert_hits_async(1).await;
}

#[tokio::test]
async fn failures_are_flashed_when_a_failure_redirect_is_set() {
	let server = MockServer::start_async().await;
	let strategy = build_strategy(&server);
	let sessions = MemorySessionStore::default();
	let (cookie, _) = start_login(&strategy, &sessions).await;
	let options = AuthenticateOptions::default().failure_redirect("/login");
	let outcome = strategy
		.authenticate(
			&callback("error=access_denied&error_description=User+cancelled", &cookie),
			&sessions,
			&options,
		)
		.await
		.expect("Failure redirect should turn the error into a redirect.");

	assert_eq!(outcome.location(), Some("/login"));

	let mut session = sessions.get_session(Some(&cookie)).await.expect("Session should load.");
	let flashed = session
		.take_flash::<serde_json::Value>("auth:error")
		.expect("Flash should deserialize.")
		.expect("Error should be flashed.");

	assert_eq!(flashed["message"], "Authorization was denied: access_denied.");
	assert!(!session.has("user"));
}

#[tokio::test]
async fn token_endpoint_rejections_are_classified() {
	let server = MockServer::start_async().await;
	let _token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.json_body(json!({ "error": "invalid_grant", "error_description": "code expired" }));
		})
		.await;
	let strategy = build_strategy(&server);
	let sessions = MemorySessionStore::default();
	let (cookie, state) = start_login(&strategy, &sessions).await;
	let err = strategy
		.authenticate(
			&callback(&format!("code=stale&state={state}"), &cookie),
			&sessions,
			&AuthenticateOptions::default(),
		)
		.await
		.expect_err("Expired codes should fail.");

	assert!(matches!(err, Error::InvalidGrant { .. }));
}

#[tokio::test]
async fn userinfo_failures_carry_status_and_body() {
	let server = MockServer::start_async().await;
	let _token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "access_token": "at-3", "token_type": "Bearer" }));
		})
		.await;
	let _userinfo = server
		.mock_async(|when, then| {
			when.method(GET).path(USERINFO_PATH);
			then.status(401).body("invalid_token");
		})
		.await;
	let strategy = build_strategy(&server);
	let sessions = MemorySessionStore::default();
	let (cookie, state) = start_login(&strategy, &sessions).await;
	let err = strategy
		.authenticate(
			&callback(&format!("code=code-3&state={state}"), &cookie),
			&sessions,
			&AuthenticateOptions::default(),
		)
		.await
		.expect_err("Userinfo rejection should fail.");

	assert!(matches!(
		&err,
		Error::RemoteAuth { endpoint: "userinfo", status: 401, body } if body == "invalid_token"
	));
}

#[tokio::test]
async fn verify_rejections_propagate() {
	let server = MockServer::start_async().await;
	let _token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "access_token": "at-4", "token_type": "Bearer" }));
		})
		.await;
	let _userinfo = server
		.mock_async(|when, then| {
			when.method(GET).path(USERINFO_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "sub": "00u4" }));
		})
		.await;
	let (strategy, _) =
		build_test_strategy(config(&server), |_: VerifyParams<OktaProfile>| async move {
			Err::<AppUser, _>(Error::verify(std::io::Error::other("user is suspended")))
		});
	let sessions = MemorySessionStore::default();
	let (cookie, state) = start_login(&strategy, &sessions).await;
	let err = strategy
		.authenticate(
			&callback(&format!("code=code-4&state={state}"), &cookie),
			&sessions,
			&AuthenticateOptions::default(),
		)
		.await
		.expect_err("Verify rejection should fail.");

	assert!(matches!(err, Error::Verify { .. }));
}
