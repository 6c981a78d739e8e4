//! Walks through both login modes: the hosted Okta page redirect, then (when `OKTA_USERNAME`
//! and `OKTA_PASSWORD` are set) the custom login form that trades credentials for a session
//! token before redirecting.

// std
use std::env;
// crates.io
use color_eyre::Result;
// self
use okta_strategy::{
	error::Error,
	okta::{OktaProfile, OktaStrategy},
	provider::ProviderConfig,
	request::{AuthOutcome, AuthRequest, AuthenticateOptions},
	session::MemorySessionStore,
	verify::VerifyParams,
};

fn config(custom_login_form: bool) -> Result<ProviderConfig> {
	let domain = env::var("OKTA_DOMAIN").unwrap_or_else(|_| "dev-123456.okta.com".into());
	let config = ProviderConfig::builder()
		.okta_domain(domain)
		.client_id(env::var("OKTA_CLIENT_ID").unwrap_or_else(|_| "demo-client".into()))
		.client_secret(env::var("OKTA_CLIENT_SECRET").unwrap_or_else(|_| "demo-secret".into()))
		.callback_url("/auth/okta/callback")
		.custom_login_form(custom_login_form)
		.debug_logging(true)
		.build()?;

	Ok(config)
}

fn strategy(custom_login_form: bool) -> Result<OktaStrategy<OktaProfile>> {
	let strategy = OktaStrategy::new(
		config(custom_login_form)?,
		|params: VerifyParams<OktaProfile>| async move { Ok::<_, Error>(params.profile) },
	)?;

	Ok(strategy)
}

fn print_outcome(label: &str, outcome: &AuthOutcome<OktaProfile>) {
	match outcome {
		AuthOutcome::Redirect { location, set_cookie } => {
			println!("[{label}] Redirect to {location}.");

			if let Some(cookie) = set_cookie {
				println!("[{label}] Set-Cookie: {cookie}.");
			}
		},
		AuthOutcome::Authenticated(profile) => {
			println!("[{label}] Authenticated {} ({}).", profile.display_name, profile.id);
		},
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let sessions = MemorySessionStore::default();
	let options = AuthenticateOptions::default().success_redirect("/dashboard");
	let hosted = strategy(false)?
		.authenticate(&AuthRequest::parse("http://localhost:3000/login")?, &sessions, &options)
		.await?;

	print_outcome("hosted", &hosted);

	let (Ok(username), Ok(password)) = (env::var("OKTA_USERNAME"), env::var("OKTA_PASSWORD")) else {
		println!("Set OKTA_USERNAME and OKTA_PASSWORD to try the custom login form.");

		return Ok(());
	};
	let body = url::form_urlencoded::Serializer::new(String::new())
		.append_pair("email", &username)
		.append_pair("password", &password)
		.finish();
	let request = AuthRequest::parse("http://localhost:3000/login")?.with_body(body);

	match strategy(true)?.authenticate(&request, &sessions, &options).await {
		Ok(outcome) => print_outcome("custom", &outcome),
		Err(e) => match e.to_response() {
			Some(response) => println!("[custom] HTTP {}: {}.", response.status, response.body),
			None => return Err(e.into()),
		},
	}

	Ok(())
}
