//! Framework-agnostic request, option, and outcome types for `authenticate`.

// std
use std::convert::Infallible;
// crates.io
use futures::stream;
use multer::Multipart;
use url::form_urlencoded;
// self
use crate::{_prelude::*, auth::SessionKey, error::ValidationError};

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Inbound request as seen by the strategy.
#[derive(Clone, Debug)]
pub struct AuthRequest {
	/// Absolute request URL, including the query string.
	pub url: Url,
	/// Raw `Cookie` header, if present.
	pub cookie: Option<String>,
	/// Raw `Content-Type` header, if present.
	pub content_type: Option<String>,
	/// Raw body; decoded as a form when credentials are read.
	pub body: Vec<u8>,
}
impl AuthRequest {
	/// Creates a body-less request for `url`.
	pub fn new(url: Url) -> Self {
		Self { url, cookie: None, content_type: None, body: Vec::new() }
	}

	/// Parses `url` and creates a body-less request.
	pub fn parse(url: &str) -> Result<Self> {
		Ok(Self::new(Url::parse(url)?))
	}

	/// Attaches the raw `Cookie` header.
	pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
		self.cookie = Some(cookie.into());

		self
	}

	/// Attaches the raw `Content-Type` header.
	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = Some(content_type.into());

		self
	}

	/// Attaches a form body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}

	/// Decodes the body as form fields.
	///
	/// `multipart/form-data` bodies are parsed by boundary and their file parts are skipped;
	/// any other body is decoded as `application/x-www-form-urlencoded`.
	pub async fn form(&self) -> Result<FormData> {
		match self.content_type.as_deref() {
			Some(content_type) if is_multipart(content_type) =>
				parse_multipart(content_type, self.body.clone()).await,
			_ => Ok(FormData(form_urlencoded::parse(&self.body).into_owned().collect())),
		}
	}

	/// Returns the first query parameter named `name`.
	pub fn query_param(&self, name: &str) -> Option<String> {
		self.url.query_pairs().find(|(key, _)| key == name).map(|(_, value)| value.into_owned())
	}
}

/// Decoded form fields, in submission order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData(Vec<(String, String)>);
impl FormData {
	/// Returns the first value submitted for `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}
}

fn is_multipart(content_type: &str) -> bool {
	content_type
		.split(';')
		.next()
		.is_some_and(|essence| essence.trim().eq_ignore_ascii_case(MULTIPART_FORM_DATA))
}

async fn parse_multipart(content_type: &str, body: Vec<u8>) -> Result<FormData> {
	let boundary = multer::parse_boundary(content_type).map_err(malformed_form)?;
	let mut multipart =
		Multipart::new(stream::once(async move { Ok::<_, Infallible>(body) }), boundary);
	let mut fields = Vec::new();

	while let Some(field) = multipart.next_field().await.map_err(malformed_form)? {
		let Some(name) = field.name().map(str::to_owned) else {
			continue;
		};

		if field.file_name().is_some() {
			continue;
		}

		fields.push((name, field.text().await.map_err(malformed_form)?));
	}

	Ok(FormData(fields))
}

fn malformed_form(e: multer::Error) -> Error {
	ValidationError::MalformedForm { reason: e.to_string() }.into()
}

/// Per-call options controlling session keys and redirects.
#[derive(Clone, Debug)]
pub struct AuthenticateOptions {
	/// Session key holding the authenticated user.
	pub session_key: SessionKey,
	/// Session key holding the flashed error.
	pub session_error_key: SessionKey,
	/// Session key holding the name of the strategy that authenticated the user.
	pub session_strategy_key: SessionKey,
	/// Redirect target after a successful login; the user is returned directly when unset.
	pub success_redirect: Option<String>,
	/// Redirect target after a failed login; the error is returned when unset.
	pub failure_redirect: Option<String>,
}
impl AuthenticateOptions {
	/// Sets the success redirect.
	pub fn success_redirect(mut self, location: impl Into<String>) -> Self {
		self.success_redirect = Some(location.into());

		self
	}

	/// Sets the failure redirect.
	pub fn failure_redirect(mut self, location: impl Into<String>) -> Self {
		self.failure_redirect = Some(location.into());

		self
	}

	/// Overrides the session key holding the user.
	pub fn session_key(mut self, key: SessionKey) -> Self {
		self.session_key = key;

		self
	}

	/// Overrides the session key holding the flashed error.
	pub fn session_error_key(mut self, key: SessionKey) -> Self {
		self.session_error_key = key;

		self
	}

	/// Overrides the session key holding the strategy name.
	pub fn session_strategy_key(mut self, key: SessionKey) -> Self {
		self.session_strategy_key = key;

		self
	}
}
impl Default for AuthenticateOptions {
	fn default() -> Self {
		Self {
			session_key: SessionKey::from_static("user"),
			session_error_key: SessionKey::from_static("auth:error"),
			session_strategy_key: SessionKey::from_static("strategy"),
			success_redirect: None,
			failure_redirect: None,
		}
	}
}

/// Result of a completed `authenticate` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome<U> {
	/// The user is authenticated and no redirect was requested.
	Authenticated(U),
	/// The host must answer with a redirect.
	Redirect {
		/// `Location` header value.
		location: String,
		/// `Set-Cookie` header value, when the session changed.
		set_cookie: Option<String>,
	},
}
impl<U> AuthOutcome<U> {
	/// Returns the redirect location, if this is a redirect.
	pub fn location(&self) -> Option<&str> {
		match self {
			Self::Redirect { location, .. } => Some(location),
			Self::Authenticated(_) => None,
		}
	}

	/// Returns the authenticated user, if any.
	pub fn into_user(self) -> Option<U> {
		match self {
			Self::Authenticated(user) => Some(user),
			Self::Redirect { .. } => None,
		}
	}
}
