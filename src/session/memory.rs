//! Thread-safe in-memory [`SessionStore`] for local development, demos, and tests.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::CookieName,
	session::{Session, SessionError, SessionFuture, SessionStore},
};

type SessionMap = Arc<RwLock<HashMap<String, BTreeMap<String, serde_json::Value>>>>;

const SESSION_ID_LEN: usize = 32;
const DEFAULT_COOKIE_NAME: &str = "__session";

/// Cookie-backed session store that keeps data in-process.
///
/// Cookies carry only the random session identifier. Data is lost on restart.
#[derive(Clone, Debug)]
pub struct MemorySessionStore {
	cookie: CookieName,
	sessions: SessionMap,
}
impl MemorySessionStore {
	/// Creates a store whose cookie is named `cookie`.
	pub fn new(cookie: CookieName) -> Self {
		Self { cookie, sessions: SessionMap::default() }
	}

	/// Cookie name carrying the session identifier.
	pub fn cookie_name(&self) -> &CookieName {
		&self.cookie
	}

	/// Number of live sessions.
	pub fn len(&self) -> usize {
		self.sessions.read().len()
	}

	/// Returns true when no sessions are stored.
	pub fn is_empty(&self) -> bool {
		self.sessions.read().is_empty()
	}

	fn load_now(&self, cookie_header: Option<&str>) -> Session {
		let Some(id) = cookie_header.and_then(|header| extract_cookie(header, &self.cookie)) else {
			return Session::default();
		};

		match self.sessions.read().get(&id) {
			Some(data) => Session::with_id(id, data.clone()),
			None => Session::default(),
		}
	}

	fn commit_now(&self, session: &Session) -> String {
		let id = session.id().map(str::to_owned).unwrap_or_else(generate_session_id);

		self.sessions.write().insert(id.clone(), session.data().clone());

		format!("{}={id}; Path=/; HttpOnly; SameSite=Lax", self.cookie)
	}

	fn destroy_now(&self, session: &Session) -> String {
		if let Some(id) = session.id() {
			self.sessions.write().remove(id);
		}

		format!("{}=; Path=/; Max-Age=0", self.cookie)
	}
}
impl Default for MemorySessionStore {
	fn default() -> Self {
		Self {
			cookie: CookieName::from_static(DEFAULT_COOKIE_NAME),
			sessions: SessionMap::default(),
		}
	}
}
impl SessionStore for MemorySessionStore {
	fn get_session<'a>(&'a self, cookie_header: Option<&'a str>) -> SessionFuture<'a, Session> {
		Box::pin(async move { Ok::<_, SessionError>(self.load_now(cookie_header)) })
	}

	fn commit_session<'a>(&'a self, session: &'a Session) -> SessionFuture<'a, String> {
		Box::pin(async move { Ok(self.commit_now(session)) })
	}

	fn destroy_session<'a>(&'a self, session: &'a Session) -> SessionFuture<'a, String> {
		Box::pin(async move { Ok(self.destroy_now(session)) })
	}
}

/// Returns the value of the cookie named `name` from a raw `Cookie` header.
pub fn extract_cookie(header: &str, name: &str) -> Option<String> {
	header.split(';').find_map(|cookie| {
		let (key, value) = cookie.trim().split_once('=')?;

		if key == name && !value.is_empty() { Some(value.to_owned()) } else { None }
	})
}

fn generate_session_id() -> String {
	rand::rng().sample_iter(Alphanumeric).take(SESSION_ID_LEN).map(char::from).collect()
}
