//! Session contracts consumed by the strategy, plus the in-memory store.
//!
//! The strategy only ever talks to a [`SessionStore`]: it loads the session named by the
//! request's `Cookie` header, mutates the [`Session`] value locally, and commits it to obtain
//! the `Set-Cookie` header for the response.

pub mod memory;

pub use memory::MemorySessionStore;

// std
use std::collections::btree_map::Entry;
// self
use crate::_prelude::*;

/// Boxed future returned by [`SessionStore`] operations.
pub type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SessionError>> + 'a + Send>>;

/// Cookie-addressed session backend.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Loads the session referenced by the raw `Cookie` header, or a fresh one.
	fn get_session<'a>(&'a self, cookie_header: Option<&'a str>) -> SessionFuture<'a, Session>;

	/// Persists `session` and returns the `Set-Cookie` header value.
	fn commit_session<'a>(&'a self, session: &'a Session) -> SessionFuture<'a, String>;

	/// Deletes `session` and returns a `Set-Cookie` header value that clears the cookie.
	fn destroy_session<'a>(&'a self, session: &'a Session) -> SessionFuture<'a, String>;
}

/// Error type produced by [`SessionStore`] implementations and [`Session`] accessors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SessionError {
	/// A value could not be converted to or from JSON.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
impl From<serde_json::Error> for SessionError {
	fn from(e: serde_json::Error) -> Self {
		Self::Serialization { message: e.to_string() }
	}
}

/// Key/value data associated with one browser session.
///
/// Flash values are stored under a reserved key and disappear once taken.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
	id: Option<String>,
	data: BTreeMap<String, serde_json::Value>,
}
impl Session {
	/// Creates a session bound to an existing identifier.
	pub fn with_id(id: impl Into<String>, data: BTreeMap<String, serde_json::Value>) -> Self {
		Self { id: Some(id.into()), data }
	}

	/// Store identifier, absent until the session is first committed.
	pub fn id(&self) -> Option<&str> {
		self.id.as_deref()
	}

	/// Raw session data.
	pub fn data(&self) -> &BTreeMap<String, serde_json::Value> {
		&self.data
	}

	/// Returns true when `key` holds a value.
	pub fn has(&self, key: &str) -> bool {
		self.data.contains_key(key)
	}

	/// Reads and deserializes the value stored under `key`.
	pub fn get<T>(&self, key: &str) -> Result<Option<T>, SessionError>
	where
		T: DeserializeOwned,
	{
		self.data.get(key).map(|value| T::deserialize(value).map_err(SessionError::from)).transpose()
	}

	/// Serializes and stores `value` under `key`.
	pub fn set<T>(&mut self, key: impl Into<String>, value: &T) -> Result<(), SessionError>
	where
		T: ?Sized + Serialize,
	{
		self.data.insert(key.into(), serde_json::to_value(value)?);

		Ok(())
	}

	/// Removes `key`, returning the previous raw value.
	pub fn unset(&mut self, key: &str) -> Option<serde_json::Value> {
		self.data.remove(key)
	}

	/// Stores a value that is removed the first time it is taken.
	pub fn flash<T>(&mut self, key: &str, value: &T) -> Result<(), SessionError>
	where
		T: ?Sized + Serialize,
	{
		self.set(flash_key(key), value)
	}

	/// Removes and deserializes the flash value stored under `key`.
	pub fn take_flash<T>(&mut self, key: &str) -> Result<Option<T>, SessionError>
	where
		T: DeserializeOwned,
	{
		match self.data.entry(flash_key(key)) {
			Entry::Occupied(entry) => Ok(Some(serde_json::from_value(entry.remove())?)),
			Entry::Vacant(_) => Ok(None),
		}
	}
}

fn flash_key(key: &str) -> String {
	format!("__flash_{key}__")
}
