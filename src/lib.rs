//! Okta OIDC/OAuth 2.0 authentication strategy for request-driven auth middleware.
//!
//! [`okta::OktaStrategy`] drives a PKCE authorization-code flow against Okta and can trade a
//! custom login form's credentials for a session token before redirecting.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod okta;
pub mod provider;
pub mod request;
pub mod session;
pub mod verify;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		okta::{OktaProfile, OktaStrategy},
		provider::ProviderConfig,
		session::MemorySessionStore,
		verify::VerifyCallback,
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`OktaStrategy`] backed by the insecure test transport together with a
	/// fresh in-memory session store.
	pub fn build_test_strategy<U, V>(
		config: ProviderConfig,
		verify: V,
	) -> (OktaStrategy<U>, Arc<MemorySessionStore>)
	where
		U: 'static,
		V: 'static + VerifyCallback<U, OktaProfile>,
	{
		let strategy = OktaStrategy::with_http_client(
			config,
			verify,
			test_reqwest_http_client(),
			ReqwestTransportErrorMapper,
		)
		.expect("Test strategy should build from a valid configuration.");

		(strategy, Arc::new(MemorySessionStore::default()))
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, okta_strategy as _};
