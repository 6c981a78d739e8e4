//! State and PKCE material for the authorization redirect.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::Secret, provider::AuthorizationParams};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	#[default]
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// State and PKCE material kept in the session between the redirect and the callback.
#[derive(Clone, Serialize, Deserialize)]
pub struct PendingAuthorization {
	/// Opaque state value that must round-trip via the authorization redirect.
	pub state: String,
	/// Redirect URI sent on the authorization request; the exchange must repeat it.
	pub redirect_uri: Url,
	code_verifier: Secret,
	code_challenge: String,
	#[serde(default)]
	code_challenge_method: PkceCodeChallengeMethod,
}
impl PendingAuthorization {
	/// Generates fresh state and a PKCE pair for `redirect_uri`.
	pub fn generate(redirect_uri: Url) -> Self {
		let code_verifier = random_string(PKCE_VERIFIER_LEN);
		let code_challenge = compute_pkce_challenge(&code_verifier);

		Self {
			state: random_string(STATE_LEN),
			redirect_uri,
			code_verifier: Secret::new(code_verifier),
			code_challenge,
			code_challenge_method: PkceCodeChallengeMethod::S256,
		}
	}

	/// PKCE code challenge derived from the secret verifier.
	pub fn code_challenge(&self) -> &str {
		&self.code_challenge
	}

	/// PKCE verifier sent with the code exchange.
	pub fn code_verifier(&self) -> &str {
		self.code_verifier.expose()
	}

	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state { Ok(()) } else { Err(Error::StateMismatch) }
	}

	/// Builds the authorization URL.
	///
	/// Parameter order: `response_type`, `client_id`, `redirect_uri`, the hook parameters,
	/// then `state` and the PKCE challenge.
	pub fn authorize_url(
		&self,
		authorization_endpoint: &Url,
		client_id: &str,
		params: &AuthorizationParams,
	) -> Url {
		let mut url = authorization_endpoint.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", client_id);
		pairs.append_pair("redirect_uri", self.redirect_uri.as_str());
		pairs.extend_pairs(params.iter());
		pairs.append_pair("state", &self.state);
		pairs.append_pair("code_challenge", &self.code_challenge);
		pairs.append_pair("code_challenge_method", self.code_challenge_method.as_str());

		drop(pairs);

		url
	}
}
impl Debug for PendingAuthorization {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PendingAuthorization")
			.field("state", &self.state)
			.field("redirect_uri", &self.redirect_uri)
			.field("code_challenge", &self.code_challenge)
			.field("code_challenge_method", &self.code_challenge_method)
			.finish()
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let digest = Sha256::digest(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(digest)
}
