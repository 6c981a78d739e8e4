//! Application-supplied verify callback that turns tokens and a profile into a user.

// self
use crate::{_prelude::*, auth::TokenSet};

/// Boxed future returned by [`VerifyCallback::verify`].
pub type VerifyFuture<'a, U> = Pin<Box<dyn Future<Output = Result<U>> + 'a + Send>>;

/// Inputs handed to the verify callback after a successful code exchange.
#[derive(Clone, Debug)]
pub struct VerifyParams<P> {
	/// Tokens issued by the token endpoint.
	pub tokens: TokenSet,
	/// Normalized profile for the access token.
	pub profile: P,
	/// URL of the callback request being served.
	pub request_url: Url,
}

/// Maps verified tokens and a profile to the application's user type.
///
/// Return [`Error::verify`] to reject the login; the error flows into the failure path.
pub trait VerifyCallback<U, P>
where
	Self: Send + Sync,
{
	/// Resolves the application user.
	fn verify(&self, params: VerifyParams<P>) -> VerifyFuture<'_, U>;
}
impl<U, P, F, Fut> VerifyCallback<U, P> for F
where
	F: Send + Sync + Fn(VerifyParams<P>) -> Fut,
	Fut: 'static + Send + Future<Output = Result<U>>,
{
	fn verify(&self, params: VerifyParams<P>) -> VerifyFuture<'_, U> {
		Box::pin(self(params))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::Secret;

	#[tokio::test]
	async fn closures_act_as_callbacks() {
		let callback = |params: VerifyParams<String>| async move { Ok::<_, Error>(params.profile.len()) };
		let params = VerifyParams {
			tokens: TokenSet {
				access_token: Secret::new("at"),
				refresh_token: None,
				token_type: "Bearer".into(),
				scope: None,
				issued_at: OffsetDateTime::UNIX_EPOCH,
				expires_at: None,
			},
			profile: "alice".to_owned(),
			request_url: Url::parse("https://app.test/callback").expect("Callback URL should parse."),
		};

		assert_eq!(callback.verify(params).await.expect("Callback should succeed."), 5);
	}
}
