// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
use time::Duration;
// self
use okta_strategy::{
	error::{ConfigError, Error, TransientError, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	okta::{OktaProfile, OktaStrategy},
	provider::ProviderConfig,
	request::{AuthOutcome, AuthRequest, AuthenticateOptions},
	session::MemorySessionStore,
	url::Url,
	verify::VerifyParams,
};

#[derive(Debug)]
enum FakeTransportError {
	Throttled,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Throttled => write!(f, "Transport throttled."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
struct FakeHttpClient {
	retry_after: Duration,
}
impl FakeHttpClient {
	fn throttled(retry_after: Duration) -> Self {
		Self { retry_after }
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, retry_after: self.retry_after }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	retry_after: Duration,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let retry_after = self.retry_after;

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);
			slot.store(ResponseMetadata { status: Some(429), retry_after: Some(retry_after) });

			Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Throttled)))
		})
	}
}

type Recorded = Vec<(&'static str, Option<ResponseMetadata>)>;

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	recorded: Arc<Mutex<Recorded>>,
}
impl RecordingTransportErrorMapper {
	fn recorded(&self) -> Recorded {
		self.recorded.lock().clone()
	}
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: &'static str,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		let status = meta.and_then(|value| value.status);
		let retry_after = meta.and_then(|value| value.retry_after);

		self.recorded.lock().push((endpoint, meta.cloned()));

		match err {
			HttpClientError::Reqwest(inner) => TransientError::TokenEndpoint {
				message: format!("Fake transport error at {endpoint}: {inner}"),
				status,
				retry_after,
			}
			.into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other { endpoint, message }.into(),
			other => TransportError::Other { endpoint, message: format!("{other:?}") }.into(),
		}
	}
}

fn build_strategy(
	custom_login_form: bool,
	mapper: &RecordingTransportErrorMapper,
) -> OktaStrategy<String, FakeHttpClient, RecordingTransportErrorMapper> {
	let config = ProviderConfig::builder()
		.issuer("https://acme.okta.com/oauth2/aus1")
		.client_id("fake-client")
		.client_secret("fake-secret")
		.callback_url("https://app.test/auth/okta/callback")
		.custom_login_form(custom_login_form)
		.build()
		.expect("Provider config should build for the fake tenant.");

	OktaStrategy::with_http_client(
		config,
		|params: VerifyParams<OktaProfile>| async move { Ok::<_, Error>(params.profile.id) },
		FakeHttpClient::throttled(Duration::seconds(5)),
		mapper.clone(),
	)
	.expect("Strategy should build over the fake transport.")
}

fn assert_throttled(err: Error, expected_retry_after: Duration) {
	match err {
		Error::Transient(TransientError::TokenEndpoint { status, retry_after, .. }) => {
			assert_eq!(status, Some(429));
			assert_eq!(retry_after, Some(expected_retry_after));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn credential_exchange_failures_flow_through_the_custom_mapper() {
	let mapper = RecordingTransportErrorMapper::default();
	let strategy = build_strategy(true, &mapper);
	let request = AuthRequest::parse("https://app.test/login")
		.expect("Login URL should parse.")
		.with_body("email=a%40x.io&password=pw");
	let err = strategy
		.authenticate(&request, &MemorySessionStore::default(), &AuthenticateOptions::default())
		.await
		.expect_err("Throttled transport should fail the credential exchange.");

	assert_throttled(err, Duration::seconds(5));

	let recorded = mapper.recorded();

	assert_eq!(recorded.len(), 1);
	assert_eq!(recorded[0].0, "authn");
	assert_eq!(recorded[0].1.as_ref().and_then(|meta| meta.status), Some(429));
}

#[tokio::test]
async fn token_exchange_failures_flow_through_the_custom_mapper() {
	let mapper = RecordingTransportErrorMapper::default();
	let strategy = build_strategy(false, &mapper);
	let sessions = MemorySessionStore::default();
	let outcome = strategy
		.authenticate(
			&AuthRequest::parse("https://app.test/login").expect("Login URL should parse."),
			&sessions,
			&AuthenticateOptions::default(),
		)
		.await
		.expect("Login should redirect without touching the transport.");
	let AuthOutcome::Redirect { location, set_cookie: Some(set_cookie) } = outcome else {
		panic!("Login should redirect with a session cookie.");
	};
	let location = Url::parse(&location).expect("Authorization URL should parse.");
	let state = location
		.query_pairs()
		.find(|(key, _)| key == "state")
		.map(|(_, value)| value.into_owned())
		.expect("Authorization URL should carry state.");

	assert_eq!(location.path(), "/oauth2/aus1/v1/authorize");
	assert!(mapper.recorded().is_empty());

	let cookie = set_cookie.split(';').next().expect("Set-Cookie should carry a pair.");
	let callback =
		AuthRequest::parse(&format!("https://app.test/auth/okta/callback?code=c-1&state={state}"))
			.expect("Callback URL should parse.")
			.with_cookie(cookie);
	let err = strategy
		.authenticate(&callback, &sessions, &AuthenticateOptions::default())
		.await
		.expect_err("Throttled transport should fail the code exchange.");

	assert_throttled(err, Duration::seconds(5));
	assert_eq!(
		mapper.recorded().into_iter().map(|(endpoint, _)| endpoint).collect::<Vec<_>>(),
		["token"]
	);
}
