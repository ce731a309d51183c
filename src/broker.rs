//! Single-flight token acquisition with margin-aware caching.
//!
//! [`TokenBroker::valid_token`] is the one accessor: it returns the cached token while the
//! margin-adjusted expiry holds, joins the authentication request already in flight when one
//! exists, and otherwise initiates a new request that every concurrent caller fans in on. The
//! check-and-set of the in-flight marker happens under a synchronous lock before the first
//! suspension point; that ordering is what keeps the stampede down to a single upstream request.

// self
use crate::{
	_prelude::*,
	auth::{CachedToken, Credentials, TokenSecret},
	http::AuthHttpClient,
	obs::{self, AuthOutcome, AuthSpan},
	wire,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestAuthClient;

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport.
pub type ReqwestTokenBroker = TokenBroker<ReqwestAuthClient>;

/// Safety margin subtracted from the server-declared token lifetime, so refresh happens before
/// the server would reject the token.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::seconds(300);
/// Bound applied to every request issued by the broker.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Outcome cell shared by every caller that joined one authentication request.
///
/// The initiator settles the cell exactly once, success or failure; joined callers wait on it
/// and clone the outcome out.
type Flight = Arc<AsyncOnceCell<Result<CachedToken>>>;

/// What a caller found when it inspected the broker state.
enum CallerRole {
	/// No valid cache and no request in flight; this caller performs the authentication.
	Initiator(Flight),
	/// Another caller is already authenticating; wait for its outcome.
	Joiner(Flight),
}

/// Mutable broker state.
///
/// Both fields have a single writer at a time (the initiating call); the cache-hit path only
/// reads. The lock is synchronous and never held across an `.await`.
#[derive(Default)]
struct BrokerState {
	cached: Option<CachedToken>,
	in_flight: Option<Flight>,
}

/// Coordinates token acquisition against the Flex identity endpoint.
///
/// The broker owns the transport, the endpoint, the credential payload, and the token cache, so
/// callers hold one cloned handle and ask for [`valid_token`](TokenBroker::valid_token) whenever
/// they are about to talk to the Flex API. Clones share cache and in-flight state.
#[derive(Clone)]
pub struct TokenBroker<C>
where
	C: ?Sized + AuthHttpClient,
{
	/// HTTP client used for every outbound request.
	pub http_client: Arc<C>,
	/// Identity endpoint receiving the credential POST.
	pub endpoint: Url,
	/// Safety margin applied to server-declared lifetimes.
	pub refresh_margin: Duration,
	/// Bound applied to every request.
	pub request_timeout: StdDuration,
	credentials: Credentials,
	state: Arc<Mutex<BrokerState>>,
}
impl<C> TokenBroker<C>
where
	C: ?Sized + AuthHttpClient,
{
	/// Creates a broker that reuses the caller-provided transport.
	pub fn with_http_client(
		endpoint: Url,
		credentials: Credentials,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			endpoint,
			refresh_margin: DEFAULT_REFRESH_MARGIN,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			credentials,
			state: Default::default(),
		}
	}

	/// Overrides the refresh margin (defaults to 300 seconds; negative values clamp to zero).
	pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
		self.refresh_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Overrides the request timeout (defaults to 10 seconds).
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Returns a token guaranteed valid at the time of return, or the error that the single
	/// underlying authentication attempt raised.
	///
	/// Expiry is checked lazily, only when a caller asks; there is no background timer. A failed
	/// attempt is never cached, so the next call after a failure starts fresh.
	pub async fn valid_token(&self) -> Result<TokenSecret> {
		let span = AuthSpan::new("valid_token");

		obs::record_auth_outcome(AuthOutcome::Attempt);

		let result = span.instrument(self.resolve_token()).await;

		match &result {
			Ok(_) => obs::record_auth_outcome(AuthOutcome::Success),
			Err(_) => obs::record_auth_outcome(AuthOutcome::Failure),
		}

		result
	}

	async fn resolve_token(&self) -> Result<TokenSecret> {
		// Decide the caller's role synchronously, before the first suspension point. Under a
		// preemptive scheduler this lock is what guarantees at most one in-flight request.
		let role = {
			let mut state = self.state.lock();

			if let Some(cached) = state
				.cached
				.as_ref()
				.filter(|token| token.is_valid_at(OffsetDateTime::now_utc()))
			{
				return Ok(cached.value.clone());
			}

			match state.in_flight.as_ref() {
				Some(flight) => CallerRole::Joiner(flight.clone()),
				None => {
					let flight = Flight::default();

					state.in_flight = Some(flight.clone());

					CallerRole::Initiator(flight)
				},
			}
		};

		match role {
			CallerRole::Joiner(flight) => flight.wait().await.clone().map(|token| token.value),
			CallerRole::Initiator(flight) => {
				let outcome = self.authenticate().await;

				{
					let mut state = self.state.lock();

					if let Ok(token) = &outcome {
						state.cached = Some(token.clone());
					}

					// Cleared on success and failure alike, so a later call may retry.
					state.in_flight = None;
				}

				let result = outcome.clone().map(|token| token.value);

				flight.set(outcome).await.ok();

				result
			},
		}
	}

	/// Performs one authentication request against the identity endpoint.
	async fn authenticate(&self) -> Result<CachedToken> {
		let issued_at = OffsetDateTime::now_utc();
		let reply = self
			.http_client
			.post_json(&self.endpoint, self.credentials.request_body(), self.request_timeout)
			.await?;

		if !reply.is_success() {
			return Err(Error::from_status(reply.status));
		}

		let grant = wire::decode_token_grant(&reply.body)?;

		Ok(CachedToken::from_lifetime(
			grant.token,
			issued_at,
			Duration::seconds(grant.expires_in),
			self.refresh_margin,
		))
	}
}
impl<C> Debug for TokenBroker<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenBroker")
			.field("endpoint", &self.endpoint.as_str())
			.field("refresh_margin", &self.refresh_margin)
			.field("request_timeout", &self.request_timeout)
			.field("credentials", &self.credentials)
			.finish()
	}
}
#[cfg(feature = "reqwest")]
impl TokenBroker<ReqwestAuthClient> {
	/// Creates a broker for the provided endpoint and credentials.
	///
	/// The broker provisions its own reqwest-backed transport so callers do not need to pass
	/// HTTP handles explicitly; use [`TokenBroker::with_http_client`] to share one instead.
	pub fn new(endpoint: Url, credentials: Credentials) -> Self {
		Self::with_http_client(endpoint, credentials, ReqwestAuthClient::default())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::{HttpFuture, HttpReply};

	struct StubClient;
	impl AuthHttpClient for StubClient {
		fn post_json<'a>(&'a self, _: &'a Url, _: Vec<u8>, _: StdDuration) -> HttpFuture<'a> {
			Box::pin(async { Ok(HttpReply { status: 200, body: Vec::new() }) })
		}

		fn get_with_token<'a>(
			&'a self,
			_: &'a Url,
			_: &'a str,
			_: StdDuration,
		) -> HttpFuture<'a> {
			Box::pin(async { Ok(HttpReply { status: 200, body: Vec::new() }) })
		}
	}

	fn build_broker() -> TokenBroker<StubClient> {
		TokenBroker::with_http_client(
			Url::parse("http://flex.local/v1.1/auth").expect("Fixture URL should parse."),
			Credentials::new("svc@example.com", "102030"),
			StubClient,
		)
	}

	#[test]
	fn builder_defaults_match_the_documented_constants() {
		let broker = build_broker();

		assert_eq!(broker.refresh_margin, Duration::seconds(300));
		assert_eq!(broker.request_timeout, StdDuration::from_secs(10));
	}

	#[test]
	fn negative_refresh_margin_clamps_to_zero() {
		let broker = build_broker().with_refresh_margin(Duration::seconds(-5));

		assert_eq!(broker.refresh_margin, Duration::ZERO);
	}

	#[test]
	fn debug_output_redacts_the_credential_secret() {
		let rendered = format!("{:?}", build_broker());

		assert!(rendered.contains("svc@example.com"));
		assert!(!rendered.contains("102030"));
	}
}
