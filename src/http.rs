//! Transport primitives for identity and resource calls.
//!
//! The module exposes [`AuthHttpClient`] so downstream crates can integrate custom HTTP stacks.
//! Implementations translate their transport-level failures into the broker taxonomy
//! ([`Error::Connection`], [`Error::Timeout`]) and hand every upstream status back as an
//! [`HttpReply`]; status classification and body decoding stay with the caller.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::CONTENT_TYPE;
// self
use crate::_prelude::*;

/// Boxed future returned by [`AuthHttpClient`] implementations.
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpReply>> + 'a + Send>>;

/// Status and body captured from an upstream response.
#[derive(Clone, Debug)]
pub struct HttpReply {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpReply {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Abstraction over HTTP transports capable of talking to the Flex API.
///
/// The trait is the broker's only dependency on an HTTP stack. Callers provide an implementation
/// (typically behind `Arc<T>`) and the broker issues identity and resource requests through it.
/// Implementations must be `Send + Sync + 'static` so a broker can be shared across tasks, and
/// the returned futures must be `Send` for the lifetime of the in-flight call.
pub trait AuthHttpClient
where
	Self: 'static + Send + Sync,
{
	/// POSTs a JSON body to `url`, bounded by `timeout`.
	///
	/// # Error Contract
	///
	/// - An unreachable upstream maps to [`Error::Connection`].
	/// - An elapsed bound maps to [`Error::Timeout`].
	/// - Non-2xx statuses are returned as ordinary replies, never as errors.
	fn post_json<'a>(&'a self, url: &'a Url, body: Vec<u8>, timeout: StdDuration)
	-> HttpFuture<'a>;

	/// GETs a resource from `url`, carrying the Flex `token` header, bounded by `timeout`.
	///
	/// Follows the same error contract as [`post_json`](AuthHttpClient::post_json).
	fn get_with_token<'a>(
		&'a self,
		url: &'a Url,
		token: &'a str,
		timeout: StdDuration,
	) -> HttpFuture<'a>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestAuthClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestAuthClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestAuthClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestAuthClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl AuthHttpClient for ReqwestAuthClient {
	fn post_json<'a>(
		&'a self,
		url: &'a Url,
		body: Vec<u8>,
		timeout: StdDuration,
	) -> HttpFuture<'a> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client
				.post(url.clone())
				.header(CONTENT_TYPE, "application/json")
				.body(body)
				.timeout(timeout)
				.send()
				.await
				.map_err(map_reqwest_error)?;

			collect(response).await
		})
	}

	fn get_with_token<'a>(
		&'a self,
		url: &'a Url,
		token: &'a str,
		timeout: StdDuration,
	) -> HttpFuture<'a> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client
				.get(url.clone())
				.header(CONTENT_TYPE, "application/json")
				.header("token", token)
				.timeout(timeout)
				.send()
				.await
				.map_err(map_reqwest_error)?;

			collect(response).await
		})
	}
}

#[cfg(feature = "reqwest")]
async fn collect(response: reqwest::Response) -> Result<HttpReply> {
	let status = response.status().as_u16();
	let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

	Ok(HttpReply { status, body })
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_timeout() {
		return Error::Timeout;
	}

	// Connect failures and every other transport-level breakage read as "could not reach the
	// Flex API" to callers; statusful failures never take this path.
	Error::Connection
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn reply_success_covers_2xx_only() {
		assert!(HttpReply { status: 200, body: Vec::new() }.is_success());
		assert!(HttpReply { status: 204, body: Vec::new() }.is_success());
		assert!(!HttpReply { status: 199, body: Vec::new() }.is_success());
		assert!(!HttpReply { status: 300, body: Vec::new() }.is_success());
		assert!(!HttpReply { status: 500, body: Vec::new() }.is_success());
	}
}
