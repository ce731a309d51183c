//! Credential and cached-token models for the Flex identity endpoint.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Fixed credential payload presented to the Flex identity endpoint.
///
/// This is a service credential for the third-party system, entirely separate from whatever
/// session the surrounding application maintains for its own users.
#[derive(Clone)]
pub struct Credentials {
	identifier: String,
	secret: String,
}
impl Credentials {
	/// Creates a credential pair from the Flex account identifier and secret.
	pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { identifier: identifier.into(), secret: secret.into() }
	}

	/// Renders the JSON body sent to the identity endpoint.
	///
	/// The endpoint expects the Portuguese field names `usuario` and `senha`.
	pub(crate) fn request_body(&self) -> Vec<u8> {
		serde_json::json!({ "usuario": self.identifier, "senha": self.secret })
			.to_string()
			.into_bytes()
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("identifier", &self.identifier)
			.field("secret", &"<redacted>")
			.finish()
	}
}

/// Cached bearer token with its margin-adjusted expiry instant.
///
/// Records are created on successful authentication, replaced wholesale by the next successful
/// authentication, and never mutated in place.
#[derive(Clone, Debug)]
pub struct CachedToken {
	/// Token value used verbatim in the Flex `token` request header.
	pub value: TokenSecret,
	/// Instant after which the token must not be used.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Builds a record from a server-declared lifetime.
	///
	/// The refresh margin is subtracted up front, so the record reads as invalid before the
	/// server would actually reject the token and refresh happens proactively.
	pub fn from_lifetime(
		value: impl Into<String>,
		issued_at: OffsetDateTime,
		expires_in: Duration,
		margin: Duration,
	) -> Self {
		Self { value: TokenSecret::new(value), expires_at: issued_at + expires_in - margin }
	}

	/// Returns `true` while the margin-adjusted expiry has not passed.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.expires_at
	}
}
