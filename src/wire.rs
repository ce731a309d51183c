//! Wire types for the Flex identity endpoint, including response-shape normalization.

// self
use crate::_prelude::*;

/// Token grant declared by the identity endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
	/// Opaque bearer token value.
	pub token: String,
	/// Server-declared token lifetime in seconds.
	#[serde(rename = "expiresIn")]
	pub expires_in: i64,
}

#[derive(Deserialize)]
struct EnvelopedGrant {
	response: TokenGrant,
}

/// Decodes an identity-endpoint success body into a normalized [`TokenGrant`].
///
/// The endpoint answers in two shapes: the grant nested one level under a `response` key, or the
/// same fields flat at the top level. The nested shape is attempted first, the flat one second;
/// both normalize to the same grant. Anything else is a protocol-shape failure, distinct from
/// network and HTTP-status errors. An empty `token` or a non-positive `expiresIn` also counts as
/// missing, matching the endpoint's observed contract.
pub fn decode_token_grant(body: &[u8]) -> Result<TokenGrant> {
	let grant = match decode_json::<EnvelopedGrant>(body) {
		Ok(envelope) => envelope.response,
		Err(nested_error) => decode_json::<TokenGrant>(body).map_err(|_| Error::ProtocolShape {
			// The nested attempt names the missing field relative to `response`, which reads
			// better than the flat attempt's complaint about an unexpected `response` key.
			detail: nested_error,
		})?,
	};

	if grant.token.is_empty() {
		return Err(Error::ProtocolShape { detail: "token is empty".into() });
	}
	if grant.expires_in <= 0 {
		return Err(Error::ProtocolShape { detail: "expiresIn is not positive".into() });
	}

	Ok(grant)
}

/// Decodes a JSON body with path-aware diagnostics rendered into a plain string.
pub(crate) fn decode_json<T>(body: &[u8]) -> Result<T, String>
where
	T: for<'de> Deserialize<'de>,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|e| e.to_string())
}
