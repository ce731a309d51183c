//! Broker-level error types shared across authentication and resource calls.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical broker error exposed by public APIs.
///
/// Every variant is terminal for the call that raised it; the broker never retries internally.
/// Variants carry plain strings instead of boxed sources so the enum stays `Clone`, which lets a
/// single settled authentication outcome fan out to every caller that joined the in-flight
/// request. Callers surface [`Display`] messages, not stack traces.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum Error {
	/// Upstream unreachable (connection refused, DNS failure, broken transport).
	#[error("Could not connect to the Flex API.")]
	Connection,
	/// Authentication endpoint missing upstream (HTTP 404).
	#[error("Authentication endpoint was not found.")]
	NotFound,
	/// Identity endpoint answered with a 5xx status.
	#[error("The Flex API reported an internal error.")]
	UpstreamServer,
	/// 2xx response missing `token` or `expiresIn` after shape normalization.
	#[error("The Flex API response is missing token or expiresIn: {detail}.")]
	ProtocolShape {
		/// Decode-level detail describing which field or shape failed.
		detail: String,
	},
	/// Any other non-2xx status.
	#[error("The Flex API returned HTTP {status}.")]
	Http {
		/// HTTP status code returned by the upstream endpoint.
		status: u16,
	},
	/// Request exceeded the configured bound.
	#[error("The Flex API did not answer within the configured timeout.")]
	Timeout,
	/// Local configuration problem (for example, a resource path that cannot be resolved
	/// against the configured base URL).
	#[error("Invalid broker configuration: {detail}.")]
	Config {
		/// Description of the configuration problem.
		detail: String,
	},
}
impl Error {
	/// Classifies a non-2xx HTTP status into the broker taxonomy.
	pub fn from_status(status: u16) -> Self {
		match status {
			404 => Self::NotFound,
			500..=599 => Self::UpstreamServer,
			_ => Self::Http { status },
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_classification_covers_taxonomy() {
		assert_eq!(Error::from_status(404), Error::NotFound);
		assert_eq!(Error::from_status(500), Error::UpstreamServer);
		assert_eq!(Error::from_status(503), Error::UpstreamServer);
		assert_eq!(Error::from_status(403), Error::Http { status: 403 });
	}

	#[test]
	fn messages_stay_human_readable() {
		assert_eq!(Error::Connection.to_string(), "Could not connect to the Flex API.");
		assert_eq!(
			Error::Http { status: 418 }.to_string(),
			"The Flex API returned HTTP 418.",
		);
	}
}
