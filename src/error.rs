//! Client-level error types shared across the transport, store, and session layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS); the request never produced a response.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The server answered with a non-401 error status; interpretation is left to the caller.
	#[error("Server responded with status {status}.")]
	Server {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Raw response body for domain-specific interpretation.
		body: String,
	},
	/// A 401 that could not be resolved by refresh, or the refresh itself failed.
	///
	/// By the time a caller observes this variant the credential store has been
	/// cleared; no stale token survives a failed renewal.
	#[error("Request could not be authorized: {reason}.")]
	Unauthorized {
		/// Client- or server-supplied reason string.
		reason: String,
	},
	/// An issuance or refresh endpoint returned a payload that could not be decoded.
	#[error("Endpoint returned a malformed JSON payload.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the offending response, when available.
		status: Option<u16>,
	},
}
impl Error {
	/// Builds an [`Error::Unauthorized`] from any displayable reason.
	pub fn unauthorized(reason: impl Into<String>) -> Self {
		Self::Unauthorized { reason: reason.into() }
	}

	/// Returns `true` when the failure implies the session has been terminated.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized { .. })
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// The configured base address cannot be parsed as a URL.
	#[error("Base address `{value}` is not a valid URL.")]
	InvalidBaseUrl {
		/// Offending configuration value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The configured base address cannot serve as a join base (e.g. `mailto:`).
	#[error("Base address `{value}` cannot anchor relative endpoint paths.")]
	CannotBeBase {
		/// Offending configuration value.
		value: String,
	},
	/// A resource path could not be joined onto the base address.
	#[error("Endpoint path `{path}` is invalid.")]
	InvalidPath {
		/// Offending resource path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A request payload could not be encoded as JSON before sending.
	#[error("Request payload could not be encoded as JSON.")]
	InvalidPayload {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// The issuance endpoint returned a token pair without an access token value.
	#[error("Issuance response is missing the access token.")]
	MissingAccessToken,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
