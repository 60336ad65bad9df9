//! Transport primitives for Central API requests.
//!
//! The module exposes [`Transport`] as the crate's only dependency on an HTTP
//! stack. A transport executes exactly one request and reports the structured
//! outcome: well-formed error responses (4xx/5xx) are successful transport
//! results carrying an error status, and only transport-level faults (DNS,
//! connection reset, timeout) surface as [`TransportError`]. All retry policy
//! lives above this layer, in [`ApiClient`](crate::client::ApiClient).

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, auth::TokenSecret, error::TransportError};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing a single API request.
///
/// Implementations must be `Send + Sync` so they can be shared behind `Arc`
/// across concurrently issued requests, and the returned futures must be
/// `Send` so callers can hop executors freely. Implementations never retry
/// and never treat an HTTP error status as a failure.
pub trait Transport
where
	Self: Send + Sync,
{
	/// Executes the request and returns the structured response.
	fn send(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// HTTP methods used against the Central API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// HTTP GET.
	Get,
	/// HTTP POST.
	Post,
	/// HTTP PUT.
	Put,
	/// HTTP PATCH.
	Patch,
	/// HTTP DELETE.
	Delete,
}
impl Method {
	/// Returns the canonical uppercase method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// A single outbound request, owning everything needed to replay it.
#[derive(Clone)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Fully resolved endpoint URL.
	pub url: Url,
	/// Bearer credential stamped into the authorization header, if any.
	pub bearer: Option<TokenSecret>,
	/// JSON body, if any.
	pub body: Option<serde_json::Value>,
}
impl ApiRequest {
	/// Creates a bare request for the provided method and URL.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, bearer: None, body: None }
	}

	/// Attaches (or replaces) the bearer credential.
	pub fn with_bearer(mut self, bearer: TokenSecret) -> Self {
		self.bearer = Some(bearer);

		self
	}

	/// Attaches a JSON body.
	pub fn with_json(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);

		self
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
			.field("body_set", &self.body.is_some())
			.finish()
	}
}

/// Structured response produced by a [`Transport`].
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` exactly when the endpoint rejected the bearer credential.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Renders the body as lossy UTF-8 for error reporting.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the failing path on malformed payloads.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|e| Error::Decode { source: e, status: Some(self.status) })
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				Method::Get => reqwest::Method::GET,
				Method::Post => reqwest::Method::POST,
				Method::Put => reqwest::Method::PUT,
				Method::Patch => reqwest::Method::PATCH,
				Method::Delete => reqwest::Method::DELETE,
			};
			let mut builder = client.request(method, request.url);

			if let Some(bearer) = &request.bearer {
				builder = builder.bearer_auth(bearer.expose());
			}
			if let Some(body) = &request.body {
				builder = builder.json(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(ApiResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn method_labels_are_canonical() {
		assert_eq!(Method::Get.as_str(), "GET");
		assert_eq!(Method::Delete.to_string(), "DELETE");
	}

	#[test]
	fn response_predicates_follow_status() {
		let ok = ApiResponse { status: 204, body: Vec::new() };

		assert!(ok.is_success());
		assert!(!ok.is_unauthorized());

		let unauthorized = ApiResponse { status: 401, body: b"{}".to_vec() };

		assert!(!unauthorized.is_success());
		assert!(unauthorized.is_unauthorized());
	}

	#[test]
	fn json_decoding_reports_status_on_malformed_payloads() {
		let response = ApiResponse { status: 200, body: b"not-json".to_vec() };
		let err = response
			.json::<serde_json::Value>()
			.expect_err("Malformed payload should fail to decode.");

		assert!(matches!(err, Error::Decode { status: Some(200), .. }));
	}

	#[test]
	fn request_debug_redacts_bearer() {
		let url = Url::parse("http://127.0.0.1:8000/api/events/")
			.expect("Request fixture URL should parse.");
		let request = ApiRequest::new(Method::Get, url).with_bearer(TokenSecret::new("T1"));
		let rendered = format!("{request:?}");

		assert!(!rendered.contains("T1"));
		assert!(rendered.contains("<redacted>"));
	}
}
