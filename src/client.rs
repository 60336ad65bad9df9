//! Authenticated request facade with transparent bearer-token refresh.
//!
//! [`ApiClient::request`] stamps the stored access token onto every outgoing
//! request, treats a 401 as the sole signal that the token expired, resolves
//! it through the [`RefreshCoordinator`], and replays the request exactly
//! once with the renewed token. Every other error status is surfaced as-is;
//! retry policy never lives below this layer and never loops above it.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::ApiConfig,
	http::{ApiRequest, ApiResponse, Method, Transport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	refresh::RefreshCoordinator,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Authenticated HTTP client for the Central API.
///
/// The client owns the transport, credential store, and refresh coordinator
/// so call sites only deal in methods, resource paths, and JSON bodies. It is
/// cheap to share behind `Arc` across concurrently issued requests; the
/// coordinator guarantees those requests renew an expired token exactly once
/// between them.
pub struct ApiClient<T>
where
	T: ?Sized + Transport,
{
	config: ApiConfig,
	transport: Arc<T>,
	store: Arc<dyn CredentialStore>,
	coordinator: RefreshCoordinator<T>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + Transport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		config: ApiConfig,
		store: Arc<dyn CredentialStore>,
		transport: impl Into<Arc<T>>,
	) -> Result<Self> {
		let transport = transport.into();
		let refresh_endpoint = config.refresh_endpoint()?;
		let coordinator =
			RefreshCoordinator::new(transport.clone(), store.clone(), refresh_endpoint);

		Ok(Self { config, transport, store, coordinator })
	}

	/// Returns the endpoint configuration.
	pub fn config(&self) -> &ApiConfig {
		&self.config
	}

	/// Returns the injected credential store.
	pub fn store(&self) -> &Arc<dyn CredentialStore> {
		&self.store
	}

	/// Returns the refresh coordinator, e.g. to inspect its renewal counters.
	pub fn coordinator(&self) -> &RefreshCoordinator<T> {
		&self.coordinator
	}

	/// Issues an authenticated request against a resource path.
	///
	/// Fails with [`Error::Unauthorized`] when no renewal could resolve a 401,
	/// [`Error::Server`] for non-401 4xx/5xx statuses, and
	/// [`Error::Transport`] when the endpoint was unreachable. An
	/// `Unauthorized` outcome always implies the credential store has been
	/// cleared.
	pub async fn request(
		&self,
		method: Method,
		path: &str,
		body: Option<serde_json::Value>,
	) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "request");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.config.endpoint(path)?;
				let access =
					self.store.load().await.map_err(Error::from)?.map(|unit| unit.access);
				let mut request = ApiRequest::new(method, url);

				if let Some(body) = body {
					request = request.with_json(body);
				}

				let first = {
					let mut attempt = request.clone();

					if let Some(access) = &access {
						attempt = attempt.with_bearer(access.clone());
					}

					self.transport.send(attempt).await.map_err(Error::from)?
				};

				if !first.is_unauthorized() {
					return Self::classify(first);
				}

				// The coordinator either hands back a token at least as fresh
				// as the one that just failed, or terminates the session.
				let stale = access.as_ref().map(TokenSecret::expose).unwrap_or_default();
				let renewed = self.coordinator.refreshed_access_token(stale).await?;
				let second =
					self.transport.send(request.with_bearer(renewed)).await.map_err(Error::from)?;

				if second.is_unauthorized() {
					// The renewed token itself was rejected; terminate the
					// session rather than entering a second renewal cycle.
					let _ = self.store.clear().await;

					return Err(Error::unauthorized(
						"renewed token was rejected by the resource endpoint",
					));
				}

				Self::classify(second)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Issues an authenticated GET request.
	pub async fn get(&self, path: &str) -> Result<ApiResponse> {
		self.request(Method::Get, path, None).await
	}

	/// Issues an authenticated POST request with a JSON body.
	pub async fn post(&self, path: &str, body: serde_json::Value) -> Result<ApiResponse> {
		self.request(Method::Post, path, Some(body)).await
	}

	/// Issues an authenticated PUT request with a JSON body.
	pub async fn put(&self, path: &str, body: serde_json::Value) -> Result<ApiResponse> {
		self.request(Method::Put, path, Some(body)).await
	}

	/// Issues an authenticated DELETE request.
	pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
		self.request(Method::Delete, path, None).await
	}

	// Non-401 statuses only; 401 is handled by the renewal path above.
	fn classify(response: ApiResponse) -> Result<ApiResponse> {
		if response.status >= 400 {
			Err(Error::Server { status: response.status, body: response.text() })
		} else {
			Ok(response)
		}
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client that provisions its own reqwest-backed transport.
	pub fn new(config: ApiConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
		Self::with_transport(config, store, ReqwestTransport::default())
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("config", &self.config)
			.field("coordinator", &self.coordinator)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[cfg(feature = "reqwest")]
	#[test]
	fn classification_splits_on_status() {
		let ok = ApiResponse { status: 200, body: b"[]".to_vec() };

		assert!(ApiClient::<crate::http::ReqwestTransport>::classify(ok).is_ok());

		let err = ApiResponse { status: 500, body: b"boom".to_vec() };
		let err = ApiClient::<crate::http::ReqwestTransport>::classify(err)
			.expect_err("5xx must classify as a server error.");

		assert!(matches!(err, Error::Server { status: 500, .. }));
	}
}
