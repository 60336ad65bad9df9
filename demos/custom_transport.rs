//! Demonstrates plugging a custom [`Transport`] into the client without the reqwest backend.
//!
//! 1. Implement [`Transport`] for a handle that executes one request and returns the
//!    structured [`ApiResponse`], mapping only connection-level faults to [`TransportError`].
//! 2. Build the client with [`ApiClient::with_transport`]; the refresh coordinator reuses
//!    the same transport for its `POST token/refresh/` call.
//! 3. Seed the store and watch a 401 resolve through the custom transport end to end.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use central_client::{
	auth::{Credentials, Identity, TokenSecret},
	client::ApiClient,
	config::ApiConfig,
	error::TransportError,
	http::{ApiRequest, ApiResponse, Transport, TransportFuture},
	store::{CredentialStore, MemoryStore},
};

const STALE_ACCESS: &str = "stale-access";
const FRESH_ACCESS: &str = "fresh-access";

/// In-process backend standing in for a real HTTP stack.
struct ScriptedTransport;
impl ScriptedTransport {
	fn respond(&self, request: &ApiRequest) -> ApiResponse {
		if request.url.path().ends_with("/token/refresh/") {
			return ApiResponse {
				status: 200,
				body: format!("{{\"access\":\"{FRESH_ACCESS}\"}}").into_bytes(),
			};
		}

		match request.bearer.as_ref().map(TokenSecret::expose) {
			Some(FRESH_ACCESS) => ApiResponse {
				status: 200,
				body: b"[{\"id\":1,\"title\":\"Sunday Service\"}]".to_vec(),
			},
			_ => ApiResponse {
				status: 401,
				body: b"{\"detail\":\"Token is invalid or expired\"}".to_vec(),
			},
		}
	}
}
impl Transport for ScriptedTransport {
	fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
		let response = self.respond(&request);

		Box::pin(async move { Ok::<_, TransportError>(response) })
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();

	store
		.save(Credentials::new(
			TokenSecret::new(STALE_ACCESS),
			Some(TokenSecret::new("demo-refresh")),
			Identity::from_email("demo@central.dev"),
		))
		.await?;

	let config = ApiConfig::new(Url::parse("http://backend.internal/api/")?)?;
	let client = ApiClient::with_transport(config, store, ScriptedTransport)?;
	let events = client.get("events/").await?;

	println!("Resource fetched through the scripted transport: {}.", events.text());

	let snapshot = store_backend
		.snapshot()
		.ok_or_else(|| color_eyre::eyre::eyre!("renewal should leave credentials stored"))?;

	println!("Store now holds the renewed access token: {}.", snapshot.access.expose() == FRESH_ACCESS);

	Ok(())
}
