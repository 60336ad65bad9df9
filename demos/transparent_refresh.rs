//! Demonstrates logging in against a mock Central backend and letting the client resolve an
//! expired bearer token transparently when a resource endpoint answers with a 401.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use central_client::{
	client::ReqwestApiClient,
	config::ApiConfig,
	session::ReqwestSession,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(200).header("content-type", "application/json").body(
				"{\"access\":\"demo-access\",\"refresh\":\"demo-refresh\",\"user\":{\"email\":\"demo@central.dev\",\"role\":\"member\"}}",
			);
		})
		.await;
	// The seeded access token is already expired from the backend's point of view.
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/events/")
				.header("authorization", "Bearer demo-access");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Token is invalid or expired\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/token/refresh/")
				.json_body(json!({ "refresh": "demo-refresh" }));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"demo-renewed\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/events/")
				.header("authorization", "Bearer demo-renewed");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":1,\"title\":\"Sunday Service\"}]");
		})
		.await;

	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let config = ApiConfig::parse(&server.url("/api/"))?;
	let session = ReqwestSession::new(config.clone(), store.clone());
	let client = ReqwestApiClient::new(config, store)?;
	let identity = session.login("demo@central.dev", "password").await?;

	println!("Signed in as {}.", identity.email);

	let events = client.get("events/").await?;

	println!("Fetched events after a transparent renewal: {}.", events.text());

	let metrics = client.coordinator().metrics();

	println!(
		"Renewal attempts: {}, endpoint calls that succeeded: {}.",
		metrics.attempts(),
		metrics.successes(),
	);

	session.logout().await;

	println!(
		"Signed out; stored identity is now {:?}.",
		session.current_identity().await?,
	);

	Ok(())
}
