#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use central_client::{
	_preludet::*,
	client::ReqwestApiClient,
	config::ApiConfig,
	session::ReqwestSession,
	store::{CredentialStore, MemoryStore},
};

#[tokio::test]
async fn login_request_refresh_logout_round_trip() {
	let server = MockServer::start_async().await;
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();
	let config =
		ApiConfig::parse(&server.url("/api/")).expect("Test base URL should parse successfully.");
	let session = ReqwestSession::new(config.clone(), store.clone());
	let client = ReqwestApiClient::new(config, store).expect("Client should build successfully.");

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(200).header("content-type", "application/json").body(
				"{\"access\":\"T1\",\"refresh\":\"R1\",\"user\":{\"email\":\"a@b.com\",\"role\":\"member\"}}",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/announcements/").header("authorization", "Bearer T1");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh/").json_body(json!({ "refresh": "R1" }));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"T2\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/attendance/check_in/")
				.header("authorization", "Bearer T1");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Token is invalid or expired\"}");
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/churches/1/my_role/");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Authentication credentials were not provided.\"}");
		})
		.await;

	let check_in_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/attendance/check_in/")
				.header("authorization", "Bearer T2");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"success\":true,\"status\":\"in\"}");
		})
		.await;
	let identity = session.login("a@b.com", "pw").await.expect("Login should succeed.");

	assert_eq!(identity.email, "a@b.com");

	let announcements =
		client.get("announcements/").await.expect("The first request should succeed.");

	assert_eq!(announcements.status, 200);

	// The access token has expired by now; the check-in transparently renews it.
	let check_in = client
		.post("attendance/check_in/", json!({ "event_id": 3 }))
		.await
		.expect("The retried check-in should succeed.");

	assert_eq!(check_in.status, 200);

	check_in_mock.assert_async().await;

	let snapshot =
		store_backend.snapshot().expect("The renewed credentials should be stored.");

	assert_eq!(snapshot.access.expose(), "T2");
	assert_eq!(snapshot.identity.email, "a@b.com");

	session.logout().await;

	assert!(store_backend.snapshot().is_none());

	let err = client
		.get("churches/1/my_role/")
		.await
		.expect_err("Requests after logout should not be authorized.");

	assert!(err.is_unauthorized());
}

#[tokio::test]
async fn requests_without_a_session_fail_without_touching_the_refresh_endpoint() {
	let server = MockServer::start_async().await;
	let (client, store) = build_test_client(&server.url("/api/"));

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/events/");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Authentication credentials were not provided.\"}");
		})
		.await;

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"T2\"}");
		})
		.await;
	let err = client
		.get("events/")
		.await
		.expect_err("An unauthenticated request hitting a 401 should fail.");

	assert!(err.is_unauthorized());

	refresh_mock.assert_calls_async(0).await;

	assert!(store.snapshot().is_none());
}
