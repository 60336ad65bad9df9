//! Authenticated HTTP client for the Central community platform: transparent bearer-token
//! refresh, singleflight renewal, and pluggable credential stores.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod refresh;
pub mod session;
pub mod store;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers shared by the crate's integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{Credentials, Identity, TokenSecret},
		client::ReqwestApiClient,
		config::ApiConfig,
		session::ReqwestSession,
		store::{CredentialStore, MemoryStore},
	};

	/// Builds a client backed by an in-memory store and the default reqwest transport.
	pub fn build_test_client(base_url: &str) -> (ReqwestApiClient, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let config =
			ApiConfig::parse(base_url).expect("Test base URL should parse successfully.");
		let client = ReqwestApiClient::new(config, store)
			.expect("Test client should build successfully.");

		(client, store_backend)
	}

	/// Builds a session facade sharing an in-memory store with integration tests.
	pub fn build_test_session(base_url: &str) -> (ReqwestSession, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let config =
			ApiConfig::parse(base_url).expect("Test base URL should parse successfully.");

		(ReqwestSession::new(config, store), store_backend)
	}

	/// Seeds the provided store with a fixture credential unit.
	pub async fn seed_credentials(
		store: &MemoryStore,
		access: &str,
		refresh: Option<&str>,
		email: &str,
	) {
		store
			.save(Credentials::new(
				TokenSecret::new(access),
				refresh.map(TokenSecret::new),
				Identity::from_email(email),
			))
			.await
			.expect("Failed to seed fixture credentials into the store.");
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
#[cfg(test)] use tracing_subscriber as _;
