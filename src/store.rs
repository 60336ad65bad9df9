//! Storage contracts and built-in credential store implementations.
//!
//! The store is deliberately dumb: it persists the atomic [`Credentials`] unit
//! and knows nothing about refresh policy. Injecting the store into the client
//! and session layers keeps the core free of any hidden storage substrate, so
//! tests run against [`MemoryStore`] while applications use [`FileStore`].

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::Credentials};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for session credentials.
///
/// `save` replaces the whole unit and `clear` removes it; there is no partial
/// mutation, which is what keeps the access-token/identity pairing atomic.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the stored credential unit, if a session is active.
	fn load(&self) -> StoreFuture<'_, Option<Credentials>>;

	/// Persists or replaces the credential unit.
	fn save(&self, credentials: Credentials) -> StoreFuture<'_, ()>;

	/// Removes the credential unit entirely.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unreachable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("disk unreachable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
