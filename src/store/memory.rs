//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::Credentials,
	store::{CredentialStore, StoreFuture},
};

type StoreSlot = Arc<RwLock<Option<Credentials>>>;

/// Thread-safe storage backend that keeps credentials in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreSlot);
impl MemoryStore {
	/// Returns a synchronous snapshot of the stored unit, for test assertions.
	pub fn snapshot(&self) -> Option<Credentials> {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Option<Credentials>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn save(&self, credentials: Credentials) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(credentials);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = None;

			Ok(())
		})
	}
}
