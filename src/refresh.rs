//! Bearer-token renewal with singleflight coordination.
//!
//! The coordinator exposes [`RefreshCoordinator::refreshed_access_token`] so
//! any number of concurrently failing requests can ask for a fresh token
//! without stampeding the refresh endpoint. Callers queue on an async guard in
//! insertion order; the first caller through performs the
//! `POST token/refresh/` call and publishes the outcome to the credential
//! store, and every queued waiter then observes that settled outcome instead
//! of starting a renewal of its own. A failed renewal clears the store before
//! any waiter resumes, so all of them fail together and no stale token
//! lingers.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{RefreshedToken, TokenSecret},
	http::{ApiRequest, Method, Transport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::CredentialStore,
};

/// Renewal phase of the coordinator; a single process-wide instance, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshState {
	/// No renewal call is outstanding.
	Idle,
	/// A renewal call to the refresh endpoint is in flight.
	Refreshing,
}
impl RefreshState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshState::Idle => "idle",
			RefreshState::Refreshing => "refreshing",
		}
	}
}
impl Display for RefreshState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Serializes token renewal across concurrently failing requests.
pub struct RefreshCoordinator<T>
where
	T: ?Sized + Transport,
{
	transport: Arc<T>,
	store: Arc<dyn CredentialStore>,
	endpoint: Url,
	// Waiter queue; acquisition order is insertion order.
	queue: AsyncMutex<()>,
	state: Mutex<RefreshState>,
	metrics: Arc<RefreshMetrics>,
}
impl<T> RefreshCoordinator<T>
where
	T: ?Sized + Transport,
{
	/// Creates a coordinator bound to a transport, store, and refresh endpoint.
	pub fn new(transport: Arc<T>, store: Arc<dyn CredentialStore>, endpoint: Url) -> Self {
		Self {
			transport,
			store,
			endpoint,
			queue: AsyncMutex::new(()),
			state: Mutex::new(RefreshState::Idle),
			metrics: Default::default(),
		}
	}

	/// Returns the current renewal phase.
	pub fn state(&self) -> RefreshState {
		*self.state.lock()
	}

	/// Shared counters for renewal outcomes.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Resolves a rejected bearer credential into a fresh access token.
	///
	/// `stale` is the token the caller was using when it observed the 401; it
	/// is how the coordinator tells a genuine renewal request from a waiter
	/// that queued behind one which already settled. At most one renewal call
	/// reaches the transport regardless of how many callers arrive here
	/// concurrently.
	pub async fn refreshed_access_token(&self, stale: &str) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refreshed_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.renew(stale)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn renew(&self, stale: &str) -> Result<TokenSecret> {
		self.metrics.record_attempt();

		let _queue_slot = self.queue.lock().await;
		let current = self.store.load().await.map_err(Error::from)?;
		let Some(mut credentials) = current else {
			self.metrics.record_failure();

			return Err(Error::unauthorized("no session credentials are stored"));
		};

		// A renewal that settled while this caller was queued already
		// published a newer token; hand it out without touching the transport.
		if credentials.access.expose() != stale {
			self.metrics.record_coalesced();

			return Ok(credentials.access.clone());
		}

		let Some(refresh) = credentials.refresh.clone() else {
			self.store.clear().await.map_err(Error::from)?;
			self.metrics.record_failure();

			return Err(Error::unauthorized("no refresh token is stored"));
		};

		*self.state.lock() = RefreshState::Refreshing;

		let outcome = self.call_refresh_endpoint(&refresh).await;

		*self.state.lock() = RefreshState::Idle;

		match outcome {
			Ok(renewed) => {
				let access = TokenSecret::new(renewed.access);

				credentials.rotate(access.clone(), renewed.refresh.map(TokenSecret::new));
				self.store.save(credentials).await.map_err(|e| {
					self.metrics.record_failure();

					Error::from(e)
				})?;
				self.metrics.record_success();

				Ok(access)
			},
			Err(err) => {
				// The store must be empty before any waiter resumes; a clear
				// failure here cannot change the outcome the caller sees.
				let _ = self.store.clear().await;

				self.metrics.record_failure();

				Err(err)
			},
		}
	}

	async fn call_refresh_endpoint(&self, refresh: &TokenSecret) -> Result<RefreshedToken> {
		let request = ApiRequest::new(Method::Post, self.endpoint.clone())
			.with_json(serde_json::json!({ "refresh": refresh.expose() }));
		let response = match self.transport.send(request).await {
			Ok(response) => response,
			Err(e) => return Err(Error::unauthorized(format!("token renewal failed: {e}"))),
		};

		if !response.is_success() {
			return Err(Error::unauthorized(format!(
				"refresh endpoint responded with status {}",
				response.status,
			)));
		}

		response
			.json::<RefreshedToken>()
			.map_err(|e| Error::unauthorized(format!("refresh response could not be decoded: {e}")))
	}
}
impl<T> Debug for RefreshCoordinator<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("endpoint", &self.endpoint.as_str())
			.field("state", &self.state())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn state_labels_are_stable() {
		assert_eq!(RefreshState::Idle.as_str(), "idle");
		assert_eq!(RefreshState::Refreshing.to_string(), "refreshing");
	}
}
