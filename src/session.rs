//! Login, registration, and logout around the credential store.
//!
//! The facade owns the one-time credential bootstrap: it exchanges an
//! identifier and secret for a token pair, seeds the injected store with the
//! access token, refresh token, and identity as one atomic unit, and exposes
//! the current identity to callers. Logout clears the store unconditionally
//! and never fails.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Identity, IssuedCredentials, TokenSecret},
	config::ApiConfig,
	error::ConfigError,
	http::{ApiRequest, ApiResponse, Method, Transport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Session facade specialized for the crate's default reqwest transport.
pub type ReqwestSession = Session<ReqwestTransport>;

/// Payload for registering a new church together with its first account.
#[derive(Clone, Debug, Serialize)]
pub struct ChurchRegistration {
	/// Church display name.
	pub church_name: String,
	/// Church location.
	pub location: String,
	/// Denomination label.
	pub denomination: String,
	/// Congregation size estimate.
	pub size: u32,
	/// Full name of the founding account.
	pub full_name: String,
	/// Email for the founding account.
	pub email: String,
	/// Password for the founding account.
	pub password: String,
}

/// Payload for joining an existing church as a member.
#[derive(Clone, Debug, Serialize)]
pub struct MemberRegistration {
	/// Full name of the new member.
	pub full_name: String,
	/// Email for the new account.
	pub email: String,
	/// Password for the new account.
	pub password: String,
	/// Identifier of the church being joined.
	pub church_id: u64,
}

/// Login/logout/registration facade seeding the credential store.
pub struct Session<T>
where
	T: ?Sized + Transport,
{
	config: ApiConfig,
	transport: Arc<T>,
	store: Arc<dyn CredentialStore>,
}
impl<T> Session<T>
where
	T: ?Sized + Transport,
{
	/// Creates a facade sharing the transport and store with an
	/// [`ApiClient`](crate::client::ApiClient).
	pub fn with_transport(
		config: ApiConfig,
		store: Arc<dyn CredentialStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self { config, transport: transport.into(), store }
	}

	/// Exchanges an email and password for a credential pair and seeds the store.
	///
	/// The issuance endpoint may omit the `user` record (older deployments
	/// return only the token pair); the identity then falls back to the
	/// submitted email so the store never holds a token without an identity.
	pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.config.token_endpoint()?;
				let body = serde_json::json!({ "email": email, "password": password });
				let issued = self.issue(url, body).await?;
				let fallback = Identity::from_email(email);

				self.seed(issued, fallback).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Registers a new church and seeds the store with the issued credentials.
	pub async fn register_church(&self, registration: ChurchRegistration) -> Result<Identity> {
		let url = self.config.register_church_endpoint()?;

		self.register(url, &registration, &registration.email).await
	}

	/// Joins an existing church and seeds the store with the issued credentials.
	pub async fn register_member(&self, registration: MemberRegistration) -> Result<Identity> {
		let url = self.config.register_member_endpoint()?;

		self.register(url, &registration, &registration.email).await
	}

	/// Clears the credential store unconditionally.
	///
	/// Logout never fails; a store error is logged and swallowed because the
	/// caller's session is over either way.
	pub async fn logout(&self) {
		if let Err(_e) = self.store.clear().await {
			#[cfg(feature = "tracing")]
			tracing::warn!(error = %_e, "Failed to clear the credential store on logout.");
		}
	}

	/// Returns the identity of the active session, if any.
	pub async fn current_identity(&self) -> Result<Option<Identity>> {
		Ok(self.store.load().await.map_err(Error::from)?.map(|unit| unit.identity))
	}

	async fn register<P>(&self, url: Url, registration: &P, email: &str) -> Result<Identity>
	where
		P: Serialize,
	{
		const KIND: FlowKind = FlowKind::Register;

		let span = FlowSpan::new(KIND, "register");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let body = serde_json::to_value(registration)
					.map_err(|e| ConfigError::InvalidPayload { source: e })?;
				let issued = self.issue(url, body).await?;
				let fallback = Identity::from_email(email);

				self.seed(issued, fallback).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn issue(&self, url: Url, body: serde_json::Value) -> Result<IssuedCredentials> {
		let request = ApiRequest::new(Method::Post, url).with_json(body);
		let response = self.transport.send(request).await.map_err(Error::from)?;

		if !response.is_success() {
			return Err(Self::issuance_failure(response));
		}

		let issued = response.json::<IssuedCredentials>()?;

		if issued.access.is_empty() {
			return Err(ConfigError::MissingAccessToken.into());
		}

		Ok(issued)
	}

	// Seeds the store with the token pair and identity as one atomic unit.
	async fn seed(&self, issued: IssuedCredentials, fallback: Identity) -> Result<Identity> {
		let identity = issued.user.unwrap_or(fallback);
		let credentials = Credentials::new(
			TokenSecret::new(issued.access),
			Some(TokenSecret::new(issued.refresh)),
			identity.clone(),
		);

		self.store.save(credentials).await.map_err(Error::from)?;

		Ok(identity)
	}

	// Issuance rejections are surfaced as-is; a 401 here means bad submitted
	// credentials, not an expired bearer token, so it never triggers refresh.
	fn issuance_failure(response: ApiResponse) -> Error {
		Error::Server { status: response.status, body: response.text() }
	}
}
#[cfg(feature = "reqwest")]
impl Session<ReqwestTransport> {
	/// Creates a facade that provisions its own reqwest-backed transport.
	pub fn new(config: ApiConfig, store: Arc<dyn CredentialStore>) -> Self {
		Self::with_transport(config, store, ReqwestTransport::default())
	}
}
impl<T> Debug for Session<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session").field("config", &self.config).finish()
	}
}
