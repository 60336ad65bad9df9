//! Auth-domain token models, identities, and issuance payloads.

pub mod secret;

pub use secret::TokenSecret;

// self
use crate::_prelude::*;

/// Opaque identity record attached to an active session.
///
/// The client carries this value without interpreting it; `role` and any extra
/// fields are whatever the issuance endpoint chose to return.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
	/// Email or display handle identifying the signed-in principal.
	pub email: String,
	/// Role classification supplied by the backend, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<String>,
	/// Remaining issuance fields, carried opaquely.
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}
impl Identity {
	/// Builds an identity from a bare email handle.
	pub fn from_email(email: impl Into<String>) -> Self {
		Self { email: email.into(), role: None, extra: serde_json::Map::new() }
	}
}
impl Debug for Identity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Identity")
			.field("email", &self.email)
			.field("role", &self.role)
			.field("extra_fields", &self.extra.len())
			.finish()
	}
}

/// The atomic credential unit held by a [`CredentialStore`](crate::store::CredentialStore).
///
/// An active session always owns an access token and an identity together; the
/// store holds `Option<Credentials>` so neither can exist without the other.
/// Only the refresh token is optional within an active session.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
	/// Short-lived bearer credential stamped on every request.
	pub access: TokenSecret,
	/// Longer-lived credential used solely to mint new access tokens.
	pub refresh: Option<TokenSecret>,
	/// Identity record returned (or derived) at issuance time.
	pub identity: Identity,
	/// Instant at which the current access token was issued or renewed.
	pub issued_at: OffsetDateTime,
}
impl Credentials {
	/// Creates a credential unit stamped with the current clock.
	pub fn new(access: TokenSecret, refresh: Option<TokenSecret>, identity: Identity) -> Self {
		Self { access, refresh, identity, issued_at: OffsetDateTime::now_utc() }
	}

	/// Mutates the unit in place after a successful renewal.
	///
	/// The previous refresh token is kept when the endpoint did not rotate it.
	pub fn rotate(&mut self, access: TokenSecret, rotated_refresh: Option<TokenSecret>) {
		self.access = access;

		if rotated_refresh.is_some() {
			self.refresh = rotated_refresh;
		}

		self.issued_at = OffsetDateTime::now_utc();
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("access", &"<redacted>")
			.field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
			.field("identity", &self.identity)
			.field("issued_at", &self.issued_at)
			.finish()
	}
}

/// Wire payload returned by the issuance endpoints (`token/`, `signup/*`).
#[derive(Clone, Debug, Deserialize)]
pub struct IssuedCredentials {
	/// Access token value.
	pub access: String,
	/// Refresh token value.
	pub refresh: String,
	/// Identity record; the login endpoint may omit it.
	#[serde(default)]
	pub user: Option<Identity>,
}

/// Wire payload returned by the refresh endpoint (`token/refresh/`).
#[derive(Clone, Debug, Deserialize)]
pub struct RefreshedToken {
	/// Replacement access token value.
	pub access: String,
	/// Rotated refresh token, when the endpoint chose to rotate.
	#[serde(default)]
	pub refresh: Option<String>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn rotate_keeps_refresh_unless_rotated() {
		let mut credentials = Credentials::new(
			TokenSecret::new("T1"),
			Some(TokenSecret::new("R1")),
			Identity::from_email("a@b.com"),
		);

		credentials.rotate(TokenSecret::new("T2"), None);

		assert_eq!(credentials.access.expose(), "T2");
		assert_eq!(credentials.refresh.as_ref().map(TokenSecret::expose), Some("R1"));

		credentials.rotate(TokenSecret::new("T3"), Some(TokenSecret::new("R2")));

		assert_eq!(credentials.access.expose(), "T3");
		assert_eq!(credentials.refresh.as_ref().map(TokenSecret::expose), Some("R2"));
	}

	#[test]
	fn credentials_debug_redacts_tokens() {
		let credentials = Credentials::new(
			TokenSecret::new("top-secret"),
			Some(TokenSecret::new("also-secret")),
			Identity::from_email("a@b.com"),
		);
		let rendered = format!("{credentials:?}");

		assert!(!rendered.contains("top-secret"));
		assert!(!rendered.contains("also-secret"));
		assert!(rendered.contains("a@b.com"));
	}

	#[test]
	fn issued_credentials_tolerate_missing_user() {
		let payload = "{\"access\":\"A\",\"refresh\":\"R\"}";
		let issued: IssuedCredentials =
			serde_json::from_str(payload).expect("Issuance payload should deserialize.");

		assert!(issued.user.is_none());

		let payload = "{\"access\":\"A\",\"refresh\":\"R\",\"user\":{\"email\":\"a@b.com\",\"role\":\"pastor\",\"id\":7}}";
		let issued: IssuedCredentials =
			serde_json::from_str(payload).expect("Issuance payload with user should deserialize.");
		let user = issued.user.expect("User record should be present.");

		assert_eq!(user.email, "a@b.com");
		assert_eq!(user.role.as_deref(), Some("pastor"));
		assert_eq!(user.extra.get("id"), Some(&serde_json::json!(7)));
	}

	#[test]
	fn identity_round_trips_opaque_fields() {
		let identity = Identity {
			email: "a@b.com".into(),
			role: Some("member".into()),
			extra: serde_json::Map::from_iter([("church".into(), serde_json::json!("Central"))]),
		};
		let payload =
			serde_json::to_string(&identity).expect("Identity should serialize to JSON.");
		let round_trip: Identity =
			serde_json::from_str(&payload).expect("Identity should deserialize from JSON.");

		assert_eq!(round_trip, identity);
	}
}
