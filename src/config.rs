//! Base-address configuration for the Central API endpoints.

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError};

/// Resolved endpoint configuration shared by the client and session layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
	base_url: Url,
}
impl ApiConfig {
	/// Environment variable consulted by [`ApiConfig::from_env`].
	pub const ENV_BASE_URL: &'static str = "CENTRAL_API_BASE";
	/// Local-development default used when no base address is configured.
	pub const LOCAL_BASE_URL: &'static str = "http://127.0.0.1:8000/api/";

	/// Builds a configuration from an already-parsed base URL.
	///
	/// The base is normalized to end with a trailing slash so that joining
	/// resource paths never drops the final path segment.
	pub fn new(base_url: Url) -> Result<Self, ConfigError> {
		if base_url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeBase { value: base_url.to_string() });
		}

		let mut base_url = base_url;

		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		Ok(Self { base_url })
	}

	/// Parses a configuration from a string base address.
	pub fn parse(value: &str) -> Result<Self, ConfigError> {
		let base_url = Url::parse(value)
			.map_err(|e| ConfigError::InvalidBaseUrl { value: value.into(), source: e })?;

		Self::new(base_url)
	}

	/// Reads [`Self::ENV_BASE_URL`] from the environment, falling back to the
	/// local-development default when the variable is unset or empty.
	pub fn from_env() -> Result<Self, ConfigError> {
		match env::var(Self::ENV_BASE_URL) {
			Ok(value) if !value.trim().is_empty() => Self::parse(value.trim()),
			_ => Self::parse(Self::LOCAL_BASE_URL),
		}
	}

	/// Returns the configured base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Joins a resource path onto the base address.
	///
	/// Leading slashes are stripped so `"/events/"` and `"events/"` resolve to
	/// the same endpoint instead of resetting to the host root.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let relative = path.trim_start_matches('/');

		self.base_url
			.join(relative)
			.map_err(|e| ConfigError::InvalidPath { path: path.into(), source: e })
	}

	/// Credential issuance endpoint (`token/`).
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint("token/")
	}

	/// Credential refresh endpoint (`token/refresh/`).
	pub fn refresh_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint("token/refresh/")
	}

	/// Church registration endpoint (`auth/register_church/`).
	pub fn register_church_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint("auth/register_church/")
	}

	/// Member registration endpoint (`auth/register_member/`).
	pub fn register_member_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint("auth/register_member/")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoint_joining_normalizes_paths() {
		let config = ApiConfig::parse("http://127.0.0.1:8000/api").expect("Base should parse.");

		assert_eq!(
			config.endpoint("events/").expect("Join should succeed.").as_str(),
			"http://127.0.0.1:8000/api/events/",
		);
		assert_eq!(
			config.endpoint("/events/").expect("Join should succeed.").as_str(),
			"http://127.0.0.1:8000/api/events/",
		);
		assert_eq!(
			config.refresh_endpoint().expect("Join should succeed.").as_str(),
			"http://127.0.0.1:8000/api/token/refresh/",
		);
	}

	#[test]
	fn local_default_parses() {
		let config = ApiConfig::parse(ApiConfig::LOCAL_BASE_URL)
			.expect("Documented local default should parse.");

		assert_eq!(config.base_url().as_str(), ApiConfig::LOCAL_BASE_URL);
	}

	#[test]
	fn non_base_urls_are_rejected() {
		let url = Url::parse("mailto:team@central.dev").expect("Mailto fixture should parse.");

		assert!(matches!(ApiConfig::new(url), Err(ConfigError::CannotBeBase { .. })));
	}
}
