//! Client-side settings: credentials, refresh cadence, and call deadlines.

// self
use crate::{
	_prelude::*,
	auth::{AuthenticatedMethods, TokenSecret, Username},
	error::ConfigError,
};

const DEFAULT_REFRESH_INTERVAL_MS: u64 = 30_000;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 1_000;
const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;

/// Settings for the laptop client and its credential refresher.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
	/// Account used to log in.
	pub username: Username,
	/// Password for the account.
	pub password: TokenSecret,
	/// Delay between successful token refreshes, in milliseconds.
	#[serde(default = "default_refresh_interval_ms")]
	pub refresh_interval_ms: u64,
	/// Delay before retrying a failed refresh, in milliseconds.
	#[serde(default = "default_retry_backoff_ms")]
	pub retry_backoff_ms: u64,
	/// Per-call deadline, in milliseconds.
	#[serde(default = "default_call_timeout_ms")]
	pub call_timeout_ms: u64,
	/// Method paths that carry the session token.
	#[serde(default)]
	pub authenticated_methods: AuthenticatedMethods,
}
impl ClientConfig {
	/// Starts a builder with the default intervals and authenticated methods.
	pub fn builder(username: impl Into<String>, password: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder {
			username: username.into(),
			password: TokenSecret::new(password),
			refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
			retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
			call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
			authenticated_methods: AuthenticatedMethods::default(),
		}
	}

	/// Parses and validates a JSON document.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let config = super::from_json::<Self>(json)?;

		config.validate()?;

		Ok(config)
	}

	/// Delay between successful refreshes.
	pub fn refresh_interval(&self) -> StdDuration {
		StdDuration::from_millis(self.refresh_interval_ms)
	}

	/// Delay before retrying a failed refresh.
	pub fn retry_backoff(&self) -> StdDuration {
		StdDuration::from_millis(self.retry_backoff_ms)
	}

	/// Per-call deadline.
	pub fn call_timeout(&self) -> StdDuration {
		StdDuration::from_millis(self.call_timeout_ms)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		for (setting, value) in [
			("refresh_interval_ms", self.refresh_interval_ms),
			("retry_backoff_ms", self.retry_backoff_ms),
			("call_timeout_ms", self.call_timeout_ms),
		] {
			if value == 0 {
				return Err(ConfigError::NonPositiveDuration { setting });
			}
		}

		Ok(())
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	username: String,
	password: TokenSecret,
	refresh_interval_ms: u64,
	retry_backoff_ms: u64,
	call_timeout_ms: u64,
	authenticated_methods: AuthenticatedMethods,
}
impl ClientConfigBuilder {
	/// Overrides the refresh interval.
	pub fn refresh_interval(mut self, interval: StdDuration) -> Self {
		self.refresh_interval_ms = interval.as_millis().try_into().unwrap_or(u64::MAX);

		self
	}

	/// Overrides the retry backoff.
	pub fn retry_backoff(mut self, backoff: StdDuration) -> Self {
		self.retry_backoff_ms = backoff.as_millis().try_into().unwrap_or(u64::MAX);

		self
	}

	/// Overrides the per-call deadline.
	pub fn call_timeout(mut self, timeout: StdDuration) -> Self {
		self.call_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);

		self
	}

	/// Replaces the set of methods that carry the token.
	pub fn authenticated_methods(mut self, methods: AuthenticatedMethods) -> Self {
		self.authenticated_methods = methods;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let config = ClientConfig {
			username: Username::new(&self.username)?,
			password: self.password,
			refresh_interval_ms: self.refresh_interval_ms,
			retry_backoff_ms: self.retry_backoff_ms,
			call_timeout_ms: self.call_timeout_ms,
			authenticated_methods: self.authenticated_methods,
		};

		config.validate()?;

		Ok(config)
	}
}

fn default_refresh_interval_ms() -> u64 {
	DEFAULT_REFRESH_INTERVAL_MS
}

fn default_retry_backoff_ms() -> u64 {
	DEFAULT_RETRY_BACKOFF_MS
}

fn default_call_timeout_ms() -> u64 {
	DEFAULT_CALL_TIMEOUT_MS
}
