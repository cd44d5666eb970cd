//! Server-side settings: token signing, image storage, access rules, and seeded accounts.

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	auth::{AccessPolicy, Role, TokenSecret, Username},
	error::ConfigError,
	rpc::Method,
};

const DEFAULT_TOKEN_DURATION_SECS: u64 = 20 * 60;
const DEFAULT_MAX_IMAGE_SIZE: usize = 1 << 20;

/// Account registered when the server starts.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
	/// Login name.
	pub username: Username,
	/// Plain password; hashed before it is stored.
	pub password: String,
	/// Role granted to the account.
	pub role: Role,
}
impl Debug for SeedUser {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SeedUser")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.field("role", &self.role)
			.finish()
	}
}

/// Settings for the catalog and auth services.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
	/// HS256 key signing session tokens.
	pub secret_key: TokenSecret,
	/// Lifetime of issued session tokens, in seconds.
	#[serde(default = "default_token_duration_secs")]
	pub token_duration_secs: u64,
	/// Folder receiving uploaded images.
	pub image_folder: PathBuf,
	/// Largest accepted image, in bytes.
	#[serde(default = "default_max_image_size")]
	pub max_image_size: usize,
	/// Method path → roles allowed to call it. Unlisted methods are public.
	#[serde(default)]
	pub access_rules: AccessPolicy,
	/// Accounts registered at startup.
	#[serde(default)]
	pub seed_users: Vec<SeedUser>,
}
impl ServerConfig {
	/// Starts a builder with the default token lifetime, image limit, and access rules.
	pub fn builder(
		secret_key: impl Into<String>,
		image_folder: impl Into<PathBuf>,
	) -> ServerConfigBuilder {
		ServerConfigBuilder {
			config: Self {
				secret_key: TokenSecret::new(secret_key),
				token_duration_secs: DEFAULT_TOKEN_DURATION_SECS,
				image_folder: image_folder.into(),
				max_image_size: DEFAULT_MAX_IMAGE_SIZE,
				access_rules: AccessPolicy::default(),
				seed_users: Vec::new(),
			},
		}
	}

	/// Parses and validates a JSON document.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let config = super::from_json::<Self>(json)?;

		config.validate()?;

		Ok(config)
	}

	/// Token lifetime as a signed duration.
	pub fn token_duration(&self) -> Duration {
		Duration::seconds(self.token_duration_secs.min(i32::MAX as u64) as i64)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.secret_key.expose().is_empty() {
			return Err(ConfigError::EmptySecret);
		}
		if self.token_duration_secs == 0 {
			return Err(ConfigError::NonPositiveDuration { setting: "token_duration_secs" });
		}
		if self.max_image_size == 0 {
			return Err(ConfigError::ZeroImageSize);
		}

		let mut seen = BTreeSet::new();

		for seed in &self.seed_users {
			if !seen.insert(&seed.username) {
				return Err(ConfigError::DuplicateSeedUser { username: seed.username.to_string() });
			}
		}

		Ok(())
	}
}

/// Builder for [`ServerConfig`] values.
#[derive(Debug)]
pub struct ServerConfigBuilder {
	config: ServerConfig,
}
impl ServerConfigBuilder {
	/// Overrides the token lifetime. Sub-second remainders are dropped.
	pub fn token_duration(mut self, duration: StdDuration) -> Self {
		self.config.token_duration_secs = duration.as_secs();

		self
	}

	/// Overrides the largest accepted image.
	pub fn max_image_size(mut self, bytes: usize) -> Self {
		self.config.max_image_size = bytes;

		self
	}

	/// Replaces every access rule.
	pub fn access_rules(mut self, policy: AccessPolicy) -> Self {
		self.config.access_rules = policy;

		self
	}

	/// Restricts one method to `roles`.
	pub fn allow(mut self, method: Method, roles: impl IntoIterator<Item = Role>) -> Self {
		self.config.access_rules = self.config.access_rules.allow(method, roles);

		self
	}

	/// Registers an account at startup.
	pub fn seed_user(mut self, user: SeedUser) -> Self {
		self.config.seed_users.push(user);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ServerConfig, ConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}

fn default_token_duration_secs() -> u64 {
	DEFAULT_TOKEN_DURATION_SECS
}

fn default_max_image_size() -> usize {
	DEFAULT_MAX_IMAGE_SIZE
}
