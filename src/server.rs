//! Server assembly: stores, seeded accounts, and the guarded service pair.

// self
use crate::{
	_prelude::*,
	auth::{Argon2Scheme, JwtManager, PasswordScheme, RequestAuthorizer, User},
	config::ServerConfig,
	error::ConfigError,
	service::{AuthServer, AuthService, Guarded, LaptopServer, LaptopService},
	store::{
		DiskImageStore, ImageStore, LaptopStore, MemoryLaptopStore, MemoryRatingStore,
		MemoryUserStore, RatingStore, StoreError, UserStore,
	},
};

/// Storage and hashing backends shared by the services.
#[derive(Clone)]
pub struct Backends {
	/// Catalog store.
	pub laptops: Arc<dyn LaptopStore>,
	/// Uploaded image store.
	pub images: Arc<dyn ImageStore>,
	/// Rating tallies.
	pub ratings: Arc<dyn RatingStore>,
	/// Registered accounts.
	pub users: Arc<dyn UserStore>,
	/// Password verifier.
	pub passwords: Arc<dyn PasswordScheme>,
}
impl Backends {
	/// In-process stores with images written under the configured folder.
	pub fn in_memory(config: &ServerConfig) -> Result<Self> {
		Ok(Self {
			laptops: Arc::new(MemoryLaptopStore::default()),
			images: Arc::new(DiskImageStore::open(&config.image_folder)?),
			ratings: Arc::new(MemoryRatingStore::default()),
			users: Arc::new(MemoryUserStore::default()),
			passwords: Arc::new(Argon2Scheme),
		})
	}
}
impl Debug for Backends {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Backends(..)")
	}
}

/// Guarded service handles ready to be served.
#[derive(Clone)]
pub struct Services {
	/// Laptop catalog service.
	pub laptop: Arc<dyn LaptopService>,
	/// Login service.
	pub auth: Arc<dyn AuthService>,
	/// Authorizer guarding both services.
	pub authorizer: Arc<RequestAuthorizer>,
}
impl Services {
	/// Builds the services over in-process backends.
	pub async fn from_config(config: &ServerConfig) -> Result<Self> {
		Self::with_backends(config, Backends::in_memory(config)?).await
	}

	/// Seeds the configured accounts into `backends` and wires the guarded services.
	pub async fn with_backends(config: &ServerConfig, backends: Backends) -> Result<Self> {
		for seed in &config.seed_users {
			let user = User::new(
				seed.username.clone(),
				&seed.password,
				seed.role.clone(),
				&*backends.passwords,
			)?;

			backends.users.save(user).await.map_err(|e| match e {
				StoreError::AlreadyExists =>
					Error::from(ConfigError::DuplicateSeedUser { username: seed.username.to_string() }),
				e => Error::from(e),
			})?;

			tracing::info!(user = %seed.username, role = %seed.role, "Seeded user.");
		}

		let jwt = JwtManager::new(config.secret_key.expose(), config.token_duration());
		let authorizer = Arc::new(RequestAuthorizer::new(jwt.clone(), config.access_rules.clone()));
		let laptop = LaptopServer::new(backends.laptops, backends.images, backends.ratings)
			.with_max_image_size(config.max_image_size);
		let auth = AuthServer::new(backends.users, jwt, backends.passwords);

		tracing::info!(
			secret = %config.secret_key.fingerprint(),
			token_duration_secs = config.token_duration_secs,
			image_folder = %config.image_folder.display(),
			"Catalog services ready."
		);

		Ok(Self {
			laptop: Arc::new(Guarded::new(laptop, authorizer.clone())),
			auth: Arc::new(Guarded::new(auth, authorizer.clone())),
			authorizer,
		})
	}
}
impl Debug for Services {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Services").field("authorizer", &self.authorizer).finish()
	}
}
