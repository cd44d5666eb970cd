//! Registered principals and the one-way password scheme that guards them.

// crates.io
use argon2::{
	Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
	password_hash::SaltString,
};
use rand::Rng;
// self
use crate::{
	_prelude::*,
	auth::{Role, Username},
};

/// Password hashing or verification failure.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialError {
	/// The password could not be hashed.
	#[error("Password could not be hashed: {message}.")]
	Hash {
		/// Backend-supplied reason.
		message: String,
	},
}

/// One-way password verifier.
pub trait PasswordScheme
where
	Self: Send + Sync,
{
	/// Derives a storable verifier from `password`.
	fn hash(&self, password: &str) -> Result<String, CredentialError>;

	/// Returns `true` when `password` matches the stored verifier.
	fn verify(&self, verifier: &str, password: &str) -> bool;
}

/// Argon2id PHC-string password scheme with random 16-byte salts.
#[derive(Clone, Copy, Debug, Default)]
pub struct Argon2Scheme;
impl PasswordScheme for Argon2Scheme {
	fn hash(&self, password: &str) -> Result<String, CredentialError> {
		let mut salt_bytes = [0_u8; 16];

		rand::rng().fill(&mut salt_bytes);

		let salt = SaltString::encode_b64(&salt_bytes)
			.map_err(|e| CredentialError::Hash { message: e.to_string() })?;
		let phc = Argon2::default()
			.hash_password(password.as_bytes(), &salt)
			.map_err(|e| CredentialError::Hash { message: e.to_string() })?;

		Ok(phc.to_string())
	}

	fn verify(&self, verifier: &str, password: &str) -> bool {
		PasswordHash::new(verifier)
			.map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
			.unwrap_or(false)
	}
}

/// Registered account.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
	/// Unique login name.
	pub username: Username,
	/// Stored one-way verifier; never the plain password.
	pub password_hash: String,
	/// Role embedded into issued session tokens.
	pub role: Role,
}
impl User {
	/// Creates an account, hashing `password` with `scheme`.
	pub fn new(
		username: Username,
		password: &str,
		role: Role,
		scheme: &dyn PasswordScheme,
	) -> Result<Self, CredentialError> {
		Ok(Self { username, password_hash: scheme.hash(password)?, role })
	}

	/// Checks `password` against the stored verifier.
	pub fn is_correct_password(&self, password: &str, scheme: &dyn PasswordScheme) -> bool {
		scheme.verify(&self.password_hash, password)
	}
}
impl Debug for User {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("User")
			.field("username", &self.username)
			.field("password_hash", &"<redacted>")
			.field("role", &self.role)
			.finish()
	}
}
