//! Stateless session tokens: HS256 JWTs carrying the subject and its role.
//!
//! A token is valid iff its signature verifies and its expiry has not passed. There is no
//! server-side session table, so a minted token cannot be revoked before it expires.

// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
// self
use crate::{
	_prelude::*,
	auth::{Role, TokenSecret, User, Username},
};

/// Claims embedded in every session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
	/// Account the token was minted for.
	pub sub: Username,
	/// Role granted to the account.
	pub role: Role,
	/// Issued-at (unix timestamp seconds).
	pub iat: i64,
	/// Expiry (unix timestamp seconds).
	pub exp: i64,
}
impl SessionClaims {
	/// Expiry as an instant.
	pub fn expires_at(&self) -> OffsetDateTime {
		OffsetDateTime::from_unix_timestamp(self.exp).unwrap_or(OffsetDateTime::UNIX_EPOCH)
	}
}

/// Session token minting or verification failure.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// The token could not be signed.
	#[error("Session token could not be signed.")]
	Signing {
		/// Underlying encoder failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// The token is malformed or its signature does not verify.
	#[error("Session token is invalid.")]
	Invalid {
		/// Underlying decoder failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// The token's expiry has passed.
	#[error("Session token expired at unix time {exp}.")]
	Expired {
		/// Expiry carried by the token.
		exp: i64,
	},
}

/// Mints and verifies session tokens with a shared HS256 secret.
#[derive(Clone)]
pub struct JwtManager {
	encoding: EncodingKey,
	decoding: DecodingKey,
	token_duration: Duration,
}
impl JwtManager {
	/// Creates a manager signing with `secret` and issuing tokens valid for `token_duration`.
	pub fn new(secret: &str, token_duration: Duration) -> Self {
		Self {
			encoding: EncodingKey::from_secret(secret.as_bytes()),
			decoding: DecodingKey::from_secret(secret.as_bytes()),
			token_duration,
		}
	}

	/// Lifetime of issued tokens.
	pub fn token_duration(&self) -> Duration {
		self.token_duration
	}

	/// Issues a token for `user` using the current clock.
	pub fn issue(&self, user: &User) -> Result<TokenSecret, TokenError> {
		self.issue_at(user, OffsetDateTime::now_utc())
	}

	/// Issues a token for `user` as if the current instant were `now`.
	pub fn issue_at(&self, user: &User, now: OffsetDateTime) -> Result<TokenSecret, TokenError> {
		let claims = SessionClaims {
			sub: user.username.clone(),
			role: user.role.clone(),
			iat: now.unix_timestamp(),
			exp: (now + self.token_duration).unix_timestamp(),
		};
		let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
			.map_err(|source| TokenError::Signing { source })?;

		Ok(TokenSecret::new(token))
	}

	/// Verifies `token` against the current clock.
	pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
		self.verify_at(token, OffsetDateTime::now_utc())
	}

	/// Verifies the signature of `token` and rejects it once `now` reaches its expiry.
	pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<SessionClaims, TokenError> {
		let mut validation = Validation::new(Algorithm::HS256);

		// Expiry is compared below against the caller's clock, without leeway.
		validation.validate_exp = false;
		validation.set_required_spec_claims(&["exp"]);

		let claims = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
			.map_err(|source| TokenError::Invalid { source })?
			.claims;

		if now.unix_timestamp() >= claims.exp {
			return Err(TokenError::Expired { exp: claims.exp });
		}

		Ok(claims)
	}
}
impl Debug for JwtManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JwtManager")
			.field("secret", &"<redacted>")
			.field("token_duration", &self.token_duration)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::auth::PasswordScheme;

	struct PlainScheme;
	impl PasswordScheme for PlainScheme {
		fn hash(&self, password: &str) -> Result<String, crate::auth::CredentialError> {
			Ok(password.to_owned())
		}

		fn verify(&self, verifier: &str, password: &str) -> bool {
			verifier == password
		}
	}

	fn user(role: &str) -> User {
		User::new(
			Username::new("alice").expect("Username fixture should be valid."),
			"pw",
			Role::new(role).expect("Role fixture should be valid."),
			&PlainScheme,
		)
		.expect("Plain scheme never fails.")
	}

	#[test]
	fn issued_token_carries_role_until_expiry() {
		let manager = JwtManager::new("secret", Duration::minutes(20));
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let token = manager.issue_at(&user("admin"), issued).expect("Signing should succeed.");
		let claims = manager
			.verify_at(token.expose(), issued + Duration::minutes(19))
			.expect("Token should verify before its expiry.");

		assert_eq!(&*claims.sub, "alice");
		assert_eq!(&*claims.role, "admin");
		assert_eq!(claims.expires_at(), macros::datetime!(2025-01-01 00:20 UTC));

		let err = manager
			.verify_at(token.expose(), issued + Duration::minutes(20))
			.expect_err("Token must be rejected at its expiry instant.");

		assert!(matches!(err, TokenError::Expired { .. }));
	}

	#[test]
	fn foreign_or_tampered_tokens_are_rejected() {
		let manager = JwtManager::new("secret", Duration::minutes(20));
		let other = JwtManager::new("other-secret", Duration::minutes(20));
		let token = other.issue(&user("admin")).expect("Signing should succeed.");

		assert!(matches!(manager.verify(token.expose()), Err(TokenError::Invalid { .. })));
		assert!(matches!(manager.verify("not.a.jwt"), Err(TokenError::Invalid { .. })));

		let genuine = manager.issue(&user("user")).expect("Signing should succeed.");
		let mut tampered = genuine.expose().to_owned();

		tampered.push('x');

		assert!(matches!(manager.verify(&tampered), Err(TokenError::Invalid { .. })));
		assert!(manager.verify(genuine.expose()).is_ok());
	}

	#[test]
	fn debug_redacts_secret() {
		let manager = JwtManager::new("very-secret", Duration::minutes(1));

		assert!(!format!("{manager:?}").contains("very-secret"));
	}
}
