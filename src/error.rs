//! Crate-level error types shared across stores, auth, and configuration.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs outside the RPC boundary.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Session token could not be minted or verified.
	#[error(transparent)]
	Token(#[from] crate::auth::TokenError),
	/// Password hashing or verification failure.
	#[error(transparent)]
	Credential(#[from] crate::auth::CredentialError),
	/// A remote call failed with a structured status.
	#[error("Call failed with {}: {}.", .0.code(), .0.message())]
	Rpc(Status),
}
impl From<Status> for Error {
	fn from(status: Status) -> Self {
		Self::Rpc(status)
	}
}

/// Configuration and validation failures raised while wiring the service or client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Configuration document could not be parsed.
	#[error("Configuration is malformed at `{path}`.")]
	Malformed {
		/// Path to the offending field.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Signing secret is empty.
	#[error("The token signing secret must not be empty.")]
	EmptySecret,
	/// A duration setting is zero.
	#[error("The {setting} setting must be positive.")]
	NonPositiveDuration {
		/// Setting name.
		setting: &'static str,
	},
	/// Maximum image size is zero.
	#[error("The maximum image size must be positive.")]
	ZeroImageSize,
	/// Method path does not name an exposed RPC method.
	#[error("Method `{path}` is not exposed by this service.")]
	UnknownMethod {
		/// Offending method path.
		path: String,
	},
	/// Access rule lists no roles.
	#[error("Access rule for `{method}` must allow at least one role.")]
	EmptyRoleSet {
		/// Method path of the rule.
		method: &'static str,
	},
	/// Server requires a token on a method the client never authenticates.
	#[error("Method `{method}` requires a token but the client does not attach one.")]
	UnauthenticatedMethod {
		/// Method path lacking client coverage.
		method: &'static str,
	},
	/// Identifier validation failed.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Seed user collides with an existing account.
	#[error("Seed user `{username}` is declared more than once.")]
	DuplicateSeedUser {
		/// Colliding username.
		username: String,
	},
}
impl ConfigError {
	/// Wraps a path-aware deserialization failure.
	pub fn malformed(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = err.path().to_string();

		Self::Malformed { path, source: err.into_inner() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("disk full"));

		let source = std::error::Error::source(&error)
			.expect("Crate error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn status_converts_into_rpc_error() {
		let error = Error::from(Status::permission_denied("no permission"));

		assert!(matches!(&error, Error::Rpc(status) if status.code() == Code::PermissionDenied));
		assert!(error.to_string().contains("no permission"));
	}
}
