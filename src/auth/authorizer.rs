//! Server-side gate that validates the bearer token and role of every inbound call.

// crates.io
use tonic::metadata::MetadataMap;
// self
use crate::{
	_prelude::*,
	auth::{AccessPolicy, JwtManager, SessionClaims, TokenError, TokenSecret},
	rpc::{self, Method},
};

/// Checks calls against an [`AccessPolicy`] using tokens minted by a [`JwtManager`].
#[derive(Clone, Debug)]
pub struct RequestAuthorizer {
	jwt: JwtManager,
	policy: AccessPolicy,
}
impl RequestAuthorizer {
	/// Creates an authorizer.
	pub fn new(jwt: JwtManager, policy: AccessPolicy) -> Self {
		Self { jwt, policy }
	}

	/// Rules enforced by this authorizer.
	pub fn policy(&self) -> &AccessPolicy {
		&self.policy
	}

	/// Authorizes a call to `method` against the current clock.
	pub fn authorize(
		&self,
		method: Method,
		metadata: &MetadataMap,
	) -> Result<Option<SessionClaims>, Status> {
		self.authorize_at(method, metadata, OffsetDateTime::now_utc())
	}

	/// Authorizes a call to `method` as if the current instant were `now`.
	///
	/// Public methods pass with `None`. Protected methods need a valid, unexpired token whose
	/// role is allowed; the verified claims are returned.
	pub fn authorize_at(
		&self,
		method: Method,
		metadata: &MetadataMap,
		now: OffsetDateTime,
	) -> Result<Option<SessionClaims>, Status> {
		let Some(allowed) = self.policy.allowed_roles(method) else {
			return Ok(None);
		};
		let Some(token) = rpc::bearer_token(metadata) else {
			tracing::debug!(method = method.name(), "Rejected call without a token.");

			return Err(Status::unauthenticated("authorization token is not provided"));
		};
		let claims = self.jwt.verify_at(token, now).map_err(|e| {
			tracing::debug!(
				method = method.name(),
				token = %TokenSecret::new(token).fingerprint(),
				error = %e,
				"Rejected call with an unusable token."
			);

			match e {
				TokenError::Expired { .. } => Status::unauthenticated("access token is expired"),
				_ => Status::unauthenticated("access token is invalid"),
			}
		})?;

		if !allowed.contains(&claims.role) {
			tracing::debug!(
				method = method.name(),
				user = %claims.sub,
				role = %claims.role,
				"Rejected call with an insufficient role."
			);

			return Err(Status::permission_denied("no permission to access this RPC"));
		}

		Ok(Some(claims))
	}
}
