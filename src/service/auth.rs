//! [`AuthService`] handler exchanging credentials for session tokens.

// self
use crate::{
	_prelude::*,
	auth::{JwtManager, PasswordScheme},
	rpc::{Method, RpcFuture},
	service::{self, AuthService, LoginRequest, LoginResponse},
	store::UserStore,
};

/// Issues session tokens to registered accounts.
#[derive(Clone)]
pub struct AuthServer {
	users: Arc<dyn UserStore>,
	jwt: JwtManager,
	passwords: Arc<dyn PasswordScheme>,
}
impl AuthServer {
	/// Creates a server verifying passwords with `passwords` and signing with `jwt`.
	pub fn new(
		users: Arc<dyn UserStore>,
		jwt: JwtManager,
		passwords: Arc<dyn PasswordScheme>,
	) -> Self {
		Self { users, jwt, passwords }
	}

	async fn login_inner(
		&self,
		request: Request<LoginRequest>,
	) -> Result<Response<LoginResponse>, Status> {
		let LoginRequest { username, password } = request.into_inner();
		let Some(user) = self.users.find(&username).await.map_err(service::store_status)? else {
			return Err(Status::not_found(format!("cannot find user {username}")));
		};

		if !user.is_correct_password(password.expose(), &*self.passwords) {
			tracing::info!(user = %username, "Rejected login with an incorrect password.");

			return Err(Status::unauthenticated("incorrect username/password"));
		}

		let access_token = self
			.jwt
			.issue(&user)
			.map_err(|e| Status::internal(format!("cannot generate access token: {e}")))?;

		tracing::info!(
			user = %user.username,
			role = %user.role,
			token = %access_token.fingerprint(),
			"Issued session token."
		);

		Ok(Response::new(LoginResponse { access_token }))
	}
}
impl Debug for AuthServer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthServer").field("jwt", &self.jwt).finish()
	}
}
impl AuthService for AuthServer {
	fn login(&self, request: Request<LoginRequest>) -> RpcFuture<'_, LoginResponse> {
		service::observed(Method::Login, self.login_inner(request))
	}
}
