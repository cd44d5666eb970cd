//! Login client.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, Username},
	config::ClientConfig,
	rpc::CallContext,
	service::{AuthService, LoginRequest},
};

/// Logs in with fixed credentials.
#[derive(Clone)]
pub struct AuthClient {
	service: Arc<dyn AuthService>,
	username: Username,
	password: TokenSecret,
	timeout: StdDuration,
}
impl AuthClient {
	/// Creates a client for the account named in `config`.
	pub fn new(service: Arc<dyn AuthService>, config: &ClientConfig) -> Self {
		Self {
			service,
			username: config.username.clone(),
			password: config.password.clone(),
			timeout: config.call_timeout(),
		}
	}

	/// Account this client logs in as.
	pub fn username(&self) -> &Username {
		&self.username
	}

	/// Exchanges the credentials for a fresh session token.
	pub async fn login(&self) -> Result<TokenSecret> {
		let mut request = Request::new(LoginRequest {
			username: self.username.to_string(),
			password: self.password.clone(),
		});

		CallContext::with_timeout(self.timeout).attach(&mut request);

		let response = self.service.login(request).await?;

		Ok(response.into_inner().access_token)
	}
}
impl Debug for AuthClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthClient")
			.field("username", &self.username)
			.field("timeout", &self.timeout)
			.finish()
	}
}
