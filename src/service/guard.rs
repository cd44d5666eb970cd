//! Wrapper that authorizes every call before handing it to the inner service.

// self
use crate::{
	_prelude::*,
	auth::RequestAuthorizer,
	obs::{self, CallOutcome},
	rpc::{Method, RpcFuture, RpcStream},
	service::{
		AuthService, CreateLaptopRequest, CreateLaptopResponse, LaptopService, LoginRequest,
		LoginResponse, RateLaptopRequest, RateLaptopResponse, SearchLaptopRequest,
		SearchLaptopResponse, UploadImageRequest, UploadImageResponse,
	},
};

/// Service wrapper running a [`RequestAuthorizer`] in front of `S`.
///
/// Rejected calls never reach the inner service. Admitted calls on protected methods carry the
/// verified [`SessionClaims`](crate::auth::SessionClaims) in their request extensions; the check
/// runs once, so a stream stays admitted for its whole lifetime.
#[derive(Clone, Debug)]
pub struct Guarded<S> {
	inner: S,
	authorizer: Arc<RequestAuthorizer>,
}
impl<S> Guarded<S> {
	/// Wraps `inner`.
	pub fn new(inner: S, authorizer: Arc<RequestAuthorizer>) -> Self {
		Self { inner, authorizer }
	}

	fn admit<T>(&self, method: Method, request: &mut Request<T>) -> Result<(), Status> {
		if let Some(claims) = self.authorizer.authorize(method, request.metadata())? {
			request.extensions_mut().insert(claims);
		}

		Ok(())
	}
}
impl<S> LaptopService for Guarded<S>
where
	S: LaptopService,
{
	fn create_laptop(
		&self,
		mut request: Request<CreateLaptopRequest>,
	) -> RpcFuture<'_, CreateLaptopResponse> {
		match self.admit(Method::CreateLaptop, &mut request) {
			Ok(()) => self.inner.create_laptop(request),
			Err(status) => rejected(Method::CreateLaptop, status),
		}
	}

	fn search_laptop(
		&self,
		mut request: Request<SearchLaptopRequest>,
	) -> RpcFuture<'_, RpcStream<SearchLaptopResponse>> {
		match self.admit(Method::SearchLaptop, &mut request) {
			Ok(()) => self.inner.search_laptop(request),
			Err(status) => rejected(Method::SearchLaptop, status),
		}
	}

	fn upload_image(
		&self,
		mut request: Request<RpcStream<UploadImageRequest>>,
	) -> RpcFuture<'_, UploadImageResponse> {
		match self.admit(Method::UploadImage, &mut request) {
			Ok(()) => self.inner.upload_image(request),
			Err(status) => rejected(Method::UploadImage, status),
		}
	}

	fn rate_laptop(
		&self,
		mut request: Request<RpcStream<RateLaptopRequest>>,
	) -> RpcFuture<'_, RpcStream<RateLaptopResponse>> {
		match self.admit(Method::RateLaptop, &mut request) {
			Ok(()) => self.inner.rate_laptop(request),
			Err(status) => rejected(Method::RateLaptop, status),
		}
	}
}
impl<S> AuthService for Guarded<S>
where
	S: AuthService,
{
	fn login(&self, mut request: Request<LoginRequest>) -> RpcFuture<'_, LoginResponse> {
		match self.admit(Method::Login, &mut request) {
			Ok(()) => self.inner.login(request),
			Err(status) => rejected(Method::Login, status),
		}
	}
}

fn rejected<'a, T>(method: Method, status: Status) -> RpcFuture<'a, T>
where
	T: 'a + Send,
{
	obs::record_call_outcome(method, CallOutcome::Attempt);
	obs::record_call_outcome(method, CallOutcome::Failure);
	tracing::info!(method = method.name(), code = ?status.code(), "Call rejected by authorizer.");

	Box::pin(futures::future::ready(Err(status)))
}
