//! RPC service contracts, their messages, and the server-side implementations.

pub mod auth;
pub mod guard;
pub mod laptop;

pub use auth::AuthServer;
pub use guard::Guarded;
pub use laptop::LaptopServer;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	catalog::{Filter, Laptop},
	obs::{self, CallOutcome, CallSpan},
	rpc::{Method, RpcFuture, RpcStream},
	store::StoreError,
};

/// Request of [`LaptopService::create_laptop`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateLaptopRequest {
	/// Laptop to store. An empty id asks the server to generate one.
	pub laptop: Laptop,
}

/// Response of [`LaptopService::create_laptop`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLaptopResponse {
	/// Committed laptop id.
	pub id: String,
}

/// Request of [`LaptopService::search_laptop`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchLaptopRequest {
	/// Predicate every returned laptop satisfies.
	pub filter: Filter,
}

/// One streamed match of [`LaptopService::search_laptop`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchLaptopResponse {
	/// Matching laptop.
	pub laptop: Laptop,
}

/// Leading message of an image upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
	/// Laptop the image belongs to.
	pub laptop_id: String,
	/// File extension including the leading dot.
	pub image_type: String,
}

/// One message of the [`LaptopService::upload_image`] stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadImageRequest {
	/// Metadata; must be the first and only metadata message.
	Info(ImageInfo),
	/// Raw image bytes, appended in receipt order.
	ChunkData(Vec<u8>),
}

/// Response of [`LaptopService::upload_image`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadImageResponse {
	/// Committed image id.
	pub id: String,
	/// Total bytes received.
	pub size: u64,
}

/// One score sent on the [`LaptopService::rate_laptop`] stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateLaptopRequest {
	/// Laptop being rated.
	pub laptop_id: String,
	/// Score to add.
	pub score: f64,
}

/// Acknowledgment of one [`RateLaptopRequest`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateLaptopResponse {
	/// Laptop that was rated.
	pub laptop_id: String,
	/// Number of scores received so far.
	pub rated_count: u32,
	/// Mean of every score received so far.
	pub average_score: f64,
}

/// Request of [`AuthService::login`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
	/// Account name.
	pub username: String,
	/// Plain password.
	pub password: TokenSecret,
}

/// Response of [`AuthService::login`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginResponse {
	/// Bearer token for protected methods.
	pub access_token: TokenSecret,
}

/// Laptop catalog operations.
pub trait LaptopService
where
	Self: Send + Sync,
{
	/// Stores a laptop and returns its committed id.
	fn create_laptop(&self, request: Request<CreateLaptopRequest>)
	-> RpcFuture<'_, CreateLaptopResponse>;

	/// Streams every stored laptop matching the filter.
	fn search_laptop(
		&self,
		request: Request<SearchLaptopRequest>,
	) -> RpcFuture<'_, RpcStream<SearchLaptopResponse>>;

	/// Receives image metadata followed by chunks and commits the image on half-close.
	fn upload_image(
		&self,
		request: Request<RpcStream<UploadImageRequest>>,
	) -> RpcFuture<'_, UploadImageResponse>;

	/// Applies each received score and acknowledges it with the running average.
	fn rate_laptop(
		&self,
		request: Request<RpcStream<RateLaptopRequest>>,
	) -> RpcFuture<'_, RpcStream<RateLaptopResponse>>;
}

/// Session issuance.
pub trait AuthService
where
	Self: Send + Sync,
{
	/// Exchanges a username and password for a bearer token.
	fn login(&self, request: Request<LoginRequest>) -> RpcFuture<'_, LoginResponse>;
}

/// Runs a handler inside a call span, recording its attempt and terminal outcome.
pub(crate) fn observed<'a, T, Fut>(method: Method, handler: Fut) -> RpcFuture<'a, T>
where
	Fut: 'a + Send + Future<Output = Result<Response<T>, Status>>,
{
	let span = CallSpan::new(method, "handle");

	Box::pin(span.instrument(async move {
		obs::record_call_outcome(method, CallOutcome::Attempt);

		let result = handler.await;

		obs::record_call_outcome(method, CallOutcome::of(&result));

		if let Err(status) = &result {
			tracing::info!(code = ?status.code(), message = status.message(), "Call failed.");
		}

		result
	}))
}

/// Classifies a generic store failure at the RPC boundary.
pub(crate) fn store_status(err: StoreError) -> Status {
	match err {
		StoreError::AlreadyExists => Status::already_exists(err.to_string()),
		StoreError::Interrupted(interrupt) => interrupt.into(),
		StoreError::Backend { .. } => Status::internal(err.to_string()),
	}
}
