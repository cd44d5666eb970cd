//! RPC vocabulary shared by handlers, the authorizer, and the client: method identifiers,
//! boxed stream/future aliases, per-call cancellation context, and bearer metadata helpers.

// crates.io
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tonic::metadata::{AsciiMetadataValue, MetadataMap};
// self
use crate::{_prelude::*, error::ConfigError};

/// Metadata key carrying the bearer token.
pub const AUTHORIZATION_KEY: &str = "authorization";

const BEARER_PREFIX: &str = "Bearer ";
const LAPTOP_SERVICE_PATH: &str = "/techschool.pcbook.LaptopService/";
const AUTH_SERVICE_PATH: &str = "/techschool.pcbook.AuthService/";

/// Boxed message stream used for inbound client streams and outbound server streams.
pub type RpcStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send + 'static>>;

/// Boxed future returned by every service method.
pub type RpcFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<Response<T>, Status>> + 'a + Send>>;

/// RPC methods exposed by the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
	/// Unary laptop creation.
	CreateLaptop,
	/// Server-streaming search.
	SearchLaptop,
	/// Client-streaming image upload.
	UploadImage,
	/// Bidirectional rating.
	RateLaptop,
	/// Unary login.
	Login,
}
impl Method {
	/// Every exposed method.
	pub const ALL: [Method; 5] = [
		Method::CreateLaptop,
		Method::SearchLaptop,
		Method::UploadImage,
		Method::RateLaptop,
		Method::Login,
	];

	/// Short method name, suitable for span and metric fields.
	pub const fn name(self) -> &'static str {
		match self {
			Method::CreateLaptop => "CreateLaptop",
			Method::SearchLaptop => "SearchLaptop",
			Method::UploadImage => "UploadImage",
			Method::RateLaptop => "RateLaptop",
			Method::Login => "Login",
		}
	}

	/// Fully-qualified method path.
	pub const fn path(self) -> &'static str {
		match self {
			Method::CreateLaptop => "/techschool.pcbook.LaptopService/CreateLaptop",
			Method::SearchLaptop => "/techschool.pcbook.LaptopService/SearchLaptop",
			Method::UploadImage => "/techschool.pcbook.LaptopService/UploadImage",
			Method::RateLaptop => "/techschool.pcbook.LaptopService/RateLaptop",
			Method::Login => "/techschool.pcbook.AuthService/Login",
		}
	}

	/// Resolves a fully-qualified method path, rejecting anything not exposed.
	pub fn from_path(path: &str) -> Result<Self, ConfigError> {
		let unknown = || ConfigError::UnknownMethod { path: path.to_owned() };
		let (service, name) = if let Some(name) = path.strip_prefix(LAPTOP_SERVICE_PATH) {
			(LAPTOP_SERVICE_PATH, name)
		} else if let Some(name) = path.strip_prefix(AUTH_SERVICE_PATH) {
			(AUTH_SERVICE_PATH, name)
		} else {
			return Err(unknown());
		};

		Self::ALL
			.into_iter()
			.find(|method| method.name() == name && method.path().starts_with(service))
			.ok_or_else(unknown)
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.path())
	}
}

/// Reason a call stopped before completing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interrupt {
	/// The caller cancelled the call.
	Cancelled,
	/// The caller's deadline elapsed.
	DeadlineExceeded,
}
impl Display for Interrupt {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Interrupt::Cancelled => f.write_str("call was cancelled"),
			Interrupt::DeadlineExceeded => f.write_str("deadline exceeded"),
		}
	}
}
impl From<Interrupt> for Status {
	fn from(interrupt: Interrupt) -> Self {
		match interrupt {
			Interrupt::Cancelled => Status::cancelled("request is canceled"),
			Interrupt::DeadlineExceeded => Status::deadline_exceeded("deadline is exceeded"),
		}
	}
}

/// Caller-controlled cancellation and deadline for a single call.
///
/// The client inserts a context into the request extensions; handlers read it back with
/// [`CallContext::of`]. A request without one is never interrupted.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
	cancel: CancellationToken,
	deadline: Option<Instant>,
}
impl CallContext {
	/// Creates a context without a deadline.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a context that expires after `timeout`.
	pub fn with_timeout(timeout: StdDuration) -> Self {
		Self { cancel: CancellationToken::new(), deadline: Some(Instant::now() + timeout) }
	}

	/// Returns the context carried by `request`, or a fresh one.
	pub fn of<T>(request: &Request<T>) -> Self {
		request.extensions().get::<Self>().cloned().unwrap_or_default()
	}

	/// Stores this context on `request`.
	pub fn attach<T>(&self, request: &mut Request<T>) {
		request.extensions_mut().insert(self.clone());
	}

	/// Cancels the call.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Fails with the interrupt reason once the call was cancelled or its deadline elapsed.
	pub fn check(&self) -> Result<(), Interrupt> {
		if self.cancel.is_cancelled() {
			return Err(Interrupt::Cancelled);
		}
		if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
			return Err(Interrupt::DeadlineExceeded);
		}

		Ok(())
	}

	/// Resolves once the call is cancelled or its deadline elapses.
	pub async fn interrupted(&self) -> Interrupt {
		match self.deadline {
			Some(deadline) => tokio::select! {
				biased;
				_ = self.cancel.cancelled() => Interrupt::Cancelled,
				_ = tokio::time::sleep_until(deadline) => Interrupt::DeadlineExceeded,
			},
			None => {
				self.cancel.cancelled().await;

				Interrupt::Cancelled
			},
		}
	}
}

/// Writes `authorization: Bearer <token>` into the call metadata.
pub fn attach_bearer(metadata: &mut MetadataMap, token: &str) -> Result<(), Status> {
	let value = format!("{BEARER_PREFIX}{token}")
		.parse::<AsciiMetadataValue>()
		.map_err(|_| Status::internal("access token is not valid metadata"))?;

	metadata.insert(AUTHORIZATION_KEY, value);

	Ok(())
}

/// Reads the bearer token from the call metadata, if present.
pub fn bearer_token(metadata: &MetadataMap) -> Option<&str> {
	let value = metadata.get(AUTHORIZATION_KEY)?.to_str().ok()?;
	let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();

	if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn method_paths_round_trip() {
		for method in Method::ALL {
			assert_eq!(
				Method::from_path(method.path()).expect("Exposed method path should resolve."),
				method
			);
		}
	}

	#[test]
	fn unknown_or_mangled_paths_are_rejected() {
		assert!(Method::from_path(" /techschool.pcbook.LaptopService/CreateLaptop").is_err());
		assert!(Method::from_path("/techschool.pcbook.LaptopService/DeleteLaptop").is_err());
		assert!(Method::from_path("/techschool.pcbook.AuthService/CreateLaptop").is_err());
		assert!(Method::from_path("/techschool.pcbook.LaptopService/Login").is_err());
	}

	#[test]
	fn bearer_round_trip_and_prefix_tolerance() {
		let mut metadata = MetadataMap::new();

		assert_eq!(bearer_token(&metadata), None);

		attach_bearer(&mut metadata, "abc.def.ghi").expect("Token should be valid metadata.");

		assert_eq!(bearer_token(&metadata), Some("abc.def.ghi"));

		metadata.insert(AUTHORIZATION_KEY, AsciiMetadataValue::from_static("raw-token"));

		assert_eq!(bearer_token(&metadata), Some("raw-token"));

		metadata.insert(AUTHORIZATION_KEY, AsciiMetadataValue::from_static("Bearer "));

		assert_eq!(bearer_token(&metadata), None);
	}

	#[tokio::test]
	async fn context_reports_cancellation_and_deadline() {
		let ctx = CallContext::new();

		assert_eq!(ctx.check(), Ok(()));

		ctx.cancel();

		assert_eq!(ctx.check(), Err(Interrupt::Cancelled));
		assert_eq!(ctx.interrupted().await, Interrupt::Cancelled);

		let expired = CallContext::with_timeout(StdDuration::ZERO);

		assert_eq!(expired.check(), Err(Interrupt::DeadlineExceeded));
		assert_eq!(expired.interrupted().await, Interrupt::DeadlineExceeded);
	}

	#[test]
	fn context_travels_with_request() {
		let ctx = CallContext::new();
		let mut request = Request::new(());

		ctx.attach(&mut request);
		ctx.cancel();

		assert_eq!(CallContext::of(&request).check(), Err(Interrupt::Cancelled));
		assert_eq!(CallContext::of(&Request::new(())).check(), Ok(()));
	}
}
