//! [`LaptopService`] handlers over the catalog, image, and rating stores.

// crates.io
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;
use uuid::Uuid;
// self
use crate::{
	_prelude::*,
	catalog::Laptop,
	rpc::{CallContext, Interrupt, Method, RpcFuture, RpcStream},
	service::{
		self, CreateLaptopRequest, CreateLaptopResponse, LaptopService, RateLaptopRequest,
		RateLaptopResponse, SearchLaptopRequest, SearchLaptopResponse, UploadImageRequest,
		UploadImageResponse,
	},
	store::{self, ImageStore, LaptopStore, RatingStore, StoreError, StoreFuture},
};

const DEFAULT_MAX_IMAGE_SIZE: usize = 1 << 20;
const STREAM_BUFFER: usize = 16;

/// Serves the catalog against pluggable stores.
#[derive(Clone)]
pub struct LaptopServer {
	laptops: Arc<dyn LaptopStore>,
	images: Arc<dyn ImageStore>,
	ratings: Arc<dyn RatingStore>,
	max_image_size: usize,
}
impl LaptopServer {
	/// Creates a server accepting images up to 1 MiB.
	pub fn new(
		laptops: Arc<dyn LaptopStore>,
		images: Arc<dyn ImageStore>,
		ratings: Arc<dyn RatingStore>,
	) -> Self {
		Self { laptops, images, ratings, max_image_size: DEFAULT_MAX_IMAGE_SIZE }
	}

	/// Overrides the largest accepted image, in bytes.
	pub fn with_max_image_size(mut self, bytes: usize) -> Self {
		self.max_image_size = bytes;

		self
	}

	async fn create(
		&self,
		request: Request<CreateLaptopRequest>,
	) -> Result<Response<CreateLaptopResponse>, Status> {
		let ctx = CallContext::of(&request);
		let mut laptop = request.into_inner().laptop;

		if laptop.id.is_empty() {
			laptop.id = Uuid::new_v4().to_string();
		} else if Uuid::parse_str(&laptop.id).is_err() {
			return Err(Status::invalid_argument(format!(
				"laptop ID is not a valid UUID: {}",
				laptop.id
			)));
		}

		ctx.check()?;

		self.laptops.save(&laptop).await.map_err(|e| match e {
			StoreError::AlreadyExists =>
				Status::already_exists(format!("laptop with ID {} already exists", laptop.id)),
			e => service::store_status(e),
		})?;

		tracing::info!(laptop_id = %laptop.id, "Saved laptop.");

		Ok(Response::new(CreateLaptopResponse { id: laptop.id }))
	}

	async fn search(
		&self,
		request: Request<SearchLaptopRequest>,
	) -> Result<Response<RpcStream<SearchLaptopResponse>>, Status> {
		let ctx = CallContext::of(&request);
		let filter = request.into_inner().filter;
		let laptops = self.laptops.clone();
		let (tx, rx) = mpsc::channel(STREAM_BUFFER);

		tokio::spawn(
			async move {
				let mut emitted = 0_usize;
				let mut found = |laptop: Laptop| -> StoreFuture<'static, ()> {
					let tx = tx.clone();

					emitted += 1;

					tracing::debug!(laptop_id = %laptop.id, "Found laptop.");

					Box::pin(async move {
						tx.send(Ok(SearchLaptopResponse { laptop }))
							.await
							.map_err(|_| StoreError::Interrupted(Interrupt::Cancelled))
					})
				};
				let result = laptops.search(&ctx, &filter, &mut found).await;

				match result {
					Ok(()) => tracing::info!(emitted, "Search completed."),
					Err(e) => {
						tracing::info!(emitted, error = %e, "Search stopped early.");

						let _ = tx.send(Err(service::store_status(e))).await;
					},
				}
			}
			.in_current_span(),
		);

		Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
	}

	async fn upload(
		&self,
		request: Request<RpcStream<UploadImageRequest>>,
	) -> Result<Response<UploadImageResponse>, Status> {
		let ctx = CallContext::of(&request);
		let mut stream = request.into_inner();
		let info = match next_message(&ctx, &mut stream).await? {
			Some(UploadImageRequest::Info(info)) => info,
			Some(UploadImageRequest::ChunkData(_)) =>
				return Err(Status::invalid_argument("image info must be sent before image data")),
			None => return Err(Status::invalid_argument("upload ended before image info was sent")),
		};

		if !store::image::is_valid_image_type(&info.image_type) {
			return Err(Status::invalid_argument(format!(
				"image type {:?} is not a file extension",
				info.image_type
			)));
		}
		if self.laptops.find(&info.laptop_id).await.map_err(service::store_status)?.is_none() {
			return Err(Status::invalid_argument(format!(
				"laptop {} doesn't exist",
				info.laptop_id
			)));
		}

		tracing::debug!(laptop_id = %info.laptop_id, image_type = %info.image_type, "Receiving image.");

		let mut data = Vec::new();

		while let Some(message) = next_message(&ctx, &mut stream).await? {
			let chunk = match message {
				UploadImageRequest::ChunkData(chunk) => chunk,
				UploadImageRequest::Info(_) =>
					return Err(Status::invalid_argument("image info must be sent only once")),
			};
			let size = data.len() + chunk.len();

			if size > self.max_image_size {
				return Err(Status::invalid_argument(format!(
					"image is too large: {size} > {}",
					self.max_image_size
				)));
			}

			data.extend_from_slice(&chunk);
		}

		ctx.check()?;

		let record = self
			.images
			.save(&info.laptop_id, &info.image_type, data)
			.await
			.map_err(service::store_status)?;

		tracing::info!(image_id = %record.id, size = record.size, "Saved image.");

		Ok(Response::new(UploadImageResponse { id: record.id, size: record.size }))
	}

	async fn rate(
		&self,
		request: Request<RpcStream<RateLaptopRequest>>,
	) -> Result<Response<RpcStream<RateLaptopResponse>>, Status> {
		let ctx = CallContext::of(&request);
		let mut inbound = request.into_inner();
		let laptops = self.laptops.clone();
		let ratings = self.ratings.clone();
		let (tx, rx) = mpsc::channel(STREAM_BUFFER);

		tokio::spawn(
			async move {
				loop {
					let result = match next_message(&ctx, &mut inbound).await {
						Ok(Some(message)) => rate_one(&*laptops, &*ratings, message).await,
						Ok(None) => break,
						Err(status) => Err(status),
					};

					match result {
						Ok(ack) => {
							let sent = tokio::select! {
								biased;
								interrupt = ctx.interrupted() => Err(Status::from(interrupt)),
								sent = tx.send(Ok(ack)) => Ok(sent.is_ok()),
							};

							match sent {
								Ok(true) => {},
								Ok(false) => break,
								Err(status) => {
									let _ = tx.send(Err(status)).await;

									break;
								},
							}
						},
						Err(status) => {
							let _ = tx.send(Err(status)).await;

							break;
						},
					}
				}
			}
			.in_current_span(),
		);

		Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
	}
}
impl Debug for LaptopServer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LaptopServer").field("max_image_size", &self.max_image_size).finish()
	}
}
impl LaptopService for LaptopServer {
	fn create_laptop(
		&self,
		request: Request<CreateLaptopRequest>,
	) -> RpcFuture<'_, CreateLaptopResponse> {
		service::observed(Method::CreateLaptop, self.create(request))
	}

	fn search_laptop(
		&self,
		request: Request<SearchLaptopRequest>,
	) -> RpcFuture<'_, RpcStream<SearchLaptopResponse>> {
		service::observed(Method::SearchLaptop, self.search(request))
	}

	fn upload_image(
		&self,
		request: Request<RpcStream<UploadImageRequest>>,
	) -> RpcFuture<'_, UploadImageResponse> {
		service::observed(Method::UploadImage, self.upload(request))
	}

	fn rate_laptop(
		&self,
		request: Request<RpcStream<RateLaptopRequest>>,
	) -> RpcFuture<'_, RpcStream<RateLaptopResponse>> {
		service::observed(Method::RateLaptop, self.rate(request))
	}
}

/// Receives the next message, failing as soon as the caller gives up.
async fn next_message<T>(ctx: &CallContext, stream: &mut RpcStream<T>) -> Result<Option<T>, Status> {
	ctx.check()?;

	tokio::select! {
		biased;
		interrupt = ctx.interrupted() => Err(interrupt.into()),
		message = stream.next() => message.transpose(),
	}
}

async fn rate_one(
	laptops: &dyn LaptopStore,
	ratings: &dyn RatingStore,
	request: RateLaptopRequest,
) -> Result<RateLaptopResponse, Status> {
	if !request.score.is_finite() {
		return Err(Status::invalid_argument(format!("score {} is not a number", request.score)));
	}
	if laptops.find(&request.laptop_id).await.map_err(service::store_status)?.is_none() {
		return Err(Status::not_found(format!("laptop ID {} is not found", request.laptop_id)));
	}

	let rating =
		ratings.add(&request.laptop_id, request.score).await.map_err(service::store_status)?;

	tracing::debug!(
		laptop_id = %request.laptop_id,
		score = request.score,
		count = rating.count,
		"Rated laptop."
	);

	Ok(RateLaptopResponse {
		laptop_id: request.laptop_id,
		rated_count: rating.count,
		average_score: rating.average(),
	})
}
