//! Laptop catalog client driving the four call shapes.

// std
use std::path::Path;
// crates.io
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;
// self
use crate::{
	_prelude::*,
	catalog::{Filter, Laptop},
	client::CredentialRefresher,
	config::ClientConfig,
	rpc::{CallContext, Method, RpcStream},
	service::{
		CreateLaptopRequest, ImageInfo, LaptopService, RateLaptopRequest, RateLaptopResponse,
		SearchLaptopRequest, UploadImageRequest, UploadImageResponse,
	},
};

const CHUNK_SIZE: usize = 1024;
const RATE_BUFFER: usize = 16;

/// Typed client for a [`LaptopService`].
#[derive(Clone)]
pub struct LaptopClient {
	service: Arc<dyn LaptopService>,
	credentials: Option<Arc<CredentialRefresher>>,
	timeout: StdDuration,
}
impl LaptopClient {
	/// Creates a client that sends no token.
	pub fn new(service: Arc<dyn LaptopService>, config: &ClientConfig) -> Self {
		Self { service, credentials: None, timeout: config.call_timeout() }
	}

	/// Attaches tokens from `refresher` to the methods it authenticates.
	pub fn with_credentials(mut self, refresher: Arc<CredentialRefresher>) -> Self {
		self.credentials = Some(refresher);

		self
	}

	/// Stores `laptop` and returns its committed id.
	pub async fn create_laptop(&self, laptop: Laptop) -> Result<String> {
		let (request, _) = self.request(Method::CreateLaptop, CreateLaptopRequest { laptop })?;
		let id = self.service.create_laptop(request).await?.into_inner().id;

		tracing::info!(laptop_id = %id, "Created laptop.");

		Ok(id)
	}

	/// Collects every laptop matching `filter`.
	pub async fn search_laptop(&self, filter: Filter) -> Result<Vec<Laptop>> {
		let (request, _) = self.request(Method::SearchLaptop, SearchLaptopRequest { filter })?;
		let mut stream = self.service.search_laptop(request).await?.into_inner();
		let mut found = Vec::new();

		while let Some(response) = stream.next().await {
			let laptop = response?.laptop;

			tracing::debug!(laptop_id = %laptop.id, brand = %laptop.brand, "Found laptop.");

			found.push(laptop);
		}

		Ok(found)
	}

	/// Uploads `data` as one image in fixed-size chunks.
	pub async fn upload_image(
		&self,
		laptop_id: &str,
		image_type: &str,
		data: &[u8],
	) -> Result<UploadImageResponse> {
		let info = UploadImageRequest::Info(ImageInfo {
			laptop_id: laptop_id.to_owned(),
			image_type: image_type.to_owned(),
		});
		let messages = std::iter::once(info)
			.chain(data.chunks(CHUNK_SIZE).map(|chunk| UploadImageRequest::ChunkData(chunk.to_vec())))
			.map(Ok)
			.collect::<Vec<_>>();
		let stream: RpcStream<UploadImageRequest> = Box::pin(futures::stream::iter(messages));
		let (request, _) = self.request(Method::UploadImage, stream)?;
		let response = self.service.upload_image(request).await?.into_inner();

		tracing::info!(image_id = %response.id, size = response.size, "Uploaded image.");

		Ok(response)
	}

	/// Uploads the file at `path`, using its extension as the image type.
	pub async fn upload_image_file(
		&self,
		laptop_id: &str,
		path: &Path,
	) -> Result<UploadImageResponse> {
		let image_type = path
			.extension()
			.and_then(|ext| ext.to_str())
			.map(|ext| format!(".{ext}"))
			.unwrap_or_default();
		let owned = path.to_path_buf();
		let data = tokio::task::spawn_blocking(move || std::fs::read(owned))
			.await
			.map_err(|e| Status::internal(format!("image reader stopped: {e}")))?
			.map_err(|e| Status::invalid_argument(format!("cannot read {}: {e}", path.display())))?;

		self.upload_image(laptop_id, &image_type, &data).await
	}

	/// Rates several laptops on one bidirectional stream.
	///
	/// Sending and receiving run as separate tasks. The receive side decides the outcome: its
	/// first error wins, and a clean finish still fails if the send side could not deliver every
	/// score.
	pub async fn rate_laptops(
		&self,
		scores: Vec<RateLaptopRequest>,
	) -> Result<Vec<RateLaptopResponse>> {
		let (tx, rx) = mpsc::channel(RATE_BUFFER);
		let outbound: RpcStream<RateLaptopRequest> =
			Box::pin(ReceiverStream::new(rx).map(Ok::<_, Status>));
		let (request, ctx) = self.request(Method::RateLaptop, outbound)?;
		let mut inbound = self.service.rate_laptop(request).await?.into_inner();
		let (sent_tx, sent_rx) = oneshot::channel();

		tokio::spawn(async move {
			let total = scores.len();
			let mut sent = 0_usize;

			for score in scores {
				if tx.send(score).await.is_err() {
					break;
				}

				sent += 1;
			}

			let result = if sent == total {
				Ok(sent)
			} else {
				Err(Status::aborted(format!("server stopped reading after {sent} of {total} scores")))
			};
			let _ = sent_tx.send(result);
		});

		let receiver = tokio::spawn(async move {
			let mut acks = Vec::new();

			while let Some(response) = inbound.next().await {
				let ack = response?;

				tracing::debug!(
					laptop_id = %ack.laptop_id,
					rated_count = ack.rated_count,
					average_score = ack.average_score,
					"Received rating."
				);

				acks.push(ack);
			}

			Ok::<_, Status>(acks)
		});
		let received = receiver.await.map_err(|e| {
			ctx.cancel();

			Status::internal(format!("rating receiver stopped: {e}"))
		})?;
		let acks = match received {
			Ok(acks) => acks,
			Err(status) => {
				ctx.cancel();

				return Err(status.into());
			},
		};

		sent_rx.await.map_err(|_| Status::internal("rating sender stopped"))??;

		Ok(acks)
	}

	fn request<T>(&self, method: Method, message: T) -> Result<(Request<T>, CallContext), Status> {
		let mut request = Request::new(message);
		let ctx = CallContext::with_timeout(self.timeout);

		ctx.attach(&mut request);

		if let Some(credentials) = &self.credentials {
			credentials.attach(method, &mut request)?;
		}

		Ok((request, ctx))
	}
}
impl Debug for LaptopClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LaptopClient")
			.field("credentials", &self.credentials)
			.field("timeout", &self.timeout)
			.finish()
	}
}
