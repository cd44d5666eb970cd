//! Background credential refresher.
//!
//! [`CredentialRefresher::start`] logs in once, caches the token, and spawns a supervised loop
//! that logs in again every refresh interval. A failed refresh keeps the previous token and is
//! retried after the shorter backoff. The cached token is replaced by a single pointer swap, so
//! callers always read either the old or the new token in full.

// crates.io
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
// self
use crate::{
	_prelude::*,
	auth::{AuthenticatedMethods, TokenSecret},
	client::{AuthClient, RefreshMetrics},
	config::ClientConfig,
	rpc::{self, Method},
	service::AuthService,
};

struct Shared {
	client: AuthClient,
	token: RwLock<Arc<TokenSecret>>,
	metrics: RefreshMetrics,
}
impl Shared {
	async fn refresh(&self) -> Result<Arc<TokenSecret>> {
		self.metrics.record_attempt();

		match self.client.login().await {
			Ok(token) => {
				let token = Arc::new(token);

				*self.token.write() = token.clone();
				self.metrics.record_success();

				tracing::debug!(token = %token.fingerprint(), "Cached a fresh session token.");

				Ok(token)
			},
			Err(e) => {
				self.metrics.record_failure();

				Err(e)
			},
		}
	}
}

/// Keeps a session token fresh and attaches it to outbound calls.
pub struct CredentialRefresher {
	shared: Arc<Shared>,
	methods: AuthenticatedMethods,
	cancel: CancellationToken,
	task: Mutex<Option<JoinHandle<()>>>,
}
impl CredentialRefresher {
	/// Logs in immediately and starts the background refresh loop.
	///
	/// Fails when the initial login fails; no loop is started in that case.
	pub async fn start(service: Arc<dyn AuthService>, config: &ClientConfig) -> Result<Arc<Self>> {
		let client = AuthClient::new(service, config);
		let metrics = RefreshMetrics::default();

		metrics.record_attempt();

		let token = match client.login().await {
			Ok(token) => token,
			Err(e) => {
				metrics.record_failure();

				return Err(e);
			},
		};

		metrics.record_success();

		tracing::info!(
			user = %client.username(),
			token = %token.fingerprint(),
			"Logged in."
		);

		let shared = Arc::new(Shared { client, token: RwLock::new(Arc::new(token)), metrics });
		let cancel = CancellationToken::new();
		let span = tracing::info_span!("laptop_catalog.refresher", user = %shared.client.username());
		let task = tokio::spawn(
			refresh_loop(
				shared.clone(),
				cancel.clone(),
				config.refresh_interval(),
				config.retry_backoff(),
			)
			.instrument(span),
		);

		Ok(Arc::new(Self {
			shared,
			methods: config.authenticated_methods.clone(),
			cancel,
			task: Mutex::new(Some(task)),
		}))
	}

	/// Currently cached token.
	pub fn current_token(&self) -> Arc<TokenSecret> {
		self.shared.token.read().clone()
	}

	/// Logs in now and replaces the cached token, outside the regular schedule.
	pub async fn refresh_now(&self) -> Result<Arc<TokenSecret>> {
		self.shared.refresh().await
	}

	/// Methods that receive the token.
	pub fn authenticated_methods(&self) -> &AuthenticatedMethods {
		&self.methods
	}

	/// Login counters, including the initial login.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.shared.metrics
	}

	/// Attaches the cached token when `method` is in the authenticated set.
	pub fn attach<T>(&self, method: Method, request: &mut Request<T>) -> Result<(), Status> {
		if !self.methods.contains(method) {
			return Ok(());
		}

		let token = self.current_token();

		rpc::attach_bearer(request.metadata_mut(), token.expose())
	}

	/// Returns `true` while the refresh loop is running.
	pub fn is_running(&self) -> bool {
		self.task.lock().as_ref().is_some_and(|task| !task.is_finished())
	}

	/// Stops the refresh loop and waits for it to exit.
	pub async fn shutdown(&self) {
		self.cancel.cancel();

		let task = self.task.lock().take();

		if let Some(task) = task {
			if let Err(e) = task.await {
				tracing::warn!(error = %e, "Refresh loop ended abnormally.");
			}
		}
	}
}
impl Debug for CredentialRefresher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialRefresher")
			.field("client", &self.shared.client)
			.field("methods", &self.methods)
			.field("metrics", &self.shared.metrics)
			.finish()
	}
}
impl Drop for CredentialRefresher {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}

async fn refresh_loop(
	shared: Arc<Shared>,
	cancel: CancellationToken,
	interval: StdDuration,
	backoff: StdDuration,
) {
	let mut wait = interval;

	loop {
		tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			_ = tokio::time::sleep(wait) => {},
		}

		let result = tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			result = shared.refresh() => result,
		};

		wait = match result {
			Ok(_) => interval,
			Err(e) => {
				tracing::warn!(error = %e, retry_in_ms = backoff.as_millis() as u64, "Token refresh failed.");

				backoff
			},
		};
	}

	tracing::debug!("Refresh loop stopped.");
}
