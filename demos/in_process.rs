//! Runs the catalog server and an authenticated client in one process.
//!
//! `RUST_LOG=laptop_catalog=debug cargo run --example in_process`

// std
use std::time::Duration;
// crates.io
use color_eyre::{Result, eyre::WrapErr};
use tracing_subscriber::EnvFilter;
// self
use laptop_catalog::{
	auth::{Role, Username},
	catalog::{Filter, Memory, MemoryUnit},
	client::{CredentialRefresher, LaptopClient},
	config::{ClientConfig, SeedUser, ServerConfig},
	sample,
	server::Services,
	service::RateLaptopRequest,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let image_folder = std::env::temp_dir().join("laptop-catalog-demo");
	let server_config = ServerConfig::builder("demo-secret", &image_folder)
		.seed_user(SeedUser {
			username: Username::new("admin1")?,
			password: "secret".into(),
			role: Role::admin(),
		})
		.seed_user(SeedUser {
			username: Username::new("user1")?,
			password: "secret".into(),
			role: Role::user(),
		})
		.build()?;
	let services = Services::from_config(&server_config).await?;
	let client_config = ClientConfig::builder("admin1", "secret")
		.refresh_interval(Duration::from_secs(30))
		.build()?;

	services.authorizer.policy().verify_client_coverage(&client_config.authenticated_methods)?;

	let refresher = CredentialRefresher::start(services.auth.clone(), &client_config).await?;
	let client = LaptopClient::new(services.laptop.clone(), &client_config)
		.with_credentials(refresher.clone());
	let mut ids = Vec::new();

	for _ in 0..10 {
		ids.push(client.create_laptop(sample::new_laptop()).await?);
	}

	let filter = Filter {
		max_price_usd: 3000.,
		min_cpu_cores: 4,
		min_cpu_ghz: 2.5,
		min_ram: Memory::new(8, MemoryUnit::Gigabyte),
	};
	let found = client.search_laptop(filter).await?;

	tracing::info!(matches = found.len(), "Search finished.");

	let upload = client
		.upload_image(&ids[0], ".jpg", &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
		.await
		.wrap_err("image upload failed")?;

	tracing::info!(image_id = %upload.id, size = upload.size, "Upload finished.");

	for _ in 0..3 {
		let scores = ids
			.iter()
			.take(3)
			.map(|id| RateLaptopRequest { laptop_id: id.clone(), score: sample::random_laptop_score() })
			.collect();

		for ack in client.rate_laptops(scores).await? {
			tracing::info!(
				laptop_id = %ack.laptop_id,
				rated_count = ack.rated_count,
				average_score = ack.average_score,
				"Rating acknowledged."
			);
		}
	}

	refresher.shutdown().await;

	Ok(())
}
