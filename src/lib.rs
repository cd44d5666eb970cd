//! Laptop catalog RPC service: unary create, server-streaming search, client-streaming image
//! upload, and bidirectional rating, guarded by JWT role checks with a self-healing client-side
//! credential refresher.

#![deny(clippy::all)]
#![warn(missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod obs;
pub mod rpc;
pub mod sample;
pub mod server;
pub mod service;
pub mod store;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// std
	use std::path::Path;
	// self
	use crate::{
		auth::{Role, Username},
		client::{CredentialRefresher, LaptopClient},
		config::{ClientConfig, SeedUser, ServerConfig},
		server::Services,
	};

	/// Secret used to sign session tokens in tests.
	pub const TEST_SECRET: &str = "test-secret";
	/// Admin account seeded by [`test_server_config`].
	pub const ADMIN: (&str, &str) = ("admin", "admin-password");
	/// Regular account seeded by [`test_server_config`].
	pub const USER: (&str, &str) = ("pd", "user-password");

	/// Server configuration with the default access rules and two seeded accounts.
	pub fn test_server_config(image_folder: &Path) -> ServerConfig {
		ServerConfig::builder(TEST_SECRET, image_folder)
			.seed_user(seed(ADMIN, "admin"))
			.seed_user(seed(USER, "user"))
			.build()
			.expect("Test server configuration should be valid.")
	}

	/// Client configuration logging in with the provided account.
	pub fn test_client_config(account: (&str, &str)) -> ClientConfig {
		ClientConfig::builder(account.0, account.1)
			.refresh_interval(StdDuration::from_secs(30))
			.build()
			.expect("Test client configuration should be valid.")
	}

	/// Builds the guarded in-process services for the provided image folder.
	pub async fn build_test_services(image_folder: &Path) -> Services {
		Services::from_config(&test_server_config(image_folder))
			.await
			.expect("Test services should build from a valid configuration.")
	}

	/// Builds an authenticated laptop client talking to the in-process services.
	pub async fn build_test_client(
		services: &Services,
		account: (&str, &str),
	) -> (LaptopClient, Arc<CredentialRefresher>) {
		let config = test_client_config(account);
		let refresher = CredentialRefresher::start(services.auth.clone(), &config)
			.await
			.expect("Credential refresher should log in with seeded credentials.");
		let client = LaptopClient::new(services.laptop.clone(), &config)
			.with_credentials(refresher.clone());

		(client, refresher)
	}

	fn seed(account: (&str, &str), role: &str) -> SeedUser {
		SeedUser {
			username: Username::new(account.0).expect("Seed username should be valid."),
			password: account.1.into(),
			role: Role::new(role).expect("Seed role should be valid."),
		}
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeSet, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::RwLock as AsyncRwLock;
	pub use futures::{Stream, StreamExt};
	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use tonic::{Code, Request, Response, Status};

	pub use crate::error::{Error, Result};
}

pub use tonic;
#[cfg(test)] use {color_eyre as _, tracing_subscriber as _};
