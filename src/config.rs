//! Server and client configuration with JSON loading, builders, and validation.

pub mod client;
pub mod server;

pub use client::*;
pub use server::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::error::ConfigError;

fn from_json<T>(json: &str) -> Result<T, ConfigError>
where
	T: DeserializeOwned,
{
	let de = &mut serde_json::Deserializer::from_str(json);

	serde_path_to_error::deserialize(de).map_err(ConfigError::malformed)
}
