//! Storage contracts and built-in implementations for laptops, images, ratings, and users.

pub mod image;
pub mod memory;
pub mod rating;
pub mod user;

pub use image::{DiskImageStore, ImageRecord, ImageStore};
pub use memory::MemoryLaptopStore;
pub use rating::{MemoryRatingStore, Rating, RatingStore};
pub use user::{MemoryUserStore, UserStore};

// self
use crate::{
	_prelude::*,
	catalog::{Filter, Laptop},
	rpc::{CallContext, Interrupt},
};

/// Boxed future returned by every store operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Callback receiving each search match; an error stops the scan.
pub type Found<'a> = dyn FnMut(Laptop) -> StoreFuture<'static, ()> + Send + 'a;

/// Keyed laptop storage with copy-in/copy-out isolation.
pub trait LaptopStore
where
	Self: Send + Sync,
{
	/// Stores an independent copy of `laptop`, failing if its id is already taken.
	fn save<'a>(&'a self, laptop: &'a Laptop) -> StoreFuture<'a, ()>;

	/// Returns an independent copy of the laptop stored under `id`, if any.
	fn find<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<Laptop>>;

	/// Scans a consistent snapshot and hands a copy of every match to `found`.
	///
	/// The caller's context is checked before each candidate and watched while `found` runs; an
	/// interrupted scan fails with [`StoreError::Interrupted`] rather than completing.
	fn search<'a>(
		&'a self,
		ctx: &'a CallContext,
		filter: &'a Filter,
		found: &'a mut Found<'_>,
	) -> StoreFuture<'a, ()>;
}

/// Error type produced by store implementations.
///
/// Variants are mechanism-agnostic; RPC handlers decide which status each one becomes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// A record with the same key already exists.
	#[error("Record already exists.")]
	AlreadyExists,
	/// The caller stopped the operation before it completed.
	#[error("Operation stopped early: {0}.")]
	Interrupted(Interrupt),
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
impl From<Interrupt> for StoreError {
	fn from(interrupt: Interrupt) -> Self {
		Self::Interrupted(interrupt)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_error_can_be_serialized() {
		let payload = serde_json::to_string(&StoreError::Interrupted(Interrupt::Cancelled))
			.expect("StoreError should serialize to JSON.");
		let round_trip: StoreError = serde_json::from_str(&payload)
			.expect("Serialized store error should deserialize from JSON.");

		assert_eq!(round_trip, StoreError::Interrupted(Interrupt::Cancelled));
		assert_eq!(
			StoreError::from(Interrupt::DeadlineExceeded).to_string(),
			"Operation stopped early: deadline exceeded."
		);
	}
}
