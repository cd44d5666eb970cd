//! Running laptop ratings.

// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreFuture},
};

/// Running score tally for one laptop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
	/// Number of scores received; never decreases.
	pub count: u32,
	/// Sum of every score received.
	pub sum: f64,
}
impl Rating {
	/// Mean score, or zero before the first score.
	pub fn average(&self) -> f64 {
		if self.count == 0 { 0. } else { self.sum / f64::from(self.count) }
	}
}

/// Storage contract for laptop ratings.
pub trait RatingStore
where
	Self: Send + Sync,
{
	/// Adds `score` to the laptop's tally and returns the updated tally.
	fn add<'a>(&'a self, laptop_id: &'a str, score: f64) -> StoreFuture<'a, Rating>;

	/// Returns the current tally for the laptop, if it was ever rated.
	fn find<'a>(&'a self, laptop_id: &'a str) -> StoreFuture<'a, Option<Rating>>;
}

/// In-process rating tallies behind one lock.
#[derive(Clone, Debug, Default)]
pub struct MemoryRatingStore(Arc<RwLock<HashMap<String, Rating>>>);
impl MemoryRatingStore {
	fn add_now(&self, laptop_id: &str, score: f64) -> Result<Rating, StoreError> {
		let mut guard = self.0.write();
		let rating = guard.entry(laptop_id.to_owned()).or_default();
		let count = rating.count.checked_add(1).ok_or_else(|| StoreError::Backend {
			message: format!("Rating count for laptop {laptop_id} overflowed"),
		})?;

		rating.count = count;
		rating.sum += score;

		Ok(*rating)
	}
}
impl RatingStore for MemoryRatingStore {
	fn add<'a>(&'a self, laptop_id: &'a str, score: f64) -> StoreFuture<'a, Rating> {
		Box::pin(async move { self.add_now(laptop_id, score) })
	}

	fn find<'a>(&'a self, laptop_id: &'a str) -> StoreFuture<'a, Option<Rating>> {
		Box::pin(async move { Ok(self.0.read().get(laptop_id).copied()) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn tallies_accumulate_per_laptop() {
		let store = MemoryRatingStore::default();

		for (k, score) in [8., 6., 10.].into_iter().enumerate() {
			let rating = store.add("a", score).await.expect("Adding a score should succeed.");

			assert_eq!(rating.count as usize, k + 1);
		}

		let rating = store.add("b", 3.).await.expect("Adding a score should succeed.");

		assert_eq!(rating, Rating { count: 1, sum: 3. });

		let a = store.find("a").await.expect("Find should succeed.").expect("Tally should exist.");

		assert_eq!(a.average(), 8.);
		assert_eq!(store.find("missing").await.expect("Find should succeed."), None);
		assert_eq!(Rating::default().average(), 0.);
	}

	#[tokio::test]
	async fn concurrent_scores_are_all_counted() {
		let store = MemoryRatingStore::default();
		let tasks = (0..32)
			.map(|_| {
				let store = store.clone();

				tokio::spawn(async move { store.add("shared", 1.).await })
			})
			.collect::<Vec<_>>();

		for task in tasks {
			task.await.expect("Rating task should not panic.").expect("Add should succeed.");
		}

		let rating =
			store.find("shared").await.expect("Find should succeed.").expect("Tally should exist.");

		assert_eq!(rating, Rating { count: 32, sum: 32. });
	}
}
