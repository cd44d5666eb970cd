//! In-memory [`LaptopStore`] guarded by a single async shared/exclusive lock.

// self
use crate::{
	_prelude::*,
	catalog::{Filter, Laptop},
	rpc::CallContext,
	store::{Found, LaptopStore, StoreError, StoreFuture},
};

type LaptopMap = Arc<AsyncRwLock<HashMap<String, Laptop>>>;

/// Laptop store that keeps records in-process.
///
/// Writes take the lock exclusively; finds and searches share it, so a search observes a
/// point-in-time snapshot for its whole scan. Records are cloned on the way in and out.
#[derive(Clone, Debug, Default)]
pub struct MemoryLaptopStore(LaptopMap);
impl MemoryLaptopStore {
	/// Number of stored laptops.
	pub async fn len(&self) -> usize {
		self.0.read().await.len()
	}

	/// Returns `true` when nothing is stored.
	pub async fn is_empty(&self) -> bool {
		self.0.read().await.is_empty()
	}
}
impl LaptopStore for MemoryLaptopStore {
	fn save<'a>(&'a self, laptop: &'a Laptop) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.0.write().await;

			if guard.contains_key(&laptop.id) {
				return Err(StoreError::AlreadyExists);
			}

			guard.insert(laptop.id.clone(), laptop.clone());

			Ok(())
		})
	}

	fn find<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<Laptop>> {
		Box::pin(async move { Ok(self.0.read().await.get(id).cloned()) })
	}

	fn search<'a>(
		&'a self,
		ctx: &'a CallContext,
		filter: &'a Filter,
		found: &'a mut Found<'_>,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let guard = self.0.read().await;

			for laptop in guard.values() {
				ctx.check()?;

				if filter.matches(laptop) {
					// A stalled consumer must not pin the read lock past the caller's interest.
					tokio::select! {
						biased;
						interrupt = ctx.interrupted() => return Err(StoreError::Interrupted(interrupt)),
						result = found(laptop.clone()) => result?,
					}
				}
			}

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		catalog::{Memory, MemoryUnit},
		rpc::Interrupt,
	};

	fn laptop(id: &str, price: f64) -> Laptop {
		Laptop {
			id: id.into(),
			price_usd: price,
			ram: Memory::new(8, MemoryUnit::Gigabyte),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn save_rejects_duplicates_and_copies_in() {
		let store = MemoryLaptopStore::default();
		let mut original = laptop("a", 100.);

		store.save(&original).await.expect("First save should succeed.");

		assert_eq!(store.save(&original).await, Err(StoreError::AlreadyExists));

		original.brand = "mutated".into();

		let stored =
			store.find("a").await.expect("Find should succeed.").expect("Record should exist.");

		assert!(stored.brand.is_empty());
		assert_eq!(store.len().await, 1);
	}

	#[tokio::test]
	async fn search_streams_matches_and_stops_on_callback_error() {
		let store = MemoryLaptopStore::default();

		for (id, price) in [("a", 100.), ("b", 200.), ("c", 5000.)] {
			store.save(&laptop(id, price)).await.expect("Seeding should succeed.");
		}

		let filter = Filter { max_price_usd: 1000., ..Default::default() };
		let ctx = CallContext::new();
		let hits = Arc::new(Mutex::new(Vec::new()));
		let sink = hits.clone();
		let mut found = move |laptop: Laptop| -> StoreFuture<'static, ()> {
			sink.lock().push(laptop.id);

			Box::pin(async { Ok(()) })
		};

		store.search(&ctx, &filter, &mut found).await.expect("Search should complete.");

		let mut ids = hits.lock().clone();

		ids.sort();

		assert_eq!(ids, ["a", "b"]);

		let mut failing = |_: Laptop| -> StoreFuture<'static, ()> {
			Box::pin(async { Err(StoreError::Backend { message: "sink closed".into() }) })
		};
		let err = store
			.search(&ctx, &filter, &mut failing)
			.await
			.expect_err("Callback failure should abort the scan.");

		assert!(matches!(err, StoreError::Backend { .. }));
	}

	#[tokio::test]
	async fn cancelled_search_aborts_before_emitting() {
		let store = MemoryLaptopStore::default();

		store.save(&laptop("a", 1.)).await.expect("Seeding should succeed.");

		let ctx = CallContext::new();
		let mut emitted = 0_usize;
		let mut found = |_: Laptop| -> StoreFuture<'static, ()> {
			emitted += 1;

			Box::pin(async { Ok(()) })
		};

		ctx.cancel();

		let err = store
			.search(&ctx, &Filter { max_price_usd: 10., ..Default::default() }, &mut found)
			.await
			.expect_err("Cancelled search must not complete.");

		assert_eq!(err, StoreError::Interrupted(Interrupt::Cancelled));
		assert_eq!(emitted, 0);
	}

	#[tokio::test]
	async fn stalled_consumer_releases_lock_on_cancel() {
		let store = MemoryLaptopStore::default();

		store.save(&laptop("a", 1.)).await.expect("Seeding should succeed.");

		let ctx = CallContext::new();
		let scan = {
			let store = store.clone();
			let ctx = ctx.clone();

			tokio::spawn(async move {
				let mut stalled =
					|_: Laptop| -> StoreFuture<'static, ()> { Box::pin(futures::future::pending()) };

				store
					.search(&ctx, &Filter { max_price_usd: 10., ..Default::default() }, &mut stalled)
					.await
			})
		};

		tokio::task::yield_now().await;
		ctx.cancel();

		let err = tokio::time::timeout(StdDuration::from_secs(2), scan)
			.await
			.expect("Cancelled scan should stop promptly.")
			.expect("Scan task should not panic.")
			.expect_err("Cancelled scan must not complete.");

		assert_eq!(err, StoreError::Interrupted(Interrupt::Cancelled));
		tokio::time::timeout(StdDuration::from_secs(2), store.save(&laptop("b", 2.)))
			.await
			.expect("Writers should not wait on a cancelled scan.")
			.expect("Save after the scan should succeed.");
	}
}
