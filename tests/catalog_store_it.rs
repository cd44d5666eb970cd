// self
use laptop_catalog::{
	_preludet::*,
	catalog::{Filter, Laptop, Memory, MemoryUnit},
	rpc::CallContext,
	sample,
	store::{LaptopStore, MemoryLaptopStore, StoreFuture},
};

fn laptop_with_id(id: &str) -> Laptop {
	Laptop { id: id.into(), ..sample::new_laptop() }
}

async fn collect(store: &MemoryLaptopStore, filter: &Filter) -> Vec<Laptop> {
	let hits = Arc::new(Mutex::new(Vec::new()));
	let sink = hits.clone();
	let mut found = move |laptop: Laptop| -> StoreFuture<'static, ()> {
		sink.lock().push(laptop);

		Box::pin(async { Ok(()) })
	};

	store
		.search(&CallContext::new(), filter, &mut found)
		.await
		.expect("Uninterrupted search should complete.");

	let hits = hits.lock().clone();

	hits
}

#[tokio::test]
async fn returned_laptops_are_independent_copies() {
	let store = MemoryLaptopStore::default();
	let original = laptop_with_id("a");

	store.save(&original).await.expect("Saving a fresh laptop should succeed.");

	let mut found =
		store.find("a").await.expect("Find should succeed.").expect("Saved laptop should exist.");

	found.brand = "Tampered".into();
	found.cpu.number_cores = 0;

	let again =
		store.find("a").await.expect("Find should succeed.").expect("Saved laptop should exist.");

	assert_eq!(again, original);

	let everything = Filter { max_price_usd: f64::MAX, ..Default::default() };
	let mut searched = collect(&store, &everything).await;

	searched[0].price_usd = -1.;

	assert_eq!(collect(&store, &everything).await, vec![original]);
}

#[tokio::test]
async fn memory_units_compare_after_normalization() {
	let store = MemoryLaptopStore::default();
	let mut small = laptop_with_id("small");
	let mut large = laptop_with_id("large");

	small.ram = Memory::new(4096, MemoryUnit::Megabyte);
	large.ram = Memory::new(1024 * 1024 * 16, MemoryUnit::Kilobyte);

	for laptop in [&small, &large] {
		store.save(laptop).await.expect("Seeding should succeed.");
	}

	let filter = Filter {
		max_price_usd: f64::MAX,
		min_ram: Memory::new(8, MemoryUnit::Gigabyte),
		..Default::default()
	};
	let ids = collect(&store, &filter).await.into_iter().map(|laptop| laptop.id).collect::<Vec<_>>();

	assert_eq!(ids, ["large"]);
}

#[tokio::test]
async fn concurrent_saves_keep_ids_unique() {
	let store = MemoryLaptopStore::default();
	let tasks = (0..16)
		.map(|k| {
			let store = store.clone();

			tokio::spawn(async move { store.save(&laptop_with_id(&format!("id-{}", k % 4))).await })
		})
		.collect::<Vec<_>>();
	let mut committed = 0;

	for task in tasks {
		if task.await.expect("Save task should not panic.").is_ok() {
			committed += 1;
		}
	}

	assert_eq!(committed, 4);
	assert_eq!(store.len().await, 4);
}

#[tokio::test]
async fn expired_deadline_stops_search() {
	let store = MemoryLaptopStore::default();

	store.save(&laptop_with_id("a")).await.expect("Seeding should succeed.");

	let ctx = CallContext::with_timeout(StdDuration::ZERO);
	let mut found = |_: Laptop| -> StoreFuture<'static, ()> { Box::pin(async { Ok(()) }) };
	let err = store
		.search(&ctx, &Filter { max_price_usd: f64::MAX, ..Default::default() }, &mut found)
		.await
		.expect_err("Search past its deadline must not complete.");

	assert!(err.to_string().contains("deadline"));
}
