//! Random catalog fixtures for demos and tests.

// crates.io
use rand::{Rng, seq::IndexedRandom};
// self
use crate::{
	_prelude::*,
	catalog::{Cpu, Gpu, Laptop, Memory, MemoryUnit, Storage, StorageDriver},
};

/// Generates a laptop with plausible random specs and an empty id.
pub fn new_laptop() -> Laptop {
	let mut rng = rand::rng();
	let brand = pick(&mut rng, &["Apple", "Dell", "Lenovo"]);
	let name = match brand {
		"Apple" => pick(&mut rng, &["Macbook Air", "Macbook Pro"]),
		"Dell" => pick(&mut rng, &["Latitude", "Vostro", "XPS", "Alienware"]),
		_ => pick(&mut rng, &["Thinkpad X1", "Thinkpad P1", "Thinkpad P53"]),
	};

	Laptop {
		id: String::new(),
		brand: brand.into(),
		name: name.into(),
		cpu: new_cpu(&mut rng),
		ram: Memory::new(rng.random_range(4..=64), MemoryUnit::Gigabyte),
		gpus: vec![new_gpu(&mut rng)],
		storages: vec![
			Storage {
				driver: StorageDriver::Ssd,
				memory: Memory::new(rng.random_range(128..=1024), MemoryUnit::Gigabyte),
			},
			Storage {
				driver: StorageDriver::Hdd,
				memory: Memory::new(rng.random_range(1..=6), MemoryUnit::Terabyte),
			},
		],
		weight_kg: rng.random_range(1.0..3.0),
		price_usd: rng.random_range(1500.0..3500.0),
		release_year: rng.random_range(2015..=2019),
		updated_at: OffsetDateTime::now_utc(),
	}
}

/// Generates a score between 1 and 10.
pub fn random_laptop_score() -> f64 {
	f64::from(rand::rng().random_range(1_u8..=10))
}

fn new_cpu(rng: &mut impl Rng) -> Cpu {
	let brand = pick(rng, &["Intel", "AMD"]);
	let name = if brand == "Intel" {
		pick(rng, &["Xeon E-2286M", "Core i9-9980HK", "Core i7-9750H", "Core i5-9400F"])
	} else {
		pick(rng, &["Ryzen 7 PRO 2700U", "Ryzen 5 PRO 3500U", "Ryzen 3 PRO 3200GE"])
	};
	let number_cores = rng.random_range(2..=8);
	let min_ghz = rng.random_range(2.0..3.5);

	Cpu {
		brand: brand.into(),
		name: name.into(),
		number_cores,
		number_threads: rng.random_range(number_cores..=12),
		min_ghz,
		max_ghz: rng.random_range(min_ghz..5.0),
	}
}

fn new_gpu(rng: &mut impl Rng) -> Gpu {
	let brand = pick(rng, &["Nvidia", "AMD"]);
	let name = if brand == "Nvidia" {
		pick(rng, &["RTX 2060", "RTX 2070", "GTX 1660-Ti", "GTX 1070"])
	} else {
		pick(rng, &["RX 590", "RX 580", "RX 5700-XT", "RX Vega-56"])
	};
	let min_ghz = rng.random_range(1.0..1.5);

	Gpu {
		brand: brand.into(),
		name: name.into(),
		min_ghz,
		max_ghz: rng.random_range(min_ghz..2.0),
		memory: Memory::new(rng.random_range(2..=6), MemoryUnit::Gigabyte),
	}
}

fn pick(rng: &mut impl Rng, options: &[&'static str]) -> &'static str {
	options.choose(rng).copied().unwrap_or_default()
}
