//! Search predicates applied to stored laptops.

// self
use crate::{
	_prelude::*,
	catalog::{Laptop, Memory},
};

/// Query predicate for laptop searches; every bound must hold for a laptop to qualify.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
	/// Maximum list price in USD.
	pub max_price_usd: f64,
	/// Minimum physical core count.
	pub min_cpu_cores: u32,
	/// Minimum base clock in GHz.
	pub min_cpu_ghz: f64,
	/// Minimum installed memory.
	pub min_ram: Memory,
}
impl Filter {
	/// Returns `true` when `laptop` satisfies every bound.
	pub fn matches(&self, laptop: &Laptop) -> bool {
		laptop.price_usd <= self.max_price_usd
			&& laptop.cpu.number_cores >= self.min_cpu_cores
			&& laptop.cpu.min_ghz >= self.min_cpu_ghz
			&& laptop.ram.to_bits() >= self.min_ram.to_bits()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::catalog::{Cpu, MemoryUnit};

	fn laptop(price: f64, cores: u32, ghz: f64, ram: Memory) -> Laptop {
		Laptop {
			price_usd: price,
			cpu: Cpu { number_cores: cores, min_ghz: ghz, ..Default::default() },
			ram,
			..Default::default()
		}
	}

	#[test]
	fn every_bound_must_hold() {
		let filter = Filter {
			max_price_usd: 3000.,
			min_cpu_cores: 4,
			min_cpu_ghz: 2.5,
			min_ram: Memory::new(8, MemoryUnit::Gigabyte),
		};
		let ram = Memory::new(8, MemoryUnit::Gigabyte);

		assert!(filter.matches(&laptop(3000., 4, 2.5, ram)));
		assert!(filter.matches(&laptop(1999., 8, 3.1, Memory::new(16384, MemoryUnit::Megabyte))));
		assert!(!filter.matches(&laptop(3000.01, 4, 2.5, ram)));
		assert!(!filter.matches(&laptop(2000., 2, 2.5, ram)));
		assert!(!filter.matches(&laptop(2000., 4, 2.4, ram)));
		assert!(!filter.matches(&laptop(2000., 4, 2.5, Memory::new(4096, MemoryUnit::Megabyte))));
	}
}
