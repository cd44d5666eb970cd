//! Laptop records and their component descriptors.

// self
use crate::_prelude::*;

/// Memory size unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemoryUnit {
	/// Unit was not set; never compares above zero.
	#[default]
	Unknown,
	/// Single bit.
	Bit,
	/// Eight bits.
	Byte,
	/// 2^10 bytes.
	Kilobyte,
	/// 2^20 bytes.
	Megabyte,
	/// 2^30 bytes.
	Gigabyte,
	/// 2^40 bytes.
	Terabyte,
}
impl MemoryUnit {
	/// Power-of-two exponent converting one unit into bits.
	pub const fn bit_exponent(self) -> Option<u32> {
		match self {
			MemoryUnit::Unknown => None,
			MemoryUnit::Bit => Some(0),
			MemoryUnit::Byte => Some(3),
			MemoryUnit::Kilobyte => Some(13),
			MemoryUnit::Megabyte => Some(23),
			MemoryUnit::Gigabyte => Some(33),
			MemoryUnit::Terabyte => Some(43),
		}
	}
}

/// Memory quantity expressed as value + unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Memory {
	/// Quantity in `unit`.
	pub value: u64,
	/// Unit of `value`.
	pub unit: MemoryUnit,
}
impl Memory {
	/// Creates a memory quantity.
	pub const fn new(value: u64, unit: MemoryUnit) -> Self {
		Self { value, unit }
	}

	/// Normalizes the quantity to bits, saturating on overflow. Unknown units count as zero.
	pub fn to_bits(&self) -> u64 {
		match self.unit.bit_exponent() {
			Some(exponent) => self.value.checked_shl(exponent).map_or(u64::MAX, |bits| {
				if bits >> exponent == self.value { bits } else { u64::MAX }
			}),
			None => 0,
		}
	}
}

/// Processor descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cpu {
	/// Manufacturer.
	pub brand: String,
	/// Model name.
	pub name: String,
	/// Physical core count.
	pub number_cores: u32,
	/// Hardware thread count.
	pub number_threads: u32,
	/// Base clock in GHz.
	pub min_ghz: f64,
	/// Boost clock in GHz.
	pub max_ghz: f64,
}

/// Graphics processor descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Gpu {
	/// Manufacturer.
	pub brand: String,
	/// Model name.
	pub name: String,
	/// Base clock in GHz.
	pub min_ghz: f64,
	/// Boost clock in GHz.
	pub max_ghz: f64,
	/// Dedicated memory.
	pub memory: Memory,
}

/// Storage drive kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageDriver {
	/// Drive kind was not set.
	#[default]
	Unknown,
	/// Spinning disk.
	Hdd,
	/// Solid-state drive.
	Ssd,
}

/// Storage drive descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Storage {
	/// Drive kind.
	pub driver: StorageDriver,
	/// Capacity.
	pub memory: Memory,
}

/// Catalog entry describing one laptop.
///
/// `id` is opaque to the store; the create handler assigns or validates it as a UUID.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Laptop {
	/// Catalog identifier.
	pub id: String,
	/// Manufacturer.
	pub brand: String,
	/// Model name.
	pub name: String,
	/// Processor.
	pub cpu: Cpu,
	/// Installed memory.
	pub ram: Memory,
	/// Graphics processors.
	pub gpus: Vec<Gpu>,
	/// Storage drives.
	pub storages: Vec<Storage>,
	/// Weight in kilograms.
	pub weight_kg: f64,
	/// List price in USD.
	pub price_usd: f64,
	/// Release year.
	pub release_year: u32,
	/// Last modification instant.
	pub updated_at: OffsetDateTime,
}
impl Default for Laptop {
	fn default() -> Self {
		Self {
			id: String::new(),
			brand: String::new(),
			name: String::new(),
			cpu: Cpu::default(),
			ram: Memory::default(),
			gpus: Vec::new(),
			storages: Vec::new(),
			weight_kg: 0.,
			price_usd: 0.,
			release_year: 0,
			updated_at: OffsetDateTime::UNIX_EPOCH,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn memory_units_normalize_to_bits() {
		let gigabyte = Memory::new(1, MemoryUnit::Gigabyte).to_bits();

		assert_eq!(gigabyte, Memory::new(1024, MemoryUnit::Megabyte).to_bits());
		assert_eq!(gigabyte, Memory::new(1024 * 1024, MemoryUnit::Kilobyte).to_bits());
		assert_eq!(Memory::new(1, MemoryUnit::Byte).to_bits(), 8);
		assert_eq!(Memory::new(1, MemoryUnit::Terabyte).to_bits(), 1 << 43);
		assert_eq!(Memory::new(7, MemoryUnit::Unknown).to_bits(), 0);
	}

	#[test]
	fn oversized_quantities_saturate() {
		assert_eq!(Memory::new(u64::MAX, MemoryUnit::Terabyte).to_bits(), u64::MAX);
		assert_eq!(Memory::new(1 << 21, MemoryUnit::Terabyte).to_bits(), u64::MAX);
	}

	#[test]
	fn unit_serializes_in_wire_case() {
		let payload = serde_json::to_string(&MemoryUnit::Gigabyte)
			.expect("Memory unit should serialize to JSON.");

		assert_eq!(payload, "\"GIGABYTE\"");
	}
}
