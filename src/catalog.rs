//! Catalog domain model: laptops, their component descriptors, and search filters.

pub mod filter;
pub mod laptop;

pub use filter::*;
pub use laptop::*;
