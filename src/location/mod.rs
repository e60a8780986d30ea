//! Location module: normalized geographic scopes and the reference catalog.
//!
//! Locations are three-level paths (country, province, city) that may stop at
//! any level:
//! - `Location` parses and normalizes `<City>,<Province>,<Country>` text
//! - `LocationTree` stores sets of locations with cascading cleanup
//! - `Catalog` validates that typed-in locations name real places

mod catalog;
mod tree;
mod types;

pub use catalog::Catalog;
pub use tree::{CitySet, LocationTree, ProvinceMap};
pub use types::{normalize, Granularity, Location};
