//! Distributor module: named principals arranged in a parent/child forest.
//!
//! - `Distributor` owns one `PermissionSet` and an optional parent id
//! - `Registry` owns every distributor of a session and guards the links:
//!   no re-parenting while holding permissions, no removal of a parent,
//!   no cycles

mod registry;
mod types;

pub use registry::Registry;
pub use types::{Distributor, DistributorId};
