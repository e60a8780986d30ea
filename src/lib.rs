//! # Geographic Distribution Authorization (geo-authz)
//!
//! Decides whether a distributor may operate in a location, given:
//! - Include (allow) and exclude (deny) rules per distributor
//! - A three-level location hierarchy (country, province, city)
//! - A parent/child forest of distributors, where a child can only be
//!   granted what its parent already includes
//! - A reference catalog of real places used to validate grants
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use geo_authz::{Catalog, EngineConfig, GrantOutcome, Location, PolicyEngine};
//!
//! let places = [
//!     Location::parse("CHENNAI,TAMIL NADU,INDIA").unwrap(),
//!     Location::parse("MUMBAI,MAHARASHTRA,INDIA").unwrap(),
//! ];
//! let catalog = Arc::new(Catalog::from_locations(places.iter()));
//! let mut engine = PolicyEngine::new(catalog, EngineConfig::default());
//!
//! engine.add_distributor("DISTRIBUTOR1").unwrap();
//! engine.add_distributor("DISTRIBUTOR2").unwrap();
//! engine.link("DISTRIBUTOR2", "DISTRIBUTOR1").unwrap();
//!
//! engine.grant_include("DISTRIBUTOR1", "Chennai,Tamil Nadu,India", false).unwrap();
//!
//! // The child may only take what the parent includes.
//! let outcome = engine.grant_include("DISTRIBUTOR2", "Mumbai,Maharashtra,India", false).unwrap();
//! assert!(matches!(outcome, GrantOutcome::RejectedByParent { .. }));
//!
//! let india = Location::parse("India").unwrap();
//! assert!(engine.can_distribute("DISTRIBUTOR1", &india).unwrap());
//! assert!(!engine.can_distribute("DISTRIBUTOR2", &india).unwrap());
//! ```

pub mod config;
pub mod distributor;
pub mod engine;
pub mod error;
pub mod location;
pub mod permission;
pub mod session;

pub use config::{CatalogConfig, CycleCheck, EngineConfig};
pub use distributor::{Distributor, DistributorId, Registry};
pub use engine::{resolve, Decision, DecisionReason, GrantOutcome, PolicyEngine, UnlinkOutcome};
pub use error::{CatalogError, PolicyError, Result};
pub use location::{Catalog, Granularity, Location, LocationTree};
pub use permission::{PermissionSet, RuleKind};
pub use session::{Command, Outcome, Session};
