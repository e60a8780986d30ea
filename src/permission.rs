//! Per-distributor include (allow) and exclude (deny) rule sets

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::location::{Location, LocationTree};

/// Which side of a permission set an entry lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    /// Allow-list entry
    Include,
    /// Deny-list entry
    Exclude,
}

impl RuleKind {
    /// The other side of the set
    pub fn opposite(self) -> Self {
        match self {
            RuleKind::Include => RuleKind::Exclude,
            RuleKind::Exclude => RuleKind::Include,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Include => write!(f, "INCLUDE"),
            RuleKind::Exclude => write!(f, "EXCLUDE"),
        }
    }
}

/// Two independent location trees: what a distributor may serve and what it
/// may not.
///
/// Entries are added and removed as full city/province/country triples.
///
/// # Examples
///
/// ```
/// use geo_authz::{Location, PermissionSet, RuleKind};
///
/// let mut perms = PermissionSet::new();
/// let austin = Location::parse("AUSTIN,TEXAS,US").unwrap();
///
/// assert!(perms.add(RuleKind::Include, &austin).unwrap());
/// assert!(!perms.add(RuleKind::Include, &austin).unwrap());
/// assert!(perms.contains(RuleKind::Include, &austin));
///
/// perms.remove(RuleKind::Include, &austin).unwrap();
/// assert!(perms.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    include: LocationTree,
    exclude: LocationTree,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from prepared trees.
    ///
    /// Unlike [`add`](Self::add), this accepts entries at any depth, e.g. a
    /// country-only include with no provinces.
    pub fn from_trees(include: LocationTree, exclude: LocationTree) -> Self {
        Self { include, exclude }
    }

    /// Adds a full triple to one side.
    ///
    /// Returns `Ok(false)` when the entry was already present.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidLocation` for a partial location.
    pub fn add(&mut self, kind: RuleKind, location: &Location) -> Result<bool> {
        location.require_full()?;
        Ok(self.tree_mut(kind).insert(location))
    }

    /// Removes a full triple from one side, pruning emptied branches.
    ///
    /// Returns `Ok(false)` when there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidLocation` for a partial location.
    pub fn remove(&mut self, kind: RuleKind, location: &Location) -> Result<bool> {
        location.require_full()?;
        Ok(self.tree_mut(kind).remove(location))
    }

    /// Exact-path membership of a full triple
    pub fn contains(&self, kind: RuleKind, location: &Location) -> bool {
        self.tree(kind).contains_leaf(location)
    }

    /// Drops every entry on one side
    pub fn wipe(&mut self, kind: RuleKind) {
        self.tree_mut(kind).clear();
    }

    /// All stored triples on one side, sorted
    pub fn entries(&self, kind: RuleKind) -> Vec<Location> {
        self.tree(kind).leaves().collect()
    }

    pub fn tree(&self, kind: RuleKind) -> &LocationTree {
        match kind {
            RuleKind::Include => &self.include,
            RuleKind::Exclude => &self.exclude,
        }
    }

    fn tree_mut(&mut self, kind: RuleKind) -> &mut LocationTree {
        match kind {
            RuleKind::Include => &mut self.include,
            RuleKind::Exclude => &mut self.exclude,
        }
    }

    /// True when both sides are empty
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}
