//! Distributor identity and state

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::permission::PermissionSet;

/// Stable registry handle for a distributor.
///
/// Ids are never reused within a registry, so a stale id simply fails to
/// resolve after its distributor is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DistributorId(u64);

impl DistributorId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DistributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named principal with at most one parent and its own permission set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distributor {
    id: DistributorId,
    name: String,
    parent: Option<DistributorId>,
    permissions: PermissionSet,
}

impl Distributor {
    pub(crate) fn new(id: DistributorId, name: String) -> Self {
        Self {
            id,
            name,
            parent: None,
            permissions: PermissionSet::new(),
        }
    }

    pub fn id(&self) -> DistributorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<DistributorId> {
        self.parent
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub(crate) fn permissions_mut(&mut self) -> &mut PermissionSet {
        &mut self.permissions
    }

    pub(crate) fn set_parent(&mut self, parent: Option<DistributorId>) -> Option<DistributorId> {
        std::mem::replace(&mut self.parent, parent)
    }
}
