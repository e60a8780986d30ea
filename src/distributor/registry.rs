//! Session-scoped registry of distributors and their parent links

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use super::types::{Distributor, DistributorId};
use crate::config::CycleCheck;
use crate::error::{PolicyError, Result};

/// Owns every distributor of a session.
///
/// Parent links are stored as [`DistributorId`]s into this registry, never
/// as references, so a distributor that is still somebody's parent cannot be
/// removed and no link can dangle. Distributors form a forest.
///
/// # Examples
///
/// ```
/// use geo_authz::{CycleCheck, Registry};
///
/// let mut registry = Registry::new();
/// registry.add("ROOT").unwrap();
/// registry.add("REGIONAL").unwrap();
/// registry.add("LOCAL").unwrap();
///
/// registry.link("REGIONAL", "ROOT", CycleCheck::FullChain).unwrap();
/// registry.link("LOCAL", "REGIONAL", CycleCheck::FullChain).unwrap();
///
/// assert_eq!(registry.parent_chain("LOCAL").unwrap(), vec!["ROOT", "REGIONAL"]);
/// assert!(registry.link("ROOT", "LOCAL", CycleCheck::FullChain).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    next_id: u64,
    distributors: IndexMap<DistributorId, Distributor>,
    names: HashMap<String, DistributorId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parentless distributor with no permissions.
    ///
    /// # Errors
    ///
    /// - `PolicyError::InvalidName` if the trimmed name is empty
    /// - `PolicyError::AlreadyExists` if the name is taken
    pub fn add(&mut self, name: &str) -> Result<DistributorId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PolicyError::InvalidName {
                name: name.to_string(),
            });
        }
        if self.names.contains_key(name) {
            return Err(PolicyError::AlreadyExists {
                name: name.to_string(),
            });
        }

        let id = DistributorId::new(self.next_id);
        self.next_id += 1;

        self.distributors
            .insert(id, Distributor::new(id, name.to_string()));
        self.names.insert(name.to_string(), id);

        info!(distributor = name, %id, "Added distributor");
        Ok(id)
    }

    /// Resolves a name to its id
    pub fn id_of(&self, name: &str) -> Result<DistributorId> {
        self.names
            .get(name.trim())
            .copied()
            .ok_or_else(|| PolicyError::not_found(name.trim()))
    }

    pub fn get(&self, name: &str) -> Result<&Distributor> {
        let id = self.id_of(name)?;
        self.distributors
            .get(&id)
            .ok_or_else(|| PolicyError::not_found(name.trim()))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Result<&mut Distributor> {
        let id = self.id_of(name)?;
        self.distributors
            .get_mut(&id)
            .ok_or_else(|| PolicyError::not_found(name.trim()))
    }

    pub fn get_by_id(&self, id: DistributorId) -> Option<&Distributor> {
        self.distributors.get(&id)
    }

    /// The distributor's parent, if it has one
    pub fn parent_of(&self, name: &str) -> Result<Option<&Distributor>> {
        let distributor = self.get(name)?;
        Ok(distributor.parent().and_then(|id| self.get_by_id(id)))
    }

    /// Makes `parent` the parent of `child`.
    ///
    /// # Errors
    ///
    /// - `PolicyError::NotFound` if either name is unknown
    /// - `PolicyError::NonEmptyPermissions` if the child holds any include
    ///   or exclude entry
    /// - `PolicyError::CycleDetected` if the link would close a loop, as far
    ///   as `cycle_check` looks
    pub fn link(&mut self, child: &str, parent: &str, cycle_check: CycleCheck) -> Result<()> {
        let parent_id = self.id_of(parent)?;
        let child_id = self.id_of(child)?;

        let child_ref = self.get(child)?;
        if !child_ref.permissions().is_empty() {
            return Err(PolicyError::NonEmptyPermissions {
                name: child_ref.name().to_string(),
            });
        }

        if let Some(chain) = self.find_cycle(child_id, parent_id, cycle_check) {
            warn!(child, parent, "Rejected link that would create a cycle");
            return Err(PolicyError::CycleDetected {
                child: child.trim().to_string(),
                parent: parent.trim().to_string(),
                chain,
            });
        }

        self.get_mut(child)?.set_parent(Some(parent_id));
        info!(child, parent, "Linked distributor to parent");
        Ok(())
    }

    /// Returns the loop `child < ... < parent` that linking would close, if any
    fn find_cycle(
        &self,
        child: DistributorId,
        parent: DistributorId,
        cycle_check: CycleCheck,
    ) -> Option<Vec<String>> {
        if child == parent {
            return Some(vec![self.name_of(child)]);
        }

        match cycle_check {
            CycleCheck::OneHop => {
                let grandparent = self.get_by_id(parent).and_then(Distributor::parent);
                (grandparent == Some(child))
                    .then(|| vec![self.name_of(child), self.name_of(parent)])
            }
            CycleCheck::FullChain => {
                let mut path = Vec::new();
                let mut visited = HashSet::new();
                let mut current = Some(parent);

                while let Some(id) = current {
                    if !visited.insert(id) {
                        break;
                    }
                    path.push(self.name_of(id));
                    if id == child {
                        path.reverse();
                        return Some(path);
                    }
                    current = self.get_by_id(id).and_then(Distributor::parent);
                }
                None
            }
        }
    }

    fn name_of(&self, id: DistributorId) -> String {
        self.get_by_id(id)
            .map(|d| d.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// Clears the parent link.
    ///
    /// Returns the former parent's name, or `None` if the distributor was
    /// already parentless.
    pub fn unlink(&mut self, name: &str) -> Result<Option<String>> {
        let previous = self.get_mut(name)?.set_parent(None);
        let previous = previous.map(|id| self.name_of(id));

        match &previous {
            Some(parent) => info!(distributor = name, parent = %parent, "Unlinked distributor"),
            None => debug!(distributor = name, "Distributor already has no parent"),
        }
        Ok(previous)
    }

    /// Deletes a distributor that is nobody's parent.
    ///
    /// # Errors
    ///
    /// - `PolicyError::NotFound` if the name is unknown
    /// - `PolicyError::HasChildren` if another distributor links to it
    pub fn remove(&mut self, name: &str) -> Result<Distributor> {
        let id = self.id_of(name)?;

        if let Some(child) = self.children_of(id).next() {
            return Err(PolicyError::HasChildren {
                name: name.trim().to_string(),
                child: child.name().to_string(),
            });
        }

        let removed = self
            .distributors
            .shift_remove(&id)
            .ok_or_else(|| PolicyError::not_found(name.trim()))?;
        self.names.remove(removed.name());

        info!(distributor = removed.name(), "Removed distributor");
        Ok(removed)
    }

    /// Distributors whose parent is `id`
    pub fn children_of(&self, id: DistributorId) -> impl Iterator<Item = &Distributor> + '_ {
        self.distributors
            .values()
            .filter(move |d| d.parent() == Some(id))
    }

    /// Ancestor names from the root down to the immediate parent.
    ///
    /// Empty for a parentless distributor. The walk stops if it ever meets a
    /// distributor twice.
    pub fn parent_chain(&self, name: &str) -> Result<Vec<String>> {
        let distributor = self.get(name)?;

        let mut chain = Vec::new();
        let mut visited = HashSet::from([distributor.id()]);
        let mut current = distributor.parent();

        while let Some(id) = current {
            if !visited.insert(id) {
                warn!(distributor = name, "Parent chain loops back on itself");
                break;
            }
            let Some(ancestor) = self.get_by_id(id) else {
                break;
            };
            chain.push(ancestor.name().to_string());
            current = ancestor.parent();
        }

        chain.reverse();
        Ok(chain)
    }

    /// Registered names in creation order
    pub fn names(&self) -> Vec<String> {
        self.distributors
            .values()
            .map(|d| d.name().to_string())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Distributor> + '_ {
        self.distributors.values()
    }

    pub fn len(&self) -> usize {
        self.distributors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distributors.is_empty()
    }
}
