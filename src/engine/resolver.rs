//! Policy engine: distribution checks and hierarchy-gated grants

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::decision::{Decision, DecisionReason, GrantOutcome, UnlinkOutcome};
use crate::config::EngineConfig;
use crate::distributor::{DistributorId, Registry};
use crate::error::Result;
use crate::location::{Catalog, Location};
use crate::permission::{PermissionSet, RuleKind};

/// Resolves a location against one permission set.
///
/// Evaluation order:
/// 1. An exact exclude entry for the queried fields denies. Partial queries
///    are never blocked by city-level excludes.
/// 2. A country absent from the include side denies.
/// 3. A country-only query is allowed.
/// 4. If the queried province has include entries, a province query is
///    allowed and a city query is allowed only for a listed city. If the
///    province has no entries at all, the country grant covers it.
///
/// # Examples
///
/// ```
/// use geo_authz::{resolve, Location, PermissionSet, RuleKind};
///
/// let mut perms = PermissionSet::new();
/// perms.add(RuleKind::Include, &Location::parse("AUSTIN,TX,US").unwrap()).unwrap();
///
/// assert!(resolve(&perms, &Location::parse("TX,US").unwrap()).allowed);
/// assert!(resolve(&perms, &Location::parse("CA,US").unwrap()).allowed);
/// assert!(!resolve(&perms, &Location::parse("DALLAS,TX,US").unwrap()).allowed);
/// ```
pub fn resolve(permissions: &PermissionSet, location: &Location) -> Decision {
    if permissions.tree(RuleKind::Exclude).contains_leaf(location) {
        return Decision::new(location, DecisionReason::Excluded);
    }

    let Some(provinces) = permissions
        .tree(RuleKind::Include)
        .provinces(location.country())
    else {
        return Decision::new(location, DecisionReason::CountryNotIncluded);
    };

    if location.province().is_empty() {
        return Decision::new(location, DecisionReason::CountryIncluded);
    }

    let reason = match provinces.get(location.province()) {
        Some(_) if location.city().is_empty() => DecisionReason::ProvinceIncluded,
        Some(cities) if cities.contains(location.city()) => DecisionReason::CityIncluded,
        Some(_) => DecisionReason::CityNotIncluded,
        None => DecisionReason::InheritedFromCountry,
    };
    Decision::new(location, reason)
}

/// Session-scoped policy engine.
///
/// Owns the distributor registry and shares the read-only catalog. All
/// operations run to completion synchronously; the engine is meant to be
/// driven by a single actor.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use geo_authz::{Catalog, EngineConfig, GrantOutcome, Location, PolicyEngine, RuleKind};
///
/// let toronto = Location::parse("TORONTO,ONTARIO,CANADA").unwrap();
/// let catalog = Arc::new(Catalog::from_locations([&toronto]));
/// let mut engine = PolicyEngine::new(catalog, EngineConfig::default());
///
/// engine.add_distributor("A").unwrap();
/// let outcome = engine
///     .grant("A", RuleKind::Include, "Toronto,Ontario,Canada", false)
///     .unwrap();
/// assert_eq!(outcome, GrantOutcome::Added);
///
/// let canada = Location::parse("CANADA").unwrap();
/// assert!(engine.can_distribute("A", &canada).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    config: EngineConfig,
    catalog: Arc<Catalog>,
    registry: Registry,
}

impl PolicyEngine {
    /// Creates an engine with an empty registry
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        Self {
            config,
            catalog,
            registry: Registry::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn add_distributor(&mut self, name: &str) -> Result<DistributorId> {
        self.registry.add(name)
    }

    /// Links `child` under `parent` using the configured cycle check
    pub fn link(&mut self, child: &str, parent: &str) -> Result<()> {
        self.registry.link(child, parent, self.config.cycle_check)
    }

    pub fn unlink(&mut self, name: &str) -> Result<UnlinkOutcome> {
        Ok(match self.registry.unlink(name)? {
            Some(parent) => UnlinkOutcome::Unlinked { parent },
            None => UnlinkOutcome::AlreadyOrphan,
        })
    }

    pub fn remove_distributor(&mut self, name: &str) -> Result<()> {
        self.registry.remove(name).map(|_| ())
    }

    pub fn parent_chain(&self, name: &str) -> Result<Vec<String>> {
        self.registry.parent_chain(name)
    }

    pub fn list_distributors(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn permissions(&self, name: &str) -> Result<&PermissionSet> {
        Ok(self.registry.get(name)?.permissions())
    }

    /// Clears one side of a distributor's permission set
    pub fn wipe_permissions(&mut self, name: &str, kind: RuleKind) -> Result<()> {
        self.registry.get_mut(name)?.permissions_mut().wipe(kind);
        info!(distributor = name, %kind, "Wiped permissions");
        Ok(())
    }

    /// Adds an include or exclude entry for a catalog-valid full triple.
    ///
    /// Steps, in order:
    /// 1. `location` must name a full triple present in the catalog.
    /// 2. If the triple sits on the opposite side, stop with
    ///    `ConfirmationRequired` unless `confirm_move` is set.
    /// 3. Remove the triple from the opposite side.
    /// 4. If the distributor has a parent, the parent must include this
    ///    exact triple, else `RejectedByParent`. The removal in step 3
    ///    stands either way.
    /// 5. Store the triple on the requested side.
    ///
    /// # Errors
    ///
    /// - `PolicyError::NotFound` if the distributor is unknown
    /// - `PolicyError::InvalidLocation` if the text is malformed, partial,
    ///   or not in the catalog
    pub fn grant(
        &mut self,
        name: &str,
        kind: RuleKind,
        location: &str,
        confirm_move: bool,
    ) -> Result<GrantOutcome> {
        let location = self.catalog.validate(location)?;
        location.require_full()?;

        let opposite = kind.opposite();
        let distributor = self.registry.get(name)?;
        if distributor.permissions().contains(opposite, &location) && !confirm_move {
            debug!(distributor = name, %location, existing = %opposite, "Grant needs move confirmation");
            return Ok(GrantOutcome::ConfirmationRequired { existing: opposite });
        }

        let rejecting_parent = self
            .registry
            .parent_of(name)?
            .filter(|parent| !parent.permissions().contains(RuleKind::Include, &location))
            .map(|parent| parent.name().to_string());

        let permissions = self.registry.get_mut(name)?.permissions_mut();
        let moved = permissions.remove(opposite, &location)?;

        if let Some(parent) = rejecting_parent {
            warn!(distributor = name, parent = %parent, %location, %kind, "Parent does not include location");
            return Ok(GrantOutcome::RejectedByParent { parent });
        }

        let added = permissions.add(kind, &location)?;
        let outcome = match (moved, added) {
            (true, _) => GrantOutcome::Moved { from: opposite },
            (false, true) => GrantOutcome::Added,
            (false, false) => GrantOutcome::AlreadyPresent,
        };

        info!(distributor = name, %location, %kind, ?outcome, "Granted permission");
        Ok(outcome)
    }

    pub fn grant_include(&mut self, name: &str, location: &str, confirm_move: bool) -> Result<GrantOutcome> {
        self.grant(name, RuleKind::Include, location, confirm_move)
    }

    pub fn grant_exclude(&mut self, name: &str, location: &str, confirm_move: bool) -> Result<GrantOutcome> {
        self.grant(name, RuleKind::Exclude, location, confirm_move)
    }

    /// Exact include-entry membership of a full triple
    pub fn includes(&self, name: &str, location: &Location) -> Result<bool> {
        Ok(self.permissions(name)?.contains(RuleKind::Include, location))
    }

    /// Exact exclude-entry membership of a full triple
    pub fn excludes(&self, name: &str, location: &Location) -> Result<bool> {
        Ok(self.permissions(name)?.contains(RuleKind::Exclude, location))
    }

    /// Full decision with its reason.
    ///
    /// Only the distributor's own rules are consulted; parents and the
    /// catalog are not.
    pub fn explain(&self, name: &str, location: &Location) -> Result<Decision> {
        let decision = resolve(self.permissions(name)?, location);
        debug!(
            distributor = name,
            %location,
            allowed = decision.allowed,
            reason = %decision.reason,
            "Resolved distribution check"
        );
        Ok(decision)
    }

    /// Whether the distributor may operate in `location`
    pub fn can_distribute(&self, name: &str, location: &Location) -> Result<bool> {
        Ok(self.explain(name, location)?.allowed)
    }
}
