//! Decision and outcome types returned by the policy engine

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::location::Location;
use crate::permission::RuleKind;

/// Why `can_distribute` answered the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionReason {
    /// The queried triple is an exact exclude entry
    Excluded,
    /// No include entry exists for the country
    CountryNotIncluded,
    /// Country-only query against an included country
    CountryIncluded,
    /// Province query against a province with explicit include entries
    ProvinceIncluded,
    /// The queried city is an explicit include entry
    CityIncluded,
    /// The province was never scoped, so the country-level grant applies
    InheritedFromCountry,
    /// The province is scoped to other cities only
    CityNotIncluded,
}

impl DecisionReason {
    pub fn is_allow(&self) -> bool {
        matches!(
            self,
            DecisionReason::CountryIncluded
                | DecisionReason::ProvinceIncluded
                | DecisionReason::CityIncluded
                | DecisionReason::InheritedFromCountry
        )
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DecisionReason::Excluded => "location is explicitly excluded",
            DecisionReason::CountryNotIncluded => "country is not included",
            DecisionReason::CountryIncluded => "country is included",
            DecisionReason::ProvinceIncluded => "province is included",
            DecisionReason::CityIncluded => "city is included",
            DecisionReason::InheritedFromCountry => "province inherits the country grant",
            DecisionReason::CityNotIncluded => "province is limited to other cities",
        };
        write!(f, "{}", text)
    }
}

/// Result of resolving one location for one distributor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub location: Location,
    pub allowed: bool,
    pub reason: DecisionReason,
}

impl Decision {
    pub(crate) fn new(location: &Location, reason: DecisionReason) -> Self {
        Self {
            location: location.clone(),
            allowed: reason.is_allow(),
            reason,
        }
    }
}

/// Result of an include or exclude grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantOutcome {
    /// Entry stored
    Added,
    /// Entry was already on the requested side; nothing changed
    AlreadyPresent,
    /// Entry moved off the opposite side and stored
    Moved { from: RuleKind },
    /// The parent does not include this exact triple; entry not stored
    RejectedByParent { parent: String },
    /// The entry sits on the opposite side and the move was not confirmed;
    /// nothing changed
    ConfirmationRequired { existing: RuleKind },
}

/// Result of clearing a parent link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnlinkOutcome {
    Unlinked { parent: String },
    AlreadyOrphan,
}
