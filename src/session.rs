//! Command interface over the policy engine.
//!
//! Front ends (the interactive shell, tests) describe each operation as a
//! [`Command`] and receive an [`Outcome`] that renders the user-facing
//! message. The engine itself knows nothing about text prompts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::engine::{GrantOutcome, PolicyEngine, UnlinkOutcome};
use crate::error::Result;
use crate::location::{Catalog, Location};
use crate::permission::RuleKind;

/// One operation a session can perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    AddDistributor {
        name: String,
    },
    Grant {
        name: String,
        kind: RuleKind,
        location: String,
        confirm_move: bool,
    },
    Link {
        child: String,
        parent: String,
    },
    Remove {
        name: String,
    },
    List,
    Wipe {
        name: String,
        kind: RuleKind,
    },
    ParentChain {
        name: String,
    },
    Permissions {
        name: String,
    },
    CanDistribute {
        name: String,
        location: String,
    },
    Unlink {
        name: String,
    },
}

/// Successful result of a [`Command`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    DistributorAdded {
        name: String,
    },
    Granted {
        name: String,
        kind: RuleKind,
        location: String,
        result: GrantOutcome,
    },
    Linked {
        child: String,
        parent: String,
    },
    Removed {
        name: String,
    },
    Distributors(Vec<String>),
    Wiped {
        name: String,
        kind: RuleKind,
    },
    ParentChain {
        name: String,
        chain: Vec<String>,
    },
    Permissions {
        name: String,
        include: Vec<Location>,
        exclude: Vec<Location>,
    },
    Distribution {
        name: String,
        location: Location,
        allowed: bool,
    },
    Unlinked {
        name: String,
        result: UnlinkOutcome,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::DistributorAdded { name } => write!(f, "Added new distributor: {}", name),
            Outcome::Granted {
                name,
                kind,
                location,
                result,
            } => match result {
                GrantOutcome::Added => {
                    write!(f, "Added {} to the {} permissions for distributor {}.", location, kind, name)
                }
                GrantOutcome::AlreadyPresent => {
                    write!(f, "Location {} already in the {} permissions for distributor {}.", location, kind, name)
                }
                GrantOutcome::Moved { from } => write!(
                    f,
                    "Moved {} from {} to {} for distributor {}.",
                    location, from, kind, name
                ),
                GrantOutcome::RejectedByParent { parent } => write!(
                    f,
                    "Cannot add {} for {}: parent {} has not included it yet.",
                    location, name, parent
                ),
                GrantOutcome::ConfirmationRequired { existing } => write!(
                    f,
                    "Location {} is already in the {} permissions for distributor {}. Move it to {}?",
                    location, existing, name, kind
                ),
            },
            Outcome::Linked { child, parent } => {
                write!(f, "Linked distributor {} to parent {}", child, parent)
            }
            Outcome::Removed { name } => {
                write!(f, "Removed {} successfully from distributors list.", name)
            }
            Outcome::Distributors(names) => {
                write!(f, "Distributors:")?;
                for name in names {
                    write!(f, "\n- {}", name)?;
                }
                Ok(())
            }
            Outcome::Wiped { name, kind } => {
                write!(f, "Wiped {} list for distributor {}.", kind, name)
            }
            Outcome::ParentChain { name, chain } => {
                if chain.is_empty() {
                    write!(f, "Distributor {} has no parents", name)
                } else {
                    write!(f, "{}", chain.join(" < "))
                }
            }
            Outcome::Permissions {
                name,
                include,
                exclude,
            } => {
                write!(f, "Permissions for {}:", name)?;
                for location in include {
                    write!(f, "\n{}: {}", RuleKind::Include, location)?;
                }
                for location in exclude {
                    write!(f, "\n{}: {}", RuleKind::Exclude, location)?;
                }
                Ok(())
            }
            Outcome::Distribution {
                name,
                location,
                allowed,
            } => {
                let verb = if *allowed { "can" } else { "cannot" };
                write!(f, "Distributor {} {} distribute in {}", name, verb, location)
            }
            Outcome::Unlinked { name, result } => match result {
                UnlinkOutcome::Unlinked { parent } => {
                    write!(f, "Distributor {} unlinked from its parent {}", name, parent)
                }
                UnlinkOutcome::AlreadyOrphan => write!(f, "Distributor {} has no parent", name),
            },
        }
    }
}

/// One interactive session: its own registry over a shared catalog.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use geo_authz::{Catalog, Command, EngineConfig, Location, Outcome, Session};
///
/// let austin = Location::parse("AUSTIN,TEXAS,US").unwrap();
/// let mut session = Session::new(Arc::new(Catalog::from_locations([&austin])), EngineConfig::default());
///
/// session.submit(Command::AddDistributor { name: "ACME".into() }).unwrap();
/// let outcome = session
///     .submit(Command::CanDistribute { name: "ACME".into(), location: "US".into() })
///     .unwrap();
/// assert_eq!(outcome.to_string(), "Distributor ACME cannot distribute in US");
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    engine: PolicyEngine,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        Self {
            engine: PolicyEngine::new(catalog, config),
        }
    }

    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Runs one command to completion
    pub fn submit(&mut self, command: Command) -> Result<Outcome> {
        let engine = &mut self.engine;

        let outcome = match command {
            Command::AddDistributor { name } => {
                engine.add_distributor(&name)?;
                Outcome::DistributorAdded {
                    name: name.trim().to_string(),
                }
            }
            Command::Grant {
                name,
                kind,
                location,
                confirm_move,
            } => {
                let result = engine.grant(&name, kind, &location, confirm_move)?;
                Outcome::Granted {
                    name,
                    kind,
                    location,
                    result,
                }
            }
            Command::Link { child, parent } => {
                engine.link(&child, &parent)?;
                Outcome::Linked { child, parent }
            }
            Command::Remove { name } => {
                engine.remove_distributor(&name)?;
                Outcome::Removed { name }
            }
            Command::List => Outcome::Distributors(engine.list_distributors()),
            Command::Wipe { name, kind } => {
                engine.wipe_permissions(&name, kind)?;
                Outcome::Wiped { name, kind }
            }
            Command::ParentChain { name } => {
                let chain = engine.parent_chain(&name)?;
                Outcome::ParentChain { name, chain }
            }
            Command::Permissions { name } => {
                let permissions = engine.permissions(&name)?;
                Outcome::Permissions {
                    include: permissions.entries(RuleKind::Include),
                    exclude: permissions.entries(RuleKind::Exclude),
                    name,
                }
            }
            Command::CanDistribute { name, location } => {
                let location = Location::parse(&location)?;
                let allowed = engine.can_distribute(&name, &location)?;
                Outcome::Distribution {
                    name,
                    location,
                    allowed,
                }
            }
            Command::Unlink { name } => {
                let result = engine.unlink(&name)?;
                Outcome::Unlinked { name, result }
            }
        };

        Ok(outcome)
    }
}
