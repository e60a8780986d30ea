//! Policy engine module.
//!
//! Answers "may this distributor operate here?" for locations given at any
//! granularity, and applies include/exclude grants under the rule that a
//! child may only be granted triples its parent already includes.

mod decision;
mod resolver;

pub use decision::{Decision, DecisionReason, GrantOutcome, UnlinkOutcome};
pub use resolver::{resolve, PolicyEngine};

#[cfg(test)]
mod tests;
