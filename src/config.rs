//! Engine and catalog configuration

use serde::{Deserialize, Serialize};

/// How far `link` looks for loops before accepting a new parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CycleCheck {
    /// Walk the proposed parent's entire ancestor chain.
    #[default]
    FullChain,
    /// Only reject when the proposed parent's own parent is the child.
    ///
    /// Longer loops (A < B < C < A) slip through this check.
    OneHop,
}

/// Column layout of the tabular reference catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// 0-based column holding the city name
    pub city_column: usize,

    /// 0-based column holding the province name
    pub province_column: usize,

    /// 0-based column holding the country name
    pub country_column: usize,

    /// Skip the first row
    pub has_header: bool,

    /// Field delimiter
    pub delimiter: u8,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            city_column: 3,
            province_column: 4,
            country_column: 5,
            has_header: true,
            delimiter: b',',
        }
    }
}

/// Configuration for the policy engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub cycle_check: CycleCheck,
    pub catalog: CatalogConfig,
}
