//! Reference catalog of known (city, province, country) places

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use super::tree::LocationTree;
use super::types::{normalize, Location};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, PolicyError, Result};

/// Read-only set of valid places, used to validate typed-in locations.
///
/// The catalog is built once and never mutated afterwards. It is independent
/// of any distributor's permissions.
///
/// # Examples
///
/// ```
/// use geo_authz::{Catalog, CatalogConfig};
///
/// let csv = "City Code,Province Code,Country Code,City Name,Province Name,Country Name\n\
///            TRNTO,ON,CA,Toronto,Ontario,Canada\n";
/// let catalog = Catalog::from_reader(csv.as_bytes(), &CatalogConfig::default()).unwrap();
///
/// assert!(catalog.is_valid("toronto,ontario,canada"));
/// assert!(catalog.is_valid("Ontario, Canada"));
/// assert!(!catalog.is_valid("Ottawa,Ontario,Canada"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    places: LocationTree,
}

impl Catalog {
    /// Loads the catalog from a tabular file on disk.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be opened or a row is
    /// malformed. Either is fatal for a session.
    pub fn load(path: impl AsRef<Path>, config: &CatalogConfig) -> std::result::Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::from_reader(file, config)?;
        info!(
            path = %path.display(),
            countries = catalog.places.country_count(),
            cities = catalog.len(),
            "Loaded location catalog"
        );
        Ok(catalog)
    }

    /// Builds the catalog from any tabular source.
    ///
    /// Each row contributes one triple taken from the configured columns;
    /// other columns are ignored. Repeated rows are harmless.
    pub fn from_reader<R: Read>(reader: R, config: &CatalogConfig) -> std::result::Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(config.has_header)
            .delimiter(config.delimiter)
            .flexible(true)
            .from_reader(reader);

        let header_rows = usize::from(config.has_header);
        let mut places = LocationTree::new();

        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row = index + header_rows + 1;

            let field = |column: usize| -> std::result::Result<String, CatalogError> {
                let value = record
                    .get(column)
                    .ok_or(CatalogError::MissingColumn { row, column })?;
                let value = normalize(value);
                if value.is_empty() {
                    return Err(CatalogError::EmptyField { row, column });
                }
                Ok(value)
            };

            let city = field(config.city_column)?;
            let province = field(config.province_column)?;
            let country = field(config.country_column)?;

            // All three fields are non-empty, so the prefix check cannot fail.
            if let Ok(location) = Location::new(&country, &province, &city) {
                places.insert(&location);
            }
        }

        Ok(Self { places })
    }

    /// Builds a catalog directly from known places
    pub fn from_locations<'a>(locations: impl IntoIterator<Item = &'a Location>) -> Self {
        Self {
            places: locations.into_iter().collect(),
        }
    }

    /// True when the text names a place in the catalog at its granularity.
    ///
    /// Text with zero or more than three parts is invalid without a lookup.
    pub fn is_valid(&self, text: &str) -> bool {
        self.validate(text).is_ok()
    }

    /// True when every level named by `location` exists in the catalog
    pub fn contains(&self, location: &Location) -> bool {
        self.places.contains_path(location)
    }

    /// Parses the text and checks it against the catalog.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidLocation` if the text is malformed or the
    /// place is unknown.
    pub fn validate(&self, text: &str) -> Result<Location> {
        let location = Location::parse(text)?;
        if !self.contains(&location) {
            debug!(location = %location, "Location not present in catalog");
            return Err(PolicyError::invalid_location(text, "unknown place"));
        }
        Ok(location)
    }

    /// Serializes the catalog as nested JSON objects
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.places)
    }

    /// Number of distinct cities
    pub fn len(&self) -> usize {
        self.places.leaf_count()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}
