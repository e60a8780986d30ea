//! Location value types and parsing

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PolicyError, Result};

/// Trims surrounding whitespace and uppercases a location or command token.
///
/// Every comparison in the engine happens on strings in this form.
pub fn normalize(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Depth at which a [`Location`] is specified
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Granularity {
    Country,
    Province,
    City,
}

/// A normalized geographic scope: country, country+province, or a full
/// city/province/country triple.
///
/// Non-empty fields always form a prefix-complete path: a city implies a
/// province, and a province implies a country. An all-empty location cannot
/// be constructed.
///
/// # Examples
///
/// ```
/// use geo_authz::{Granularity, Location};
///
/// let loc = Location::parse("Austin, Texas, united states").unwrap();
/// assert_eq!(loc.city(), "AUSTIN");
/// assert_eq!(loc.province(), "TEXAS");
/// assert_eq!(loc.country(), "UNITED STATES");
/// assert_eq!(loc.granularity(), Granularity::City);
///
/// let loc = Location::parse("texas,united states").unwrap();
/// assert_eq!(loc.granularity(), Granularity::Province);
/// assert!(loc.city().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    country: String,
    province: String,
    city: String,
}

impl Location {
    /// Creates a location from its fields, most general first.
    ///
    /// Fields are normalized. Empty trailing fields act as wildcards.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidLocation` if the country is empty or a
    /// city is given without a province.
    pub fn new(country: &str, province: &str, city: &str) -> Result<Self> {
        let location = Self {
            country: normalize(country),
            province: normalize(province),
            city: normalize(city),
        };
        location.check_prefix()?;
        Ok(location)
    }

    /// Shorthand for a country-only scope
    pub fn country_scope(country: &str) -> Result<Self> {
        Self::new(country, "", "")
    }

    /// Shorthand for a country+province scope
    pub fn province_scope(province: &str, country: &str) -> Result<Self> {
        Self::new(country, province, "")
    }

    /// Shorthand for a full city/province/country triple
    pub fn city_scope(city: &str, province: &str, country: &str) -> Result<Self> {
        Self::new(country, province, city)
    }

    /// Parses comma-separated text read right to left as
    /// `[city,] [province,] country`.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidLocation` when the text has more than
    /// three parts, when the country is empty, or when a city is given with
    /// an empty province (`"AUSTIN,,US"`).
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(',').collect();

        let (city, province, country) = match parts.as_slice() {
            [country] => ("", "", *country),
            [province, country] => ("", *province, *country),
            [city, province, country] => (*city, *province, *country),
            _ => {
                return Err(PolicyError::invalid_location(
                    text,
                    format!("expected 1 to 3 comma-separated parts, found {}", parts.len()),
                ))
            }
        };

        let location = Self {
            country: normalize(country),
            province: normalize(province),
            city: normalize(city),
        };

        location
            .check_prefix()
            .map_err(|err| match err {
                PolicyError::InvalidLocation { reason, .. } => {
                    PolicyError::invalid_location(text, reason)
                }
                other => other,
            })?;

        Ok(location)
    }

    fn check_prefix(&self) -> Result<()> {
        if self.country.is_empty() {
            return Err(PolicyError::invalid_location(
                &self.to_string(),
                "country is required",
            ));
        }
        if !self.city.is_empty() && self.province.is_empty() {
            return Err(PolicyError::invalid_location(
                &self.to_string(),
                "a city requires its province",
            ));
        }
        Ok(())
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn province(&self) -> &str {
        &self.province
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Returns how deep this location reaches
    pub fn granularity(&self) -> Granularity {
        if !self.city.is_empty() {
            Granularity::City
        } else if !self.province.is_empty() {
            Granularity::Province
        } else {
            Granularity::Country
        }
    }

    /// True when city, province and country are all present
    pub fn is_full(&self) -> bool {
        self.granularity() == Granularity::City
    }

    /// Returns the next coarser scope, or `None` for a country.
    ///
    /// ```
    /// use geo_authz::Location;
    ///
    /// let loc = Location::parse("TORONTO,ONTARIO,CANADA").unwrap();
    /// let province = loc.parent().unwrap();
    /// assert_eq!(province.to_string(), "ONTARIO, CANADA");
    /// assert_eq!(province.parent().unwrap().to_string(), "CANADA");
    /// assert!(province.parent().unwrap().parent().is_none());
    /// ```
    pub fn parent(&self) -> Option<Location> {
        match self.granularity() {
            Granularity::City => Some(Self {
                country: self.country.clone(),
                province: self.province.clone(),
                city: String::new(),
            }),
            Granularity::Province => Some(Self {
                country: self.country.clone(),
                province: String::new(),
                city: String::new(),
            }),
            Granularity::Country => None,
        }
    }

    /// Fails with `InvalidLocation` unless this is a full triple
    pub(crate) fn require_full(&self) -> Result<()> {
        if self.is_full() {
            Ok(())
        } else {
            Err(PolicyError::invalid_location(
                &self.to_string(),
                "a full <City>,<Province>,<Country> location is required",
            ))
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [self.city.as_str(), self.province.as_str(), self.country.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::str::FromStr for Location {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
