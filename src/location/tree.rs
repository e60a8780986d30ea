//! Three-level country -> province -> city set

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::types::{Granularity, Location};

/// Cities of one province
pub type CitySet = BTreeSet<String>;

/// Provinces of one country
pub type ProvinceMap = BTreeMap<String, CitySet>;

/// Nested set of locations keyed country -> province -> city.
///
/// An entry lives at the depth it was inserted at: a country-only insert
/// creates the country key with no provinces, which reads as "the whole
/// country". Removal cascades, so a province with no cities or a country
/// with no provinces never survives a `remove`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationTree {
    countries: BTreeMap<String, ProvinceMap>,
}

impl LocationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a location, creating any missing intermediate levels.
    ///
    /// Returns `false` if the entry was already present.
    pub fn insert(&mut self, location: &Location) -> bool {
        let country_exists = self.countries.contains_key(location.country());
        let provinces = self
            .countries
            .entry(location.country().to_string())
            .or_default();

        if location.granularity() == Granularity::Country {
            return !country_exists;
        }

        let province_exists = provinces.contains_key(location.province());
        let cities = provinces
            .entry(location.province().to_string())
            .or_default();

        if location.granularity() == Granularity::Province {
            return !province_exists;
        }

        cities.insert(location.city().to_string())
    }

    /// Removes a location and prunes any ancestors left empty.
    ///
    /// Removing a province or country scope drops its whole branch.
    /// Returns `false` if nothing was removed.
    pub fn remove(&mut self, location: &Location) -> bool {
        if location.granularity() == Granularity::Country {
            return self.countries.remove(location.country()).is_some();
        }

        let Some(provinces) = self.countries.get_mut(location.country()) else {
            return false;
        };

        let removed = match location.granularity() {
            Granularity::City => match provinces.get_mut(location.province()) {
                Some(cities) => {
                    let removed = cities.remove(location.city());
                    if cities.is_empty() {
                        provinces.remove(location.province());
                    }
                    removed
                }
                None => false,
            },
            _ => provinces.remove(location.province()).is_some(),
        };

        if provinces.is_empty() {
            self.countries.remove(location.country());
        }

        removed
    }

    /// Exact three-level lookup on the fields as given.
    ///
    /// Empty fields are looked up literally, so a partial location only
    /// matches if an entry was stored under empty keys, which `insert` never
    /// does. In practice this is true only for stored full triples.
    pub fn contains_leaf(&self, location: &Location) -> bool {
        self.countries
            .get(location.country())
            .and_then(|provinces| provinces.get(location.province()))
            .is_some_and(|cities| cities.contains(location.city()))
    }

    /// Depth-aware lookup: the country, province and city named by
    /// `location` each exist at their level.
    pub fn contains_path(&self, location: &Location) -> bool {
        let Some(provinces) = self.countries.get(location.country()) else {
            return false;
        };
        if location.province().is_empty() {
            return true;
        }
        let Some(cities) = provinces.get(location.province()) else {
            return false;
        };
        location.city().is_empty() || cities.contains(location.city())
    }

    /// Provinces recorded under a country, if the country is present
    pub fn provinces(&self, country: &str) -> Option<&ProvinceMap> {
        self.countries.get(country)
    }

    /// Countries with their provinces, sorted by country
    pub fn countries(&self) -> impl Iterator<Item = (&str, &ProvinceMap)> + '_ {
        self.countries
            .iter()
            .map(|(country, provinces)| (country.as_str(), provinces))
    }

    /// Every stored full triple in sorted order
    pub fn leaves(&self) -> impl Iterator<Item = Location> + '_ {
        self.countries.iter().flat_map(|(country, provinces)| {
            provinces.iter().flat_map(move |(province, cities)| {
                cities.iter().filter_map(move |city| {
                    Location::new(country, province, city).ok()
                })
            })
        })
    }

    /// Number of stored cities
    pub fn leaf_count(&self) -> usize {
        self.countries
            .values()
            .flat_map(|provinces| provinces.values())
            .map(|cities| cities.len())
            .sum()
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn clear(&mut self) {
        self.countries.clear();
    }
}

impl<'a> FromIterator<&'a Location> for LocationTree {
    fn from_iter<I: IntoIterator<Item = &'a Location>>(iter: I) -> Self {
        let mut tree = LocationTree::new();
        for location in iter {
            tree.insert(location);
        }
        tree
    }
}
