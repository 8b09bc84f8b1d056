use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::generation::CountryParams;
use crate::world::countries::{Country, Province, generate_countries_with};
use crate::world::noise::NoiseKind;

/// Parameters a cached country set was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub grid_radius: i32,
    pub num_countries: i32,
    pub seed: u64,
    pub noise: NoiseKind,
}

/// Single-slot cache of the last generated country set.
///
/// Owned by the caller. A request with different parameters replaces the
/// cached entry; results are immutable and shared through `Arc`.
#[derive(Debug, Default)]
pub struct CountryCache {
    entry: Option<(CacheKey, Arc<[Country]>)>,
}

impl CountryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached countries for these parameters, generating them on a miss.
    pub fn get_or_generate(
        &mut self,
        grid_radius: i32,
        num_countries: i32,
        seed: u64,
        noise: NoiseKind,
    ) -> Arc<[Country]> {
        let key = CacheKey {
            grid_radius,
            num_countries,
            seed,
            noise,
        };
        if let Some((cached_key, countries)) = &self.entry {
            if *cached_key == key {
                return Arc::clone(countries);
            }
            debug!(?cached_key, ?key, "parameters changed; regenerating countries");
        }

        let params = CountryParams {
            grid_radius,
            num_countries,
            seed: Some(seed),
            noise,
        };
        let countries: Arc<[Country]> = generate_countries_with(&params).into();
        self.entry = Some((key, Arc::clone(&countries)));
        countries
    }

    pub fn key(&self) -> Option<CacheKey> {
        self.entry.as_ref().map(|(k, _)| *k)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

/// A province together with the id of the country that owns it.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedProvince<'a> {
    pub province: &'a Province,
    pub country_id: &'a str,
}

/// Lookup tables over one generated country set.
#[derive(Debug)]
pub struct ProvinceIndex<'a> {
    countries: HashMap<&'a str, &'a Country>,
    provinces: HashMap<&'a str, ResolvedProvince<'a>>,
    by_hex: HashMap<&'a str, &'a str>,
}

impl<'a> ProvinceIndex<'a> {
    pub fn new(countries: &'a [Country]) -> Self {
        let mut index = ProvinceIndex {
            countries: HashMap::with_capacity(countries.len()),
            provinces: HashMap::new(),
            by_hex: HashMap::new(),
        };
        for country in countries {
            index.countries.insert(country.id.as_str(), country);
            for hex_id in &country.hex_ids {
                index.by_hex.insert(hex_id.as_str(), country.id.as_str());
            }
            for province in &country.territories {
                index.provinces.insert(
                    province.id.as_str(),
                    ResolvedProvince {
                        province,
                        country_id: country.id.as_str(),
                    },
                );
            }
        }
        index
    }

    pub fn country(&self, id: &str) -> Option<&'a Country> {
        self.countries.get(id).copied()
    }

    pub fn province(&self, id: &str) -> Option<ResolvedProvince<'a>> {
        self.provinces.get(id).copied()
    }

    /// Owner of a hex, including hexes outside `territories` (e.g. claimed ocean).
    pub fn owner_of_hex(&self, hex_id: &str) -> Option<&'a Country> {
        self.by_hex.get(hex_id).and_then(|id| self.country(id))
    }

    pub fn province_count(&self) -> usize {
        self.provinces.len()
    }
}
