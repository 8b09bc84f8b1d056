use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::generation::CountryParams;
use crate::world::generation::{edge_falloff, sample_environment, shape_elevation};
use crate::world::hex::{HexCoord, circular_grid};
use crate::world::noise::NoiseSource;
use crate::world::rng::WorldRng;
use crate::world::terrain::{DevelopmentTier, TerrainThresholds, TerrainType, base_stats};

/// Hexes farther than this fraction of the grid radius are left as open sea.
pub const LAND_RADIUS_FACTOR: f64 = 0.85;

const SIZE_VARIATION: Range<f64> = 0.75..2.2;
/// Cap on a country's share of the land still unclaimed, relative to an even split.
const SOFT_CAP_FACTOR: f64 = 1.1;
const MIN_TARGET_SIZE: f64 = 3.0;

const ENV_JITTER: Range<f64> = -0.05..0.05;
const POPULATION_FACTOR: Range<f64> = 0.85..1.2;
const GDP_FACTOR: Range<f64> = 0.9..1.15;

/// Golden angle in degrees; consecutive countries land far apart on the hue wheel.
const GOLDEN_ANGLE: f64 = 137.508;

const NAME_PREFIXES: [&str; 30] = [
    "Nor", "Ald", "Val", "Kor", "Bel", "Mor", "Thal", "Dor", "Kal", "Ven", "Ash", "Lor", "Var",
    "Zar", "Fel", "Gal", "Hal", "Jor", "Kyr", "Mel", "Nex", "Pol", "Ras", "Sil", "Tel", "Uth",
    "Wyr", "Xan", "Yor", "Zul",
];

const NAME_SUFFIXES: [&str; 20] = [
    "aria", "heim", "land", "onia", "ovia", "mark", "stan", "dor", "varia", "tania", "donia",
    "burg", "moor", "vale", "reach", "garde", "ros", "thia", "wyn", "ara",
];

const GOVERNMENTS: [&str; 8] = [
    "Constitutional Monarchy",
    "Republic",
    "Empire",
    "Federation",
    "Principality",
    "Kingdom",
    "Theocracy",
    "Democracy",
];

const SETTLEMENT_ROOTS: [&str; 16] = [
    "Ash", "Bram", "Cold", "Elm", "Fair", "Glen", "High", "Iron", "Kings", "Long", "Mill",
    "Oak", "Red", "Stone", "West", "Wolf",
];

const SETTLEMENT_ENDINGS: [&str; 10] = [
    "ford", "ton", "wick", "haven", "by", "stead", "holm", "field", "gate", "bury",
];

// === Types ===

/// Settlement unit synthesized from one claimed hex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Province {
    pub id: String,
    pub hex_id: String,
    pub name: String,
    pub coord: HexCoord,
    pub terrain: TerrainType,
    /// Whole percent, 0-100.
    pub elevation: u8,
    pub population: u64,
    pub development: u32,
    pub supply_limit: u32,
    pub gdp: u64,
}

impl Province {
    pub fn is_land(&self) -> bool {
        self.terrain.is_land()
    }

    pub fn development_tier(&self) -> DevelopmentTier {
        DevelopmentTier::from_development(self.development)
    }
}

/// Point on the unit sphere in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpherePoint {
    pub lat: f64,
    pub lng: f64,
}

/// A contiguous group of provinces with rolled-up statistics.
///
/// `territories` holds the land provinces (or every claimed province when none
/// is land); `hex_ids` and `terrain_breakdown` cover every claimed hex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: String,
    pub name: String,
    pub color: String,
    pub hex_ids: Vec<String>,
    pub territories: Vec<Province>,
    /// Name of the capital province.
    pub capital: String,
    pub capital_province_id: String,
    pub population: u64,
    pub gdp: u64,
    pub supply_capacity: u64,
    pub average_development: u32,
    pub government: String,
    pub seed_point: SpherePoint,
    pub terrain_breakdown: BTreeMap<TerrainType, u32>,
}

// === Generation ===

/// Partition a hex disk into countries. See [`generate_countries_with`].
pub fn generate_countries(grid_radius: i32, num_countries: i32, seed: Option<u64>) -> Vec<Country> {
    generate_countries_with(&CountryParams::new(grid_radius, num_countries, seed))
}

/// Grow up to `num_countries` countries over the inner land disk.
///
/// Each country starts from a random unclaimed hex and grows by randomized
/// breadth-first flood fill until it reaches its target size or runs out of
/// room. A hex leaves the available pool the moment it is claimed, so no hex
/// belongs to two countries. Non-positive radius or count yields no countries.
pub fn generate_countries_with(params: &CountryParams) -> Vec<Country> {
    if params.grid_radius <= 0 || params.num_countries <= 0 {
        debug!(
            grid_radius = params.grid_radius,
            num_countries = params.num_countries,
            "nothing to generate"
        );
        return Vec::new();
    }

    let mut rng = WorldRng::from_optional_seed(params.seed);
    let seed = rng.seed();
    let noise = params.noise.build();
    let thresholds = TerrainThresholds::default();
    let land_radius = params.grid_radius as f64 * LAND_RADIUS_FACTOR;

    let mut available = land_hexes(params.grid_radius);
    let num_countries = params.num_countries as usize;
    let avg_country_size = available.len() as f64 / num_countries as f64;
    let color_offset = rng.next_f64();

    let mut countries = Vec::new();
    for index in 0..num_countries {
        if available.is_empty() {
            break;
        }
        let Some(&start) = available.iter().nth(rng.index(available.len())) else {
            break;
        };

        let target = target_size(
            avg_country_size,
            rng.range_f64(SIZE_VARIATION),
            available.len(),
            num_countries - index,
        );
        let claimed = grow_region(start, &mut available, target, &mut rng);
        if claimed.is_empty() {
            warn!(index, "country claimed no hexes; dropped");
            continue;
        }

        let provinces: Vec<Province> = claimed
            .iter()
            .map(|&coord| {
                synthesize_province(coord, noise.as_ref(), seed, land_radius, &thresholds, &mut rng)
            })
            .collect();

        let country = assemble_country(index, provinces, color_offset, &mut rng);
        debug!(
            id = %country.id,
            name = %country.name,
            hexes = country.hex_ids.len(),
            target,
            "country grown"
        );
        countries.push(country);
    }

    info!(
        seed,
        countries = countries.len(),
        unclaimed = available.len(),
        "countries generated"
    );
    countries
}

/// Hexes of the radius-`grid_radius` disk lying strictly inside the land radius.
pub fn land_hexes(grid_radius: i32) -> BTreeSet<HexCoord> {
    let limit = grid_radius as f64 * LAND_RADIUS_FACTOR;
    circular_grid(grid_radius)
        .into_iter()
        .filter(|c| c.axial_length() < limit)
        .collect()
}

/// `avg * variation`, capped at 1.1x an even split of what is left, floored at 3.
fn target_size(avg: f64, variation: f64, available: usize, remaining_countries: usize) -> usize {
    let soft_cap = SOFT_CAP_FACTOR * available as f64 / remaining_countries.max(1) as f64;
    (avg * variation).min(soft_cap).max(MIN_TARGET_SIZE).floor() as usize
}

/// Randomized breadth-first flood fill from `start`, claiming at most `target` hexes.
fn grow_region(
    start: HexCoord,
    available: &mut BTreeSet<HexCoord>,
    target: usize,
    rng: &mut WorldRng,
) -> Vec<HexCoord> {
    let mut claimed = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([start]);

    while claimed.len() < target {
        let Some(coord) = queue.pop_front() else {
            break;
        };
        if visited.contains(&coord) || !available.remove(&coord) {
            continue;
        }
        visited.insert(coord);
        claimed.push(coord);

        let mut neighbors = coord.neighbors();
        rng.shuffle(&mut neighbors);
        for n in neighbors {
            if !visited.contains(&n) && available.contains(&n) {
                queue.push_back(n);
            }
        }
    }

    claimed
}

fn jittered(value: f64, rng: &mut WorldRng) -> f64 {
    (value + rng.range_f64(ENV_JITTER)).clamp(0.0, 1.0)
}

fn synthesize_province(
    coord: HexCoord,
    noise: &dyn NoiseSource,
    seed: u64,
    land_radius: f64,
    thresholds: &TerrainThresholds,
    rng: &mut WorldRng,
) -> Province {
    let env = sample_environment(noise, coord.q as f64, coord.r as f64, seed);
    let falloff = edge_falloff(coord.axial_length(), land_radius);
    let elevation = jittered(shape_elevation(env.elevation, falloff), rng);
    let moisture = jittered(env.moisture, rng);
    let temperature = jittered(env.temperature, rng);

    let terrain = thresholds.classify(elevation, moisture, temperature);
    let stats = base_stats(terrain, elevation);
    let population = (stats.population as f64 * rng.range_f64(POPULATION_FACTOR)).floor() as u64;
    let gdp = (population as f64 * terrain.gdp_per_capita() * rng.range_f64(GDP_FACTOR)).floor()
        as u64;

    let hex_id = coord.id();
    Province {
        id: format!("province-{}", hex_id),
        hex_id,
        name: settlement_name(rng),
        coord,
        terrain,
        elevation: (elevation * 100.0).floor() as u8,
        population,
        development: stats.development,
        supply_limit: stats.supply_limit,
        gdp,
    }
}

/// Roll a claimed province list up into a country.
fn assemble_country(
    index: usize,
    provinces: Vec<Province>,
    color_offset: f64,
    rng: &mut WorldRng,
) -> Country {
    let hex_ids: Vec<String> = provinces.iter().map(|p| p.hex_id.clone()).collect();
    let mut terrain_breakdown = BTreeMap::new();
    for p in &provinces {
        *terrain_breakdown.entry(p.terrain).or_insert(0) += 1;
    }

    let territories: Vec<Province> = if provinces.iter().any(Province::is_land) {
        provinces.into_iter().filter(Province::is_land).collect()
    } else {
        provinces
    };

    let population: u64 = territories.iter().map(|p| p.population).sum();
    let gdp: u64 = territories.iter().map(|p| p.gdp).sum();
    let supply_capacity: u64 = territories.iter().map(|p| p.supply_limit as u64).sum();
    let average_development = mean_development(&territories);

    // first-seen wins on ties
    let (capital, capital_province_id) = territories
        .iter()
        .reduce(|best, p| if p.population > best.population { p } else { best })
        .map(|p| (p.name.clone(), p.id.clone()))
        .unwrap_or_default();

    let name = country_name(rng);
    let government = GOVERNMENTS[rng.index(GOVERNMENTS.len())].to_string();
    let seed_point = sphere_point(rng);

    Country {
        id: format!("country-{}", index),
        name,
        color: hsl_color(index as f64 + color_offset),
        hex_ids,
        territories,
        capital,
        capital_province_id,
        population,
        gdp,
        supply_capacity,
        average_development,
        government,
        seed_point,
        terrain_breakdown,
    }
}

fn mean_development(provinces: &[Province]) -> u32 {
    if provinces.is_empty() {
        return 0;
    }
    let total: u64 = provinces.iter().map(|p| p.development as u64).sum();
    (total as f64 / provinces.len() as f64).round() as u32
}

fn country_name(rng: &mut WorldRng) -> String {
    let prefix = NAME_PREFIXES[rng.index(NAME_PREFIXES.len())];
    let suffix = NAME_SUFFIXES[rng.index(NAME_SUFFIXES.len())];
    format!("{}{}", prefix, suffix)
}

fn settlement_name(rng: &mut WorldRng) -> String {
    let root = SETTLEMENT_ROOTS[rng.index(SETTLEMENT_ROOTS.len())];
    let ending = SETTLEMENT_ENDINGS[rng.index(SETTLEMENT_ENDINGS.len())];
    format!("{}{}", root, ending)
}

/// CSS `hsl()` color with the hue spread by the golden angle.
pub fn hsl_color(color_seed: f64) -> String {
    let hue = (color_seed * GOLDEN_ANGLE).rem_euclid(360.0);
    let saturation = 65.0 + (color_seed * 20.0).rem_euclid(25.0);
    let lightness = 60.0 + (color_seed * 15.0).rem_euclid(20.0);
    format!("hsl({:.1}, {:.1}%, {:.1}%)", hue, saturation, lightness)
}

/// Uniformly distributed point on a sphere.
fn sphere_point(rng: &mut WorldRng) -> SpherePoint {
    let u = rng.next_f64();
    let v = rng.next_f64();
    SpherePoint {
        lat: (2.0 * u - 1.0).asin().to_degrees(),
        lng: v * 360.0 - 180.0,
    }
}
