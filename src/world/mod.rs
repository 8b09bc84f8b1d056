pub mod cache;
pub mod countries;
pub mod generation;
pub mod hex;
pub mod noise;
pub mod rng;
pub mod terrain;
pub mod tile;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::generation::GenerationParams;
use crate::world::countries::{Country, generate_countries_with};
use crate::world::generation::generate_hex_map;
use crate::world::rng::{WorldRng, resolve_seed};
use crate::world::tile::HexMap;

pub use countries::{Province, generate_countries};
pub use hex::HexCoord;
pub use terrain::TerrainType;
pub use tile::Tile;

/// One generation run: the tile map and the countries, from a single seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub id: Uuid,
    pub name: String,
    pub seed: u64,
    pub generation_params: GenerationParams,
    pub map: HexMap,
    pub countries: Vec<Country>,
}

/// Generate a new world from the given parameters.
///
/// If `params.seed` is 0, a random seed is chosen. The actual seed used is
/// stored in the returned World's `generation_params` for reproducibility.
pub fn generate_world(params: &GenerationParams) -> World {
    let seed = resolve_seed(params.requested_seed());
    let resolved_params = GenerationParams {
        seed,
        ..params.clone()
    };

    let map = generate_hex_map(&resolved_params.map_params(seed));
    let countries = generate_countries_with(&resolved_params.country_params(seed));
    let id = Uuid::from_bytes(WorldRng::new(seed).bytes16());

    info!(
        seed,
        tiles = map.len(),
        countries = countries.len(),
        "world generated"
    );

    World {
        id,
        name: format!("World-{}", seed),
        seed,
        generation_params: resolved_params,
        map,
        countries,
    }
}

/// Print a summary of the generated world.
pub fn print_world_summary(world: &World) {
    println!("=== World Summary ===");
    println!("Name: {}", world.name);
    println!("Seed: {}", world.seed);
    println!("Tiles: {}", world.map.len());

    let total = world.map.len().max(1) as f32;
    println!("\nTerrain:");
    for (terrain, count) in world.map.terrain_counts() {
        let pct = count as f32 / total * 100.0;
        println!("  {:<12} {:>5} ({:.1}%)", terrain, count, pct);
    }

    let masses = world.map.land_masses();
    let largest = masses.iter().map(Vec::len).max().unwrap_or(0);
    println!("\nLand masses: {} (largest {} tiles)", masses.len(), largest);
    println!("Coast tiles: {}", world.map.coast_tiles().len());

    print_country_table(&world.countries);
}

/// Print one line per country.
pub fn print_country_table(countries: &[Country]) {
    if countries.is_empty() {
        println!("\nNo countries generated.");
        return;
    }
    println!("\nCountries:");
    println!(
        "  {:<12} {:<14} {:>5} {:>14} {:>18} {:>4}  {}",
        "Id", "Name", "Hexes", "Population", "GDP", "Dev", "Capital"
    );
    for c in countries {
        println!(
            "  {:<12} {:<14} {:>5} {:>14} {:>18} {:>4}  {}",
            c.id,
            c.name,
            c.hex_ids.len(),
            c.population,
            c.gdp,
            c.average_development,
            c.capital
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params(seed: u64) -> GenerationParams {
        let mut params = GenerationParams {
            seed,
            ..GenerationParams::default()
        };
        params.map.width = 20;
        params.map.height = 15;
        params.countries.grid_radius = 10;
        params.countries.num_countries = 4;
        params
    }

    #[test]
    fn world_is_deterministic() {
        let a = generate_world(&small_params(42));
        let b = generate_world(&small_params(42));
        assert_eq!(a, b);
        assert_eq!(a.id, b.id);
        assert_eq!(a.map.len(), 300);
        assert!(!a.countries.is_empty());
    }

    #[test]
    fn seed_zero_resolves_to_random_seed() {
        let world = generate_world(&small_params(0));
        assert_ne!(world.seed, 0);
        assert_eq!(world.generation_params.seed, world.seed);
        assert_eq!(world.name, format!("World-{}", world.seed));
    }

    #[test]
    fn world_serializes_to_json() {
        let world = generate_world(&small_params(3));
        let json = serde_json::to_string(&world).unwrap();
        let back: World = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, world.id);
        assert_eq!(back.map, world.map);
        let hexes = |w: &World| w.countries.iter().map(|c| c.hex_ids.clone()).collect::<Vec<_>>();
        assert_eq!(hexes(&back), hexes(&world));
    }
}
