use tracing::{info, warn};

use crate::config::generation::{CountryParams, GenerationParams};
use crate::world::cache::ProvinceIndex;
use crate::world::countries::generate_countries_with;
use crate::world::generation::generate_hex_map;
use crate::world::hex::HexCoord;
use crate::world::rng::resolve_seed;
use crate::world::{self, World, generate_world};

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Cannot encode JSON: {}", e))
}

/// Generate the full world and print a summary or the whole world as JSON.
pub fn generate(params: &GenerationParams, json: bool) -> Result<World, String> {
    let world = generate_world(params);
    if json {
        println!("{}", to_json(&world)?);
    } else {
        world::print_world_summary(&world);
    }
    Ok(world)
}

/// Run only the country aggregator and list the result.
pub fn countries(params: &CountryParams, json: bool) -> Result<(), String> {
    let seed = resolve_seed(params.seed);
    let resolved = CountryParams {
        seed: Some(seed),
        ..params.clone()
    };
    let countries = generate_countries_with(&resolved);
    if countries.is_empty() {
        warn!(
            grid_radius = resolved.grid_radius,
            num_countries = resolved.num_countries,
            "no countries generated"
        );
    }

    if json {
        println!("{}", to_json(&countries)?);
    } else {
        println!("Seed: {}", seed);
        world::print_country_table(&countries);
    }
    Ok(())
}

/// Print one tile of the generated map, plus the country claiming the same hex.
pub fn inspect(params: &GenerationParams, tile_id: &str) -> Result<(), String> {
    let coord: HexCoord = tile_id.parse().map_err(|e| format!("{}", e))?;
    let requested = params.requested_seed();
    if requested.is_none() {
        warn!("no seed configured; inspecting a randomly seeded world");
    }
    let seed = resolve_seed(requested);
    info!(seed, tile = %coord, "inspecting tile");

    let map = generate_hex_map(&params.map_params(seed));
    let tile = map
        .get(coord)
        .ok_or_else(|| format!("Tile {} is not on the map (seed {})", coord, seed))?;

    println!("=== Tile {} ===", tile.id);
    println!("Seed:        {}", seed);
    println!("Terrain:     {}", tile.terrain);
    println!("Elevation:   {}", tile.elevation);
    println!("Population:  {}", tile.population);
    println!("Development: {}", tile.development);
    println!("Supply:      {}", tile.supply_limit);
    println!("Owner:       {}", tile.owner_tag.as_deref().unwrap_or("-"));
    let neighbors: Vec<String> = tile.neighbors.iter().map(|n| n.id()).collect();
    println!("Neighbors:   {}", neighbors.join(" "));

    let countries = generate_countries_with(&params.country_params(seed));
    let index = ProvinceIndex::new(&countries);
    match index.owner_of_hex(&tile.id) {
        Some(country) => {
            println!("\nClaimed by {} ({}), capital {}", country.name, country.id, country.capital);
            if let Some(resolved) = index.province(&format!("province-{}", tile.id)) {
                let p = resolved.province;
                println!(
                    "Province {}: {} pop {}, dev {} ({:?}), gdp {}",
                    p.name,
                    p.terrain,
                    p.population,
                    p.development,
                    p.development_tier(),
                    p.gdp
                );
            }
        }
        None => println!("\nNo country claims this hex."),
    }
    Ok(())
}
