use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::generation::{MapParams, MapShape};
use crate::world::hex::{HexCoord, circular_grid, rectangular_grid};
use crate::world::noise::{NoiseSource, fractal};
use crate::world::rng::resolve_seed;
use crate::world::terrain::{TerrainThresholds, base_stats};
use crate::world::tile::{HexMap, Tile};

/// Seed offsets and octave counts for the three environmental fields.
const MOISTURE_SEED_OFFSET: u64 = 1000;
const TEMPERATURE_SEED_OFFSET: u64 = 2000;
const ELEVATION_OCTAVES: u32 = 5;
const MOISTURE_OCTAVES: u32 = 4;
const TEMPERATURE_OCTAVES: u32 = 3;

/// Share of final elevation taken from raw noise; the rest comes from edge falloff.
const NOISE_WEIGHT: f64 = 0.7;
const FALLOFF_WEIGHT: f64 = 0.3;
const FALLOFF_EXPONENT: f64 = 1.5;

/// Noise-derived fields for one location, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub elevation: f64,
    pub moisture: f64,
    pub temperature: f64,
}

/// Raw elevation, moisture and temperature at `(x, y)` for `seed`.
pub fn sample_environment(noise: &dyn NoiseSource, x: f64, y: f64, seed: u64) -> Environment {
    Environment {
        elevation: fractal(noise, x, y, seed, ELEVATION_OCTAVES),
        moisture: fractal(noise, x, y, seed.wrapping_add(MOISTURE_SEED_OFFSET), MOISTURE_OCTAVES),
        temperature: fractal(
            noise,
            x,
            y,
            seed.wrapping_add(TEMPERATURE_SEED_OFFSET),
            TEMPERATURE_OCTAVES,
        ),
    }
}

/// `1 - (distance / max_distance)^1.5`, with the ratio capped at 1.
pub fn edge_falloff(distance: f64, max_distance: f64) -> f64 {
    if max_distance <= 0.0 {
        return 1.0;
    }
    1.0 - (distance / max_distance).min(1.0).powf(FALLOFF_EXPONENT)
}

/// Blend raw elevation with the island-shaping falloff.
pub fn shape_elevation(raw: f64, falloff: f64) -> f64 {
    (NOISE_WEIGHT * raw + FALLOFF_WEIGHT * falloff).clamp(0.0, 1.0)
}

/// Coordinate set plus the center and radius used for edge falloff.
struct GridFootprint {
    coords: Vec<HexCoord>,
    center: (f64, f64),
    max_distance: f64,
}

impl GridFootprint {
    fn new(params: &MapParams) -> Self {
        match params.shape {
            MapShape::Rectangular => {
                let half_w = params.width as f64 / 2.0;
                let half_h = params.height as f64 / 2.0;
                GridFootprint {
                    coords: rectangular_grid(params.width, params.height),
                    center: (half_w, half_h),
                    max_distance: (half_w * half_w + half_h * half_h).sqrt(),
                }
            }
            MapShape::Circular => GridFootprint {
                coords: circular_grid(params.radius),
                center: (0.0, 0.0),
                max_distance: params.radius.max(0) as f64,
            },
        }
    }

    fn distance_from_center(&self, coord: HexCoord) -> f64 {
        let dq = coord.q as f64 - self.center.0;
        let dr = coord.r as f64 - self.center.1;
        (dq * dq + dr * dr).sqrt()
    }
}

/// Generate a complete tile map with procedural terrain.
///
/// Pass 1 computes each tile independently (in parallel); pass 2 links
/// neighbors that exist in the generated set. Identical params produce an
/// identical map.
pub fn generate_hex_map(params: &MapParams) -> HexMap {
    let seed = resolve_seed(params.seed);
    let noise = params.noise.build();
    let thresholds = params.thresholds();
    let footprint = GridFootprint::new(params);

    let tiles: Vec<Tile> = footprint
        .coords
        .par_iter()
        .map(|&coord| build_tile(coord, noise.as_ref(), seed, &thresholds, &footprint))
        .collect();
    debug!(tiles = tiles.len(), "terrain pass complete");

    let mut map = HexMap::from(tiles);
    link_neighbors(&mut map);

    info!(
        seed,
        tiles = map.len(),
        shape = ?params.shape,
        "hex map generated"
    );
    map
}

fn build_tile(
    coord: HexCoord,
    noise: &dyn NoiseSource,
    seed: u64,
    thresholds: &TerrainThresholds,
    footprint: &GridFootprint,
) -> Tile {
    let env = sample_environment(noise, coord.q as f64, coord.r as f64, seed);
    let falloff = edge_falloff(footprint.distance_from_center(coord), footprint.max_distance);
    let elevation = shape_elevation(env.elevation, falloff);

    let terrain = thresholds.classify(elevation, env.moisture, env.temperature);
    Tile::new(coord, terrain, elevation, base_stats(terrain, elevation))
}

fn link_neighbors(map: &mut HexMap) {
    let links: Vec<Vec<HexCoord>> = map
        .iter()
        .map(|tile| {
            tile.coord
                .neighbors()
                .into_iter()
                .filter(|&n| map.contains(n))
                .collect()
        })
        .collect();

    for (tile, neighbors) in map.tiles_mut().iter_mut().zip(links) {
        tile.neighbors = neighbors;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::noise::NoiseKind;
    use crate::world::terrain::{TerrainType, TileStats};
    use std::collections::HashSet;

    fn scenario_params() -> MapParams {
        MapParams {
            ocean_level: 0.35,
            mountain_level: 0.75,
            ..MapParams::rectangular(10, 10, Some(42))
        }
    }

    #[test]
    fn ten_by_ten_scenario() {
        let map = generate_hex_map(&scenario_params());
        assert_eq!(map.len(), 100);
        for tile in map.iter() {
            assert!(tile.elevation <= 100, "Tile {} elevation {}", tile.id, tile.elevation);
            assert!(TerrainType::ALL.contains(&tile.terrain));
            assert_eq!(tile.id, tile.coord.id());
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_hex_map(&MapParams::rectangular(30, 20, Some(12345)));
        let b = generate_hex_map(&MapParams::rectangular(30, 20, Some(12345)));
        assert_eq!(a, b);
    }

    #[test]
    fn boundary_seeds_are_deterministic() {
        for seed in [0, u64::MAX] {
            let a = generate_hex_map(&MapParams::rectangular(30, 20, Some(seed)));
            let b = generate_hex_map(&MapParams::rectangular(30, 20, Some(seed)));
            assert_eq!(a, b, "seed {} not reproducible", seed);
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate_hex_map(&MapParams::rectangular(30, 20, Some(1)));
        let b = generate_hex_map(&MapParams::rectangular(30, 20, Some(2)));
        assert_ne!(a, b);
    }

    #[test]
    fn seeds_far_apart_differ() {
        let a = generate_hex_map(&MapParams::rectangular(30, 20, Some(1)));
        let b = generate_hex_map(&MapParams::rectangular(30, 20, Some(1 + (1 << 20))));
        assert_ne!(a, b);
        let c = generate_hex_map(&MapParams::rectangular(30, 20, Some(u64::MAX)));
        assert_ne!(a, c);
    }

    #[test]
    fn neighbors_are_symmetric_and_local() {
        let map = generate_hex_map(&MapParams::rectangular(15, 12, Some(9)));
        for tile in map.iter() {
            assert!(tile.neighbors.len() <= 6);
            for &n in &tile.neighbors {
                let neighbor = map.get(n).unwrap_or_else(|| panic!("{} links to missing {}", tile.id, n));
                assert!(
                    neighbor.neighbors.contains(&tile.coord),
                    "Tile {} has neighbor {}, but not the reverse",
                    tile.id,
                    n
                );
                assert_eq!(tile.coord.distance(n), 1);
            }
        }
    }

    #[test]
    fn edge_tiles_have_fewer_neighbors() {
        let map = generate_hex_map(&MapParams::rectangular(6, 6, Some(3)));
        let corner = map.get(HexCoord::new(0, 0)).unwrap();
        assert!(corner.neighbors.len() < 6);
        let interior_full = map.iter().any(|t| t.neighbors.len() == 6);
        assert!(interior_full);
    }

    #[test]
    fn circular_map_shape() {
        let map = generate_hex_map(&MapParams::circular(8, Some(5)));
        assert_eq!(map.len(), 3 * 8 * 9 + 1);
        assert_eq!(map.get(HexCoord::ORIGIN).unwrap().neighbors.len(), 6);
    }

    #[test]
    fn stats_follow_terrain() {
        let map = generate_hex_map(&MapParams::rectangular(40, 30, Some(77)));
        for tile in map.iter() {
            if tile.is_ocean() {
                assert_eq!(tile.population, 0);
                assert_eq!(tile.development, 0);
                assert!(tile.owner_tag.is_none());
            } else {
                assert!(tile.population > 0);
                assert_ne!(
                    TileStats {
                        development: tile.development,
                        supply_limit: tile.supply_limit,
                        population: tile.population
                    },
                    TileStats::EMPTY
                );
            }
        }
    }

    #[test]
    fn falloff_shapes_edges() {
        assert_eq!(edge_falloff(0.0, 10.0), 1.0);
        assert_eq!(edge_falloff(10.0, 10.0), 0.0);
        assert_eq!(edge_falloff(25.0, 10.0), 0.0);
        assert_eq!(edge_falloff(3.0, 0.0), 1.0);
        assert!((shape_elevation(0.5, 1.0) - 0.65).abs() < 1e-12);
        assert_eq!(shape_elevation(0.0, 0.0), 0.0);
    }

    #[test]
    fn higher_ocean_level_floods_more() {
        let low = generate_hex_map(&MapParams {
            ocean_level: 0.3,
            ..MapParams::rectangular(30, 30, Some(11))
        });
        let high = generate_hex_map(&MapParams {
            ocean_level: 0.6,
            ..MapParams::rectangular(30, 30, Some(11))
        });
        let oceans = |m: &HexMap| m.iter().filter(|t| t.is_ocean()).count();
        assert!(oceans(&high) >= oceans(&low));
        assert!(oceans(&high) > 0);
    }

    #[test]
    fn perlin_backend_generates() {
        let params = MapParams {
            noise: NoiseKind::Perlin,
            ..MapParams::rectangular(12, 12, Some(8))
        };
        let a = generate_hex_map(&params);
        let b = generate_hex_map(&params);
        assert_eq!(a.len(), 144);
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_sizes_are_empty() {
        assert!(generate_hex_map(&MapParams::rectangular(0, 10, Some(1))).is_empty());
        assert!(generate_hex_map(&MapParams::rectangular(10, 0, Some(1))).is_empty());
        assert!(generate_hex_map(&MapParams::circular(-2, Some(1))).is_empty());
    }

    #[test]
    fn land_mass_partition_covers_land() {
        let map = generate_hex_map(&MapParams::rectangular(40, 30, Some(2024)));
        let masses = map.land_masses();
        let mut seen = HashSet::new();
        for mass in &masses {
            for tile in mass {
                assert!(seen.insert(tile.coord), "{} in two land masses", tile.id);
            }
        }
        assert_eq!(seen.len(), map.iter().filter(|t| !t.is_ocean()).count());
        for tile in map.coast_tiles() {
            assert!(!tile.is_ocean());
        }
    }
}
