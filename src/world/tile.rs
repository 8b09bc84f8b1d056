use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::world::hex::HexCoord;
use crate::world::terrain::{TerrainType, TileStats};

/// Owner tag given to unclaimed land.
pub const NEUTRAL_TAG: &str = "neutral";

// === Tile ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: HexCoord,
    pub id: String,
    pub terrain: TerrainType,
    /// Elevation in whole percent, 0-100.
    pub elevation: u8,
    pub development: u32,
    pub supply_limit: u32,
    pub population: u64,
    /// Serialized as `"q,r"` ids.
    #[serde(with = "neighbor_ids")]
    pub neighbors: Vec<HexCoord>,
    pub owner_tag: Option<String>,
    pub controller_tag: Option<String>,
}

impl Tile {
    /// Build a tile with an empty neighbor list. Land starts neutral; ocean is unowned.
    pub fn new(coord: HexCoord, terrain: TerrainType, elevation: f64, stats: TileStats) -> Self {
        let owner = terrain.is_land().then(|| NEUTRAL_TAG.to_string());
        Self {
            coord,
            id: coord.id(),
            terrain,
            elevation: (elevation.clamp(0.0, 1.0) * 100.0).floor() as u8,
            development: stats.development,
            supply_limit: stats.supply_limit,
            population: stats.population,
            neighbors: Vec::with_capacity(6),
            owner_tag: owner.clone(),
            controller_tag: owner,
        }
    }

    pub fn is_ocean(&self) -> bool {
        self.terrain == TerrainType::Ocean
    }
}

/// Neighbor links travel as tile ids, the same form as `Tile::id`.
mod neighbor_ids {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::world::hex::HexCoord;

    pub fn serialize<S>(neighbors: &[HexCoord], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(neighbors.iter().map(HexCoord::to_string))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<HexCoord>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|id| id.parse().map_err(D::Error::custom))
            .collect()
    }
}

// === HexMap ===

/// Generated tiles in generation order, indexed by coordinate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct HexMap {
    tiles: Vec<Tile>,
    index: HashMap<HexCoord, usize>,
}

impl From<Vec<Tile>> for HexMap {
    fn from(tiles: Vec<Tile>) -> Self {
        let index = tiles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.coord, i))
            .collect();
        HexMap { tiles, index }
    }
}

impl From<HexMap> for Vec<Tile> {
    fn from(map: HexMap) -> Self {
        map.tiles
    }
}

impl HexMap {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.index.contains_key(&coord)
    }

    pub fn get(&self, coord: HexCoord) -> Option<&Tile> {
        self.index.get(&coord).map(|&i| &self.tiles[i])
    }

    /// Look up by `"q,r"` id. Malformed ids simply miss.
    pub fn get_by_id(&self, id: &str) -> Option<&Tile> {
        id.parse().ok().and_then(|coord| self.get(coord))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Land tiles with at least one ocean neighbor.
    pub fn coast_tiles(&self) -> Vec<&Tile> {
        self.tiles
            .iter()
            .filter(|t| !t.is_ocean())
            .filter(|t| {
                t.neighbors
                    .iter()
                    .any(|&n| self.get(n).is_some_and(Tile::is_ocean))
            })
            .collect()
    }

    /// Connected components of non-ocean tiles, found by breadth-first flood fill.
    /// Each tile is visited at most once across all components.
    pub fn land_masses(&self) -> Vec<Vec<&Tile>> {
        let mut visited: HashSet<HexCoord> = HashSet::new();
        let mut masses = Vec::new();

        for start in &self.tiles {
            if start.is_ocean() || !visited.insert(start.coord) {
                continue;
            }

            let mut mass = Vec::new();
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                mass.push(current);
                for &n in &current.neighbors {
                    let Some(neighbor) = self.get(n) else {
                        continue;
                    };
                    if neighbor.is_ocean() || !visited.insert(n) {
                        continue;
                    }
                    queue.push_back(neighbor);
                }
            }
            masses.push(mass);
        }

        masses
    }

    /// Tile count per terrain type.
    pub fn terrain_counts(&self) -> BTreeMap<TerrainType, u32> {
        let mut counts = BTreeMap::new();
        for tile in &self.tiles {
            *counts.entry(tile.terrain).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::terrain::base_stats;

    fn tile(q: i32, r: i32, terrain: TerrainType) -> Tile {
        Tile::new(HexCoord::new(q, r), terrain, 0.5, base_stats(terrain, 0.5))
    }

    /// Link every pair of tiles that are hex neighbors.
    fn linked(mut tiles: Vec<Tile>) -> HexMap {
        let coords: HashSet<HexCoord> = tiles.iter().map(|t| t.coord).collect();
        for t in tiles.iter_mut() {
            t.neighbors = t
                .coord
                .neighbors()
                .into_iter()
                .filter(|n| coords.contains(n))
                .collect();
        }
        HexMap::from(tiles)
    }

    #[test]
    fn new_tile_ownership_and_elevation() {
        let land = tile(0, 0, TerrainType::Plains);
        assert_eq!(land.owner_tag.as_deref(), Some(NEUTRAL_TAG));
        assert_eq!(land.controller_tag.as_deref(), Some(NEUTRAL_TAG));
        assert_eq!(land.elevation, 50);
        assert_eq!(land.id, "0,0");
        assert!(land.neighbors.is_empty());

        let sea = tile(1, 0, TerrainType::Ocean);
        assert!(sea.owner_tag.is_none());
        assert_eq!(sea.population, 0);
    }

    #[test]
    fn lookup_by_coord_and_id() {
        let map = linked(vec![tile(0, 0, TerrainType::Plains), tile(1, 0, TerrainType::Forest)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(HexCoord::new(1, 0)).unwrap().terrain, TerrainType::Forest);
        assert_eq!(map.get_by_id("0,0").unwrap().terrain, TerrainType::Plains);
        assert!(map.get_by_id("garbage").is_none());
        assert!(map.get_by_id("5,5").is_none());
    }

    #[test]
    fn coast_tiles_touch_ocean() {
        let map = linked(vec![
            tile(0, 0, TerrainType::Plains),
            tile(1, 0, TerrainType::Ocean),
            tile(-1, 0, TerrainType::Forest),
            tile(-2, 0, TerrainType::Desert),
        ]);
        let coast: Vec<&str> = map.coast_tiles().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(coast, vec!["0,0"]);
    }

    #[test]
    fn land_masses_split_by_ocean() {
        let map = linked(vec![
            tile(0, 0, TerrainType::Plains),
            tile(1, 0, TerrainType::Coast),
            tile(2, 0, TerrainType::Ocean),
            tile(3, 0, TerrainType::Mountain),
            tile(4, 0, TerrainType::Forest),
            tile(6, 0, TerrainType::Desert),
        ]);
        let masses = map.land_masses();
        let sizes: Vec<usize> = masses.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);

        let total: usize = sizes.iter().sum();
        let land = map.iter().filter(|t| !t.is_ocean()).count();
        assert_eq!(total, land, "every land tile in exactly one mass");
    }

    #[test]
    fn empty_map_queries() {
        let map = HexMap::default();
        assert!(map.is_empty());
        assert!(map.coast_tiles().is_empty());
        assert!(map.land_masses().is_empty());
        assert!(map.terrain_counts().is_empty());
    }

    #[test]
    fn neighbors_serialize_as_ids() {
        let map = linked(vec![tile(0, 0, TerrainType::Plains), tile(1, 0, TerrainType::Forest)]);
        let value = serde_json::to_value(map.get(HexCoord::new(0, 0)).unwrap()).unwrap();
        assert_eq!(value["neighbors"], serde_json::json!(["1,0"]));

        let mut bad = value.clone();
        bad["neighbors"] = serde_json::json!(["oops"]);
        assert!(serde_json::from_value::<Tile>(bad).is_err());
    }

    #[test]
    fn serializes_as_tile_list() {
        let map = linked(vec![tile(0, 0, TerrainType::Plains), tile(0, 1, TerrainType::Ocean)]);
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.starts_with('['));
        let back: HexMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
        assert!(back.contains(HexCoord::new(0, 1)));
    }
}
