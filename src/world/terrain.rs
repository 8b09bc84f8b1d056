use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_OCEAN_LEVEL: f64 = 0.35;
pub const DEFAULT_MOUNTAIN_LEVEL: f64 = 0.75;
/// Width of the coastal band above the ocean level.
pub const COAST_BAND: f64 = 0.07;

// === Enums ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainType {
    Ocean,
    Coast,
    Plains,
    Forest,
    Mountain,
    Desert,
}

impl TerrainType {
    pub const ALL: [TerrainType; 6] = [
        TerrainType::Ocean,
        TerrainType::Coast,
        TerrainType::Plains,
        TerrainType::Forest,
        TerrainType::Mountain,
        TerrainType::Desert,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TerrainType::Ocean => "ocean",
            TerrainType::Coast => "coast",
            TerrainType::Plains => "plains",
            TerrainType::Forest => "forest",
            TerrainType::Mountain => "mountain",
            TerrainType::Desert => "desert",
        }
    }

    pub fn is_land(self) -> bool {
        self != TerrainType::Ocean
    }

    /// Output per head used when rolling up province GDP.
    pub fn gdp_per_capita(self) -> f64 {
        match self {
            TerrainType::Ocean => 0.0,
            TerrainType::Coast => 14_000.0,
            TerrainType::Plains => 12_000.0,
            TerrainType::Forest => 8_000.0,
            TerrainType::Mountain => 6_500.0,
            TerrainType::Desert => 5_000.0,
        }
    }
}

impl fmt::Display for TerrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Coarse bucket of a province's development score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevelopmentTier {
    Nascent,
    Growing,
    Established,
    Metropolis,
}

impl DevelopmentTier {
    pub fn from_development(development: u32) -> Self {
        match development {
            75.. => DevelopmentTier::Metropolis,
            50..=74 => DevelopmentTier::Established,
            30..=49 => DevelopmentTier::Growing,
            _ => DevelopmentTier::Nascent,
        }
    }
}

// === Classification ===

/// Elevation cut-offs for the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainThresholds {
    pub ocean_level: f64,
    pub mountain_level: f64,
}

impl Default for TerrainThresholds {
    fn default() -> Self {
        TerrainThresholds {
            ocean_level: DEFAULT_OCEAN_LEVEL,
            mountain_level: DEFAULT_MOUNTAIN_LEVEL,
        }
    }
}

impl TerrainThresholds {
    pub fn coast_level(&self) -> f64 {
        self.ocean_level + COAST_BAND
    }

    /// Map environmental fields in `[0, 1]` to a biome. First match wins.
    pub fn classify(&self, elevation: f64, moisture: f64, temperature: f64) -> TerrainType {
        if elevation < self.ocean_level {
            TerrainType::Ocean
        } else if elevation < self.coast_level() {
            TerrainType::Coast
        } else if elevation > self.mountain_level {
            TerrainType::Mountain
        } else if moisture < 0.3 && temperature > 0.6 {
            TerrainType::Desert
        } else if moisture > 0.55 {
            TerrainType::Forest
        } else {
            TerrainType::Plains
        }
    }
}

/// Classify with the default thresholds.
pub fn classify(elevation: f64, moisture: f64, temperature: f64) -> TerrainType {
    TerrainThresholds::default().classify(elevation, moisture, temperature)
}

// === Base statistics ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileStats {
    pub development: u32,
    pub supply_limit: u32,
    pub population: u64,
}

impl TileStats {
    pub const EMPTY: TileStats = TileStats {
        development: 0,
        supply_limit: 0,
        population: 0,
    };
}

/// (development, supply, population) as `base + floor(elevation * bonus)`.
struct StatCurve {
    development: (u32, f64),
    supply: (u32, f64),
    population: (u64, f64),
}

fn stat_curve(terrain: TerrainType) -> Option<StatCurve> {
    let curve = match terrain {
        TerrainType::Ocean => return None,
        TerrainType::Coast => StatCurve {
            development: (45, 20.0),
            supply: (15, 10.0),
            population: (500_000, 300_000.0),
        },
        TerrainType::Plains => StatCurve {
            development: (50, 30.0),
            supply: (20, 15.0),
            population: (600_000, 400_000.0),
        },
        TerrainType::Forest => StatCurve {
            development: (40, 20.0),
            supply: (12, 8.0),
            population: (300_000, 200_000.0),
        },
        TerrainType::Mountain => StatCurve {
            development: (25, 15.0),
            supply: (8, 5.0),
            population: (100_000, 150_000.0),
        },
        TerrainType::Desert => StatCurve {
            development: (20, 10.0),
            supply: (6, 4.0),
            population: (50_000, 100_000.0),
        },
    };
    Some(curve)
}

/// Baseline statistics for a tile. `elevation` is in `[0, 1]`; ocean is always empty.
pub fn base_stats(terrain: TerrainType, elevation: f64) -> TileStats {
    let Some(curve) = stat_curve(terrain) else {
        return TileStats::EMPTY;
    };
    let e = elevation.clamp(0.0, 1.0);
    TileStats {
        development: curve.development.0 + (e * curve.development.1).floor() as u32,
        supply_limit: curve.supply.0 + (e * curve.supply.1).floor() as u32,
        population: curve.population.0 + (e * curve.population.1).floor() as u64,
    }
}
