use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::world::noise::NoiseKind;
use crate::world::terrain::{DEFAULT_MOUNTAIN_LEVEL, DEFAULT_OCEAN_LEVEL, TerrainThresholds};

/// Footprint of the tile grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapShape {
    /// Row-offset rectangle of `width * height` tiles.
    #[default]
    Rectangular,
    /// Hex disk of the given `radius` around the origin.
    Circular,
}

/// Options for the tile-map generator.
///
/// `seed = None` picks a random seed. Unset levels fall back to 0.35 / 0.75.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapParams {
    #[serde(default)]
    pub shape: MapShape,
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default = "default_radius")]
    pub radius: i32,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_ocean_level")]
    pub ocean_level: f64,
    #[serde(default = "default_mountain_level")]
    pub mountain_level: f64,
    #[serde(default)]
    pub noise: NoiseKind,
}

fn default_width() -> i32 {
    60
}
fn default_height() -> i32 {
    40
}
fn default_radius() -> i32 {
    20
}
fn default_ocean_level() -> f64 {
    DEFAULT_OCEAN_LEVEL
}
fn default_mountain_level() -> f64 {
    DEFAULT_MOUNTAIN_LEVEL
}

impl Default for MapParams {
    fn default() -> Self {
        MapParams {
            shape: MapShape::Rectangular,
            width: default_width(),
            height: default_height(),
            radius: default_radius(),
            seed: None,
            ocean_level: DEFAULT_OCEAN_LEVEL,
            mountain_level: DEFAULT_MOUNTAIN_LEVEL,
            noise: NoiseKind::Sine,
        }
    }
}

impl MapParams {
    pub fn rectangular(width: i32, height: i32, seed: Option<u64>) -> Self {
        MapParams {
            shape: MapShape::Rectangular,
            width,
            height,
            seed,
            ..MapParams::default()
        }
    }

    pub fn circular(radius: i32, seed: Option<u64>) -> Self {
        MapParams {
            shape: MapShape::Circular,
            radius,
            seed,
            ..MapParams::default()
        }
    }

    pub fn thresholds(&self) -> TerrainThresholds {
        TerrainThresholds {
            ocean_level: self.ocean_level,
            mountain_level: self.mountain_level,
        }
    }

    fn validate_into(&self, errors: &mut Vec<String>) {
        if !(0.0..=1.0).contains(&self.ocean_level) {
            errors.push(format!(
                "map.ocean_level must be 0.0-1.0, got {}. Example: ocean_level = 0.35",
                self.ocean_level
            ));
        }
        if !(0.0..=1.0).contains(&self.mountain_level) {
            errors.push(format!(
                "map.mountain_level must be 0.0-1.0, got {}. Example: mountain_level = 0.75",
                self.mountain_level
            ));
        }
        if self.ocean_level >= self.mountain_level {
            errors.push(format!(
                "map.ocean_level ({}) must be below map.mountain_level ({})",
                self.ocean_level, self.mountain_level
            ));
        }
    }
}

/// Options for the country aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryParams {
    #[serde(default = "default_grid_radius")]
    pub grid_radius: i32,
    #[serde(default = "default_num_countries")]
    pub num_countries: i32,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub noise: NoiseKind,
}

fn default_grid_radius() -> i32 {
    16
}
fn default_num_countries() -> i32 {
    15
}

impl Default for CountryParams {
    fn default() -> Self {
        CountryParams {
            grid_radius: default_grid_radius(),
            num_countries: default_num_countries(),
            seed: None,
            noise: NoiseKind::Sine,
        }
    }
}

impl CountryParams {
    pub fn new(grid_radius: i32, num_countries: i32, seed: Option<u64>) -> Self {
        CountryParams {
            grid_radius,
            num_countries,
            seed,
            ..CountryParams::default()
        }
    }
}

/// Top-level world generation file (`worldgen.toml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// 0 picks a random seed; the resolved value is stored with the world.
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub map: MapParams,
    #[serde(default)]
    pub countries: CountryParams,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            seed: 0,
            log_level: default_log_level(),
            map: MapParams::default(),
            countries: CountryParams::default(),
        }
    }
}

impl GenerationParams {
    /// Load generation parameters from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let params: Self = toml::from_str(content)
            .map_err(|e| format!("Invalid TOML in {}: {}", source_path.display(), e))?;
        params.validate()?;
        Ok(params)
    }

    /// Validate parameter ranges. All problems are reported together.
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        self.map.validate_into(&mut errors);

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }

    /// The configured seed, or `None` when the file leaves it at 0.
    pub fn requested_seed(&self) -> Option<u64> {
        (self.seed != 0).then_some(self.seed)
    }

    /// Map options with the top-level seed applied.
    pub fn map_params(&self, seed: u64) -> MapParams {
        MapParams {
            seed: Some(seed),
            ..self.map.clone()
        }
    }

    /// Country options with the top-level seed applied.
    pub fn country_params(&self, seed: u64) -> CountryParams {
        CountryParams {
            seed: Some(seed),
            ..self.countries.clone()
        }
    }
}
