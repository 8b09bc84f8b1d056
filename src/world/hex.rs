use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default hexagon radius in pixels.
pub const HEX_SIZE: f64 = 30.0;

/// Axial neighbor offsets, flat-top orientation.
const NEIGHBOR_OFFSETS: [(i32, i32); 6] = [
    (1, 0),  // right
    (1, -1), // top-right
    (0, -1), // top-left
    (-1, 0), // left
    (-1, 1), // bottom-left
    (0, 1),  // bottom-right
];

// === Coordinates ===

/// Axial hex coordinate. The string id `"q,r"` is used as a map key by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

/// A position in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl HexCoord {
    pub const ORIGIN: HexCoord = HexCoord { q: 0, r: 0 };

    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube component; `q + r + s == 0`.
    pub fn s(self) -> i32 {
        -self.q - self.r
    }

    pub fn id(self) -> String {
        self.to_string()
    }

    /// The six surrounding coordinates in fixed order.
    pub fn neighbors(self) -> [HexCoord; 6] {
        NEIGHBOR_OFFSETS.map(|(dq, dr)| HexCoord::new(self.q + dq, self.r + dr))
    }

    /// Number of hex steps between two coordinates.
    pub fn distance(self, other: HexCoord) -> i32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.abs() + (dq + dr).abs() + dr.abs()) / 2
    }

    /// Euclidean distance from the origin in raw axial space.
    pub fn axial_length(self) -> f64 {
        ((self.q as f64).powi(2) + (self.r as f64).powi(2)).sqrt()
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

/// Errors produced when parsing a `"q,r"` hex id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseHexIdError {
    MissingComma(String),
    InvalidComponent(String),
}

impl fmt::Display for ParseHexIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseHexIdError::MissingComma(s) => {
                write!(f, "hex id '{}' must have the form 'q,r'", s)
            }
            ParseHexIdError::InvalidComponent(s) => {
                write!(f, "hex id '{}' has a non-integer component", s)
            }
        }
    }
}

impl std::error::Error for ParseHexIdError {}

impl FromStr for HexCoord {
    type Err = ParseHexIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (q, r) = s
            .split_once(',')
            .ok_or_else(|| ParseHexIdError::MissingComma(s.to_string()))?;
        let q = q
            .trim()
            .parse::<i32>()
            .map_err(|_| ParseHexIdError::InvalidComponent(s.to_string()))?;
        let r = r
            .trim()
            .parse::<i32>()
            .map_err(|_| ParseHexIdError::InvalidComponent(s.to_string()))?;
        Ok(HexCoord { q, r })
    }
}

pub fn hex_to_id(coord: HexCoord) -> String {
    coord.id()
}

pub fn id_to_hex(id: &str) -> Result<HexCoord, ParseHexIdError> {
    id.parse()
}

pub fn hex_equals(a: HexCoord, b: HexCoord) -> bool {
    a == b
}

pub fn get_neighbor_coords(coord: HexCoord) -> [HexCoord; 6] {
    coord.neighbors()
}

pub fn hex_distance(a: HexCoord, b: HexCoord) -> i32 {
    a.distance(b)
}

// === Layout ===

/// Pixel layout for flat-top hexagons of a given radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    pub size: f64,
}

impl Default for HexLayout {
    fn default() -> Self {
        HexLayout { size: HEX_SIZE }
    }
}

impl HexLayout {
    pub fn new(size: f64) -> Self {
        Self { size }
    }

    pub fn hex_width(&self) -> f64 {
        3.0_f64.sqrt() * self.size
    }

    pub fn hex_height(&self) -> f64 {
        2.0 * self.size
    }

    /// Center of the hex in pixel space.
    pub fn axial_to_pixel(&self, coord: HexCoord) -> Point {
        let sqrt3 = 3.0_f64.sqrt();
        let q = coord.q as f64;
        let r = coord.r as f64;
        Point {
            x: self.size * (sqrt3 * q + sqrt3 / 2.0 * r),
            y: self.size * (1.5 * r),
        }
    }

    /// Hex containing the pixel.
    pub fn pixel_to_axial(&self, point: Point) -> HexCoord {
        let sqrt3 = 3.0_f64.sqrt();
        let q = (sqrt3 / 3.0 * point.x - point.y / 3.0) / self.size;
        let r = (2.0 / 3.0 * point.y) / self.size;
        axial_round(q, r)
    }

    /// Corner offsets relative to the hex center, at `60° * i + 30°`.
    pub fn corners(&self) -> [Point; 6] {
        std::array::from_fn(|i| {
            let angle = (60.0 * i as f64 + 30.0).to_radians();
            Point {
                x: self.size * angle.cos(),
                y: self.size * angle.sin(),
            }
        })
    }
}

/// Round fractional axial coordinates to the nearest hex.
///
/// Each cube component is rounded independently; the one with the largest
/// rounding error is rebuilt from the other two so that `q + r + s == 0`.
pub fn axial_round(q: f64, r: f64) -> HexCoord {
    let s = -q - r;
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let q_diff = (rq - q).abs();
    let r_diff = (rr - r).abs();
    let s_diff = (rs - s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        rq = -rr - rs;
    } else if r_diff > s_diff {
        rr = -rq - rs;
    }

    HexCoord::new(rq as i32, rr as i32)
}

pub fn hex_to_pixel(coord: HexCoord, size: f64) -> Point {
    HexLayout::new(size).axial_to_pixel(coord)
}

pub fn pixel_to_hex(point: Point, size: f64) -> HexCoord {
    HexLayout::new(size).pixel_to_axial(point)
}

pub fn hex_corners(size: f64) -> [Point; 6] {
    HexLayout::new(size).corners()
}

/// Whether `point` falls inside the hex centered at `center`.
pub fn is_point_in_hex(point: Point, center: Point, size: f64) -> bool {
    let layout = HexLayout::new(size);
    let relative = Point::new(point.x - center.x, point.y - center.y);
    layout.pixel_to_axial(relative) == HexCoord::ORIGIN
}

// === Grid enumeration ===

/// Upper bound on the up-front allocation for a grid; larger grids grow as they fill.
const MAX_GRID_PREALLOC: usize = 1 << 16;

fn rectangular_capacity(width: i32, height: i32) -> usize {
    (width.max(0) as usize)
        .saturating_mul(height.max(0) as usize)
        .min(MAX_GRID_PREALLOC)
}

/// Row-offset rectangle: row `r` covers columns `-floor(r/2) ..= width-1-floor(r/2)`.
pub fn rectangular_grid(width: i32, height: i32) -> Vec<HexCoord> {
    let mut coords = Vec::with_capacity(rectangular_capacity(width, height));
    for r in 0..height {
        let offset = r.div_euclid(2);
        for q in -offset..width - offset {
            coords.push(HexCoord::new(q, r));
        }
    }
    coords
}

/// All hexes within `radius` steps of the origin. Negative radius yields nothing.
pub fn circular_grid(radius: i32) -> Vec<HexCoord> {
    let mut coords = Vec::new();
    for q in -radius..=radius {
        let r1 = (-radius).max(-q - radius);
        let r2 = radius.min(-q + radius);
        for r in r1..=r2 {
            coords.push(HexCoord::new(q, r));
        }
    }
    coords
}
