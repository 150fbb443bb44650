//! Single elevation tile representation and tile naming.

use crate::{DemError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Raw sample value marking a void in SRTM data.
pub const NO_DATA: i16 = -32768;

/// File extension of raw elevation tiles.
pub const TILE_EXTENSION: &str = "hgt";

/// Layout variant of a raw `.hgt` tile.
///
/// Both variants store a square grid of big-endian `i16` samples covering one
/// degree, with the edge rows/columns shared with the neighbouring tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileFormat {
    /// 1 arc-second tiles, 3601 x 3601 samples.
    #[default]
    Srtm1,
    /// 3 arc-second tiles, 1201 x 1201 samples.
    Srtm3,
}

impl TileFormat {
    /// Number of samples along one edge.
    pub fn side(self) -> usize {
        match self {
            TileFormat::Srtm1 => 3601,
            TileFormat::Srtm3 => 1201,
        }
    }

    /// Angular distance between neighbouring samples, in degrees.
    pub fn step_degrees(self) -> f64 {
        1.0 / (self.side() - 1) as f64
    }

    /// Size of a tile file in bytes.
    pub fn byte_len(self) -> usize {
        self.side() * self.side() * 2
    }
}

/// Canonical tile identifier, keyed by the tile's southwest integer corner.
///
/// Displayed as `N47E028`: hemisphere letter plus two latitude digits, then
/// hemisphere letter plus three longitude digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileName {
    lat: i32,
    lon: i32,
}

impl TileName {
    /// Create a tile name from integer southwest corner coordinates.
    ///
    /// Latitude must be in `[-90, 89]` and longitude in `[-180, 179]`.
    pub fn new(lat: i32, lon: i32) -> Result<Self> {
        if !(-90..=89).contains(&lat) || !(-180..=179).contains(&lon) {
            return Err(DemError::InvalidCoordinate {
                lat: lat as f64,
                lon: lon as f64,
            });
        }
        Ok(Self { lat, lon })
    }

    /// Name of the tile that owns a geographic coordinate.
    pub fn from_coord(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(DemError::InvalidCoordinate { lat, lon });
        }
        let lat_floor = lat.floor();
        let lon_floor = lon.floor();
        if !(-90.0..=89.0).contains(&lat_floor) || !(-180.0..=179.0).contains(&lon_floor) {
            return Err(DemError::InvalidCoordinate { lat, lon });
        }
        Ok(Self {
            lat: lat_floor as i32,
            lon: lon_floor as i32,
        })
    }

    /// Every tile holding a sample for a coordinate, the owning tile first.
    ///
    /// Whole-degree lines are shared: a point on one is also the northern row
    /// of the tile to its south or the eastern column of the tile to its west,
    /// and a corner belongs to four tiles. This also covers the 90° and 180°
    /// edges, which have no owning tile of their own.
    pub fn covering(lat: f64, lon: f64) -> Result<Vec<Self>> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(DemError::InvalidCoordinate { lat, lon });
        }
        let lats = whole_degree_neighbours(lat);
        let lons = whole_degree_neighbours(lon);

        let names: Vec<Self> = lats
            .iter()
            .flat_map(|&tile_lat| lons.iter().map(move |&tile_lon| (tile_lat, tile_lon)))
            .filter_map(|(tile_lat, tile_lon)| Self::new(tile_lat, tile_lon).ok())
            .collect();
        if names.is_empty() {
            return Err(DemError::InvalidCoordinate { lat, lon });
        }
        Ok(names)
    }

    /// Latitude of the southern edge.
    pub fn lat(&self) -> i32 {
        self.lat
    }

    /// Longitude of the western edge.
    pub fn lon(&self) -> i32 {
        self.lon
    }

    /// File name of this tile, e.g. `N47E028.hgt`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self, TILE_EXTENSION)
    }

    /// Parse a tile name like `N47E028` (case-insensitive).
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || DemError::InvalidTileName(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 7 || !s.is_ascii() {
            return Err(invalid());
        }

        let lat_sign = match bytes[0].to_ascii_uppercase() {
            b'N' => 1,
            b'S' => -1,
            _ => return Err(invalid()),
        };
        let lon_sign = match bytes[3].to_ascii_uppercase() {
            b'E' => 1,
            b'W' => -1,
            _ => return Err(invalid()),
        };

        let digits = |range: std::ops::Range<usize>| -> Result<i32> {
            let part = &s[range];
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };
        let lat = lat_sign * digits(1..3)?;
        let lon = lon_sign * digits(4..7)?;

        Self::new(lat, lon).map_err(|_| invalid())
    }
}

/// Floor of a coordinate, plus the degree below when it sits exactly on one.
fn whole_degree_neighbours(value: f64) -> Vec<i32> {
    let floor = value.floor();
    let degree = floor as i32;
    if value == floor {
        vec![degree, degree.saturating_sub(1)]
    } else {
        vec![degree]
    }
}

impl fmt::Display for TileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0 { 'E' } else { 'W' };
        write!(
            f,
            "{}{:02}{}{:03}",
            ns,
            self.lat.unsigned_abs(),
            ew,
            self.lon.unsigned_abs()
        )
    }
}

impl FromStr for TileName {
    type Err = DemError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// One elevation sample after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    /// A real measurement in meters.
    Measured(i16),
    /// The tile is present but the sample is a void.
    NoData,
    /// No tile covers this location.
    Missing,
}

impl Sample {
    /// Classify a raw tile value.
    pub fn from_raw(raw: i16) -> Self {
        if raw == NO_DATA {
            Sample::NoData
        } else {
            Sample::Measured(raw)
        }
    }

    /// Elevation in meters, with 0 substituted for voids and missing coverage.
    pub fn meters(self) -> f32 {
        match self {
            Sample::Measured(v) => v as f32,
            Sample::NoData | Sample::Missing => 0.0,
        }
    }

    /// Whether this is a real measurement.
    pub fn is_measured(self) -> bool {
        matches!(self, Sample::Measured(_))
    }
}

/// A single elevation tile loaded from a raw `.hgt` file.
#[derive(Debug, Clone)]
pub struct ElevationTile {
    name: TileName,
    format: TileFormat,
    /// Samples in row-major order (north to south, west to east).
    data: Vec<i16>,
}

impl ElevationTile {
    /// Parse a tile from its raw bytes.
    pub fn from_bytes(name: TileName, format: TileFormat, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != format.byte_len() {
            return Err(DemError::InvalidTileSize {
                name: name.to_string(),
                expected: format.byte_len(),
                actual: bytes.len(),
                side: format.side(),
            });
        }

        let data = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
            .collect();

        Ok(Self { name, format, data })
    }

    /// Load a tile from a file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P, name: TileName, format: TileFormat) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(name, format, &bytes)
    }

    /// Build a tile from already-decoded samples (row-major, north first).
    pub fn from_samples(name: TileName, format: TileFormat, data: Vec<i16>) -> Result<Self> {
        let side = format.side();
        if data.len() != side * side {
            return Err(DemError::InvalidTileSize {
                name: name.to_string(),
                expected: format.byte_len(),
                actual: data.len() * 2,
                side,
            });
        }
        Ok(Self { name, format, data })
    }

    /// Canonical name of this tile.
    pub fn name(&self) -> TileName {
        self.name
    }

    /// Layout of this tile.
    pub fn format(&self) -> TileFormat {
        self.format
    }

    /// Number of samples along one edge.
    pub fn side(&self) -> usize {
        self.format.side()
    }

    /// Raw sample at a grid position, or `None` outside the grid.
    pub fn raw(&self, row: usize, col: usize) -> Option<i16> {
        let side = self.side();
        if row >= side || col >= side {
            return None;
        }
        Some(self.data[row * side + col])
    }

    /// Classified sample at a grid position.
    pub fn sample(&self, row: usize, col: usize) -> Sample {
        self.raw(row, col).map_or(Sample::Missing, Sample::from_raw)
    }

    /// Nearest sample to a geographic coordinate.
    ///
    /// Rows increase southward from the tile's northern edge and columns
    /// increase eastward from its western edge. Coordinates outside the tile
    /// are clamped to the nearest edge sample.
    pub fn nearest(&self, lat: f64, lon: f64) -> Sample {
        let last = (self.side() - 1) as f64;
        let north = (self.name.lat + 1) as f64;
        let west = self.name.lon as f64;

        let row = ((north - lat) * last).round().clamp(0.0, last) as usize;
        let col = ((lon - west) * last).round().clamp(0.0, last) as usize;
        self.sample(row, col)
    }

    /// Get the approximate resolution in meters at the center of the tile.
    pub fn resolution_meters(&self) -> (f64, f64) {
        let step = self.format.step_degrees();
        let center_lat = self.name.lat as f64 + 0.5;

        // At the equator, 1 degree ≈ 111,320 meters
        // Longitude shrinks by cos(latitude)
        let meters_per_deg_lat = 111_320.0;
        let meters_per_deg_lon = 111_320.0 * center_lat.to_radians().cos();

        (step * meters_per_deg_lon, step * meters_per_deg_lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn srtm3_tile(name: TileName, fill: impl Fn(usize, usize) -> i16) -> ElevationTile {
        let side = TileFormat::Srtm3.side();
        let mut data = Vec::with_capacity(side * side);
        for row in 0..side {
            for col in 0..side {
                data.push(fill(row, col));
            }
        }
        ElevationTile::from_samples(name, TileFormat::Srtm3, data).unwrap()
    }

    #[test]
    fn test_tile_name_display() {
        assert_eq!(TileName::from_coord(47.3, 28.9).unwrap().to_string(), "N47E028");
        assert_eq!(TileName::from_coord(-0.5, -77.2).unwrap().to_string(), "S01W078");
        assert_eq!(TileName::from_coord(0.0, 0.0).unwrap().to_string(), "N00E000");
        assert_eq!(TileName::new(5, 7).unwrap().file_name(), "N05E007.hgt");
    }

    #[test]
    fn test_tile_name_parse() {
        let name = TileName::parse("N47E028").unwrap();
        assert_eq!((name.lat(), name.lon()), (47, 28));

        let name: TileName = "s12w077".parse().unwrap();
        assert_eq!((name.lat(), name.lon()), (-12, -77));

        assert!(TileName::parse("N47E28").is_err());
        assert!(TileName::parse("X47E028").is_err());
        assert!(TileName::parse("N4aE028").is_err());
        assert!(TileName::parse("N95E028").is_err());
        assert!(TileName::parse("N47E028.hgt").is_err());
    }

    #[test]
    fn test_tile_name_rejects_out_of_range() {
        assert!(TileName::new(90, 0).is_err());
        assert!(TileName::new(0, 180).is_err());
        assert!(TileName::from_coord(90.0, 0.0).is_err());
        assert!(TileName::from_coord(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_covering_shared_edges() {
        let names = |lat, lon| -> Vec<String> {
            TileName::covering(lat, lon)
                .unwrap()
                .iter()
                .map(|n| n.to_string())
                .collect()
        };
        assert_eq!(names(46.5, 28.5), ["N46E028"]);
        assert_eq!(names(47.0, 28.5), ["N47E028", "N46E028"]);
        assert_eq!(names(46.5, 29.0), ["N46E029", "N46E028"]);
        assert_eq!(
            names(47.0, 28.0),
            ["N47E028", "N47E027", "N46E028", "N46E027"]
        );
        // No tile starts at the pole or the antimeridian
        assert_eq!(names(90.0, 179.5), ["N89E179"]);
        assert_eq!(names(10.5, 180.0), ["N10E179"]);
        assert!(TileName::covering(91.0, 0.0).is_err());
        assert!(TileName::covering(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_from_bytes_big_endian() {
        let format = TileFormat::Srtm3;
        let mut bytes = vec![0u8; format.byte_len()];
        // First sample: 0x0102 = 258
        bytes[0] = 0x01;
        bytes[1] = 0x02;
        // Second sample: -2
        bytes[2] = 0xFF;
        bytes[3] = 0xFE;
        let name = TileName::new(46, 28).unwrap();
        let tile = ElevationTile::from_bytes(name, format, &bytes).unwrap();

        assert_eq!(tile.raw(0, 0), Some(258));
        assert_eq!(tile.raw(0, 1), Some(-2));
        assert_eq!(tile.raw(1200, 1200), Some(0));
        assert_eq!(tile.raw(1201, 0), None);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_size() {
        let name = TileName::new(46, 28).unwrap();
        let err = ElevationTile::from_bytes(name, TileFormat::Srtm1, &[0u8; 100]).unwrap_err();
        assert!(matches!(err, DemError::InvalidTileSize { actual: 100, .. }));
    }

    #[test]
    fn test_nearest_corners() {
        let name = TileName::new(46, 28).unwrap();
        let tile = srtm3_tile(name, |row, col| (row * 2 + col) as i16);

        // Northwest corner: row 0, col 0
        assert_eq!(tile.nearest(46.99999, 28.0), Sample::Measured(0));
        // Southeast corner
        assert_eq!(tile.nearest(46.0, 28.99999), Sample::Measured(3600));
        // One sample east of the northwest corner
        assert_eq!(tile.nearest(47.0, 28.0 + 1.0 / 1200.0), Sample::Measured(1));
        // One sample south
        assert_eq!(tile.nearest(47.0 - 1.0 / 1200.0, 28.0), Sample::Measured(2));
    }

    #[test]
    fn test_sentinel_is_no_data() {
        let name = TileName::new(46, 28).unwrap();
        let tile = srtm3_tile(name, |_, _| NO_DATA);
        let sample = tile.nearest(46.5, 28.5);
        assert_eq!(sample, Sample::NoData);
        assert_eq!(sample.meters(), 0.0);
        assert!(!sample.is_measured());
    }

    #[test]
    fn test_resolution_meters() {
        let tile = srtm3_tile(TileName::new(0, 0).unwrap(), |_, _| 0);
        let (lon_m, lat_m) = tile.resolution_meters();
        approx::assert_relative_eq!(lat_m, 92.77, epsilon = 0.01);
        assert!(lon_m < lat_m);
    }
}
