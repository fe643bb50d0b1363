//! Grid coordinates and the geographic projection onto them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Integer cell coordinate in the simulation grid.
///
/// Ordering is `(x, y)` lexicographic, which is the sort key used wherever
/// cell iteration order could leak into results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub x: usize,
    pub y: usize,
}

impl GridCell {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance in grid units.
    pub fn distance_sq(&self, other: &GridCell) -> u64 {
        let dx = self.x.abs_diff(other.x) as u64;
        let dy = self.y.abs_diff(other.y) as u64;
        dx * dx + dy * dy
    }

    /// Euclidean distance in grid units.
    pub fn distance(&self, other: &GridCell) -> f64 {
        (self.distance_sq(other) as f64).sqrt()
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Geographic bounding box projected onto the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GridBounds {
    /// Bounding box covering Denmark, including Bornholm.
    pub fn denmark() -> Self {
        Self {
            min_lat: 54.5,
            max_lat: 57.8,
            min_lon: 7.9,
            max_lon: 15.4,
        }
    }

    /// Returns `true` if the point lies inside the box (edges inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Returns `true` for a finite WGS84 coordinate pair.
pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Affine projection from a fixed bounding box onto a `width` x `height` grid.
///
/// Longitude maps to `x` (west to east), latitude maps to `y` (south to
/// north). Points outside the box are clamped onto the border cells.
///
/// # Examples
///
/// ```
/// use wind_sim::geo::grid::{GridBounds, GridIndexer};
///
/// let indexer = GridIndexer::new(GridBounds::denmark(), 70, 70).unwrap();
/// let a = indexer.map_to_grid(55.68, 12.57);
/// let b = indexer.map_to_grid(55.68, 12.57);
/// assert_eq!(a, b);
/// assert!(a.x < 70 && a.y < 70);
/// ```
#[derive(Debug, Clone)]
pub struct GridIndexer {
    bounds: GridBounds,
    width: usize,
    height: usize,
}

impl GridIndexer {
    /// Creates an indexer for the given bounds and grid size.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` if the grid is empty or the box is degenerate.
    pub fn new(bounds: GridBounds, width: usize, height: usize) -> SimResult<Self> {
        let mut errors = Vec::new();
        if width == 0 || height == 0 {
            errors.push(crate::config::ConfigError::new("grid", "width and height must be > 0"));
        }
        let finite = [bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon]
            .iter()
            .all(|v| v.is_finite());
        if !finite || bounds.min_lat >= bounds.max_lat || bounds.min_lon >= bounds.max_lon {
            errors.push(crate::config::ConfigError::new(
                "grid",
                "bounding box must be finite with min < max on both axes",
            ));
        }
        if !errors.is_empty() {
            return Err(SimError::Config(errors));
        }
        Ok(Self {
            bounds,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    /// Maps a latitude/longitude pair onto a grid cell.
    ///
    /// Pure and deterministic. Non-finite input lands on cell `(0, 0)`;
    /// callers filter invalid geometry before projecting.
    pub fn map_to_grid(&self, lat: f64, lon: f64) -> GridCell {
        let fx = (lon - self.bounds.min_lon) / (self.bounds.max_lon - self.bounds.min_lon);
        let fy = (lat - self.bounds.min_lat) / (self.bounds.max_lat - self.bounds.min_lat);
        GridCell {
            x: scale_clamped(fx, self.width),
            y: scale_clamped(fy, self.height),
        }
    }

    /// Latitude/longitude of the center of `cell`; the inverse of
    /// [`map_to_grid`](Self::map_to_grid) for cells on the grid.
    pub fn cell_center(&self, cell: &GridCell) -> (f64, f64) {
        let b = &self.bounds;
        let lat = b.min_lat + (cell.y as f64 + 0.5) / self.height as f64 * (b.max_lat - b.min_lat);
        let lon = b.min_lon + (cell.x as f64 + 0.5) / self.width as f64 * (b.max_lon - b.min_lon);
        (lat, lon)
    }

    /// Returns `true` if the cell lies on this grid.
    pub fn contains(&self, cell: &GridCell) -> bool {
        cell.x < self.width && cell.y < self.height
    }
}

/// Scales a unit fraction onto `[0, n)` with clamping at both ends.
fn scale_clamped(frac: f64, n: usize) -> usize {
    if !frac.is_finite() || frac <= 0.0 {
        return 0;
    }
    let idx = (frac * n as f64).floor();
    if idx >= n as f64 { n - 1 } else { idx as usize }
}
