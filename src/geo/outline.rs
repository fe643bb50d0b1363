//! Landmass outline rasterization and scanline interior fill.
//!
//! A landmass is modeled as a union of lobes. Each lobe is an N-gon whose
//! corners sit on a rotated ellipse; its edges are drawn as digital lines and
//! the enclosed cells are recovered with an even-odd scanline pass.

use std::collections::{BTreeMap, BTreeSet};

use super::grid::GridCell;

/// Outline pixel. Signed, since lobes may extend past the grid edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pixel {
    pub x: i64,
    pub y: i64,
}

impl Pixel {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Converts to a grid cell if the pixel lies on a `width` x `height` grid.
    pub fn to_cell(self, width: usize, height: usize) -> Option<GridCell> {
        let x = usize::try_from(self.x).ok()?;
        let y = usize::try_from(self.y).ok()?;
        (x < width && y < height).then_some(GridCell { x, y })
    }
}

/// One landmass lobe: an N-gon inscribed in a rotated ellipse.
#[derive(Debug, Clone, PartialEq)]
pub struct Lobe {
    /// Ellipse center, x axis (grid units).
    pub center_x: i64,
    /// Ellipse center, y axis (grid units).
    pub center_y: i64,
    /// Semi-axis along x before rotation.
    pub radius_x: f64,
    /// Semi-axis along y before rotation.
    pub radius_y: f64,
    /// Counter-clockwise rotation in degrees.
    pub rotation_deg: f64,
    /// Number of polygon corners.
    pub corners: usize,
}

impl Lobe {
    /// Creates an unrotated octagonal lobe.
    pub fn new(center_x: i64, center_y: i64, radius_x: f64, radius_y: f64) -> Self {
        Self {
            center_x,
            center_y,
            radius_x,
            radius_y,
            rotation_deg: 0.0,
            corners: 8,
        }
    }

    /// Returns the lobe with the given rotation.
    pub fn rotated(mut self, rotation_deg: f64) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }

    /// Corner pixels at `corners` equally spaced angles around the ellipse.
    ///
    /// Offsets are truncated toward zero before being added to the center.
    pub fn corner_pixels(&self) -> Vec<Pixel> {
        if self.corners == 0 {
            return Vec::new();
        }
        let rot = self.rotation_deg.to_radians();
        let (sin_r, cos_r) = rot.sin_cos();
        (0..self.corners)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / self.corners as f64;
                let x0 = self.radius_x * angle.cos();
                let y0 = self.radius_y * angle.sin();
                let xr = x0 * cos_r - y0 * sin_r;
                let yr = x0 * sin_r + y0 * cos_r;
                Pixel::new(self.center_x + xr as i64, self.center_y + yr as i64)
            })
            .collect()
    }

    /// Closed outline of this lobe, deduplicated and sorted by `(x, y)`.
    pub fn outline(&self) -> Vec<Pixel> {
        let corners = self.corner_pixels();
        let mut pixels = BTreeSet::new();
        for (i, start) in corners.iter().enumerate() {
            let end = corners[(i + 1) % corners.len()];
            pixels.extend(draw_line(*start, end));
        }
        pixels.into_iter().collect()
    }
}

/// Rasterizes the segment `a -> b` with Bresenham's integer algorithm.
///
/// Both endpoints are included and consecutive pixels are 8-connected.
pub fn draw_line(a: Pixel, b: Pixel) -> Vec<Pixel> {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };

    let mut points = Vec::with_capacity((dx.max(dy) + 1) as usize);
    let mut err = dx - dy;
    let (mut x, mut y) = (a.x, a.y);

    loop {
        points.push(Pixel::new(x, y));
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// Builds the union outline of several lobes.
///
/// Outline pixels of one lobe that fall strictly inside another lobe's
/// interior are dropped, so overlapping lobes fill as a single landmass.
/// The result is deduplicated and sorted by `(x, y)`.
pub fn build_outline(lobes: &[Lobe]) -> Vec<Pixel> {
    let outlines: Vec<Vec<Pixel>> = lobes.iter().map(Lobe::outline).collect();
    if outlines.len() == 1 {
        return outlines.into_iter().next().unwrap_or_default();
    }

    let interiors: Vec<BTreeSet<Pixel>> = outlines.iter().map(|o| scanline_interior(o)).collect();
    let mut merged = BTreeSet::new();
    for (i, outline) in outlines.iter().enumerate() {
        for p in outline {
            let covered = interiors
                .iter()
                .enumerate()
                .any(|(j, interior)| j != i && interior.contains(p));
            if !covered {
                merged.insert(*p);
            }
        }
    }
    merged.into_iter().collect()
}

/// Returns the grid cells enclosed by `outline` on a `width` x `height` grid.
///
/// Outline pixels themselves are never part of the result. An empty outline
/// yields an empty set.
pub fn fill_interior(outline: &[Pixel], width: usize, height: usize) -> BTreeSet<GridCell> {
    scanline_interior(outline)
        .into_iter()
        .filter_map(|p| p.to_cell(width, height))
        .collect()
}

/// Even-odd scanline fill over an unbounded plane.
///
/// Per row the outline x coordinates are sorted and consumed two at a time;
/// the cells strictly between each pair are filled. A trailing unmatched x is
/// paired with itself, which fills nothing.
fn scanline_interior(outline: &[Pixel]) -> BTreeSet<Pixel> {
    let boundary: BTreeSet<Pixel> = outline.iter().copied().collect();
    let mut rows: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for p in &boundary {
        rows.entry(p.y).or_default().push(p.x);
    }

    let mut inside = BTreeSet::new();
    for (y, mut xs) in rows {
        xs.sort_unstable();
        for pair in xs.chunks(2) {
            let (start, end) = match *pair {
                [a, b] => (a, b),
                [a] => (a, a),
                _ => continue,
            };
            for x in (start + 1)..end {
                let p = Pixel::new(x, y);
                if !boundary.contains(&p) {
                    inside.insert(p);
                }
            }
        }
    }
    inside
}
