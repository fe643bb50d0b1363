//! Placement of cell aggregates onto free landmass cells.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::geo::{GridCell, Lobe, build_outline, fill_interior};
use crate::registry::CellAggregate;

/// Landmass cells still free for placement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidCellSet {
    cells: BTreeSet<GridCell>,
}

impl ValidCellSet {
    /// Rasterizes the lobes and fills their union on a `width` x `height` grid.
    pub fn from_lobes(lobes: &[Lobe], width: usize, height: usize) -> Self {
        let outline = build_outline(lobes);
        Self {
            cells: fill_interior(&outline, width, height),
        }
    }

    pub fn from_cells(cells: impl IntoIterator<Item = GridCell>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: &GridCell) -> bool {
        self.cells.contains(cell)
    }

    /// Free cells in `(x, y)` order.
    pub fn iter(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    /// Closest free cell to `cell`, ties resolved by `(x, y)` order.
    pub fn nearest(&self, cell: &GridCell) -> Option<GridCell> {
        let mut best: Option<(u64, GridCell)> = None;
        for candidate in &self.cells {
            let d = cell.distance_sq(candidate);
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, *candidate));
            }
        }
        best.map(|(_, c)| c)
    }

    /// Removes `cell` from the set, returning whether it was free.
    pub fn take(&mut self, cell: &GridCell) -> bool {
        self.cells.remove(cell)
    }
}

/// An aggregate bound to the cell its agent will occupy.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub cell: GridCell,
    pub aggregate: CellAggregate,
}

impl Placement {
    /// Whether the agent had to move off the aggregate's own cell.
    pub fn snapped(&self) -> bool {
        self.cell != self.aggregate.cell
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlacementReport {
    pub placed: Vec<Placement>,
    pub unplaced: usize,
}

/// Places aggregates in `(x, y)` order, consuming cells from `valid`.
///
/// An aggregate stays on its own cell when that cell is free, otherwise it
/// snaps to the nearest free cell. Aggregates left over once `valid` runs
/// dry are counted as unplaced.
pub fn place_aggregates(
    aggregates: &BTreeMap<GridCell, CellAggregate>,
    valid: &mut ValidCellSet,
) -> PlacementReport {
    let mut report = PlacementReport::default();
    for (cell, aggregate) in aggregates {
        let target = if valid.contains(cell) {
            Some(*cell)
        } else {
            valid.nearest(cell)
        };
        match target {
            Some(target) => {
                valid.take(&target);
                report.placed.push(Placement {
                    cell: target,
                    aggregate: aggregate.clone(),
                });
            }
            None => report.unplaced += 1,
        }
    }
    if report.unplaced > 0 {
        warn!(unplaced = report.unplaced, "no free landmass cell left for aggregates");
    }
    report
}
