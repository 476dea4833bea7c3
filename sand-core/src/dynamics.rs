//! Per-tick relaxation of the sand grid.
//!
//! The driver calls [`step`] once per discrete tick; one call attempts, for
//! every occupied cell, exactly one move in phase order:
//! 1. wind — the diagonal push (downwind and one step down), falling back to
//!    the pure horizontal push;
//! 2. gravity — straight down;
//! 3. diagonal gravity — one of the 8 below-diagonal neighbours, chosen
//!    uniformly at random among the empty ones.
//!
//! The pass is in-place over one shared mutable grid, not double-buffered:
//! a grain that lands in a cell the scan has not reached yet is evaluated
//! again later in the same pass and may move more than one cell per tick.

use crate::config::{ScanOrder, WindConfig, WindDirection};
use crate::grid::SandGrid;
use glam::IVec2;
use rand::Rng;

/// Horizontal offsets of the 8 below-diagonal neighbours, each combined
/// with one step down when probed.
const SLIDE_OFFSETS: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(1, 1),
    IVec2::new(1, -1),
    IVec2::new(-1, 1),
    IVec2::new(-1, -1),
];

/// Runs one relaxation pass over the whole grid.
///
/// Layers are scanned bottom-to-top so lower grains settle before the
/// grains above them are evaluated; within each layer the `(x, z)` columns
/// follow the wind's scan order, starting from the edge the wind pushes
/// toward. Moves are committed immediately (source cleared, target set), so
/// the pass observes its own mutations.
///
/// ### Parameters
/// - `grid` - The occupancy grid, mutated in place.
/// - `wind` - Wind state for this step; never mutated.
/// - `rng` - Random source for the diagonal-gravity tie-break. Injecting a
///   seeded generator makes a step reproducible.
///
/// ### Returns
/// `true` if at least one grain moved, `false` if the grid is at rest.
pub fn step(grid: &mut SandGrid, wind: WindConfig, rng: &mut impl Rng) -> bool {
    let columns = scan_columns(grid, wind);
    let mut changed = false;

    for y in 0..grid.height() {
        for &(x, z) in &columns {
            if grid.get(x, z, y) {
                changed |= relax_grain(grid, x, z, y, wind, rng);
            }
        }
    }

    changed
}

/// Places grains at the top layer over a rectangular footprint.
///
/// The footprint is centered on `(center_x, center_z)`; at each of its
/// `(x, z)` positions one grain is placed at `y = height - 1` if that cell
/// is in bounds and empty. Out-of-bounds positions and occupied top cells
/// are skipped silently. Dropping does not run a relaxation pass; the
/// driver calls [`step`] right after so fresh grains start falling.
///
/// ### Parameters
/// - `grid` - The occupancy grid, mutated in place.
/// - `footprint_width` / `footprint_depth` - Footprint extent in cells.
/// - `center_x` / `center_z` - Center column; may lie outside the grid, in
///   which case only the in-bounds part of the footprint places grains.
pub fn drop_grains(
    grid: &mut SandGrid,
    footprint_width: usize,
    footprint_depth: usize,
    center_x: i32,
    center_z: i32,
) {
    let top = grid.height() - 1;

    for i in 0..footprint_width {
        for j in 0..footprint_depth {
            let x = center_x + i as i32 - (footprint_width / 2) as i32;
            let z = center_z + j as i32 - (footprint_depth / 2) as i32;
            if grid.in_bounds(x, z, top as i32) && !grid.get(x as usize, z as usize, top) {
                grid.set(x as usize, z as usize, top, true);
            }
        }
    }
}

/// Builds the `(x, z)` column visit order for one layer.
fn scan_columns(grid: &SandGrid, wind: WindConfig) -> Vec<(usize, usize)> {
    let width = grid.width();
    let depth = grid.depth();
    let mut columns = Vec::with_capacity(width * depth);

    match wind.scan_order() {
        ScanOrder::XAscending => {
            for x in 0..width {
                for z in 0..depth {
                    columns.push((x, z));
                }
            }
        }
        ScanOrder::XDescending => {
            for x in (0..width).rev() {
                for z in 0..depth {
                    columns.push((x, z));
                }
            }
        }
        ScanOrder::ZAscending => {
            for z in 0..depth {
                for x in 0..width {
                    columns.push((x, z));
                }
            }
        }
        ScanOrder::ZDescending => {
            for z in (0..depth).rev() {
                for x in 0..width {
                    columns.push((x, z));
                }
            }
        }
    }

    columns
}

/// Attempts the single move an occupied cell gets this pass.
fn relax_grain(
    grid: &mut SandGrid,
    x: usize,
    z: usize,
    y: usize,
    wind: WindConfig,
    rng: &mut impl Rng,
) -> bool {
    if wind.enabled && blow_grain(grid, x, z, y, wind.direction) {
        return true;
    }

    // Straight down.
    if y > 0 && !grid.get(x, z, y - 1) {
        grid.set(x, z, y, false);
        grid.set(x, z, y - 1, true);
        return true;
    }

    slide_grain(grid, x, z, y, rng)
}

/// Wind phase: diagonal push first, pure horizontal as the fallback.
fn blow_grain(grid: &mut SandGrid, x: usize, z: usize, y: usize, dir: WindDirection) -> bool {
    let push = dir.horizontal();
    let nx = x as i32 + push.x;
    let nz = z as i32 + push.y;

    // Downwind and one step down.
    let ny = y as i32 - 1;
    if grid.in_bounds(nx, nz, ny) && !grid.get(nx as usize, nz as usize, ny as usize) {
        grid.set(x, z, y, false);
        grid.set(nx as usize, nz as usize, ny as usize, true);
        return true;
    }

    // Downwind at the same height.
    if grid.in_bounds(nx, nz, y as i32) && !grid.get(nx as usize, nz as usize, y) {
        grid.set(x, z, y, false);
        grid.set(nx as usize, nz as usize, y, true);
        return true;
    }

    false
}

/// Diagonal-gravity phase: collect the empty below-diagonal neighbours and
/// move to one of them at random. A grain with no candidates is at rest.
fn slide_grain(grid: &mut SandGrid, x: usize, z: usize, y: usize, rng: &mut impl Rng) -> bool {
    if y == 0 {
        return false;
    }
    let ny = y - 1;

    let mut candidates = Vec::with_capacity(SLIDE_OFFSETS.len());
    for off in SLIDE_OFFSETS {
        let nx = x as i32 + off.x;
        let nz = z as i32 + off.y;
        if grid.in_bounds(nx, nz, ny as i32) && !grid.get(nx as usize, nz as usize, ny) {
            candidates.push((nx as usize, nz as usize));
        }
    }

    if candidates.is_empty() {
        return false;
    }

    let (nx, nz) = candidates[rng.random_range(0..candidates.len())];
    grid.set(x, z, y, false);
    grid.set(nx, nz, ny, true);
    true
}
