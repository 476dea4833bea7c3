use crate::types::CellPos;
use std::ops::Range;

/// Dense 3-D occupancy grid over a fixed `(x, z, y)` domain.
///
/// Each cell is a binary occupancy state: `1` holds a sand grain, `0` is
/// empty air. `x` runs along the platform width, `z` along its depth and `y`
/// upwards, so `y = 0` is the platform floor and `y = height - 1` the layer
/// grains are dropped onto.
///
/// Dimensions are fixed at construction. Resizing means building a new grid
/// and re-seeding it; no grid survives a resize.
#[derive(Debug, Clone)]
pub struct SandGrid {
    width: usize,
    depth: usize,
    height: usize,
    /// Flat cell storage, x-major, then z, then y.
    cells: Vec<u8>,
}

impl SandGrid {
    /// Creates a zero-initialized (all-empty) grid.
    ///
    /// ### Panics
    /// Panics if any dimension is zero.
    pub fn new(width: usize, depth: usize, height: usize) -> Self {
        assert!(
            width > 0 && depth > 0 && height > 0,
            "grid dimensions must be positive, got {width}x{depth}x{height}"
        );
        Self {
            width,
            depth,
            height,
            cells: vec![0; width * depth * height],
        }
    }

    /// Grid extent along the x axis.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid extent along the z axis.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Grid extent along the y (vertical) axis.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Flat index of `(x, z, y)`, asserting the coordinate is in range.
    #[inline]
    fn index(&self, x: usize, z: usize, y: usize) -> usize {
        assert!(
            x < self.width && z < self.depth && y < self.height,
            "cell ({x}, {z}, {y}) out of bounds for {}x{}x{} grid",
            self.width,
            self.depth,
            self.height
        );
        (x * self.depth + z) * self.height + y
    }

    /// Returns `true` if the cell at `(x, z, y)` holds a grain.
    ///
    /// ### Panics
    /// Panics if the coordinate is out of range.
    #[inline]
    pub fn get(&self, x: usize, z: usize, y: usize) -> bool {
        self.cells[self.index(x, z, y)] != 0
    }

    /// Sets or clears the grain at `(x, z, y)`.
    ///
    /// ### Panics
    /// Panics if the coordinate is out of range.
    #[inline]
    pub fn set(&mut self, x: usize, z: usize, y: usize, occupied: bool) {
        let i = self.index(x, z, y);
        self.cells[i] = occupied as u8;
    }

    /// Returns `true` if the signed coordinate lies inside the grid.
    ///
    /// Neighbour offsets are computed in signed space and validated here
    /// before any `get`/`set` call dereferences them.
    #[inline]
    pub fn in_bounds(&self, x: i32, z: i32, y: i32) -> bool {
        x >= 0
            && (x as usize) < self.width
            && z >= 0
            && (z as usize) < self.depth
            && y >= 0
            && (y as usize) < self.height
    }

    /// Total number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    /// Fills a sub-box of the grid with grains.
    ///
    /// The x and z extents are given as fractions of the grid width/depth
    /// (e.g. `0.4..0.9` covers the middle-right band); the y extent is an
    /// absolute layer range, clamped to the grid height.
    pub fn seed_region(&mut self, x_frac: Range<f32>, z_frac: Range<f32>, y: Range<usize>) {
        let x0 = (self.width as f32 * x_frac.start).floor() as usize;
        let x1 = ((self.width as f32 * x_frac.end).floor() as usize).min(self.width);
        let z0 = (self.depth as f32 * z_frac.start).floor() as usize;
        let z1 = ((self.depth as f32 * z_frac.end).floor() as usize).min(self.depth);
        let y1 = y.end.min(self.height);

        for x in x0..x1 {
            for z in z0..z1 {
                for y in y.start..y1 {
                    self.set(x, z, y, true);
                }
            }
        }
    }

    /// Iterates over all occupied cells in x-major, then z, then y order.
    ///
    /// This is the read-only projection the driver turns into a render list;
    /// the order matches the flat storage layout.
    pub fn occupied_cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, &c)| {
            (c != 0).then(|| {
                let y = i % self.height;
                let z = (i / self.height) % self.depth;
                let x = i / (self.height * self.depth);
                (x, z, y)
            })
        })
    }
}
