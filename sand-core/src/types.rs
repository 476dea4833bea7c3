/// Position of a cell in a [`crate::grid::SandGrid`], as `(x, z, y)` indices.
///
/// Only meaningful for the grid it was read from, and only while that grid's
/// dimensions are unchanged (a resize constructs a new grid).
pub type CellPos = (usize, usize, usize);
