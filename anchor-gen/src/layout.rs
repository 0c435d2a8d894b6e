//! Feature map geometry and the flat ordering of tiled positions.

use crate::common::*;

/// Feature map size in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn num_cells(&self) -> usize {
        self.rows * self.cols
    }

    pub fn contains(&self, other: &GridShape) -> bool {
        other.rows <= self.rows && other.cols <= self.cols
    }
}

impl Display for GridShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelShape {
    pub h: usize,
    pub w: usize,
}

impl PixelShape {
    pub fn new(h: usize, w: usize) -> Self {
        Self { h, w }
    }
}

/// Position ordering shared by tiled anchors and validity flags.
///
/// Positions are enumerated row by row, then column by column, then by basis
/// index, with the basis index varying fastest. The flat index of
/// `(row, col, anchor)` is `(row * cols + col) * num_base_anchors + anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, CopyGetters)]
pub struct AnchorLayout {
    #[getset(get_copy = "pub")]
    feature_size: GridShape,
    #[getset(get_copy = "pub")]
    num_base_anchors: usize,
}

impl AnchorLayout {
    pub fn new(feature_size: GridShape, num_base_anchors: usize) -> Self {
        Self {
            feature_size,
            num_base_anchors,
        }
    }

    pub fn len(&self) -> usize {
        self.feature_size.num_cells() * self.num_base_anchors
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flat_index(&self, row: usize, col: usize, anchor: usize) -> Option<usize> {
        let GridShape { rows, cols } = self.feature_size;
        (row < rows && col < cols && anchor < self.num_base_anchors)
            .then(|| (row * cols + col) * self.num_base_anchors + anchor)
    }

    /// Inverse of [AnchorLayout::flat_index], returning `(row, col, anchor)`.
    pub fn unravel(&self, index: usize) -> Option<(usize, usize, usize)> {
        if index >= self.len() {
            return None;
        }
        let cols = self.feature_size.cols;
        let anchor = index % self.num_base_anchors;
        let cell = index / self.num_base_anchors;
        Some((cell / cols, cell % cols, anchor))
    }

    /// Iterates `(row, col, anchor)` in flat order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize, usize)> {
        let GridShape { rows, cols } = self.feature_size;
        iproduct!(0..rows, 0..cols, 0..self.num_base_anchors)
    }
}
