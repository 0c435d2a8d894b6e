//! Tiling the basis set across a feature map.

use crate::{
    basis::BasisSet,
    common::*,
    layout::{AnchorLayout, GridShape},
};

/// Anchors tiled over one feature map, in absolute pixel coordinates.
///
/// The boxes are stored as a `[N, 4]` array of `(x_min, y_min, x_max, y_max)`
/// rows ordered by [AnchorLayout].
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct TiledAnchors {
    #[getset(get = "pub")]
    boxes: Array2<f32>,
    #[getset(get_copy = "pub")]
    layout: AnchorLayout,
    #[getset(get_copy = "pub")]
    stride: R64,
}

impl TiledAnchors {
    pub fn len(&self) -> usize {
        self.boxes.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn feature_size(&self) -> GridShape {
        self.layout.feature_size()
    }

    pub fn num_base_anchors(&self) -> usize {
        self.layout.num_base_anchors()
    }

    pub fn flat_index(&self, row: usize, col: usize, anchor: usize) -> Option<usize> {
        self.layout.flat_index(row, col, anchor)
    }

    pub fn get(&self, index: usize) -> Option<XYXY<f32>> {
        (index < self.len()).then(|| {
            let row = self.boxes.row(index);
            XYXY::from_corners(row[0], row[1], row[2], row[3])
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = XYXY<f32>> + '_ {
        self.boxes
            .outer_iter()
            .map(|row| XYXY::from_corners(row[0], row[1], row[2], row[3]))
    }

    pub fn into_array(self) -> Array2<f32> {
        self.boxes
    }
}

/// Shift offsets `index * stride` for `len` cells.
fn shifts(len: usize, stride: f64) -> Vec<f64> {
    (0..len).map(|index| index as f64 * stride).collect()
}

pub(crate) fn check_stride(stride: f64) -> AnchorResult<R64> {
    match R64::try_new(stride) {
        Some(stride) if stride.raw() > 0.0 => Ok(stride),
        _ => Err(AnchorError::InvalidStride(stride)),
    }
}

/// Replicates every basis anchor on each cell of a `feature_size` grid.
///
/// Cell `(row, col)` shifts the basis by `(col * stride, row * stride)`.
/// Zero-sized feature maps give an empty set.
pub fn tile(basis: &BasisSet, feature_size: GridShape, stride: f64) -> AnchorResult<TiledAnchors> {
    let stride = check_stride(stride)?;
    let layout = AnchorLayout::new(feature_size, basis.len());

    let shift_x = shifts(feature_size.cols, stride.raw());
    let shift_y = shifts(feature_size.rows, stride.raw());

    let corners: Vec<f32> = layout
        .positions()
        .flat_map(|(row, col, anchor)| {
            let shifted = basis.boxes()[anchor].translate(shift_x[col], shift_y[row]);
            shifted.xyxy().map(|value| value as f32)
        })
        .collect();
    let boxes = Array2::from_shape_vec((layout.len(), 4), corners)?;

    Ok(TiledAnchors {
        boxes,
        layout,
        stride,
    })
}
