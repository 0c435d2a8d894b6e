//! Validity flags for tiled anchors on padded feature maps.

use crate::{
    common::*,
    grid::TiledAnchors,
    layout::{AnchorLayout, GridShape},
};

/// One flag per tiled position, true where the cell lies in real image content.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct ValidFlags {
    #[getset(get = "pub")]
    flags: Array1<bool>,
    #[getset(get_copy = "pub")]
    layout: AnchorLayout,
    #[getset(get_copy = "pub")]
    valid_size: GridShape,
}

impl ValidFlags {
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.flags.get(index).copied()
    }

    pub fn flat_index(&self, row: usize, col: usize, anchor: usize) -> Option<usize> {
        self.layout.flat_index(row, col, anchor)
    }

    pub fn num_valid(&self) -> usize {
        self.flags.iter().filter(|&&flag| flag).count()
    }

    /// Fails unless `anchors` was tiled with the same grid and basis count.
    pub fn check_aligned(&self, anchors: &TiledAnchors) -> AnchorResult<()> {
        if self.layout != anchors.layout() {
            return Err(AnchorError::Misaligned(format!(
                "flags cover {} cells with {} anchors each, but anchors cover {} cells with {} anchors each",
                self.layout.feature_size(),
                self.layout.num_base_anchors(),
                anchors.feature_size(),
                anchors.num_base_anchors(),
            )));
        }
        Ok(())
    }

    /// Keeps the boxes of `anchors` whose flag is set, preserving order.
    pub fn select(&self, anchors: &TiledAnchors) -> AnchorResult<Array2<f32>> {
        self.check_aligned(anchors)?;
        let indices: Vec<_> = self.flags.iter().positions(|&flag| flag).collect();
        Ok(anchors.boxes().select(Axis(0), &indices))
    }

    pub fn into_array(self) -> Array1<bool> {
        self.flags
    }
}

/// Flags every tiled position of a `feature_size` grid with `num_base_anchors`
/// anchors per cell.
///
/// A cell `(row, col)` is valid iff `row < valid_size.rows` and
/// `col < valid_size.cols`. The flag is repeated for each anchor of the cell,
/// so the result aligns with [crate::grid::tile] output of the same layout.
pub fn valid_mask(
    num_base_anchors: usize,
    feature_size: GridShape,
    valid_size: GridShape,
) -> AnchorResult<ValidFlags> {
    if !feature_size.contains(&valid_size) {
        return Err(AnchorError::Geometry {
            valid_rows: valid_size.rows,
            valid_cols: valid_size.cols,
            feature_rows: feature_size.rows,
            feature_cols: feature_size.cols,
        });
    }

    let layout = AnchorLayout::new(feature_size, num_base_anchors);
    let flags: Array1<bool> = layout
        .positions()
        .map(|(row, col, _anchor)| row < valid_size.rows && col < valid_size.cols)
        .collect();

    Ok(ValidFlags {
        flags,
        layout,
        valid_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{basis::BasisSet, config::AnchorConfig, grid::tile};

    #[test]
    fn flags_follow_valid_region() {
        let feature_size = GridShape::new(4, 5);
        let valid_size = GridShape::new(2, 3);
        let flags = valid_mask(3, feature_size, valid_size).unwrap();

        assert_eq!(flags.len(), 4 * 5 * 3);
        assert_eq!(flags.num_valid(), 2 * 3 * 3);
        for row in 0..4 {
            for col in 0..5 {
                for anchor in 0..3 {
                    let index = flags.flat_index(row, col, anchor).unwrap();
                    assert_eq!(index, (row * 5 + col) * 3 + anchor);
                    assert_eq!(flags.get(index), Some(row < 2 && col < 3));
                }
            }
        }
    }

    #[test]
    fn full_and_empty_valid_regions() {
        let all = valid_mask(2, GridShape::new(3, 3), GridShape::new(3, 3)).unwrap();
        assert_eq!(all.num_valid(), all.len());

        let none = valid_mask(2, GridShape::new(3, 3), GridShape::new(0, 3)).unwrap();
        assert_eq!(none.num_valid(), 0);
        assert_eq!(none.len(), 18);

        assert!(valid_mask(2, GridShape::new(0, 3), GridShape::new(0, 0))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn reject_oversized_valid_region() {
        for valid_size in [GridShape::new(5, 2), GridShape::new(2, 5)] {
            assert!(matches!(
                valid_mask(1, GridShape::new(4, 4), valid_size),
                Err(AnchorError::Geometry { .. })
            ));
        }
    }

    #[test]
    fn select_valid_anchors() {
        let config = AnchorConfig::clustered(16.0, &[10.0, 20.0], &[20.0, 10.0]).unwrap();
        let basis = BasisSet::synthesize(&config);
        let anchors = tile(&basis, GridShape::new(2, 2), 16.0).unwrap();

        let flags = valid_mask(2, GridShape::new(2, 2), GridShape::new(1, 2)).unwrap();
        let selected = flags.select(&anchors).unwrap();
        assert_eq!(selected.dim(), (4, 4));
        assert_eq!(selected.row(2).to_vec(), vec![19.0, -2.0, 28.0, 17.0]);

        let misaligned = valid_mask(1, GridShape::new(2, 2), GridShape::new(1, 2)).unwrap();
        assert!(matches!(
            misaligned.check_aligned(&anchors),
            Err(AnchorError::Misaligned(_))
        ));
    }
}
