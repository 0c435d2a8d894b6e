//! Basis anchor synthesis.

use crate::{
    common::*,
    config::{AnchorConfig, BasisKind},
};

/// Rounds a corner coordinate to the nearest integer, ties to even.
pub fn round_corner(value: f64) -> f64 {
    value.round_ties_even()
}

/// The ordered anchor shapes placed around the configured center.
///
/// Box corners are rounded with [round_corner]. The position of each box is
/// fixed by the synthesis rule and is relied on by tiling and label
/// assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisSet {
    center: [f64; 2],
    boxes: Vec<XYXY<f64>>,
}

impl BasisSet {
    pub fn synthesize(config: &AnchorConfig) -> Self {
        let [x_ctr, y_ctr] = config.resolved_center();
        let base_size = config.base_size().raw();

        let boxes: Vec<_> = basis_shapes(base_size, config.kind())
            .into_iter()
            .map(|[w, h]| XYXY::from_center_size(x_ctr, y_ctr, w, h).round_with(round_corner))
            .collect();
        debug_assert_eq!(boxes.len(), config.num_base_anchors());

        debug!(
            "synthesized {} basis anchors around ({}, {})",
            boxes.len(),
            x_ctr,
            y_ctr
        );

        Self {
            center: [x_ctr, y_ctr],
            boxes,
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn center(&self) -> [f64; 2] {
        self.center
    }

    pub fn boxes(&self) -> &[XYXY<f64>] {
        &self.boxes
    }

    pub fn get(&self, index: usize) -> Option<&XYXY<f64>> {
        self.boxes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &XYXY<f64>> {
        self.boxes.iter()
    }

    /// The basis boxes as a `[A, 4]` array of corners.
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.boxes.len(), 4), |(index, coord)| {
            self.boxes[index].xyxy()[coord]
        })
    }
}

/// Computes `[w, h]` for every basis shape in basis order.
fn basis_shapes(base_size: f64, kind: &BasisKind) -> Vec<[f64; 2]> {
    match kind {
        BasisKind::Clustered { widths, heights } => widths
            .iter()
            .zip_eq(heights)
            .map(|(w, h)| [w.raw(), h.raw()])
            .collect(),
        BasisKind::Parametric {
            scales,
            ratios,
            scale_major,
        } => {
            // (w_ratio, h_ratio) per ratio
            let ratio_factors: Vec<_> = ratios
                .iter()
                .map(|ratio| {
                    let h_ratio = ratio.raw().sqrt();
                    (1.0 / h_ratio, h_ratio)
                })
                .collect();
            let scales: Vec<_> = scales.iter().map(|scale| scale.raw()).collect();

            if *scale_major {
                iproduct!(&ratio_factors, &scales)
                    .map(|(&(w_ratio, h_ratio), &scale)| {
                        [base_size * w_ratio * scale, base_size * h_ratio * scale]
                    })
                    .collect()
            } else {
                iproduct!(&scales, &ratio_factors)
                    .map(|(&scale, &(w_ratio, h_ratio))| {
                        [base_size * scale * w_ratio, base_size * scale * h_ratio]
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn single_square_anchor() {
        let config = AnchorConfig::parametric(9.0, &[1.0], &[1.0], true).unwrap();
        let basis = BasisSet::synthesize(&config);
        assert_eq!(basis.center(), [4.0, 4.0]);
        assert_eq!(basis.len(), 1);
        assert_eq!(basis.boxes()[0].xyxy(), [0.0, 0.0, 8.0, 8.0]);
    }

    #[test]
    fn scale_major_ordering() {
        let scales = [1.0, 2.0];
        let ratios = [0.25, 1.0, 4.0];

        let config = AnchorConfig::parametric(16.0, &scales, &ratios, true).unwrap();
        let shapes = basis_shapes(16.0, config.kind());
        assert_eq!(shapes.len(), 6);
        for (ratio_idx, &ratio) in ratios.iter().enumerate() {
            for (scale_idx, &scale) in scales.iter().enumerate() {
                let [w, h] = shapes[ratio_idx * scales.len() + scale_idx];
                assert_abs_diff_eq!(w, 16.0 * scale / f64::sqrt(ratio), epsilon = 1e-9);
                assert_abs_diff_eq!(h, 16.0 * scale * f64::sqrt(ratio), epsilon = 1e-9);
            }
        }

        let config = AnchorConfig::parametric(16.0, &scales, &ratios, false).unwrap();
        let shapes = basis_shapes(16.0, config.kind());
        for (scale_idx, &scale) in scales.iter().enumerate() {
            for (ratio_idx, &ratio) in ratios.iter().enumerate() {
                let [w, h] = shapes[scale_idx * ratios.len() + ratio_idx];
                assert_abs_diff_eq!(w, 16.0 * scale / f64::sqrt(ratio), epsilon = 1e-9);
                assert_abs_diff_eq!(h, 16.0 * scale * f64::sqrt(ratio), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn ratio_controls_elongation() {
        let config = AnchorConfig::parametric(16.0, &[1.0], &[0.25, 4.0], true).unwrap();
        let basis = BasisSet::synthesize(&config);

        // center 7.5, ratio 0.25 gives w = 32, h = 8
        assert_eq!(basis.boxes()[0].xyxy(), [-8.0, 4.0, 23.0, 11.0]);
        assert_eq!(basis.boxes()[0].wh(), [32.0, 8.0]);
        assert_eq!(basis.boxes()[1].xyxy(), [4.0, -8.0, 11.0, 23.0]);
    }

    #[test]
    fn clustered_shapes_are_verbatim() {
        let config = AnchorConfig::clustered(16.0, &[10.0, 20.0], &[20.0, 10.0]).unwrap();
        let basis = BasisSet::synthesize(&config);
        assert_eq!(basis.len(), 2);
        assert_eq!(basis.boxes()[0].xyxy(), [3.0, -2.0, 12.0, 17.0]);
        assert_eq!(basis.boxes()[1].xyxy(), [-2.0, 3.0, 17.0, 12.0]);
        assert_eq!(basis.boxes()[0].wh(), [10.0, 20.0]);
        assert_eq!(basis.boxes()[1].wh(), [20.0, 10.0]);
    }

    #[test]
    fn explicit_center() {
        let config = AnchorConfig::clustered(16.0, &[5.0], &[3.0])
            .unwrap()
            .with_center(0.0, 0.0)
            .unwrap();
        let basis = BasisSet::synthesize(&config);
        assert_eq!(basis.boxes()[0].xyxy(), [-2.0, -1.0, 2.0, 1.0]);
    }

    #[test]
    fn ties_round_to_even() {
        // center 4, half extent 4.5 puts every corner on a .5 tie
        let config = AnchorConfig::clustered(9.0, &[10.0], &[12.0]).unwrap();
        let basis = BasisSet::synthesize(&config);
        assert_eq!(basis.boxes()[0].xyxy(), [-0.0, -2.0, 8.0, 10.0]);

        assert_eq!(round_corner(2.5), 2.0);
        assert_eq!(round_corner(3.5), 4.0);
        assert_eq!(round_corner(-1.5), -2.0);
        assert_eq!(round_corner(1.2), 1.0);
    }

    #[test]
    fn synthesis_is_deterministic() {
        let config = AnchorConfig::parametric(8.0, &[4.0, 5.04, 6.35], &[0.5, 1.0, 2.0], true)
            .unwrap();
        let lhs = BasisSet::synthesize(&config).to_array();
        let rhs = BasisSet::synthesize(&config).to_array();
        assert_eq!(lhs.dim(), (9, 4));
        assert!(lhs
            .iter()
            .zip(rhs.iter())
            .all(|(l, r)| l.to_bits() == r.to_bits()));
    }
}
