//! Anchor generator with a cached basis set.

use crate::{
    basis::BasisSet,
    common::*,
    config::AnchorConfig,
    grid::{self, TiledAnchors},
    layout::GridShape,
    placement::Placement,
    valid::{self, ValidFlags},
};

/// Synthesizes the basis set once and tiles it on demand.
///
/// The generator is immutable after construction and can be shared across
/// threads to compute anchors for several feature maps concurrently.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct AnchorGenerator {
    #[getset(get = "pub")]
    config: AnchorConfig,
    #[getset(get = "pub")]
    basis: BasisSet,
}

impl AnchorGenerator {
    pub fn new(config: AnchorConfig) -> Self {
        let basis = BasisSet::synthesize(&config);
        Self { config, basis }
    }

    /// Loads the configuration from a json5 file and builds the generator.
    pub fn open<P>(path: P) -> AnchorResult<Self>
    where
        P: AsRef<Path>,
    {
        Ok(Self::new(AnchorConfig::open(path)?))
    }

    pub fn num_base_anchors(&self) -> usize {
        self.basis.len()
    }

    pub fn base_anchors(&self) -> &[XYXY<f64>] {
        self.basis.boxes()
    }

    pub fn grid_anchors(&self, feature_size: GridShape, stride: f64) -> AnchorResult<TiledAnchors> {
        grid::tile(&self.basis, feature_size, stride)
    }

    pub fn valid_flags(
        &self,
        feature_size: GridShape,
        valid_size: GridShape,
    ) -> AnchorResult<ValidFlags> {
        valid::valid_mask(self.num_base_anchors(), feature_size, valid_size)
    }

    /// Tiles anchors and materializes them with `placement`.
    pub fn grid_anchors_on<P>(
        &self,
        feature_size: GridShape,
        stride: f64,
        placement: &P,
    ) -> AnchorResult<P::Boxes>
    where
        P: Placement,
    {
        let anchors = self.grid_anchors(feature_size, stride)?;
        placement.place_boxes(anchors.into_array())
    }

    /// Computes validity flags and materializes them with `placement`.
    pub fn valid_flags_on<P>(
        &self,
        feature_size: GridShape,
        valid_size: GridShape,
        placement: &P,
    ) -> AnchorResult<P::Flags>
    where
        P: Placement,
    {
        let flags = self.valid_flags(feature_size, valid_size)?;
        placement.place_flags(flags.into_array())
    }
}

impl From<AnchorConfig> for AnchorGenerator {
    fn from(config: AnchorConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::Host;

    #[test]
    fn generator_matches_engine() {
        let config = AnchorConfig::parametric(8.0, &[8.0], &[0.5, 1.0, 2.0], true).unwrap();
        let generator = AnchorGenerator::new(config.clone());
        assert_eq!(generator.num_base_anchors(), 3);
        assert_eq!(generator.base_anchors(), BasisSet::synthesize(&config).boxes());

        let feature_size = GridShape::new(5, 7);
        let anchors = generator.grid_anchors(feature_size, 8.0).unwrap();
        let flags = generator
            .valid_flags(feature_size, GridShape::new(4, 6))
            .unwrap();
        assert_eq!(anchors.len(), 5 * 7 * 3);
        assert_eq!(flags.len(), anchors.len());
        flags.check_aligned(&anchors).unwrap();

        let placed = generator
            .grid_anchors_on(feature_size, 8.0, &Host)
            .unwrap();
        assert_eq!(&placed, anchors.boxes());
        let placed = generator
            .valid_flags_on(feature_size, GridShape::new(4, 6), &Host)
            .unwrap();
        assert_eq!(&placed, flags.flags());
    }

    #[test]
    fn shared_across_threads() {
        let generator = std::sync::Arc::new(AnchorGenerator::new(
            AnchorConfig::parametric(4.0, &[8.0, 16.0], &[0.5, 1.0, 2.0], true).unwrap(),
        ));
        let sizes = [(4, 4, 32.0), (8, 8, 16.0), (16, 16, 8.0)];

        let handles: Vec<_> = sizes
            .iter()
            .map(|&(rows, cols, stride)| {
                let generator = generator.clone();
                std::thread::spawn(move || {
                    generator
                        .grid_anchors(GridShape::new(rows, cols), stride)
                        .unwrap()
                })
            })
            .collect();

        for (handle, &(rows, cols, stride)) in handles.into_iter().zip(sizes.iter()) {
            let concurrent = handle.join().unwrap();
            let sequential = generator
                .grid_anchors(GridShape::new(rows, cols), stride)
                .unwrap();
            assert_eq!(concurrent, sequential);
        }
    }
}
