//! Anchors over a multi-level feature pyramid.

use crate::{
    common::*,
    config::{AnchorConfig, AnchorConfigUnchecked},
    generator::AnchorGenerator,
    grid::{check_stride, TiledAnchors},
    layout::{GridShape, PixelShape},
    valid::ValidFlags,
};

/// One pyramid level as written in a configuration file.
///
/// When the anchor `base_size` is omitted, it defaults to the level stride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelConfig {
    pub stride: f64,
    pub anchor: AnchorConfigUnchecked,
}

/// Pyramid configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PyramidConfig {
    pub levels: Vec<LevelConfig>,
}

impl PyramidConfig {
    pub fn open<P>(path: P) -> AnchorResult<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Level {
    stride: R64,
    generator: AnchorGenerator,
}

/// Anchor generators of every pyramid level, ordered from the first level.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorPyramid {
    levels: Vec<Level>,
}

impl AnchorPyramid {
    pub fn new(config: PyramidConfig) -> AnchorResult<Self> {
        if config.levels.is_empty() {
            return Err(AnchorError::Config(
                "a pyramid needs at least one level".into(),
            ));
        }

        let levels: Vec<_> = config
            .levels
            .into_iter()
            .map(|level| -> AnchorResult<_> {
                let LevelConfig { stride, anchor } = level;
                let stride = check_stride(stride)?;
                let anchor: AnchorConfig = anchor
                    .with_default_base_size(stride.raw())
                    .try_into()?;
                Ok(Level {
                    stride,
                    generator: AnchorGenerator::new(anchor),
                })
            })
            .collect::<AnchorResult<_>>()?;

        debug!(
            "built anchor pyramid with strides {:?}",
            levels.iter().map(|level| level.stride.raw()).collect_vec()
        );

        Ok(Self { levels })
    }

    pub fn open<P>(path: P) -> AnchorResult<Self>
    where
        P: AsRef<Path>,
    {
        Self::new(PyramidConfig::open(path)?)
    }

    /// Builds one parametric level per stride, with the base size set to the
    /// stride.
    pub fn from_strides(
        strides: &[f64],
        scales: &[f64],
        ratios: &[f64],
        scale_major: bool,
    ) -> AnchorResult<Self> {
        if strides.is_empty() {
            return Err(AnchorError::Config(
                "a pyramid needs at least one level".into(),
            ));
        }

        let levels: Vec<_> = strides
            .iter()
            .map(|&stride| -> AnchorResult<_> {
                let stride = check_stride(stride)?;
                let anchor = AnchorConfig::parametric(stride.raw(), scales, ratios, scale_major)?;
                Ok(Level {
                    stride,
                    generator: AnchorGenerator::new(anchor),
                })
            })
            .collect::<AnchorResult<_>>()?;

        Ok(Self { levels })
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn strides(&self) -> Vec<f64> {
        self.levels.iter().map(|level| level.stride.raw()).collect()
    }

    pub fn generators(&self) -> impl Iterator<Item = &AnchorGenerator> {
        self.levels.iter().map(|level| &level.generator)
    }

    /// Number of base anchors per cell on each level.
    pub fn num_base_anchors(&self) -> Vec<usize> {
        self.generators()
            .map(|generator| generator.num_base_anchors())
            .collect()
    }

    /// Tiles the anchors of every level on its feature map.
    pub fn anchors(&self, feature_sizes: &[GridShape]) -> AnchorResult<Vec<TiledAnchors>> {
        self.check_num_levels(feature_sizes)?;

        izip!(&self.levels, feature_sizes)
            .map(|(level, &feature_size)| {
                trace!(
                    "tile level with stride {} on {} feature map",
                    level.stride,
                    feature_size
                );
                level.generator.grid_anchors(feature_size, level.stride.raw())
            })
            .collect()
    }

    /// Computes validity flags of every level for an image of `image_shape`
    /// pixels placed at the top-left of a larger padded batch.
    ///
    /// The feature sizes follow the padded batch. The valid region of a level
    /// covers `ceil(image / stride)` cells per dimension, capped at the
    /// feature map size.
    pub fn valid_flags(
        &self,
        feature_sizes: &[GridShape],
        image_shape: PixelShape,
    ) -> AnchorResult<Vec<ValidFlags>> {
        self.check_num_levels(feature_sizes)?;

        izip!(&self.levels, feature_sizes)
            .map(|(level, &feature_size)| {
                let valid_size = valid_feature_size(feature_size, image_shape, level.stride.raw());
                trace!(
                    "level with stride {} has {} valid cells out of {}",
                    level.stride,
                    valid_size,
                    feature_size
                );
                level.generator.valid_flags(feature_size, valid_size)
            })
            .collect()
    }

    /// Index range of each level within the concatenated anchor sequence.
    pub fn flat_ranges(&self, feature_sizes: &[GridShape]) -> AnchorResult<Vec<Range<usize>>> {
        self.check_num_levels(feature_sizes)?;

        let ranges = izip!(&self.levels, feature_sizes)
            .scan(0, |begin, (level, feature_size)| {
                let len = feature_size.num_cells() * level.generator.num_base_anchors();
                let range = *begin..(*begin + len);
                *begin += len;
                Some(range)
            })
            .collect();
        Ok(ranges)
    }

    fn check_num_levels(&self, feature_sizes: &[GridShape]) -> AnchorResult<()> {
        if feature_sizes.len() != self.levels.len() {
            return Err(AnchorError::Config(format!(
                "expect {} feature map sizes, but get {}",
                self.levels.len(),
                feature_sizes.len()
            )));
        }
        Ok(())
    }
}

/// The feature map cells covered by an `image_shape` image at `stride`.
pub fn valid_feature_size(
    feature_size: GridShape,
    image_shape: PixelShape,
    stride: f64,
) -> GridShape {
    let cover = |pixels: usize| (pixels as f64 / stride).ceil() as usize;
    GridShape {
        rows: cover(image_shape.h).min(feature_size.rows),
        cols: cover(image_shape.w).min(feature_size.cols),
    }
}

/// Concatenates the boxes of all levels in level order.
pub fn concat_anchors(levels: &[TiledAnchors]) -> AnchorResult<Array2<f32>> {
    if levels.is_empty() {
        return Ok(Array2::zeros((0, 4)));
    }
    let views: Vec<ArrayView2<'_, f32>> = levels.iter().map(|level| level.boxes().view()).collect();
    Ok(ndarray::concatenate(Axis(0), &views)?)
}

/// Concatenates the flags of all levels in level order.
pub fn concat_flags(levels: &[ValidFlags]) -> Array1<bool> {
    levels
        .iter()
        .flat_map(|level| level.flags().iter().copied())
        .collect()
}
