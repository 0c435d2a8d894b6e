//! Anchor shape configuration.

use crate::common::*;

fn default_scale_major() -> bool {
    true
}

/// Explicit anchor center in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Center {
    pub x: R64,
    pub y: R64,
}

/// The way basis shapes are produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BasisKind {
    /// Cross product of scales and aspect ratios (height / width).
    ///
    /// With `scale_major`, the ratio is the slower-varying index and the
    /// scale the faster one. Otherwise the order is reversed.
    Parametric {
        scales: Vec<R64>,
        ratios: Vec<R64>,
        scale_major: bool,
    },
    /// Width and height pairs taken verbatim, e.g. from k-means clustering.
    Clustered { widths: Vec<R64>, heights: Vec<R64> },
}

impl BasisKind {
    /// The number of basis shapes this kind produces.
    pub fn num_shapes(&self) -> usize {
        match self {
            Self::Parametric { scales, ratios, .. } => scales.len() * ratios.len(),
            Self::Clustered { widths, .. } => widths.len(),
        }
    }

    fn validate(&self) -> AnchorResult<()> {
        match self {
            Self::Parametric { scales, ratios, .. } => {
                ensure_non_empty("scales", scales)?;
                ensure_non_empty("ratios", ratios)?;
                ensure_all_positive("scales", scales)?;
                ensure_all_positive("ratios", ratios)?;
            }
            Self::Clustered { widths, heights } => {
                if widths.len() != heights.len() {
                    return Err(AnchorError::Config(format!(
                        "widths and heights must have equal length, but get {} and {}",
                        widths.len(),
                        heights.len()
                    )));
                }
                ensure_non_empty("widths", widths)?;
                ensure_all_positive("widths", widths)?;
                ensure_all_positive("heights", heights)?;
            }
        }
        Ok(())
    }
}

/// Validated anchor configuration.
///
/// Values of this type always satisfy the length and positivity invariants,
/// so basis synthesis over them cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters, Serialize, Deserialize)]
#[serde(try_from = "AnchorConfigUnchecked", into = "AnchorConfigUnchecked")]
pub struct AnchorConfig {
    /// The reference edge length in pixels.
    #[getset(get_copy = "pub")]
    base_size: R64,
    #[getset(get = "pub")]
    kind: BasisKind,
    /// The explicit center, if any.
    #[getset(get_copy = "pub")]
    center: Option<Center>,
}

impl AnchorConfig {
    pub fn new(base_size: R64, kind: BasisKind, center: Option<Center>) -> AnchorResult<Self> {
        if base_size.raw() <= 0.0 {
            return Err(AnchorError::Config(format!(
                "base_size must be positive, but get {}",
                base_size
            )));
        }
        kind.validate()?;

        Ok(Self {
            base_size,
            kind,
            center,
        })
    }

    pub fn parametric(
        base_size: f64,
        scales: &[f64],
        ratios: &[f64],
        scale_major: bool,
    ) -> AnchorResult<Self> {
        let kind = BasisKind::Parametric {
            scales: to_r64_vec("scales", scales)?,
            ratios: to_r64_vec("ratios", ratios)?,
            scale_major,
        };
        Self::new(to_r64("base_size", base_size)?, kind, None)
    }

    pub fn clustered(base_size: f64, widths: &[f64], heights: &[f64]) -> AnchorResult<Self> {
        let kind = BasisKind::Clustered {
            widths: to_r64_vec("widths", widths)?,
            heights: to_r64_vec("heights", heights)?,
        };
        Self::new(to_r64("base_size", base_size)?, kind, None)
    }

    /// Replaces the default center with an explicit one.
    pub fn with_center(self, x: f64, y: f64) -> AnchorResult<Self> {
        let center = Center {
            x: to_r64("center.x", x)?,
            y: to_r64("center.y", y)?,
        };
        Ok(Self {
            center: Some(center),
            ..self
        })
    }

    /// Loads a configuration from a json5 file.
    pub fn open<P>(path: P) -> AnchorResult<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        Self::from_json5_str(&text)
    }

    pub fn from_json5_str(text: &str) -> AnchorResult<Self> {
        let unchecked: AnchorConfigUnchecked = json5::from_str(text)?;
        unchecked.try_into()
    }

    pub fn num_base_anchors(&self) -> usize {
        self.kind.num_shapes()
    }

    /// The anchor center, falling back to the center of a `base_size` square
    /// whose last pixel row and column are included.
    pub fn resolved_center(&self) -> [f64; 2] {
        match self.center {
            Some(Center { x, y }) => [x.raw(), y.raw()],
            None => {
                let ctr = 0.5 * (self.base_size.raw() - 1.0);
                [ctr, ctr]
            }
        }
    }
}

/// The on-disk form of [AnchorConfig].
///
/// Supplying `widths` and `heights` selects clustered mode, supplying
/// `scales` and `ratios` selects parametric mode. Mixing the two is rejected.
/// Unknown keys are rejected too, so a misspelled `scale_major` cannot fall
/// back to its default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchorConfigUnchecked {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scales: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratios: Option<Vec<f64>>,
    #[serde(default = "default_scale_major")]
    pub scale_major: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widths: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heights: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<CenterUnchecked>,
}

/// The on-disk form of [Center].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CenterUnchecked {
    pub x: f64,
    pub y: f64,
}

impl AnchorConfigUnchecked {
    /// Fills in `base_size` when it is absent.
    pub fn with_default_base_size(mut self, base_size: f64) -> Self {
        self.base_size.get_or_insert(base_size);
        self
    }
}

impl TryFrom<AnchorConfigUnchecked> for AnchorConfig {
    type Error = AnchorError;

    fn try_from(from: AnchorConfigUnchecked) -> Result<Self, Self::Error> {
        let AnchorConfigUnchecked {
            base_size,
            scales,
            ratios,
            scale_major,
            widths,
            heights,
            center,
        } = from;

        let base_size =
            base_size.ok_or_else(|| AnchorError::Config("base_size is required".into()))?;

        let kind = match (widths, heights, scales, ratios) {
            (Some(widths), Some(heights), None, None) => BasisKind::Clustered {
                widths: to_r64_vec("widths", &widths)?,
                heights: to_r64_vec("heights", &heights)?,
            },
            (None, None, Some(scales), Some(ratios)) => BasisKind::Parametric {
                scales: to_r64_vec("scales", &scales)?,
                ratios: to_r64_vec("ratios", &ratios)?,
                scale_major,
            },
            (Some(_), Some(_), _, _) => {
                return Err(AnchorError::Config(
                    "clustered (widths, heights) and parametric (scales, ratios) fields are mutually exclusive".into(),
                ))
            }
            (Some(_), None, _, _) | (None, Some(_), _, _) => {
                return Err(AnchorError::Config(
                    "widths and heights must be given together".into(),
                ))
            }
            (None, None, Some(_), None) | (None, None, None, Some(_)) => {
                return Err(AnchorError::Config(
                    "scales and ratios must be given together".into(),
                ))
            }
            (None, None, None, None) => {
                return Err(AnchorError::Config(
                    "neither clustered (widths, heights) nor parametric (scales, ratios) fields are given".into(),
                ))
            }
        };

        let center = center
            .map(|CenterUnchecked { x, y }| -> AnchorResult<_> {
                Ok(Center {
                    x: to_r64("center.x", x)?,
                    y: to_r64("center.y", y)?,
                })
            })
            .transpose()?;

        Self::new(to_r64("base_size", base_size)?, kind, center)
    }
}

impl From<AnchorConfig> for AnchorConfigUnchecked {
    fn from(from: AnchorConfig) -> Self {
        let AnchorConfig {
            base_size,
            kind,
            center,
        } = from;
        let raw_vec = |values: Vec<R64>| -> Vec<f64> {
            values.into_iter().map(|value| value.raw()).collect()
        };
        let base_size = Some(base_size.raw());
        let center = center.map(|Center { x, y }| CenterUnchecked {
            x: x.raw(),
            y: y.raw(),
        });

        match kind {
            BasisKind::Parametric {
                scales,
                ratios,
                scale_major,
            } => Self {
                base_size,
                scales: Some(raw_vec(scales)),
                ratios: Some(raw_vec(ratios)),
                scale_major,
                center,
                ..Default::default()
            },
            BasisKind::Clustered { widths, heights } => Self {
                base_size,
                widths: Some(raw_vec(widths)),
                heights: Some(raw_vec(heights)),
                scale_major: default_scale_major(),
                center,
                ..Default::default()
            },
        }
    }
}

fn to_r64(name: &str, value: f64) -> AnchorResult<R64> {
    R64::try_new(value)
        .ok_or_else(|| AnchorError::Config(format!("{} must be finite, but get {}", name, value)))
}

fn to_r64_vec(name: &str, values: &[f64]) -> AnchorResult<Vec<R64>> {
    values.iter().map(|&value| to_r64(name, value)).collect()
}

fn ensure_non_empty(name: &str, values: &[R64]) -> AnchorResult<()> {
    if values.is_empty() {
        return Err(AnchorError::Config(format!("{} must not be empty", name)));
    }
    Ok(())
}

fn ensure_all_positive(name: &str, values: &[R64]) -> AnchorResult<()> {
    match values.iter().find(|value| value.raw() <= 0.0) {
        Some(value) => Err(AnchorError::Config(format!(
            "{} must be positive, but get {}",
            name, value
        ))),
        None => Ok(()),
    }
}
