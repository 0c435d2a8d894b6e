use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnchorError {
    /// The anchor configuration is malformed.
    #[error("invalid anchor configuration: {0}")]
    Config(String),
    /// The valid region does not fit inside the feature map.
    #[error(
        "valid size {valid_rows}x{valid_cols} exceeds feature map size {feature_rows}x{feature_cols}"
    )]
    Geometry {
        valid_rows: usize,
        valid_cols: usize,
        feature_rows: usize,
        feature_cols: usize,
    },
    #[error("stride must be positive and finite, but get {0}")]
    InvalidStride(f64),
    /// Tiled anchors and validity flags were computed for different layouts.
    #[error("layout mismatch: {0}")]
    Misaligned(String),
    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("placement error: {0}")]
    Placement(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] json5::Error),
}

pub type AnchorResult<T> = Result<T, AnchorError>;
