use anchor_gen::{AnchorConfig, AnchorError, AnchorGenerator, AnchorPyramid, GridShape, PixelShape};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAMES: &[&str] = &[
    "single-square.json5",
    "clustered.json5",
    "ssd-like.json5",
];

lazy_static::lazy_static! {
    static ref CONFIG_DIR: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("cfg");
    static ref CONFIG_FILES: Vec<PathBuf> = {
        CONFIG_FILE_NAMES.iter().map(|file_name| CONFIG_DIR.join(file_name)).collect()
    };
}

#[test]
fn anchor_config_test() -> Result<(), AnchorError> {
    CONFIG_FILES.iter().try_for_each(|path| -> Result<_, AnchorError> {
        let generator = AnchorGenerator::open(path)?;
        let feature_size = GridShape::new(3, 2);
        let anchors = generator.grid_anchors(feature_size, 16.0)?;
        let flags = generator.valid_flags(feature_size, GridShape::new(2, 2))?;
        assert_eq!(anchors.len(), 6 * generator.num_base_anchors());
        flags.check_aligned(&anchors)?;
        Ok(())
    })?;
    Ok(())
}

#[test]
fn ssd_like_config_test() -> Result<(), AnchorError> {
    let config = AnchorConfig::open(CONFIG_DIR.join("ssd-like.json5"))?;
    assert_eq!(config.num_base_anchors(), 9);
    assert_eq!(
        config,
        AnchorConfig::parametric(8.0, &[4.0, 5.04, 6.35], &[0.5, 1.0, 2.0], false)?
    );
    Ok(())
}

#[test]
fn reject_mismatched_clusters() {
    let result = AnchorConfig::open(CONFIG_DIR.join("mismatched-clusters.json5"));
    assert!(matches!(result, Err(AnchorError::Config(_))));
}

#[test]
fn missing_config_file() {
    let result = AnchorConfig::open(CONFIG_DIR.join("no-such-file.json5"));
    assert!(matches!(result, Err(AnchorError::Io(_))));
}

#[test]
fn pyramid_config_test() -> Result<(), AnchorError> {
    let pyramid = AnchorPyramid::open(CONFIG_DIR.join("retina-pyramid.json5"))?;
    assert_eq!(pyramid.strides(), vec![8.0, 16.0, 32.0]);

    // a 500x375 image padded to 512x384
    let feature_sizes = [
        GridShape::new(64, 48),
        GridShape::new(32, 24),
        GridShape::new(16, 12),
    ];
    let anchors = pyramid.anchors(&feature_sizes)?;
    let flags = pyramid.valid_flags(&feature_sizes, PixelShape::new(500, 375))?;

    for (anchors, flags) in anchors.iter().zip(&flags) {
        flags.check_aligned(anchors)?;
    }
    let valid_sizes: Vec<_> = flags.iter().map(|flags| flags.valid_size()).collect();
    assert_eq!(
        valid_sizes,
        vec![
            GridShape::new(63, 47),
            GridShape::new(32, 24),
            GridShape::new(16, 12)
        ]
    );
    Ok(())
}
