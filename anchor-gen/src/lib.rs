//! Anchor generation for dense object detectors.
//!
//! A [BasisSet] of anchor shapes is synthesized once from an
//! [AnchorConfig], then tiled over feature maps of any size with
//! [grid::tile]. [valid::valid_mask] flags the tiled positions that fall on
//! real image content rather than batch padding, using the same ordering as
//! the tiled anchors.

mod common;
pub mod basis;
pub mod config;
pub mod error;
pub mod generator;
pub mod grid;
pub mod layout;
pub mod placement;
pub mod pyramid;
pub mod valid;

pub use basis::*;
pub use config::*;
pub use error::*;
pub use generator::*;
pub use grid::{tile, TiledAnchors};
pub use layout::*;
pub use placement::*;
pub use pyramid::*;
pub use valid::{valid_mask, ValidFlags};
