//! Box types for anchor geometry.
//!
//! Boxes follow the pixel-inclusive convention: a box spanning `x_min..=x_max`
//! covers `x_max - x_min + 1` pixels.

mod common;

pub use rect::*;
pub mod rect;

pub use xyxy::*;
pub mod xyxy;

pub mod prelude {
    pub use crate::rect::{Rect, RectNum};
}
