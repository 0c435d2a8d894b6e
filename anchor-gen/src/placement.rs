//! Where tiled anchors and validity flags are materialized.

use crate::common::*;

/// Moves engine output into the buffer type of a compute location.
pub trait Placement {
    type Boxes;
    type Flags;

    /// Takes `[N, 4]` box corners.
    fn place_boxes(&self, boxes: Array2<f32>) -> AnchorResult<Self::Boxes>;

    /// Takes `[N]` validity flags.
    fn place_flags(&self, flags: Array1<bool>) -> AnchorResult<Self::Flags>;
}

/// Keeps output in host memory as ndarray arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Host;

impl Placement for Host {
    type Boxes = Array2<f32>;
    type Flags = Array1<bool>;

    fn place_boxes(&self, boxes: Array2<f32>) -> AnchorResult<Self::Boxes> {
        Ok(boxes)
    }

    fn place_flags(&self, flags: Array1<bool>) -> AnchorResult<Self::Flags> {
        Ok(flags)
    }
}

#[cfg(feature = "tch")]
mod with_tch {
    use super::*;
    use tch::{Device, Tensor};

    impl Placement for Device {
        type Boxes = Tensor;
        type Flags = Tensor;

        fn place_boxes(&self, boxes: Array2<f32>) -> AnchorResult<Self::Boxes> {
            let (len, _) = boxes.dim();
            let boxes = boxes.as_standard_layout();
            let slice = boxes
                .as_slice()
                .ok_or_else(|| AnchorError::Placement("boxes are not contiguous".into()))?;
            let tensor = Tensor::of_slice(slice)
                .view([len as i64, 4])
                .set_requires_grad(false)
                .to_device(*self);
            Ok(tensor)
        }

        fn place_flags(&self, flags: Array1<bool>) -> AnchorResult<Self::Flags> {
            let flags = flags.as_standard_layout();
            let slice = flags
                .as_slice()
                .ok_or_else(|| AnchorError::Placement("flags are not contiguous".into()))?;
            Ok(Tensor::of_slice(slice).to_device(*self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_keeps_arrays() {
        let boxes = Array2::from_shape_vec((2, 4), vec![0.0, 0.0, 8.0, 8.0, 8.0, 0.0, 16.0, 8.0])
            .unwrap();
        let flags: Array1<bool> = vec![true, false].into();
        assert_eq!(Host.place_boxes(boxes.clone()).unwrap(), boxes);
        assert_eq!(Host.place_flags(flags.clone()).unwrap(), flags);
    }
}
