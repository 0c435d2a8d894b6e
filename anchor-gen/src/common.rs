pub use crate::error::{AnchorError, AnchorResult};
pub use bbox::{prelude::*, XYXY};
pub use getset::{CopyGetters, Getters};
pub use itertools::{iproduct, izip, Itertools};
pub use log::{debug, trace};
pub use ndarray::{Array1, Array2, ArrayView2, Axis};
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{
    convert::{TryFrom, TryInto},
    fmt::{self, Display, Formatter},
    fs,
    ops::Range,
    path::Path,
};
