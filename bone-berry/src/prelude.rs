//! 🦴欢迎光临🔬
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx3d, MorphError, MorphResult};

pub use crate::data::phantom::{self, Axis3};
pub use crate::data::{BinaryVolume, Roi, ThresholdMode, Window};

pub use crate::consts::phase::{BACKGROUND, BONE};
pub use crate::consts::{DEFAULT_SEED, DEFAULT_THRESHOLD};

pub use crate::histogram::{ConfigHistogram, SamplingPolicy};
pub use crate::minkowski::{EulerNorm, Minkowski};

pub use crate::mil::{DirectionSet, EllipsoidFit, PlateModel, PrincipalAxes, SphereSampling};

pub use crate::analysis::{
    AnalysisSpec, Analyzer, Anisotropy, Descriptor, GridScan, Morphometry,
};
