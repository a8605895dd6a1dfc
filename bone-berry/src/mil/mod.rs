//! 平均截距长度 (MIL) 与结构各向异性.
//!
//! 1. [`DirectionSet`]: 由显式种子的随机数发生器生成的测试方向.
//! 2. [`SphereSampling`]: 球形 ROI 内沿各方向的平行测试线截距统计.
//! 3. [`EllipsoidFit`]: `1 / MIL^2` 的二次型拟合, 以及由它得到的 [`PrincipalAxes`].
//! 4. [`PlateModel`]: 直接由截距得到的平行板模型指标.

mod directions;
mod ellipsoid;
mod sampler;

pub use directions::{unit_vector, DirectionSet};
pub use ellipsoid::{EllipsoidFit, PrincipalAxes};
pub use sampler::{
    line_spacing, line_spacing_for, sphere_volume, test_line_length, PlateModel, SphereSampling,
};
