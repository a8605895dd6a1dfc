//! 二值体数据及其区域.
//!
//! 三维数组一律按 `(z, y, x)` 索引, `x` 变化最快. 体素值只允许为
//! [`BACKGROUND`](crate::consts::phase::BACKGROUND) 或 [`BONE`](crate::consts::phase::BONE).

use std::ops::Index;

use ndarray::{Array3, ArrayView, ArrayView3, ArrayView4, Axis, Ix3};
use num::Float;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::phase::{self, BACKGROUND, BONE};
use crate::error::MorphError;
use crate::{Idx3d, MorphResult};

pub mod phantom;
pub mod roi;

pub use roi::{Roi, Window};

/// 灰度场二值化方式.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ThresholdMode {
    /// 灰度严格小于阈值的体素为骨.
    #[default]
    Below,

    /// 灰度严格大于阈值的体素为骨.
    Above,
}

impl ThresholdMode {
    /// 判断灰度 `v` 在阈值 `level` 下的相位.
    #[inline]
    fn phase_of<T: Float>(self, v: T, level: T) -> u8 {
        let bone = match self {
            Self::Below => v < level,
            Self::Above => v > level,
        };
        if bone {
            BONE
        } else {
            BACKGROUND
        }
    }
}

/// 二值化后的 3D 体数据.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinaryVolume {
    data: Array3<u8>,
}

impl Index<Idx3d> for BinaryVolume {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl BinaryVolume {
    /// 从已经二值化的数组构造. 数组中出现非相位值时返回 `Err`.
    pub fn new(data: Array3<u8>) -> MorphResult<Self> {
        if let Some(v) = data.iter().copied().find(|v| !phase::is_phase(*v)) {
            return Err(MorphError::InvalidPhase(v));
        }
        Ok(Self { data })
    }

    /// 按形状 `shape` 创建体数据, `pred(pos)` 为真的体素为骨.
    pub fn from_fn<F: FnMut(Idx3d) -> bool>(shape: Idx3d, mut pred: F) -> Self {
        let data = Array3::from_shape_fn(shape, |pos| if pred(pos) { BONE } else { BACKGROUND });
        Self { data }
    }

    /// 以阈值 `level` 二值化灰度场 `field`.
    pub fn from_gray<T: Float>(field: ArrayView3<T>, level: T, mode: ThresholdMode) -> Self {
        Self {
            data: field.mapv(|v| mode.phase_of(v, level)),
        }
    }

    /// 以阈值 `level` 二值化多分量场 `field` 的第 `component` 个分量.
    /// `field` 形状为 `(z, y, x, c)`.
    ///
    /// `component` 越界时 panic.
    pub fn from_component<T: Float>(
        field: ArrayView4<T>,
        component: usize,
        level: T,
        mode: ThresholdMode,
    ) -> Self {
        assert!(component < field.len_of(Axis(3)), "分量索引越界");
        Self::from_gray(field.index_axis(Axis(3), component), level, mode)
    }

    /// 数据形状 `(z, y, x)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 体素总数.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否不含任何体素.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u8, Ix3> {
        self.data.view()
    }

    /// 获得 `pos` 处的相位. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx3d) -> Option<u8> {
        self.data.get(pos).copied()
    }

    /// 以有符号坐标访问体素, 越界部分视为背景.
    #[inline]
    pub fn phase_or_background(&self, (z, y, x): (isize, isize, isize)) -> u8 {
        if z < 0 || y < 0 || x < 0 {
            return BACKGROUND;
        }
        self.get((z as usize, y as usize, x as usize))
            .unwrap_or(BACKGROUND)
    }

    /// 骨体素个数.
    #[inline]
    pub fn count_bone(&self) -> usize {
        self.data.iter().filter(|v| phase::is_bone(**v)).count()
    }

    /// 骨与背景互换后的体数据.
    pub fn complement(&self) -> Self {
        Self {
            data: self.data.mapv(|v| BONE - v),
        }
    }
}
