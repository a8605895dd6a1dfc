//! 2x2x2 构型直方图.
//!
//! 每个被访问的位置以其前向单元的 8 个角点打包成 8-bit 编码: 角点
//! `(0,0,0)`, `+x`, `+y`, `+x+y`, `+z`, `+x+z`, `+y+z`, `+x+y+z`
//! 的权重依次为 1, 2, 4, ..., 128.

use std::ops::Index;

use either::Either;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::CONFIGURATIONS;
use crate::data::{BinaryVolume, Roi, Window};
use crate::Idx3d;

/// 前向单元角点相对 `(z, y, x)` 偏移, 下标即编码位.
pub const CORNERS: [Idx3d; 8] = [
    (0, 0, 0),
    (0, 0, 1),
    (0, 1, 0),
    (0, 1, 1),
    (1, 0, 0),
    (1, 0, 1),
    (1, 1, 0),
    (1, 1, 1),
];

/// 直方图采样策略. 两种策略统计的是不同的位置集合, 结果不能互换.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SamplingPolicy {
    /// 访问 ROI 窗口内 8 个角点都在窗口中的每一个单元.
    Cube,

    /// 访问窗口内到球心距离不超过半径的每一个体素;
    /// 落在窗口外的角点按背景处理.
    #[default]
    Sphere,
}

/// 256-bin 构型直方图.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigHistogram {
    bins: [u64; CONFIGURATIONS],
}

impl Default for ConfigHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<u8> for ConfigHistogram {
    type Output = u64;

    #[inline]
    fn index(&self, code: u8) -> &Self::Output {
        &self.bins[code as usize]
    }
}

impl ConfigHistogram {
    /// 全零直方图.
    #[inline]
    pub fn new() -> Self {
        Self {
            bins: [0; CONFIGURATIONS],
        }
    }

    /// 直接由计数构造.
    #[inline]
    pub fn from_bins(bins: [u64; CONFIGURATIONS]) -> Self {
        Self { bins }
    }

    /// 按 `policy` 统计 `volume` 在 `roi` 中的构型直方图.
    pub fn build(volume: &BinaryVolume, roi: &Roi, policy: SamplingPolicy) -> Self {
        let window = roi.window();
        let positions = match policy {
            SamplingPolicy::Cube => Either::Left(window.cell_origins()),
            SamplingPolicy::Sphere => Either::Right(roi.sphere_positions()),
        };

        let mut h = Self::new();
        for pos in positions {
            h.bins[configuration_code(volume, pos, &window) as usize] += 1;
        }
        h
    }

    /// 以整个场为窗口统计 [`SamplingPolicy::Cube`] 直方图.
    pub fn whole_cube(volume: &BinaryVolume) -> Self {
        Self::build(volume, &Roi::whole(volume.shape()), SamplingPolicy::Cube)
    }

    /// 全部计数.
    #[inline]
    pub fn bins(&self) -> &[u64; CONFIGURATIONS] {
        &self.bins
    }

    /// 被访问的位置总数.
    #[inline]
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// 是否没有访问任何位置.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// 迭代非零 bin, 产出 `(编码, 计数)`.
    pub fn nonzero(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.bins
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0)
            .map(|(k, c)| (k as u8, *c))
    }
}

/// 计算以 `origin` 为基点的前向单元编码. 落在 `window` 之外的角点视为背景.
pub fn configuration_code(volume: &BinaryVolume, origin: Idx3d, window: &Window) -> u8 {
    CORNERS
        .iter()
        .enumerate()
        .fold(0u8, |code, (bit, &(dz, dy, dx))| {
            let p = (origin.0 + dz, origin.1 + dy, origin.2 + dx);
            let inside = window.contains((p.0 as isize, p.1 as isize, p.2 as isize));
            if inside && crate::consts::phase::is_bone(volume[p]) {
                code | (1 << bit)
            } else {
                code
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::phantom;

    /// 编码位与角点一一对应.
    #[test]
    fn test_code_bits() {
        let shape = (2, 2, 2);
        let window = Roi::whole(shape).window();
        for (bit, &corner) in CORNERS.iter().enumerate() {
            let v = BinaryVolume::from_fn(shape, |p| p == corner);
            assert_eq!(configuration_code(&v, (0, 0, 0), &window), 1 << bit);
        }
        assert_eq!(configuration_code(&phantom::solid(shape), (0, 0, 0), &window), 255);
    }

    /// 直方图总数等于访问的位置数.
    #[test]
    fn test_completeness() {
        let v = phantom::ball((9, 9, 9), (4, 4, 4), 3.0);

        let roi = Roi::new((4, 4, 4), 2, v.shape());
        let h = ConfigHistogram::build(&v, &roi, SamplingPolicy::Sphere);
        assert_eq!(h.total(), roi.sphere_positions().count() as u64);
        assert_eq!(h.total(), 33);

        let h = ConfigHistogram::build(&v, &roi, SamplingPolicy::Cube);
        assert_eq!(h.total(), 64);

        let h = ConfigHistogram::whole_cube(&v);
        assert_eq!(h.total(), 512);
        assert_eq!(h.nonzero().map(|(_, c)| c).sum::<u64>(), 512);
    }

    /// 实心区域: 立方体策略只见到全骨单元; 球策略在窗口边界处见到背景.
    #[test]
    fn test_solid_policies() {
        let v = phantom::solid((5, 5, 5));
        let roi = Roi::new((2, 2, 2), 2, v.shape());

        let cube = ConfigHistogram::build(&v, &roi, SamplingPolicy::Cube);
        assert_eq!(cube[255], 64);
        assert_eq!(cube.nonzero().count(), 1);

        let sphere = ConfigHistogram::build(&v, &roi, SamplingPolicy::Sphere);
        assert_eq!(sphere.total(), 33);
        assert!(sphere[255] < 33);
        // 球心的前向单元完全在窗口内
        assert!(sphere[255] >= 1);
    }

    /// 空 ROI 上的直方图为空.
    #[test]
    fn test_empty() {
        let v = phantom::solid((1, 1, 1));
        let h = ConfigHistogram::whole_cube(&v);
        assert!(h.is_empty());
        let h = ConfigHistogram::build(&v, &Roi::whole((1, 1, 1)), SamplingPolicy::Sphere);
        assert_eq!(h.total(), 1);
        assert_eq!(h[1], 1);
    }
}
