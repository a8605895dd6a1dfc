//! 基于构型直方图的 Minkowski 泛函估计.
//!
//! 所有估计量都是 256-bin 直方图与查找表的线性组合, 再除以访问位置总数 `N`
//! (或物理体积 `N * pixel_size^3`) 得到密度.
//!
//! # 注意
//!
//! 直方图为空时, 原始估计函数返回 `NaN`. 需要显式错误时请使用 [`Minkowski::estimate`].

mod tables;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::PI;

use crate::error::MorphError;
use crate::histogram::ConfigHistogram;
use crate::MorphResult;
use tables::*;

/// 欧拉数密度的归一化方式.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EulerNorm {
    /// `Σθh / V`, 其中 `V = N * pixel_size^3`.
    #[default]
    PerVolume,

    /// `Σθh / (24 V)`.
    Averaged,
}

impl EulerNorm {
    #[inline]
    fn divisor(self) -> f64 {
        match self {
            Self::PerVolume => 1.0,
            Self::Averaged => 24.0,
        }
    }
}

#[inline]
fn assert_pixel_size(pixel_size: f64) {
    assert!(pixel_size > 0.0, "像素尺寸必须为正数");
}

/// 直方图与逐构型权重的点积.
#[inline]
fn weighted_sum<F: Fn(usize) -> f64>(h: &ConfigHistogram, weight: F) -> f64 {
    h.nonzero().map(|(k, c)| c as f64 * weight(k as usize)).sum()
}

/// 访问位置总数 (体素个数). 调用方自行乘以 `pixel_size^3` 得到物理体积.
#[inline]
pub fn total_volume(h: &ConfigHistogram) -> u64 {
    h.total()
}

/// 基点为骨的构型所占比例.
pub fn volume_fraction(h: &ConfigHistogram) -> f64 {
    let bone: u64 = h.nonzero().filter(|(k, _)| k & 1 == 1).map(|(_, c)| c).sum();
    bone as f64 / h.total() as f64
}

/// 表面积密度 `S_V` (单位: mm^-1).
pub fn surface_density(pixel_size: f64, h: &ConfigHistogram) -> f64 {
    assert_pixel_size(pixel_size);
    let p = pixel_size;
    let edge = |ny: usize| match ny {
        0..=2 => p,
        3..=8 => (2.0 * p * p).sqrt(),
        _ => (3.0 * p * p).sqrt(),
    };
    let s = weighted_sum(h, |k| {
        (0..DIRECTION_CLASSES)
            .map(|ny| DIRECTION_WEIGHTS[ny] / edge(ny) * EDGE_TRANSITIONS[k][ny] as f64)
            .sum()
    });
    6.0 * s / h.total() as f64
}

/// 平均曲率积分密度 `M_V` (单位: mm^-2).
pub fn mean_curvature(pixel_size: f64, h: &ConfigHistogram) -> f64 {
    assert_pixel_size(pixel_size);
    let p = pixel_size;
    let diag = (2.0 * p * p).sqrt();
    let s = 1.5 * diag;
    let triangle = 2.0 * (s * (s - diag).powi(3)).sqrt();
    // 截面面积乘以截面角点数
    let scale = |ny: usize| match ny {
        0..=2 => 4.0 * p * p,
        3..=8 => 4.0 * p * diag,
        _ => 3.0 * triangle,
    };
    let m = weighted_sum(h, |k| {
        (0..DIRECTION_CLASSES)
            .map(|ny| DIRECTION_WEIGHTS[ny] / scale(ny) * CURVATURE_INDICATORS[k][ny] as f64)
            .sum()
    });
    4.0 * PI * m / h.total() as f64
}

/// 欧拉表与直方图的点积 `Σθh`. 对被完整包围的物体即欧拉示性数.
pub fn euler_sum(h: &ConfigHistogram) -> i64 {
    h.nonzero()
        .map(|(k, c)| EULER_WEIGHTS[k as usize] as i64 * c as i64)
        .sum()
}

/// 欧拉数密度, 按 [`EulerNorm::PerVolume`] 归一化 (单位: mm^-3).
#[inline]
pub fn euler_number(pixel_size: f64, h: &ConfigHistogram) -> f64 {
    euler_number_with(pixel_size, h, EulerNorm::PerVolume)
}

/// 按 `norm` 归一化的欧拉数密度.
pub fn euler_number_with(pixel_size: f64, h: &ConfigHistogram, norm: EulerNorm) -> f64 {
    assert_pixel_size(pixel_size);
    let volume = h.total() as f64 * pixel_size.powi(3);
    euler_sum(h) as f64 / (norm.divisor() * volume)
}

/// 高斯曲率表与直方图的点积. 对被完整包围的单连通物体恒为 24.
pub fn gauss_sum(h: &ConfigHistogram) -> i64 {
    h.nonzero()
        .map(|(k, c)| GAUSS_WEIGHTS[k as usize] as i64 * c as i64)
        .sum()
}

/// 高斯 (总) 曲率积分密度 `(π/6) Σθh / V` (单位: mm^-3).
pub fn total_curvature(pixel_size: f64, h: &ConfigHistogram) -> f64 {
    assert_pixel_size(pixel_size);
    let volume = h.total() as f64 * pixel_size.powi(3);
    PI / 6.0 * gauss_sum(h) as f64 / volume
}

/// 一次估计得到的全部 Minkowski 密度.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Minkowski {
    /// 访问位置总数.
    pub voxels: u64,

    /// 体积分数.
    pub volume_fraction: f64,

    /// 表面积密度.
    pub surface_density: f64,

    /// 平均曲率积分密度.
    pub mean_curvature: f64,

    /// 欧拉数密度.
    pub euler_density: f64,

    /// 高斯曲率积分密度.
    pub total_curvature: f64,
}

impl Minkowski {
    /// 由直方图一次计算全部密度. 直方图为空时返回 `Err`.
    pub fn estimate(pixel_size: f64, h: &ConfigHistogram, norm: EulerNorm) -> MorphResult<Self> {
        if h.is_empty() {
            return Err(MorphError::EmptyRegion);
        }
        Ok(Self {
            voxels: total_volume(h),
            volume_fraction: volume_fraction(h),
            surface_density: surface_density(pixel_size, h),
            mean_curvature: mean_curvature(pixel_size, h),
            euler_density: euler_number_with(pixel_size, h, norm),
            total_curvature: total_curvature(pixel_size, h),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{phantom, BinaryVolume};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn block_histogram() -> ConfigHistogram {
        ConfigHistogram::whole_cube(&phantom::block((9, 9, 9), (2, 2, 2), (6, 6, 6)))
    }

    /// 实心区域: 没有相界.
    #[test]
    fn test_solid() {
        let h = ConfigHistogram::whole_cube(&phantom::solid((5, 5, 5)));
        assert_eq!(total_volume(&h), 64);
        assert_eq!(volume_fraction(&h), 1.0);
        assert_eq!(surface_density(1.0, &h), 0.0);
        assert_eq!(mean_curvature(1.0, &h), 0.0);
        assert_eq!(euler_number(1.0, &h), 0.0);
    }

    /// 全背景区域.
    #[test]
    fn test_background() {
        let h = ConfigHistogram::whole_cube(&phantom::empty((5, 5, 5)));
        assert_eq!(volume_fraction(&h), 0.0);
        assert_eq!(surface_density(1.0, &h), 0.0);
        assert_eq!(mean_curvature(1.0, &h), 0.0);
        assert_eq!(total_curvature(1.0, &h), 0.0);
    }

    /// 嵌在背景中的长方体.
    #[test]
    fn test_block() {
        let h = block_histogram();
        assert_eq!(total_volume(&h), 512);
        assert!(f64_eq(volume_fraction(&h), 0.244140625));
        assert!(f64_eq(surface_density(1.0, &h), 0.3621539480723264));
        assert!(f64_eq(mean_curvature(1.0, &h), 0.07744530757609369));
        assert_eq!(euler_sum(&h), 1);
        assert!(f64_eq(euler_number(1.0, &h), 1.0 / 512.0));
        assert_eq!(gauss_sum(&h), 24);
        assert!(f64_eq(total_curvature(1.0, &h), 4.0 * PI / 512.0));
    }

    /// 像素尺寸对各密度的量纲缩放.
    #[test]
    fn test_pixel_size_scaling() {
        let h = block_histogram();
        assert!(f64_eq(surface_density(2.0, &h), surface_density(1.0, &h) / 2.0));
        assert!(f64_eq(mean_curvature(2.0, &h), mean_curvature(1.0, &h) / 4.0));
        assert!(f64_eq(euler_number(2.0, &h), 0.000244140625));
        assert!(f64_eq(
            euler_number_with(2.0, &h, EulerNorm::Averaged),
            0.000244140625 / 24.0
        ));
    }

    /// 互补结构: 表面积不变, 平均曲率变号.
    #[test]
    fn test_complement() {
        let v = phantom::block((9, 9, 9), (2, 2, 2), (6, 6, 6));
        let h = ConfigHistogram::whole_cube(&v);
        let hc = ConfigHistogram::whole_cube(&v.complement());
        assert!(f64_eq(surface_density(1.0, &h), surface_density(1.0, &hc)));
        assert!(f64_eq(mean_curvature(1.0, &h), -mean_curvature(1.0, &hc)));
        assert!(f64_eq(volume_fraction(&h) + volume_fraction(&hc), 1.0));
    }

    /// 半空间: 平面界面的平均曲率为零.
    #[test]
    fn test_half_space() {
        let v = BinaryVolume::from_fn((9, 9, 9), |(_, _, x)| x < 4);
        let h = ConfigHistogram::whole_cube(&v);
        assert!(f64_eq(volume_fraction(&h), 0.5));
        assert!(f64_eq(surface_density(1.0, &h), 0.17374330784837339));
        assert!(mean_curvature(1.0, &h).abs() < 1e-12);
        assert_eq!(euler_sum(&h), 0);
    }

    /// 拓扑不变量: 球 / 单点为 1, 带空腔的球壳为 2, 圆环为 0.
    /// 高斯曲率和恒为欧拉示性数的 24 倍.
    #[test]
    fn test_topology() {
        let cases = [
            (phantom::ball((11, 11, 11), (5, 5, 5), 3.5), 1, 1000),
            (phantom::shell((13, 13, 13), (6, 6, 6), 2.0, 4.5), 2, 1728),
            (phantom::ring((9, 15, 15), (4, 7, 7), 4.0, 1.5), 0, 1568),
            (phantom::block((3, 3, 3), (1, 1, 1), (1, 1, 1)), 1, 8),
        ];
        for (v, chi, n) in cases {
            let h = ConfigHistogram::whole_cube(&v);
            assert_eq!(total_volume(&h), n);
            assert_eq!(euler_sum(&h), chi);
            assert_eq!(gauss_sum(&h), 24 * chi);
        }

        let ball = ConfigHistogram::whole_cube(&phantom::ball((11, 11, 11), (5, 5, 5), 3.5));
        assert!(f64_eq(volume_fraction(&ball), 0.179));
        assert!(f64_eq(surface_density(1.0, &ball), 0.224026568843074));
        assert!(f64_eq(mean_curvature(1.0, &ball), 0.043103577362865166));
    }

    /// 空直方图: 原始估计为 NaN, 汇总估计返回错误.
    #[test]
    fn test_empty_histogram() {
        let h = ConfigHistogram::new();
        assert!(volume_fraction(&h).is_nan());
        assert!(surface_density(1.0, &h).is_nan());
        assert!(euler_number(1.0, &h).is_nan());
        assert_eq!(
            Minkowski::estimate(1.0, &h, EulerNorm::default()).unwrap_err(),
            MorphError::EmptyRegion
        );
    }

    /// 汇总估计与逐项估计一致.
    #[test]
    fn test_estimate() {
        let h = block_histogram();
        let m = Minkowski::estimate(0.5, &h, EulerNorm::PerVolume).unwrap();
        assert_eq!(m.voxels, 512);
        assert_eq!(m.volume_fraction, volume_fraction(&h));
        assert_eq!(m.surface_density, surface_density(0.5, &h));
        assert_eq!(m.mean_curvature, mean_curvature(0.5, &h));
        assert_eq!(m.euler_density, euler_number(0.5, &h));
        assert_eq!(m.total_curvature, total_curvature(0.5, &h));
    }

    #[test]
    #[should_panic]
    fn test_non_positive_pixel_size() {
        surface_density(0.0, &block_histogram());
    }
}
