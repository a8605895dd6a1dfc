//! 合成体模, 用于测试和消融实验.
//!
//! 所有体模均以 `(z, y, x)` 形状给出, 距离以体素为单位.

use super::BinaryVolume;
use crate::Idx3d;

/// 坐标轴.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis3 {
    /// z 轴 (最慢变化).
    Z,
    /// y 轴.
    Y,
    /// x 轴 (最快变化).
    X,
}

impl Axis3 {
    /// 取出 `pos` 在该轴上的分量, 以及另外两个分量.
    #[inline]
    fn split(self, (z, y, x): Idx3d) -> (usize, usize, usize) {
        match self {
            Self::Z => (z, y, x),
            Self::Y => (y, z, x),
            Self::X => (x, z, y),
        }
    }
}

#[inline]
fn distance((z, y, x): Idx3d, (cz, cy, cx): (f64, f64, f64)) -> f64 {
    let (dz, dy, dx) = (z as f64 - cz, y as f64 - cy, x as f64 - cx);
    (dz * dz + dy * dy + dx * dx).sqrt()
}

#[inline]
fn as_f64((z, y, x): Idx3d) -> (f64, f64, f64) {
    (z as f64, y as f64, x as f64)
}

/// 全骨.
pub fn solid(shape: Idx3d) -> BinaryVolume {
    BinaryVolume::from_fn(shape, |_| true)
}

/// 全背景.
pub fn empty(shape: Idx3d) -> BinaryVolume {
    BinaryVolume::from_fn(shape, |_| false)
}

/// 闭区间 `[lo, hi]` 内的长方体.
pub fn block(shape: Idx3d, lo: Idx3d, hi: Idx3d) -> BinaryVolume {
    BinaryVolume::from_fn(shape, |(z, y, x)| {
        (lo.0..=hi.0).contains(&z) && (lo.1..=hi.1).contains(&y) && (lo.2..=hi.2).contains(&x)
    })
}

/// 以 `center` 为球心, 半径为 `radius` 的实心球.
pub fn ball(shape: Idx3d, center: Idx3d, radius: f64) -> BinaryVolume {
    let c = as_f64(center);
    BinaryVolume::from_fn(shape, |p| distance(p, c) <= radius)
}

/// 空心球壳: `inner < d <= outer`. 内部空腔使欧拉示性数为 2.
pub fn shell(shape: Idx3d, center: Idx3d, inner: f64, outer: f64) -> BinaryVolume {
    assert!(inner < outer);
    let c = as_f64(center);
    BinaryVolume::from_fn(shape, |p| {
        let d = distance(p, c);
        d > inner && d <= outer
    })
}

/// 位于 `z = center.0` 平面附近的圆环, 主半径为 `major`, 管半径为 `minor`.
/// 一个贯穿孔使欧拉示性数为 0.
pub fn ring(shape: Idx3d, center: Idx3d, major: f64, minor: f64) -> BinaryVolume {
    assert!(minor < major);
    let (cz, cy, cx) = as_f64(center);
    BinaryVolume::from_fn(shape, |(z, y, x)| {
        let planar = ((y as f64 - cy).powi(2) + (x as f64 - cx).powi(2)).sqrt() - major;
        planar.powi(2) + (z as f64 - cz).powi(2) <= minor * minor
    })
}

/// 垂直于 `axis` 的平行板, 每 `period` 个体素中前 `thickness` 个为骨.
pub fn plates(shape: Idx3d, axis: Axis3, period: usize, thickness: usize) -> BinaryVolume {
    assert!(period > 0 && thickness <= period);
    BinaryVolume::from_fn(shape, |p| axis.split(p).0 % period < thickness)
}

/// 平行于 `axis` 的方形杆阵列, 截面边长为 `thickness`, 间距为 `period`.
pub fn rods(shape: Idx3d, axis: Axis3, period: usize, thickness: usize) -> BinaryVolume {
    assert!(period > 0 && thickness <= period);
    BinaryVolume::from_fn(shape, |p| {
        let (_, u, v) = axis.split(p);
        u % period < thickness && v % period < thickness
    })
}

/// 以 `center` 为中心的同心球壳, 每 `period` 个体素中前 `thickness` 个为骨.
///
/// 该体模球对称, 任意方向上的截距统计相同.
pub fn concentric_shells(
    shape: Idx3d,
    center: Idx3d,
    period: usize,
    thickness: usize,
) -> BinaryVolume {
    assert!(period > 0 && thickness <= period);
    let c = as_f64(center);
    BinaryVolume::from_fn(shape, |p| {
        (distance(p, c) + 0.5).floor() as usize % period < thickness
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 体模的骨体素数量.
    #[test]
    fn test_counts() {
        assert_eq!(solid((2, 3, 4)).count_bone(), 24);
        assert_eq!(empty((2, 3, 4)).count_bone(), 0);
        assert_eq!(block((9, 9, 9), (2, 2, 2), (6, 6, 6)).count_bone(), 125);
        assert_eq!(ball((5, 5, 5), (2, 2, 2), 1.0).count_bone(), 7);
        assert_eq!(plates((4, 4, 4), Axis3::Z, 2, 1).count_bone(), 32);
        assert_eq!(rods((4, 4, 4), Axis3::X, 2, 1).count_bone(), 16);
    }

    /// 轴方向决定板的法向.
    #[test]
    fn test_plate_orientation() {
        let v = plates((4, 4, 4), Axis3::X, 4, 1);
        assert_eq!(v[(3, 3, 0)], 1);
        assert_eq!(v[(0, 0, 1)], 0);
    }
}
