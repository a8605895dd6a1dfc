//! 感兴趣区域 (ROI): 球心 + 半径, 以及被场边界裁剪后的包围窗口.

use itertools::iproduct;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Idx3d;

/// 闭区间形式的轴对齐包围窗口, `lo` 与 `hi` 均包含在内.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Window {
    /// 各轴下界 `(z, y, x)`.
    pub lo: Idx3d,

    /// 各轴上界 `(z, y, x)`.
    pub hi: Idx3d,
}

impl Window {
    /// 窗口是否包含 `pos`. `pos` 允许为负.
    #[inline]
    pub fn contains(&self, (z, y, x): (isize, isize, isize)) -> bool {
        let inside = |v: isize, lo: usize, hi: usize| v >= lo as isize && v <= hi as isize;
        inside(z, self.lo.0, self.hi.0)
            && inside(y, self.lo.1, self.hi.1)
            && inside(x, self.lo.2, self.hi.2)
    }

    /// 各轴长度 `(z, y, x)`.
    #[inline]
    pub fn extent(&self) -> Idx3d {
        (
            self.hi.0 - self.lo.0 + 1,
            self.hi.1 - self.lo.1 + 1,
            self.hi.2 - self.lo.2 + 1,
        )
    }

    /// 按 z-y-x 顺序迭代窗口中的全部位置.
    pub fn positions(&self) -> impl Iterator<Item = Idx3d> {
        let (lo, hi) = (self.lo, self.hi);
        iproduct!(lo.0..=hi.0, lo.1..=hi.1, lo.2..=hi.2)
    }

    /// 按 z-y-x 顺序迭代 2x2x2 前向单元完全落在窗口内的位置.
    pub fn cell_origins(&self) -> impl Iterator<Item = Idx3d> {
        let (lo, hi) = (self.lo, self.hi);
        iproduct!(lo.0..hi.0, lo.1..hi.1, lo.2..hi.2)
    }
}

/// 球形感兴趣区域.
///
/// # 注意
///
/// 球心必须位于场内, 窗口是 `[center - radius, center + radius]` 被场边界裁剪后的结果.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Roi {
    center: Idx3d,
    radius: usize,
    window: Window,
}

impl Roi {
    /// 在形状为 `shape` 的场中以 `center` 为球心, `radius` (单位: 体素) 为半径创建 ROI.
    ///
    /// 如果 `center` 不在场内, 则程序 panic.
    pub fn new(center: Idx3d, radius: usize, shape: Idx3d) -> Self {
        assert!(
            center.0 < shape.0 && center.1 < shape.1 && center.2 < shape.2,
            "ROI 中心 {center:?} 不在形状为 {shape:?} 的场内"
        );
        let clamp = |c: usize, size: usize| (c.saturating_sub(radius), (c + radius).min(size - 1));
        let (z0, z1) = clamp(center.0, shape.0);
        let (y0, y1) = clamp(center.1, shape.1);
        let (x0, x1) = clamp(center.2, shape.2);
        Self {
            center,
            radius,
            window: Window {
                lo: (z0, y0, x0),
                hi: (z1, y1, x1),
            },
        }
    }

    /// 覆盖整个场的 ROI. 球心取场中心, 半径足以包含全部体素.
    ///
    /// 如果场为空, 则程序 panic.
    pub fn whole(shape: Idx3d) -> Self {
        assert!(shape.0 > 0 && shape.1 > 0 && shape.2 > 0, "场不能为空");
        let center = (shape.0 / 2, shape.1 / 2, shape.2 / 2);
        Self::new(center, shape.0 + shape.1 + shape.2, shape)
    }

    /// 球心 `(z, y, x)`.
    #[inline]
    pub fn center(&self) -> Idx3d {
        self.center
    }

    /// 半径 (单位: 体素).
    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// 裁剪后的包围窗口.
    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }

    /// `pos` 到球心的欧氏距离的平方.
    #[inline]
    pub fn distance_squared(&self, pos: Idx3d) -> usize {
        let (a, b, c) = (
            pos.0.abs_diff(self.center.0),
            pos.1.abs_diff(self.center.1),
            pos.2.abs_diff(self.center.2),
        );
        a * a + b * b + c * c
    }

    /// `pos` 是否位于球内 (含球面).
    #[inline]
    pub fn in_sphere(&self, pos: Idx3d) -> bool {
        self.distance_squared(pos) <= self.radius * self.radius
    }

    /// 按 z-y-x 顺序迭代窗口中位于球内的全部位置.
    pub fn sphere_positions(&self) -> impl Iterator<Item = Idx3d> + '_ {
        self.window.positions().filter(|p| self.in_sphere(*p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 窗口按场边界裁剪.
    #[test]
    fn test_clamped_window() {
        let roi = Roi::new((0, 5, 9), 3, (10, 10, 10));
        assert_eq!(roi.window().lo, (0, 2, 6));
        assert_eq!(roi.window().hi, (3, 8, 9));
        assert_eq!(roi.window().extent(), (4, 7, 4));
        assert!(roi.window().contains((3, 2, 6)));
        assert!(!roi.window().contains((-1, 2, 6)));
        assert!(!roi.window().contains((0, 9, 6)));
    }

    /// 球内计数与闭区间窗口计数.
    #[test]
    fn test_sphere_positions() {
        let roi = Roi::new((2, 2, 2), 1, (5, 5, 5));
        assert_eq!(roi.window().positions().count(), 27);
        assert_eq!(roi.window().cell_origins().count(), 8);
        // 中心 + 6 个面邻居
        assert_eq!(roi.sphere_positions().count(), 7);

        let roi = Roi::new((2, 2, 2), 2, (5, 5, 5));
        // |d|^2 <= 4 的整数点个数
        assert_eq!(roi.sphere_positions().count(), 33);
    }

    /// 整场 ROI 覆盖全部体素.
    #[test]
    fn test_whole() {
        let roi = Roi::whole((3, 4, 5));
        assert_eq!(roi.window().lo, (0, 0, 0));
        assert_eq!(roi.window().hi, (2, 3, 4));
        assert_eq!(roi.sphere_positions().count(), 60);
    }

    #[test]
    #[should_panic]
    fn test_center_outside() {
        Roi::new((5, 0, 0), 1, (5, 5, 5));
    }
}
