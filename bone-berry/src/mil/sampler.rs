//! 球形 ROI 内的平行测试线采样.
//!
//! 对每个方向, 在旋转后的坐标系中铺设一组平行于该方向的测试线, 测试线在 ROI 的
//! `(x, y)` 包围窗口上按 `spacing` 取格点, 只保留离球心的平面距离严格小于半径的格点.
//! 每条线从球面上的一端出发, 以主分量归一化后的方向向量逐体素前进, 统计相位变化次数.

use itertools::iproduct;
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::DirectionSet;
use crate::consts::phase::BACKGROUND;
use crate::consts::TEST_LINE_SPACING_MM;
use crate::data::{BinaryVolume, Roi};
use crate::error::MorphError;
use crate::MorphResult;

/// 由目标物理间距 `target_mm` 与体素尺寸得到测试线的体素间距, 至少为 1.
///
/// `pixel_size` 不为正时 panic.
pub fn line_spacing_for(target_mm: f64, pixel_size: f64) -> usize {
    assert!(pixel_size > 0.0, "体素尺寸必须为正");
    ((target_mm / pixel_size).floor() as usize).max(1)
}

/// 默认目标间距下的测试线体素间距.
#[inline]
pub fn line_spacing(pixel_size: f64) -> usize {
    line_spacing_for(TEST_LINE_SPACING_MM, pixel_size)
}

/// 一条测试线: 旋转坐标系中相对球心的平面偏移 `(dx, dy)`, 以及半弦长 `half`.
#[derive(Debug, Clone, Copy)]
struct TestLine {
    dx: f64,
    dy: f64,
    half: f64,
}

/// 迭代 ROI 内的全部测试线. 总长度与逐线计数使用同一组线.
fn test_lines(roi: &Roi, spacing: usize) -> impl Iterator<Item = TestLine> {
    assert!(spacing > 0, "测试线间距必须为正");
    let (_, cy, cx) = roi.center();
    let (cy, cx) = (cy as f64, cx as f64);
    let r2 = (roi.radius() * roi.radius()) as f64;
    let w = roi.window();
    iproduct!(
        (w.lo.2..=w.hi.2).step_by(spacing),
        (w.lo.1..=w.hi.1).step_by(spacing)
    )
    .filter_map(move |(ix, iy)| {
        let dx = ix as f64 - cx;
        let dy = iy as f64 - cy;
        let d2 = dx * dx + dy * dy;
        (d2 < r2).then(|| TestLine {
            dx,
            dy,
            half: (r2 - d2).sqrt(),
        })
    })
}

/// ROI 内测试线的条数与总长度 (单位: 毫米). 与数据无关.
pub fn test_line_length(roi: &Roi, spacing: usize, pixel_size: f64) -> (usize, f64) {
    let (count, length) = test_lines(roi, spacing)
        .fold((0, 0.0), |(n, l), line| (n + 1, l + 2.0 * line.half));
    (count, length * pixel_size)
}

/// ROI 球内 (含球面) 的骨体素数与体素总数.
pub fn sphere_volume(volume: &BinaryVolume, roi: &Roi) -> (u64, u64) {
    roi.sphere_positions()
        .fold((0, 0), |(bone, total), p| (bone + volume[p] as u64, total + 1))
}

/// 某一方向的测试线坐标系.
#[derive(Debug, Clone, Copy)]
struct LineFrame {
    sin_theta: f64,
    cos_theta: f64,
    sin_phi: f64,
    cos_phi: f64,
    /// 单位方向向量 `(x, y, z)`.
    dir: [f64; 3],
    /// 按绝对值最大分量归一化的步进向量.
    step: [f64; 3],
}

impl LineFrame {
    fn new(theta: f64, phi: f64) -> Self {
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let dir = [cos_phi * sin_theta, sin_phi * sin_theta, cos_theta];
        let m = dir.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let step = [dir[0] / m, dir[1] / m, dir[2] / m];
        Self {
            sin_theta,
            cos_theta,
            sin_phi,
            cos_phi,
            dir,
            step,
        }
    }

    /// 测试线在球面上的起点 `(x, y, z)`.
    #[inline]
    fn start(&self, line: &TestLine, (cx, cy, cz): (f64, f64, f64)) -> [f64; 3] {
        let TestLine { dx, dy, half } = *line;
        [
            dx * self.cos_theta * self.cos_phi - dy * self.sin_phi + cx - half * self.dir[0],
            dx * self.cos_theta * self.sin_phi + dy * self.cos_phi + cy - half * self.dir[1],
            -dx * self.sin_theta + cz - half * self.dir[2],
        ]
    }
}

/// 沿测试线的游走器, 只读访问体数据.
struct Walker<'a> {
    volume: &'a BinaryVolume,
    roi: &'a Roi,
    center: (f64, f64, f64),
    r2: f64,
}

impl<'a> Walker<'a> {
    fn new(volume: &'a BinaryVolume, roi: &'a Roi) -> Self {
        let (cz, cy, cx) = roi.center();
        let r = roi.radius() as f64;
        Self {
            volume,
            roi,
            center: (cx as f64, cy as f64, cz as f64),
            r2: r * r,
        }
    }

    /// 点 `(x, y, z)` 所在体素的相位. 窗口外一律为背景.
    #[inline]
    fn phase_at(&self, p: &[f64; 3]) -> u8 {
        let pos = (
            p[2].floor() as isize,
            p[1].floor() as isize,
            p[0].floor() as isize,
        );
        if self.roi.window().contains(pos) {
            self.volume.phase_or_background(pos)
        } else {
            BACKGROUND
        }
    }

    #[inline]
    fn inside(&self, p: &[f64; 3]) -> bool {
        let (cx, cy, cz) = self.center;
        let (dx, dy, dz) = (p[0] - cx, p[1] - cy, p[2] - cz);
        dx * dx + dy * dy + dz * dz <= self.r2
    }

    /// 单条测试线上的相位变化次数.
    fn intersections(&self, frame: &LineFrame, line: &TestLine) -> u64 {
        let mut p = frame.start(line, self.center);
        let mut prev = self.phase_at(&p);
        let mut count = 0;
        loop {
            for (c, s) in p.iter_mut().zip(frame.step) {
                *c += s;
            }
            if !self.inside(&p) {
                break;
            }
            let cur = self.phase_at(&p);
            if cur != prev {
                count += 1;
                prev = cur;
            }
        }
        count
    }
}

/// 一次球形 ROI 采样的结果.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SphereSampling {
    /// 球内骨体素数.
    pub bone_voxels: u64,

    /// 球内体素总数.
    pub total_voxels: u64,

    /// 每个方向上测试线的总长度 (单位: 毫米).
    pub test_line_length: f64,

    /// 每个方向上的测试线条数.
    pub number_of_lines: usize,

    /// 每个方向上的相位变化总次数.
    pub intersections: Vec<u64>,

    /// 每个方向上的平均截距长度 (单位: 毫米). 无交点的方向为 `+inf`.
    pub mil: Vec<f64>,
}

impl SphereSampling {
    /// 对 `directions` 中的每个方向, 以体素间距 `spacing` 铺设测试线并统计截距.
    ///
    /// # 注意
    ///
    /// 1. 方向为空时返回 [`MorphError::NoDirections`].
    /// 2. 全部方向都没有相位变化时返回 [`MorphError::NoIntersections`].
    pub fn sample(
        volume: &BinaryVolume,
        roi: &Roi,
        directions: &DirectionSet,
        spacing: usize,
        pixel_size: f64,
    ) -> MorphResult<Self> {
        if directions.is_empty() {
            return Err(MorphError::NoDirections);
        }
        let (bone_voxels, total_voxels) = sphere_volume(volume, roi);
        let (number_of_lines, test_line_length) = test_line_length(roi, spacing, pixel_size);
        let lines: Vec<TestLine> = test_lines(roi, spacing).collect();

        let walker = Walker::new(volume, roi);
        let intersections: Vec<u64> = directions
            .iter()
            .map(|(theta, phi)| {
                let frame = LineFrame::new(theta, phi);
                lines.iter().map(|l| walker.intersections(&frame, l)).sum()
            })
            .collect();

        if intersections.iter().all(|n| *n == 0) {
            return Err(MorphError::NoIntersections);
        }

        let bvtv = bone_voxels as f64 / total_voxels as f64;
        let mil = intersections
            .iter()
            .map(|n| 2.0 * bvtv / (*n as f64 / test_line_length))
            .collect();
        debug!(
            "sphere sampling: center = {:?}, lines = {number_of_lines}, bv/tv = {bvtv}",
            roi.center()
        );

        Ok(Self {
            bone_voxels,
            total_voxels,
            test_line_length,
            number_of_lines,
            intersections,
            mil,
        })
    }

    /// 球内骨体积分数.
    #[inline]
    pub fn bvtv(&self) -> f64 {
        self.bone_voxels as f64 / self.total_voxels as f64
    }

    /// 全部方向的相位变化总数.
    #[inline]
    pub fn total_intersections(&self) -> u64 {
        self.intersections.iter().sum()
    }

    /// 方向个数.
    #[inline]
    pub fn directions(&self) -> usize {
        self.intersections.len()
    }
}

/// 平行板模型下由测试线截距直接得到的形态学指标.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlateModel {
    /// 单位长度测试线上的平均交点数 `P_L` (单位: 1/毫米).
    pub p_l: f64,

    /// `BS/BV = 2 P_L / (BV/TV)`.
    pub bs_bv: f64,

    /// `Tb.Th = (BV/TV) / P_L`.
    pub tb_th: f64,

    /// `Tb.N = P_L`.
    pub tb_n: f64,

    /// `Tb.Sp = (1 - BV/TV) / P_L`.
    pub tb_sp: f64,
}

impl PlateModel {
    /// 在全部方向上平均 `P_L`, 再代入平行板模型.
    pub fn from_sampling(s: &SphereSampling) -> MorphResult<Self> {
        let n = s.directions() as f64;
        let p_l = s.total_intersections() as f64 / (s.test_line_length * n);
        if !p_l.is_finite() || p_l <= 0.0 {
            return Err(MorphError::NoIntersections);
        }
        let bvtv = s.bvtv();
        Ok(Self {
            p_l,
            bs_bv: 2.0 * p_l / bvtv,
            tb_th: bvtv / p_l,
            tb_n: p_l,
            tb_sp: (1.0 - bvtv) / p_l,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::phantom::{self, Axis3};
    use std::f64::consts::FRAC_PI_2;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// 沿 z, x, y 三个坐标轴的方向.
    fn axis_directions() -> DirectionSet {
        DirectionSet::from_angles(vec![0.0, FRAC_PI_2, FRAC_PI_2], vec![0.0, 0.0, FRAC_PI_2])
    }

    /// 测试线间距.
    #[test]
    fn test_line_spacing() {
        assert_eq!(line_spacing(1.0), 1);
        assert_eq!(line_spacing(0.06), 2);
        assert_eq!(line_spacing(0.01), 12);
        assert_eq!(line_spacing_for(3.0, 1.0), 3);
    }

    /// 测试线条数与总长度只取决于几何.
    #[test]
    fn test_line_geometry() {
        let roi = Roi::new((20, 20, 20), 6, (41, 41, 41));
        let (n, l) = test_line_length(&roi, 1, 1.0);
        assert_eq!(n, 109);
        assert!(f64_eq(l, 897.1496459137816));

        let (n, l) = test_line_length(&roi, 2, 0.5);
        assert_eq!(n, 25);
        assert!(f64_eq(l, 107.6819713064846));

        let roi = Roi::new((2, 2, 2), 0, (5, 5, 5));
        assert_eq!(test_line_length(&roi, 1, 1.0), (0, 0.0));
    }

    /// 垂直于 z 轴的平行板: 只有 z 方向有截距.
    #[test]
    fn test_plates() {
        let v = phantom::plates((41, 41, 41), Axis3::Z, 4, 2);
        let roi = Roi::new((20, 20, 20), 6, (41, 41, 41));
        let s = SphereSampling::sample(&v, &roi, &axis_directions(), 1, 1.0).unwrap();

        assert_eq!(s.bone_voxels, 486);
        assert_eq!(s.total_voxels, 925);
        assert_eq!(s.number_of_lines, 109);
        assert_eq!(s.intersections, vec![422, 0, 0]);
        assert!((s.mil[0] - 2.2339681204769963).abs() < 1e-9);
        assert!(s.mil[1].is_infinite() && s.mil[2].is_infinite());

        let s = SphereSampling::sample(&v, &roi, &axis_directions(), 2, 0.5).unwrap();
        assert_eq!(s.intersections, vec![102, 0, 0]);
    }

    /// 平行板模型的代数关系.
    #[test]
    fn test_plate_model() {
        let v = phantom::plates((41, 41, 41), Axis3::Z, 4, 2);
        let roi = Roi::new((20, 20, 20), 6, (41, 41, 41));
        let dirs = DirectionSet::from_angles(vec![0.0], vec![0.0]);
        let s = SphereSampling::sample(&v, &roi, &dirs, 1, 1.0).unwrap();
        let m = PlateModel::from_sampling(&s).unwrap();

        assert!(f64_eq(m.p_l, 422.0 / 897.1496459137816));
        assert!(f64_eq(m.tb_th * m.tb_n, s.bvtv()));
        assert!(f64_eq(m.tb_th + m.tb_sp, 1.0 / m.p_l));
        assert!(f64_eq(m.bs_bv * m.tb_th, 2.0));
    }

    /// 没有相位变化或没有方向时返回错误.
    #[test]
    fn test_degenerate() {
        let roi = Roi::new((20, 20, 20), 6, (41, 41, 41));
        let solid = phantom::solid((41, 41, 41));
        assert_eq!(
            SphereSampling::sample(&solid, &roi, &axis_directions(), 1, 1.0).unwrap_err(),
            MorphError::NoIntersections
        );

        let empty = DirectionSet::from_seed(0, 1);
        assert_eq!(
            SphereSampling::sample(&solid, &roi, &empty, 1, 1.0).unwrap_err(),
            MorphError::NoDirections
        );
    }

    /// 球内体积统计.
    #[test]
    fn test_sphere_volume() {
        let v = phantom::solid((5, 5, 5));
        let roi = Roi::new((2, 2, 2), 2, (5, 5, 5));
        assert_eq!(sphere_volume(&v, &roi), (33, 33));
    }
}
