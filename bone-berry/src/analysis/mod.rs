//! 逐 ROI 的形态学分析.
//!
//! [`Analyzer`] 持有一份 [`AnalysisSpec`] 和由其种子生成的测试方向, 对每个 ROI 依次:
//!
//! 1. 按采样策略统计构型直方图, 并估计 Minkowski 泛函密度;
//! 2. 由密度推导 `BV/TV`, `Tb.Th` 等描述子;
//! 3. 如需各向异性, 做 MIL 采样, 椭球拟合与主轴分析.
//!
//! 同一个 `Analyzer` 对相同输入总是给出逐位相同的结果, 且不持有可变状态,
//! 可以在多个线程间共享.

mod descriptor;
mod grid;
mod spec;

pub use descriptor::{bundle_depth, parse_list, Descriptor};
pub use grid::{grid_center, GridScan};
pub use spec::AnalysisSpec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::{SMI_FACTOR, TBTH_FACTOR};
use crate::data::{BinaryVolume, Roi};
use crate::histogram::ConfigHistogram;
use crate::mil::{DirectionSet, EllipsoidFit, PlateModel, PrincipalAxes, SphereSampling};
use crate::minkowski::Minkowski;
use crate::{Idx3d, MorphResult};

/// 各向异性分析的中间结果与最终结果.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Anisotropy {
    /// MIL 采样.
    pub sampling: SphereSampling,

    /// 椭球拟合.
    pub fit: EllipsoidFit,

    /// 排序后的主轴.
    pub axes: PrincipalAxes,

    /// 平行板模型指标.
    pub plates: PlateModel,
}

/// 单个 ROI 的形态学描述子.
///
/// # 注意
///
/// 没有相界面 (`BS/TV = 0`) 时, 依赖它做分母的描述子按 IEEE 754 规则得到 `inf` 或 `NaN`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Morphometry {
    /// Minkowski 泛函密度.
    pub minkowski: Minkowski,

    /// 总体积 (单位: 立方毫米).
    pub tv: f64,

    /// 骨体积 (单位: 立方毫米).
    pub bv: f64,

    /// 骨表面积 (单位: 平方毫米).
    pub bs: f64,

    /// 骨体积分数.
    pub bvtv: f64,

    /// 比表面积.
    pub bsbv: f64,

    /// 骨小梁厚度.
    pub tbth: f64,

    /// 骨小梁数目.
    pub tbn: f64,

    /// 骨小梁间距.
    pub tbsp: f64,

    /// 欧拉数密度.
    pub euler: f64,

    /// 结构模型指数.
    pub smi: f64,

    /// 各向异性分析结果, 未请求时为 `None`.
    pub anisotropy: Option<Anisotropy>,
}

impl Morphometry {
    /// 由 Minkowski 密度推导全部标量描述子.
    pub fn from_minkowski(m: Minkowski, pixel_size: f64) -> Self {
        let vf = m.volume_fraction;
        let sd = m.surface_density;
        let tv = m.voxels as f64 * pixel_size.powi(3);
        let tbth = TBTH_FACTOR * vf / sd;
        let tbn = vf / tbth;
        Self {
            minkowski: m,
            tv,
            bv: vf * tv,
            bs: sd * tv,
            bvtv: vf,
            bsbv: sd / vf,
            tbth,
            tbn,
            tbsp: 1.0 / tbn - tbth,
            euler: m.euler_density,
            smi: SMI_FACTOR * 12.0 * m.mean_curvature * vf / (sd * sd),
            anisotropy: None,
        }
    }

    /// 标量描述子的值. `mil` 与 `da` 返回 `None`.
    pub fn scalar(&self, d: Descriptor) -> Option<f64> {
        let v = match d {
            Descriptor::Bvtv => self.bvtv,
            Descriptor::Bsbv => self.bsbv,
            Descriptor::Tbth => self.tbth,
            Descriptor::Tbsp => self.tbsp,
            Descriptor::Tbn => self.tbn,
            Descriptor::Euler => self.euler,
            Descriptor::Smi => self.smi,
            Descriptor::Bv => self.bv,
            Descriptor::Tv => self.tv,
            Descriptor::Bs => self.bs,
            Descriptor::Mil | Descriptor::Da => return None,
        };
        Some(v)
    }

    /// 按 `descriptors` 的顺序把描述子写入 `out`. 缺少各向异性结果时对应槽位写 0.
    ///
    /// `out.len()` 必须等于 [`bundle_depth`], 否则程序 panic.
    pub fn write_slots(&self, descriptors: &[Descriptor], out: &mut [f64]) {
        assert_eq!(out.len(), bundle_depth(descriptors), "输出槽位数不一致");
        let mut at = 0;
        for &d in descriptors {
            let slot = &mut out[at..at + d.width()];
            match (d, &self.anisotropy) {
                (Descriptor::Mil, Some(a)) => slot.copy_from_slice(&a.axes.mil_slots()),
                (Descriptor::Da, Some(a)) => slot.copy_from_slice(&a.axes.degrees),
                (Descriptor::Mil | Descriptor::Da, None) => slot.fill(0.0),
                (_, _) => slot[0] = self.scalar(d).unwrap_or_default(),
            }
            at += d.width();
        }
    }
}

/// 形态学分析器.
#[derive(Debug, Clone)]
pub struct Analyzer {
    spec: AnalysisSpec,
    directions: DirectionSet,
}

impl Analyzer {
    /// 以 `spec` 创建分析器. 需要各向异性时, 以 `spec.seed()` 生成测试方向.
    pub fn new(spec: AnalysisSpec) -> Self {
        let n = if spec.wants_anisotropy() {
            spec.number_of_dirs()
        } else {
            0
        };
        let directions = DirectionSet::from_seed(n, spec.seed());
        Self { spec, directions }
    }

    /// 分析参数.
    #[inline]
    pub fn spec(&self) -> &AnalysisSpec {
        &self.spec
    }

    /// 测试方向. 不需要各向异性时为空.
    #[inline]
    pub fn directions(&self) -> &DirectionSet {
        &self.directions
    }

    /// 以 `center` 为球心, `spec.radius()` 为半径分析 `volume`.
    ///
    /// `center` 不在场内时 panic.
    pub fn analyze_roi(&self, volume: &BinaryVolume, center: Idx3d) -> MorphResult<Morphometry> {
        let roi = Roi::new(center, self.spec.radius(), volume.shape());
        self.analyze(volume, &roi)
    }

    /// 分析 `volume` 中的 `roi`.
    ///
    /// # 注意
    ///
    /// 1. 直方图为空时返回 [`MorphError::EmptyRegion`](crate::MorphError::EmptyRegion).
    /// 2. 各向异性分析中的任一步失败, 整个 ROI 失败, 不返回部分结果.
    pub fn analyze(&self, volume: &BinaryVolume, roi: &Roi) -> MorphResult<Morphometry> {
        let spec = &self.spec;
        let h = ConfigHistogram::build(volume, roi, spec.policy());
        let mk = Minkowski::estimate(spec.pixel_size(), &h, spec.euler_norm())?;
        let mut m = Morphometry::from_minkowski(mk, spec.pixel_size());
        if spec.wants_anisotropy() {
            m.anisotropy = Some(self.anisotropy(volume, roi)?);
        }
        Ok(m)
    }

    /// 只做各向异性分析.
    pub fn anisotropy(&self, volume: &BinaryVolume, roi: &Roi) -> MorphResult<Anisotropy> {
        let spec = &self.spec;
        let sampling = SphereSampling::sample(
            volume,
            roi,
            &self.directions,
            spec.line_spacing(),
            spec.pixel_size(),
        )?;
        let fit = EllipsoidFit::fit(&self.directions, &sampling.mil, spec.condition_limit())?;
        let axes = fit.principal_axes(spec.eps(), spec.max_rotations())?;
        let plates = PlateModel::from_sampling(&sampling)?;
        Ok(Anisotropy {
            sampling,
            fit,
            axes,
            plates,
        })
    }

    /// 分析 `center` 处的 ROI 并按描述子顺序输出全部槽位.
    pub fn bundle(&self, volume: &BinaryVolume, center: Idx3d) -> MorphResult<Vec<f64>> {
        let m = self.analyze_roi(volume, center)?;
        let mut out = vec![0.0; self.spec.depth()];
        m.write_slots(self.spec.descriptors(), &mut out);
        Ok(out)
    }
}
