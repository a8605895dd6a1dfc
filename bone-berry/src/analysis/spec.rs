//! 单次分析的参数.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::descriptor::{bundle_depth, Descriptor};
use crate::consts::{
    CONDITION_LIMIT, DEFAULT_SEED, JACOBI_EPS, JACOBI_MAX_ROTATIONS, TEST_LINE_SPACING_MM,
};
use crate::histogram::SamplingPolicy;
use crate::mil::line_spacing_for;
use crate::minkowski::EulerNorm;

/// 分析参数. 实际计算每个 ROI 时所需的全部输入 (数据本身除外).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisSpec {
    /// 需要输出的描述子, 顺序即槽位顺序.
    descriptors: Vec<Descriptor>,

    /// ROI 半径 (单位: 体素).
    radius: usize,

    /// 体素边长 (单位: 毫米).
    pixel_size: f64,

    /// MIL 测试方向个数. 为 0 时不做各向异性分析.
    number_of_dirs: usize,

    /// 构型直方图的采样策略.
    policy: SamplingPolicy,

    /// 欧拉数密度的归一化方式.
    euler_norm: EulerNorm,

    /// 方向采样的随机种子.
    seed: u64,

    /// 测试线的目标物理间距 (单位: 毫米).
    line_spacing_mm: f64,

    /// Jacobi 收敛容差.
    eps: f64,

    /// Jacobi 最大旋转次数.
    max_rotations: usize,

    /// 法方程求逆允许的最大条件数.
    condition_limit: f64,
}

impl AnalysisSpec {
    /// 以 `descriptors` 顺序输出, ROI 半径为 `radius` 体素, 体素边长为 `pixel_size` 毫米,
    /// 采样 `number_of_dirs` 个方向. 其余参数取默认值.
    ///
    /// 如果存在非法参数, 则程序 panic.
    pub fn new(
        descriptors: Vec<Descriptor>,
        radius: usize,
        pixel_size: f64,
        number_of_dirs: usize,
    ) -> Self {
        assert!(pixel_size > 0.0 && pixel_size.is_finite(), "体素边长必须为正");
        Self {
            descriptors,
            radius,
            pixel_size,
            number_of_dirs,
            policy: SamplingPolicy::default(),
            euler_norm: EulerNorm::default(),
            seed: DEFAULT_SEED,
            line_spacing_mm: TEST_LINE_SPACING_MM,
            eps: JACOBI_EPS,
            max_rotations: JACOBI_MAX_ROTATIONS,
            condition_limit: CONDITION_LIMIT,
        }
    }

    /// 指定直方图采样策略.
    pub fn with_policy(mut self, policy: SamplingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 指定欧拉数归一化方式.
    pub fn with_euler_norm(mut self, norm: EulerNorm) -> Self {
        self.euler_norm = norm;
        self
    }

    /// 指定随机种子.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// 指定测试线的目标物理间距 (单位: 毫米).
    ///
    /// `mm` 不为正时 panic.
    pub fn with_line_spacing_mm(mut self, mm: f64) -> Self {
        assert!(mm > 0.0);
        self.line_spacing_mm = mm;
        self
    }

    /// 指定 Jacobi 收敛容差与最大旋转次数.
    ///
    /// `eps` 不为正时 panic.
    pub fn with_jacobi(mut self, eps: f64, max_rotations: usize) -> Self {
        assert!(eps > 0.0);
        self.eps = eps;
        self.max_rotations = max_rotations;
        self
    }

    /// 指定法方程求逆的条件数上限.
    ///
    /// `limit` 小于 1 时 panic.
    pub fn with_condition_limit(mut self, limit: f64) -> Self {
        assert!(limit >= 1.0);
        self.condition_limit = limit;
        self
    }

    /// 需要输出的描述子.
    #[inline]
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// 每个 ROI 的输出槽位数.
    #[inline]
    pub fn depth(&self) -> usize {
        bundle_depth(&self.descriptors)
    }

    /// ROI 半径 (单位: 体素).
    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// 体素边长 (单位: 毫米).
    #[inline]
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    /// MIL 测试方向个数.
    #[inline]
    pub fn number_of_dirs(&self) -> usize {
        self.number_of_dirs
    }

    /// 直方图采样策略.
    #[inline]
    pub fn policy(&self) -> SamplingPolicy {
        self.policy
    }

    /// 欧拉数归一化方式.
    #[inline]
    pub fn euler_norm(&self) -> EulerNorm {
        self.euler_norm
    }

    /// 随机种子.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// 测试线体素间距.
    #[inline]
    pub fn line_spacing(&self) -> usize {
        line_spacing_for(self.line_spacing_mm, self.pixel_size)
    }

    /// Jacobi 收敛容差.
    #[inline]
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Jacobi 最大旋转次数.
    #[inline]
    pub fn max_rotations(&self) -> usize {
        self.max_rotations
    }

    /// 条件数上限.
    #[inline]
    pub fn condition_limit(&self) -> f64 {
        self.condition_limit
    }

    /// 是否需要做各向异性分析.
    #[inline]
    pub fn wants_anisotropy(&self) -> bool {
        self.number_of_dirs > 0 && self.descriptors.iter().any(|d| d.needs_anisotropy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 默认值与链式设置.
    #[test]
    fn test_defaults() {
        let spec = AnalysisSpec::new(vec![Descriptor::Bvtv, Descriptor::Mil], 5, 0.06, 30);
        assert_eq!(spec.depth(), 13);
        assert_eq!(spec.seed(), 1);
        assert_eq!(spec.line_spacing(), 2);
        assert_eq!(spec.policy(), SamplingPolicy::Sphere);
        assert_eq!(spec.euler_norm(), EulerNorm::PerVolume);
        assert!(spec.wants_anisotropy());

        let spec = spec
            .with_policy(SamplingPolicy::Cube)
            .with_seed(7)
            .with_line_spacing_mm(0.5);
        assert_eq!(spec.policy(), SamplingPolicy::Cube);
        assert_eq!(spec.seed(), 7);
        assert_eq!(spec.line_spacing(), 8);

        let spec = AnalysisSpec::new(vec![Descriptor::Da], 5, 1.0, 0);
        assert!(!spec.wants_anisotropy());
    }

    #[test]
    #[should_panic]
    fn test_bad_pixel_size() {
        AnalysisSpec::new(vec![], 3, 0.0, 0);
    }
}
