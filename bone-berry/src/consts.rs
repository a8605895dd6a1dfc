//! 通用常量.

/// 体素相位 (二值化之后的体素值).
pub mod phase {
    /// 背景 (骨髓 / 空腔) 相.
    pub const BACKGROUND: u8 = 0;

    /// 骨相.
    pub const BONE: u8 = 1;

    /// 体素是否是骨?
    #[inline]
    pub const fn is_bone(p: u8) -> bool {
        matches!(p, BONE)
    }

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, BACKGROUND)
    }

    /// 体素值是否是合法相位?
    #[inline]
    pub const fn is_phase(p: u8) -> bool {
        matches!(p, BACKGROUND | BONE)
    }
}

/// 构型直方图的 bin 个数 (2x2x2 单元的全部 8-bit 编码).
pub const CONFIGURATIONS: usize = 256;

/// 灰度场默认二值化阈值. 灰度严格小于该值的体素视为骨.
pub const DEFAULT_THRESHOLD: f64 = 0.68;

/// MIL 测试线的目标物理间距 (单位: 毫米).
/// 实际体素间距为 `max(1, floor(TEST_LINE_SPACING_MM / pixel_size))`.
pub const TEST_LINE_SPACING_MM: f64 = 0.120722;

/// 结构模型指数 (SMI) 的经验比例系数.
pub const SMI_FACTOR: f64 = 2.025;

/// 板状模型下骨小梁厚度 `Tb.Th = TBTH_FACTOR * BV/TV / (BS/TV)` 的系数.
pub const TBTH_FACTOR: f64 = 5.0 / 3.0;

/// 方向采样的默认随机种子.
pub const DEFAULT_SEED: u64 = 1;

/// 椭球拟合所需的最少方向数 (方差自由度为 `n - 7`).
pub const MIN_FIT_DIRECTIONS: usize = 8;

/// `mil` 描述子占据的输出槽位数: 三个特征向量 (x, y, z) 以及三个主 MIL.
pub const MIL_SLOTS: usize = 12;

/// Jacobi 特征值求解的默认收敛容差.
pub const JACOBI_EPS: f64 = 1e-6;

/// Jacobi 特征值求解允许的默认最大旋转次数.
pub const JACOBI_MAX_ROTATIONS: usize = 50;

/// 条件数估计超过该值时, 视矩阵为数值奇异.
pub const CONDITION_LIMIT: f64 = 1e15;

/// 稠密线性求解器支持的最大阶数.
pub const MAX_ORDER: usize = 6;
