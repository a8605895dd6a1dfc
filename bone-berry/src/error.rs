//! 运行时错误.

use std::fmt;

/// 形态测量的运行时错误.
///
/// 非法参数 (如非正的像素尺寸) 属于调用方违约, 直接 panic;
/// 只有依赖于数据的退化/数值问题才会以本类型返回.
#[derive(Debug, Clone, PartialEq)]
pub enum MorphError {
    /// 矩阵阶数超出求解器容量. 第一个字段是请求阶数, 第二个是容量.
    InvalidOrder {
        /// 请求的阶数.
        order: usize,
        /// 支持的最大阶数.
        capacity: usize,
    },

    /// LU 分解遇到精确为零的主元.
    Singular,

    /// 条件数估计超过上限, 视为数值奇异. 字段为估计值.
    IllConditioned(f64),

    /// Jacobi 旋转次数超过上限.
    NotConverged {
        /// 失败时已执行的旋转次数.
        rotations: usize,
    },

    /// 直方图为空, 或 ROI 中没有任何体素.
    EmptyRegion,

    /// 方向数为 0.
    NoDirections,

    /// 方向数不足以拟合椭球.
    TooFewDirections {
        /// 最少需要的方向数.
        needed: usize,
        /// 实际方向数.
        got: usize,
    },

    /// 所有测试线上都没有发生相变, MIL 无定义.
    NoIntersections,

    /// 体素值不是合法相位 (0 或 1).
    InvalidPhase(u8),

    /// 输入数组形状不一致.
    ShapeMismatch,

    /// 无法识别的描述子名称.
    UnknownDescriptor(String),
}

impl fmt::Display for MorphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOrder { order, capacity } => {
                write!(f, "matrix order {order} exceeds solver capacity {capacity}")
            }
            Self::Singular => write!(f, "matrix is singular"),
            Self::IllConditioned(cond) => {
                write!(f, "matrix is numerically singular (condition estimate {cond:e})")
            }
            Self::NotConverged { rotations } => {
                write!(f, "jacobi solver did not converge after {rotations} rotations")
            }
            Self::EmptyRegion => write!(f, "region of interest is empty"),
            Self::NoDirections => write!(f, "no sampling directions requested"),
            Self::TooFewDirections { needed, got } => {
                write!(f, "ellipsoid fit needs at least {needed} directions, got {got}")
            }
            Self::NoIntersections => write!(f, "no phase transitions along any test line"),
            Self::InvalidPhase(v) => write!(f, "voxel value {v} is not a binary phase"),
            Self::ShapeMismatch => write!(f, "array shapes do not match"),
            Self::UnknownDescriptor(name) => write!(f, "unknown descriptor `{name}`"),
        }
    }
}

impl std::error::Error for MorphError {}
