#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供基于体视学的骨小梁形态测量: 从二值化的 3D 体数据中的球形 / 立方体感兴趣区域出发,
//! 计算骨体积分数, 比表面积, 骨小梁厚度 / 间距 / 数目, 欧拉数, 结构模型指数,
//! 以及由平均截距长度 (MIL) 椭球给出的各向异性主轴.
//!
//! 该 crate 目前仅提供 `safe` 接口, 且不依赖任何外部线性代数库.
//!
//! # 注意
//!
//! 1. 三维数组一律按 `(z, y, x)` 索引; 涉及物理方向的向量 (如 MIL 主方向) 一律按 `(x, y, z)` 给出.
//! 2. 在非期望情况下 (调用方传入非法参数), 程序会直接 panic, 而不会导致内存错误. As what Rust promises.
//!    依赖于数据的退化情形 (空区域, 奇异矩阵, 不收敛等) 以 [`MorphError`] 返回.
//!
//! # 开发计划
//!
//! ### 小规模稠密线性代数 ✅
//!
//! 带部分主元的 LU 分解, 1-范数条件数估计, 求解与求逆; 循环 Jacobi 对称特征分解.
//!
//! 实现位于 `bone-berry/src/linalg`.
//!
//! ### 2x2x2 构型直方图 ✅
//!
//! 两种采样策略: 立方体 (逐单元) 与球形 (逐体素距离判定).
//!
//! 实现位于 `bone-berry/src/histogram.rs`.
//!
//! ### Minkowski 泛函估计 ✅
//!
//! 体积分数, 表面积密度, 平均曲率积分, 欧拉数, 高斯曲率积分. 全部是查表的线性组合.
//!
//! 实现位于 `bone-berry/src/minkowski`.
//!
//! ### MIL 采样与椭球拟合 ✅
//!
//! 1. 方向由显式种子的随机数发生器生成, 相同种子结果逐位相同. ✅
//! 2. 测试线越出窗口的部分按背景处理. ✅
//! 3. 主轴按 MIL 降序排列, 特征向量 / 各向异性度 / 特征值保持配对. ✅
//! 4. 平行板模型直接由截距给出 `Tb.Th` 等指标. ✅
//!
//! 实现位于 `bone-berry/src/mil`.
//!
//! ### 描述子选择与网格扫描 ✅
//!
//! 按调用方给出的描述子顺序输出固定槽位; 在规则输出网格上逐格分析,
//! 失败的格子记录日志后置 0. 开启 `rayon` 功能时可并行扫描.
//!
//! 实现位于 `bone-berry/src/analysis`.
//!
//! ### 完善代码文档 ✅
//!
//! 给每个 public API 提供文档, 并视情况给 private
//! API 提供文档.

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 形态测量的计算结果.
pub type MorphResult<T> = Result<T, MorphError>;

pub mod consts;

mod error;

pub use error::MorphError;

pub mod linalg;

pub mod data;

pub use data::{BinaryVolume, Roi, ThresholdMode, Window};

pub mod histogram;

pub mod minkowski;

pub mod mil;

pub mod analysis;

pub mod prelude;
