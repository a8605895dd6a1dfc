//! MIL 椭球拟合与主轴分析.
//!
//! 以最小二乘法将 `1 / MIL^2` 拟合为方向向量的二次型
//! `A x^2 + B y^2 + C z^2 + D xy + E yz + F xz`, 再对系数构成的对称张量做特征分解,
//! 得到三个主方向上的 MIL 以及各向异性度.

use std::cmp::Reverse;

use log::debug;
use ordered_float::OrderedFloat;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::DirectionSet;
use crate::consts::{MIL_SLOTS, MIN_FIT_DIRECTIONS};
use crate::error::MorphError;
use crate::linalg::{invert, jacobi_eigen, DenseMatrix};
use crate::MorphResult;

/// 二次型的系数个数.
const DEGREE: usize = 6;

/// 单位向量 `v = (x, y, z)` 对应的设计矩阵行 `[x², y², z², xy, yz, xz]`.
#[inline]
fn design_row([x, y, z]: [f64; 3]) -> [f64; DEGREE] {
    [x * x, y * y, z * z, x * y, y * z, x * z]
}

/// 椭球拟合结果: 6 个二次型系数和 4 个拟合优度统计量.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EllipsoidFit {
    /// 二次型系数 `[A, B, C, D, E, F]`.
    pub coefficients: [f64; DEGREE],

    /// 观测值与拟合值之间的相关系数.
    pub correlation: f64,

    /// 残差平方和.
    pub residual_sum_squares: f64,

    /// 残差标准差.
    pub std_dev: f64,

    /// 残差方差, 自由度为 `n - 7`.
    pub variance: f64,
}

impl EllipsoidFit {
    /// 拟合 `directions` 上的 MIL 样本 `mil`.
    ///
    /// 法方程 `(AᵗA) c = Aᵗb` 通过显式求逆求解, 条件数超过 `condition_limit` 时视为奇异.
    ///
    /// # 注意
    ///
    /// 1. `mil.len()` 必须等于方向个数, 否则程序 panic.
    /// 2. 方向为空时返回 [`MorphError::NoDirections`], 少于 8 个时返回
    ///    [`MorphError::TooFewDirections`].
    /// 3. 方向退化导致法方程奇异时, 返回线性求解器的错误.
    pub fn fit(directions: &DirectionSet, mil: &[f64], condition_limit: f64) -> MorphResult<Self> {
        assert_eq!(directions.len(), mil.len(), "MIL 个数与方向个数不一致");
        let n = mil.len();
        if n == 0 {
            return Err(MorphError::NoDirections);
        }
        if n < MIN_FIT_DIRECTIONS {
            return Err(MorphError::TooFewDirections {
                needed: MIN_FIT_DIRECTIONS,
                got: n,
            });
        }

        let rows: Vec<[f64; DEGREE]> = (0..n)
            .map(|i| design_row(directions.unit_vector(i)))
            .collect();
        let b: Vec<f64> = mil.iter().map(|m| 1.0 / (m * m)).collect();

        let ata = DenseMatrix::from_fn(DEGREE, |i, j| rows.iter().map(|r| r[i] * r[j]).sum())?;
        let mut atb = [0.0; DEGREE];
        for (r, bk) in rows.iter().zip(&b) {
            for (acc, a) in atb.iter_mut().zip(r) {
                *acc += a * bk;
            }
        }
        let atai = invert(&ata, condition_limit)?;
        let sol = atai.mul_vec(&atb);
        let mut coefficients = [0.0; DEGREE];
        coefficients.copy_from_slice(&sol[..DEGREE]);

        let fitted: Vec<f64> = rows
            .iter()
            .map(|r| r.iter().zip(&coefficients).map(|(a, c)| a * c).sum())
            .collect();
        let residual_sum_squares: f64 = b.iter().zip(&fitted).map(|(o, f)| (o - f).powi(2)).sum();

        let nf = n as f64;
        let b_mean = b.iter().sum::<f64>() / nf;
        let fit_mean = fitted.iter().sum::<f64>() / nf;
        let (mut cross, mut obs_sq, mut fit_sq) = (0.0, 0.0, 0.0);
        for (o, f) in b.iter().zip(&fitted) {
            let (eo, ef) = (o - b_mean, f - fit_mean);
            cross += eo * ef;
            obs_sq += eo * eo;
            fit_sq += ef * ef;
        }
        let denom = (obs_sq * fit_sq).sqrt();
        let correlation = if denom > 0.0 { cross / denom } else { 1.0 };

        let variance = residual_sum_squares / (nf - DEGREE as f64 - 1.0);
        debug!("ellipsoid fit: n = {n}, r = {correlation}, sqres = {residual_sum_squares:e}");

        Ok(Self {
            coefficients,
            correlation,
            residual_sum_squares,
            std_dev: variance.sqrt(),
            variance,
        })
    }

    /// 10 个标量: `[A, B, C, D, E, F, r, sqres, stdev, variance]`.
    pub fn to_array(&self) -> [f64; 10] {
        let c = &self.coefficients;
        [
            c[0],
            c[1],
            c[2],
            c[3],
            c[4],
            c[5],
            self.correlation,
            self.residual_sum_squares,
            self.std_dev,
            self.variance,
        ]
    }

    /// 二次型在方向 `v` 上的值, 即拟合得到的 `1 / MIL(v)^2`.
    #[inline]
    pub fn evaluate(&self, v: [f64; 3]) -> f64 {
        design_row(v)
            .iter()
            .zip(&self.coefficients)
            .map(|(a, c)| a * c)
            .sum()
    }

    /// 3 阶对称张量, 行列顺序为 `(x, y, z)`.
    pub fn tensor(&self) -> MorphResult<DenseMatrix> {
        let [a, b, c, d, e, f] = self.coefficients;
        DenseMatrix::from_rows(&[
            [a, d / 2.0, f / 2.0],
            [d / 2.0, b, e / 2.0],
            [f / 2.0, e / 2.0, c],
        ])
    }

    /// 对张量做 Jacobi 特征分解, 得到按 MIL 降序排列的主轴.
    pub fn principal_axes(&self, eps: f64, max_rotations: usize) -> MorphResult<PrincipalAxes> {
        let eigen = jacobi_eigen(&self.tensor()?, eps, max_rotations)?;
        let values = eigen.values();
        let mut vectors = [[0.0; 3]; 3];
        for (j, v) in vectors.iter_mut().enumerate() {
            let col = eigen.vectors.column(j);
            v.copy_from_slice(&col[..3]);
        }
        Ok(PrincipalAxes::from_eigen([values[0], values[1], values[2]], vectors))
    }
}

/// 按主 MIL 降序排列的三个主轴.
///
/// 同一下标的 MIL, 各向异性度, 方向与特征值来自同一个特征对.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrincipalAxes {
    /// 主 MIL `1 / sqrt(|λ|)`, 符号与特征值 `λ` 相同.
    pub magnitudes: [f64; 3],

    /// 各向异性度 `(|主 MIL| - 均值) / 均值`.
    pub degrees: [f64; 3],

    /// 单位主方向 `(x, y, z)`.
    pub vectors: [[f64; 3]; 3],

    /// 张量特征值.
    pub eigenvalues: [f64; 3],
}

impl PrincipalAxes {
    /// 由特征值与对应的特征向量构造并排序.
    ///
    /// 排序稳定: `|主 MIL|` 相同时保持原有顺序.
    pub fn from_eigen(eigenvalues: [f64; 3], vectors: [[f64; 3]; 3]) -> Self {
        let prin = eigenvalues.map(|l| 1.0 / l.abs().sqrt());
        let mean = prin.iter().sum::<f64>() / 3.0;
        let degrees = prin.map(|p| (p - mean) / mean);

        let mut order = [0, 1, 2];
        order.sort_by_key(|&i| Reverse(OrderedFloat(prin[i])));

        Self {
            magnitudes: order.map(|i| prin[i].copysign(eigenvalues[i])),
            degrees: order.map(|i| degrees[i]),
            vectors: order.map(|i| vectors[i]),
            eigenvalues: order.map(|i| eigenvalues[i]),
        }
    }

    /// `mil` 描述子的 12 个槽位: 三个主方向的 `(x, y, z)`, 然后是三个主 MIL.
    pub fn mil_slots(&self) -> [f64; MIL_SLOTS] {
        let mut out = [0.0; MIL_SLOTS];
        for (chunk, v) in out.chunks_exact_mut(3).zip(&self.vectors) {
            chunk.copy_from_slice(v);
        }
        out[9..].copy_from_slice(&self.magnitudes);
        out
    }
}
