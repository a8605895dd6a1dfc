//! 小规模稠密线性代数.
//!
//! 椭球拟合只需要求解 6 阶法方程, 特征分解只需要处理 3 阶对称矩阵,
//! 因此所有矩阵都放在固定容量的栈上缓冲区中, 阶数在运行时指定.

mod jacobi;
mod lu;

use std::ops::{Index, IndexMut};

use crate::consts::MAX_ORDER;
use crate::error::MorphError;
use crate::MorphResult;

pub use jacobi::{jacobi_eigen, EigenDecomposition};
pub use lu::{invert, lu_decompose, lu_solve, solve, LuInfo, Pivots};

/// 固定容量的向量缓冲区. 只有前 `order` 个元素有意义.
pub type Vector = [f64; MAX_ORDER];

/// 阶数不超过 [`MAX_ORDER`] 的方阵, 行优先存储在栈上.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenseMatrix {
    data: [[f64; MAX_ORDER]; MAX_ORDER],
    order: usize,
}

impl DenseMatrix {
    /// 创建 `order` 阶零矩阵.
    ///
    /// `order` 为 0 或超过 [`MAX_ORDER`] 时返回 `Err`.
    pub fn zeros(order: usize) -> MorphResult<Self> {
        if order == 0 || order > MAX_ORDER {
            return Err(MorphError::InvalidOrder {
                order,
                capacity: MAX_ORDER,
            });
        }
        Ok(Self {
            data: [[0.0; MAX_ORDER]; MAX_ORDER],
            order,
        })
    }

    /// 创建 `order` 阶单位矩阵.
    pub fn identity(order: usize) -> MorphResult<Self> {
        let mut m = Self::zeros(order)?;
        for i in 0..order {
            m.data[i][i] = 1.0;
        }
        Ok(m)
    }

    /// 以 `f(row, col)` 填充 `order` 阶矩阵.
    pub fn from_fn<F: FnMut(usize, usize) -> f64>(order: usize, mut f: F) -> MorphResult<Self> {
        let mut m = Self::zeros(order)?;
        for i in 0..order {
            for j in 0..order {
                m.data[i][j] = f(i, j);
            }
        }
        Ok(m)
    }

    /// 从行切片构造方阵. 每一行的长度必须等于行数, 否则返回 `Err`.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> MorphResult<Self> {
        let order = rows.len();
        if rows.iter().any(|r| r.as_ref().len() != order) {
            return Err(MorphError::ShapeMismatch);
        }
        Self::from_fn(order, |i, j| rows[i].as_ref()[j])
    }

    /// 矩阵阶数.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// 转置.
    pub fn transpose(&self) -> Self {
        let mut t = *self;
        for i in 0..self.order {
            for j in 0..self.order {
                t.data[i][j] = self.data[j][i];
            }
        }
        t
    }

    /// 矩阵乘法. 两个矩阵阶数不一致时返回 `Err`.
    pub fn matmul(&self, rhs: &Self) -> MorphResult<Self> {
        if self.order != rhs.order {
            return Err(MorphError::ShapeMismatch);
        }
        let n = self.order;
        Self::from_fn(n, |i, j| (0..n).map(|k| self.data[i][k] * rhs.data[k][j]).sum())
    }

    /// 矩阵与向量 `x` (取前 `order` 个元素) 相乘.
    pub fn mul_vec(&self, x: &[f64]) -> Vector {
        let mut y = [0.0; MAX_ORDER];
        for (i, yi) in y.iter_mut().enumerate().take(self.order) {
            *yi = (0..self.order).map(|k| self.data[i][k] * x[k]).sum();
        }
        y
    }

    /// 列 1-范数 (各列绝对值之和的最大值).
    pub fn norm_1(&self) -> f64 {
        (0..self.order)
            .map(|j| (0..self.order).map(|i| self.data[i][j].abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }

    /// 获得第 `j` 列.
    pub fn column(&self, j: usize) -> Vector {
        let mut c = [0.0; MAX_ORDER];
        for (i, ci) in c.iter_mut().enumerate().take(self.order) {
            *ci = self.data[i][j];
        }
        c
    }

    /// 与 `other` 逐元素比较, 最大绝对误差不超过 `tol` 时返回 `true`.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.order == other.order
            && (0..self.order)
                .all(|i| (0..self.order).all(|j| (self.data[i][j] - other.data[i][j]).abs() <= tol))
    }
}

/// `(row, col)` 索引. 越过容量时 panic, 越过阶数但未越过容量时不检查.
impl Index<(usize, usize)> for DenseMatrix {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[i][j]
    }
}

impl IndexMut<(usize, usize)> for DenseMatrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        &mut self.data[i][j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 阶数越界时返回错误而不是 panic.
    #[test]
    fn test_invalid_order() {
        assert_eq!(
            DenseMatrix::zeros(0).unwrap_err(),
            MorphError::InvalidOrder {
                order: 0,
                capacity: MAX_ORDER
            }
        );
        assert!(DenseMatrix::zeros(MAX_ORDER + 1).is_err());
        assert!(DenseMatrix::zeros(MAX_ORDER).is_ok());
        assert_eq!(
            DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err(),
            MorphError::ShapeMismatch
        );
    }

    /// 基本矩阵运算.
    #[test]
    fn test_basic_ops() {
        let a = DenseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let i = DenseMatrix::identity(2).unwrap();
        assert_eq!(a.matmul(&i).unwrap(), a);
        assert_eq!(a.transpose()[(0, 1)], 3.0);
        assert_eq!(a.norm_1(), 6.0);

        let y = a.mul_vec(&[1.0, 1.0]);
        assert_eq!(&y[..2], &[3.0, 7.0]);
        assert_eq!(&a.column(1)[..2], &[2.0, 4.0]);
    }
}
