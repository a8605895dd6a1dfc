//! 实对称矩阵的循环 Jacobi 特征分解.

use log::debug;

use super::{DenseMatrix, Vector};
use crate::consts::MAX_ORDER;
use crate::error::MorphError;
use crate::MorphResult;

/// 特征分解结果.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigenDecomposition {
    /// 收敛后的工作矩阵. 特征值位于对角线上.
    pub reduced: DenseMatrix,

    /// 正交特征向量矩阵, 第 `j` 列对应第 `j` 个特征值.
    pub vectors: DenseMatrix,

    /// 实际执行的平面旋转次数.
    pub rotations: usize,
}

impl EigenDecomposition {
    /// 特征值, 与 `vectors` 的列一一对应. 只有前 `order` 个元素有意义.
    pub fn values(&self) -> Vector {
        let mut v = [0.0; MAX_ORDER];
        for (k, vk) in v.iter_mut().enumerate().take(self.reduced.order()) {
            *vk = self.reduced[(k, k)];
        }
        v
    }
}

/// 对实对称矩阵 `a` 做特征分解.
///
/// 阈值 `u` 从非对角元素的平方和开方除以阶数开始, 每一级除以阶数,
/// 直到低于初始值的 `eps` 倍. 每一级内反复扫描, 直到所有非对角元素都小于 `u`;
/// 每一次旋转都会精确消去一个非对角元素.
///
/// 旋转次数超过 `max_rotations` 时返回 [`MorphError::NotConverged`].
///
/// # 注意
///
/// 只读取 `a` 的上下三角, 调用方需保证其对称, 否则结果无意义.
pub fn jacobi_eigen(
    a: &DenseMatrix,
    eps: f64,
    max_rotations: usize,
) -> MorphResult<EigenDecomposition> {
    let n = a.order();
    let mut w = *a;
    let mut v = DenseMatrix::identity(n)?;
    let mut rotations = 0;

    let off: f64 = (0..n)
        .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
        .map(|(i, j)| w[(i, j)] * w[(i, j)])
        .sum();
    let mut u = off.sqrt() / n as f64;
    let floor = eps * u;

    while floor < u {
        loop {
            let mut rotated = false;
            for p in 0..n.saturating_sub(1) {
                for q in p + 1..n {
                    if w[(p, q)].abs() < u {
                        continue;
                    }
                    rotate(&mut w, &mut v, p, q);
                    rotated = true;
                    rotations += 1;
                    if rotations > max_rotations {
                        return Err(MorphError::NotConverged { rotations });
                    }
                }
            }
            if !rotated {
                break;
            }
        }
        u /= n as f64;
    }

    debug!("jacobi_eigen: order = {n}, rotations = {rotations}");
    Ok(EigenDecomposition {
        reduced: w,
        vectors: v,
        rotations,
    })
}

/// 施加消去 `w[(p, q)]` 的平面旋转, 并累积到特征向量矩阵 `v` 上.
fn rotate(w: &mut DenseMatrix, v: &mut DenseMatrix, p: usize, q: usize) {
    let n = w.order();
    let apq = w[(p, q)];
    let (app, aqq) = (w[(p, p)], w[(q, q)]);

    // 半角公式, 避免对角元接近时的抵消误差
    let alpha = 0.5 * (app - aqq);
    let beta = (apq * apq + alpha * alpha).sqrt();
    let c = (0.5 + alpha.abs() / (2.0 * beta)).sqrt();
    let sgn = if alpha < 0.0 { -1.0 } else { 1.0 };
    let s = -sgn * apq / (2.0 * beta * c);

    for j in (0..n).filter(|&j| j != p && j != q) {
        let (wpj, wqj) = (w[(p, j)], w[(q, j)]);
        let new_p = c * wpj - s * wqj;
        let new_q = s * wpj + c * wqj;
        w[(p, j)] = new_p;
        w[(j, p)] = new_p;
        w[(q, j)] = new_q;
        w[(j, q)] = new_q;
    }
    for j in 0..n {
        let (vjp, vjq) = (v[(j, p)], v[(j, q)]);
        v[(j, p)] = c * vjp - s * vjq;
        v[(j, q)] = s * vjp + c * vjq;
    }

    w[(p, p)] = c * c * app + s * s * aqq - 2.0 * c * s * apq;
    w[(q, q)] = s * s * app + c * c * aqq + 2.0 * c * s * apq;
    w[(p, q)] = 0.0;
    w[(q, p)] = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{JACOBI_EPS, JACOBI_MAX_ROTATIONS};
    use ordered_float::OrderedFloat;

    fn sorted_values(e: &EigenDecomposition) -> Vec<f64> {
        let mut v = e.values()[..e.reduced.order()].to_vec();
        v.sort_by_key(|x| OrderedFloat(*x));
        v
    }

    fn assert_orthogonal(v: &DenseMatrix) {
        let id = DenseMatrix::identity(v.order()).unwrap();
        assert!(v.transpose().matmul(v).unwrap().approx_eq(&id, 1e-9));
    }

    /// 对角矩阵不需要任何旋转.
    #[test]
    fn test_diagonal() {
        let a = DenseMatrix::from_rows(&[[3.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 2.0]])
            .unwrap();
        let e = jacobi_eigen(&a, JACOBI_EPS, JACOBI_MAX_ROTATIONS).unwrap();
        assert_eq!(e.rotations, 0);
        assert_eq!(sorted_values(&e), vec![-1.0, 2.0, 3.0]);
        assert_eq!(e.vectors, DenseMatrix::identity(3).unwrap());
    }

    /// 对已知对角阵做旋转相似变换, 应当恢复原特征值, 并且 `A V = V Λ`.
    #[test]
    fn test_rotated_diagonal() {
        let (t1, t2) = (0.4_f64, 1.1_f64);
        let r1 = DenseMatrix::from_rows(&[
            [t1.cos(), -t1.sin(), 0.0],
            [t1.sin(), t1.cos(), 0.0],
            [0.0, 0.0, 1.0],
        ])
        .unwrap();
        let r2 = DenseMatrix::from_rows(&[
            [1.0, 0.0, 0.0],
            [0.0, t2.cos(), -t2.sin()],
            [0.0, t2.sin(), t2.cos()],
        ])
        .unwrap();
        let r = r1.matmul(&r2).unwrap();
        let d = DenseMatrix::from_rows(&[[5.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 0.5]])
            .unwrap();
        let a = r.matmul(&d).unwrap().matmul(&r.transpose()).unwrap();

        let e = jacobi_eigen(&a, JACOBI_EPS, JACOBI_MAX_ROTATIONS).unwrap();
        let got = sorted_values(&e);
        for (g, want) in got.iter().zip([0.5, 2.0, 5.0]) {
            assert!((g - want).abs() < 1e-6, "{g} vs {want}");
        }
        assert_orthogonal(&e.vectors);

        let values = e.values();
        for j in 0..3 {
            let col = e.vectors.column(j);
            let av = a.mul_vec(&col);
            for i in 0..3 {
                assert!((av[i] - values[j] * col[i]).abs() < 1e-6);
            }
        }
    }

    /// 对角元相等时 (`alpha = 0`) 仍然能够消去非对角元.
    #[test]
    fn test_equal_diagonal() {
        let a = DenseMatrix::from_rows(&[[2.0, 1.0], [1.0, 2.0]]).unwrap();
        let e = jacobi_eigen(&a, JACOBI_EPS, JACOBI_MAX_ROTATIONS).unwrap();
        assert_eq!(e.rotations, 1);
        let got = sorted_values(&e);
        assert!((got[0] - 1.0).abs() < 1e-12);
        assert!((got[1] - 3.0).abs() < 1e-12);
        assert_orthogonal(&e.vectors);
    }

    /// 旋转次数上限.
    #[test]
    fn test_not_converged() {
        let a = DenseMatrix::from_rows(&[[1.0, 0.5, 0.2], [0.5, 2.0, 0.3], [0.2, 0.3, 3.0]])
            .unwrap();
        assert_eq!(
            jacobi_eigen(&a, JACOBI_EPS, 0).unwrap_err(),
            MorphError::NotConverged { rotations: 1 }
        );
        assert!(jacobi_eigen(&a, JACOBI_EPS, JACOBI_MAX_ROTATIONS).is_ok());
    }
}
