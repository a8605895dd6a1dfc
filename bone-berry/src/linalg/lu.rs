//! 带部分主元的 LU 分解, 1-范数条件数估计, 以及基于它们的求解与求逆.
//!
//! 分解结果原地覆盖系数矩阵: 上三角部分为 `U`, 严格下三角部分为取负的消元乘子.

use log::debug;

use super::{DenseMatrix, Vector};
use crate::consts::MAX_ORDER;
use crate::error::MorphError;
use crate::MorphResult;

/// 分解过程中记录的行交换.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pivots {
    /// 第 `k` 步消元时与第 `k` 行交换的行号.
    index: [usize; MAX_ORDER],
    order: usize,
    /// 行交换次数是否为奇数.
    odd: bool,
}

impl Pivots {
    /// 第 `k` 步的主元行.
    #[inline]
    pub fn row(&self, k: usize) -> usize {
        self.index[k]
    }

    /// 行交换带来的行列式符号.
    #[inline]
    pub fn sign(&self) -> f64 {
        if self.odd {
            -1.0
        } else {
            1.0
        }
    }
}

/// LU 分解的附加信息.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuInfo {
    /// 主元记录.
    pub pivots: Pivots,

    /// 1-范数条件数估计, 不小于 1.
    pub condition: f64,
}

impl LuInfo {
    /// 由分解后的矩阵 `lu` 计算原矩阵的行列式.
    pub fn determinant(&self, lu: &DenseMatrix) -> f64 {
        (0..lu.order()).fold(self.pivots.sign(), |acc, k| acc * lu[(k, k)])
    }
}

/// 对 `a` 做原地 LU 分解并估计条件数.
///
/// 任一主元精确为 0 时返回 [`MorphError::Singular`], 此时 `a` 的内容无意义.
pub fn lu_decompose(a: &mut DenseMatrix) -> MorphResult<LuInfo> {
    let n = a.order();
    let mut pivots = Pivots {
        index: [0; MAX_ORDER],
        order: n,
        odd: false,
    };

    if n == 1 {
        if a[(0, 0)] == 0.0 {
            return Err(MorphError::Singular);
        }
        return Ok(LuInfo {
            pivots,
            condition: 1.0,
        });
    }

    let anorm = a.norm_1();

    for k in 0..n - 1 {
        // 并列时取最靠上的行
        let mut m = k;
        for i in k + 1..n {
            if a[(i, k)].abs() > a[(m, k)].abs() {
                m = i;
            }
        }
        pivots.index[k] = m;
        if m != k {
            pivots.odd = !pivots.odd;
        }

        let t = a[(m, k)];
        a[(m, k)] = a[(k, k)];
        a[(k, k)] = t;
        if t == 0.0 {
            return Err(MorphError::Singular);
        }

        for i in k + 1..n {
            a[(i, k)] = -a[(i, k)] / t;
        }
        for j in k + 1..n {
            let t = a[(m, j)];
            a[(m, j)] = a[(k, j)];
            a[(k, j)] = t;
            if t != 0.0 {
                for i in k + 1..n {
                    a[(i, j)] += a[(i, k)] * t;
                }
            }
        }
    }
    pivots.index[n - 1] = n - 1;
    if a[(n - 1, n - 1)] == 0.0 {
        return Err(MorphError::Singular);
    }

    // 求解 `Aᵗ y = e`, `e` 的各分量取 ±1 以使 `y` 尽量增长.
    let mut work: Vector = [0.0; MAX_ORDER];
    for k in 0..n {
        let t: f64 = (0..k).map(|i| a[(i, k)] * work[i]).sum();
        let ek = if t < 0.0 { -1.0 } else { 1.0 };
        work[k] = -(ek + t) / a[(k, k)];
    }
    for k in (0..n - 1).rev() {
        work[k] += (k + 1..n).map(|i| a[(i, k)] * work[i]).sum::<f64>();
        work.swap(k, pivots.index[k]);
    }
    let ynorm: f64 = work[..n].iter().map(|v| v.abs()).sum();

    // 再求解 `A z = y`.
    lu_solve(a, &pivots, &mut work)?;
    let znorm: f64 = work[..n].iter().map(|v| v.abs()).sum();

    let condition = (anorm * znorm / ynorm).max(1.0);
    debug!("lu_decompose: order = {n}, condition = {condition:e}");
    Ok(LuInfo { pivots, condition })
}

/// 以 [`lu_decompose`] 的结果原地求解 `A x = b`, `b` 的前 `order` 个元素被替换为解.
///
/// 对角主元为 0 时返回 [`MorphError::Singular`].
///
/// # 注意
///
/// `b.len()` 必须不小于矩阵阶数, 否则程序 panic.
pub fn lu_solve(lu: &DenseMatrix, pivots: &Pivots, b: &mut [f64]) -> MorphResult<()> {
    let n = lu.order();
    assert_eq!(n, pivots.order, "主元记录与矩阵阶数不一致");
    assert!(b.len() >= n);

    if (0..n).any(|k| lu[(k, k)] == 0.0) {
        return Err(MorphError::Singular);
    }

    // 前代
    for k in 0..n - 1 {
        let m = pivots.index[k];
        b.swap(m, k);
        let t = b[k];
        for i in k + 1..n {
            b[i] += lu[(i, k)] * t;
        }
    }

    // 回代
    for k in (0..n).rev() {
        b[k] /= lu[(k, k)];
        let t = -b[k];
        for i in 0..k {
            b[i] += lu[(i, k)] * t;
        }
    }
    Ok(())
}

/// 求解 `A x = b`, 不修改 `a`.
pub fn solve(a: &DenseMatrix, b: &[f64]) -> MorphResult<Vector> {
    let mut lu = *a;
    let info = lu_decompose(&mut lu)?;
    let mut x: Vector = [0.0; MAX_ORDER];
    x[..a.order()].copy_from_slice(&b[..a.order()]);
    lu_solve(&lu, &info.pivots, &mut x)?;
    Ok(x)
}

/// 逐列求解 `A x = e_j` 得到 `a` 的逆矩阵.
///
/// 条件数估计超过 `limit` 时返回 [`MorphError::IllConditioned`].
pub fn invert(a: &DenseMatrix, limit: f64) -> MorphResult<DenseMatrix> {
    let n = a.order();
    let mut lu = *a;
    let info = lu_decompose(&mut lu)?;
    if info.condition > limit {
        return Err(MorphError::IllConditioned(info.condition));
    }

    let mut inv = DenseMatrix::zeros(n)?;
    for j in 0..n {
        let mut e: Vector = [0.0; MAX_ORDER];
        e[j] = 1.0;
        lu_solve(&lu, &info.pivots, &mut e)?;
        for (i, v) in e.iter().enumerate().take(n) {
            inv[(i, j)] = *v;
        }
    }
    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CONDITION_LIMIT;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// 对角占优的随机矩阵, 保证良态.
    fn random_matrix(rng: &mut StdRng, n: usize) -> DenseMatrix {
        let mut m = DenseMatrix::from_fn(n, |_, _| rng.gen_range(-1.0..1.0)).unwrap();
        for i in 0..n {
            m[(i, i)] += n as f64 + 1.0;
        }
        m
    }

    /// 已知解的小方程组.
    #[test]
    fn test_solve_known() {
        let a = DenseMatrix::from_rows(&[[2.0, 1.0, -1.0], [-3.0, -1.0, 2.0], [-2.0, 1.0, 2.0]])
            .unwrap();
        let x = solve(&a, &[8.0, -11.0, -3.0]).unwrap();
        assert!(f64_eq(x[0], 2.0));
        assert!(f64_eq(x[1], 3.0));
        assert!(f64_eq(x[2], -1.0));
    }

    /// 随机良态矩阵: 代回残差足够小, 并且 `A * inv(A) = I`.
    #[test]
    fn test_solve_and_invert_random() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..=MAX_ORDER {
            for _ in 0..20 {
                let a = random_matrix(&mut rng, n);
                let b: Vec<f64> = (0..n).map(|_| rng.gen_range(-5.0..5.0)).collect();
                let x = solve(&a, &b).unwrap();
                let ax = a.mul_vec(&x);
                for i in 0..n {
                    assert!((ax[i] - b[i]).abs() < 1e-9);
                }

                let inv = invert(&a, CONDITION_LIMIT).unwrap();
                let id = DenseMatrix::identity(n).unwrap();
                assert!(a.matmul(&inv).unwrap().approx_eq(&id, 1e-9));
            }
        }
    }

    /// 行交换后的行列式与条件数下界.
    #[test]
    fn test_determinant_and_condition() {
        let a = DenseMatrix::from_rows(&[[0.0, 1.0], [1.0, 0.0]]).unwrap();
        let mut lu = a;
        let info = lu_decompose(&mut lu).unwrap();
        assert!(f64_eq(info.determinant(&lu), -1.0));
        assert!(f64_eq(info.condition, 1.0));

        let a = DenseMatrix::from_rows(&[[4.0, 3.0], [6.0, 3.0]]).unwrap();
        let mut lu = a;
        let info = lu_decompose(&mut lu).unwrap();
        assert!(f64_eq(info.determinant(&lu), -6.0));
        assert!(info.condition >= 1.0);
    }

    /// 1 阶矩阵直接处理.
    #[test]
    fn test_order_one() {
        let a = DenseMatrix::from_rows(&[[4.0]]).unwrap();
        let x = solve(&a, &[2.0]).unwrap();
        assert!(f64_eq(x[0], 0.5));
        let inv = invert(&a, CONDITION_LIMIT).unwrap();
        assert!(f64_eq(inv[(0, 0)], 0.25));

        let z = DenseMatrix::from_rows(&[[0.0]]).unwrap();
        assert_eq!(solve(&z, &[1.0]).unwrap_err(), MorphError::Singular);
    }

    /// 精确奇异与数值奇异.
    #[test]
    fn test_singular() {
        let a = DenseMatrix::from_rows(&[[1.0, 2.0], [2.0, 4.0]]).unwrap();
        assert_eq!(invert(&a, CONDITION_LIMIT).unwrap_err(), MorphError::Singular);

        let zero_col = DenseMatrix::from_rows(&[[0.0, 1.0], [0.0, 2.0]]).unwrap();
        assert_eq!(solve(&zero_col, &[1.0, 1.0]).unwrap_err(), MorphError::Singular);

        let near = DenseMatrix::from_rows(&[[1.0, 1.0], [1.0, 1.0 + 1e-12]]).unwrap();
        assert!(matches!(
            invert(&near, 1e6).unwrap_err(),
            MorphError::IllConditioned(c) if c > 1e6
        ));
    }
}
