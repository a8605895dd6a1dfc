//! 随机测试方向.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 一组测试方向. 第 `i` 个方向由极角 `theta[i]` 与方位角 `phi[i]` 描述, 均属于 `[0, π)`.
///
/// 方向向量在 `(x, y, z)` 坐标下为 `(cos φ sin θ, sin φ sin θ, cos θ)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DirectionSet {
    theta: Vec<f64>,
    phi: Vec<f64>,
}

impl DirectionSet {
    /// 由给定的随机数发生器依次抽取 `n` 个方向. 每个方向先抽极角, 再抽方位角.
    pub fn generate<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let mut theta = Vec::with_capacity(n);
        let mut phi = Vec::with_capacity(n);
        for _ in 0..n {
            theta.push(rng.gen::<f64>() * PI);
            phi.push(rng.gen::<f64>() * PI);
        }
        Self { theta, phi }
    }

    /// 以种子 `seed` 新建 [`StdRng`] 并抽取 `n` 个方向. 相同的 `(n, seed)` 得到相同的结果.
    pub fn from_seed(n: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::generate(n, &mut rng)
    }

    /// 由显式角度构造.
    ///
    /// 两个数组长度不同时 panic.
    pub fn from_angles(theta: Vec<f64>, phi: Vec<f64>) -> Self {
        assert_eq!(theta.len(), phi.len(), "极角与方位角个数不一致");
        Self { theta, phi }
    }

    /// 方向个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.theta.len()
    }

    /// 是否不含任何方向.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.theta.is_empty()
    }

    /// 全部极角.
    #[inline]
    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    /// 全部方位角.
    #[inline]
    pub fn phi(&self) -> &[f64] {
        &self.phi
    }

    /// 第 `i` 个方向的单位向量 `(x, y, z)`.
    #[inline]
    pub fn unit_vector(&self, i: usize) -> [f64; 3] {
        unit_vector(self.theta[i], self.phi[i])
    }

    /// 迭代全部 `(theta, phi)`.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (f64, f64)> + '_ {
        self.theta.iter().copied().zip(self.phi.iter().copied())
    }
}

/// 球坐标转单位向量 `(x, y, z)`.
#[inline]
pub fn unit_vector(theta: f64, phi: f64) -> [f64; 3] {
    let (st, ct) = theta.sin_cos();
    let (sp, cp) = phi.sin_cos();
    [cp * st, sp * st, ct]
}
