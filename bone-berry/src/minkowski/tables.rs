//! 积分几何估计量使用的查找表.
//!
//! 13 个方向类依次为: 3 个坐标轴, 6 个面对角线, 4 个体对角线.
//! 表中的角点均以构型编码中的位权表示.

use once_cell::sync::Lazy;

use crate::consts::CONFIGURATIONS;

/// 方向类个数.
pub const DIRECTION_CLASSES: usize = 13;

/// 各方向类的立体角权重.
pub const DIRECTION_WEIGHTS: [f64; DIRECTION_CLASSES] = [
    0.045778, 0.045778, 0.045778, // 轴
    0.036981, 0.036981, 0.036981, 0.036981, 0.036981, 0.036981, // 面对角线
    0.035196, 0.035196, 0.035196, 0.035196, // 体对角线
];

/// 每个方向类对应的一条棱的两个端点.
pub const EDGE_PAIRS: [(u8, u8); DIRECTION_CLASSES] = [
    (1, 2),
    (1, 4),
    (1, 16),
    (1, 8),
    (2, 4),
    (1, 32),
    (2, 16),
    (1, 64),
    (4, 16),
    (1, 128),
    (2, 64),
    (4, 32),
    (8, 16),
];

/// 前 9 个方向类对应的单元内正方形截面 (按环绕顺序).
pub const SQUARES: [[u8; 4]; 9] = [
    [1, 2, 4, 8],
    [1, 2, 16, 32],
    [1, 4, 16, 64],
    [1, 2, 64, 128],
    [4, 16, 8, 32],
    [1, 32, 4, 128],
    [2, 8, 16, 64],
    [2, 4, 32, 64],
    [1, 16, 8, 128],
];

/// 体对角线方向类的三角形截面. 第 `i` 类的 "孤立角点" 三角形为
/// `TRIANGLES[i]`, "两点相连" 三角形为 `TRIANGLES[i + 4]`.
pub const TRIANGLES: [[u8; 3]; 8] = [
    [1, 64, 32],
    [2, 16, 128],
    [8, 64, 32],
    [4, 16, 128],
    [2, 4, 128],
    [8, 1, 64],
    [2, 4, 16],
    [8, 1, 32],
];

/// 欧拉示性数的局部贡献.
#[rustfmt::skip]
pub const EULER_WEIGHTS: [i8; CONFIGURATIONS] = [
    0, 1, 0, 0, 0, 0, 0, -1, 0, 1, 0, 0, 0, 0, 0, 0,
    0, 0, 0, -1, 0, -1, 0, -2, 0, 0, 0, -1, 0, -1, 0, -1,
    0, 1, 0, 0, 0, 0, 0, -1, 0, 1, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, -1, 0, -1, 0, 0, 0, 0, 0, -1, 0, 0,
    0, 1, 0, 0, 0, 0, 0, -1, 0, 1, 0, 0, 0, 0, 0, 0,
    0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, 0,
    0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
    0, 1, 0, 0, 0, 0, 0, -1, 0, 1, 0, 0, 0, 0, 0, 0,
    0, 0, 0, -1, 0, -1, 0, -2, 0, 0, 0, -1, 0, -1, 0, -1,
    0, 1, 0, 0, 0, 0, 0, -1, 0, 1, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, -1, 0, -1, 0, 0, 0, 0, 0, -1, 0, 0,
    0, 1, 0, 0, 0, 0, 0, -1, 0, 1, 0, 0, 0, 0, 0, 0,
    0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, 0,
    0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// 高斯曲率积分的局部贡献 (以 `π / 6` 为单位).
#[rustfmt::skip]
pub const GAUSS_WEIGHTS: [i8; CONFIGURATIONS] = [
    0, 3, 3, 0, 3, 0, 6, -3, 3, 6, 0, -3, 0, -3, -3, 0,
    3, 0, 6, -3, 6, -3, 9, -6, 6, 3, 3, -6, 3, -6, 0, -3,
    3, 6, 0, -3, 6, 3, 3, -6, 6, 9, -3, -6, 3, 0, -6, -3,
    0, -3, -3, 0, 3, -6, 0, -3, 3, 0, -6, -3, 0, -8, -8, 0,
    3, 6, 6, 3, 0, -3, 3, -6, 6, 9, 3, 0, -3, -6, -6, -3,
    0, -3, 3, -6, -3, 0, 0, -3, 3, 0, 0, -8, -6, -3, -8, 0,
    6, 9, 3, 0, 3, 0, 0, -8, 9, 12, 0, -3, 0, -3, -8, -6,
    -3, -6, -6, -3, -6, -3, -8, 0, 0, -3, -8, -6, -8, -6, -12, 3,
    3, 6, 6, 3, 6, 3, 9, 0, 0, 3, -3, -6, -3, -6, -6, -3,
    6, 3, 9, 0, 9, 0, 12, -3, 3, 0, 0, -8, 0, -8, -3, -6,
    0, 3, -3, -6, 3, 0, 0, -8, -3, 0, 0, -3, -6, -8, -3, 0,
    -3, -6, -6, -3, 0, -8, -3, -6, -6, -8, -3, 0, -8, -12, -6, 3,
    0, 3, 3, 0, -3, -6, 0, -8, -3, 0, -6, -8, 0, -3, -3, 0,
    -3, -6, 0, -8, -6, -3, -3, -6, -6, -8, -8, -12, -3, 0, -6, 3,
    -3, 0, -6, -8, -6, -8, -8, -12, -6, -3, -3, -6, -3, -6, 0, 3,
    0, -3, -3, 0, -3, 0, -6, 3, -3, -6, 0, 3, 0, 3, 3, 0,
];

#[inline]
const fn has(code: u8, corner: u8) -> bool {
    code & corner == corner
}

#[inline]
const fn lacks(code: u8, corner: u8) -> bool {
    code & corner == 0
}

/// `EDGE_TRANSITIONS[k][ny]`: 编码 `k` 在第 `ny` 类的棱上是否恰有一个端点为骨.
pub static EDGE_TRANSITIONS: Lazy<[[u8; DIRECTION_CLASSES]; CONFIGURATIONS]> = Lazy::new(|| {
    let mut t = [[0; DIRECTION_CLASSES]; CONFIGURATIONS];
    for (k, row) in t.iter_mut().enumerate() {
        let k = k as u8;
        for (ny, &(a, b)) in EDGE_PAIRS.iter().enumerate() {
            row[ny] = u8::from(has(k, a) != has(k, b));
        }
    }
    t
});

/// `CURVATURE_INDICATORS[k][ny]`: 编码 `k` 在第 `ny` 类截面上的
/// "凸角点" 个数减去 "凹角点" 个数.
pub static CURVATURE_INDICATORS: Lazy<[[i8; DIRECTION_CLASSES]; CONFIGURATIONS]> =
    Lazy::new(|| {
        let mut t = [[0; DIRECTION_CLASSES]; CONFIGURATIONS];
        for (k, row) in t.iter_mut().enumerate() {
            let k = k as u8;
            for (ny, q) in SQUARES.iter().enumerate() {
                row[ny] = (0..4)
                    .map(|i| {
                        let (a, b, c, d) = (q[i], q[(i + 1) % 4], q[(i + 2) % 4], q[(i + 3) % 4]);
                        let convex = has(k, a) && lacks(k, b) && lacks(k, c) && lacks(k, d);
                        let concave = has(k, a) && has(k, b) && has(k, c) && lacks(k, d);
                        i8::from(convex) - i8::from(concave)
                    })
                    .sum();
            }
            for ny in 9..DIRECTION_CLASSES {
                let (lone, pair) = (&TRIANGLES[ny - 9], &TRIANGLES[ny - 5]);
                row[ny] = (0..3)
                    .map(|i| {
                        let convex = has(k, lone[i])
                            && lacks(k, lone[(i + 1) % 3])
                            && lacks(k, lone[(i + 2) % 3]);
                        let concave = has(k, pair[i])
                            && has(k, pair[(i + 1) % 3])
                            && lacks(k, pair[(i + 2) % 3]);
                        i8::from(convex) - i8::from(concave)
                    })
                    .sum();
            }
        }
        t
    });
