//! 对 `bone-berry::data::phantom` 的更一层封装. 提供消融实验使用的合成体模集合.

use bone_berry::data::phantom::{self, Axis3};
use bone_berry::BinaryVolume;
use std::env;

/// 体模边长的默认值 (单位: 体素).
pub const DEFAULT_EDGE: usize = 48;

/// 获取体模边长.
///
/// 1. 若环境变量 `$BONE_PHANTOM_EDGE` 是不小于 16 的整数, 则返回其值;
/// 2. 否则, 返回 [`DEFAULT_EDGE`].
pub fn edge_from_env_or_default() -> usize {
    env::var("BONE_PHANTOM_EDGE")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .filter(|e| *e >= 16)
        .unwrap_or(DEFAULT_EDGE)
}

/// 体模名称, 与 [`phantom_loader`] 的产出顺序一致.
pub const PHANTOM_NAMES: [&str; 6] = ["solid", "plates", "rods", "shells", "ring", "hollow"];

/// 按 [`PHANTOM_NAMES`] 的顺序惰性生成边长为 `edge` 的立方体体模.
///
/// `edge` 小于 16 时 panic.
pub fn phantom_loader(edge: usize) -> impl Iterator<Item = (&'static str, BinaryVolume)> {
    assert!(edge >= 16, "体模边长过小");
    let shape = (edge, edge, edge);
    let c = edge / 2;
    let center = (c, c, c);
    let r = edge as f64 / 2.0;
    PHANTOM_NAMES.into_iter().map(move |name| {
        let v = match name {
            "solid" => phantom::solid(shape),
            "plates" => phantom::plates(shape, Axis3::Z, 6, 2),
            "rods" => phantom::rods(shape, Axis3::X, 6, 2),
            "shells" => phantom::concentric_shells(shape, center, 6, 2),
            "ring" => phantom::ring(shape, center, 0.6 * r, 0.2 * r),
            _ => phantom::shell(shape, center, 0.4 * r, 0.8 * r),
        };
        (name, v)
    })
}

/// 以 `$BONE_PHANTOM_EDGE` 或默认边长生成体模集合.
#[inline]
pub fn phantom_loader_from_env_or_default() -> impl Iterator<Item = (&'static str, BinaryVolume)> {
    phantom_loader(edge_from_env_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 体模按名称顺序产出, 且形状正确.
    #[test]
    fn test_loader() {
        let all: Vec<_> = phantom_loader(16).collect();
        assert_eq!(all.len(), PHANTOM_NAMES.len());
        for ((name, v), expect) in all.iter().zip(PHANTOM_NAMES) {
            assert_eq!(*name, expect);
            assert_eq!(v.shape(), (16, 16, 16));
        }
        assert_eq!(all[0].1.count_bone(), 16 * 16 * 16);
    }
}
