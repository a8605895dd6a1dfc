//! 可输出的形态学描述子, 以及它们在输出向量中的槽位.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::MIL_SLOTS;
use crate::error::MorphError;

/// 形态学描述子.
///
/// 调用方给出的描述子顺序即输出槽位顺序.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Descriptor {
    /// 骨体积分数 `BV/TV`.
    Bvtv,

    /// 比表面积 `BS/BV` (单位: 1/毫米).
    Bsbv,

    /// 骨小梁厚度 `Tb.Th` (单位: 毫米).
    Tbth,

    /// 骨小梁间距 `Tb.Sp` (单位: 毫米).
    Tbsp,

    /// 骨小梁数目 `Tb.N` (单位: 1/毫米).
    Tbn,

    /// 欧拉数密度.
    Euler,

    /// 结构模型指数.
    Smi,

    /// 三个主方向与三个主 MIL, 共 12 个槽位.
    Mil,

    /// 骨体积 (单位: 立方毫米).
    Bv,

    /// 总体积 (单位: 立方毫米).
    Tv,

    /// 骨表面积 (单位: 平方毫米).
    Bs,

    /// 三个各向异性度, 共 3 个槽位.
    Da,
}

impl Descriptor {
    /// 全部描述子.
    pub const ALL: [Descriptor; 12] = [
        Self::Bvtv,
        Self::Bsbv,
        Self::Tbth,
        Self::Tbsp,
        Self::Tbn,
        Self::Euler,
        Self::Smi,
        Self::Mil,
        Self::Bv,
        Self::Tv,
        Self::Bs,
        Self::Da,
    ];

    /// 小写名称.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bvtv => "bvtv",
            Self::Bsbv => "bsbv",
            Self::Tbth => "tbth",
            Self::Tbsp => "tbsp",
            Self::Tbn => "tbn",
            Self::Euler => "euler",
            Self::Smi => "smi",
            Self::Mil => "mil",
            Self::Bv => "bv",
            Self::Tv => "tv",
            Self::Bs => "bs",
            Self::Da => "da",
        }
    }

    /// 占据的槽位数.
    pub const fn width(self) -> usize {
        match self {
            Self::Mil => MIL_SLOTS,
            Self::Da => 3,
            _ => 1,
        }
    }

    /// 是否需要 MIL 采样与椭球拟合.
    #[inline]
    pub const fn needs_anisotropy(self) -> bool {
        matches!(self, Self::Mil | Self::Da)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Descriptor {
    type Err = MorphError;

    /// 按小写名称解析, 忽略首尾空白与大小写.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(t))
            .ok_or_else(|| MorphError::UnknownDescriptor(t.to_string()))
    }
}

/// 按顺序排列的一组描述子的总槽位数.
pub fn bundle_depth(descriptors: &[Descriptor]) -> usize {
    descriptors.iter().map(|d| d.width()).sum()
}

/// 解析以空白或逗号分隔的描述子列表, 如 `"bvtv, tbth mil"`.
pub fn parse_list(s: &str) -> Result<Vec<Descriptor>, MorphError> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 名称往返, 非法名称报错.
    #[test]
    fn test_names() {
        for d in Descriptor::ALL {
            assert_eq!(d.to_string().parse::<Descriptor>().unwrap(), d);
        }
        assert_eq!(" TbTh ".parse::<Descriptor>().unwrap(), Descriptor::Tbth);
        assert_eq!(
            "bmd".parse::<Descriptor>().unwrap_err(),
            MorphError::UnknownDescriptor("bmd".to_string())
        );
    }

    /// 槽位宽度与深度.
    #[test]
    fn test_depth() {
        let list = parse_list("bvtv, tbth mil,da").unwrap();
        assert_eq!(
            list,
            vec![Descriptor::Bvtv, Descriptor::Tbth, Descriptor::Mil, Descriptor::Da]
        );
        assert_eq!(bundle_depth(&list), 1 + 1 + 12 + 3);
        assert_eq!(bundle_depth(&[]), 0);
        assert!(parse_list("bvtv,,").is_ok());
        assert!(parse_list("bvtv foo").is_err());
    }
}
