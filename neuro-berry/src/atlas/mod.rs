//! 图谱资源.
//!
//! 所有图谱在流程开始前一次性加载, 之后在整个运行期间只读.

mod description;
mod loader;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::{gray::*, BCB_TRACT_CUTOFF, GENERIC_TRACT_CUTOFF};
use crate::error::ConfigurationError;
use crate::{Idx3d, LabelVolume, ProbabilityVolume, VoxelGeometry};

pub use description::{LobeDescription, LobeDescriptions};
pub use loader::AtlasLayout;

/// 半球.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// 左半球.
    Left,

    /// 右半球.
    Right,
}

impl Side {
    /// 报告中使用的名称.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }
}

/// 左右半球图谱的整数编码.
///
/// 该编码依赖于具体的图谱文件, 不能从数据中自描述.
/// 构建 [`AtlasReference`] 时会用它校验图谱的实际取值.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateralityCoding {
    /// 右半球标签值.
    pub right: u16,

    /// 左半球标签值.
    pub left: u16,
}

impl Default for LateralityCoding {
    fn default() -> Self {
        Self { right: 1, left: 2 }
    }
}

impl LateralityCoding {
    /// 将图谱标签解码为半球. 背景或未知值返回 `None`.
    #[inline]
    pub fn decode(&self, label: u16) -> Option<Side> {
        if label == self.right {
            Some(Side::Right)
        } else if label == self.left {
            Some(Side::Left)
        } else {
            None
        }
    }

    /// 获取 `side` 对应的标签值.
    #[inline]
    pub fn encode(&self, side: Side) -> u16 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn validate(&self, lateralisation: &LabelVolume) -> Result<(), ConfigurationError> {
        let (left, right) = (self.left, self.right);
        if left == right || is_atlas_background(left) || is_atlas_background(right) {
            return Err(ConfigurationError::AmbiguousCoding { left, right });
        }
        match lateralisation
            .labels()
            .into_iter()
            .find(|l| self.decode(*l).is_none())
        {
            Some(found) => Err(ConfigurationError::LateralityCoding { found, left, right }),
            None => Ok(()),
        }
    }
}

/// 纤维束图谱来源. 决定纤维束概率图的二值化阈值.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TractOrigin {
    /// Brain Connectivity and Behaviour 图谱, 阈值 0.25.
    Bcb,

    /// 其它来源, 阈值 0.5.
    #[default]
    Generic,
}

impl TractOrigin {
    /// 二值化阈值.
    #[inline]
    pub const fn cutoff(&self) -> f32 {
        match self {
            TractOrigin::Bcb => BCB_TRACT_CUTOFF,
            TractOrigin::Generic => GENERIC_TRACT_CUTOFF,
        }
    }
}

/// 构建 [`AtlasReference`] 所需的原始资源. 该结构完全透明.
#[derive(Debug, Clone)]
pub struct AtlasResources {
    /// 脑叶标签图谱.
    pub lobes: LabelVolume,

    /// 脑叶描述表.
    pub descriptions: LobeDescriptions,

    /// 左右半球图谱.
    pub lateralisation: LabelVolume,

    /// 左右半球编码.
    pub coding: LateralityCoding,

    /// 可切除性概率图谱 (0..1).
    pub resectability: ProbabilityVolume,

    /// 纤维束名称 -> 概率图谱.
    pub tracts: BTreeMap<String, ProbabilityVolume>,

    /// 纤维束图谱来源.
    pub origin: TractOrigin,
}

/// 经过校验的图谱资源集合. 所有体数据位于同一网格上.
#[derive(Debug, Clone)]
pub struct AtlasReference {
    res: AtlasResources,
}

impl TryFrom<AtlasResources> for AtlasReference {
    type Error = ConfigurationError;

    /// 校验:
    ///
    /// 1. 所有体数据与脑叶图谱形状一致;
    /// 2. 脑叶图谱中每个非背景标签在描述表中都有对应行;
    /// 3. 左右半球图谱的取值仅包括背景和两个编码值.
    fn try_from(res: AtlasResources) -> Result<Self, Self::Error> {
        let expected = res.lobes.shape();
        let check = |name: &str, found: Idx3d| {
            if found == expected {
                Ok(())
            } else {
                Err(ConfigurationError::GridMismatch {
                    name: name.to_owned(),
                    expected,
                    found,
                })
            }
        };
        check("lateralisation", res.lateralisation.shape())?;
        check("resectability", res.resectability.shape())?;
        for (name, tract) in res.tracts.iter() {
            check(name, tract.shape())?;
        }

        if let Some(l) = res
            .lobes
            .labels()
            .into_iter()
            .find(|l| res.descriptions.get(*l).is_none())
        {
            return Err(ConfigurationError::UnknownLobeLabel(l));
        }
        res.coding.validate(&res.lateralisation)?;

        Ok(Self { res })
    }
}

impl AtlasReference {
    /// 脑叶标签图谱.
    #[inline]
    pub fn lobes(&self) -> &LabelVolume {
        &self.res.lobes
    }

    /// 脑叶描述表.
    #[inline]
    pub fn descriptions(&self) -> &LobeDescriptions {
        &self.res.descriptions
    }

    /// 左右半球图谱.
    #[inline]
    pub fn lateralisation(&self) -> &LabelVolume {
        &self.res.lateralisation
    }

    /// 左右半球编码.
    #[inline]
    pub fn coding(&self) -> LateralityCoding {
        self.res.coding
    }

    /// 可切除性概率图谱.
    #[inline]
    pub fn resectability(&self) -> &ProbabilityVolume {
        &self.res.resectability
    }

    /// 按名称升序迭代所有纤维束.
    #[inline]
    pub fn tracts(&self) -> impl ExactSizeIterator<Item = (&str, &ProbabilityVolume)> {
        self.res.tracts.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 纤维束二值化阈值.
    #[inline]
    pub fn tract_cutoff(&self) -> f32 {
        self.res.origin.cutoff()
    }

    /// 图谱网格形状.
    #[inline]
    pub fn grid_shape(&self) -> Idx3d {
        self.res.lobes.shape()
    }
}
