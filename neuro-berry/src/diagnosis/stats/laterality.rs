//! 左右侧统计.

use itertools::Itertools;

use crate::atlas::{LateralityCoding, Side};
use crate::config::DiagnosisConfig;
use crate::consts::gray::*;
use crate::error::ComputationError;
use crate::{Idx3d, LabelVolume};

/// 质心周围没有左右侧标签时, 质心子范围报告的左右侧.
pub const UNDETERMINED_LATERALITY: &str = "Undetermined";

/// 全范围左右侧分类. 分类标签原样写入报告.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LateralityClass {
    /// 右侧占比不小于 95%.
    Right,

    /// 左侧占比不小于 95%.
    Left,

    /// 右侧占比在 `[60%, 95%)`.
    MostlyRight,

    /// 左侧占比在 `[60%, 95%)`.
    MostlyLeft,

    /// 两侧占比都不足 60%.
    Midline,
}

impl LateralityClass {
    /// 报告中使用的标签.
    pub const fn label(&self) -> &'static str {
        match self {
            LateralityClass::Right => "Right (>95%)",
            LateralityClass::Left => "Left (>95%)",
            LateralityClass::MostlyRight => "Mostly Right ([60%-95%[)",
            LateralityClass::MostlyLeft => "MostlyLeft ([60%-95%[)",
            LateralityClass::Midline => "Midline (<60%)",
        }
    }

    /// 按右侧优先的顺序逐级判断. 所有下限都是闭区间.
    pub fn classify(right: f64, left: f64, config: &DiagnosisConfig) -> Self {
        let (dominant, mostly) = (config.laterality_dominant_ratio, config.laterality_mostly_ratio);
        if right >= dominant {
            LateralityClass::Right
        } else if left >= dominant {
            LateralityClass::Left
        } else if right >= mostly {
            LateralityClass::MostlyRight
        } else if left >= mostly {
            LateralityClass::MostlyLeft
        } else {
            LateralityClass::Midline
        }
    }
}

/// 肿瘤体素落在左右两侧的比例.
///
/// 分母是全部肿瘤体素, 所以两者之和可以小于 1 (中线及背景体素不计入任何一侧).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SideFractions {
    /// 右侧比例.
    pub right: f64,

    /// 左侧比例.
    pub left: f64,
}

impl SideFractions {
    /// 与分类对应的占比: 偏向哪侧就取哪侧, 中线时取较大者.
    pub fn ratio_of(&self, class: LateralityClass) -> f64 {
        match class {
            LateralityClass::Right | LateralityClass::MostlyRight => self.right,
            LateralityClass::Left | LateralityClass::MostlyLeft => self.left,
            LateralityClass::Midline => self.right.max(self.left),
        }
    }
}

/// 计算 `positions` (全部肿瘤体素) 落在左右两侧的比例.
///
/// `positions` 不能为空.
pub fn full_extent_fractions(
    positions: &[Idx3d],
    lateralisation: &LabelVolume,
    coding: LateralityCoding,
) -> SideFractions {
    debug_assert!(!positions.is_empty());
    let (right, left) = (coding.encode(Side::Right), coding.encode(Side::Left));
    let (mut r, mut l) = (0usize, 0usize);
    for v in lateralisation.values_at(positions) {
        if v == right {
            r += 1;
        } else if v == left {
            l += 1;
        }
    }
    let n = positions.len() as f64;
    SideFractions {
        right: r as f64 / n,
        left: l as f64 / n,
    }
}

/// 在质心 `centroid` 周围 `[c - half, c + half)` 的立方体内统计左右侧标签,
/// 返回占比较大的一侧及其占比 (分母为非背景采样数).
///
/// 两侧占比相同时取标签值较小的一侧. 质心落在无标签区域 (例如多灶肿瘤的
/// 质心位于两个病灶之间) 时, 立方体内没有任何非背景标签, 返回 `Ok(None)`.
pub fn centroid_side(
    centroid: Idx3d,
    lateralisation: &LabelVolume,
    coding: LateralityCoding,
    half: usize,
) -> Result<Option<(Side, f64)>, ComputationError> {
    let counts = lateralisation
        .sample_cube(centroid, half)
        .into_iter()
        .filter(|l| !is_atlas_background(*l))
        .counts();
    let total: usize = counts.values().sum();

    let Some((label, count)) = counts
        .into_iter()
        .max_by(|(la, ca), (lb, cb)| ca.cmp(cb).then(lb.cmp(la)))
    else {
        return Ok(None);
    };
    // 图谱构建时已校验过取值范围.
    let side = coding
        .decode(label)
        .ok_or(ComputationError::DegenerateCentroid(centroid))?;
    Ok(Some((side, count as f64 / total as f64)))
}
