//! 单个范围 (整个肿瘤, 或某个连通域) 的空间统计量.
//!
//! 每个范围都分别在两个子范围上统计:
//!
//! - 质心: 左右侧与脑叶只看质心周围的小立方体;
//! - 全范围: 左右侧与脑叶看全部肿瘤体素.
//!
//! 体积, 可切除性与纤维束统计与子范围无关, 两个子范围共享同一结果.

mod laterality;
mod lobe;
mod tract;

use std::collections::BTreeMap;

use log::debug;

use crate::atlas::AtlasReference;
use crate::config::DiagnosisConfig;
use crate::error::{ComputationError, DiagnosisResult};
use crate::{BinaryVolume, Idx3d, ProbabilityVolume};

pub use laterality::{
    centroid_side, full_extent_fractions, LateralityClass, SideFractions, UNDETERMINED_LATERALITY,
};
pub use lobe::{centroid_lobe, full_extent_lobes};
pub use tract::{tract_disconnection, tract_proximity, TractDisconnection, TractProximity};

/// 保留两位小数.
#[inline]
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// `scope` 以毫升为单位的体积, 保留两位小数.
#[inline]
pub fn tumor_volume_ml(scope: &BinaryVolume) -> f64 {
    round2(scope.volume_ml())
}

/// `positions` 处可切除性概率的平均值 (不取整).
///
/// `positions` 不能为空.
pub fn resectability_score(positions: &[Idx3d], resectability: &ProbabilityVolume) -> f64 {
    debug_assert!(!positions.is_empty());
    let sum: f64 = resectability.values_at(positions).map(f64::from).sum();
    sum / positions.len() as f64
}

/// 某个子范围的全部统计量. 百分比均为 0 到 100 之间的值, 纤维束重叠为 0 到 1 之间的比例.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TumorStatistics {
    /// 左右侧. 质心子范围为 `Left` / `Right` (质心周围无标签时为
    /// [`UNDETERMINED_LATERALITY`]), 全范围为 [`LateralityClass::label`].
    pub laterality: String,

    /// 左右侧的占比.
    pub laterality_percentage: f64,

    /// 左侧占比. 只有全范围子范围有值.
    pub left_laterality_percentage: Option<f64>,

    /// 右侧占比. 只有全范围子范围有值.
    pub right_laterality_percentage: Option<f64>,

    /// 区域名 -> 占比. 质心周围无脑叶标签时为空.
    pub lobes: BTreeMap<String, f64>,

    /// 体积 (毫升), 保留两位小数.
    pub volume_ml: f64,

    /// 可切除性评分.
    pub resectability_score: f64,

    /// 纤维束名称 -> 距离 (毫米).
    pub tract_distances: BTreeMap<String, f64>,

    /// 纤维束名称 -> 重叠比例 (不取整).
    pub tract_overlaps: BTreeMap<String, f64>,

    /// 纤维束名称 -> 最大断连概率.
    pub tract_disconnection_max: BTreeMap<String, f64>,

    /// 纤维束名称 -> 平均断连概率.
    pub tract_disconnection_mean: BTreeMap<String, f64>,
}

/// 一个范围的两个子范围.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeStatistics {
    /// 全范围统计.
    pub full_extent: TumorStatistics,

    /// 质心统计.
    pub centroid_only: TumorStatistics,
}

/// 空间统计引擎. 只读地借用图谱与配置.
#[derive(Debug, Copy, Clone)]
pub struct SpatialStatisticsEngine<'a> {
    atlas: &'a AtlasReference,
    config: &'a DiagnosisConfig,
}

impl<'a> SpatialStatisticsEngine<'a> {
    /// 创建统计引擎.
    pub fn new(atlas: &'a AtlasReference, config: &'a DiagnosisConfig) -> Self {
        Self { atlas, config }
    }

    /// 计算 `scope` 的全部统计量. `name` 仅用于日志和错误信息.
    ///
    /// # 注意
    ///
    /// `scope` 必须位于图谱网格上, 且不能为空
    /// (否则返回 [`ComputationError::EmptyScope`]).
    pub fn compute(&self, name: &str, scope: &BinaryVolume) -> DiagnosisResult<ScopeStatistics> {
        let positions = scope.nonzero_pos();
        let Some(centroid) = scope.centroid() else {
            return Err(ComputationError::EmptyScope(name.to_owned()).into());
        };
        let centroid = centroid.map(|c| c.round() as usize);
        let centroid = (centroid[0], centroid[1], centroid[2]);
        let (atlas, half) = (self.atlas, self.config.centroid_half_width);

        let side_at_centroid = centroid_side(centroid, atlas.lateralisation(), atlas.coding(), half)?;
        let fractions = full_extent_fractions(&positions, atlas.lateralisation(), atlas.coding());
        let class = LateralityClass::classify(fractions.right, fractions.left, self.config);

        let region_at_centroid = centroid_lobe(centroid, atlas.lobes(), atlas.descriptions(), half)?;
        let lobes = full_extent_lobes(
            &positions,
            atlas.lobes(),
            atlas.descriptions(),
            self.config.lobe_discard_ratio,
        )?;

        let proximity = tract_proximity(scope, atlas)?;
        let disconnection = tract_disconnection(&positions, atlas);
        let shared = TumorStatistics {
            volume_ml: tumor_volume_ml(scope),
            resectability_score: resectability_score(&positions, atlas.resectability()),
            tract_distances: proximity.distances,
            tract_overlaps: proximity.overlaps,
            tract_disconnection_max: disconnection.max,
            tract_disconnection_mean: disconnection.mean,
            ..Default::default()
        };
        debug!(
            "Scope `{name}`: {} voxels, centroid {centroid:?}, {} ({side_at_centroid:?} at centroid), {} ml",
            positions.len(),
            class.label(),
            shared.volume_ml
        );

        let (side, side_ratio) = match side_at_centroid {
            Some((side, ratio)) => (side.as_str(), round2(ratio * 100.0)),
            None => (UNDETERMINED_LATERALITY, 0.0),
        };
        Ok(ScopeStatistics {
            full_extent: TumorStatistics {
                laterality: class.label().to_owned(),
                laterality_percentage: round2(fractions.ratio_of(class) * 100.0),
                left_laterality_percentage: Some(round2(fractions.left * 100.0)),
                right_laterality_percentage: Some(round2(fractions.right * 100.0)),
                lobes,
                ..shared.clone()
            },
            centroid_only: TumorStatistics {
                laterality: side.to_owned(),
                laterality_percentage: side_ratio,
                lobes: region_at_centroid.into_iter().collect(),
                ..shared
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::tests::toy_resources;
    use crate::consts::gray::*;
    use ndarray::{s, Array3};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.6666), 66.67);
        assert_eq!(round2(0.027), 0.03);
        assert_eq!(round2(-1.0), -1.0);
    }

    #[test]
    fn test_volume_ml() {
        let mut data = Array3::<u8>::zeros((10, 10, 10));
        data.slice_mut(s![0..3, 0..3, 0..3]).fill(MASK_TUMOR);
        assert!(f64_eq(tumor_volume_ml(&BinaryVolume::new(data, [1.0; 3])), 0.03));

        let data = Array3::<u8>::from_elem((10, 10, 10), MASK_TUMOR);
        assert!(f64_eq(tumor_volume_ml(&BinaryVolume::new(data, [1.0, 2.0, 0.5])), 1.0));
    }

    #[test]
    fn test_small_cube_statistics() {
        let atlas = AtlasReference::try_from(toy_resources(10)).unwrap();
        let config = DiagnosisConfig::default();
        let mut data = Array3::<u8>::zeros((10, 10, 10));
        data.slice_mut(s![1..4, 1..4, 1..4]).fill(MASK_TUMOR);
        let scope = BinaryVolume::new(data, [1.0; 3]);

        let st = SpatialStatisticsEngine::new(&atlas, &config)
            .compute("cube", &scope)
            .unwrap();
        let (full, com) = (&st.full_extent, &st.centroid_only);

        assert_eq!(full.laterality, "Right (>95%)");
        assert_eq!(full.laterality_percentage, 100.0);
        assert_eq!(full.right_laterality_percentage, Some(100.0));
        assert_eq!(full.left_laterality_percentage, Some(0.0));
        assert_eq!(full.lobes, BTreeMap::from([("Frontal".to_owned(), 100.0)]));
        assert!(f64_eq(full.volume_ml, 0.03));
        assert!(f64_eq(full.resectability_score, 0.7));

        // 质心 (2, 2, 2), 采样 w in [0, 5): 全部为右侧.
        assert_eq!(com.laterality, "Right");
        assert_eq!(com.laterality_percentage, 100.0);
        assert_eq!(com.left_laterality_percentage, None);
        assert_eq!(com.lobes, BTreeMap::from([("Frontal".to_owned(), 100.0)]));
        assert_eq!(com.volume_ml, full.volume_ml);
        assert_eq!(com.resectability_score, full.resectability_score);
    }

    #[test]
    fn test_straddling_cube() {
        let atlas = AtlasReference::try_from(toy_resources(10)).unwrap();
        let config = DiagnosisConfig::default();
        let mut data = Array3::<u8>::zeros((10, 10, 10));
        // w in [3, 8): 两列右侧, 三列左侧.
        data.slice_mut(s![3..8, 3..8, 3..8]).fill(MASK_TUMOR);
        let scope = BinaryVolume::new(data, [1.0; 3]);

        let st = SpatialStatisticsEngine::new(&atlas, &config)
            .compute("cube", &scope)
            .unwrap();
        assert_eq!(st.full_extent.laterality, "MostlyLeft ([60%-95%[)");
        assert_eq!(st.full_extent.laterality_percentage, 60.0);
        assert_eq!(st.full_extent.right_laterality_percentage, Some(40.0));
        // 两个标签都属于 Frontal, 按区域累加.
        assert_eq!(
            st.full_extent.lobes,
            BTreeMap::from([("Frontal".to_owned(), 100.0)])
        );

        // 质心 (5, 5, 5), 采样 w in [2, 8): 三列右侧, 三列左侧, 平局取右侧.
        assert_eq!(st.centroid_only.laterality, "Right");
        assert_eq!(st.centroid_only.laterality_percentage, 50.0);
    }

    #[test]
    fn test_centroid_in_unlabelled_space() {
        let mut res = toy_resources(20);
        res.lobes.data_mut().slice_mut(s![.., .., 6..14]).fill(0);
        res.lateralisation.data_mut().slice_mut(s![.., .., 6..14]).fill(0);
        let atlas = AtlasReference::try_from(res).unwrap();
        let config = DiagnosisConfig::default();
        // 两块分别落在 w in [2, 5) 与 [15, 18), 质心 w = 10 处无标签.
        let mut data = Array3::<u8>::zeros((20, 20, 20));
        data.slice_mut(s![8..11, 8..11, 2..5]).fill(MASK_TUMOR);
        data.slice_mut(s![8..11, 8..11, 15..18]).fill(MASK_TUMOR);
        let scope = BinaryVolume::new(data, [1.0; 3]);

        let st = SpatialStatisticsEngine::new(&atlas, &config)
            .compute("split", &scope)
            .unwrap();
        assert_eq!(st.centroid_only.laterality, UNDETERMINED_LATERALITY);
        assert_eq!(st.centroid_only.laterality_percentage, 0.0);
        assert!(st.centroid_only.lobes.is_empty());
        assert_eq!(st.full_extent.laterality, "Midline (<60%)");
        assert_eq!(st.full_extent.lobes, BTreeMap::from([("Frontal".to_owned(), 100.0)]));
    }

    #[test]
    fn test_empty_scope() {
        let atlas = AtlasReference::try_from(toy_resources(6)).unwrap();
        let config = DiagnosisConfig::default();
        let scope = BinaryVolume::new(Array3::zeros((6, 6, 6)), [1.0; 3]);
        assert!(SpatialStatisticsEngine::new(&atlas, &config)
            .compute("empty", &scope)
            .is_err());
    }
}
