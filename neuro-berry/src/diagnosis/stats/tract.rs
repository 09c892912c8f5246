//! 肿瘤与白质纤维束的空间关系.

use std::collections::BTreeMap;

use log::debug;

use crate::atlas::AtlasReference;
use crate::consts::UNDEFINED_DISTANCE;
use crate::data::distance::hd95;
use crate::error::ComputationError;
use crate::{BinaryVolume, Idx3d, VoxelGeometry};

/// 纤维束距离与重叠. 两个映射的键集合相同.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TractProximity {
    /// 纤维束名称 -> HD95 距离 (毫米). 重叠或纤维束为空时为 -1.
    pub distances: BTreeMap<String, f64>,

    /// 纤维束名称 -> 肿瘤体素落在纤维束内的比例 (0 到 1, 不取整). 不重叠时为 0.
    pub overlaps: BTreeMap<String, f64>,
}

/// 纤维束断连概率.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TractDisconnection {
    /// 纤维束名称 -> 肿瘤体素处概率的最大值.
    pub max: BTreeMap<String, f64>,

    /// 纤维束名称 -> 肿瘤体素处概率的平均值.
    pub mean: BTreeMap<String, f64>,
}

/// 计算 `scope` 与每条纤维束的距离和重叠.
///
/// 纤维束概率图先按图谱来源的阈值二值化. 之后:
///
/// 1. 与肿瘤重叠: 记录重叠比例, 距离为 -1;
/// 2. 不重叠且非空: 记录纤维束分辨率下的 HD95 距离, 重叠为 0;
/// 3. 纤维束为空: 距离为 -1, 重叠为 0.
///
/// 重叠比例不取整, 所以重叠体素再少, 比例也大于 0. 因此距离为 -1 的非空
/// 纤维束一定有正的重叠, 有正重叠的纤维束一定没有非负的距离.
pub fn tract_proximity(
    scope: &BinaryVolume,
    atlas: &AtlasReference,
) -> Result<TractProximity, ComputationError> {
    let total = scope.count_nonzero();
    if total == 0 {
        return Err(ComputationError::EmptySurface);
    }
    let cutoff = atlas.tract_cutoff();
    let mut ans = TractProximity::default();

    for (name, tract) in atlas.tracts() {
        let mask = tract.binarize(cutoff);
        let overlap = scope.intersection_count(&mask);
        let (distance, ratio) = if overlap > 0 {
            (UNDEFINED_DISTANCE, overlap as f64 / total as f64)
        } else if mask.is_empty() {
            (UNDEFINED_DISTANCE, 0.0)
        } else {
            (hd95(scope, &mask, tract.pix_dim())?, 0.0)
        };
        debug!("Tract `{name}`: distance = {distance:.3} mm, overlap = {ratio:.6}");
        ans.distances.insert(name.to_owned(), distance);
        ans.overlaps.insert(name.to_owned(), ratio);
    }
    Ok(ans)
}

/// 计算 `positions` (全部肿瘤体素) 处每条纤维束概率的最大值和平均值.
///
/// `positions` 不能为空.
pub fn tract_disconnection(positions: &[Idx3d], atlas: &AtlasReference) -> TractDisconnection {
    debug_assert!(!positions.is_empty());
    let n = positions.len() as f64;
    let mut ans = TractDisconnection::default();
    for (name, tract) in atlas.tracts() {
        let (max, sum) = tract
            .values_at(positions)
            .map(f64::from)
            .fold((f64::NEG_INFINITY, 0.0), |(m, s), p| (m.max(p), s + p));
        ans.max.insert(name.to_owned(), max);
        ans.mean.insert(name.to_owned(), sum / n);
    }
    ans
}
