//! 脑叶定位统计.

use std::collections::BTreeMap;

use itertools::Itertools;

use super::round2;
use crate::atlas::LobeDescriptions;
use crate::consts::gray::*;
use crate::error::DiagnosisResult;
use crate::{Idx3d, LabelVolume};

/// 在质心 `centroid` 周围 `[c - half, c + half)` 的立方体内统计脑叶标签,
/// 返回占比最大的标签所对应的区域名及其占比 (百分比, 保留两位小数).
///
/// 分母为立方体内非背景采样数. 占比相同时取较小的标签.
/// 立方体内全是背景时返回 `Ok(None)`.
pub fn centroid_lobe(
    centroid: Idx3d,
    lobes: &LabelVolume,
    descriptions: &LobeDescriptions,
    half: usize,
) -> DiagnosisResult<Option<(String, f64)>> {
    let counts = lobes
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
    let region = descriptions.region(label)?.to_owned();
    Ok(Some((region, round2(count as f64 / total as f64 * 100.0))))
}

/// 统计 `positions` (全部肿瘤体素) 在各脑叶区域中的占比 (百分比).
///
/// 1. 分母为全部肿瘤体素 (包括落在背景中的体素);
/// 2. 占比低于 `discard_ratio` 的标签被丢弃;
/// 3. 每个标签的百分比先保留两位小数, 再按区域名累加,
///    累加结果再保留两位小数.
///
/// # 返回值
///
/// 区域名 -> 百分比. 没有任何标签达到门限时为空.
pub fn full_extent_lobes(
    positions: &[Idx3d],
    lobes: &LabelVolume,
    descriptions: &LobeDescriptions,
    discard_ratio: f64,
) -> DiagnosisResult<BTreeMap<String, f64>> {
    let n = positions.len() as f64;
    let mut ans = BTreeMap::<String, f64>::new();
    let histogram = lobes
        .values_at(positions)
        .filter(|l| !is_atlas_background(*l))
        .counts();
    for (label, count) in histogram.into_iter().sorted() {
        let ratio = count as f64 / n;
        if ratio < discard_ratio {
            continue;
        }
        let region = descriptions.region(label)?;
        *ans.entry(region.to_owned()).or_default() += round2(ratio * 100.0);
    }
    ans.values_mut().for_each(|v| *v = round2(*v));
    Ok(ans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::LobeDescription;
    use crate::error::{ConfigurationError, DiagnosisError};
    use ndarray::{s, Array3};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8
    }

    fn row(label: u16, region: &str, laterality: &str) -> LobeDescription {
        LobeDescription {
            label,
            region: region.into(),
            laterality: laterality.into(),
            matter_type: "Gray".into(),
        }
    }

    /// 一行 20 个体素: 标签 1 (Frontal 右) 8 个, 标签 2 (Frontal 左) 6 个,
    /// 标签 3 (Temporal) 5 个, 标签 4 (Insula) 1 个.
    fn strip() -> (LabelVolume, LobeDescriptions, Vec<Idx3d>) {
        let mut data = Array3::<u16>::zeros((1, 1, 20));
        data.slice_mut(s![.., .., 0..8]).fill(1);
        data.slice_mut(s![.., .., 8..14]).fill(2);
        data.slice_mut(s![.., .., 14..19]).fill(3);
        data[(0, 0, 19)] = 4;
        let desc = LobeDescriptions::from_rows([
            row(1, "Frontal", "Right"),
            row(2, "Frontal", "Left"),
            row(3, "Temporal", "Right"),
            row(4, "Insula", "Right"),
        ]);
        let positions = (0..20).map(|w| (0, 0, w)).collect();
        (LabelVolume::new(data, [1.0; 3]), desc, positions)
    }

    #[test]
    fn test_full_extent_lobes() {
        let (lobes, desc, positions) = strip();
        let ans = full_extent_lobes(&positions, &lobes, &desc, 0.05).unwrap();
        // Insula 为 5%, 恰好不被丢弃.
        assert_eq!(ans.len(), 3);
        assert!(f64_eq(ans["Frontal"], 70.0));
        assert!(f64_eq(ans["Temporal"], 25.0));
        assert!(f64_eq(ans["Insula"], 5.0));
        assert!(ans.values().sum::<f64>() <= 100.0 + 1e-6);

        // 标签 2 (30%) 被丢弃, 只剩标签 1.
        let ans = full_extent_lobes(&positions, &lobes, &desc, 0.35).unwrap();
        assert_eq!(ans.len(), 1);
        assert!(f64_eq(ans["Frontal"], 40.0));
    }

    #[test]
    fn test_background_counts_in_denominator() {
        let (mut lobes, desc, _) = strip();
        lobes.data_mut().slice_mut(s![.., .., 4..8]).fill(0);
        let positions: Vec<Idx3d> = (0..8).map(|w| (0, 0, w)).collect();

        let ans = full_extent_lobes(&positions, &lobes, &desc, 0.05).unwrap();
        assert!(f64_eq(ans["Frontal"], 50.0));
    }

    #[test]
    fn test_centroid_lobe() {
        let mut data = Array3::<u16>::zeros((10, 10, 10));
        data.slice_mut(s![.., .., 0..4]).fill(1);
        data.slice_mut(s![.., .., 4..]).fill(3);
        let desc = LobeDescriptions::from_rows([row(1, "Frontal", "Right"), row(3, "Temporal", "Right")]);
        let lobes = LabelVolume::new(data, [1.0; 3]);

        // w in [2, 8): 标签 1 两列, 标签 3 四列.
        let (region, pct) = centroid_lobe((5, 5, 5), &lobes, &desc, 3).unwrap().unwrap();
        assert_eq!(region, "Temporal");
        assert!(f64_eq(pct, 66.67));
    }

    #[test]
    fn test_centroid_lobe_unknown_label() {
        let lobes = LabelVolume::new(Array3::from_elem((4, 4, 4), 9), [1.0; 3]);
        let desc = LobeDescriptions::from_rows([row(1, "Frontal", "Right")]);
        assert!(matches!(
            centroid_lobe((2, 2, 2), &lobes, &desc, 3),
            Err(DiagnosisError::Configuration(ConfigurationError::UnknownLobeLabel(9)))
        ));
    }

    #[test]
    fn test_centroid_lobe_in_background() {
        let lobes = LabelVolume::new(Array3::zeros((4, 4, 4)), [1.0; 3]);
        let desc = LobeDescriptions::from_rows([row(1, "Frontal", "Right")]);
        assert!(matches!(centroid_lobe((2, 2, 2), &lobes, &desc, 3), Ok(None)));
    }
}
