//! 多灶性判断.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::DiagnosisConfig;
use crate::consts::UNDEFINED_DISTANCE;
use crate::data::distance::hd95;
use crate::data::morph_3d::ComponentLabels;
use crate::error::ComputationError;

/// 多灶性分析结果.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multifocality {
    /// 是否多灶.
    pub multifocal: bool,

    /// 体积不小于 `config.part_min_volume_ml` 的肿瘤部分个数.
    /// 只有一个连通域时恒为 1.
    pub parts: usize,

    /// 各卫星部分到主体 HD95 距离的最大值 (毫米).
    /// 连通域不多于一个时为 -1.
    pub largest_minimum_distance: f64,
}

/// 分析连通域 `labels` 的多灶性. 距离在 `labels` 自身的体素分辨率下计算.
///
/// 主体是等效半径最大的连通域 (相同时取标签号较小者).
/// 当最大距离不小于 `config.multifocal_distance_mm` 时判定为多灶.
pub fn analyze_multifocality(
    labels: &ComponentLabels,
    pix_dim: [f64; 3],
    config: &DiagnosisConfig,
) -> Result<Multifocality, ComputationError> {
    let comps = labels.components();
    if comps.len() <= 1 {
        return Ok(Multifocality {
            multifocal: false,
            parts: comps.len(),
            largest_minimum_distance: UNDEFINED_DISTANCE,
        });
    }

    // 严格大于才替换, 保证相同半径时取第一个.
    let main = comps
        .iter()
        .skip(1)
        .fold(&comps[0], |best, c| {
            if c.equivalent_radius() > best.equivalent_radius() {
                c
            } else {
                best
            }
        });
    let main_mask = labels.mask_of(main.id);

    let mut largest = f64::NEG_INFINITY;
    for satellite in comps.iter().filter(|c| c.id != main.id) {
        let d = hd95(&labels.mask_of(satellite.id), &main_mask, pix_dim)?;
        debug!("Component {} -> main component {}: HD95 = {d:.3} mm", satellite.id, main.id);
        largest = largest.max(d);
    }

    let parts = comps
        .iter()
        .filter(|c| c.volume_ml(pix_dim) >= config.part_min_volume_ml)
        .count();

    Ok(Multifocality {
        multifocal: largest >= config.multifocal_distance_mm,
        parts,
        largest_minimum_distance: largest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::gray::*;
    use crate::data::morph_3d::label_components;
    use crate::BinaryVolume;
    use ndarray::{s, Array3};

    fn two_cubes(gap: usize) -> BinaryVolume {
        let mut data = Array3::<u8>::zeros((16, 16, 20 + 2 * 5 + gap));
        data.slice_mut(s![5..10, 5..10, 5..10]).fill(MASK_TUMOR);
        data.slice_mut(s![5..10, 5..10, 10 + gap..15 + gap]).fill(MASK_TUMOR);
        BinaryVolume::new(data, [1.0; 3])
    }

    #[test]
    fn test_single_component() {
        let mut data = Array3::<u8>::zeros((10, 10, 10));
        data.slice_mut(s![3..6, 3..6, 3..6]).fill(MASK_TUMOR);
        let mask = BinaryVolume::new(data, [1.0; 3]);
        let labels = label_components(&mask);

        let m = analyze_multifocality(&labels, [1.0; 3], &DiagnosisConfig::default()).unwrap();
        assert!(!m.multifocal);
        // 只有一个部分时不看体积 (0.027 mL < 0.1 mL).
        assert_eq!(m.parts, 1);
        assert_eq!(m.largest_minimum_distance, -1.0);
    }

    #[test]
    fn test_no_component() {
        let mask = BinaryVolume::new(Array3::zeros((4, 4, 4)), [1.0; 3]);
        let m = analyze_multifocality(&label_components(&mask), [1.0; 3], &Default::default())
            .unwrap();
        assert!(!m.multifocal);
        assert_eq!(m.parts, 0);
        assert_eq!(m.largest_minimum_distance, -1.0);
    }

    #[test]
    fn test_two_distant_cubes() {
        let mask = two_cubes(20);
        let labels = label_components(&mask);
        assert_eq!(labels.len(), 2);

        let m = analyze_multifocality(&labels, [1.0; 3], &DiagnosisConfig::default()).unwrap();
        assert!(m.multifocal);
        assert_eq!(m.parts, 2);
        assert!(m.largest_minimum_distance > 20.0);
    }

    #[test]
    fn test_close_cubes_are_not_multifocal() {
        // 相隔 2 个体素: 最近表面距离为 3 mm, 但 HD95 还包括远端表面.
        let mask = two_cubes(2);
        let labels = label_components(&mask);
        assert_eq!(labels.len(), 2);

        let config = DiagnosisConfig {
            multifocal_distance_mm: 100.0,
            ..Default::default()
        };
        let m = analyze_multifocality(&labels, [1.0; 3], &config).unwrap();
        assert!(!m.multifocal);
        assert_eq!(m.parts, 2);
        assert!(m.largest_minimum_distance >= 3.0);
    }

    #[test]
    fn test_small_parts_are_not_counted() {
        let mut data = Array3::<u8>::zeros((20, 20, 40));
        data.slice_mut(s![5..10, 5..10, 5..10]).fill(MASK_TUMOR);
        data.slice_mut(s![5..8, 5..8, 30..33]).fill(MASK_TUMOR);
        let mask = BinaryVolume::new(data, [1.0; 3]);
        let labels = label_components(&mask);

        let m = analyze_multifocality(&labels, [1.0; 3], &DiagnosisConfig::default()).unwrap();
        assert!(m.multifocal);
        assert_eq!(m.parts, 1);
    }
}
