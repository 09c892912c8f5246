//! 肿瘤掩膜的形态学清理与连通域提取.

use log::debug;

use crate::config::DiagnosisConfig;
use crate::data::morph_3d::{label_components, ComponentLabels};
use crate::BinaryVolume;

/// 对二值肿瘤掩膜依次进行:
///
/// 1. 球形结构元闭运算 (合并几乎相接的体素, 填充小空洞);
/// 2. 26-连通域标记;
/// 3. 丢弃体素个数不足 `config.min_component_voxels` 的连通域
///   (绝对阈值, 与体素物理大小无关).
///
/// 返回值中的连通域被重新编号为 `1..=K`. `K` 可能为 0.
pub fn extract_components(mask: &BinaryVolume, config: &DiagnosisConfig) -> ComponentLabels {
    let closed = mask.closing(config.closing_radius);
    let labels = label_components(&closed);
    let before = labels.len();
    let labels = labels.retain_min_voxels(config.min_component_voxels);
    debug!(
        "Connected components: {before} found, {} kept (>= {} voxels)",
        labels.len(),
        config.min_component_voxels
    );
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::gray::*;
    use ndarray::{s, Array3};

    #[test]
    fn test_noise_is_dropped() {
        let mut data = Array3::<u8>::zeros((24, 24, 24));
        data.slice_mut(s![4..10, 4..10, 4..10]).fill(MASK_TUMOR);
        // 远处的孤立噪声
        data[(20, 20, 20)] = MASK_TUMOR;
        let mask = BinaryVolume::new(data, [1.0; 3]);

        let cl = extract_components(&mask, &DiagnosisConfig::default());
        assert_eq!(cl.len(), 1);
        assert_eq!(cl.components()[0].voxel_count, 216);
    }

    #[test]
    fn test_near_touching_parts_merge() {
        let mut data = Array3::<u8>::zeros((20, 20, 30));
        data.slice_mut(s![5..12, 5..12, 5..12]).fill(MASK_TUMOR);
        // 相隔一个体素的第二部分
        data.slice_mut(s![5..12, 5..12, 13..20]).fill(MASK_TUMOR);
        let mask = BinaryVolume::new(data, [1.0; 3]);

        let cl = extract_components(&mask, &DiagnosisConfig::default());
        assert_eq!(cl.len(), 1);
        assert!(cl.components()[0].voxel_count > 2 * 343);
    }

    #[test]
    fn test_all_filtered() {
        let mut data = Array3::<u8>::zeros((10, 10, 10));
        data.slice_mut(s![3..6, 3..6, 3..6]).fill(MASK_TUMOR);
        let mask = BinaryVolume::new(data, [1.0; 3]);
        assert!(extract_components(&mask, &DiagnosisConfig::default()).is_empty());
    }
}
