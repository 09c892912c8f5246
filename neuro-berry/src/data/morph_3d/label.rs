//! 26-连通域标记.

use std::collections::VecDeque;
use std::f64::consts::PI;

use ndarray::Array3;

use super::neighbour26;
use crate::consts::gray::*;
use crate::consts::MM3_TO_ML;
use crate::{BinaryVolume, Idx3d, VoxelGeometry};

/// 一个连通域的描述信息.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// 标签号, 从 1 开始.
    pub id: u32,

    /// 体素个数.
    pub voxel_count: usize,

    /// 质心 (体素坐标).
    pub centroid: [f64; 3],
}

impl Component {
    /// 与该连通域体素数相同的球的直径, 以体素为单位.
    #[inline]
    pub fn equivalent_diameter(&self) -> f64 {
        (6.0 * self.voxel_count as f64 / PI).cbrt()
    }

    /// 等效球半径, 以体素为单位.
    #[inline]
    pub fn equivalent_radius(&self) -> f64 {
        self.equivalent_diameter() / 2.0
    }

    /// 给定体素分辨率下的实际体积, 以毫升为单位.
    #[inline]
    pub fn volume_ml(&self, pix_dim: [f64; 3]) -> f64 {
        self.voxel_count as f64 * pix_dim.iter().product::<f64>() * MM3_TO_ML
    }
}

/// 连通域标记结果.
///
/// `labels` 中 0 代表背景, `1..=K` 依次对应 `components` 的各项.
#[derive(Debug, Clone)]
pub struct ComponentLabels {
    labels: Array3<u32>,
    pix_dim: [f64; 3],
    components: Vec<Component>,
}

impl VoxelGeometry for ComponentLabels {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.labels.dim()
    }

    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        self.pix_dim
    }
}

impl ComponentLabels {
    /// 连通域个数 `K`.
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// 是否不存在连通域.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// 全部连通域, 按标签号升序排列.
    #[inline]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// 提取标签号为 `id` 的连通域掩膜.
    pub fn mask_of(&self, id: u32) -> BinaryVolume {
        BinaryVolume::new(
            self.labels
                .mapv(|l| if l == id { MASK_TUMOR } else { MASK_BACKGROUND }),
            self.pix_dim,
        )
    }

    /// 所有连通域的并集掩膜.
    pub fn union_mask(&self) -> BinaryVolume {
        BinaryVolume::new(
            self.labels
                .mapv(|l| if l != 0 { MASK_TUMOR } else { MASK_BACKGROUND }),
            self.pix_dim,
        )
    }

    /// 丢弃体素个数少于 `min_voxels` 的连通域, 并将剩余连通域按原顺序重新编号为 `1..=K`.
    pub fn retain_min_voxels(self, min_voxels: usize) -> Self {
        let Self {
            mut labels,
            pix_dim,
            components,
        } = self;

        // 旧标签号 -> 新标签号. 0 代表被丢弃.
        let mut remap = vec![0u32; components.len() + 1];
        let mut kept = Vec::with_capacity(components.len());
        for c in components {
            if c.voxel_count >= min_voxels {
                let id = kept.len() as u32 + 1;
                remap[c.id as usize] = id;
                kept.push(Component { id, ..c });
            }
        }
        labels.mapv_inplace(|l| remap[l as usize]);

        Self {
            labels,
            pix_dim,
            components: kept,
        }
    }
}

/// 对 `mask` 进行 26-连通域标记.
///
/// 标签号按行优先扫描时首次遇到的顺序分配, 因此结果是稳定的.
pub fn label_components(mask: &BinaryVolume) -> ComponentLabels {
    let mut labels = Array3::<u32>::zeros(mask.shape());
    let mut components = Vec::new();
    let mut queue = VecDeque::<Idx3d>::with_capacity(256);

    for seed in mask.nonzero_pos() {
        if labels[seed] != 0 {
            continue;
        }
        let id = components.len() as u32 + 1;
        labels[seed] = id;
        queue.push_back(seed);

        let mut count = 0usize;
        let mut acc = [0.0f64; 3];
        while let Some(pos @ (z, h, w)) = queue.pop_front() {
            count += 1;
            acc[0] += z as f64;
            acc[1] += h as f64;
            acc[2] += w as f64;

            for neigh in neighbour26(pos) {
                if mask.get(neigh).is_some_and(|p| is_tumor(*p)) && labels[neigh] == 0 {
                    labels[neigh] = id;
                    queue.push_back(neigh);
                }
            }
        }

        components.push(Component {
            id,
            voxel_count: count,
            centroid: acc.map(|a| a / count as f64),
        });
    }

    ComponentLabels {
        labels,
        pix_dim: mask.pix_dim(),
        components,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8
    }

    #[test]
    fn test_diagonal_touch_is_connected() {
        let mut mask = BinaryVolume::new(Array3::zeros((4, 4, 4)), [1.0; 3]);
        mask[(0, 0, 0)] = MASK_TUMOR;
        mask[(1, 1, 1)] = MASK_TUMOR;
        mask[(3, 3, 3)] = MASK_TUMOR;

        let cl = label_components(&mask);
        assert_eq!(cl.len(), 2);
        assert_eq!(cl.components()[0].voxel_count, 2);
        assert_eq!(cl.components()[0].centroid, [0.5, 0.5, 0.5]);
        assert_eq!(cl.components()[1].voxel_count, 1);
        assert_eq!(cl.mask_of(2).nonzero_pos(), vec![(3, 3, 3)]);
    }

    #[test]
    fn test_retain_and_relabel() {
        let mut data = Array3::<u8>::zeros((20, 20, 20));
        data[(0, 0, 0)] = MASK_TUMOR;
        data.slice_mut(s![5..10, 5..10, 5..10]).fill(MASK_TUMOR);
        let mask = BinaryVolume::new(data, [1.0; 3]);

        let cl = label_components(&mask);
        assert_eq!(cl.len(), 2);

        let cl = cl.retain_min_voxels(100);
        assert_eq!(cl.len(), 1);
        let c = &cl.components()[0];
        assert_eq!(c.id, 1);
        assert_eq!(c.voxel_count, 125);
        assert_eq!(c.centroid, [7.0, 7.0, 7.0]);
        assert_eq!(cl.union_mask().count_nonzero(), 125);
        assert_eq!(cl.mask_of(1), cl.union_mask());
    }

    #[test]
    fn test_equivalent_sphere() {
        let c = Component {
            id: 1,
            voxel_count: 125,
            centroid: [0.0; 3],
        };
        let d = c.equivalent_diameter();
        assert!(f64_eq(PI / 6.0 * d.powi(3), 125.0));
        assert!(f64_eq(c.equivalent_radius() * 2.0, d));
        assert!(f64_eq(c.volume_ml([1.0, 1.0, 1.0]), 0.125));
    }

    #[test]
    fn test_empty_mask() {
        let mask = BinaryVolume::new(Array3::zeros((3, 3, 3)), [1.0; 3]);
        let cl = label_components(&mask);
        assert!(cl.is_empty());
        assert!(cl.retain_min_voxels(100).union_mask().is_empty());
    }
}
