//! 3D 形态学操作.
//!
//! 所有操作都将网格以外的区域视为背景: 腐蚀会蚕食贴近网格边界的前景.

use crate::consts::gray::*;
use crate::{BinaryVolume, Idx3d, Offset3d, VoxelGeometry};

mod label;

pub use label::{label_components, Component, ComponentLabels};

/// 获得 `(z, h, w)` 的 26-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour26((z, h, w): Idx3d) -> [Idx3d; 26] {
    let mut ans = [(0, 0, 0); 26];
    let mut i = 0;
    for dz in [-1isize, 0, 1] {
        for dh in [-1isize, 0, 1] {
            for dw in [-1isize, 0, 1] {
                if (dz, dh, dw) == (0, 0, 0) {
                    continue;
                }
                ans[i] = (
                    z.wrapping_add_signed(dz),
                    h.wrapping_add_signed(dh),
                    w.wrapping_add_signed(dw),
                );
                i += 1;
            }
        }
    }
    ans
}

/// 半径为 `radius` (体素) 的球形结构元, 即满足 `dz² + dh² + dw² <= radius²` 的全部偏移量.
pub fn ball(radius: usize) -> Vec<Offset3d> {
    let r = radius as isize;
    let mut ans = Vec::with_capacity((2 * radius + 1).pow(3));
    for dz in -r..=r {
        for dh in -r..=r {
            for dw in -r..=r {
                if dz * dz + dh * dh + dw * dw <= r * r {
                    ans.push((dz, dh, dw));
                }
            }
        }
    }
    ans
}

/// `pos + off`. 结果在网格外时返回 `None`.
#[inline]
fn shifted<G: VoxelGeometry>(grid: &G, (z, h, w): Idx3d, (dz, dh, dw): Offset3d) -> Option<Idx3d> {
    let pos = (
        z.checked_add_signed(dz)?,
        h.checked_add_signed(dh)?,
        w.checked_add_signed(dw)?,
    );
    grid.check(&pos).then_some(pos)
}

/// 3D 二值形态学实现块
impl BinaryVolume {
    /// 以结构元 `se` 进行一次膨胀.
    ///
    /// 只遍历前景体素并向外 "盖章", 开销与前景大小成正比.
    pub fn dilate(&self, se: &[Offset3d]) -> BinaryVolume {
        let mut ans = BinaryVolume::empty_like(self);
        for pos in self.nonzero_pos() {
            for off in se {
                if let Some(p) = shifted(self, pos, *off) {
                    ans[p] = MASK_TUMOR;
                }
            }
        }
        ans
    }

    /// 以结构元 `se` 进行一次腐蚀. 网格以外视为背景.
    pub fn erode(&self, se: &[Offset3d]) -> BinaryVolume {
        let mut ans = BinaryVolume::empty_like(self);
        for pos in self.nonzero_pos() {
            let kept = se
                .iter()
                .all(|off| shifted(self, pos, *off).is_some_and(|p| is_tumor(self[p])));
            if kept {
                ans[pos] = MASK_TUMOR;
            }
        }
        ans
    }

    /// 以半径为 `radius` 的球形结构元进行一次闭运算 (先膨胀, 后腐蚀).
    ///
    /// 用于合并几乎相接的体素, 并填充小空洞.
    #[inline]
    pub fn closing(&self, radius: usize) -> BinaryVolume {
        let se = ball(radius);
        self.dilate(&se).erode(&se)
    }

    /// 提取 26-连通意义下的表面体素, 即 `self` 与其腐蚀结果的差集.
    ///
    /// 贴着网格边界的前景体素总是表面体素.
    pub fn surface(&self) -> BinaryVolume {
        let mut ans = BinaryVolume::empty_like(self);
        for pos in self.nonzero_pos() {
            let inner = neighbour26(pos)
                .into_iter()
                .all(|p| self.get(p).is_some_and(|v| is_tumor(*v)));
            if !inner {
                ans[pos] = MASK_TUMOR;
            }
        }
        ans
    }
}
