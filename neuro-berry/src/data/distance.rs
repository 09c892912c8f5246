//! 表面距离与 95% Hausdorff 距离 (HD95).
//!
//! 表面按 26-连通提取 (见 [`BinaryVolume::surface`]).
//! 距离变换使用 Felzenszwalb-Huttenlocher 可分离精确欧氏距离变换,
//! 支持各向异性体素.

use itertools::Itertools;
use ndarray::{s, Array3, Axis};
use ordered_float::OrderedFloat;

use crate::consts::gray::*;
use crate::consts::HD_PERCENTILE;
use crate::error::ComputationError;
use crate::{BinaryVolume, Idx3d, VoxelGeometry};

/// 一维平方距离变换. `f` 中的 `inf` 代表非站点.
///
/// `out[q] = min_p ((q - p) * spacing)² + f[p]`.
fn edt_1d(f: &[f64], spacing: f64, out: &mut [f64]) {
    debug_assert_eq!(f.len(), out.len());

    // 下包络中各抛物线的顶点下标, 及其左边界.
    let mut v: Vec<usize> = Vec::with_capacity(f.len());
    let mut z: Vec<f64> = Vec::with_capacity(f.len());

    for (q, fq) in f.iter().enumerate().filter(|(_, fq)| fq.is_finite()) {
        let xq = q as f64 * spacing;
        let mut sect = f64::NEG_INFINITY;
        while let (Some(&p), Some(&zp)) = (v.last(), z.last()) {
            let xp = p as f64 * spacing;
            sect = ((fq + xq * xq) - (f[p] + xp * xp)) / (2.0 * (xq - xp));
            if sect <= zp {
                v.pop();
                z.pop();
                sect = f64::NEG_INFINITY;
            } else {
                break;
            }
        }
        v.push(q);
        z.push(sect);
    }

    if v.is_empty() {
        out.fill(f64::INFINITY);
        return;
    }

    let mut k = 0;
    for (q, o) in out.iter_mut().enumerate() {
        let xq = q as f64 * spacing;
        while k + 1 < v.len() && z[k + 1] < xq {
            k += 1;
        }
        let xp = v[k] as f64 * spacing;
        *o = (xq - xp).powi(2) + f[v[k]];
    }
}

/// 计算每个体素到最近站点 (`sites` 为 `true` 处) 的欧氏距离, 单位与 `pix_dim` 相同.
///
/// 若不存在任何站点, 则所有距离均为 `inf`.
pub fn distance_to_sites(sites: &Array3<bool>, pix_dim: [f64; 3]) -> Array3<f64> {
    let mut dist = sites.mapv(|s| if s { 0.0 } else { f64::INFINITY });
    let mut buf = Vec::new();

    for (axis, spacing) in pix_dim.into_iter().enumerate() {
        for mut lane in dist.lanes_mut(Axis(axis)) {
            let f = lane.to_vec();
            buf.resize(f.len(), 0.0);
            edt_1d(&f, spacing, &mut buf);
            lane.iter_mut().zip(buf.iter()).for_each(|(d, b)| *d = *b);
        }
    }
    dist.mapv_inplace(f64::sqrt);
    dist
}

/// 按线性插值方式计算第 `q` 百分位数.
///
/// `values` 不能为空.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    assert!(!values.is_empty());
    assert!((0.0..=100.0).contains(&q));

    let sorted = values
        .iter()
        .copied()
        .sorted_by_key(|v| OrderedFloat(*v))
        .collect_vec();
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let (lo, hi) = (rank.floor() as usize, rank.ceil() as usize);
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// 同时包含 `a`, `b` 全部前景的最小包围盒 `[min, max]`.
fn bounding_box(a: &BinaryVolume, b: &BinaryVolume) -> Option<(Idx3d, Idx3d)> {
    a.nonzero_pos()
        .into_iter()
        .chain(b.nonzero_pos())
        .fold(None, |acc, (z, h, w)| match acc {
            None => Some(((z, h, w), (z, h, w))),
            Some(((z0, h0, w0), (z1, h1, w1))) => Some((
                (z0.min(z), h0.min(h), w0.min(w)),
                (z1.max(z), h1.max(h), w1.max(w)),
            )),
        })
}

/// `from` 表面上每个体素到 `to` 表面的最短距离.
///
/// 两个掩膜必须位于同一网格上.
pub fn surface_distances(
    from: &BinaryVolume,
    to: &BinaryVolume,
    pix_dim: [f64; 3],
) -> Result<Vec<f64>, ComputationError> {
    assert!(from.same_grid(to));
    let (from_surf, to_surf) = (from.surface(), to.surface());
    let Some(((z0, h0, w0), (z1, h1, w1))) = bounding_box(&from_surf, &to_surf) else {
        return Err(ComputationError::EmptySurface);
    };
    if from_surf.is_empty() || to_surf.is_empty() {
        return Err(ComputationError::EmptySurface);
    }

    // 距离只与站点和查询点有关, 因此只需在二者的包围盒内做距离变换.
    let window = s![z0..=z1, h0..=h1, w0..=w1];
    let sites = to_surf.data().slice(window).mapv(is_tumor);
    let dist = distance_to_sites(&sites, pix_dim);

    Ok(from_surf
        .data()
        .slice(window)
        .indexed_iter()
        .filter(|(_, p)| is_tumor(**p))
        .map(|(pos, _)| dist[pos])
        .collect())
}

/// 计算 `a`, `b` 两个掩膜之间的 95% Hausdorff 距离 (对称), 单位为毫米.
///
/// 两个方向的表面距离合并之后取第 95 百分位数, 而不是分别取百分位数再取最大值.
/// 任一掩膜为空时返回 [`ComputationError::EmptySurface`].
pub fn hd95(a: &BinaryVolume, b: &BinaryVolume, pix_dim: [f64; 3]) -> Result<f64, ComputationError> {
    let mut pooled = surface_distances(a, b, pix_dim)?;
    pooled.extend(surface_distances(b, a, pix_dim)?);
    Ok(percentile(&pooled, HD_PERCENTILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8
    }

    fn brute_force(sites: &Array3<bool>, pix_dim: [f64; 3]) -> Array3<f64> {
        let pos: Vec<_> = sites
            .indexed_iter()
            .filter_map(|(p, s)| s.then_some(p))
            .collect();
        let mut ans = Array3::from_elem(sites.dim(), f64::INFINITY);
        for ((z, h, w), d) in ans.indexed_iter_mut() {
            for &(a, b, c) in pos.iter() {
                let dd = ((z as f64 - a as f64) * pix_dim[0]).powi(2)
                    + ((h as f64 - b as f64) * pix_dim[1]).powi(2)
                    + ((w as f64 - c as f64) * pix_dim[2]).powi(2);
                *d = d.min(dd.sqrt());
            }
        }
        ans
    }

    #[test]
    fn test_edt_against_brute_force() {
        let mut sites = Array3::from_elem((7, 9, 6), false);
        sites[(0, 0, 0)] = true;
        sites[(3, 7, 2)] = true;
        sites[(6, 2, 5)] = true;
        sites[(5, 8, 0)] = true;

        for pix_dim in [[1.0, 1.0, 1.0], [2.5, 0.7, 1.2]] {
            let fast = distance_to_sites(&sites, pix_dim);
            let slow = brute_force(&sites, pix_dim);
            for (a, b) in fast.iter().zip(slow.iter()) {
                assert!(f64_eq(*a, *b), "{a} != {b}");
            }
        }
    }

    #[test]
    fn test_edt_without_sites() {
        let sites = Array3::from_elem((2, 2, 2), false);
        assert!(distance_to_sites(&sites, [1.0; 3])
            .iter()
            .all(|d| d.is_infinite()));
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        // 秩 0.95 * 3 = 2.85, 即 3 + 0.85 * (4 - 3).
        assert!(f64_eq(percentile(&[4.0, 1.0, 3.0, 2.0], 95.0), 3.85));
        assert!(f64_eq(percentile(&[7.0], 95.0), 7.0));
        assert!(f64_eq(percentile(&[1.0, 2.0], 50.0), 1.5));
    }

    #[test]
    fn test_hd95_two_voxels() {
        let mut a = BinaryVolume::new(Array3::zeros((1, 1, 12)), [1.0, 1.0, 2.0]);
        let mut b = a.clone();
        a[(0, 0, 1)] = MASK_TUMOR;
        b[(0, 0, 10)] = MASK_TUMOR;
        assert!(f64_eq(hd95(&a, &b, a.pix_dim()).unwrap(), 18.0));
    }

    #[test]
    fn test_hd95_pools_both_directions() {
        // a 只有 w = 0, b 占据 w in [2, 12). a -> b: [2]; b -> a: [2, 11].
        let mut a = BinaryVolume::new(Array3::zeros((1, 1, 12)), [1.0; 3]);
        let mut b = a.clone();
        a[(0, 0, 0)] = MASK_TUMOR;
        b.data_mut().slice_mut(s![.., .., 2..]).fill(MASK_TUMOR);

        // 合并后 11 个距离, 秩 9.5 落在 10 与 11 之间.
        assert!(f64_eq(hd95(&a, &b, [1.0; 3]).unwrap(), 10.5));
        assert!(f64_eq(hd95(&b, &a, [1.0; 3]).unwrap(), 10.5));
        // 单向 b -> a 的第 95 百分位数更大.
        let ba = surface_distances(&b, &a, [1.0; 3]).unwrap();
        assert!(f64_eq(percentile(&ba, 95.0), 10.55));
    }

    #[test]
    fn test_hd95_identical_is_zero() {
        let mut a = BinaryVolume::new(Array3::zeros((5, 5, 5)), [1.0; 3]);
        a.data_mut().slice_mut(s![1..4, 1..4, 1..4]).fill(MASK_TUMOR);
        assert!(f64_eq(hd95(&a, &a, [1.0; 3]).unwrap(), 0.0));
    }

    #[test]
    fn test_hd95_empty() {
        let a = BinaryVolume::new(Array3::zeros((3, 3, 3)), [1.0; 3]);
        let mut b = a.clone();
        b[(1, 1, 1)] = MASK_TUMOR;
        assert_eq!(hd95(&a, &b, [1.0; 3]), Err(ComputationError::EmptySurface));
    }
}
