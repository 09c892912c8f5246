use std::ops::{Index, IndexMut};
use std::path::Path;

use ndarray::{Array3, ArrayView, ArrayViewMut, Ix3, Zip};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use num::Zero;

use crate::consts::gray::*;
use crate::consts::MM3_TO_ML;
use crate::error::ConfigurationError;
use crate::Idx3d;

pub mod distance;
pub mod morph_3d;

/// 将 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z as usize, h as usize, w as usize)
}

/// 获取 `[z, H, W]` 顺序的体素分辨率, 以毫米为单位.
#[inline]
fn get_pix_dim_from_header(h: &NiftiHeader) -> [f64; 3] {
    let [_, w, h, z, ..] = h.pixdim;
    [z as f64, h as f64, w as f64]
}

#[inline]
fn is_valid_pix_dim(pix_dim: &[f64; 3]) -> bool {
    pix_dim.iter().all(|d| d.is_finite() && *d > 0.0)
}

/// 读取 nii 文件, 返回 `[z, H, W]` 排布的 `f32` 体数据及其体素分辨率.
fn read_nifti_f32(path: &Path) -> Result<(Array3<f32>, [f64; 3]), ConfigurationError> {
    if !path.exists() {
        return Err(ConfigurationError::MissingResource(path.to_owned()));
    }
    let obj = ReaderOptions::new().read_file(path)?;
    let header = obj.header().clone();
    if header.dim[0] != 3 {
        return Err(ConfigurationError::NotVolume3d {
            path: path.to_owned(),
            dims: header.dim,
        });
    }
    let pix_dim = get_pix_dim_from_header(&header);
    if !is_valid_pix_dim(&pix_dim) {
        return Err(ConfigurationError::InvalidSpacing(pix_dim));
    }

    // [W, H, z] -> [z, H, W].
    // hint: 原第一维向下增长, 原第二维向右增长.
    let data = obj
        .into_volume()
        .into_ndarray::<f32>()?
        .permuted_axes([2, 1, 0].as_slice())
        .into_dimensionality::<Ix3>()?;
    let data = data.as_standard_layout().to_owned();
    debug_assert_eq!(data.dim(), get_shape_from_header(&header));

    Ok((data, pix_dim))
}

/// 体数据的几何属性和部分通用操作.
pub trait VoxelGeometry {
    /// 获取数据形状大小 `(z, H, W)`.
    fn shape(&self) -> Idx3d;

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表空间 (相邻切片方向),
    /// 高 (自然图像的垂直方向), 宽 (自然图像的水平方向).
    fn pix_dim(&self) -> [f64; 3];

    /// 检查索引是否合法.
    #[inline]
    fn check(&self, (z0, h0, w0): &Idx3d) -> bool {
        let (z, h, w) = self.shape();
        *z0 < z && *h0 < h && *w0 < w
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }

    /// 与 `other` 是否位于同一网格上 (形状一致).
    #[inline]
    fn same_grid<G: VoxelGeometry>(&self, other: &G) -> bool {
        self.shape() == other.shape()
    }
}

/// 带体素分辨率的三维体数据. 数据按照 `[z, H, W]` 组织.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume<T> {
    data: Array3<T>,
    pix_dim: [f64; 3],
}

/// 二值掩膜. 任何非零体素都是前景.
pub type BinaryVolume = Volume<u8>;

/// 离散标签图谱 (脑叶, 左右半球).
pub type LabelVolume = Volume<u16>;

/// 连续概率图谱 (可切除性, 纤维束).
pub type ProbabilityVolume = Volume<f32>;

impl<T> VoxelGeometry for Volume<T> {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        self.pix_dim
    }
}

impl<T> Index<Idx3d> for Volume<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<Idx3d> for Volume<T> {
    #[inline]
    fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl<T> Volume<T> {
    /// 由 `[z, H, W]` 排布的裸数据和体素分辨率直接创建体数据.
    ///
    /// `pix_dim` 的每个分量都必须是正的有限数, 否则程序 panic.
    pub fn new(data: Array3<T>, pix_dim: [f64; 3]) -> Self {
        assert!(is_valid_pix_dim(&pix_dim), "非法体素分辨率 {pix_dim:?}");
        Self { data, pix_dim }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, T, Ix3> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut<'_, T, Ix3> {
        self.data.view_mut()
    }

    /// 获取 `pos` 处体素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx3d) -> Option<&T> {
        self.data.get(pos)
    }

    /// 以 `f` 逐体素映射到新的体数据, 体素分辨率不变.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Volume<U> {
        Volume {
            data: self.data.map(f),
            pix_dim: self.pix_dim,
        }
    }
}

impl<T: Copy> Volume<T> {
    /// 按顺序获取 `positions` 处的体素值.
    ///
    /// 如果存在越界索引, 则程序 panic.
    pub fn values_at<'a>(&'a self, positions: &'a [Idx3d]) -> impl Iterator<Item = T> + 'a {
        positions.iter().map(move |p| self.data[*p])
    }
}

impl<T: Zero + Copy> Volume<T> {
    /// 获取非零体素个数.
    #[inline]
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|v| !v.is_zero()).count()
    }

    /// 收集所有非零体素对应的下标. 结果按行优先存储.
    pub fn nonzero_pos(&self) -> Vec<Idx3d> {
        self.data
            .indexed_iter()
            .filter_map(|(pos, v)| (!v.is_zero()).then_some(pos))
            .collect()
    }
}

/// 二值掩膜操作部分
impl BinaryVolume {
    /// 打开 nii 文件格式的掩膜. 任何非零体素都被视为前景 (`MASK_TUMOR`).
    pub fn open_mask<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let (data, pix_dim) = read_nifti_f32(path.as_ref())?;
        let data = data.mapv(|v| if v != 0.0 { MASK_TUMOR } else { MASK_BACKGROUND });
        Ok(Self { data, pix_dim })
    }

    /// 创建与 `like` 同网格、同分辨率的空掩膜.
    pub fn empty_like<G: VoxelGeometry>(like: &G) -> Self {
        Self::new(Array3::zeros(like.shape()), like.pix_dim())
    }

    /// 掩膜中是否不含任何前景.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|p| is_background(*p))
    }

    /// 前景的实际体积, 以毫升为单位 (未取整).
    #[inline]
    pub fn volume_ml(&self) -> f64 {
        self.count_nonzero() as f64 * self.voxel() * MM3_TO_ML
    }

    /// 前景的质心 (体素坐标的算术平均值). 若不存在前景则返回 `None`.
    pub fn centroid(&self) -> Option<[f64; 3]> {
        let mut count = 0u64;
        let mut acc = [0.0f64; 3];
        for ((z, h, w), _) in self.data.indexed_iter().filter(|(_, p)| is_tumor(**p)) {
            count += 1;
            acc[0] += z as f64;
            acc[1] += h as f64;
            acc[2] += w as f64;
        }
        (count != 0).then(|| acc.map(|a| a / count as f64))
    }

    /// 两个同网格掩膜的交集体素个数.
    ///
    /// 若两者形状不一致, 则程序 panic.
    pub fn intersection_count(&self, other: &BinaryVolume) -> usize {
        assert!(self.same_grid(other));
        let mut cnt = 0usize;
        Zip::from(&self.data).and(&other.data).for_each(|a, b| {
            if is_tumor(*a) && is_tumor(*b) {
                cnt += 1;
            }
        });
        cnt
    }
}

/// 标签图谱操作部分
impl LabelVolume {
    /// 打开 nii 文件格式的标签图谱. 体素值被四舍五入为 `u16` 标签.
    pub fn open_labels<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let (data, pix_dim) = read_nifti_f32(path.as_ref())?;
        let data = data.mapv(|v| v.round().clamp(0.0, u16::MAX as f32) as u16);
        Ok(Self { data, pix_dim })
    }

    /// 获取图谱中出现过的所有非背景标签, 升序排列.
    pub fn labels(&self) -> Vec<u16> {
        let mut seen: Vec<u16> = self
            .data
            .iter()
            .copied()
            .filter(|l| !is_atlas_background(*l))
            .collect();
        seen.sort_unstable();
        seen.dedup();
        seen
    }

    /// 以 `(z, h, w)` 为起点, 提取 `[c - half, c + half)` 范围的立方体内全部标签.
    ///
    /// 立方体超出网格的部分会被截掉.
    pub fn sample_cube(&self, (z, h, w): Idx3d, half: usize) -> Vec<u16> {
        let (dz, dh, dw) = self.shape();
        let range = |c: usize, n: usize| c.saturating_sub(half)..(c + half).min(n);
        let mut ans = Vec::with_capacity((2 * half).pow(3));
        for zz in range(z, dz) {
            for hh in range(h, dh) {
                for ww in range(w, dw) {
                    ans.push(self.data[(zz, hh, ww)]);
                }
            }
        }
        ans
    }
}

/// 概率图谱操作部分
impl ProbabilityVolume {
    /// 打开 nii 文件格式的概率图谱.
    pub fn open_probability<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let (data, pix_dim) = read_nifti_f32(path.as_ref())?;
        Ok(Self { data, pix_dim })
    }

    /// 以 `cutoff` 为门限二值化. 不小于门限的体素成为前景.
    pub fn binarize(&self, cutoff: f32) -> BinaryVolume {
        self.map(|&p| if p >= cutoff { MASK_TUMOR } else { MASK_BACKGROUND })
    }
}
