//! 通用常量.

/// 单通道体素取值.
pub mod gray {
    /// 二值掩膜中, 背景的体素值.
    pub const MASK_BACKGROUND: u8 = 0;

    /// 二值掩膜中, 肿瘤 (前景) 的体素值.
    pub const MASK_TUMOR: u8 = 1;

    /// 标签图谱 (脑叶, 左右半球) 中背景的标签值.
    pub const ATLAS_BACKGROUND: u16 = 0;

    /// 体素是否是肿瘤?
    ///
    /// 任何非零值都被视为前景.
    #[inline]
    pub const fn is_tumor(p: u8) -> bool {
        p != MASK_BACKGROUND
    }

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, MASK_BACKGROUND)
    }

    /// 图谱标签是否是背景?
    #[inline]
    pub const fn is_atlas_background(label: u16) -> bool {
        label == ATLAS_BACKGROUND
    }
}

/// 距离无定义 (纤维束与肿瘤重叠, 或纤维束为空, 或肿瘤只有一个部分) 时的哨兵值.
pub const UNDEFINED_DISTANCE: f64 = -1.0;

/// 立方毫米到毫升的换算系数.
pub const MM3_TO_ML: f64 = 1e-3;

/// BCB 纤维束图谱的二值化阈值.
pub const BCB_TRACT_CUTOFF: f32 = 0.25;

/// 其它来源纤维束图谱的二值化阈值.
pub const GENERIC_TRACT_CUTOFF: f32 = 0.5;

/// 形态学闭运算的球形结构元半径 (体素).
pub const CLOSING_RADIUS: usize = 2;

/// 连通域最少体素数. 与体素的物理大小无关.
pub const MIN_COMPONENT_VOXELS: usize = 100;

/// 判定多灶的最小 HD95 距离 (毫米).
pub const MULTIFOCAL_DISTANCE_MM: f64 = 5.0;

/// 计入肿瘤部分个数的最小体积 (毫升).
pub const PART_MIN_VOLUME_ML: f64 = 0.1;

/// 全范围脑叶统计中, 占比低于该值的标签被丢弃.
pub const LOBE_DISCARD_RATIO: f64 = 0.05;

/// "几乎完全位于一侧" 的占比下限.
pub const LATERALITY_DOMINANT_RATIO: f64 = 0.95;

/// "大部分位于一侧" 的占比下限.
pub const LATERALITY_MOSTLY_RATIO: f64 = 0.60;

/// 质心采样立方体的半宽 (体素). 采样范围为 `[c - 3, c + 3)`.
pub const CENTROID_HALF_WIDTH: usize = 3;

/// Hausdorff 距离所取的百分位.
pub const HD_PERCENTILE: f64 = 95.0;
