//! 运行时错误.

use std::path::PathBuf;

use crate::Idx3d;

/// 图谱资源缺失或格式错误. 该错误是致命的.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// 资源文件不存在.
    #[error("atlas resource `{}` does not exist", .0.display())]
    MissingResource(PathBuf),

    /// 读取 nifti 文件错误.
    #[error("failed to read nifti volume: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// 读取脑叶描述表错误.
    #[error("failed to read lobe description table: {0}")]
    Csv(#[from] csv::Error),

    /// 读取诊断配置文件错误.
    #[error("failed to parse diagnosis configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他底层 I/O 错误.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// nifti 数据不是三维体数据.
    #[error("`{}` is not a 3D volume (dim = {dims:?})", .path.display())]
    NotVolume3d {
        /// 文件路径.
        path: PathBuf,
        /// nifti header 中的 `dim` 字段.
        dims: [u16; 8],
    },

    /// 体素数组形状与声明的形状不一致.
    #[error("malformed voxel array: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// 体素分辨率非法 (非正或非有限).
    #[error("invalid voxel spacing {0:?}")]
    InvalidSpacing([f64; 3]),

    /// 资源与参考网格形状不一致.
    #[error("`{name}` has shape {found:?}, expected {expected:?}")]
    GridMismatch {
        /// 资源名称.
        name: String,
        /// 参考网格形状.
        expected: Idx3d,
        /// 实际形状.
        found: Idx3d,
    },

    /// 脑叶标签在描述表中不存在.
    #[error("lobe label {0} has no entry in the description table")]
    UnknownLobeLabel(u16),

    /// 左右半球图谱中出现了编码以外的取值.
    #[error("lateralisation atlas contains value {found}, expected one of 0, {left} (left), {right} (right)")]
    LateralityCoding {
        /// 实际出现的取值.
        found: u16,
        /// 左侧编码.
        left: u16,
        /// 右侧编码.
        right: u16,
    },

    /// 左右两侧编码相同或与背景冲突.
    #[error("invalid laterality coding: left = {left}, right = {right}")]
    AmbiguousCoding {
        /// 左侧编码.
        left: u16,
        /// 右侧编码.
        right: u16,
    },
}

/// 几何 / 统计计算中的意外失败. 该错误是致命的.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputationError {
    /// 参与表面距离计算的掩膜为空.
    #[error("surface distance is undefined for an empty mask")]
    EmptySurface,

    /// 质心周围采样到的标签不属于左右半球编码.
    #[error("atlas label around centroid {0:?} is not a hemisphere code")]
    DegenerateCentroid(Idx3d),

    /// 统计范围 (scope) 为空.
    #[error("statistics scope `{0}` is empty")]
    EmptyScope(String),

    /// 流程状态转移顺序错误.
    #[error("invalid stage transition from {from} to {to}")]
    StageOrder {
        /// 当前阶段.
        from: &'static str,
        /// 目标阶段.
        to: &'static str,
    },
}

/// 一次诊断运行的错误.
#[derive(Debug, thiserror::Error)]
pub enum DiagnosisError {
    /// 见 [`ConfigurationError`].
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// 去噪之后肿瘤掩膜为空. 该错误由流程内部处理, 产生 "无肿瘤" 结果.
    #[error("tumor mask is empty after noise filtering")]
    EmptyInput,

    /// 见 [`ComputationError`].
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

/// 诊断流程运行结果.
pub type DiagnosisResult<T> = Result<T, DiagnosisError>;
