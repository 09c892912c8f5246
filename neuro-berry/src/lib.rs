#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 在标准脑图谱空间 (MNI 等) 中对已分割的脑肿瘤进行结构化统计分析.
//!
//! 输入是已经配准到图谱空间的二值肿瘤掩膜, 以及同一网格上的一组图谱资源
//! (脑叶标签, 左右半球划分, 可切除性概率图, 白质纤维束概率图).
//! 输出是 [`NeuroDiagnosisParameters`], 可进一步序列化为文本报告或 JSON.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 配准本身 (以及肿瘤分割) 不在本 crate 的范围内.
//!   所有输入体数据必须位于同一网格上, 否则返回 [`ConfigurationError`].
//! 2. 整个流程是单线程、同步、确定性的. 对相同输入运行多次, 结果逐位一致.
//!
//! # 流程
//!
//! ### 连通域提取 ✅
//!
//! 球形结构元 (半径 2) 形态学闭运算, 26-连通标记,
//! 去除体素数不足 100 的小连通域.
//!
//! 实现位于 `neuro-berry/src/diagnosis/components.rs`.
//!
//! ### 多灶性判断 ✅
//!
//! 以等效半径最大的连通域为主体, 计算其余连通域到主体的 HD95 距离.
//! 最大距离不小于 5 毫米即判定为多灶.
//!
//! 实现位于 `neuro-berry/src/diagnosis/multifocal.rs`.
//!
//! ### 空间统计 ✅
//!
//! 左右侧 (质心 / 全范围), 脑叶 (质心 / 全范围), 体积, 可切除性,
//! 纤维束距离与重叠, 纤维束断连概率.
//!
//! 实现位于 `neuro-berry/src/diagnosis/stats`.
//!
//! ### 报告 ✅
//!
//! 文本报告与 JSON 报告. 结果排序策略由序列化调用方指定.
//!
//! 实现位于 `neuro-berry/src/report`.

/// 三维索引 `(z, h, w)`, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 三维体素偏移量 `(dz, dh, dw)`.
type Offset3d = (isize, isize, isize);

pub mod atlas;
pub mod config;
pub mod consts;
mod data;
pub mod diagnosis;
mod error;
pub mod prelude;
pub mod report;

pub use data::{
    distance, morph_3d, BinaryVolume, LabelVolume, ProbabilityVolume, Volume, VoxelGeometry,
};

pub use atlas::AtlasReference;
pub use config::DiagnosisConfig;
pub use diagnosis::run_diagnosis;
pub use error::{ComputationError, ConfigurationError, DiagnosisError, DiagnosisResult};
pub use report::{NeuroDiagnosisParameters, OrderingPolicy, ScopeId};
