//! 诊断流程配置.
//!
//! 配置对象在流程开始前构建一次, 之后以只读引用的方式传入各个组件.
//! 不存在任何全局可变状态.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigurationError;

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
/// 无法确定用户主目录时返回 `None`.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}

/// 一次诊断运行所需的全部常量.
///
/// 使用 [`Default`] 获取与临床报告一致的默认值.
/// 反序列化时缺失的字段取默认值.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosisConfig {
    /// 闭运算球形结构元半径 (体素).
    pub closing_radius: usize,

    /// 连通域最少体素数. 少于该值的连通域被视为噪声.
    pub min_component_voxels: usize,

    /// 判定多灶的最小 HD95 距离 (毫米).
    pub multifocal_distance_mm: f64,

    /// 计入肿瘤部分个数的最小体积 (毫升).
    pub part_min_volume_ml: f64,

    /// 全范围脑叶统计的丢弃比例.
    pub lobe_discard_ratio: f64,

    /// "几乎完全位于一侧" 的占比下限 (闭区间).
    pub laterality_dominant_ratio: f64,

    /// "大部分位于一侧" 的占比下限 (闭区间).
    pub laterality_mostly_ratio: f64,

    /// 质心采样立方体的半宽 (体素).
    pub centroid_half_width: usize,

    /// 肿瘤类型. 由上游 (分割模型的选择) 决定, 仅原样写入报告.
    pub tumor_type: String,
}

impl Default for DiagnosisConfig {
    fn default() -> Self {
        Self {
            closing_radius: CLOSING_RADIUS,
            min_component_voxels: MIN_COMPONENT_VOXELS,
            multifocal_distance_mm: MULTIFOCAL_DISTANCE_MM,
            part_min_volume_ml: PART_MIN_VOLUME_ML,
            lobe_discard_ratio: LOBE_DISCARD_RATIO,
            laterality_dominant_ratio: LATERALITY_DOMINANT_RATIO,
            laterality_mostly_ratio: LATERALITY_MOSTLY_RATIO,
            centroid_half_width: CENTROID_HALF_WIDTH,
            tumor_type: String::from("Glioblastoma"),
        }
    }
}

impl DiagnosisConfig {
    /// 从 JSON 文件读取配置. 文件中缺失的字段取默认值.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigurationError::MissingResource(path.to_owned()));
        }
        let rdr = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(rdr)?)
    }

    /// 以默认值构建, 并指定肿瘤类型.
    pub fn with_tumor_type(tumor_type: impl Into<String>) -> Self {
        Self {
            tumor_type: tumor_type.into(),
            ..Self::default()
        }
    }
}
