//! 对 `neuro-berry::atlas` 的更一层封装. 提供按环境变量定位的图谱与配置加载器.

use neuro_berry::atlas::AtlasLayout;
use neuro_berry::config::home_dataset_dir_with;
use neuro_berry::{AtlasReference, ConfigurationError, DiagnosisConfig};
use std::env;
use std::path::PathBuf;

/// 图谱目录环境变量.
pub const ATLAS_DIR_ENV: &str = "NEURO_ATLAS_DIR";

/// 诊断配置文件环境变量.
pub const CONFIG_ENV: &str = "NEURO_DIAGNOSIS_CONFIG";

/// 获取图谱根目录.
///
/// 1. 若环境变量 `$NEURO_ATLAS_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/atlas`;
/// 3. 无法确定用户主目录时返回 `None`.
pub fn atlas_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var(ATLAS_DIR_ENV) {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => home_dataset_dir_with(["atlas"]),
    }
}

/// 从 `$NEURO_ATLAS_DIR` 或者 `$HOME/dataset/atlas` 下以默认目录结构加载图谱.
pub fn atlas_from_env_or_home() -> Result<AtlasReference, ConfigurationError> {
    let dir = atlas_dir_from_env_or_home()
        .ok_or_else(|| ConfigurationError::MissingResource(PathBuf::from("$HOME/dataset/atlas")))?;
    AtlasLayout::default().load(dir)
}

/// 获取诊断配置.
///
/// 1. 若环境变量 `$NEURO_DIAGNOSIS_CONFIG` 非空, 则从该 JSON 文件读取;
/// 2. 否则, 使用默认配置.
pub fn config_from_env_or_default() -> Result<DiagnosisConfig, ConfigurationError> {
    match env::var(CONFIG_ENV) {
        Ok(p) if !p.is_empty() => DiagnosisConfig::open(p),
        _ => Ok(DiagnosisConfig::default()),
    }
}
