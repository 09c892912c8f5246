//! 从磁盘目录加载图谱资源.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{AtlasReference, AtlasResources, LateralityCoding, LobeDescriptions, TractOrigin};
use crate::error::ConfigurationError;
use crate::{LabelVolume, ProbabilityVolume};

/// 纤维束文件名后缀. 文件名去掉后缀即为纤维束名称.
const NIFTI_SUFFIXES: [&str; 2] = [".nii.gz", ".nii"];

/// 图谱目录结构. 所有路径均相对于图谱根目录.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasLayout {
    /// 脑叶标签图谱.
    pub lobes: PathBuf,

    /// 脑叶描述表.
    pub lobes_description: PathBuf,

    /// 左右半球图谱.
    pub lateralisation: PathBuf,

    /// 可切除性概率图谱.
    pub resectability: PathBuf,

    /// 纤维束概率图谱所在目录.
    pub tracts_dir: PathBuf,

    /// 纤维束图谱来源.
    pub origin: TractOrigin,

    /// 左右半球编码.
    pub coding: LateralityCoding,
}

impl Default for AtlasLayout {
    fn default() -> Self {
        Self {
            lobes: PathBuf::from("lobes.nii.gz"),
            lobes_description: PathBuf::from("lobes_description.csv"),
            lateralisation: PathBuf::from("lateralisation.nii.gz"),
            resectability: PathBuf::from("resectability.nii.gz"),
            tracts_dir: PathBuf::from("tracts"),
            origin: TractOrigin::default(),
            coding: LateralityCoding::default(),
        }
    }
}

/// 若 `path` 是 nifti 文件, 返回去掉后缀的文件名.
fn tract_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    NIFTI_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .filter(|stem| !stem.is_empty())
        .map(str::to_owned)
}

impl AtlasLayout {
    /// 以 `root` 为图谱根目录加载并校验全部资源.
    pub fn load<P: AsRef<Path>>(&self, root: P) -> Result<AtlasReference, ConfigurationError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ConfigurationError::MissingResource(root.to_owned()));
        }
        info!("Loading atlas resources from `{}`", root.display());

        let lobes = LabelVolume::open_labels(root.join(&self.lobes))?;
        let descriptions = LobeDescriptions::open(root.join(&self.lobes_description))?;
        let lateralisation = LabelVolume::open_labels(root.join(&self.lateralisation))?;
        let resectability = ProbabilityVolume::open_probability(root.join(&self.resectability))?;
        let tracts = self.load_tracts(&root.join(&self.tracts_dir))?;
        info!(
            "Atlas loaded: {} lobe descriptions, {} tracts",
            descriptions.len(),
            tracts.len()
        );

        AtlasReference::try_from(AtlasResources {
            lobes,
            descriptions,
            lateralisation,
            coding: self.coding,
            resectability,
            tracts,
            origin: self.origin,
        })
    }

    /// 加载目录下全部纤维束. 目录不存在时视为配置错误.
    fn load_tracts(
        &self,
        dir: &Path,
    ) -> Result<BTreeMap<String, ProbabilityVolume>, ConfigurationError> {
        if !dir.is_dir() {
            return Err(ConfigurationError::MissingResource(dir.to_owned()));
        }
        let mut tracts = BTreeMap::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(name) = tract_name(&path) else {
                continue;
            };
            debug!("Loading tract `{name}`");
            tracts.insert(name, ProbabilityVolume::open_probability(&path)?);
        }
        Ok(tracts)
    }
}
