//! 程序运行函数.

use crate::result::DiagnosisReport;
use log::info;
use neuro_berry::{run_diagnosis, BinaryVolume};
use std::error::Error;
use std::path::{Path, PathBuf};
use utils::loader;

/// 命令行参数.
pub struct Args {
    /// 已配准到图谱空间的肿瘤掩膜.
    pub mask: PathBuf,

    /// 报告输出目录.
    pub output_dir: PathBuf,
}

impl Args {
    /// 解析 `diagnose <tumor_mask.nii.gz> [output_dir]`. 输出目录默认为当前目录.
    pub fn parse<I: IntoIterator<Item = String>>(it: I) -> Option<Self> {
        let mut it = it.into_iter().skip(1);
        let mask = PathBuf::from(it.next()?);
        let output_dir = it.next().map_or_else(|| PathBuf::from("."), PathBuf::from);
        if it.next().is_some() {
            return None;
        }
        Some(Self { mask, output_dir })
    }
}

/// 掩膜文件名, 用于摘要标题.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// 实际运行.
pub fn run(args: &Args) -> Result<DiagnosisReport, Box<dyn Error>> {
    let config = loader::config_from_env_or_default()?;
    let atlas = loader::atlas_from_env_or_home()?;

    info!("Reading tumor mask `{}`", args.mask.display());
    let mask = BinaryVolume::open_mask(&args.mask)?;
    let params = run_diagnosis(&mask, &atlas, &config)?;

    let report = DiagnosisReport::new(display_name(&args.mask), params);
    for path in report.persist(&args.output_dir)? {
        info!("Report written to `{}`", path.display());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Option<Args> {
        Args::parse(v.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let a = args(&["diagnose", "mask.nii.gz"]).unwrap();
        assert_eq!(a.mask, PathBuf::from("mask.nii.gz"));
        assert_eq!(a.output_dir, PathBuf::from("."));

        let a = args(&["diagnose", "mask.nii.gz", "out"]).unwrap();
        assert_eq!(a.output_dir, PathBuf::from("out"));

        assert!(args(&["diagnose"]).is_none());
        assert!(args(&["diagnose", "a", "b", "c"]).is_none());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/data/p01/tumor.nii.gz")), "tumor.nii.gz");
    }
}
