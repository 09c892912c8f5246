//! `diagnose <tumor_mask.nii.gz> [output_dir]`
//!
//! 图谱目录由 `$NEURO_ATLAS_DIR` 指定, 默认为 `$HOME/dataset/atlas`.
//! 可选的 JSON 配置文件由 `$NEURO_DIAGNOSIS_CONFIG` 指定.

mod result;
mod runner;

use std::process::ExitCode;

fn main() -> ExitCode {
    simple_logger::init_with_level(log::Level::Info).unwrap();

    let Some(args) = runner::Args::parse(std::env::args()) else {
        eprintln!("Usage: diagnose <tumor_mask.nii.gz> [output_dir]");
        return ExitCode::from(2);
    };
    match runner::run(&args) {
        Ok(report) => match report.analyze() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("Failed to print summary: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            log::error!("Diagnosis failed: {e}");
            ExitCode::FAILURE
        }
    }
}
