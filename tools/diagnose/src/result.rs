//! 诊断结果输出.

use neuro_berry::{NeuroDiagnosisParameters, OrderingPolicy, ScopeId};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// 文本报告文件名.
pub const TEXT_REPORT: &str = "neuro_clinical_report.txt";

/// JSON 报告文件名.
pub const JSON_REPORT: &str = "neuro_clinical_report.json";

/// 将 `p` 的摘要写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &NeuroDiagnosisParameters, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn distance_to_display(d: f64) -> String {
        if d < 0.0 {
            "/".to_string()
        } else {
            format!("{d:.2} mm")
        }
    }

    writeln!(w, "Diagnosis `{name}`:")?;
    writeln!(w, "{S4}Tumor presence: {}", p.tumor_presence)?;
    if !p.tumor_presence {
        return Ok(());
    }
    writeln!(w, "{S4}Multifocal: {}", p.tumor_multifocal)?;
    writeln!(w, "{S4}Tumor parts: {}", p.tumor_parts)?;
    writeln!(
        w,
        "{S4}Multifocal distance: {}",
        distance_to_display(p.multifocal_largest_minimum_distance)
    )?;
    if let Some(whole) = p.scope(ScopeId::Whole) {
        let total = &whole.full_extent;
        writeln!(w, "{S4}Volume: {:.2} ml", total.volume_ml)?;
        writeln!(w, "{S4}Laterality: {}", total.laterality)?;
        writeln!(w, "{S4}Resectability: {:.4}", total.resectability_score)?;
        let overlapped = total.tract_overlaps.values().filter(|o| **o > 0.0).count();
        write!(
            w,
            "{S4}Overlapped tracts: {overlapped} of {}",
            total.tract_overlaps.len()
        )?;
    }
    Ok(())
}

/// 一次诊断的最终结果.
pub struct DiagnosisReport {
    name: String,
    params: NeuroDiagnosisParameters,
}

impl DiagnosisReport {
    /// 以输入文件名 `name` 包装诊断结果.
    pub fn new(name: impl Into<String>, params: NeuroDiagnosisParameters) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// 将文本报告和 JSON 报告写入 `dir`, 返回两个文件的路径.
    pub fn persist<P: AsRef<Path>>(&self, dir: P) -> io::Result<[PathBuf; 2]> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let (text, json) = (dir.join(TEXT_REPORT), dir.join(JSON_REPORT));
        self.params.write_text(&text, OrderingPolicy::Ranked)?;
        self.params.write_json(&json, OrderingPolicy::Ranked)?;
        Ok([text, json])
    }

    /// 打印结果摘要.
    pub fn analyze(&self) -> io::Result<()> {
        utils::sep();
        let mut buf = Vec::with_capacity(512);
        describe_into(&self.name, &self.params, &mut buf)?;
        println!("{}", String::from_utf8_lossy(&buf));
        utils::sep();
        Ok(())
    }
}
