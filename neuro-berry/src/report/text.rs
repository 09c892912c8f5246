//! 文本报告.

use std::fmt::{self, Write};

use super::{NeuroDiagnosisParameters, OrderingPolicy, ScopeId};
use crate::diagnosis::stats::TumorStatistics;

const S4: &str = "    ";
const S8: &str = "        ";

#[inline]
fn distance_to_display(d: f64) -> String {
    if d < 0.0 {
        "/".to_string()
    } else {
        format!("{d:.2} mm")
    }
}

/// 重叠比例按百分比显示. 不足 0.01% 的正重叠不会显示为 0.
#[inline]
fn overlap_to_display(ratio: f64) -> String {
    let pct = ratio * 100.0;
    if pct > 0.0 && pct < 0.005 {
        "<0.01%".to_string()
    } else {
        format!("{pct:.2}%")
    }
}

/// 将一个子范围的统计量写进 `w` 中.
fn describe_sub_into<W: Write>(
    title: &str,
    st: &TumorStatistics,
    policy: OrderingPolicy,
    w: &mut W,
) -> fmt::Result {
    writeln!(w, "{S4}[{title}]")?;
    write!(
        w,
        "{S4}Laterality: {} ({:.2}%)",
        st.laterality, st.laterality_percentage
    )?;
    if let (Some(left), Some(right)) = (st.left_laterality_percentage, st.right_laterality_percentage)
    {
        write!(w, ", left {left:.2}%, right {right:.2}%")?;
    }
    writeln!(w)?;

    let lobes = policy.descending(&st.lobes);
    if lobes.is_empty() {
        writeln!(w, "{S4}Lobes: /")?;
    } else {
        let lobes: Vec<_> = lobes.iter().map(|(r, p)| format!("{r} ({p:.2}%)")).collect();
        writeln!(w, "{S4}Lobes: {}", lobes.join(", "))?;
    }
    writeln!(w, "{S4}Volume: {:.2} ml", st.volume_ml)?;
    writeln!(w, "{S4}Resectability: {:.4}", st.resectability_score)?;

    writeln!(w, "{S4}Tract distances:")?;
    for (name, d) in policy.by_distance(&st.tract_distances) {
        writeln!(w, "{S8}{name}: {}", distance_to_display(d))?;
    }
    writeln!(w, "{S4}Tract overlaps:")?;
    for (name, o) in policy.descending(&st.tract_overlaps) {
        writeln!(w, "{S8}{name}: {}", overlap_to_display(o))?;
    }
    writeln!(w, "{S4}Tract disconnection (max / mean):")?;
    for (name, max) in policy.descending(&st.tract_disconnection_max) {
        let mean = st.tract_disconnection_mean.get(name).copied().unwrap_or_default();
        writeln!(w, "{S8}{name}: {max:.4} / {mean:.4}")?;
    }
    Ok(())
}

/// 文本报告. 通过 [`fmt::Display`] 输出.
pub(super) struct TextReport<'a> {
    params: &'a NeuroDiagnosisParameters,
    policy: OrderingPolicy,
}

impl<'a> TextReport<'a> {
    pub(super) fn new(params: &'a NeuroDiagnosisParameters, policy: OrderingPolicy) -> Self {
        Self { params, policy }
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe_into(self.params, self.policy, f)
    }
}

/// 将 `params` 写进 `w` 中. 各范围按 [`ScopeId`] 顺序排列.
fn describe_into<W: Write>(
    params: &NeuroDiagnosisParameters,
    policy: OrderingPolicy,
    w: &mut W,
) -> fmt::Result {
    writeln!(w, "Tumor presence: {}", params.tumor_presence)?;
    writeln!(w, "Tumor type: {}", params.tumor_type)?;
    if !params.tumor_presence {
        return Ok(());
    }
    writeln!(w, "Multifocal: {}", params.tumor_multifocal)?;
    writeln!(w, "Tumor parts: {}", params.tumor_parts)?;
    writeln!(
        w,
        "Multifocal distance: {}",
        distance_to_display(params.multifocal_largest_minimum_distance)
    )?;

    for (id, stats) in params.statistics.iter() {
        writeln!(w)?;
        match id {
            ScopeId::Whole => writeln!(w, "Scope `{id}` (whole tumor):")?,
            ScopeId::Component(i) => match params.component(*i) {
                Some(c) => writeln!(
                    w,
                    "Scope `{id}` ({} voxels, equivalent radius {:.2} voxels, centroid [{:.1}, {:.1}, {:.1}]):",
                    c.voxel_count,
                    c.equivalent_radius(),
                    c.centroid[0],
                    c.centroid[1],
                    c.centroid[2],
                )?,
                None => writeln!(w, "Scope `{id}`:")?,
            },
        }
        describe_sub_into("CenterOfMass", &stats.centroid_only, policy, w)?;
        describe_sub_into("Total", &stats.full_extent, policy, w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_parameters;
    use super::*;

    #[test]
    fn test_text_report() {
        let s = sample_parameters().to_text(OrderingPolicy::AsComputed);
        assert!(s.starts_with("Tumor presence: true\nTumor type: Glioblastoma\n"));
        assert!(s.contains("Multifocal distance: 21.50 mm\n"));
        assert!(s.contains("Scope `Main` (whole tumor):\n"));
        assert!(s.contains("Scope `2` (4500 voxels"));
        assert!(s.contains("    Laterality: Left (100.00%)\n"));
        assert!(s.contains("    Laterality: MostlyLeft ([60%-95%[) (80.00%), left 80.00%, right 20.00%\n"));
        assert!(s.contains("    Lobes: Frontal (30.00%), Temporal (65.00%)\n"));
        assert!(s.contains("        AF_left: /\n"));
        assert!(s.contains("        AF_left: 0.9000 / 0.4000\n"));
        assert!(s.contains("        AF_left: 12.50%\n"));
        assert!(s.contains("        UF_left: <0.01%\n"));
        assert!(s.contains("        CST_right: 0.00%\n"));
        assert!(s.find("Scope `Main`").unwrap() < s.find("Scope `1`").unwrap());
    }

    #[test]
    fn test_ranked_text() {
        let s = sample_parameters().to_text(OrderingPolicy::Ranked);
        assert!(s.contains("    Lobes: Temporal (65.00%), Frontal (30.00%)\n"));
        let uf = s.find("        UF_left: 3.00 mm").unwrap();
        let cst = s.find("        CST_right: 7.25 mm").unwrap();
        assert!(uf < cst);
    }

    #[test]
    fn test_absent_text() {
        let p = NeuroDiagnosisParameters::absent("Glioblastoma");
        assert_eq!(
            p.to_text(OrderingPolicy::AsComputed),
            "Tumor presence: false\nTumor type: Glioblastoma\n"
        );
    }
}
