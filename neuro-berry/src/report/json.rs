//! JSON 报告. 字段名与嵌套结构是对外接口, 字段顺序固定.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{NeuroDiagnosisParameters, OrderingPolicy};
use crate::diagnosis::stats::{ScopeStatistics, TumorStatistics};

/// 整个报告: `Overall`, 然后按 [`ScopeId`](super::ScopeId) 顺序排列的各范围.
pub(super) struct JsonReport<'a> {
    params: &'a NeuroDiagnosisParameters,
    policy: OrderingPolicy,
}

impl<'a> JsonReport<'a> {
    pub(super) fn new(params: &'a NeuroDiagnosisParameters, policy: OrderingPolicy) -> Self {
        Self { params, policy }
    }
}

struct Overall<'a>(&'a NeuroDiagnosisParameters);

struct Scope<'a> {
    stats: &'a ScopeStatistics,
    policy: OrderingPolicy,
}

struct SubScope<'a> {
    stats: &'a TumorStatistics,
    policy: OrderingPolicy,
}

impl Serialize for JsonReport<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.params.statistics.len()))?;
        map.serialize_entry("Overall", &Overall(self.params))?;
        for (id, stats) in self.params.statistics.iter() {
            let scope = Scope {
                stats,
                policy: self.policy,
            };
            map.serialize_entry(&id.to_string(), &scope)?;
        }
        map.end()
    }
}

impl Serialize for Overall<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let p = self.0;
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("Presence", &p.tumor_presence)?;
        map.serialize_entry("Type", &p.tumor_type)?;
        map.serialize_entry("Multifocality", &p.tumor_multifocal)?;
        map.serialize_entry("Tumor parts nb", &p.tumor_parts)?;
        map.serialize_entry("Multifocal distance (mm)", &p.multifocal_largest_minimum_distance)?;
        map.end()
    }
}

impl Serialize for Scope<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sub = |stats| SubScope {
            stats,
            policy: self.policy,
        };
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("CenterOfMass", &sub(&self.stats.centroid_only))?;
        map.serialize_entry("Total", &sub(&self.stats.full_extent))?;
        map.end()
    }
}

impl Serialize for SubScope<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (st, policy) = (self.stats, self.policy);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("Laterality", &st.laterality)?;
        map.serialize_entry("Laterality percentage", &st.laterality_percentage)?;
        if let Some(left) = st.left_laterality_percentage {
            map.serialize_entry("Left laterality percentage", &left)?;
        }
        if let Some(right) = st.right_laterality_percentage {
            map.serialize_entry("Right laterality percentage", &right)?;
        }
        map.serialize_entry("Lobe", &policy.descending(&st.lobes))?;
        map.serialize_entry("Volume (ml)", &st.volume_ml)?;
        map.serialize_entry("Resectability", &st.resectability_score)?;
        map.serialize_entry("Tract distance (mm)", &policy.by_distance(&st.tract_distances))?;
        map.serialize_entry("Tract overlap", &policy.descending(&st.tract_overlaps))?;
        map.serialize_entry(
            "Tract disconnection max",
            &policy.descending(&st.tract_disconnection_max),
        )?;
        map.serialize_entry(
            "Tract disconnection mean",
            &policy.descending(&st.tract_disconnection_mean),
        )?;
        map.end()
    }
}
