//! 🧠欢迎光临🩺
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::data::{BinaryVolume, LabelVolume, ProbabilityVolume, Volume, VoxelGeometry};

pub use crate::consts::gray::{ATLAS_BACKGROUND, MASK_BACKGROUND, MASK_TUMOR};
pub use crate::consts::UNDEFINED_DISTANCE;

pub use crate::atlas::{AtlasLayout, AtlasReference, LateralityCoding, Side, TractOrigin};
pub use crate::config::DiagnosisConfig;
pub use crate::diagnosis::stats::{ScopeStatistics, TumorStatistics, UNDETERMINED_LATERALITY};
pub use crate::diagnosis::{run_diagnosis, Diagnosis, Stage};
pub use crate::error::{ComputationError, ConfigurationError, DiagnosisError, DiagnosisResult};
pub use crate::report::{NeuroDiagnosisParameters, OrderingPolicy, ScopeId};
