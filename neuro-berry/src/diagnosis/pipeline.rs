//! 诊断流程状态机.

use log::info;

use super::components::extract_components;
use super::multifocal::{analyze_multifocality, Multifocality};
use super::stats::SpatialStatisticsEngine;
use crate::atlas::AtlasReference;
use crate::config::DiagnosisConfig;
use crate::error::{ComputationError, ConfigurationError, DiagnosisError, DiagnosisResult};
use crate::morph_3d::ComponentLabels;
use crate::report::{NeuroDiagnosisParameters, ScopeId};
use crate::{BinaryVolume, VoxelGeometry};

/// 流程阶段. 阶段只能按固定顺序前进, 每个阶段至多进入一次.
///
/// ```text
/// Init -> ComponentsExtracted -> MultifocalityResolved -> WholeTumorStatsComputed
///                 |                                         |            |
///                 | (无肿瘤)                                 | (多灶)      | (单灶)
///                 v                                         v            v
///             Finalized <------------ PerComponentStatsComputed      Finalized
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// 初始状态.
    Init,

    /// 已提取连通域.
    ComponentsExtracted,

    /// 已判断多灶性.
    MultifocalityResolved,

    /// 已完成整个肿瘤的统计.
    WholeTumorStatsComputed,

    /// 已完成各连通域的统计 (仅多灶时).
    PerComponentStatsComputed,

    /// 结束.
    Finalized,
}

impl Stage {
    /// 阶段名称.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "INIT",
            Stage::ComponentsExtracted => "COMPONENTS_EXTRACTED",
            Stage::MultifocalityResolved => "MULTIFOCALITY_RESOLVED",
            Stage::WholeTumorStatsComputed => "WHOLE_TUMOR_STATS_COMPUTED",
            Stage::PerComponentStatsComputed => "PER_COMPONENT_STATS_COMPUTED",
            Stage::Finalized => "FINALIZED",
        }
    }

    /// `self -> to` 是否是合法转移. 是否需要经过连通域统计由 [`Diagnosis`] 另行判断.
    fn can_advance_to(&self, to: Stage) -> bool {
        use Stage::*;
        matches!(
            (*self, to),
            (Init, ComponentsExtracted)
                | (ComponentsExtracted, MultifocalityResolved)
                | (ComponentsExtracted, Finalized)
                | (MultifocalityResolved, WholeTumorStatsComputed)
                | (WholeTumorStatsComputed, PerComponentStatsComputed)
                | (WholeTumorStatsComputed, Finalized)
                | (PerComponentStatsComputed, Finalized)
        )
    }
}

/// 一次诊断运行. 持有图谱与配置的只读引用, 以及唯一的可变状态: 结果汇总.
#[derive(Debug)]
pub struct Diagnosis<'a> {
    atlas: &'a AtlasReference,
    config: &'a DiagnosisConfig,
    stage: Stage,
    labels: Option<ComponentLabels>,
    multifocality: Option<Multifocality>,
    params: NeuroDiagnosisParameters,
}

impl<'a> Diagnosis<'a> {
    /// 以 `atlas` 和 `config` 创建新的诊断运行.
    pub fn new(atlas: &'a AtlasReference, config: &'a DiagnosisConfig) -> Self {
        Self {
            atlas,
            config,
            stage: Stage::Init,
            labels: None,
            multifocality: None,
            params: NeuroDiagnosisParameters::absent(config.tumor_type.as_str()),
        }
    }

    /// 当前阶段.
    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, to: Stage) -> Result<(), ComputationError> {
        if !self.stage.can_advance_to(to) {
            return Err(ComputationError::StageOrder {
                from: self.stage.as_str(),
                to: to.as_str(),
            });
        }
        info!("Diagnosis stage: {} -> {}", self.stage.as_str(), to.as_str());
        self.stage = to;
        Ok(())
    }

    fn labels(&self) -> Result<&ComponentLabels, ComputationError> {
        self.labels.as_ref().ok_or(ComputationError::StageOrder {
            from: self.stage.as_str(),
            to: Stage::ComponentsExtracted.as_str(),
        })
    }

    /// 提取连通域.
    ///
    /// # 注意
    ///
    /// 1. `mask` 必须与图谱网格形状一致, 否则返回 [`ConfigurationError::GridMismatch`].
    /// 2. 过滤之后不存在连通域时返回 [`DiagnosisError::EmptyInput`],
    ///   此时流程只能进入 [`Stage::Finalized`].
    pub fn extract_components(&mut self, mask: &BinaryVolume) -> DiagnosisResult<()> {
        let expected = self.atlas.grid_shape();
        if mask.shape() != expected {
            return Err(ConfigurationError::GridMismatch {
                name: "tumor mask".to_owned(),
                expected,
                found: mask.shape(),
            }
            .into());
        }
        self.advance(Stage::ComponentsExtracted)?;

        let labels = extract_components(mask, self.config);
        let empty = labels.is_empty();
        self.params.components = labels.components().to_vec();
        self.labels = Some(labels);
        if empty {
            return Err(DiagnosisError::EmptyInput);
        }
        self.params.tumor_presence = true;
        Ok(())
    }

    /// 判断多灶性.
    pub fn resolve_multifocality(&mut self) -> DiagnosisResult<()> {
        self.advance(Stage::MultifocalityResolved)?;
        let labels = self.labels()?;
        let m = analyze_multifocality(labels, labels.pix_dim(), self.config)?;
        info!(
            "Multifocal: {}, parts: {}, largest distance: {:.3} mm",
            m.multifocal, m.parts, m.largest_minimum_distance
        );
        self.params.tumor_multifocal = m.multifocal;
        self.params.tumor_parts = m.parts;
        self.params.multifocal_largest_minimum_distance = m.largest_minimum_distance;
        self.multifocality = Some(m);
        Ok(())
    }

    /// 计算整个肿瘤 (去噪之后的全部连通域) 的统计量.
    pub fn compute_whole_tumor(&mut self) -> DiagnosisResult<()> {
        self.advance(Stage::WholeTumorStatsComputed)?;
        let scope = self.labels()?.union_mask();
        let stats = SpatialStatisticsEngine::new(self.atlas, self.config)
            .compute(&ScopeId::Whole.to_string(), &scope)?;
        self.params.statistics.insert(ScopeId::Whole, stats);
        Ok(())
    }

    /// 分别计算每个连通域的统计量. 仅在多灶时调用.
    pub fn compute_per_component(&mut self) -> DiagnosisResult<()> {
        self.advance(Stage::PerComponentStatsComputed)?;
        let engine = SpatialStatisticsEngine::new(self.atlas, self.config);
        let labels = self.labels()?;
        let mut computed = Vec::with_capacity(labels.len());
        for c in labels.components() {
            let id = ScopeId::Component(c.id);
            computed.push((id, engine.compute(&id.to_string(), &labels.mask_of(c.id))?));
        }
        self.params.statistics.extend(computed);
        Ok(())
    }

    /// 当前结果是否为多灶.
    #[inline]
    pub fn is_multifocal(&self) -> bool {
        self.multifocality.is_some_and(|m| m.multifocal)
    }

    /// 结束流程, 交出结果.
    ///
    /// 只能从最后一个必需的阶段结束: 无肿瘤时为连通域提取,
    /// 单灶时为整个肿瘤统计, 多灶时为各连通域统计.
    pub fn finalize(mut self) -> DiagnosisResult<NeuroDiagnosisParameters> {
        let required = if !self.params.tumor_presence {
            Stage::ComponentsExtracted
        } else if self.is_multifocal() {
            Stage::PerComponentStatsComputed
        } else {
            Stage::WholeTumorStatsComputed
        };
        if self.stage != required {
            return Err(ComputationError::StageOrder {
                from: self.stage.as_str(),
                to: Stage::Finalized.as_str(),
            }
            .into());
        }
        self.advance(Stage::Finalized)?;
        Ok(self.params)
    }
}

/// 对 `mask` 运行完整的诊断流程.
///
/// 去噪之后不存在肿瘤时, 返回 `tumor_presence == false` 且不含任何统计量的结果.
/// 其余任何错误都会中止流程, 不会产生部分结果.
pub fn run_diagnosis(
    mask: &BinaryVolume,
    atlas: &AtlasReference,
    config: &DiagnosisConfig,
) -> DiagnosisResult<NeuroDiagnosisParameters> {
    let mut diagnosis = Diagnosis::new(atlas, config);
    match diagnosis.extract_components(mask) {
        Ok(()) => {}
        Err(DiagnosisError::EmptyInput) => {
            info!("No tumor left after noise filtering");
            return diagnosis.finalize();
        }
        Err(e) => return Err(e),
    }
    diagnosis.resolve_multifocality()?;
    diagnosis.compute_whole_tumor()?;
    if diagnosis.is_multifocal() {
        diagnosis.compute_per_component()?;
    }
    diagnosis.finalize()
}
