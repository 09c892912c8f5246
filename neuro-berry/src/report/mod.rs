//! 诊断结果汇总与序列化.

mod json;
mod order;
mod text;

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::consts::UNDEFINED_DISTANCE;
use crate::diagnosis::stats::ScopeStatistics;
use crate::morph_3d::Component;

pub use order::OrderingPolicy;

/// 统计范围.
///
/// 排序时整个肿瘤排在最前, 其后按连通域标签升序.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeId {
    /// 整个肿瘤.
    Whole,

    /// 第 `i` 个连通域, 从 1 开始.
    Component(u32),
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeId::Whole => write!(f, "Main"),
            ScopeId::Component(i) => write!(f, "{i}"),
        }
    }
}

/// 一次诊断的全部结果.
///
/// 由流程按顺序填充, 序列化之后不再修改.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuroDiagnosisParameters {
    /// 过滤之后是否仍存在肿瘤.
    pub tumor_presence: bool,

    /// 肿瘤类型, 由配置给出.
    pub tumor_type: String,

    /// 是否多灶.
    pub tumor_multifocal: bool,

    /// 体积达到门限的肿瘤部分个数.
    pub tumor_parts: usize,

    /// 卫星部分到主体的最大 HD95 距离 (毫米), 无定义时为 -1.
    pub multifocal_largest_minimum_distance: f64,

    /// 过滤之后的连通域.
    pub components: Vec<Component>,

    /// 各范围的统计量. 不存在肿瘤时为空.
    pub statistics: BTreeMap<ScopeId, ScopeStatistics>,
}

impl NeuroDiagnosisParameters {
    /// 不存在肿瘤时的结果.
    pub fn absent(tumor_type: impl Into<String>) -> Self {
        Self {
            tumor_presence: false,
            tumor_type: tumor_type.into(),
            tumor_multifocal: false,
            tumor_parts: 0,
            multifocal_largest_minimum_distance: UNDEFINED_DISTANCE,
            components: Vec::new(),
            statistics: BTreeMap::new(),
        }
    }

    /// 获取 `scope` 的统计量.
    #[inline]
    pub fn scope(&self, scope: ScopeId) -> Option<&ScopeStatistics> {
        self.statistics.get(&scope)
    }

    /// 以 `id` 获取连通域的描述信息.
    #[inline]
    pub fn component(&self, id: u32) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// 生成文本报告.
    pub fn to_text(&self, policy: OrderingPolicy) -> String {
        text::TextReport::new(self, policy).to_string()
    }

    /// 生成 JSON 报告 (带缩进).
    pub fn to_json(&self, policy: OrderingPolicy) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&json::JsonReport::new(self, policy))
    }

    /// 将文本报告写入 `path`.
    pub fn write_text<P: AsRef<Path>>(&self, path: P, policy: OrderingPolicy) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        write!(w, "{}", text::TextReport::new(self, policy))?;
        w.flush()
    }

    /// 将 JSON 报告写入 `path`.
    pub fn write_json<P: AsRef<Path>>(&self, path: P, policy: OrderingPolicy) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut w, &json::JsonReport::new(self, policy))?;
        w.flush()
    }
}
