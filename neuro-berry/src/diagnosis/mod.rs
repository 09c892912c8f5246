//! 诊断流程: 连通域提取, 多灶性判断, 空间统计.
//!
//! 各步骤都是只读的纯函数, 唯一的可变状态是 [`Diagnosis`] 持有的结果汇总.

pub mod components;
pub mod multifocal;
mod pipeline;
pub mod stats;

pub use pipeline::{run_diagnosis, Diagnosis, Stage};
