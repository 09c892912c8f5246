//! 结果排序策略.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// 序列化时 `名称 -> 数值` 列表的排列方式. 排序只影响顺序, 不改变数值.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderingPolicy {
    /// 按名称升序, 即计算时的顺序.
    #[default]
    AsComputed,

    /// 按数值排序:
    ///
    /// - 脑叶占比, 纤维束重叠与断连概率降序;
    /// - 纤维束距离升序, -1 (无定义) 排在最后.
    ///
    /// 数值相同时保持名称升序.
    Ranked,
}

impl OrderingPolicy {
    /// 按降序排列 (`Ranked`) 或保持名称顺序.
    pub fn descending<'a>(&self, map: &'a BTreeMap<String, f64>) -> Vec<(&'a str, f64)> {
        let it = map.iter().map(|(k, v)| (k.as_str(), *v));
        match self {
            OrderingPolicy::AsComputed => it.collect(),
            OrderingPolicy::Ranked => it.sorted_by_key(|(_, v)| Reverse(OrderedFloat(*v))).collect(),
        }
    }

    /// 按距离升序排列 (`Ranked`, 负值排在最后) 或保持名称顺序.
    pub fn by_distance<'a>(&self, map: &'a BTreeMap<String, f64>) -> Vec<(&'a str, f64)> {
        let it = map.iter().map(|(k, v)| (k.as_str(), *v));
        match self {
            OrderingPolicy::AsComputed => it.collect(),
            OrderingPolicy::Ranked => it
                .sorted_by_key(|(_, v)| (*v < 0.0, OrderedFloat(*v)))
                .collect(),
        }
    }
}
