//! 脑叶描述表.
//!
//! CSV 格式, 表头为 `Label,Region,Laterality,Matter type`.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// 描述表中的一行.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobeDescription {
    /// 脑叶图谱中的标签值.
    #[serde(rename = "Label")]
    pub label: u16,

    /// 区域名称. 左右对应的两个标签共享同一个区域名.
    #[serde(rename = "Region")]
    pub region: String,

    /// 所在半球.
    #[serde(rename = "Laterality")]
    pub laterality: String,

    /// 灰质 / 白质.
    #[serde(rename = "Matter type")]
    pub matter_type: String,
}

/// 标签 -> 描述 的查找表.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LobeDescriptions {
    rows: BTreeMap<u16, LobeDescription>,
}

impl LobeDescriptions {
    /// 打开 CSV 格式的描述表.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigurationError::MissingResource(path.to_owned()));
        }
        Self::from_reader(std::fs::File::open(path)?)
    }

    /// 从任意 CSV 数据源读取描述表.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, ConfigurationError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
        let rows = rdr
            .deserialize::<LobeDescription>()
            .map(|r| r.map(|d| (d.label, d)))
            .collect::<Result<_, _>>()?;
        Ok(Self { rows })
    }

    /// 由若干行直接构建.
    pub fn from_rows<I: IntoIterator<Item = LobeDescription>>(it: I) -> Self {
        Self {
            rows: it.into_iter().map(|d| (d.label, d)).collect(),
        }
    }

    /// 获取 `label` 对应的描述.
    #[inline]
    pub fn get(&self, label: u16) -> Option<&LobeDescription> {
        self.rows.get(&label)
    }

    /// 获取 `label` 对应的区域名. 不存在时返回 [`ConfigurationError::UnknownLobeLabel`].
    #[inline]
    pub fn region(&self, label: u16) -> Result<&str, ConfigurationError> {
        self.get(label)
            .map(|d| d.region.as_str())
            .ok_or(ConfigurationError::UnknownLobeLabel(label))
    }

    /// 行数.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 是否为空表.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Label,Region,Laterality,Matter type
1,Frontal,Right,Gray
2, Frontal ,Left,Gray
3,Temporal,Right,Gray
";

    #[test]
    fn test_parse_table() {
        let t = LobeDescriptions::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.region(1).unwrap(), "Frontal");
        assert_eq!(t.region(2).unwrap(), "Frontal");
        assert_eq!(t.get(3).unwrap().matter_type, "Gray");
        assert!(matches!(
            t.region(9),
            Err(ConfigurationError::UnknownLobeLabel(9))
        ));
    }

    #[test]
    fn test_malformed_table() {
        let bad = "Label,Region,Laterality,Matter type\nx,Frontal,Right,Gray\n";
        assert!(matches!(
            LobeDescriptions::from_reader(bad.as_bytes()),
            Err(ConfigurationError::Csv(_))
        ));
    }
}
