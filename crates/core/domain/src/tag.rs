//! 点位定义与点位表。
//!
//! 点位表在启动时加载一次，进程生命周期内只读。

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 点位表错误。
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("duplicate tag name: {0}")]
    DuplicateName(String),
    #[error("tag at index {0} has an empty name")]
    EmptyName(usize),
    #[error("schema parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("schema parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// 点位的数据类型。
///
/// 文档中的未知类型保留原始字符串，轮询时按点位失败处理，不影响加载。
/// 缺失或非字符串的 `type` 同样视为未知类型。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ValueType {
    /// 单个线圈
    Bool,
    /// 单个寄存器，补码有符号整数
    Int16,
    /// 两个连续寄存器，IEEE-754 单精度浮点
    Float32,
    /// 未识别的类型
    Unknown(String),
}

impl ValueType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bool => "bool",
            Self::Int16 => "int16",
            Self::Float32 => "float32",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for ValueType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "bool" => Self::Bool,
            "int16" => Self::Int16,
            "float32" => Self::Float32,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<ValueType> for String {
    fn from(value: ValueType) -> Self {
        match value {
            ValueType::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueTypeVisitor)
    }
}

struct ValueTypeVisitor;

impl<'de> Visitor<'de> for ValueTypeVisitor {
    type Value = ValueType;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a value type name")
    }

    fn visit_str<E: de::Error>(self, raw: &str) -> Result<ValueType, E> {
        Ok(ValueType::from(raw.to_string()))
    }

    fn visit_string<E: de::Error>(self, raw: String) -> Result<ValueType, E> {
        Ok(ValueType::from(raw))
    }

    fn visit_bool<E: de::Error>(self, raw: bool) -> Result<ValueType, E> {
        Ok(ValueType::Unknown(raw.to_string()))
    }

    fn visit_i64<E: de::Error>(self, raw: i64) -> Result<ValueType, E> {
        Ok(ValueType::Unknown(raw.to_string()))
    }

    fn visit_u64<E: de::Error>(self, raw: u64) -> Result<ValueType, E> {
        Ok(ValueType::Unknown(raw.to_string()))
    }

    fn visit_f64<E: de::Error>(self, raw: f64) -> Result<ValueType, E> {
        Ok(ValueType::Unknown(raw.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<ValueType, E> {
        Ok(missing_value_type())
    }

    fn visit_none<E: de::Error>(self) -> Result<ValueType, E> {
        Ok(missing_value_type())
    }

    fn visit_some<D>(self, deserializer: D) -> Result<ValueType, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<ValueType, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(ValueType::Unknown("sequence".to_string()))
    }

    fn visit_map<A>(self, mut map: A) -> Result<ValueType, A::Error>
    where
        A: MapAccess<'de>,
    {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(ValueType::Unknown("map".to_string()))
    }
}

fn missing_value_type() -> ValueType {
    ValueType::Unknown("none".to_string())
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 32 位值的字序/字节序。
///
/// 以寄存器顺序 `[word_a, word_b]` 和大端字节 `A B C D` 描述：
/// - `big`：ABCD，word_a 为高位字
/// - `little`：CDAB，word_b 为高位字
/// - `big_swap`：BADC，每个字内部字节交换
/// - `little_swap`：DCBA
///
/// 注意：旧版点位文档中的 `little` 实际按 BADC 解码，迁移时应改写为 `big_swap`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
    BigSwap,
    LittleSwap,
}

/// 单个点位定义。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDefinition {
    /// 点位名称，同时作为时序库的 tag 值
    pub name: String,
    /// 从站 ID
    #[serde(rename = "unit", default = "default_unit_id")]
    pub unit_id: u8,
    /// 寄存器/线圈地址
    pub address: u16,
    #[serde(rename = "type", default = "missing_value_type")]
    pub value_type: ValueType,
    /// 仅对 float32 有意义
    #[serde(rename = "byteorder", default)]
    pub byte_order: ByteOrder,
}

fn default_unit_id() -> u8 {
    1
}

impl TagDefinition {
    pub fn new(
        name: impl Into<String>,
        unit_id: u8,
        address: u16,
        value_type: ValueType,
        byte_order: ByteOrder,
    ) -> Self {
        Self {
            name: name.into(),
            unit_id,
            address,
            value_type,
            byte_order,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    tags: Vec<TagDefinition>,
}

/// 有序点位表。
///
/// 轮询顺序与文档顺序一致；名称在表内唯一。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSchema {
    tags: Vec<TagDefinition>,
}

impl TagSchema {
    /// 校验并构造点位表。
    pub fn new(tags: Vec<TagDefinition>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::with_capacity(tags.len());
        for (index, tag) in tags.iter().enumerate() {
            if tag.name.trim().is_empty() {
                return Err(SchemaError::EmptyName(index));
            }
            if !seen.insert(tag.name.as_str()) {
                return Err(SchemaError::DuplicateName(tag.name.clone()));
            }
        }
        Ok(Self { tags })
    }

    /// 从 JSON 文档解析：`{"tags": [{"name", "unit", "address", "type", "byteorder"}]}`。
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_str(json)?;
        Self::new(document.tags)
    }

    /// 从 YAML 文档解析，字段与 JSON 相同；空文档视为空点位表。
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let document: Option<SchemaDocument> = serde_yaml::from_str(yaml)?;
        Self::new(document.map(|document| document.tags).unwrap_or_default())
    }

    pub fn tags(&self) -> &[TagDefinition] {
        &self.tags
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TagDefinition> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<'a> IntoIterator for &'a TagSchema {
    type Item = &'a TagDefinition;
    type IntoIter = std::slice::Iter<'a, TagDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}
