use chrono::{DateTime, Utc};
use std::fmt;

/// 解码后的点位值。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TagValue {
    Bool(bool),
    Int16(i16),
    Float32(f32),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{}", value),
            Self::Int16(value) => write!(f, "{}", value),
            Self::Float32(value) => write!(f, "{}", value),
        }
    }
}

/// 单个点位在一个轮询周期内的解码结果。
///
/// `captured_at` 为周期时间戳，同一周期内所有点位共享。
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedValue {
    pub tag: String,
    pub value: TagValue,
    pub captured_at: DateTime<Utc>,
}

/// 写入时序库的一条记录。
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tag: String,
    pub value: TagValue,
    pub timestamp: DateTime<Utc>,
}

impl Point {
    pub fn from_decoded(measurement: impl Into<String>, decoded: DecodedValue) -> Self {
        Self {
            measurement: measurement.into(),
            tag: decoded.tag,
            value: decoded.value,
            timestamp: decoded.captured_at,
        }
    }
}
