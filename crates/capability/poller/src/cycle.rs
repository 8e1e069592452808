//! 轮询周期控制器
//!
//! 一个周期按点位表顺序逐个读取、解码，每个点位产出一个结果。
//! 单个点位的失败只影响该点位，周期总是完整结束。

use crate::error::PollError;
use crate::events::{EventSink, HistorianEvent};
use crate::retry::{RetryError, RetryPolicy, with_retry};
use chrono::{DateTime, Utc};
use domain::{ByteOrder, DecodedValue, TagDefinition, TagSchema, TagValue, ValueType};
use historian_protocol::{RegisterClient, decode_bool, decode_float32, decode_int16};
use historian_telemetry::record_read_failure;

/// 单个点位在本周期的结果。
#[derive(Debug, Clone, PartialEq)]
pub enum TagOutcome {
    Value(DecodedValue),
    /// 重试耗尽仍未读到值
    Missing {
        tag: String,
        attempts: u32,
        error: String,
    },
    /// 声明的类型不受支持，未发起读取
    UnsupportedType { tag: String, value_type: String },
}

impl TagOutcome {
    pub fn tag(&self) -> &str {
        match self {
            Self::Value(decoded) => &decoded.tag,
            Self::Missing { tag, .. } | Self::UnsupportedType { tag, .. } => tag,
        }
    }

    pub fn value(&self) -> Option<&TagValue> {
        match self {
            Self::Value(decoded) => Some(&decoded.value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ReadKind {
    Coil,
    Int16,
    Float32(ByteOrder),
}

/// 轮询周期控制器。
#[derive(Debug, Clone, Default)]
pub struct PollCycleController {
    retry: RetryPolicy,
}

impl PollCycleController {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// 按点位表顺序轮询全部点位，结果与点位一一对应。
    pub async fn poll(
        &self,
        client: &dyn RegisterClient,
        schema: &TagSchema,
        captured_at: DateTime<Utc>,
        events: &dyn EventSink,
    ) -> Vec<TagOutcome> {
        let mut outcomes = Vec::with_capacity(schema.len());
        for tag in schema {
            outcomes.push(self.poll_tag(client, tag, captured_at, events).await);
        }
        outcomes
    }

    /// 轮询单个点位：按类型选择读取方式，传输失败按策略重试。
    pub async fn poll_tag(
        &self,
        client: &dyn RegisterClient,
        tag: &TagDefinition,
        captured_at: DateTime<Utc>,
        events: &dyn EventSink,
    ) -> TagOutcome {
        let kind = match &tag.value_type {
            ValueType::Bool => ReadKind::Coil,
            ValueType::Int16 => ReadKind::Int16,
            ValueType::Float32 => ReadKind::Float32(tag.byte_order),
            ValueType::Unknown(raw) => {
                events.record(HistorianEvent::UnsupportedType {
                    tag: tag.name.clone(),
                    value_type: raw.clone(),
                });
                return TagOutcome::UnsupportedType {
                    tag: tag.name.clone(),
                    value_type: raw.clone(),
                };
            }
        };

        let result = with_retry(
            &self.retry,
            |_| read_value(client, tag.unit_id, tag.address, kind),
            |attempt, err| {
                record_read_failure();
                events.record(HistorianEvent::ReadFailed {
                    tag: tag.name.clone(),
                    attempt,
                    error: err.to_string(),
                });
            },
        )
        .await;

        match result {
            Ok(value) => TagOutcome::Value(DecodedValue {
                tag: tag.name.clone(),
                value,
                captured_at,
            }),
            Err(RetryError { attempts, last }) => {
                events.record(HistorianEvent::ValueMissing {
                    tag: tag.name.clone(),
                    attempts,
                });
                TagOutcome::Missing {
                    tag: tag.name.clone(),
                    attempts,
                    error: last.to_string(),
                }
            }
        }
    }
}

/// 单次读取并解码；空载荷或寄存器不足视为本次尝试失败。
async fn read_value(
    client: &dyn RegisterClient,
    unit_id: u8,
    address: u16,
    kind: ReadKind,
) -> Result<TagValue, PollError> {
    match kind {
        ReadKind::Coil => {
            let bits = client.read_coils(unit_id, address, 1).await?;
            if bits.is_empty() {
                return Err(PollError::EmptyPayload);
            }
            Ok(TagValue::Bool(decode_bool(&bits)))
        }
        ReadKind::Int16 => {
            let words = client.read_holding_registers(unit_id, address, 1).await?;
            let Some(&raw) = words.first() else {
                return Err(PollError::EmptyPayload);
            };
            Ok(TagValue::Int16(decode_int16(raw)))
        }
        ReadKind::Float32(order) => {
            let words = client.read_holding_registers(unit_id, address, 2).await?;
            match words.as_slice() {
                [] => Err(PollError::EmptyPayload),
                [word_a, word_b, ..] => Ok(TagValue::Float32(decode_float32(*word_a, *word_b, order))),
                _ => Err(PollError::ShortPayload {
                    expected: 2,
                    got: words.len(),
                }),
            }
        }
    }
}
