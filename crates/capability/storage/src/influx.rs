//! InfluxDB v2 写入实现
//!
//! 通过 HTTP `/api/v2/write` 写入 line protocol，时间精度为纳秒：
//!
//! ```text
//! historian_measurement,tag=temp value=123.456 1700000000000000000
//! ```

use crate::error::StorageError;
use crate::traits::PointStore;
use async_trait::async_trait;
use domain::{Point, TagValue};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

/// InfluxDB 连接参数
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
    /// 单次请求超时（毫秒）
    pub timeout_ms: u64,
}

/// InfluxDB v2 时序点存储
pub struct InfluxPointStore {
    client: reqwest::Client,
    config: InfluxConfig,
}

impl InfluxPointStore {
    pub fn new(config: InfluxConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &InfluxConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl PointStore for InfluxPointStore {
    async fn connect(&self) -> Result<(), StorageError> {
        let response = self.client.get(self.endpoint("health")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::new(format!(
                "influx health check returned {}",
                status
            )));
        }
        Ok(())
    }

    async fn write_point(&self, point: &Point) -> Result<(), StorageError> {
        let line = to_line_protocol(point)?;
        debug!(line = %line, "influx write");
        let response = self
            .client
            .post(self.endpoint("api/v2/write"))
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header(AUTHORIZATION, format!("Token {}", self.config.token))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(line)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::new(format!(
                "influx write returned {}: {}",
                status,
                body.trim()
            )));
        }
        Ok(())
    }
}

/// 将时序点编码为一行 line protocol。
///
/// 非有限浮点数无法表示为 line protocol 字段，返回错误。
pub fn to_line_protocol(point: &Point) -> Result<String, StorageError> {
    let field = match point.value {
        TagValue::Bool(value) => value.to_string(),
        TagValue::Int16(value) => format!("{}i", value),
        TagValue::Float32(value) if value.is_finite() => value.to_string(),
        TagValue::Float32(value) => {
            return Err(StorageError::new(format!(
                "non-finite value {} for tag {}",
                value, point.tag
            )));
        }
    };
    let ts_ns = point.timestamp.timestamp_nanos_opt().ok_or_else(|| {
        StorageError::new(format!("timestamp out of range: {}", point.timestamp))
    })?;
    Ok(format!(
        "{},tag={} value={} {}",
        escape(&point.measurement, &[',', ' ']),
        escape(&point.tag, &[',', '=', ' ']),
        field,
        ts_ns
    ))
}

fn escape(raw: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if special.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
