//! 应用运行配置加载。

use domain::{SchemaError, TagSchema};
use std::env;
use std::path::Path;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
    #[error("failed to read tag schema {0}: {1}")]
    SchemaIo(String, std::io::Error),
    #[error("invalid tag schema {0}: {1}")]
    Schema(String, SchemaError),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tags_path: String,
    pub modbus_host: String,
    pub modbus_port: u16,
    pub modbus_mock: bool,
    pub modbus_connect_timeout_ms: u64,
    pub modbus_read_timeout_ms: u64,
    pub poll_interval: Duration,
    pub read_attempts: u32,
    pub retry_delay_ms: u64,
    pub measurement: String,
    pub influx_url: String,
    pub influx_token: String,
    pub influx_org: String,
    pub influx_bucket: String,
    pub influx_timeout_ms: u64,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置（便于测试）。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tags_path = read_string(&lookup, "HISTORIAN_TAGS", "./tags.yaml");
        let modbus_host = read_string(&lookup, "MODBUS_HOST", "plc");
        let modbus_port = read_u16_with_default(&lookup, "MODBUS_PORT", 502)?;
        // MODBUS_HOST=mock 等价于 MODBUS_MOCK=true
        let modbus_mock =
            read_bool_with_default(&lookup, "MODBUS_MOCK", false) || modbus_host == "mock";
        let modbus_connect_timeout_ms =
            read_u64_with_default(&lookup, "MODBUS_CONNECT_TIMEOUT_MS", 5000)?;
        let modbus_read_timeout_ms = read_u64_with_default(&lookup, "MODBUS_READ_TIMEOUT_MS", 3000)?;
        let poll_interval = read_seconds_with_default(&lookup, "POLL_INTERVAL", 1.0)?;
        let read_attempts = read_u32_with_default(&lookup, "HISTORIAN_READ_ATTEMPTS", 3)?;
        if read_attempts == 0 {
            return Err(ConfigError::Invalid(
                "HISTORIAN_READ_ATTEMPTS".to_string(),
                "0".to_string(),
            ));
        }
        let retry_delay_ms = read_u64_with_default(&lookup, "HISTORIAN_RETRY_DELAY_MS", 5000)?;
        let measurement = read_string(&lookup, "HISTORIAN_MEASUREMENT", "historian_measurement");
        let influx_url = read_string(&lookup, "INFLUX_URL", "http://influxdb:8086");
        let influx_token = read_string(&lookup, "INFLUX_TOKEN", "my-token");
        let influx_org = read_string(&lookup, "INFLUX_ORG", "org");
        let influx_bucket = read_string(&lookup, "INFLUX_BUCKET", "bucket");
        let influx_timeout_ms = read_u64_with_default(&lookup, "INFLUX_TIMEOUT_MS", 5000)?;

        Ok(Self {
            tags_path,
            modbus_host,
            modbus_port,
            modbus_mock,
            modbus_connect_timeout_ms,
            modbus_read_timeout_ms,
            poll_interval,
            read_attempts,
            retry_delay_ms,
            measurement,
            influx_url,
            influx_token,
            influx_org,
            influx_bucket,
            influx_timeout_ms,
        })
    }
}

/// 读取并校验点位文档。
///
/// 扩展名为 `.json` 时按 JSON 解析，其余按 YAML 解析。
pub fn load_tag_schema(path: impl AsRef<Path>) -> Result<TagSchema, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::SchemaIo(display.clone(), e))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        TagSchema::from_json(&raw)
    } else {
        TagSchema::from_yaml(&raw)
    };
    parsed.map_err(|e| ConfigError::Schema(display, e))
}

fn read_string<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

fn read_u16_with_default<F>(lookup: &F, key: &str, default: u16) -> Result<u16, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(value) => value,
        None => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u32_with_default<F>(lookup: &F, key: &str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(value) => value,
        None => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(value) => value,
        None => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

/// 秒数（可带小数），必须有限、非负且不超过 `Duration` 上限。
fn read_seconds_with_default<F>(
    lookup: &F,
    key: &str,
    default: f64,
) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(value) => value,
        None => return Ok(Duration::from_secs_f64(default)),
    };
    match value.parse::<f64>().ok().map(Duration::try_from_secs_f64) {
        Some(Ok(interval)) => Ok(interval),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}

fn read_bool_with_default<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        None => default,
    }
}
