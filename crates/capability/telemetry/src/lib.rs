//! 日志初始化与采集计数。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 采集指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub points_written: u64,
    pub write_failures: u64,
    pub read_failures: u64,
    pub values_missing: u64,
    pub unsupported_tags: u64,
}

/// 进程级采集计数。
pub struct TelemetryMetrics {
    cycles: AtomicU64,
    points_written: AtomicU64,
    write_failures: AtomicU64,
    read_failures: AtomicU64,
    values_missing: AtomicU64,
    unsupported_tags: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
            points_written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            read_failures: AtomicU64::new(0),
            values_missing: AtomicU64::new(0),
            unsupported_tags: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            points_written: self.points_written.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            values_missing: self.values_missing.load(Ordering::Relaxed),
            unsupported_tags: self.unsupported_tags.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 记录完成的轮询周期。
pub fn record_cycle() {
    metrics().cycles.fetch_add(1, Ordering::Relaxed);
}

/// 记录写入成功次数。
pub fn record_point_written() {
    metrics().points_written.fetch_add(1, Ordering::Relaxed);
}

/// 记录写入失败次数。
pub fn record_write_failure() {
    metrics().write_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录单次读取失败（每次尝试计一次）。
pub fn record_read_failure() {
    metrics().read_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录重试耗尽后缺失的点位值。
pub fn record_value_missing() {
    metrics().values_missing.fetch_add(1, Ordering::Relaxed);
}

/// 记录不支持类型的点位。
pub fn record_unsupported_tag() {
    metrics().unsupported_tags.fetch_add(1, Ordering::Relaxed);
}
