//! 历史采集循环
//!
//! 状态机：`Connecting → Running → Stopping → Stopped`。
//!
//! - Connecting：连接协议客户端与存储；失败只记录，不中止
//! - Running：每周期取一个 UTC 时间戳，轮询全部点位并逐个写入存储，然后等待轮询间隔
//! - Stopping：收到取消信号后不再开始新周期，正在进行的周期会完整结束
//! - Stopped：释放协议连接与存储句柄

use crate::cycle::{PollCycleController, TagOutcome};
use crate::events::{Component, EventSink, HistorianEvent};
use crate::retry::RetryPolicy;
use chrono::{DateTime, Utc};
use domain::{Point, TagSchema};
use historian_protocol::RegisterClient;
use historian_storage::PointStore;
use historian_telemetry::{
    record_cycle, record_point_written, record_unsupported_tag, record_value_missing,
    record_write_failure,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// 采集循环参数。
#[derive(Debug, Clone)]
pub struct HistorianConfig {
    /// 数据源描述（用于日志，如 `plc:502`）
    pub source: String,
    /// 时序库 measurement 名称
    pub measurement: String,
    pub poll_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for HistorianConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            measurement: "historian_measurement".to_string(),
            poll_interval: Duration::from_secs(1),
            retry: RetryPolicy::default(),
        }
    }
}

/// 采集循环状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorianState {
    Connecting,
    Running,
    Stopping,
    Stopped,
}

/// 单个周期的处理统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub written: usize,
    pub missing: usize,
    pub unsupported: usize,
    pub write_failed: usize,
}

/// 运行结束报告。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub cycles: u64,
}

/// 历史采集循环。
///
/// 协议客户端与存储句柄由本结构独占使用；点位表只读。
pub struct Historian {
    client: Arc<dyn RegisterClient>,
    store: Arc<dyn PointStore>,
    schema: TagSchema,
    config: HistorianConfig,
    controller: PollCycleController,
    events: Arc<dyn EventSink>,
    state: HistorianState,
}

impl Historian {
    pub fn new(
        client: Arc<dyn RegisterClient>,
        store: Arc<dyn PointStore>,
        schema: TagSchema,
        config: HistorianConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let controller = PollCycleController::new(config.retry);
        Self {
            client,
            store,
            schema,
            config,
            controller,
            events,
            state: HistorianState::Connecting,
        }
    }

    pub fn state(&self) -> HistorianState {
        self.state
    }

    pub fn schema(&self) -> &TagSchema {
        &self.schema
    }

    /// 运行直到 `shutdown` 被取消；返回时已进入 `Stopped` 并释放连接。
    pub async fn run(&mut self, shutdown: CancellationToken) -> RunReport {
        self.transition(HistorianState::Connecting);
        self.events.record(HistorianEvent::Started {
            source: self.config.source.clone(),
            tags: self.schema.len(),
        });
        self.connect().await;

        self.transition(HistorianState::Running);
        let mut cycles = 0u64;
        while !shutdown.is_cancelled() {
            self.run_cycle(Utc::now()).await;
            cycles += 1;

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        self.transition(HistorianState::Stopping);
        self.release().await;
        self.transition(HistorianState::Stopped);
        self.events.record(HistorianEvent::Stopped { cycles });
        RunReport { cycles }
    }

    /// 执行一个完整周期：轮询全部点位，按点位表顺序写入成功解码的值。
    pub async fn run_cycle(&self, captured_at: DateTime<Utc>) -> CycleSummary {
        let outcomes = self
            .controller
            .poll(
                self.client.as_ref(),
                &self.schema,
                captured_at,
                self.events.as_ref(),
            )
            .await;

        let mut summary = CycleSummary::default();
        for outcome in outcomes {
            match outcome {
                TagOutcome::Value(decoded) => {
                    let point = Point::from_decoded(self.config.measurement.as_str(), decoded);
                    match self.store.write_point(&point).await {
                        Ok(()) => {
                            summary.written += 1;
                            record_point_written();
                            self.events.record(HistorianEvent::PointWritten {
                                tag: point.tag,
                                value: point.value,
                            });
                        }
                        Err(err) => {
                            summary.write_failed += 1;
                            record_write_failure();
                            self.events.record(HistorianEvent::WriteFailed {
                                tag: point.tag,
                                error: err.to_string(),
                            });
                        }
                    }
                }
                TagOutcome::Missing { .. } => {
                    summary.missing += 1;
                    record_value_missing();
                }
                TagOutcome::UnsupportedType { .. } => {
                    summary.unsupported += 1;
                    record_unsupported_tag();
                }
            }
        }

        record_cycle();
        self.events.record(HistorianEvent::CycleCompleted {
            written: summary.written,
            missing: summary.missing,
            unsupported: summary.unsupported,
            write_failed: summary.write_failed,
        });
        summary
    }

    async fn connect(&self) {
        if let Err(err) = self.client.connect().await {
            self.events.record(HistorianEvent::ConnectFailed {
                component: Component::Modbus,
                error: err.to_string(),
            });
        }
        if let Err(err) = self.store.connect().await {
            self.events.record(HistorianEvent::ConnectFailed {
                component: Component::Store,
                error: err.to_string(),
            });
        }
    }

    async fn release(&self) {
        if let Err(err) = self.client.close().await {
            self.events.record(HistorianEvent::CloseFailed {
                component: Component::Modbus,
                error: err.to_string(),
            });
        }
        if let Err(err) = self.store.close().await {
            self.events.record(HistorianEvent::CloseFailed {
                component: Component::Store,
                error: err.to_string(),
            });
        }
    }

    fn transition(&mut self, next: HistorianState) {
        debug!(target: "historian", from = ?self.state, to = ?next, "state transition");
        self.state = next;
    }
}
