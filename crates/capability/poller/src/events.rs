//! 结构化事件
//!
//! 轮询控制器与采集循环只通过注入的 [`EventSink`] 输出事件，
//! 生产环境映射为 tracing 记录，测试中可收集后断言。

use domain::TagValue;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// 连接的对端组件。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Modbus,
    Store,
}

/// 采集过程中的关键事件。
#[derive(Debug, Clone, PartialEq)]
pub enum HistorianEvent {
    Started { source: String, tags: usize },
    UsingMock,
    ConnectFailed { component: Component, error: String },
    ReadFailed { tag: String, attempt: u32, error: String },
    UnsupportedType { tag: String, value_type: String },
    ValueMissing { tag: String, attempts: u32 },
    PointWritten { tag: String, value: TagValue },
    WriteFailed { tag: String, error: String },
    CycleCompleted {
        written: usize,
        missing: usize,
        unsupported: usize,
        write_failed: usize,
    },
    CloseFailed { component: Component, error: String },
    Stopped { cycles: u64 },
}

impl HistorianEvent {
    /// 日志消息名。
    pub fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "historian.started",
            Self::UsingMock => "modbus.using_mock",
            Self::ConnectFailed {
                component: Component::Modbus,
                ..
            } => "modbus.connect_failed",
            Self::ConnectFailed {
                component: Component::Store,
                ..
            } => "store.connect_failed",
            Self::ReadFailed { .. } => "read.failed",
            Self::UnsupportedType { .. } => "unsupported.type",
            Self::ValueMissing { .. } => "value.missing",
            Self::PointWritten { .. } => "point.written",
            Self::WriteFailed { .. } => "influx.write_failed",
            Self::CycleCompleted { .. } => "cycle.completed",
            Self::CloseFailed { .. } => "close_failed",
            Self::Stopped { .. } => "historian.stopped",
        }
    }
}

/// 结构化事件输出能力。
pub trait EventSink: Send + Sync {
    fn record(&self, event: HistorianEvent);
}

/// 输出到 tracing（target = `historian`）。
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: HistorianEvent) {
        let name = event.name();
        match event {
            HistorianEvent::Started { source, tags } => {
                info!(target: "historian", source = %source, tags, "{}", name)
            }
            HistorianEvent::UsingMock => info!(target: "historian", "{}", name),
            HistorianEvent::ConnectFailed { component, error } => {
                warn!(target: "historian", component = ?component, error = %error, "{}", name)
            }
            HistorianEvent::ReadFailed {
                tag,
                attempt,
                error,
            } => warn!(target: "historian", tag = %tag, attempt, error = %error, "{}", name),
            HistorianEvent::UnsupportedType { tag, value_type } => {
                error!(target: "historian", tag = %tag, value_type = %value_type, "{}", name)
            }
            HistorianEvent::ValueMissing { tag, attempts } => {
                warn!(target: "historian", tag = %tag, attempts, "{}", name)
            }
            HistorianEvent::PointWritten { tag, value } => {
                info!(target: "historian", tag = %tag, value = %value, "{}", name)
            }
            HistorianEvent::WriteFailed { tag, error } => {
                error!(target: "historian", tag = %tag, error = %error, "{}", name)
            }
            HistorianEvent::CycleCompleted {
                written,
                missing,
                unsupported,
                write_failed,
            } => debug!(
                target: "historian",
                written,
                missing,
                unsupported,
                write_failed,
                "{}",
                name
            ),
            HistorianEvent::CloseFailed { component, error } => {
                warn!(target: "historian", component = ?component, error = %error, "{}", name)
            }
            HistorianEvent::Stopped { cycles } => info!(target: "historian", cycles, "{}", name),
        }
    }
}

/// 收集全部事件（用于测试）。
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<HistorianEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HistorianEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .map(|e| e.iter().map(HistorianEvent::name).collect())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingEventSink {
    fn record(&self, event: HistorianEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
