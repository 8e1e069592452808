//! # 轮询能力模块
//!
//! ```text
//! TagSchema
//!    │
//!    ▼
//! PollCycleController ── RegisterClient（with_retry：3 次尝试，间隔 5s）
//!    │                        │
//!    │                        ▼
//!    │                   codec::decode_*
//!    ▼
//! Vec<TagOutcome>（与点位表同序）
//!    │
//!    ▼
//! Historian ── PointStore::write_point
//!    │
//!    ▼
//! EventSink（结构化事件）
//! ```

mod cycle;
mod error;
mod events;
mod historian;
mod retry;
mod shutdown;

pub use cycle::{PollCycleController, TagOutcome};
pub use error::PollError;
pub use events::{Component, EventSink, HistorianEvent, RecordingEventSink, TracingEventSink};
pub use historian::{CycleSummary, Historian, HistorianConfig, HistorianState, RunReport};
pub use retry::{RetryError, RetryPolicy, with_retry};
pub use shutdown::{InterruptOutcome, watch_interrupts};
