//! # Historian Storage 模块
//!
//! 时序点写入抽象层，支持多种存储后端实现。
//!
//! ## 模块说明
//!
//! - [`traits`]：`PointStore` 写入接口
//! - [`error`]：存储错误类型定义
//! - [`influx`]：InfluxDB v2 line protocol 写入（生产环境使用）
//! - [`in_memory`]：内存存储实现（用于测试和演示）
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use historian_storage::{InfluxConfig, InfluxPointStore, PointStore};
//!
//! let store = InfluxPointStore::new(InfluxConfig {
//!     url: "http://influxdb:8086".to_string(),
//!     token: "my-token".to_string(),
//!     org: "org".to_string(),
//!     bucket: "bucket".to_string(),
//!     timeout_ms: 5000,
//! })?;
//! store.write_point(&point).await?;
//! ```

pub mod error;
pub mod in_memory;
pub mod influx;
pub mod traits;

pub use error::StorageError;
pub use in_memory::InMemoryPointStore;
pub use influx::{InfluxConfig, InfluxPointStore, to_line_protocol};
pub use traits::PointStore;
