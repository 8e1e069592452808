//! 存储接口 Trait 定义
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use async_trait::async_trait;
use domain::Point;

/// 时序点写入接口
///
/// 每次调用写入一条 `(measurement, tag, value, timestamp)` 记录。
#[async_trait]
pub trait PointStore: Send + Sync {
    /// 检查存储可用性（默认无操作）
    async fn connect(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// 写入单个时序点
    async fn write_point(&self, point: &Point) -> Result<(), StorageError>;

    /// 释放存储句柄（默认无操作）
    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
