//! 寄存器读取能力抽象

use crate::error::ProtocolError;
use async_trait::async_trait;

/// 协议客户端能力。
///
/// 生产实现与测试替身通过同一接口互换，调用方不感知具体实现。
#[async_trait]
pub trait RegisterClient: Send + Sync {
    /// 建立连接
    async fn connect(&self) -> Result<(), ProtocolError>;

    /// 读取 `count` 个线圈
    async fn read_coils(
        &self,
        unit_id: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<bool>, ProtocolError>;

    /// 读取 `count` 个保持寄存器
    async fn read_holding_registers(
        &self,
        unit_id: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError>;

    /// 释放连接
    async fn close(&self) -> Result<(), ProtocolError>;
}
