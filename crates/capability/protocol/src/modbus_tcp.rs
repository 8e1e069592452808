//! Modbus TCP 客户端实现
//!
//! 连接 Modbus 从设备，按需读取线圈与保持寄存器。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let client = ModbusTcpClient::new(ModbusTcpConfig {
//!     host: "192.168.1.100".to_string(),
//!     port: 502,
//!     connect_timeout_ms: 5000,
//!     read_timeout_ms: 3000,
//! });
//! client.connect().await?;
//! let words = client.read_holding_registers(1, 0, 2).await?;
//! ```
//!
//! 连接在首次读取时惰性建立；传输层错误会丢弃当前连接，下次读取重新连接。

use crate::client::RegisterClient;
use crate::error::ProtocolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::error::Elapsed;
use tokio::time::timeout;
use tokio_modbus::client::Context;
use tokio_modbus::prelude::*;
use tracing::{debug, info, warn};

/// Modbus TCP 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModbusTcpConfig {
    /// Modbus 服务器主机地址（IP 或主机名）
    pub host: String,
    /// Modbus 服务器端口（默认 502）
    #[serde(default = "default_modbus_port")]
    pub port: u16,
    /// 连接超时（毫秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// 读取超时（毫秒）
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
}

fn default_modbus_port() -> u16 {
    502
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_read_timeout() -> u64 {
    3000
}

/// Modbus TCP 客户端
pub struct ModbusTcpClient {
    config: ModbusTcpConfig,
    context: Mutex<Option<Context>>,
}

impl ModbusTcpClient {
    /// 创建新的客户端（不立即连接）
    pub fn new(config: ModbusTcpConfig) -> Self {
        Self {
            config,
            context: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ModbusTcpConfig {
        &self.config
    }

    async fn resolve(&self) -> Result<SocketAddr, ProtocolError> {
        let target = format!("{}:{}", self.config.host, self.config.port);
        let first = tokio::net::lookup_host(target.as_str())
            .await
            .map_err(|e| ProtocolError::InvalidAddress(format!("{}: {}", target, e)))?
            .next();
        first.ok_or(ProtocolError::InvalidAddress(target))
    }

    async fn open(&self) -> Result<Context, ProtocolError> {
        let addr = self.resolve().await?;
        let connect_timeout = Duration::from_millis(self.config.connect_timeout_ms);
        match timeout(connect_timeout, tcp::connect(addr)).await {
            Ok(Ok(ctx)) => {
                info!("connected to modbus server at {}", addr);
                Ok(ctx)
            }
            Ok(Err(e)) => Err(ProtocolError::Connection(format!("{}: {}", addr, e))),
            Err(_) => Err(ProtocolError::Timeout(format!(
                "connect to {} after {}ms",
                addr, self.config.connect_timeout_ms
            ))),
        }
    }

    fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.config.read_timeout_ms)
    }
}

/// 归一化一次请求的结果；传输层失败时丢弃连接。
fn settle<T>(
    context: &mut Option<Context>,
    outcome: Result<tokio_modbus::Result<T>, Elapsed>,
    operation: &str,
) -> Result<T, ProtocolError> {
    match outcome {
        Ok(Ok(Ok(values))) => Ok(values),
        Ok(Ok(Err(exception))) => Err(ProtocolError::Exception(format!(
            "{}: {:?}",
            operation, exception
        ))),
        Ok(Err(e)) => {
            *context = None;
            Err(ProtocolError::Modbus(format!("{}: {}", operation, e)))
        }
        Err(_) => {
            *context = None;
            Err(ProtocolError::Timeout(operation.to_string()))
        }
    }
}

#[async_trait]
impl RegisterClient for ModbusTcpClient {
    async fn connect(&self) -> Result<(), ProtocolError> {
        let mut context = self.context.lock().await;
        if context.is_none() {
            *context = Some(self.open().await?);
        }
        Ok(())
    }

    async fn read_coils(
        &self,
        unit_id: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<bool>, ProtocolError> {
        let mut context = self.context.lock().await;
        if context.is_none() {
            *context = Some(self.open().await?);
        }
        let Some(ctx) = context.as_mut() else {
            return Err(ProtocolError::Connection("not connected".to_string()));
        };
        ctx.set_slave(Slave(unit_id));
        let outcome = timeout(self.read_timeout(), ctx.read_coils(address, count)).await;
        let bits = settle(&mut *context, outcome, "read coils")?;

        debug!(
            slave = unit_id,
            address,
            count,
            values = ?bits,
            "read modbus coils"
        );
        Ok(bits)
    }

    async fn read_holding_registers(
        &self,
        unit_id: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        let mut context = self.context.lock().await;
        if context.is_none() {
            *context = Some(self.open().await?);
        }
        let Some(ctx) = context.as_mut() else {
            return Err(ProtocolError::Connection("not connected".to_string()));
        };
        ctx.set_slave(Slave(unit_id));
        let outcome = timeout(
            self.read_timeout(),
            ctx.read_holding_registers(address, count),
        )
        .await;
        let registers = settle(&mut *context, outcome, "read holding registers")?;

        debug!(
            slave = unit_id,
            register = address,
            count,
            values = ?registers,
            "read modbus registers"
        );
        Ok(registers)
    }

    async fn close(&self) -> Result<(), ProtocolError> {
        let mut context = self.context.lock().await;
        if let Some(mut ctx) = context.take() {
            if let Err(e) = ctx.disconnect().await {
                warn!(error = %e, "modbus disconnect failed");
                return Err(ProtocolError::Connection(e.to_string()));
            }
        }
        Ok(())
    }
}
