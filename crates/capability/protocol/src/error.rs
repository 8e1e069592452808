//! 协议错误类型定义

/// 协议通信错误
///
/// 所有变体对轮询层而言都是一次读取失败，按重试策略处理。
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// 连接错误
    #[error("connection error: {0}")]
    Connection(String),

    /// 地址解析错误
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Modbus 传输错误
    #[error("modbus error: {0}")]
    Modbus(String),

    /// 从站异常响应
    #[error("modbus exception: {0}")]
    Exception(String),

    /// 超时错误
    #[error("timeout: {0}")]
    Timeout(String),
}
