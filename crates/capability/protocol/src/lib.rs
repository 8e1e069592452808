//! # 协议能力模块
//!
//! 提供寄存器读取与解码能力：
//! - **codec**：寄存器到类型值的纯函数解码（int16 / float32 / bool）
//! - **RegisterClient**：协议客户端能力接口
//! - **Modbus TCP**：基于 tokio-modbus 的生产实现
//! - **Mock**：内存寄存器表，用于联调与测试
//!
//! ## 架构设计
//!
//! ```text
//! TagDefinition (unit / address / type / byteorder)
//!       │
//!       ▼
//! RegisterClient ── ModbusTcpClient
//!       │        └─ MockRegisterClient
//!       ▼
//! 原始寄存器 / 线圈
//!       │
//!       ▼
//! codec::decode_* → TagValue
//! ```

mod client;
pub mod codec;
mod error;
mod mock;
mod modbus_tcp;

pub use client::RegisterClient;
pub use codec::{decode_bool, decode_float32, decode_int16, encode_float32};
pub use error::ProtocolError;
pub use mock::MockRegisterClient;
pub use modbus_tcp::{ModbusTcpClient, ModbusTcpConfig};
