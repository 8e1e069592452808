//! Mock 协议客户端
//!
//! 内存中的线圈与寄存器表，按 `(unit_id, address)` 寻址；未设置的单元读为 0/false。
//! 用于本地联调与测试，与真实客户端共用 [`RegisterClient`] 接口。

use crate::client::RegisterClient;
use crate::codec::encode_float32;
use crate::error::ProtocolError;
use async_trait::async_trait;
use domain::ByteOrder;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct MockState {
    coils: HashMap<(u8, u16), bool>,
    registers: HashMap<(u8, u16), u16>,
    connected: bool,
}

/// 内存 Modbus 客户端
#[derive(Debug, Default)]
pub struct MockRegisterClient {
    state: RwLock<MockState>,
}

impl MockRegisterClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coil(self, unit_id: u8, address: u16, value: bool) -> Self {
        self.set_coil(unit_id, address, value);
        self
    }

    pub fn with_register(self, unit_id: u8, address: u16, value: u16) -> Self {
        self.set_register(unit_id, address, value);
        self
    }

    pub fn with_int16(self, unit_id: u8, address: u16, value: i16) -> Self {
        self.set_register(unit_id, address, value as u16);
        self
    }

    /// 以指定字序写入两个连续寄存器
    pub fn with_float32(self, unit_id: u8, address: u16, value: f32, order: ByteOrder) -> Self {
        self.set_float32(unit_id, address, value, order);
        self
    }

    pub fn set_coil(&self, unit_id: u8, address: u16, value: bool) {
        if let Ok(mut state) = self.state.write() {
            state.coils.insert((unit_id, address), value);
        }
    }

    pub fn set_register(&self, unit_id: u8, address: u16, value: u16) {
        if let Ok(mut state) = self.state.write() {
            state.registers.insert((unit_id, address), value);
        }
    }

    pub fn set_float32(&self, unit_id: u8, address: u16, value: f32, order: ByteOrder) {
        let [word_a, word_b] = encode_float32(value, order);
        self.set_register(unit_id, address, word_a);
        self.set_register(unit_id, address.wrapping_add(1), word_b);
    }

    pub fn is_connected(&self) -> bool {
        self.state.read().map(|state| state.connected).unwrap_or(false)
    }
}

/// 校验 `address..address + count` 不越过 16 位地址空间。
fn span(address: u16, count: u16) -> Result<impl Iterator<Item = u16>, ProtocolError> {
    let end = u32::from(address) + u32::from(count);
    if end > u32::from(u16::MAX) + 1 {
        return Err(ProtocolError::Exception(format!(
            "illegal data address: {} + {}",
            address, count
        )));
    }
    Ok((u32::from(address)..end).map(|addr| addr as u16))
}

#[async_trait]
impl RegisterClient for MockRegisterClient {
    async fn connect(&self) -> Result<(), ProtocolError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| ProtocolError::Connection("lock failed".to_string()))?;
        state.connected = true;
        Ok(())
    }

    async fn read_coils(
        &self,
        unit_id: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<bool>, ProtocolError> {
        let state = self
            .state
            .read()
            .map_err(|_| ProtocolError::Connection("lock failed".to_string()))?;
        Ok(span(address, count)?
            .map(|addr| state.coils.get(&(unit_id, addr)).copied().unwrap_or(false))
            .collect())
    }

    async fn read_holding_registers(
        &self,
        unit_id: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        let state = self
            .state
            .read()
            .map_err(|_| ProtocolError::Connection("lock failed".to_string()))?;
        Ok(span(address, count)?
            .map(|addr| state.registers.get(&(unit_id, addr)).copied().unwrap_or(0))
            .collect())
    }

    async fn close(&self) -> Result<(), ProtocolError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| ProtocolError::Connection("lock failed".to_string()))?;
        state.connected = false;
        Ok(())
    }
}
