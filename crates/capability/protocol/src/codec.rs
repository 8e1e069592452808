//! 寄存器解码
//!
//! 纯函数，无状态、无 I/O。所有函数在各自的输入域上都是全函数。

use domain::ByteOrder;

/// 将单个寄存器按补码解释为有符号 16 位整数。
pub fn decode_int16(raw: u16) -> i16 {
    raw as i16
}

/// 由两个寄存器还原 IEEE-754 单精度浮点。
///
/// `word_a`、`word_b` 为读取顺序下的两个寄存器，`order` 决定哪一个是高位字，
/// 以及字内字节是否交换。NaN/Inf 位模式原样透传。
pub fn decode_float32(word_a: u16, word_b: u16, order: ByteOrder) -> f32 {
    let (high, low) = match order {
        ByteOrder::Big => (word_a, word_b),
        ByteOrder::Little => (word_b, word_a),
        ByteOrder::BigSwap => (word_a.swap_bytes(), word_b.swap_bytes()),
        ByteOrder::LittleSwap => (word_b.swap_bytes(), word_a.swap_bytes()),
    };
    f32::from_bits((u32::from(high) << 16) | u32::from(low))
}

/// `decode_float32` 的逆运算，返回按读取顺序排列的两个寄存器。
pub fn encode_float32(value: f32, order: ByteOrder) -> [u16; 2] {
    let bits = value.to_bits();
    let high = (bits >> 16) as u16;
    let low = bits as u16;
    match order {
        ByteOrder::Big => [high, low],
        ByteOrder::Little => [low, high],
        ByteOrder::BigSwap => [high.swap_bytes(), low.swap_bytes()],
        ByteOrder::LittleSwap => [low.swap_bytes(), high.swap_bytes()],
    }
}

/// 仅检查第一个元素；空序列为 `false`。
pub fn decode_bool<B>(bits: &[B]) -> bool
where
    B: Copy + Into<u16>,
{
    bits
        .first()
        .is_some_and(|bit| Into::<u16>::into(*bit) != 0)
}
