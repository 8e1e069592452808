//! 内存存储实现
//!
//! 仅用于本地测试和占位。

mod point;

pub use point::InMemoryPointStore;
