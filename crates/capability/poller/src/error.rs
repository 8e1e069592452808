use historian_protocol::ProtocolError;

/// 单次点位读取失败。
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("empty payload")]
    EmptyPayload,
    #[error("short payload: expected {expected} registers, got {got}")]
    ShortPayload { expected: usize, got: usize },
}
