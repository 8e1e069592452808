//! 中断信号转发
//!
//! 第一次中断取消采集循环（当前周期结束后退出）；第二次中断要求立即退出，
//! 用于控制器不可达、末周期仍在重试时强制结束。

use std::future::Future;
use std::io;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 中断监听的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptOutcome {
    /// 收到第二次中断，调用方应立即退出进程
    ForceExit,
    /// 无法继续监听中断
    ListenerFailed,
}

/// 监听中断：首次取消 `shutdown`，再次出现时返回 [`InterruptOutcome::ForceExit`]。
///
/// `next_interrupt` 每次调用等待一次中断，生产环境传入 `tokio::signal::ctrl_c`。
pub async fn watch_interrupts<F, Fut>(
    shutdown: CancellationToken,
    mut next_interrupt: F,
) -> InterruptOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if let Err(err) = next_interrupt().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        return InterruptOutcome::ListenerFailed;
    }
    info!("ctrl-c received, stopping after current cycle; press again to exit now");
    shutdown.cancel();

    if let Err(err) = next_interrupt().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        return InterruptOutcome::ListenerFailed;
    }
    warn!("second ctrl-c received, exiting without waiting for the current cycle");
    InterruptOutcome::ForceExit
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn first_interrupt_cancels_second_forces_exit() {
        let shutdown = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel::<()>();
        let rx = std::sync::Arc::new(tokio::sync::Mutex::new(rx));

        let watcher = tokio::spawn(watch_interrupts(shutdown.clone(), move || {
            let rx = rx.clone();
            async move {
                rx.lock()
                    .await
                    .recv()
                    .await
                    .ok_or_else(|| io::Error::other("closed"))
            }
        }));

        tx.send(()).expect("first interrupt");
        shutdown.cancelled().await;
        assert!(!watcher.is_finished());

        tx.send(()).expect("second interrupt");
        assert_eq!(watcher.await.expect("join"), InterruptOutcome::ForceExit);
    }

    #[tokio::test]
    async fn listener_failure_does_not_cancel() {
        let shutdown = CancellationToken::new();
        let outcome = watch_interrupts(shutdown.clone(), || async {
            Err(io::Error::other("no signal handler"))
        })
        .await;
        assert_eq!(outcome, InterruptOutcome::ListenerFailed);
        assert!(!shutdown.is_cancelled());
    }
}
