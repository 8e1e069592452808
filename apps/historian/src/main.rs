//! 采集历史服务：按点位表轮询 Modbus 控制器，写入 InfluxDB。

use historian_config::{AppConfig, load_tag_schema};
use historian_poller::{
    EventSink, Historian, HistorianConfig, HistorianEvent, InterruptOutcome, RetryPolicy,
    TracingEventSink, watch_interrupts,
};
use historian_protocol::{MockRegisterClient, ModbusTcpClient, ModbusTcpConfig, RegisterClient};
use historian_storage::{InfluxConfig, InfluxPointStore};
use historian_telemetry::init_tracing;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 初始化结构化日志
    init_tracing();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 点位表启动时加载一次，之后只读
    let schema = load_tag_schema(&config.tags_path)?;

    let events: Arc<dyn EventSink> = Arc::new(TracingEventSink);
    let client = build_client(&config, events.as_ref());
    let store = Arc::new(InfluxPointStore::new(InfluxConfig {
        url: config.influx_url.clone(),
        token: config.influx_token.clone(),
        org: config.influx_org.clone(),
        bucket: config.influx_bucket.clone(),
        timeout_ms: config.influx_timeout_ms,
    })?);

    let shutdown = CancellationToken::new();
    let interrupts = shutdown.clone();
    tokio::spawn(async move {
        let outcome = watch_interrupts(interrupts, tokio::signal::ctrl_c).await;
        if outcome == InterruptOutcome::ForceExit {
            std::process::exit(130);
        }
    });

    let mut historian = Historian::new(
        client,
        store,
        schema,
        HistorianConfig {
            source: format!("{}:{}", config.modbus_host, config.modbus_port),
            measurement: config.measurement.clone(),
            poll_interval: config.poll_interval,
            retry: RetryPolicy::new(
                config.read_attempts,
                Duration::from_millis(config.retry_delay_ms),
            ),
        },
        events,
    );
    let report = historian.run(shutdown).await;
    info!(cycles = report.cycles, "historian exited");
    Ok(())
}

/// 按配置选择协议客户端：Mock 或 Modbus TCP。
fn build_client(config: &AppConfig, events: &dyn EventSink) -> Arc<dyn RegisterClient> {
    if config.modbus_mock {
        events.record(HistorianEvent::UsingMock);
        return Arc::new(MockRegisterClient::new());
    }
    Arc::new(ModbusTcpClient::new(ModbusTcpConfig {
        host: config.modbus_host.clone(),
        port: config.modbus_port,
        connect_timeout_ms: config.modbus_connect_timeout_ms,
        read_timeout_ms: config.modbus_read_timeout_ms,
    }))
}
