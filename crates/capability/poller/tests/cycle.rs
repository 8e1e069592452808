use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use domain::{ByteOrder, TagDefinition, TagSchema, TagValue, ValueType};
use historian_poller::{
    HistorianEvent, PollCycleController, RecordingEventSink, RetryPolicy, TagOutcome,
};
use historian_protocol::{MockRegisterClient, ProtocolError, RegisterClient};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// 对指定从站返回若干次传输失败，之后委托给 Mock。
struct FlakyClient {
    inner: MockRegisterClient,
    failures: Mutex<HashMap<u8, u32>>,
    reads: Mutex<Vec<(u8, u16, u16)>>,
}

impl FlakyClient {
    fn new(inner: MockRegisterClient) -> Self {
        Self {
            inner,
            failures: Mutex::new(HashMap::new()),
            reads: Mutex::new(Vec::new()),
        }
    }

    fn failing(self, unit_id: u8, times: u32) -> Self {
        self.failures.lock().unwrap().insert(unit_id, times);
        self
    }

    fn reads(&self) -> Vec<(u8, u16, u16)> {
        self.reads.lock().unwrap().clone()
    }

    fn reads_for(&self, unit_id: u8) -> usize {
        self.reads().iter().filter(|(unit, _, _)| *unit == unit_id).count()
    }

    fn before_read(&self, unit_id: u8, address: u16, count: u16) -> Result<(), ProtocolError> {
        self.reads.lock().unwrap().push((unit_id, address, count));
        let mut failures = self.failures.lock().unwrap();
        if let Some(left) = failures.get_mut(&unit_id) {
            if *left > 0 {
                *left -= 1;
                return Err(ProtocolError::Timeout("read holding registers".to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RegisterClient for FlakyClient {
    async fn connect(&self) -> Result<(), ProtocolError> {
        self.inner.connect().await
    }

    async fn read_coils(
        &self,
        unit_id: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<bool>, ProtocolError> {
        self.before_read(unit_id, address, count)?;
        self.inner.read_coils(unit_id, address, count).await
    }

    async fn read_holding_registers(
        &self,
        unit_id: u8,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        self.before_read(unit_id, address, count)?;
        self.inner.read_holding_registers(unit_id, address, count).await
    }

    async fn close(&self) -> Result<(), ProtocolError> {
        self.inner.close().await
    }
}

/// 返回固定长度的寄存器/线圈载荷。
struct FixedPayloadClient {
    len: usize,
}

#[async_trait]
impl RegisterClient for FixedPayloadClient {
    async fn connect(&self) -> Result<(), ProtocolError> {
        Ok(())
    }

    async fn read_coils(&self, _: u8, _: u16, _: u16) -> Result<Vec<bool>, ProtocolError> {
        Ok(vec![true; self.len])
    }

    async fn read_holding_registers(
        &self,
        _: u8,
        _: u16,
        _: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        Ok(vec![0x4148; self.len])
    }

    async fn close(&self) -> Result<(), ProtocolError> {
        Ok(())
    }
}

fn tag(name: &str, unit_id: u8, address: u16, value_type: ValueType) -> TagDefinition {
    TagDefinition::new(name, unit_id, address, value_type, ByteOrder::Big)
}

fn cycle_ts() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

#[tokio::test(start_paused = true)]
async fn failing_tag_is_attempted_three_times_then_missing() {
    let client = FlakyClient::new(
        MockRegisterClient::new()
            .with_float32(1, 0, 1.5, ByteOrder::Big)
            .with_int16(2, 7, -10),
    )
    .failing(1, u32::MAX);
    let schema = TagSchema::new(vec![
        tag("temp", 1, 0, ValueType::Float32),
        tag("count", 2, 7, ValueType::Int16),
    ])
    .unwrap();
    let events = RecordingEventSink::new();
    let controller = PollCycleController::new(RetryPolicy::default());
    let start = Instant::now();

    let outcomes = controller.poll(&client, &schema, cycle_ts(), &events).await;

    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert_eq!(client.reads_for(1), 3);
    assert_eq!(outcomes.len(), 2);
    assert!(matches!(
        &outcomes[0],
        TagOutcome::Missing { tag, attempts: 3, .. } if tag == "temp"
    ));
    assert_eq!(outcomes[1].value(), Some(&TagValue::Int16(-10)));

    let attempts: Vec<u32> = events
        .events()
        .iter()
        .filter_map(|event| match event {
            HistorianEvent::ReadFailed { tag, attempt, .. } if tag == "temp" => Some(*attempt),
            _ => None,
        })
        .collect();
    assert_eq!(attempts, vec![1, 2, 3]);
    assert_eq!(
        events.names(),
        vec!["read.failed", "read.failed", "read.failed", "value.missing"]
    );
}

#[tokio::test(start_paused = true)]
async fn unsupported_type_is_neither_read_nor_retried() {
    let client = FlakyClient::new(MockRegisterClient::new().with_coil(1, 3, true));
    let schema = TagSchema::new(vec![
        tag("mode", 1, 0, ValueType::Unknown("string".to_string())),
        tag("running", 1, 3, ValueType::Bool),
    ])
    .unwrap();
    let events = RecordingEventSink::new();
    let controller = PollCycleController::default();
    let start = Instant::now();

    let outcomes = controller.poll(&client, &schema, cycle_ts(), &events).await;

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(client.reads(), vec![(1, 3, 1)]);
    assert_eq!(
        outcomes[0],
        TagOutcome::UnsupportedType {
            tag: "mode".to_string(),
            value_type: "string".to_string(),
        }
    );
    assert_eq!(outcomes[1].value(), Some(&TagValue::Bool(true)));
    assert_eq!(events.names(), vec!["unsupported.type"]);
}

#[tokio::test(start_paused = true)]
async fn transient_failure_recovers_within_budget() {
    let client = FlakyClient::new(MockRegisterClient::new().with_int16(1, 0, 42)).failing(1, 2);
    let schema = TagSchema::new(vec![tag("level", 1, 0, ValueType::Int16)]).unwrap();
    let events = RecordingEventSink::new();
    let start = Instant::now();

    let outcomes = PollCycleController::default()
        .poll(&client, &schema, cycle_ts(), &events)
        .await;

    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert_eq!(outcomes[0].value(), Some(&TagValue::Int16(42)));
    assert_eq!(events.names(), vec!["read.failed", "read.failed"]);
}

#[tokio::test(start_paused = true)]
async fn empty_payload_counts_as_failed_attempt() {
    let client = FixedPayloadClient { len: 0 };
    let schema = TagSchema::new(vec![tag("running", 1, 0, ValueType::Bool)]).unwrap();
    let events = RecordingEventSink::new();

    let outcomes = PollCycleController::default()
        .poll(&client, &schema, cycle_ts(), &events)
        .await;

    match &outcomes[0] {
        TagOutcome::Missing {
            attempts, error, ..
        } => {
            assert_eq!(*attempts, 3);
            assert_eq!(error, "empty payload");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn short_float_payload_is_missing() {
    let client = FixedPayloadClient { len: 1 };
    let schema = TagSchema::new(vec![tag("temp", 1, 0, ValueType::Float32)]).unwrap();
    let events = RecordingEventSink::new();

    let outcomes = PollCycleController::new(RetryPolicy::new(2, Duration::from_secs(1)))
        .poll(&client, &schema, cycle_ts(), &events)
        .await;

    assert!(matches!(
        &outcomes[0],
        TagOutcome::Missing { attempts: 2, error, .. } if error.contains("short payload")
    ));
}

#[tokio::test]
async fn outcomes_follow_schema_order_and_share_timestamp() {
    let client = MockRegisterClient::new()
        .with_coil(1, 0, true)
        .with_int16(1, 10, -32768)
        .with_float32(1, 20, 123.456, ByteOrder::Little);
    let schema = TagSchema::new(vec![
        TagDefinition::new("flow", 1, 20, ValueType::Float32, ByteOrder::Little),
        tag("running", 1, 0, ValueType::Bool),
        tag("count", 1, 10, ValueType::Int16),
    ])
    .unwrap();
    let events = RecordingEventSink::new();
    let ts = cycle_ts();

    let outcomes = PollCycleController::default()
        .poll(&client, &schema, ts, &events)
        .await;

    let tags: Vec<&str> = outcomes.iter().map(TagOutcome::tag).collect();
    assert_eq!(tags, vec!["flow", "running", "count"]);
    assert_eq!(outcomes[0].value(), Some(&TagValue::Float32(123.456)));
    assert_eq!(outcomes[1].value(), Some(&TagValue::Bool(true)));
    assert_eq!(outcomes[2].value(), Some(&TagValue::Int16(-32768)));
    for outcome in &outcomes {
        match outcome {
            TagOutcome::Value(decoded) => assert_eq!(decoded.captured_at, ts),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert!(events.events().is_empty());
}
