use historian_telemetry::{
    MetricsSnapshot, TelemetryMetrics, init_tracing, metrics, record_cycle, record_point_written,
    record_value_missing,
};

#[test]
fn fresh_metrics_start_at_zero() {
    let metrics = TelemetryMetrics::new();
    assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
}

#[test]
fn global_counters_increase() {
    init_tracing();
    let before = metrics().snapshot();
    record_cycle();
    record_point_written();
    record_point_written();
    record_value_missing();
    let after = metrics().snapshot();
    assert!(after.cycles >= before.cycles + 1);
    assert!(after.points_written >= before.points_written + 2);
    assert!(after.values_missing >= before.values_missing + 1);
}
