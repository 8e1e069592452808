use historian_config::{AppConfig, ConfigError, load_tag_schema};
use std::collections::HashMap;
use std::time::Duration;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_apply_when_unset() {
    let config = AppConfig::from_lookup(lookup(&[])).expect("config");
    assert_eq!(config.tags_path, "./tags.yaml");
    assert_eq!(config.modbus_host, "plc");
    assert_eq!(config.modbus_port, 502);
    assert!(!config.modbus_mock);
    assert_eq!(config.poll_interval, Duration::from_secs(1));
    assert_eq!(config.read_attempts, 3);
    assert_eq!(config.retry_delay_ms, 5000);
    assert_eq!(config.measurement, "historian_measurement");
    assert_eq!(config.influx_url, "http://influxdb:8086");
    assert_eq!(config.influx_bucket, "bucket");
}

#[test]
fn overrides_are_parsed() {
    let config = AppConfig::from_lookup(lookup(&[
        ("MODBUS_HOST", "10.0.0.5"),
        ("MODBUS_PORT", "5020"),
        ("POLL_INTERVAL", "0.25"),
        ("HISTORIAN_READ_ATTEMPTS", "5"),
        ("INFLUX_ORG", "plant"),
    ]))
    .expect("config");
    assert_eq!(config.modbus_host, "10.0.0.5");
    assert_eq!(config.modbus_port, 5020);
    assert_eq!(config.poll_interval, Duration::from_millis(250));
    assert_eq!(config.read_attempts, 5);
    assert_eq!(config.influx_org, "plant");
}

#[test]
fn mock_host_selects_mock_client() {
    let config = AppConfig::from_lookup(lookup(&[("MODBUS_HOST", "mock")])).expect("config");
    assert!(config.modbus_mock);
    let config = AppConfig::from_lookup(lookup(&[("MODBUS_MOCK", "true")])).expect("config");
    assert!(config.modbus_mock);
}

#[test]
fn invalid_values_are_rejected() {
    let err = AppConfig::from_lookup(lookup(&[("MODBUS_PORT", "70000")])).expect_err("port");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "MODBUS_PORT"));

    let err = AppConfig::from_lookup(lookup(&[("POLL_INTERVAL", "-1")])).expect_err("interval");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "POLL_INTERVAL"));

    let err = AppConfig::from_lookup(lookup(&[("POLL_INTERVAL", "NaN")])).expect_err("nan");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "POLL_INTERVAL"));

    let err = AppConfig::from_lookup(lookup(&[("HISTORIAN_READ_ATTEMPTS", "0")]))
        .expect_err("attempts");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "HISTORIAN_READ_ATTEMPTS"));
}

#[test]
fn poll_interval_beyond_duration_range_is_rejected() {
    let err = AppConfig::from_lookup(lookup(&[("POLL_INTERVAL", "1e20")])).expect_err("interval");
    assert!(matches!(
        err,
        ConfigError::Invalid(key, value) if key == "POLL_INTERVAL" && value == "1e20"
    ));
}

#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("INFLUX_BUCKET", "historian-test");
    }

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.influx_bucket, "historian-test");
}

#[test]
fn load_tag_schema_from_file() {
    let path = std::env::temp_dir().join(format!("historian-tags-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{"tags": [{"name": "temp", "unit": 1, "address": 0, "type": "float32", "byteorder": "big"}]}"#,
    )
    .expect("write schema");

    let schema = load_tag_schema(&path).expect("schema");
    let _ = std::fs::remove_file(&path);
    assert_eq!(schema.len(), 1);
    assert_eq!(schema.tags()[0].name, "temp");
}

#[test]
fn load_tag_schema_from_yaml_file() {
    let path = std::env::temp_dir().join(format!("historian-tags-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "tags:\n  - name: temp\n    unit: 1\n    address: 0\n    type: float32\n    byteorder: big\n  - name: running\n    address: 4\n    type: bool\n",
    )
    .expect("write schema");

    let schema = load_tag_schema(&path).expect("schema");
    let _ = std::fs::remove_file(&path);
    let names: Vec<&str> = schema.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, vec!["temp", "running"]);
    assert_eq!(schema.tags()[1].unit_id, 1);
}

#[test]
fn load_tag_schema_rejects_malformed_yaml() {
    let path = std::env::temp_dir().join(format!("historian-bad-{}.yml", std::process::id()));
    std::fs::write(&path, "tags: [unclosed\n").expect("write schema");

    let err = load_tag_schema(&path).expect_err("malformed");
    let _ = std::fs::remove_file(&path);
    assert!(matches!(err, ConfigError::Schema(_, _)));
}

#[test]
fn load_tag_schema_reports_missing_file() {
    let err = load_tag_schema("/nonexistent/historian/tags.json").expect_err("missing");
    assert!(matches!(err, ConfigError::SchemaIo(_, _)));
}
