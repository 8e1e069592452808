use chrono::{TimeZone, Utc};
use domain::{Point, TagValue};
use historian_storage::{InMemoryPointStore, PointStore};

fn sample_point(tag: &str, value: TagValue) -> Point {
    Point {
        measurement: "historian_measurement".to_string(),
        tag: tag.to_string(),
        value,
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn in_memory_keeps_write_order() {
    let store = InMemoryPointStore::new();
    assert!(store.is_empty());
    store.connect().await.expect("connect");

    store
        .write_point(&sample_point("temp", TagValue::Float32(21.5)))
        .await
        .expect("write temp");
    store
        .write_point(&sample_point("running", TagValue::Bool(true)))
        .await
        .expect("write running");

    let points = store.points();
    assert_eq!(store.len(), 2);
    assert_eq!(points[0].tag, "temp");
    assert_eq!(points[1].tag, "running");
    assert_eq!(points[1].value, TagValue::Bool(true));
    store.close().await.expect("close");
}
