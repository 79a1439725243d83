use crate::LogRecord;

use serde_json::json;

#[test]
fn given_record_when_serialized_then_camel_case_fields() {
    let record = LogRecord::new("hi", "t1", "info", "2024-01-01T00:00:00Z");

    let value = record.to_value();

    assert_eq!(
        value,
        json!({
            "text": "hi",
            "threadId": "t1",
            "level": "info",
            "timestamp": "2024-01-01T00:00:00Z"
        })
    );
}

#[test]
fn given_extra_fields_when_round_tripped_then_preserved() {
    let raw = json!({
        "text": "step done",
        "threadId": "run-7",
        "level": "debug",
        "timestamp": "2024-01-01T00:00:00Z",
        "runId": "abc",
        "attempt": 2
    });

    let record: LogRecord = serde_json::from_value(raw.clone()).unwrap();

    assert_eq!(record.thread_id, "run-7");
    assert_eq!(record.extra.get("runId"), Some(&json!("abc")));
    assert_eq!(record.to_value(), raw);
}

#[test]
fn given_with_field_when_called_then_field_added() {
    let record = LogRecord::new("x", "t", "warn", "now").with_field("source", "worker");

    assert_eq!(record.to_value()["source"], json!("worker"));
}
