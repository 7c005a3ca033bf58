use serde_json::json;

use stt_lanes::domain::TranscriptionResult;

#[test]
fn given_object_with_text_when_converting_then_keeps_every_field() {
    let value = json!({"text": "hello", "language": "en", "segments": []});

    let result = TranscriptionResult::from_value(value.clone()).unwrap();

    assert_eq!(result.text(), "hello");
    assert_eq!(result.into_value(), value);
}

#[test]
fn given_object_without_text_when_converting_then_rejects() {
    let err = TranscriptionResult::from_value(json!({"language": "en"})).unwrap_err();
    assert!(err.contains("text"));
}

#[test]
fn given_non_string_text_when_converting_then_rejects() {
    assert!(TranscriptionResult::from_value(json!({"text": 42})).is_err());
}

#[test]
fn given_non_object_when_converting_then_rejects() {
    let err = TranscriptionResult::from_value(json!(["text"])).unwrap_err();
    assert!(err.contains("array"));
}

#[test]
fn given_result_when_serialized_then_is_a_flat_mapping() {
    let result = TranscriptionResult::from_text("hi").with_field("language", json!("fr"));

    let serialized = serde_json::to_value(&result).unwrap();

    assert_eq!(serialized, json!({"text": "hi", "language": "fr"}));
}

#[test]
fn given_json_without_text_when_deserializing_then_fails() {
    let result = serde_json::from_str::<TranscriptionResult>(r#"{"language": "en"}"#);

    let err = result.unwrap_err().to_string();
    assert!(err.contains("missing field `text`"));
}

#[test]
fn given_json_with_text_when_deserializing_then_keeps_extra_fields() {
    let result: TranscriptionResult =
        serde_json::from_str(r#"{"text": "hej", "language": "da"}"#).unwrap();

    assert_eq!(result.text(), "hej");
    assert_eq!(result.get("language"), Some(&json!("da")));
}
