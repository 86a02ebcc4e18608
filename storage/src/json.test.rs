use serde_json::json;

use super::*;

#[test]
fn round_trips_optional_json() {
    let value = Some(json!({"a": 1}));
    let text = to_json_opt(&value);
    assert_eq!(text, Some("{\"a\":1}".to_string()));
    assert_eq!(from_json_opt(text).unwrap(), value);
}

#[test]
fn none_round_trips_to_none() {
    assert_eq!(to_json_opt(&None), None);
    assert_eq!(from_json_opt(None).unwrap(), None);
}

#[test]
fn required_field_round_trips() {
    let ids = vec!["a".to_string(), "b".to_string()];
    let text = to_json_string(&ids).unwrap();
    let decoded: Vec<String> = from_json_str(&text).unwrap();
    assert_eq!(decoded, ids);
}

#[test]
fn decode_error_on_garbage() {
    assert!(from_json_opt(Some("not json".to_string())).is_err());
}
