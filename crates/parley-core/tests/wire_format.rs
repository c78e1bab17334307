// Frames as the translation server actually sends and expects them.

use parley_core::{InboundMessage, OutboundMessage, Severity, StatusSnapshot};

#[test]
fn outbound_uses_snake_case_target_lang() {
    let json = OutboundMessage::new("hello", "fr").to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["text"], "hello");
    assert_eq!(value["target_lang"], "fr");
    assert_eq!(value.as_object().unwrap().len(), 2);
}

#[test]
fn translation_pipeline_sequence() {
    // Status notices bracket the translated echo.
    let frames = [
        r#"{"type": "status", "message": "Translation Started."}"#,
        r#"{"text": "hello", "translation_text": "hola", "source_lang": "en", "target_lang": "es", "id": 1}"#,
        r#"{"type": "status", "message": "Translation Completed."}"#,
    ];
    let parsed: Vec<_> = frames
        .iter()
        .map(|f| InboundMessage::parse(f).unwrap())
        .collect();

    assert!(matches!(parsed[0], InboundMessage::Status { .. }));
    match &parsed[1] {
        InboundMessage::ChatResult {
            text,
            translation_text,
        } => {
            assert_eq!(text, "hello");
            assert_eq!(translation_text.as_deref(), Some("hola"));
        }
        other => panic!("expected chat result, got {other:?}"),
    }
    assert!(matches!(parsed[2], InboundMessage::Status { .. }));
}

#[test]
fn idle_status_body() {
    let snapshot: StatusSnapshot =
        serde_json::from_str(r#"{"status": "No status message available."}"#).unwrap();

    assert_eq!(snapshot.severity(), Severity::Info);
    assert_eq!(
        snapshot.headline(),
        "Server status: No status message available."
    );
}

#[test]
fn status_body_with_message() {
    let snapshot: StatusSnapshot =
        serde_json::from_str(r#"{"status": "offline", "message": "db down"}"#).unwrap();

    assert_eq!(snapshot, StatusSnapshot::new("offline").with_message("db down"));
    assert_eq!(snapshot.severity(), Severity::Error);
    assert_eq!(snapshot.headline(), "db down");
}
