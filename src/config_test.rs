#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

// =============================================================
// Defaults
// =============================================================

#[test]
fn defaults_match_documented_values() {
    let config = EventConfig::default();
    assert_eq!(config.translate, 't');
    assert_eq!(config.rotate, 'r');
    assert_eq!(config.scale, 's');
    assert_eq!(config.undo, 'z');
    assert_eq!(config.focus, 'f');
    assert!(config.delete_enabled);
    assert!(config.context_menu_enabled);
    assert!(!config.debug);
    assert_eq!(config.hover_throttle_ms, 200);
    assert_eq!(config.click_epsilon, 0.001);
    assert_eq!(config.history_limit, None);
}

#[test]
fn hover_throttle_as_duration() {
    let config = EventConfig { hover_throttle_ms: 75, ..EventConfig::default() };
    assert_eq!(config.hover_throttle(), Duration::from_millis(75));
}

// =============================================================
// from_json
// =============================================================

#[test]
fn empty_object_yields_defaults() {
    assert_eq!(EventConfig::from_json(&json!({})), EventConfig::default());
}

#[test]
fn non_object_yields_defaults() {
    assert_eq!(EventConfig::from_json(&json!(null)), EventConfig::default());
    assert_eq!(EventConfig::from_json(&json!([1, 2, 3])), EventConfig::default());
    assert_eq!(EventConfig::from_json(&json!("delete/enabled")), EventConfig::default());
}

#[test]
fn recognized_keys_override_defaults() {
    let config = EventConfig::from_json(&json!({
        "shortcuts/translate": "w",
        "shortcuts/rotate": "e",
        "shortcuts/scale": "q",
        "shortcuts/undo": "y",
        "shortcuts/focus": "g",
        "delete/enabled": false,
        "contextmenu/enabled": false,
    }));
    assert_eq!(config.translate, 'w');
    assert_eq!(config.rotate, 'e');
    assert_eq!(config.scale, 'q');
    assert_eq!(config.undo, 'y');
    assert_eq!(config.focus, 'g');
    assert!(!config.delete_enabled);
    assert!(!config.context_menu_enabled);
}

#[test]
fn partial_override_keeps_other_defaults() {
    let config = EventConfig::from_json(&json!({ "delete/enabled": false }));
    assert!(!config.delete_enabled);
    assert_eq!(config.translate, 't');
    assert!(config.context_menu_enabled);
}

#[test]
fn letters_are_lowercased() {
    let config = EventConfig::from_json(&json!({ "shortcuts/focus": "F" }));
    assert_eq!(config.focus, 'f');
}

#[test]
fn unknown_keys_are_ignored() {
    let config = EventConfig::from_json(&json!({ "shortcuts/explode": "x", "theme": "dark" }));
    assert_eq!(config, EventConfig::default());
}

#[test]
fn mistyped_values_keep_defaults() {
    let config = EventConfig::from_json(&json!({
        "shortcuts/translate": 7,
        "shortcuts/rotate": "rr",
        "shortcuts/scale": "",
        "delete/enabled": "no",
        "hover/throttle_ms": -5,
        "click/epsilon": "tiny",
        "history/limit": 2.5,
    }));
    assert_eq!(config, EventConfig::default());
}

#[test]
fn supplementary_keys() {
    let config = EventConfig::from_json(&json!({
        "debug": true,
        "hover/throttle_ms": 50,
        "click/epsilon": 0.01,
        "history/limit": 3,
    }));
    assert!(config.debug);
    assert_eq!(config.hover_throttle_ms, 50);
    assert_eq!(config.click_epsilon, 0.01);
    assert_eq!(config.history_limit, Some(3));
}

#[test]
fn history_limit_null_means_unbounded() {
    let config = EventConfig::from_json(&json!({ "history/limit": null }));
    assert_eq!(config.history_limit, None);
}

#[test]
fn negative_epsilon_rejected() {
    let config = EventConfig::from_json(&json!({ "click/epsilon": -1.0 }));
    assert_eq!(config.click_epsilon, 0.001);
}

// =============================================================
// parse / serialize
// =============================================================

#[test]
fn parse_text() {
    let config = EventConfig::parse(r#"{"shortcuts/undo": "u"}"#);
    assert!(matches!(config, Ok(ref c) if c.undo == 'u'));
}

#[test]
fn parse_invalid_json_is_error() {
    assert!(matches!(EventConfig::parse("{not json"), Err(ConfigError::Json(_))));
}

#[test]
fn serializes_with_slash_keys() {
    let value = serde_json::to_value(EventConfig::default()).unwrap_or_default();
    assert_eq!(value["shortcuts/translate"], json!("t"));
    assert_eq!(value["delete/enabled"], json!(true));
    assert_eq!(value["contextmenu/enabled"], json!(true));
    assert!(value.get("history/limit").is_none());
}

#[test]
fn serialized_form_parses_back() {
    let config = EventConfig { undo: 'y', delete_enabled: false, history_limit: Some(10), ..EventConfig::default() };
    let value = serde_json::to_value(&config).unwrap_or_default();
    assert_eq!(EventConfig::from_json(&value), config);
}
