//! Event configuration: which keys trigger which actions, and feature toggles.
//!
//! The host hands configuration over as a loosely-typed JSON object keyed by
//! slash-separated option names (`"shortcuts/translate"`, `"delete/enabled"`,
//! ...). Parsing is deliberately lenient: unknown keys are ignored, and a
//! recognized key carrying a value of the wrong shape keeps its default and
//! logs a warning. Configuration never fails to load because of its content.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::consts::{CLICK_EPSILON, HOVER_THROTTLE_MS};

pub const KEY_TRANSLATE: &str = "shortcuts/translate";
pub const KEY_ROTATE: &str = "shortcuts/rotate";
pub const KEY_SCALE: &str = "shortcuts/scale";
pub const KEY_UNDO: &str = "shortcuts/undo";
pub const KEY_FOCUS: &str = "shortcuts/focus";
pub const KEY_DELETE_ENABLED: &str = "delete/enabled";
pub const KEY_CONTEXT_MENU_ENABLED: &str = "contextmenu/enabled";
pub const KEY_DEBUG: &str = "debug";
pub const KEY_HOVER_THROTTLE_MS: &str = "hover/throttle_ms";
pub const KEY_CLICK_EPSILON: &str = "click/epsilon";
pub const KEY_HISTORY_LIMIT: &str = "history/limit";

/// Error raised when configuration text is not JSON at all.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("event config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fully-resolved event configuration. Every field has a documented default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventConfig {
    /// Letter that switches the gizmo to translate mode. Default `t`.
    #[serde(rename = "shortcuts/translate")]
    pub translate: char,
    /// Letter that switches the gizmo to rotate mode. Default `r`.
    #[serde(rename = "shortcuts/rotate")]
    pub rotate: char,
    /// Letter that switches the gizmo to scale mode. Default `s`.
    #[serde(rename = "shortcuts/scale")]
    pub scale: char,
    /// Letter that, with the platform's primary modifier, undoes (redoes with shift). Default `z`.
    #[serde(rename = "shortcuts/undo")]
    pub undo: char,
    /// Letter that recenters the camera on the selection. Default `f`.
    #[serde(rename = "shortcuts/focus")]
    pub focus: char,
    /// Whether Delete/Backspace remove the selected node. Default `true`.
    #[serde(rename = "delete/enabled")]
    pub delete_enabled: bool,
    /// Whether the viewport intercepts the context-menu gesture. Default `true`.
    #[serde(rename = "contextmenu/enabled")]
    pub context_menu_enabled: bool,
    /// Debug configuration: inconsistencies are reported at error level. Default `false`.
    pub debug: bool,
    /// Minimum interval between hover evaluations. Default 200 ms.
    #[serde(rename = "hover/throttle_ms")]
    pub hover_throttle_ms: u64,
    /// Maximum down/up distance for a click, in normalized units. Default 0.001.
    #[serde(rename = "click/epsilon")]
    pub click_epsilon: f64,
    /// Maximum retained undo entries. Default unbounded.
    #[serde(rename = "history/limit", skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            translate: 't',
            rotate: 'r',
            scale: 's',
            undo: 'z',
            focus: 'f',
            delete_enabled: true,
            context_menu_enabled: true,
            debug: false,
            hover_throttle_ms: HOVER_THROTTLE_MS,
            click_epsilon: CLICK_EPSILON,
            history_limit: None,
        }
    }
}

impl EventConfig {
    /// Build a configuration from a JSON object, layering recognized keys over
    /// the defaults. Anything that is not an object yields the defaults.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let mut config = Self::default();
        match value.as_object() {
            Some(map) => config.merge(map),
            None if value.is_null() => {}
            None => tracing::warn!("event config is not an object; using defaults"),
        }
        config
    }

    /// Parse configuration from JSON text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_json(&value))
    }

    /// Hover throttle window as a duration.
    #[must_use]
    pub fn hover_throttle(&self) -> Duration {
        Duration::from_millis(self.hover_throttle_ms)
    }

    fn merge(&mut self, map: &Map<String, Value>) {
        for (key, value) in map {
            match key.as_str() {
                KEY_TRANSLATE => set_letter(&mut self.translate, key, value),
                KEY_ROTATE => set_letter(&mut self.rotate, key, value),
                KEY_SCALE => set_letter(&mut self.scale, key, value),
                KEY_UNDO => set_letter(&mut self.undo, key, value),
                KEY_FOCUS => set_letter(&mut self.focus, key, value),
                KEY_DELETE_ENABLED => set_bool(&mut self.delete_enabled, key, value),
                KEY_CONTEXT_MENU_ENABLED => set_bool(&mut self.context_menu_enabled, key, value),
                KEY_DEBUG => set_bool(&mut self.debug, key, value),
                KEY_HOVER_THROTTLE_MS => match value.as_u64() {
                    Some(ms) => self.hover_throttle_ms = ms,
                    None => warn_mistyped(key, "a non-negative integer"),
                },
                KEY_CLICK_EPSILON => match value.as_f64() {
                    Some(eps) if eps.is_finite() && eps >= 0.0 => self.click_epsilon = eps,
                    _ => warn_mistyped(key, "a non-negative number"),
                },
                KEY_HISTORY_LIMIT => match value {
                    Value::Null => self.history_limit = None,
                    _ => match value.as_u64().map(usize::try_from) {
                        Some(Ok(limit)) => self.history_limit = Some(limit),
                        _ => warn_mistyped(key, "a non-negative integer or null"),
                    },
                },
                other => tracing::debug!(key = other, "ignoring unrecognized event config key"),
            }
        }
    }
}

fn set_letter(slot: &mut char, key: &str, value: &Value) {
    let letter = value.as_str().and_then(|s| {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    });
    match letter {
        Some(c) => *slot = c,
        None => warn_mistyped(key, "a single letter or digit"),
    }
}

fn set_bool(slot: &mut bool, key: &str, value: &Value) {
    match value.as_bool() {
        Some(b) => *slot = b,
        None => warn_mistyped(key, "a boolean"),
    }
}

fn warn_mistyped(key: &str, expected: &str) {
    tracing::warn!(key, expected, "event config value has the wrong type; keeping default");
}
