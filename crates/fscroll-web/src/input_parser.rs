#![forbid(unsafe_code)]

//! JSON parser for host-encoded scroll messages.
//!
//! A JS host forwards DOM events as small JSON objects, for example
//! `{"kind":"wheel","dy":120,"mode":"line"}`. [`parse_host_message`] turns
//! them into [`HostEvent`]s. Kinds the engine has no use for (keys, pointer
//! moves) return `Ok(None)`.
//!
//! | kind      | fields                                    |
//! |-----------|-------------------------------------------|
//! | `wheel`   | `dx`, `dy`, `mode` (`pixel`/`line`/`page`), `nested` |
//! | `touch`   | `dx`, `dy`, `nested`                      |
//! | `resize`  | `width`, `height` (required)              |
//! | `ready`   | `value` (defaults to `true`)              |
//! | `content` | none                                      |

use fscroll_core::geometry::ViewportRect;
use fscroll_core::input::{InputEvent, WheelDeltaMode};
use serde::Deserialize;

use crate::HostEvent;

/// Errors from parsing a host message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// Unknown wheel delta mode.
    UnknownMode(String),
}

impl core::fmt::Display for InputParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::UnknownMode(mode) => write!(f, "unknown wheel mode: {mode}"),
        }
    }
}

impl std::error::Error for InputParseError {}

#[derive(Debug, Deserialize)]
struct RawMessage {
    kind: String,
    #[serde(default)]
    dx: Option<f64>,
    #[serde(default)]
    dy: Option<f64>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    nested: bool,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    value: Option<bool>,
}

/// Parse one JSON host message.
///
/// Returns `Err` for malformed JSON, a resize without a size, or an unknown
/// wheel mode.
pub fn parse_host_message(json: &str) -> Result<Option<HostEvent>, InputParseError> {
    let raw: RawMessage =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;

    match raw.kind.as_str() {
        "wheel" => {
            let mode = parse_mode(raw.mode.as_deref())?;
            let event = InputEvent::wheel(delta(raw.dx), delta(raw.dy)).with_mode(mode);
            Ok(Some(HostEvent::Input(nested(event, raw.nested))))
        }
        "touch" => {
            let event = InputEvent::touch(delta(raw.dx), delta(raw.dy));
            Ok(Some(HostEvent::Input(nested(event, raw.nested))))
        }
        "resize" => {
            let width = raw.width.ok_or(InputParseError::MissingField("width"))?;
            let height = raw.height.ok_or(InputParseError::MissingField("height"))?;
            Ok(Some(HostEvent::Resize(ViewportRect::from_size(width, height))))
        }
        "ready" => Ok(Some(HostEvent::ContentReady(raw.value.unwrap_or(true)))),
        "content" => Ok(Some(HostEvent::ContentChanged)),
        _ => Ok(None),
    }
}

fn parse_mode(mode: Option<&str>) -> Result<WheelDeltaMode, InputParseError> {
    match mode {
        None | Some("pixel") => Ok(WheelDeltaMode::Pixel),
        Some("line") => Ok(WheelDeltaMode::Line),
        Some("page") => Ok(WheelDeltaMode::Page),
        Some(other) => Err(InputParseError::UnknownMode(other.to_string())),
    }
}

fn delta(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn nested(event: InputEvent, nested: bool) -> InputEvent {
    if nested { event.prevented() } else { event }
}
