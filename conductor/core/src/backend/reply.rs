//! Reply Normalization
//!
//! The backend's `message` field is polymorphic. It is decoded once, at the
//! boundary, into [`ReplyBody`] and then flattened to a single string before
//! it reaches any controller state.
//!
//! | Shape                          | Text                                   |
//! |--------------------------------|----------------------------------------|
//! | `"hi"`                         | `hi`                                   |
//! | `[{"type":"text","text":..}]`  | text segments joined by `\n`           |
//! | `{"text": "x"}`                | `x`                                    |
//! | `{...}` without `text`         | compact JSON of the object             |
//! | anything else                  | JSON string form (`42`, `true`, `null`) |

use serde_json::Value;

/// One element of a segmented reply
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplySegment {
    /// Value of the `type` tag, if present
    pub kind: Option<String>,
    /// Value of the `text` field, if it is a string
    pub text: Option<String>,
}

impl ReplySegment {
    fn from_value(value: &Value) -> Self {
        Self {
            kind: value.get("type").and_then(Value::as_str).map(String::from),
            text: value.get("text").and_then(Value::as_str).map(String::from),
        }
    }

    fn is_text(&self) -> bool {
        self.kind.as_deref() == Some("text")
    }
}

/// Decoded reply from `POST /conversation`
#[derive(Clone, Debug, PartialEq)]
pub enum ReplyBody {
    /// Plain string reply
    PlainText(String),
    /// Typed segments; only `text` segments are kept
    Segments(Vec<ReplySegment>),
    /// Object reply
    Object {
        /// The `text` field, when it is a string
        text: Option<String>,
        /// The whole object, used when `text` is absent
        raw: Value,
    },
    /// Any other JSON value
    Unknown(Value),
}

impl ReplyBody {
    /// Decode a raw `message` value
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => Self::PlainText(s),
            Value::Array(items) => Self::Segments(items.iter().map(ReplySegment::from_value).collect()),
            Value::Object(map) => {
                let text = map.get("text").and_then(Value::as_str).map(String::from);
                Self::Object {
                    text,
                    raw: Value::Object(map),
                }
            }
            other => Self::Unknown(other),
        }
    }

    /// Flatten to the text shown to the user
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::PlainText(s) => s,
            Self::Segments(segments) => segments
                .into_iter()
                .filter(ReplySegment::is_text)
                .filter_map(|s| s.text)
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Object { text: Some(text), .. } => text,
            Self::Object { text: None, raw } => raw.to_string(),
            Self::Unknown(value) => value.to_string(),
        }
    }
}

impl From<&str> for ReplyBody {
    fn from(s: &str) -> Self {
        Self::PlainText(s.to_string())
    }
}

impl From<String> for ReplyBody {
    fn from(s: String) -> Self {
        Self::PlainText(s)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn normalize(value: Value) -> String {
        ReplyBody::from_value(value).into_text()
    }

    #[test]
    fn test_plain_string_passthrough() {
        assert_eq!(normalize(json!("สวัสดี")), "สวัสดี");
    }

    #[test]
    fn test_segments_keep_only_text() {
        let value = json!([
            {"type": "text", "text": "a"},
            {"type": "other"},
            {"type": "text", "text": "b"}
        ]);
        assert_eq!(normalize(value), "a\nb");
    }

    #[test]
    fn test_segments_drop_non_objects_and_untagged() {
        let value = json!([
            "loose string",
            {"text": "no type"},
            {"type": "tool_use", "text": "hidden"},
            {"type": "text", "text": "kept"}
        ]);
        assert_eq!(normalize(value), "kept");
        assert_eq!(normalize(json!([])), "");
    }

    #[test]
    fn test_object_text_field() {
        assert_eq!(normalize(json!({"text": "x"})), "x");
    }

    #[test]
    fn test_object_without_text_serializes() {
        assert_eq!(normalize(json!({})), "{}");
        assert_eq!(normalize(json!({"text": 5})), "{\"text\":5}");
    }

    #[test]
    fn test_scalars_string_form() {
        assert_eq!(normalize(json!(42)), "42");
        assert_eq!(normalize(json!(true)), "true");
        assert_eq!(normalize(Value::Null), "null");
    }

    #[test]
    fn test_decode_shapes() {
        assert!(matches!(ReplyBody::from_value(json!("s")), ReplyBody::PlainText(_)));
        assert!(matches!(ReplyBody::from_value(json!([])), ReplyBody::Segments(_)));
        assert!(matches!(
            ReplyBody::from_value(json!({"text": "t"})),
            ReplyBody::Object { text: Some(_), .. }
        ));
        assert!(matches!(ReplyBody::from_value(json!(1.5)), ReplyBody::Unknown(_)));
    }
}
