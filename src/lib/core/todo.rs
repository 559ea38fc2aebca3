use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::TodoError;

/// Identifier assigned by the store; strictly increasing, never reused.
pub type TodoId = i64;

pub const TEXT_REQUIRED: &str = "text required";

/// A todo as exposed by the list endpoint. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub done: bool,
}

/// Body of a create request. Unknown fields are ignored and a `null` text
/// counts as missing.
#[derive(Debug, Default, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub text: Option<String>,
}

impl NewTodo {
    /// Parses a raw request body without looking at its content type.
    pub fn from_json(body: &[u8]) -> Result<Self, TodoError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| TodoError::MalformedRequest(e.to_string()))?;
        if !value.is_object() {
            return Err(TodoError::MalformedRequest("expected a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| TodoError::MalformedRequest(e.to_string()))
    }

    /// Trimmed text, or a validation error when nothing is left.
    pub fn validated_text(&self) -> Result<&str, TodoError> {
        let text = self.text.as_deref().unwrap_or("").trim();
        if text.is_empty() {
            return Err(TodoError::Validation(TEXT_REQUIRED));
        }
        Ok(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoCreated {
    pub status: String,
    pub id: TodoId,
}

impl TodoCreated {
    pub fn ok(id: TodoId) -> Self {
        Self {
            status: "ok".to_string(),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_fields_in_order() {
        let todo = Todo {
            id: 1,
            text: "buy milk".to_string(),
            done: false,
        };
        let json = serde_json::to_string(&todo).unwrap();
        assert_eq!(json, r#"{"id":1,"text":"buy milk","done":false}"#);
    }

    #[test]
    fn created_response_shape() {
        let json = serde_json::to_string(&TodoCreated::ok(7)).unwrap();
        assert_eq!(json, r#"{"status":"ok","id":7}"#);
    }

    #[test]
    fn text_is_trimmed() {
        let input = NewTodo::from_json(br#"{"text":"  buy milk  "}"#).unwrap();
        assert_eq!(input.validated_text().unwrap(), "buy milk");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let input = NewTodo::from_json(br#"{"text":"walk dog","done":true,"id":99}"#).unwrap();
        assert_eq!(input.validated_text().unwrap(), "walk dog");
    }

    #[test]
    fn missing_empty_blank_and_null_text_are_rejected() {
        for body in [
            r#"{}"#,
            r#"{"text":""}"#,
            r#"{"text":"   \t\n "}"#,
            r#"{"text":null}"#,
        ] {
            let input = NewTodo::from_json(body.as_bytes()).unwrap();
            match input.validated_text() {
                Err(TodoError::Validation(msg)) => assert_eq!(msg, TEXT_REQUIRED),
                other => panic!("expected validation error for {body}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unparseable_body_is_malformed() {
        for body in ["", "not json", r#"{"text":"#] {
            assert!(matches!(
                NewTodo::from_json(body.as_bytes()),
                Err(TodoError::MalformedRequest(_))
            ));
        }
    }

    #[test]
    fn non_object_body_is_malformed() {
        for body in [r#"["buy milk"]"#, r#""buy milk""#, "42", "null"] {
            assert!(matches!(
                NewTodo::from_json(body.as_bytes()),
                Err(TodoError::MalformedRequest(_))
            ));
        }
    }

    #[test]
    fn non_string_text_is_malformed() {
        assert!(matches!(
            NewTodo::from_json(br#"{"text":5}"#),
            Err(TodoError::MalformedRequest(_))
        ));
    }
}
