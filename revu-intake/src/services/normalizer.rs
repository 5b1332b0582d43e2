//! Request normalizer
//!
//! Extracts the review text from a submission, accepting either the
//! `message` or the `review` field. `message` wins when both carry text. The
//! returned text is the field's raw value: no trimming, case folding or
//! truncation.

use crate::error::PipelineError;
use serde_json::{Map, Value};

const MESSAGE_FIELD: &str = "message";
const REVIEW_FIELD: &str = "review";

/// Inbound submission: a JSON object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    fields: Map<String, Value>,
}

impl Submission {
    /// Parse a request body; anything but a JSON object is rejected
    pub fn from_json_bytes(body: &[u8]) -> Result<Self, PipelineError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| PipelineError::Validation(format!("malformed JSON body: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, PipelineError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(PipelineError::Validation(format!(
                "request body must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Submission carrying only a `message` field
    pub fn with_message(text: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(MESSAGE_FIELD.to_string(), Value::String(text.into()));
        Self { fields }
    }

    /// Submission carrying only a `review` field
    pub fn with_review(text: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(REVIEW_FIELD.to_string(), Value::String(text.into()));
        Self { fields }
    }

    /// Non-empty string value of a field; non-string values count as absent
    fn text_field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
    }
}

/// Return the review text or fail with a validation error
pub fn normalize(submission: &Submission) -> Result<String, PipelineError> {
    submission
        .text_field(MESSAGE_FIELD)
        .or_else(|| submission.text_field(REVIEW_FIELD))
        .map(str::to_string)
        .ok_or_else(|| PipelineError::Validation("missing review text".to_string()))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(value: Value) -> Submission {
        Submission::from_value(value).unwrap()
    }

    #[test]
    fn test_message_field_returned_verbatim() {
        let text = "  Worst experience ever.\tThe service was HORRIBLE.  ";
        assert_eq!(normalize(&Submission::with_message(text)).unwrap(), text);
    }

    #[test]
    fn test_message_takes_precedence_over_review() {
        let s = submission(json!({"message": "from message", "review": "from review"}));
        assert_eq!(normalize(&s).unwrap(), "from message");
    }

    #[test]
    fn test_review_used_when_message_absent() {
        let s = submission(json!({"review": "Great product, highly recommend!"}));
        assert_eq!(normalize(&s).unwrap(), "Great product, highly recommend!");
    }

    #[test]
    fn test_review_used_when_message_empty() {
        let s = submission(json!({"message": "", "review": "fallback"}));
        assert_eq!(normalize(&s).unwrap(), "fallback");
    }

    #[test]
    fn test_missing_fields_rejected() {
        for value in [
            json!({}),
            json!({"message": "", "review": ""}),
            json!({"comment": "wrong field"}),
            json!({"message": 42}),
            json!({"message": null, "review": ["array"]}),
        ] {
            let err = normalize(&submission(value.clone())).unwrap_err();
            assert_eq!(
                err,
                PipelineError::Validation("missing review text".to_string()),
                "{value}"
            );
        }
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert!(matches!(
            Submission::from_json_bytes(b"[\"message\"]"),
            Err(PipelineError::Validation(_))
        ));
        assert!(matches!(
            Submission::from_json_bytes(b"{not json"),
            Err(PipelineError::Validation(_))
        ));
        assert!(Submission::from_json_bytes(br#"{"review": "ok"}"#).is_ok());
    }
}
