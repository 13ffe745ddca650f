//! Conversion between step collections and canonical automation text
//!
//! The canonical form is a JSON array of records, each carrying an `action`
//! key followed by the action's fields in declaration order, e.g.
//! `[{"action":"llm_call","prompt":"..."}]`. Builder output is validated field
//! by field; hand-written text is only checked for JSON syntax.

use serde_json::{Map, Value};

use super::collection::StepCollection;
use super::error::EditorError;
use crate::actions::ActionRegistry;

/// Build the ordered record list for a collection.
///
/// Fails on the first step without an action type or the first field that
/// does not validate; nothing partial is returned.
pub fn to_records(
    steps: &StepCollection,
    registry: &ActionRegistry,
) -> Result<Vec<Value>, EditorError> {
    let mut records = Vec::with_capacity(steps.len());

    for entry in steps.entries() {
        let position = entry.position();
        let action_type = entry
            .action_type()
            .ok_or(EditorError::IncompleteStep { position })?;
        let definition = registry
            .lookup(action_type)
            .ok_or_else(|| EditorError::UnknownActionType(action_type.to_string()))?;

        let mut record = Map::new();
        record.insert("action".to_string(), Value::String(action_type.to_string()));

        for field in &definition.fields {
            let raw = entry.field_value(&field.name).unwrap_or_default();
            let value = field
                .kind
                .validate(raw)
                .map_err(|reason| EditorError::Validation {
                    position,
                    field: field.name.clone(),
                    reason,
                })?;
            record.insert(field.name.clone(), value);
        }

        records.push(Value::Object(record));
    }

    Ok(records)
}

/// Serialize a collection into canonical automation text
pub fn serialize(steps: &StepCollection, registry: &ActionRegistry) -> Result<String, EditorError> {
    let records = to_records(steps, registry)?;
    Ok(Value::Array(records).to_string())
}

/// Check that hand-written text deserializes as JSON.
///
/// The shape is not interpreted; any JSON value is accepted.
pub fn parse_raw(text: &str) -> Result<Value, EditorError> {
    serde_json::from_str(text).map_err(|e| EditorError::MalformedInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::FieldFailure;
    use std::sync::Arc;

    fn setup() -> (StepCollection, Arc<ActionRegistry>) {
        let registry = Arc::new(ActionRegistry::builtin());
        (StepCollection::new(Arc::clone(&registry)), registry)
    }

    #[test]
    fn test_email_and_save_scenario() {
        let (mut steps, registry) = setup();
        steps.add_step();
        steps.add_step();
        steps.set_step_type(0, "send_email").unwrap();
        steps.set_field_value(0, "recipient", "a@b.com").unwrap();
        steps.set_field_value(0, "subject", "Hi").unwrap();
        steps.set_field_value(0, "body", "Test").unwrap();
        steps.set_step_type(1, "save_data").unwrap();
        steps.set_field_value(1, "data", r#"{"k":1}"#).unwrap();

        let text = serialize(&steps, &registry).unwrap();
        assert_eq!(
            text,
            r#"[{"action":"send_email","recipient":"a@b.com","subject":"Hi","body":"Test"},{"action":"save_data","data":{"k":1}}]"#
        );
    }

    #[test]
    fn test_text_values_are_trimmed() {
        let (mut steps, registry) = setup();
        steps.add_step();
        steps.set_step_type(0, "llm_call").unwrap();
        steps
            .set_field_value(0, "prompt", "  write a business plan\n")
            .unwrap();

        let records = to_records(&steps, &registry).unwrap();
        assert_eq!(records[0]["prompt"], "write a business plan");
    }

    #[test]
    fn test_unset_type_is_incomplete() {
        let (mut steps, registry) = setup();
        steps.add_step();
        steps.add_step();
        steps.set_step_type(0, "llm_call").unwrap();
        steps.set_field_value(0, "prompt", "hello").unwrap();

        assert_eq!(
            serialize(&steps, &registry),
            Err(EditorError::IncompleteStep { position: 1 })
        );
    }

    #[test]
    fn test_missing_field_is_empty_failure() {
        let (mut steps, registry) = setup();
        steps.add_step();
        steps.set_step_type(0, "send_email").unwrap();
        steps.set_field_value(0, "recipient", "a@b.com").unwrap();
        steps.set_field_value(0, "body", "Test").unwrap();

        assert_eq!(
            serialize(&steps, &registry),
            Err(EditorError::Validation {
                position: 0,
                field: "subject".to_string(),
                reason: FieldFailure::Empty,
            })
        );
    }

    #[test]
    fn test_truncated_json_is_malformed_failure() {
        let (mut steps, registry) = setup();
        steps.add_step();
        steps.set_step_type(0, "save_data").unwrap();
        steps
            .set_field_value(0, "data", r#"{"key": "value""#)
            .unwrap();

        match serialize(&steps, &registry) {
            Err(EditorError::Validation {
                position,
                field,
                reason: FieldFailure::Malformed(_),
            }) => {
                assert_eq!(position, 0);
                assert_eq!(field, "data");
            }
            other => panic!("expected malformed failure, got {:?}", other),
        }
    }

    #[test]
    fn test_first_failure_wins() {
        let (mut steps, registry) = setup();
        steps.add_step();
        steps.add_step();
        steps.set_step_type(0, "save_data").unwrap();
        steps.set_field_value(0, "data", "[").unwrap();
        // Step 1 is also broken but must not be reported
        steps.set_step_type(1, "llm_call").unwrap();

        let err = serialize(&steps, &registry).unwrap_err();
        assert_eq!(err.position(), Some(0));
    }

    #[test]
    fn test_empty_collection_serializes_to_empty_array() {
        let (steps, registry) = setup();
        assert_eq!(serialize(&steps, &registry).unwrap(), "[]");
    }

    #[test]
    fn test_round_trip_through_parse_raw() {
        let (mut steps, registry) = setup();
        steps.add_step();
        steps.add_step();
        steps.set_step_type(0, "llm_call").unwrap();
        steps.set_field_value(0, "prompt", "summarize").unwrap();
        steps.set_step_type(1, "save_data").unwrap();
        steps
            .set_field_value(1, "data", r#"{"rows": [1, 2], "ok": true}"#)
            .unwrap();

        let records = to_records(&steps, &registry).unwrap();
        let text = serialize(&steps, &registry).unwrap();
        let parsed = parse_raw(&text).unwrap();
        assert_eq!(parsed, Value::Array(records));
    }

    #[test]
    fn test_parse_raw_accepts_any_json() {
        assert!(parse_raw(r#"[{"action": "call_llm"}]"#).is_ok());
        assert!(parse_raw(r#"{"free": "form"}"#).is_ok());
        assert!(parse_raw("3").is_ok());
    }

    #[test]
    fn test_parse_raw_rejects_garbage() {
        assert!(matches!(
            parse_raw("[{\"action\": }]"),
            Err(EditorError::MalformedInput(_))
        ));
    }
}
