//! The JSON interchange form.
//!
//! The document form serialized through `serde_json`: one object with
//! primitive-typed fields only, so a write-to-disk/read-back cycle returns
//! it verbatim. Decoding is strict — an unknown top-level key or a value of
//! the wrong shape is a [`CodecError`], never silently coerced.

use serde_json::Value;

use switchyard_action::{ActionSpace, TopologyAction};
use switchyard_core::{CodecError, FieldKey};

use crate::document::{decode_document, encode_document, ActionDocument};

/// Encode an action as a JSON object string.
pub fn encode_json(action: &TopologyAction) -> Result<String, CodecError> {
    serde_json::to_string(&encode_document(action)).map_err(|err| CodecError::BadValue {
        context: "json document".to_owned(),
        reason: err.to_string(),
    })
}

/// Decode an action from JSON text.
pub fn decode_json(space: &ActionSpace, text: &str) -> Result<TopologyAction, CodecError> {
    let value: Value = serde_json::from_str(text).map_err(|err| CodecError::BadValue {
        context: "json document".to_owned(),
        reason: err.to_string(),
    })?;
    decode_json_value(space, &value)
}

/// Decode an action from an already-parsed JSON value.
///
/// Checks the top-level keys against the field vocabulary first so an
/// unknown key is reported by name, then parses the shapes, then applies
/// the fields through the space's factory.
pub fn decode_json_value(space: &ActionSpace, value: &Value) -> Result<TopologyAction, CodecError> {
    let object = value.as_object().ok_or_else(|| CodecError::BadValue {
        context: "json document".to_owned(),
        reason: "expected a single object".to_owned(),
    })?;
    for key in object.keys() {
        if FieldKey::parse(key).is_none() {
            return Err(CodecError::UnknownKey { key: key.clone() });
        }
    }
    let doc: ActionDocument =
        serde_json::from_value(value.clone()).map_err(|err| CodecError::BadValue {
            context: "json document".to_owned(),
            reason: err.to_string(),
        })?;
    decode_document(space, doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use switchyard_action::ActionClass;
    use switchyard_core::GridConfig;
    use switchyard_test_utils::{case5, single_load};

    fn space() -> ActionSpace {
        ActionSpace::new(case5(), GridConfig::with_detachment(), ActionClass::Complete)
    }

    #[test]
    fn round_trip_through_text() {
        let space = space();
        let mut action = space.empty();
        action.set_bus([(18u32, -1)]).unwrap();
        action.detach_load([0usize, 2]).unwrap();

        let text = encode_json(&action).unwrap();
        let back = decode_json(&space, &text).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn empty_action_is_an_empty_object() {
        let space = space();
        assert_eq!(encode_json(&space.empty()).unwrap(), "{}");
        assert_eq!(decode_json(&space, "{}").unwrap(), space.empty());
    }

    #[test]
    fn accepts_every_flag_shape() {
        let space = space();
        let mut expected = space.empty();
        expected.detach_load(1usize).unwrap();

        for value in [
            json!({"detach_load": 1}),
            json!({"detach_load": [1]}),
            json!({"detach_load": ["load_3_1"]}),
            json!({"detach_load": [false, true, false]}),
        ] {
            let action = decode_json_value(&space, &value).unwrap();
            assert_eq!(action, expected, "shape {value} decoded differently");
        }
    }

    #[test]
    fn accepts_pairs_and_full_set_bus() {
        let space = ActionSpace::new(
            single_load(),
            GridConfig::default(),
            ActionClass::Complete,
        );
        let mut expected = space.empty();
        expected.set_bus([(7u32, -1)]).unwrap();

        let by_pairs = decode_json_value(&space, &json!({"set_bus": [[7, -1]]})).unwrap();
        let by_full =
            decode_json_value(&space, &json!({"set_bus": [0, 0, 0, 0, 0, 0, 0, -1, 0]})).unwrap();
        assert_eq!(by_pairs, expected);
        assert_eq!(by_full, expected);
    }

    #[test]
    fn unknown_key_is_named_in_the_error() {
        let space = space();
        let err = decode_json(&space, r#"{"redispatch": [1.0]}"#).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownKey {
                key: "redispatch".to_owned()
            }
        );
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let space = space();
        for text in [
            r#"{"set_bus": "all"}"#,
            r#"{"detach_load": {"0": true}}"#,
            r#"[1, 2, 3]"#,
            r#"{"change_bus": [[0, 1]]}"#,
        ] {
            let err = decode_json(&space, text).unwrap_err();
            assert!(
                matches!(err, CodecError::BadValue { .. }),
                "{text} gave {err:?}"
            );
        }
    }

    #[test]
    fn out_of_range_slot_is_rejected() {
        let space = space();
        let err = decode_json(&space, r#"{"set_bus": [[99, 1]]}"#).unwrap_err();
        assert!(matches!(err, CodecError::FieldRejected { .. }));
    }
}
