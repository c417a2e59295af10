//! Boolean Marker Codec
//!
//! Some host boundaries coerce booleans into numbers indistinguishable from
//! legitimate integers. Boolean-valued configuration fields are therefore
//! encoded as fixed sentinel strings before crossing the boundary and decoded
//! back by a recursive walk over maps and sequences. Booleans nested
//! arbitrarily deep must arrive intact; all other values pass through
//! unchanged.

use serde_json::Value;

const TRUE_MARKER: &str = "__helium_rn_bool_true__";
const FALSE_MARKER: &str = "__helium_rn_bool_false__";

/// Replace every boolean in `value` with its sentinel string, recursively.
pub fn encode_booleans(value: Value) -> Value {
    match value {
        Value::Bool(true) => Value::String(TRUE_MARKER.to_string()),
        Value::Bool(false) => Value::String(FALSE_MARKER.to_string()),
        Value::Array(items) => Value::Array(items.into_iter().map(encode_booleans).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (key, encode_booleans(inner)))
                .collect(),
        ),
        other => other,
    }
}

/// Replace every sentinel string in `value` with the boolean it stands for,
/// recursively.
pub fn decode_markers(value: Value) -> Value {
    match value {
        Value::String(text) if text == TRUE_MARKER => Value::Bool(true),
        Value::String(text) if text == FALSE_MARKER => Value::Bool(false),
        Value::Array(items) => Value::Array(items.into_iter().map(decode_markers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (key, decode_markers(inner)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip_is_deep_equal() {
        let original = json!({
            "useLoadingState": true,
            "loadingBudget": 2.0,
            "label": "checkout",
            "perTriggerLoadingConfig": {
                "onboarding": { "useLoadingState": false, "loadingBudget": 7 },
            },
            "flags": [true, false, "neither", 3, null],
        });

        let encoded = encode_booleans(original.clone());
        assert_eq!(encoded["useLoadingState"], TRUE_MARKER);
        assert_eq!(
            encoded["perTriggerLoadingConfig"]["onboarding"]["useLoadingState"],
            FALSE_MARKER
        );

        assert_eq!(decode_markers(encoded), original);
    }

    #[test]
    fn test_non_marker_strings_pass_through() {
        let value = json!({"name": "__other_marker__", "n": 1});
        assert_eq!(decode_markers(value.clone()), value);
    }
}
