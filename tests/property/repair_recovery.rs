//! Properties of structured-output repair

use fitgen::repair::{repair_json, NUMERIC_FIELDS};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn key() -> impl Strategy<Value = String> {
    "[a-z_]{1,10}".prop_filter("nutrition fields are coerced", |key| {
        !NUMERIC_FIELDS.contains(&key.as_str())
    })
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-zA-Z0-9 ,.:{}\\[\\]\"\\\\-]{0,16}".prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(key(), inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

fn json_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(key(), json_value(), 1..5)
        .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<String, Value>>()))
}

/// Top-level array led by an object, so the text opens with `[{`.
fn json_array() -> impl Strategy<Value = Value> {
    (json_object(), prop::collection::vec(json_value(), 0..4)).prop_map(|(first, rest)| {
        let mut items = vec![first];
        items.extend(rest);
        Value::Array(items)
    })
}

proptest! {
    #[test]
    fn test_well_formed_object_survives_prose_and_fences(
        value in json_object(),
        prefix in "[a-zA-Z !.:\n]{0,20}",
        suffix in "[a-zA-Z !.:\n]{0,20}",
        pretty in any::<bool>()
    ) {
        let body = if pretty {
            serde_json::to_string_pretty(&value).unwrap()
        } else {
            serde_json::to_string(&value).unwrap()
        };
        let raw = format!("{}```json\n{}\n```{}", prefix, body, suffix);
        prop_assert_eq!(repair_json(&raw), Some(value));
    }

    #[test]
    fn test_well_formed_array_survives_prose_and_fences(
        value in json_array(),
        prefix in "[a-zA-Z !.:\n]{0,20}",
        suffix in "[a-zA-Z !.:\n]{0,20}",
        fenced in any::<bool>()
    ) {
        let body = serde_json::to_string(&value).unwrap();
        let raw = if fenced {
            format!("{}```json\n{}\n```{}", prefix, body, suffix)
        } else {
            format!("{}{}{}", prefix, body, suffix)
        };
        prop_assert_eq!(repair_json(&raw), Some(value));
    }

    #[test]
    fn test_any_prefix_of_output_never_panics(value in prop_oneof![json_object(), json_array()], cut in any::<prop::sample::Index>()) {
        let text = serde_json::to_string(&value).unwrap();
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let end = boundaries[cut.index(boundaries.len())];
        if let Some(repaired) = repair_json(&text[..end]) {
            prop_assert!(repaired.is_object() || repaired.is_array());
        }
    }

    #[test]
    fn test_nutrition_strings_become_integers(
        amount in 0u32..100_000,
        unit in prop::sample::select(vec!["kcal", " g", "g", ""])
    ) {
        let raw = format!(r#"{{"calories": "{}{}", "items": [{{"fat": {}.4}}]}}"#, amount, unit, amount);
        let repaired = repair_json(&raw).unwrap();
        prop_assert_eq!(&repaired["calories"], &Value::from(amount as u64));
        prop_assert_eq!(&repaired["items"][0]["fat"], &Value::from(amount as u64));
    }
}
