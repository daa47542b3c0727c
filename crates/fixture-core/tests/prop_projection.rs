/// Property-based tests for fixture projection.
///
/// Sources are generated as C# text, run through the whole pipeline, and the
/// JSON output is checked against what the generated literals say.
///
/// Strategies generate:
/// - Field names (PascalCase, so they never collide with C# keywords)
/// - String literals with quotes, backslashes, control and non-ASCII chars
/// - Integers across the full `long` range, negated through unary minus
/// - Real literals written in decimal form
use fixture_core::{extract_str, ExtractOptions, Extraction, Layout, Mode};
use proptest::prelude::*;
use serde_json::Value;

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][a-zA-Z0-9_]{0,10}").unwrap()
}

fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,30}",
        prop::string::string_regex("[a-zA-Z0-9{}\\[\\](),;:=./'_ -]{0,20}").unwrap(),
        Just(String::new()),
        Just("say \"hi\"".to_string()),
        Just("path\\to\\file".to_string()),
        Just("line1\nline2".to_string()),
        Just("col1\tcol2".to_string()),
        Just("caf\u{00e9}".to_string()),
        Just("\u{4f60}\u{597d}".to_string()),
        Just("null".to_string()),
        Just("42".to_string()),
    ]
}

/// A decimal real literal already in JSON number form.
fn arb_real() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[1-9][0-9]{0,5}\\.[0-9]{1,6}").unwrap(),
        prop::string::string_regex("0\\.[0-9]{1,6}").unwrap(),
    ]
}

/// A value expression paired with its expected JSON.
fn arb_scalar() -> impl Strategy<Value = (String, Value)> {
    prop_oneof![
        arb_string().prop_map(|s| (csharp_string(&s), Value::String(s))),
        any::<i64>().prop_map(|n| (n.to_string(), Value::from(n))),
        any::<bool>().prop_map(|b| (b.to_string(), Value::Bool(b))),
        Just(("null".to_string(), Value::Null)),
    ]
}

// ============================================================================
// Helpers
// ============================================================================

/// Render `s` as a regular C# string literal.
fn csharp_string(s: &str) -> String {
    let mut out = String::from("\"");
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn body_source(fields: &[(String, String)]) -> String {
    let entries: Vec<String> = fields
        .iter()
        .map(|(key, value)| format!("{key} = {value}"))
        .collect();
    format!("Body = new Request {{ {} }};", entries.join(", "))
}

fn extract(source: &str) -> String {
    let options = ExtractOptions::new("Body", Mode::Assignment).with_layout(Layout::Compact);
    match extract_str(source, &options).unwrap() {
        Extraction::Json(text) => text,
        other => panic!("expected JSON for {source:?}, got {other:?}"),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn string_literal_roundtrips(s in arb_string()) {
        let json = extract(&body_source(&[("V".into(), csharp_string(&s))]));
        let value: Value = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&value["V"], &Value::String(s));
    }

    #[test]
    fn integer_literal_roundtrips(n in any::<i64>()) {
        let json = extract(&body_source(&[("V".into(), n.to_string())]));
        prop_assert_eq!(json, format!("{{\"V\":{n}}}"));
    }

    #[test]
    fn real_literal_text_is_kept(text in arb_real()) {
        let json = extract(&body_source(&[("V".into(), text.clone())]));
        prop_assert_eq!(json, format!("{{\"V\":{text}}}"));
    }

    #[test]
    fn key_order_follows_declaration_order(keys in prop::collection::vec(arb_key(), 0..12)) {
        let fields: Vec<(String, String)> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), i.to_string()))
            .collect();
        let json = extract(&body_source(&fields));

        // first occurrence fixes the position, last occurrence the value
        let mut expected: Vec<(String, usize)> = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            match expected.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = i,
                None => expected.push((key.clone(), i)),
            }
        }
        let expected_json = format!(
            "{{{}}}",
            expected
                .iter()
                .map(|(k, i)| format!("\"{k}\":{i}"))
                .collect::<Vec<_>>()
                .join(",")
        );
        prop_assert_eq!(json, expected_json);
    }

    #[test]
    fn scalar_fields_project_exactly(
        fields in prop::collection::vec((arb_key(), arb_scalar()), 1..8)
    ) {
        let mut seen = std::collections::HashSet::new();
        let fields: Vec<_> = fields
            .into_iter()
            .filter(|(key, _)| seen.insert(key.clone()))
            .collect();
        let source_fields: Vec<(String, String)> = fields
            .iter()
            .map(|(key, (expr, _))| (key.clone(), expr.clone()))
            .collect();
        let json = extract(&body_source(&source_fields));
        let value: Value = serde_json::from_str(&json).unwrap();
        for (key, (_, expected)) in &fields {
            prop_assert_eq!(&value[key.as_str()], expected);
        }
    }

    #[test]
    fn unkeyed_list_turns_null_with_one_assignment(
        items in prop::collection::vec(any::<i32>(), 2..10),
        replace in any::<prop::sample::Index>(),
    ) {
        let list: Vec<String> = items.iter().map(|n| n.to_string()).collect();
        let json = extract(&format!("Body = new R {{ V = new List<int> {{ {} }} }};", list.join(", ")));
        let expected: Vec<Value> = items.iter().map(|n| Value::from(*n)).collect();
        prop_assert_eq!(
            serde_json::from_str::<Value>(&json).unwrap(),
            serde_json::json!({ "V": expected })
        );

        let mut mixed = list.clone();
        let at = replace.index(mixed.len());
        mixed[at] = format!("Item = {}", items[at]);
        let json = extract(&format!("Body = new R {{ V = new List<int> {{ {} }} }};", mixed.join(", ")));
        prop_assert_eq!(json, "{\"V\":null}");
    }

    #[test]
    fn grouped_pair_structured_value_is_text(key in arb_key(), n in any::<i32>()) {
        let source = format!(
            "Body = new R {{ V = new Dictionary<string, Item> {{ {{ \"{key}\", new Item {{ A = {n} }} }} }} }};"
        );
        let value: Value = serde_json::from_str(&extract(&source)).unwrap();
        prop_assert_eq!(&value["V"][key.as_str()], &Value::String(format!("{{\"A\":{n}}}")));
    }
}
