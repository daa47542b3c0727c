//! Canonical JSON rendering of a projected [`FixtureValue`].
//!
//! The output rules are fixed so that fixtures diff cleanly between runs:
//!
//! - **Nulls are explicit**: a `null` field is always written, never dropped
//! - **Number fidelity**: integers render as integers, floats as the literal's
//!   own decimal text (`1.50` stays `1.50`)
//! - **Minimal escaping**: only `"`, `\` and control characters are escaped;
//!   non-ASCII text is written as-is
//! - **Declaration order**: object keys are never re-sorted
//! - **Stable indentation**: two spaces per level in the indented layout
//!
//! # Example
//! ```
//! use fixture_core::{to_json, FixtureMap, FixtureValue, Layout};
//!
//! let mut map = FixtureMap::new();
//! map.insert("Id", FixtureValue::from(5));
//! map.insert("Meta", FixtureValue::Null);
//! let value = FixtureValue::Map(map);
//!
//! assert_eq!(to_json(&value, Layout::Compact), r#"{"Id":5,"Meta":null}"#);
//! assert_eq!(to_json(&value, Layout::Indented), "{\n  \"Id\": 5,\n  \"Meta\": null\n}");
//! ```

use crate::types::FixtureValue;
use serde::{Deserialize, Serialize};

/// Whitespace layout of the rendered JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One member per line, two-space indentation.
    #[default]
    Indented,
    /// No insignificant whitespace at all.
    Compact,
}

/// Render `value` as JSON text in the given layout.
pub fn to_json(value: &FixtureValue, layout: Layout) -> String {
    let mut out = String::new();
    write_value(value, layout, 0, &mut out);
    out
}

fn write_value(value: &FixtureValue, layout: Layout, depth: usize, out: &mut String) {
    match value {
        FixtureValue::Null => out.push_str("null"),
        FixtureValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        FixtureValue::Number(n) => out.push_str(&n.to_string()),
        FixtureValue::String(s) => write_string(s, out),
        FixtureValue::List(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline_indent(layout, depth + 1, out);
                write_value(item, layout, depth + 1, out);
            }
            newline_indent(layout, depth, out);
            out.push(']');
        }
        FixtureValue::Map(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push('{');
            for (i, (key, val)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline_indent(layout, depth + 1, out);
                write_string(key, out);
                out.push(':');
                if layout == Layout::Indented {
                    out.push(' ');
                }
                write_value(val, layout, depth + 1, out);
            }
            newline_indent(layout, depth, out);
            out.push('}');
        }
    }
}

fn newline_indent(layout: Layout, depth: usize, out: &mut String) {
    if layout == Layout::Indented {
        out.push('\n');
        for _ in 0..depth {
            out.push_str("  ");
        }
    }
}

/// Quote and escape a string. Only characters JSON requires to be escaped
/// are touched.
fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
