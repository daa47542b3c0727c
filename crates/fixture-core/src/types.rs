//! Canonical value types produced by projection.
//!
//! `FixtureValue` mirrors JSON types but keeps integers apart from floats and
//! keeps object keys in declaration order. Objects are a `Vec` of pairs rather
//! than an `IndexMap`: fixtures are small and duplicate keys must overwrite in
//! place, which a linear scan does trivially.

use crate::serializer::{to_json, Layout};
use serde_json::Value;
use std::fmt;

/// A JSON-representable value reconstructed from an initializer expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureValue {
    Null,
    Bool(bool),
    Number(Number),
    /// Raw, unescaped string contents.
    String(String),
    List(Vec<FixtureValue>),
    Map(FixtureMap),
}

impl FixtureValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FixtureValue::Null)
    }

    pub fn as_map(&self) -> Option<&FixtureMap> {
        match self {
            FixtureValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FixtureValue]> {
        match self {
            FixtureValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Textual rendering used when a grouped pair collapses its key and value
    /// into strings.
    ///
    /// Strings render raw, numbers as their literal text, booleans as
    /// `True`/`False` and lists/maps as compact JSON. `Null` has no text.
    pub fn to_text(&self) -> Option<String> {
        match self {
            FixtureValue::Null => None,
            FixtureValue::Bool(true) => Some("True".to_string()),
            FixtureValue::Bool(false) => Some("False".to_string()),
            FixtureValue::Number(n) => Some(n.to_string()),
            FixtureValue::String(s) => Some(s.clone()),
            FixtureValue::List(_) | FixtureValue::Map(_) => Some(to_json(self, Layout::Compact)),
        }
    }

    /// Convert into a `serde_json::Value`, keeping key order.
    ///
    /// Float text that `f64` cannot hold exactly is rounded here; use the
    /// serializer when the literal text must survive byte for byte.
    pub fn to_json_value(&self) -> Value {
        match self {
            FixtureValue::Null => Value::Null,
            FixtureValue::Bool(b) => Value::Bool(*b),
            FixtureValue::Number(n) => n.to_json_number().map(Value::Number).unwrap_or(Value::Null),
            FixtureValue::String(s) => Value::String(s.clone()),
            FixtureValue::List(items) => {
                Value::Array(items.iter().map(FixtureValue::to_json_value).collect())
            }
            FixtureValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json_value()))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for FixtureValue {
    fn from(b: bool) -> Self {
        FixtureValue::Bool(b)
    }
}

impl From<i64> for FixtureValue {
    fn from(n: i64) -> Self {
        FixtureValue::Number(Number::Integer(n.into()))
    }
}

impl From<&str> for FixtureValue {
    fn from(s: &str) -> Self {
        FixtureValue::String(s.to_string())
    }
}

impl From<String> for FixtureValue {
    fn from(s: String) -> Self {
        FixtureValue::String(s)
    }
}

impl From<FixtureMap> for FixtureValue {
    fn from(map: FixtureMap) -> Self {
        FixtureValue::Map(map)
    }
}

/// A numeric literal with its integer/float nature preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Number {
    /// Wide enough for every C# integral literal, negated or not.
    Integer(i128),
    /// Normalized decimal text of a real literal, valid as a JSON number.
    /// Always contains a `.` or an exponent.
    Float(String),
}

impl Number {
    /// Interpret the text of a numeric literal token.
    ///
    /// Digit separators and type suffixes are dropped, hex and binary
    /// integers are converted to decimal. A decimal point, an exponent, or a
    /// real suffix (`f`, `d`, `m`) makes the literal a float; a float written
    /// without a fractional part gains `.0`. Returns `None` for text that is
    /// not a well-formed literal or does not fit in 64 bits.
    pub fn from_literal(text: &str, negative: bool) -> Option<Self> {
        let cleaned: String = text
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        if let Some(digits) = cleaned.strip_prefix("0x") {
            return integer_from_digits(trim_integer_suffix(digits), 16, negative);
        }
        if let Some(digits) = cleaned.strip_prefix("0b") {
            return integer_from_digits(trim_integer_suffix(digits), 2, negative);
        }
        if let Some(body) = cleaned.strip_suffix(|c: char| matches!(c, 'f' | 'd' | 'm')) {
            return float_from_text(body, negative);
        }
        let body = trim_integer_suffix(&cleaned);
        if body.contains(|c: char| c == '.' || c == 'e') {
            float_from_text(body, negative)
        } else {
            integer_from_digits(body, 10, negative)
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    /// Convert to a `serde_json::Number`. Floats go through `f64`.
    pub fn to_json_number(&self) -> Option<serde_json::Number> {
        match self {
            Number::Integer(i) => {
                if let Ok(v) = i64::try_from(*i) {
                    Some(v.into())
                } else {
                    u64::try_from(*i).ok().map(Into::into)
                }
            }
            Number::Float(text) => text
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(text) => f.write_str(text),
        }
    }
}

fn trim_integer_suffix(digits: &str) -> &str {
    digits.trim_end_matches(|c: char| c == 'u' || c == 'l')
}

fn integer_from_digits(digits: &str, radix: u32, negative: bool) -> Option<Number> {
    if digits.is_empty() {
        return None;
    }
    let value = u64::from_str_radix(digits, radix).ok()?;
    let value = i128::from(value);
    Some(Number::Integer(if negative { -value } else { value }))
}

fn float_from_text(body: &str, negative: bool) -> Option<Number> {
    let (mantissa, exponent) = match body.find('e') {
        Some(pos) => (&body[..pos], &body[pos..]),
        None => (body, ""),
    };
    let (int_part, frac_part) = match mantissa.find('.') {
        Some(pos) => (&mantissa[..pos], Some(&mantissa[pos + 1..])),
        None => (mantissa, None),
    };

    if mantissa.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }
    if !exponent.is_empty() {
        let digits = exponent[1..].trim_start_matches(['+', '-']);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }

    // JSON forbids leading zeros in the integer part
    let int_part = int_part.trim_start_matches('0');
    let int_part = if int_part.is_empty() { "0" } else { int_part };

    let mut text = String::with_capacity(body.len() + 3);
    if negative {
        text.push('-');
    }
    text.push_str(int_part);
    match frac_part {
        Some(frac) => {
            text.push('.');
            text.push_str(frac);
        }
        None if exponent.is_empty() => text.push_str(".0"),
        None => {}
    }
    text.push_str(exponent);

    let parsed: f64 = text.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Some(Number::Float(text))
}

/// Insertion-ordered string-keyed map with last-write-wins semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureMap {
    entries: Vec<(String, FixtureValue)>,
}

impl FixtureMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key`. An existing key keeps its position and has
    /// its value replaced; the previous value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: FixtureValue) -> Option<FixtureValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&FixtureValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FixtureValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, FixtureValue)> for FixtureMap {
    fn from_iter<I: IntoIterator<Item = (String, FixtureValue)>>(iter: I) -> Self {
        let mut map = FixtureMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
