//! Expression tree → [`FixtureValue`] projection.
//!
//! An initializer block is classified by the shape shared by *all* of its
//! entries, then projected accordingly:
//!
//! | Entries                                   | Result                          |
//! |-------------------------------------------|---------------------------------|
//! | literals and object creations (or none)   | `List`, in order                |
//! | `Key = value` assignments                 | `Map`, later keys overwrite     |
//! | `{ key, value }` groups of exactly two    | `Map` of stringified pairs      |
//! | anything else, including mixtures         | `Null`                          |
//!
//! Target-typed `new(...)` without braces projects its arguments as a `List`;
//! with braces it must be all assignments. A typed `new T(...)` without
//! braces projects to `Null`.
//!
//! Projection never fails. Unsupported shapes become `Null`, which is
//! therefore indistinguishable from a `null` literal.
//!
//! # Grouped pairs are lossy
//!
//! Both halves of a `{ key, value }` group are flattened to text through
//! [`FixtureValue::to_text`]. A structured value such as
//! `{ 1, new Item { A = 1 } }` yields the *string* `"{\"A\":1}"`, not a nested
//! object. Existing consumers rely on that text form, so it is kept.

use crate::syntax::{Creation, Expr, ImplicitCreation, Initializer, Invocation, Literal};
use crate::types::{FixtureMap, FixtureValue};
use tracing::trace;

/// Shape shared by every entry of an initializer block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Values,
    Keyed,
    Pairs,
    Mixed,
}

/// Project the root block returned by the resolver.
///
/// The root is always an object: its assignment entries become fields in
/// declaration order and any other entries are skipped.
pub fn project_root(initializer: &Initializer) -> FixtureValue {
    let map = initializer
        .entries
        .iter()
        .filter_map(|entry| match entry {
            Expr::Assignment(assignment) => {
                Some((assignment.target.clone(), project(&assignment.value)))
            }
            _ => None,
        })
        .collect::<FixtureMap>();
    FixtureValue::Map(map)
}

/// Project a single expression.
pub fn project(expr: &Expr) -> FixtureValue {
    match expr {
        Expr::Literal(literal) => project_literal(literal),
        Expr::Invocation(invocation) => project_invocation(invocation),
        Expr::Creation(creation) => project_creation(creation),
        Expr::ImplicitCreation(creation) => project_implicit_creation(creation),
        // Names, indexers, nested groups in value position, assignments in
        // value position and everything the parser could not model.
        other => {
            trace!(kind = ?other.kind(), "unsupported expression projects to null");
            FixtureValue::Null
        }
    }
}

fn project_literal(literal: &Literal) -> FixtureValue {
    match literal {
        Literal::Null => FixtureValue::Null,
        Literal::Bool(b) => FixtureValue::Bool(*b),
        Literal::Number(n) => FixtureValue::Number(n.clone()),
        Literal::String(s) => FixtureValue::String(s.clone()),
        Literal::Other(text) => FixtureValue::String(text.clone()),
    }
}

/// Calls such as `DateTime.Parse("2024-01-01")` stand for their first argument.
fn project_invocation(invocation: &Invocation) -> FixtureValue {
    match invocation.arguments.first() {
        Some(first) => project(first),
        None => {
            trace!(callee = %invocation.callee, "call without arguments projects to null");
            FixtureValue::Null
        }
    }
}

fn project_creation(creation: &Creation) -> FixtureValue {
    match &creation.initializer {
        Some(initializer) => project_block(initializer),
        None => {
            trace!(type_name = %creation.type_name, "creation without initializer projects to null");
            FixtureValue::Null
        }
    }
}

fn project_implicit_creation(creation: &ImplicitCreation) -> FixtureValue {
    match &creation.initializer {
        None => FixtureValue::List(creation.arguments.iter().map(project).collect()),
        Some(initializer) => match classify(&initializer.entries) {
            Shape::Keyed => project_keyed(&initializer.entries),
            shape => {
                trace!(?shape, "target-typed initializer is not all assignments");
                FixtureValue::Null
            }
        },
    }
}

/// Project a nested initializer block according to its uniform shape.
fn project_block(initializer: &Initializer) -> FixtureValue {
    let entries = &initializer.entries;
    match classify(entries) {
        Shape::Values => FixtureValue::List(entries.iter().map(project).collect()),
        Shape::Keyed => project_keyed(entries),
        Shape::Pairs => project_pairs(entries),
        Shape::Mixed => {
            trace!(entries = entries.len(), "mixed initializer projects to null");
            FixtureValue::Null
        }
    }
}

fn classify(entries: &[Expr]) -> Shape {
    if entries
        .iter()
        .all(|e| matches!(e, Expr::Literal(_) | Expr::Creation(_) | Expr::ImplicitCreation(_)))
    {
        Shape::Values
    } else if entries.iter().all(|e| matches!(e, Expr::Assignment(_))) {
        Shape::Keyed
    } else if entries
        .iter()
        .all(|e| matches!(e, Expr::Initializer(group) if group.entries.len() == 2))
    {
        Shape::Pairs
    } else {
        Shape::Mixed
    }
}

fn project_keyed(entries: &[Expr]) -> FixtureValue {
    let map = entries
        .iter()
        .filter_map(|entry| match entry {
            Expr::Assignment(assignment) => {
                Some((assignment.target.clone(), project(&assignment.value)))
            }
            _ => None,
        })
        .collect::<FixtureMap>();
    FixtureValue::Map(map)
}

fn project_pairs(entries: &[Expr]) -> FixtureValue {
    let mut map = FixtureMap::new();
    for entry in entries {
        let Expr::Initializer(group) = entry else {
            continue;
        };
        let [key, value] = group.entries.as_slice() else {
            continue;
        };
        let Some(key) = project(key).to_text() else {
            trace!("grouped pair with null key skipped");
            continue;
        };
        let value = project(value)
            .to_text()
            .map(FixtureValue::String)
            .unwrap_or(FixtureValue::Null);
        map.insert(key, value);
    }
    FixtureValue::Map(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::{to_json, Layout};
    use crate::syntax::SyntaxTree;

    /// Project the value assigned to `Body` in `source`.
    fn body(source: &str) -> FixtureValue {
        let tree = SyntaxTree::parse(source).unwrap();
        let assignment = tree.find_assignment("Body").unwrap();
        project(&assignment.value)
    }

    fn json(source: &str) -> String {
        to_json(&body(source), Layout::Compact)
    }

    #[test]
    fn list_of_literals() {
        assert_eq!(json("Body = new List<int> { 1, 2, 3 };"), "[1,2,3]");
    }

    #[test]
    fn empty_initializer_is_an_empty_list() {
        assert_eq!(json("Body = new List<int>() { };"), "[]");
    }

    #[test]
    fn keyed_initializer_is_a_map() {
        assert_eq!(
            json(r#"Body = new P { Name = "a", Age = 3, Ok = true };"#),
            r#"{"Name":"a","Age":3,"Ok":true}"#
        );
    }

    #[test]
    fn duplicate_key_last_write_wins() {
        assert_eq!(json("Body = new P { A = 1, B = 2, A = 3 };"), r#"{"A":3,"B":2}"#);
    }

    #[test]
    fn mixed_shapes_project_to_null() {
        assert_eq!(json("Body = new List<int> { 1, A = 2 };"), "null");
    }

    #[test]
    fn list_of_creations() {
        assert_eq!(
            json("Body = new List<R> { new() { S = 1 }, new R { S = 2 } };"),
            r#"[{"S":1},{"S":2}]"#
        );
    }

    #[test]
    fn grouped_pairs_are_stringified() {
        assert_eq!(
            json(r#"Body = new Dictionary<int, string> { { 1, "a" }, { 2, "b" } };"#),
            r#"{"1":"a","2":"b"}"#
        );
    }

    #[test]
    fn grouped_pair_structured_value_becomes_text() {
        assert_eq!(
            json("Body = new Dictionary<string, R> { { \"k\", new R { A = 1 } } };"),
            r#"{"k":"{\"A\":1}"}"#
        );
    }

    #[test]
    fn grouped_pair_null_key_is_skipped() {
        assert_eq!(
            json(r#"Body = new Dictionary<string, string> { { null, "x" }, { "k", null } };"#),
            r#"{"k":null}"#
        );
    }

    #[test]
    fn grouped_pair_with_three_elements_is_mixed() {
        assert_eq!(json("Body = new D { { 1, 2, 3 } };"), "null");
    }

    #[test]
    fn implicit_creation_without_braces_lists_arguments() {
        assert_eq!(json(r#"Body = new(1, "x", null);"#), r#"[1,"x",null]"#);
    }

    #[test]
    fn implicit_creation_with_non_keyed_entries_is_null() {
        assert_eq!(json("Body = new() { 1, 2 };"), "null");
    }

    #[test]
    fn typed_creation_without_braces_is_null() {
        assert_eq!(json("Body = new P(1);"), "null");
    }

    #[test]
    fn invocation_passes_first_argument_through() {
        assert_eq!(
            json(r#"Body = new P { At = DateTime.Parse("2024-01-01", culture) };"#),
            r#"{"At":"2024-01-01"}"#
        );
    }

    #[test]
    fn zero_argument_invocation_is_null() {
        assert_eq!(json("Body = new P { Id = Guid.NewGuid() };"), r#"{"Id":null}"#);
    }

    #[test]
    fn names_and_operators_are_null() {
        assert_eq!(
            json("Body = new P { A = Status.Active, B = 1 + 2 };"),
            r#"{"A":null,"B":null}"#
        );
    }

    #[test]
    fn root_skips_non_keyed_entries() {
        let tree = SyntaxTree::parse("Body = new P { 1, A = 2 };").unwrap();
        let assignment = tree.find_assignment("Body").unwrap();
        let Expr::Creation(creation) = *assignment.value else {
            panic!("expected creation");
        };
        let root = project_root(creation.initializer.as_ref().unwrap());
        assert_eq!(to_json(&root, Layout::Compact), r#"{"A":2}"#);
    }

    #[test]
    fn char_literal_projects_to_its_source_text() {
        assert_eq!(json("Body = new P { C = 'x' };"), r#"{"C":"'x'"}"#);
    }
}
