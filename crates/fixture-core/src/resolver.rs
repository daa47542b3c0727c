//! Entry-point resolution: which construction in a file is the fixture.

use crate::syntax::{Expr, Initializer, SyntaxTree};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the target construction is addressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The right side of the first `Name = new ...` assignment.
    #[default]
    Assignment,
    /// The first `new Name(...)` anywhere in the file.
    TypeName,
}

/// Result of looking up the target construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The construction's `{ ... }` block.
    Found(Initializer),
    /// The construction exists but was written without braces.
    NoInitializer,
    /// Nothing in the file matches.
    NoMatch,
}

/// Locate the construction addressed by `identifier` under `mode`.
///
/// In [`Mode::Assignment`] only the first assignment to `identifier` is
/// considered; if its right side is not an object creation the result is
/// [`Resolution::NoMatch`]. Both typed (`new T()`) and target-typed
/// (`new()`) creations qualify.
pub fn resolve(tree: &SyntaxTree, identifier: &str, mode: Mode) -> Resolution {
    let initializer = match mode {
        Mode::Assignment => {
            let Some(assignment) = tree.find_assignment(identifier) else {
                debug!(identifier, "no assignment to identifier");
                return Resolution::NoMatch;
            };
            match *assignment.value {
                Expr::Creation(creation) => creation.initializer,
                Expr::ImplicitCreation(creation) => creation.initializer,
                other => {
                    debug!(identifier, kind = ?other.kind(), "assignment is not an object creation");
                    return Resolution::NoMatch;
                }
            }
        }
        Mode::TypeName => {
            let Some(creation) = tree.find_creation(identifier) else {
                debug!(identifier, "no creation of type");
                return Resolution::NoMatch;
            };
            creation.initializer
        }
    };

    match initializer {
        Some(initializer) => {
            debug!(identifier, entries = initializer.entries.len(), "resolved initializer");
            Resolution::Found(initializer)
        }
        None => {
            debug!(identifier, "construction has no initializer");
            Resolution::NoInitializer
        }
    }
}
