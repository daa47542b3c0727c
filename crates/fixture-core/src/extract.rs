//! End-to-end extraction: source text → resolved initializer → JSON.

use crate::error::{FixtureError, Result};
use crate::projector::project_root;
use crate::resolver::{resolve, Mode, Resolution};
use crate::serializer::{to_json, Layout};
use crate::syntax::SyntaxTree;
use crate::types::FixtureValue;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Identifier looked up when none is given.
pub const DEFAULT_IDENTIFIER: &str = "Body";

/// What to extract and how to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    pub identifier: String,
    pub mode: Mode,
    pub layout: Layout,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_IDENTIFIER.to_string(),
            mode: Mode::default(),
            layout: Layout::default(),
        }
    }
}

impl ExtractOptions {
    pub fn new(identifier: impl Into<String>, mode: Mode) -> Self {
        Self {
            identifier: identifier.into(),
            mode,
            ..Self::default()
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }
}

/// A projected value, or why there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Value(FixtureValue),
    NoMatch,
    NoInitializer,
}

/// Rendered JSON text, or why there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Json(String),
    NoMatch,
    NoInitializer,
}

impl Extraction {
    /// The JSON text, if any was produced.
    pub fn json(&self) -> Option<&str> {
        match self {
            Extraction::Json(text) => Some(text),
            _ => None,
        }
    }
}

/// Resolve and project the construction addressed by `identifier`.
pub fn project_source(source: &str, identifier: &str, mode: Mode) -> Result<Projection> {
    let tree = SyntaxTree::parse(source)?;
    debug!(tokens = tree.tokens().len(), "tokenized source");
    Ok(match resolve(&tree, identifier, mode) {
        Resolution::Found(initializer) => Projection::Value(project_root(&initializer)),
        Resolution::NoInitializer => Projection::NoInitializer,
        Resolution::NoMatch => Projection::NoMatch,
    })
}

/// Extract the fixture from source text and render it as JSON.
///
/// # Example
/// ```
/// use fixture_core::{extract_str, Extraction, ExtractOptions, Layout};
///
/// let source = r#"Body = new Request { Id = 5, Name = "x" };"#;
/// let options = ExtractOptions::default().with_layout(Layout::Compact);
/// let out = extract_str(source, &options).unwrap();
/// assert_eq!(out, Extraction::Json(r#"{"Id":5,"Name":"x"}"#.to_string()));
/// ```
pub fn extract_str(source: &str, options: &ExtractOptions) -> Result<Extraction> {
    Ok(
        match project_source(source, &options.identifier, options.mode)? {
            Projection::Value(value) => Extraction::Json(to_json(&value, options.layout)),
            Projection::NoMatch => Extraction::NoMatch,
            Projection::NoInitializer => Extraction::NoInitializer,
        },
    )
}

/// Read `path` whole and extract its fixture.
pub fn extract_file(path: impl AsRef<Path>, options: &ExtractOptions) -> Result<Extraction> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = source.len(), "read fixture source");
    extract_str(&source, options)
}

/// Outcome for one file of a batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: Result<Extraction>,
}

/// Extract every file in `paths`, in order.
///
/// Files are independent: an unreadable or malformed file is reported in its
/// own entry and does not stop the rest.
pub fn extract_batch<I, P>(paths: I, options: &ExtractOptions) -> Vec<BatchEntry>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .map(|path| {
            let path = path.as_ref().to_path_buf();
            let result = extract_file(&path, options);
            if let Err(err) = &result {
                warn!(path = %path.display(), error = %err, "extraction failed");
            }
            BatchEntry { path, result }
        })
        .collect()
}
