//! # fixture-core
//!
//! Extracts object-initializer fixtures from C# test sources and renders them
//! as canonical JSON.
//!
//! Test code often builds request objects inline:
//!
//! ```csharp
//! Body = new TestRequest
//! {
//!     PlayerId = 12345,
//!     PlayerIds = new List<int> { 1, 2, 3 },
//!     Names = new Dictionary<int, string> { { 1, "Takeo" } },
//! };
//! ```
//!
//! fixture-core finds that construction without compiling anything and turns
//! it into the JSON body a load-test script can send.
//!
//! ## Quick start
//!
//! ```rust
//! use fixture_core::{extract_str, Extraction, ExtractOptions, Layout, Mode};
//!
//! let source = r#"
//!     Body = new Req { Id = 5, Tags = new List<int> { 1, 2, 3 }, Meta = null };
//! "#;
//! let options = ExtractOptions::new("Body", Mode::Assignment).with_layout(Layout::Compact);
//! let out = extract_str(source, &options).unwrap();
//! assert_eq!(out.json(), Some(r#"{"Id":5,"Tags":[1,2,3],"Meta":null}"#));
//! ```
//!
//! ## Modules
//!
//! - [`lexer`]: source text → tokens
//! - [`syntax`]: tokens → expression trees for the construction subset
//! - [`resolver`]: picks the target construction (by assignment or by type)
//! - [`projector`]: expression tree → [`FixtureValue`]
//! - [`serializer`]: [`FixtureValue`] → JSON text
//! - [`extract`]: the whole pipeline, for one file or a batch
//! - [`error`]: error types
//! - [`types`]: the canonical value model

pub mod error;
pub mod extract;
pub mod lexer;
pub mod projector;
pub mod resolver;
pub mod serializer;
pub mod syntax;
pub mod types;

pub use error::FixtureError;
pub use extract::{
    extract_batch, extract_file, extract_str, project_source, BatchEntry, ExtractOptions,
    Extraction, Projection, DEFAULT_IDENTIFIER,
};
pub use projector::{project, project_root};
pub use resolver::{resolve, Mode, Resolution};
pub use serializer::{to_json, Layout};
pub use syntax::SyntaxTree;
pub use types::{FixtureMap, FixtureValue, Number};
