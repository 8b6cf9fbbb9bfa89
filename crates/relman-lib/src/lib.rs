//! `relman-lib` - export and re-import of layer relations.
//!
//! Relations (foreign-key-like links between data layers) are serialized to
//! a JSON document and reconstructed in another project, where layer IDs
//! differ. Layers are re-identified by name or data source table, field
//! tokens by name or position.
//!
//! # Quick Start
//!
//! ```no_run
//! use relman_lib::{ImportDocument, Project};
//!
//! // Export from one project
//! let source = Project::open("path/to/source.json").unwrap();
//! source.export().save("relations.json".as_ref(), true).unwrap();
//!
//! // Import into another
//! let mut target = Project::open("path/to/target.json").unwrap();
//! let doc = ImportDocument::load("relations.json".as_ref()).unwrap();
//! let report = target.import(&doc);
//! for line in report.lines() {
//!     println!("{line}");
//! }
//! if report.installed > 0 {
//!     target.save().unwrap();
//! }
//! ```

pub mod document;
pub mod error;
pub mod import;
pub mod matching;
pub mod model;
pub mod project;
pub mod serialize;
pub mod validation;

pub use document::{ExportDocument, ImportDocument, RelationRecord};
pub use error::{RelationError, Result, ValidationError};
pub use import::{ImportReport, RecordOutcome, SkipReason, import_relations};
pub use matching::{MatchStrategy, find_layer, resolve_field};
pub use model::{FieldPair, LiveLayer, Relation, Strength};
pub use project::{Project, RelationRegistry, RelationSet};
pub use serialize::serialize_relations;
pub use validation::RelationValidator;
