//! Output formatting for `relation_manager`.
//!
//! Supports both human-readable text output and machine-parseable JSON.
//!
//! # JSON Output Types
//!
//! - [`RelationRow`] - Relation with resolved layer names (list)
//! - [`LayerRow`] - Loaded layer (layers)
//! - [`ImportSummary`] - Outcome of an import pass (import)

mod output;
mod text;

pub use output::{ImportSummary, LayerRow, LogLine, OutcomeRow, RelationRow};
pub use text::{
    NOT_AVAILABLE, format_layer_line, format_log_entry, format_relation_line, icons, layer_label,
    log_icon,
};
