//! Text formatting functions for `relation_manager`.
//!
//! Provides plain text (non-ANSI) formatting for terminal output:
//! - Import log icons (· ✓ ⚠ ✗)
//! - Relation and layer line formatting

use crate::import::{EntryKind, LogEntry};
use crate::model::{LiveLayer, Relation};

/// Shown in place of a layer that is unset or not loaded.
pub const NOT_AVAILABLE: &str = "N/A";

/// Import log icon characters.
pub mod icons {
    /// Progress information.
    pub const INFO: &str = "·";
    /// Endpoint resolved or relation installed.
    pub const SUCCESS: &str = "✓";
    /// Record skipped as a duplicate.
    pub const WARNING: &str = "⚠";
    /// Record skipped on failure.
    pub const FAILURE: &str = "✗";
}

#[must_use]
pub const fn log_icon(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Info => icons::INFO,
        EntryKind::Success => icons::SUCCESS,
        EntryKind::Warning => icons::WARNING,
        EntryKind::Failure => icons::FAILURE,
    }
}

/// Format an import log line as `{icon} {message}`.
#[must_use]
pub fn format_log_entry(entry: &LogEntry) -> String {
    format!("{} {}", log_icon(entry.kind), entry.message)
}

/// Name of the layer with this ID, or `N/A`.
#[must_use]
pub fn layer_label<'a>(layer_id: Option<&str>, layers: &'a [LiveLayer]) -> &'a str {
    layer_id
        .and_then(|id| layers.iter().find(|l| l.id == id))
        .map_or(NOT_AVAILABLE, |l| l.name.as_str())
}

/// Format a single-line relation summary.
///
/// Format: `{id}  {name}  {referencing} -> {referenced}  [{strength}]`
#[must_use]
pub fn format_relation_line(relation: &Relation, layers: &[LiveLayer]) -> String {
    format!(
        "{}  {}  {} -> {}  [{}]",
        relation.id,
        relation.name,
        layer_label(relation.referencing_layer.as_deref(), layers),
        layer_label(relation.referenced_layer.as_deref(), layers),
        relation.strength,
    )
}

/// Format a single-line layer summary.
#[must_use]
pub fn format_layer_line(layer: &LiveLayer) -> String {
    let mut line = format!("ID: {}, Name: {}", layer.id, layer.name);
    if !layer.source.is_empty() {
        line.push_str(&format!(", Source: {}", layer.source));
    }
    if !layer.fields.is_empty() {
        line.push_str(&format!(", Fields: {}", layer.fields.join(", ")));
    }
    line
}
