//! Relation import: resolve, reconstruct, validate, register.
//!
//! Every record is handled by a `Result`-returning step. A record that
//! fails is skipped with a [`SkipReason`]; only a malformed document
//! envelope (checked earlier by [`ImportDocument`]) stops an import.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::document::{FieldPairRecord, ImportDocument, LayerRef, RelationRecord};
use crate::error::{ValidationError, format_errors};
use crate::matching::{FieldResolutionError, LayerMatch, lookup_field, match_layer};
use crate::model::{FieldPair, LiveLayer, Relation, Strength};
use crate::project::RelationRegistry;

/// Endpoint of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The referencing layer.
    Parent,
    /// The referenced layer.
    Child,
}

impl Endpoint {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a record was not installed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("{endpoint} layer not found: {name}")]
    LayerNotFound { endpoint: Endpoint, name: String },

    #[error("relation '{id}' already exists, skipped")]
    DuplicateId { id: String },

    #[error("no valid field pair found")]
    NoFieldPairs,

    #[error("relation not valid after creation: {}", format_errors(.errors))]
    InvalidRelation { errors: Vec<ValidationError> },

    #[error("error importing relation '{name}': {reason}")]
    Unexpected { name: String, reason: String },
}

/// A field token that could not be resolved on one side of a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairError {
    pub endpoint: Endpoint,
    pub error: FieldResolutionError,
}

impl fmt::Display for PairError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            FieldResolutionError::IndexOutOfRange { index } => {
                write!(f, "invalid {} field index: {index}", self.endpoint)
            }
            FieldResolutionError::UnknownField { name } => {
                write!(f, "field '{name}' not found in {} layer", self.endpoint)
            }
        }
    }
}

impl std::error::Error for PairError {}

/// Severity of an import log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Info,
    Success,
    Warning,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: EntryKind,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered record of every import decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportLog {
    entries: Vec<LogEntry>,
}

impl ImportLog {
    fn push(&mut self, kind: EntryKind, message: String) {
        match kind {
            EntryKind::Info | EntryKind::Success => tracing::debug!("{message}"),
            EntryKind::Warning | EntryKind::Failure => tracing::info!("{message}"),
        }
        self.entries.push(LogEntry { kind, message });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(EntryKind::Info, message.into());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(EntryKind::Success, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(EntryKind::Warning, message.into());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.push(EntryKind::Failure, message.into());
    }

    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The log as plain text lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.message.clone()).collect()
    }
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Installed { id: String },
    Skipped(SkipReason),
}

/// Result of an import pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub installed: usize,
    pub log: ImportLog,
    /// One outcome per record, in document order.
    pub outcomes: Vec<RecordOutcome>,
}

impl ImportReport {
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.installed
    }

    #[must_use]
    pub fn installed_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                RecordOutcome::Installed { id } => Some(id.as_str()),
                RecordOutcome::Skipped(_) => None,
            })
            .collect()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.log.lines()
    }
}

/// Import every record of `doc`, registering the valid ones.
///
/// Records are processed in document order; a relation installed earlier in
/// the pass counts as existing for later records with the same ID.
pub fn import_relations<R>(
    doc: &ImportDocument,
    live_layers: &[LiveLayer],
    registry: &mut R,
) -> ImportReport
where
    R: RelationRegistry + ?Sized,
{
    let mut report = ImportReport::default();
    report
        .log
        .info(format!("Found {} relation(s) in document", doc.len()));

    for (index, value) in doc.records.iter().enumerate() {
        report.log.info(format!(
            "--- Relation {}: {} ---",
            index + 1,
            record_name(value).unwrap_or("unknown")
        ));

        let outcome = match import_record(value, live_layers, registry, &mut report.log) {
            Ok(id) => {
                report.installed += 1;
                report.log.success("Relation imported successfully");
                RecordOutcome::Installed { id }
            }
            Err(reason) => {
                match &reason {
                    SkipReason::DuplicateId { .. } => report.log.warn(capitalize(&reason)),
                    _ => report.log.fail(capitalize(&reason)),
                }
                RecordOutcome::Skipped(reason)
            }
        };
        report.outcomes.push(outcome);
    }

    tracing::debug!(
        installed = report.installed,
        skipped = report.skipped(),
        "Import finished"
    );
    report
}

fn import_record<R>(
    value: &Value,
    live_layers: &[LiveLayer],
    registry: &mut R,
    log: &mut ImportLog,
) -> Result<String, SkipReason>
where
    R: RelationRegistry + ?Sized,
{
    let unexpected = |reason: String| SkipReason::Unexpected {
        name: record_name(value).unwrap_or("unknown").to_string(),
        reason,
    };

    let record = RelationRecord::deserialize(value).map_err(|e| unexpected(e.to_string()))?;

    let parent = resolve_endpoint(Endpoint::Parent, &record.parent_layer, live_layers)?;
    let child = resolve_endpoint(Endpoint::Child, &record.child_layer, live_layers)?;
    for (endpoint, found) in [(Endpoint::Parent, &parent), (Endpoint::Child, &child)] {
        log.success(format!(
            "{} layer found: {} (ID: {}) by {}",
            capitalize(&endpoint),
            found.layer.name,
            found.layer.id,
            found.strategy
        ));
    }

    if registry.contains(&record.id) {
        return Err(SkipReason::DuplicateId { id: record.id });
    }

    let mut relation = Relation {
        id: record.id.clone(),
        name: record.name.clone(),
        strength: record
            .strength
            .parse::<Strength>()
            .ok()
            .filter(Strength::is_standard)
            .unwrap_or_default(),
        referencing_layer: Some(parent.layer.id.clone()),
        referenced_layer: Some(child.layer.id.clone()),
        ..Relation::default()
    };

    for pair in &record.field_pairs {
        match resolve_pair(pair, parent.layer, child.layer) {
            Ok(resolved) if relation.field_pairs().contains(&resolved) => {
                log.info(format!("Field pair already added: {resolved}"));
            }
            Ok(resolved) => {
                log.success(format!("Field pair added: {resolved}"));
                relation.add_field_pair(resolved.referencing, resolved.referenced);
            }
            Err(e) => log.warn(capitalize(&e)),
        }
    }

    if relation.referencing_fields.is_empty() {
        return Err(SkipReason::NoFieldPairs);
    }

    registry
        .validate(&relation, parent.layer, child.layer)
        .map_err(|errors| SkipReason::InvalidRelation { errors })?;

    registry
        .register(relation)
        .map_err(|e| unexpected(e.to_string()))?;

    Ok(record.id)
}

fn resolve_endpoint<'a>(
    endpoint: Endpoint,
    layer: &LayerRef,
    live_layers: &'a [LiveLayer],
) -> Result<LayerMatch<'a>, SkipReason> {
    match_layer(layer.name.as_deref(), layer.source.as_deref(), live_layers).ok_or_else(|| {
        SkipReason::LayerNotFound {
            endpoint,
            name: layer
                .name
                .clone()
                .unwrap_or_else(|| "(unnamed)".to_string()),
        }
    })
}

/// Resolve both tokens of a serialized pair.
///
/// Index errors are reported before name errors, parent side first.
///
/// # Errors
///
/// Returns the first unresolved side.
pub fn resolve_pair(
    pair: &FieldPairRecord,
    parent: &LiveLayer,
    child: &LiveLayer,
) -> Result<FieldPair, PairError> {
    let referencing = lookup_field(pair.referencing_field.as_str(), &parent.fields);
    let referenced = lookup_field(pair.referenced_field.as_str(), &child.fields);

    let fail = |endpoint, error| Err(PairError { endpoint, error });
    match (referencing, referenced) {
        (Ok(a), Ok(b)) => Ok(FieldPair::new(a, b)),
        (Err(e @ FieldResolutionError::IndexOutOfRange { .. }), _) => fail(Endpoint::Parent, e),
        (_, Err(e @ FieldResolutionError::IndexOutOfRange { .. })) => fail(Endpoint::Child, e),
        (Err(e), _) => fail(Endpoint::Parent, e),
        (_, Err(e)) => fail(Endpoint::Child, e),
    }
}

fn record_name(value: &Value) -> Option<&str> {
    value.get("name").and_then(Value::as_str)
}

fn capitalize(text: &impl fmt::Display) -> String {
    let text = text.to_string();
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
