use serde::Serialize;

use crate::format::text::layer_label;
use crate::import::{EntryKind, ImportReport, RecordOutcome};
use crate::model::{LiveLayer, Relation};

/// Relation with resolved layer names for list view.
#[derive(Debug, Clone, Serialize)]
pub struct RelationRow {
    pub id: String,
    pub name: String,
    pub strength: String,
    pub referencing_layer: String,
    pub referenced_layer: String,
    pub field_pairs: Vec<String>,
}

impl RelationRow {
    #[must_use]
    pub fn new(relation: &Relation, layers: &[LiveLayer]) -> Self {
        Self {
            id: relation.id.clone(),
            name: relation.name.clone(),
            strength: relation.strength.to_string(),
            referencing_layer: layer_label(relation.referencing_layer.as_deref(), layers)
                .to_string(),
            referenced_layer: layer_label(relation.referenced_layer.as_deref(), layers)
                .to_string(),
            field_pairs: relation
                .field_pairs()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Loaded layer for layers view.
#[derive(Debug, Clone, Serialize)]
pub struct LayerRow<'a> {
    #[serde(flatten)]
    pub layer: &'a LiveLayer,
    /// Number of relations touching this layer.
    pub relation_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRow {
    pub record: usize,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Outcome of an import for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub file: String,
    pub installed: usize,
    pub skipped: usize,
    pub dry_run: bool,
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
    pub outcomes: Vec<OutcomeRow>,
    pub log: Vec<LogLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub level: &'static str,
    pub message: String,
}

impl ImportSummary {
    #[must_use]
    pub fn new(file: String, report: &ImportReport) -> Self {
        let outcomes = report
            .outcomes
            .iter()
            .enumerate()
            .map(|(idx, outcome)| match outcome {
                RecordOutcome::Installed { id } => OutcomeRow {
                    record: idx + 1,
                    installed: true,
                    id: Some(id.clone()),
                    reason: None,
                },
                RecordOutcome::Skipped(reason) => OutcomeRow {
                    record: idx + 1,
                    installed: false,
                    id: None,
                    reason: Some(reason.to_string()),
                },
            })
            .collect();

        let log = report
            .log
            .entries()
            .iter()
            .map(|entry| LogLine {
                level: match entry.kind {
                    EntryKind::Info => "info",
                    EntryKind::Success => "success",
                    EntryKind::Warning => "warning",
                    EntryKind::Failure => "failure",
                },
                message: entry.message.clone(),
            })
            .collect();

        Self {
            file,
            installed: report.installed,
            skipped: report.skipped(),
            dry_run: false,
            saved: false,
            backup: None,
            outcomes,
            log,
        }
    }
}
