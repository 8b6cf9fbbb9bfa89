//! In-memory project: a layer catalog plus a relation registry.
//!
//! Stands in for the host application. Load a project snapshot with
//! [`Project::open`], export or import relations, then [`Project::save`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::{ExportDocument, ImportDocument, read_to_string, write_atomic};
use crate::error::{RelationError, Result, ValidationError};
use crate::import::{ImportReport, import_relations};
use crate::model::{LiveLayer, Relation};
use crate::serialize::serialize_relations;
use crate::validation::RelationValidator;

/// Host-side registry that imported relations are appended to.
pub trait RelationRegistry {
    /// Return true if a relation with this ID is registered.
    fn contains(&self, id: &str) -> bool;

    /// Check a constructed relation before it is registered.
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    fn validate(
        &self,
        relation: &Relation,
        referencing: &LiveLayer,
        referenced: &LiveLayer,
    ) -> std::result::Result<(), Vec<ValidationError>> {
        RelationValidator::validate(relation, referencing, referenced)
    }

    /// Take ownership of a new relation.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRelation` if the ID is taken.
    fn register(&mut self, relation: Relation) -> Result<()>;
}

/// Relations keyed and ordered by ID.
#[derive(Debug, Clone, Default)]
pub struct RelationSet {
    relations: BTreeMap<String, Relation>,
    added: Vec<String>,
}

impl RelationSet {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Relation> {
        self.relations.get(id)
    }

    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, Relation> {
        &self.relations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.relations.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// IDs registered since load, in registration order.
    #[must_use]
    pub fn added(&self) -> &[String] {
        &self.added
    }

    pub fn clear_added(&mut self) {
        self.added.clear();
    }
}

impl RelationRegistry for RelationSet {
    fn contains(&self, id: &str) -> bool {
        self.relations.contains_key(id)
    }

    fn register(&mut self, relation: Relation) -> Result<()> {
        if self.relations.contains_key(&relation.id) {
            return Err(RelationError::DuplicateRelation { id: relation.id });
        }
        self.added.push(relation.id.clone());
        self.relations.insert(relation.id.clone(), relation);
        Ok(())
    }
}

/// On-disk shape of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Project file the snapshot was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default)]
    pub layers: Vec<LiveLayer>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// Loaded layers and registered relations of one project.
#[derive(Debug, Clone, Default)]
pub struct Project {
    file_name: Option<String>,
    layers: Vec<LiveLayer>,
    relations: RelationSet,
    path: Option<PathBuf>,
}

impl Project {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create an empty project.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a project from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRelation` if two relations share an ID.
    pub fn from_snapshot(snapshot: ProjectSnapshot) -> Result<Self> {
        let mut project = Self {
            file_name: snapshot.file_name,
            layers: snapshot.layers,
            ..Self::default()
        };
        for relation in snapshot.relations {
            project.relations.register(relation)?;
        }
        project.relations.clear_added();
        Ok(project)
    }

    /// Open and load a project snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_to_string(path)?;
        let snapshot: ProjectSnapshot = serde_json::from_str(&text)?;

        let mut project = Self::from_snapshot(snapshot)?;
        project.path = Some(path.to_path_buf());

        tracing::debug!(
            path = %path.display(),
            layers = project.layers.len(),
            relations = project.relations.len(),
            "Opened project"
        );
        Ok(project)
    }

    /// Save to the file that was opened.
    ///
    /// # Errors
    ///
    /// Returns `Config` if no file path is set, or `Io` on write failure.
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| RelationError::Config("No project path set; use save_to()".to_string()))?;
        self.save_to(path)
    }

    /// Save to a specific file path.
    ///
    /// # Errors
    ///
    /// Returns `Io` on write failure.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        write_atomic(path.as_ref(), &json)
    }

    #[must_use]
    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            file_name: self.file_name.clone(),
            layers: self.layers.clone(),
            relations: self.relations.iter().cloned().collect(),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Provenance string written as `export_date`.
    #[must_use]
    pub fn provenance(&self) -> String {
        self.file_name
            .clone()
            .or_else(|| self.path.as_ref().map(|p| p.display().to_string()))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn set_file_name(&mut self, file_name: impl Into<String>) {
        self.file_name = Some(file_name.into());
    }

    // ========================================================================
    // Layers
    // ========================================================================

    #[must_use]
    pub fn layers(&self) -> &[LiveLayer] {
        &self.layers
    }

    #[must_use]
    pub fn layer(&self, id: &str) -> Option<&LiveLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn add_layer(&mut self, layer: LiveLayer) {
        self.layers.push(layer);
    }

    // ========================================================================
    // Relations
    // ========================================================================

    #[must_use]
    pub fn relations(&self) -> &RelationSet {
        &self.relations
    }

    #[must_use]
    pub fn relation(&self, id: &str) -> Option<&Relation> {
        self.relations.get(id)
    }

    /// Register a relation after checking it against the loaded layers.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRelation`, or a validation error when the relation
    /// does not fit the loaded layers.
    pub fn add_relation(&mut self, relation: Relation) -> Result<()> {
        if self.relations.contains(&relation.id) {
            return Err(RelationError::DuplicateRelation { id: relation.id });
        }
        self.check_relation(&relation)
            .map_err(RelationError::from_validation_errors)?;
        self.relations.register(relation)
    }

    /// Check a relation against the loaded layers.
    ///
    /// # Errors
    ///
    /// Returns every violated rule, including endpoints that are not loaded.
    pub fn check_relation(&self, relation: &Relation) -> std::result::Result<(), Vec<ValidationError>> {
        let endpoint = |field: &str, id: Option<&str>| {
            let id = id.unwrap_or_default();
            self.layer(id).ok_or_else(|| {
                ValidationError::new(field, format!("layer '{id}' is not loaded"))
            })
        };

        match (
            endpoint("referencing_layer", relation.referencing_layer.as_deref()),
            endpoint("referenced_layer", relation.referenced_layer.as_deref()),
        ) {
            (Ok(referencing), Ok(referenced)) => {
                self.relations.validate(relation, referencing, referenced)
            }
            (a, b) => Err(a.err().into_iter().chain(b.err()).collect()),
        }
    }

    /// True if relations were registered since load.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.relations.added().is_empty()
    }

    // ========================================================================
    // Export / import
    // ========================================================================

    /// Serialize all relations.
    #[must_use]
    pub fn export(&self) -> ExportDocument {
        serialize_relations(self.relations.as_map(), &self.layers, &self.provenance())
    }

    /// Import relations from a checked document.
    pub fn import(&mut self, doc: &ImportDocument) -> ImportReport {
        import_relations(doc, &self.layers, &mut self.relations)
    }
}
