//! Relation export.

use std::collections::BTreeMap;

use crate::document::{ExportDocument, FieldPairRecord, LayerRef, RelationRecord};
use crate::error::{RelationError, Result};
use crate::model::{LiveLayer, Relation};

/// Serialize every relation into an export document.
///
/// Relations are emitted in map order. A relation that fails to serialize
/// is logged and left out; the others are unaffected.
#[must_use]
pub fn serialize_relations(
    relations: &BTreeMap<String, Relation>,
    live_layers: &[LiveLayer],
    export_date: &str,
) -> ExportDocument {
    let mut doc = ExportDocument::new(export_date);

    for (id, relation) in relations {
        match serialize_relation(id, relation, live_layers) {
            Ok(record) => doc.relations.push(record),
            Err(e) => {
                tracing::warn!(relation_id = %id, error = %e, "Skipping relation during export");
            }
        }
    }

    tracing::debug!(
        exported = doc.relations.len(),
        total = relations.len(),
        "Serialized relations"
    );
    doc
}

/// Serialize one relation under the given registry key.
///
/// # Errors
///
/// Returns `LayerNotFound` when an endpoint names a layer that is not
/// loaded. An endpoint with no layer set is not an error; its reference is
/// written with null members.
pub fn serialize_relation(
    id: &str,
    relation: &Relation,
    live_layers: &[LiveLayer],
) -> Result<RelationRecord> {
    let parent_layer = layer_ref(relation.referencing_layer.as_deref(), live_layers)?;
    let child_layer = layer_ref(relation.referenced_layer.as_deref(), live_layers)?;

    let field_pairs = relation
        .field_pairs()
        .into_iter()
        .map(|pair| FieldPairRecord::new(pair.referencing, pair.referenced))
        .collect();

    Ok(RelationRecord {
        id: id.to_string(),
        name: relation.name.clone(),
        strength: relation.strength.to_string(),
        parent_layer,
        child_layer,
        field_pairs,
    })
}

fn layer_ref(layer_id: Option<&str>, live_layers: &[LiveLayer]) -> Result<LayerRef> {
    let Some(layer_id) = layer_id.filter(|id| !id.is_empty()) else {
        return Ok(LayerRef::default());
    };

    let layer = live_layers
        .iter()
        .find(|l| l.id == layer_id)
        .ok_or_else(|| RelationError::LayerNotFound {
            id: layer_id.to_string(),
        })?;

    Ok(LayerRef {
        id: Some(layer.id.clone()),
        name: Some(layer.name.clone()),
        source: Some(layer.source.clone()),
    })
}
