//! Validity rule for relations about to be registered.
//!
//! These routines return structured validation errors without touching the
//! registry.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::model::{LiveLayer, Relation};

/// Validates a relation against the layers it links.
pub struct RelationValidator;

impl RelationValidator {
    /// Validate a relation and return all violations found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any rule is violated.
    pub fn validate(
        relation: &Relation,
        referencing: &LiveLayer,
        referenced: &LiveLayer,
    ) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if relation.id.trim().is_empty() {
            errors.push(ValidationError::new("id", "cannot be empty"));
        }

        check_endpoint(
            &mut errors,
            "referencing_layer",
            relation.referencing_layer.as_deref(),
            referencing,
        );
        check_endpoint(
            &mut errors,
            "referenced_layer",
            relation.referenced_layer.as_deref(),
            referenced,
        );

        let pairs = relation.field_pairs();
        if pairs.is_empty() {
            errors.push(ValidationError::new(
                "field_pairs",
                "at least one field pair is required",
            ));
        }

        let self_relation = relation.is_self_relation();
        let mut seen = HashSet::new();
        for pair in &pairs {
            if !referencing.has_field(&pair.referencing) {
                errors.push(ValidationError::new(
                    "referencing_fields",
                    format!("'{}' is not a field of '{}'", pair.referencing, referencing.name),
                ));
            }
            if !referenced.has_field(&pair.referenced) {
                errors.push(ValidationError::new(
                    "referenced_fields",
                    format!("'{}' is not a field of '{}'", pair.referenced, referenced.name),
                ));
            }
            if self_relation && pair.referencing == pair.referenced {
                errors.push(ValidationError::new(
                    "field_pairs",
                    format!("'{}' cannot reference itself", pair.referencing),
                ));
            }
            if !seen.insert(pair.clone()) {
                errors.push(ValidationError::new(
                    "field_pairs",
                    format!("duplicate field pair {pair}"),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_endpoint(
    errors: &mut Vec<ValidationError>,
    field: &str,
    layer_id: Option<&str>,
    layer: &LiveLayer,
) {
    match layer_id {
        None | Some("") => errors.push(ValidationError::new(field, "not set")),
        Some(id) if id != layer.id => errors.push(ValidationError::new(
            field,
            format!("'{id}' does not match layer '{}'", layer.id),
        )),
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcels() -> LiveLayer {
        LiveLayer::new("parcels_1", "parcels").with_fields(["fid", "owner_id", "parent_id"])
    }

    fn owners() -> LiveLayer {
        LiveLayer::new("owners_1", "owners").with_fields(["id", "name"])
    }

    fn linked(referencing: &LiveLayer, referenced: &LiveLayer) -> Relation {
        Relation {
            referencing_layer: Some(referencing.id.clone()),
            referenced_layer: Some(referenced.id.clone()),
            ..Relation::new("rel_1", "Parcel owners")
        }
    }

    #[test]
    fn valid_relation_passes() {
        let (p, o) = (parcels(), owners());
        let mut relation = linked(&p, &o);
        relation.add_field_pair("owner_id", "id");
        assert!(RelationValidator::validate(&relation, &p, &o).is_ok());
    }

    #[test]
    fn empty_relation_reports_everything() {
        let (p, o) = (parcels(), owners());
        let relation = Relation::new("", "");
        let errors = RelationValidator::validate(&relation, &p, &o).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["id", "referencing_layer", "referenced_layer", "field_pairs"]
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let (p, o) = (parcels(), owners());
        let mut relation = linked(&p, &o);
        relation.add_field_pair("owner", "uuid");
        let errors = RelationValidator::validate(&relation, &p, &o).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "referencing_fields");
        assert_eq!(errors[1].field, "referenced_fields");
    }

    #[test]
    fn mismatched_layer_id_is_rejected() {
        let (p, o) = (parcels(), owners());
        let mut relation = linked(&p, &o);
        relation.referenced_layer = Some("elsewhere".to_string());
        relation.add_field_pair("owner_id", "id");
        let errors = RelationValidator::validate(&relation, &p, &o).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "referenced_layer");
    }

    #[test]
    fn self_relation_needs_distinct_fields() {
        let p = parcels();
        let mut relation = linked(&p, &p);
        relation.add_field_pair("parent_id", "fid");
        assert!(RelationValidator::validate(&relation, &p, &p).is_ok());

        relation.add_field_pair("fid", "fid");
        let errors = RelationValidator::validate(&relation, &p, &p).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("cannot reference itself"));
    }

    #[test]
    fn duplicate_pairs_are_rejected() {
        let (p, o) = (parcels(), owners());
        let mut relation = linked(&p, &o);
        relation.add_field_pair("owner_id", "id");
        relation.add_field_pair("owner_id", "id");
        let errors = RelationValidator::validate(&relation, &p, &o).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "duplicate field pair owner_id -> id");
    }
}
