//! Core data types: live layers and the relations linking them.
//!
//! Same serde format as the project snapshot files read by `relman`.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How tightly the referenced features are bound to the referencing ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Strength {
    #[default]
    Association,
    Composition,
    Custom(String),
}

impl Strength {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Association => "Association",
            Self::Composition => "Composition",
            Self::Custom(value) => value,
        }
    }

    #[must_use]
    pub const fn is_standard(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Strength {
    type Err = crate::error::RelationError;

    /// Accepts the plain names, the numeric enum values and the
    /// `RelationStrength.<Name>` rendering of older exports.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let bare = lowered.rsplit('.').next().unwrap_or(&lowered);
        match bare {
            "association" | "0" => Ok(Self::Association),
            "composition" | "1" => Ok(Self::Composition),
            _ => Ok(Self::Custom(s.to_string())),
        }
    }
}

impl Serialize for Strength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Strength {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(value.parse().unwrap_or(Self::Custom(value)))
    }
}

/// A data layer currently loaded in the project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LiveLayer {
    /// Project-local identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Data source / connection string.
    #[serde(default)]
    pub source: String,

    /// Field names in layer order.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl LiveLayer {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }
}

/// One (referencing field, referenced field) association.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPair {
    pub referencing: String,
    pub referenced: String,
}

impl FieldPair {
    #[must_use]
    pub fn new(referencing: impl Into<String>, referenced: impl Into<String>) -> Self {
        Self {
            referencing: referencing.into(),
            referenced: referenced.into(),
        }
    }
}

impl fmt::Display for FieldPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.referencing, self.referenced)
    }
}

/// A link between a referencing (parent) and a referenced (child) layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Relation {
    /// Unique ID within the project.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub strength: Strength,

    /// ID of the layer holding the foreign-key-like fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referencing_layer: Option<String>,

    /// ID of the layer holding the referenced fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_layer: Option<String>,

    #[serde(default)]
    pub referencing_fields: Vec<String>,

    #[serde(default)]
    pub referenced_fields: Vec<String>,
}

impl Relation {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Field pairs in order. Unpaired trailing fields are dropped.
    #[must_use]
    pub fn field_pairs(&self) -> Vec<FieldPair> {
        self.referencing_fields
            .iter()
            .zip(&self.referenced_fields)
            .map(|(referencing, referenced)| FieldPair::new(referencing, referenced))
            .collect()
    }

    pub fn add_field_pair(&mut self, referencing: impl Into<String>, referenced: impl Into<String>) {
        self.referencing_fields.push(referencing.into());
        self.referenced_fields.push(referenced.into());
    }

    #[must_use]
    pub fn is_self_relation(&self) -> bool {
        self.referencing_layer.is_some() && self.referencing_layer == self.referenced_layer
    }
}
