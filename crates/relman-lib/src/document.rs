//! The JSON exchange document.
//!
//! [`ExportDocument`] is the typed shape written on export. Imports go
//! through [`ImportDocument`], which only checks the envelope and keeps each
//! relation record as a raw JSON value so one malformed record cannot sink
//! the whole file.

use std::fs;
use std::io::Write;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RelationError, Result};

/// Version tag written into every export.
pub const DOCUMENT_VERSION: &str = "1.0";

/// A complete relations export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ExportDocument {
    /// Format version, always "1.0".
    pub version: String,

    /// Source project file path. Informational only, never parsed.
    #[serde(default)]
    pub export_date: String,

    pub relations: Vec<RelationRecord>,
}

/// One serialized relation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct RelationRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub strength: String,
    /// Referencing layer.
    pub parent_layer: LayerRef,
    /// Referenced layer.
    pub child_layer: LayerRef,
    pub field_pairs: Vec<FieldPairRecord>,
}

/// Serialized reference to a layer in the source project.
///
/// Every member is `null` when the endpoint layer was unavailable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
pub struct LayerRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct FieldPairRecord {
    pub referencing_field: FieldToken,
    pub referenced_field: FieldToken,
}

impl FieldPairRecord {
    #[must_use]
    pub fn new(referencing: impl Into<String>, referenced: impl Into<String>) -> Self {
        Self {
            referencing_field: FieldToken(referencing.into()),
            referenced_field: FieldToken(referenced.into()),
        }
    }
}

/// A field name, or a digit string holding a position in the field list.
///
/// Older exports wrote positions as JSON numbers; those are read back as
/// their decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct FieldToken(pub String);

impl FieldToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FieldToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FieldToken {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TokenVisitor;

        impl serde::de::Visitor<'_> for TokenVisitor {
            type Value = FieldToken;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a field name or a field index")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                Ok(FieldToken(v.to_string()))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                Ok(FieldToken(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                Ok(FieldToken(v.to_string()))
            }
        }

        deserializer.deserialize_any(TokenVisitor)
    }
}

impl ExportDocument {
    /// Create an empty document with the current format version.
    #[must_use]
    pub fn new(export_date: impl Into<String>) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            export_date: export_date.into(),
            relations: Vec::new(),
        }
    }

    /// Render as JSON text. Pretty output uses two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns `Json` if serialization fails.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }

    /// Write the document with write-to-temp + rename.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be written.
    pub fn save(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = self.to_json(pretty)?;
        write_atomic(path, &json)
    }

    /// Convert into the form consumed by the importer.
    ///
    /// # Errors
    ///
    /// Returns `Json` if a record cannot be converted to a JSON value.
    pub fn to_import(&self) -> Result<ImportDocument> {
        let records = self
            .relations
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ImportDocument {
            version: Some(self.version.clone()),
            export_date: Some(self.export_date.clone()),
            records,
        })
    }
}

/// An export document as read for import: envelope checked, records raw.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportDocument {
    pub version: Option<String>,
    pub export_date: Option<String>,
    pub records: Vec<Value>,
}

impl ImportDocument {
    /// Check the envelope of a parsed document.
    ///
    /// # Errors
    ///
    /// Returns `Format` if the value is not an object, has no `relations`
    /// key, or `relations` is not an array.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(RelationError::format("expected a JSON object"));
        };

        let records = match map.remove("relations") {
            Some(Value::Array(records)) => records,
            Some(_) => return Err(RelationError::format("'relations' must be an array")),
            None => return Err(RelationError::format("missing 'relations' section")),
        };

        let text_member = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            version: text_member("version"),
            export_date: text_member("export_date"),
            records,
        })
    }

    /// Parse JSON text and check the envelope.
    ///
    /// # Errors
    ///
    /// Returns `Json` for malformed JSON, `Format` for a bad envelope.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Read and parse a document file.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound`, `Io`, `Json` or `Format`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_to_string(path)?;
        Self::parse(&text)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read a file, mapping a missing file to `FileNotFound`.
pub(crate) fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RelationError::FileNotFound(path.to_path_buf())
        } else {
            RelationError::Io(e)
        }
    })
}

/// Write `contents` next to `path` and rename over it.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(contents.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}
