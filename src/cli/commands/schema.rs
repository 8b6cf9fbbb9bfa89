//! Schema command implementation.

use crate::document::ExportDocument;
use crate::error::Result;

/// Print the JSON Schema of the export document.
///
/// # Errors
///
/// Returns an error if the schema cannot be serialized.
pub fn execute() -> Result<()> {
    let schema = schemars::schema_for!(ExportDocument);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
