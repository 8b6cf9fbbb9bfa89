//! Export command implementation.

use crate::cli::ExportArgs;
use crate::config::Config;
use crate::error::{RelationError, Result};
use crate::project::Project;

/// Execute the export command.
///
/// # Errors
///
/// Returns `NothingToDo` when the project has no relations, or an error if
/// the project cannot be opened or the document cannot be written.
pub fn execute(args: &ExportArgs, config: &Config) -> Result<()> {
    let project_path = config.project_path()?;
    let mut project = Project::open(project_path)?;

    if project.relations().is_empty() {
        return Err(RelationError::NothingToDo {
            reason: "no relations found in the current project".to_string(),
        });
    }

    if project.file_name().is_none() {
        let canonical = dunce::canonicalize(project_path)?;
        project.set_file_name(canonical.display().to_string());
    }

    let doc = project.export();
    let pretty = config.export.pretty && !args.compact;
    let skipped = project.relations().len() - doc.relations.len();

    match &args.output {
        Some(path) => {
            doc.save(path, pretty)?;
            println!(
                "Exported {} relation(s) to {}",
                doc.relations.len(),
                path.display()
            );
            if skipped > 0 {
                println!("Skipped {skipped} relation(s) whose layers are not loaded");
            }
        }
        None => println!("{}", doc.to_json(pretty)?),
    }

    tracing::debug!(exported = doc.relations.len(), skipped, "Export finished");
    Ok(())
}
