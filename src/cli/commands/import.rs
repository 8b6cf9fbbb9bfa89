//! Import command implementation.

use crate::cli::ImportArgs;
use crate::config::Config;
use crate::document::{DOCUMENT_VERSION, ImportDocument};
use crate::error::Result;
use crate::format::{ImportSummary, format_layer_line, format_log_entry, icons};
use crate::project::Project;
use crate::sync::backup_before_save;

const RULE: &str = "---------------------------------------------------";

/// Execute the import command.
///
/// The project is saved only when at least one relation was installed and
/// this is not a dry run.
///
/// # Errors
///
/// Returns an error if the project or document cannot be read, the document
/// envelope is malformed, or the project cannot be saved.
pub fn execute(args: &ImportArgs, json: bool, config: &Config) -> Result<()> {
    let project_path = config.project_path()?;
    let mut project = Project::open(project_path)?;
    let doc = ImportDocument::load(&args.file)?;

    if let Some(version) = doc.version.as_deref().filter(|v| *v != DOCUMENT_VERSION) {
        tracing::warn!(version, expected = DOCUMENT_VERSION, "Unexpected document version");
    }

    if !json {
        println!("=== Import started ===");
        println!("File: {}", args.file.display());
        println!("--- Layers available in project ---");
        for layer in project.layers() {
            println!("{}", format_layer_line(layer));
        }
        println!("{RULE}");
    }

    let report = project.import(&doc);

    let mut summary = ImportSummary::new(args.file.display().to_string(), &report);
    summary.dry_run = args.dry_run;

    if report.installed > 0 && !args.dry_run {
        if !args.no_backup {
            summary.backup = backup_before_save(project_path, &config.history)?
                .map(|p| p.display().to_string());
        }
        project.save()?;
        summary.saved = true;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for entry in report.log.entries() {
        println!("{}", format_log_entry(entry));
    }

    if report.installed > 0 {
        println!("=== Import completed: {} relation(s) imported ===", report.installed);
        if args.dry_run {
            println!("Dry run: project not saved");
        } else if let Some(backup) = &summary.backup {
            println!("Backup: {backup}");
        }
    } else {
        println!(
            "{} No relation was imported. Check the log above for details.",
            icons::WARNING
        );
    }

    Ok(())
}
