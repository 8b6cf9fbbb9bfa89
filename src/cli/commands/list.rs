//! List command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::format::{RelationRow, format_relation_line};
use crate::project::Project;

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the project cannot be opened.
pub fn execute(json: bool, config: &Config) -> Result<()> {
    let project = Project::open(config.project_path()?)?;
    let layers = project.layers();

    if json {
        let rows: Vec<RelationRow> = project
            .relations()
            .iter()
            .map(|relation| RelationRow::new(relation, layers))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if project.relations().is_empty() {
        println!("No relations found in the current project.");
        println!("Use 'relman import <FILE>' to load relations from an export document.");
        return Ok(());
    }

    for relation in project.relations().iter() {
        println!("{}", format_relation_line(relation, layers));
    }
    println!("\n{} relation(s)", project.relations().len());
    Ok(())
}
