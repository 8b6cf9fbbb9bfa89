//! Layers command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::format::{LayerRow, format_layer_line};
use crate::model::LiveLayer;
use crate::project::Project;

fn relation_count(project: &Project, layer: &LiveLayer) -> usize {
    project
        .relations()
        .iter()
        .filter(|r| {
            r.referencing_layer.as_deref() == Some(layer.id.as_str())
                || r.referenced_layer.as_deref() == Some(layer.id.as_str())
        })
        .count()
}

/// Execute the layers command.
///
/// # Errors
///
/// Returns an error if the project cannot be opened.
pub fn execute(json: bool, config: &Config) -> Result<()> {
    let project = Project::open(config.project_path()?)?;

    if json {
        let rows: Vec<LayerRow<'_>> = project
            .layers()
            .iter()
            .map(|layer| LayerRow {
                layer,
                relation_count: relation_count(&project, layer),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if project.layers().is_empty() {
        println!("No layers loaded in the current project.");
        return Ok(());
    }

    for layer in project.layers() {
        println!("{}", format_layer_line(layer));
    }
    Ok(())
}
