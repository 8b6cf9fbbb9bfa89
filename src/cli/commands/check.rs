//! Check command implementation.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::{Result, format_errors};
use crate::project::Project;
use crate::sync::{history_dir, list_backups};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
struct CheckReport {
    ok: bool,
    checks: Vec<CheckResult>,
}

fn push_check(
    checks: &mut Vec<CheckResult>,
    name: &str,
    status: CheckStatus,
    message: Option<String>,
    details: Option<serde_json::Value>,
) {
    checks.push(CheckResult {
        name: name.to_string(),
        status,
        message,
        details,
    });
}

fn has_error(checks: &[CheckResult]) -> bool {
    checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Error))
}

fn print_report(report: &CheckReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    println!("relman check");
    for check in &report.checks {
        let label = match check.status {
            CheckStatus::Ok => "OK",
            CheckStatus::Warn => "WARN",
            CheckStatus::Error => "ERROR",
        };
        if let Some(message) = &check.message {
            println!("{label} {}: {}", check.name, message);
        } else {
            println!("{label} {}", check.name);
        }
    }
    Ok(())
}

/// Values seen more than once, in first-seen order.
fn duplicates<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for value in values {
        let count = counts.entry(value).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(value);
        }
    }
    order
}

fn check_layers(project: &Project, checks: &mut Vec<CheckResult>) {
    let layers = project.layers();

    let dup_ids = duplicates(layers.iter().map(|l| l.id.as_str()));
    if dup_ids.is_empty() {
        push_check(
            checks,
            "layers.ids",
            CheckStatus::Ok,
            Some(format!("{} layer(s)", layers.len())),
            None,
        );
    } else {
        push_check(
            checks,
            "layers.ids",
            CheckStatus::Error,
            Some(format!("Duplicate layer IDs: {}", dup_ids.join(", "))),
            Some(serde_json::json!({ "ids": dup_ids })),
        );
    }

    // Exact-name matching on import takes the first layer with a given name.
    let dup_names = duplicates(layers.iter().map(|l| l.name.as_str()));
    if dup_names.is_empty() {
        push_check(checks, "layers.names", CheckStatus::Ok, None, None);
    } else {
        push_check(
            checks,
            "layers.names",
            CheckStatus::Warn,
            Some(format!("Ambiguous layer names: {}", dup_names.join(", "))),
            Some(serde_json::json!({ "names": dup_names })),
        );
    }

    let fieldless: Vec<&str> = layers
        .iter()
        .filter(|l| l.fields.is_empty())
        .map(|l| l.id.as_str())
        .collect();
    if !fieldless.is_empty() {
        push_check(
            checks,
            "layers.fields",
            CheckStatus::Warn,
            Some(format!("Layers without fields: {}", fieldless.join(", "))),
            Some(serde_json::json!({ "ids": fieldless })),
        );
    }
}

fn check_relations(project: &Project, checks: &mut Vec<CheckResult>) {
    let mut invalid = serde_json::Map::new();
    for relation in project.relations().iter() {
        if let Err(errors) = project.check_relation(relation) {
            invalid.insert(
                relation.id.clone(),
                serde_json::Value::String(format_errors(&errors)),
            );
        }
    }

    if invalid.is_empty() {
        push_check(
            checks,
            "relations.valid",
            CheckStatus::Ok,
            Some(format!("{} relation(s)", project.relations().len())),
            None,
        );
    } else {
        let ids: Vec<&str> = invalid.keys().map(String::as_str).collect();
        let message = format!("Invalid relations: {}", ids.join(", "));
        push_check(
            checks,
            "relations.valid",
            CheckStatus::Error,
            Some(message),
            Some(serde_json::Value::Object(invalid)),
        );
    }
}

fn check_history(project: &Project, checks: &mut Vec<CheckResult>) -> Result<()> {
    let Some(path) = project.path() else {
        return Ok(());
    };
    let stem = path
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
    let dir = history_dir(path);
    let backups = list_backups(&dir, &stem)?;

    let message = backups.first().map_or_else(
        || "No backups".to_string(),
        |latest| {
            format!(
                "{} backup(s), latest {}",
                backups.len(),
                latest.timestamp.format("%Y-%m-%d %H:%M:%S")
            )
        },
    );
    push_check(
        checks,
        "history",
        CheckStatus::Ok,
        Some(message),
        Some(serde_json::json!({ "path": dir.display().to_string() })),
    );
    Ok(())
}

/// Execute the check command.
///
/// Exits with status 1 when any check reports an error.
///
/// # Errors
///
/// Returns an error if the project cannot be opened or output fails.
pub fn execute(json: bool, config: &Config) -> Result<()> {
    let project = Project::open(config.project_path()?)?;
    let mut checks = Vec::new();

    check_layers(&project, &mut checks);
    check_relations(&project, &mut checks);
    check_history(&project, &mut checks)?;

    let report = CheckReport {
        ok: !has_error(&checks),
        checks,
    };
    print_report(&report, json)?;

    if !report.ok {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_in_first_seen_order() {
        let values = ["b", "a", "b", "c", "a", "b"];
        assert_eq!(duplicates(values.into_iter()), vec!["b", "a"]);
    }

    #[test]
    fn error_check_fails_report() {
        let mut checks = Vec::new();
        push_check(&mut checks, "layers.names", CheckStatus::Warn, None, None);
        assert!(!has_error(&checks));
        push_check(&mut checks, "layers.ids", CheckStatus::Error, None, None);
        assert!(has_error(&checks));
    }
}
