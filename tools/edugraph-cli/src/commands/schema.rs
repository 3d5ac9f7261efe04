//! Schema command implementations.

use std::path::Path;

use edugraph::{DropAll, EduGraph};
use tracing::info;

use crate::error::{CliError, Result};
use crate::output::{print_rows, InfoRow};
use crate::{OutputFormat, SchemaCommands};

/// Run a schema subcommand.
pub fn run(path: Option<&Path>, cmd: SchemaCommands, format: OutputFormat) -> Result<()> {
    match cmd {
        SchemaCommands::Define => define(path, format),
        SchemaCommands::Show => show(path, format),
        SchemaCommands::Reset { yes } => reset(path, yes, format),
    }
}

fn define(path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let graph = super::open_graph(path)?;
    let change = graph.schema().define_schema()?;
    let version = graph.catalog()?.version();

    let rows = vec![
        InfoRow::new("Schema Version", version),
        InfoRow::new("Added Predicates", change.added_predicates.len()),
        InfoRow::new("Upgraded Predicates", change.upgraded_predicates.len()),
        InfoRow::new("Added Types", change.added_types.len()),
        InfoRow::new("Extended Types", change.extended_types.len()),
    ];
    print_rows(rows, format)
}

fn show(path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let graph = super::open_graph(path)?;
    let catalog = graph.catalog()?;

    let mut rows = Vec::new();
    for predicate in catalog.predicates() {
        let mut flags = vec![predicate.value_type.to_string()];
        if predicate.list {
            flags.push("list".to_owned());
        }
        if predicate.index.is_some() {
            flags.push("@index(exact)".to_owned());
        }
        if predicate.reverse {
            flags.push("@reverse".to_owned());
        }
        rows.push(InfoRow::new(&predicate.name, flags.join(" ")));
    }
    for type_def in catalog.types() {
        rows.push(InfoRow::new(format!("type {}", type_def.name), type_def.fields.join(", ")));
    }
    print_rows(rows, format)
}

fn reset(path: Option<&Path>, yes: bool, format: OutputFormat) -> Result<()> {
    if !yes {
        return Err(CliError::ConfirmationRequired);
    }
    let path = path.ok_or(CliError::NoDatabaseSpecified)?;
    let graph = EduGraph::builder().path(path).allow_destructive_reset(true).open()?;

    let report = graph.schema().reset_schema(DropAll)?;
    info!(path = %path.display(), "graph reset");
    print_rows(vec![InfoRow::new("Entries Removed", report.entries_removed)], format)
}
