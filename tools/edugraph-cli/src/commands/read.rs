//! Read-only query commands.

use std::path::Path;

use edugraph::{Direction, EdgeKind, NodeKind};

use crate::error::Result;
use crate::output::{
    format_courses_table, format_neighbors_table, format_stats_table, format_thread, print_json,
};
use crate::OutputFormat;

/// Print node and edge counts.
pub fn stats(path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let graph = super::open_graph(path)?;
    let stats = graph.stats()?;

    match format {
        OutputFormat::Table => println!("{}", format_stats_table(&stats)),
        OutputFormat::Json => print_json(&stats)?,
    }
    Ok(())
}

/// Print course suggestions for a student.
pub fn recommend(
    path: Option<&Path>,
    student: &str,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let graph = super::open_graph(path)?;
    let courses = graph.recommend(student, limit)?;

    match format {
        OutputFormat::Table => {
            if courses.is_empty() {
                println!("No suggestions for {student}.");
            } else {
                println!("{}", format_courses_table(&courses));
            }
        }
        OutputFormat::Json => print_json(&courses)?,
    }
    Ok(())
}

/// Print the reply tree under a post.
pub fn thread(path: Option<&Path>, post: &str, format: OutputFormat) -> Result<()> {
    let graph = super::open_graph(path)?;
    let thread = graph.thread(post)?;

    match format {
        OutputFormat::Table => print!("{}", format_thread(&thread)),
        OutputFormat::Json => print_json(&thread)?,
    }
    Ok(())
}

/// Print the neighbors of one node.
pub fn neighbors(
    path: Option<&Path>,
    kind: NodeKind,
    id: &str,
    edge: EdgeKind,
    direction: Direction,
    format: OutputFormat,
) -> Result<()> {
    let graph = super::open_graph(path)?;
    let neighbors = graph.neighbors(kind, id, edge, direction)?;

    match format {
        OutputFormat::Table => {
            if neighbors.is_empty() {
                println!("No {edge} neighbors for {kind}({id}).");
            } else {
                println!("{}", format_neighbors_table(&neighbors));
            }
        }
        OutputFormat::Json => print_json(&neighbors)?,
    }
    Ok(())
}
