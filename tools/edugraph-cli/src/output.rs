//! Output formatting utilities.

use std::fmt::Write as _;

use edugraph::{CourseSummary, GraphStats, Neighbor, Relationship, ThreadNode};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::Result;
use crate::OutputFormat;

/// A row of key-value information.
#[derive(Tabled, Serialize)]
pub struct InfoRow {
    /// Property name.
    #[tabled(rename = "Property")]
    pub property: String,
    /// Property value.
    #[tabled(rename = "Value")]
    pub value: String,
}

impl InfoRow {
    /// Create a new info row.
    pub fn new(property: impl Into<String>, value: impl ToString) -> Self {
        Self { property: property.into(), value: value.to_string() }
    }
}

/// Format info rows as a table.
pub fn format_info_table(rows: Vec<InfoRow>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// Print info rows in the requested format.
pub fn print_rows(rows: Vec<InfoRow>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", format_info_table(rows)),
        OutputFormat::Json => print_json(&rows)?,
    }
    Ok(())
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format course suggestions as a table.
pub fn format_courses_table(courses: &[CourseSummary]) -> String {
    let mut builder = tabled::builder::Builder::new();
    builder.push_record(["#", "Course", "Title", "Peers"]);
    for (rank, course) in courses.iter().enumerate() {
        builder.push_record([
            (rank + 1).to_string(),
            course.course_id.clone(),
            course.title.clone().unwrap_or_else(|| "-".to_owned()),
            course.support.to_string(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Format neighbors as a table.
pub fn format_neighbors_table(neighbors: &[Neighbor]) -> String {
    let mut builder = tabled::builder::Builder::new();
    builder.push_record(["Direction", "Kind", "Id", "Node", "Details"]);
    for neighbor in neighbors {
        builder.push_record([
            if neighbor.incoming { "<-" } else { "->" }.to_owned(),
            neighbor.node.kind().to_string(),
            neighbor.node.domain_id.clone(),
            neighbor.node.id.to_string(),
            relationship_details(&neighbor.relationship),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Format node and edge counts as a table.
pub fn format_stats_table(stats: &GraphStats) -> String {
    let mut rows = Vec::with_capacity(stats.nodes.len() + stats.edges.len() + 2);
    for (kind, count) in &stats.nodes {
        rows.push(InfoRow::new(format!("{kind} nodes"), count));
    }
    rows.push(InfoRow::new("Total nodes", stats.node_total()));
    for (kind, count) in &stats.edges {
        rows.push(InfoRow::new(format!("{kind} edges"), count));
    }
    rows.push(InfoRow::new("Total edges", stats.edge_total()));
    format_info_table(rows)
}

/// Render a reply tree with one indented line per post.
pub fn format_thread(thread: &ThreadNode) -> String {
    let mut out = String::new();
    write_thread(&mut out, thread, 0);
    out
}

fn write_thread(out: &mut String, node: &ThreadNode, depth: usize) {
    let post = &node.post;
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "{:indent$}{} [{}] {}: {}",
        "",
        post.post_id,
        post.timestamp.format("%Y-%m-%d %H:%M:%S"),
        post.author_id,
        post.content,
        indent = depth * 2,
    );
    for reply in &node.replies {
        write_thread(out, reply, depth + 1);
    }
}

fn relationship_details(relationship: &Relationship) -> String {
    match relationship {
        Relationship::Submitted { score } => format!("score={score}"),
        Relationship::Messaged { content, timestamp } => {
            format!("{} {content}", timestamp.format("%Y-%m-%d %H:%M"))
        }
        _ => String::new(),
    }
}
