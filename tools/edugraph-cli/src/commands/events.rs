//! Domain event commands.

use std::path::Path;

use std::collections::BTreeMap;

use edugraph::{MutationOutcome, Post};

use crate::error::Result;
use crate::output::{print_json, print_rows, InfoRow};
use crate::{Commands, OutputFormat};

/// Record one domain event.
pub fn run(path: Option<&Path>, cmd: Commands, format: OutputFormat) -> Result<()> {
    let graph = super::open_graph(path)?;

    match cmd {
        Commands::Enroll { student, course } => {
            report(graph.enroll_student(&student, &course)?, format)
        }
        Commands::Teach { instructor, course } => {
            report(graph.instructor_teaches(&instructor, &course)?, format)
        }
        Commands::Submit { student, assignment, score } => {
            report(graph.submit_assignment(&student, &assignment, score)?, format)
        }
        Commands::Follow { student, instructor } => {
            report(graph.follow_instructor(&student, &instructor)?, format)
        }
        Commands::Message { sender, receiver, content } => {
            report(graph.message_user(&sender, &receiver, &content)?, format)
        }
        Commands::Prereq { course, prerequisite } => {
            report(graph.add_prerequisite(&course, &prerequisite)?, format)
        }
        Commands::Complete { student, course } => {
            report(graph.mark_course_completed(&student, &course)?, format)
        }
        Commands::Title { course, title } => {
            let node = graph.set_course_title(&course, &title)?;
            match format {
                OutputFormat::Json => print_json(&node),
                OutputFormat::Table => print_rows(
                    vec![
                        InfoRow::new("Course", &node.domain_id),
                        InfoRow::new("Node", node.id),
                        InfoRow::new("Title", node.title().unwrap_or_default()),
                    ],
                    format,
                ),
            }
        }
        Commands::Post { post, author, content } => {
            post_created(&graph.create_post(&post, &author, &content)?, format)
        }
        Commands::Reply { parent, reply, author, content } => {
            post_created(&graph.reply_to(&parent, &reply, &author, &content)?, format)
        }
        Commands::Schema(_)
        | Commands::Recommend { .. }
        | Commands::Thread { .. }
        | Commands::Neighbors { .. }
        | Commands::Stats => unreachable!("read commands are dispatched in main"),
    }
}

fn report(outcome: MutationOutcome, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "edge": outcome.edge,
            "created": outcome
                .created
                .iter()
                .map(|(key, id)| (key.to_string(), id.as_u64()))
                .collect::<BTreeMap<_, _>>(),
        }));
    }

    let mut rows = vec![
        InfoRow::new("Edge", format!("{} {}", outcome.edge.kind(), outcome.edge.id)),
        InfoRow::new("From", outcome.edge.source),
        InfoRow::new("To", outcome.edge.target),
    ];
    for (key, id) in &outcome.created {
        rows.push(InfoRow::new(format!("Created {key}"), id));
    }
    print_rows(rows, format)
}

fn post_created(post: &Post, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(post);
    }
    print_rows(
        vec![
            InfoRow::new("Post", &post.post_id),
            InfoRow::new("Author", &post.author_id),
            InfoRow::new("Replies To", post.parent_id.as_deref().unwrap_or("-")),
            InfoRow::new("Created", post.timestamp.to_rfc3339()),
        ],
        format,
    )
}
