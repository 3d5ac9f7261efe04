//! EduGraph Command Line Interface
//!
//! One-shot operator commands against an EduGraph database: bootstrap or
//! reset the schema, record domain events, and print recommendations,
//! threads and statistics.

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use edugraph::{EdgeKind, NodeKind};
use tracing_subscriber::EnvFilter;

use crate::commands::{events, read, schema};
use crate::error::Result;

/// EduGraph Command Line Interface
///
/// Relationship graph of students, instructors, courses and forum posts.
#[derive(Parser, Debug)]
#[command(name = "edugraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the database file
    #[arg(short, long, env = "EDUGRAPH_DB", global = true)]
    pub database: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    Table,
    /// JSON format
    Json,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the graph schema
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Enroll a student in a course
    Enroll {
        /// Student identifier
        student: String,
        /// Course identifier
        course: String,
    },

    /// Record that an instructor teaches a course
    Teach {
        /// Instructor identifier
        instructor: String,
        /// Course identifier
        course: String,
    },

    /// Record an assignment submission
    Submit {
        /// Student identifier
        student: String,
        /// Assignment identifier
        assignment: String,
        /// Awarded score
        score: f64,
    },

    /// Record that a student follows an instructor
    Follow {
        /// Student identifier
        student: String,
        /// Instructor identifier
        instructor: String,
    },

    /// Send a direct message between users
    Message {
        /// Sender user identifier
        sender: String,
        /// Receiver user identifier
        receiver: String,
        /// Message body
        content: String,
    },

    /// Declare that one course requires another
    Prereq {
        /// The course with the requirement
        course: String,
        /// The required course
        prerequisite: String,
    },

    /// Record that a student completed a course
    Complete {
        /// Student identifier
        student: String,
        /// Course identifier
        course: String,
    },

    /// Set a course title
    Title {
        /// Course identifier
        course: String,
        /// New title
        title: String,
    },

    /// Create a top-level forum post
    Post {
        /// Post identifier
        post: String,
        /// Author user identifier
        author: String,
        /// Post body
        content: String,
    },

    /// Reply to a forum post
    Reply {
        /// The post being replied to
        parent: String,
        /// Identifier of the new reply
        reply: String,
        /// Author user identifier
        author: String,
        /// Reply body
        content: String,
    },

    /// Suggest courses for a student
    Recommend {
        /// Student identifier
        student: String,

        /// Maximum number of suggestions
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Print the reply tree under a post
    Thread {
        /// Root post identifier
        post: String,
    },

    /// List the neighbors of a node over one edge kind
    Neighbors {
        /// Node kind, e.g. `course`
        kind: NodeKind,
        /// Domain identifier of the node
        id: String,
        /// Edge kind, e.g. `enrolled`
        edge: EdgeKind,

        /// Direction: 'outgoing', 'incoming', or 'both'
        #[arg(long, default_value = "outgoing")]
        direction: TraversalDirection,
    },

    /// Show node and edge counts
    Stats,
}

/// Schema management commands
#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Declare the education schema (safe to repeat)
    Define,

    /// Show the declared predicates and types
    Show,

    /// Drop every node, edge and schema declaration
    Reset {
        /// Confirm that all data may be dropped
        #[arg(long)]
        yes: bool,
    },
}

/// Traversal direction for neighbor lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TraversalDirection {
    /// Follow outgoing edges only.
    Outgoing,
    /// Follow incoming edges only.
    Incoming,
    /// Follow both outgoing and incoming edges.
    Both,
}

impl From<TraversalDirection> for edugraph::Direction {
    fn from(direction: TraversalDirection) -> Self {
        match direction {
            TraversalDirection::Outgoing => Self::Outgoing,
            TraversalDirection::Incoming => Self::Incoming,
            TraversalDirection::Both => Self::Both,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("edugraph=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let path = cli.database.as_deref();

    match cli.command {
        Commands::Schema(cmd) => schema::run(path, cmd, cli.format),
        Commands::Stats => read::stats(path, cli.format),
        Commands::Recommend { student, limit } => read::recommend(path, &student, limit, cli.format),
        Commands::Thread { post } => read::thread(path, &post, cli.format),
        Commands::Neighbors { kind, id, edge, direction } => {
            read::neighbors(path, kind, &id, edge, direction.into(), cli.format)
        }
        event => events::run(path, event, cli.format),
    }
}
