//! Command implementations.

pub mod events;
pub mod read;
pub mod schema;

use std::path::Path;

use edugraph::EduGraph;

use crate::error::{CliError, Result};

/// Open or create the graph at the given path.
pub fn open_graph(path: Option<&Path>) -> Result<EduGraph> {
    let path = path.ok_or(CliError::NoDatabaseSpecified)?;
    Ok(EduGraph::open(path)?)
}
