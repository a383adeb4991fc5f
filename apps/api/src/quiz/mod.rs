// Quiz engine: question bank, per-user session state machine, scoring,
// aggregation over result history and degree recommendations.
// Everything except `handlers` and `history::PgResultLog` is pure and synchronous.

pub mod aggregate;
pub mod bank;
pub mod handlers;
pub mod history;
pub mod recommend;
pub mod scoring;
pub mod session;
pub mod store;

use std::path::Path;

use anyhow::{Context, Result};

/// Returns the contents of `path` when given, otherwise the embedded table.
pub(crate) fn read_table(path: Option<&Path>, embedded: &'static str) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read reference table {}", path.display())),
        None => Ok(embedded.to_string()),
    }
}
