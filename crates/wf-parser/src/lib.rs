#![forbid(unsafe_code)]

//! Parser for workfl markup.
//!
//! The pipeline is escape resolution, comment stripping, line classification
//! and graph construction. Each line is one of:
//!
//! - blank: ends the current flow
//! - indented: `label | description` for the next connection
//! - anything else: a node, `label | description | id`
//!
//! Consecutive nodes in a flow are joined by a directed connection.

mod comments;
mod escape;
mod graph_builder;
mod line;

use serde_json::json;
use tracing::debug;
use wf_core::{Workflow, WorkflowError};

pub use comments::SourceLine;
pub use escape::{Delimiter, EscapedText, Glyph, escape, to_markup, unescape};
pub use line::{LineKind, NodeFields, classify_line};

use comments::{join_lines, strip_comment_lines};
use graph_builder::GraphBuilder;

/// Parse markup into a [`Workflow`].
///
/// # Errors
///
/// Returns [`WorkflowError::MalformedFlow`] when a connection description is
/// not preceded by a node in the same flow. No partial model is returned.
pub fn parse(markup: &str) -> Result<Workflow, WorkflowError> {
    let escaped = escape(markup);
    let lines = strip_comment_lines(&escaped);
    let markup_stripped = join_lines(&lines);

    let mut builder = GraphBuilder::new();
    for line in lines {
        builder.push_line(line)?;
    }
    let workflow = builder.finish(markup, markup_stripped);

    debug!(
        nodes = workflow.nodes().len(),
        connections = workflow.connections().len(),
        flows = workflow.flow_count(),
        "Parsed workflow markup"
    );
    Ok(workflow)
}

/// The cleaned markup that [`parse`] would produce, without building a graph.
#[must_use]
pub fn strip_comments(markup: &str) -> String {
    join_lines(&strip_comment_lines(&escape(markup)))
}

#[must_use]
pub fn parse_evidence_json(workflow: &Workflow) -> String {
    let isolated = workflow
        .nodes()
        .iter()
        .filter(|node| node.is_isolated())
        .count();
    json!({
        "node_count": workflow.nodes().len(),
        "connection_count": workflow.connections().len(),
        "isolated_node_count": isolated,
        "flow_count": workflow.flow_count(),
    })
    .to_string()
}
