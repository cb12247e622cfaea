#![forbid(unsafe_code)]

//! Mermaid flowchart output for workfl models.
//!
//! Nodes are emitted under render ids, their position in insertion order
//! (`0`, `1`, ...), rather than their semantic ids, so any label or id text
//! produces a valid Mermaid identifier.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wf_core::{Direction, Workflow};

/// Configuration for Mermaid rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MermaidRenderConfig {
    /// Flowchart direction written in the `graph` header.
    pub direction: Direction,
    /// Prefix for every statement line.
    pub indent: String,
    /// Whether nodes without connections get their own declaration.
    pub include_isolated_nodes: bool,
}

impl Default for MermaidRenderConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TB,
            indent: String::from("  "),
            include_isolated_nodes: true,
        }
    }
}

impl MermaidRenderConfig {
    /// Default configuration with a leniently parsed direction.
    #[must_use]
    pub fn with_direction(direction: Option<&str>) -> Self {
        Self {
            direction: Direction::normalize(direction),
            ..Self::default()
        }
    }
}

/// Render with the default configuration. Unknown or missing directions fall
/// back to `TB`.
#[must_use]
pub fn render_mermaid(workflow: &Workflow, direction: Option<&str>) -> String {
    render_mermaid_with_config(workflow, &MermaidRenderConfig::with_direction(direction))
}

#[must_use]
pub fn render_mermaid_with_config(workflow: &Workflow, config: &MermaidRenderConfig) -> String {
    let graph = workflow.graph();
    let nodes = graph.nodes();
    let mut out = String::new();
    let _ = writeln!(out, "graph {}", config.direction);

    if config.include_isolated_nodes {
        for (render_id, node) in nodes.iter().enumerate() {
            if node.is_isolated() {
                let _ = writeln!(out, "{}{};", config.indent, node_decl(render_id, &node.label));
            }
        }
    }

    for connection in graph.connections() {
        // Render ids are insertion positions; connect() guarantees both exist.
        let (Some(from), Some(to)) = (
            graph.node_position(&connection.from_node_id),
            graph.node_position(&connection.to_node_id),
        ) else {
            continue;
        };

        let arrow = match connection.label.as_deref() {
            Some(label) if !label.is_empty() => format!("-->|\"{}\"|", flag_quotes(label)),
            _ => "-->".to_string(),
        };
        let _ = writeln!(
            out,
            "{}{}{}{};",
            config.indent,
            node_decl(from, &nodes[from].label),
            arrow,
            node_decl(to, &nodes[to].label)
        );
    }

    debug!(
        direction = %config.direction,
        nodes = workflow.nodes().len(),
        connections = workflow.connections().len(),
        bytes = out.len(),
        "Rendered Mermaid flowchart"
    );
    out
}

fn node_decl(render_id: usize, label: &str) -> String {
    format!("{render_id}(\"{}\")", flag_quotes(label))
}

/// Text is embedded in quoted Mermaid strings as-is. A `"` inside it ends the
/// string early, so log it for the caller to act on.
fn flag_quotes(text: &str) -> &str {
    if text.contains('"') {
        warn!(text, "Double quote in label is not escaped in Mermaid output");
    }
    text
}
