use tracing::trace;
use wf_core::{FlowGraph, Span, Workflow, WorkflowError};

use crate::comments::SourceLine;
use crate::line::{LineKind, NodeFields, classify_line};

#[derive(Debug, Default)]
struct PendingConnection {
    label: Option<String>,
    description: Option<String>,
}

/// Accumulates the graph while walking the cleaned lines.
///
/// Per-flow state (`prev_node_id` and the pending connection text) is reset by
/// blank lines; the graph and flow counter persist across flows.
#[derive(Debug, Default)]
pub(crate) struct GraphBuilder {
    graph: FlowGraph,
    prev_node_id: Option<String>,
    pending: PendingConnection,
    flow_count: usize,
}

impl GraphBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_line(&mut self, line: SourceLine<'_>) -> Result<(), WorkflowError> {
        let kind = classify_line(line.glyphs);
        trace!(line = line.number, kind = ?kind, "Classified line");

        match kind {
            LineKind::Blank => self.end_flow(),
            LineKind::ConnectionDescription { label, description } => {
                if self.prev_node_id.is_none() {
                    let text = line.to_markup();
                    return Err(WorkflowError::MalformedFlow {
                        line: line.number,
                        span: Span::at_line(line.number, text.chars().count()),
                        text,
                    });
                }
                self.pending = PendingConnection { label, description };
            }
            LineKind::Node(fields) => self.push_node(fields)?,
        }
        Ok(())
    }

    fn end_flow(&mut self) {
        self.prev_node_id = None;
        self.pending = PendingConnection::default();
    }

    fn push_node(&mut self, fields: NodeFields) -> Result<(), WorkflowError> {
        let NodeFields {
            id,
            label,
            description,
        } = fields;
        self.graph.insert_node(id.clone(), label, description);

        let pending = std::mem::take(&mut self.pending);
        match self.prev_node_id.take() {
            Some(prev) => {
                self.graph
                    .connect(&prev, &id, pending.label, pending.description)?;
            }
            None => self.flow_count += 1,
        }
        self.prev_node_id = Some(id);
        Ok(())
    }

    pub(crate) fn finish(self, markup: &str, markup_stripped: String) -> Workflow {
        Workflow::new(markup, markup_stripped, self.graph, self.flow_count)
    }
}
