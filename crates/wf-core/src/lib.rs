#![forbid(unsafe_code)]

//! Core model for workfl markup: nodes, connections and the read-only
//! [`Workflow`] produced by the parser.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span covering a whole source line. Lines and columns are 1-based.
    #[must_use]
    pub fn at_line(line: usize, line_len: usize) -> Self {
        let start = Position { line, col: 1 };
        let end = Position {
            line,
            col: line_len.max(1),
        };
        Self::new(start, end)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WorkflowErrorCode {
    MalformedFlow,
    UnknownNode,
}

impl WorkflowErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedFlow => "workfl/error/malformed-flow",
            Self::UnknownNode => "workfl/error/unknown-node",
        }
    }
}

#[derive(Debug, Clone, Serialize, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// A connection description appeared before any node of its flow.
    #[error("line {line}: connection description '{text}' has no preceding node in its flow")]
    MalformedFlow {
        line: usize,
        text: String,
        span: Span,
    },
    #[error("connection endpoint '{node_id}' is not a defined node")]
    UnknownNode { node_id: String },
}

impl WorkflowError {
    #[must_use]
    pub const fn code(&self) -> WorkflowErrorCode {
        match self {
            Self::MalformedFlow { .. } => WorkflowErrorCode::MalformedFlow,
            Self::UnknownNode { .. } => WorkflowErrorCode::UnknownNode,
        }
    }

    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        match self {
            Self::MalformedFlow { span, .. } => Some(*span),
            Self::UnknownNode { .. } => None,
        }
    }
}

/// Flowchart direction accepted by the diagram renderer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    TB,
    BT,
    LR,
    RL,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::TB, Self::BT, Self::LR, Self::RL];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TB => "TB",
            Self::BT => "BT",
            Self::LR => "LR",
            Self::RL => "RL",
        }
    }

    /// Case-insensitive lookup. Surrounding whitespace is not accepted.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.as_str().eq_ignore_ascii_case(token))
    }

    /// Resolve a user-supplied direction, falling back to [`Direction::TB`]
    /// for anything unrecognized (including no value at all).
    #[must_use]
    pub fn normalize(token: Option<&str>) -> Self {
        match token {
            Some(raw) => Self::from_token(raw).unwrap_or_else(|| {
                debug!(direction = raw, "Unrecognized direction; using TB");
                Self::TB
            }),
            None => Self::TB,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::normalize(raw.as_deref()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub usize);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Node {
    /// Lowercase key, explicit or derived from the label.
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    /// Connections this node takes part in, as source or target, in creation order.
    pub connection_ids: Vec<ConnectionId>,
}

impl Node {
    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.connection_ids.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub from_node_id: String,
    pub to_node_id: String,
    pub label: Option<String>,
    /// Kept for consumers of the model; the Mermaid renderer ignores it.
    pub description: Option<String>,
}

/// Insertion-ordered node and connection mappings.
///
/// Nodes are keyed by id with first-definition-wins semantics. Connections are
/// numbered by a counter that starts at zero and never reuses a value.
#[derive(Debug, Clone, Serialize, Default)]
pub struct FlowGraph {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    #[serde(skip)]
    node_index: FxHashMap<String, usize>,
    #[serde(skip)]
    next_connection_id: usize,
}

impl FlowGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node unless one with the same id already exists.
    ///
    /// Returns `true` when the node was added. A repeated id keeps the label
    /// and description of its first definition.
    pub fn insert_node(
        &mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        description: Option<String>,
    ) -> bool {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return false;
        }

        self.node_index.insert(id.clone(), self.nodes.len());
        self.nodes.push(Node {
            id,
            label: label.into(),
            description,
            connection_ids: Vec::new(),
        });
        true
    }

    /// Create a directed connection between two existing nodes and register it
    /// on both endpoints.
    pub fn connect(
        &mut self,
        from_node_id: &str,
        to_node_id: &str,
        label: Option<String>,
        description: Option<String>,
    ) -> Result<ConnectionId, WorkflowError> {
        let from_index = self.index_of(from_node_id)?;
        let to_index = self.index_of(to_node_id)?;

        let id = ConnectionId(self.next_connection_id);
        self.next_connection_id += 1;

        self.connections.push(Connection {
            id,
            from_node_id: from_node_id.to_string(),
            to_node_id: to_node_id.to_string(),
            label,
            description,
        });
        self.nodes[from_index].connection_ids.push(id);
        self.nodes[to_index].connection_ids.push(id);

        Ok(id)
    }

    fn index_of(&self, node_id: &str) -> Result<usize, WorkflowError> {
        self.node_index
            .get(node_id)
            .copied()
            .ok_or_else(|| WorkflowError::UnknownNode {
                node_id: node_id.to_string(),
            })
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&index| &self.nodes[index])
    }

    /// Position of a node in insertion order.
    #[must_use]
    pub fn node_position(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        // Ids are dense because nothing is ever removed.
        self.connections.get(id.0)
    }

    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

/// A parsed workflow. Read-only once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct Workflow {
    markup: String,
    markup_stripped: String,
    graph: FlowGraph,
    flow_count: usize,
}

impl Workflow {
    #[must_use]
    pub fn new(
        markup: impl Into<String>,
        markup_stripped: impl Into<String>,
        graph: FlowGraph,
        flow_count: usize,
    ) -> Self {
        Self {
            markup: markup.into(),
            markup_stripped: markup_stripped.into(),
            graph,
            flow_count,
        }
    }

    /// The markup exactly as supplied.
    #[must_use]
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// The markup after comment removal, one `\n`-terminated line per kept line.
    #[must_use]
    pub fn markup_stripped(&self) -> &str {
        &self.markup_stripped
    }

    #[must_use]
    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        self.graph.nodes()
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.graph.node(id)
    }

    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        self.graph.connections()
    }

    #[must_use]
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.graph.connection(id)
    }

    /// Number of flows that defined at least one node.
    #[must_use]
    pub const fn flow_count(&self) -> usize {
        self.flow_count
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markup)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ConnectionId, Direction, FlowGraph, Span, Workflow, WorkflowError, WorkflowErrorCode,
    };

    #[test]
    fn first_definition_wins() {
        let mut graph = FlowGraph::new();
        assert!(graph.insert_node("a", "A", Some("first".to_string())));
        assert!(!graph.insert_node("a", "Alpha", Some("second".to_string())));

        let node = graph.node("a").expect("node a");
        assert_eq!(node.label, "A");
        assert_eq!(node.description.as_deref(), Some("first"));
        assert_eq!(graph.nodes().len(), 1);
    }

    #[test]
    fn node_position_is_insertion_order() {
        let mut graph = FlowGraph::new();
        graph.insert_node("b", "B", None);
        graph.insert_node("a", "A", None);
        graph.insert_node("b", "Again", None);

        assert_eq!(graph.node_position("b"), Some(0));
        assert_eq!(graph.node_position("a"), Some(1));
        assert_eq!(graph.node_position("missing"), None);
    }

    #[test]
    fn connections_are_numbered_from_zero_and_linked_to_both_ends() {
        let mut graph = FlowGraph::new();
        graph.insert_node("a", "A", None);
        graph.insert_node("b", "B", None);
        graph.insert_node("c", "C", None);

        let first = graph.connect("a", "b", None, None).expect("a -> b");
        let second = graph
            .connect("b", "c", Some("next".to_string()), None)
            .expect("b -> c");

        assert_eq!(first, ConnectionId(0));
        assert_eq!(second, ConnectionId(1));
        assert_eq!(graph.node("a").map(|n| n.connection_ids.clone()), Some(vec![first]));
        assert_eq!(
            graph.node("b").map(|n| n.connection_ids.clone()),
            Some(vec![first, second])
        );
        assert_eq!(
            graph.connection(second).and_then(|c| c.label.as_deref()),
            Some("next")
        );
    }

    #[test]
    fn connecting_an_unknown_node_fails() {
        let mut graph = FlowGraph::new();
        graph.insert_node("a", "A", None);

        let err = graph.connect("a", "ghost", None, None).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::UnknownNode {
                node_id: "ghost".to_string()
            }
        );
        assert_eq!(err.code(), WorkflowErrorCode::UnknownNode);
        assert!(graph.connections().is_empty());
        assert!(graph.node("a").is_some_and(|n| n.is_isolated()));
    }

    #[test]
    fn malformed_flow_reports_line_and_code() {
        let err = WorkflowError::MalformedFlow {
            line: 3,
            text: "  oops".to_string(),
            span: Span::at_line(3, 6),
        };
        assert_eq!(err.code().as_str(), "workfl/error/malformed-flow");
        assert_eq!(err.span().map(|span| span.start.line), Some(3));
        assert!(err.to_string().starts_with("line 3:"));
    }

    #[test]
    fn direction_tokens_are_case_insensitive() {
        assert_eq!(Direction::from_token("lr"), Some(Direction::LR));
        assert_eq!(Direction::from_token("Bt"), Some(Direction::BT));
        assert_eq!(Direction::from_token("TD"), None);
        assert_eq!(Direction::normalize(Some("rl")), Direction::RL);
        assert_eq!(Direction::normalize(Some("XX")), Direction::TB);
        assert_eq!(Direction::normalize(None), Direction::TB);
    }

    #[test]
    fn direction_deserializes_with_fallback() {
        let lr: Direction = serde_json::from_str("\"lr\"").expect("direction");
        let fallback: Direction = serde_json::from_str("\"sideways\"").expect("direction");
        let missing: Direction = serde_json::from_str("null").expect("direction");
        assert_eq!(lr, Direction::LR);
        assert_eq!(fallback, Direction::TB);
        assert_eq!(missing, Direction::TB);
    }

    #[test]
    fn workflow_displays_raw_markup() {
        let workflow = Workflow::new("A # hi\n", "A \n", FlowGraph::new(), 0);
        assert_eq!(workflow.to_string(), "A # hi\n");
        assert_eq!(workflow.markup_stripped(), "A \n");
    }

    #[test]
    fn serialized_graph_omits_lookup_index() {
        let mut graph = FlowGraph::new();
        graph.insert_node("a", "A", None);
        let json = serde_json::to_value(&graph).expect("serialize graph");
        assert!(json.get("node_index").is_none());
        assert_eq!(json["nodes"][0]["label"], "A");
    }
}
