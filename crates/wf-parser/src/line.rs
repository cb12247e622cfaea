use crate::comments::is_blank;
use crate::escape::{Glyph, unescape};

/// Fields of a node line: `label | description | id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFields {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Whitespace only; ends the current flow.
    Blank,
    /// Indented `label | description` for the next connection.
    ConnectionDescription {
        label: Option<String>,
        description: Option<String>,
    },
    Node(NodeFields),
}

#[must_use]
pub fn classify_line(glyphs: &[Glyph]) -> LineKind {
    if is_blank(glyphs) {
        return LineKind::Blank;
    }

    match glyphs.first() {
        Some(Glyph::Char(' ' | '\t')) => parse_connection_description(glyphs),
        _ => LineKind::Node(parse_node_line(glyphs)),
    }
}

fn parse_connection_description(glyphs: &[Glyph]) -> LineKind {
    let fields = split_fields(glyphs, 2);
    LineKind::ConnectionDescription {
        label: fields.first().map(|field| trimmed(field)),
        description: fields.get(1).map(|field| trimmed(field)),
    }
}

fn parse_node_line(glyphs: &[Glyph]) -> NodeFields {
    let fields = split_fields(glyphs, 3);
    let label = fields.first().map(|field| trimmed(field)).unwrap_or_default();
    let description = fields.get(1).map(|field| trimmed(field));
    let id = match fields.get(2) {
        Some(explicit) => trimmed(explicit).to_lowercase(),
        None => label.to_lowercase(),
    };

    NodeFields {
        id,
        label,
        description,
    }
}

/// Split on structural `|`, producing at most `max_fields` fields. The last
/// field keeps any further separators.
fn split_fields(glyphs: &[Glyph], max_fields: usize) -> Vec<&[Glyph]> {
    let mut fields = Vec::with_capacity(max_fields);
    let mut rest = glyphs;

    while fields.len() + 1 < max_fields {
        let Some(at) = rest.iter().position(|glyph| glyph.is_structural('|')) else {
            break;
        };
        fields.push(&rest[..at]);
        rest = &rest[at + 1..];
    }
    fields.push(rest);
    fields
}

fn trimmed(field: &[Glyph]) -> String {
    unescape(field).trim().to_string()
}
