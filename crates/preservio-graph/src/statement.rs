//! Typed relation/property statements and the update-batch builder
//!
//! A statement either inserts or deletes one (subject, predicate,
//! object) triple; the builder accumulates them in insertion order into
//! a batch submitted to the store as one atomic unit. Literal values
//! are never interpolated into query text unescaped: the textual
//! rendering escapes them, and structured stores consume the typed form
//! directly.

use crate::path::NodePath;
use crate::vocab;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a statement adds or removes its triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementOp {
    /// Unconditional addition
    Insert,
    /// Removal targeting an exact match
    Delete,
}

/// Object position of a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectValue {
    /// A literal value
    Literal(String),
    /// A reference to another node
    Reference(NodePath),
}

/// One relation/property statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub op: StatementOp,
    pub subject: NodePath,
    pub predicate: String,
    pub object: ObjectValue,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.op {
            StatementOp::Insert => "INSERT",
            StatementOp::Delete => "DELETE",
        };
        match &self.object {
            ObjectValue::Literal(value) => write!(
                f,
                "{verb} {{<{}> <{}> \"{}\"}} WHERE {{}};",
                self.subject,
                self.predicate,
                escape_literal(value)
            ),
            ObjectValue::Reference(target) => write!(
                f,
                "{verb} {{<{}> <{}> <{}>}} WHERE {{}};",
                self.subject, self.predicate, target
            ),
        }
    }
}

/// Escape a literal value for textual statement rendering
#[must_use]
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// An insertion-ordered batch of statements, applied atomically
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBatch(pub Vec<Statement>);

impl UpdateBatch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.0.iter()
    }
}

impl IntoIterator for UpdateBatch {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for UpdateBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.0 {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}

/// Mutable accumulator of relation/property statements
///
/// Statements render in the order they were added.
#[derive(Debug, Default)]
pub struct UpdateBuilder {
    statements: Vec<Statement>,
}

impl UpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a node with its `hasType` literal
    pub fn add_type_tag(&mut self, node: &NodePath, type_name: impl Into<String>) {
        self.add_property(node, vocab::HAS_TYPE, type_name);
    }

    /// Insert a literal property on a node
    pub fn add_property(
        &mut self,
        node: &NodePath,
        predicate: impl Into<String>,
        literal: impl Into<String>,
    ) {
        self.statements.push(Statement {
            op: StatementOp::Insert,
            subject: node.clone(),
            predicate: predicate.into(),
            object: ObjectValue::Literal(literal.into()),
        });
    }

    /// Insert a reference from a node to another node
    pub fn add_reference(
        &mut self,
        node: &NodePath,
        predicate: impl Into<String>,
        target: &NodePath,
    ) {
        self.statements.push(Statement {
            op: StatementOp::Insert,
            subject: node.clone(),
            predicate: predicate.into(),
            object: ObjectValue::Reference(target.clone()),
        });
    }

    /// Delete the property matching exactly this literal
    pub fn remove(
        &mut self,
        node: &NodePath,
        predicate: impl Into<String>,
        literal: impl Into<String>,
    ) {
        self.statements.push(Statement {
            op: StatementOp::Delete,
            subject: node.clone(),
            predicate: predicate.into(),
            object: ObjectValue::Literal(literal.into()),
        });
    }

    /// Append all statements of another builder
    pub fn merge(&mut self, other: Self) {
        self.statements.extend(other.statements);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Finish the batch, preserving insertion order
    #[must_use]
    pub fn render(self) -> UpdateBatch {
        UpdateBatch(self.statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal(r#"a "quoted" value"#), r#"a \"quoted\" value"#);
        assert_eq!(escape_literal("back\\slash"), "back\\\\slash");
        assert_eq!(escape_literal("line\nbreak\ttab\r"), "line\\nbreak\\ttab\\r");
        assert_eq!(escape_literal("plain"), "plain");
    }

    #[test]
    fn test_render_preserves_insertion_order() {
        let node = NodePath::new("/objects/scape/entities/entity-1");
        let mut builder = UpdateBuilder::new();
        builder.add_type_tag(&node, "intellectualentity");
        builder.add_property(&node, vocab::HAS_TITLE, "first");
        builder.add_reference(&node, vocab::HAS_REPRESENTATION, &node.child("rep-1"));
        let batch = builder.render();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.0[0].predicate, vocab::HAS_TYPE);
        assert_eq!(batch.0[1].predicate, vocab::HAS_TITLE);
        assert_eq!(batch.0[2].predicate, vocab::HAS_REPRESENTATION);
    }

    #[test]
    fn test_remove_renders_exact_delete() {
        let queue = NodePath::new("/objects/scape/queue");
        let mut builder = UpdateBuilder::new();
        builder.remove(&queue, vocab::HAS_ITEM, r#"{"id":"entity-1"}"#);
        let batch = builder.render();
        assert_eq!(batch.0[0].op, StatementOp::Delete);
        let text = batch.0[0].to_string();
        assert!(text.starts_with("DELETE {"));
        assert!(text.contains(r#"\"id\":\"entity-1\""#));
    }

    #[test]
    fn test_display_escapes_injection_attempt() {
        let node = NodePath::new("/objects/scape/entities/e");
        let mut builder = UpdateBuilder::new();
        builder.add_property(
            &node,
            vocab::HAS_FILE_NAME,
            "evil\"} WHERE {}; DELETE {<x> <y> \"z",
        );
        let text = builder.render().0[0].to_string();
        // the closing quote of the literal is the one we wrote, not the payload's
        assert!(text.contains(r#"evil\"} WHERE {}; DELETE {<x> <y> \"z"#));
    }
}
