//! AST construction helpers.

use crate::types::*;

/// Helper functions for constructing JSONPath AST nodes programmatically.
pub struct Ast;

impl Ast {
    /// Create a path from segments.
    pub fn path(segments: Vec<Segment>) -> Path {
        Path::new(segments)
    }

    /// Create a child segment from selectors.
    pub fn segment(selectors: Vec<Selector>) -> Segment {
        Segment::new(selectors, false)
    }

    /// Create a descendant segment from selectors.
    pub fn descendant(selectors: Vec<Selector>) -> Segment {
        Segment::new(selectors, true)
    }

    /// Create a named selector.
    pub fn name(name: impl Into<String>) -> Selector {
        Selector::Name(name.into())
    }

    /// Create an index selector.
    pub fn index(index: i64) -> Selector {
        Selector::Index(index)
    }

    /// Create a slice selector.
    pub fn slice(start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Selector {
        Selector::Slice { start, end, step }
    }

    /// Create a wildcard selector.
    pub fn wildcard() -> Selector {
        Selector::Wildcard
    }

    /// Create a filter selector.
    pub fn filter(expr: FilterExpr) -> Selector {
        Selector::Filter(expr)
    }

    /// Create a parent selector (`^`).
    pub fn parent() -> Selector {
        Selector::Parent
    }

    /// Create a key-name selector (`~`).
    pub fn key_name() -> Selector {
        Selector::KeyName
    }

    /// Create a comparison expression.
    pub fn compare(op: CompareOp, left: Operand, right: Operand) -> FilterExpr {
        FilterExpr::Compare { op, left, right }
    }

    /// Create a conjunction.
    pub fn and(left: FilterExpr, right: FilterExpr) -> FilterExpr {
        FilterExpr::And(Box::new(left), Box::new(right))
    }

    /// Create a disjunction.
    pub fn or(left: FilterExpr, right: FilterExpr) -> FilterExpr {
        FilterExpr::Or(Box::new(left), Box::new(right))
    }

    /// Create a negation.
    pub fn not(expr: FilterExpr) -> FilterExpr {
        FilterExpr::Not(Box::new(expr))
    }

    /// Create a relative embedded path (`@...`).
    pub fn relative(segments: Vec<Segment>) -> EmbeddedPath {
        EmbeddedPath {
            root: PathRoot::Current,
            segments,
            offset: 0,
        }
    }

    /// Create an absolute embedded path (`$...`).
    pub fn absolute(segments: Vec<Segment>) -> EmbeddedPath {
        EmbeddedPath {
            root: PathRoot::Root,
            segments,
            offset: 0,
        }
    }

    /// Create a literal operand.
    pub fn literal(literal: Literal) -> Operand {
        Operand::Literal(literal)
    }
}
