//! Filter sub-evaluator.
//!
//! Evaluates a [`FilterExpr`] for one candidate cursor. Values flow through
//! a small algebra: a scalar, a nodelist, or "nothing". Comparison projects
//! each side to at most one scalar; a nodelist projects through its single
//! node, anything else is "nothing". Any comparison involving "nothing" is
//! false, except `!=` which is true when exactly one side is "nothing".

use std::rc::Rc;

use crate::adapter::{DocumentNode, NodeKind};
use crate::error::QueryError;
use crate::eval::{Cursor, EvalState, Step};
use crate::functions;
use crate::types::{
    CompareOp, ContextVar, EmbeddedPath, FilterExpr, FnCall, Literal, Operand, PathRoot,
};

/// Scalar values of the filter algebra.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// A filter operand value: nothing, a scalar, or a nodelist.
pub(crate) enum FilterVal<'a, N> {
    Nothing,
    Scalar(Scalar),
    Nodes(Vec<Rc<Cursor<'a, N>>>),
}

/// Evaluate a filter expression with `cursor` as `@`.
pub(crate) fn eval_expr<'a, N: DocumentNode>(
    expr: &FilterExpr,
    cursor: &Rc<Cursor<'a, N>>,
    state: &EvalState<'a, '_, N>,
) -> Result<bool, QueryError> {
    match expr {
        FilterExpr::Or(left, right) => {
            Ok(eval_expr(left, cursor, state)? || eval_expr(right, cursor, state)?)
        }
        FilterExpr::And(left, right) => {
            Ok(eval_expr(left, cursor, state)? && eval_expr(right, cursor, state)?)
        }
        FilterExpr::Not(inner) => Ok(!eval_expr(inner, cursor, state)?),
        FilterExpr::Compare { op, left, right } => {
            let left = project(eval_operand(left, cursor, state)?)?;
            let right = project(eval_operand(right, cursor, state)?)?;
            Ok(compare(*op, left, right))
        }
        FilterExpr::Exists(path) => Ok(!eval_embedded(path, cursor, state)?.is_empty()),
        FilterExpr::Test(call) => match eval_call(call, cursor, state)? {
            FilterVal::Scalar(Scalar::Bool(b)) => Ok(b),
            _ => Ok(false),
        },
    }
}

fn eval_operand<'a, N: DocumentNode>(
    operand: &Operand,
    cursor: &Rc<Cursor<'a, N>>,
    state: &EvalState<'a, '_, N>,
) -> Result<FilterVal<'a, N>, QueryError> {
    match operand {
        Operand::Literal(literal) => Ok(FilterVal::Scalar(match literal {
            Literal::Null => Scalar::Null,
            Literal::Bool(b) => Scalar::Bool(*b),
            Literal::Int(i) => Scalar::Int(*i),
            Literal::Float(f) => Scalar::Float(*f),
            Literal::Str(s) => Scalar::Str(s.clone()),
        })),
        Operand::Var(var) => Ok(eval_var(*var, cursor, state)),
        Operand::Path(path) => Ok(FilterVal::Nodes(eval_embedded(path, cursor, state)?)),
        Operand::Call(call) => eval_call(call, cursor, state),
    }
}

fn eval_var<'a, N: DocumentNode>(
    var: ContextVar,
    cursor: &Rc<Cursor<'a, N>>,
    state: &EvalState<'a, '_, N>,
) -> FilterVal<'a, N> {
    match var {
        ContextVar::Property => match &cursor.step {
            Step::Key(key) => FilterVal::Scalar(Scalar::Str(key.clone())),
            Step::Index(index) => FilterVal::Scalar(Scalar::Str(index.to_string())),
            Step::Root => FilterVal::Nothing,
        },
        ContextVar::Index => FilterVal::Scalar(Scalar::Int(cursor.index())),
        ContextVar::Path => FilterVal::Scalar(Scalar::Str(cursor.normalized_path())),
        ContextVar::Parent => {
            if !state.track_parents {
                return FilterVal::Nothing;
            }
            match &cursor.parent {
                Some(parent) => FilterVal::Nodes(vec![Rc::clone(parent)]),
                None => FilterVal::Nothing,
            }
        }
        // The traversal step of the container, never accumulated further up.
        ContextVar::ParentProperty => match &cursor.parent {
            Some(parent) => match &parent.step {
                Step::Key(key) => FilterVal::Scalar(Scalar::Str(key.clone())),
                Step::Index(index) => FilterVal::Scalar(Scalar::Str(index.to_string())),
                Step::Root => FilterVal::Scalar(Scalar::Str(String::new())),
            },
            None => FilterVal::Scalar(Scalar::Str(String::new())),
        },
    }
}

fn eval_embedded<'a, N: DocumentNode>(
    path: &EmbeddedPath,
    cursor: &Rc<Cursor<'a, N>>,
    state: &EvalState<'a, '_, N>,
) -> Result<Vec<Rc<Cursor<'a, N>>>, QueryError> {
    let start = match path.root {
        PathRoot::Current => Rc::clone(cursor),
        PathRoot::Root | PathRoot::RootVar => Rc::clone(&state.root),
    };
    state.eval_segments(&path.segments, start)
}

fn eval_call<'a, N: DocumentNode>(
    call: &FnCall,
    cursor: &Rc<Cursor<'a, N>>,
    state: &EvalState<'a, '_, N>,
) -> Result<FilterVal<'a, N>, QueryError> {
    match call.name.as_str() {
        "length" => length_of(eval_operand(&call.args[0], cursor, state)?),
        "count" => match eval_operand(&call.args[0], cursor, state)? {
            FilterVal::Nodes(nodes) => Ok(FilterVal::Scalar(Scalar::Int(nodes.len() as i64))),
            _ => Ok(FilterVal::Nothing),
        },
        "match" => regex_test(call, cursor, state, true),
        "search" => regex_test(call, cursor, state, false),
        "value" => match eval_operand(&call.args[0], cursor, state)? {
            FilterVal::Nodes(nodes) if nodes.len() == 1 => {
                Ok(match scalar_of_node(nodes[0].node)? {
                    Some(scalar) => FilterVal::Scalar(scalar),
                    None => FilterVal::Nothing,
                })
            }
            _ => Ok(FilterVal::Nothing),
        },
        // The typer rejects unknown names, so this is one of the type tests.
        name => type_test(name, eval_operand(&call.args[0], cursor, state)?),
    }
}

/// `length()`: Unicode scalar count for strings, element count for
/// containers, "nothing" for anything else.
fn length_of<'a, N: DocumentNode>(
    value: FilterVal<'a, N>,
) -> Result<FilterVal<'a, N>, QueryError> {
    Ok(match value {
        FilterVal::Scalar(Scalar::Str(s)) => {
            FilterVal::Scalar(Scalar::Int(s.chars().count() as i64))
        }
        FilterVal::Scalar(_) | FilterVal::Nothing => FilterVal::Nothing,
        FilterVal::Nodes(nodes) => {
            if nodes.len() != 1 {
                return Ok(FilterVal::Nothing);
            }
            let node = nodes[0].node;
            match node.kind() {
                NodeKind::String => {
                    let s = node
                        .as_str()
                        .ok_or_else(|| adapter_mismatch(NodeKind::String))?;
                    FilterVal::Scalar(Scalar::Int(s.chars().count() as i64))
                }
                NodeKind::Sequence => {
                    FilterVal::Scalar(Scalar::Int(node.sequence_len() as i64))
                }
                NodeKind::Mapping => FilterVal::Scalar(Scalar::Int(node.mapping_len() as i64)),
                _ => FilterVal::Nothing,
            }
        }
    })
}

fn regex_test<'a, N: DocumentNode>(
    call: &FnCall,
    cursor: &Rc<Cursor<'a, N>>,
    state: &EvalState<'a, '_, N>,
    anchored: bool,
) -> Result<FilterVal<'a, N>, QueryError> {
    let subject = project(eval_operand(&call.args[0], cursor, state)?)?;
    let pattern = project(eval_operand(&call.args[1], cursor, state)?)?;
    let (Some(Scalar::Str(subject)), Some(Scalar::Str(pattern))) = (subject, pattern) else {
        return Ok(FilterVal::Scalar(Scalar::Bool(false)));
    };
    let matched = match state.regexes.get(anchored, &pattern) {
        Some(regex) => regex.is_match(&subject),
        // A dynamic pattern: compile per evaluation.
        None => functions::compile_pattern(anchored, &pattern)
            .map_err(|err| QueryError::Regex {
                pattern: pattern.clone(),
                message: err.to_string(),
            })?
            .is_match(&subject),
    };
    Ok(FilterVal::Scalar(Scalar::Bool(matched)))
}

/// The `isX` type tests. A multi-node or empty nodelist satisfies none of
/// them.
fn type_test<'a, N: DocumentNode>(
    name: &str,
    value: FilterVal<'a, N>,
) -> Result<FilterVal<'a, N>, QueryError> {
    let kind = match &value {
        FilterVal::Scalar(Scalar::Null) => Some(NodeKind::Null),
        FilterVal::Scalar(Scalar::Bool(_)) => Some(NodeKind::Bool),
        FilterVal::Scalar(Scalar::Int(_)) => Some(NodeKind::Int),
        FilterVal::Scalar(Scalar::Float(_)) => Some(NodeKind::Float),
        FilterVal::Scalar(Scalar::Str(_)) => Some(NodeKind::String),
        FilterVal::Nodes(nodes) if nodes.len() == 1 => Some(nodes[0].node.kind()),
        _ => None,
    };
    let result = match (name, kind) {
        (_, None) => false,
        ("isNull", Some(kind)) => kind == NodeKind::Null,
        ("isBoolean", Some(kind)) => kind == NodeKind::Bool,
        ("isNumber", Some(kind)) => matches!(kind, NodeKind::Int | NodeKind::Float),
        ("isInteger", Some(kind)) => kind == NodeKind::Int,
        ("isString", Some(kind)) => kind == NodeKind::String,
        ("isArray", Some(kind)) => kind == NodeKind::Sequence,
        ("isObject", Some(kind)) => kind == NodeKind::Mapping,
        _ => false,
    };
    Ok(FilterVal::Scalar(Scalar::Bool(result)))
}

/// Project a filter value to at most one scalar.
fn project<'a, N: DocumentNode>(
    value: FilterVal<'a, N>,
) -> Result<Option<Scalar>, QueryError> {
    match value {
        FilterVal::Nothing => Ok(None),
        FilterVal::Scalar(scalar) => Ok(Some(scalar)),
        FilterVal::Nodes(nodes) => {
            if nodes.len() != 1 {
                return Ok(None);
            }
            scalar_of_node(nodes[0].node)
        }
    }
}

/// Scalar value of a document node; `None` for containers.
fn scalar_of_node<N: DocumentNode>(node: &N) -> Result<Option<Scalar>, QueryError> {
    Ok(Some(match node.kind() {
        NodeKind::Null => Scalar::Null,
        NodeKind::Bool => Scalar::Bool(
            node.as_bool()
                .ok_or_else(|| adapter_mismatch(NodeKind::Bool))?,
        ),
        NodeKind::Int => Scalar::Int(
            node.as_int()
                .ok_or_else(|| adapter_mismatch(NodeKind::Int))?,
        ),
        NodeKind::Float => Scalar::Float(
            node.as_float()
                .ok_or_else(|| adapter_mismatch(NodeKind::Float))?,
        ),
        NodeKind::String => Scalar::Str(
            node.as_str()
                .ok_or_else(|| adapter_mismatch(NodeKind::String))?
                .to_string(),
        ),
        NodeKind::Sequence | NodeKind::Mapping => return Ok(None),
    }))
}

fn adapter_mismatch(kind: NodeKind) -> QueryError {
    QueryError::Adapter(format!("node of kind {kind:?} has no matching value"))
}

/// Comparison over projected operands.
fn compare(op: CompareOp, left: Option<Scalar>, right: Option<Scalar>) -> bool {
    match (left, right) {
        (None, None) => false,
        (None, Some(_)) | (Some(_), None) => op == CompareOp::Ne,
        (Some(left), Some(right)) => compare_scalars(op, &left, &right),
    }
}

fn compare_scalars(op: CompareOp, left: &Scalar, right: &Scalar) -> bool {
    use std::cmp::Ordering;

    // Null compares equal only to null and never orders.
    if let (Scalar::Null, Scalar::Null) = (left, right) {
        return op == CompareOp::Eq;
    }

    let ordering: Option<Ordering> = match (left, right) {
        (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
        (Scalar::Int(a), Scalar::Float(b)) => (*a as f64).partial_cmp(b),
        (Scalar::Float(a), Scalar::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Scalar::Float(a), Scalar::Float(b)) => a.partial_cmp(b),
        (Scalar::Str(a), Scalar::Str(b)) => Some(a.cmp(b)),
        (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    };

    match ordering {
        Some(ordering) => match op {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => matches!(ordering, Ordering::Less | Ordering::Equal),
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => matches!(ordering, Ordering::Greater | Ordering::Equal),
        },
        // Cross-kind: unequal, never ordered.
        None => op == CompareOp::Ne,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_cmp(op: CompareOp, a: Scalar, b: Scalar) -> bool {
        compare(op, Some(a), Some(b))
    }

    #[test]
    fn numeric_comparison_unifies_int_and_float() {
        assert!(scalar_cmp(CompareOp::Eq, Scalar::Int(1), Scalar::Float(1.0)));
        assert!(scalar_cmp(CompareOp::Lt, Scalar::Int(1), Scalar::Float(1.5)));
        assert!(scalar_cmp(CompareOp::Gt, Scalar::Float(2.5), Scalar::Int(2)));
        assert!(!scalar_cmp(CompareOp::Ne, Scalar::Int(1), Scalar::Float(1.0)));
    }

    #[test]
    fn string_comparison_uses_codepoint_order() {
        assert!(scalar_cmp(
            CompareOp::Lt,
            Scalar::Str("a".into()),
            Scalar::Str("b".into())
        ));
        assert!(scalar_cmp(
            CompareOp::Lt,
            Scalar::Str("Z".into()),
            Scalar::Str("a".into())
        ));
    }

    #[test]
    fn bool_comparison_orders_false_before_true() {
        assert!(scalar_cmp(
            CompareOp::Lt,
            Scalar::Bool(false),
            Scalar::Bool(true)
        ));
        assert!(!scalar_cmp(
            CompareOp::Lt,
            Scalar::Bool(true),
            Scalar::Bool(false)
        ));
    }

    #[test]
    fn null_is_equal_only_to_null_and_never_ordered() {
        assert!(scalar_cmp(CompareOp::Eq, Scalar::Null, Scalar::Null));
        assert!(!scalar_cmp(CompareOp::Ne, Scalar::Null, Scalar::Null));
        assert!(!scalar_cmp(CompareOp::Le, Scalar::Null, Scalar::Null));
        assert!(!scalar_cmp(CompareOp::Eq, Scalar::Null, Scalar::Int(0)));
        assert!(scalar_cmp(CompareOp::Ne, Scalar::Null, Scalar::Int(0)));
    }

    #[test]
    fn cross_kind_is_unequal_and_unordered() {
        assert!(!scalar_cmp(
            CompareOp::Eq,
            Scalar::Int(1),
            Scalar::Str("1".into())
        ));
        assert!(scalar_cmp(
            CompareOp::Ne,
            Scalar::Int(1),
            Scalar::Str("1".into())
        ));
        assert!(!scalar_cmp(
            CompareOp::Lt,
            Scalar::Int(1),
            Scalar::Str("1".into())
        ));
        assert!(!scalar_cmp(
            CompareOp::Ge,
            Scalar::Bool(true),
            Scalar::Int(1)
        ));
    }

    #[test]
    fn nothing_comparisons() {
        // Both sides nothing: every comparison is false.
        for op in [
            CompareOp::Eq,
            CompareOp::Ne,
            CompareOp::Lt,
            CompareOp::Le,
            CompareOp::Gt,
            CompareOp::Ge,
        ] {
            assert!(!compare(op, None, None));
        }
        // Exactly one side nothing: only `!=` holds.
        assert!(compare(CompareOp::Ne, None, Some(Scalar::Int(1))));
        assert!(!compare(CompareOp::Eq, None, Some(Scalar::Int(1))));
        assert!(!compare(CompareOp::Lt, None, Some(Scalar::Int(1))));
    }
}
