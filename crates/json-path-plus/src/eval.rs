//! Segment-loop evaluator.
//!
//! Evaluation walks the segments left to right over an evolving nodelist of
//! cursors. A [`Cursor`] pairs a document node with the traversal step that
//! reached it and an `Rc` link to its parent cursor, realizing the parent
//! stack of the design: parents, traversal keys and normalized paths all
//! come out of the chain, and chain prefixes are shared between siblings.

use std::rc::Rc;

use crate::adapter::{DocumentNode, NodeKind};
use crate::error::QueryError;
use crate::filter;
use crate::functions::RegexCache;
use crate::types::{Path, Segment, Selector};
use crate::util;

/// The traversal step that reached a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    Root,
    Key(String),
    Index(usize),
}

/// A document node plus the context it was reached in.
#[derive(Debug)]
pub(crate) struct Cursor<'a, N> {
    pub node: &'a N,
    pub parent: Option<Rc<Cursor<'a, N>>>,
    pub step: Step,
}

impl<'a, N> Cursor<'a, N> {
    pub fn root(node: &'a N) -> Rc<Self> {
        Rc::new(Self {
            node,
            parent: None,
            step: Step::Root,
        })
    }

    pub fn child(parent: &Rc<Self>, node: &'a N, step: Step) -> Rc<Self> {
        Rc::new(Self {
            node,
            parent: Some(Rc::clone(parent)),
            step,
        })
    }

    /// Mapping key via which this node was reached, `""` if none.
    pub fn key(&self) -> &str {
        match &self.step {
            Step::Key(key) => key,
            _ => "",
        }
    }

    /// Sequence index via which this node was reached, -1 if none.
    pub fn index(&self) -> i64 {
        match self.step {
            Step::Index(index) => index as i64,
            _ => -1,
        }
    }

    /// Key or stringified index of the traversal step; `None` at the root.
    pub fn step_name(&self) -> Option<String> {
        match &self.step {
            Step::Key(key) => Some(key.clone()),
            Step::Index(index) => Some(index.to_string()),
            Step::Root => None,
        }
    }

    /// Normalized path from the root to this node: `$['store']['book'][0]`.
    pub fn normalized_path(&self) -> String {
        let mut steps: Vec<&Step> = Vec::new();
        let mut current = self;
        loop {
            steps.push(&current.step);
            match &current.parent {
                Some(parent) => current = parent.as_ref(),
                None => break,
            }
        }
        steps.reverse();

        let mut out = String::from("$");
        for step in steps {
            match step {
                Step::Root => {}
                Step::Key(key) => out.push_str(&util::normalized_key(key)),
                Step::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

/// A produced nodelist entry: a document node, or the synthetic key string
/// emitted by the `~` selector.
pub(crate) enum Emit<'a, N> {
    Node(Rc<Cursor<'a, N>>),
    Key {
        name: String,
        of: Rc<Cursor<'a, N>>,
    },
}

/// Per-query evaluation state.
pub(crate) struct EvalState<'a, 'p, N> {
    pub root: Rc<Cursor<'a, N>>,
    pub track_parents: bool,
    pub max_depth: Option<usize>,
    pub regexes: &'p RegexCache,
}

impl<'a, 'p, N: DocumentNode> EvalState<'a, 'p, N> {
    /// Evaluate a full path starting at the query root.
    pub fn eval(&self, path: &Path) -> Result<Vec<Emit<'a, N>>, QueryError> {
        let mut nodelist = vec![Rc::clone(&self.root)];
        for segment in &path.segments {
            // `~` is terminal; the parser guarantees nothing follows it.
            if segment
                .selectors
                .iter()
                .any(|s| matches!(s, Selector::KeyName))
            {
                let mut out = Vec::new();
                for cursor in &nodelist {
                    if let Some(name) = cursor.step_name() {
                        out.push(Emit::Key {
                            name,
                            of: Rc::clone(cursor),
                        });
                    }
                }
                return Ok(out);
            }
            nodelist = self.eval_segment(segment, nodelist)?;
        }
        Ok(nodelist.into_iter().map(Emit::Node).collect())
    }

    /// Evaluate embedded-path segments from an arbitrary start cursor.
    pub fn eval_segments(
        &self,
        segments: &[Segment],
        start: Rc<Cursor<'a, N>>,
    ) -> Result<Vec<Rc<Cursor<'a, N>>>, QueryError> {
        let mut nodelist = vec![start];
        for segment in segments {
            nodelist = self.eval_segment(segment, nodelist)?;
        }
        Ok(nodelist)
    }

    fn eval_segment(
        &self,
        segment: &Segment,
        input: Vec<Rc<Cursor<'a, N>>>,
    ) -> Result<Vec<Rc<Cursor<'a, N>>>, QueryError> {
        let nodes = if segment.descendant {
            self.descend(input)?
        } else {
            input
        };

        let mut out = Vec::new();
        for cursor in &nodes {
            for selector in &segment.selectors {
                self.apply_selector(selector, cursor, &mut out)?;
            }
        }

        if segment
            .selectors
            .iter()
            .any(|s| matches!(s, Selector::Parent))
        {
            // Siblings share a parent; keep the first of each run.
            out.dedup_by(|a, b| std::ptr::eq(a.node, b.node));
        }
        Ok(out)
    }

    /// Expand a nodelist to all descendants in document order, self first.
    fn descend(
        &self,
        input: Vec<Rc<Cursor<'a, N>>>,
    ) -> Result<Vec<Rc<Cursor<'a, N>>>, QueryError> {
        let mut out = Vec::new();
        for cursor in input {
            self.descend_into(cursor, 0, &mut out)?;
        }
        Ok(out)
    }

    fn descend_into(
        &self,
        cursor: Rc<Cursor<'a, N>>,
        depth: usize,
        out: &mut Vec<Rc<Cursor<'a, N>>>,
    ) -> Result<(), QueryError> {
        if let Some(max) = self.max_depth {
            if depth > max {
                return Err(QueryError::DepthExceeded(max));
            }
        }
        out.push(Rc::clone(&cursor));
        for child in self.children(&cursor)? {
            self.descend_into(child, depth + 1, out)?;
        }
        Ok(())
    }

    /// Ordered children of a container node; empty for scalars.
    pub fn children(
        &self,
        cursor: &Rc<Cursor<'a, N>>,
    ) -> Result<Vec<Rc<Cursor<'a, N>>>, QueryError> {
        let node = cursor.node;
        let mut out = Vec::new();
        match node.kind() {
            NodeKind::Mapping => {
                let entries = node.mapping_entries();
                if entries.len() != node.mapping_len() {
                    return Err(QueryError::Adapter(
                        "mapping entry count does not match mapping_len".to_string(),
                    ));
                }
                for (key, value) in entries {
                    out.push(Cursor::child(cursor, value, Step::Key(key.to_string())));
                }
            }
            NodeKind::Sequence => {
                for index in 0..node.sequence_len() {
                    let value = node.sequence_at(index).ok_or_else(|| {
                        QueryError::Adapter(format!("sequence element {index} out of range"))
                    })?;
                    out.push(Cursor::child(cursor, value, Step::Index(index)));
                }
            }
            _ => {}
        }
        Ok(out)
    }

    fn apply_selector(
        &self,
        selector: &Selector,
        cursor: &Rc<Cursor<'a, N>>,
        out: &mut Vec<Rc<Cursor<'a, N>>>,
    ) -> Result<(), QueryError> {
        match selector {
            Selector::Name(name) => {
                if cursor.node.kind() == NodeKind::Mapping {
                    if let Some(child) = cursor.node.mapping_get(name) {
                        out.push(Cursor::child(cursor, child, Step::Key(name.clone())));
                    }
                }
            }
            Selector::Index(index) => {
                if cursor.node.kind() == NodeKind::Sequence {
                    let len = cursor.node.sequence_len() as i64;
                    let resolved = if *index < 0 { len + index } else { *index };
                    if resolved >= 0 && resolved < len {
                        let child = cursor.node.sequence_at(resolved as usize).ok_or_else(
                            || {
                                QueryError::Adapter(format!(
                                    "sequence element {resolved} out of range"
                                ))
                            },
                        )?;
                        out.push(Cursor::child(cursor, child, Step::Index(resolved as usize)));
                    }
                }
            }
            Selector::Slice { start, end, step } => {
                if cursor.node.kind() == NodeKind::Sequence {
                    let len = cursor.node.sequence_len() as i64;
                    let step = step.unwrap_or(1);
                    let (lower, upper) = slice_bounds(*start, *end, step, len);
                    let mut index = if step > 0 { lower } else { upper };
                    while (step > 0 && index < upper) || (step < 0 && index > lower) {
                        let child =
                            cursor.node.sequence_at(index as usize).ok_or_else(|| {
                                QueryError::Adapter(format!(
                                    "sequence element {index} out of range"
                                ))
                            })?;
                        out.push(Cursor::child(cursor, child, Step::Index(index as usize)));
                        index += step;
                    }
                }
            }
            Selector::Wildcard => {
                out.extend(self.children(cursor)?);
            }
            Selector::Filter(expr) => {
                for child in self.children(cursor)? {
                    if filter::eval_expr(expr, &child, self)? {
                        out.push(child);
                    }
                }
            }
            Selector::Parent => {
                if self.track_parents {
                    if let Some(parent) = &cursor.parent {
                        out.push(Rc::clone(parent));
                    }
                }
            }
            // `~` never reaches selector application; `eval` intercepts it.
            Selector::KeyName => {}
        }
        Ok(())
    }
}

/// RFC 9535 slice bounds: returns `(lower, upper)`; iteration runs upward
/// from `lower` for positive steps and downward from `upper` for negative
/// ones.
fn slice_bounds(start: Option<i64>, end: Option<i64>, step: i64, len: i64) -> (i64, i64) {
    let (start, end) = if step >= 0 {
        (start.unwrap_or(0), end.unwrap_or(len))
    } else {
        (start.unwrap_or(len - 1), end.unwrap_or(-len - 1))
    };
    let normalize = |i: i64| if i >= 0 { i } else { len + i };
    let start = normalize(start);
    let end = normalize(end);
    if step >= 0 {
        (start.clamp(0, len), end.clamp(0, len))
    } else {
        (end.clamp(-1, len - 1), start.clamp(-1, len - 1))
    }
}
