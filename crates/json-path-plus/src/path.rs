//! Compilation surface: options, the compiled path handle and query
//! results.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::adapter::DocumentNode;
use crate::error::{CompileError, QueryError};
use crate::eval::{Cursor, Emit, EvalState};
use crate::functions::RegexCache;
use crate::parser;
use crate::typer;
use crate::types::Path;

/// Regex backend selector. A single backend is currently shipped (the
/// `regex` crate, a superset of I-Regexp); the knob exists so the option
/// surface stays stable if another is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegexEngine {
    #[default]
    Standard,
}

/// Compilation and evaluation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOptions {
    /// Reject every extension construct at compile time and restrict the
    /// grammar to RFC 9535.
    pub strict_rfc: bool,
    /// Bound on descendant traversal depth; exceeding it aborts the query.
    pub max_descendant_depth: Option<usize>,
    /// Regex backend for `match`/`search`.
    pub regex_engine: RegexEngine,
}

/// Compile a path expression.
///
/// Parses, type-checks the filter expressions, and precompiles literal
/// regex patterns.
pub fn compile(text: &str, options: QueryOptions) -> Result<CompiledPath, CompileError> {
    let ast = parser::parse(text, options.strict_rfc)?;
    let regexes = typer::check(&ast, options.strict_rfc)?;
    Ok(CompiledPath {
        source: text.to_string(),
        ast,
        options,
        regexes,
    })
}

/// An immutable compiled path expression.
///
/// May be shared across threads and queried concurrently as long as the
/// document is not mutated during a query.
#[derive(Debug, Clone)]
pub struct CompiledPath {
    source: String,
    ast: Path,
    options: QueryOptions,
    regexes: RegexCache,
}

impl CompiledPath {
    /// Evaluate against a document without parent tracking. The parent
    /// selector `^` and `@parent` resolve to nothing; use
    /// [`query_with_parent`](Self::query_with_parent) when the expression
    /// relies on them.
    pub fn query<'a, N: DocumentNode>(&self, doc: &'a N) -> Result<NodeList<'a, N>, QueryError> {
        self.run(doc, false)
    }

    /// Evaluate against a document with parent tracking enabled.
    pub fn query_with_parent<'a, N: DocumentNode>(
        &self,
        doc: &'a N,
    ) -> Result<NodeList<'a, N>, QueryError> {
        self.run(doc, true)
    }

    /// The original expression text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled AST.
    pub fn ast(&self) -> &Path {
        &self.ast
    }

    /// The options the expression was compiled with.
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    fn run<'a, N: DocumentNode>(
        &self,
        doc: &'a N,
        track_parents: bool,
    ) -> Result<NodeList<'a, N>, QueryError> {
        let root = Cursor::root(doc);
        let state = EvalState {
            root,
            track_parents,
            max_depth: self.options.max_descendant_depth,
            regexes: &self.regexes,
        };
        let matches = state
            .eval(&self.ast)?
            .into_iter()
            .map(|emit| match emit {
                Emit::Node(cursor) => NodeMatch {
                    cursor,
                    key_name: None,
                },
                Emit::Key { name, of } => NodeMatch {
                    cursor: of,
                    key_name: Some(name),
                },
            })
            .collect();
        Ok(NodeList { matches })
    }
}

impl fmt::Display for CompiledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// One produced match: a document node, or the synthetic key string emitted
/// by the `~` selector.
#[derive(Debug)]
pub struct NodeMatch<'a, N: DocumentNode> {
    cursor: Rc<Cursor<'a, N>>,
    key_name: Option<String>,
}

impl<'a, N: DocumentNode> NodeMatch<'a, N> {
    /// The matched document node; `None` for a `~` key match.
    pub fn node(&self) -> Option<&'a N> {
        if self.key_name.is_none() {
            Some(self.cursor.node)
        } else {
            None
        }
    }

    /// The key string produced by `~`, if this is a key match.
    pub fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }

    /// Normalized path of the matched node. For a `~` match this is the
    /// path of the node whose key it names.
    pub fn path(&self) -> String {
        self.cursor.normalized_path()
    }

    /// Mapping key via which the node was reached, `""` if none.
    pub fn key(&self) -> &str {
        self.cursor.key()
    }

    /// Sequence index via which the node was reached, -1 if none.
    pub fn index(&self) -> i64 {
        self.cursor.index()
    }
}

/// An ordered list of matches.
#[derive(Debug)]
pub struct NodeList<'a, N: DocumentNode> {
    matches: Vec<NodeMatch<'a, N>>,
}

impl<'a, N: DocumentNode> NodeList<'a, N> {
    /// Matched document nodes, skipping `~` key matches.
    pub fn nodes(&self) -> Vec<&'a N> {
        self.matches.iter().filter_map(NodeMatch::node).collect()
    }

    /// Normalized paths of all matches.
    pub fn paths(&self) -> Vec<String> {
        self.matches.iter().map(NodeMatch::path).collect()
    }
}

impl<'a, N: DocumentNode> Deref for NodeList<'a, N> {
    type Target = [NodeMatch<'a, N>];

    fn deref(&self) -> &Self::Target {
        &self.matches
    }
}

impl<'a, N: DocumentNode> IntoIterator for NodeList<'a, N> {
    type Item = NodeMatch<'a, N>;
    type IntoIter = std::vec::IntoIter<NodeMatch<'a, N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'l, 'a, N: DocumentNode> IntoIterator for &'l NodeList<'a, N> {
    type Item = &'l NodeMatch<'a, N>;
    type IntoIter = std::slice::Iter<'l, NodeMatch<'a, N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}
