//! JSONPath AST types based on RFC 9535, with the JSONPath Plus extensions.
//!
//! The AST is immutable after compilation and owns all of its data; nothing
//! borrows from the source expression text.

/// Selector types for JSONPath.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Named selector for member access: `.name`, `['key']`
    Name(String),
    /// Index selector for sequence element access: `[0]`, `[-1]`
    Index(i64),
    /// Slice selector: `[start:end:step]`
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
    /// Wildcard selector: `.*`, `[*]`
    Wildcard,
    /// Filter selector: `[?(@.price < 10)]`
    Filter(FilterExpr),
    /// Parent selector `^` (extension).
    Parent,
    /// Key-name selector `~` (extension, terminal).
    KeyName,
}

/// Path segment containing one or more selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Selectors in this segment, in source order.
    pub selectors: Vec<Selector>,
    /// Whether this is a descendant segment (`..`).
    pub descendant: bool,
}

impl Segment {
    pub fn new(selectors: Vec<Selector>, descendant: bool) -> Self {
        Self {
            selectors,
            descendant,
        }
    }
}

/// Complete JSONPath expression, rooted at `$`.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Path segments.
    pub segments: Vec<Segment>,
}

impl Path {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

/// Comparison operators. `===` and `!==` parse to `Eq`/`Ne`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq, // ==
    Ne, // !=
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=
}

/// Filter expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// `a || b`
    Or(Box<FilterExpr>, Box<FilterExpr>),
    /// `a && b`
    And(Box<FilterExpr>, Box<FilterExpr>),
    /// `!a`
    Not(Box<FilterExpr>),
    /// `left op right`
    Compare {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    /// Existence test: `@.name`, `$.defaults.kind`
    Exists(EmbeddedPath),
    /// Boolean-returning function used as a test: `match(@.id, "[a-z]+")`
    Test(FnCall),
}

/// A value-producing or nodes-producing filter operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Literal value: `"string"`, `42`, `1.5`, `true`, `null`
    Literal(Literal),
    /// Embedded path: `@.name`, `$.users[0]`, `@root.defaultType`
    Path(EmbeddedPath),
    /// Context variable: `@property`, `@index`, ...
    Var(ContextVar),
    /// Function call: `length(@)`
    Call(FnCall),
}

/// Literal values in filters.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Context variables resolving to information about the candidate node
/// (extensions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextVar {
    /// `@property` — key or stringified index via which `@` was reached.
    Property,
    /// `@index` — sequence index of `@`, or -1.
    Index,
    /// `@path` — normalized path of `@`.
    Path,
    /// `@parent` — the container the filter iterates over.
    Parent,
    /// `@parentProperty` — traversal step of the container.
    ParentProperty,
}

/// Root of an embedded path inside a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRoot {
    /// `@` — the candidate node.
    Current,
    /// `$` — the query root.
    Root,
    /// `@root` — the query root (extension spelling).
    RootVar,
}

/// A relative or absolute path embedded in a filter expression.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedPath {
    pub root: PathRoot,
    pub segments: Vec<Segment>,
    /// Source byte offset, for diagnostics.
    pub offset: usize,
}

impl EmbeddedPath {
    /// A singular query selects at most one node: name and index selectors
    /// only, one per segment, no descendants.
    pub fn is_singular(&self) -> bool {
        self.segments.iter().all(|segment| {
            !segment.descendant
                && segment.selectors.len() == 1
                && matches!(
                    segment.selectors[0],
                    Selector::Name(_) | Selector::Index(_)
                )
        })
    }
}

/// Function call inside a filter expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FnCall {
    pub name: String,
    pub args: Vec<Operand>,
    /// Source byte offset, for diagnostics.
    pub offset: usize,
}
