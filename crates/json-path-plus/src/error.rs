//! Error surface of the engine.
//!
//! Compilation problems are [`CompileError`]s carrying a source byte offset;
//! runtime problems abort the query as [`QueryError`]s. Missing data is
//! never an error: absent keys, out-of-range indices and mismatched
//! comparisons yield empty nodelists or false.

use thiserror::Error;

/// Lexical error kinds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("invalid number literal")]
    InvalidNumber,
    #[error("unknown context variable '@{0}'")]
    UnknownContextVariable(String),
}

/// Syntactic error kinds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expected root identifier '$'")]
    ExpectedRoot,
    #[error("unexpected token {0}")]
    UnexpectedToken(String),
    #[error("missing closing bracket")]
    MissingBracket,
    #[error("slice step cannot be zero")]
    SliceStepZero,
    #[error("invalid filter expression")]
    InvalidFilter,
    #[error("the key-name selector '~' must be the final segment")]
    KeyNameNotTerminal,
}

/// Error produced while compiling a path expression.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("lex error at offset {1}: {0}")]
    Lex(LexErrorKind, usize),
    #[error("parse error at offset {1}: {0}")]
    Parse(ParseErrorKind, usize),
    #[error("type error at offset {1}: {0}")]
    Type(String, usize),
    #[error("'{0}' is not allowed in strict RFC 9535 mode (offset {1})")]
    ExtensionDisabled(String, usize),
}

impl CompileError {
    /// Byte offset into the source expression where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            Self::Lex(_, offset)
            | Self::Parse(_, offset)
            | Self::Type(_, offset)
            | Self::ExtensionDisabled(_, offset) => *offset,
        }
    }
}

/// Error produced while evaluating a compiled path against a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("descendant traversal exceeded maximum depth {0}")]
    DepthExceeded(usize),
    #[error("invalid regular expression '{pattern}': {message}")]
    Regex { pattern: String, message: String },
    #[error("document adapter inconsistency: {0}")]
    Adapter(String),
}
