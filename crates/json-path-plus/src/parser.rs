//! Recursive-descent parser for path expressions.
//!
//! Consumes tokens from the two-mode lexer and produces the AST of
//! [`crate::types`]. Filter expressions use precedence climbing:
//! `||` binds loosest, then `&&`, then `!`, then comparison.

use crate::error::{CompileError, ParseErrorKind};
use crate::lexer::{Lexer, Mode, Token, TokenKind};
use crate::types::*;

/// Parse a path expression into its AST.
pub(crate) fn parse(input: &str, strict: bool) -> Result<Path, CompileError> {
    let mut parser = Parser {
        lexer: Lexer::new(input, strict),
    };
    parser.parse_path()
}

struct Parser<'s> {
    lexer: Lexer<'s>,
}

impl<'s> Parser<'s> {
    fn parse_path(&mut self) -> Result<Path, CompileError> {
        let token = self.lexer.next(Mode::Segment)?;
        if token.kind != TokenKind::Dollar {
            return Err(CompileError::Parse(
                ParseErrorKind::ExpectedRoot,
                token.offset,
            ));
        }

        let segments = self.parse_segments(Mode::Segment)?;

        let token = self.lexer.next(Mode::Segment)?;
        if token.kind != TokenKind::Eof {
            return Err(unexpected(token));
        }
        Ok(Path::new(segments))
    }

    /// Parse a run of segments. Stops at the first token that cannot start a
    /// segment; the caller decides whether that token is acceptable.
    fn parse_segments(&mut self, mode: Mode) -> Result<Vec<Segment>, CompileError> {
        let mut segments = Vec::new();
        let mut terminal = false;
        loop {
            let token = self.lexer.peek(mode)?;
            let segment = match token.kind {
                TokenKind::Dot => {
                    self.lexer.next(mode)?;
                    self.parse_dot_segment(mode)?
                }
                TokenKind::DotDot => {
                    self.lexer.next(mode)?;
                    self.parse_descendant_segment(mode)?
                }
                TokenKind::LBracket => {
                    self.lexer.next(mode)?;
                    Segment::new(self.parse_bracket_selectors(mode, token.offset)?, false)
                }
                TokenKind::Caret => {
                    self.lexer.next(mode)?;
                    Segment::new(vec![Selector::Parent], false)
                }
                TokenKind::Tilde => {
                    self.lexer.next(mode)?;
                    Segment::new(vec![Selector::KeyName], false)
                }
                _ => break,
            };
            if terminal {
                return Err(CompileError::Parse(
                    ParseErrorKind::KeyNameNotTerminal,
                    token.offset,
                ));
            }
            terminal = matches!(segment.selectors.first(), Some(Selector::KeyName));
            segments.push(segment);
        }
        Ok(segments)
    }

    /// `.name` or `.*`, the dot already consumed.
    fn parse_dot_segment(&mut self, mode: Mode) -> Result<Segment, CompileError> {
        let token = self.lexer.next(mode)?;
        let selector = match token.kind {
            TokenKind::Star => Selector::Wildcard,
            kind => match member_name(kind) {
                Ok(name) => Selector::Name(name),
                Err(kind) => {
                    return Err(CompileError::Parse(
                        ParseErrorKind::UnexpectedToken(kind.describe()),
                        token.offset,
                    ))
                }
            },
        };
        Ok(Segment::new(vec![selector], false))
    }

    /// `..name`, `..*` or `..[...]`, the `..` already consumed.
    fn parse_descendant_segment(&mut self, mode: Mode) -> Result<Segment, CompileError> {
        let token = self.lexer.next(mode)?;
        match token.kind {
            TokenKind::Star => Ok(Segment::new(vec![Selector::Wildcard], true)),
            TokenKind::LBracket => Ok(Segment::new(
                self.parse_bracket_selectors(mode, token.offset)?,
                true,
            )),
            kind => match member_name(kind) {
                Ok(name) => Ok(Segment::new(vec![Selector::Name(name)], true)),
                Err(kind) => Err(CompileError::Parse(
                    ParseErrorKind::UnexpectedToken(kind.describe()),
                    token.offset,
                )),
            },
        }
    }

    /// Bracketed selector list, the `[` already consumed.
    fn parse_bracket_selectors(
        &mut self,
        mode: Mode,
        open_offset: usize,
    ) -> Result<Vec<Selector>, CompileError> {
        let mut selectors = vec![self.parse_bracketed_selector(mode)?];
        loop {
            let token = self.lexer.next(mode)?;
            match token.kind {
                TokenKind::Comma => selectors.push(self.parse_bracketed_selector(mode)?),
                TokenKind::RBracket => break,
                TokenKind::Eof => {
                    return Err(CompileError::Parse(
                        ParseErrorKind::MissingBracket,
                        open_offset,
                    ))
                }
                _ => return Err(unexpected(token)),
            }
        }
        Ok(selectors)
    }

    fn parse_bracketed_selector(&mut self, mode: Mode) -> Result<Selector, CompileError> {
        let token = self.lexer.peek(mode)?;
        match token.kind {
            TokenKind::Str(name) => {
                self.lexer.next(mode)?;
                Ok(Selector::Name(name))
            }
            TokenKind::Star => {
                self.lexer.next(mode)?;
                Ok(Selector::Wildcard)
            }
            TokenKind::Int(_) | TokenKind::Colon => self.parse_index_or_slice(mode),
            TokenKind::Question => {
                self.lexer.next(mode)?;
                Ok(Selector::Filter(self.parse_filter_or()?))
            }
            _ => Err(unexpected_at(&token)),
        }
    }

    /// `[index]` or `[start:end:step]`; the caller saw an integer or colon.
    fn parse_index_or_slice(&mut self, mode: Mode) -> Result<Selector, CompileError> {
        let start = self.take_int(mode)?;
        if self.lexer.peek(mode)?.kind != TokenKind::Colon {
            // Lookahead guarantees the integer exists here.
            let index = start.expect("caller checked for integer or colon");
            return Ok(Selector::Index(index));
        }
        self.lexer.next(mode)?;

        let end = self.take_int(mode)?;
        let mut step = None;
        if self.lexer.peek(mode)?.kind == TokenKind::Colon {
            self.lexer.next(mode)?;
            let token = self.lexer.peek(mode)?;
            if let TokenKind::Int(i) = token.kind {
                self.lexer.next(mode)?;
                if i == 0 {
                    return Err(CompileError::Parse(
                        ParseErrorKind::SliceStepZero,
                        token.offset,
                    ));
                }
                step = Some(i);
            }
        }
        Ok(Selector::Slice { start, end, step })
    }

    fn take_int(&mut self, mode: Mode) -> Result<Option<i64>, CompileError> {
        if let TokenKind::Int(i) = self.lexer.peek(mode)?.kind {
            self.lexer.next(mode)?;
            Ok(Some(i))
        } else {
            Ok(None)
        }
    }

    // ---- Filter expression sub-grammar ----

    fn parse_filter_or(&mut self) -> Result<FilterExpr, CompileError> {
        let mut left = self.parse_filter_and()?;
        while self.lexer.peek(Mode::Filter)?.kind == TokenKind::OrOr {
            self.lexer.next(Mode::Filter)?;
            let right = self.parse_filter_and()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_filter_and(&mut self) -> Result<FilterExpr, CompileError> {
        let mut left = self.parse_filter_unary()?;
        while self.lexer.peek(Mode::Filter)?.kind == TokenKind::AndAnd {
            self.lexer.next(Mode::Filter)?;
            let right = self.parse_filter_unary()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_filter_unary(&mut self) -> Result<FilterExpr, CompileError> {
        let token = self.lexer.peek(Mode::Filter)?;
        match token.kind {
            TokenKind::Bang => {
                self.lexer.next(Mode::Filter)?;
                Ok(FilterExpr::Not(Box::new(self.parse_filter_unary()?)))
            }
            TokenKind::LParen => {
                self.lexer.next(Mode::Filter)?;
                let inner = self.parse_filter_or()?;
                let close = self.lexer.next(Mode::Filter)?;
                if close.kind != TokenKind::RParen {
                    return Err(unexpected(close));
                }
                Ok(inner)
            }
            _ => self.parse_filter_basic(),
        }
    }

    /// Comparison, existence test, or boolean function test.
    fn parse_filter_basic(&mut self) -> Result<FilterExpr, CompileError> {
        let start = self.lexer.peek(Mode::Filter)?.offset;
        let left = self.parse_operand()?;

        let token = self.lexer.peek(Mode::Filter)?;
        if let Some(op) = compare_op(&token.kind) {
            self.lexer.next(Mode::Filter)?;
            let right = self.parse_operand()?;
            return Ok(FilterExpr::Compare { op, left, right });
        }

        match left {
            Operand::Path(path) => Ok(FilterExpr::Exists(path)),
            Operand::Call(call) => Ok(FilterExpr::Test(call)),
            Operand::Var(_) => Err(CompileError::Type(
                "filter test must be an existence test or a boolean function".to_string(),
                start,
            )),
            Operand::Literal(_) => {
                Err(CompileError::Parse(ParseErrorKind::InvalidFilter, start))
            }
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, CompileError> {
        let token = self.lexer.next(Mode::Filter)?;
        match token.kind {
            TokenKind::Str(s) => Ok(Operand::Literal(Literal::Str(s))),
            TokenKind::Int(i) => Ok(Operand::Literal(Literal::Int(i))),
            TokenKind::Float(f) => Ok(Operand::Literal(Literal::Float(f))),
            TokenKind::True => Ok(Operand::Literal(Literal::Bool(true))),
            TokenKind::False => Ok(Operand::Literal(Literal::Bool(false))),
            TokenKind::Null => Ok(Operand::Literal(Literal::Null)),
            TokenKind::At => Ok(Operand::Path(EmbeddedPath {
                root: PathRoot::Current,
                segments: self.parse_segments(Mode::Filter)?,
                offset: token.offset,
            })),
            TokenKind::Dollar => Ok(Operand::Path(EmbeddedPath {
                root: PathRoot::Root,
                segments: self.parse_segments(Mode::Filter)?,
                offset: token.offset,
            })),
            TokenKind::CtxRoot => Ok(Operand::Path(EmbeddedPath {
                root: PathRoot::RootVar,
                segments: self.parse_segments(Mode::Filter)?,
                offset: token.offset,
            })),
            TokenKind::CtxProperty => Ok(Operand::Var(ContextVar::Property)),
            TokenKind::CtxIndex => Ok(Operand::Var(ContextVar::Index)),
            TokenKind::CtxPath => Ok(Operand::Var(ContextVar::Path)),
            TokenKind::CtxParent => Ok(Operand::Var(ContextVar::Parent)),
            TokenKind::CtxParentProperty => Ok(Operand::Var(ContextVar::ParentProperty)),
            TokenKind::Name(name) => self.parse_call(name, token.offset),
            _ => Err(unexpected(token)),
        }
    }

    /// Function call; the name is already consumed.
    fn parse_call(&mut self, name: String, offset: usize) -> Result<Operand, CompileError> {
        let open = self.lexer.next(Mode::Filter)?;
        if open.kind != TokenKind::LParen {
            return Err(unexpected(open));
        }
        let mut args = Vec::new();
        if self.lexer.peek(Mode::Filter)?.kind == TokenKind::RParen {
            self.lexer.next(Mode::Filter)?;
        } else {
            loop {
                args.push(self.parse_operand()?);
                let token = self.lexer.next(Mode::Filter)?;
                match token.kind {
                    TokenKind::Comma => continue,
                    TokenKind::RParen => break,
                    _ => return Err(unexpected(token)),
                }
            }
        }
        Ok(Operand::Call(FnCall { name, args, offset }))
    }
}

/// Keywords double as member names after a dot (`$.true` is a lookup of the
/// key "true"). Returns the token kind back on failure so the caller can
/// report it.
fn member_name(kind: TokenKind) -> Result<String, TokenKind> {
    match kind {
        TokenKind::Name(name) => Ok(name),
        TokenKind::True => Ok("true".to_string()),
        TokenKind::False => Ok("false".to_string()),
        TokenKind::Null => Ok("null".to_string()),
        other => Err(other),
    }
}

fn compare_op(kind: &TokenKind) -> Option<CompareOp> {
    match kind {
        TokenKind::Eq => Some(CompareOp::Eq),
        TokenKind::Ne => Some(CompareOp::Ne),
        TokenKind::Lt => Some(CompareOp::Lt),
        TokenKind::Le => Some(CompareOp::Le),
        TokenKind::Gt => Some(CompareOp::Gt),
        TokenKind::Ge => Some(CompareOp::Ge),
        _ => None,
    }
}

fn unexpected(token: Token) -> CompileError {
    CompileError::Parse(
        ParseErrorKind::UnexpectedToken(token.kind.describe()),
        token.offset,
    )
}

fn unexpected_at(token: &Token) -> CompileError {
    CompileError::Parse(
        ParseErrorKind::UnexpectedToken(token.kind.describe()),
        token.offset,
    )
}
