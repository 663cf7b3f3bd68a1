//! Path expression lexer.
//!
//! The lexer operates in two modes driven by the parser: segment mode for
//! everything outside filter expressions, and filter mode inside them.
//! Every token carries the byte offset of its first character.
//!
//! Extension constructs (`^`, `~`, `===`, `!==` and the `@...` context
//! variables) fail tokenization under strict RFC 9535 mode.

use crate::error::{CompileError, LexErrorKind};

/// Lexing mode. The parser selects the mode per token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Segment,
    Filter,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Dollar,
    At,
    Dot,
    DotDot,
    Star,
    Caret,
    Tilde,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Question,
    Bang,
    Name(String),
    Str(String),
    Int(i64),
    Float(f64),
    True,
    False,
    Null,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    CtxProperty,
    CtxIndex,
    CtxPath,
    CtxParent,
    CtxParentProperty,
    CtxRoot,
    Eof,
}

impl TokenKind {
    /// Short rendering for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Dollar => "'$'".to_string(),
            TokenKind::At => "'@'".to_string(),
            TokenKind::Dot => "'.'".to_string(),
            TokenKind::DotDot => "'..'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Caret => "'^'".to_string(),
            TokenKind::Tilde => "'~'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Question => "'?'".to_string(),
            TokenKind::Bang => "'!'".to_string(),
            TokenKind::Name(n) => format!("name '{n}'"),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Int(i) => format!("integer {i}"),
            TokenKind::Float(f) => format!("number {f}"),
            TokenKind::True => "'true'".to_string(),
            TokenKind::False => "'false'".to_string(),
            TokenKind::Null => "'null'".to_string(),
            TokenKind::Eq => "'=='".to_string(),
            TokenKind::Ne => "'!='".to_string(),
            TokenKind::Lt => "'<'".to_string(),
            TokenKind::Le => "'<='".to_string(),
            TokenKind::Gt => "'>'".to_string(),
            TokenKind::Ge => "'>='".to_string(),
            TokenKind::AndAnd => "'&&'".to_string(),
            TokenKind::OrOr => "'||'".to_string(),
            TokenKind::CtxProperty => "'@property'".to_string(),
            TokenKind::CtxIndex => "'@index'".to_string(),
            TokenKind::CtxPath => "'@path'".to_string(),
            TokenKind::CtxParent => "'@parent'".to_string(),
            TokenKind::CtxParentProperty => "'@parentProperty'".to_string(),
            TokenKind::CtxRoot => "'@root'".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

pub(crate) struct Lexer<'s> {
    input: &'s str,
    pos: usize,
    strict: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(input: &'s str, strict: bool) -> Self {
        Self {
            input,
            pos: 0,
            strict,
        }
    }

    /// Lex and consume the next token in the given mode.
    pub fn next(&mut self, mode: Mode) -> Result<Token, CompileError> {
        self.skip_whitespace();
        let offset = self.pos;
        let Some(c) = self.peek_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                offset,
            });
        };
        let kind = match mode {
            Mode::Segment => self.segment_token(c, offset)?,
            Mode::Filter => self.filter_token(c, offset)?,
        };
        Ok(Token { kind, offset })
    }

    /// Lex the next token without consuming it.
    pub fn peek(&mut self, mode: Mode) -> Result<Token, CompileError> {
        let saved = self.pos;
        let token = self.next(mode);
        self.pos = saved;
        token
    }

    fn segment_token(&mut self, c: char, offset: usize) -> Result<TokenKind, CompileError> {
        let kind = match c {
            '$' => {
                self.advance();
                TokenKind::Dollar
            }
            '@' => {
                self.advance();
                TokenKind::At
            }
            '.' => {
                self.advance();
                if self.peek_char() == Some('.') {
                    self.advance();
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            '*' => {
                self.advance();
                TokenKind::Star
            }
            '[' => {
                self.advance();
                TokenKind::LBracket
            }
            ']' => {
                self.advance();
                TokenKind::RBracket
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            ':' => {
                self.advance();
                TokenKind::Colon
            }
            '?' => {
                self.advance();
                TokenKind::Question
            }
            '^' => {
                if self.strict {
                    return Err(CompileError::ExtensionDisabled("^".to_string(), offset));
                }
                self.advance();
                TokenKind::Caret
            }
            '~' => {
                if self.strict {
                    return Err(CompileError::ExtensionDisabled("~".to_string(), offset));
                }
                self.advance();
                TokenKind::Tilde
            }
            '\'' | '"' => TokenKind::Str(self.lex_string(offset)?),
            '-' | '0'..='9' => self.lex_segment_int(offset)?,
            c if c.is_ascii_alphabetic() || c == '_' => TokenKind::Name(self.lex_dot_name()),
            other => {
                return Err(CompileError::Lex(
                    LexErrorKind::UnexpectedChar(other),
                    offset,
                ))
            }
        };
        Ok(kind)
    }

    fn filter_token(&mut self, c: char, offset: usize) -> Result<TokenKind, CompileError> {
        let kind = match c {
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            '[' => {
                self.advance();
                TokenKind::LBracket
            }
            ']' => {
                self.advance();
                TokenKind::RBracket
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            ':' => {
                self.advance();
                TokenKind::Colon
            }
            '?' => {
                self.advance();
                TokenKind::Question
            }
            '*' => {
                self.advance();
                TokenKind::Star
            }
            '.' => {
                self.advance();
                if self.peek_char() == Some('.') {
                    self.advance();
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            '$' => {
                self.advance();
                TokenKind::Dollar
            }
            '@' => {
                self.advance();
                if self
                    .peek_char()
                    .is_some_and(|c| c.is_ascii_alphabetic())
                {
                    let name = self.lex_ident();
                    if self.strict {
                        return Err(CompileError::ExtensionDisabled(
                            format!("@{name}"),
                            offset,
                        ));
                    }
                    match name.as_str() {
                        "property" => TokenKind::CtxProperty,
                        "index" => TokenKind::CtxIndex,
                        "path" => TokenKind::CtxPath,
                        "parent" => TokenKind::CtxParent,
                        "parentProperty" => TokenKind::CtxParentProperty,
                        "root" => TokenKind::CtxRoot,
                        _ => {
                            return Err(CompileError::Lex(
                                LexErrorKind::UnknownContextVariable(name),
                                offset,
                            ))
                        }
                    }
                } else {
                    TokenKind::At
                }
            }
            '=' => {
                if self.take_str("===") {
                    if self.strict {
                        return Err(CompileError::ExtensionDisabled("===".to_string(), offset));
                    }
                    TokenKind::Eq
                } else if self.take_str("==") {
                    TokenKind::Eq
                } else {
                    return Err(CompileError::Lex(LexErrorKind::UnexpectedChar('='), offset));
                }
            }
            '!' => {
                if self.take_str("!==") {
                    if self.strict {
                        return Err(CompileError::ExtensionDisabled("!==".to_string(), offset));
                    }
                    TokenKind::Ne
                } else if self.take_str("!=") {
                    TokenKind::Ne
                } else {
                    self.advance();
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.take_str("<=") {
                    TokenKind::Le
                } else {
                    self.advance();
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.take_str(">=") {
                    TokenKind::Ge
                } else {
                    self.advance();
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.take_str("&&") {
                    TokenKind::AndAnd
                } else {
                    return Err(CompileError::Lex(LexErrorKind::UnexpectedChar('&'), offset));
                }
            }
            '|' => {
                if self.take_str("||") {
                    TokenKind::OrOr
                } else {
                    return Err(CompileError::Lex(LexErrorKind::UnexpectedChar('|'), offset));
                }
            }
            '\'' | '"' => TokenKind::Str(self.lex_string(offset)?),
            '-' | '0'..='9' => self.lex_number(offset)?,
            c if c.is_ascii_alphabetic() || c == '_' => {
                let name = self.lex_ident();
                match name.as_str() {
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    "null" => TokenKind::Null,
                    _ => TokenKind::Name(name),
                }
            }
            other => {
                return Err(CompileError::Lex(
                    LexErrorKind::UnexpectedChar(other),
                    offset,
                ))
            }
        };
        Ok(kind)
    }

    /// Dot-name: `[A-Za-z_][A-Za-z0-9_-]*`.
    fn lex_dot_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                self.advance();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    /// Identifier: `[A-Za-z_][A-Za-z0-9_]*` (function names, keywords,
    /// context variable names).
    fn lex_ident(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    /// Integer for segment-mode brackets (indices and slice bounds).
    fn lex_segment_int(&mut self, offset: usize) -> Result<TokenKind, CompileError> {
        let start = self.pos;
        if self.peek_char() == Some('-') {
            self.advance();
        }
        let digits_start = self.pos;
        while matches!(self.peek_char(), Some('0'..='9')) {
            self.advance();
        }
        if self.pos == digits_start {
            return Err(CompileError::Lex(LexErrorKind::InvalidNumber, offset));
        }
        // Fractions and exponents have no meaning in segment position.
        if matches!(self.peek_char(), Some('.') | Some('e') | Some('E')) {
            return Err(CompileError::Lex(LexErrorKind::InvalidNumber, offset));
        }
        self.input[start..self.pos]
            .parse::<i64>()
            .map(TokenKind::Int)
            .map_err(|_| CompileError::Lex(LexErrorKind::InvalidNumber, offset))
    }

    /// Full numeric literal for filter mode: integer or decimal with an
    /// optional exponent.
    fn lex_number(&mut self, offset: usize) -> Result<TokenKind, CompileError> {
        let start = self.pos;
        if self.peek_char() == Some('-') {
            self.advance();
        }
        let digits_start = self.pos;
        while matches!(self.peek_char(), Some('0'..='9')) {
            self.advance();
        }
        if self.pos == digits_start {
            return Err(CompileError::Lex(LexErrorKind::InvalidNumber, offset));
        }

        let mut is_float = false;
        if self.peek_char() == Some('.') {
            // A '.' not followed by a digit belongs to a malformed literal.
            let saved = self.pos;
            self.advance();
            if !matches!(self.peek_char(), Some('0'..='9')) {
                self.pos = saved;
                return Err(CompileError::Lex(LexErrorKind::InvalidNumber, offset));
            }
            is_float = true;
            while matches!(self.peek_char(), Some('0'..='9')) {
                self.advance();
            }
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            self.advance();
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                self.advance();
            }
            if !matches!(self.peek_char(), Some('0'..='9')) {
                return Err(CompileError::Lex(LexErrorKind::InvalidNumber, offset));
            }
            is_float = true;
            while matches!(self.peek_char(), Some('0'..='9')) {
                self.advance();
            }
        }

        let text = &self.input[start..self.pos];
        if is_float {
            text.parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|_| CompileError::Lex(LexErrorKind::InvalidNumber, offset))
        } else {
            text.parse::<i64>()
                .map(TokenKind::Int)
                .map_err(|_| CompileError::Lex(LexErrorKind::InvalidNumber, offset))
        }
    }

    /// String literal in single or double quotes with the RFC escape set.
    fn lex_string(&mut self, offset: usize) -> Result<String, CompileError> {
        let quote = self.peek_char().expect("caller checked the quote");
        self.advance();
        let mut out = String::new();
        loop {
            let esc_offset = self.pos;
            match self.peek_char() {
                None => {
                    return Err(CompileError::Lex(LexErrorKind::UnterminatedString, offset))
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some('\\') => out.push('\\'),
                        Some('\'') => out.push('\''),
                        Some('"') => out.push('"'),
                        Some('/') => out.push('/'),
                        Some('b') => out.push('\u{0008}'),
                        Some('f') => out.push('\u{000C}'),
                        Some('n') => out.push('\n'),
                        Some('r') => out.push('\r'),
                        Some('t') => out.push('\t'),
                        Some('u') => {
                            self.advance();
                            out.push(self.lex_unicode_escape(esc_offset)?);
                            continue;
                        }
                        _ => {
                            return Err(CompileError::Lex(
                                LexErrorKind::InvalidEscape,
                                esc_offset,
                            ))
                        }
                    }
                    self.advance();
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
        Ok(out)
    }

    /// `\uXXXX`, positioned after the `u`. Surrogate pairs are combined.
    fn lex_unicode_escape(&mut self, offset: usize) -> Result<char, CompileError> {
        let high = self.lex_hex4(offset)?;
        if (0xD800..=0xDBFF).contains(&high) {
            if !self.take_str("\\u") {
                return Err(CompileError::Lex(LexErrorKind::InvalidEscape, offset));
            }
            let low = self.lex_hex4(offset)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(CompileError::Lex(LexErrorKind::InvalidEscape, offset));
            }
            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(code)
                .ok_or(CompileError::Lex(LexErrorKind::InvalidEscape, offset));
        }
        char::from_u32(high).ok_or(CompileError::Lex(LexErrorKind::InvalidEscape, offset))
    }

    fn lex_hex4(&mut self, offset: usize) -> Result<u32, CompileError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = self
                .peek_char()
                .and_then(|c| c.to_digit(16))
                .ok_or(CompileError::Lex(LexErrorKind::InvalidEscape, offset))?;
            value = value * 16 + digit;
            self.advance();
        }
        Ok(value)
    }

    /// Consume `s` if the input continues with it.
    fn take_str(&mut self, s: &str) -> bool {
        if self.input[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(' ' | '\t' | '\n' | '\r')) {
            self.advance();
        }
    }
}
