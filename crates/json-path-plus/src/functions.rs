//! Filter function library: signatures and the compiled-regex cache.
//!
//! Signatures drive the compile-time checks in [`crate::typer`]; the actual
//! evaluation lives in [`crate::filter`], dispatched by name, because the
//! evaluation functions are generic over the document type.

use std::collections::HashMap;

use regex::Regex;

/// Parameter kind expected by a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamKind {
    /// A single value: literal, context variable, or a path projected to one
    /// scalar.
    Value,
    /// A nodelist: an embedded path or `@parent`.
    Nodes,
    /// Value or nodelist (the `isX` type tests accept both).
    Any,
}

/// What a function produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReturnKind {
    /// A value usable as a comparison operand.
    Value,
    /// A boolean usable directly as a filter test.
    Logical,
}

/// A function signature.
#[derive(Debug)]
pub(crate) struct FunctionDef {
    pub name: &'static str,
    pub params: &'static [ParamKind],
    pub ret: ReturnKind,
    /// Extensions are rejected under strict RFC 9535 mode.
    pub extension: bool,
}

/// The function table. RFC 9535 functions first, then the JSONPath Plus
/// type tests.
pub(crate) static FUNCTIONS: &[FunctionDef] = &[
    FunctionDef {
        name: "length",
        params: &[ParamKind::Value],
        ret: ReturnKind::Value,
        extension: false,
    },
    FunctionDef {
        name: "count",
        params: &[ParamKind::Nodes],
        ret: ReturnKind::Value,
        extension: false,
    },
    FunctionDef {
        name: "match",
        params: &[ParamKind::Value, ParamKind::Value],
        ret: ReturnKind::Logical,
        extension: false,
    },
    FunctionDef {
        name: "search",
        params: &[ParamKind::Value, ParamKind::Value],
        ret: ReturnKind::Logical,
        extension: false,
    },
    FunctionDef {
        name: "value",
        params: &[ParamKind::Nodes],
        ret: ReturnKind::Value,
        extension: false,
    },
    FunctionDef {
        name: "isNull",
        params: &[ParamKind::Any],
        ret: ReturnKind::Logical,
        extension: true,
    },
    FunctionDef {
        name: "isBoolean",
        params: &[ParamKind::Any],
        ret: ReturnKind::Logical,
        extension: true,
    },
    FunctionDef {
        name: "isNumber",
        params: &[ParamKind::Any],
        ret: ReturnKind::Logical,
        extension: true,
    },
    FunctionDef {
        name: "isInteger",
        params: &[ParamKind::Any],
        ret: ReturnKind::Logical,
        extension: true,
    },
    FunctionDef {
        name: "isString",
        params: &[ParamKind::Any],
        ret: ReturnKind::Logical,
        extension: true,
    },
    FunctionDef {
        name: "isArray",
        params: &[ParamKind::Any],
        ret: ReturnKind::Logical,
        extension: true,
    },
    FunctionDef {
        name: "isObject",
        params: &[ParamKind::Any],
        ret: ReturnKind::Logical,
        extension: true,
    },
];

/// Look up a function signature by name.
pub(crate) fn lookup(name: &str) -> Option<&'static FunctionDef> {
    FUNCTIONS.iter().find(|def| def.name == name)
}

/// Compile a pattern for `match` (anchored) or `search` (unanchored).
pub(crate) fn compile_pattern(anchored: bool, pattern: &str) -> Result<Regex, regex::Error> {
    if anchored {
        Regex::new(&format!("^(?:{pattern})$"))
    } else {
        Regex::new(pattern)
    }
}

/// Regexes compiled from literal pattern arguments, memoized per compiled
/// path. Dynamic patterns are compiled per evaluation instead.
#[derive(Debug, Clone, Default)]
pub(crate) struct RegexCache {
    map: HashMap<(bool, String), Regex>,
}

impl RegexCache {
    /// Compile and store a literal pattern; idempotent per (anchoring,
    /// pattern) pair.
    pub fn insert(&mut self, anchored: bool, pattern: &str) -> Result<(), regex::Error> {
        let key = (anchored, pattern.to_string());
        if self.map.contains_key(&key) {
            return Ok(());
        }
        let regex = compile_pattern(anchored, pattern)?;
        self.map.insert(key, regex);
        Ok(())
    }

    pub fn get(&self, anchored: bool, pattern: &str) -> Option<&Regex> {
        self.map.get(&(anchored, pattern.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_rfc_and_extension_functions() {
        assert!(!lookup("length").unwrap().extension);
        assert!(!lookup("count").unwrap().extension);
        assert!(lookup("isInteger").unwrap().extension);
        assert!(lookup("nope").is_none());
    }

    #[test]
    fn anchored_patterns_match_fully() {
        let re = compile_pattern(true, "a+").unwrap();
        assert!(re.is_match("aaa"));
        assert!(!re.is_match("baaa"));

        let re = compile_pattern(false, "a+").unwrap();
        assert!(re.is_match("baaa"));
    }

    #[test]
    fn cache_is_idempotent() {
        let mut cache = RegexCache::default();
        cache.insert(true, "x").unwrap();
        cache.insert(true, "x").unwrap();
        assert!(cache.get(true, "x").is_some());
        assert!(cache.get(false, "x").is_none());
    }
}
