//! Path rendering helpers.

use crate::types::{Path, Segment, Selector};

/// Render a key as a normalized-path member: `['key']`.
///
/// Printable ASCII passes through except `'` and `\`; everything else is
/// emitted as `\uXXXX` (UTF-16 units, so astral characters become surrogate
/// pairs).
pub(crate) fn normalized_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    out.push_str("['");
    for ch in key.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            c if (' '..='~').contains(&c) => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units).iter() {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
    }
    out.push_str("']");
    out
}

/// Convert a path AST back to an expression string.
///
/// Filter expressions render as the `[?(...)]` placeholder; use
/// [`CompiledPath::source`](crate::CompiledPath::source) for the exact text
/// of a compiled expression.
pub fn path_to_string(path: &Path) -> String {
    let mut out = String::from("$");
    for segment in &path.segments {
        out.push_str(&segment_to_string(segment));
    }
    out
}

/// Return property names explicitly referenced by name selectors.
pub fn accessed_names(path: &Path) -> Vec<String> {
    let mut names = Vec::new();
    for segment in &path.segments {
        for selector in &segment.selectors {
            if let Selector::Name(name) = selector {
                names.push(name.clone());
            }
        }
    }
    names
}

fn segment_to_string(segment: &Segment) -> String {
    if segment.selectors.len() == 1 {
        let selector = &segment.selectors[0];
        if segment.descendant {
            format!("..{}", selector_to_segment_tail(selector))
        } else {
            selector_to_segment(selector)
        }
    } else {
        let joined = segment
            .selectors
            .iter()
            .map(selector_to_bracket_item)
            .collect::<Vec<_>>()
            .join(", ");
        if segment.descendant {
            format!("..[{joined}]")
        } else {
            format!("[{joined}]")
        }
    }
}

fn selector_to_segment(selector: &Selector) -> String {
    match selector {
        Selector::Name(name) => {
            if is_shorthand(name) {
                format!(".{name}")
            } else {
                format!("['{}']", escape_single_quoted(name))
            }
        }
        Selector::Wildcard => ".*".to_string(),
        Selector::Parent => "^".to_string(),
        Selector::KeyName => "~".to_string(),
        other => format!("[{}]", selector_to_bracket_item(other)),
    }
}

fn selector_to_segment_tail(selector: &Selector) -> String {
    match selector {
        Selector::Name(name) => {
            if is_shorthand(name) {
                name.clone()
            } else {
                format!("['{}']", escape_single_quoted(name))
            }
        }
        Selector::Wildcard => "*".to_string(),
        other => format!("[{}]", selector_to_bracket_item(other)),
    }
}

fn selector_to_bracket_item(selector: &Selector) -> String {
    match selector {
        Selector::Name(name) => format!("'{}'", escape_single_quoted(name)),
        Selector::Index(index) => index.to_string(),
        Selector::Slice { start, end, step } => {
            let mut out = String::new();
            if let Some(start) = start {
                out.push_str(&start.to_string());
            }
            out.push(':');
            if let Some(end) = end {
                out.push_str(&end.to_string());
            }
            if let Some(step) = step {
                out.push(':');
                out.push_str(&step.to_string());
            }
            out
        }
        Selector::Wildcard => "*".to_string(),
        Selector::Filter(_) => "?(...)".to_string(),
        Selector::Parent => "^".to_string(),
        Selector::KeyName => "~".to_string(),
    }
}

/// Whether a name can be written in dot shorthand.
fn is_shorthand(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn escape_single_quoted(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out
}
