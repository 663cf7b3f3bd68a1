//! JSONPath (RFC 9535) query engine with the JSONPath Plus extensions.
//!
//! This crate compiles a textual path expression into an immutable
//! [`CompiledPath`] and evaluates it against a document tree, returning an
//! ordered [`NodeList`] of matches. On top of RFC 9535 it implements the
//! "JSONPath Plus" extension set: the parent selector `^`, the key-name
//! selector `~`, context variables (`@property`, `@index`, `@path`,
//! `@parent`, `@parentProperty`, `@root`) and the `isX` type-test
//! functions. [`QueryOptions::strict_rfc`] rejects every extension at
//! compile time.
//!
//! Documents are seen through the [`DocumentNode`] adapter trait; an
//! implementation for [`serde_json::Value`] ships with the crate.
//!
//! # Example
//!
//! ```
//! use json_path_plus::{compile, QueryOptions};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "store": {
//!         "book": [
//!             {"title": "Book 1", "price": 10},
//!             {"title": "Book 2", "price": 20}
//!         ]
//!     }
//! });
//!
//! let path = compile("$.store.book[?(@.price > 15)]", QueryOptions::default()).unwrap();
//! let results = path.query(&doc).unwrap();
//!
//! assert_eq!(results.nodes(), vec![&json!({"title": "Book 2", "price": 20})]);
//! assert_eq!(results.paths(), vec!["$['store']['book'][1]"]);
//! ```

mod adapter;
pub use adapter::{DocumentNode, NodeKind};

mod error;
pub use error::{CompileError, LexErrorKind, ParseErrorKind, QueryError};

mod types;
pub use types::*;

mod ast;
pub use ast::Ast;

mod lexer;
mod parser;

mod functions;
mod typer;

mod eval;
mod filter;

mod path;
pub use path::{compile, CompiledPath, NodeList, NodeMatch, QueryOptions, RegexEngine};

mod util;
pub use util::{accessed_names, path_to_string};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(expr: &str, doc: &serde_json::Value) -> Vec<serde_json::Value> {
        compile(expr, QueryOptions::default())
            .unwrap()
            .query(doc)
            .unwrap()
            .nodes()
            .into_iter()
            .cloned()
            .collect()
    }

    #[test]
    fn compile_root() {
        let path = compile("$", QueryOptions::default()).unwrap();
        assert_eq!(path.ast().segments.len(), 0);
        assert_eq!(path.source(), "$");
    }

    #[test]
    fn query_root() {
        let doc = json!({"a": 1});
        assert_eq!(values("$", &doc), vec![doc.clone()]);
    }

    #[test]
    fn query_dot_notation() {
        let doc = json!({"a": {"b": 42}});
        assert_eq!(values("$.a.b", &doc), vec![json!(42)]);
    }

    #[test]
    fn query_bracket_notation() {
        let doc = json!({"store name": {"open": true}});
        assert_eq!(values("$['store name'].open", &doc), vec![json!(true)]);
    }

    #[test]
    fn query_wildcard_preserves_key_order() {
        let doc = json!({"z": 1, "a": 2});
        assert_eq!(values("$.*", &doc), vec![json!(1), json!(2)]);
    }

    #[test]
    fn query_negative_index() {
        let doc = json!([1, 2, 3, 4, 5]);
        assert_eq!(values("$[-1]", &doc), vec![json!(5)]);
    }

    #[test]
    fn query_missing_key_is_empty() {
        let doc = json!({"a": 1});
        assert!(values("$.missing", &doc).is_empty());
    }

    #[test]
    fn query_filter() {
        let doc = json!([{"n": 1}, {"n": 2}, {"n": 3}]);
        assert_eq!(
            values("$[?(@.n >= 2)]", &doc),
            vec![json!({"n": 2}), json!({"n": 3})]
        );
    }

    #[test]
    fn compiled_path_displays_its_source() {
        let path = compile("$.a[0]", QueryOptions::default()).unwrap();
        assert_eq!(path.to_string(), "$.a[0]");
    }

    #[test]
    fn compiled_path_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledPath>();
    }

    #[test]
    fn match_key_and_index_accessors() {
        let doc = json!({"items": [10, 20]});
        let path = compile("$.items[1]", QueryOptions::default()).unwrap();
        let results = path.query(&doc).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index(), 1);
        assert_eq!(results[0].key(), "");
        assert_eq!(results[0].path(), "$['items'][1]");

        let path = compile("$.items", QueryOptions::default()).unwrap();
        let results = path.query(&doc).unwrap();
        assert_eq!(results[0].key(), "items");
        assert_eq!(results[0].index(), -1);
    }
}
