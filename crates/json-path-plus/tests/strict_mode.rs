use json_path_plus::{compile, CompileError, QueryOptions};
use serde_json::json;

fn strict() -> QueryOptions {
    QueryOptions {
        strict_rfc: true,
        ..Default::default()
    }
}

#[test]
fn every_extension_construct_is_rejected() {
    let expressions = [
        "$.a^",
        "$.a~",
        "$[?(@property == 'price')]",
        "$[?(@index > 0)]",
        r#"$[?(@path == "$['a']")]"#,
        "$[?(@parent == 1)]",
        "$[?(@parentProperty == 'a')]",
        "$[?(@.type == @root.defaultType)]",
        "$[?(@.v === 1)]",
        "$[?(@.v !== 1)]",
        "$[?isNull(@.v)]",
        "$[?isInteger(@.v)]",
    ];
    for expr in expressions {
        match compile(expr, strict()) {
            Err(CompileError::ExtensionDisabled(_, _)) => {}
            other => panic!("expected ExtensionDisabled for '{expr}', got {other:?}"),
        }
    }
}

#[test]
fn extensions_compile_without_strict_mode() {
    let expressions = [
        "$.a^",
        "$.a~",
        "$[?(@property == 'price')]",
        "$[?(@index > 0)]",
        "$[?(@parentProperty == 'a')]",
        "$[?(@.type == @root.defaultType)]",
        "$[?(@.v === 1)]",
        "$[?isInteger(@.v)]",
    ];
    for expr in expressions {
        compile(expr, QueryOptions::default())
            .unwrap_or_else(|e| panic!("'{expr}' should compile without strict mode: {e}"));
    }
}

#[test]
fn rfc_constructs_still_work_in_strict_mode() {
    let doc = json!({
        "store": {
            "book": [
                {"title": "A", "price": 10},
                {"title": "B", "price": 20}
            ]
        }
    });
    let expressions = [
        "$.store.book[*].title",
        "$..price",
        "$.store.book[?(@.price > 15)]",
        "$.store.book[0:2]",
        "$.store.book[?length(@.title) == 1]",
        r#"$.store.book[?search(@.title, "A")]"#,
        "$[?count(@.store.book[*]) == 2]",
    ];
    for expr in expressions {
        let path = compile(expr, strict())
            .unwrap_or_else(|e| panic!("'{expr}' should compile in strict mode: {e}"));
        path.query(&doc)
            .unwrap_or_else(|e| panic!("'{expr}' should evaluate: {e}"));
    }
}

#[test]
fn strict_mode_requires_singular_comparison_operands() {
    assert!(matches!(
        compile("$[?(@.a[*] == 1)]", strict()),
        Err(CompileError::Type(_, _))
    ));
    assert!(matches!(
        compile("$[?(@..a == 1)]", strict()),
        Err(CompileError::Type(_, _))
    ));
    assert!(compile("$[?(@.a[0].b == 1)]", strict()).is_ok());

    // The same expressions are permitted outside strict mode; a
    // non-singular projection just compares as "nothing".
    assert!(compile("$[?(@.a[*] == 1)]", QueryOptions::default()).is_ok());
}

#[test]
fn strict_errors_carry_the_construct_offset() {
    let err = compile("$.store.book[0]^", strict()).unwrap_err();
    assert_eq!(err, CompileError::ExtensionDisabled("^".to_string(), 15));
    assert_eq!(err.offset(), 15);
}
