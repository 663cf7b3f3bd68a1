use json_path_plus::{compile, CompileError, QueryOptions};
use serde_json::{json, Value};

fn eval_values(expr: &str, doc: &Value) -> Vec<Value> {
    let path = compile(expr, QueryOptions::default())
        .unwrap_or_else(|e| panic!("compile failed for '{expr}': {e}"));
    path.query(doc)
        .unwrap_or_else(|e| panic!("query failed for '{expr}': {e}"))
        .nodes()
        .into_iter()
        .cloned()
        .collect()
}

fn compile_err(expr: &str) -> CompileError {
    compile(expr, QueryOptions::default())
        .expect_err(&format!("expected compile error for '{expr}'"))
}

#[test]
fn existence_filter_matrix() {
    let doc = json!([
        {"name": "Alice", "age": 30},
        {"age": 25},
        {"name": "Bob"}
    ]);
    assert_eq!(eval_values("$[?(@.name)]", &doc).len(), 2);
    assert_eq!(eval_values("$[?(!@.name)]", &doc), vec![json!({"age": 25})]);
    // Bare `@` always exists.
    assert_eq!(eval_values("$[?(@)]", &doc).len(), 3);
    // Absolute existence applies per candidate.
    assert_eq!(eval_values("$[?($[0].name)]", &doc).len(), 3);
}

#[test]
fn comparison_filter_matrix() {
    let doc = json!([
        {"price": 5},
        {"price": 10},
        {"price": 3}
    ]);
    assert_eq!(eval_values("$[?(@.price > 5)]", &doc), vec![json!({"price": 10})]);
    assert_eq!(eval_values("$[?(@.price >= 5)]", &doc).len(), 2);
    assert_eq!(eval_values("$[?(@.price < 5)]", &doc), vec![json!({"price": 3})]);
    assert_eq!(eval_values("$[?(@.price <= 5)]", &doc).len(), 2);
    assert_eq!(eval_values("$[?(@.price == 10)]", &doc).len(), 1);
    assert_eq!(eval_values("$[?(@.price != 10)]", &doc).len(), 2);
}

#[test]
fn comparison_is_type_aware_matrix() {
    let doc = json!([
        {"v": 1},
        {"v": "1"},
        {"v": true},
        {"v": null},
        {"v": 1.0}
    ]);
    // Numeric comparison unifies int and float; no cross-type coercion.
    assert_eq!(
        eval_values("$[?(@.v == 1)]", &doc),
        vec![json!({"v": 1}), json!({"v": 1.0})]
    );
    assert_eq!(eval_values("$[?(@.v == '1')]", &doc), vec![json!({"v": "1"})]);
    assert_eq!(eval_values("$[?(@.v == true)]", &doc), vec![json!({"v": true})]);
    assert_eq!(eval_values("$[?(@.v == null)]", &doc), vec![json!({"v": null})]);
    // Cross-type ordering is always false.
    assert!(eval_values("$[?(@.v < '1')]", &json!([{"v": 1}])).is_empty());
    // Missing operand: every comparison is false except `!=`.
    assert!(eval_values("$[?(@.missing == null)]", &json!([{"v": 1}])).is_empty());
    assert!(eval_values("$[?(@.missing < 1)]", &json!([{"v": 1}])).is_empty());
    assert_eq!(eval_values("$[?(@.missing != 1)]", &json!([{"v": 1}])).len(), 1);
    // Both sides missing: false even for equality and inequality.
    assert!(eval_values("$[?(@.m1 == @.m2)]", &json!([{"v": 1}])).is_empty());
    assert!(eval_values("$[?(@.m1 != @.m2)]", &json!([{"v": 1}])).is_empty());
}

#[test]
fn string_ordering_matrix() {
    let doc = json!([{"s": "apple"}, {"s": "banana"}, {"s": "Zebra"}]);
    // Codepoint order: uppercase sorts before lowercase.
    assert_eq!(
        eval_values("$[?(@.s < 'b')]", &doc),
        vec![json!({"s": "apple"}), json!({"s": "Zebra"})]
    );
}

#[test]
fn logical_operators_matrix() {
    let doc = json!([
        {"a": 1, "b": 2, "c": 0},
        {"a": 1, "b": 0, "c": 3},
        {"a": 1, "b": 0, "c": 0},
        {"a": 2, "b": 2, "c": 3}
    ]);
    let result = eval_values("$[?(@.a == 1 && (@.b == 2 || @.c == 3))]", &doc);
    assert_eq!(result.len(), 2);
    assert_eq!(result[0]["b"], json!(2));
    assert_eq!(result[1]["c"], json!(3));

    // `&&` binds tighter than `||`.
    let result = eval_values("$[?(@.a == 2 || @.b == 2 && @.c == 0)]", &doc);
    assert_eq!(result.len(), 2);
}

#[test]
fn filter_over_mapping_members_matrix() {
    let doc = json!({
        "alice": {"age": 30},
        "bob": {"age": 25},
        "carol": {"age": 35}
    });
    assert_eq!(eval_values("$[?(@.age > 28)]", &doc).len(), 2);
    // Non-container candidates produce nothing.
    assert!(eval_values("$[?(@.x)]", &json!(42)).is_empty());
}

#[test]
fn triple_equals_synonym_matrix() {
    let doc = json!([{"v": 1}, {"v": 2}]);
    assert_eq!(
        eval_values("$[?(@.v === 1)]", &doc),
        eval_values("$[?(@.v == 1)]", &doc)
    );
    assert_eq!(
        eval_values("$[?(@.v !== 1)]", &doc),
        eval_values("$[?(@.v != 1)]", &doc)
    );
}

#[test]
fn length_function_matrix() {
    let doc = json!([
        {"name": "José"},
        {"name": "x"},
        {"name": [1, 2, 3]},
        {"name": {"a": 1, "b": 2}},
        {"name": 42},
        {}
    ]);
    // Unicode scalar count, not byte count.
    assert_eq!(eval_values("$[?(length(@.name) == 4)]", &doc).len(), 1);
    assert_eq!(eval_values("$[?(length(@.name) == 3)]", &doc).len(), 1);
    assert_eq!(eval_values("$[?(length(@.name) == 2)]", &doc).len(), 1);
    // Numbers and missing values have no length; comparisons are false.
    assert!(eval_values("$[?(length(@.name) == 0)]", &doc).is_empty());
}

#[test]
fn count_function_matrix() {
    let doc = json!({
        "authors": ["John", "Jane", "Bob"],
        "empty": []
    });
    assert_eq!(eval_values("$[?(count(@.authors[*]) == 3)]", &doc).len(), 1);
    assert_eq!(eval_values("$[?(count(@.empty[*]) == 0)]", &doc).len(), 1);
    assert_eq!(eval_values("$[?(count(@..*) >= 3)]", &doc).len(), 1);
}

#[test]
fn match_and_search_function_matrix() {
    let doc = json!({
        "book": [
            {"title": "Sayings of the Century", "author": "Nigel Rees"},
            {"title": "The Lord of the Rings", "author": "J. R. R. Tolkien"}
        ]
    });
    // `match` is anchored: the whole string must match.
    assert!(eval_values(r#"$.book[?match(@.title, "Lord")]"#, &doc).is_empty());
    assert_eq!(
        eval_values(r#"$.book[?match(@.title, ".*Lord.*")]"#, &doc).len(),
        1
    );
    // `search` finds a match anywhere.
    assert_eq!(
        eval_values(r#"$.book[?search(@.title, "Lord")]"#, &doc).len(),
        1
    );
    assert_eq!(
        eval_values(r#"$.book[?search(@.author, "^[JN]")]"#, &doc).len(),
        2
    );
    // Non-string operands are simply false.
    assert!(eval_values(r#"$.book[?match(@.missing, ".*")]"#, &doc).is_empty());
}

#[test]
fn dynamic_regex_pattern_matrix() {
    let doc = json!({
        "pattern": "^a+$",
        "values": [{"v": "aaa"}, {"v": "bbb"}]
    });
    assert_eq!(
        eval_values("$.values[?search(@.v, $.pattern)]", &doc),
        vec![json!({"v": "aaa"})]
    );

    // A dynamic pattern that fails to compile aborts the query.
    let doc = json!({"pattern": "[", "values": [{"v": "x"}]});
    let path = compile("$.values[?search(@.v, $.pattern)]", QueryOptions::default()).unwrap();
    assert!(matches!(
        path.query(&doc),
        Err(json_path_plus::QueryError::Regex { .. })
    ));
}

#[test]
fn value_function_matrix() {
    let doc = json!([
        {"isbn": "0-553-21311-3"},
        {"isbn": null},
        {}
    ]);
    assert_eq!(eval_values("$[?(value(@.isbn) != null)]", &doc).len(), 2);
    assert_eq!(eval_values("$[?(value(@.isbn) == null)]", &doc).len(), 1);
}

#[test]
fn type_test_functions_matrix() {
    let doc = json!([
        {"v": null},
        {"v": true},
        {"v": 42},
        {"v": 88.0},
        {"v": "s"},
        {"v": [1]},
        {"v": {"k": 1}}
    ]);
    assert_eq!(eval_values("$[?isNull(@.v)]", &doc), vec![json!({"v": null})]);
    assert_eq!(eval_values("$[?isBoolean(@.v)]", &doc), vec![json!({"v": true})]);
    // 42 is an integer; 88.0 carried as a float is not.
    assert_eq!(eval_values("$[?isInteger(@.v)]", &doc), vec![json!({"v": 42})]);
    assert_eq!(
        eval_values("$[?isNumber(@.v)]", &doc),
        vec![json!({"v": 42}), json!({"v": 88.0})]
    );
    assert_eq!(eval_values("$[?isString(@.v)]", &doc), vec![json!({"v": "s"})]);
    assert_eq!(eval_values("$[?isArray(@.v)]", &doc), vec![json!({"v": [1]})]);
    assert_eq!(
        eval_values("$[?isObject(@.v)]", &doc),
        vec![json!({"v": {"k": 1}})]
    );
    // A missing argument satisfies no type test.
    assert!(eval_values("$[?isNull(@.missing)]", &doc).is_empty());
}

#[test]
fn every_node_satisfies_exactly_one_type_test() {
    let doc = json!([
        {"v": null},
        {"v": false},
        {"v": 0},
        {"v": 0.5},
        {"v": ""},
        {"v": []},
        {"v": {}}
    ]);
    let tests = [
        "isNull", "isBoolean", "isNumber", "isString", "isArray", "isObject",
    ];
    let mut total = 0;
    for test in tests {
        total += eval_values(&format!("$[?{test}(@.v)]"), &doc).len();
    }
    assert_eq!(total, 7);
    // isInteger implies isNumber.
    let ints = eval_values("$[?isInteger(@.v)]", &doc);
    let nums = eval_values("$[?isNumber(@.v)]", &doc);
    for int in &ints {
        assert!(nums.contains(int));
    }
}

#[test]
fn function_type_errors_matrix() {
    assert!(matches!(compile_err("$[?unknown(@.a)]"), CompileError::Type(_, _)));
    assert!(matches!(
        compile_err("$[?(length(@.a, @.b) == 2)]"),
        CompileError::Type(_, _)
    ));
    assert!(matches!(
        compile_err("$[?(count(42) == 1)]"),
        CompileError::Type(_, _)
    ));
    assert!(matches!(
        compile_err("$[?(length(@.a))]"),
        CompileError::Type(_, _)
    ));
    assert!(matches!(
        compile_err(r#"$[?(match(@.a, "x") == true)]"#),
        CompileError::Type(_, _)
    ));
    // A literal pattern that fails to compile is caught at compile time.
    let err = compile_err(r#"$[?match(@.title, "[")]"#);
    assert!(matches!(err, CompileError::Type(_, _)));
}

#[test]
fn filters_nest_inside_embedded_paths() {
    let doc = json!({
        "store": {
            "book": [
                {"title": "A", "price": 10},
                {"title": "B", "price": 30}
            ]
        }
    });
    assert_eq!(
        eval_values("$[?(count(@.book[?(@.price > 20)]) == 1)]", &doc).len(),
        1
    );
}
