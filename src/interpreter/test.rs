use pretty_assertions::assert_eq;

use super::{Environment, Evaluator, Object};
use crate::parser::{parse, tokenize_string};

fn run(input: &str, env: &Environment) -> (Object, String) {
    let (program, errors) = parse(tokenize_string(input));
    assert!(errors.is_empty(), "parse errors for \"{}\": {:?}", input, errors);
    let mut evaluator = Evaluator::new(Vec::new());
    let result = evaluator.eval_program(&program, env);
    let output = String::from_utf8(evaluator.into_output()).expect("output is utf-8");
    (result, output)
}

fn eval(input: &str) -> Object {
    run(input, &Environment::new()).0
}

fn assert_integer(input: &str, expected: i64) {
    match eval(input) {
        Object::Integer(value) => assert_eq!(expected, value, "for \"{}\"", input),
        other => panic!("expected {} for \"{}\", got {:?}", expected, input, other),
    }
}

fn assert_boolean(input: &str, expected: bool) {
    match eval(input) {
        Object::Boolean(value) => assert_eq!(expected, value, "for \"{}\"", input),
        other => panic!("expected {} for \"{}\", got {:?}", expected, input, other),
    }
}

fn assert_null(input: &str) {
    let result = eval(input);
    assert!(matches!(result, Object::Null), "expected null for \"{}\", got {:?}", input, result);
}

fn assert_error(input: &str, msg: &str) {
    match eval(input) {
        Object::Error(actual) => assert_eq!(msg, actual, "for \"{}\"", input),
        other => panic!("expected error \"{}\" for \"{}\", got {:?}", msg, input, other),
    }
}

fn assert_integer_array(input: &str, expected: &[i64]) {
    match eval(input) {
        Object::Array(elements) => {
            let actual = elements
                .iter()
                .map(|e| match e {
                    Object::Integer(value) => *value,
                    other => panic!("expected integer element, got {:?}", other),
                })
                .collect::<Vec<_>>();
            assert_eq!(expected.to_vec(), actual, "for \"{}\"", input);
        }
        other => panic!("expected array for \"{}\", got {:?}", input, other),
    }
}

#[test]
fn test_integer_expressions() {
    let cases = [
        ("5", 5),
        ("10", 10),
        ("-5", -5),
        ("-10", -10),
        ("5 + 5 + 5 + 5 - 10", 10),
        ("2 * 2 * 2 * 2 * 2", 32),
        ("-50 + 100 + -50", 0),
        ("5 * 2 + 10", 20),
        ("5 + 2 * 10", 25),
        ("20 + 2 * -10", 0),
        ("50 / 2 * 2 + 10", 60),
        ("2 * (5 + 10)", 30),
        ("3 * 3 * 3 + 10", 37),
        ("3 * (3 * 3) + 10", 37),
        ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
        ("7 / 2", 3),
        ("-7 / 2", -3),
        ("7 / -2", -3),
    ];
    for (input, expected) in cases {
        assert_integer(input, expected);
    }
}

#[test]
fn test_integer_operators_match_native() {
    let operands = [-17i64, -3, -1, 1, 2, 5, 42];
    for a in operands {
        for b in operands {
            assert_integer(&format!("{} + {}", a, b), a + b);
            assert_integer(&format!("{} - {}", a, b), a - b);
            assert_integer(&format!("{} * {}", a, b), a * b);
            assert_integer(&format!("{} / {}", a, b), a / b);
            assert_boolean(&format!("{} < {}", a, b), a < b);
            assert_boolean(&format!("{} > {}", a, b), a > b);
            assert_boolean(&format!("{} == {}", a, b), a == b);
            assert_boolean(&format!("{} != {}", a, b), a != b);
        }
    }
}

#[test]
fn test_integer_overflow_wraps() {
    assert_integer("9223372036854775807 + 1", i64::MIN);
    assert_integer("-9223372036854775807 - 2", i64::MAX);
}

#[test]
fn test_division_by_zero() {
    assert_error("1 / 0", "division by zero");
    assert_error("let f = fn(x) { 10 / x }; f(0); 99", "division by zero");
}

#[test]
fn test_boolean_expressions() {
    let cases = [
        ("true", true),
        ("false", false),
        ("1 < 2", true),
        ("1 > 2", false),
        ("1 < 1", false),
        ("1 == 1", true),
        ("1 != 1", false),
        ("1 == 2", false),
        ("true == true", true),
        ("false == false", true),
        ("true == false", false),
        ("true != false", true),
        ("(1 < 2) == true", true),
        ("(1 > 2) == true", false),
        ("(1 > 2) == false", true),
    ];
    for (input, expected) in cases {
        assert_boolean(input, expected);
    }
}

#[test]
fn test_equality_is_identity_for_heap_values() {
    assert_boolean("[1] == [1]", false);
    assert_boolean("let a = [1]; a == a", true);
    assert_boolean("let f = fn() { 1 }; f == f", true);
    assert_boolean("fn() { 1 } == fn() { 1 }", false);
    assert_boolean("{} != {}", true);
    assert_boolean("len == len", true);
    assert_boolean("1 == true", false);
    assert_boolean("if (false) { 1 } == if (false) { 2 }", true);
}

#[test]
fn test_bang_operator() {
    let cases = [
        ("!true", false),
        ("!false", true),
        ("!5", false),
        ("!0", false),
        ("!!true", true),
        ("!!false", false),
        ("!!5", true),
        ("!!0", true),
    ];
    for (input, expected) in cases {
        assert_boolean(input, expected);
    }
}

#[test]
fn test_if_else_expressions() {
    assert_integer("if (true) { 10 }", 10);
    assert_null("if (false) { 10 }");
    assert_integer("if (1) { 10 }", 10);
    assert_integer("if (0) { 10 }", 10);
    assert_integer("if (1 < 2) { 10 }", 10);
    assert_null("if (1 > 2) { 10 }");
    assert_integer("if (1 > 2) { 10 } else { 20 }", 20);
    assert_integer("if (1 < 2) { 10 } else { 20 }", 10);
    assert_null("if (1 < 2) { }");
}

#[test]
fn test_return_statements() {
    assert_integer("return 10;", 10);
    assert_integer("return 10; 9;", 10);
    assert_integer("return 2 * 5; 9;", 10);
    assert_integer("9; return 2 * 5; 9;", 10);
    assert_integer(
        "if (10 > 1) { if (10 > 1) { return 10; } return 1; }",
        10,
    );
    assert_integer(
        "let f = fn(x) { return x; x + 10; }; f(10);",
        10,
    );
    assert_integer(
        "let f = fn(x) { let result = x + 10; return result; return 10; }; f(10);",
        20,
    );
}

#[test]
fn test_error_handling() {
    let cases = [
        ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
        ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
        ("-true", "unknown operator: -BOOLEAN"),
        ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
        ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
        ("if (10 > 1) { true + false; }", "unknown operator: BOOLEAN + BOOLEAN"),
        (
            "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
            "unknown operator: BOOLEAN + BOOLEAN",
        ),
        ("foobar", "identifier not found: foobar"),
        ("\"Hello\" - \"World\"", "unknown operator: STRING - STRING"),
        ("\"a\" == \"a\"", "unknown operator: STRING == STRING"),
        ("\"a\" + 1", "type mismatch: STRING + INTEGER"),
        ("true < 1", "type mismatch: BOOLEAN < INTEGER"),
        ("-\"a\"", "unknown operator: -STRING"),
        ("{\"name\": \"Monkey\"}[fn(x) { x }];", "unusable as hash key: FUNCTION"),
        ("{[1]: 2}", "unusable as hash key: ARRAY"),
        ("1(2)", "not a function: INTEGER"),
        ("\"f\"()", "not a function: STRING"),
        ("5[0]", "index operator not supported: INTEGER"),
        ("[1, 2][true]", "index operator not supported: ARRAY"),
        ("let x = -true; 5", "unknown operator: -BOOLEAN"),
        ("[1, foo, 3]", "identifier not found: foo"),
        ("len(1, missing)", "identifier not found: missing"),
        ("missing(1)", "identifier not found: missing"),
        ("{1: missing}", "identifier not found: missing"),
        ("while (missing) { 1 }", "identifier not found: missing"),
    ];
    for (input, expected) in cases {
        assert_error(input, expected);
    }
}

#[test]
fn test_error_stops_the_program() {
    let env = Environment::new();
    let (result, output) = run("puts(1); 5 + true; puts(2); let x = 3;", &env);
    assert!(result.is_error());
    assert_eq!("1\n", output);
    assert!(env.get("x").is_none());
}

#[test]
fn test_error_stops_sibling_evaluation() {
    let cases = [
        ("[puts(1), missing, puts(2)]", "1\n"),
        ("missing + puts(3)", ""),
        ("puts(3) + missing", "3\n"),
        ("len(puts(4), missing, puts(5))", "4\n"),
        ("{1: puts(6), missing: 2, 3: puts(7)}", "6\n"),
        ("{1: missing, puts(8): 2}", ""),
        ("missing(puts(9))", ""),
        ("if (missing) { puts(10) } else { puts(11) }", ""),
        ("let f = fn(x) { puts(x); missing; puts(x) }; f(12)", "12\n"),
    ];
    for (input, expected) in cases {
        let (result, output) = run(input, &Environment::new());
        match result {
            Object::Error(msg) => assert_eq!("identifier not found: missing", msg, "for \"{}\"", input),
            other => panic!("expected error for \"{}\", got {:?}", input, other),
        }
        assert_eq!(expected, output, "for \"{}\"", input);
    }
}

#[test]
fn test_let_statements() {
    assert_integer("let a = 5; a;", 5);
    assert_integer("let a = 5 * 5; a;", 25);
    assert_integer("let a = 5; let b = a; b;", 5);
    assert_integer("let a = 5; let b = a; let c = a + b + 5; c;", 15);
    assert_null("let a = 5;");
}

#[test]
fn test_function_object() {
    match eval("fn(x) { x + 2; };") {
        Object::Function(function) => {
            assert_eq!(1, function.literal.parameters.len());
            assert_eq!("x", function.literal.parameters[0].as_str());
            assert_eq!("(x + 2)", function.literal.body.to_string());
        }
        other => panic!("expected function, got {:?}", other),
    }
    assert_eq!("fn(x, y) {\n(x + y)\n}", eval("fn(x, y) { x + y }").to_string());
}

#[test]
fn test_function_application() {
    assert_integer("let identity = fn(x) { x; }; identity(5);", 5);
    assert_integer("let identity = fn(x) { return x; }; identity(5);", 5);
    assert_integer("let double = fn(x) { x * 2; }; double(5);", 10);
    assert_integer("let add = fn(x, y) { x + y; }; add(5, 5);", 10);
    assert_integer("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20);
    assert_integer("fn(x) { x; }(5)", 5);
    assert_null("fn() { }()");
}

#[test]
fn test_function_arity_mismatch() {
    assert_error(
        "let add = fn(x, y) { x + y }; add(1);",
        "wrong number of arguments: want=2, got=1",
    );
    assert_error(
        "let one = fn() { 1 }; one(1, 2);",
        "wrong number of arguments: want=0, got=2",
    );
}

#[test]
fn test_closures() {
    let env = Environment::new();
    let source = "let newAdder = fn(x) { fn(y) { x + y } }; let addTwo = newAdder(2);";
    run(source, &env);
    assert!(matches!(run("addTwo(3);", &env).0, Object::Integer(5)));
    assert!(matches!(run("addTwo(10);", &env).0, Object::Integer(12)));
    assert!(matches!(run("newAdder(7)(1);", &env).0, Object::Integer(8)));
}

#[test]
fn test_closures_see_later_bindings() {
    assert_integer("let x = 1; let f = fn() { x }; let x = 2; f()", 2);
    assert_integer("let f = fn() { g() }; let g = fn() { 7 }; f()", 7);
}

#[test]
fn test_parameters_shadow_without_leaking() {
    let env = Environment::new();
    let (result, _) = run("let x = 10; let f = fn(x) { let y = x * 2; y }; f(3)", &env);
    assert!(matches!(result, Object::Integer(6)));
    assert!(matches!(env.get("x"), Some(Object::Integer(10))));
    assert!(env.get("y").is_none());
}

#[test]
fn test_recursion() {
    assert_integer(
        "let fib = fn(n) { if (n < 2) { n } else { fib(n - 1) + fib(n - 2) } }; fib(15)",
        610,
    );
}

#[test]
fn test_while_loops() {
    assert_integer("let i = 0; while (i < 5) { let i = i + 1; }; i", 5);
    assert_null("let i = 0; while (i < 3) { let i = i + 1; }");
    assert_null("while (false) { 1 }");
    assert_integer(
        "let sum = 0; let i = 1; while (i < 11) { let sum = sum + i; let i = i + 1; } sum",
        55,
    );
    assert_integer(
        "let find = fn(limit) { let i = 0; while (true) { if (i > limit) { return i; } let i = i + 1; } }; find(3)",
        4,
    );
    assert_error(
        "let i = 0; while (i < 3) { let i = i + true; }",
        "type mismatch: INTEGER + BOOLEAN",
    );
}

#[test]
fn test_while_return_at_top_level() {
    assert_integer("while (true) { return 3; }; 4", 3);
}

#[test]
fn test_string_literals() {
    match eval("\"Hello World!\"") {
        Object::Str(value) => assert_eq!("Hello World!", &*value.to_string()),
        other => panic!("expected string, got {:?}", other),
    }
    match eval("\"Hello\" + \" \" + \"World!\"") {
        Object::Str(value) => assert_eq!("Hello World!", &*value.to_string()),
        other => panic!("expected string, got {:?}", other),
    }
}

#[test]
fn test_builtin_functions() {
    assert_integer("len(\"\")", 0);
    assert_integer("len(\"four\")", 4);
    assert_integer("len(\"hello world\")", 11);
    assert_integer("len([1, 2, 3])", 3);
    assert_integer("len([])", 0);
    assert_error("len(1)", "argument to `len` not supported, got INTEGER");
    assert_error("len(\"one\", \"two\")", "wrong number of arguments. got=2, want=1");
    assert_integer("first([1, 2, 3])", 1);
    assert_null("first([])");
    assert_error("first()", "wrong number of arguments. wanted 1 got 0");
    assert_error("first(\"abc\")", "arguments to `first` must be ARRAY");
    assert_integer("last([1, 2, 3])", 3);
    assert_null("last([])");
    assert_error("last()", "wrong number of arguments. wanted 1 got 0");
    assert_error("last(\"abc\")", "arguments to `last` must be ARRAY");
    assert_integer_array("rest([1, 2, 3])", &[2, 3]);
    assert_integer_array("rest([1])", &[]);
    assert_null("rest([])");
    assert_error("rest()", "wrong number of arguments. wanted 1 got 0");
    assert_error("rest(\"abc\")", "arguments to `rest` must be ARRAY");
    assert_integer_array("push([1, 2, 3], 1)", &[1, 2, 3, 1]);
    assert_integer_array("push([], 1)", &[1]);
    assert_error("push()", "wrong number of arguments. wanted 2 got 0");
    assert_error("push(\"abc\", 1)", "first argument to `push` must be ARRAY");
}

#[test]
fn test_rest_and_push_do_not_mutate() {
    assert_integer_array("let a = [1, 2, 3]; let b = push(a, 4); rest(a); a", &[1, 2, 3]);
    assert_integer_array("let a = [1, 2]; let b = push(a, 3); b", &[1, 2, 3]);
}

#[test]
fn test_builtins_can_be_shadowed_and_passed() {
    assert_integer("let len = fn(x) { 42 }; len([1])", 42);
    assert_integer("let apply = fn(f, x) { f(x) }; apply(len, \"abc\")", 3);
}

#[test]
fn test_puts_writes_to_output() {
    let (result, output) = run("puts(1, \"two\", [3, 4], true); puts()", &Environment::new());
    assert!(matches!(result, Object::Null));
    assert_eq!("1\ntwo\n[3, 4]\ntrue\n", output);
}

#[test]
fn test_array_literals() {
    assert_integer_array("[1, 2 * 2, 3 + 3]", &[1, 4, 6]);
    assert_eq!("[1, two, [3]]", eval("[1, \"two\", [3]]").to_string());
}

#[test]
fn test_array_index_expressions() {
    assert_integer("[1, 2, 3][0]", 1);
    assert_integer("[1, 2, 3][1]", 2);
    assert_integer("[1, 2, 3][2]", 3);
    assert_integer("let i = 0; [1][i];", 1);
    assert_integer("[1, 2, 3][1 + 1];", 3);
    assert_integer("let myArray = [1, 2, 3]; myArray[2];", 3);
    assert_integer("let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];", 6);
    assert_integer("let myArray = [1, 2, 3]; let i = myArray[0]; myArray[i]", 2);
    assert_null("[1, 2, 3][3]");
    assert_null("[1, 2, 3][-1]");
}

#[test]
fn test_hash_literals() {
    let input = r#"let two = "two";
    {
        "one": 10 - 9,
        two: 1 + 1,
        "thr" + "ee": 6 / 2,
        4: 4,
        true: 5,
        false: 6
    }"#;
    let Object::Hash(hash) = eval(input) else {
        panic!("expected a hash");
    };
    let expected = [
        (Object::Str("one".into()), 1),
        (Object::Str("two".into()), 2),
        (Object::Str("three".into()), 3),
        (Object::Integer(4), 4),
        (Object::Boolean(true), 5),
        (Object::Boolean(false), 6),
    ];
    assert_eq!(expected.len(), hash.pairs.len());
    for (key, value) in expected {
        let hash_key = key.hash_key().expect("hashable key");
        match hash.get(&hash_key) {
            Some(Object::Integer(actual)) => assert_eq!(value, *actual),
            other => panic!("wrong value for {}: {:?}", key, other),
        }
    }
}

#[test]
fn test_hash_duplicate_keys_overwrite() {
    assert_integer("let h = {\"a\": 1, \"a\": 2}; h[\"a\"]", 2);
    assert_integer("len([{1: 1, 1: 2}])", 1);
    assert_eq!("{a: 2}", eval("{\"a\": 1, \"a\": 2}").to_string());
}

#[test]
fn test_hash_index_expressions() {
    assert_integer("{\"foo\": 5}[\"foo\"]", 5);
    assert_null("{\"foo\": 5}[\"bar\"]");
    assert_integer("let key = \"foo\"; {\"foo\": 5}[key]", 5);
    assert_null("{}[\"foo\"]");
    assert_integer("{5: 5}[5]", 5);
    assert_integer("{true: 5}[true]", 5);
    assert_integer("{false: 5}[false]", 5);
    assert_integer("{\"a\": 1}[\"a\"]", 1);
    assert_integer("{\"a\" + \"b\": 1}[\"ab\"]", 1);
}

#[test]
fn test_hash_keys_of_different_types_differ() {
    assert_null("{1: \"int\"}[true]");
    assert_null("{true: \"bool\"}[1]");
    assert_null("{0: \"int\"}[false]");
}

#[test]
fn test_string_hash_key() {
    let hello1 = Object::Str("Hello World".into());
    let hello2 = Object::Str("Hello World".into());
    let diff1 = Object::Str("My name is johnny".into());
    let diff2 = Object::Str("My name is johnny".into());
    assert_eq!(hello1.hash_key(), hello2.hash_key());
    assert_eq!(diff1.hash_key(), diff2.hash_key());
    assert_ne!(hello1.hash_key(), diff1.hash_key());
    assert_ne!(Object::Integer(1).hash_key(), Object::Boolean(true).hash_key());
    assert_eq!(None, Object::Null.hash_key());
}

#[test]
fn test_object_rendering() {
    assert_eq!("5", Object::Integer(5).to_string());
    assert_eq!("true", Object::Boolean(true).to_string());
    assert_eq!("null", Object::Null.to_string());
    assert_eq!("raw", Object::Str("raw".into()).to_string());
    assert_eq!("ERROR: boom", Object::error("boom").to_string());
    assert_eq!("builtin function", eval("puts").to_string());
}

#[test]
fn test_environment() {
    let global = Environment::new();
    let returned = global.set("a", Object::Integer(1));
    assert!(matches!(returned, Object::Integer(1)));

    let inner = Environment::new_enclosed(&global);
    inner.set("b", Object::Integer(2));
    assert!(matches!(inner.get("a"), Some(Object::Integer(1))));
    assert!(matches!(inner.get("b"), Some(Object::Integer(2))));
    assert!(global.get("b").is_none());

    inner.set("a", Object::Integer(3));
    assert!(matches!(inner.get("a"), Some(Object::Integer(3))));
    assert!(matches!(global.get("a"), Some(Object::Integer(1))));

    global.set("c", Object::Integer(4));
    assert!(matches!(inner.get("c"), Some(Object::Integer(4))));
}

#[test]
fn test_environment_persists_between_programs() {
    let env = Environment::new();
    run("let counter = 1;", &env);
    run("let counter = counter + 1;", &env);
    assert!(matches!(run("counter", &env).0, Object::Integer(2)));
}
