// Integration tests for the basil pipeline: lexer, parser, evaluator, and
// diagnostic rendering, driven through the public `run` entry point.

use basil::{BasilError, ErrorKind, Expr, Lexer, Parser, SymbolTable, TokenKind, Value};
use pretty_assertions::assert_eq;

fn scan(source: &str) -> Result<Vec<basil::Token>, BasilError> {
    Lexer::new("<test>", source).scan_tokens()
}

fn parse(source: &str) -> Result<Expr, BasilError> {
    let tokens = scan(source)?;
    Parser::new(tokens).parse()
}

fn run_fresh(source: &str) -> Result<Option<Value>, BasilError> {
    let mut globals = SymbolTable::global();
    basil::run("<test>", source, &mut globals)
}

fn eval(source: &str) -> Value {
    run_fresh(source)
        .expect("program should succeed")
        .expect("program should produce a value")
}

fn eval_err(source: &str) -> BasilError {
    run_fresh(source).expect_err("program should fail")
}

// ============================================================================
// Lexer
// ============================================================================

#[test]
fn token_spans_cover_their_source_text() {
    let cases = [
        ("123", 3),
        ("3.14", 4),
        ("\"hi\"", 4),
        ("count", 5),
        ("WHILE", 5),
        ("+", 1),
        ("-", 1),
        ("*", 1),
        ("/", 1),
        ("^", 1),
        ("(", 1),
        (")", 1),
        ("=", 1),
        ("==", 2),
        ("!=", 2),
        ("<", 1),
        (">", 1),
        ("<=", 2),
        (">=", 2),
    ];

    for (source, len) in cases {
        let tokens = scan(source).expect("scan should succeed");
        assert_eq!(tokens.len(), 2, "one token plus EOF for {:?}", source);
        let span = &tokens[0].span;
        assert_eq!(span.end.offset - span.start.offset, len, "span of {:?}", source);
    }
}

#[test]
fn scans_expression_into_expected_kinds() {
    let tokens = scan("VAR total = 1 + 2.5").expect("scan should succeed");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Keyword(basil::Keyword::Var),
            TokenKind::Identifier,
            TokenKind::Eq,
            TokenKind::Int,
            TokenKind::Plus,
            TokenKind::Float,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn position_tracks_lines_and_columns_across_newlines() {
    // A newline can only occur inside a string literal; the token after it
    // starts on the next line with the column counted from zero.
    let tokens = scan("\"a\nb\" + 1").expect("scan should succeed");
    let plus = &tokens[1];
    assert_eq!(plus.kind, TokenKind::Plus);
    assert_eq!(plus.span.start.offset, 6);
    assert_eq!(plus.span.start.line, 1);
    assert_eq!(plus.span.start.column, 3);

    let string = &tokens[0];
    assert_eq!(string.span.start.line, 0);
    assert_eq!(string.span.end.line, 1);
}

#[test]
fn illegal_character_aborts_the_scan() {
    let error = scan("@").expect_err("scan should fail");
    assert_eq!(error.kind, ErrorKind::IllegalChar);
    assert_eq!(error.message, "'@'");
    assert_eq!(error.span.end.offset - error.span.start.offset, 1);
}

#[test]
fn raw_newline_is_an_illegal_character() {
    let error = scan("1 +\n2").expect_err("scan should fail");
    assert_eq!(error.kind, ErrorKind::IllegalChar);
}

#[test]
fn bang_without_equals_is_an_expected_character_error() {
    let error = scan("!").expect_err("scan should fail");
    assert_eq!(error.kind, ErrorKind::ExpectedChar);
    assert_eq!(error.message, "'=' (after '!')");
}

#[test]
fn string_escapes_and_silent_close() {
    assert_eq!(eval(r#""a\nb""#), Value::Str("a\nb".to_string()));
    assert_eq!(eval(r#""a\tb""#), Value::Str("a\tb".to_string()));
    // Any other escaped character stands for itself.
    assert_eq!(eval(r#""a\"b""#), Value::Str("a\"b".to_string()));
    // Unterminated strings close silently at end of input.
    assert_eq!(eval("\"abc"), Value::Str("abc".to_string()));
}

#[test]
fn second_dot_ends_a_number_literal() {
    // "1.2" lexes as a float; the stray dot is then an illegal character.
    let error = scan("1.2.3").expect_err("scan should fail");
    assert_eq!(error.kind, ErrorKind::IllegalChar);
    assert_eq!(error.message, "'.'");
}

// ============================================================================
// Parser
// ============================================================================

#[test]
fn trailing_token_after_expression_fails() {
    let error = parse("1 2").expect_err("parse should fail");
    assert_eq!(error.kind, ErrorKind::InvalidSyntax);
    assert_eq!(error.message, "Expected operator or EOF");
}

#[test]
fn unclosed_paren_reports_expected_rparen() {
    let error = parse("(1").expect_err("parse should fail");
    assert_eq!(error.message, "Expected ')'");
}

#[test]
fn var_requires_identifier_and_equals() {
    assert_eq!(
        parse("VAR = 5").expect_err("parse should fail").message,
        "Expected identifier"
    );
    assert_eq!(
        parse("VAR x 5").expect_err("parse should fail").message,
        "Expected '='"
    );
    // Keywords are not identifiers.
    assert_eq!(
        parse("VAR WHILE = 1").expect_err("parse should fail").message,
        "Expected identifier"
    );
}

#[test]
fn control_flow_keywords_are_required() {
    assert_eq!(
        parse("IF 1 1").expect_err("parse should fail").message,
        "Expected 'THEN'"
    );
    assert_eq!(
        parse("FOR i = 0 THEN 1").expect_err("parse should fail").message,
        "Expected 'TO'"
    );
    assert_eq!(
        parse("WHILE 1 1").expect_err("parse should fail").message,
        "Expected 'THEN'"
    );
}

#[test]
fn empty_input_reports_the_contextual_expr_error() {
    let error = parse("").expect_err("parse should fail");
    assert_eq!(
        error.message,
        "Expected 'VAR', 'IF', 'FOR', 'WHILE', int, float, identifier, '+', '-', '('"
    );
}

#[test]
fn dangling_operator_keeps_the_deepest_error() {
    // The failing operand consumed no tokens, but the enclosing chain did,
    // so the atom-level message wins over the contextual one.
    let error = parse("1 +").expect_err("parse should fail");
    assert_eq!(
        error.message,
        "Expected int, float, identifier, '+', '-', '(', 'IF', 'FOR', 'WHILE'"
    );
}

#[test]
fn call_argument_is_parsed_for_syntax() {
    assert!(parse("f()").is_ok());
    assert!(parse("f(1 + 2)").is_ok());
    // A single argument only; there is no comma in the language.
    assert_eq!(
        parse("f(1 2)").expect_err("parse should fail").message,
        "Expected ',' or ')'"
    );
}

// ============================================================================
// Arithmetic and operator semantics
// ============================================================================

#[test]
fn arithmetic_precedence_matches_host_arithmetic() {
    assert_eq!(eval("1 + 2 * 3"), Value::Int(7));
    assert_eq!(eval("(1 + 2) * 3"), Value::Int(9));
    assert_eq!(eval("10 - 2 - 3"), Value::Int(5));
    assert_eq!(eval("1 - -2"), Value::Int(3));
    assert_eq!(eval("+5"), Value::Int(5));
    assert_eq!(eval("2 + 0.5"), Value::Double(2.5));
}

#[test]
fn power_is_right_associative_and_binds_above_unary_minus() {
    assert_eq!(eval("2 ^ 3 ^ 2"), Value::Int(512));
    assert_eq!(eval("-2 ^ 2"), Value::Int(-4));
    assert_eq!(eval("2 ^ -1"), Value::Double(0.5));
}

#[test]
fn int_literal_past_i64_range_becomes_a_double() {
    // One past i64::MAX; 2^63 is exactly representable as a double.
    assert_eq!(eval("9223372036854775808"), Value::Double(9223372036854775808.0));
}

#[test]
fn int_arithmetic_promotes_to_double_on_overflow() {
    assert_eq!(
        eval("9223372036854775807 + 1"),
        Value::Double(9223372036854775807.0 + 1.0)
    );
    assert_eq!(
        eval("9223372036854775807 * 2"),
        Value::Double(9223372036854775807.0 * 2.0)
    );
    assert_eq!(
        eval("0 - 9223372036854775807 - 2"),
        Value::Double(-9223372036854775807.0 - 2.0)
    );
}

#[test]
fn division_always_yields_a_double() {
    assert_eq!(eval("1 / 0.5"), Value::Double(2.0));
    assert_eq!(eval("6 / 3"), Value::Double(2.0));
    assert_eq!(eval("5 / 2"), Value::Double(2.5));
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let error = eval_err("1 / 0");
    assert_eq!(error.kind, ErrorKind::Runtime);
    assert_eq!(error.message, "Can not divide anything by 0");

    let error = eval_err("1 / 0.0");
    assert_eq!(error.message, "Can not divide anything by 0");
}

#[test]
fn comparisons_yield_number_zero_or_one() {
    assert_eq!(eval("3 > 2"), Value::Int(1));
    assert_eq!(eval("3 < 2"), Value::Int(0));
    assert_eq!(eval("2 <= 2"), Value::Int(1));
    assert_eq!(eval("1 != 2"), Value::Int(1));
    assert_eq!(eval("1 == 1.0"), Value::Int(1));
}

#[test]
fn logic_operators_select_by_truthiness() {
    assert_eq!(eval("1 AND 2"), Value::Int(2));
    assert_eq!(eval("0 AND 2"), Value::Int(0));
    assert_eq!(eval("0 OR 5"), Value::Int(5));
    assert_eq!(eval("1 OR 5"), Value::Int(1));
    assert_eq!(eval("1 AND 2 OR 0"), Value::Int(2));
}

#[test]
fn logic_operators_do_not_short_circuit() {
    let error = eval_err("1 OR missing");
    assert_eq!(error.message, "'missing' is not defined");
}

#[test]
fn string_operators() {
    assert_eq!(eval("\"ab\" + \"cd\""), Value::Str("abcd".to_string()));
    assert_eq!(eval("\"ab\" * 3"), Value::Str("ababab".to_string()));
    // Negative repetition clamps to the empty string, so unary minus (which
    // is multiplication by -1) empties a string.
    assert_eq!(eval("\"ab\" * -1"), Value::Str(String::new()));
    assert_eq!(eval("-\"ab\""), Value::Str(String::new()));
}

#[test]
fn incompatible_operand_kinds_are_illegal_operations() {
    for source in ["\"ab\" + 1", "1 + \"ab\"", "\"a\" < \"b\"", "\"ab\" * 0.5"] {
        let error = eval_err(source);
        assert_eq!(error.kind, ErrorKind::Runtime, "source: {:?}", source);
        assert_eq!(error.message, "Illegal operation", "source: {:?}", source);
    }
}

// ============================================================================
// Variables and scope
// ============================================================================

#[test]
fn assignment_binds_and_returns_the_value() {
    let mut globals = SymbolTable::global();
    let result = basil::run("<test>", "VAR x = 5", &mut globals).expect("run should succeed");
    assert_eq!(result, Some(Value::Int(5)));

    let result = basil::run("<test>", "x", &mut globals).expect("run should succeed");
    assert_eq!(result, Some(Value::Int(5)));
}

#[test]
fn undefined_variable_is_a_runtime_error() {
    let error = eval_err("x");
    assert_eq!(error.kind, ErrorKind::Runtime);
    assert_eq!(error.message, "'x' is not defined");
}

#[test]
fn runs_with_separate_tables_do_not_share_bindings() {
    let mut first = SymbolTable::global();
    basil::run("<test>", "VAR x = 5", &mut first).expect("run should succeed");

    let mut second = SymbolTable::global();
    let error = basil::run("<test>", "x", &mut second).expect_err("x should be unbound");
    assert_eq!(error.message, "'x' is not defined");
}

#[test]
fn global_constants_are_preloaded() {
    assert_eq!(eval("NULL"), Value::Int(0));
    assert_eq!(eval("FALSE"), Value::Int(0));
    assert_eq!(eval("TRUE"), Value::Int(1));
}

#[test]
fn side_effects_before_an_error_persist() {
    let mut globals = SymbolTable::global();
    let error = basil::run("<test>", "(VAR b = 2) + missing", &mut globals)
        .expect_err("run should fail");
    assert_eq!(error.message, "'missing' is not defined");
    assert_eq!(globals.get("b"), Some(Value::Int(2)));
}

#[test]
fn parent_scope_lookup_and_local_write() {
    let mut outer = SymbolTable::global();
    outer.set("x", Value::Int(1));

    let mut inner = SymbolTable::with_parent(&outer);
    assert_eq!(inner.get("x"), Some(Value::Int(1)));

    inner.set("x", Value::Int(2));
    assert_eq!(inner.get("x"), Some(Value::Int(2)));
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn if_takes_the_first_true_branch() {
    assert_eq!(eval("IF 0 THEN 1 ELSE 2"), Value::Int(2));
    assert_eq!(eval("IF 1 THEN 1 ELSE 2"), Value::Int(1));
    assert_eq!(eval("IF 0 THEN 1 ELIF 1 THEN 2 ELSE 3"), Value::Int(2));
}

#[test]
fn if_with_no_branch_taken_produces_no_value() {
    let result = run_fresh("IF 0 THEN 1").expect("run should succeed");
    assert_eq!(result, None);
}

#[test]
fn string_truthiness_drives_conditions() {
    assert_eq!(eval("IF \"x\" THEN 1 ELSE 2"), Value::Int(1));
    assert_eq!(eval("IF \"\" THEN 1 ELSE 2"), Value::Int(2));
}

#[test]
fn for_loop_counts_to_an_exclusive_end() {
    let mut globals = SymbolTable::global();
    let result = basil::run("<test>", "FOR i = 0 TO 3 THEN VAR x = i", &mut globals)
        .expect("run should succeed");
    assert_eq!(result, None);
    // The loop ran for i = 0, 1, 2; the counter leaks past the loop end.
    assert_eq!(globals.get("x"), Some(Value::Int(2)));
    assert_eq!(globals.get("i"), Some(Value::Int(2)));
}

#[test]
fn for_loop_with_negative_step_counts_down() {
    let mut globals = SymbolTable::global();
    basil::run("<test>", "FOR i = 5 TO 0 STEP -1 THEN VAR x = i", &mut globals)
        .expect("run should succeed");
    assert_eq!(globals.get("x"), Some(Value::Int(1)));
}

#[test]
fn for_loop_with_no_iterations_runs_no_body() {
    let mut globals = SymbolTable::global();
    basil::run("<test>", "FOR i = 3 TO 0 THEN VAR x = i", &mut globals)
        .expect("run should succeed");
    assert_eq!(globals.get("x"), None);
}

#[test]
fn while_loop_reevaluates_its_condition() {
    let mut globals = SymbolTable::global();
    basil::run("<test>", "VAR i = 0", &mut globals).expect("run should succeed");
    let result = basil::run("<test>", "WHILE i < 3 THEN VAR i = i + 1", &mut globals)
        .expect("run should succeed");
    assert_eq!(result, None);
    assert_eq!(globals.get("i"), Some(Value::Int(3)));
}

#[test]
fn a_valueless_result_cannot_be_an_operand() {
    let error = eval_err("1 + (WHILE 0 THEN 1)");
    assert_eq!(error.message, "Illegal operation");
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn lexical_error_rendering_names_file_and_line() {
    let error = scan("@").expect_err("scan should fail");
    assert_eq!(error.to_string(), "Illegal Character: '@'\nFile <test>, line 1");
}

#[test]
fn syntax_error_rendering_names_file_and_line() {
    let error = parse("(1").expect_err("parse should fail");
    assert_eq!(error.to_string(), "Invalid Syntax: Expected ')'\nFile <test>, line 1");
}

#[test]
fn runtime_error_rendering_includes_a_traceback() {
    let error = eval_err("x");
    assert_eq!(
        error.to_string(),
        "Traceback (most recent call last):\n  File <test>, line 1, in <program>\nRuntime Error: 'x' is not defined"
    );
}
