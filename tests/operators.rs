mod common;

use common::{expect_failure, expect_stdout};

#[test]
fn arithmetic() {
    assert_eq!(expect_stdout("op_sum", "var x = 1 + 2\nprint $x\n"), "3\n");
    assert_eq!(expect_stdout("op_mix", "var x = 10 - 2 * 3\nprint $x\n"), "4\n");
    assert_eq!(expect_stdout("op_div", "var x = 7 / 2\nprint $x\n"), "3\n");
    assert_eq!(expect_stdout("op_mod", "var x = 7 % 3\nprint $x\n"), "1\n");
}

#[test]
fn left_associativity() {
    assert_eq!(
        expect_stdout("op_left", "var x = 10 - 4 - 3\nprint $x\n"),
        "3\n"
    );
    assert_eq!(
        expect_stdout("op_left_div", "var x = 24 / 4 / 3\nprint $x\n"),
        "2\n"
    );
}

#[test]
fn comparisons() {
    assert_eq!(
        expect_stdout("op_cmp", "var r = 2 < 3\nprint $r\n"),
        "true\n"
    );
    // `+` binds tighter than `<`
    assert_eq!(
        expect_stdout("op_cmp_chain", "var r = 2 + 1 < 4\nprint $r\n"),
        "true\n"
    );
}

#[test]
fn equality_on_bools_and_integers() {
    assert_eq!(expect_stdout("op_eq_int", "var r = 4 == 4\nprint $r\n"), "true\n");
    assert_eq!(expect_stdout("op_ne_int", "var r = 4 != 4\nprint $r\n"), "false\n");
    assert_eq!(
        expect_stdout("op_eq_bool", "var r = true == false\nprint $r\n"),
        "false\n"
    );
}

#[test]
fn equality_on_strings_is_an_error() {
    let stderr = expect_failure("op_eq_str", "var r = hello == hello\nprint $r\n");
    assert!(stderr.contains("cannot combine"), "stderr: {stderr}");
}

#[test]
fn logical_operators() {
    assert_eq!(
        expect_stdout("op_and", "var r = true && false\nprint $r\n"),
        "false\n"
    );
    assert_eq!(
        expect_stdout("op_or", "var r = false || true\nprint $r\n"),
        "true\n"
    );
    // || binds looser than &&
    assert_eq!(
        expect_stdout("op_prec_logic", "var r = true || false && false\nprint $r\n"),
        "true\n"
    );
}

#[test]
fn unary_operators() {
    assert_eq!(expect_stdout("op_neg", "var x = -5\nprint $x\n"), "-5\n");
    assert_eq!(expect_stdout("op_not", "var x = !false\nprint $x\n"), "true\n");
}

#[test]
fn division_by_zero_fails() {
    let stderr = expect_failure("op_div_zero", "var x = 1 / 0\n");
    assert!(stderr.contains("division by zero"), "stderr: {stderr}");
}

#[test]
fn mixed_kind_arithmetic_fails() {
    let stderr = expect_failure("op_mixed", "var x = 1 + true\n");
    assert!(stderr.contains("cannot combine"), "stderr: {stderr}");
}

#[test]
fn ampersand_is_not_an_expression_operator() {
    let stderr = expect_failure("op_ampersand", "var x = 1 & 2\n");
    assert!(stderr.contains("expected"), "stderr: {stderr}");
}
