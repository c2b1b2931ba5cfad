//! Every fatal error class exits non-zero with a rendered diagnostic.

mod common;

use common::{expect_failure, run_script};

#[test]
fn unterminated_string() {
    let stderr = expect_failure("err_string", "var x = \"oops\n");
    assert!(stderr.contains("unterminated string literal"), "stderr: {stderr}");
    assert!(stderr.contains("1:9"), "stderr: {stderr}");
}

#[test]
fn unexpected_token() {
    let stderr = expect_failure("err_token", "var = 5\n");
    assert!(stderr.contains("expected identifier"), "stderr: {stderr}");
}

#[test]
fn parse_error_reports_only_the_first_failure() {
    let stderr = expect_failure("err_first", "var = 1\nvar = 2\n");
    assert!(stderr.contains("1:5"), "stderr: {stderr}");
    assert!(!stderr.contains("2:5"), "stderr: {stderr}");
}

#[test]
fn undeclared_variable() {
    let stderr = expect_failure("err_undeclared", "print $ghost\n");
    assert!(stderr.contains("cannot find variable `ghost`"), "stderr: {stderr}");
}

#[test]
fn redeclaration() {
    let stderr = expect_failure("err_redecl", "var x = 1\nvar x = 2\n");
    assert!(stderr.contains("already declared"), "stderr: {stderr}");
}

#[test]
fn operand_kind_mismatch() {
    let stderr = expect_failure("err_operand", "var x = true + 1\n");
    assert!(stderr.contains("cannot combine Bool and Integer"), "stderr: {stderr}");
}

#[test]
fn append_to_a_non_array() {
    let stderr = expect_failure("err_append", "var x = (append 5 1)\n");
    assert!(stderr.contains("append needs an Array"), "stderr: {stderr}");
}

#[test]
fn len_of_an_integer() {
    let stderr = expect_failure("err_len", "var x = (len 5)\n");
    assert!(stderr.contains("len needs a String or Array"), "stderr: {stderr}");
}

#[test]
fn diagnostics_carry_the_script_name() {
    let stderr = expect_failure("err_named", "print $ghost\n");
    assert!(stderr.contains("conch_test_err_named.cn"), "stderr: {stderr}");
}

#[test]
fn failing_external_is_not_fatal() {
    // exhausting PATH leaves the call without a value; the script goes on
    let output = run_script(
        "err_external",
        "notarealcommandxyz40721\nprint still-here\n",
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "still-here\n");
}

#[test]
fn runtime_errors_stop_execution() {
    let output = run_script("err_stops", "print before\nprint $nope\nprint after\n");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("before"), "stdout: {stdout}");
    assert!(!stdout.contains("after"), "stdout: {stdout}");
}
