mod common;

use common::{expect_failure, expect_stdout};

#[test]
fn while_counts() {
    let source = "\
var i = 0
while $i < 3 {
  print $i
  $i = $i + 1
}
";
    assert_eq!(expect_stdout("while_counts", source), "0\n1\n2\n");
}

#[test]
fn while_with_false_condition_never_runs() {
    let source = "while false {\n print never\n}\nprint done\n";
    assert_eq!(expect_stdout("while_false", source), "done\n");
}

#[test]
fn else_if_chain() {
    let source = "\
var x = 2
if $x > 3 {
  print big
} else if $x > 1 {
  print medium
} else {
  print small
}
";
    assert_eq!(expect_stdout("else_if", source), "medium\n");
}

#[test]
fn if_without_else() {
    let source = "if true {\n print yes\n}\nif false {\n print no\n}\nprint end\n";
    assert_eq!(expect_stdout("if_no_else", source), "yes\nend\n");
}

#[test]
fn scopes_nest_and_rebind() {
    let source = "\
var x = 1
{
  var y = 10
  $x = $x + $y
}
print $x
";
    assert_eq!(expect_stdout("scopes_rebind", source), "11\n");
}

#[test]
fn scope_locals_die_with_the_scope() {
    let source = "{\n var y = 1\n}\nprint $y\n";
    let stderr = expect_failure("scope_locals", source);
    assert!(stderr.contains("cannot find variable `y`"), "stderr: {stderr}");
}

#[test]
fn loop_body_runs_in_a_fresh_scope() {
    // declaring inside the body would be a redeclaration if the scope leaked
    let source = "\
for x in [ 1 2 ] {
  var tmp = $x
  print $tmp
}
";
    assert_eq!(expect_stdout("loop_fresh_scope", source), "1\n2\n");
}

#[test]
fn non_bool_condition_fails() {
    let stderr = expect_failure("non_bool_cond", "if 5 {\n print hi\n}\n");
    assert!(stderr.contains("condition must be Bool"), "stderr: {stderr}");
}

#[test]
fn non_array_iterable_fails() {
    let stderr = expect_failure("non_array_iter", "for x in 5 {\n print $x\n}\n");
    assert!(stderr.contains("needs an Array"), "stderr: {stderr}");
}

#[test]
fn for_binding_shadows_outer_variable() {
    let source = "\
var x = 99
for x in [ 1 2 ] {
  print $x
}
print $x
";
    assert_eq!(expect_stdout("for_shadow", source), "1\n2\n99\n");
}
