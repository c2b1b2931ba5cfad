use crate::diagnostic::Span;
use crate::value::Value;

use super::error::RuntimeError;
use super::evaluator::Interpreter;

/// A built-in takes the interpreter (some built-ins re-enter evaluation),
/// the argument values with any piped-in value already prepended, and the
/// caller's pipe mode.
pub(crate) type Builtin = for<'r, 'a> fn(
    &'r mut Interpreter<'a>,
    Vec<Value>,
    bool,
    Span,
) -> Result<Option<Value>, RuntimeError>;

pub(crate) fn lookup(name: &str) -> Option<Builtin> {
    match name {
        "print" => Some(print),
        "append" => Some(append),
        "filter" => Some(filter),
        "len" => Some(len),
        _ => None,
    }
}

/// Arguments separated by one space, terminated with a newline unless the
/// final argument is a String that already ends in one. In pipe mode the
/// text becomes the call's value instead of being written.
pub(crate) fn print(
    _interp: &mut Interpreter<'_>,
    args: Vec<Value>,
    piping: bool,
    _span: Span,
) -> Result<Option<Value>, RuntimeError> {
    let mut out = String::new();
    for (index, arg) in args.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        out.push_str(&arg.to_text());
    }
    let suppress_newline = matches!(args.last(), Some(Value::String(text)) if text.ends_with('\n'));
    if !suppress_newline {
        out.push('\n');
    }
    if piping {
        return Ok(Some(Value::String(out)));
    }
    print!("{}", out);
    Ok(None)
}

/// `append(arr, v...)`: a new Array with the extra values appended.
fn append(
    _interp: &mut Interpreter<'_>,
    args: Vec<Value>,
    _piping: bool,
    span: Span,
) -> Result<Option<Value>, RuntimeError> {
    let mut args = args.into_iter();
    let Some(first) = args.next() else {
        return Err(RuntimeError::invalid_operation(
            "append needs an Array to append to",
            span,
        ));
    };
    let mut items = match first {
        Value::Array(items) => items,
        other => {
            return Err(RuntimeError::operand_kind(
                format!("append needs an Array, found {}", other.kind_name()),
                span,
            ));
        }
    };
    items.extend(args);
    Ok(Some(Value::Array(items)))
}

/// `filter(arr, name)`: call `name` once per element; keep the element
/// when the call produces Bool true. Resolution goes through the normal
/// call dispatch, in pipe mode so externals can answer too.
fn filter(
    interp: &mut Interpreter<'_>,
    args: Vec<Value>,
    _piping: bool,
    span: Span,
) -> Result<Option<Value>, RuntimeError> {
    let mut args = args.into_iter();
    let (Some(first), Some(second)) = (args.next(), args.next()) else {
        return Err(RuntimeError::invalid_operation(
            "filter needs an Array and a function name",
            span,
        ));
    };
    let items = match first {
        Value::Array(items) => items,
        other => {
            return Err(RuntimeError::operand_kind(
                format!("filter needs an Array, found {}", other.kind_name()),
                span,
            ));
        }
    };
    let name = match second {
        Value::String(name) => name,
        other => {
            return Err(RuntimeError::operand_kind(
                format!("filter needs a function name, found {}", other.kind_name()),
                span,
            ));
        }
    };

    let mut kept = Vec::new();
    for item in items {
        let verdict = interp.call_function(&name, vec![item.clone()], None, true, span)?;
        match verdict {
            Some(Value::Bool(true)) => kept.push(item),
            Some(Value::Bool(false)) => {}
            other => {
                return Err(RuntimeError::operand_kind(
                    format!(
                        "filter predicate `{}` must produce a Bool, got {}",
                        name,
                        other.map(|value| value.kind_name()).unwrap_or("no value")
                    ),
                    span,
                ));
            }
        }
    }
    Ok(Some(Value::Array(kept)))
}

/// `len(x)`: byte length of a String or element count of an Array.
fn len(
    _interp: &mut Interpreter<'_>,
    args: Vec<Value>,
    _piping: bool,
    span: Span,
) -> Result<Option<Value>, RuntimeError> {
    let mut args = args.into_iter();
    let (Some(value), None) = (args.next(), args.next()) else {
        return Err(RuntimeError::invalid_operation(
            "len takes exactly one argument",
            span,
        ));
    };
    match value {
        Value::String(text) => Ok(Some(Value::Integer(text.len() as i64))),
        Value::Array(items) => Ok(Some(Value::Integer(items.len() as i64))),
        other => Err(RuntimeError::operand_kind(
            format!("len needs a String or Array, found {}", other.kind_name()),
            span,
        )),
    }
}
