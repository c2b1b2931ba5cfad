use crate::diagnostic::Span;
use crate::token::Token;
use crate::value::Value;

use super::error::RuntimeError;
use super::symtable::SymTable;

/// Expand a string literal: a dollar pass, a brace pass, then an escape
/// pass, in that order. A `$` or `{` preceded by an unescaped `\` never
/// anchors an interpolation; the backslash pair is resolved by the final
/// pass.
pub(crate) fn expand(token: &Token, symbols: &SymTable) -> Result<String, RuntimeError> {
    let span = token.span();
    let dollars = interpolate_dollar(&token.text, symbols, span)?;
    let braces = interpolate_braces(&dollars, symbols, span)?;
    apply_escapes(&braces, span)
}

fn lookup(name: &str, symbols: &SymTable, span: Span) -> Result<String, RuntimeError> {
    symbols
        .get(name)
        .map(Value::to_text)
        .ok_or_else(|| RuntimeError::undeclared_variable(name, span))
}

fn interpolate_dollar(text: &str, symbols: &SymTable, span: Span) -> Result<String, RuntimeError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            out.push(ch);
            if let Some(next) = chars.next() {
                out.push(next);
            }
            continue;
        }
        if ch == '$' {
            let mut name = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    name.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                out.push('$');
            } else {
                out.push_str(&lookup(&name, symbols, span)?);
            }
            continue;
        }
        out.push(ch);
    }
    Ok(out)
}

fn interpolate_braces(text: &str, symbols: &SymTable, span: Span) -> Result<String, RuntimeError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            out.push(ch);
            if let Some(next) = chars.next() {
                out.push(next);
            }
            continue;
        }
        if ch == '{' {
            let mut name = String::new();
            let mut closed = false;
            for next in chars.by_ref() {
                if next == '}' {
                    closed = true;
                    break;
                }
                name.push(next);
            }
            if closed {
                out.push_str(&lookup(&name, symbols, span)?);
            } else {
                // no matching brace: keep the text as written
                out.push('{');
                out.push_str(&name);
            }
            continue;
        }
        out.push(ch);
    }
    Ok(out)
}

fn apply_escapes(text: &str, span: Span) -> Result<String, RuntimeError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('$') => out.push('$'),
            Some('{') => out.push('{'),
            Some('}') => out.push('}'),
            Some(' ') => {}
            Some(other) => {
                return Err(RuntimeError::unknown_escape(format!("\\{}", other), span));
            }
            None => {
                return Err(RuntimeError::unknown_escape("\\", span));
            }
        }
    }
    Ok(out)
}
