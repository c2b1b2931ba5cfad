use std::collections::HashMap;
use std::fmt::Write;

use crate::value::Value;

type Scope = HashMap<String, Value>;

/// Stack of scopes. Lookup walks innermost to outermost; `put` rebinds in
/// the scope that already defines the name and only introduces a new
/// binding in the top scope otherwise.
#[derive(Debug, Default)]
pub struct SymTable {
    scopes: Vec<Scope>,
}

impl SymTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(!self.scopes.is_empty(), "pop without a matching push");
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn put(&mut self, name: &str, value: Value) {
        for scope in self.scopes.iter_mut().rev() {
            if scope.contains_key(name) {
                scope.insert(name.to_string(), value);
                return;
            }
        }
        if let Some(top) = self.scopes.last_mut() {
            top.insert(name.to_string(), value);
        }
    }

    /// Bind into the top scope unconditionally, shadowing any enclosing
    /// binding. Used for function parameters and `for` bindings.
    pub fn put_local(&mut self, name: &str, value: Value) {
        if let Some(top) = self.scopes.last_mut() {
            top.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }

    /// Diagnostic listing of every binding, innermost scope last.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (index, scope) in self.scopes.iter().enumerate() {
            let mut names: Vec<&String> = scope.keys().collect();
            names.sort();
            for name in names {
                writeln!(out, "[{}] {} = {}", index, name, scope[name]).ok();
            }
        }
        out
    }

    /// Turn a child process's captured stdout into a value: `true`/`false`
    /// become Bool, a fully parseable signed integer becomes Integer, and
    /// anything else stays a String.
    pub fn converted(text: String) -> Value {
        match text.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => match text.parse::<i64>() {
                Ok(value) => Value::Integer(value),
                Err(_) => Value::String(text),
            },
        }
    }
}
