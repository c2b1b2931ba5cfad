use std::mem;

use crate::ast::{Node, NodeKind, Root};
use crate::config::AppConfig;
use crate::diagnostic::Span;
use crate::token::{Token, TokenKind};
use crate::value::Value;

use super::builtins;
use super::error::RuntimeError;
use super::interpolate;
use super::spawn;
use super::symtable::SymTable;

/// Tree walker. Visits push their results into `collected`; callers drain
/// what they need immediately. Pipe mode is threaded as the explicit
/// `piping` parameter: an expression that must yield a value evaluates its
/// subtree with `piping = true` so that a terminal call captures instead
/// of writing to the real stdout.
pub struct Interpreter<'a> {
    root: &'a Root,
    config: &'a AppConfig,
    symtable: SymTable,
    collected: Vec<Value>,
    call_args: Vec<Value>,
    piped_in: Option<Value>,
    to_return: Option<Value>,
    last_visited_variable: Option<String>,
}

impl<'a> Interpreter<'a> {
    pub fn new(root: &'a Root, config: &'a AppConfig) -> Self {
        Self {
            root,
            config,
            symtable: SymTable::new(),
            collected: Vec::new(),
            call_args: Vec::new(),
            piped_in: None,
            to_return: None,
            last_visited_variable: None,
        }
    }

    /// Run the whole program: one outer scope, statements in declaration
    /// order, and implicit printing of any residual statement value.
    pub fn interpret(&mut self) -> Result<(), RuntimeError> {
        self.symtable.push_scope();
        let result = self.run_root();
        self.symtable.pop_scope();
        result
    }

    fn run_root(&mut self) -> Result<(), RuntimeError> {
        let root = self.root;
        for statement in &root.statements {
            self.collected.clear();
            self.to_return = None;
            self.eval(statement, false)?;
            if !self.collected.is_empty() {
                let residue = mem::take(&mut self.collected);
                builtins::print(self, residue, false, statement.token.span())?;
            }
        }
        Ok(())
    }

    fn eval(&mut self, node: &Node, piping: bool) -> Result<(), RuntimeError> {
        match &node.kind {
            NodeKind::Identifier | NodeKind::Bareword => {
                self.collected.push(Value::String(node.token.text.clone()));
            }
            NodeKind::StringLiteral => {
                let text = interpolate::expand(&node.token, &self.symtable)?;
                self.collected.push(Value::String(text));
            }
            NodeKind::BoolLiteral => {
                self.collected
                    .push(Value::Bool(node.token.kind == TokenKind::True));
            }
            NodeKind::IntegerLiteral(value) => {
                self.collected.push(Value::Integer(*value));
            }
            NodeKind::ArrayLiteral => {
                let mark = self.collected.len();
                for child in &node.children {
                    self.eval(child, true)?;
                }
                let items = self.collected.split_off(mark);
                self.collected.push(Value::Array(items));
            }
            NodeKind::Declaration => {
                let value = self.eval_single(&node.children[0])?;
                let name = &node.token.text;
                if self.symtable.get(name).is_some() {
                    return Err(RuntimeError::redeclaration(name, node.token.span()));
                }
                self.symtable.put(name, value);
            }
            NodeKind::Variable => {
                let name = &node.token.text;
                let Some(value) = self.symtable.get(name) else {
                    return Err(RuntimeError::undeclared_variable(name, node.token.span()));
                };
                let value = value.clone();
                self.last_visited_variable = Some(name.clone());
                self.collected.push(value);
            }
            NodeKind::Assignment => {
                // visit the target to record the variable, discard its value
                let mark = self.collected.len();
                self.eval(&node.children[0], true)?;
                self.collected.truncate(mark);
                let Some(name) = self.last_visited_variable.take() else {
                    return Err(RuntimeError::invalid_operation(
                        "assignment target is not a variable",
                        node.token.span(),
                    ));
                };
                let value = self.eval_single(&node.children[1])?;
                self.symtable.put(&name, value);
            }
            NodeKind::Scope => {
                self.symtable.push_scope();
                let mark = self.collected.len();
                for child in &node.children {
                    self.collected.truncate(mark);
                    if let Err(error) = self.eval(child, piping) {
                        self.symtable.pop_scope();
                        return Err(error);
                    }
                }
                self.collected.truncate(mark);
                self.symtable.pop_scope();
            }
            NodeKind::Branch { condition, body } => match condition {
                Some(condition) => {
                    let value = self.eval_single(condition)?;
                    let Some(flag) = value.as_bool() else {
                        return Err(RuntimeError::condition(
                            value.kind_name(),
                            condition.token.span(),
                        ));
                    };
                    if flag {
                        self.eval(body, piping)?;
                    } else {
                        for child in &node.children {
                            self.eval(child, piping)?;
                        }
                    }
                }
                // a condition-less branch is an unconditional else body
                None => self.eval(body, piping)?,
            },
            NodeKind::While { condition } => loop {
                let value = self.eval_single(condition)?;
                let Some(flag) = value.as_bool() else {
                    return Err(RuntimeError::condition(
                        value.kind_name(),
                        condition.token.span(),
                    ));
                };
                if !flag {
                    break;
                }
                self.eval(&node.children[0], piping)?;
            },
            NodeKind::ForIn { binding, iterable } => {
                let value = self.eval_single(iterable)?;
                let items = match value {
                    Value::Array(items) => items,
                    other => {
                        return Err(RuntimeError::not_iterable(
                            other.kind_name(),
                            iterable.token.span(),
                        ));
                    }
                };
                for item in items {
                    self.symtable.push_scope();
                    self.symtable.put_local(binding, item);
                    if let Err(error) = self.eval(&node.children[0], piping) {
                        self.symtable.pop_scope();
                        return Err(error);
                    }
                    self.symtable.pop_scope();
                }
            }
            NodeKind::BinaryOperator => {
                self.eval_binary(node, piping)?;
            }
            NodeKind::UnaryOperator => {
                let operand = self.eval_single(&node.children[0])?;
                let span = node.token.span();
                let result = match node.token.kind {
                    TokenKind::Subtract => match operand {
                        Value::Integer(value) => Value::Integer(value.wrapping_neg()),
                        other => {
                            return Err(RuntimeError::operand_kind(
                                format!("unary `-` needs an Integer, found {}", other.kind_name()),
                                span,
                            ));
                        }
                    },
                    TokenKind::Bang => match operand {
                        Value::Bool(value) => Value::Bool(!value),
                        other => {
                            return Err(RuntimeError::operand_kind(
                                format!("unary `!` needs a Bool, found {}", other.kind_name()),
                                span,
                            ));
                        }
                    },
                    _ => {
                        return Err(RuntimeError::invalid_operation(
                            format!("`{}` is not a unary operator", node.token.text),
                            span,
                        ));
                    }
                };
                self.collected.push(result);
            }
            NodeKind::Return => {
                if let Some(expression) = node.children.first() {
                    let value = self.eval_single(expression)?;
                    self.to_return = Some(value);
                }
            }
            NodeKind::FunctionCall => {
                // the piped-in value belongs to this call, not to calls
                // nested inside its arguments
                let piped = self.piped_in.take();
                let mark = self.collected.len();
                for child in &node.children {
                    self.eval(child, true)?;
                }
                let args = self.collected.split_off(mark);
                let result =
                    self.call_function(&node.token.text, args, piped, piping, node.token.span())?;
                if let Some(value) = result {
                    self.collected.push(value);
                }
            }
            NodeKind::FnDeclaration { .. } => {
                // installed into the Root function map at parse time;
                // nothing to do when walked as a statement
            }
        }
        Ok(())
    }

    /// Evaluate a subtree that must produce exactly one value. Value
    /// demands always capture, so the subtree runs in pipe mode.
    fn eval_single(&mut self, node: &Node) -> Result<Value, RuntimeError> {
        let mark = self.collected.len();
        self.eval(node, true)?;
        let mut produced = self.collected.split_off(mark);
        match produced.pop() {
            Some(value) if produced.is_empty() => Ok(value),
            Some(_) => Err(RuntimeError::value_count(
                produced.len() + 1,
                node.token.span(),
            )),
            None => Err(RuntimeError::value_count(0, node.token.span())),
        }
    }

    fn eval_binary(&mut self, node: &Node, piping: bool) -> Result<(), RuntimeError> {
        debug_assert_eq!(node.children.len(), 2);
        let span = node.token.span();

        if node.token.kind == TokenKind::Pipe {
            // the left side runs captured; its single value feeds the right
            // side, which keeps the caller's pipe mode
            let lhs_value = self.eval_single(&node.children[0])?;
            self.piped_in = Some(lhs_value);
            return self.eval(&node.children[1], piping);
        }

        if matches!(node.token.kind, TokenKind::And | TokenKind::Or) {
            let lhs = self.eval_single(&node.children[0])?;
            let Some(lhs_flag) = lhs.as_bool() else {
                return Err(RuntimeError::operand_kind(
                    format!(
                        "`{}` needs Bool operands, found {}",
                        node.token.text,
                        lhs.kind_name()
                    ),
                    span,
                ));
            };
            let result = match node.token.kind {
                TokenKind::And if !lhs_flag => false,
                TokenKind::Or if lhs_flag => true,
                _ => {
                    let rhs = self.eval_single(&node.children[1])?;
                    let Some(rhs_flag) = rhs.as_bool() else {
                        return Err(RuntimeError::operand_kind(
                            format!(
                                "`{}` needs Bool operands, found {}",
                                node.token.text,
                                rhs.kind_name()
                            ),
                            span,
                        ));
                    };
                    rhs_flag
                }
            };
            self.collected.push(Value::Bool(result));
            return Ok(());
        }

        let lhs = self.eval_single(&node.children[0])?;
        let rhs = self.eval_single(&node.children[1])?;
        let result = apply_binary(&node.token, &lhs, &rhs)?;
        self.collected.push(result);
        Ok(())
    }

    /// Call dispatch: built-in, then user-defined, then external. The
    /// piped-in value becomes a leading argument for the first two and
    /// stdin bytes for externals.
    pub(crate) fn call_function(
        &mut self,
        name: &str,
        mut args: Vec<Value>,
        piped_in: Option<Value>,
        piping: bool,
        span: Span,
    ) -> Result<Option<Value>, RuntimeError> {
        if let Some(builtin) = builtins::lookup(name) {
            if let Some(piped) = piped_in {
                args.insert(0, piped);
            }
            return builtin(self, args, piping, span);
        }
        if self.root.functions.contains_key(name) {
            if let Some(piped) = piped_in {
                args.insert(0, piped);
            }
            return self.call_user_function(name, args, span);
        }
        Ok(self.call_external(name, &args, piped_in, piping))
    }

    fn call_user_function(
        &mut self,
        name: &str,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Option<Value>, RuntimeError> {
        let root = self.root;
        let Some(declaration) = root.functions.get(name) else {
            return Err(RuntimeError::invalid_operation(
                format!("unknown function `{}`", name),
                span,
            ));
        };
        let NodeKind::FnDeclaration { params } = &declaration.kind else {
            return Err(RuntimeError::invalid_operation(
                format!("`{}` is not callable", name),
                span,
            ));
        };
        if params.len() != args.len() {
            return Err(RuntimeError::arity_mismatch(
                name,
                params.len(),
                args.len(),
                span,
            ));
        }

        self.call_args = args;
        self.symtable.push_scope();
        for (param, value) in params.iter().zip(mem::take(&mut self.call_args)) {
            self.symtable.put_local(param, value);
        }
        let saved_return = self.to_return.take();
        let outcome = self.eval(&declaration.children[0], false);
        self.symtable.pop_scope();
        let returned = self.to_return.take();
        self.to_return = saved_return;
        outcome?;
        Ok(returned)
    }

    /// Walk the PATH prefixes left to right. Exhausting them is not fatal;
    /// the call simply produces no value (or the converted capture of the
    /// last attempt when a value was demanded).
    fn call_external(
        &mut self,
        name: &str,
        args: &[Value],
        piped_in: Option<Value>,
        piping: bool,
    ) -> Option<Value> {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(name.to_string());
        for arg in args {
            argv.push(arg.to_text());
        }
        let stdin_bytes = piped_in.map(|value| match value {
            Value::String(text) => text.into_bytes(),
            other => other.to_text().into_bytes(),
        });

        if self.config.verbose {
            eprintln!("[conch:debug] spawning `{}`", argv.join(" "));
        }
        let outcome = spawn::spawn(&self.config.paths, &argv, stdin_bytes.as_deref(), piping);
        if self.config.verbose && outcome.code != 0 {
            eprintln!("[conch:debug] `{}` exited with status {}", name, outcome.code);
        }

        if piping {
            let text = String::from_utf8_lossy(&outcome.stdout);
            return Some(SymTable::converted(text.trim_end().to_string()));
        }
        None
    }
}

fn apply_binary(token: &Token, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    let span = token.span();
    let mismatch = || {
        RuntimeError::operand_kind(
            format!(
                "operator `{}` cannot combine {} and {}",
                token.text,
                lhs.kind_name(),
                rhs.kind_name()
            ),
            span,
        )
    };

    match token.kind {
        TokenKind::Add
        | TokenKind::Subtract
        | TokenKind::Multiply
        | TokenKind::Divide
        | TokenKind::Modulo => {
            let (Some(a), Some(b)) = (lhs.as_integer(), rhs.as_integer()) else {
                return Err(mismatch());
            };
            let value = match token.kind {
                TokenKind::Add => a.wrapping_add(b),
                TokenKind::Subtract => a.wrapping_sub(b),
                TokenKind::Multiply => a.wrapping_mul(b),
                TokenKind::Divide | TokenKind::Modulo if b == 0 => {
                    return Err(RuntimeError::division_by_zero(span));
                }
                TokenKind::Divide => a.wrapping_div(b),
                _ => a.wrapping_rem(b),
            };
            Ok(Value::Integer(value))
        }
        TokenKind::Less | TokenKind::Greater | TokenKind::LessEquals | TokenKind::GreaterEquals => {
            let (Some(a), Some(b)) = (lhs.as_integer(), rhs.as_integer()) else {
                return Err(mismatch());
            };
            let result = match token.kind {
                TokenKind::Less => a < b,
                TokenKind::Greater => a > b,
                TokenKind::LessEquals => a <= b,
                _ => a >= b,
            };
            Ok(Value::Bool(result))
        }
        TokenKind::Equals | TokenKind::NotEquals => {
            let equal = match (lhs, rhs) {
                (Value::Bool(a), Value::Bool(b)) => a == b,
                (Value::Integer(a), Value::Integer(b)) => a == b,
                _ => return Err(mismatch()),
            };
            Ok(Value::Bool(if token.kind == TokenKind::Equals {
                equal
            } else {
                !equal
            }))
        }
        _ => Err(RuntimeError::invalid_operation(
            format!("`{}` is not a binary operator", token.text),
            span,
        )),
    }
}
