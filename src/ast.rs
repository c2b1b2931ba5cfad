use std::fmt::Write;

use indexmap::IndexMap;

use crate::token::Token;

/// One AST node: a kind, the originating token, and an owned ordered child
/// list. A few kinds carry extra named subtrees (a branch keeps its
/// condition and then-body apart from the else chain in `children`; loops
/// keep their headers apart from the body).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub token: Token,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Identifier,
    Bareword,
    StringLiteral,
    BoolLiteral,
    IntegerLiteral(i64),
    /// Children are the element expressions in order.
    ArrayLiteral,
    /// Token names the declared variable; the single child is the initializer.
    Declaration,
    /// Token names the function; the single child is the body scope.
    FnDeclaration { params: Vec<String> },
    /// At most one child: the returned expression.
    Return,
    Variable,
    /// Children are the statements, in order.
    Scope,
    /// `condition` is absent for an unconditional else body. `children`
    /// holds the else chain: either another Branch or a Scope.
    Branch {
        condition: Option<Box<Node>>,
        body: Box<Node>,
    },
    /// The single child is the body scope.
    While { condition: Box<Node> },
    /// The single child is the body scope.
    ForIn {
        binding: String,
        iterable: Box<Node>,
    },
    /// Children: the target variable, then the value expression.
    Assignment,
    /// Children: left operand, right operand. The token is the operator.
    BinaryOperator,
    /// The single child is the operand. The token is the operator.
    UnaryOperator,
    /// Token names the callee; children are the argument expressions.
    FunctionCall,
}

impl Node {
    pub fn new(kind: NodeKind, token: Token) -> Self {
        Self {
            kind,
            token,
            children: Vec::new(),
        }
    }

    fn write_tree(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match &self.kind {
            NodeKind::Identifier => writeln!(out, "{pad}Identifier: {}", self.token.text),
            NodeKind::Bareword => writeln!(out, "{pad}Bareword: {}", self.token.text),
            NodeKind::StringLiteral => writeln!(out, "{pad}StringLiteral: \"{}\"", self.token.text),
            NodeKind::BoolLiteral => writeln!(out, "{pad}BoolLiteral: {}", self.token.text),
            NodeKind::IntegerLiteral(value) => writeln!(out, "{pad}IntegerLiteral: {value}"),
            NodeKind::ArrayLiteral => writeln!(out, "{pad}ArrayLiteral:"),
            NodeKind::Declaration => writeln!(out, "{pad}Declaration: {}", self.token.text),
            NodeKind::FnDeclaration { params } => {
                writeln!(out, "{pad}FnDeclaration: {} [{}]", self.token.text, params.join(" "))
            }
            NodeKind::Return => writeln!(out, "{pad}Return:"),
            NodeKind::Variable => writeln!(out, "{pad}Variable: ${}", self.token.text),
            NodeKind::Scope => writeln!(out, "{pad}Scope:"),
            NodeKind::Branch { condition, body } => {
                writeln!(out, "{pad}Branch:").ok();
                if let Some(condition) = condition {
                    condition.write_tree(out, depth + 1);
                }
                body.write_tree(out, depth + 2);
                Ok(())
            }
            NodeKind::While { condition } => {
                writeln!(out, "{pad}Loop:").ok();
                condition.write_tree(out, depth + 1);
                Ok(())
            }
            NodeKind::ForIn { binding, iterable } => {
                writeln!(out, "{pad}Loop: {binding} in").ok();
                iterable.write_tree(out, depth + 1);
                Ok(())
            }
            NodeKind::Assignment => writeln!(out, "{pad}Assignment:"),
            NodeKind::BinaryOperator => {
                writeln!(out, "{pad}BinaryOperator: {}", self.token.text).ok();
                if self.token.precedence() > 0 {
                    writeln!(out, "{pad} Precedence: {}", self.token.precedence()).ok();
                }
                Ok(())
            }
            NodeKind::UnaryOperator => writeln!(out, "{pad}UnaryOperator: {}", self.token.text),
            NodeKind::FunctionCall => writeln!(out, "{pad}FunctionCall: {}", self.token.text),
        }
        .ok();

        let child_depth = match self.kind {
            NodeKind::Branch { .. } | NodeKind::While { .. } | NodeKind::ForIn { .. } => depth + 2,
            _ => depth + 1,
        };
        for child in &self.children {
            child.write_tree(out, child_depth);
        }
    }
}

/// The parse result: top-level statements plus the user-function map, kept
/// out of the statement list so definitions and statements are addressable
/// independently. Duplicate declarations replace earlier ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    pub statements: Vec<Node>,
    pub functions: IndexMap<String, Node>,
}

impl Root {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented tree dump used by `--verbose`.
    pub fn dump(&self) -> String {
        let mut out = String::from("Root\n");
        out.push_str("  Functions:\n");
        for function in self.functions.values() {
            function.write_tree(&mut out, 2);
        }
        out.push_str("  Statements:\n");
        for statement in &self.statements {
            statement.write_tree(&mut out, 2);
        }
        out
    }
}
