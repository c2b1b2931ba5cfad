use std::fmt;

use crate::diagnostic::{Diagnostic, Label, Span};
use crate::token::{Token, TokenKind};

/// Grammar categories a production can expect where no single token kind
/// fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Expression,
    Scope,
    Callable,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Expression => write!(f, "an expression"),
            Expectation::Scope => write!(f, "a scope"),
            Expectation::Callable => write!(f, "a function call"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    Kind(TokenKind),
    Category(Expectation),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Kind(kind) => write!(f, "{}", kind.name()),
            Expected::Category(category) => write!(f, "{}", category),
        }
    }
}

/// The first expectation the parser failed on. `found` is `None` at end of
/// input, in which case `position` points at the last token seen.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub expected: Expected,
    pub found: Option<Token>,
    pub position: Span,
}

impl ParseError {
    pub fn found_description(&self) -> String {
        match &self.found {
            Some(token) => match token.kind {
                TokenKind::Newline => "end of line".to_string(),
                TokenKind::Variable => format!("variable `${}`", token.text),
                TokenKind::Identifier
                | TokenKind::Bareword
                | TokenKind::StringLiteral
                | TokenKind::IntegerLiteral => {
                    format!("{} `{}`", token.kind.name(), token.text)
                }
                // keywords and operators spell themselves
                _ => token.kind.name().to_string(),
            },
            None => "end of input".to_string(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(format!(
            "expected {}, found {}",
            self.expected,
            self.found_description()
        ))
        .with_code("E0102")
        .with_label(Label::primary(
            self.position,
            format!("expected {} here", self.expected),
        ))
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: expected {}, found {}",
            self.position.row,
            self.position.column,
            self.expected,
            self.found_description()
        )
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    UndeclaredVariable { name: String, span: Span },
    Redeclaration { name: String, span: Span },
    OperandKind { message: String, span: Span },
    Condition { found: &'static str, span: Span },
    NotIterable { found: &'static str, span: Span },
    ArityMismatch { name: String, expected: usize, found: usize, span: Span },
    UnknownEscape { sequence: String, span: Span },
    DivisionByZero { span: Span },
    ValueCount { found: usize, span: Span },
    InvalidOperation { message: String, span: Span },
}

impl RuntimeError {
    pub fn undeclared_variable(name: impl Into<String>, span: Span) -> Self {
        Self::UndeclaredVariable { name: name.into(), span }
    }

    pub fn redeclaration(name: impl Into<String>, span: Span) -> Self {
        Self::Redeclaration { name: name.into(), span }
    }

    pub fn operand_kind(message: impl Into<String>, span: Span) -> Self {
        Self::OperandKind { message: message.into(), span }
    }

    pub fn condition(found: &'static str, span: Span) -> Self {
        Self::Condition { found, span }
    }

    pub fn not_iterable(found: &'static str, span: Span) -> Self {
        Self::NotIterable { found, span }
    }

    pub fn arity_mismatch(name: impl Into<String>, expected: usize, found: usize, span: Span) -> Self {
        Self::ArityMismatch { name: name.into(), expected, found, span }
    }

    pub fn unknown_escape(sequence: impl Into<String>, span: Span) -> Self {
        Self::UnknownEscape { sequence: sequence.into(), span }
    }

    pub fn division_by_zero(span: Span) -> Self {
        Self::DivisionByZero { span }
    }

    pub fn value_count(found: usize, span: Span) -> Self {
        Self::ValueCount { found, span }
    }

    pub fn invalid_operation(message: impl Into<String>, span: Span) -> Self {
        Self::InvalidOperation { message: message.into(), span }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UndeclaredVariable { span, .. }
            | Self::Redeclaration { span, .. }
            | Self::OperandKind { span, .. }
            | Self::Condition { span, .. }
            | Self::NotIterable { span, .. }
            | Self::ArityMismatch { span, .. }
            | Self::UnknownEscape { span, .. }
            | Self::DivisionByZero { span }
            | Self::ValueCount { span, .. }
            | Self::InvalidOperation { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::UndeclaredVariable { name, span } => {
                Diagnostic::error(format!("cannot find variable `{}`", name))
                    .with_code("E0201")
                    .with_label(Label::primary(*span, "not declared in any visible scope"))
                    .with_help(format!("declare it first: `var {} = ...`", name))
            }
            Self::Redeclaration { name, span } => {
                Diagnostic::error(format!("variable `{}` is already declared", name))
                    .with_code("E0202")
                    .with_label(Label::primary(*span, "second declaration here"))
                    .with_help(format!("assign instead: `${} = ...`", name))
            }
            Self::OperandKind { message, span } => Diagnostic::error(message.clone())
                .with_code("E0203")
                .with_label(Label::primary(*span, message.clone())),
            Self::Condition { found, span } => {
                Diagnostic::error(format!("condition must be Bool, found {}", found))
                    .with_code("E0204")
                    .with_label(Label::primary(*span, "this condition is not a Bool"))
            }
            Self::NotIterable { found, span } => {
                Diagnostic::error(format!("`for` needs an Array to iterate, found {}", found))
                    .with_code("E0205")
                    .with_label(Label::primary(*span, "not an Array"))
            }
            Self::ArityMismatch { name, expected, found, span } => {
                Diagnostic::error(format!(
                    "function `{}` takes {} argument(s), {} given",
                    name, expected, found
                ))
                .with_code("E0206")
                .with_label(Label::primary(*span, "wrong number of arguments"))
            }
            Self::UnknownEscape { sequence, span } => {
                Diagnostic::error(format!("unknown escape sequence `{}`", sequence))
                    .with_code("E0207")
                    .with_label(Label::primary(*span, "inside this string literal"))
            }
            Self::DivisionByZero { span } => Diagnostic::error("division by zero")
                .with_code("E0208")
                .with_label(Label::primary(*span, "attempt to divide by zero")),
            Self::ValueCount { found, span } => {
                Diagnostic::error(format!(
                    "expression produced {} values where one was expected",
                    found
                ))
                .with_code("E0209")
                .with_label(Label::primary(*span, "expected a single value"))
            }
            Self::InvalidOperation { message, span } => Diagnostic::error(message.clone())
                .with_code("E0210")
                .with_label(Label::primary(*span, message.clone())),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndeclaredVariable { name, .. } => write!(f, "undeclared variable: {}", name),
            Self::Redeclaration { name, .. } => write!(f, "redeclaration of: {}", name),
            Self::OperandKind { message, .. } => write!(f, "{}", message),
            Self::Condition { found, .. } => write!(f, "condition must be Bool, found {}", found),
            Self::NotIterable { found, .. } => write!(f, "cannot iterate over {}", found),
            Self::ArityMismatch { name, expected, found, .. } => {
                write!(f, "function {} takes {} argument(s), {} given", name, expected, found)
            }
            Self::UnknownEscape { sequence, .. } => write!(f, "unknown escape sequence {}", sequence),
            Self::DivisionByZero { .. } => write!(f, "division by zero"),
            Self::ValueCount { found, .. } => {
                write!(f, "expression produced {} values where one was expected", found)
            }
            Self::InvalidOperation { message, .. } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for RuntimeError {}
