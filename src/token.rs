use std::fmt;

use crate::diagnostic::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Newline,

    // Keywords
    Var,
    Fn,
    False,
    True,
    If,
    Else,
    While,
    Return,
    For,
    In,

    // Operators
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Less,
    Greater,
    Bang,
    Equals,
    NotEquals,
    GreaterEquals,
    LessEquals,
    Ampersand,
    Pipe,
    And,
    Or,
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,

    // Literals and names
    Variable,
    StringLiteral,
    Identifier,
    Bareword,
    IntegerLiteral,
}

/// Keyword spellings. Matched against a maximal identifier run, so the
/// "followed by a non-identifier character" rule holds by construction.
pub const KEYWORDS: [(&str, TokenKind); 10] = [
    ("var", TokenKind::Var),
    ("fn", TokenKind::Fn),
    ("false", TokenKind::False),
    ("true", TokenKind::True),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("return", TokenKind::Return),
    ("for", TokenKind::For),
    ("in", TokenKind::In),
];

/// Two-character operators, tried before the one-character table.
pub const SYMBOLS2: [(&str, TokenKind); 6] = [
    ("==", TokenKind::Equals),
    ("!=", TokenKind::NotEquals),
    (">=", TokenKind::GreaterEquals),
    ("<=", TokenKind::LessEquals),
    ("&&", TokenKind::And),
    ("||", TokenKind::Or),
];

pub const SYMBOLS1: [(u8, TokenKind); 17] = [
    (b'=', TokenKind::Assign),
    (b'+', TokenKind::Add),
    (b'-', TokenKind::Subtract),
    (b'*', TokenKind::Multiply),
    (b'/', TokenKind::Divide),
    (b'%', TokenKind::Modulo),
    (b'<', TokenKind::Less),
    (b'>', TokenKind::Greater),
    (b'!', TokenKind::Bang),
    (b'&', TokenKind::Ampersand),
    (b'|', TokenKind::Pipe),
    (b'{', TokenKind::LeftBrace),
    (b'}', TokenKind::RightBrace),
    (b'(', TokenKind::LeftParen),
    (b')', TokenKind::RightParen),
    (b'[', TokenKind::LeftBracket),
    (b']', TokenKind::RightBracket),
];

impl TokenKind {
    /// True for bytes that can begin an operator. Integer literals are only
    /// accepted when terminated by whitespace, end of input, or one of these.
    pub fn starts_symbol(byte: u8) -> bool {
        SYMBOLS1.iter().any(|(b, _)| *b == byte)
    }

    /// Operators accepted by the binary-expression grammar. `=` and `&`
    /// carry a precedence but are not expression operators.
    pub fn is_binary_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Add
                | TokenKind::Subtract
                | TokenKind::Multiply
                | TokenKind::Divide
                | TokenKind::Modulo
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::Equals
                | TokenKind::NotEquals
                | TokenKind::LessEquals
                | TokenKind::GreaterEquals
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Pipe
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Newline => "Newline",
            TokenKind::Var => "`var`",
            TokenKind::Fn => "`fn`",
            TokenKind::False => "`false`",
            TokenKind::True => "`true`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::While => "`while`",
            TokenKind::Return => "`return`",
            TokenKind::For => "`for`",
            TokenKind::In => "`in`",
            TokenKind::Assign => "`=`",
            TokenKind::Add => "`+`",
            TokenKind::Subtract => "`-`",
            TokenKind::Multiply => "`*`",
            TokenKind::Divide => "`/`",
            TokenKind::Modulo => "`%`",
            TokenKind::Less => "`<`",
            TokenKind::Greater => "`>`",
            TokenKind::Bang => "`!`",
            TokenKind::Equals => "`==`",
            TokenKind::NotEquals => "`!=`",
            TokenKind::GreaterEquals => "`>=`",
            TokenKind::LessEquals => "`<=`",
            TokenKind::Ampersand => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::And => "`&&`",
            TokenKind::Or => "`||`",
            TokenKind::LeftBrace => "`{`",
            TokenKind::RightBrace => "`}`",
            TokenKind::LeftParen => "`(`",
            TokenKind::RightParen => "`)`",
            TokenKind::LeftBracket => "`[`",
            TokenKind::RightBracket => "`]`",
            TokenKind::Variable => "variable",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Bareword => "bareword",
            TokenKind::IntegerLiteral => "integer literal",
        }
    }
}

/// One lexed token. `text` is the slice of source the token spans (for
/// variables the leading `$` is stripped, for string literals the quotes
/// are); `row`/`column` are 1-based and name the token's first byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub row: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, row: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            row,
            column,
        }
    }

    /// Operator precedence; lower binds tighter. Zero for non-operators.
    pub fn precedence(&self) -> u8 {
        match self.kind {
            TokenKind::Bang => 3,
            TokenKind::Multiply | TokenKind::Divide | TokenKind::Modulo => 5,
            TokenKind::Add | TokenKind::Subtract => 6,
            TokenKind::Less
            | TokenKind::Greater
            | TokenKind::LessEquals
            | TokenKind::GreaterEquals => 9,
            TokenKind::Equals | TokenKind::NotEquals => 10,
            TokenKind::Ampersand => 11,
            TokenKind::Pipe => 13,
            TokenKind::And => 14,
            TokenKind::Or => 15,
            TokenKind::Assign => 16,
            _ => 0,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.row, self.column, self.text.len().max(1))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::Newline {
            write!(f, "{:>4}:{:<4} Newline", self.row, self.column)
        } else {
            write!(
                f,
                "{:>4}:{:<4} {:<16} {}",
                self.row,
                self.column,
                format!("{:?}", self.kind),
                self.text
            )
        }
    }
}
