use std::fmt;

use crate::diagnostic::{Diagnostic, Label, Span};
use crate::token::{Token, TokenKind, KEYWORDS, SYMBOLS1, SYMBOLS2};

/// Tokenization only fails on an unterminated string literal; the error
/// carries the position of the opening quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    UnterminatedString { row: usize, column: usize },
}

impl TokenizeError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::UnterminatedString { row, column } => {
                Diagnostic::error("unterminated string literal")
                    .with_code("E0101")
                    .with_label(Label::primary(
                        Span::new(*row, *column, 1),
                        "string opened here is never closed",
                    ))
                    .with_help("add a closing `\"`")
            }
        }
    }
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString { row, column } => {
                write!(f, "unterminated string literal at {}:{}", row, column)
            }
        }
    }
}

impl std::error::Error for TokenizeError {}

pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenizeError> {
    Tokenizer::new(source).run()
}

/// Cursor machine over the source bytes. Tokens are recognized in a fixed
/// order at each step; the integer rule may reject and restore the cursor,
/// leaving its input to the bareword rule.
struct Tokenizer<'s> {
    source: &'s [u8],
    current: usize,
    row: usize,
    column: usize,
}

#[derive(Clone, Copy)]
struct Checkpoint {
    current: usize,
    row: usize,
    column: usize,
}

impl<'s> Tokenizer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source: source.as_bytes(),
            current: 0,
            row: 1,
            column: 1,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = Vec::new();
        while !self.eof() {
            let byte = self.peek();

            if byte == b'\n' {
                let (row, column) = self.position();
                while !self.eof() && self.peek() == b'\n' {
                    self.advance();
                }
                // one Newline per run; a leading run is suppressed
                let after_newline = matches!(tokens.last(), Some(Token { kind: TokenKind::Newline, .. }));
                if !tokens.is_empty() && !after_newline {
                    tokens.push(Token::new(TokenKind::Newline, "\n", row, column));
                }
                continue;
            }
            if byte.is_ascii_whitespace() {
                self.advance();
                continue;
            }
            if byte == b'#' {
                // comment to end of line; the newline is left for the rule above
                while !self.eof() && self.peek() != b'\n' {
                    self.advance();
                }
                continue;
            }

            if let Some(token) = self.read_variable() {
                tokens.push(token);
                continue;
            }
            if let Some(token) = self.read_word() {
                tokens.push(token);
                continue;
            }
            if let Some(token) = self.read_symbol() {
                tokens.push(token);
                continue;
            }
            if let Some(token) = self.read_string()? {
                tokens.push(token);
                continue;
            }
            if let Some(token) = self.read_integer() {
                tokens.push(token);
                continue;
            }
            tokens.push(self.read_bareword());
        }
        Ok(tokens)
    }

    /// `$name`: `$` followed by a letter, then letters/digits/underscores.
    /// The token text carries the name without the sigil.
    fn read_variable(&mut self) -> Option<Token> {
        if self.peek() != b'$' || !self.peek_at(1).is_some_and(|b| b.is_ascii_alphabetic()) {
            return None;
        }
        let (row, column) = self.position();
        self.advance();
        let start = self.current;
        while !self.eof() && is_identifier_byte(self.peek()) {
            self.advance();
        }
        Some(Token::new(
            TokenKind::Variable,
            self.slice(start, self.current),
            row,
            column,
        ))
    }

    /// Keywords and identifiers share a maximal alphanumeric run. An
    /// identifier immediately followed by `-`, `+`, `/` or `*` is left for
    /// the bareword rule so that words like `a-z` do not get mis-split.
    fn read_word(&mut self) -> Option<Token> {
        if !self.peek().is_ascii_alphabetic() {
            return None;
        }
        let start = self.current;
        let mut end = self.current;
        while end < self.source.len() && is_identifier_byte(self.source[end]) {
            end += 1;
        }
        let word = self.slice(start, end);
        let (row, column) = self.position();

        if let Some((_, kind)) = KEYWORDS.iter().find(|(spelling, _)| *spelling == word) {
            self.advance_to(end);
            return Some(Token::new(*kind, word, row, column));
        }

        let follower = self.source.get(end).copied();
        if matches!(follower, Some(b'-' | b'+' | b'/' | b'*')) {
            return None;
        }
        self.advance_to(end);
        Some(Token::new(TokenKind::Identifier, word, row, column))
    }

    /// Greedy over the operator tables, two-character combinations first.
    /// `-`, `+`, `*`, `/` followed by a letter are not symbols (they open a
    /// bareword), and neither is `-` followed by `-` (words like `--help`).
    fn read_symbol(&mut self) -> Option<Token> {
        let byte = self.peek();
        if self.current + 2 <= self.source.len() {
            let pair = &self.source[self.current..self.current + 2];
            for (spelling, kind) in SYMBOLS2 {
                if pair == spelling.as_bytes() {
                    let (row, column) = self.position();
                    self.advance();
                    self.advance();
                    return Some(Token::new(kind, spelling, row, column));
                }
            }
        }

        if matches!(byte, b'-' | b'+' | b'*' | b'/') {
            let next = self.peek_at(1);
            if next.is_some_and(|b| b.is_ascii_alphabetic()) {
                return None;
            }
            if byte == b'-' && next == Some(b'-') {
                return None;
            }
        }

        for (symbol_byte, kind) in SYMBOLS1 {
            if symbol_byte == byte {
                let (row, column) = self.position();
                self.advance();
                return Some(Token::new(kind, (symbol_byte as char).to_string(), row, column));
            }
        }
        None
    }

    /// `"` to the matching `"`; `\` escapes the next byte. Escapes are kept
    /// verbatim in the token text and resolved during interpolation.
    fn read_string(&mut self) -> Result<Option<Token>, TokenizeError> {
        if self.peek() != b'"' {
            return Ok(None);
        }
        let (row, column) = self.position();
        self.advance();
        let start = self.current;
        loop {
            if self.eof() {
                return Err(TokenizeError::UnterminatedString { row, column });
            }
            match self.peek() {
                b'\\' => {
                    self.advance();
                    if self.eof() {
                        return Err(TokenizeError::UnterminatedString { row, column });
                    }
                    self.advance();
                }
                b'"' => break,
                _ => self.advance(),
            }
        }
        let text = self.slice(start, self.current);
        self.advance();
        Ok(Some(Token::new(TokenKind::StringLiteral, text, row, column)))
    }

    /// A digit run, accepted only when terminated by whitespace, end of
    /// input, or a symbol; otherwise the cursor is restored and the input
    /// falls through to the bareword rule.
    fn read_integer(&mut self) -> Option<Token> {
        let checkpoint = self.checkpoint();
        let (row, column) = self.position();
        let start = self.current;

        if self.peek() == b'-' {
            // a leading minus only belongs to the literal when a digit follows
            if !self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
                return None;
            }
            self.advance();
        }
        if self.eof() || !self.peek().is_ascii_digit() {
            self.restore(checkpoint);
            return None;
        }
        while !self.eof() && self.peek().is_ascii_digit() {
            self.advance();
        }

        let terminated = self.eof() || {
            let byte = self.peek();
            byte.is_ascii_whitespace() || TokenKind::starts_symbol(byte)
        };
        if !terminated {
            self.restore(checkpoint);
            return None;
        }
        Some(Token::new(
            TokenKind::IntegerLiteral,
            self.slice(start, self.current),
            row,
            column,
        ))
    }

    /// Catch-all: any run of non-whitespace the earlier rules rejected.
    fn read_bareword(&mut self) -> Token {
        let (row, column) = self.position();
        let start = self.current;
        while !self.eof() && !self.peek().is_ascii_whitespace() {
            self.advance();
        }
        Token::new(
            TokenKind::Bareword,
            self.slice(start, self.current),
            row,
            column,
        )
    }

    fn eof(&self) -> bool {
        self.current >= self.source.len()
    }

    fn peek(&self) -> u8 {
        self.source[self.current]
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.current + offset).copied()
    }

    fn position(&self) -> (usize, usize) {
        (self.row, self.column)
    }

    fn advance(&mut self) {
        if self.source[self.current] == b'\n' {
            self.row += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.current += 1;
    }

    fn advance_to(&mut self, end: usize) {
        while self.current < end {
            self.advance();
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            current: self.current,
            row: self.row,
            column: self.column,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.current = checkpoint.current;
        self.row = checkpoint.row;
        self.column = checkpoint.column;
    }

    fn slice(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.source[start..end]).into_owned()
    }
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        tokenize(source).expect("tokenizer failed")
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        lex(source).iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("var x if else while return for in fn true false"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::Return,
                TokenKind::For,
                TokenKind::In,
                TokenKind::Fn,
                TokenKind::True,
                TokenKind::False,
            ]
        );
    }

    #[test]
    fn keyword_needs_boundary() {
        // "iffy" is one identifier, not `if` followed by "fy"
        assert_eq!(kinds("iffy"), vec![TokenKind::Identifier]);
        assert_eq!(texts("iffy"), vec!["iffy"]);
        assert_eq!(kinds("variant"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn variables() {
        let tokens = lex("$name $x_1");
        assert_eq!(tokens[0].kind, TokenKind::Variable);
        assert_eq!(tokens[0].text, "name");
        assert_eq!(tokens[1].text, "x_1");
    }

    #[test]
    fn dollar_without_name_is_a_bareword() {
        assert_eq!(kinds("$1"), vec![TokenKind::Bareword]);
        assert_eq!(texts("$1"), vec!["$1"]);
    }

    #[test]
    fn symbols() {
        assert_eq!(
            kinds("= == != <= >= < > && || & | ! { } ( ) [ ] % "),
            vec![
                TokenKind::Assign,
                TokenKind::Equals,
                TokenKind::NotEquals,
                TokenKind::LessEquals,
                TokenKind::GreaterEquals,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Ampersand,
                TokenKind::Pipe,
                TokenKind::Bang,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Modulo,
            ]
        );
    }

    #[test]
    fn arithmetic_with_spaces() {
        assert_eq!(
            kinds("2 + 3 * 4"),
            vec![
                TokenKind::IntegerLiteral,
                TokenKind::Add,
                TokenKind::IntegerLiteral,
                TokenKind::Multiply,
                TokenKind::IntegerLiteral,
            ]
        );
    }

    #[test]
    fn adjacent_arithmetic() {
        // 2+3: the integer is terminated by a symbol on both sides
        assert_eq!(
            kinds("2+3"),
            vec![
                TokenKind::IntegerLiteral,
                TokenKind::Add,
                TokenKind::IntegerLiteral,
            ]
        );
    }

    #[test]
    fn barewords() {
        assert_eq!(kinds("--help"), vec![TokenKind::Bareword]);
        assert_eq!(texts("--help"), vec!["--help"]);
        assert_eq!(texts("a-z A-Z"), vec!["a-z", "A-Z"]);
        assert_eq!(texts("-la"), vec!["-la"]);
        assert_eq!(texts("/usr/bin"), vec!["/usr/bin"]);
    }

    #[test]
    fn integer_rejected_without_terminator() {
        assert_eq!(kinds("5x"), vec![TokenKind::Bareword]);
        assert_eq!(texts("5x"), vec!["5x"]);
        // terminated by a symbol: stays an integer
        assert_eq!(
            kinds("3)"),
            vec![TokenKind::IntegerLiteral, TokenKind::RightParen]
        );
    }

    #[test]
    fn minus_before_digit_is_a_symbol() {
        assert_eq!(
            kinds("-5"),
            vec![TokenKind::Subtract, TokenKind::IntegerLiteral]
        );
    }

    #[test]
    fn string_literals() {
        let tokens = lex(r#""hello world""#);
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text, "hello world");
    }

    #[test]
    fn string_keeps_escapes_verbatim() {
        let tokens = lex(r#""a\n$b\"c""#);
        assert_eq!(tokens[0].text, r#"a\n$b\"c"#);
    }

    #[test]
    fn unterminated_string() {
        let err = tokenize("var x = \"oops").unwrap_err();
        assert_eq!(
            err,
            TokenizeError::UnterminatedString { row: 1, column: 9 }
        );
    }

    #[test]
    fn newlines_collapse() {
        let tokens = lex("a\n\n\nb");
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn leading_newlines_suppressed() {
        let tokens = lex("\n\nprint");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
    }

    #[test]
    fn comments_skip_to_end_of_line() {
        assert_eq!(
            kinds("print hi # a comment\nprint yo"),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn positions() {
        let tokens = lex("var x\nprint");
        assert_eq!((tokens[0].row, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].row, tokens[1].column), (1, 5));
        assert_eq!((tokens[2].row, tokens[2].column), (1, 6)); // newline
        assert_eq!((tokens[3].row, tokens[3].column), (2, 1));
    }

    #[test]
    fn row_count_matches_source_lines() {
        let source = "a\nb\nc\nd";
        let newlines = lex(source)
            .iter()
            .filter(|t| t.kind == TokenKind::Newline)
            .count();
        assert_eq!(newlines + 1, source.lines().count());
    }

    #[test]
    fn pipeline_tokens() {
        assert_eq!(
            kinds("print hello | tr a-z A-Z"),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Pipe,
                TokenKind::Identifier,
                TokenKind::Bareword,
                TokenKind::Bareword,
            ]
        );
    }

    #[test]
    fn array_literal_tokens() {
        assert_eq!(
            kinds("[ 1 2 3 ]"),
            vec![
                TokenKind::LeftBracket,
                TokenKind::IntegerLiteral,
                TokenKind::IntegerLiteral,
                TokenKind::IntegerLiteral,
                TokenKind::RightBracket,
            ]
        );
    }
}
