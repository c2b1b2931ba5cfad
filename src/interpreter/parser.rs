use crate::ast::{Node, NodeKind, Root};
use crate::diagnostic::Span;
use crate::token::{Token, TokenKind};

use super::error::{Expectation, Expected, ParseError};

/// Recursive descent over the token stream with single-token lookahead and
/// cursor checkpoints. The first expectation recorded while a statement's
/// alternatives fail is the one reported; a statement that ultimately
/// parses clears whatever its abandoned alternatives recorded.
pub struct Parser<'t> {
    tokens: &'t [Token],
    current: usize,
    error: Option<ParseError>,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            current: 0,
            error: None,
        }
    }

    pub fn parse(mut self) -> Result<Root, ParseError> {
        let mut root = Root::new();
        while !self.eot() {
            if self.get_if(TokenKind::Newline).is_some() {
                continue;
            }
            if self.peek_kind() == Some(TokenKind::Fn) {
                match self.parse_fn_declaration() {
                    Some(declaration) => {
                        self.error = None;
                        // duplicate names: the last declaration wins
                        root.functions
                            .insert(declaration.token.text.clone(), declaration);
                    }
                    None => return Err(self.take_error()),
                }
                continue;
            }
            match self.parse_statement() {
                Some(statement) => {
                    self.error = None;
                    root.statements.push(statement);
                }
                None => return Err(self.take_error()),
            }
        }
        Ok(root)
    }

    fn parse_statement(&mut self) -> Option<Node> {
        match self.peek_kind()? {
            TokenKind::Identifier => {
                let checkpoint = self.current;
                if let Some(call) = self.parse_function_call() {
                    if self.end_of_statement() {
                        return Some(call);
                    }
                    self.record(Expected::Kind(TokenKind::Newline));
                }
                // no trailing newline (or a malformed argument): abandon
                // the call and retry the input as an expression statement
                self.current = checkpoint;
                self.parse_expression_statement()
            }
            TokenKind::Var => self.parse_declaration(),
            TokenKind::Variable => {
                if let Some(assignment) = self.parse_assignment() {
                    return Some(assignment);
                }
                if self.error.is_some() {
                    return None;
                }
                // `$x` with no `=` following is an ordinary expression
                self.parse_expression_statement()
            }
            TokenKind::LeftBrace => self.parse_scope(true),
            TokenKind::If => self.parse_branch(),
            TokenKind::While | TokenKind::For => self.parse_loop(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> Option<Node> {
        let expression = self.parse_expression(true)?;
        if !self.end_of_statement() {
            return self.expected_kind(TokenKind::Newline);
        }
        Some(expression)
    }

    /// `IDENT primaryExpr* ('|' functionCall)?`. Arguments are primary
    /// expressions and `|` never begins one, so pipe acceptance is
    /// naturally disabled while arguments are consumed.
    fn parse_function_call(&mut self) -> Option<Node> {
        let name = self.get_if(TokenKind::Identifier)?;
        let mut call = Node::new(NodeKind::FunctionCall, name);
        while self.starts_primary() {
            let argument = self.parse_primary()?;
            call.children.push(argument);
        }
        if let Some(pipe) = self.get_if(TokenKind::Pipe) {
            let rhs = match self.parse_function_call() {
                Some(rhs) => rhs,
                None => return self.expected_category(Expectation::Callable),
            };
            let mut node = Node::new(NodeKind::BinaryOperator, pipe);
            node.children.push(call);
            node.children.push(rhs);
            return Some(node);
        }
        Some(call)
    }

    fn parse_declaration(&mut self) -> Option<Node> {
        self.get_if(TokenKind::Var)?;
        let name = match self.get_if(TokenKind::Identifier) {
            Some(token) => token,
            None => return self.expected_kind(TokenKind::Identifier),
        };
        if self.get_if(TokenKind::Assign).is_none() {
            return self.expected_kind(TokenKind::Assign);
        }
        let value = self.parse_expression(true)?;
        if !self.end_of_statement() {
            return self.expected_kind(TokenKind::Newline);
        }
        let mut node = Node::new(NodeKind::Declaration, name);
        node.children.push(value);
        Some(node)
    }

    /// `$name = expr`. Restores the cursor when no `=` follows so a bare
    /// variable reference can still be an expression statement.
    fn parse_assignment(&mut self) -> Option<Node> {
        let checkpoint = self.current;
        let target = self.get_if(TokenKind::Variable)?;
        let Some(assign) = self.get_if(TokenKind::Assign) else {
            self.current = checkpoint;
            return None;
        };
        let value = self.parse_expression(true)?;
        if !self.end_of_statement() {
            return self.expected_kind(TokenKind::Newline);
        }
        let mut node = Node::new(NodeKind::Assignment, assign);
        node.children.push(Node::new(NodeKind::Variable, target));
        node.children.push(value);
        Some(node)
    }

    fn parse_fn_declaration(&mut self) -> Option<Node> {
        self.get_if(TokenKind::Fn)?;
        let name = match self.get_if(TokenKind::Identifier) {
            Some(token) => token,
            None => return self.expected_kind(TokenKind::Identifier),
        };
        let mut params = Vec::new();
        while let Some(param) = self.get_if(TokenKind::Identifier) {
            params.push(param.text);
        }
        let body = self.parse_scope(true)?;
        let mut node = Node::new(NodeKind::FnDeclaration { params }, name);
        node.children.push(body);
        Some(node)
    }

    fn parse_return(&mut self) -> Option<Node> {
        let keyword = match self.get_if(TokenKind::Return) {
            Some(token) => token,
            None => return self.expected_kind(TokenKind::Return),
        };
        let mut node = Node::new(NodeKind::Return, keyword);
        if !matches!(
            self.peek_kind(),
            None | Some(TokenKind::Newline) | Some(TokenKind::RightBrace)
        ) {
            node.children.push(self.parse_expression(true)?);
        }
        if !self.end_of_statement() {
            return self.expected_kind(TokenKind::Newline);
        }
        Some(node)
    }

    /// `'{' NEWLINE? (statement | return)* '}' NEWLINE?`. The trailing
    /// newline is left alone when the caller needs to look for `else`.
    fn parse_scope(&mut self, consume_trailing_newline: bool) -> Option<Node> {
        let Some(open) = self.get_if(TokenKind::LeftBrace) else {
            return self.expected_category(Expectation::Scope);
        };
        self.get_if(TokenKind::Newline);
        let mut scope = Node::new(NodeKind::Scope, open);
        loop {
            if self.get_if(TokenKind::Newline).is_some() {
                continue;
            }
            match self.peek_kind() {
                None => return self.expected_kind(TokenKind::RightBrace),
                Some(TokenKind::RightBrace) => break,
                Some(TokenKind::Return) => {
                    let statement = self.parse_return()?;
                    self.error = None;
                    scope.children.push(statement);
                }
                Some(_) => {
                    let statement = self.parse_statement()?;
                    self.error = None;
                    scope.children.push(statement);
                }
            }
        }
        self.bump();
        if consume_trailing_newline {
            self.get_if(TokenKind::Newline);
        }
        Some(scope)
    }

    /// `'if' expr scope ('else' (branch | scope))?` with a required
    /// newline (or end of input) after the whole chain.
    fn parse_branch(&mut self) -> Option<Node> {
        let keyword = match self.get_if(TokenKind::If) {
            Some(token) => token,
            None => return self.expected_kind(TokenKind::If),
        };
        let condition = self.parse_expression(true)?;
        let body = self.parse_scope(false)?;
        let mut node = Node::new(
            NodeKind::Branch {
                condition: Some(Box::new(condition)),
                body: Box::new(body),
            },
            keyword,
        );
        if self.get_if(TokenKind::Else).is_some() {
            if self.peek_kind() == Some(TokenKind::If) {
                let nested = self.parse_branch()?;
                node.children.push(nested);
                // the nested branch consumed the trailing newline
                return Some(node);
            }
            let else_scope = self.parse_scope(false)?;
            node.children.push(else_scope);
        }
        if !self.end_of_statement() {
            return self.expected_kind(TokenKind::Newline);
        }
        Some(node)
    }

    fn parse_loop(&mut self) -> Option<Node> {
        if let Some(keyword) = self.get_if(TokenKind::While) {
            let condition = self.parse_expression(true)?;
            let body = self.parse_scope(true)?;
            let mut node = Node::new(
                NodeKind::While {
                    condition: Box::new(condition),
                },
                keyword,
            );
            node.children.push(body);
            return Some(node);
        }
        let keyword = match self.get_if(TokenKind::For) {
            Some(token) => token,
            None => return self.expected_kind(TokenKind::For),
        };
        let binding = match self.get_if(TokenKind::Identifier) {
            Some(token) => token,
            None => return self.expected_kind(TokenKind::Identifier),
        };
        if self.get_if(TokenKind::In).is_none() {
            return self.expected_kind(TokenKind::In);
        }
        let iterable = self.parse_expression(true)?;
        let body = self.parse_scope(true)?;
        let mut node = Node::new(
            NodeKind::ForIn {
                binding: binding.text,
                iterable: Box::new(iterable),
            },
            keyword,
        );
        node.children.push(body);
        Some(node)
    }

    fn parse_expression(&mut self, allow_pipe: bool) -> Option<Node> {
        self.parse_binary(u8::MAX, allow_pipe)
    }

    /// Precedence climbing over `Token::precedence()`; lower binds
    /// tighter, equal precedence associates left. The right operand of a
    /// pipe must be a function call, and a bare identifier on the left of
    /// a pipe becomes a zero-argument call.
    fn parse_binary(&mut self, limit: u8, allow_pipe: bool) -> Option<Node> {
        let mut lhs = match self.parse_primary() {
            Some(node) => node,
            None => return self.expected_category(Expectation::Expression),
        };
        loop {
            let Some(next) = self.peek() else { break };
            let kind = next.kind;
            let precedence = next.precedence();
            if !kind.is_binary_operator() {
                break;
            }
            if kind == TokenKind::Pipe && !allow_pipe {
                break;
            }
            if precedence >= limit {
                break;
            }
            let operator = self.bump();
            let rhs = if kind == TokenKind::Pipe {
                match self.parse_function_call() {
                    Some(rhs) => rhs,
                    None => return self.expected_category(Expectation::Callable),
                }
            } else {
                self.parse_binary(precedence, allow_pipe)?
            };
            if kind == TokenKind::Pipe && lhs.kind == NodeKind::Identifier {
                lhs.kind = NodeKind::FunctionCall;
            }
            let mut node = Node::new(NodeKind::BinaryOperator, operator);
            node.children.push(lhs);
            node.children.push(rhs);
            lhs = node;
        }
        Some(lhs)
    }

    fn starts_primary(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(
                TokenKind::Subtract
                    | TokenKind::Bang
                    | TokenKind::LeftParen
                    | TokenKind::LeftBracket
                    | TokenKind::Identifier
                    | TokenKind::Bareword
                    | TokenKind::Variable
                    | TokenKind::StringLiteral
                    | TokenKind::IntegerLiteral
                    | TokenKind::True
                    | TokenKind::False
            )
        )
    }

    fn parse_primary(&mut self) -> Option<Node> {
        let token = self.peek()?.clone();
        match token.kind {
            TokenKind::Subtract | TokenKind::Bang => {
                self.bump();
                let operand = match self.parse_primary() {
                    Some(node) => node,
                    None => return self.expected_category(Expectation::Expression),
                };
                let mut node = Node::new(NodeKind::UnaryOperator, token);
                node.children.push(operand);
                Some(node)
            }
            TokenKind::LeftParen => {
                self.bump();
                let call = match self.parse_function_call() {
                    Some(call) => call,
                    None => return self.expected_category(Expectation::Callable),
                };
                if self.get_if(TokenKind::RightParen).is_none() {
                    return self.expected_kind(TokenKind::RightParen);
                }
                Some(call)
            }
            TokenKind::LeftBracket => {
                self.bump();
                let mut node = Node::new(NodeKind::ArrayLiteral, token);
                while self.starts_primary() {
                    node.children.push(self.parse_primary()?);
                }
                if self.get_if(TokenKind::RightBracket).is_none() {
                    return self.expected_kind(TokenKind::RightBracket);
                }
                Some(node)
            }
            TokenKind::Identifier => {
                self.bump();
                Some(Node::new(NodeKind::Identifier, token))
            }
            TokenKind::Bareword => {
                self.bump();
                Some(Node::new(NodeKind::Bareword, token))
            }
            TokenKind::Variable => {
                self.bump();
                Some(Node::new(NodeKind::Variable, token))
            }
            TokenKind::StringLiteral => {
                self.bump();
                Some(Node::new(NodeKind::StringLiteral, token))
            }
            TokenKind::True | TokenKind::False => {
                self.bump();
                Some(Node::new(NodeKind::BoolLiteral, token))
            }
            TokenKind::IntegerLiteral => match token.text.parse::<i64>() {
                Ok(value) => {
                    self.bump();
                    Some(Node::new(NodeKind::IntegerLiteral(value), token))
                }
                Err(_) => self.expected_category(Expectation::Expression),
            },
            _ => None,
        }
    }

    /// A statement ends at a newline, end of input, or the `}` closing a
    /// single-line scope (left for the scope itself to consume).
    fn end_of_statement(&mut self) -> bool {
        if self.eot() {
            return true;
        }
        if self.get_if(TokenKind::Newline).is_some() {
            return true;
        }
        self.peek_kind() == Some(TokenKind::RightBrace)
    }

    fn eot(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        self.current += 1;
        token
    }

    fn get_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.peek_kind() == Some(kind) {
            return Some(self.bump());
        }
        None
    }

    fn record(&mut self, expected: Expected) {
        if self.error.is_some() {
            return;
        }
        let found = self.peek().cloned();
        let position = match &found {
            Some(token) => token.span(),
            // end of input is reported against the last token seen
            None => self
                .tokens
                .last()
                .map(Token::span)
                .unwrap_or_else(|| Span::new(1, 1, 1)),
        };
        self.error = Some(ParseError {
            expected,
            found,
            position,
        });
    }

    fn expected_kind<T>(&mut self, kind: TokenKind) -> Option<T> {
        self.record(Expected::Kind(kind));
        None
    }

    fn expected_category<T>(&mut self, category: Expectation) -> Option<T> {
        self.record(Expected::Category(category));
        None
    }

    fn take_error(&mut self) -> ParseError {
        self.error.take().unwrap_or_else(|| {
            let found = self.peek().cloned();
            let position = found
                .as_ref()
                .map(Token::span)
                .unwrap_or_else(|| Span::new(1, 1, 1));
            ParseError {
                expected: Expected::Category(Expectation::Expression),
                found,
                position,
            }
        })
    }
}
