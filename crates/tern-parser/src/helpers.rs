//! Helper methods and utilities

use super::*;

impl Parser {
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Node<Ident>> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(Node::new(Ident::new(token.value.clone()), token.span))
    }

    pub(crate) fn get_infix_precedence(&self) -> u8 {
        match self.current_token().kind {
            TokenKind::PipePipe => 1,
            TokenKind::AmpAmp => 2,
            TokenKind::EqEq
            | TokenKind::BangEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq => 3,
            TokenKind::Plus | TokenKind::Minus => 4,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 5,
            _ => 0,
        }
    }

    pub(crate) fn parse_binary_operator(&mut self) -> ParseResult<BinaryOp> {
        let op = match self.current_token().kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::PipePipe => BinaryOp::Or,
            _ => return Err(self.expected("binary operator")),
        };
        self.advance();
        Ok(op)
    }

    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[(self.current.saturating_sub(1)).min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && &self.current_token().kind == kind
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + offset).map(|token| &token.kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> ParseResult<&Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.expected(&kind.to_string()))
        }
    }

    pub(crate) fn consume_semicolon(&mut self) {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current_token().span)
    }

    pub(crate) fn expected(&self, what: &str) -> ParseError {
        self.error(format!("expected {}, found {}", what, self.current_token().describe()))
    }

    /// Skips to the next top-level declaration keyword.
    pub(crate) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            match self.current_token().kind {
                TokenKind::Fn | TokenKind::Const | TokenKind::Import => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
