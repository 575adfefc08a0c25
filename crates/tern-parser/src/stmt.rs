//! Statement parsing

use super::*;

impl Parser {
    pub(crate) fn parse_block(&mut self) -> ParseResult<Node<Block>> {
        let start = self.consume(TokenKind::LBrace)?.span;
        let mut stmts = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_statement()?);
        }

        let close = self.consume(TokenKind::RBrace)?.span;
        Ok(Node::new(Block { stmts, close }, start.merge(&close)))
    }

    pub(crate) fn parse_statement(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.current_token().span;

        let stmt = match self.current_token().kind {
            TokenKind::Let => self.parse_let_statement()?,
            TokenKind::Return => self.parse_return_statement()?,
            TokenKind::If => self.parse_if_statement()?,
            TokenKind::LBrace => Stmt::Block(self.parse_block()?.value),
            TokenKind::Identifier if self.peek_kind(1) == Some(&TokenKind::Eq) => {
                let target = self.parse_identifier()?;
                self.consume(TokenKind::Eq)?;
                let value = self.parse_expression()?;
                Stmt::Assign { target, value }
            }
            _ => Stmt::Expr(self.parse_expression()?),
        };
        self.consume_semicolon();

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(stmt, span))
    }

    fn parse_let_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Let)?;
        let name = self.parse_identifier()?;

        let ty = if self.check(&TokenKind::Colon) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        self.consume(TokenKind::Eq)?;
        let init = self.parse_expression()?;

        Ok(Stmt::Let { name, ty, init })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Return)?;

        let mut values = Vec::new();
        if !self.check(&TokenKind::Semicolon) && !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            values.push(self.parse_expression()?);
            while self.check(&TokenKind::Comma) {
                self.advance();
                values.push(self.parse_expression()?);
            }
        }

        Ok(Stmt::Return(values))
    }

    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::If)?;
        let condition = self.parse_expression()?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            let start = self.current_token().span;
            let stmt = if self.check(&TokenKind::If) {
                self.parse_if_statement()?
            } else {
                Stmt::Block(self.parse_block()?.value)
            };
            let span = start.merge(&self.previous_token().span);
            Some(Box::new(Node::new(stmt, span)))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }
}
