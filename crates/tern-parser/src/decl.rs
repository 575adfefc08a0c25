//! Top-level declaration parsing

use super::*;

impl Parser {
    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Node<Decl>> {
        let start = self.current_token().span;

        let decl = match self.current_token().kind {
            TokenKind::Fn => Decl::Function(self.parse_function_decl()?),
            TokenKind::Const => Decl::Const(self.parse_const_decl()?),
            _ => return Err(self.expected("declaration")),
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(decl, span))
    }

    fn parse_function_decl(&mut self) -> ParseResult<FunctionDecl> {
        self.consume(TokenKind::Fn)?;
        let name = self.parse_identifier()?;

        self.consume(TokenKind::LParen)?;
        let params = self.parse_function_params()?;
        self.consume(TokenKind::RParen)?;

        let result = if self.check(&TokenKind::Arrow) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block()?;
        self.consume_semicolon();

        Ok(FunctionDecl {
            name,
            params,
            result,
            body,
        })
    }

    fn parse_function_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            let name = self.parse_identifier()?;
            self.consume(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            params.push(Param { name, ty });

            if !self.check(&TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }

        Ok(params)
    }

    fn parse_const_decl(&mut self) -> ParseResult<ConstDecl> {
        self.consume(TokenKind::Const)?;
        let name = self.parse_identifier()?;
        self.consume(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        self.consume(TokenKind::Eq)?;
        let value = self.parse_expression()?;
        self.consume_semicolon();

        Ok(ConstDecl { name, ty, value })
    }
}
