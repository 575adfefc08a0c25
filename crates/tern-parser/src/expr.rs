//! Expression parsing

use super::*;

/// Binding power of prefix operators; tighter than every binary operator.
const PREFIX_PRECEDENCE: u8 = 6;

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node<Expr>> {
        self.parse_expression_with_precedence(1)
    }

    pub(crate) fn parse_expression_with_precedence(&mut self, min_precedence: u8) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_prefix_expression()?;

        loop {
            let precedence = self.get_infix_precedence();
            if precedence == 0 || precedence < min_precedence {
                break;
            }

            let op = self.parse_binary_operator()?;
            let right = self.parse_expression_with_precedence(precedence + 1)?;
            let span = left.span.merge(&right.span);
            left = Node::new(
                Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        let op = match self.current_token().kind {
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix_expression(),
        };
        self.advance();

        let expr = self.parse_expression_with_precedence(PREFIX_PRECEDENCE)?;
        let span = start.merge(&expr.span);
        Ok(Node::new(
            Expr::Unary {
                op,
                expr: Box::new(expr),
            },
            span,
        ))
    }

    /// Primary expression followed by any number of `.name` and `(args)`.
    fn parse_postfix_expression(&mut self) -> ParseResult<Node<Expr>> {
        let mut expr = self.parse_primary_expression()?;

        loop {
            if self.check(&TokenKind::Dot) {
                self.advance();
                let field = self.parse_identifier()?;
                let span = expr.span.merge(&field.span);
                expr = Node::new(
                    Expr::Selector {
                        base: Box::new(expr),
                        field,
                    },
                    span,
                );
            } else if self.check(&TokenKind::LParen) {
                self.advance();
                let mut args = Vec::new();
                while !self.check(&TokenKind::RParen) && !self.is_at_end() {
                    args.push(self.parse_expression()?);
                    if !self.check(&TokenKind::RParen) {
                        self.consume(TokenKind::Comma)?;
                    }
                }
                let close = self.consume(TokenKind::RParen)?.span;
                let span = expr.span.merge(&close);
                expr = Node::new(
                    Expr::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Node<Expr>> {
        let token = self.current_token().clone();

        let expr = match token.kind {
            TokenKind::IntLiteral => {
                let value = token
                    .value
                    .parse::<i64>()
                    .map_err(|_| ParseError::new("integer literal out of range", token.span))?;
                Expr::Literal(Literal::Int(value))
            }
            TokenKind::StringLiteral => Expr::Literal(Literal::String(token.value.clone())),
            TokenKind::True => Expr::Literal(Literal::Bool(true)),
            TokenKind::False => Expr::Literal(Literal::Bool(false)),
            TokenKind::Identifier => Expr::Ident(Ident::new(token.value.clone())),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                let close = self.consume(TokenKind::RParen)?.span;
                return Ok(Node::new(Expr::Paren(Box::new(inner)), token.span.merge(&close)));
            }
            _ => return Err(self.expected("expression")),
        };

        self.advance();
        Ok(Node::new(expr, token.span))
    }
}
