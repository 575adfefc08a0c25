//! Type annotation parsing

use super::*;

impl Parser {
    /// `name` or `package.Name`
    pub(crate) fn parse_type(&mut self) -> ParseResult<Node<TypeExpr>> {
        if !self.check(&TokenKind::Identifier) {
            return Err(self.expected("type"));
        }
        let first = self.parse_identifier()?;

        if self.check(&TokenKind::Dot) {
            self.advance();
            let name = self.parse_identifier()?;
            let span = first.span.merge(&name.span);
            return Ok(Node::new(
                TypeExpr::Qualified {
                    package: first,
                    name,
                },
                span,
            ));
        }

        let span = first.span;
        Ok(Node::new(TypeExpr::Named(first.value), span))
    }
}
