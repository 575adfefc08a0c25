//! Core Parser struct and main parsing methods

use super::*;

/// Result of parsing one file.
///
/// `file` is `None` only when the package clause could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub file: Option<SourceFile>,
    pub errors: Vec<ParseError>,
}

/// Recursive descent parser for Tern
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
}

impl Parser {
    /// Creates a new parser from a token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parses a complete source file
    pub fn parse_file(&mut self) -> ParsedFile {
        let start_span = self.current_token().span;
        let mut errors = Vec::new();

        let (package_keyword, package) = match self.parse_package_clause() {
            Ok(clause) => clause,
            Err(err) => {
                errors.push(err);
                return ParsedFile { file: None, errors };
            }
        };

        let mut imports = Vec::new();
        while self.check(&TokenKind::Import) {
            match self.parse_import_decl() {
                Ok(mut decls) => imports.append(&mut decls),
                Err(err) => {
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        let mut items = Vec::new();
        while !self.is_at_end() {
            if self.check(&TokenKind::Import) {
                errors.push(self.error("imports must appear before other declarations"));
                if self.parse_import_decl().is_err() {
                    self.synchronize();
                }
                continue;
            }

            match self.parse_declaration() {
                Ok(item) => items.push(item),
                Err(err) => {
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        let end_span = self.previous_token().span;
        ParsedFile {
            file: Some(SourceFile {
                package_keyword,
                package,
                imports,
                items,
                span: start_span.merge(&end_span),
            }),
            errors,
        }
    }

    // =========================================================================
    // Package clause and imports
    // =========================================================================

    fn parse_package_clause(&mut self) -> ParseResult<(Span, Node<Ident>)> {
        let keyword = self.consume(TokenKind::Package)?.span;
        let name = self.parse_identifier()?;
        self.consume_semicolon();
        Ok((keyword, name))
    }

    /// `import spec` or `import ( spec* )`
    pub(crate) fn parse_import_decl(&mut self) -> ParseResult<Vec<ImportDecl>> {
        self.consume(TokenKind::Import)?;

        if self.check(&TokenKind::LParen) {
            self.advance();
            let mut decls = Vec::new();
            while !self.check(&TokenKind::RParen) && !self.is_at_end() {
                decls.push(self.parse_import_spec()?);
                self.consume_semicolon();
            }
            self.consume(TokenKind::RParen)?;
            self.consume_semicolon();
            return Ok(decls);
        }

        let decl = self.parse_import_spec()?;
        self.consume_semicolon();
        Ok(vec![decl])
    }

    fn parse_import_spec(&mut self) -> ParseResult<ImportDecl> {
        let alias = if self.check(&TokenKind::Identifier) {
            Some(self.parse_identifier()?)
        } else {
            None
        };

        let token = self.consume(TokenKind::StringLiteral)?;
        let path = Node::new(token.value.clone(), token.span);
        if path.value.is_empty() {
            return Err(ParseError::new("invalid import path: \"\"", path.span));
        }

        Ok(ImportDecl { alias, path })
    }
}
