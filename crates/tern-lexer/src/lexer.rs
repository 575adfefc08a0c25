use tern_ast::Span;
use crate::token::{Token, TokenKind};

/// The lexer/tokenizer for Tern.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current_pos: usize,
    current_char: Option<char>,
    file_id: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer from source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_file_id(source, 0)
    }

    /// Creates a new lexer with a specific file ID.
    pub fn with_file_id(source: &'a str, file_id: usize) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        Self {
            source,
            chars,
            current_pos: 0,
            current_char,
            file_id,
        }
    }

    /// Tokenizes the entire source code and returns all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Gets the next token from the source.
    pub fn next_token(&mut self) -> Token {
        if let Some(error_token) = self.skip_whitespace_and_comments() {
            return error_token;
        }

        let start = self.current_pos;

        let Some(ch) = self.current_char else {
            return Token::new(TokenKind::Eof, self.span_from(start), String::new());
        };

        match ch {
            '"' => self.read_string_literal(),
            '0'..='9' => self.read_number(),
            'a'..='z' | 'A'..='Z' | '_' => self.read_identifier_or_keyword(),

            '+' => self.single(TokenKind::Plus),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '%' => self.single(TokenKind::Percent),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '.' => self.single(TokenKind::Dot),
            ':' => self.single(TokenKind::Colon),

            '-' => self.one_or_two('>', TokenKind::Minus, TokenKind::Arrow),
            '=' => self.one_or_two('=', TokenKind::Eq, TokenKind::EqEq),
            '!' => self.one_or_two('=', TokenKind::Bang, TokenKind::BangEq),
            '<' => self.one_or_two('=', TokenKind::Lt, TokenKind::LtEq),
            '>' => self.one_or_two('=', TokenKind::Gt, TokenKind::GtEq),
            '&' => self.pair('&', TokenKind::AmpAmp),
            '|' => self.pair('|', TokenKind::PipePipe),

            // Unicode identifiers
            _ if ch.is_alphabetic() => self.read_identifier_or_keyword(),

            _ => {
                self.advance();
                Token::new(
                    TokenKind::Error,
                    self.span_from(start),
                    format!("invalid character {:?}", ch),
                )
            }
        }
    }

    // Helper methods

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.current_pos, self.file_id)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.current_pos;
        self.advance();
        let text = self.source[start..self.current_pos].to_string();
        Token::new(kind, self.span_from(start), text)
    }

    /// `first` alone, or `second` when the next char is `next`.
    fn one_or_two(&mut self, next: char, first: TokenKind, second: TokenKind) -> Token {
        if self.peek() == Some(next) {
            let start = self.current_pos;
            self.advance();
            self.advance();
            let text = self.source[start..self.current_pos].to_string();
            Token::new(second, self.span_from(start), text)
        } else {
            self.single(first)
        }
    }

    /// Two-character operators with no single-character form (`&&`, `||`).
    fn pair(&mut self, next: char, kind: TokenKind) -> Token {
        let start = self.current_pos;
        let ch = self.current_char.unwrap_or_default();
        self.advance();
        if self.current_char == Some(next) {
            self.advance();
            let text = self.source[start..self.current_pos].to_string();
            Token::new(kind, self.span_from(start), text)
        } else {
            Token::new(
                TokenKind::Error,
                self.span_from(start),
                format!("invalid character {:?}", ch),
            )
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            match self.current_char {
                Some(ch) if ch.is_whitespace() => self.advance(),
                Some('/') if self.peek() == Some('/') => {
                    while let Some(ch) = self.current_char {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek() == Some('*') => {
                    let start = self.current_pos;
                    self.advance();
                    self.advance();
                    let mut terminated = false;
                    while let Some(ch) = self.current_char {
                        if ch == '*' && self.peek() == Some('/') {
                            self.advance();
                            self.advance();
                            terminated = true;
                            break;
                        }
                        self.advance();
                    }
                    if !terminated {
                        return Some(Token::new(
                            TokenKind::Error,
                            self.span_from(start),
                            "comment not terminated".to_string(),
                        ));
                    }
                }
                _ => return None,
            }
        }
    }

    fn read_string_literal(&mut self) -> Token {
        let start = self.current_pos;
        self.advance(); // opening quote

        let mut value = String::new();
        loop {
            match self.current_char {
                None | Some('\n') => {
                    return Token::new(
                        TokenKind::Error,
                        self.span_from(start),
                        "string literal not terminated".to_string(),
                    );
                }
                Some('"') => {
                    self.advance();
                    return Token::new(TokenKind::StringLiteral, self.span_from(start), value);
                }
                Some('\\') => {
                    let escape_start = self.current_pos;
                    self.advance();
                    let escaped = match self.current_char {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('0') => '\0',
                        _ => {
                            self.advance();
                            return Token::new(
                                TokenKind::Error,
                                Span::new(escape_start, self.current_pos, self.file_id),
                                "unknown escape sequence".to_string(),
                            );
                        }
                    };
                    value.push(escaped);
                    self.advance();
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_pos;
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.source[start..self.current_pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        Token::new(TokenKind::IntLiteral, self.span_from(start), text)
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.current_pos;
        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.current_pos];
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, self.span_from(start), text.to_string())
    }
}
