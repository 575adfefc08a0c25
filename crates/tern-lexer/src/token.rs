use std::fmt;
use tern_ast::Span;

/// Represents the different kinds of tokens in Tern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Package,
    Import,
    Fn,
    Let,
    Const,
    Return,
    If,
    Else,
    True,
    False,

    // Literals
    IntLiteral,
    StringLiteral,

    // Identifier
    Identifier,

    // Operators
    Plus,     // +
    Minus,    // -
    Star,     // *
    Slash,    // /
    Percent,  // %
    Eq,       // =
    EqEq,     // ==
    BangEq,   // !=
    Bang,     // !
    Lt,       // <
    Gt,       // >
    LtEq,     // <=
    GtEq,     // >=
    AmpAmp,   // &&
    PipePipe, // ||
    Arrow,    // ->

    // Delimiters
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Comma,     // ,
    Semicolon, // ;
    Dot,       // .
    Colon,     // :

    // Special
    Eof,
    Error,
}

impl TokenKind {
    pub(crate) fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "package" => TokenKind::Package,
            "import" => TokenKind::Import,
            "fn" => TokenKind::Fn,
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => return None,
        };
        Some(kind)
    }

    /// Source spelling for keywords and punctuation.
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            TokenKind::Package => "package",
            TokenKind::Import => "import",
            TokenKind::Fn => "fn",
            TokenKind::Let => "let",
            TokenKind::Const => "const",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::Bang => "!",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Arrow => "->",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::IntLiteral
            | TokenKind::StringLiteral
            | TokenKind::Identifier
            | TokenKind::Eof
            | TokenKind::Error => return None,
        };
        Some(symbol)
    }
}

/// How a token kind is named in "expected X" messages.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLiteral => write!(f, "integer literal"),
            TokenKind::StringLiteral => write!(f, "string literal"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::Error => write!(f, "invalid token"),
            other => write!(f, "'{}'", other.symbol().unwrap_or_default()),
        }
    }
}

/// Represents a token with its kind, span, and value.
///
/// For string literals `value` is the unescaped content; for error tokens it
/// is the lexer's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: String,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span, value: String) -> Self {
        Self { kind, span, value }
    }

    /// How the token is named in "found Y" messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier => format!("identifier {}", self.value),
            TokenKind::IntLiteral => format!("literal {}", self.value),
            TokenKind::StringLiteral => format!("literal {:?}", self.value),
            _ => self.kind.to_string(),
        }
    }
}
