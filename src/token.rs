//! The token definition for the condition expression language.

/// A token is a single unit of the language, with a specific kind and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    // Keywords
    And,     // "AND"
    Or,      // "OR"
    Exists,  // "EXISTS"
    Missing, // "MISSING"

    // Literals
    Identifier(&'a str), // May contain dots: "log.level"
    String(&'a str),     // The content, without the quotes
    Int(i64),
    Float(f64),

    // Punctuation
    LParen,    // (
    RParen,    // )
    Comma,     // ,
    Semicolon, // ;

    // Operators
    Eq,       // =
    NotEq,    // !=
    Tilde,    // ~  (contains)
    NotTilde, // !~ (does not contain)
    Gt,       // >
    Lt,       // <
    Gte,      // >=
    Lte,      // <=

    // Special
    Illegal, // An illegal/unknown character
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}
