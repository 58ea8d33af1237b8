//! Tokens produced by the search query lexer.

/// Kinds of token a search query decomposes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word, e.g. `rust`.
    Word,
    /// Quoted phrase, e.g. `"site reliability"` (quotes stripped).
    Phrase,
    /// `AND` keyword (any case).
    And,
    /// `OR` keyword (any case).
    Or,
    /// `NOT` keyword (any case).
    Not,
}

impl TokenKind {
    /// Whether the token carries a searchable value.
    #[inline]
    pub const fn is_term(self) -> bool {
        matches!(self, TokenKind::Word | TokenKind::Phrase)
    }

    /// Map a bare word onto a keyword kind when it spells one.
    pub fn keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("AND") {
            Some(TokenKind::And)
        } else if word.eq_ignore_ascii_case("OR") {
            Some(TokenKind::Or)
        } else if word.eq_ignore_ascii_case("NOT") {
            Some(TokenKind::Not)
        } else {
            None
        }
    }
}

/// A token in a search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Term text for words and phrases; the keyword as typed for operators.
    pub text: String,
    /// Byte offset of the token's first character in the input.
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// Build a word token, promoting keywords to operator tokens.
    pub fn word(text: &str, position: usize) -> Self {
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Word);
        Self::new(kind, text, position)
    }

    pub fn phrase(text: &str, position: usize) -> Self {
        Self::new(TokenKind::Phrase, text, position)
    }
}
