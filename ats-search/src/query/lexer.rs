//! Search query lexer.
//!
//! A single left-to-right scan that splits free text into words, quoted
//! phrases and the `AND` / `OR` / `NOT` keywords. Lexing is total: every
//! input yields a (possibly empty) token list.
//!
//! Keywords are only recognised between whitespace (or the ends of the
//! input). A keyword glued to a phrase quote, as in `"a"OR"b"`, is a word.

use super::token::{Token, TokenKind};

const QUOTE: char = '"';

/// Lexer over a borrowed query string.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Tokenize the whole input.
    pub fn tokenize(input: &'a str) -> Vec<Token> {
        Lexer::new(input).collect()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.position += rest.len() - trimmed.len();
    }

    /// Closing quote offset (relative to the opening quote) if the quote at
    /// `self.position` is balanced.
    fn closing_quote(&self) -> Option<usize> {
        self.rest()[1..].find(QUOTE).map(|offset| offset + 1)
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return None;
            }

            let start = self.position;
            if rest.starts_with(QUOTE)
                && let Some(close) = self.closing_quote()
            {
                let inner = rest[1..close].trim();
                self.position += close + 1;
                if inner.is_empty() {
                    continue;
                }
                return Some(Token::phrase(inner, start));
            }

            let len = word_len(rest);
            let text = &rest[..len];
            let glued = self.input[..start].ends_with(QUOTE) || rest[len..].starts_with(QUOTE);
            self.position += len;
            return Some(if glued {
                Token::new(TokenKind::Word, text, start)
            } else {
                Token::word(text, start)
            });
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Length in bytes of the word at the start of `rest`.
///
/// A word ends at whitespace or at a quote that opens a balanced phrase. A
/// quote without a partner is kept as an ordinary character.
fn word_len(rest: &str) -> usize {
    for (offset, ch) in rest.char_indices() {
        if ch.is_whitespace() {
            return offset;
        }
        if ch == QUOTE && offset > 0 && rest[offset + 1..].contains(QUOTE) {
            return offset;
        }
    }
    rest.len()
}
