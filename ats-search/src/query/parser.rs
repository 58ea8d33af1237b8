//! Recursive-descent parser from search tokens to a [`Predicate`].
//!
//! Grammar (operators are case-insensitive, `AND` is optional):
//!
//! ```text
//! query    := branch ( OR branch )*
//! branch   := item*
//! item     := term | AND | NOT operand
//! term     := WORD | PHRASE
//! operand  := WORD | PHRASE | AND | NOT
//! ```
//!
//! Within a branch the plain terms come first, in order, followed by the
//! negated ones. `NOT` takes the next token literally, so `NOT NOT x`
//! negates the word `NOT`. A `NOT` with nothing left to bind in its branch
//! becomes a plain term. Stray `AND` / `OR` tokens are separators only, so
//! parsing never fails.

use super::{
    predicate::Predicate,
    token::{Token, TokenKind},
};

pub struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, position: 0 }
    }

    pub fn parse(mut self) -> Predicate {
        self.parse_query()
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn parse_query(&mut self) -> Predicate {
        let mut branches = Vec::new();
        loop {
            let branch = self.parse_branch();
            if !branch.is_match_all() {
                branches.push(branch);
            }
            match self.advance() {
                Some(token) if token.kind == TokenKind::Or => continue,
                _ => break,
            }
        }

        match branches.len() {
            0 => Predicate::MatchAll,
            1 => branches.pop().unwrap_or_default(),
            _ => Predicate::Or(branches),
        }
    }

    /// Parse up to (not including) the next `OR` token.
    fn parse_branch(&mut self) -> Predicate {
        let mut and_terms = Vec::new();
        let mut not_terms = Vec::new();

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Or => break,
                TokenKind::Not => {
                    self.position += 1;
                    match self.parse_negated() {
                        Some(negated) => not_terms.push(negated),
                        None => and_terms.push(token.text.clone()),
                    }
                }
                kind => {
                    self.position += 1;
                    if kind.is_term() {
                        and_terms.push(token.text.clone());
                    }
                }
            }
        }

        let mut conditions: Vec<Predicate> = and_terms.into_iter().map(Predicate::Term).collect();
        conditions.extend(not_terms.into_iter().map(|term| Predicate::not(Predicate::Term(term))));

        match conditions.len() {
            0 => Predicate::MatchAll,
            1 => conditions.pop().unwrap_or_default(),
            _ => Predicate::And(conditions),
        }
    }

    /// `NOT` binds exactly one following token of the same branch.
    fn parse_negated(&mut self) -> Option<String> {
        let token = self.peek().filter(|token| token.kind != TokenKind::Or)?;
        self.position += 1;
        Some(token.text.clone())
    }
}
