//! # Boolean candidate search queries
//!
//! Compiles the free text typed into a recruiter's search box into a
//! [`Predicate`] tree.
//!
//! | Input                          | Predicate                                   |
//! |--------------------------------|---------------------------------------------|
//! | `alice`                        | `Term(alice)`                               |
//! | `alice bob`                    | `And(Term(alice), Term(bob))`               |
//! | `alice OR bob`                 | `Or(Term(alice), Term(bob))`                |
//! | `alice AND NOT bob`            | `And(Term(alice), Not(Term(bob)))`          |
//! | `"site reliability" OR devops` | `Or(Term(site reliability), Term(devops))`  |
//! | `"A OR B" AND C`               | `And(Term(A OR B), Term(C))`                |
//! | empty, blank, `AND OR`         | `MatchAll`                                  |
//!
//! Compilation is total. End users type these queries, so malformed input
//! degrades to a broader match instead of an error.

pub mod lexer;
pub mod parser;
pub mod predicate;
pub mod token;

use std::{convert::Infallible, str::FromStr};

use log::debug;

pub use lexer::Lexer;
pub use parser::Parser;
pub use predicate::{Predicate, TermRef, TermSource};
pub use token::{Token, TokenKind};

/// Compile a search query into a predicate tree.
///
/// Absent, empty and whitespace-only input yields [`Predicate::MatchAll`].
pub fn compile(query: Option<&str>) -> Predicate {
    let Some(raw) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return Predicate::MatchAll;
    };

    let tokens = Lexer::tokenize(raw);
    let predicate = Parser::new(&tokens).parse();
    debug!("compiled search query {raw:?} ({} tokens) into {predicate:?}", tokens.len());
    predicate
}

impl FromStr for Predicate {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(compile(Some(s)))
    }
}
