use std::fmt;

use serde::{Deserialize, Serialize};

use super::token::TokenKind;

/// Boolean predicate over search terms.
///
/// Produced by [`compile`](super::compile) and consumed by the in-memory
/// matcher ([`Predicate::matches`]) or the RediSearch translator
/// ([`crate::search::translate`]).
///
/// ```
/// use ats_search::query::{Predicate, compile};
///
/// assert_eq!(
///     compile(Some("alice AND NOT bob")),
///     Predicate::and([Predicate::term("alice"), Predicate::not(Predicate::term("bob"))]),
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// No filter; matches every record.
    #[default]
    MatchAll,
    Term(String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

/// A term value found in a predicate together with its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermRef<'a> {
    pub value: &'a str,
    pub negated: bool,
}

/// A record that terms can be matched against.
///
/// Text fields match on case-insensitive substring; array fields match on an
/// exact, case-sensitive element.
pub trait TermSource {
    fn text_fields(&self) -> impl Iterator<Item = &str>;

    fn array_fields(&self) -> impl Iterator<Item = &[String]>;

    fn matches_term(&self, value: &str) -> bool {
        let needle = value.to_lowercase();
        self.text_fields()
            .any(|field| field.to_lowercase().contains(&needle))
            || self
                .array_fields()
                .any(|items| items.iter().any(|item| item == value))
    }
}

impl Predicate {
    #[inline]
    pub fn term(value: impl Into<String>) -> Self {
        Self::Term(value.into())
    }

    #[inline]
    pub fn and(children: impl IntoIterator<Item = Predicate>) -> Self {
        Self::And(children.into_iter().collect())
    }

    #[inline]
    pub fn or(children: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Or(children.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    #[inline]
    pub fn not(inner: Predicate) -> Self {
        Self::Not(Box::new(inner))
    }

    #[inline]
    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::MatchAll)
    }

    /// Every term in the tree, left to right, with its polarity.
    pub fn terms(&self) -> Vec<TermRef<'_>> {
        let mut out = Vec::new();
        self.collect_terms(false, &mut out);
        out
    }

    fn collect_terms<'a>(&'a self, negated: bool, out: &mut Vec<TermRef<'a>>) {
        match self {
            Self::MatchAll => {}
            Self::Term(value) => out.push(TermRef { value, negated }),
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_terms(negated, out);
                }
            }
            Self::Not(inner) => inner.collect_terms(!negated, out),
        }
    }

    /// Evaluate the predicate against a record.
    pub fn matches<S: TermSource>(&self, source: &S) -> bool {
        match self {
            Self::MatchAll => true,
            Self::Term(value) => source.matches_term(value),
            Self::And(children) => children.iter().all(|child| child.matches(source)),
            Self::Or(children) => children.iter().any(|child| child.matches(source)),
            Self::Not(inner) => !inner.matches(source),
        }
    }
}

/// Renders the canonical query text: `alice AND NOT bob`, `a OR b`.
///
/// Compiling the rendered text of a compiled predicate yields the same
/// predicate, provided no term contains a double quote.
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatchAll => Ok(()),
            Self::Term(value) => {
                if needs_quotes(value) {
                    write!(f, "\"{value}\"")
                } else {
                    f.write_str(value)
                }
            }
            Self::And(children) => write_joined(f, children, " AND "),
            Self::Or(children) => write_joined(f, children, " OR "),
            Self::Not(inner) => write!(f, "NOT {inner}"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[Predicate], separator: &str) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{child}")?;
    }
    Ok(())
}

fn needs_quotes(value: &str) -> bool {
    value.chars().any(char::is_whitespace) || TokenKind::keyword(value).is_some()
}
