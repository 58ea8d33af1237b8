//! Predicate → RediSearch filter translation.
//!
//! A term is a union across fields: infix match on every TEXT field plus
//! exact element match on every TAG field. Values that RediSearch would split
//! into several tokens at index time (whitespace or any tokenizer punctuation
//! such as `-`, `.` and `@`) become exact phrase matches on TEXT fields.

use log::debug;

use super::{FilterCondition, has_token_separator};
use crate::query::Predicate;

/// Index fields a search term fans out to.
#[derive(Debug, Clone, Copy)]
pub struct SearchFields {
    pub text: &'static [&'static str],
    pub tags: &'static [&'static str],
}

impl SearchFields {
    pub const fn new(text: &'static [&'static str], tags: &'static [&'static str]) -> Self {
        Self { text, tags }
    }

    fn term_condition(&self, value: &str) -> FilterCondition {
        let phrase = has_token_separator(value);
        let mut leaves: Vec<FilterCondition> = self
            .text
            .iter()
            .map(|field| {
                if phrase {
                    FilterCondition::text_exact(*field, value)
                } else {
                    FilterCondition::text_contains(*field, value)
                }
            })
            .chain(self.tags.iter().map(|field| FilterCondition::tag_eq(*field, value)))
            .collect();

        if leaves.len() == 1 {
            leaves.pop().unwrap_or_else(|| FilterCondition::And(Vec::new()))
        } else {
            FilterCondition::Or(leaves)
        }
    }
}

/// Translate a predicate. `MatchAll` yields `None` (no filter).
pub fn translate(predicate: &Predicate, fields: &SearchFields) -> Option<FilterCondition> {
    let condition = match predicate {
        Predicate::MatchAll => return None,
        Predicate::Term(value) => fields.term_condition(value),
        Predicate::And(children) => FilterCondition::And(children.iter().filter_map(|c| translate(c, fields)).collect()),
        Predicate::Or(children) => FilterCondition::Or(children.iter().filter_map(|c| translate(c, fields)).collect()),
        Predicate::Not(inner) => FilterCondition::not(translate(inner, fields)?),
    };
    debug!("translated {predicate} into {}", condition.to_query_clause());
    Some(condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::compile;

    const FIELDS: SearchFields = SearchFields::new(&["first_name", "current_title"], &["skills", "tags"]);
    const TEXT_ONLY: SearchFields = SearchFields::new(&["summary"], &[]);

    fn clause(query: &str, fields: &SearchFields) -> String {
        translate(&compile(Some(query)), fields)
            .map(|c| c.to_query_clause())
            .unwrap_or_default()
    }

    #[test]
    fn match_all_has_no_condition() {
        assert!(translate(&Predicate::MatchAll, &FIELDS).is_none());
        assert_eq!(clause("  ", &FIELDS), "");
    }

    #[test]
    fn term_fans_out_over_text_and_tag_fields() {
        assert_eq!(
            clause("kotlin", &FIELDS),
            "((@first_name:*kotlin*)|(@current_title:*kotlin*)|(@skills:{kotlin})|(@tags:{kotlin}))"
        );
    }

    #[test]
    fn single_field_terms_are_not_wrapped() {
        assert_eq!(clause("kotlin", &TEXT_ONLY), "(@summary:*kotlin*)");
    }

    #[test]
    fn phrases_and_hyphenated_words_use_exact_match() {
        assert_eq!(clause(r#""site reliability""#, &TEXT_ONLY), "(@summary:\"site reliability\")");
        assert_eq!(clause("front-end", &TEXT_ONLY), "(@summary:\"front-end\")");
        assert_eq!(clause("node.js", &TEXT_ONLY), "(@summary:\"node.js\")");
        assert_eq!(clause("priya@example.com", &TEXT_ONLY), "(@summary:\"priya@example.com\")");
        assert_eq!(clause("c#", &TEXT_ONLY), "(@summary:\"c#\")");
        assert_eq!(
            clause(r#""Machine Learning""#, &SearchFields::new(&[], &["skills"])),
            "(@skills:{Machine Learning})"
        );
    }

    #[test]
    fn boolean_structure_is_preserved() {
        assert_eq!(
            clause("rust go OR NOT php", &TEXT_ONLY),
            "(((@summary:*rust*) (@summary:*go*))|-(@summary:*php*))"
        );
    }

    #[test]
    fn negated_match_all_is_dropped() {
        let predicate = Predicate::and([Predicate::term("rust"), Predicate::not(Predicate::MatchAll)]);
        let condition = translate(&predicate, &TEXT_ONLY).unwrap();
        assert_eq!(condition.to_query_clause(), "(@summary:*rust*)");
    }
}
