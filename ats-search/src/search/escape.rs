//! Escaping for RediSearch query syntax.
//!
//! | Function                  | Input            | Output              | Field / use              |
//! |---------------------------|------------------|---------------------|--------------------------|
//! | `escape_for_tag_query`    | `"node.js"`      | `"node\.js"`        | TAG: `@skills:{...}`     |
//! | `escape_for_text_prefix`  | `"front-end"`    | `"front end*"`      | TEXT prefix              |
//! | `escape_for_text_contains`| `"kotlin"`       | `"*kotlin*"`        | TEXT infix               |
//! | `escape_for_text_exact`   | `"Jane Doe"`     | `"\"Jane Doe\""`    | TEXT phrase              |
//! | `escape_for_text_fuzzy`   | `"pyhton"`       | `"%pyhton%"`        | TEXT Levenshtein 1       |
//!
//! TAG fields compare whole values, so only the characters RediSearch treats
//! as syntax inside `{...}` are escaped. TEXT fields are tokenized at index
//! time on whitespace and punctuation such as `-`, `.` and `@`, so prefix
//! queries split on those separators the same way instead of escaping them.

/// Characters with query meaning inside a TEXT term.
const TEXT_SPECIAL: &[char] = &[
    '\\', '(', ')', '|', '\'', '"', '[', ']', '{', '}', ':', '@', '?', '~', '&', '!', '.',
];

/// Punctuation RediSearch's default tokenizer splits TEXT on, besides whitespace.
const TEXT_SEPARATORS: &[char] = &[
    ',', '.', '<', '>', '{', '}', '[', ']', '"', '\'', ':', ';', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')',
    '-', '+', '=', '~', '/', '\\', '|', '?', '`',
];

fn is_text_separator(ch: char) -> bool {
    ch.is_whitespace() || TEXT_SEPARATORS.contains(&ch)
}

/// Whether RediSearch splits `value` when indexing a TEXT field.
///
/// Such values cannot be matched by a single infix wildcard.
///
/// ```
/// use ats_search::search::has_token_separator;
///
/// assert!(!has_token_separator("kotlin"));
/// assert!(!has_token_separator("snake_case"));
/// assert!(has_token_separator("node.js"));
/// assert!(has_token_separator("priya@example.com"));
/// assert!(has_token_separator("Jane Doe"));
/// ```
pub fn has_token_separator(value: &str) -> bool {
    value.contains(is_text_separator)
}

/// Escape a value for a TAG field query.
///
/// ```
/// use ats_search::search::escape_for_tag_query;
///
/// assert_eq!(escape_for_tag_query("Rust"), "Rust");
/// assert_eq!(escape_for_tag_query("node.js"), "node\\.js");
/// assert_eq!(escape_for_tag_query("c-suite"), "c\\-suite");
/// assert_eq!(escape_for_tag_query("Machine Learning"), "Machine Learning");
/// ```
pub fn escape_for_tag_query(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        // '-' is the query NOT operator; '.' is the JSON path separator
        if matches!(ch, '$' | '{' | '}' | '\\' | '|' | '.' | '-') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Prefix query for a TEXT field: tokenized like the index, wildcard on the last token.
///
/// ```
/// use ats_search::search::escape_for_text_prefix;
///
/// assert_eq!(escape_for_text_prefix("San"), "San*");
/// assert_eq!(escape_for_text_prefix("front-end/web"), "front end web*");
/// assert_eq!(escape_for_text_prefix("---"), "*");
/// ```
pub fn escape_for_text_prefix(value: &str) -> String {
    let tokens: Vec<&str> = value.split(is_text_separator).filter(|s| !s.is_empty()).collect();
    match tokens.split_last() {
        Some((last, head)) if head.is_empty() => format!("{last}*"),
        Some((last, head)) => format!("{} {last}*", head.join(" ")),
        None => "*".to_string(),
    }
}

/// Infix query for a TEXT field.
///
/// ```
/// use ats_search::search::escape_for_text_contains;
///
/// assert_eq!(escape_for_text_contains("kotlin"), "*kotlin*");
/// assert_eq!(escape_for_text_contains("c++"), "*c++*");
/// assert_eq!(escape_for_text_contains("jane@acme"), "*jane\\@acme*");
/// ```
pub fn escape_for_text_contains(value: &str) -> String {
    format!("*{}*", escape_text_value(value))
}

/// Exact phrase query for a TEXT field.
///
/// ```
/// use ats_search::search::escape_for_text_exact;
///
/// assert_eq!(escape_for_text_exact("Jane Doe"), "\"Jane Doe\"");
/// assert_eq!(escape_for_text_exact("the \"best\""), "\"the \\\"best\\\"\"");
/// ```
pub fn escape_for_text_exact(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for ch in value.chars() {
        if matches!(ch, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('"');
    escaped
}

/// Fuzzy (Levenshtein distance 1) query for a TEXT field.
///
/// ```
/// use ats_search::search::escape_for_text_fuzzy;
///
/// assert_eq!(escape_for_text_fuzzy("pyhton"), "%pyhton%");
/// assert_eq!(escape_for_text_fuzzy("100%"), "%100\\%%");
/// ```
pub fn escape_for_text_fuzzy(value: &str) -> String {
    format!("%{}%", escape_text_value(value))
}

/// Escapes a whole value, including the wildcard and fuzzy markers.
fn escape_text_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if TEXT_SPECIAL.contains(&ch) || matches!(ch, '*' | '%') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
