//! # RediSearch filters and search parameters
//!
//! [`FilterCondition`] is the storage-side filter tree: leaves address one
//! index field, `And` / `Or` / `Not` compose them, and
//! [`FilterCondition::to_query_clause`] renders RediSearch query syntax.
//! Boolean search-box queries reach it through [`translate`]; structured
//! `field:op:value` filters reach it through [`SearchQuery::into_params`] and
//! the entity's filter mapper.
//!
//! ```text
//! q=rust NOT php   filter=stage:eq:interview
//!        │                  │
//!   query::compile     SearchEntity::map_filter
//!        │                  │
//!   translate()             │
//!        └──── SearchParams ┘
//!                  │
//!            build_query(base) ──► FT.SEARCH
//! ```

mod escape;
mod execute;
pub mod translate;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::{errors::SearchError, keys::KeyContext, query};

pub use escape::*;
pub use execute::{ensure_index, execute_search};
pub use translate::{SearchFields, translate};

pub(crate) const DEFAULT_PAGE: u64 = 1;
pub(crate) const DEFAULT_PAGE_SIZE: u64 = 25;
pub(crate) const MAX_PAGE_SIZE: u64 = 100;
pub(crate) const TAG_SEPARATOR: &str = "|";

/// Search metadata for a stored document type.
pub trait SearchEntity: DeserializeOwned {
    /// Collection segment of the entity's keys.
    const COLLECTION: &'static str;

    /// RediSearch index definition for the entity's keys.
    fn index_definition(keys: &KeyContext<'_>) -> IndexDefinition;

    /// Sort fields callers may request.
    fn allowed_sorts() -> &'static [SortField];

    /// Sort applied when none is requested.
    fn default_sort() -> &'static SortField;

    /// Index fields a boolean search term fans out to.
    fn search_fields() -> SearchFields;

    /// Map an incoming `field:op:value` descriptor to a filter condition.
    fn map_filter(descriptor: FilterDescriptor) -> Result<FilterCondition, SearchError>;
}

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SortField {
    /// Name accepted from callers.
    pub name: &'static str,
    /// Index field the sort is applied to.
    pub path: &'static str,
    pub default_order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Range,
    Bool,
    Prefix,
    Contains,
    Exact,
    Fuzzy,
}

impl FilterOperator {
    fn parse(raw: &str) -> Result<Self, SearchError> {
        match raw.to_ascii_lowercase().as_str() {
            "eq" => Ok(Self::Eq),
            "range" => Ok(Self::Range),
            "bool" | "boolean" => Ok(Self::Bool),
            "prefix" => Ok(Self::Prefix),
            "contains" => Ok(Self::Contains),
            "exact" => Ok(Self::Exact),
            "fuzzy" => Ok(Self::Fuzzy),
            other => Err(SearchError::invalid(format!("Unsupported filter operator: {other}"))),
        }
    }

    #[inline]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Prefix | Self::Contains | Self::Exact | Self::Fuzzy)
    }
}

/// A parsed `field:op:value` filter before it is mapped onto an index field.
#[derive(Debug, Clone)]
pub struct FilterDescriptor {
    pub field: String,
    pub operator: FilterOperator,
    pub values: Vec<String>,
}

impl FilterDescriptor {
    /// Parse `field:op:value`. `eq`/`bool` values split on `|` or `,`,
    /// `range` on `,`, text operators keep the value whole.
    pub fn parse(raw: &str) -> Result<Self, SearchError> {
        let parts: Vec<&str> = raw.splitn(3, ':').collect();
        let [field, operator, value] = parts.as_slice() else {
            return Err(SearchError::invalid(format!("Invalid filter syntax: {raw}")));
        };

        let operator = FilterOperator::parse(operator)?;
        let values = match operator {
            FilterOperator::Eq | FilterOperator::Bool => value
                .split(['|', ','])
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
            FilterOperator::Range => value.split(',').map(|segment| segment.trim().to_string()).collect(),
            _ => vec![value.to_string()],
        };

        Ok(Self {
            field: field.trim().to_string(),
            operator,
            values,
        })
    }
}

/// A composable RediSearch filter condition.
///
/// ```
/// use ats_search::search::FilterCondition;
///
/// let active_rust = FilterCondition::and([
///     FilterCondition::tag_eq("skills", "Rust"),
///     FilterCondition::not(FilterCondition::tag_in("stage", ["hired", "rejected"])),
/// ]);
/// assert_eq!(active_rust.to_query_clause(), "((@skills:{Rust}) -(@stage:{hired|rejected}))");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    TagEquals { field: String, values: Vec<String> },
    NumericRange { field: String, min: Option<f64>, max: Option<f64> },
    BooleanEquals { field: String, value: bool },
    TextPrefix { field: String, value: String },
    TextContains { field: String, value: String },
    TextExact { field: String, value: String },
    TextFuzzy { field: String, value: String },
    And(Vec<FilterCondition>),
    Or(Vec<FilterCondition>),
    Not(Box<FilterCondition>),
}

impl FilterCondition {
    #[inline]
    pub fn tag_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TagEquals {
            field: field.into(),
            values: vec![value.into()],
        }
    }

    /// TAG filter matching any of the given values.
    #[inline]
    pub fn tag_in<S: Into<String>>(field: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self::TagEquals {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn bool_eq(field: impl Into<String>, value: bool) -> Self {
        Self::BooleanEquals {
            field: field.into(),
            value,
        }
    }

    /// Inclusive numeric range; `None` bounds are open.
    #[inline]
    pub fn numeric_range(field: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self::NumericRange {
            field: field.into(),
            min,
            max,
        }
    }

    #[inline]
    pub fn numeric_eq(field: impl Into<String>, value: f64) -> Self {
        Self::numeric_range(field, Some(value), Some(value))
    }

    #[inline]
    pub fn text_prefix(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TextPrefix {
            field: field.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn text_contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TextContains {
            field: field.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn text_exact(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TextExact {
            field: field.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn text_fuzzy(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TextFuzzy {
            field: field.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn and(conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        Self::And(conditions.into_iter().collect())
    }

    #[inline]
    pub fn or(conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        Self::Or(conditions.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    #[inline]
    pub fn not(condition: FilterCondition) -> Self {
        Self::Not(Box::new(condition))
    }

    /// Render this condition as a RediSearch query clause. Empty composites
    /// render as an empty string.
    pub fn to_query_clause(&self) -> String {
        match self {
            Self::TagEquals { field, values } => {
                let escaped: Vec<String> = values.iter().map(|v| escape_for_tag_query(v)).collect();
                format!("(@{}:{{{}}})", field, escaped.join(TAG_SEPARATOR))
            }
            Self::NumericRange { field, min, max } => {
                let min_s = min.map(format_numeric).unwrap_or_else(|| "-inf".to_string());
                let max_s = max.map(format_numeric).unwrap_or_else(|| "+inf".to_string());
                format!("(@{}:[{} {}])", field, min_s, max_s)
            }
            Self::BooleanEquals { field, value } => format!("(@{}:{{{}}})", field, value),
            Self::TextPrefix { field, value } => {
                // `@field:` scopes only the next term, so several tokens need a group
                let prefix = escape_for_text_prefix(value);
                if prefix.contains(' ') {
                    format!("(@{}:({}))", field, prefix)
                } else {
                    format!("(@{}:{})", field, prefix)
                }
            }
            Self::TextContains { field, value } => format!("(@{}:{})", field, escape_for_text_contains(value)),
            Self::TextExact { field, value } => format!("(@{}:{})", field, escape_for_text_exact(value)),
            Self::TextFuzzy { field, value } => format!("(@{}:{})", field, escape_for_text_fuzzy(value)),
            Self::And(conditions) => join_clauses(conditions, " "),
            Self::Or(conditions) => join_clauses(conditions, "|"),
            Self::Not(inner) => {
                let clause = inner.to_query_clause();
                if clause.is_empty() {
                    clause
                } else if clause.starts_with('(') {
                    format!("-{clause}")
                } else {
                    format!("-({clause})")
                }
            }
        }
    }
}

fn join_clauses(conditions: &[FilterCondition], separator: &str) -> String {
    let mut clauses: Vec<String> = conditions
        .iter()
        .map(FilterCondition::to_query_clause)
        .filter(|s| !s.is_empty())
        .collect();
    match clauses.len() {
        0 => String::new(),
        1 => clauses.pop().unwrap_or_default(),
        _ => format!("({})", clauses.join(separator)),
    }
}

fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct SearchSort {
    pub field: String,
    pub order: SortOrder,
}

/// Parameters for one `FT.SEARCH` call.
///
/// ```
/// use ats_search::search::{FilterCondition, SearchParams};
///
/// let params = SearchParams::new()
///     .with_condition(FilterCondition::tag_eq("stage", "offer"))
///     .with_page(2, 10);
/// assert_eq!(params.offset(), 10);
/// assert_eq!(params.build_query("@tenant_id:{acme}"), "(@tenant_id:{acme}) (@stage:{offer})");
/// ```
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub page: u64,
    pub page_size: u64,
    pub sort: Option<SearchSort>,
    /// Conditions ANDed together at the top level.
    pub conditions: Vec<FilterCondition>,
    /// Raw RediSearch clause appended last.
    pub raw: Option<String>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchParams {
    pub fn new() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            conditions: Vec::new(),
            raw: None,
        }
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.page_size
    }

    #[inline]
    pub fn with_sort(mut self, sort: Option<SearchSort>) -> Self {
        self.sort = sort;
        self
    }

    #[inline]
    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[inline]
    pub fn with_conditions(mut self, conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    #[inline]
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    #[inline]
    pub fn with_page(mut self, page: u64, page_size: u64) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// Join the base filter, every condition and the raw clause. An empty
    /// query is `*`.
    pub fn build_query(&self, base: &str) -> String {
        let mut clauses = Vec::with_capacity(self.conditions.len() + 2);

        if !base.is_empty() {
            clauses.push(format!("({})", base));
        }

        clauses.extend(
            self.conditions
                .iter()
                .map(FilterCondition::to_query_clause)
                .filter(|clause| !clause.is_empty()),
        );

        if let Some(raw) = &self.raw
            && !raw.is_empty()
        {
            clauses.push(format!("({})", raw));
        }

        if clauses.is_empty() {
            "*".to_string()
        } else {
            clauses.join(" ")
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone)]
pub struct SearchResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> SearchResult<T> {
    #[inline]
    pub fn has_more(&self) -> bool {
        self.page * self.page_size < self.total
    }
}

impl<T: Serialize> From<SearchResult<T>> for PaginatedResponse<T> {
    fn from(value: SearchResult<T>) -> Self {
        Self {
            has_more: value.has_more(),
            page: value.page,
            page_size: value.page_size,
            total: value.total,
            items: value.items,
        }
    }
}

/// Search request as it arrives from a query string.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SearchQuery {
    pub page: Option<u64>,
    #[serde(rename = "page_size")]
    pub page_size: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    /// Boolean search-box query (`rust AND NOT php`).
    pub q: Option<String>,
    #[serde(default)]
    pub filter: Vec<String>,
}

impl SearchQuery {
    /// Resolve paging, sorting and structured filters. `q` is ignored here;
    /// see [`SearchQuery::with_boolean_query`].
    pub fn into_params<F>(
        self,
        allowed_sorts: &[SortField],
        default_sort: &SortField,
        mut filter_mapper: F,
    ) -> Result<SearchParams, SearchError>
    where
        F: FnMut(FilterDescriptor) -> Result<FilterCondition, SearchError>,
    {
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = self.page.unwrap_or(DEFAULT_PAGE).max(1);

        let sort_field = match self.sort_by.as_deref() {
            Some(sort_name) => allowed_sorts
                .iter()
                .find(|field| field.name.eq_ignore_ascii_case(sort_name))
                .copied()
                .ok_or_else(|| SearchError::invalid(format!("Unsupported sort field: {sort_name}")))?,
            None => *default_sort,
        };

        let sort = SearchSort {
            field: sort_field.path.to_string(),
            order: self.sort_order.unwrap_or(sort_field.default_order),
        };

        let conditions = self
            .filter
            .iter()
            .map(|raw| FilterDescriptor::parse(raw).and_then(&mut filter_mapper))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SearchParams::new()
            .with_page(page, page_size)
            .with_sort(Some(sort))
            .with_conditions(conditions))
    }

    /// [`SearchQuery::into_params`] plus the compiled boolean query `q`,
    /// fanned out over `fields`. A `q` that compiles to match-all adds no
    /// condition.
    pub fn with_boolean_query<F>(
        self,
        allowed_sorts: &[SortField],
        default_sort: &SortField,
        filter_mapper: F,
        fields: &SearchFields,
    ) -> Result<SearchParams, SearchError>
    where
        F: FnMut(FilterDescriptor) -> Result<FilterCondition, SearchError>,
    {
        let predicate = query::compile(self.q.as_deref());
        let params = self.into_params(allowed_sorts, default_sort, filter_mapper)?;
        Ok(match translate(&predicate, fields) {
            Some(condition) => params.with_condition(condition),
            None => params,
        })
    }
}

/// RediSearch field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFieldType {
    Tag,
    Text,
    Numeric,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexField {
    /// JSON path, e.g. `$.skills[*]`.
    pub path: &'static str,
    pub field_name: &'static str,
    pub field_type: IndexFieldType,
    pub sortable: bool,
    /// TAG only: compare values case-sensitively.
    pub case_sensitive: bool,
}

#[derive(Debug, Clone)]
pub struct IndexDefinition {
    pub name: String,
    pub prefixes: Vec<String>,
    pub filter: Option<String>,
    pub schema: &'static [IndexField],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::normalizers::{build_numeric_filter, build_tag_filter};

    fn mock_filter_mapper(descriptor: FilterDescriptor) -> Result<FilterCondition, SearchError> {
        match descriptor.field.as_str() {
            "stage" => build_tag_filter(descriptor, "stage"),
            "years" => build_numeric_filter(descriptor, "years_experience"),
            "remote" => crate::filters::normalizers::build_boolean_filter(descriptor, "remote"),
            other => Err(SearchError::invalid(format!("Unknown filter field: {other}"))),
        }
    }

    fn default_sorts() -> [SortField; 2] {
        [
            SortField {
                name: "created_at",
                path: "created_at",
                default_order: SortOrder::Desc,
            },
            SortField {
                name: "last_name",
                path: "last_name",
                default_order: SortOrder::Asc,
            },
        ]
    }

    fn fields() -> SearchFields {
        SearchFields::new(&["first_name", "current_title"], &["skills"])
    }

    #[test]
    fn into_params_applies_defaults_and_parses_filters() {
        let query = SearchQuery {
            filter: vec!["stage:eq:interview|offer".to_string(), "years:range:3,*".to_string()],
            ..Default::default()
        };

        let sorts = default_sorts();
        let params = query
            .into_params(&sorts, &sorts[0], mock_filter_mapper)
            .expect("query should parse");

        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 25);
        let sort = params.sort.expect("sort should be present");
        assert_eq!(sort.field, "created_at");
        assert_eq!(sort.order, SortOrder::Desc);

        assert_eq!(params.conditions.len(), 2);
        assert_eq!(params.conditions[0].to_query_clause(), "(@stage:{interview|offer})");
        assert_eq!(params.conditions[1].to_query_clause(), "(@years_experience:[3 +inf])");
    }

    #[test]
    fn into_params_clamps_page_size_and_page() {
        let query = SearchQuery {
            page: Some(0),
            page_size: Some(500),
            sort_by: Some("LAST_NAME".to_string()),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };

        let sorts = default_sorts();
        let params = query.into_params(&sorts, &sorts[0], mock_filter_mapper).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 100);
        let sort = params.sort.unwrap();
        assert_eq!(sort.field, "last_name");
        assert_eq!(sort.order, SortOrder::Desc);
    }

    #[test]
    fn into_params_rejects_unknown_sort_field() {
        let query = SearchQuery {
            sort_by: Some("salary".to_string()),
            ..Default::default()
        };

        let sorts = default_sorts();
        let err = query
            .into_params(&sorts, &sorts[0], mock_filter_mapper)
            .expect_err("unknown sort should fail");
        assert!(matches!(err, SearchError::InvalidRequest { message } if message.contains("Unsupported sort field")));
    }

    #[test]
    fn into_params_rejects_malformed_filters() {
        let sorts = default_sorts();
        for (raw, expected) in [
            ("stage", "Invalid filter syntax"),
            ("stage:gt:3", "Unsupported filter operator"),
            ("salary:eq:1", "Unknown filter field"),
            ("remote:bool:maybe", "Invalid boolean value"),
        ] {
            let query = SearchQuery {
                filter: vec![raw.to_string()],
                ..Default::default()
            };
            let err = query
                .into_params(&sorts, &sorts[0], mock_filter_mapper)
                .expect_err("filter should be rejected");
            assert!(
                matches!(&err, SearchError::InvalidRequest { message } if message.contains(expected)),
                "{raw}: {err}"
            );
        }
    }

    #[test]
    fn with_boolean_query_appends_translated_condition() {
        let query = SearchQuery {
            q: Some("rust NOT php".to_string()),
            filter: vec!["stage:eq:applied".to_string()],
            ..Default::default()
        };

        let sorts = default_sorts();
        let params = query
            .with_boolean_query(&sorts, &sorts[0], mock_filter_mapper, &fields())
            .unwrap();

        assert_eq!(params.conditions.len(), 2);
        assert_eq!(params.conditions[0].to_query_clause(), "(@stage:{applied})");
        assert_eq!(
            params.conditions[1].to_query_clause(),
            "(((@first_name:*rust*)|(@current_title:*rust*)|(@skills:{rust})) \
             -((@first_name:*php*)|(@current_title:*php*)|(@skills:{php})))"
        );
    }

    #[test]
    fn with_boolean_query_ignores_blank_and_operator_only_input() {
        let sorts = default_sorts();
        for q in [None, Some("   "), Some("AND OR")] {
            let query = SearchQuery {
                q: q.map(str::to_string),
                ..Default::default()
            };
            let params = query
                .with_boolean_query(&sorts, &sorts[0], mock_filter_mapper, &fields())
                .unwrap();
            assert!(params.conditions.is_empty());
            assert_eq!(params.build_query(""), "*");
        }
    }

    #[test]
    fn not_wraps_bare_and_parenthesised_clauses() {
        assert_eq!(
            FilterCondition::not(FilterCondition::tag_eq("stage", "hired")).to_query_clause(),
            "-(@stage:{hired})"
        );
        assert_eq!(FilterCondition::not(FilterCondition::and([])).to_query_clause(), "");
    }

    #[test]
    fn composites_collapse_single_and_empty_children() {
        let single = FilterCondition::or([FilterCondition::and([]), FilterCondition::bool_eq("remote", true)]);
        assert_eq!(single.to_query_clause(), "(@remote:{true})");
        assert_eq!(FilterCondition::or([]).to_query_clause(), "");
    }

    #[test]
    fn numeric_ranges_render_open_bounds() {
        assert_eq!(
            FilterCondition::numeric_range("created_at", Some(100.0), None).to_query_clause(),
            "(@created_at:[100 +inf])"
        );
        assert_eq!(
            FilterCondition::numeric_range("score", None, Some(2.5)).to_query_clause(),
            "(@score:[-inf 2.5])"
        );
    }

    #[test]
    fn text_leaves_render_with_field_escaping() {
        assert_eq!(
            FilterCondition::text_prefix("location", "San").to_query_clause(),
            "(@location:San*)"
        );
        assert_eq!(
            FilterCondition::text_exact("current_title", "Staff Engineer").to_query_clause(),
            "(@current_title:\"Staff Engineer\")"
        );
        assert_eq!(
            FilterCondition::text_fuzzy("last_name", "smtih").to_query_clause(),
            "(@last_name:%smtih%)"
        );
    }

    #[test]
    fn multi_token_prefix_is_grouped_under_its_field() {
        assert_eq!(
            FilterCondition::text_prefix("location", "san-fran").to_query_clause(),
            "(@location:(san fran*))"
        );
        assert_eq!(
            FilterCondition::text_prefix("current_company", "acme.io labs").to_query_clause(),
            "(@current_company:(acme io labs*))"
        );
    }

    #[test]
    fn search_result_reports_more_pages() {
        let result = SearchResult {
            items: vec![1, 2],
            total: 5,
            page: 1,
            page_size: 2,
        };
        assert!(result.has_more());
        let response: PaginatedResponse<i32> = SearchResult { page: 3, ..result }.into();
        assert!(!response.has_more);
    }
}
