//! Builders that map a parsed [`FilterDescriptor`] onto a [`FilterCondition`]
//! for a concrete index field, rejecting operators the field type cannot
//! serve.

use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::SearchError;
use crate::search::{FilterCondition, FilterDescriptor, FilterOperator};

fn first_value(descriptor: FilterDescriptor, target_field: &str) -> Result<String, SearchError> {
    descriptor
        .values
        .into_iter()
        .next()
        .ok_or_else(|| SearchError::invalid(format!("Filter on {target_field} requires a value")))
}

/// TAG equality; several values match any of them.
pub fn build_tag_filter(descriptor: FilterDescriptor, target_field: &str) -> Result<FilterCondition, SearchError> {
    if descriptor.operator != FilterOperator::Eq {
        return Err(SearchError::invalid(format!(
            "Operator {:?} is not supported for TAG field {target_field}",
            descriptor.operator
        )));
    }
    if descriptor.values.is_empty() {
        return Err(SearchError::invalid(format!("Filter on {target_field} requires a value")));
    }
    Ok(FilterCondition::tag_in(target_field, descriptor.values))
}

/// Numeric equality or inclusive range (`*` or empty bound is open).
pub fn build_numeric_filter(descriptor: FilterDescriptor, target_field: &str) -> Result<FilterCondition, SearchError> {
    build_range_filter(descriptor, target_field, parse_numeric_bound)
}

/// Timestamp filter over a field stored as epoch milliseconds. Bounds may be
/// epoch milliseconds, RFC 3339 timestamps or `YYYY-MM-DD` dates (midnight UTC).
pub fn build_timestamp_filter(descriptor: FilterDescriptor, target_field: &str) -> Result<FilterCondition, SearchError> {
    build_range_filter(descriptor, target_field, parse_timestamp_bound)
}

fn build_range_filter(
    descriptor: FilterDescriptor,
    target_field: &str,
    parse_bound: fn(Option<&String>) -> Result<Option<f64>, SearchError>,
) -> Result<FilterCondition, SearchError> {
    match descriptor.operator {
        FilterOperator::Eq => {
            let value = parse_bound(descriptor.values.first())?
                .ok_or_else(|| SearchError::invalid(format!("Numeric filter on {target_field} requires a value")))?;
            Ok(FilterCondition::numeric_eq(target_field, value))
        }
        FilterOperator::Range => {
            let min = parse_bound(descriptor.values.first())?;
            let max = parse_bound(descriptor.values.get(1))?;
            Ok(FilterCondition::numeric_range(target_field, min, max))
        }
        FilterOperator::Bool => Err(SearchError::invalid(format!(
            "Boolean operator is not supported for numeric field {target_field}"
        ))),
        _ => Err(SearchError::invalid(format!(
            "Text operators (prefix, contains, exact, fuzzy) are not supported for numeric field {target_field}"
        ))),
    }
}

pub fn parse_numeric_bound(value: Option<&String>) -> Result<Option<f64>, SearchError> {
    match value.map(|raw| raw.trim()) {
        None | Some("") | Some("*") => Ok(None),
        Some(trimmed) => trimmed
            .parse::<f64>()
            .map(Some)
            .map_err(|_| SearchError::invalid(format!("Invalid numeric bound: {trimmed}"))),
    }
}

pub fn parse_timestamp_bound(value: Option<&String>) -> Result<Option<f64>, SearchError> {
    let Some(trimmed) = value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty() && *raw != "*") else {
        return Ok(None);
    };

    if let Ok(millis) = trimmed.parse::<i64>() {
        return Ok(Some(millis as f64));
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(timestamp.with_timezone(&Utc).timestamp_millis() as f64));
    }
    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(midnight.and_utc().timestamp_millis() as f64));
    }

    Err(SearchError::invalid(format!("Invalid timestamp bound: {trimmed}")))
}

pub fn build_boolean_filter(descriptor: FilterDescriptor, target_field: &str) -> Result<FilterCondition, SearchError> {
    if !matches!(descriptor.operator, FilterOperator::Bool | FilterOperator::Eq) {
        return Err(SearchError::invalid(format!(
            "Operator {:?} is not supported for boolean field {target_field}",
            descriptor.operator
        )));
    }
    let value = first_value(descriptor, target_field)?;
    let flag = match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => {
            return Err(SearchError::invalid(format!(
                "Invalid boolean value for {target_field}: {value}"
            )));
        }
    };
    Ok(FilterCondition::bool_eq(target_field, flag))
}

/// TEXT filter chosen by operator; `eq` is treated as prefix.
pub fn build_text_filter(descriptor: FilterDescriptor, target_field: &str) -> Result<FilterCondition, SearchError> {
    let operator = descriptor.operator;
    if !operator.is_text() && operator != FilterOperator::Eq {
        return Err(SearchError::invalid(format!(
            "Operator {operator:?} is not supported for TEXT field {target_field}"
        )));
    }

    let value = first_value(descriptor, target_field)?;
    Ok(match operator {
        FilterOperator::Contains => FilterCondition::text_contains(target_field, value),
        FilterOperator::Exact => FilterCondition::text_exact(target_field, value),
        FilterOperator::Fuzzy => FilterCondition::text_fuzzy(target_field, value),
        _ => FilterCondition::text_prefix(target_field, value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(raw: &str) -> FilterDescriptor {
        FilterDescriptor::parse(raw).expect("descriptor should parse")
    }

    #[test]
    fn tag_filter_accepts_multiple_values() {
        let condition = build_tag_filter(descriptor("stage:eq:offer,hired"), "stage").unwrap();
        assert_eq!(condition, FilterCondition::tag_in("stage", ["offer", "hired"]));
        assert!(build_tag_filter(descriptor("stage:prefix:off"), "stage").is_err());
    }

    #[test]
    fn numeric_bounds_support_open_ends() {
        assert_eq!(parse_numeric_bound(Some(&"*".to_string())).unwrap(), None);
        assert_eq!(parse_numeric_bound(Some(&" 4.5 ".to_string())).unwrap(), Some(4.5));
        assert!(parse_numeric_bound(Some(&"four".to_string())).is_err());
    }

    #[test]
    fn numeric_filter_rejects_text_operators() {
        let err = build_numeric_filter(descriptor("years:contains:3"), "years").unwrap_err();
        assert!(err.to_string().contains("Text operators"));
    }

    #[test]
    fn timestamp_bounds_accept_dates_and_millis() {
        let condition = build_timestamp_filter(descriptor("created_at:range:2024-01-01,*"), "created_at").unwrap();
        assert_eq!(
            condition,
            FilterCondition::numeric_range("created_at", Some(1_704_067_200_000.0), None)
        );

        let condition =
            build_timestamp_filter(descriptor("created_at:eq:2024-01-01T00:00:00+01:00"), "created_at").unwrap();
        assert_eq!(condition, FilterCondition::numeric_eq("created_at", 1_704_063_600_000.0));

        let condition = build_timestamp_filter(descriptor("created_at:eq:1700000000000"), "created_at").unwrap();
        assert_eq!(condition, FilterCondition::numeric_eq("created_at", 1_700_000_000_000.0));

        assert!(build_timestamp_filter(descriptor("created_at:eq:yesterday"), "created_at").is_err());
    }

    #[test]
    fn boolean_filter_parses_common_spellings() {
        assert_eq!(
            build_boolean_filter(descriptor("remote:bool:Yes"), "remote").unwrap(),
            FilterCondition::bool_eq("remote", true)
        );
        assert!(build_boolean_filter(descriptor("remote:bool:perhaps"), "remote").is_err());
    }

    #[test]
    fn text_filter_dispatches_on_operator() {
        assert_eq!(
            build_text_filter(descriptor("location:fuzzy:Berln"), "location").unwrap(),
            FilterCondition::text_fuzzy("location", "Berln")
        );
        assert_eq!(
            build_text_filter(descriptor("location:eq:San"), "location").unwrap(),
            FilterCondition::text_prefix("location", "San")
        );
        assert_eq!(
            build_text_filter(descriptor("location:contains:a:b"), "location").unwrap(),
            FilterCondition::text_contains("location", "a:b")
        );
        assert!(build_text_filter(descriptor("location:range:1,2"), "location").is_err());
    }
}
