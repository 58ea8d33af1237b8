use std::borrow::Cow;

use log::{debug, info};
use redis::{Value, aio::ConnectionManager, cmd, from_redis_value};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use super::{IndexDefinition, IndexFieldType, SearchParams, SearchResult, TAG_SEPARATOR};
use crate::errors::SearchError;

/// Create the index unless it already exists.
pub async fn ensure_index(conn: &mut ConnectionManager, definition: &IndexDefinition) -> Result<(), SearchError> {
    let indexes: Vec<String> = cmd("FT._LIST").query_async(conn).await?;
    if indexes.iter().any(|name| name == &definition.name) {
        debug!("search index {} already present", definition.name);
        return Ok(());
    }

    let mut command = cmd("FT.CREATE");
    command.arg(definition.name.as_str());
    command.arg("ON").arg("JSON");
    command.arg("PREFIX").arg(definition.prefixes.len());
    for prefix in &definition.prefixes {
        command.arg(prefix.as_str());
    }

    if let Some(filter) = &definition.filter {
        command.arg("FILTER").arg(filter.as_str());
    }

    command.arg("SCHEMA");
    for field in definition.schema {
        command.arg(field.path);
        command.arg("AS").arg(field.field_name);
        match field.field_type {
            IndexFieldType::Tag => {
                command.arg("TAG");
                command.arg("SEPARATOR").arg(TAG_SEPARATOR);
                if field.case_sensitive {
                    command.arg("CASESENSITIVE");
                }
            }
            IndexFieldType::Text => {
                command.arg("TEXT");
            }
            IndexFieldType::Numeric => {
                command.arg("NUMERIC");
            }
        }

        if field.sortable {
            command.arg("SORTABLE");
        }
    }

    if let Err(err) = command.query_async::<()>(conn).await {
        // Lost a creation race with another process.
        if index_exists_error(&err) {
            return Ok(());
        }
        return Err(err.into());
    }

    info!("created search index {}", definition.name);
    Ok(())
}

fn index_exists_error(err: &redis::RedisError) -> bool {
    let msg = err.to_string().to_ascii_lowercase();
    msg.contains("already exists") && msg.contains("index")
}

/// Run `FT.SEARCH` and decode the JSON documents.
pub async fn execute_search<T>(
    conn: &mut ConnectionManager,
    index_name: &str,
    params: &SearchParams,
    base_query: &str,
) -> Result<SearchResult<T>, SearchError>
where
    T: DeserializeOwned,
{
    let query = params.build_query(base_query);
    debug!("FT.SEARCH {index_name} {query}");

    let mut command = cmd("FT.SEARCH");
    command.arg(index_name);
    command.arg(&query);

    if let Some(sort) = &params.sort {
        command.arg("SORTBY").arg(&sort.field).arg(sort.order.as_str());
    }

    command.arg("LIMIT").arg(params.offset()).arg(params.page_size);
    command.arg("RETURN").arg(1).arg("$");
    command.arg("DIALECT").arg(3);

    let raw: Value = command.query_async(conn).await?;
    let values: Vec<Value> = from_redis_value(&raw).map_err(|err| SearchError::Other {
        message: Cow::Owned(format!("Failed to parse search response: {err}")),
    })?;

    let Some((head, docs)) = values.split_first() else {
        return Ok(SearchResult {
            items: Vec::new(),
            total: 0,
            page: params.page,
            page_size: params.page_size,
        });
    };

    let total = parse_total(head)?;

    // Remaining entries alternate key, fields.
    let items = docs
        .chunks_exact(2)
        .map(|pair| {
            let payload = extract_json_payload(&pair[1])?;
            serde_json::from_str::<T>(&payload).map_err(SearchError::from)
        })
        .collect::<Result<Vec<T>, SearchError>>()?;

    Ok(SearchResult {
        items,
        total,
        page: params.page,
        page_size: params.page_size,
    })
}

fn parse_total(value: &Value) -> Result<u64, SearchError> {
    match value {
        Value::Int(v) => Ok(u64::try_from(*v).unwrap_or_default()),
        Value::BulkString(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or(SearchError::Other {
                message: Cow::Borrowed("Invalid total count in search response"),
            }),
        other => Err(SearchError::Other {
            message: Cow::Owned(format!("Unexpected total count type: {other:?}")),
        }),
    }
}

fn extract_json_payload(value: &Value) -> Result<String, SearchError> {
    match value {
        Value::Array(items) => {
            for chunk in items.chunks_exact(2) {
                let alias: String = from_redis_value(&chunk[0]).map_err(|err| SearchError::Other {
                    message: Cow::Owned(format!("Invalid field alias in search document: {err}")),
                })?;

                if alias == "$" {
                    return normalize_json_payload(value_to_string(&chunk[1])?);
                }
            }

            Err(SearchError::Other {
                message: Cow::Borrowed("Search response missing JSON payload"),
            })
        }
        other => normalize_json_payload(value_to_string(other)?),
    }
}

/// DIALECT 3 wraps `$` in a one-element array.
fn normalize_json_payload(payload: String) -> Result<String, SearchError> {
    let trimmed = payload.trim();
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        let value: JsonValue = serde_json::from_str(trimmed)?;
        if let Some(first) = value.as_array().and_then(|arr| arr.first()) {
            return Ok(serde_json::to_string(first)?);
        }
    }
    Ok(payload)
}

fn value_to_string(value: &Value) -> Result<String, SearchError> {
    match value {
        Value::BulkString(bytes) => String::from_utf8(bytes.clone()).map_err(|err| SearchError::Other {
            message: Cow::Owned(format!("Invalid UTF-8 in search response: {err}")),
        }),
        Value::SimpleString(status) => Ok(status.clone()),
        Value::VerbatimString { text, .. } => Ok(text.clone()),
        _ => from_redis_value::<String>(value).map_err(|err| SearchError::Other {
            message: Cow::Owned(format!("Unexpected search value type: {err}")),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_dialect_three_arrays() {
        let payload = normalize_json_payload(r#"[{"id":"c1"}]"#.to_string()).unwrap();
        assert_eq!(payload, r#"{"id":"c1"}"#);
        let plain = normalize_json_payload(r#"{"id":"c2"}"#.to_string()).unwrap();
        assert_eq!(plain, r#"{"id":"c2"}"#);
    }

    #[test]
    fn extracts_payload_from_field_pairs() {
        let fields = Value::Array(vec![
            Value::BulkString(b"$".to_vec()),
            Value::BulkString(br#"[{"id":"c3"}]"#.to_vec()),
        ]);
        assert_eq!(extract_json_payload(&fields).unwrap(), r#"{"id":"c3"}"#);

        let missing = Value::Array(vec![Value::BulkString(b"other".to_vec()), Value::Int(1)]);
        assert!(extract_json_payload(&missing).is_err());
    }

    #[test]
    fn parses_total_from_int_or_string() {
        assert_eq!(parse_total(&Value::Int(7)).unwrap(), 7);
        assert_eq!(parse_total(&Value::BulkString(b"12".to_vec())).unwrap(), 12);
        assert!(parse_total(&Value::Nil).is_err());
    }
}
