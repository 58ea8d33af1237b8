//! Candidate search for a multi-tenant applicant tracking system.
//!
//! The entry point is [`query::compile`], which turns the boolean text typed
//! into a recruiter's search box into a [`Predicate`]. A predicate can be
//! evaluated in memory against any [`TermSource`] or translated into a
//! RediSearch filter and executed through [`CandidateRepository`].

pub mod candidate;
pub mod config;
pub mod errors;
pub mod filters;
pub mod id;
pub mod keys;
pub mod query;
pub mod repository;
pub mod search;
pub mod validators;

pub use candidate::{Candidate, Stage};
pub use config::Config;
pub use errors::*;
pub use query::{Predicate, TermSource, compile};
pub use repository::CandidateRepository;
pub use search::{PaginatedResponse, SearchQuery, SearchResult, SortOrder};

// Re-export redis types so callers don't need to depend on a specific redis version
pub use redis;
pub use redis::aio::ConnectionManager;

/// Delete all keys matching a pattern (for test cleanup).
///
/// Uses SCAN + DEL so Redis is never blocked by a large KEYS call.
pub async fn cleanup_pattern(conn: &mut ConnectionManager, pattern: &str) -> Result<u64, SearchError> {
    const SCAN_COUNT: usize = 1000;
    let mut cursor: u64 = 0;
    let mut total_deleted: u64 = 0;

    loop {
        let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(SCAN_COUNT)
            .query_async(conn)
            .await?;

        if !keys.is_empty() {
            let deleted: u64 = redis::cmd("DEL").arg(&keys).query_async(conn).await?;
            total_deleted += deleted;
        }

        cursor = next_cursor;
        if cursor == 0 {
            break;
        }
    }

    Ok(total_deleted)
}
