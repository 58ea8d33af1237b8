//! Tenant-scoped candidate storage on RedisJSON + RediSearch.

use std::sync::LazyLock;

use log::debug;
use redis::{Script, aio::ConnectionManager, cmd};
use serde_json::Value;

use crate::{
    candidate::Candidate,
    errors::SearchError,
    id::generate_candidate_id,
    keys::KeyContext,
    search::{self, SearchEntity, SearchParams, SearchQuery, SearchResult, escape_for_tag_query},
};

const INSERT_SCRIPT_BODY: &str = include_str!("../lua/candidate_insert.lua");

static INSERT_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(INSERT_SCRIPT_BODY));

/// Repository for one service's candidate collection.
///
/// Every read is scoped to a tenant: records of other tenants are invisible
/// to `get`, `delete` and `search`.
#[derive(Debug, Clone)]
pub struct CandidateRepository {
    prefix: String,
    service: String,
}

impl CandidateRepository {
    pub fn new(prefix: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            service: service.into(),
        }
    }

    pub fn key_context(&self) -> KeyContext<'_> {
        KeyContext::new(&self.prefix, &self.service)
    }

    pub fn candidate_key(&self, candidate_id: &str) -> String {
        self.key_context().entity(Candidate::COLLECTION, candidate_id)
    }

    /// Glob matching every stored candidate, for cleanup and scans.
    pub fn collection_pattern(&self) -> String {
        self.key_context().collection_pattern(Candidate::COLLECTION)
    }

    fn tenant_filter(tenant_id: &str) -> String {
        format!("@tenant_id:{{{}}}", escape_for_tag_query(tenant_id))
    }

    /// Create the candidate index if it does not exist yet.
    pub async fn ensure_search_index(&self, conn: &mut ConnectionManager) -> Result<(), SearchError> {
        let definition = Candidate::index_definition(&self.key_context());
        search::ensure_index(conn, &definition).await
    }

    /// Validate and store a candidate, assigning an id when it has none.
    /// Returns the stored candidate.
    ///
    /// Keys are not tenant-scoped, so an id already held by another tenant's
    /// candidate is refused with [`SearchError::TenantConflict`]. Check and
    /// write run as one script.
    pub async fn insert(&self, conn: &mut ConnectionManager, mut candidate: Candidate) -> Result<Candidate, SearchError> {
        candidate.validate()?;
        if candidate.id.trim().is_empty() {
            candidate.id = generate_candidate_id();
        }

        let key = self.candidate_key(&candidate.id);
        let payload = serde_json::to_string(&candidate)?;
        let mut invocation = INSERT_SCRIPT.prepare_invoke();
        invocation.key(&key).arg(&candidate.tenant_id).arg(payload);
        let raw: String = invocation.invoke_async(conn).await?;

        let reply: Value = serde_json::from_str(&raw)?;
        if let Some(code) = reply.get("error").and_then(Value::as_str) {
            return Err(match code {
                "tenant_conflict" => SearchError::TenantConflict {
                    candidate_id: candidate.id,
                },
                other => SearchError::Other {
                    message: format!("candidate insert failed: {other}").into(),
                },
            });
        }
        debug!("stored candidate {} for tenant {}", candidate.id, candidate.tenant_id);
        Ok(candidate)
    }

    pub async fn get(
        &self,
        conn: &mut ConnectionManager,
        tenant_id: &str,
        candidate_id: &str,
    ) -> Result<Option<Candidate>, SearchError> {
        let key = self.candidate_key(candidate_id);
        let result: Option<String> = cmd("JSON.GET").arg(&key).query_async(conn).await?;
        let Some(json) = result else {
            return Ok(None);
        };
        let candidate: Candidate = serde_json::from_str(&json)?;
        Ok((candidate.tenant_id == tenant_id).then_some(candidate))
    }

    /// Delete a candidate owned by `tenant_id`.
    pub async fn delete(
        &self,
        conn: &mut ConnectionManager,
        tenant_id: &str,
        candidate_id: &str,
    ) -> Result<(), SearchError> {
        if self.get(conn, tenant_id, candidate_id).await?.is_none() {
            return Err(SearchError::NotFound {
                candidate_id: Some(candidate_id.to_string()),
            });
        }
        let removed: u64 = cmd("DEL").arg(self.candidate_key(candidate_id)).query_async(conn).await?;
        if removed == 0 {
            return Err(SearchError::NotFound {
                candidate_id: Some(candidate_id.to_string()),
            });
        }
        Ok(())
    }

    /// Search with pre-built parameters.
    pub async fn search(
        &self,
        conn: &mut ConnectionManager,
        tenant_id: &str,
        params: SearchParams,
    ) -> Result<SearchResult<Candidate>, SearchError> {
        let definition = Candidate::index_definition(&self.key_context());
        search::execute_search(conn, &definition.name, &params, &Self::tenant_filter(tenant_id)).await
    }

    /// Resolve a request (boolean `q`, filters, paging, sort) and search.
    pub async fn search_with_query(
        &self,
        conn: &mut ConnectionManager,
        tenant_id: &str,
        query: SearchQuery,
    ) -> Result<SearchResult<Candidate>, SearchError> {
        let params = Self::params_for(query)?;
        self.search(conn, tenant_id, params).await
    }

    /// Parameters for a candidate search request.
    pub fn params_for(query: SearchQuery) -> Result<SearchParams, SearchError> {
        query.with_boolean_query(
            Candidate::allowed_sorts(),
            Candidate::default_sort(),
            Candidate::map_filter,
            &Candidate::search_fields(),
        )
    }

    /// The full RediSearch query a request produces for a tenant.
    pub fn explain(&self, tenant_id: &str, query: SearchQuery) -> Result<String, SearchError> {
        Ok(Self::params_for(query)?.build_query(&Self::tenant_filter(tenant_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_by_service() {
        let repo = CandidateRepository::new("ats", "recruiting");
        assert_eq!(repo.candidate_key("c1"), "ats:recruiting:candidates:c1");
        assert_eq!(repo.collection_pattern(), "ats:recruiting:candidates:*");
    }

    #[test]
    fn explain_scopes_to_tenant_and_escapes_it() {
        let repo = CandidateRepository::new("ats", "recruiting");
        let query = SearchQuery {
            q: Some(r#""staff engineer""#.to_string()),
            filter: vec!["stage:eq:offer".to_string()],
            ..Default::default()
        };
        let explained = repo.explain("acme-eu", query).unwrap();
        assert!(explained.starts_with("(@tenant_id:{acme\\-eu}) (@stage:{offer}) ("));
        assert!(explained.contains("(@current_title:\"staff engineer\")"));
        assert!(explained.contains("(@skills:{staff engineer})"));
    }

    #[test]
    fn explain_without_query_is_tenant_only() {
        let repo = CandidateRepository::new("ats", "recruiting");
        assert_eq!(
            repo.explain("acme", SearchQuery::default()).unwrap(),
            "(@tenant_id:{acme})"
        );
    }
}
