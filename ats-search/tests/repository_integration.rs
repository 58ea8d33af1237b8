//! Round-trips against a live Redis Stack (RedisJSON + RediSearch).
//!
//! Run with `REDIS_URL=redis://127.0.0.1/ cargo test -- --ignored`.

use ats_search::{
    Candidate, CandidateRepository, ConnectionManager, SearchError, SearchQuery, Stage, cleanup_pattern,
    id::generate_candidate_id,
};
use serial_test::serial;

// ============================================================================
// Test Utilities
// ============================================================================

async fn redis_conn() -> ConnectionManager {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
    let client = redis::Client::open(url).expect("redis client");
    client.get_connection_manager().await.expect("connection manager")
}

/// Repository under a throwaway prefix so runs never see each other's data.
fn unique_repo() -> CandidateRepository {
    CandidateRepository::new(format!("ats_test_{}", &generate_candidate_id()[..8]), "recruiting")
}

fn candidate(tenant: &str, first: &str, title: &str, skills: &[&str]) -> Candidate {
    serde_json::from_value(serde_json::json!({
        "tenant_id": tenant,
        "first_name": first,
        "last_name": "Tester",
        "email": format!("{}@example.com", first.to_lowercase()),
        "current_title": title,
        "skills": skills,
    }))
    .expect("candidate json")
}

async fn seeded(conn: &mut ConnectionManager) -> CandidateRepository {
    let repo = unique_repo();
    repo.ensure_search_index(conn).await.expect("index");
    for c in [
        candidate("acme", "Ada", "Staff Engineer", &["Rust", "Go"]),
        candidate("acme", "Linus", "Backend Engineer", &["PHP", "Go"]),
        candidate("acme", "Grace", "Site Reliability Engineer", &["Kubernetes"]),
        candidate("globex", "Alan", "Staff Engineer", &["Rust"]),
    ] {
        repo.insert(conn, c).await.expect("insert");
    }
    // RediSearch indexes JSON documents asynchronously.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    repo
}

async fn first_names(conn: &mut ConnectionManager, repo: &CandidateRepository, tenant: &str, q: &str) -> Vec<String> {
    let query = SearchQuery {
        q: Some(q.to_string()),
        sort_by: Some("last_name".to_string()),
        ..Default::default()
    };
    let mut names: Vec<String> = repo
        .search_with_query(conn, tenant, query)
        .await
        .expect("search")
        .items
        .into_iter()
        .map(|c| c.first_name)
        .collect();
    names.sort();
    names
}

// ============================================================================
// Storage
// ============================================================================

#[tokio::test]
#[serial]
#[ignore = "requires Redis Stack"]
async fn insert_assigns_id_and_scopes_reads_to_tenant() {
    let mut conn = redis_conn().await;
    let repo = unique_repo();

    let stored = repo
        .insert(&mut conn, candidate("acme", "Ada", "Staff Engineer", &["Rust"]))
        .await
        .expect("insert");
    assert_eq!(stored.id.len(), 20);
    assert_eq!(stored.stage, Stage::Applied);

    let fetched = repo.get(&mut conn, "acme", &stored.id).await.expect("get");
    assert_eq!(fetched.as_ref().map(|c| c.first_name.as_str()), Some("Ada"));
    assert!(repo.get(&mut conn, "globex", &stored.id).await.expect("get").is_none());

    let err = repo.delete(&mut conn, "globex", &stored.id).await.unwrap_err();
    assert!(matches!(err, SearchError::NotFound { .. }));
    repo.delete(&mut conn, "acme", &stored.id).await.expect("delete");
    assert!(repo.get(&mut conn, "acme", &stored.id).await.expect("get").is_none());

    cleanup_pattern(&mut conn, &repo.collection_pattern()).await.expect("cleanup");
}

#[tokio::test]
#[serial]
#[ignore = "requires Redis Stack"]
async fn invalid_candidates_are_not_written() {
    let mut conn = redis_conn().await;
    let repo = unique_repo();

    let mut bad = candidate("acme", "Ada", "Staff Engineer", &[]);
    bad.email = "nope".to_string();
    let err = repo.insert(&mut conn, bad).await.unwrap_err();
    assert!(matches!(err, SearchError::Validation(_)));

    let deleted = cleanup_pattern(&mut conn, &repo.collection_pattern()).await.expect("cleanup");
    assert_eq!(deleted, 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires Redis Stack"]
async fn insert_refuses_ids_owned_by_another_tenant() {
    let mut conn = redis_conn().await;
    let repo = unique_repo();

    let mut original = candidate("globex", "Alan", "Staff Engineer", &["Rust"]);
    original.id = "shared-id".to_string();
    repo.insert(&mut conn, original).await.expect("insert");

    let mut intruder = candidate("acme", "Ada", "Staff Engineer", &["Rust"]);
    intruder.id = "shared-id".to_string();
    let err = repo.insert(&mut conn, intruder).await.unwrap_err();
    assert!(matches!(err, SearchError::TenantConflict { ref candidate_id } if candidate_id == "shared-id"));

    let kept = repo.get(&mut conn, "globex", "shared-id").await.expect("get");
    assert_eq!(kept.map(|c| c.first_name), Some("Alan".to_string()));
    assert!(repo.get(&mut conn, "acme", "shared-id").await.expect("get").is_none());

    // the owning tenant may still overwrite its own record
    let mut update = candidate("globex", "Alan", "Principal Engineer", &["Rust"]);
    update.id = "shared-id".to_string();
    repo.insert(&mut conn, update).await.expect("same-tenant update");
    let updated = repo.get(&mut conn, "globex", "shared-id").await.expect("get");
    assert_eq!(updated.map(|c| c.current_title), Some("Principal Engineer".to_string()));

    cleanup_pattern(&mut conn, &repo.collection_pattern()).await.expect("cleanup");
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
#[serial]
#[ignore = "requires Redis Stack"]
async fn boolean_queries_run_against_the_index() {
    let mut conn = redis_conn().await;
    let repo = seeded(&mut conn).await;

    assert_eq!(first_names(&mut conn, &repo, "acme", "Rust").await, vec!["Ada"]);
    assert_eq!(first_names(&mut conn, &repo, "acme", "Go NOT PHP").await, vec!["Ada"]);
    assert_eq!(
        first_names(&mut conn, &repo, "acme", r#""site reliability" OR PHP"#).await,
        vec!["Grace", "Linus"]
    );
    assert_eq!(
        first_names(&mut conn, &repo, "acme", "").await,
        vec!["Ada", "Grace", "Linus"]
    );
    assert_eq!(first_names(&mut conn, &repo, "globex", "Rust").await, vec!["Alan"]);

    cleanup_pattern(&mut conn, &repo.collection_pattern()).await.expect("cleanup");
}

#[tokio::test]
#[serial]
#[ignore = "requires Redis Stack"]
async fn paging_reports_totals() {
    let mut conn = redis_conn().await;
    let repo = seeded(&mut conn).await;

    let result = repo
        .search_with_query(
            &mut conn,
            "acme",
            SearchQuery {
                page_size: Some(2),
                ..Default::default()
            },
        )
        .await
        .expect("search");
    assert_eq!(result.total, 3);
    assert_eq!(result.items.len(), 2);
    assert!(result.has_more());

    cleanup_pattern(&mut conn, &repo.collection_pattern()).await.expect("cleanup");
}
