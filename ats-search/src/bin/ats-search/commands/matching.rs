use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ats_search::{Candidate, Predicate, compile};
use clap::Args;

use super::CandidateList;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Filter a Candidate Export Offline",
    commands: &[
        "ats-search match 'rust AND NOT php' --file candidates.json",
        "ats-search match '\"site reliability\" OR sre' --file candidates.json --tenant acme",
        "ats-search --output json match kubernetes --file candidates.json > shortlist.json",
    ],
}];

#[derive(Args)]
pub struct MatchArgs {
    /// Boolean search query
    pub query: Option<String>,

    /// JSON file holding an array of candidates
    #[arg(short, long)]
    pub file: PathBuf,

    /// Only consider candidates of this tenant
    #[arg(long, env = "ATS_TENANT")]
    pub tenant: Option<String>,
}

pub async fn load_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not a JSON array of candidates", path.display()))
}

pub fn filter_candidates(candidates: Vec<Candidate>, predicate: &Predicate, tenant: Option<&str>) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|candidate| tenant.is_none_or(|tenant| candidate.tenant_id == tenant))
        .filter(|candidate| predicate.matches(candidate))
        .collect()
}

pub async fn handle_match(args: MatchArgs, output: &OutputManager) -> Result<()> {
    let candidates = load_candidates(&args.file).await?;
    let total = candidates.len();
    let predicate = compile(args.query.as_deref());
    output.verbose(&format!("Compiled query: {predicate}"));

    let matched = CandidateList(filter_candidates(candidates, &predicate, args.tenant.as_deref()));
    if matched.is_empty() {
        output.warning("No candidates matched");
        return Ok(());
    }

    output.display(&matched)?;
    output.info(&format!("{} of {total} candidates matched", matched.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"[
        {"id": "c1", "tenant_id": "acme", "first_name": "Ada", "last_name": "Lovelace",
         "email": "ada@example.com", "current_title": "Staff Engineer", "skills": ["Rust", "Go"]},
        {"id": "c2", "tenant_id": "acme", "first_name": "Linus", "last_name": "Pauling",
         "email": "linus@example.com", "current_title": "Backend Engineer", "skills": ["PHP", "Go"]},
        {"id": "c3", "tenant_id": "globex", "first_name": "Grace", "last_name": "Hopper",
         "email": "grace@example.com", "current_title": "Principal Engineer", "skills": ["Rust"]}
    ]"#;

    async fn export() -> Vec<Candidate> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.json");
        std::fs::write(&path, EXPORT).unwrap();
        load_candidates(&path).await.unwrap()
    }

    fn ids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.id.as_str()).collect()
    }

    #[tokio::test]
    async fn filters_by_query() {
        let matched = filter_candidates(export().await, &compile(Some("Rust AND NOT PHP")), None);
        assert_eq!(ids(&matched), vec!["c1", "c3"]);

        let matched = filter_candidates(export().await, &compile(Some("\"backend engineer\" OR principal")), None);
        assert_eq!(ids(&matched), vec!["c2", "c3"]);
    }

    #[tokio::test]
    async fn filters_by_tenant() {
        let matched = filter_candidates(export().await, &compile(Some("Rust")), Some("acme"));
        assert_eq!(ids(&matched), vec!["c1"]);
    }

    #[tokio::test]
    async fn blank_query_keeps_everything() {
        assert_eq!(filter_candidates(export().await, &compile(None), None).len(), 3);
    }

    #[tokio::test]
    async fn rejects_non_array_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"id": "c1"}"#).unwrap();
        assert!(load_candidates(&path).await.is_err());
    }
}
