use anyhow::Result;
use ats_search::{
    Candidate, SearchQuery, compile,
    search::{SearchEntity, translate},
};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;

use crate::context::CliContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, add_table_header, themed_table};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Inspect Generated RediSearch Syntax",
    commands: &[
        "ats-search explain 'rust NOT php'                            # Clause for the search box only",
        "ats-search explain 'rust NOT php' --tenant acme              # Full query scoped to a tenant",
        "ats-search explain 'kubernetes' --tenant acme --filter stage:eq:interview",
    ],
}];

#[derive(Args)]
pub struct ExplainArgs {
    /// Boolean search query
    pub query: Option<String>,

    /// Tenant to scope the full query to
    #[arg(long, env = "ATS_TENANT")]
    pub tenant: Option<String>,

    /// Structured filter `field:op:value` (repeatable, requires --tenant)
    #[arg(long = "filter", value_name = "FILTER")]
    pub filters: Vec<String>,
}

#[derive(Serialize)]
pub struct Explanation {
    pub query: String,
    pub canonical: String,
    pub clause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_query: Option<String>,
}

impl TableDisplay for Explanation {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options);
        add_table_header(&mut table, options, &["Stage", "Output"]);
        table.add_row(vec![Cell::new("Query"), Cell::new(&self.query)]);
        table.add_row(vec![Cell::new("Canonical"), Cell::new(&self.canonical)]);
        table.add_row(vec![
            Cell::new("Clause"),
            Cell::new(self.clause.as_deref().unwrap_or("(match all)")),
        ]);
        if let Some(full_query) = &self.full_query {
            table.add_row(vec![Cell::new("FT.SEARCH"), Cell::new(full_query)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.full_query
            .clone()
            .or_else(|| self.clause.clone())
            .unwrap_or_else(|| "*".to_string())
    }
}

pub fn explain(args: ExplainArgs, ctx: &CliContext) -> Result<Explanation> {
    let predicate = compile(args.query.as_deref());
    let clause = translate(&predicate, &Candidate::search_fields()).map(|condition| condition.to_query_clause());

    let full_query = match &args.tenant {
        Some(tenant) => {
            let request = SearchQuery {
                q: args.query.clone(),
                filter: args.filters,
                ..Default::default()
            };
            Some(ctx.repository().explain(tenant, request)?)
        }
        None if !args.filters.is_empty() => anyhow::bail!("--filter requires --tenant"),
        None => None,
    };

    Ok(Explanation {
        query: args.query.unwrap_or_default(),
        canonical: predicate.to_string(),
        clause,
        full_query,
    })
}

pub fn handle_explain(args: ExplainArgs, ctx: &CliContext, output: &OutputManager) -> Result<()> {
    let explanation = explain(args, ctx)?;
    output.display(&explanation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CliContext {
        let dir = tempfile::tempdir().unwrap();
        CliContext::load(&dir.path().join("absent.toml"), None).unwrap()
    }

    fn args(query: &str, tenant: Option<&str>, filters: &[&str]) -> ExplainArgs {
        ExplainArgs {
            query: Some(query.to_string()),
            tenant: tenant.map(str::to_string),
            filters: filters.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn clause_without_tenant() {
        let explanation = explain(args("rust NOT php", None, &[]), &context()).unwrap();
        assert_eq!(explanation.canonical, "rust AND NOT php");
        let clause = explanation.clause.unwrap();
        assert!(clause.contains("-("));
        assert!(clause.contains("@skills:{php}"));
        assert!(explanation.full_query.is_none());
    }

    #[test]
    fn full_query_with_tenant() {
        let explanation = explain(args("rust", Some("acme"), &["stage:eq:offer"]), &context()).unwrap();
        let full = explanation.full_query.unwrap();
        assert!(full.starts_with("(@tenant_id:{acme}) (@stage:{offer})"));
    }

    #[test]
    fn filters_need_a_tenant() {
        assert!(explain(args("rust", None, &["stage:eq:offer"]), &context()).is_err());
    }

    #[test]
    fn blank_query_has_no_clause() {
        let explanation = explain(args("   ", None, &[]), &context()).unwrap();
        assert!(explanation.clause.is_none());
        assert_eq!(explanation.to_compact(), "*");
    }
}
