use anyhow::Result;
use ats_search::{Candidate, PaginatedResponse, SearchQuery, SortOrder};
use clap::{Args, ValueEnum};
use comfy_table::Table;
use serde::Serialize;

use super::{CANDIDATE_HEADERS, candidate_compact, candidate_rows};
use crate::context::CliContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, add_table_header, themed_table};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Search a Tenant's Candidates",
        commands: &[
            "ats-search search 'rust AND NOT php' --tenant acme",
            "ats-search search '\"staff engineer\"' --tenant acme --filter stage:eq:interview|offer",
        ],
    },
    ExampleGroup {
        title: "Paging and Sorting",
        commands: &[
            "ats-search search kubernetes --tenant acme --page 2 --page-size 50",
            "ats-search search --tenant acme --sort-by last_name --sort-order asc",
        ],
    },
];

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Asc => SortOrder::Asc,
            SortArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Args)]
pub struct SearchArgs {
    /// Boolean search query (omit to list every candidate)
    pub query: Option<String>,

    /// Tenant whose candidates are searched
    #[arg(long, env = "ATS_TENANT")]
    pub tenant: String,

    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<u64>,

    /// Results per page (defaults to search.default_page_size)
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Sort field (created_at, last_name)
    #[arg(long)]
    pub sort_by: Option<String>,

    #[arg(long, value_enum)]
    pub sort_order: Option<SortArg>,

    /// Structured filter `field:op:value` (repeatable)
    #[arg(long = "filter", value_name = "FILTER")]
    pub filters: Vec<String>,
}

impl SearchArgs {
    pub fn to_query(&self, default_page_size: u64) -> SearchQuery {
        SearchQuery {
            page: self.page,
            page_size: Some(self.page_size.unwrap_or(default_page_size)),
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order.map(SortOrder::from),
            q: self.query.clone(),
            filter: self.filters.clone(),
        }
    }
}

/// One page of search results
#[derive(Serialize)]
#[serde(transparent)]
pub struct SearchPage(pub PaginatedResponse<Candidate>);

impl TableDisplay for SearchPage {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options);
        add_table_header(&mut table, options, CANDIDATE_HEADERS);
        candidate_rows(&mut table, &self.0.items);
        table
    }

    fn to_compact(&self) -> String {
        candidate_compact(&self.0.items)
    }
}

pub async fn handle_search(args: SearchArgs, ctx: &CliContext, output: &OutputManager) -> Result<()> {
    let repository = ctx.repository();
    let query = args.to_query(ctx.default_page_size());
    output.verbose(&format!("FT.SEARCH {}", repository.explain(&args.tenant, query.clone())?));

    let mut conn = ctx.connect(output).await?;
    let result = repository.search_with_query(&mut conn, &args.tenant, query).await?;
    let page = SearchPage(PaginatedResponse::from(result));

    if page.0.items.is_empty() {
        output.warning(&format!("No candidates found for tenant {}", args.tenant));
        return Ok(());
    }

    output.display(&page)?;
    let more = if page.0.has_more { ", more available" } else { "" };
    output.info(&format!(
        "Page {} ({} of {} candidates{more})",
        page.0.page,
        page.0.items.len(),
        page.0.total
    ));
    Ok(())
}
