use std::path::PathBuf;

use anyhow::Result;
use ats_search::{Candidate, SearchError};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;

use super::matching::load_candidates;
use crate::context::CliContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, add_table_header, themed_table};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Load Candidates into Redis",
    commands: &[
        "ats-search import --file candidates.json                  # Insert every candidate",
        "ats-search import --file candidates.json --tenant acme    # Assign all records to one tenant",
        "ats-search import --file candidates.json --ensure-index   # Create the index first",
    ],
}];

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file holding an array of candidates
    #[arg(short, long)]
    pub file: PathBuf,

    /// Overwrite tenant_id on every record
    #[arg(long)]
    pub tenant: Option<String>,

    /// Create the candidate index before inserting
    #[arg(long)]
    pub ensure_index: bool,
}

#[derive(Serialize)]
pub struct ImportedCandidate {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct RejectedCandidate {
    /// Position in the input array
    pub index: usize,
    pub name: String,
    pub reason: String,
}

#[derive(Serialize, Default)]
pub struct ImportReport {
    pub imported: Vec<ImportedCandidate>,
    pub rejected: Vec<RejectedCandidate>,
}

impl TableDisplay for ImportReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options);
        add_table_header(&mut table, options, &["ID", "Tenant", "Name"]);
        for candidate in &self.imported {
            table.add_row(vec![
                Cell::new(&candidate.id),
                Cell::new(&candidate.tenant_id),
                Cell::new(&candidate.name),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.imported
            .iter()
            .map(|candidate| candidate.id.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Human-readable reason a write was refused
fn rejection_reason(err: &SearchError) -> String {
    match err {
        SearchError::Validation(validation) => validation
            .issues
            .iter()
            .map(|issue| issue.message.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn assign_tenant(candidates: &mut [Candidate], tenant: Option<&str>) {
    if let Some(tenant) = tenant {
        for candidate in candidates {
            candidate.tenant_id = tenant.to_string();
        }
    }
}

pub async fn handle_import(args: ImportArgs, ctx: &CliContext, output: &OutputManager) -> Result<()> {
    let mut candidates = load_candidates(&args.file).await?;
    assign_tenant(&mut candidates, args.tenant.as_deref());
    output.verbose(&format!("Loaded {} candidates from {}", candidates.len(), args.file.display()));

    let repository = ctx.repository();
    let mut conn = ctx.connect(output).await?;
    if args.ensure_index {
        repository.ensure_search_index(&mut conn).await?;
    }

    let mut report = ImportReport::default();
    for (index, candidate) in candidates.into_iter().enumerate() {
        let name = candidate.full_name();
        match repository.insert(&mut conn, candidate).await {
            Ok(stored) => report.imported.push(ImportedCandidate {
                id: stored.id,
                tenant_id: stored.tenant_id,
                name,
            }),
            Err(err @ (SearchError::Redis(_) | SearchError::Serialization(_))) => return Err(err.into()),
            Err(err) => {
                let reason = rejection_reason(&err);
                output.warning(&format!("Skipped #{index} ({name}): {reason}"));
                report.rejected.push(RejectedCandidate { index, name, reason });
            }
        }
    }

    output.display(&report)?;
    output.success(&format!(
        "Imported {} candidates ({} rejected)",
        report.imported.len(),
        report.rejected.len()
    ));
    if report.imported.is_empty() && !report.rejected.is_empty() {
        anyhow::bail!("No candidates were imported");
    }
    Ok(())
}
