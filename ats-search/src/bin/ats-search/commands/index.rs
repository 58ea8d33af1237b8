use anyhow::Result;
use ats_search::{Candidate, search::SearchEntity};
use clap::Subcommand;

use crate::context::CliContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Manage the Candidate Index",
    commands: &[
        "ats-search index ensure                                # Create the index if missing",
        "ats-search --redis-url redis://localhost:6379 index ensure",
    ],
}];

#[derive(Subcommand)]
pub enum IndexCommands {
    /// Create the candidate search index if it does not exist
    #[command(name = "ensure")]
    Ensure,
}

pub async fn handle_index_commands(command: IndexCommands, ctx: &CliContext, output: &OutputManager) -> Result<()> {
    match command {
        IndexCommands::Ensure => {
            output.heading("Candidate Index");
            let repository = ctx.repository();
            let definition = Candidate::index_definition(&repository.key_context());
            let mut conn = ctx.connect(output).await?;

            repository.ensure_search_index(&mut conn).await?;
            output.success(&format!("Index {} is ready", definition.name));
            output.key_value("Prefix", &definition.prefixes.join(", "));
            output.key_value("Fields", &definition.schema.len().to_string());
        }
    }
    Ok(())
}
