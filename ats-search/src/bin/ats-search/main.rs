mod commands;
mod context;
mod examples;
mod help;
mod output;
mod theme;

use std::path::PathBuf;

use anyhow::Result;
use ats_search::config::CONFIG_FILE_NAME;
use clap::{CommandFactory, Parser, Subcommand};

use commands::{
    compile::{CompileArgs, handle_compile},
    explain::{ExplainArgs, handle_explain},
    import::{ImportArgs, handle_import},
    index::{IndexCommands, handle_index_commands},
    matching::{MatchArgs, handle_match},
    search::{SearchArgs, handle_search},
};
use context::CliContext;
use output::{GlobalOptions, OutputFormat, OutputManager};

#[derive(Parser)]
#[command(name = "ats-search")]
#[command(version)]
#[command(
    about = "Boolean candidate search for the recruiting platform",
    long_about = r#"Candidate search CLI that provides:

• Boolean search-box queries: AND, OR, NOT and "quoted phrases"
• Offline matching against candidate exports
• Tenant-scoped search over RediSearch

Commands:
  compile   Show the predicate a query compiles to
  explain   Show the RediSearch query a search would run
  match     Filter a JSON export of candidates
  index     Manage the candidate search index
  search    Search a tenant's candidates in Redis
  import    Load candidates into Redis
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Configuration file
    #[arg(long, env = "ATS_SEARCH_CONFIG", default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Redis connection URL
    #[arg(long, env = "REDIS_URL", hide_env_values = true)]
    redis_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the predicate tree a boolean query compiles to
    Compile(CompileArgs),

    /// Show the RediSearch query produced for a boolean query
    Explain(ExplainArgs),

    /// Filter candidates from a JSON file with a boolean query
    #[command(name = "match")]
    Match(MatchArgs),

    /// Manage the candidate search index
    #[command(subcommand)]
    Index(IndexCommands),

    /// Search a tenant's candidates in Redis
    Search(SearchArgs),

    /// Insert candidates from a JSON file into Redis
    Import(ImportArgs),
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli: Cli = help::parse_styled(Cli::command());

    help::blank_line(true);
    let outcome = execute(cli).await;
    help::blank_line(true);

    if outcome.is_err() {
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let global_options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    let output = OutputManager::new(global_options);
    let (config, redis_url) = (cli.config, cli.redis_url);
    let result = run(cli.command, || CliContext::load(&config, redis_url), &output).await;

    if let Err(err) = &result {
        output.error(&format!("{err:#}"));
    }
    result
}

/// Dispatch a command. The configuration is only loaded for commands that
/// talk to Redis, so `compile` and `match` keep working offline.
async fn run<F>(command: Commands, load_context: F, output: &OutputManager) -> Result<()>
where
    F: FnOnce() -> Result<CliContext>,
{
    match command {
        Commands::Compile(args) => handle_compile(args, output),
        Commands::Match(args) => handle_match(args, output).await,
        Commands::Explain(args) => handle_explain(args, &load_context()?, output),
        Commands::Index(index_cmd) => handle_index_commands(index_cmd, &load_context()?, output).await,
        Commands::Search(args) => handle_search(args, &load_context()?, output).await,
        Commands::Import(args) => handle_import(args, &load_context()?, output).await,
    }
}
