mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ids",
    about = "Incremental decision system: check the artifact registry before creating something new",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .ids/ or .git/)
    #[arg(long, global = true, env = "IDS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether to REUSE, ADAPT or CREATE for an intent
    ///
    /// Examples:
    ///   ids query validate story drafts
    ///   ids query "database migration" --type script
    #[command(alias = "ids:query")]
    Query {
        /// What the new functionality should do
        #[arg(required = true, num_args = 1..)]
        intent: Vec<String>,

        /// Only consider entities of this type (task, script, agent, template, ...)
        #[arg(long = "type")]
        entity_type: Option<String>,

        /// Only consider entities in this category (exact match)
        #[arg(long)]
        category: Option<String>,
    },

    /// Review past CREATE decisions for promotion, monitoring or deprecation
    #[command(alias = "ids:create-review")]
    CreateReview,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Query {
            intent,
            entity_type,
            category,
        } => cmd::query::run(&root, &intent, entity_type.as_deref(), category, cli.json),
        Commands::CreateReview => cmd::create_review::run(&root, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
