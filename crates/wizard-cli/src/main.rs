mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{nav::NavSubcommand, step::StepSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "wizard",
    about = "Benefits application wizard: step access, answers, and progress",
    version,
    propagate_version = true
)]
struct Cli {
    /// Wizard root (default: auto-detect from .wizard/)
    #[arg(long, global = true, env = "WIZARD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .wizard/ with default config and empty storage
    Init,

    /// Show per-step completion, progress, and the application number
    State,

    /// Show where the wizard would send the user now
    Next,

    /// Check whether a route may be opened (e.g. /step2)
    Check { route: String },

    /// Show, draft, or submit a step
    Step {
        #[command(subcommand)]
        subcommand: StepSubcommand,
    },

    /// Move the progress indicator
    Nav {
        #[command(subcommand)]
        subcommand: NavSubcommand,
    },

    /// Enter the summary and print the application number
    Summary,

    /// Start a new application
    Reset {
        /// Clear completion and progress but keep the entered answers
        #[arg(long)]
        keep_answers: bool,
    },

    /// Run the HTTP server
    Serve {
        /// Port to listen on (default: server.port from config; 0 = OS-assigned)
        #[arg(long)]
        port: Option<u16>,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::State => cmd::state::run(&root, cli.json),
        Commands::Next => cmd::next::run(&root, cli.json),
        Commands::Check { route } => cmd::check::run(&root, &route, cli.json),
        Commands::Step { subcommand } => cmd::step::run(&root, subcommand, cli.json),
        Commands::Nav { subcommand } => cmd::nav::run(&root, subcommand, cli.json),
        Commands::Summary => cmd::summary::run(&root, cli.json),
        Commands::Reset { keep_answers } => cmd::reset::run(&root, keep_answers, cli.json),
        Commands::Serve { port, no_open } => cmd::serve::run(&root, port, no_open),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
