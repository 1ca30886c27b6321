mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "menu-kit")]
#[command(version, about = "Content tooling for a static restaurant site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Scaffold a new site directory with sample content
    Init {
        /// Path to the site directory (created if missing)
        path: PathBuf,

        /// Restaurant name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Validate every menu item, special, and data file
    Validate {
        /// Path to site directory
        path: PathBuf,
    },

    /// Validate and write typed content for the page renderer
    Build {
        /// Path to site directory
        path: PathBuf,

        /// Output directory for the generated JSON
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr; progress output stays on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init { path, name } => commands::init::run(path, name).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Build { path, output } => commands::build::run(path, output).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "menu-kit", &mut io::stdout());
            Ok(())
        }
    }
}
