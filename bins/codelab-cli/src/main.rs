mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use codelab_client::theme::ThemePreference;
use codelab_common::types::RunMode;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "codelab")]
#[command(about = "CodeNextLab CLI - Edit, run, and review practice code from the terminal", long_about = None)]
struct Cli {
    /// Service origin (overrides CODELAB_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// State directory for drafts and preferences (overrides CODELAB_STATE_DIR)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Editor buffer file (defaults to <state dir>/buffer)
    #[arg(long, global = true)]
    buffer: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported languages
    Languages,

    /// Switch language: loads its draft (or starter program) into the buffer
    Lang {
        /// Language name (e.g., python, c, cpp, java)
        language: String,
    },

    /// Restore the current language's starter program
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long, default_value = "false")]
        yes: bool,
    },

    /// Execute the buffer on the practice service
    Run {
        /// File whose content is passed as program input
        #[arg(short, long, conflicts_with = "stdin_text")]
        input: Option<PathBuf>,

        /// Literal program input
        #[arg(long)]
        stdin_text: Option<String>,

        /// Problem to check the code against
        #[arg(short, long)]
        problem: Option<u64>,

        /// Problem mode: run (sample cases) or submit (all cases)
        #[arg(short, long, requires = "problem")]
        mode: Option<RunMode>,
    },

    /// Keep autosaving the buffer as a draft until Ctrl-C
    Watch,

    /// List past submissions
    History,

    /// Show one submission in full
    Show {
        /// Submission id
        id: u64,
    },

    /// Set the theme (light, dark, system) or re-apply the saved one
    Theme {
        preference: Option<ThemePreference>,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = commands::Options {
        base_url: cli.base_url,
        state_dir: cli.state_dir,
        buffer: cli.buffer,
    };

    let ok = match cli.command {
        Commands::Languages => commands::list_languages(&options).await?,
        Commands::Lang { language } => commands::select_language(&options, &language).await?,
        Commands::Reset { yes } => commands::reset(&options, yes).await?,
        Commands::Run {
            input,
            stdin_text,
            problem,
            mode,
        } => {
            commands::run(
                &options,
                input.as_deref(),
                stdin_text.as_deref(),
                problem,
                mode,
            )
            .await?
        }
        Commands::Watch => commands::watch(&options).await?,
        Commands::History => commands::history(&options).await?,
        Commands::Show { id } => commands::show(&options, id).await?,
        Commands::Theme { preference } => commands::theme(&options, preference).await?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
