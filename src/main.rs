use clap::{Parser, Subcommand};
use deck_snapshot::commands::*;
use deck_snapshot::core::{
    error::{ErrorKind, Result, SnapshotError},
    print_error, print_error_with_hint, SnapshotConfig, SnapshotService,
};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deck-snapshot")]
#[command(about = "Git-backed snapshots and time travel for slide-deck projects")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, short = 'p', global = true, value_name = "DIR")]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the project repository and commit the current files
    Init {
        /// Move an existing repository aside and start over
        #[arg(long)]
        force: bool,
    },
    /// Commit the tracked project files as a new snapshot
    Snapshot {
        /// Snapshot description (only the first line is kept)
        message: String,
        /// Name recorded in the log for this snapshot
        #[arg(long)]
        user: Option<String>,
    },
    /// List recent snapshots, newest first
    Log {
        /// Maximum number of snapshots to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Show the text files and metadata of a snapshot
    Show {
        /// Full or abbreviated snapshot hash
        hash: String,
    },
    /// Roll the project back to a snapshot (discards uncommitted changes)
    Restore {
        /// Full or abbreviated snapshot hash
        hash: String,
        /// Confirm the rollback
        #[arg(long)]
        yes: bool,
        /// Skip the backup snapshot of the current state
        #[arg(long)]
        no_backup: bool,
    },
    /// Show working copy changes
    Status,
    /// Show repository diagnostics
    Info,
    /// Check out a snapshot read-only
    View {
        /// Full or abbreviated snapshot hash
        hash: String,
    },
    /// Leave snapshot view and return to the previous state
    ExitView,
    /// Show whether a snapshot view is active
    ViewStatus,
    /// Force the project out of snapshot view
    Recover {
        /// Confirm the forced recovery
        #[arg(long)]
        yes: bool,
    },
    /// Write a bare clone of the project history
    Export {
        /// Destination directory (defaults to a new temporary directory)
        dest: Option<PathBuf>,
    },
    /// Release the repository before deleting or moving the project
    Cleanup,
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag; RUST_LOG still refines it
    env_logger::Builder::new()
        .filter_level(if cli.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        report_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let project_dir = match cli.project {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let config = SnapshotConfig::load_or_default()?;
    let ctx = CommandContext::new(SnapshotService::new(config), project_dir);

    match cli.command {
        Commands::Init { force } => execute_init(&ctx, force),
        Commands::Snapshot { message, user } => execute_snapshot(&ctx, &message, user.as_deref()),
        Commands::Log { limit } => execute_log(&ctx, limit),
        Commands::Show { hash } => execute_show(&ctx, &hash),
        Commands::Restore {
            hash,
            yes,
            no_backup,
        } => execute_restore(&ctx, &hash, yes, no_backup),
        Commands::Status => execute_status(&ctx),
        Commands::Info => execute_info(&ctx),
        Commands::View { hash } => execute_view(&ctx, &hash),
        Commands::ExitView => execute_exit_view(&ctx),
        Commands::ViewStatus => execute_view_status(&ctx),
        Commands::Recover { yes } => execute_recover(&ctx, yes),
        Commands::Export { dest } => execute_export(&ctx, dest),
        Commands::Cleanup => execute_cleanup(&ctx),
    }
}

fn report_error(e: &SnapshotError) {
    match e.kind() {
        ErrorKind::RepoNotInitialized | ErrorKind::NotARepository => {
            print_error_with_hint(&e.to_string(), "Run `deck-snapshot init` first")
        }
        ErrorKind::AlreadyInView | ErrorKind::ViewActive => {
            print_error_with_hint(&e.to_string(), "Run `deck-snapshot exit-view` first")
        }
        ErrorKind::CheckoutFailed
        | ErrorKind::MissingOriginalState
        | ErrorKind::RecoverFailed => print_error_with_hint(
            &e.to_string(),
            "Run `deck-snapshot recover --yes` to force the project out of snapshot view",
        ),
        _ => print_error(&e.to_string()),
    }
}
