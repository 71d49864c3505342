use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;

#[derive(Parser)]
#[command(name = "streakwatch", version, about = "GitHub activity streak tracker")]
struct Cli {
    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current streak counters
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Check GitHub for activity today and update the streak
    Check {
        #[arg(long)]
        json: bool,
    },
    /// Run scheduled checks until interrupted
    Watch,
    /// List days with recorded activity
    History {
        /// Show at most this many days
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Print the reminder message for the current streak
    Reminder {
        /// Override the configured reminder mode (normal, strict)
        #[arg(long)]
        mode: Option<String>,
        /// Use this streak length instead of the stored one
        #[arg(long)]
        streak: Option<u32>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// GitHub token management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    streakwatch_core::logging::init(&cli.log_level);

    let result = match cli.command {
        None => commands::default_action().await,
        Some(Commands::Status { json }) => commands::status::run(json),
        Some(Commands::Check { json }) => commands::check::run(json).await,
        Some(Commands::Watch) => commands::watch::run().await,
        Some(Commands::History { limit, json }) => commands::history::run(limit, json),
        Some(Commands::Reminder { mode, streak }) => commands::reminder::run(mode, streak),
        Some(Commands::Config { action }) => commands::config::run(action),
        Some(Commands::Auth { action }) => commands::auth::run(action).await,
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "streakwatch", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
