//! KillOnStart CLI - Review processes that started before policy loaded
//!
//! A command-line tool for listing kill-on-startup events, terminating
//! them within their grace period, and managing the policy settings.

mod commands;
mod telemetry;
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "killonstart")]
#[command(author, version, about = "Review and close processes started before policy load")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the events in a session file
    #[command(alias = "ls")]
    List {
        /// JSON file with the flagged events
        events: PathBuf,
    },

    /// Terminate one event from a session file
    Terminate {
        /// JSON file with the flagged events
        events: PathBuf,

        /// Process ID of the event
        #[arg(short, long)]
        pid: u32,

        /// Generation token of the event
        #[arg(short, long)]
        generation: u64,
    },

    /// Print the generation token of a running process
    Probe { pid: u32 },

    /// Open the review window for a session file
    Review {
        /// JSON file with the flagged events
        events: PathBuf,

        /// Use a line prompt instead of the interactive TUI
        #[arg(long)]
        no_tui: bool,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the banner message (omit to reset)
    Message { text: Option<String> },
    /// Set the "more info" URL (omit to clear)
    Url { url: Option<String> },
    /// Set the default grace period in seconds
    Grace { seconds: u64 },
    /// Set how long completed attempts stay flagged, in milliseconds
    Display { millis: u64 },
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let interactive = matches!(
        cli.command,
        Commands::Review { no_tui: false, .. }
    ) && atty::is(atty::Stream::Stdout);
    if telemetry::init_tracing("warn", !interactive) {
        tracing::debug!("Logging initialized");
    }

    match cli.command {
        Commands::List { events } => {
            commands::list::run(&events, cli.json).await?;
        }
        Commands::Terminate {
            events,
            pid,
            generation,
        } => {
            commands::terminate::run(&events, pid, generation, cli.json).await?;
        }
        Commands::Probe { pid } => {
            commands::probe::run(pid, cli.json).await?;
        }
        Commands::Review { events, .. } => {
            if interactive {
                tui::run(&events).await?;
            } else {
                commands::review::run(&events).await?;
            }
        }
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => commands::config::show(cli.json).await?,
            ConfigAction::Message { text } => commands::config::set_message(text).await?,
            ConfigAction::Url { url } => commands::config::set_url(url).await?,
            ConfigAction::Grace { seconds } => commands::config::set_grace(seconds).await?,
            ConfigAction::Display { millis } => commands::config::set_display(millis).await?,
        },
    }

    Ok(())
}
