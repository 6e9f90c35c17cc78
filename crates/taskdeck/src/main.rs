//! CLI entry point for taskdeck.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use taskdeck_app::AppConfig;
use taskdeck_core::local_today;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Personal tasks with categories, filters, and day/week views.
#[derive(Parser, Debug)]
#[command(
    name = "taskdeck",
    version,
    about = "taskdeck: track tasks by category, priority, and due date"
)]
struct Cli {
    /// Directory holding config.toml and the data file.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a task.
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Category id; defaults to the first category.
        #[arg(short = 'c', long)]
        category: Option<String>,
        /// low, medium, or high; defaults to the configured default priority.
        #[arg(short = 'p', long)]
        priority: Option<String>,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,
    },

    /// List tasks through the status/priority/category/search filters.
    Ls {
        #[arg(long, default_value = "all")]
        status: String,
        #[arg(long, default_value = "all")]
        priority: String,
        #[arg(long, default_value = "all")]
        category: String,
        #[arg(short = 's', long)]
        search: Option<String>,
    },

    /// Show a named view: today, week, completed, or overdue.
    View {
        view: String,
        #[arg(short = 's', long)]
        search: Option<String>,
    },

    /// Show this week's tasks grouped by day.
    Week,

    /// Change fields of an existing task.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(short = 'c', long)]
        category: Option<String>,
        #[arg(short = 'p', long)]
        priority: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
    },

    /// Toggle completion of a task.
    Done { id: String },

    /// Delete a task.
    Rm { id: String },

    /// Print collection statistics.
    Stats,

    /// List categories.
    Categories,

    /// Show or change preferences.
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Print every setting.
    Show,
    /// Restore the defaults.
    Reset,
    /// Change one setting, e.g. `time_format 24h`.
    Set { key: String, value: String },
}

fn main() -> Result<()> {
    let Cli { data_dir, cmd } = Cli::parse();
    install_tracing();

    // Resolve the local date before worker threads exist; the offset lookup can fail afterwards.
    let today = local_today();
    let data_dir = resolve_data_dir(data_dir)?;
    let config = AppConfig::from_data_dir(&data_dir)
        .with_context(|| format!("failed to load configuration from {}", data_dir.display()))?;

    tokio::runtime::Runtime::new()?.block_on(commands::run(cmd, &config, today))
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    explicit
        .or_else(|| dirs::data_dir().map(|dir| dir.join("taskdeck")))
        .ok_or_else(|| anyhow!("could not determine a data directory; pass --data-dir"))
}

fn install_tracing() {
    // RUST_LOG is honoured; INFO by default.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add_command() {
        let cli = Cli::parse_from([
            "taskdeck",
            "--data-dir",
            "/tmp/deck",
            "add",
            "Buy groceries",
            "--category",
            "2",
            "--priority",
            "high",
            "--due",
            "2024-05-15",
        ]);

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/deck")));
        match cli.cmd {
            Command::Add {
                title,
                category,
                priority,
                due,
                description,
            } => {
                assert_eq!(title, "Buy groceries");
                assert_eq!(category.as_deref(), Some("2"));
                assert_eq!(priority.as_deref(), Some("high"));
                assert_eq!(due.as_deref(), Some("2024-05-15"));
                assert!(description.is_none());
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn parse_ls_defaults_to_all() {
        let cli = Cli::parse_from(["taskdeck", "ls", "-s", "groc"]);
        match cli.cmd {
            Command::Ls {
                status,
                priority,
                category,
                search,
            } => {
                assert_eq!((status.as_str(), priority.as_str(), category.as_str()), ("all", "all", "all"));
                assert_eq!(search.as_deref(), Some("groc"));
            }
            _ => panic!("expected ls command"),
        }
    }

    #[test]
    fn parse_settings_set_command() {
        let cli = Cli::parse_from(["taskdeck", "settings", "set", "time_format", "24h"]);
        match cli.cmd {
            Command::Settings {
                action: SettingsCommand::Set { key, value },
            } => {
                assert_eq!(key, "time_format");
                assert_eq!(value, "24h");
            }
            _ => panic!("expected settings set command"),
        }
    }

    #[test]
    fn edit_rejects_conflicting_due_flags() {
        let result = Cli::try_parse_from(["taskdeck", "edit", "3", "--due", "2024-05-15", "--clear-due"]);
        assert!(result.is_err());
    }

    #[test]
    fn explicit_data_dir_wins() {
        let dir = resolve_data_dir(Some(PathBuf::from("/srv/deck"))).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(dir, PathBuf::from("/srv/deck"));
    }
}
