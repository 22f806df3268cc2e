//! CLI entry point for daily-check.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use daily_check_app::{AppConfig, Checklist, TaskView};
use daily_check_store_fs::FsStore;

mod commands;

const APP_DIR: &str = "daily-check";
const CONFIG_FILE: &str = "config.toml";

/// A checklist of recurring daily tasks.
#[derive(Parser, Debug)]
#[command(
    name = "daily-check",
    version,
    about = "daily-check: plan, tick off and reorder your daily tasks"
)]
struct Cli {
    /// Configuration file (defaults to <config dir>/daily-check/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the task and device documents.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a pending task at the end of the list.
    Add {
        #[arg(long)]
        name: String,
        /// Check-in time as HH:mm.
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        device: Option<String>,
        /// App name or URL used for the task.
        #[arg(long)]
        app: Option<String>,
        /// Fill blank fields from the suggestion service.
        #[arg(long)]
        autofill: bool,
    },

    /// Change the fields of a task. Status and creation time are kept.
    Edit {
        /// Task id or unique id prefix.
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        device: Option<String>,
        #[arg(long)]
        app: Option<String>,
    },

    /// Mark a task completed.
    Done { id: String },

    /// Mark a task skipped for today.
    Skip { id: String },

    /// Put a completed or skipped task back to pending.
    Undo { id: String },

    /// Delete a task.
    Rm {
        id: String,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List tasks in list order.
    Ls {
        /// all, pending, completed or skipped.
        #[arg(long, default_value_t = TaskView::All)]
        view: TaskView,
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Move a pending task in front of another pending task.
    Move {
        id: String,
        #[arg(long)]
        before: String,
    },

    /// Manage the device list.
    Device {
        #[command(subcommand)]
        cmd: DeviceCommand,
    },

    /// Write a backup of all tasks and devices.
    Export {
        /// Output file, `-` for stdout (defaults to a dated file name).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all tasks (and devices, when present) from a backup file.
    Import {
        path: PathBuf,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Ask the suggestion service to draft a task.
    Suggest { text: String },
}

#[derive(Subcommand, Debug)]
enum DeviceCommand {
    /// List devices with their positions.
    Ls,

    /// Register a device.
    Add { label: String },

    /// Rename the device at a 1-based position.
    Rename { index: usize, label: String },

    /// Remove the device at a 1-based position. Tasks keep their device text.
    Rm {
        index: usize,
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LsFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli { config, data_dir, cmd } = Cli::parse();
    install_tracing();

    let config = load_config(config.as_deref())?;
    let data_dir = resolve_data_dir(data_dir, &config)?;
    tracing::debug!(data_dir = %data_dir.display(), "opening checklist");
    let store = FsStore::open(&data_dir)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;
    let mut checklist = Checklist::open(store, &config).context("failed to load checklist")?;
    commands::run(cmd, &mut checklist, &config)
}

fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match dirs::config_dir() {
            Some(dir) => dir.join(APP_DIR).join(CONFIG_FILE),
            None => return Ok(AppConfig::default()),
        },
    };
    AppConfig::from_path(&path)
}

fn resolve_data_dir(explicit: Option<PathBuf>, config: &AppConfig) -> Result<PathBuf> {
    explicit
        .or_else(|| config.storage.data_dir.clone())
        .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
        .context("could not determine a data directory; pass --data-dir")
}

fn install_tracing() {
    // RUST_LOG overrides the default; logs go to stderr so stdout stays parseable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add_command() {
        let cli = Cli::parse_from([
            "daily-check",
            "add",
            "--name",
            "Water plants",
            "--time",
            "7:30",
            "--device",
            "Phone",
            "--autofill",
        ]);

        match cli.cmd {
            Command::Add {
                name,
                time,
                device,
                autofill,
                description,
                ..
            } => {
                assert_eq!(name, "Water plants");
                assert_eq!(time.as_deref(), Some("7:30"));
                assert_eq!(device.as_deref(), Some("Phone"));
                assert!(autofill);
                assert!(description.is_none());
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn parse_global_paths_after_subcommand() {
        let cli = Cli::parse_from(["daily-check", "ls", "--data-dir", "/tmp/dc", "--config", "dc.toml"]);
        assert_eq!(cli.data_dir.as_deref(), Some(Path::new("/tmp/dc")));
        assert_eq!(cli.config.as_deref(), Some(Path::new("dc.toml")));
    }

    #[test]
    fn parse_ls_defaults_and_view() {
        let cli = Cli::parse_from(["daily-check", "ls"]);
        let Command::Ls { view, format } = cli.cmd else {
            panic!("expected ls command");
        };
        assert_eq!(view, TaskView::All);
        assert_eq!(format, LsFormat::Table);

        let cli = Cli::parse_from(["daily-check", "ls", "--view", "skipped", "--format", "json"]);
        let Command::Ls { view, format } = cli.cmd else {
            panic!("expected ls command");
        };
        assert_eq!(view, TaskView::Skipped);
        assert_eq!(format, LsFormat::Json);
    }

    #[test]
    fn parse_rejects_unknown_view() {
        assert!(Cli::try_parse_from(["daily-check", "ls", "--view", "tomorrow"]).is_err());
    }

    #[test]
    fn parse_move_command() {
        let cli = Cli::parse_from(["daily-check", "move", "abc", "--before", "def"]);
        let Command::Move { id, before } = cli.cmd else {
            panic!("expected move command");
        };
        assert_eq!(id, "abc");
        assert_eq!(before, "def");
    }

    #[test]
    fn parse_device_subcommands() {
        let cli = Cli::parse_from(["daily-check", "device", "rename", "2", "Work laptop"]);
        let Command::Device {
            cmd: DeviceCommand::Rename { index, label },
        } = cli.cmd
        else {
            panic!("expected device rename command");
        };
        assert_eq!(index, 2);
        assert_eq!(label, "Work laptop");

        let cli = Cli::parse_from(["daily-check", "device", "rm", "1", "-y"]);
        assert!(matches!(
            cli.cmd,
            Command::Device {
                cmd: DeviceCommand::Rm { index: 1, yes: true }
            }
        ));
    }

    #[test]
    fn parse_import_requires_path() {
        assert!(Cli::try_parse_from(["daily-check", "import"]).is_err());
        let cli = Cli::parse_from(["daily-check", "import", "backup.json", "--yes"]);
        let Command::Import { path, yes } = cli.cmd else {
            panic!("expected import command");
        };
        assert_eq!(path, PathBuf::from("backup.json"));
        assert!(yes);
    }

    #[test]
    fn explicit_data_dir_wins_over_config() -> Result<()> {
        let config = AppConfig::from_toml("[storage]\ndata_dir = \"/from/config\"")?;
        assert_eq!(resolve_data_dir(Some("/cli".into()), &config)?, PathBuf::from("/cli"));
        assert_eq!(resolve_data_dir(None, &config)?, PathBuf::from("/from/config"));
        Ok(())
    }
}
