use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use lectern::config::{ConfigError, LecternConfig};
use lectern::prefs::{FileStore, PreferenceStore, StorageError};
use lectern::screen::LoginScreen;
use lectern::theme::{ThemeError, ThemeManager, ThemeMode};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Theme(#[from] ThemeError),
    #[error("failed to listen for ctrl-c: {0}")]
    Signal(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "lectern", about = "Inspect and change the login screen theme preference")]
struct Cli {
    /// Directory holding preference files.
    #[arg(long, env = "LECTERN_PREFS_DIR")]
    prefs_dir: Option<PathBuf>,

    /// Preference group name.
    #[arg(long, env = "LECTERN_PREFS_GROUP")]
    group: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stored theme mode.
    Show,
    /// Store a theme mode.
    Set { mode: ThemeMode },
    /// Switch to the other theme mode.
    Toggle,
    /// Remove the stored flag (back to light mode).
    Reset,
    /// Print every theme change until interrupted.
    Watch,
    /// Render the login screen with the stored theme.
    Screen,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = LecternConfig::from_env()?;
    if let Some(dir) = cli.prefs_dir {
        config.prefs_dir = dir;
    }
    if let Some(group) = cli.group.as_deref() {
        config = config.with_group(group)?;
    }
    tracing::debug!(path = %config.group_path().display(), key = %config.theme_key, "using preference group");

    let store = Arc::new(FileStore::new(&config.prefs_dir, &config.group));
    let manager = open_manager(&config, &store).await?;

    match cli.command {
        Command::Show => println!("{}", manager.mode()),
        Command::Set { mode } => {
            manager.set_dark_mode(mode.is_dark()).await?;
            println!("{}", manager.mode());
        }
        Command::Toggle => {
            manager.toggle().await?;
            println!("{}", manager.mode());
        }
        Command::Reset => {
            manager.reset().await?;
            println!("{}", manager.mode());
        }
        Command::Watch => watch(&manager, &store, Duration::from_millis(config.watch_interval_ms)).await?,
        Command::Screen => print!("{}", LoginScreen::new(manager.observe()).render()),
    }

    manager.dispose().await;
    Ok(())
}

/// Start a manager over `store` whose first load is done.
async fn open_manager(config: &LecternConfig, store: &Arc<FileStore>) -> Result<ThemeManager, CliError> {
    // Surface read failures here; the manager itself only logs them.
    store.load().await?;

    let store: Arc<dyn PreferenceStore> = store.clone();
    let manager = ThemeManager::with_event_capacity(store, config.theme_key.clone(), config.event_capacity);
    manager.initialize()?;
    manager.observe().wait_loaded().await;
    Ok(manager)
}

/// Print the mode, then every change, re-reading the group file so writes
/// from other processes show up.
async fn watch(manager: &ThemeManager, store: &FileStore, interval: Duration) -> Result<(), CliError> {
    let mut observer = manager.observe();
    println!("{}", observer.mode());

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = store.refresh().await {
                    tracing::warn!(error = %e, "preference refresh failed");
                }
            }
            change = observer.next_change() => match change {
                Some(is_dark) => println!("{}", ThemeMode::from_dark_flag(is_dark)),
                None => return Ok(()),
            },
            signal = tokio::signal::ctrl_c() => {
                signal?;
                return Ok(());
            }
        }
    }
}
