//! backsort CLI: order backlinks by date instead of by name.
//!
//! Commands: resolve, sort, backlinks, watch, completions

mod output;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use backsort_core::metadata::{MetadataLookup, NoMetadata};
use backsort_core::{order_labels, sort_entries, Resolver, Settings, SurfaceKind};
use backsort_host::{Outcome, Reorderer, SkipReason};
use backsort_vault::{Backlink, Vault, VaultWatcher};

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload};

use output::{format_table, PrintSurface, Row};

#[derive(Parser)]
#[command(name = "backsort")]
#[command(version)]
#[command(about = "Order backlinks newest-first by the dates in titles, frontmatter, and files")]
struct Cli {
    /// Settings file (TOML). Defaults to `<vault>/.backsort.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Trace how every label is resolved (stderr).
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct VaultArgs {
    /// Vault directory used for frontmatter and file-time lookups.
    #[arg(long)]
    vault: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show the timestamp each label resolves to and where it came from
    Resolve {
        #[command(flatten)]
        vault: VaultArgs,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Labels (note titles) to resolve
        #[arg(required = true)]
        labels: Vec<String>,
    },
    /// Print labels in recency order
    Sort {
        #[command(flatten)]
        vault: VaultArgs,
        /// Oldest first
        #[arg(long)]
        ascending: bool,
        #[arg(long)]
        json: bool,
        #[arg(required = true)]
        labels: Vec<String>,
    },
    /// List the notes linking to NOTE, newest first
    Backlinks {
        /// Vault directory
        #[arg(long)]
        vault: PathBuf,
        #[arg(long)]
        ascending: bool,
        #[arg(long)]
        json: bool,
        /// Note title or vault path
        note: String,
    },
    /// Keep the backlinks of NOTE sorted while the vault changes
    Watch {
        #[arg(long)]
        vault: PathBuf,
        #[arg(long)]
        ascending: bool,
        /// Quiet period before re-sorting after a burst of edits
        #[arg(long, default_value_t = 300)]
        quiet_ms: u64,
        note: String,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "backsort", &mut io::stdout());
        return Ok(());
    }

    let log_level = init_tracing(cli.debug);
    let mut settings = load_settings(cli.config.as_deref(), command_vault(&cli.command))?;
    if settings.debug_mode && !cli.debug {
        log_level.raise_to_debug();
    }
    settings.debug_mode |= cli.debug;
    if command_ascending(&cli.command) {
        settings.sort_descending = false;
    }

    match cli.command {
        Commands::Resolve {
            vault, json, labels, ..
        } => {
            let lookup = open_lookup(vault.vault.as_deref())?;
            let resolver = Resolver::from_settings(&settings);
            let rows: Vec<Row> = labels
                .iter()
                .map(|label| Row::new(label, resolver.resolve_detailed(label, lookup.as_ref())))
                .collect();
            print_rows(&rows, json)
        }
        Commands::Sort {
            vault, json, labels, ..
        } => {
            let lookup = open_lookup(vault.vault.as_deref())?;
            let resolver = Resolver::from_settings(&settings);
            let ordered =
                order_labels(&labels, lookup.as_ref(), &resolver, settings.sort_descending);
            if json {
                println!("{}", serde_json::to_string_pretty(&ordered)?);
            } else {
                for label in ordered {
                    println!("{label}");
                }
            }
            Ok(())
        }
        Commands::Backlinks {
            vault, json, note, ..
        } => {
            let vault = open_vault(&vault)?;
            let resolver = Resolver::from_settings(&settings);
            let backlinks = vault
                .backlinks(&note)
                .with_context(|| format!("Failed to collect backlinks of '{note}'"))?;
            let resolved = backlinks
                .into_iter()
                .map(|b| {
                    let resolution = resolver.resolve_detailed(&b.label, &vault);
                    let timestamp = resolution.timestamp;
                    (
                        Row::new(&b.label, resolution).with_path(b.path.display().to_string()),
                        timestamp,
                    )
                })
                .collect();
            let rows = sort_entries(resolved, settings.sort_descending);
            print_rows(&rows, json)
        }
        Commands::Watch {
            vault,
            quiet_ms,
            note,
            ..
        } => watch(&settings, &vault, &note, Duration::from_millis(quiet_ms)),
        Commands::Completions { .. } => Ok(()),
    }
}

fn command_vault(command: &Commands) -> Option<&Path> {
    match command {
        Commands::Resolve { vault, .. } | Commands::Sort { vault, .. } => vault.vault.as_deref(),
        Commands::Backlinks { vault, .. } | Commands::Watch { vault, .. } => Some(vault),
        Commands::Completions { .. } => None,
    }
}

fn command_ascending(command: &Commands) -> bool {
    match command {
        Commands::Sort { ascending, .. }
        | Commands::Backlinks { ascending, .. }
        | Commands::Watch { ascending, .. } => *ascending,
        Commands::Resolve { .. } | Commands::Completions { .. } => false,
    }
}

fn load_settings(config: Option<&Path>, vault: Option<&Path>) -> Result<Settings> {
    match (config, vault) {
        (Some(path), _) => Settings::load(path).context("Failed to load settings"),
        (None, Some(vault)) => open_vault(vault)?
            .settings()
            .context("Failed to load vault settings"),
        (None, None) => Ok(Settings::default()),
    }
}

/// Handle to the stderr log level, which a settings file may raise after
/// the subscriber is installed.
struct LogLevel(reload::Handle<LevelFilter, tracing_subscriber::Registry>);

impl LogLevel {
    fn raise_to_debug(&self) {
        if let Err(e) = self.0.reload(LevelFilter::DEBUG) {
            tracing::warn!(error = %e, "cannot raise log level");
        }
    }
}

fn init_tracing(debug: bool) -> LogLevel {
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let (filter, handle) = reload::Layer::new(level);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
    LogLevel(handle)
}

fn open_vault(path: &Path) -> Result<Vault> {
    Vault::open(path).with_context(|| format!("Failed to open vault at {}", path.display()))
}

fn open_lookup(vault: Option<&Path>) -> Result<Box<dyn MetadataLookup>> {
    Ok(match vault {
        Some(path) => Box::new(open_vault(path)?),
        None => Box::new(NoMetadata),
    })
}

fn backlink_label(backlink: &Backlink) -> String {
    backlink.label.clone()
}

fn print_rows(rows: &[Row], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
    } else {
        print!("{}", format_table(rows));
    }
    Ok(())
}

fn watch(settings: &Settings, vault_path: &Path, note: &str, quiet: Duration) -> Result<()> {
    let vault = open_vault(vault_path)?;
    let watcher = VaultWatcher::start(vault.root()).context("Failed to start vault watcher")?;
    let reorderer = Reorderer::new(settings.clone(), backlink_label);

    let initial = vault.backlinks(note)?;
    let mut surface = PrintSurface::new(SurfaceKind::Document, initial, io::stdout());
    if !matches!(reorderer.on_change(&mut surface, &vault), Outcome::Applied { .. }) {
        surface.print();
    }

    loop {
        let batch = watcher.next_batch(quiet);
        if batch.is_empty() {
            tracing::warn!("vault watcher stopped");
            return Ok(());
        }
        tracing::debug!(events = batch.len(), "vault changed");

        surface.refresh(vault.backlinks(note)?);
        match reorderer.on_change(&mut surface, &vault) {
            Outcome::Unchanged | Outcome::Skipped(SkipReason::Disabled) => surface.print(),
            Outcome::Applied { moved } => tracing::debug!(moved, "re-sorted backlinks"),
            Outcome::Skipped(reason) => tracing::debug!(?reason, "skipped re-sort"),
        }
    }
}
