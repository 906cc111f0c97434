// ClipGuardian - Point d'entree
// Historique de presse-papiers chiffre, navigable par raccourcis
//
// Ce binaire lance le moteur ClipGuardian sur le presse-papiers systeme,
// ou inspecte l'historique persiste sans demarrer la boucle.
//
// # Commandes
// - `run`         : demarre le moteur (commande par defaut), Ctrl+C pour arreter
// - `list`        : affiche l'historique persiste, filtre optionnel
// - `clear`       : efface l'historique persiste
// - `init-config` : ecrit un fichier de configuration par defaut
//
// # Configuration
// Le fichier <data_dir>/ClipGuardian/config.toml est lu au lancement ;
// absent ou invalide, les valeurs par defaut s'appliquent.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use clipguardian::clipboard::SystemClipboard;
use clipguardian::config::settings::{default_config_path, default_data_dir};
use clipguardian::config::Settings;
use clipguardian::constants::DEFAULT_PREVIEW_LENGTH;
use clipguardian::navigation::UiEvent;
use clipguardian::storage::Vault;
use clipguardian::GuardianLoop;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Historique de presse-papiers chiffre.
#[derive(Debug, Parser)]
#[command(name = "clipguardian", version, about = "Encrypted clipboard history engine")]
struct Args {
    /// Repertoire de l'historique et de la cle
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Fichier de configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosite (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Demarre le moteur sur le presse-papiers systeme
    Run,
    /// Affiche l'historique persiste
    List {
        /// Filtre insensible a la casse
        #[arg(long)]
        search: Option<String>,
        /// Longueur maximale de l'apercu
        #[arg(long, default_value_t = DEFAULT_PREVIEW_LENGTH)]
        width: usize,
    },
    /// Efface l'historique persiste
    Clear,
    /// Ecrit la configuration par defaut
    InitConfig {
        /// Remplace un fichier existant
        #[arg(long)]
        force: bool,
    },
}

fn setup_logging(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).with_target(verbose > 1).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);
    let config_path = args.config.clone().unwrap_or_else(default_config_path);

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run(&data_dir, Settings::load(&config_path)).await,
        Command::List { search, width } => list(&data_dir, &Settings::load(&config_path), search.as_deref(), width),
        Command::Clear => clear(&data_dir),
        Command::InitConfig { force } => init_config(&config_path, force),
    }
}

async fn run(data_dir: &std::path::Path, settings: Settings) -> Result<()> {
    let vault = Arc::new(Vault::new(data_dir));
    let (engine, handle) = GuardianLoop::new(settings, vault, Box::new(SystemClipboard::new()))
        .context("failed to start guardian loop")?;

    let mut events = handle.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                UiEvent::ShowPreview { preview, .. } => {
                    debug!(position = %preview.position_label(), format = %preview.entry.format(), "preview shown")
                }
                UiEvent::HistoryChanged { revision, len } => debug!(revision, len, "history changed"),
                other => debug!(?other, "ui event"),
            }
        }
    });

    let stop = handle.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl+C");
            return;
        }
        info!("interrupt received, stopping");
        stop.shutdown();
    });

    info!(data_dir = %data_dir.display(), "ClipGuardian running, press Ctrl+C to stop");
    let stats = engine.run().await;
    if stats.failures > 0 {
        warn!(failures = stats.failures, "some history saves failed");
    }
    Ok(())
}

fn list(data_dir: &std::path::Path, settings: &Settings, search: Option<&str>, width: usize) -> Result<()> {
    let vault = Vault::new(data_dir);
    let store = vault.load(settings.history.capacity)?;
    let entries: Vec<_> = match search {
        Some(query) => store.search(query).collect(),
        None => store.iter().collect(),
    };
    if entries.is_empty() {
        println!("(history is empty)");
        return Ok(());
    }
    for (i, entry) in entries.iter().enumerate() {
        let captured = chrono::DateTime::from_timestamp_millis(entry.captured_at())
            .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        let pin = if entry.is_pinned() { "*" } else { " " };
        println!(
            "{:>3}{} #{:<5} {} {:<8} {:>8}B  {}",
            i + 1,
            pin,
            entry.id().0,
            captured,
            entry.format(),
            entry.size(),
            entry.preview(width)
        );
    }
    Ok(())
}

fn clear(data_dir: &std::path::Path) -> Result<()> {
    let vault = Vault::new(data_dir);
    vault.save(&[]).context("failed to clear history")?;
    println!("History cleared.");
    Ok(())
}

fn init_config(path: &std::path::Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Settings::save_default(path).context("failed to write configuration")?;
    println!("Configuration written to {}", path.display());
    Ok(())
}
