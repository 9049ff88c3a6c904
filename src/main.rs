use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;

use treemirror::config::{self, MirrorConfig, Overrides};
use treemirror::hash::Fingerprinter;
use treemirror::logging;
use treemirror::sync::{ExcludePatterns, MirrorEngine, Scheduler};

#[derive(Parser)]
#[command(
    name = "treemirror",
    version,
    about = "One-way periodic folder mirroring"
)]
struct Cli {
    /// Path to the source folder (or file)
    source: PathBuf,

    /// Path to the replica folder (or file)
    replica: PathBuf,

    /// Synchronization interval in seconds
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Path to the log file
    log_file: PathBuf,

    /// Path to config file [default: ~/.config/treemirror/config.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upper bound for the retry delay after failed passes, in seconds
    #[arg(long, value_name = "SECS")]
    max_backoff: Option<u64>,

    /// Exclude entries matching this glob (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,

    /// Read size used when fingerprinting files
    #[arg(long, value_name = "BYTES")]
    chunk_size: Option<usize>,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Resolve when Ctrl-C (or SIGTERM on Unix) arrives.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = config::load_config(cli.config.as_deref())?;
    let cfg = MirrorConfig::resolve(
        cli.source,
        cli.replica,
        cli.interval,
        cli.log_file,
        file_config,
        Overrides {
            max_backoff_secs: cli.max_backoff,
            chunk_size: cli.chunk_size,
            exclude: cli.exclude,
        },
    )?;

    logging::init(&cfg.log_file, cli.verbose)?;

    let exclude = ExcludePatterns::from_patterns(cfg.exclude.as_slice())
        .context("Invalid exclude pattern")?;

    tracing::info!("starting folder synchronization");
    tracing::info!(source = %cfg.source.display(), "source folder");
    tracing::info!(replica = %cfg.replica.display(), "replica folder");
    tracing::info!(
        interval_secs = cfg.interval.as_secs(),
        max_backoff_secs = cfg.max_backoff.as_secs(),
        "interval"
    );
    if !exclude.patterns().is_empty() {
        tracing::info!(patterns = ?exclude.patterns(), "exclude patterns");
    }

    let engine = MirrorEngine::new(&cfg.source, &cfg.replica)
        .with_fingerprinter(Fingerprinter::with_chunk_size(cfg.chunk_size))
        .with_exclude(exclude);
    let mut scheduler = Scheduler::new(engine, cfg.interval, cfg.max_backoff);

    if cli.once {
        scheduler
            .run_once()
            .await
            .context("synchronization pass failed")?;
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => {
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for shutdown signals");
                // keep the sender alive so the scheduler keeps running
                std::future::pending::<()>().await;
                drop(shutdown_tx);
            }
        }
    });

    scheduler.run(shutdown_rx).await;
    Ok(())
}
