use anyhow::{bail, Context, Result};
use bidwatch::core::config::Config;
use bidwatch::core::tracing_init::init_tracing;
use bidwatch::dispatch::bark::BarkNotifier;
use bidwatch::dispatch::qbittorrent::QbtClient;
use bidwatch::dispatch::Dispatcher;
use bidwatch::models::torrent::{Torrent, TorrentId, TorrentSet};
use bidwatch::monitor::poll::PollLoop;
use bidwatch::site::client::SiteClient;
use std::env;
use std::path::PathBuf;
use tracing::{error, info};

/// Command line: `bidwatch [config.toml] [--probe <ID>]`
struct Args {
    config_path: PathBuf,
    probe: Option<TorrentId>,
}

fn parse_args() -> Result<Args> {
    let mut config_path = None;
    let mut probe = None;
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        if arg == "--probe" {
            let id = args.next().context("--probe requires a torrent id")?;
            probe = Some(
                id.parse::<TorrentId>()
                    .context(format!("Invalid torrent id '{}'", id))?,
            );
        } else if config_path.is_none() {
            config_path = Some(PathBuf::from(arg));
        } else {
            bail!("Unexpected argument '{}'", arg);
        }
    }

    Ok(Args {
        config_path: config_path.unwrap_or_else(|| PathBuf::from("config.toml")),
        probe,
    })
}

fn main() -> Result<()> {
    let args = parse_args()?;

    // Load and validate configuration
    let config = Config::from_file(&args.config_path)
        .context(format!(
            "Failed to load configuration from '{}'. \
            Copy config.example.toml to config.toml and adjust the values.",
            args.config_path.display()
        ))?;

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_tracing(&config.logging)?;

    // One thread: cycles, enqueues and notifications run strictly in order
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config, args))
}

async fn async_main(config: Config, args: Args) -> Result<()> {
    info!(
        config_path = %args.config_path.display(),
        base_url = %config.site.base_url,
        download_client = %config.download.url,
        save_path = %config.download.save_path,
        interval_seconds = config.poll.interval_secs,
        log_level = %config.logging.level,
        "Bidding monitor starting"
    );

    let notifier = BarkNotifier::new(&config.notify)
        .context("Failed to create notification client")?;

    let dispatcher = Dispatcher::new(
        config.site.base_url.clone(),
        config.site.passkey.clone(),
        QbtClient::new(&config.download),
        notifier,
    );

    if let Some(id) = args.probe {
        return probe(&dispatcher, id).await;
    }

    let source = SiteClient::new(&config.site)
        .context("Failed to create listing client")?;

    let fatal = PollLoop::new(source, dispatcher, config.poll.interval())
        .run()
        .await;

    error!(fatal = true, error = %fatal, "Monitor stopped");
    Err(fatal.into())
}

/// Push a single known torrent through the download client and notifier
async fn probe(dispatcher: &Dispatcher<QbtClient, BarkNotifier>, id: TorrentId) -> Result<()> {
    info!(id, "Probing download client");

    let batch: TorrentSet = [Torrent::new(id, "probe")].into_iter().collect();
    let outcome = dispatcher.dispatch(&batch).await;

    info!(outcome = ?outcome, "Probe finished");

    if !outcome.is_success() {
        bail!("Probe push of torrent {} failed", id);
    }

    Ok(())
}
