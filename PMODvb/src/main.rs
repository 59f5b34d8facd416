use anyhow::{Result, anyhow};
use pmoconfig::{Config, get_config};
use pmodvb::{DvbConfigExt, DvbDaemonSource};
use pmosource::{BrowseEvent, BrowseSource, MediaEntry};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    if !config.get_log_enable_console().unwrap_or(true) {
        return;
    }

    let default_level = config
        .get_log_min_level()
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Browses `container_id` and prints every event as one JSON line.
///
/// Returns the listed entries, or the delivered failure.
async fn browse_and_print(
    source: &DvbDaemonSource,
    container_id: Option<&str>,
    cancel: CancellationToken,
) -> Result<Vec<MediaEntry>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<BrowseEvent>();

    let browse = async move {
        let mut tx = tx;
        source.browse(container_id, &mut tx, cancel).await;
    };

    let print = async {
        let mut entries = Vec::new();
        while let Some(event) = rx.recv().await {
            match event {
                BrowseEvent::Entry { entry, remaining } => {
                    let line = serde_json::json!({
                        "parent": container_id,
                        "remaining": remaining,
                        "entry": &entry,
                    });
                    println!("{}", line);
                    entries.push(entry);
                }
                BrowseEvent::Done => {
                    println!("{}", serde_json::json!({ "parent": container_id, "done": true }));
                }
                BrowseEvent::Failed(err) => return Err(anyhow!(err)),
            }
        }
        Ok(entries)
    };

    let ((), entries) = tokio::join!(browse, print);
    entries
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = get_config();
    init_tracing(&config);

    if !config.get_dvb_enabled()? {
        warn!("DVB source is disabled (sources.dvb.enabled = false)");
        return Ok(());
    }

    let settings = config.dvb_settings()?;
    let source = DvbDaemonSource::connect(settings).await?;
    info!("{} ({}) connected", source.name(), source.id());

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    match std::env::args().nth(1) {
        Some(container_id) => {
            browse_and_print(&source, Some(container_id.as_str()), cancel).await?;
        }
        None => {
            let groups = browse_and_print(&source, None, cancel.clone()).await?;
            for group in groups.iter().filter(|g| g.is_container()) {
                if cancel.is_cancelled() {
                    break;
                }
                browse_and_print(&source, Some(group.id()), cancel.clone()).await?;
            }
        }
    }

    Ok(())
}
