use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::time::{Instant, sleep};
use tracing_subscriber::EnvFilter;

use postbox_core::impls::{FileStore, HttpTransport, HttpTransportConfig};
use postbox_core::ports::TransportClient;
use postbox_core::{QueueManager, RawPayload, StatusCode, TransportError};

/// Settings read from the environment.
#[derive(Debug, Clone)]
struct CliConfig {
    store_path: PathBuf,
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
    drain_timeout: Duration,
}

impl CliConfig {
    fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            store_path: std::env::var("POSTBOX_STORE_PATH")
                .unwrap_or_else(|_| "postbox-store.json".to_string())
                .into(),
            endpoint: std::env::var("POSTBOX_ENDPOINT").ok(),
            api_key: std::env::var("POSTBOX_API_KEY").ok(),
            timeout: secs_from_env("POSTBOX_TIMEOUT_SECS", 30)?,
            drain_timeout: secs_from_env("POSTBOX_DRAIN_SECS", 10)?,
        })
    }
}

fn secs_from_env(name: &str, default: u64) -> anyhow::Result<Duration> {
    match std::env::var(name) {
        Ok(raw) => {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("{name} must be a whole number of seconds, got {raw:?}"))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

/// POSTBOX_ENDPOINT が無いときの送信先：stdout に出して 200 を返す
struct StdoutTransport;

#[async_trait]
impl TransportClient for StdoutTransport {
    async fn deliver(&self, body: &str) -> Result<StatusCode, TransportError> {
        println!("{body}");
        Ok(StatusCode::OK)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = CliConfig::from_env()?;

    // (A) 送信クライアントを用意
    let transport: Arc<dyn TransportClient> = match &config.endpoint {
        Some(endpoint) => {
            let mut http = HttpTransportConfig::new(endpoint.clone()).with_timeout(config.timeout);
            if let Some(api_key) = &config.api_key {
                http = http.with_api_key(api_key.clone());
            }
            Arc::new(HttpTransport::new(http).context("failed to build HTTP transport")?)
        }
        None => Arc::new(StdoutTransport),
    };

    // (B) ストアを開いて QueueManager を組み立てる
    let store = FileStore::open(&config.store_path)
        .with_context(|| format!("failed to open store at {}", config.store_path.display()))?;
    let manager = QueueManager::builder()
        .transport(transport)
        .store(Arc::new(store))
        .build()?;

    // (C) 前回のプロセスで残った payload を回収
    let recovered = manager.restart()?;
    tracing::info!(recovered, store = %config.store_path.display(), "queue manager started");

    // (D) 引数の JSON を投入
    for arg in std::env::args().skip(1) {
        serde_json::from_str::<serde_json::Value>(&arg)
            .with_context(|| format!("argument is not valid JSON: {arg}"))?;
        let key = manager.submit(&RawPayload::new(arg))?;
        tracing::info!(%key, "payload submitted");
    }

    // (E) ストアが空になるか、ワーカーが止まるか、期限まで待つ
    let deadline = Instant::now() + config.drain_timeout;
    loop {
        let status = manager.status();
        if status.stored == Some(0) || !status.worker.is_active() || Instant::now() >= deadline {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = sleep(Duration::from_millis(50)) => {}
        }
    }

    manager.shutdown_and_join().await;
    let status = manager.status();
    tracing::info!(
        delivered = status.counts.delivered,
        rejected = status.counts.rejected,
        requeued = status.counts.requeued,
        left_in_store = ?status.stored,
        "queue manager stopped"
    );
    println!("{}", serde_json::to_string(&status.counts)?);
    Ok(())
}
