use lazy_static::lazy_static;
use std::{env, io};
use tokio::task::JoinHandle;
use tracing::{info, warn, Level};
use tracing_loki::url::Url;
use tracing_loki::{BackgroundTask, BackgroundTaskController};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{filter, fmt};

const SERVICE_NAME: &str = "hku-seminar-sync";

lazy_static! {
    static ref LOKI_URL: Option<String> = env::var("LOKI_URL").ok();
}

fn build_loki_layer(
    base_url: Url,
) -> (
    tracing_loki::Layer,
    BackgroundTaskController,
    BackgroundTask,
) {
    tracing_loki::builder()
        .label("service", SERVICE_NAME)
        .expect("Failed setting label")
        .build_controller_url(base_url)
        .expect("Failed building Loki layer")
}

/// Initializes stdout logging, shipping to Loki as well when `LOKI_URL` is
/// set and reachable. Returns the controller and task handle to shut the
/// shipper down cleanly at the end of the run.
pub async fn setup_loki() -> Option<(BackgroundTaskController, JoinHandle<()>)> {
    let filter = filter::Targets::new()
        .with_target("hku_seminar_sync", Level::TRACE)
        .with_default(Level::WARN);

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stdout));

    let Some(base_url) = LOKI_URL.as_ref() else {
        registry.init();
        warn!("Loki URL not provided. Continuing without it.");
        return None;
    };
    let base_url: Url = base_url.parse().expect("Invalid URL format");

    if reqwest::get(base_url.clone()).await.is_err() {
        registry.init();
        warn!("Couldn't connect to Loki. Continuing without it.");
        return None;
    }

    let (layer, controller, task) = build_loki_layer(base_url);
    registry.with(layer).init();
    let handle = tokio::spawn(task);

    info!("Loki initialized");

    Some((controller, handle))
}
