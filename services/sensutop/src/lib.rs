//! Sensutop - terminal dashboard for Sensu monitoring events
//!
//! Polls every configured Sensu API endpoint in the background and shows the
//! combined event list as a severity-colored table.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod event;
pub mod io;
pub mod poller;
pub mod render;
pub mod terminal;
pub mod theme;

pub use config::{load_config, Config, EndpointConfig};
pub use dashboard::{Dashboard, DashboardPhase};
pub use error::{Result, SensutopError};
pub use event::{Event, Severity};
pub use poller::EndpointPoller;

use std::sync::Arc;

use crossterm::event::EventStream;

use crate::io::ReqwestHttpClient;

/// Run the dashboard with the given configuration until the user quits
pub async fn run(config: Config) -> Result<()> {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::new(config.request_timeout())?);

    tracing::debug!(
        "Endpoints: {}, fetch interval: {:?}, request timeout: {:?}",
        config.api_endpoints.len(),
        config.fetch_interval(),
        config.request_timeout()
    );

    let mut terminal = terminal::setup()?;

    let mut dashboard = Dashboard::new(config, http);
    dashboard.start_all();
    tracing::info!("Sensutop started");

    let mut input = EventStream::new();
    let result = dashboard.run(&mut terminal, &mut input).await;

    let restored = terminal::restore(&mut terminal);
    if let (Err(_), Err(e)) = (&result, &restored) {
        tracing::error!("Restoring the terminal failed: {}", e);
    }
    tracing::info!("Sensutop stopped");

    terminal::first_error([result, restored])
}
