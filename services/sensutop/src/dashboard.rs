//! Dashboard controller: owns the pollers and drives the render loop

use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use crossterm::event::{Event as TerminalEvent, KeyCode, KeyEvent, KeyEventKind};
use futures::{Stream, StreamExt};
use ratatui::backend::Backend;
use ratatui::Terminal;

use crate::config::Config;
use crate::event::Event;
use crate::io::HttpClient;
use crate::poller::EndpointPoller;
use crate::render;
use crate::theme::Theme;
use crate::SensutopError;

/// Lifecycle of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardPhase {
    Idle,
    Running,
    Stopped,
}

/// Owns one poller per endpoint and paints their combined events
pub struct Dashboard {
    config: Config,
    http: Arc<dyn HttpClient>,
    pollers: BTreeMap<String, EndpointPoller>,
    theme: Theme,
    phase: DashboardPhase,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("pollers", &self.pollers)
            .field("phase", &self.phase)
            .finish()
    }
}

impl Dashboard {
    pub fn new(config: Config, http: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http,
            pollers: BTreeMap::new(),
            theme: Theme::default(),
            phase: DashboardPhase::Idle,
        }
    }

    pub fn phase(&self) -> DashboardPhase {
        self.phase
    }

    pub fn pollers(&self) -> &BTreeMap<String, EndpointPoller> {
        &self.pollers
    }

    /// Create and start one poller per configured endpoint
    pub fn start_all(&mut self) {
        if self.phase != DashboardPhase::Idle {
            tracing::warn!("Pollers already started (phase {:?})", self.phase);
            return;
        }

        let interval = self.config.fetch_interval();
        for (name, endpoint) in &self.config.api_endpoints {
            let mut poller = EndpointPoller::new(name, endpoint, Arc::clone(&self.http), interval);
            poller.start();
            self.pollers.insert(name.clone(), poller);
        }

        tracing::info!("Started {} pollers", self.pollers.len());
        self.phase = DashboardPhase::Running;
    }

    /// Stop every poller and wait for their loops to exit
    pub async fn stop_all(&mut self) {
        for (name, poller) in &self.pollers {
            tracing::debug!("Stopping background poller for '{}'", name);
            poller.stop();
        }
        for poller in self.pollers.values_mut() {
            poller.join().await;
        }

        if self.phase != DashboardPhase::Stopped {
            tracing::info!("Stopped {} pollers", self.pollers.len());
        }
        self.phase = DashboardPhase::Stopped;
    }

    /// Concatenate every poller's latest events, in endpoint name order, up to `limit`
    pub fn collect_events(&self, limit: usize) -> Vec<Event> {
        let mut events = Vec::new();
        for poller in self.pollers.values() {
            let remaining = limit.saturating_sub(events.len());
            if remaining == 0 {
                break;
            }
            events.extend(poller.latest_events().iter().take(remaining).cloned());
        }
        events
    }

    /// Paint the current events once
    pub fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> crate::Result<()> {
        terminal
            .draw(|frame| {
                let limit = render::visible_rows(frame.area());
                let events = self.collect_events(limit);
                tracing::trace!("Painting {} of at most {} events", events.len(), limit);
                render::draw(frame, &events, &self.theme);
            })
            .map_err(|e| SensutopError::Terminal(e.to_string()))?;
        Ok(())
    }

    /// Redraw until `q` is pressed, then stop all pollers.
    ///
    /// Starts the pollers first if that has not happened yet.
    pub async fn run<B, S>(
        &mut self,
        terminal: &mut Terminal<B>,
        input: &mut S,
    ) -> crate::Result<()>
    where
        B: Backend,
        S: Stream<Item = io::Result<TerminalEvent>> + Unpin,
    {
        if self.phase == DashboardPhase::Idle {
            self.start_all();
        }

        let result = self.render_loop(terminal, input).await;
        self.stop_all().await;
        result
    }

    async fn render_loop<B, S>(
        &self,
        terminal: &mut Terminal<B>,
        input: &mut S,
    ) -> crate::Result<()>
    where
        B: Backend,
        S: Stream<Item = io::Result<TerminalEvent>> + Unpin,
    {
        let refresh = self.config.refresh_interval();
        let mut input_open = true;

        loop {
            self.draw(terminal)?;

            tokio::select! {
                maybe_event = input.next(), if input_open => match maybe_event {
                    Some(Ok(TerminalEvent::Key(key))) if is_quit_key(&key) => {
                        tracing::info!("Quit requested");
                        return Ok(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        // A failing tty keeps yielding errors; wait out a refresh
                        // period before polling it again.
                        tracing::warn!("Reading terminal input failed: {}", e);
                        tokio::time::sleep(refresh).await;
                    }
                    None => {
                        tracing::debug!("Terminal input closed");
                        input_open = false;
                    }
                },
                _ = tokio::time::sleep(refresh) => {}
            }
        }
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press && key.code == KeyCode::Char('q')
}
