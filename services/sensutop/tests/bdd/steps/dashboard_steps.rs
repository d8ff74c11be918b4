//! BDD step definitions for dashboard feature

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event as TerminalEvent, KeyCode, KeyEvent, KeyModifiers};
use cucumber::{given, then, when};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::style::Color;
use ratatui::Terminal;

use sensutop::io::ReqwestHttpClient;
use sensutop::{Config, Dashboard, DashboardPhase, EndpointConfig, Event};

use crate::mock_api::MockSensuApi;
use crate::steps::poller_steps::wait_for_fetch_count;
use crate::world::SensutopWorld;

fn dashboard_config(world: &SensutopWorld) -> Config {
    Config {
        api_endpoints: world
            .apis
            .iter()
            .map(|(name, api)| {
                let endpoint = EndpointConfig {
                    host: api.addr.ip().to_string(),
                    port: api.addr.port(),
                    ..Default::default()
                };
                (name.clone(), endpoint)
            })
            .collect(),
        fetch_interval_seconds: 30,
        request_timeout_seconds: 5,
        refresh_interval_ms: 20,
    }
}

fn build_dashboard(world: &SensutopWorld) -> Dashboard {
    let config = dashboard_config(world);
    let client = ReqwestHttpClient::new(config.request_timeout()).expect("HTTP client");
    Dashboard::new(config, Arc::new(client))
}

fn screen(world: &SensutopWorld) -> &Buffer {
    world.screen.as_ref().expect("dashboard not drawn")
}

fn row_text(buffer: &Buffer, row: u16) -> String {
    (0..buffer.area.width)
        .map(|x| buffer[(x, row)].symbol())
        .collect()
}

fn parse_color(name: &str) -> Color {
    match name {
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "red" => Color::Red,
        "black" => Color::Black,
        other => panic!("Unknown color: {}", other),
    }
}

#[given(expr = "a Sensu API {string} serving {int} events")]
async fn named_api_serving(world: &mut SensutopWorld, name: String, count: usize) {
    let events: Vec<Event> = (0..count)
        .map(|i| Event {
            client: format!("{name}-{i}"),
            check: "check".to_string(),
            output: "output".to_string(),
            status: 0,
        })
        .collect();
    let body = serde_json::to_string(&events).expect("events serialize");
    world.apis.insert(name, MockSensuApi::start(&body).await);
}

#[given("a dashboard without endpoints")]
fn dashboard_without_endpoints(world: &mut SensutopWorld) {
    world.apis.clear();
    world.dashboard = Some(build_dashboard(world));
}

#[when("the dashboard starts all pollers")]
fn dashboard_starts(world: &mut SensutopWorld) {
    let mut dashboard = build_dashboard(world);
    dashboard.start_all();
    world.dashboard = Some(dashboard);
}

#[when("the dashboard has fetched from every endpoint")]
async fn dashboard_fetched(world: &mut SensutopWorld) {
    if world.dashboard.is_none() {
        dashboard_starts(world);
    }
    let dashboard = world.dashboard.as_ref().expect("dashboard not built");
    for poller in dashboard.pollers().values() {
        wait_for_fetch_count(poller, 1).await;
    }
}

#[when(expr = "the dashboard is drawn on a {int}x{int} terminal")]
fn dashboard_drawn(world: &mut SensutopWorld, width: u16, height: u16) {
    let dashboard = world.dashboard.as_ref().expect("dashboard not built");
    let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("test terminal");
    dashboard.draw(&mut terminal).expect("draw failed");
    world.screen = Some(terminal.backend().buffer().clone());
}

#[when(expr = "the dashboard is running on a {int}x{int} terminal")]
fn dashboard_running(world: &mut SensutopWorld, width: u16, height: u16) {
    let mut dashboard = build_dashboard(world);
    let (keys, mut input) = futures::channel::mpsc::unbounded();
    let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("test terminal");

    world.running = Some(tokio::spawn(async move {
        let result = dashboard.run(&mut terminal, &mut input).await;
        (dashboard, result)
    }));
    world.keys = Some(keys);
}

#[when(expr = "the user presses {string}")]
fn user_presses(world: &mut SensutopWorld, key: String) {
    let code = match key.as_str() {
        "esc" => KeyCode::Esc,
        single => KeyCode::Char(single.chars().next().expect("empty key")),
    };
    let event = TerminalEvent::Key(KeyEvent::new(code, KeyModifiers::NONE));
    let keys = world.keys.as_ref().expect("dashboard not running");
    keys.unbounded_send(Ok(event)).expect("input closed");
}

#[then(expr = "the dashboard has {int} poller(s)")]
fn dashboard_has_pollers(world: &mut SensutopWorld, count: usize) {
    let dashboard = world.dashboard.as_ref().expect("dashboard not built");
    assert_eq!(dashboard.pollers().len(), count);
}

#[then(expr = "the dashboard has a poller named {string}")]
fn dashboard_has_named_poller(world: &mut SensutopWorld, name: String) {
    let dashboard = world.dashboard.as_ref().expect("dashboard not built");
    assert!(dashboard.pollers().contains_key(&name), "missing '{name}'");
}

#[then(expr = "collecting {int} events returns {int}")]
fn collecting_returns(world: &mut SensutopWorld, limit: usize, expected: usize) {
    let dashboard = world.dashboard.as_ref().expect("dashboard not built");
    assert_eq!(dashboard.collect_events(limit).len(), expected);
}

#[then(expr = "row {int} reads {string}")]
fn row_reads(world: &mut SensutopWorld, row: u16, expected: String) {
    assert_eq!(row_text(screen(world), row).trim(), expected);
}

#[then(expr = "row {int} is blank")]
fn row_is_blank(world: &mut SensutopWorld, row: u16) {
    assert_eq!(row_text(screen(world), row).trim(), "");
}

#[then(expr = "row {int} is painted {word}")]
fn row_is_painted(world: &mut SensutopWorld, row: u16, color: String) {
    let buffer = screen(world);
    // column 0 is the indent; the styled row starts at column 1
    assert_eq!(buffer[(1, row)].fg, parse_color(&color));
}

#[then(expr = "{int} event rows are shown")]
fn event_rows_shown(world: &mut SensutopWorld, expected: usize) {
    let buffer = screen(world);
    let shown = (1..buffer.area.height)
        .filter(|&row| !row_text(buffer, row).trim().is_empty())
        .count();
    assert_eq!(shown, expected);
}

#[then(expr = "the dashboard stops within {int} second(s)")]
async fn dashboard_stops_within(world: &mut SensutopWorld, seconds: u64) {
    let running = world.running.take().expect("dashboard not running");
    let finished = tokio::time::timeout(Duration::from_secs(seconds), running)
        .await
        .expect("dashboard did not stop in time")
        .expect("dashboard task panicked");
    world.finished = Some(finished);
}

#[then("the dashboard is still running")]
async fn dashboard_still_running(world: &mut SensutopWorld) {
    tokio::time::sleep(Duration::from_millis(100)).await;
    let running = world.running.as_ref().expect("dashboard not running");
    assert!(!running.is_finished());
}

#[then("every poller has stopped")]
fn every_poller_stopped(world: &mut SensutopWorld) {
    let (dashboard, result) = world.finished.as_ref().expect("dashboard not finished");
    assert!(result.is_ok(), "{result:?}");
    assert_eq!(dashboard.phase(), DashboardPhase::Stopped);
    assert!(dashboard.pollers().values().all(|p| !p.is_running()));
}
