//! Shared test utilities and fixtures
//!
//! A wiremock catalog backend plus helpers to drive an HTTP-backed app.

#![allow(dead_code)]

use std::path::Path;
use std::time::{Duration, Instant};

use ratatui::{Terminal, backend::TestBackend};
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelf_engine::{App, AppOptions, Catalog, HistoryStore, HttpCatalog, Location, UiOptions};

/// Items per page used by every end-to-end app.
pub const PAGE_SIZE: u32 = 2;

pub fn base_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/api/v1", server.uri())).expect("valid URL")
}

pub fn list_body(page: u32, total_games: u32, games: &[(u32, &str)]) -> serde_json::Value {
    let total_pages = total_games.div_ceil(PAGE_SIZE);
    json!({
        "data": games
            .iter()
            .map(|(id, name)| json!({ "appid": id, "name": name }))
            .collect::<Vec<_>>(),
        "meta": {
            "page": page,
            "limit": PAGE_SIZE,
            "totalGames": total_games,
            "totalPages": total_pages,
            "hasNextPage": page < total_pages,
            "hasPrevPage": page > 1
        }
    })
}

/// Serve `games` as a paged catalog, one mock per page.
pub async fn mount_catalog(server: &MockServer, games: &[(u32, &str)]) {
    let total = games.len() as u32;
    for (index, chunk) in games.chunks(PAGE_SIZE as usize).enumerate() {
        let page = index as u32 + 1;
        Mock::given(method("GET"))
            .and(path("/api/v1/steam"))
            .and(query_param("page", page.to_string()))
            .and(query_param("limit", PAGE_SIZE.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_body(page, total, chunk)))
            .mount(server)
            .await;
    }
}

pub async fn mount_details(server: &MockServer, appid: u32, data: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/steam/{appid}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}

pub fn app_for(server: &MockServer, location: &str, history_dir: &Path) -> App<HttpCatalog> {
    let api = HttpCatalog::new(base_url(server), Duration::from_secs(5)).expect("client");
    App::new(
        Catalog::new(api, PAGE_SIZE, 10),
        AppOptions {
            location: Location::parse(location),
            debounce: Duration::from_millis(50),
            ui: UiOptions {
                ascii_only: true,
                high_contrast: false,
            },
            history: HistoryStore::new(history_dir.join("search_history.json")),
        },
    )
}

/// Tick until no fetch is outstanding.
pub async fn settle(app: &mut App<HttpCatalog>) {
    for _ in 0..1000 {
        app.tick(Instant::now());
        if app.in_flight() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("fetches did not finish");
}

pub fn shown_names(app: &App<HttpCatalog>) -> Vec<String> {
    app.visible_games().iter().map(|g| g.name.clone()).collect()
}

pub fn render(app: &App<HttpCatalog>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
    terminal
        .draw(|frame| shelf_tui::draw(frame, app))
        .expect("draw");
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

pub const CATALOG: [(u32, &str); 6] = [
    (10, "Counter-Strike"),
    (70, "Half-Life"),
    (220, "Half-Life 2"),
    (400, "Portal"),
    (570, "Dota 2"),
    (620, "Portal 2"),
];
