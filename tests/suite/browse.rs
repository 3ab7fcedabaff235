//! Browsing, searching and detail flows against a mock backend.

use std::time::{Duration, Instant};

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelf_engine::{AppId, ArtworkState, FetchState};

use crate::common::{
    CATALOG, PAGE_SIZE, app_for, list_body, mount_catalog, mount_details, settle, shown_names,
};

#[tokio::test]
async fn pages_forward_and_back() {
    let server = MockServer::start().await;
    mount_catalog(&server, &CATALOG).await;
    let dir = TempDir::new().unwrap();

    let mut app = app_for(&server, "", dir.path());
    app.start();
    settle(&mut app).await;
    assert_eq!(shown_names(&app), vec!["Counter-Strike", "Half-Life"]);
    assert_eq!(app.total_pages(), Some(3));

    assert!(app.next_page());
    settle(&mut app).await;
    assert_eq!(app.location().to_string(), "/?page=2");
    assert_eq!(shown_names(&app), vec!["Half-Life 2", "Portal"]);

    assert!(app.navigate_back());
    settle(&mut app).await;
    assert_eq!(app.location().to_string(), "/");
    assert_eq!(shown_names(&app), vec!["Counter-Strike", "Half-Life"]);
    assert!(app.can_go_forward());
}

#[tokio::test]
async fn page_past_the_end_is_clamped() {
    let server = MockServer::start().await;
    mount_catalog(&server, &CATALOG).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/steam"))
        .and(query_param("page", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(9, 6, &[])))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let mut app = app_for(&server, "?page=9", dir.path());
    app.start();
    settle(&mut app).await;

    assert_eq!(app.location().to_string(), "/?page=3");
    assert_eq!(app.current_page(), 3);
    assert_eq!(shown_names(&app), vec!["Dota 2", "Portal 2"]);
}

#[tokio::test]
async fn debounced_typing_searches_once() {
    let server = MockServer::start().await;
    mount_catalog(&server, &CATALOG).await;
    let dir = TempDir::new().unwrap();

    let mut app = app_for(&server, "", dir.path());
    app.start();
    settle(&mut app).await;

    app.focus_search();
    let t0 = Instant::now();
    for c in "portal".chars() {
        app.search_insert_char(c, t0);
    }
    app.tick(t0);
    assert_eq!(app.location().to_string(), "/");
    assert!(app.is_search_pending());

    tokio::time::sleep(Duration::from_millis(60)).await;
    app.tick(Instant::now());
    settle(&mut app).await;

    assert_eq!(app.location().to_string(), "/?q=portal");
    assert_eq!(shown_names(&app), vec!["Portal", "Portal 2"]);
    // Typing alone never records history.
    assert!(app.search_history().entries().is_empty());
}

#[tokio::test]
async fn submitted_search_persists_history() {
    let server = MockServer::start().await;
    mount_catalog(&server, &CATALOG).await;
    let dir = TempDir::new().unwrap();

    let mut app = app_for(&server, "", dir.path());
    app.start();
    settle(&mut app).await;

    app.focus_search();
    app.search_paste("half-life", Instant::now());
    assert!(app.submit_search());
    settle(&mut app).await;
    assert_eq!(shown_names(&app), vec!["Half-Life", "Half-Life 2"]);

    let saved = std::fs::read_to_string(dir.path().join("search_history.json")).unwrap();
    let saved: Vec<String> = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved, vec!["half-life"]);

    // A fresh app picks the history back up.
    let reopened = app_for(&server, "", dir.path());
    assert_eq!(reopened.search_history().entries(), ["half-life"]);

    app.clear_search();
    settle(&mut app).await;
    assert_eq!(app.location().to_string(), "/");
    assert_eq!(shown_names(&app).len(), PAGE_SIZE as usize);
}

#[tokio::test]
async fn server_error_then_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/steam"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "message": "warming up"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_catalog(&server, &CATALOG).await;
    let dir = TempDir::new().unwrap();

    let mut app = app_for(&server, "", dir.path());
    app.start();
    settle(&mut app).await;

    let FetchState::Failed(failure) = app.listing() else {
        panic!("expected a failed listing");
    };
    assert_eq!(failure.message, "Failed to load games");
    assert_eq!(failure.headline, "Server error");
    assert_eq!(failure.detail, "warming up");

    assert!(app.retry());
    settle(&mut app).await;
    assert_eq!(shown_names(&app), vec!["Counter-Strike", "Half-Life"]);
}

#[tokio::test]
async fn detail_resolves_record_artwork() {
    let server = MockServer::start().await;
    mount_catalog(&server, &CATALOG).await;
    let header = format!("{}/img/400/header.jpg", server.uri());
    mount_details(
        &server,
        400,
        json!({
            "steam_appid": 400,
            "name": "Portal",
            "header_image": header,
            "developers": ["Valve"],
            "is_free": false,
            "price_overview": {
                "currency": "USD",
                "initial": 999,
                "final": 199,
                "discount_percent": 80
            }
        }),
    )
    .await;
    Mock::given(method("HEAD"))
        .and(path("/img/400/header.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let mut app = app_for(&server, "", dir.path());
    app.start();
    settle(&mut app).await;

    app.show_details(AppId::new(400).unwrap());
    settle(&mut app).await;

    let detail = app.detail().expect("detail open");
    let details = detail.details().expect("details loaded");
    assert_eq!(details.name, "Portal");
    assert_eq!(details.price_label().as_deref(), Some("$1.99"));
    assert_eq!(detail.artwork, ArtworkState::Found(header));

    // Back closes the overlay without moving the location.
    assert!(app.navigate_back());
    assert!(app.detail().is_none());
    assert_eq!(app.location().to_string(), "/");
}

#[tokio::test]
async fn missing_game_shows_not_found() {
    let server = MockServer::start().await;
    mount_catalog(&server, &CATALOG).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/steam/999999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Game not found"
        })))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let mut app = app_for(&server, "", dir.path());
    app.start();
    settle(&mut app).await;

    app.show_details(AppId::new(999_999).unwrap());
    settle(&mut app).await;

    let detail = app.detail().expect("detail open");
    let failure = detail.state.failure().expect("details failed");
    assert_eq!(failure.message, "Failed to load game details");
    assert_eq!(failure.headline, "Not found");
    assert_eq!(failure.detail, "Game not found");
}
