//! Rendered screens for an HTTP-backed app.

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelf_engine::AppId;

use crate::common::{CATALOG, app_for, mount_catalog, mount_details, render, settle};

#[tokio::test]
async fn catalog_screen() {
    let server = MockServer::start().await;
    mount_catalog(&server, &CATALOG).await;
    let dir = TempDir::new().unwrap();

    let mut app = app_for(&server, "?page=2", dir.path());
    app.start();
    settle(&mut app).await;

    let screen = render(&app);
    assert!(screen.contains("All Games (6)"), "{screen}");
    assert!(screen.contains("Half-Life 2"));
    assert!(screen.contains("Portal"));
    assert!(!screen.contains("Counter-Strike"));
    assert!(screen.contains("< Prev  1  2  3  Next >"));
    assert!(screen.contains("Page 2 of 3"));
    assert!(screen.contains("?page=2"));
}

#[tokio::test]
async fn details_screen() {
    let server = MockServer::start().await;
    mount_catalog(&server, &CATALOG).await;
    let header = format!("{}/img/620/header.jpg", server.uri());
    Mock::given(method("HEAD"))
        .and(path("/img/620/header.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_details(
        &server,
        620,
        json!({
            "steam_appid": 620,
            "name": "Portal 2",
            "header_image": header,
            "short_description": "The sequel to Portal.",
            "developers": ["Valve"],
            "publishers": ["Valve"],
            "genres": [{ "id": "1", "description": "Action" }],
            "release_date": { "coming_soon": false, "date": "18 Apr, 2011" },
            "is_free": true
        }),
    )
    .await;
    let dir = TempDir::new().unwrap();

    let mut app = app_for(&server, "", dir.path());
    app.start();
    settle(&mut app).await;
    app.show_details(AppId::new(620).unwrap());
    settle(&mut app).await;

    let screen = render(&app);
    assert!(screen.contains("Portal 2"), "{screen}");
    assert!(screen.contains("App ID 620"));
    assert!(screen.contains("Free"));
    assert!(screen.contains("18 Apr, 2011"));
    assert!(screen.contains("Action"));
    assert!(screen.contains("The sequel to Portal."));
    assert!(screen.contains("/img/620/header.jpg"));
}
