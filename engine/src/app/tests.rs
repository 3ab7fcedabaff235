use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use shelf_api::{ApiError, Catalog, CatalogApi};
use shelf_types::{AppId, Game, GameDetails, GamesResponse, PaginationMeta, UiOptions};

use super::{App, AppOptions, ArtworkState, FetchState};
use crate::listing::ListingSource;
use crate::location::Location;
use crate::persistence::HistoryStore;
use crate::ui::{CATEGORIES, InputMode};

const NAMES: [&str; 10] = [
    "Portal",
    "Portal 2",
    "Half-Life",
    "Half-Life 2",
    "Counter-Strike",
    "Team Fortress 2",
    "Left 4 Dead",
    "Dota 2",
    "Portal Demo",
    "RPG Maker",
];

const PAGE_SIZE: u32 = 4;

#[derive(Clone, Default)]
struct FakeCatalog {
    page_delays: Arc<Mutex<HashMap<u32, Duration>>>,
    failing_pages: Arc<Mutex<HashMap<u32, ApiError>>>,
    failing_details: Arc<Mutex<Option<ApiError>>>,
    list_calls: Arc<Mutex<Vec<u32>>>,
}

fn game(id: u32) -> Game {
    Game {
        appid: AppId::new(id).unwrap(),
        name: NAMES[id as usize - 1].to_string(),
        img_icon_url: None,
        img_logo_url: None,
        has_community_visible_stats: None,
    }
}

impl CatalogApi for FakeCatalog {
    async fn list_games(&self, page: u32, limit: u32) -> Result<GamesResponse, ApiError> {
        let delay = self.page_delays.lock().unwrap().get(&page).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.list_calls.lock().unwrap().push(page);
        let failure = self.failing_pages.lock().unwrap().get(&page).cloned();
        if let Some(err) = failure {
            return Err(err);
        }

        let total_games = NAMES.len() as u32;
        let total_pages = total_games.div_ceil(limit);
        let start = (page - 1) * limit + 1;
        let data = (start..start + limit)
            .filter(|id| *id <= total_games)
            .map(game)
            .collect();
        Ok(GamesResponse {
            data,
            meta: PaginationMeta {
                page,
                limit,
                total_games: u64::from(total_games),
                total_pages,
                has_next_page: page < total_pages,
                has_prev_page: page > 1,
            },
        })
    }

    async fn game_details(&self, app: AppId) -> Result<GameDetails, ApiError> {
        let failure = self.failing_details.lock().unwrap().clone();
        if let Some(err) = failure {
            return Err(err);
        }
        let Some(name) = NAMES.get(app.get() as usize - 1) else {
            return Err(ApiError::Status {
                status: 404,
                message: Some("Game not found".to_string()),
            });
        };
        Ok(serde_json::from_value(serde_json::json!({
            "steam_appid": app.get(),
            "name": name,
            "short_description": "A game.",
        }))
        .unwrap())
    }

    async fn artwork_exists(&self, url: &str) -> bool {
        url.ends_with("/header.jpg")
    }
}

fn app_at(fake: &FakeCatalog, location: &str) -> App<FakeCatalog> {
    let catalog = Catalog::new(fake.clone(), PAGE_SIZE, 10);
    App::new(
        catalog,
        AppOptions {
            location: Location::parse(location),
            debounce: Duration::from_millis(500),
            ui: UiOptions::default(),
            history: HistoryStore::in_memory(),
        },
    )
}

async fn settle(app: &mut App<FakeCatalog>) {
    for _ in 0..500 {
        app.tick(Instant::now());
        if app.in_flight() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("fetches did not finish");
}

fn shown_ids(app: &App<FakeCatalog>) -> Vec<u32> {
    app.visible_games().iter().map(|g| g.appid.get()).collect()
}

async fn started(fake: &FakeCatalog, location: &str) -> App<FakeCatalog> {
    let mut app = app_at(fake, location);
    app.start();
    settle(&mut app).await;
    app
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test]
async fn startup_loads_first_page() {
    let fake = FakeCatalog::default();
    let app = started(&fake, "").await;

    assert_eq!(shown_ids(&app), vec![1, 2, 3, 4]);
    assert_eq!(app.total_pages(), Some(3));
    assert_eq!(app.location().to_string(), "/");
    let listing = app.listing().ready().unwrap();
    assert_eq!(listing.source, ListingSource::Catalog);
    assert_eq!(listing.title(), "All Games (10)");
}

#[tokio::test]
async fn page_change_pushes_location_and_back_restores() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;

    assert!(app.next_page());
    assert!(app.listing().is_loading());
    settle(&mut app).await;
    assert_eq!(app.location().to_string(), "/?page=2");
    assert_eq!(shown_ids(&app), vec![5, 6, 7, 8]);

    assert!(app.navigate_back());
    settle(&mut app).await;
    assert_eq!(app.current_page(), 1);
    assert_eq!(shown_ids(&app), vec![1, 2, 3, 4]);

    assert!(app.navigate_forward());
    settle(&mut app).await;
    assert_eq!(app.current_page(), 2);
}

#[tokio::test]
async fn page_changes_outside_range_are_ignored() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;
    assert!(!app.prev_page());
    assert!(app.last_page());
    settle(&mut app).await;
    assert_eq!(app.current_page(), 3);
    assert!(!app.next_page());
    assert!(!app.go_to_page(7));
    assert_eq!(shown_ids(&app), vec![9, 10]);
}

#[tokio::test]
async fn typed_page_jump_uses_the_page_guard() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;

    for c in ['0', '7'] {
        app.page_jump_push(c);
    }
    app.page_jump_push('x');
    assert_eq!(app.page_jump(), Some("07"));
    assert!(!app.submit_page_jump());
    assert!(app.page_jump().is_none());
    assert_eq!(app.notice(), Some("No page 7"));
    assert_eq!(app.current_page(), 1);
    assert_eq!(*fake.list_calls.lock().unwrap(), vec![1]);

    app.page_jump_push('3');
    app.page_jump_backspace();
    assert!(app.page_jump().is_none());

    app.page_jump_push('3');
    assert!(app.submit_page_jump());
    settle(&mut app).await;
    assert_eq!(app.location().to_string(), "/?page=3");
    assert_eq!(shown_ids(&app), vec![9, 10]);

    app.page_jump_push('3');
    assert!(!app.submit_page_jump());
    assert!(app.notice().is_none_or(|n| n != "No page 3"));
}

#[tokio::test]
async fn revisited_page_is_served_from_cache() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;
    app.next_page();
    settle(&mut app).await;
    app.navigate_back();
    settle(&mut app).await;
    assert_eq!(*fake.list_calls.lock().unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn superseded_response_is_discarded() {
    let fake = FakeCatalog::default();
    fake.page_delays.lock().unwrap().insert(1, ms(60));
    let mut app = app_at(&fake, "");
    app.start();
    // Total unknown yet, so only the lower bound applies.
    assert!(app.go_to_page(2));
    settle(&mut app).await;

    assert_eq!(app.current_page(), 2);
    assert_eq!(shown_ids(&app), vec![5, 6, 7, 8]);
    // The slow page 1 did arrive, after page 2.
    assert_eq!(*fake.list_calls.lock().unwrap(), vec![2, 1]);
}

#[tokio::test]
async fn location_beyond_total_is_clamped_and_refetched() {
    let fake = FakeCatalog::default();
    let app = started(&fake, "?page=40").await;

    assert_eq!(app.location().to_string(), "/?page=3");
    assert_eq!(shown_ids(&app), vec![9, 10]);
    assert_eq!(*fake.list_calls.lock().unwrap(), vec![40, 3]);
    assert!(!app.can_go_back());
}

#[tokio::test]
async fn debounced_typing_dispatches_once_with_final_value() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;
    let t0 = Instant::now();

    app.focus_search();
    assert_eq!(app.input_mode(), InputMode::Search);
    for (i, c) in "portal".chars().enumerate() {
        let now = t0 + ms(i as u64 * 100);
        app.search_insert_char(c, now);
        app.tick(now);
    }
    assert_eq!(app.search_draft().text(), "portal");
    assert!(app.is_search_pending());
    assert_eq!(app.location().to_string(), "/");

    // Last keystroke at 500ms.
    app.tick(t0 + ms(999));
    assert!(app.is_search_pending());
    app.tick(t0 + ms(1000));
    assert!(!app.is_search_pending());
    assert_eq!(app.location().to_string(), "/?q=portal");

    settle(&mut app).await;
    assert_eq!(shown_ids(&app), vec![1, 2, 9]);
    // Debounced searches are not remembered.
    assert!(app.search_history().is_empty());
}

#[tokio::test]
async fn blank_debounced_value_dispatches_nothing() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;
    let t0 = Instant::now();

    app.focus_search();
    app.search_insert_char(' ', t0);
    app.tick(t0 + ms(600));
    assert!(!app.is_search_pending());
    assert_eq!(app.location().to_string(), "/");
    assert_eq!(app.in_flight(), 0);
}

#[tokio::test]
async fn submit_bypasses_debounce_and_records_history() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;
    let t0 = Instant::now();

    app.focus_search();
    for c in "half".chars() {
        app.search_insert_char(c, t0);
    }
    assert!(app.submit_search());
    assert!(!app.is_search_pending());
    assert_eq!(app.input_mode(), InputMode::Normal);
    assert_eq!(app.location().to_string(), "/?q=half");
    assert_eq!(app.search_history().entries(), ["half"]);

    settle(&mut app).await;
    assert_eq!(shown_ids(&app), vec![3, 4]);
    assert!(app.listing().ready().unwrap().is_search());
}

#[tokio::test]
async fn history_is_case_sensitive_and_most_recent_first() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;
    let t0 = Instant::now();

    for query in ["portal", "Portal", "half-life"] {
        app.focus_search();
        app.clear_search();
        app.search_paste(query, t0);
        assert!(app.submit_search());
    }
    settle(&mut app).await;
    assert_eq!(
        app.search_history().entries(),
        ["half-life", "Portal", "portal"]
    );
}

#[tokio::test]
async fn blank_submit_is_ignored() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;
    app.focus_search();
    app.search_paste("   ", Instant::now());
    assert!(!app.submit_search());
    assert!(!app.is_search_pending());
    assert!(app.search_history().is_empty());
    assert_eq!(app.location().to_string(), "/");
}

#[tokio::test]
async fn clearing_shows_catalog_immediately() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "?q=portal").await;
    assert_eq!(app.search_draft().text(), "portal");
    assert_eq!(shown_ids(&app), vec![1, 2, 9]);

    app.focus_search();
    app.search_insert_char('x', Instant::now());
    app.clear_search();
    assert!(!app.is_search_pending());
    assert_eq!(app.search_draft().text(), "");
    assert_eq!(app.location().to_string(), "/");

    settle(&mut app).await;
    assert_eq!(shown_ids(&app), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn category_suggestion_submits_search() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;
    app.focus_search();
    let rpg = CATEGORIES.iter().position(|c| *c == "RPG").unwrap();
    assert!(app.choose_suggestion(rpg));
    assert_eq!(app.location().to_string(), "/?q=RPG");
    assert_eq!(app.search_draft().text(), "RPG");
    settle(&mut app).await;
    assert_eq!(shown_ids(&app), vec![10]);

    // The recent search now leads the dropdown.
    app.focus_search();
    app.suggestion_next();
    assert!(app.submit_search());
    assert_eq!(app.location().to_string(), "/?q=RPG");
}

#[tokio::test]
async fn back_restores_search_text() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;
    app.focus_search();
    app.search_paste("portal", Instant::now());
    app.submit_search();
    settle(&mut app).await;

    assert!(app.navigate_back());
    settle(&mut app).await;
    assert_eq!(app.search_draft().text(), "");
    assert_eq!(app.location().to_string(), "/");
}

#[tokio::test]
async fn failure_shows_error_panel_and_retry_recovers() {
    let fake = FakeCatalog::default();
    fake.failing_pages.lock().unwrap().insert(
        2,
        ApiError::Status {
            status: 503,
            message: Some("warming up".to_string()),
        },
    );
    let mut app = started(&fake, "").await;
    app.next_page();
    settle(&mut app).await;

    let failure = app.listing().failure().unwrap();
    assert_eq!(failure.message, "Failed to load games");
    assert_eq!(failure.headline, "Server error");
    assert_eq!(failure.detail, "warming up");
    // Pagination state is untouched.
    assert_eq!(app.current_page(), 2);
    assert_eq!(app.total_pages(), Some(3));

    fake.failing_pages.lock().unwrap().clear();
    assert!(app.retry());
    settle(&mut app).await;
    assert_eq!(shown_ids(&app), vec![5, 6, 7, 8]);
    assert!(!app.retry());
}

#[tokio::test]
async fn detail_view_loads_record_and_artwork() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;
    app.select_next();
    assert!(app.open_selected());
    settle(&mut app).await;

    let detail = app.detail().unwrap();
    assert_eq!(detail.app.get(), 2);
    assert_eq!(detail.details().unwrap().name, "Portal 2");
    assert_eq!(
        detail.artwork,
        ArtworkState::Found("https://cdn.akamai.steamstatic.com/steam/apps/2/header.jpg".to_string())
    );

    assert!(app.navigate_back());
    assert!(app.detail().is_none());
    assert_eq!(app.location().to_string(), "/");
}

#[tokio::test]
async fn detail_failure_can_be_retried() {
    let fake = FakeCatalog::default();
    *fake.failing_details.lock().unwrap() = Some(ApiError::Timeout);
    let mut app = started(&fake, "").await;
    app.open_selected();
    settle(&mut app).await;

    let failure = app.detail().unwrap().state.failure().unwrap();
    assert_eq!(failure.message, "Failed to load game details");
    assert_eq!(failure.headline, "Request timed out");

    *fake.failing_details.lock().unwrap() = None;
    assert!(app.retry());
    settle(&mut app).await;
    assert!(matches!(app.detail().unwrap().state, FetchState::Ready(_)));
}

#[tokio::test]
async fn filters_narrow_visible_games() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;

    app.open_filters();
    assert_eq!(app.input_mode(), InputMode::Filters);
    app.filter_form_mut().focused_mut().enter_char('2');
    app.filter_form_mut().focus_next();
    app.filter_form_mut().focus_next();
    app.filter_form_mut().focused_mut().enter_text("half");
    assert!(app.apply_filters());
    assert_eq!(app.input_mode(), InputMode::Normal);
    assert_eq!(shown_ids(&app), vec![2]);
    assert_eq!(app.notice(), Some("Filters: id >= 2, -half"));

    app.clear_filters();
    assert_eq!(shown_ids(&app), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn invalid_filters_keep_form_open() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;
    app.open_filters();
    app.filter_form_mut().focused_mut().enter_text("abc");
    assert!(!app.apply_filters());
    assert_eq!(app.input_mode(), InputMode::Filters);
    assert!(app.filter_form().error().is_some());
}

#[tokio::test]
async fn quit_cancels_pending_search() {
    let fake = FakeCatalog::default();
    let mut app = started(&fake, "").await;
    app.focus_search();
    app.search_insert_char('p', Instant::now());
    app.request_quit();
    assert!(app.should_quit());
    assert!(!app.is_search_pending());
}

#[tokio::test]
async fn history_persists_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("search_history.json");
    let fake = FakeCatalog::default();
    let mut app = App::new(
        Catalog::new(fake, PAGE_SIZE, 10),
        AppOptions {
            location: Location::default(),
            debounce: ms(500),
            ui: UiOptions::default(),
            history: HistoryStore::new(path.clone()),
        },
    );
    app.start();
    app.focus_search();
    app.search_paste("dota", Instant::now());
    app.submit_search();
    settle(&mut app).await;

    assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"["dota"]"#);
    assert_eq!(HistoryStore::new(path).load().entries(), ["dota"]);
}
