//! Input handling for Shelf TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

use shelf_engine::{App, CatalogApi, InputMode};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads crossterm events on a blocking thread and queues them for the frame loop.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so a backpressured send unblocks.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if caller exits early; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    // Bounded queue: apply backpressure instead of dropping events.
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain queued input into `app`. Returns `true` once the app should quit.
pub fn handle_events<A: CatalogApi>(app: &mut App<A>, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => {
                tracing::warn!("Terminal input failed: {msg}");
                return Err(anyhow!("input error: {msg}"));
            }
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        if apply_event(app, ev, Instant::now()) {
            return Ok(true);
        }
        processed += 1;
    }
    Ok(app.should_quit())
}

/// Apply one terminal event. `now` stamps search keystrokes for the debounce.
pub fn apply_event<A: CatalogApi>(app: &mut App<A>, event: Event, now: Instant) -> bool {
    match event {
        Event::Key(key) => {
            // Handle press + repeat events (ignore releases)
            if matches!(key.kind, KeyEventKind::Release) {
                return app.should_quit();
            }

            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                app.request_quit();
                return true;
            }

            match app.input_mode() {
                InputMode::Normal if app.detail().is_some() => handle_detail(app, key),
                InputMode::Normal => handle_normal_mode(app, key),
                InputMode::Search => handle_search_mode(app, key, now),
                InputMode::Filters => handle_filters_mode(app, key),
            }
        }
        Event::Paste(text) => match app.input_mode() {
            InputMode::Search => app.search_paste(&text, now),
            InputMode::Filters => app.filter_form_mut().focused_mut().enter_text(&text),
            InputMode::Normal => {}
        },
        _ => {}
    }
    app.should_quit()
}

fn handle_normal_mode<A: CatalogApi>(app: &mut App<A>, key: KeyEvent) {
    // Typed page number: digits, then Enter.
    if app.page_jump().is_some() {
        match key.code {
            KeyCode::Enter => {
                app.submit_page_jump();
                return;
            }
            KeyCode::Esc => {
                app.cancel_page_jump();
                return;
            }
            KeyCode::Backspace => {
                app.page_jump_backspace();
                return;
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                app.page_jump_push(c);
                return;
            }
            _ => app.cancel_page_jump(),
        }
    }

    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() => app.page_jump_push(c),
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Char('/' | 's' | 'i') => app.focus_search(),
        KeyCode::Char('f') => app.open_filters(),
        KeyCode::Char('x') => app.clear_filters(),
        KeyCode::Char('r') => {
            app.retry();
        }
        KeyCode::Char('h') => app.go_home(),

        // Browser-style history
        KeyCode::Left if alt => {
            app.navigate_back();
        }
        KeyCode::Right if alt => {
            app.navigate_forward();
        }
        KeyCode::Char('b') | KeyCode::Backspace => {
            app.navigate_back();
        }
        KeyCode::Char('B') => {
            app.navigate_forward();
        }

        // Rows
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::Enter => {
            app.open_selected();
        }

        // Pages
        KeyCode::Char('n' | 'l') | KeyCode::Right | KeyCode::PageDown => {
            app.next_page();
        }
        KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
            app.prev_page();
        }
        KeyCode::Char('[') => {
            app.first_page();
        }
        KeyCode::Char(']') => {
            app.last_page();
        }
        _ => {}
    }
}

fn handle_detail<A: CatalogApi>(app: &mut App<A>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
            app.navigate_back();
        }
        KeyCode::Left if key.modifiers.contains(KeyModifiers::ALT) => {
            app.navigate_back();
        }
        KeyCode::Char('r') => {
            app.retry();
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_detail(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_detail(-1),
        KeyCode::PageDown | KeyCode::Char(' ') => app.scroll_detail(10),
        KeyCode::PageUp => app.scroll_detail(-10),
        KeyCode::Char('/') => {
            app.close_detail();
            app.focus_search();
        }
        _ => {}
    }
}

fn handle_search_mode<A: CatalogApi>(app: &mut App<A>, key: KeyEvent, now: Instant) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.blur_search(),
        KeyCode::Enter => {
            if !app.submit_search() {
                app.blur_search();
            }
        }
        KeyCode::Down | KeyCode::Tab => app.suggestion_next(),
        KeyCode::Up | KeyCode::BackTab => app.suggestion_prev(),
        KeyCode::Char('u') if ctrl => app.clear_search(),
        KeyCode::Char('w') if ctrl => app.search_delete_word(now),
        KeyCode::Char('a') if ctrl => app.search_cursor_home(),
        KeyCode::Char('e') if ctrl => app.search_cursor_end(),
        KeyCode::Backspace => app.search_backspace(now),
        KeyCode::Delete => app.search_delete_forward(now),
        KeyCode::Left => app.search_cursor_left(),
        KeyCode::Right => app.search_cursor_right(),
        KeyCode::Home => app.search_cursor_home(),
        KeyCode::End => app.search_cursor_end(),
        KeyCode::Char(c) if !ctrl => app.search_insert_char(c, now),
        _ => {}
    }
}

fn handle_filters_mode<A: CatalogApi>(app: &mut App<A>, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.close_filters(),
        KeyCode::Enter => {
            app.apply_filters();
        }
        KeyCode::Char('r') if ctrl => app.clear_filters(),
        KeyCode::Tab | KeyCode::Down => app.filter_form_mut().focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.filter_form_mut().focus_prev(),
        KeyCode::Backspace => app.filter_form_mut().focused_mut().delete_char(),
        KeyCode::Delete => app.filter_form_mut().focused_mut().delete_char_forward(),
        KeyCode::Left => app.filter_form_mut().focused_mut().move_cursor_left(),
        KeyCode::Right => app.filter_form_mut().focused_mut().move_cursor_right(),
        KeyCode::Char(c) if !ctrl => app.filter_form_mut().focused_mut().enter_char(c),
        _ => {}
    }
}
