//! Shelf CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`shelf_engine`] (application state) and [`shelf_tui`] (rendering),
//! providing RAII-based terminal management with guaranteed cleanup.
//!
//! ```text
//! main() -> TerminalSession::new(mode) -> run_app(draw | draw_inline) -> App + TUI
//! ```
//!
//! # Event Loop
//!
//! Both full-screen and inline modes use a fixed 8ms (~120 FPS) render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`shelf_tui::InputPump`])
//! 3. Advance application state (`app.tick()`): fire due searches, apply fetch results
//! 4. Render frame

use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{TerminalOptions, Viewport, prelude::*};
use std::{
    env,
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use shelf_engine::{App, CatalogApi, Location, Settings, ShelfConfig, TuiMode};
use shelf_tui::{
    INLINE_VIEWPORT_HEIGHT, InputPump, clear_inline_viewport, draw, draw_inline, handle_events,
};

/// Overrides `[app] tui` from the config file.
const TUI_ENV: &str = "SHELF_TUI";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_shelf_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // If we can't open a log file, prefer "no logs" over corrupting the TUI
    // by writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_shelf_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in shelf_log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn shelf_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.shelf/logs/shelf.log
    if let Some(config_path) = ShelfConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("shelf.log"));
    }

    // Fallback: ./.shelf/logs/shelf.log (useful in constrained environments)
    candidates.push(PathBuf::from(".shelf").join("logs").join("shelf.log"));

    candidates
}

fn load_settings() -> Result<Settings> {
    let config = match ShelfConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("{e}; continuing with defaults");
            None
        }
    };
    match Settings::resolve(config.as_ref()) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            tracing::warn!("{e}; continuing with defaults");
            Ok(Settings::defaults()?)
        }
    }
}

fn tui_mode(settings: &Settings) -> TuiMode {
    let from_env = env::var(TUI_ENV).ok().and_then(|raw| {
        let mode = TuiMode::parse(&raw);
        if mode.is_none() {
            tracing::warn!("Ignoring {TUI_ENV}={raw}");
        }
        mode
    });
    from_env.or(settings.tui).unwrap_or(TuiMode::Full)
}

/// `shelf [LOCATION]`, where LOCATION looks like `?page=2&q=portal`.
fn initial_location() -> Location {
    env::args()
        .nth(1)
        .map(|raw| Location::parse(&raw))
        .unwrap_or_default()
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Manages raw mode, bracketed paste and (full mode only) the alternate
/// screen. On drop, all terminal state is restored so the shell stays usable
/// after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    use_alternate_screen: bool,
}

impl TerminalSession {
    fn new(mode: TuiMode) -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        let use_alternate_screen = matches!(mode, TuiMode::Full);
        if use_alternate_screen && let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
            return Err(err.into());
        }

        let backend = CrosstermBackend::new(out);
        let terminal = match mode {
            TuiMode::Full => Terminal::new(backend),
            TuiMode::Inline => Terminal::with_options(
                backend,
                TerminalOptions {
                    viewport: Viewport::Inline(INLINE_VIEWPORT_HEIGHT),
                },
            ),
        };
        let terminal = match terminal {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let mut out = stdout();
                if use_alternate_screen {
                    let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
                } else {
                    let _ = execute!(out, DisableBracketedPaste);
                }
                return Err(err.into());
            }
        };

        Ok(Self {
            terminal,
            use_alternate_screen,
        })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        if self.use_alternate_screen {
            let _ = execute!(
                self.terminal.backend_mut(),
                LeaveAlternateScreen,
                DisableBracketedPaste
            );
        } else {
            let _ = clear_inline_viewport(&mut self.terminal);
            let _ = execute!(self.terminal.backend_mut(), DisableBracketedPaste);
        }
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let settings = load_settings()?;
    let mode = tui_mode(&settings);
    let location = initial_location();
    tracing::info!(%location, ?mode, "starting");

    let mut app = App::from_settings(&settings, location)?;
    app.start();

    let result = {
        let mut session = TerminalSession::new(mode)?;
        match mode {
            TuiMode::Full => run_app(&mut session.terminal, &mut app, draw).await,
            TuiMode::Inline => run_app(&mut session.terminal, &mut app, draw_inline).await,
        }
    };

    if let Err(err) = result {
        tracing::error!("{err:?}");
        eprintln!("Error: {err:?}");
    }
    Ok(())
}

const FRAME_DURATION: Duration = Duration::from_millis(8);

async fn run_app<B, A>(
    terminal: &mut Terminal<B>,
    app: &mut App<A>,
    render: fn(&mut Frame, &App<A>),
) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
    A: CatalogApi,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        let quit_now = match handle_events(app, &mut input) {
            Ok(q) => q,
            Err(e) => break Err(e),
        };
        if quit_now {
            break Ok(());
        }

        app.tick(Instant::now());

        if let Err(e) = terminal.draw(|frame| render(frame, app)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}
