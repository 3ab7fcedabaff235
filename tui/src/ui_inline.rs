//! Inline TUI mode - a fixed-height viewport below the shell prompt.

use ratatui::prelude::{Backend, Terminal};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    widgets::{Clear, Paragraph},
};

use shelf_engine::{App, CatalogApi, InputMode};

use crate::theme::{glyphs, palette};
use crate::{
    detail, draw_filters, draw_listing, draw_search_bar, draw_status_bar, draw_suggestions_in,
    pagination_line,
};

/// Search bar, ten rows of games, pagination and status.
pub const INLINE_VIEWPORT_HEIGHT: u16 = 18;

pub fn draw<A: CatalogApi>(frame: &mut Frame, app: &App<A>) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    let area = frame.area();
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_search_bar(frame, app, chunks[0], &palette, &glyphs);
    if app.detail().is_some() {
        detail::draw_detail(frame, app, chunks[1], &palette, &glyphs);
    } else if app.input_mode() == InputMode::Search {
        // No room for a dropdown: the suggestions take the listing's place.
        draw_suggestions_in(frame, app, chunks[1], &palette, &glyphs);
    } else {
        draw_listing(frame, app, chunks[1], &palette, &glyphs);
        if let Some(line) = pagination_line(app, &palette, &glyphs) {
            frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), chunks[2]);
        }
    }
    draw_status_bar(frame, app, chunks[3], &palette, &glyphs);

    if app.input_mode() == InputMode::Filters {
        draw_filters(frame, app, &palette);
    }
}

/// Blank the inline viewport so the shell prompt resumes on a clean line.
pub fn clear_inline_viewport<B>(terminal: &mut Terminal<B>) -> Result<(), B::Error>
where
    B: Backend,
{
    terminal.draw(|frame| frame.render_widget(Clear, frame.area()))?;
    Ok(())
}
