//! TUI rendering for Shelf using ratatui.

mod detail;
mod format;
mod input;
mod theme;
mod ui_inline;

pub use input::{InputPump, apply_event, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};
pub use ui_inline::{INLINE_VIEWPORT_HEIGHT, clear_inline_viewport, draw as draw_inline};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use shelf_engine::{
    App, CatalogApi, FetchFailure, FetchState, FilterField, InputMode, ListingSource, PageItem,
    SEARCH_TIPS, page_items,
};
use shelf_types::sanitize_display;

use crate::format::{group_thousands, truncate_to_width};

/// Main draw function
pub fn draw<A: CatalogApi>(frame: &mut Frame, app: &App<A>) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Search bar
            Constraint::Min(1),    // Listing or detail
            Constraint::Length(1), // Pagination
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_search_bar(frame, app, chunks[0], &palette, &glyphs);
    if app.detail().is_some() {
        detail::draw_detail(frame, app, chunks[1], &palette, &glyphs);
    } else {
        draw_listing(frame, app, chunks[1], &palette, &glyphs);
        draw_pagination(frame, app, chunks[2], &palette, &glyphs);
    }
    draw_status_bar(frame, app, chunks[3], &palette, &glyphs);

    if app.input_mode() == InputMode::Search {
        draw_suggestions(frame, app, chunks[0], &palette, &glyphs);
    }
    if app.input_mode() == InputMode::Filters {
        draw_filters(frame, app, &palette);
    }
}

pub(crate) fn draw_search_bar<A: CatalogApi>(
    frame: &mut Frame,
    app: &App<A>,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let mode = app.input_mode();
    let (mode_label, mode_style, border_style) = match mode {
        InputMode::Normal => (
            " BROWSE ",
            styles::mode_normal(palette),
            Style::default().fg(palette.bg_border),
        ),
        InputMode::Search => (
            " SEARCH ",
            styles::mode_search(palette),
            Style::default().fg(palette.success),
        ),
        InputMode::Filters => (
            " FILTERS ",
            styles::mode_filters(palette),
            Style::default().fg(palette.warning),
        ),
    };

    let hints = match mode {
        InputMode::Search => vec![
            Span::styled("Enter", styles::key_highlight(palette)),
            Span::styled(" search  ", styles::key_hint(palette)),
            Span::styled("↑↓", styles::key_highlight(palette)),
            Span::styled(" suggestions  ", styles::key_hint(palette)),
            Span::styled("Ctrl+U", styles::key_highlight(palette)),
            Span::styled(" clear  ", styles::key_hint(palette)),
            Span::styled("Esc", styles::key_highlight(palette)),
            Span::styled(" done ", styles::key_hint(palette)),
        ],
        _ => vec![
            Span::styled("/", styles::key_highlight(palette)),
            Span::styled(" search  ", styles::key_hint(palette)),
            Span::styled("f", styles::key_highlight(palette)),
            Span::styled(" filters  ", styles::key_hint(palette)),
            Span::styled("q", styles::key_highlight(palette)),
            Span::styled(" quit ", styles::key_hint(palette)),
        ],
    };

    let prefix = format!(" {} ", glyphs.search);
    let prefix_width = prefix.width() as u16;
    let draft = app.search_draft();
    let inner_width = area.width.saturating_sub(2 + prefix_width).max(1);

    let text_before_cursor = &draft.text()[..draft.byte_index()];
    let cursor_display_pos = text_before_cursor.width() as u16;
    let horizontal_scroll = cursor_display_pos.saturating_sub(inner_width.saturating_sub(1));

    let content = if draft.text().is_empty() {
        Span::styled(
            "Search games by name or App ID",
            Style::default()
                .fg(palette.text_muted)
                .add_modifier(Modifier::ITALIC),
        )
    } else {
        Span::styled(
            draft.text().to_string(),
            Style::default().fg(palette.text_primary),
        )
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title_top(Line::from(vec![Span::styled(mode_label, mode_style)]))
        .title_top(Line::from(hints).alignment(Alignment::Right));
    if app.is_search_pending() {
        let spinner = spinner_frame(app.spinner_frame(), app.ui_options());
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" {spinner} waiting for typing to pause "),
                Style::default().fg(palette.text_muted),
            ))
            .alignment(Alignment::Right),
        );
    }

    let prompt = Paragraph::new(Line::from(vec![
        Span::styled(prefix, Style::default().fg(palette.primary)),
        content,
    ]))
    .scroll((0, horizontal_scroll))
    .block(block);
    frame.render_widget(prompt, area);

    if mode == InputMode::Search {
        let cursor_x = area
            .x
            .saturating_add(1 + prefix_width)
            .saturating_add(cursor_display_pos)
            .saturating_sub(horizontal_scroll);
        frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
    }
}

pub(crate) fn draw_listing<A: CatalogApi>(
    frame: &mut Frame,
    app: &App<A>,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    match app.listing() {
        FetchState::Loading => {
            let spinner = spinner_frame(app.spinner_frame(), app.ui_options());
            let label = if app.location().query().is_empty() {
                "Loading games..."
            } else {
                "Searching..."
            };
            let loading = Paragraph::new(Line::from(vec![
                Span::styled(format!("{spinner} "), Style::default().fg(palette.primary)),
                Span::styled(label, Style::default().fg(palette.text_secondary)),
            ]))
            .alignment(Alignment::Center)
            .block(panel_block(palette, " Games "));
            frame.render_widget(loading, area);
        }
        FetchState::Failed(failure) => {
            draw_error_panel(frame, failure, area, palette, glyphs, "h", "Return to Home");
        }
        FetchState::Ready(listing) => {
            let games = app.visible_games();
            let title = format!(" {} ", sanitize_display(&listing.title()));
            let block = panel_block(palette, &title);
            let inner = block.inner(area);
            frame.render_widget(block, area);

            let mut lines: Vec<Line> = Vec::new();
            if let ListingSource::Search { partial: true, .. } = listing.source {
                lines.push(Line::from(Span::styled(
                    "Partial results: only the first catalog pages were scanned",
                    Style::default().fg(palette.warning),
                )));
            }
            if app.filters().is_active() {
                lines.push(Line::from(vec![
                    Span::styled("Filters: ", Style::default().fg(palette.text_muted)),
                    Span::styled(
                        app.filters().summary(),
                        Style::default().fg(palette.accent),
                    ),
                    Span::styled(
                        format!(" ({} of {} shown)", games.len(), listing.games.len()),
                        Style::default().fg(palette.text_muted),
                    ),
                ]));
            }

            if games.is_empty() {
                lines.push(Line::from(""));
                lines.push(
                    Line::from(Span::styled("No games found", styles::title(palette)))
                        .alignment(Alignment::Center),
                );
                let hint = if listing.is_search() || app.filters().is_active() {
                    "Try a different search term or clear filters"
                } else {
                    "The catalog is empty"
                };
                lines.push(
                    Line::from(Span::styled(hint, Style::default().fg(palette.text_muted)))
                        .alignment(Alignment::Center),
                );
                frame.render_widget(Paragraph::new(lines), inner);
                return;
            }

            let header_rows = lines.len();
            let rows = (inner.height as usize).saturating_sub(header_rows).max(1);
            let selected = app.selected_index();
            let offset = selected.saturating_sub(rows - 1);
            let name_width = (inner.width as usize).saturating_sub(12);

            for (index, game) in games.iter().enumerate().skip(offset).take(rows) {
                let is_selected = index == selected;
                let marker = if is_selected { glyphs.selected } else { " " };
                let name = truncate_to_width(&sanitize_display(&game.name), name_width, glyphs.ellipsis);
                let row_style = if is_selected {
                    styles::selected_row(palette)
                } else {
                    Style::default().fg(palette.text_primary)
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{marker} "), Style::default().fg(palette.primary)),
                    Span::styled(
                        format!("{:>8} ", game.appid.get()),
                        Style::default().fg(palette.text_muted),
                    ),
                    Span::styled(name, row_style),
                ]));
            }
            frame.render_widget(Paragraph::new(lines), inner);
        }
    }
}

pub(crate) fn panel_block<'a>(palette: &Palette, title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border))
        .style(Style::default().bg(palette.bg_panel))
        .title(Line::from(Span::styled(title, styles::title(palette))))
}

/// Error panel with the failure text and the retry hint.
pub(crate) fn draw_error_panel(
    frame: &mut Frame,
    failure: &FetchFailure,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
    escape_key: &'static str,
    escape_label: &'static str,
) {
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("{} ", glyphs.error),
                Style::default()
                    .fg(palette.error)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                failure.message,
                Style::default()
                    .fg(palette.error)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("{}: ", failure.headline),
                Style::default().fg(palette.text_secondary),
            ),
            Span::styled(
                sanitize_display(&failure.detail).into_owned(),
                Style::default().fg(palette.text_primary),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("r", styles::key_highlight(palette)),
            Span::styled(" Try again   ", styles::key_hint(palette)),
            Span::styled(escape_key, styles::key_highlight(palette)),
            Span::styled(format!(" {escape_label}"), styles::key_hint(palette)),
        ]),
    ];
    let panel = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette.error))
                .style(Style::default().bg(palette.bg_panel)),
        );
    frame.render_widget(panel, area);
}

pub(crate) fn draw_pagination<A: CatalogApi>(
    frame: &mut Frame,
    app: &App<A>,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let Some(line) = pagination_line(app, palette, glyphs) else {
        return;
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

/// The page selector, or `None` while there is a single page or no listing.
pub(crate) fn pagination_line<A: CatalogApi>(
    app: &App<A>,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Option<Line<'static>> {
    let FetchState::Ready(_) = app.listing() else {
        return None;
    };
    let total = app.total_pages()?;
    if total <= 1 {
        return None;
    }
    let current = app.current_page();

    let enabled = Style::default().fg(palette.text_primary);
    let disabled = Style::default().fg(palette.text_muted);
    let mut spans = vec![Span::styled(
        format!("{} Prev ", glyphs.prev),
        if current > 1 { enabled } else { disabled },
    )];
    for item in page_items(current, total) {
        match item {
            PageItem::Page(page) if page == current => {
                spans.push(Span::styled(format!(" {page} "), styles::current_page(palette)));
            }
            PageItem::Page(page) => {
                spans.push(Span::styled(format!(" {page} "), Style::default().fg(palette.blue)));
            }
            PageItem::Ellipsis => {
                spans.push(Span::styled(format!(" {} ", glyphs.ellipsis), disabled));
            }
        }
    }
    spans.push(Span::styled(
        format!(" Next {}", glyphs.next),
        if current < total { enabled } else { disabled },
    ));
    Some(Line::from(spans))
}

pub(crate) fn draw_status_bar<A: CatalogApi>(
    frame: &mut Frame,
    app: &App<A>,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(app.location().to_string(), Style::default().fg(palette.accent)),
    ];

    if let FetchState::Ready(listing) = app.listing() {
        let total = app.total_pages().unwrap_or(1).max(1);
        spans.push(Span::styled(
            format!(
                " {} Page {} of {} {} {} games",
                glyphs.separator,
                app.current_page(),
                total,
                glyphs.separator,
                group_thousands(listing.meta.total_games),
            ),
            Style::default().fg(palette.text_secondary),
        ));
    }

    if let Some(digits) = app.page_jump() {
        spans.push(Span::styled(
            format!(" {} Go to page: ", glyphs.separator),
            styles::key_hint(palette),
        ));
        spans.push(Span::styled(
            format!("{digits}_"),
            styles::key_highlight(palette),
        ));
    }

    if app.in_flight() > 0 {
        let spinner = spinner_frame(app.spinner_frame(), app.ui_options());
        spans.push(Span::styled(
            format!(" {} {spinner}", glyphs.separator),
            Style::default().fg(palette.primary),
        ));
    }

    if let Some(notice) = app.notice() {
        spans.push(Span::styled(
            format!(" {} {notice}", glyphs.separator),
            Style::default().fg(palette.warning),
        ));
    }

    let nav = [
        (app.can_go_back(), "b back"),
        (app.can_go_forward(), "B forward"),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .map(|(_, label)| label)
    .collect::<Vec<_>>()
    .join("  ");
    let status = Paragraph::new(Line::from(spans));
    frame.render_widget(status, area);
    if !nav.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("{nav} "),
                styles::key_hint(palette),
            )))
            .alignment(Alignment::Right),
            area,
        );
    }
}

/// Dropdown under the search bar: recent searches, categories, then tips.
pub(crate) fn draw_suggestions<A: CatalogApi>(
    frame: &mut Frame,
    app: &App<A>,
    search_area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let Some(list) = app.suggestions() else {
        return;
    };
    // Headings, entries and tips, plus borders.
    let headings = 2 + usize::from(list.recent().next().is_some());
    let rows = list.items().len() + SEARCH_TIPS.len() + headings;
    let screen = frame.area();
    let top = search_area.y.saturating_add(search_area.height);
    let height = (rows as u16 + 2).min(screen.height.saturating_sub(top));
    if height < 3 {
        return;
    }
    let dropdown = Rect {
        x: search_area.x.saturating_add(1),
        y: top,
        width: search_area
            .width
            .saturating_sub(2)
            .max(20)
            .min(screen.width.saturating_sub(search_area.x + 1)),
        height,
    };
    draw_suggestions_in(frame, app, dropdown, palette, glyphs);
}

pub(crate) fn draw_suggestions_in<A: CatalogApi>(
    frame: &mut Frame,
    app: &App<A>,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let Some(list) = app.suggestions() else {
        return;
    };
    let selected = list.selected_index();
    let text_width = area.width.saturating_sub(6) as usize;

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(palette.text_muted)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let entry = |index: usize, glyph: &str, text: &str| {
        let style = if selected == Some(index) {
            styles::selected_row(palette)
        } else {
            Style::default().fg(palette.text_primary)
        };
        Line::from(vec![
            Span::styled(format!(" {glyph} "), Style::default().fg(palette.primary)),
            Span::styled(
                truncate_to_width(&sanitize_display(text), text_width, glyphs.ellipsis),
                style,
            ),
        ])
    };

    let mut lines = Vec::new();
    let mut highlighted = 0;
    let mut recent = list.recent().peekable();
    if recent.peek().is_some() {
        lines.push(heading("Recent searches"));
        for (index, suggestion) in recent {
            if selected == Some(index) {
                highlighted = lines.len();
            }
            lines.push(entry(index, glyphs.recent, &suggestion.text));
        }
    }
    lines.push(heading("Categories"));
    for (index, suggestion) in list.categories() {
        if selected == Some(index) {
            highlighted = lines.len();
        }
        lines.push(entry(index, glyphs.category, &suggestion.text));
    }
    lines.push(heading("Tips"));
    for tip in SEARCH_TIPS {
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", glyphs.tip), Style::default().fg(palette.text_muted)),
            Span::styled(
                truncate_to_width(tip, text_width, glyphs.ellipsis),
                Style::default().fg(palette.text_muted),
            ),
        ]));
    }

    // Keep the highlighted entry on screen.
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = highlighted.saturating_sub(visible.saturating_sub(1)) as u16;

    frame.render_widget(Clear, area);
    let panel = Paragraph::new(lines).scroll((scroll, 0)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(palette.success))
            .style(Style::default().bg(palette.bg_panel)),
    );
    frame.render_widget(panel, area);
}

pub(crate) fn draw_filters<A: CatalogApi>(frame: &mut Frame, app: &App<A>, palette: &Palette) {
    let area = frame.area();
    let width = 56.min(area.width.saturating_sub(4));
    let height = 13.min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width) / 2),
        y: area.y + (area.height.saturating_sub(height) / 3),
        width,
        height,
    };
    frame.render_widget(Clear, popup);

    let form = app.filter_form();
    let mut lines = vec![Line::from("")];
    let mut cursor = None;
    for field in FilterField::ALL {
        let focused = form.focus() == field;
        let draft = form.field(field);
        let label_style = if focused {
            styles::key_highlight(palette)
        } else {
            Style::default().fg(palette.text_secondary)
        };
        let label = format!("  {:<14}", field.label());
        let value = if draft.text().is_empty() {
            Span::styled(
                field.placeholder(),
                Style::default()
                    .fg(palette.text_muted)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Span::styled(draft.text().to_string(), Style::default().fg(palette.text_primary))
        };
        if focused {
            let before = &draft.text()[..draft.byte_index()];
            cursor = Some((
                popup.x + 1 + label.width() as u16 + before.width() as u16,
                popup.y + 1 + lines.len() as u16,
            ));
        }
        lines.push(Line::from(vec![Span::styled(label, label_style), value]));
        lines.push(Line::from(""));
    }

    if let Some(error) = form.error() {
        lines.push(Line::from(Span::styled(
            format!("  {error}"),
            Style::default().fg(palette.error),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "  Exclude terms are comma separated",
            Style::default().fg(palette.text_muted),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Tab", styles::key_highlight(palette)),
        Span::styled(" next  ", styles::key_hint(palette)),
        Span::styled("Enter", styles::key_highlight(palette)),
        Span::styled(" apply  ", styles::key_hint(palette)),
        Span::styled("Ctrl+R", styles::key_highlight(palette)),
        Span::styled(" clear  ", styles::key_hint(palette)),
        Span::styled("Esc", styles::key_highlight(palette)),
        Span::styled(" cancel", styles::key_hint(palette)),
    ]));

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(palette.warning))
            .style(Style::default().bg(palette.bg_panel))
            .title(Line::from(Span::styled(" Filters ", styles::title(palette)))),
    );
    frame.render_widget(panel, popup);

    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}
