//! Single-game view.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use shelf_engine::{App, ArtworkState, CatalogApi, FetchState, GameDetails};
use shelf_types::{sanitize_display, strip_markup};

use crate::format::wrapped_line_count;
use crate::theme::{Glyphs, Palette, spinner_frame, styles};
use crate::{draw_error_panel, panel_block};

pub(crate) fn draw_detail<A: CatalogApi>(
    frame: &mut Frame,
    app: &App<A>,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let Some(detail) = app.detail() else {
        return;
    };

    let details = match &detail.state {
        FetchState::Loading => {
            let spinner = spinner_frame(app.spinner_frame(), app.ui_options());
            let loading = Paragraph::new(Line::from(vec![
                Span::styled(format!("{spinner} "), Style::default().fg(palette.primary)),
                Span::styled(
                    format!("Loading game {}...", detail.app),
                    Style::default().fg(palette.text_secondary),
                ),
            ]))
            .alignment(Alignment::Center)
            .block(panel_block(palette, " Game "));
            frame.render_widget(loading, area);
            return;
        }
        FetchState::Failed(failure) => {
            draw_error_panel(frame, failure, area, palette, glyphs, "Esc", "Back to list");
            return;
        }
        FetchState::Ready(details) => details,
    };

    let title = format!(" {} ", sanitize_display(details.name.trim()));
    let block = panel_block(palette, &title).title_bottom(
        Line::from(vec![
            Span::styled("j/k", styles::key_highlight(palette)),
            Span::styled(" scroll  ", styles::key_hint(palette)),
            Span::styled("Esc", styles::key_highlight(palette)),
            Span::styled(" back ", styles::key_hint(palette)),
        ])
        .alignment(Alignment::Right),
    );
    let inner = block.inner(area);

    let mut lines = Vec::new();
    lines.push(Line::from(vec![
        Span::styled("App ID ", Style::default().fg(palette.text_muted)),
        Span::styled(details.steam_appid.to_string(), Style::default().fg(palette.accent)),
    ]));
    lines.push(artwork_line(&detail.artwork, app, palette, glyphs));
    lines.push(Line::from(""));
    push_facts(&mut lines, details, palette, glyphs);

    let summary = details.summary();
    if !summary.is_empty() {
        lines.push(Line::from(""));
        for paragraph in sanitize_display(&summary).lines() {
            lines.push(Line::from(Span::styled(
                paragraph.trim().to_string(),
                Style::default().fg(palette.text_primary),
            )));
        }
    }

    push_media(&mut lines, details, palette);
    push_requirements(&mut lines, details, palette, glyphs);

    // Stop scrolling once the last line is on screen.
    let content_rows = wrapped_line_count(&lines, inner.width);
    let max_scroll = content_rows.saturating_sub(inner.height);
    let scroll = detail.scroll.min(max_scroll);

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(block);
    frame.render_widget(body, area);
}

fn artwork_line<A: CatalogApi>(
    artwork: &ArtworkState,
    app: &App<A>,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Line<'static> {
    match artwork {
        ArtworkState::Resolving => Line::from(Span::styled(
            format!(
                "{} resolving artwork",
                spinner_frame(app.spinner_frame(), app.ui_options())
            ),
            Style::default().fg(palette.text_muted),
        )),
        ArtworkState::Found(url) => Line::from(vec![
            Span::styled(format!("{} ", glyphs.artwork), Style::default().fg(palette.success)),
            Span::styled(
                sanitize_display(url).into_owned(),
                Style::default()
                    .fg(palette.blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]),
        ArtworkState::Missing => Line::from(Span::styled(
            format!("{} no artwork available", glyphs.no_artwork),
            Style::default().fg(palette.text_muted),
        )),
    }
}

fn fact(label: &'static str, value: String, palette: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<12}"), Style::default().fg(palette.text_muted)),
        Span::styled(value, Style::default().fg(palette.text_primary)),
    ])
}

fn push_facts(
    lines: &mut Vec<Line<'static>>,
    details: &GameDetails,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    if let Some(price) = details.price_label() {
        let mut line = fact("Price", price, palette);
        if let Some(overview) = details.price_overview.as_ref().filter(|p| p.is_discounted()) {
            line.push_span(Span::styled(
                format!("  -{}% ", overview.discount()),
                Style::default()
                    .fg(palette.success)
                    .add_modifier(Modifier::BOLD),
            ));
            line.push_span(Span::styled(
                overview.formatted_initial(),
                Style::default()
                    .fg(palette.text_muted)
                    .add_modifier(Modifier::CROSSED_OUT),
            ));
        }
        lines.push(line);
    }
    if let Some(release) = details.release_label() {
        lines.push(fact("Released", sanitize_display(&release).into_owned(), palette));
    }

    let joined = |values: &[String]| {
        values
            .iter()
            .map(|v| sanitize_display(v.trim()).into_owned())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let developers = joined(&details.developers);
    if !developers.is_empty() {
        lines.push(fact("Developer", developers, palette));
    }
    let publishers = joined(&details.publishers);
    if !publishers.is_empty() {
        lines.push(fact("Publisher", publishers, palette));
    }

    let genres = details.genre_labels().join(&format!(" {} ", glyphs.bullet));
    if !genres.is_empty() {
        lines.push(fact("Genres", sanitize_display(&genres).into_owned(), palette));
    }
    lines.push(fact("Languages", joined(&details.languages()), palette));
    if let Some(contact) = details.support_contact() {
        lines.push(fact("Support", sanitize_display(contact).into_owned(), palette));
    }
}

fn push_media(lines: &mut Vec<Line<'static>>, details: &GameDetails, palette: &Palette) {
    if details.featured_trailer().is_some() || !details.screenshots.is_empty() {
        lines.push(Line::from(""));
    }
    if let Some(trailer) = details.featured_trailer() {
        lines.push(fact(
            "Trailer",
            sanitize_display(trailer.name.trim()).into_owned(),
            palette,
        ));
    }
    if !details.screenshots.is_empty() {
        lines.push(fact(
            "Screenshots",
            details.screenshots.len().to_string(),
            palette,
        ));
    }
}

fn push_requirements(
    lines: &mut Vec<Line<'static>>,
    details: &GameDetails,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    if let Some(requirements) = &details.pc_requirements {
        let minimum = strip_markup(&requirements.minimum);
        let minimum = sanitize_display(minimum.trim());
        if !minimum.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "System requirements",
                styles::title(palette),
            )));
            for line in minimum.lines().filter(|l| !l.trim().is_empty()) {
                lines.push(Line::from(vec![
                    Span::styled(format!("{} ", glyphs.bullet), Style::default().fg(palette.text_muted)),
                    Span::styled(line.trim().to_string(), Style::default().fg(palette.text_secondary)),
                ]));
            }
        }
    }
}
