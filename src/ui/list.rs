// Card list rendering.
// Repository cards as a selectable list, with loading, error and empty states.

use ratatui::{prelude::*, widgets::*};

use crate::render::{Card, Grid, PortfolioView};
use crate::state::{CardSelection, LoadingState};

/// Parse a `#rrggbb` colour; anything else is grey.
pub fn hex_color(hex: &str) -> Color {
    let parse = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|part| u8::from_str_radix(part, 16).ok())
    };
    match (hex.len(), hex.starts_with('#')) {
        (7, true) => match (parse(1..3), parse(3..5), parse(5..7)) {
            (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
            _ => Color::Gray,
        },
        _ => Color::Gray,
    }
}

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, area);
}

/// Render an error message.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let text = Paragraph::new(vec![
        Line::from(format!("❌ {}", error)),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to retry",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::Red));
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

/// Render the portfolio section in whichever state it is in.
pub fn render_portfolio(
    frame: &mut Frame,
    view: &PortfolioView,
    selection: &mut CardSelection,
    area: Rect,
) {
    match &view.state {
        LoadingState::Idle => render_empty(frame, area, "Press r to load repositories"),
        LoadingState::Loading => render_loading(frame, area, "Loading repositories"),
        LoadingState::Error(e) => render_error(frame, area, e),
        LoadingState::Loaded(grid) => render_cards(frame, grid, selection, area),
    }
}

fn render_cards(frame: &mut Frame, grid: &Grid, selection: &mut CardSelection, area: Rect) {
    let items: Vec<ListItem> = grid.cards.iter().map(card_item).collect();

    let list_widget = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Projects "))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, area, &mut selection.list_state);
}

fn card_item(card: &Card) -> ListItem<'_> {
    let mut title = vec![Span::styled(
        card.name.as_str(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(language) = &card.language {
        title.push(Span::raw("  "));
        title.push(Span::styled(
            format!(" {} ", language.name),
            Style::default()
                .fg(Color::White)
                .bg(hex_color(language.color)),
        ));
    }

    let mut stats = vec![
        Span::styled(format!("  ⭐ {}", card.stars), Style::default().fg(Color::Yellow)),
        Span::styled(format!("  🍴 {}", card.forks), Style::default().fg(Color::DarkGray)),
    ];
    if let Some(updated) = &card.updated {
        stats.push(Span::styled(
            format!("  🕒 {}", updated),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if !card.topics.is_empty() {
        stats.push(Span::styled(
            format!("  #{}", card.topics.join(" #")),
            Style::default().fg(Color::Blue),
        ));
    }

    ListItem::new(vec![
        Line::from(title),
        Line::from(Span::styled(
            format!("  {}", card.description),
            Style::default().fg(Color::White),
        )),
        Line::from(stats),
        Line::from(""),
    ])
}
