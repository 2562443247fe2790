// UI module for rendering the terminal preview.
// Header with the freshness badge, the card list, and overlays for toasts and modals.

mod list;
mod modal;
mod toast;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Mode};
use crate::render::PortfolioView;

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Cards
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let view = app.view.borrow().clone();

    draw_header(frame, &view, chunks[0]);
    list::render_portfolio(frame, &view, &mut app.selection, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    // Overlays, last drawn on top
    if app.modal.is_visible() {
        modal::draw_success_modal(frame);
    }
    if app.mode == Mode::Contact {
        let status = app.contact.status();
        modal::draw_contact_modal(frame, &app.draft, status.as_ref(), app.contact.is_sending());
    }
    if let Some(toast) = app.toasts.visible() {
        toast::draw_toast(frame, &toast);
    }
    if app.show_help {
        draw_help_overlay(frame);
    }
}

fn draw_header(frame: &mut Frame, view: &PortfolioView, area: Rect) {
    let mut spans = vec![Span::styled(
        " Projects ",
        Style::default().add_modifier(Modifier::BOLD),
    )];

    if let Some(grid) = view.state.data() {
        let color = if grid.from_cache {
            Color::Yellow
        } else {
            Color::Green
        };
        spans.push(Span::styled(
            format!(" {} ", grid.badge),
            Style::default().fg(color),
        ));
    }
    if view.refreshing {
        spans.push(Span::styled(
            " ⟳ refreshing",
            Style::default().fg(Color::Cyan),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut hints = vec![
        Span::raw(" ↑↓ "),
        Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
        Span::raw("  ↵/o "),
        Span::styled("Open", Style::default().fg(Color::DarkGray)),
        Span::raw("  r "),
        Span::styled("Refresh", Style::default().fg(Color::DarkGray)),
        Span::raw("  d "),
        Span::styled("Resume", Style::default().fg(Color::DarkGray)),
        Span::raw("  c "),
        Span::styled("Contact", Style::default().fg(Color::DarkGray)),
        Span::raw("  ? "),
        Span::styled("Help", Style::default().fg(Color::DarkGray)),
        Span::raw("  q "),
        Span::styled("Quit", Style::default().fg(Color::DarkGray)),
    ];

    if app.resume.is_busy() {
        hints.push(Span::styled(
            "  Preparing resume...",
            Style::default().fg(Color::Yellow),
        ));
    }

    let status = Paragraph::new(Line::from(hints));
    frame.render_widget(status, area);
}

fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = modal::centered(frame.area(), 46, 14);
    frame.render_widget(Clear, popup_area);

    let key = |keys: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(keys, Style::default().fg(Color::Cyan)),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        key("  ↑/↓ or j/k    ", "Select project"),
        key("  Enter or o    ", "Open project in browser"),
        key("  r             ", "Refresh repositories"),
        key("  d             ", "Download resume"),
        key("  c             ", "Contact form"),
        key("  Esc           ", "Dismiss toast / modal"),
        key("  ?             ", "Show/hide this help"),
        key("  q             ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help "),
    );
    frame.render_widget(help_paragraph, popup_area);
}
