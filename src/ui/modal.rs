// Modal UI components.
// The download success dialog and the contact form, drawn centred over the current view.

use ratatui::{prelude::*, widgets::*};

use crate::state::{ContactDraft, ContactField};
use crate::widgets::FormStatus;

/// Centre a `width` x `height` box in `area`, clipped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

/// Draw the download success modal.
pub fn draw_success_modal(frame: &mut Frame) {
    let modal_area = centered(frame.area(), 44, 7);
    frame.render_widget(Clear, modal_area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "✅ Resume download started",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Download "),
    );
    frame.render_widget(widget, modal_area);
}

/// Draw the contact form with its status line.
pub fn draw_contact_modal(
    frame: &mut Frame,
    draft: &ContactDraft,
    status: Option<&FormStatus>,
    sending: bool,
) {
    let modal_area = centered(frame.area(), 64, 17);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Contact ");
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Length(3), // Email
            Constraint::Length(3), // Subject
            Constraint::Length(3), // Message
            Constraint::Length(1), // Status
            Constraint::Min(1),    // Instructions
        ])
        .split(inner);

    for (field, area) in ContactField::ALL.iter().zip(chunks.iter()) {
        let focused = *field == draft.focus;
        let border = if focused { Color::Yellow } else { Color::DarkGray };

        let mut line = vec![Span::raw(draft.value(*field))];
        if focused {
            line.push(Span::styled("█", Style::default().fg(Color::Yellow)));
        }

        let input = Paragraph::new(Line::from(line)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(format!(" {} ", field.label())),
        );
        frame.render_widget(input, *area);
    }

    let status_line = if sending {
        Line::from(Span::styled("Sending...", Style::default().fg(Color::Yellow)))
    } else {
        match status {
            Some(FormStatus::Error(message)) => Line::from(Span::styled(
                format!("⚠️ {}", message),
                Style::default().fg(Color::Red),
            )),
            Some(FormStatus::Success(message)) => Line::from(Span::styled(
                format!("✅ {}", message),
                Style::default().fg(Color::Green),
            )),
            None => Line::from(""),
        }
    };
    frame.render_widget(
        Paragraph::new(status_line).alignment(Alignment::Center),
        chunks[4],
    );

    let instructions = Line::from(vec![
        Span::styled(" Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" = Send  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::styled(" = Next field  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" = Close ", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(
        Paragraph::new(instructions).alignment(Alignment::Center),
        chunks[5],
    );
}
