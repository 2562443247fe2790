// Toast overlay.

use ratatui::{prelude::*, widgets::*};

use crate::widgets::Toast;

use super::list::hex_color;

/// Draw `toast` in the bottom-right corner, above the status bar.
pub fn draw_toast(frame: &mut Frame, toast: &Toast) {
    let area = frame.area();
    let chars = u16::try_from(toast.message.chars().count()).unwrap_or(u16::MAX);
    let width = chars.saturating_add(4).min(area.width);
    let height = 3.min(area.height);
    let toast_area = Rect::new(
        area.x + area.width - width,
        area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    );

    frame.render_widget(Clear, toast_area);
    let background = hex_color(toast.level.color());
    let widget = Paragraph::new(toast.message.as_str())
        .style(Style::default().fg(Color::White).bg(background))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(background)),
        );
    frame.render_widget(widget, toast_area);
}
