use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::truncate;
use crate::views::history::HistoryView;

pub fn render(frame: &mut Frame, view: &HistoryView, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" History ");
    let inner_width = area.width.saturating_sub(2) as usize;

    let mut lines = Vec::new();
    for entry in &view.entries {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", entry.action), Style::default().fg(Color::Yellow)),
            Span::raw(truncate(&entry.detail, inner_width.saturating_sub(11))),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}  {}", entry.selector, entry.time_ago),
            Style::default().fg(Color::DarkGray),
        )));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No reflog entries",
            Style::default().fg(Color::Gray),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
