use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::overlay::{Overlay, TextField};

/// Draw whichever overlay is open
pub fn render_overlay<A>(frame: &mut Frame, overlay: &Overlay<A>) {
    match overlay {
        Overlay::Confirm { title, message, .. } => render_confirm(frame, title, message),
        Overlay::Input { title, field, .. } => render_input(frame, title, field, false),
    }
}

fn popup_block(title: &str) -> Block<'static> {
    Block::default().borders(Borders::ALL).title(Span::styled(
        format!(" {} ", title),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

/// Render a centered confirmation popup: [y]es / [n]o / [esc]
pub fn render_confirm(frame: &mut Frame, title: &str, message: &str) {
    let area = centered_rect(60, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::raw(message.to_string())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Style::default().fg(Color::Green)),
            Span::raw("es  "),
            Span::styled("[n]", Style::default().fg(Color::Red)),
            Span::raw("o  "),
            Span::styled("[esc]", Style::default().fg(Color::Gray)),
            Span::raw(" cancel"),
        ]),
    ];

    let popup = Paragraph::new(lines)
        .block(popup_block(title))
        .alignment(Alignment::Center);

    frame.render_widget(popup, area);
}

/// Render a centered single-line text entry; `masked` hides the value
pub fn render_input(frame: &mut Frame, title: &str, field: &TextField, masked: bool) {
    let area = centered_rect(70, 3, frame.area());
    frame.render_widget(Clear, area);
    render_field(frame, title, field, masked, area);
}

/// Text field inside a bordered box at `area`, with the terminal cursor placed
pub fn render_field(frame: &mut Frame, title: &str, field: &TextField, masked: bool, area: Rect) {
    let shown = if masked {
        "•".repeat(field.value().chars().count())
    } else {
        field.value().to_string()
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    // keep the cursor visible on long values
    let skip = field.cursor().saturating_sub(inner_width.saturating_sub(1));
    let visible: String = shown.chars().skip(skip).collect();

    let input = Paragraph::new(visible).block(popup_block(title));
    frame.render_widget(input, area);

    let x = area.x + 1 + (field.cursor() - skip) as u16;
    frame.set_cursor_position(Position::new(x, area.y + 1));
}

/// Create a centered rect of at most `width` x `height` inside the outer rect
fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let popup_width = width.min(outer.width);
    let popup_height = height.min(outer.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((outer.height.saturating_sub(popup_height)) / 2),
            Constraint::Length(popup_height),
            Constraint::Min(0),
        ])
        .split(outer);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((outer.width.saturating_sub(popup_width)) / 2),
            Constraint::Length(popup_width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
