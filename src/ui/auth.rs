use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::{popup, spinner};
use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.auth;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let title = Line::from(Span::styled(
        "hit",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));

    if view.checking {
        let lines = vec![
            title,
            Line::from(""),
            Line::from(format!("{} Looking for GitHub credentials...", spinner(app))),
        ];
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            chunks[1],
        );
        return;
    }

    let lines = vec![
        title,
        Line::from(""),
        Line::from("No GitHub credentials found (GH_TOKEN, GITHUB_TOKEN, gh)."),
        Line::from("Paste a personal access token to continue."),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        chunks[1],
    );

    let width = chunks[2].width.min(70);
    let field_area = Rect {
        x: chunks[2].x + (chunks[2].width - width) / 2,
        width,
        ..chunks[2]
    };
    popup::render_field(frame, "Token", &view.input, true, field_area);

    let hint = Paragraph::new(Line::from(Span::styled(
        "enter: submit | esc: quit",
        Style::default().fg(Color::Gray),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(hint, chunks[3]);
}
