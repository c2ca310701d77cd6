mod auth;
mod branches;
mod ci;
mod history;
mod org;
mod popup;

use chrono::Utc;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::Frame;

use crate::app::{App, TopView};
use crate::views::{Status, StatusKind};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render(frame: &mut Frame, app: &App) {
    if app.current == TopView::Auth {
        auth::render(frame, app, frame.area());
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);
    render_repo_info(frame, app, chunks[1]);

    let layout = app.layout();
    let content = match layout.history_width {
        Some(width) => {
            let split = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(width)])
                .split(chunks[2]);
            history::render(frame, &app.history, split[1]);
            split[0]
        }
        None => chunks[2],
    };

    match app.current {
        TopView::Branches => branches::render(frame, app, content),
        TopView::Ci => match &app.ci {
            Some(ci) => ci::render(frame, ci, spinner(app), content),
            None => render_disabled(frame, "CI", content),
        },
        TopView::Org => match &app.org {
            Some(org) => org::render(frame, org, spinner(app), content),
            None => render_disabled(frame, "Org", content),
        },
        TopView::PullRequests => render_placeholder(frame, app.pull_requests.title, content),
        TopView::Reviews => render_placeholder(frame, app.reviews.title, content),
        TopView::Auth => {}
    }

    render_footer(frame, app, chunks[3]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<String> = TopView::DATA
        .iter()
        .enumerate()
        .map(|(i, view)| format!("{} {}", i + 1, view.title()))
        .collect();
    let selected = TopView::DATA
        .iter()
        .position(|v| *v == app.current)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::Gray).bg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_repo_info(frame: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;
    let mut spans = vec![
        Span::styled(
            session.display_name(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            session.repo.path().display().to_string(),
            Style::default().fg(Color::Gray),
        ),
    ];

    let tracked = app.branches.current_branch().is_some_and(|b| b.has_upstream);
    if tracked {
        if let Some(url) = &session.remote_url {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(url.clone(), Style::default().fg(Color::DarkGray)));
        }
    }
    if !session.is_connected() {
        spans.push(Span::styled("  (offline)", Style::default().fg(Color::Red)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan);
    let mut hints = app.active_view().map(|v| v.hints()).unwrap_or_default();
    if !app.claims_input() {
        hints.extend([("tab", "switch"), ("1-5", "views"), ("q", "quit")]);
    }

    let mut spans = Vec::new();
    for (i, (key, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(format!(": {label}"), Style::default().fg(Color::Gray)));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(footer, area);
}

fn render_disabled(frame: &mut Frame, title: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "));
    let text = Paragraph::new("Not connected to GitHub")
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

fn render_placeholder(frame: &mut Frame, title: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {title} "));
    let text = Paragraph::new("Coming soon")
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(text, area);
}

fn spinner(app: &App) -> &'static str {
    SPINNER[app.spinner % SPINNER.len()]
}

/// Status line rendered under a view's content
fn status_line(status: &Status, spinner: &str) -> Line<'static> {
    let (prefix, color) = match status.kind {
        StatusKind::Info => (String::new(), Color::Gray),
        StatusKind::Progress => (format!("{spinner} "), Color::Yellow),
        StatusKind::Success => ("✓ ".to_string(), Color::Green),
        StatusKind::Error => ("✗ ".to_string(), Color::Red),
    };
    Line::from(Span::styled(
        format!("{prefix}{}", status.text),
        Style::default().fg(color),
    ))
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

/// Cut to `max` characters, marking the cut with "..."
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn format_age(dt: chrono::DateTime<chrono::Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(dt);

    if duration.num_days() > 0 {
        format!("{}d", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m", duration.num_minutes())
    } else {
        "now".to_string()
    }
}
