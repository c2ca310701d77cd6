use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use super::{format_age, popup, selected_style, spinner, status_line, truncate};
use crate::app::App;
use crate::types::Branch;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.branches;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let title = if view.filter.is_empty() {
        format!(" Branches ({}) ", view.visible_len())
    } else {
        format!(" Branches ({}) /{} ", view.visible_len(), view.filter.value())
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if view.visible_len() == 0 {
        let text = if view.is_loading() {
            format!("{} Loading branches...", spinner(app))
        } else {
            "No branches".to_string()
        };
        let empty = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, chunks[0]);
    } else {
        let w = chunks[0].width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = view
            .visible()
            .enumerate()
            .map(|(i, branch)| ListItem::new(branch_line(branch, i == view.selected, w)))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray));

        let mut state = ListState::default();
        state.select(Some(view.selected));
        frame.render_stateful_widget(list, chunks[0], &mut state);
    }

    if view.filtering {
        let line = Line::from(vec![
            Span::styled("/", Style::default().fg(Color::Cyan)),
            Span::raw(view.filter.value().to_string()),
        ]);
        frame.render_widget(Paragraph::new(line), chunks[1]);
        let x = chunks[1].x + 1 + view.filter.cursor() as u16;
        frame.set_cursor_position((x, chunks[1].y));
    } else if let Some(status) = &view.status {
        frame.render_widget(Paragraph::new(status_line(status, spinner(app))), chunks[1]);
    }

    if let Some(overlay) = view.overlay.get() {
        popup::render_overlay(frame, overlay);
    }
}

fn tracking(branch: &Branch) -> String {
    let mut parts = Vec::new();
    if branch.has_upstream && (branch.ahead > 0 || branch.behind > 0) {
        parts.push(format!("↑{} ↓{}", branch.ahead, branch.behind));
    }
    if let Some(cmp) = &branch.default_compare {
        if cmp.ahead > 0 || cmp.behind > 0 {
            parts.push(format!("{}: +{} -{}", cmp.branch, cmp.ahead, cmp.behind));
        }
    }
    parts.join("  ")
}

fn branch_line(branch: &Branch, selected: bool, width: usize) -> Line<'static> {
    let marker = if branch.is_current { "* " } else { "  " };
    let name_width = 28;
    let track = tracking(branch);
    let fixed = 2 + name_width + 1 + 8 + 1 + 5 + 1 + track.chars().count() + 1;
    let flex = width.saturating_sub(fixed).max(10);

    let name_color = if branch.is_current {
        Color::Green
    } else {
        Color::White
    };

    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Green)),
        Span::styled(
            format!("{:<name_width$}", truncate(&branch.name, name_width)),
            selected_style(selected).fg(name_color),
        ),
        Span::raw(" "),
        Span::styled(
            format!("{:<8}", branch.short_hash),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(" "),
        Span::styled(
            format!("{:>5}", format_age(branch.timestamp)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::raw(format!("{:<flex$}", truncate(&branch.subject, flex))),
        Span::raw(" "),
        Span::styled(track, Style::default().fg(Color::Magenta)),
    ])
}
