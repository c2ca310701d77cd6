use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use super::{format_age, popup, selected_style, status_line, truncate};
use crate::pane::Depth;
use crate::views::org::OrgView;

pub fn render(frame: &mut Frame, view: &OrgView, spinner: &str, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let crumbs = view.breadcrumb().join(" > ");
    frame.render_widget(
        Paragraph::new(Span::styled(crumbs, Style::default().fg(Color::Cyan))),
        chunks[0],
    );

    match view.depth() {
        Depth::List => render_orgs(frame, view, chunks[1]),
        _ => render_repos(frame, view, chunks[1]),
    }

    if view.is_loading() {
        let line = Line::from(Span::styled(
            format!("{spinner} Loading..."),
            Style::default().fg(Color::Yellow),
        ));
        frame.render_widget(Paragraph::new(line), chunks[2]);
    } else if let Some(status) = &view.status {
        frame.render_widget(Paragraph::new(status_line(status, spinner)), chunks[2]);
    }

    if let Some(overlay) = view.overlay.get() {
        popup::render_overlay(frame, overlay);
    }
}

fn render_orgs(frame: &mut Frame, view: &OrgView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Organizations ({}) ", view.orgs.len()));

    if view.orgs.is_empty() {
        let text = if view.is_loading() { "" } else { "No organizations" };
        let empty = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = view
        .orgs
        .items()
        .iter()
        .enumerate()
        .map(|(i, org)| {
            let mut spans = vec![Span::styled(
                org.login.clone(),
                selected_style(i == view.orgs.index()),
            )];
            if let Some(description) = org.description.as_deref().filter(|d| !d.is_empty()) {
                spans.push(Span::styled(
                    format!("  {description}"),
                    Style::default().fg(Color::Gray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));
    let mut state = ListState::default();
    state.select(Some(view.orgs.index()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_repos(frame: &mut Frame, view: &OrgView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Repositories ({}) ", view.repos.len()));

    if view.repos.is_empty() {
        let empty = Paragraph::new("No repositories")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let name_width = 30;
    let fixed = name_width + 1 + 22 + 1 + 4;
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = view
        .repos
        .items()
        .iter()
        .enumerate()
        .map(|(i, repo)| {
            let mut badges = String::new();
            if repo.archived {
                badges.push_str("[archived]");
            }
            if repo.private {
                if !badges.is_empty() {
                    badges.push(' ');
                }
                badges.push_str("[private]");
            }
            let description = repo.description.as_deref().unwrap_or("");
            let age = repo.updated_at.map(format_age).unwrap_or_default();

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<name_width$}", truncate(&repo.name, name_width)),
                    selected_style(i == view.repos.index()),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:<22}", badges),
                    Style::default().fg(Color::Magenta),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:<flex$}", truncate(description, flex)),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(format!("{:>4}", age), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));
    let mut state = ListState::default();
    state.select(Some(view.repos.index()));
    frame.render_stateful_widget(list, area, &mut state);
}
