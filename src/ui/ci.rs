use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use super::{format_age, selected_style, status_line, truncate};
use crate::pane::Depth;
use crate::types::{status_badge, Conclusion, RunStatus};
use crate::views::ci::{CiView, LogView};

fn badge_color(status: RunStatus, conclusion: Option<Conclusion>) -> Color {
    if status.is_active() {
        return Color::Yellow;
    }
    match conclusion {
        Some(Conclusion::Success) => Color::Green,
        Some(Conclusion::Failure) | Some(Conclusion::TimedOut) => Color::Red,
        _ => Color::Gray,
    }
}

fn badge(status: RunStatus, conclusion: Option<Conclusion>) -> Span<'static> {
    Span::styled(
        status_badge(status, conclusion),
        Style::default().fg(badge_color(status, conclusion)),
    )
}

pub fn render(frame: &mut Frame, view: &CiView, spinner: &str, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_breadcrumb(frame, view, chunks[0]);

    match view.depth() {
        Depth::List => render_runs(frame, view, chunks[1]),
        Depth::Detail => render_jobs(frame, view, chunks[1]),
        Depth::SubDetail => render_steps(frame, view, chunks[1]),
        Depth::Content => render_log(frame, &view.log, chunks[1]),
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
}

fn render_breadcrumb(frame: &mut Frame, view: &CiView, area: Rect) {
    let crumbs = view.breadcrumb();
    let last = crumbs.len().saturating_sub(1);
    let mut spans = Vec::new();
    for (i, crumb) in crumbs.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
        }
        let style = if i == last {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(crumb, style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list(
    frame: &mut Frame,
    title: String,
    items: Vec<ListItem>,
    selected: usize,
    empty: &str,
    area: Rect,
) {
    let block = Block::default().borders(Borders::ALL).title(title);
    if items.is_empty() {
        let text = Paragraph::new(empty.to_string())
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(text, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));
    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_runs(frame: &mut Frame, view: &CiView, area: Rect) {
    let w = area.width.saturating_sub(2) as usize;
    let fixed = 2 + 7 + 1 + 8 + 1 + 10 + 1 + 4; // badge, #num, sha, event, age
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = view
        .runs
        .items()
        .iter()
        .enumerate()
        .map(|(i, run)| {
            ListItem::new(Line::from(vec![
                badge(run.status, run.conclusion),
                Span::raw(" "),
                Span::styled(
                    format!("#{:<6}", run.run_number),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:<flex$}", truncate(run.display_name(), flex)),
                    selected_style(i == view.runs.index()),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:<8}", run.short_sha()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:<10}", truncate(&run.event, 10)),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:>4}", format_age(run.created_at)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let title = format!(" Workflow runs ({}) ", view.runs.len());
    let empty = if view.is_loading() {
        ""
    } else {
        "No workflow runs for this branch"
    };
    render_list(frame, title, items, view.runs.index(), empty, area);
}

fn render_jobs(frame: &mut Frame, view: &CiView, area: Rect) {
    let items: Vec<ListItem> = view
        .jobs
        .items()
        .iter()
        .enumerate()
        .map(|(i, job)| {
            let duration = job
                .duration()
                .map(|d| format!("{}m{:02}s", d.num_minutes(), d.num_seconds() % 60))
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                badge(job.status, job.conclusion),
                Span::raw(" "),
                Span::styled(job.name.clone(), selected_style(i == view.jobs.index())),
                Span::raw("  "),
                Span::styled(duration, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let title = format!(" Jobs ({}) ", view.jobs.len());
    render_list(frame, title, items, view.jobs.index(), "No jobs", area);
}

fn render_steps(frame: &mut Frame, view: &CiView, area: Rect) {
    let items: Vec<ListItem> = view
        .steps
        .items()
        .iter()
        .enumerate()
        .map(|(i, step)| {
            ListItem::new(Line::from(vec![
                badge(step.status, step.conclusion),
                Span::raw(" "),
                Span::styled(
                    format!("{:>2}.", step.number),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(step.name.clone(), selected_style(i == view.steps.index())),
            ]))
        })
        .collect();

    let title = format!(" Steps ({}) - enter for log ", view.steps.len());
    render_list(frame, title, items, view.steps.index(), "No steps", area);
}

fn render_log(frame: &mut Frame, log: &LogView, area: Rect) {
    let header = match log.annotations.len() {
        0 => format!(" Log ({} lines) ", log.lines.len()),
        n => format!(" Log ({} lines, {} errors) ", log.lines.len(), n),
    };
    let block = Block::default().borders(Borders::ALL).title(header);

    let height = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = log
        .lines
        .iter()
        .zip(&log.errors)
        .skip(log.scroll)
        .take(height)
        .map(|(line, &error)| {
            let style = if error {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            Line::from(Span::styled(line.as_str(), style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
