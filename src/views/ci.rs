use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};

use crate::command::Command;
use crate::forge::Forge;
use crate::log_parse::{is_error_line, parse_annotations};
use crate::msg::{CiMsg, Msg};
use crate::pane::{nav_key, step, Depth, Nav, PaneState, Selectable};
use crate::types::{ErrorAnnotation, Job, Step, WorkflowRun};
use crate::views::{Hint, Status, View};

/// Scrollable job log
#[derive(Debug, Default)]
pub struct LogView {
    pub lines: Vec<String>,
    /// Parallel to `lines`
    pub errors: Vec<bool>,
    pub annotations: Vec<ErrorAnnotation>,
    pub scroll: usize,
    pub height: usize,
}

impl LogView {
    fn set_content(&mut self, text: &str) {
        self.lines = text.lines().map(str::to_string).collect();
        self.errors = self.lines.iter().map(|l| is_error_line(l)).collect();
        self.annotations = parse_annotations(text);
        self.scroll = self.max_scroll();
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.errors.clear();
        self.annotations.clear();
        self.scroll = 0;
    }

    pub fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.height.max(1))
    }

    fn navigate(&mut self, nav: Nav) {
        self.scroll = step(self.scroll, self.max_scroll() + 1, nav, self.height);
    }
}

/// Workflow runs of one branch: runs → jobs → steps → log
#[derive(Debug)]
pub struct CiView {
    forge: Arc<dyn Forge>,
    pub branch: String,
    page_size: u8,
    pub pane: PaneState,
    pub runs: Selectable<WorkflowRun>,
    pub jobs: Selectable<Job>,
    pub steps: Selectable<Step>,
    pub log: LogView,
    pub selected_run: Option<WorkflowRun>,
    pub selected_job: Option<Job>,
    /// Run whose jobs are being fetched
    pending_run: Option<WorkflowRun>,
    pub status: Option<Status>,
    pub width: u16,
    pub height: u16,
}

impl CiView {
    pub fn new(forge: Arc<dyn Forge>, branch: String, page_size: u8) -> Self {
        Self {
            forge,
            branch,
            page_size,
            pane: PaneState::new(Depth::Content),
            runs: Selectable::default(),
            jobs: Selectable::default(),
            steps: Selectable::default(),
            log: LogView::default(),
            selected_run: None,
            selected_job: None,
            pending_run: None,
            status: None,
            width: 0,
            height: 0,
        }
    }

    pub fn depth(&self) -> Depth {
        self.pane.depth()
    }

    pub fn is_loading(&self) -> bool {
        self.pane.is_loading()
    }

    /// `CI > run > job > log`
    pub fn breadcrumb(&self) -> Vec<String> {
        let mut crumbs = vec![format!("CI ({})", self.branch)];
        if let Some(run) = &self.selected_run {
            crumbs.push(format!("{} #{}", run.display_name(), run.run_number));
        }
        if let Some(job) = &self.selected_job {
            crumbs.push(job.name.clone());
        }
        if self.depth() == Depth::Content {
            crumbs.push("log".to_string());
        }
        crumbs
    }

    fn page(&self) -> usize {
        usize::from(self.height.saturating_sub(4)).max(1)
    }

    fn list_runs(&mut self) -> Vec<Command> {
        self.pending_run = None;
        vec![Command::ListRuns {
            forge: self.forge.clone(),
            branch: self.branch.clone(),
            per_page: self.page_size,
            generation: self.pane.begin_fetch(),
        }]
    }

    fn enter(&mut self) -> Vec<Command> {
        if self.pane.is_loading() {
            return Vec::new();
        }
        match self.pane.depth() {
            Depth::List => {
                let Some(run) = self.runs.selected().cloned() else {
                    return Vec::new();
                };
                let run_id = run.id;
                self.pending_run = Some(run);
                self.status = None;
                vec![Command::ListJobs {
                    forge: self.forge.clone(),
                    run_id,
                    generation: self.pane.begin_fetch(),
                }]
            }
            Depth::Detail => {
                if let Some(job) = self.jobs.selected().cloned() {
                    self.steps.set_items(job.steps.clone());
                    self.selected_job = Some(job);
                    self.pane.descend();
                }
                Vec::new()
            }
            Depth::SubDetail => {
                let Some(job_id) = self.selected_job.as_ref().map(|j| j.id) else {
                    return Vec::new();
                };
                self.status = None;
                vec![Command::FetchLog {
                    forge: self.forge.clone(),
                    job_id,
                    generation: self.pane.begin_fetch(),
                }]
            }
            Depth::Content => Vec::new(),
        }
    }

    fn back(&mut self) {
        let Some(left) = self.pane.back() else {
            // abandon a drill-down still in flight
            if self.pending_run.take().is_some() {
                self.pane.cancel();
                self.status = None;
            }
            return;
        };
        match left {
            Depth::Detail => self.selected_run = None,
            Depth::SubDetail => self.selected_job = None,
            Depth::Content => self.log.clear(),
            Depth::List => {}
        }
        self.pending_run = None;
        self.status = None;
    }

    fn navigate(&mut self, nav: Nav) {
        let page = self.page();
        match self.pane.depth() {
            Depth::List => self.runs.navigate(nav, page),
            Depth::Detail => self.jobs.navigate(nav, page),
            Depth::SubDetail => self.steps.navigate(nav, page),
            Depth::Content => self.log.navigate(nav),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if let Some(nav) = nav_key(&key) {
            self.navigate(nav);
            return Vec::new();
        }
        match key.code {
            KeyCode::Enter => self.enter(),
            KeyCode::Esc => {
                self.back();
                Vec::new()
            }
            KeyCode::Char('r') if self.pane.depth() == Depth::List => {
                self.status = None;
                self.list_runs()
            }
            _ => Vec::new(),
        }
    }

    fn handle_completion(&mut self, msg: CiMsg) -> Vec<Command> {
        match msg {
            CiMsg::RunsLoaded { generation, result } => {
                if !self.pane.settle(generation) {
                    return Vec::new();
                }
                match result {
                    Ok(runs) => self.runs.set_items(runs),
                    Err(e) => {
                        tracing::warn!(error = %e, branch = %self.branch, "listing runs failed");
                        self.status = Some(Status::error(format!("Error: {e}")));
                    }
                }
            }
            CiMsg::JobsLoaded {
                generation,
                run_id,
                result,
            } => {
                if !self.pane.settle(generation) {
                    return Vec::new();
                }
                let pending = self.pending_run.take();
                match result {
                    Ok(jobs) => {
                        self.jobs.set_items(jobs);
                        self.selected_run =
                            pending.or_else(|| self.runs.items().iter().find(|r| r.id == run_id).cloned());
                        self.pane.descend();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, run_id, "listing jobs failed");
                        self.status = Some(Status::error(format!("Error: {e}")));
                    }
                }
            }
            CiMsg::LogLoaded {
                generation,
                job_id,
                result,
            } => {
                if !self.pane.settle(generation) {
                    return Vec::new();
                }
                match result {
                    Ok(text) => {
                        self.log.set_content(&text);
                        self.pane.descend();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, job_id, "fetching log failed");
                        self.status = Some(Status::error(format!("Error: {e}")));
                    }
                }
            }
        }
        Vec::new()
    }
}

impl View for CiView {
    fn init(&mut self) -> Vec<Command> {
        self.list_runs()
    }

    fn update(&mut self, msg: Msg) -> Vec<Command> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Ci(msg) => self.handle_completion(msg),
            _ => Vec::new(),
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        // breadcrumb, log header, borders
        self.log.height = usize::from(height.saturating_sub(4)).max(1);
    }

    fn hints(&self) -> Vec<Hint> {
        match self.pane.depth() {
            Depth::List => vec![("enter", "jobs"), ("r", "refresh")],
            Depth::Detail => vec![("enter", "steps"), ("esc", "back")],
            Depth::SubDetail => vec![("enter", "log"), ("esc", "back")],
            Depth::Content => vec![("j/k", "scroll"), ("g/G", "top/bottom"), ("esc", "back")],
        }
    }
}
