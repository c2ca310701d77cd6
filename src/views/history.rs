use std::sync::Arc;

use crate::command::Command;
use crate::git::GitRepo;
use crate::msg::{HistoryMsg, Msg};
use crate::pane::FetchTracker;
use crate::types::ReflogEntry;
use crate::views::{Hint, View};

/// Side pane listing recent reflog entries; shown on wide terminals
#[derive(Debug)]
pub struct HistoryView {
    repo: Arc<dyn GitRepo>,
    limit: usize,
    pub entries: Vec<ReflogEntry>,
    fetch: FetchTracker,
    pub width: u16,
    pub height: u16,
}

impl HistoryView {
    pub fn new(repo: Arc<dyn GitRepo>, limit: usize) -> Self {
        Self {
            repo,
            limit,
            entries: Vec::new(),
            fetch: FetchTracker::default(),
            width: 0,
            height: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.is_loading()
    }

    fn load(&mut self) -> Vec<Command> {
        vec![Command::LoadReflog {
            repo: self.repo.clone(),
            limit: self.limit,
            generation: self.fetch.begin(),
        }]
    }
}

impl View for HistoryView {
    fn init(&mut self) -> Vec<Command> {
        self.load()
    }

    fn update(&mut self, msg: Msg) -> Vec<Command> {
        match msg {
            Msg::History(HistoryMsg::Refresh) => self.load(),
            Msg::History(HistoryMsg::Loaded { generation, result }) => {
                if !self.fetch.settle(generation) {
                    return Vec::new();
                }
                match result {
                    Ok(entries) => self.entries = entries,
                    // keep showing the previous entries
                    Err(e) => tracing::warn!(error = %e, "loading reflog failed"),
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    fn hints(&self) -> Vec<Hint> {
        Vec::new()
    }
}
