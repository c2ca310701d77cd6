use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};

use crate::clone::Cloner;
use crate::command::Command;
use crate::config::{CloneConfig, CloneProtocol};
use crate::forge::Forge;
use crate::msg::{Msg, OrgMsg};
use crate::overlay::{OverlayOutcome, OverlaySlot};
use crate::pane::{nav_key, Depth, PaneState, Selectable};
use crate::types::{Org, OrgRepo};
use crate::views::{Hint, Status, View};

/// Repository waiting for a clone path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    pub url: String,
    pub repo_name: String,
}

/// Organizations of the signed-in user and their repositories
#[derive(Debug)]
pub struct OrgView {
    forge: Arc<dyn Forge>,
    cloner: Arc<dyn Cloner>,
    clone_config: CloneConfig,
    pub pane: PaneState,
    pub orgs: Selectable<Org>,
    pub repos: Selectable<OrgRepo>,
    pub selected_org: Option<Org>,
    pending_org: Option<Org>,
    pub overlay: OverlaySlot<CloneRequest>,
    /// Repository currently being cloned
    pub cloning: Option<String>,
    pub status: Option<Status>,
    pub width: u16,
    pub height: u16,
}

impl OrgView {
    pub fn new(forge: Arc<dyn Forge>, cloner: Arc<dyn Cloner>, clone_config: CloneConfig) -> Self {
        Self {
            forge,
            cloner,
            clone_config,
            pane: PaneState::new(Depth::Detail),
            orgs: Selectable::default(),
            repos: Selectable::default(),
            selected_org: None,
            pending_org: None,
            overlay: OverlaySlot::default(),
            cloning: None,
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

    pub fn breadcrumb(&self) -> Vec<String> {
        let mut crumbs = vec!["Org".to_string()];
        if let Some(org) = &self.selected_org {
            crumbs.push(org.login.clone());
        }
        crumbs
    }

    fn clone_url(&self, repo: &OrgRepo) -> String {
        match self.clone_config.protocol {
            CloneProtocol::Ssh => repo.ssh_url.clone(),
            CloneProtocol::Https => repo.clone_url.clone(),
        }
    }

    fn page(&self) -> usize {
        usize::from(self.height.saturating_sub(4)).max(1)
    }

    fn list_orgs(&mut self) -> Vec<Command> {
        self.pending_org = None;
        vec![Command::ListOrgs {
            forge: self.forge.clone(),
            generation: self.pane.begin_fetch(),
        }]
    }

    fn enter(&mut self) -> Vec<Command> {
        if self.pane.is_loading() {
            return Vec::new();
        }
        match self.pane.depth() {
            Depth::List => {
                let Some(org) = self.orgs.selected().cloned() else {
                    return Vec::new();
                };
                let login = org.login.clone();
                self.pending_org = Some(org);
                self.status = None;
                vec![Command::ListOrgRepos {
                    forge: self.forge.clone(),
                    org: login,
                    generation: self.pane.begin_fetch(),
                }]
            }
            _ => {
                if let Some(repo) = self.repos.selected() {
                    let request = CloneRequest {
                        url: self.clone_url(repo),
                        repo_name: repo.name.clone(),
                    };
                    let target = self.clone_config.target_for(&repo.name);
                    let title = format!("Clone {} into", repo.full_name);
                    self.overlay
                        .input(title, &target.to_string_lossy(), request);
                }
                Vec::new()
            }
        }
    }

    fn back(&mut self) {
        match self.pane.back() {
            Some(Depth::Detail) => self.selected_org = None,
            Some(_) => {}
            // abandon a drill-down still in flight
            None => {
                if self.pending_org.is_some() {
                    self.pane.cancel();
                }
            }
        }
        self.pending_org = None;
        self.status = None;
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match self.overlay.handle_key(&key) {
            OverlayOutcome::Submitted { value, action } => {
                let target = PathBuf::from(value);
                tracing::info!(url = %action.url, target = %target.display(), "cloning");
                self.status = Some(Status::progress(format!(
                    "Cloning {} into {}...",
                    action.repo_name,
                    target.display()
                )));
                self.cloning = Some(action.repo_name.clone());
                vec![Command::Clone {
                    cloner: self.cloner.clone(),
                    url: action.url,
                    target,
                    repo_name: action.repo_name,
                }]
            }
            OverlayOutcome::Cancelled(_) => {
                self.status = None;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if self.overlay.is_active() {
            return self.handle_overlay_key(key);
        }
        if let Some(nav) = nav_key(&key) {
            let page = self.page();
            match self.pane.depth() {
                Depth::List => self.orgs.navigate(nav, page),
                _ => self.repos.navigate(nav, page),
            }
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
                self.list_orgs()
            }
            _ => Vec::new(),
        }
    }

    fn handle_completion(&mut self, msg: OrgMsg) -> Vec<Command> {
        match msg {
            OrgMsg::OrgsLoaded { generation, result } => {
                if !self.pane.settle(generation) {
                    return Vec::new();
                }
                match result {
                    Ok(orgs) => self.orgs.set_items(orgs),
                    Err(e) => {
                        tracing::warn!(error = %e, "listing organizations failed");
                        self.status = Some(Status::error(format!("Error: {e}")));
                    }
                }
            }
            OrgMsg::ReposLoaded {
                generation,
                org,
                result,
            } => {
                if !self.pane.settle(generation) {
                    return Vec::new();
                }
                let pending = self.pending_org.take();
                match result {
                    Ok(repos) => {
                        self.repos.set_items(repos);
                        self.selected_org = pending.or(Some(Org {
                            login: org,
                            description: None,
                        }));
                        self.pane.descend();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, org = %org, "listing repositories failed");
                        self.status = Some(Status::error(format!("Error: {e}")));
                    }
                }
            }
            OrgMsg::Cloned {
                repo_name,
                target,
                result,
            } => {
                self.cloning = None;
                self.status = Some(match result {
                    Ok(()) => {
                        tracing::info!(repo = %repo_name, "clone finished");
                        Status::success(format!("Cloned {repo_name} into {}", target.display()))
                    }
                    Err(e) => {
                        tracing::warn!(repo = %repo_name, error = %e, "clone failed");
                        Status::error(format!("Clone failed: {e}"))
                    }
                });
            }
        }
        Vec::new()
    }
}

impl View for OrgView {
    fn init(&mut self) -> Vec<Command> {
        self.list_orgs()
    }

    fn update(&mut self, msg: Msg) -> Vec<Command> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Org(msg) => self.handle_completion(msg),
            _ => Vec::new(),
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    fn claims_input(&self) -> bool {
        self.overlay.is_active()
    }

    fn hints(&self) -> Vec<Hint> {
        if self.overlay.is_active() {
            return vec![("enter", "clone"), ("esc", "cancel")];
        }
        match self.pane.depth() {
            Depth::List => vec![("enter", "repos"), ("r", "refresh")],
            _ => vec![("enter", "clone"), ("esc", "back")],
        }
    }
}
