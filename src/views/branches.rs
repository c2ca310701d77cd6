use crossterm::event::{KeyCode, KeyEvent};

use crate::command::Command;
use crate::git::check_branch_name;
use crate::msg::{BranchesMsg, Msg};
use crate::overlay::{OverlayOutcome, OverlaySlot, TextField};
use crate::pane::{nav_key, step, FetchTracker};
use crate::session::Session;
use crate::types::Branch;
use crate::views::{Hint, Status, StatusKind, View};

/// Work waiting on an open overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchAction {
    Create,
    Rename { from: String, has_upstream: bool },
    RenameRemote { from: String, to: String },
}

#[derive(Debug)]
pub struct BranchesView {
    session: Session,
    branches: Vec<Branch>,
    /// Indices into `branches` that match the filter
    visible: Vec<usize>,
    pub selected: usize,
    pub filter: TextField,
    pub filtering: bool,
    fetch: FetchTracker,
    pub overlay: OverlaySlot<BranchAction>,
    pub status: Option<Status>,
    pub width: u16,
    pub height: u16,
}

impl BranchesView {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            branches: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            filter: TextField::default(),
            filtering: false,
            fetch: FetchTracker::default(),
            overlay: OverlaySlot::default(),
            status: None,
            width: 0,
            height: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.is_loading()
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    pub fn current_branch(&self) -> Option<&Branch> {
        self.branches.iter().find(|b| b.is_current)
    }

    pub fn visible(&self) -> impl Iterator<Item = &Branch> {
        self.visible.iter().filter_map(|&i| self.branches.get(i))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected_branch(&self) -> Option<&Branch> {
        self.visible
            .get(self.selected)
            .and_then(|&i| self.branches.get(i))
    }

    fn reload(&mut self) -> Vec<Command> {
        vec![
            Command::ListBranches {
                repo: self.session.repo.clone(),
                generation: self.fetch.begin(),
            },
            Command::RefreshHistory,
        ]
    }

    /// Recompute the filtered view, keeping the cursor on the same branch when possible
    fn apply_filter(&mut self) {
        let keep = self.selected_branch().map(|b| b.name.clone());
        let needle = self.filter.value().to_lowercase();
        self.visible = self
            .branches
            .iter()
            .enumerate()
            .filter(|(_, b)| needle.is_empty() || b.name.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        self.selected = keep
            .and_then(|name| self.visible().position(|b| b.name == name))
            .unwrap_or(0);
    }

    fn page(&self) -> usize {
        usize::from(self.height.saturating_sub(4)).max(1)
    }

    fn checkout_selected(&mut self) -> Vec<Command> {
        let Some(branch) = self.selected_branch() else {
            return Vec::new();
        };
        if branch.is_current {
            self.status = Some(Status::info(format!("Already on {}", branch.name)));
            return Vec::new();
        }
        let name = branch.name.clone();
        self.status = Some(Status::progress(format!("Checking out {name}...")));
        vec![Command::Checkout {
            repo: self.session.repo.clone(),
            branch: name,
        }]
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Enter => self.filtering = false,
            KeyCode::Esc => {
                self.filtering = false;
                self.filter.clear();
                self.apply_filter();
            }
            KeyCode::Up | KeyCode::Down => {
                if let Some(nav) = nav_key(&key) {
                    self.selected = step(self.selected, self.visible.len(), nav, self.page());
                }
            }
            _ => {
                if self.filter.handle_key(&key) {
                    self.apply_filter();
                }
            }
        }
        Vec::new()
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match self.overlay.handle_key(&key) {
            OverlayOutcome::Submitted {
                value,
                action: BranchAction::Create,
            } => {
                if let Err(e) = check_branch_name(&value) {
                    self.status = Some(Status::error(e.to_string()));
                    return Vec::new();
                }
                self.status = Some(Status::progress(format!("Creating {value}...")));
                vec![Command::CreateBranch {
                    repo: self.session.repo.clone(),
                    name: value,
                }]
            }
            OverlayOutcome::Submitted {
                value,
                action: BranchAction::Rename { from, has_upstream },
            } => {
                if value == from {
                    self.status = Some(Status::info("Name unchanged"));
                    return Vec::new();
                }
                if let Err(e) = check_branch_name(&value) {
                    self.status = Some(Status::error(e.to_string()));
                    return Vec::new();
                }
                if has_upstream {
                    let message = format!("Also rename {from} on the remote? (y/n)");
                    self.overlay.confirm(
                        "Rename remote branch",
                        message,
                        BranchAction::RenameRemote { from, to: value },
                    );
                    return Vec::new();
                }
                self.rename(from, value, false)
            }
            OverlayOutcome::Answered {
                yes,
                action: BranchAction::RenameRemote { from, to },
            } => self.rename(from, to, yes),
            OverlayOutcome::Cancelled(_) => {
                self.status = None;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn rename(&mut self, from: String, to: String, rename_remote: bool) -> Vec<Command> {
        self.status = Some(Status::progress(format!("Renaming {from} → {to}...")));
        vec![Command::RenameBranch {
            repo: self.session.repo.clone(),
            from,
            to,
            rename_remote,
        }]
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if self.overlay.is_active() {
            return self.handle_overlay_key(key);
        }
        if self.filtering {
            return self.handle_filter_key(key);
        }
        if let Some(nav) = nav_key(&key) {
            self.selected = step(self.selected, self.visible.len(), nav, self.page());
            return Vec::new();
        }

        match key.code {
            KeyCode::Enter => self.checkout_selected(),
            KeyCode::Char('a') => {
                self.overlay.input("New branch", "", BranchAction::Create);
                Vec::new()
            }
            KeyCode::Char('R') => {
                if let Some(branch) = self.selected_branch() {
                    let action = BranchAction::Rename {
                        from: branch.name.clone(),
                        has_upstream: branch.has_upstream,
                    };
                    let title = format!("Rename {}", branch.name);
                    let initial = branch.name.clone();
                    self.overlay.input(title, &initial, action);
                }
                Vec::new()
            }
            KeyCode::Char('r') => {
                self.status = Some(Status::progress("Refreshing..."));
                self.reload()
            }
            KeyCode::Char('/') => {
                self.filtering = true;
                Vec::new()
            }
            KeyCode::Esc if !self.filter.is_empty() => {
                self.filter.clear();
                self.apply_filter();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_completion(&mut self, msg: BranchesMsg) -> Vec<Command> {
        match msg {
            BranchesMsg::Loaded { generation, result } => {
                if !self.fetch.settle(generation) {
                    return Vec::new();
                }
                match result {
                    Ok(branches) => {
                        self.branches = branches;
                        self.apply_filter();
                        if matches!(&self.status, Some(s) if s.kind == StatusKind::Progress) {
                            self.status = None;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "listing branches failed");
                        self.status = Some(Status::error(format!("Error: {e}")));
                    }
                }
                Vec::new()
            }
            BranchesMsg::CheckedOut { branch, result } => match result {
                Ok(()) => {
                    tracing::info!(branch = %branch, "checked out");
                    self.status = Some(Status::success(format!("Switched to {branch}")));
                    self.reload()
                }
                Err(e) => {
                    self.status = Some(Status::error(format!("Checkout failed: {e}")));
                    Vec::new()
                }
            },
            BranchesMsg::Created { name, result } => match result {
                Ok(()) => {
                    tracing::info!(branch = %name, "created branch");
                    self.status = Some(Status::success(format!("Created branch {name}")));
                    self.reload()
                }
                Err(e) => {
                    self.status = Some(Status::error(format!("Create failed: {e}")));
                    Vec::new()
                }
            },
            BranchesMsg::Renamed {
                from,
                to,
                rename_remote,
                result,
            } => match result {
                Ok(()) if rename_remote => {
                    tracing::info!(%from, %to, "renamed locally, renaming on remote");
                    self.status = Some(Status::progress(format!(
                        "Renamed locally; renaming {from} on remote..."
                    )));
                    let mut cmds = vec![Command::RenameRemoteBranch {
                        repo: self.session.repo.clone(),
                        from,
                        to,
                    }];
                    cmds.extend(self.reload());
                    cmds
                }
                Ok(()) => {
                    tracing::info!(%from, %to, "renamed branch");
                    self.status = Some(Status::success(format!("Renamed {from} → {to}")));
                    self.reload()
                }
                Err(e) => {
                    self.status = Some(Status::error(format!("Rename failed: {e}")));
                    Vec::new()
                }
            },
            BranchesMsg::RemoteRenamed { from, to, result } => {
                match result {
                    Ok(()) => {
                        self.status = Some(Status::success(format!(
                            "Renamed {from} → {to} (local and remote)"
                        )));
                    }
                    Err(e) => {
                        tracing::warn!(%from, %to, error = %e, "remote rename failed");
                        self.status = Some(Status::error(format!("Remote rename failed: {e}")));
                    }
                }
                self.reload()
            }
        }
    }
}

impl View for BranchesView {
    fn init(&mut self) -> Vec<Command> {
        vec![Command::ListBranches {
            repo: self.session.repo.clone(),
            generation: self.fetch.begin(),
        }]
    }

    fn update(&mut self, msg: Msg) -> Vec<Command> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Branches(msg) => self.handle_completion(msg),
            _ => Vec::new(),
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    fn claims_input(&self) -> bool {
        self.overlay.is_active() || self.filtering
    }

    fn hints(&self) -> Vec<Hint> {
        if self.overlay.is_confirming() {
            return vec![("y", "local + remote"), ("n", "local only"), ("esc", "cancel")];
        }
        if self.overlay.is_active() {
            return vec![("enter", "confirm"), ("esc", "cancel")];
        }
        if self.filtering {
            return vec![("enter", "keep filter"), ("esc", "clear")];
        }
        vec![
            ("enter", "checkout"),
            ("a", "new"),
            ("R", "rename"),
            ("/", "filter"),
            ("r", "refresh"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{code, key, session};

    fn loaded() -> BranchesView {
        let mut view = BranchesView::new(session());
        let generation = match view.init().as_slice() {
            [Command::ListBranches { generation, .. }] => *generation,
            other => panic!("unexpected {other:?}"),
        };
        view.update(Msg::Branches(BranchesMsg::Loaded {
            generation,
            result: Ok(vec![
                crate::testing::branch("main", true, true),
                crate::testing::branch("feature/login", false, true),
                crate::testing::branch("topic", false, false),
            ]),
        }));
        view
    }

    fn select(view: &mut BranchesView, name: &str) {
        let index = view.visible().position(|b| b.name == name).unwrap();
        view.selected = index;
    }

    fn type_text(view: &mut BranchesView, text: &str) {
        for c in text.chars() {
            view.update(Msg::Key(key(c)));
        }
    }

    #[test]
    fn checkout_of_current_branch_is_a_no_op() {
        let mut view = loaded();
        select(&mut view, "main");
        let cmds = view.update(Msg::Key(code(KeyCode::Enter)));
        assert!(cmds.is_empty());
        assert_eq!(view.status, Some(Status::info("Already on main")));
    }

    #[test]
    fn checkout_other_branch_issues_command() {
        let mut view = loaded();
        select(&mut view, "topic");
        let cmds = view.update(Msg::Key(code(KeyCode::Enter)));
        match cmds.as_slice() {
            [Command::Checkout { branch, .. }] => assert_eq!(branch, "topic"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn successful_checkout_reloads_and_refreshes_history() {
        let mut view = loaded();
        let cmds = view.update(Msg::Branches(BranchesMsg::CheckedOut {
            branch: "topic".to_string(),
            result: Ok(()),
        }));
        assert!(matches!(
            cmds.as_slice(),
            [Command::ListBranches { .. }, Command::RefreshHistory]
        ));
        assert_eq!(view.status, Some(Status::success("Switched to topic")));
    }

    #[test]
    fn rename_without_upstream_skips_confirmation() {
        let mut view = loaded();
        select(&mut view, "topic");
        view.update(Msg::Key(key('R')));
        assert!(view.claims_input());
        view.update(Msg::Key(code(KeyCode::Char('2'))));
        let cmds = view.update(Msg::Key(code(KeyCode::Enter)));
        match cmds.as_slice() {
            [Command::RenameBranch {
                from,
                to,
                rename_remote,
                ..
            }] => {
                assert_eq!(from, "topic");
                assert_eq!(to, "topic2");
                assert!(!rename_remote);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!view.overlay.is_active());
    }

    #[test]
    fn rename_with_upstream_confirms_and_n_is_local_only() {
        let mut view = loaded();
        select(&mut view, "feature/login");
        view.update(Msg::Key(key('R')));
        view.update(Msg::Key(ctrl_u()));
        type_text(&mut view, "feature/auth");
        let cmds = view.update(Msg::Key(code(KeyCode::Enter)));
        assert!(cmds.is_empty());
        assert!(view.overlay.is_confirming());

        assert!(view.update(Msg::Key(key('x'))).is_empty());
        assert!(view.overlay.is_confirming());

        let cmds = view.update(Msg::Key(key('n')));
        match cmds.as_slice() {
            [Command::RenameBranch {
                to, rename_remote, ..
            }] => {
                assert_eq!(to, "feature/auth");
                assert!(!rename_remote);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn confirmed_rename_chains_remote_rename() {
        let mut view = loaded();
        select(&mut view, "feature/login");
        view.update(Msg::Key(key('R')));
        type_text(&mut view, "2");
        view.update(Msg::Key(code(KeyCode::Enter)));
        let cmds = view.update(Msg::Key(key('y')));
        assert!(matches!(
            cmds.as_slice(),
            [Command::RenameBranch {
                rename_remote: true,
                ..
            }]
        ));

        let cmds = view.update(Msg::Branches(BranchesMsg::Renamed {
            from: "feature/login".to_string(),
            to: "feature/login2".to_string(),
            rename_remote: true,
            result: Ok(()),
        }));
        assert!(matches!(cmds.first(), Some(Command::RenameRemoteBranch { .. })));
    }

    #[test]
    fn escape_cancels_confirmation() {
        let mut view = loaded();
        select(&mut view, "feature/login");
        view.update(Msg::Key(key('R')));
        type_text(&mut view, "x");
        view.update(Msg::Key(code(KeyCode::Enter)));
        let cmds = view.update(Msg::Key(code(KeyCode::Esc)));
        assert!(cmds.is_empty());
        assert!(!view.claims_input());
    }

    #[test]
    fn option_like_names_are_rejected_before_git() {
        let mut view = loaded();
        select(&mut view, "topic");
        view.update(Msg::Key(key('R')));
        view.update(Msg::Key(ctrl_u()));
        type_text(&mut view, "-f");
        let cmds = view.update(Msg::Key(code(KeyCode::Enter)));
        assert!(cmds.is_empty());
        assert_eq!(view.status.as_ref().map(|s| s.kind), Some(StatusKind::Error));
        assert!(!view.overlay.is_active());

        view.update(Msg::Key(key('a')));
        type_text(&mut view, "--orphan");
        assert!(view.update(Msg::Key(code(KeyCode::Enter))).is_empty());
        assert_eq!(view.status.as_ref().map(|s| s.kind), Some(StatusKind::Error));
    }

    #[test]
    fn create_with_empty_name_keeps_overlay_open() {
        let mut view = loaded();
        view.update(Msg::Key(key('a')));
        assert!(view.update(Msg::Key(code(KeyCode::Enter))).is_empty());
        assert!(view.overlay.is_active());
        type_text(&mut view, "spike");
        let cmds = view.update(Msg::Key(code(KeyCode::Enter)));
        match cmds.as_slice() {
            [Command::CreateBranch { name, .. }] => assert_eq!(name, "spike"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn refresh_overtakes_init() {
        let mut view = BranchesView::new(session());
        let first = match view.init().as_slice() {
            [Command::ListBranches { generation, .. }] => *generation,
            other => panic!("unexpected {other:?}"),
        };
        let second = match view.update(Msg::Key(key('r'))).as_slice() {
            [Command::ListBranches { generation, .. }, Command::RefreshHistory] => *generation,
            other => panic!("unexpected {other:?}"),
        };

        view.update(Msg::Branches(BranchesMsg::Loaded {
            generation: second,
            result: Ok(vec![crate::testing::branch("fresh", true, false)]),
        }));
        view.update(Msg::Branches(BranchesMsg::Loaded {
            generation: first,
            result: Ok(vec![crate::testing::branch("stale", true, false)]),
        }));

        let names: Vec<_> = view.visible().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["fresh"]);
        assert!(!view.is_loading());
    }

    #[test]
    fn filter_narrows_and_escape_clears() {
        let mut view = loaded();
        view.update(Msg::Key(key('/')));
        assert!(view.claims_input());
        type_text(&mut view, "LOG");
        let names: Vec<_> = view.visible().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["feature/login"]);

        view.update(Msg::Key(code(KeyCode::Enter)));
        assert!(!view.claims_input());
        assert_eq!(view.visible_len(), 1);

        view.update(Msg::Key(code(KeyCode::Esc)));
        assert_eq!(view.visible_len(), 3);
    }

    #[test]
    fn load_error_sets_status() {
        let mut view = BranchesView::new(session());
        let generation = match view.init().as_slice() {
            [Command::ListBranches { generation, .. }] => *generation,
            other => panic!("unexpected {other:?}"),
        };
        view.update(Msg::Branches(BranchesMsg::Loaded {
            generation,
            result: Err(crate::error::HitError::Git("boom".to_string())),
        }));
        assert!(matches!(&view.status, Some(s) if s.kind == StatusKind::Error));
    }

    fn ctrl_u() -> KeyEvent {
        crate::testing::ctrl('u')
    }
}
