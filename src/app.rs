use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::command::Command;
use crate::config::Config;
use crate::msg::Msg;
use crate::session::Session;
use crate::views::auth::AuthView;
use crate::views::branches::BranchesView;
use crate::views::ci::CiView;
use crate::views::history::HistoryView;
use crate::views::org::OrgView;
use crate::views::placeholder::PlaceholderView;
use crate::views::{Status, View};

/// Rows taken by the tab bar, repo info line and footer
pub const CHROME_ROWS: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopView {
    Auth,
    Branches,
    Ci,
    PullRequests,
    Reviews,
    Org,
}

impl TopView {
    /// Views reachable after authentication, in tab order
    pub const DATA: [TopView; 5] = [
        TopView::Branches,
        TopView::Ci,
        TopView::PullRequests,
        TopView::Reviews,
        TopView::Org,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            TopView::Auth => "Auth",
            TopView::Branches => "Branches",
            TopView::Ci => "CI",
            TopView::PullRequests => "PRs",
            TopView::Reviews => "Reviews",
            TopView::Org => "Org",
        }
    }

    fn position(&self) -> Option<usize> {
        Self::DATA.iter().position(|v| v == self)
    }

    /// Auth has no neighbours
    pub fn next(self) -> TopView {
        match self.position() {
            Some(i) => Self::DATA[(i + 1) % Self::DATA.len()],
            None => self,
        }
    }

    pub fn previous(self) -> TopView {
        match self.position() {
            Some(i) => Self::DATA[(i + Self::DATA.len() - 1) % Self::DATA.len()],
            None => self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchTarget {
    Next,
    Previous,
    Goto(TopView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub main_width: u16,
    pub content_height: u16,
    pub history_width: Option<u16>,
}

pub struct App {
    pub session: Session,
    config: Config,
    pub current: TopView,
    pub auth: AuthView,
    pub branches: BranchesView,
    pub ci: Option<CiView>,
    pub pull_requests: PlaceholderView,
    pub reviews: PlaceholderView,
    pub org: Option<OrgView>,
    pub history: HistoryView,
    pub width: u16,
    pub height: u16,
    pub spinner: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session, config: Config) -> Self {
        Self {
            auth: AuthView::new(session.services.auth.clone()),
            branches: BranchesView::new(session.clone()),
            ci: None,
            pull_requests: PlaceholderView::new("Pull Requests"),
            reviews: PlaceholderView::new("Reviews"),
            org: None,
            history: HistoryView::new(session.repo.clone(), config.history.limit),
            session,
            config,
            current: TopView::Auth,
            width: 0,
            height: 0,
            spinner: 0,
            should_quit: false,
        }
    }

    /// Commands to run before the first message arrives
    pub fn init(&mut self) -> Vec<Command> {
        self.auth.init()
    }

    pub fn handle(&mut self, msg: Msg) -> Vec<Command> {
        match msg {
            Msg::Resize { width, height } => {
                self.resize(width, height);
                Vec::new()
            }
            Msg::Tick => {
                if self.is_loading() || self.history.is_loading() {
                    self.spinner = self.spinner.wrapping_add(1);
                }
                Vec::new()
            }
            Msg::Key(key) => self.handle_key(key),
            Msg::AuthCompleted { token, source } => self.complete_auth(&token, &source),
            Msg::Auth(_) => {
                if self.current == TopView::Auth {
                    self.auth.update(msg)
                } else {
                    Vec::new()
                }
            }
            Msg::History(_) => {
                if self.current == TopView::Auth {
                    Vec::new()
                } else {
                    self.history.update(msg)
                }
            }
            Msg::Branches(_) => self.branches.update(msg),
            Msg::Ci(_) => match self.ci.as_mut() {
                Some(ci) => ci.update(msg),
                None => {
                    tracing::debug!("dropping CI completion, view not built");
                    Vec::new()
                }
            },
            Msg::Org(_) => match self.org.as_mut() {
                Some(org) => org.update(msg),
                None => {
                    tracing::debug!("dropping Org completion, view not built");
                    Vec::new()
                }
            },
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if self.current == TopView::Auth {
            let cmds = self.auth.update(Msg::Key(key));
            if self.auth.quit_requested() {
                self.should_quit = true;
            }
            return cmds;
        }

        if !self.claims_input() {
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Vec::new();
                }
                KeyCode::Char('c') if ctrl => {
                    self.should_quit = true;
                    return Vec::new();
                }
                KeyCode::Tab => return self.switch_view(SwitchTarget::Next),
                KeyCode::BackTab => return self.switch_view(SwitchTarget::Previous),
                KeyCode::Char(c @ '1'..='5') => {
                    let index = (c as usize) - ('1' as usize);
                    return self.switch_view(SwitchTarget::Goto(TopView::DATA[index]));
                }
                _ => {}
            }
        }

        match self.active_view_mut() {
            Some(view) => view.update(Msg::Key(key)),
            None => Vec::new(),
        }
    }

    pub fn switch_view(&mut self, target: SwitchTarget) -> Vec<Command> {
        if self.current == TopView::Auth {
            tracing::debug!(?target, "view switch ignored before authentication");
            return Vec::new();
        }
        let destination = match target {
            SwitchTarget::Next => self.current.next(),
            SwitchTarget::Previous => self.current.previous(),
            SwitchTarget::Goto(TopView::Auth) => return Vec::new(),
            SwitchTarget::Goto(view) => view,
        };

        self.current = destination;
        let layout = self.layout();
        match destination {
            TopView::Branches => self.branches.init(),
            TopView::Ci => {
                let Some(forge) = self.session.forge.clone() else {
                    return Vec::new();
                };
                let mut ci = CiView::new(forge, self.current_branch(), self.config.ci.page_size);
                ci.resize(layout.main_width, layout.content_height);
                let cmds = ci.init();
                self.ci = Some(ci);
                cmds
            }
            TopView::Org => {
                let Some(forge) = self.session.forge.clone() else {
                    return Vec::new();
                };
                let mut org = OrgView::new(
                    forge,
                    self.session.services.cloner.clone(),
                    self.config.clone.clone(),
                );
                org.resize(layout.main_width, layout.content_height);
                let cmds = org.init();
                self.org = Some(org);
                cmds
            }
            TopView::PullRequests => self.pull_requests.init(),
            TopView::Reviews => self.reviews.init(),
            TopView::Auth => Vec::new(),
        }
    }

    fn complete_auth(&mut self, token: &str, source: &str) -> Vec<Command> {
        if self.current != TopView::Auth {
            return Vec::new();
        }

        let slug = self.session.slug.clone();
        match self.session.services.connector.connect(token, slug.as_ref()) {
            Ok(forge) => {
                tracing::info!(source, "authenticated");
                self.session = self.session.with_forge(forge);
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not build GitHub client; CI and Org disabled");
                self.branches
                    .set_status(Status::error(format!("GitHub unavailable: {e}")));
            }
        }

        self.current = TopView::Branches;
        let mut cmds = self.branches.init();
        cmds.extend(self.history.init());

        if let Some(forge) = self.session.forge.clone() {
            let layout = self.layout();
            let mut ci = CiView::new(forge, self.current_branch(), self.config.ci.page_size);
            ci.resize(layout.main_width, layout.content_height);
            cmds.extend(ci.init());
            self.ci = Some(ci);
        }
        cmds
    }

    pub fn layout(&self) -> Layout {
        let content_height = self.height.saturating_sub(CHROME_ROWS);
        let history = &self.config.history;
        if self.width >= history.min_width {
            Layout {
                main_width: self.width.saturating_sub(history.pane_width),
                content_height,
                history_width: Some(history.pane_width),
            }
        } else {
            Layout {
                main_width: self.width,
                content_height,
                history_width: None,
            }
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let layout = self.layout();
        let (w, h) = (layout.main_width, layout.content_height);

        self.auth.resize(width, height);
        self.branches.resize(w, h);
        self.pull_requests.resize(w, h);
        self.reviews.resize(w, h);
        if let Some(ci) = self.ci.as_mut() {
            ci.resize(w, h);
        }
        if let Some(org) = self.org.as_mut() {
            org.resize(w, h);
        }
        if let Some(history_width) = layout.history_width {
            self.history.resize(history_width, h);
        }
    }

    /// Branch CI is bound to: the latest listing, else the startup branch
    pub fn current_branch(&self) -> String {
        self.branches
            .current_branch()
            .map(|b| b.name.clone())
            .unwrap_or_else(|| self.session.initial_branch.clone())
    }

    pub fn active_view(&self) -> Option<&dyn View> {
        match self.current {
            TopView::Auth => Some(&self.auth),
            TopView::Branches => Some(&self.branches),
            TopView::Ci => self.ci.as_ref().map(|v| v as &dyn View),
            TopView::PullRequests => Some(&self.pull_requests),
            TopView::Reviews => Some(&self.reviews),
            TopView::Org => self.org.as_ref().map(|v| v as &dyn View),
        }
    }

    fn active_view_mut(&mut self) -> Option<&mut dyn View> {
        match self.current {
            TopView::Auth => Some(&mut self.auth),
            TopView::Branches => Some(&mut self.branches),
            TopView::Ci => self.ci.as_mut().map(|v| v as &mut dyn View),
            TopView::PullRequests => Some(&mut self.pull_requests),
            TopView::Reviews => Some(&mut self.reviews),
            TopView::Org => self.org.as_mut().map(|v| v as &mut dyn View),
        }
    }

    pub fn claims_input(&self) -> bool {
        self.active_view().is_some_and(|v| v.claims_input())
    }

    /// Whether the active view is waiting on a fetch
    pub fn is_loading(&self) -> bool {
        match self.current {
            TopView::Auth => self.auth.checking,
            TopView::Branches => self.branches.is_loading(),
            TopView::Ci => self.ci.as_ref().is_some_and(|v| v.is_loading()),
            TopView::Org => self
                .org
                .as_ref()
                .is_some_and(|v| v.is_loading() || v.cloning.is_some()),
            TopView::PullRequests | TopView::Reviews => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::msg::{CiMsg, HistoryMsg};
    use crate::session::Services;
    use crate::testing::{code, fake_services, key, run, session, FakeConnector, FakeRepo};

    fn authenticated() -> (App, Vec<Command>) {
        let mut app = App::new(session(), Config::default());
        app.handle(Msg::Resize {
            width: 120,
            height: 40,
        });
        let cmds = app.handle(Msg::AuthCompleted {
            token: "t".to_string(),
            source: "test".to_string(),
        });
        (app, cmds)
    }

    fn runs_generation(cmds: &[Command]) -> u64 {
        cmds.iter()
            .find_map(|c| match c {
                Command::ListRuns { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("ListRuns issued")
    }

    #[test]
    fn next_cycles_through_data_views() {
        for start in TopView::DATA {
            let mut view = start;
            for _ in 0..5 {
                view = view.next();
                assert_ne!(view, TopView::Auth);
            }
            assert_eq!(view, start);
            assert_eq!(start.next().previous(), start);
        }
        assert_eq!(TopView::Auth.next(), TopView::Auth);
    }

    #[test]
    fn auth_completion_switches_and_inits() {
        let (app, cmds) = authenticated();
        assert_eq!(app.current, TopView::Branches);
        assert!(app.session.is_connected());
        assert!(matches!(cmds[0], Command::ListBranches { .. }));
        assert!(cmds.iter().any(|c| matches!(c, Command::LoadReflog { .. })));
        match cmds.iter().find(|c| matches!(c, Command::ListRuns { .. })) {
            Some(Command::ListRuns { branch, .. }) => assert_eq!(branch, "main"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn client_failure_still_enters_branches() {
        let services = Services {
            connector: Arc::new(FakeConnector { fail: true }),
            ..fake_services()
        };
        let mut app = App::new(
            Session::new(Arc::new(FakeRepo::default()), services),
            Config::default(),
        );
        let cmds = app.handle(Msg::AuthCompleted {
            token: "t".to_string(),
            source: "test".to_string(),
        });
        assert_eq!(app.current, TopView::Branches);
        assert!(!app.session.is_connected());
        assert!(app.ci.is_none());
        assert!(!cmds.iter().any(|c| matches!(c, Command::ListRuns { .. })));
        assert!(app.branches.status.is_some());
    }

    #[test]
    fn switching_is_rejected_during_auth() {
        let mut app = App::new(session(), Config::default());
        assert!(app.switch_view(SwitchTarget::Next).is_empty());
        assert_eq!(app.current, TopView::Auth);
        app.handle(Msg::Key(key('2')));
        assert_eq!(app.current, TopView::Auth);
    }

    #[test]
    fn q_types_into_auth_but_quits_elsewhere() {
        let mut app = App::new(session(), Config::default());
        app.handle(Msg::Auth(crate::msg::AuthMsg::NotFound(Default::default())));
        app.handle(Msg::Key(key('q')));
        assert!(!app.should_quit);

        let (mut app, _) = authenticated();
        app.handle(Msg::Key(key('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn ci_without_client_builds_nothing() {
        let mut app = App::new(session(), Config::default());
        app.current = TopView::Branches;
        let cmds = app.switch_view(SwitchTarget::Goto(TopView::Ci));
        assert!(cmds.is_empty());
        assert_eq!(app.current, TopView::Ci);
        assert!(app.ci.is_none());

        let cmds = app.switch_view(SwitchTarget::Goto(TopView::Org));
        assert!(cmds.is_empty());
        assert!(app.org.is_none());
    }

    #[test]
    fn goto_auth_is_rejected() {
        let (mut app, _) = authenticated();
        assert!(app.switch_view(SwitchTarget::Goto(TopView::Auth)).is_empty());
        assert_eq!(app.current, TopView::Branches);
    }

    #[test]
    fn tab_and_number_keys_switch_views() {
        let (mut app, _) = authenticated();
        app.handle(Msg::Key(code(KeyCode::Tab)));
        assert_eq!(app.current, TopView::Ci);
        app.handle(Msg::Key(code(KeyCode::BackTab)));
        assert_eq!(app.current, TopView::Branches);
        let cmds = app.handle(Msg::Key(key('5')));
        assert_eq!(app.current, TopView::Org);
        assert!(matches!(cmds.as_slice(), [Command::ListOrgs { .. }]));
    }

    #[test]
    fn overlay_keeps_global_keys_away() {
        let (mut app, _) = authenticated();
        app.handle(Msg::Key(key('a')));
        assert!(app.claims_input());
        app.handle(Msg::Key(key('q')));
        app.handle(Msg::Key(key('2')));
        assert!(!app.should_quit);
        assert_eq!(app.current, TopView::Branches);
        assert_eq!(
            app.branches.overlay.get().map(|o| matches!(
                o,
                crate::overlay::Overlay::Input { field, .. } if field.value() == "q2"
            )),
            Some(true)
        );
    }

    #[test]
    fn stale_ci_completion_across_rebuild_is_dropped() {
        let (mut app, cmds) = authenticated();
        let stale = runs_generation(&cmds);
        app.switch_view(SwitchTarget::Goto(TopView::Branches));
        let cmds = app.switch_view(SwitchTarget::Goto(TopView::Ci));
        let fresh = runs_generation(&cmds);

        app.handle(Msg::Ci(CiMsg::RunsLoaded {
            generation: stale,
            result: Ok(vec![run(1)]),
        }));
        assert!(app.ci.as_ref().is_some_and(|ci| ci.runs.is_empty()));

        app.handle(Msg::Ci(CiMsg::RunsLoaded {
            generation: fresh,
            result: Ok(vec![run(1), run(2)]),
        }));
        assert_eq!(app.ci.as_ref().map(|ci| ci.runs.len()), Some(2));
    }

    #[test]
    fn ci_completion_without_view_is_dropped() {
        let mut app = App::new(session(), Config::default());
        let cmds = app.handle(Msg::Ci(CiMsg::RunsLoaded {
            generation: 1,
            result: Ok(vec![run(1)]),
        }));
        assert!(cmds.is_empty());
        assert!(app.ci.is_none());
    }

    #[test]
    fn wide_terminal_shows_history_pane() {
        let (mut app, _) = authenticated();
        app.handle(Msg::Resize {
            width: 200,
            height: 50,
        });
        assert_eq!(app.layout().history_width, Some(60));
        assert_eq!(app.branches.width, 140);
        assert_eq!(app.branches.height, 47);
        assert_eq!(app.history.width, 60);
        assert_eq!(app.ci.as_ref().map(|c| c.width), Some(140));

        app.handle(Msg::Resize {
            width: 100,
            height: 50,
        });
        assert_eq!(app.layout().history_width, None);
        assert_eq!(app.branches.width, 100);
    }

    #[test]
    fn history_messages_wait_for_auth() {
        let mut app = App::new(session(), Config::default());
        assert!(app.handle(Msg::History(HistoryMsg::Refresh)).is_empty());

        let (mut app, _) = authenticated();
        app.current = TopView::Reviews;
        let cmds = app.handle(Msg::History(HistoryMsg::Refresh));
        assert!(matches!(cmds.as_slice(), [Command::LoadReflog { .. }]));
    }

    #[test]
    fn ci_binds_to_latest_branch_listing() {
        let (mut app, cmds) = authenticated();
        let generation = cmds
            .iter()
            .find_map(|c| match c {
                Command::ListBranches { generation, .. } => Some(*generation),
                _ => None,
            })
            .unwrap();
        app.handle(Msg::Branches(crate::msg::BranchesMsg::Loaded {
            generation,
            result: Ok(vec![crate::testing::branch("release", true, false)]),
        }));
        let cmds = app.switch_view(SwitchTarget::Goto(TopView::Ci));
        match cmds.as_slice() {
            [Command::ListRuns { branch, .. }] => assert_eq!(branch, "release"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn tick_advances_spinner_only_while_loading() {
        let mut app = App::new(session(), Config::default());
        assert!(app.is_loading());
        app.handle(Msg::Tick);
        app.handle(Msg::Tick);
        assert_eq!(app.spinner, 2);

        app.handle(Msg::Auth(crate::msg::AuthMsg::NotFound(Default::default())));
        assert!(!app.is_loading());
        app.handle(Msg::Tick);
        assert_eq!(app.spinner, 2);
    }
}
