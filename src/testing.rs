//! In-memory collaborators for unit tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::auth::AuthDetector;
use crate::clone::Cloner;
use crate::error::{HitError, Result};
use crate::forge::{Connector, Forge};
use crate::git::GitRepo;
use crate::session::{Services, Session};
use crate::types::{
    AuthStatus, Branch, Conclusion, Job, Org, OrgRepo, ReflogEntry, RepoSlug, RunStatus, Step,
    WorkflowRun,
};

pub fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

pub fn code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

pub fn branch(name: &str, current: bool, upstream: bool) -> Branch {
    Branch {
        name: name.to_string(),
        short_hash: "abc1234".to_string(),
        subject: format!("work on {name}"),
        author: "dev".to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        is_current: current,
        has_upstream: upstream,
        ahead: 0,
        behind: 0,
        default_compare: None,
    }
}

pub fn run(id: u64) -> WorkflowRun {
    WorkflowRun {
        id,
        name: Some("CI".to_string()),
        status: RunStatus::Completed,
        conclusion: Some(Conclusion::Failure),
        head_branch: Some("main".to_string()),
        head_sha: "0123456789abcdef".to_string(),
        event: "push".to_string(),
        run_number: id,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        html_url: format!("https://github.com/octo/hit/actions/runs/{id}"),
    }
}

pub fn job(id: u64, run_id: u64) -> Job {
    Job {
        id,
        run_id,
        name: format!("build-{id}"),
        status: RunStatus::Completed,
        conclusion: Some(Conclusion::Success),
        started_at: None,
        completed_at: None,
        steps: vec![Step {
            name: "checkout".to_string(),
            status: RunStatus::Completed,
            conclusion: Some(Conclusion::Success),
            number: 1,
        }],
    }
}

pub fn org_repo(name: &str) -> OrgRepo {
    OrgRepo {
        name: name.to_string(),
        full_name: format!("octo/{name}"),
        description: None,
        ssh_url: format!("git@github.com:octo/{name}.git"),
        clone_url: format!("https://github.com/octo/{name}.git"),
        private: false,
        archived: false,
        updated_at: None,
    }
}

#[derive(Debug)]
pub struct FakeRepo {
    pub branches: Vec<Branch>,
    pub remote: Option<String>,
    pub fail_mutations: bool,
    calls: Mutex<Vec<String>>,
}

impl Default for FakeRepo {
    fn default() -> Self {
        Self {
            branches: vec![branch("main", true, true), branch("topic", false, false)],
            remote: Some("git@github.com:octo/hit.git".to_string()),
            fail_mutations: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRepo {
    pub fn with_remote(url: &str) -> Self {
        Self {
            remote: Some(url.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_mutations: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail_mutations {
            return Err(HitError::Git("simulated failure".to_string()));
        }
        Ok(())
    }
}

impl GitRepo for FakeRepo {
    fn path(&self) -> &Path {
        Path::new("/work/hit")
    }

    fn list_branches(&self) -> Result<Vec<Branch>> {
        Ok(self.branches.clone())
    }

    fn current_branch(&self) -> String {
        self.branches
            .iter()
            .find(|b| b.is_current)
            .map(|b| b.name.clone())
            .unwrap_or_default()
    }

    fn checkout(&self, name: &str) -> Result<()> {
        self.record(format!("checkout {name}"))
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.record(format!("create {name}"))
    }

    fn rename_branch(&self, from: &str, to: &str) -> Result<()> {
        self.record(format!("rename {from} {to}"))
    }

    fn rename_remote_branch(&self, from: &str, to: &str) -> Result<()> {
        self.record(format!("rename-remote {from} {to}"))
    }

    fn has_upstream(&self, name: &str) -> bool {
        self.branches
            .iter()
            .any(|b| b.name == name && b.has_upstream)
    }

    fn reflog(&self, _limit: usize) -> Result<Vec<ReflogEntry>> {
        Ok(vec![ReflogEntry {
            selector: "HEAD@{0}".to_string(),
            action: "checkout".to_string(),
            detail: "main → topic".to_string(),
            time_ago: "2 minutes ago".to_string(),
        }])
    }

    fn remote_url(&self) -> Option<String> {
        self.remote.clone()
    }
}

#[derive(Debug)]
pub struct FakeForge {
    pub runs: Vec<WorkflowRun>,
    pub log: String,
    pub fail: bool,
}

impl Default for FakeForge {
    fn default() -> Self {
        Self {
            runs: vec![run(1), run(2)],
            log: "::error file=src/lib.rs,line=3::boom\nall done".to_string(),
            fail: false,
        }
    }
}

impl FakeForge {
    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(HitError::Api("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Forge for FakeForge {
    async fn list_runs(&self, _branch: &str, _per_page: u8) -> Result<Vec<WorkflowRun>> {
        self.check()?;
        Ok(self.runs.clone())
    }

    async fn list_jobs(&self, run_id: u64) -> Result<Vec<Job>> {
        self.check()?;
        Ok(vec![job(10, run_id), job(11, run_id)])
    }

    async fn fetch_log(&self, _job_id: u64) -> Result<String> {
        self.check()?;
        Ok(self.log.clone())
    }

    async fn list_user_orgs(&self) -> Result<Vec<Org>> {
        self.check()?;
        Ok(vec![Org {
            login: "octo".to_string(),
            description: None,
        }])
    }

    async fn list_org_repos(&self, _org: &str) -> Result<Vec<OrgRepo>> {
        self.check()?;
        Ok(vec![org_repo("tool"), org_repo("site")])
    }
}

#[derive(Debug, Default)]
pub struct FakeCloner {
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeCloner {
    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Cloner for FakeCloner {
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), target.to_path_buf()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeAuth {
    status: AuthStatus,
}

impl FakeAuth {
    pub fn found(token: &str, source: &str) -> Self {
        Self {
            status: AuthStatus {
                authenticated: true,
                token: token.to_string(),
                source: source.to_string(),
            },
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }
}

impl AuthDetector for FakeAuth {
    fn detect(&self) -> AuthStatus {
        self.status.clone()
    }
}

#[derive(Debug, Default)]
pub struct FakeConnector {
    pub fail: bool,
}

impl Connector for FakeConnector {
    fn connect(&self, token: &str, _slug: Option<&RepoSlug>) -> Result<Arc<dyn Forge>> {
        if self.fail || token.is_empty() {
            return Err(HitError::Auth("client construction failed".to_string()));
        }
        Ok(Arc::new(FakeForge::default()))
    }
}

pub fn fake_services() -> Services {
    Services {
        auth: Arc::new(FakeAuth::missing()),
        cloner: Arc::new(FakeCloner::default()),
        connector: Arc::new(FakeConnector::default()),
    }
}

pub fn session() -> Session {
    Session::new(Arc::new(FakeRepo::default()), fake_services())
}
