use std::path::PathBuf;

use crossterm::event::KeyEvent;

use crate::error::Result;
use crate::types::{AuthStatus, Branch, Job, Org, OrgRepo, ReflogEntry, WorkflowRun};

/// Everything the root controller reacts to: terminal input, timers and
/// command completions. Completions carry the generation of the request that
/// produced them.
#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Tick,
    AuthCompleted { token: String, source: String },
    Auth(AuthMsg),
    Branches(BranchesMsg),
    Ci(CiMsg),
    Org(OrgMsg),
    History(HistoryMsg),
}

#[derive(Debug)]
pub enum AuthMsg {
    /// Detection finished without finding credentials
    NotFound(AuthStatus),
}

#[derive(Debug)]
pub enum BranchesMsg {
    Loaded {
        generation: u64,
        result: Result<Vec<Branch>>,
    },
    CheckedOut {
        branch: String,
        result: Result<()>,
    },
    Created {
        name: String,
        result: Result<()>,
    },
    Renamed {
        from: String,
        to: String,
        rename_remote: bool,
        result: Result<()>,
    },
    RemoteRenamed {
        from: String,
        to: String,
        result: Result<()>,
    },
}

#[derive(Debug)]
pub enum CiMsg {
    RunsLoaded {
        generation: u64,
        result: Result<Vec<WorkflowRun>>,
    },
    JobsLoaded {
        generation: u64,
        run_id: u64,
        result: Result<Vec<Job>>,
    },
    LogLoaded {
        generation: u64,
        job_id: u64,
        result: Result<String>,
    },
}

#[derive(Debug)]
pub enum OrgMsg {
    OrgsLoaded {
        generation: u64,
        result: Result<Vec<Org>>,
    },
    ReposLoaded {
        generation: u64,
        org: String,
        result: Result<Vec<OrgRepo>>,
    },
    Cloned {
        repo_name: String,
        target: PathBuf,
        result: Result<()>,
    },
}

#[derive(Debug)]
pub enum HistoryMsg {
    /// Something changed HEAD; reload the reflog
    Refresh,
    Loaded {
        generation: u64,
        result: Result<Vec<ReflogEntry>>,
    },
}
