//! Deferred work requested by views.
//!
//! A `Command` is a plain value; nothing happens until the executor runs it
//! on the tokio runtime and feeds the resulting `Msg` back into the loop.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::auth::AuthDetector;
use crate::clone::Cloner;
use crate::error::Result;
use crate::forge::Forge;
use crate::git::GitRepo;
use crate::msg::{AuthMsg, BranchesMsg, CiMsg, HistoryMsg, Msg, OrgMsg};

#[derive(Debug)]
pub enum Command {
    DetectAuth {
        detector: Arc<dyn AuthDetector>,
    },
    SubmitToken {
        token: String,
    },
    ListBranches {
        repo: Arc<dyn GitRepo>,
        generation: u64,
    },
    Checkout {
        repo: Arc<dyn GitRepo>,
        branch: String,
    },
    CreateBranch {
        repo: Arc<dyn GitRepo>,
        name: String,
    },
    RenameBranch {
        repo: Arc<dyn GitRepo>,
        from: String,
        to: String,
        rename_remote: bool,
    },
    RenameRemoteBranch {
        repo: Arc<dyn GitRepo>,
        from: String,
        to: String,
    },
    LoadReflog {
        repo: Arc<dyn GitRepo>,
        limit: usize,
        generation: u64,
    },
    RefreshHistory,
    ListRuns {
        forge: Arc<dyn Forge>,
        branch: String,
        per_page: u8,
        generation: u64,
    },
    ListJobs {
        forge: Arc<dyn Forge>,
        run_id: u64,
        generation: u64,
    },
    FetchLog {
        forge: Arc<dyn Forge>,
        job_id: u64,
        generation: u64,
    },
    ListOrgs {
        forge: Arc<dyn Forge>,
        generation: u64,
    },
    ListOrgRepos {
        forge: Arc<dyn Forge>,
        org: String,
        generation: u64,
    },
    Clone {
        cloner: Arc<dyn Cloner>,
        url: String,
        target: PathBuf,
        repo_name: String,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::DetectAuth { .. } => "detect_auth",
            Command::SubmitToken { .. } => "submit_token",
            Command::ListBranches { .. } => "list_branches",
            Command::Checkout { .. } => "checkout",
            Command::CreateBranch { .. } => "create_branch",
            Command::RenameBranch { .. } => "rename_branch",
            Command::RenameRemoteBranch { .. } => "rename_remote_branch",
            Command::LoadReflog { .. } => "load_reflog",
            Command::RefreshHistory => "refresh_history",
            Command::ListRuns { .. } => "list_runs",
            Command::ListJobs { .. } => "list_jobs",
            Command::FetchLog { .. } => "fetch_log",
            Command::ListOrgs { .. } => "list_orgs",
            Command::ListOrgRepos { .. } => "list_org_repos",
            Command::Clone { .. } => "clone",
        }
    }
}

/// Run synchronous git/process work off the async workers
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Perform one command and describe its outcome
pub async fn execute(command: Command) -> Msg {
    match command {
        Command::DetectAuth { detector } => {
            let status = tokio::task::spawn_blocking(move || detector.detect())
                .await
                .unwrap_or_default();
            if status.authenticated {
                Msg::AuthCompleted {
                    token: status.token,
                    source: status.source,
                }
            } else {
                Msg::Auth(AuthMsg::NotFound(status))
            }
        }
        Command::SubmitToken { token } => Msg::AuthCompleted {
            token,
            source: "entered".to_string(),
        },
        Command::ListBranches { repo, generation } => {
            let result = blocking(move || repo.list_branches()).await;
            Msg::Branches(BranchesMsg::Loaded { generation, result })
        }
        Command::Checkout { repo, branch } => {
            let name = branch.clone();
            let result = blocking(move || repo.checkout(&name)).await;
            Msg::Branches(BranchesMsg::CheckedOut { branch, result })
        }
        Command::CreateBranch { repo, name } => {
            let new = name.clone();
            let result = blocking(move || repo.create_branch(&new)).await;
            Msg::Branches(BranchesMsg::Created { name, result })
        }
        Command::RenameBranch {
            repo,
            from,
            to,
            rename_remote,
        } => {
            let (old, new) = (from.clone(), to.clone());
            let result = blocking(move || repo.rename_branch(&old, &new)).await;
            Msg::Branches(BranchesMsg::Renamed {
                from,
                to,
                rename_remote,
                result,
            })
        }
        Command::RenameRemoteBranch { repo, from, to } => {
            let (old, new) = (from.clone(), to.clone());
            let result = blocking(move || repo.rename_remote_branch(&old, &new)).await;
            Msg::Branches(BranchesMsg::RemoteRenamed { from, to, result })
        }
        Command::LoadReflog {
            repo,
            limit,
            generation,
        } => {
            let result = blocking(move || repo.reflog(limit)).await;
            Msg::History(HistoryMsg::Loaded { generation, result })
        }
        Command::RefreshHistory => Msg::History(HistoryMsg::Refresh),
        Command::ListRuns {
            forge,
            branch,
            per_page,
            generation,
        } => {
            let result = forge.list_runs(&branch, per_page).await;
            Msg::Ci(CiMsg::RunsLoaded { generation, result })
        }
        Command::ListJobs {
            forge,
            run_id,
            generation,
        } => {
            let result = forge.list_jobs(run_id).await;
            Msg::Ci(CiMsg::JobsLoaded {
                generation,
                run_id,
                result,
            })
        }
        Command::FetchLog {
            forge,
            job_id,
            generation,
        } => {
            let result = forge.fetch_log(job_id).await;
            Msg::Ci(CiMsg::LogLoaded {
                generation,
                job_id,
                result,
            })
        }
        Command::ListOrgs { forge, generation } => {
            let result = forge.list_user_orgs().await;
            Msg::Org(OrgMsg::OrgsLoaded { generation, result })
        }
        Command::ListOrgRepos {
            forge,
            org,
            generation,
        } => {
            let result = forge.list_org_repos(&org).await;
            Msg::Org(OrgMsg::ReposLoaded {
                generation,
                org,
                result,
            })
        }
        Command::Clone {
            cloner,
            url,
            target,
            repo_name,
        } => {
            let path = target.clone();
            let result = blocking(move || cloner.clone_repo(&url, &path)).await;
            Msg::Org(OrgMsg::Cloned {
                repo_name,
                target,
                result,
            })
        }
    }
}

/// Spawns commands and forwards their messages to the event loop
#[derive(Debug, Clone)]
pub struct Executor {
    tx: mpsc::UnboundedSender<Msg>,
}

impl Executor {
    pub fn new(tx: mpsc::UnboundedSender<Msg>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, commands: Vec<Command>) {
        for command in commands {
            tracing::debug!(command = command.name(), "dispatch");
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let msg = execute(command).await;
                tx.send(msg).ok();
            });
        }
    }
}
