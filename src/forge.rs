use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Job, Org, OrgRepo, RepoSlug, WorkflowRun};

/// Authenticated GitHub operations used by the CI and Org views.
#[async_trait]
pub trait Forge: Send + Sync + std::fmt::Debug {
    // CI, scoped to the repository behind `origin`
    async fn list_runs(&self, branch: &str, per_page: u8) -> Result<Vec<WorkflowRun>>;
    async fn list_jobs(&self, run_id: u64) -> Result<Vec<Job>>;
    async fn fetch_log(&self, job_id: u64) -> Result<String>;

    // Organizations of the authenticated user
    async fn list_user_orgs(&self) -> Result<Vec<Org>>;
    async fn list_org_repos(&self, org: &str) -> Result<Vec<OrgRepo>>;
}

/// Builds the client once a token is known.
///
/// Construction must not touch the network: it runs inside the event loop.
pub trait Connector: Send + Sync {
    fn connect(&self, token: &str, slug: Option<&RepoSlug>) -> Result<Arc<dyn Forge>>;
}
