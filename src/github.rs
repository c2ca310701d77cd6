use std::sync::Arc;

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::Deserialize;

use crate::error::{HitError, Result};
use crate::forge::{Connector, Forge};
use crate::types::{Job, Org, OrgRepo, RepoSlug, WorkflowRun};

const API_ROOT: &str = "https://api.github.com";

pub struct GitHub {
    client: Octocrab,
    http: reqwest::Client,
    token: String,
    slug: Option<RepoSlug>,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub")
            .field("slug", &self.slug)
            .finish_non_exhaustive()
    }
}

impl From<octocrab::Error> for HitError {
    fn from(err: octocrab::Error) -> Self {
        HitError::Api(err.to_string())
    }
}

#[derive(Deserialize)]
struct RunsPage {
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Deserialize)]
struct JobsPage {
    jobs: Vec<Job>,
}

impl GitHub {
    pub fn new(token: String, slug: Option<RepoSlug>) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(HitError::Auth("empty token".to_string()));
        }

        let client = Octocrab::builder()
            .personal_token(token.clone())
            .build()
            .map_err(|e| HitError::Auth(e.to_string()))?;

        Ok(Self {
            client,
            http: reqwest::Client::new(),
            token,
            slug,
        })
    }

    fn repo_route(&self, path: &str) -> Result<String> {
        let slug = self.slug.as_ref().ok_or_else(|| {
            HitError::Api("origin is not a GitHub repository; CI is unavailable".to_string())
        })?;
        Ok(format!("/repos/{}/{}/{}", slug.owner, slug.name, path))
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn list_runs(&self, branch: &str, per_page: u8) -> Result<Vec<WorkflowRun>> {
        let route = format!(
            "{}?branch={}&per_page={}",
            self.repo_route("actions/runs")?,
            urlencoding::encode(branch),
            per_page
        );
        let page: RunsPage = self.client.get(&route, None::<&()>).await?;
        Ok(page.workflow_runs)
    }

    async fn list_jobs(&self, run_id: u64) -> Result<Vec<Job>> {
        let route = self.repo_route(&format!("actions/runs/{}/jobs", run_id))?;
        let page: JobsPage = self.client.get(&route, None::<&()>).await?;
        Ok(page.jobs)
    }

    async fn fetch_log(&self, job_id: u64) -> Result<String> {
        // The endpoint redirects to a short-lived blob URL; octocrab does not
        // follow it, reqwest does.
        let url = format!(
            "{}{}",
            API_ROOT,
            self.repo_route(&format!("actions/jobs/{}/logs", job_id))?
        );
        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "hit")
            .send()
            .await
            .map_err(|e| HitError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(HitError::Api(format!(
                "Failed to fetch job log: {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| HitError::Api(e.to_string()))
    }

    async fn list_user_orgs(&self) -> Result<Vec<Org>> {
        let orgs: Vec<Org> = self
            .client
            .get("/user/orgs?per_page=100", None::<&()>)
            .await?;
        Ok(orgs)
    }

    async fn list_org_repos(&self, org: &str) -> Result<Vec<OrgRepo>> {
        let route = format!(
            "/orgs/{}/repos?per_page=100&sort=updated",
            urlencoding::encode(org)
        );
        let repos: Vec<OrgRepo> = self.client.get(&route, None::<&()>).await?;
        Ok(repos)
    }
}

/// Connects to github.com with a personal or `gh` token
#[derive(Debug, Default)]
pub struct GitHubConnector;

impl Connector for GitHubConnector {
    fn connect(&self, token: &str, slug: Option<&RepoSlug>) -> Result<Arc<dyn Forge>> {
        let github = GitHub::new(token.to_string(), slug.cloned())?;
        Ok(Arc::new(github))
    }
}
