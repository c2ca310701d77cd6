use std::sync::Arc;

use crate::auth::AuthDetector;
use crate::clone::Cloner;
use crate::forge::{Connector, Forge};
use crate::git::{parse_slug, GitRepo};
use crate::types::RepoSlug;

/// Collaborators that exist from startup on
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthDetector>,
    pub cloner: Arc<dyn Cloner>,
    pub connector: Arc<dyn Connector>,
}

/// Shared, read-only context handed to every view when it is built.
///
/// Created once at startup without a client. Authentication produces a new
/// value carrying the client; nothing mutates a session in place.
#[derive(Clone)]
pub struct Session {
    pub repo: Arc<dyn GitRepo>,
    pub forge: Option<Arc<dyn Forge>>,
    pub slug: Option<RepoSlug>,
    pub remote_url: Option<String>,
    /// Branch checked out when the process started
    pub initial_branch: String,
    pub services: Services,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("repo", &self.repo.path())
            .field("slug", &self.slug)
            .field("connected", &self.forge.is_some())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Resolves remote and branch information; call before the event loop starts.
    pub fn new(repo: Arc<dyn GitRepo>, services: Services) -> Self {
        let remote_url = repo.remote_url();
        let slug = remote_url.as_deref().and_then(parse_slug);
        if slug.is_none() {
            tracing::warn!(remote = ?remote_url, "origin is not a GitHub remote; CI will be unavailable");
        }
        let initial_branch = repo.current_branch();

        Self {
            repo,
            forge: None,
            slug,
            remote_url,
            initial_branch,
            services,
        }
    }

    pub fn with_forge(&self, forge: Arc<dyn Forge>) -> Self {
        Self {
            forge: Some(forge),
            ..self.clone()
        }
    }

    pub fn is_connected(&self) -> bool {
        self.forge.is_some()
    }

    pub fn display_name(&self) -> String {
        match &self.slug {
            Some(slug) => slug.to_string(),
            None => self
                .repo
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "repository".to_string()),
        }
    }
}
