use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// Local branch as shown in the branches view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub short_hash: String,
    pub subject: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub is_current: bool,
    pub has_upstream: bool,
    pub ahead: u32,
    pub behind: u32,
    /// Comparison against the remote default branch, absent for the default branch itself
    pub default_compare: Option<DefaultCompare>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultCompare {
    pub branch: String,
    pub ahead: u32,
    pub behind: u32,
}

/// One line of `git reflog`, humanized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    pub selector: String,
    pub action: String,
    pub detail: String,
    pub time_ago: String,
}

/// owner/name of the GitHub repository behind `origin`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn is_active(&self) -> bool {
        !matches!(self, RunStatus::Completed | RunStatus::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Neutral,
    #[serde(other)]
    Unknown,
}

/// Status glyph shared by runs, jobs and steps
pub fn status_badge(status: RunStatus, conclusion: Option<Conclusion>) -> &'static str {
    if status.is_active() {
        return "⏳";
    }
    match conclusion {
        Some(Conclusion::Success) => "✓",
        Some(Conclusion::Failure) | Some(Conclusion::TimedOut) => "✗",
        Some(Conclusion::Cancelled) => "⊘",
        Some(Conclusion::Skipped) | Some(Conclusion::Neutral) => "↷",
        _ => "?",
    }
}

/// GitHub Actions workflow run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub status: RunStatus,
    pub conclusion: Option<Conclusion>,
    #[serde(default)]
    pub head_branch: Option<String>,
    pub head_sha: String,
    pub event: String,
    pub run_number: u64,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

impl WorkflowRun {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("workflow")
    }

    pub fn short_sha(&self) -> &str {
        &self.head_sha[..7.min(self.head_sha.len())]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub id: u64,
    pub run_id: u64,
    pub name: String,
    pub status: RunStatus,
    pub conclusion: Option<Conclusion>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Job {
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.completed_at? - self.started_at?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Step {
    pub name: String,
    pub status: RunStatus,
    pub conclusion: Option<Conclusion>,
    pub number: u64,
}

/// Parsed error location from a job log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorAnnotation {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Org {
    pub login: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrgRepo {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ssh_url: String,
    pub clone_url: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub archived: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Result of looking for stored GitHub credentials
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub token: String,
    pub source: String,
}

impl fmt::Debug for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthStatus")
            .field("authenticated", &self.authenticated)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_status_wins_over_conclusion() {
        assert_eq!(
            status_badge(RunStatus::InProgress, Some(Conclusion::Failure)),
            "⏳"
        );
        assert_eq!(status_badge(RunStatus::Completed, Some(Conclusion::Success)), "✓");
        assert_eq!(status_badge(RunStatus::Completed, None), "?");
    }

    #[test]
    fn workflow_run_deserializes_unknown_status() {
        let json = r#"{
            "id": 7,
            "name": "CI",
            "status": "something_new",
            "conclusion": null,
            "head_branch": "main",
            "head_sha": "0123456789abcdef",
            "event": "push",
            "run_number": 42,
            "created_at": "2024-01-02T03:04:05Z",
            "html_url": "https://github.com/o/r/actions/runs/7"
        }"#;
        let run: WorkflowRun = serde_json::from_str(json).unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert_eq!(run.short_sha(), "0123456");
        assert_eq!(run.display_name(), "CI");
    }

    #[test]
    fn auth_status_debug_hides_token() {
        let status = AuthStatus {
            authenticated: true,
            token: "ghp_secret".to_string(),
            source: "GH_TOKEN".to_string(),
        };
        assert!(!format!("{:?}", status).contains("ghp_secret"));
    }
}
