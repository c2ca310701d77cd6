//! Local repository access through the git CLI.
//!
//! Every operation shells out to `git` in the repository root and is
//! blocking; callers run them off the event loop.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{HitError, Result};
use crate::types::{Branch, DefaultCompare, ReflogEntry, RepoSlug};

pub trait GitRepo: Send + Sync + std::fmt::Debug {
    fn path(&self) -> &Path;
    fn list_branches(&self) -> Result<Vec<Branch>>;
    /// Empty when HEAD is detached
    fn current_branch(&self) -> String;
    fn checkout(&self, name: &str) -> Result<()>;
    fn create_branch(&self, name: &str) -> Result<()>;
    fn rename_branch(&self, from: &str, to: &str) -> Result<()>;
    /// Publish `to` on the upstream remote and delete `from` there.
    /// Expects the local rename to have happened already.
    fn rename_remote_branch(&self, from: &str, to: &str) -> Result<()>;
    fn has_upstream(&self, name: &str) -> bool;
    fn reflog(&self, limit: usize) -> Result<Vec<ReflogEntry>>;
    fn remote_url(&self) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct CliRepo {
    root: PathBuf,
}

struct GitOutput {
    ok: bool,
    stdout: String,
    stderr: String,
}

fn run_git(args: &[&str], cwd: &Path) -> Result<GitOutput> {
    let output = Command::new("git").args(args).current_dir(cwd).output()?;
    Ok(GitOutput {
        ok: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

impl CliRepo {
    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let out = run_git(&["rev-parse", "--show-toplevel"], path)?;
        if !out.ok {
            return Err(HitError::Git(format!(
                "not a git repository: {}",
                path.display()
            )));
        }
        Ok(Self {
            root: PathBuf::from(out.stdout.trim()),
        })
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        let out = run_git(args, &self.root)?;
        if out.ok {
            Ok(out.stdout)
        } else {
            Err(HitError::Git(out.stderr))
        }
    }

    /// Remote-tracking default branch: origin/HEAD, else origin/main or origin/master
    fn default_branch(&self) -> Option<String> {
        if let Ok(out) = self.git(&["symbolic-ref", "--short", "refs/remotes/origin/HEAD"]) {
            if let Some(name) = out.trim().strip_prefix("origin/") {
                return Some(name.to_string());
            }
        }
        ["main", "master"]
            .into_iter()
            .find(|name| {
                self.git(&["rev-parse", "--verify", "--quiet", &format!("refs/remotes/origin/{}", name)])
                    .is_ok()
            })
            .map(str::to_string)
    }

    fn ahead_behind(&self, left: &str, right: &str) -> (u32, u32) {
        let range = format!("{}...{}", left, right);
        self.git(&["rev-list", "--left-right", "--count", &range])
            .ok()
            .and_then(|out| parse_left_right(&out))
            .unwrap_or((0, 0))
    }

    fn upstream_remote(&self, branch: &str) -> String {
        self.git(&["config", &format!("branch.{}.remote", branch)])
            .map(|out| out.trim().to_string())
            .ok()
            .filter(|remote| !remote.is_empty())
            .unwrap_or_else(|| "origin".to_string())
    }
}

/// Reject names git would refuse or read as an option.
///
/// Covers the rules of `git check-ref-format --branch` that a typed name can
/// break.
pub fn check_branch_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(HitError::Git(format!("invalid branch name '{name}': {reason}")))
    };
    if name.is_empty() {
        return invalid("empty");
    }
    if name.starts_with('-') {
        return invalid("must not start with '-'");
    }
    if name == "@" || name.contains("@{") || name.contains("..") {
        return invalid("reserved sequence");
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(*c))
    {
        return invalid(&format!("contains {c:?}"));
    }
    if name.ends_with('.') || name.ends_with(".lock") {
        return invalid("bad suffix");
    }
    if name.split('/').any(|part| part.is_empty() || part.starts_with('.')) {
        return invalid("bad path component");
    }
    Ok(())
}

const BRANCH_FORMAT: &str = "%(refname:short)%00%(objectname:short)%00%(subject)%00%(authorname)%00%(committerdate:unix)%00%(HEAD)%00%(upstream:short)%00%(upstream:track,nobracket)";

impl GitRepo for CliRepo {
    fn path(&self) -> &Path {
        &self.root
    }

    fn list_branches(&self) -> Result<Vec<Branch>> {
        let format = format!("--format={}", BRANCH_FORMAT);
        let out = self.git(&["for-each-ref", &format, "refs/heads"])?;
        let default_branch = self.default_branch();

        let mut branches: Vec<Branch> = out
            .lines()
            .filter_map(parse_branch_line)
            .collect();

        if let Some(default) = &default_branch {
            let base = format!("origin/{}", default);
            for branch in branches.iter_mut().filter(|b| &b.name != default) {
                let (ahead, behind) = self.ahead_behind(&branch.name, &base);
                branch.default_compare = Some(DefaultCompare {
                    branch: default.clone(),
                    ahead,
                    behind,
                });
            }
        }

        sort_branches(&mut branches);
        Ok(branches)
    }

    fn current_branch(&self) -> String {
        self.git(&["symbolic-ref", "--quiet", "--short", "HEAD"])
            .map(|out| out.trim().to_string())
            .unwrap_or_default()
    }

    fn checkout(&self, name: &str) -> Result<()> {
        // `git checkout` creates a tracking branch when only origin has it
        self.git(&["checkout", "--end-of-options", name]).map(|_| ())
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        check_branch_name(name)?;
        self.git(&["branch", "--end-of-options", name]).map(|_| ())
    }

    fn rename_branch(&self, from: &str, to: &str) -> Result<()> {
        check_branch_name(to)?;
        self.git(&["branch", "-m", "--end-of-options", from, to]).map(|_| ())
    }

    fn rename_remote_branch(&self, from: &str, to: &str) -> Result<()> {
        check_branch_name(to)?;
        if !self.has_upstream(to) {
            return Err(HitError::Git(format!("{to} has no upstream branch")));
        }
        // branch.<to>.remote survives the local rename
        let remote = self.upstream_remote(to);
        let refspec = format!("{}:refs/heads/{}", to, to);
        self.git(&["push", "--end-of-options", &remote, &refspec])?;
        self.git(&["push", "--delete", "--end-of-options", &remote, from])?;
        self.git(&[
            "branch",
            &format!("--set-upstream-to={}/{}", remote, to),
            to,
        ])?;
        Ok(())
    }

    fn has_upstream(&self, name: &str) -> bool {
        self.git(&["rev-parse", "--abbrev-ref", &format!("{}@{{upstream}}", name)])
            .is_ok()
    }

    fn reflog(&self, limit: usize) -> Result<Vec<ReflogEntry>> {
        let count = limit.to_string();
        let out = self.git(&["reflog", "--format=%gd|%gs|%ar", "-n", &count])?;
        Ok(out.lines().filter_map(parse_reflog_line).collect())
    }

    fn remote_url(&self) -> Option<String> {
        self.git(&["remote", "get-url", "origin"])
            .ok()
            .map(|out| out.trim().to_string())
            .filter(|url| !url.is_empty())
    }
}

fn parse_branch_line(line: &str) -> Option<Branch> {
    let fields: Vec<&str> = line.split('\0').collect();
    if fields.len() != 8 {
        return None;
    }
    let (ahead, behind) = parse_track(fields[7]);
    let timestamp = fields[4]
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    Some(Branch {
        name: fields[0].to_string(),
        short_hash: fields[1].to_string(),
        subject: fields[2].to_string(),
        author: fields[3].to_string(),
        timestamp,
        is_current: fields[5] == "*",
        // upstream configured but deleted on the remote counts as none
        has_upstream: !fields[6].is_empty() && fields[7] != "gone",
        ahead,
        behind,
        default_compare: None,
    })
}

/// Parse `%(upstream:track,nobracket)`: "ahead 2, behind 1", "gone" or ""
fn parse_track(track: &str) -> (u32, u32) {
    let mut ahead = 0;
    let mut behind = 0;
    for part in track.split(", ") {
        if let Some(n) = part.strip_prefix("ahead ") {
            ahead = n.parse().unwrap_or(0);
        } else if let Some(n) = part.strip_prefix("behind ") {
            behind = n.parse().unwrap_or(0);
        }
    }
    (ahead, behind)
}

fn parse_left_right(out: &str) -> Option<(u32, u32)> {
    let mut parts = out.split_whitespace();
    let left = parts.next()?.parse().ok()?;
    let right = parts.next()?.parse().ok()?;
    Some((left, right))
}

/// Current branch first, then most recent commit first
fn sort_branches(branches: &mut [Branch]) {
    branches.sort_by(|a, b| {
        b.is_current
            .cmp(&a.is_current)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });
}

fn parse_reflog_line(line: &str) -> Option<ReflogEntry> {
    let mut parts = line.splitn(3, '|');
    let selector = parts.next()?;
    let subject = parts.next()?;
    let time_ago = parts.next()?;
    let (action, detail) = humanize_reflog_subject(subject);
    Some(ReflogEntry {
        selector: selector.to_string(),
        action,
        detail,
        time_ago: time_ago.to_string(),
    })
}

/// Split "action: detail" and shorten the common shapes.
fn humanize_reflog_subject(subject: &str) -> (String, String) {
    let Some((action, detail)) = subject.split_once(": ") else {
        return (subject.to_string(), String::new());
    };

    if action == "checkout" {
        if let Some(moving) = detail.strip_prefix("moving from ") {
            if let Some((from, to)) = moving.split_once(" to ") {
                return (action.to_string(), format!("{} → {}", from, to));
            }
        }
    }

    if let Some(branch) = action.strip_prefix("merge ") {
        let detail = if detail.is_empty() {
            branch.to_string()
        } else {
            format!("{} ({})", branch, detail.to_lowercase())
        };
        return ("merge".to_string(), detail);
    }

    (action.to_string(), detail.to_string())
}

/// Extract owner/name from an SSH (git@host:o/r.git), ssh:// or HTTPS remote URL.
pub fn parse_slug(url: &str) -> Option<RepoSlug> {
    let url = url.trim().trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    let path = if let Some(rest) = url.strip_prefix("git@") {
        rest.split_once(':')?.1
    } else if let Some((_, rest)) = url.split_once("://") {
        // drop user@host[:port]
        rest.split_once('/')?.1
    } else {
        return None;
    };

    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    let name = segments.next()?;
    let owner = segments.next()?;
    Some(RepoSlug {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}
