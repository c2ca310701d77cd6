use std::path::Path;
use std::process::Command;

use crate::error::{HitError, Result};

/// Clones a remote repository into a local directory, blocking until done.
pub trait Cloner: Send + Sync + std::fmt::Debug {
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct GitCloner;

impl Cloner for GitCloner {
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()> {
        if target.exists() && target.read_dir()?.next().is_some() {
            return Err(HitError::Clone(format!(
                "{} already exists and is not empty",
                target.display()
            )));
        }

        let output = Command::new("git")
            .arg("clone")
            .arg("--quiet")
            .arg("--")
            .arg(url)
            .arg(target)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("git clone exited with an error");
            Err(HitError::Clone(reason.trim().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn refuses_non_empty_target() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("file"), "x").unwrap();
        let err = GitCloner
            .clone_repo("https://example.invalid/repo.git", dir.path())
            .unwrap_err();
        assert!(matches!(err, HitError::Clone(_)));
    }

    #[test]
    fn option_like_url_is_an_operand() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out");
        let err = GitCloner
            .clone_repo("--upload-pack=touch marker", &target)
            .unwrap_err();
        assert!(matches!(err, HitError::Clone(_)));
        assert!(!dir.path().join("marker").exists());
    }

    #[test]
    fn clones_local_repository() {
        let source = TempDir::new().unwrap();
        let status = Command::new("git")
            .args(["init", "-q"])
            .current_dir(source.path())
            .status()
            .unwrap();
        assert!(status.success());

        let dest = TempDir::new().unwrap();
        let target = dest.path().join("copy");
        GitCloner
            .clone_repo(source.path().to_str().unwrap(), &target)
            .unwrap();
        assert!(target.join(".git").exists());
    }
}
