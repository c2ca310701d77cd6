use crate::config::AuthConfig;
use crate::types::AuthStatus;

/// Looks for GitHub credentials without prompting.
pub trait AuthDetector: Send + Sync + std::fmt::Debug {
    fn detect(&self) -> AuthStatus;
}

/// Env vars, then the stored token file, then a CLI command (`gh auth token`)
#[derive(Debug, Clone)]
pub struct StoredAuth {
    token_env: Vec<String>,
    token_command: Option<String>,
}

impl StoredAuth {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            token_env: config.token_env.clone(),
            token_command: config.token_command.clone(),
        }
    }
}

impl AuthDetector for StoredAuth {
    fn detect(&self) -> AuthStatus {
        for var in &self.token_env {
            if let Some(token) = non_empty(std::env::var(var).ok()) {
                return authenticated(token, var);
            }
        }

        if let Some(token) = load_stored_token() {
            return authenticated(token, "token file");
        }

        if let Some(cmd) = &self.token_command {
            if let Some(token) = try_cli_token(cmd) {
                return authenticated(token, cmd);
            }
        }

        tracing::debug!("no stored GitHub credentials found");
        AuthStatus::default()
    }
}

fn authenticated(token: String, source: &str) -> AuthStatus {
    AuthStatus {
        authenticated: true,
        token,
        source: source.to_string(),
    }
}

fn non_empty(token: Option<String>) -> Option<String> {
    let token = token?.trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Try to run a CLI command and capture stdout as a token
fn try_cli_token(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .stderr(std::process::Stdio::null())
        .output()
        .ok()?;

    if output.status.success() {
        non_empty(Some(String::from_utf8_lossy(&output.stdout).to_string()))
    } else {
        None
    }
}

/// ~/.config/hit/token, read-only: tokens typed into the auth view are never saved
fn token_path() -> Option<std::path::PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("hit").join("token"))
}

fn load_stored_token() -> Option<String> {
    let path = token_path()?;
    non_empty(std::fs::read_to_string(path).ok())
}
