use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CloneProtocol {
    #[default]
    Ssh,
    Https,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub tick_rate_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 120 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Checked in order before the token file and `token_command`
    pub token_env: Vec<String>,
    pub token_command: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: vec!["GH_TOKEN".to_string(), "GITHUB_TOKEN".to_string()],
            token_command: Some("gh auth token".to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CiConfig {
    pub page_size: u8,
}

impl Default for CiConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub limit: usize,
    /// Terminal width from which the reflog pane is shown
    pub min_width: u16,
    pub pane_width: u16,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: 50,
            min_width: 160,
            pane_width: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CloneConfig {
    pub protocol: CloneProtocol,
    /// Parent directory offered for clones, defaults to $HOME
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub auth: AuthConfig,
    pub ci: CiConfig,
    pub history: HistoryConfig,
    pub clone: CloneConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("hit").join("config.toml"))
}

impl Config {
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config.sanitized(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
                Config::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        if self.ci.page_size == 0 {
            self.ci.page_size = CiConfig::default().page_size;
        }
        if self.general.tick_rate_ms == 0 {
            self.general.tick_rate_ms = GeneralConfig::default().tick_rate_ms;
        }
        self
    }
}

impl CloneConfig {
    /// Directory a repository named `name` is cloned into unless edited
    pub fn target_for(&self, name: &str) -> PathBuf {
        self.root
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(name)
    }
}
