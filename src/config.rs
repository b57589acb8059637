use crate::declaration::DEFAULT_RULE;
use crate::error::WtoolError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE: &str = "wtool.toml";

/// Optional `wtool.toml` next to `WORKSPACE`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct WtoolConfig {
    /// Rule called for each appended dependency
    pub rule: String,
    /// git executable used for `ls-remote`
    pub git: String,
    pub discovery: DiscoveryConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    pub timeout_secs: u64,
}

impl Default for WtoolConfig {
    fn default() -> Self {
        Self {
            rule: DEFAULT_RULE.to_string(),
            git: "git".to_string(),
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl WtoolConfig {
    /// Load `wtool.toml` from the workspace root, or defaults if there is none.
    pub fn load(root: &Path) -> Result<Self, WtoolError> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| WtoolError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| WtoolError::Config {
            path: path.clone(),
            message: e.message().to_string(),
        })?;

        if !is_identifier(&config.rule) {
            return Err(WtoolError::Config {
                path,
                message: format!("rule {:?} is not a valid identifier", config.rule),
            });
        }
        if config.git.trim().is_empty() {
            return Err(WtoolError::Config {
                path,
                message: "git must not be empty".to_string(),
            });
        }
        if config.discovery.timeout_secs == 0 {
            return Err(WtoolError::Config {
                path,
                message: "discovery.timeout_secs must be at least 1".to_string(),
            });
        }

        Ok(config)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery.timeout_secs)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
