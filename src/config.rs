use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ClaudeChatError, Result};

/// Fixed upstream endpoint the relay forwards to. Overridable through
/// `CLAUDE_CHAT_UPSTREAM_URL` so tests and self-hosted gateways can point
/// elsewhere.
pub const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// Protocol version header value required by the upstream API.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    pub fn is_production(self) -> bool {
        matches!(self, RunMode::Production)
    }
}

impl FromStr for RunMode {
    type Err = ClaudeChatError;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" => Ok(RunMode::Production),
            "development" | "" => Ok(RunMode::Development),
            other => Err(ClaudeChatError::Config(format!(
                "unknown run mode: {other} (expected development or production)"
            ))),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunMode::Development => "development",
            RunMode::Production => "production",
        })
    }
}

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub credential: String,
    pub upstream_url: String,
    pub mode: RunMode,
    pub static_dir: PathBuf,
}

impl RelayConfig {
    /// Reads the credential and upstream endpoint from the environment.
    /// Fails when `ANTHROPIC_API_KEY` is absent so the daemon refuses to
    /// start instead of relaying unauthenticated requests.
    pub fn from_env(mode: RunMode, static_dir: PathBuf) -> Result<Self> {
        Self::from_lookup(mode, static_dir, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(mode: RunMode, static_dir: PathBuf, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = lookup("ANTHROPIC_API_KEY")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ClaudeChatError::Config("ANTHROPIC_API_KEY is not set".to_string())
            })?;

        let upstream_url = lookup("CLAUDE_CHAT_UPSTREAM_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| ANTHROPIC_MESSAGES_URL.to_string());

        Ok(Self {
            credential,
            upstream_url,
            mode,
            static_dir,
        })
    }

    /// Directory to serve the client bundle from, `None` outside production.
    pub fn static_root(&self) -> Option<&Path> {
        self.mode
            .is_production()
            .then_some(self.static_dir.as_path())
    }
}
