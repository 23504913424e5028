use std::env;
use std::path::PathBuf;

use crate::request::SameTeamPolicy;

pub const DEFAULT_MODEL_PATH: &str = "assets/model.json";
pub const DEFAULT_ENCODER_PATH: &str = "assets/team_encoder.json";
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub encoder: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL_PATH),
            encoder: PathBuf::from(DEFAULT_ENCODER_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub artifacts: ArtifactPaths,
    pub same_team_policy: SameTeamPolicy,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactPaths::default(),
            same_team_policy: SameTeamPolicy::Warn,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl AppConfig {
    /// Reads `.env.local` / `.env` (if present) and then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let path_var = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
                .map(PathBuf::from)
        };

        Self {
            artifacts: ArtifactPaths {
                model: path_var("IPL_MODEL_PATH").unwrap_or(defaults.artifacts.model),
                encoder: path_var("IPL_ENCODER_PATH").unwrap_or(defaults.artifacts.encoder),
            },
            same_team_policy: lookup("IPL_SAME_TEAM_POLICY")
                .and_then(|raw| SameTeamPolicy::parse(&raw))
                .unwrap_or(defaults.same_team_policy),
            log_dir: path_var("IPL_LOG_DIR").unwrap_or(defaults.log_dir),
        }
    }
}
