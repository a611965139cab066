use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::infer::{self, RemoteRepo};

pub const CONFIG_FILE: &str = ".check-release.toml";

/// Optional `.check-release.toml` at the repository root.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub api_url: Option<String>,
}

/// Values taken from `CHECK_RELEASE_*` and `GITHUB_TOKEN`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvOverrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub version: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            owner: get("CHECK_RELEASE_OWNER"),
            repo: get("CHECK_RELEASE_REPO"),
            api_url: get("CHECK_RELEASE_API_URL"),
            token: get("CHECK_RELEASE_GITHUB_TOKEN").or_else(|| get("GITHUB_TOKEN")),
            version: get("CHECK_RELEASE_VERSION"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub owner: String,
    pub repo: String,
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub version: Option<String>,
}

/// Reads `.check-release.toml` under `checkout`; a missing file means no settings.
pub async fn load_file_config(checkout: &Path) -> Result<FileConfig> {
    let path = checkout.join(CONFIG_FILE);
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(err) => {
            return Err(
                anyhow::Error::new(err).context(format!("failed to read {}", path.display()))
            );
        }
    };
    let cfg =
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!("config: loaded {}", path.display());
    Ok(cfg)
}

pub async fn load_settings() -> Result<Settings> {
    let env = EnvOverrides::from_env();
    let Some(root) = infer::find_checkout(Path::new(".")).await? else {
        return merge(env, FileConfig::default(), None);
    };

    let file = load_file_config(&root).await?;
    let needs_remote = (env.owner.is_none() && file.owner.is_none())
        || (env.repo.is_none() && file.repo.is_none());
    let remote = if needs_remote {
        match infer::infer_remote(&root).await {
            Ok(remote) => Some(remote),
            Err(err) => {
                tracing::debug!("config: remote inference failed: {:#}", err);
                None
            }
        }
    } else {
        None
    };
    merge(env, file, remote)
}

/// Per field: environment, then config file, then git remote.
pub fn merge(env: EnvOverrides, file: FileConfig, remote: Option<RemoteRepo>) -> Result<Settings> {
    let (remote_owner, remote_name) = match remote {
        Some(r) => (Some(r.owner), Some(r.name)),
        None => (None, None),
    };
    let owner = env.owner.or(file.owner).or(remote_owner);
    let repo = env.repo.or(file.repo).or(remote_name);
    let (Some(owner), Some(repo)) = (owner, repo) else {
        bail!(
            "cannot determine GitHub repository; set CHECK_RELEASE_OWNER and CHECK_RELEASE_REPO, \
             add owner/repo to {}, or add a GitHub remote",
            CONFIG_FILE
        );
    };
    let settings = Settings {
        owner,
        repo,
        api_url: env.api_url.or(file.api_url),
        token: env.token,
        version: env.version,
    };
    tracing::debug!(
        "config: repo={}/{} api_url={:?} token={}",
        settings.owner,
        settings.repo,
        settings.api_url,
        settings.token.is_some()
    );
    Ok(settings)
}
