use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use serde::Deserialize;

use crate::config::Settings;
use crate::error::CheckError;

/// A file attached to a release. Only `name` is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReleaseBody {
    assets: Vec<Asset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseLookup {
    NotFound,
    Found(Vec<Asset>),
}

#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<ReleaseLookup, CheckError>;
}

/// Build an Octocrab client that never retries, authenticated when a token is set.
pub fn client(settings: &Settings) -> Result<Octocrab> {
    let mut builder = Octocrab::builder();
    builder.add_retry_config(RetryConfig::None);
    if let Some(url) = settings.api_url.as_deref() {
        builder = builder
            .base_uri(url)
            .with_context(|| format!("invalid GitHub API URL {}", url))?;
    }
    if let Some(token) = settings.token.clone() {
        builder = builder.personal_token(token);
    }
    builder.build().context("failed to build GitHub client")
}

pub struct GitHubReleases {
    gh: Octocrab,
}

impl GitHubReleases {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            gh: client(settings)?,
        })
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleases {
    async fn release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<ReleaseLookup, CheckError> {
        let route = format!(
            "/repos/{}/{}/releases/tags/{}",
            owner,
            repo,
            urlencoding::encode(tag)
        );
        tracing::debug!("github: GET {}", route);
        self.lookup(&route, tag)
            .await
            .map_err(|err| CheckError::Transport(err.context(format!("GET {}", route))))
    }
}

impl GitHubReleases {
    async fn lookup(&self, route: &str, tag: &str) -> Result<ReleaseLookup> {
        let response = self.gh._get(route).await.map_err(describe)?;
        let status = response.status();
        if status.as_u16() == 404 {
            tracing::debug!("github: no release for {}", tag);
            return Ok(ReleaseLookup::NotFound);
        }
        if !status.is_success() {
            return match octocrab::map_github_error(response).await {
                Err(err) => Err(describe(err)),
                Ok(_) => Err(anyhow::anyhow!("unexpected status {}", status)),
            };
        }
        let text = self.gh.body_to_string(response).await.map_err(describe)?;
        let body: ReleaseBody =
            serde_json::from_str(&text).context("invalid release response body")?;
        tracing::debug!("github: release {} has {} assets", tag, body.assets.len());
        Ok(ReleaseLookup::Found(body.assets))
    }
}

/// Short form of an octocrab error; its own Display carries a backtrace.
fn describe(err: octocrab::Error) -> anyhow::Error {
    match err {
        octocrab::Error::GitHub { source, .. } => anyhow::anyhow!(
            "HTTP {}: {}",
            source.status_code.as_u16(),
            source.message
        ),
        octocrab::Error::Serde { source, .. } => {
            anyhow::anyhow!("invalid response body: {}", source)
        }
        other => anyhow::anyhow!("{}", error_chain(&other)),
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![first_line(&err.to_string())];
    let mut cur = err.source();
    while let Some(e) = cur {
        let line = first_line(&e.to_string());
        if !parts.contains(&line) {
            parts.push(line);
        }
        cur = e.source();
    }
    parts.join(": ")
}

fn first_line(msg: &str) -> String {
    msg.lines().next().unwrap_or_default().trim().to_string()
}
