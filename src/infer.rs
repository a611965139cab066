use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use git2::{ErrorCode, Repository};
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepo {
    pub owner: String,
    pub name: String,
}

/// Working directory of the checkout containing `start`, if there is one.
/// Bare repositories have no working directory and count as no checkout.
pub async fn find_checkout(start: &Path) -> Result<Option<PathBuf>> {
    let start = start.to_path_buf();
    tokio::task::spawn_blocking(move || match Repository::discover(&start) {
        Ok(repo) => Ok(repo.workdir().map(Path::to_path_buf)),
        Err(err) if err.code() == ErrorCode::NotFound => {
            tracing::debug!("infer: {} is not inside a git checkout", start.display());
            Ok(None)
        }
        Err(err) => Err(anyhow::Error::from(err)),
    })
    .await
    .map_err(|e| anyhow::anyhow!("find_checkout task join error: {}", e))?
}

pub async fn infer_remote(root: &Path) -> Result<RemoteRepo> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let repo = Repository::discover(root)?;
        let remotes = repo.remotes()?;
        let chosen = remotes
            .iter()
            .flatten()
            .find(|r| *r == "origin")
            .or_else(|| remotes.iter().flatten().next())
            .map(str::to_string);
        let name = chosen.ok_or_else(|| anyhow::anyhow!("no git remotes found"))?;
        let remote = repo.find_remote(&name)?;
        let url = remote
            .url()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("remote {} has no URL", name))?;
        match parse_github_remote(&url)? {
            Some(found) => Ok(found),
            None => bail!("unsupported remote URL (expected GitHub): {}", url),
        }
    })
    .await
    .map_err(|e| anyhow::anyhow!("infer_remote task join error: {}", e))?
}

/// Parse GitHub owner/repo from an SSH, `ssh://` or HTTPS remote URL.
pub fn parse_github_remote(url: &str) -> Result<Option<RemoteRepo>> {
    let patterns = [
        r"^git@github\.com:(?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$",
        r"^ssh://git@github\.com/(?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$",
        r"^https?://(?:[^@/]+@)?github\.com/(?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$",
    ];
    for pattern in patterns {
        let re = Regex::new(pattern)?;
        if let Some(c) = re.captures(url) {
            return Ok(Some(RemoteRepo {
                owner: c["owner"].to_string(),
                name: c["repo"].to_string(),
            }));
        }
    }
    Ok(None)
}
