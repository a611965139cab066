use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use cargo_metadata::{Metadata, MetadataCommand};

/// Where the version being released comes from.
#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn current_version(&self) -> Result<String>;
}

/// A version handed in from outside, e.g. `CHECK_RELEASE_VERSION`.
#[derive(Debug, Clone)]
pub struct FixedVersion(pub String);

#[async_trait]
impl VersionSource for FixedVersion {
    async fn current_version(&self) -> Result<String> {
        let raw = self.0.trim();
        validate(raw.strip_prefix('v').unwrap_or(raw))
    }
}

/// Reads the version of the released crate from `cargo metadata`.
#[derive(Debug, Clone)]
pub struct CargoVersion {
    pub repo_name: String,
}

#[async_trait]
impl VersionSource for CargoVersion {
    async fn current_version(&self) -> Result<String> {
        let meta = load_metadata().await?;
        let crates = collect_crates(&meta);
        let chosen = select_crate(&crates, &self.repo_name)?;
        tracing::debug!("version: using crate {} {}", chosen.name, chosen.version);
        validate(&chosen.version)
    }
}

pub fn version_source(env_version: Option<String>, repo_name: &str) -> Box<dyn VersionSource> {
    match env_version {
        Some(v) => Box::new(FixedVersion(v)),
        None => Box::new(CargoVersion {
            repo_name: repo_name.to_string(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrateVersion {
    pub name: String,
    pub version: String,
    pub is_root: bool,
}

async fn load_metadata() -> Result<Metadata> {
    tokio::task::spawn_blocking(|| {
        let mut cmd = MetadataCommand::new();
        cmd.no_deps();
        let meta = cmd.exec().context("cargo metadata failed")?;
        Ok::<_, anyhow::Error>(meta)
    })
    .await
    .map_err(|e| anyhow::anyhow!("cargo metadata task join error: {}", e))?
}

fn collect_crates(meta: &Metadata) -> Vec<CrateVersion> {
    let root = meta.root_package().map(|p| p.id.clone());
    meta.packages
        .iter()
        .filter(|pkg| meta.workspace_members.contains(&pkg.id))
        .map(|pkg| CrateVersion {
            name: pkg.name.clone(),
            version: pkg.version.to_string(),
            is_root: root.as_ref() == Some(&pkg.id),
        })
        .collect()
}

/// Root package first, then the member named like the repository, then a
/// lone member.
pub fn select_crate<'a>(crates: &'a [CrateVersion], repo_name: &str) -> Result<&'a CrateVersion> {
    if let Some(root) = crates.iter().find(|c| c.is_root) {
        return Ok(root);
    }
    if let Some(by_name) = crates.iter().find(|c| c.name == repo_name) {
        return Ok(by_name);
    }
    if let [only] = crates {
        return Ok(only);
    }
    bail!(
        "cannot determine which crate to version among {} workspace members; set CHECK_RELEASE_VERSION",
        crates.len()
    )
}

fn validate(version: &str) -> Result<String> {
    let parsed = semver::Version::parse(version)
        .with_context(|| format!("invalid version {:?}", version))?;
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn krate(name: &str, version: &str, is_root: bool) -> CrateVersion {
        CrateVersion {
            name: name.into(),
            version: version.into(),
            is_root,
        }
    }

    #[test]
    fn prefers_root_package() {
        let crates = vec![krate("widget", "1.0.0", false), krate("cli", "2.0.0", true)];
        assert_eq!(select_crate(&crates, "widget").unwrap().name, "cli");
    }

    #[test]
    fn falls_back_to_repo_name_then_single_member() {
        let crates = vec![krate("widget-core", "0.3.0", false), krate("widget", "0.4.0", false)];
        assert_eq!(select_crate(&crates, "widget").unwrap().version, "0.4.0");

        let crates = vec![krate("lonely", "0.1.0", false)];
        assert_eq!(select_crate(&crates, "widget").unwrap().name, "lonely");
    }

    #[test]
    fn ambiguous_workspace_is_an_error() {
        let crates = vec![krate("a", "0.1.0", false), krate("b", "0.1.0", false)];
        let err = select_crate(&crates, "widget").unwrap_err();
        assert!(err.to_string().contains("CHECK_RELEASE_VERSION"));
        assert!(select_crate(&[], "widget").is_err());
    }

    #[tokio::test]
    async fn fixed_version_accepts_leading_v() {
        let v = FixedVersion(" v1.2.3-rc.1 ".into()).current_version().await.unwrap();
        assert_eq!(v, "1.2.3-rc.1");
    }

    #[tokio::test]
    async fn fixed_version_rejects_garbage() {
        let err = FixedVersion("latest".into()).current_version().await.unwrap_err();
        assert!(err.to_string().contains("invalid version"));
    }
}
