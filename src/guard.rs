use crate::args::SuffixList;
use crate::config::Settings;
use crate::error::CheckError;
use crate::github::{ReleaseLookup, ReleaseSource};
use crate::matcher::{has_conflict, matching_assets};
use crate::version::VersionSource;

/// How a passing check ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    TagAbsent { tag: String },
    NoConflict { tag: String, assets: usize },
}

pub async fn check_release(
    suffixes: &SuffixList,
    settings: &Settings,
    versions: &dyn VersionSource,
    releases: &dyn ReleaseSource,
) -> Result<Outcome, CheckError> {
    let version = versions
        .current_version()
        .await
        .map_err(CheckError::VersionResolution)?;
    let tag = format!("v{}", version);
    tracing::debug!(
        "check-release: looking up {} in {}/{} for {} suffixes",
        tag,
        settings.owner,
        settings.repo,
        suffixes.len()
    );

    match releases
        .release_by_tag(&settings.owner, &settings.repo, &tag)
        .await?
    {
        ReleaseLookup::NotFound => {
            tracing::info!("Tag {} does not exist, proceeding...", tag);
            Ok(Outcome::TagAbsent { tag })
        }
        ReleaseLookup::Found(assets) if has_conflict(&assets, suffixes) => {
            let matched = matching_assets(&assets, suffixes);
            for asset in &matched {
                tracing::warn!(
                    asset = %asset.name,
                    size = ?asset.size,
                    url = ?asset.browser_download_url,
                    "check-release: {} already has a matching asset",
                    tag
                );
            }
            Err(CheckError::ReleaseConflict {
                assets: matched.into_iter().map(|a| a.name.clone()).collect(),
                tag,
            })
        }
        ReleaseLookup::Found(assets) => {
            tracing::info!(
                "Tag {} exists but none of its {} assets match, proceeding...",
                tag,
                assets.len()
            );
            Ok(Outcome::NoConflict {
                tag,
                assets: assets.len(),
            })
        }
    }
}
