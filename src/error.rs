use thiserror::Error;

/// Every way a check can end other than "safe to proceed".
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("no input were received; pass at least one asset suffix, e.g. check-release '.exe'")]
    Usage,
    #[error("failed to resolve repository settings: {0:#}")]
    Config(anyhow::Error),
    #[error("failed to resolve current version: {0:#}")]
    VersionResolution(anyhow::Error),
    #[error("GitHub release lookup failed: {0:#}")]
    Transport(anyhow::Error),
    #[error(
        "Matches in tag {tag} were found ({}). Please remove them before building.",
        .assets.join(", ")
    )]
    ReleaseConflict { tag: String, assets: Vec<String> },
}

impl CheckError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CheckError::Usage => 2,
            CheckError::ReleaseConflict { .. } => 3,
            CheckError::Config(_) | CheckError::VersionResolution(_) | CheckError::Transport(_) => {
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_separate_conflict_from_usage_and_failures() {
        let conflict = CheckError::ReleaseConflict {
            tag: "v1.2.3".into(),
            assets: vec!["app.dmg".into()],
        };
        assert_eq!(conflict.exit_code(), 3);
        assert_eq!(CheckError::Usage.exit_code(), 2);
        assert_eq!(
            CheckError::Transport(anyhow::anyhow!("boom")).exit_code(),
            1
        );
        assert_eq!(
            CheckError::VersionResolution(anyhow::anyhow!("no crate")).exit_code(),
            1
        );
    }

    #[test]
    fn conflict_message_names_tag_and_assets() {
        let err = CheckError::ReleaseConflict {
            tag: "v1.2.3".into(),
            assets: vec!["app.dmg".into(), "app.exe".into()],
        };
        assert_eq!(
            err.to_string(),
            "Matches in tag v1.2.3 were found (app.dmg, app.exe). Please remove them before building."
        );
    }

    #[test]
    fn transport_message_keeps_context_chain() {
        let err = CheckError::Transport(
            anyhow::anyhow!("status 500").context("GET /repos/acme/widget/releases/tags/v1.0.0"),
        );
        let msg = err.to_string();
        assert!(msg.contains("GET /repos/acme/widget/releases/tags/v1.0.0"));
        assert!(msg.contains("status 500"));
    }
}
