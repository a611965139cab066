mod args;
mod config;
mod error;
mod github;
mod guard;
mod infer;
mod matcher;
mod version;

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::error::CheckError;

#[derive(Parser, Debug)]
#[command(
    name = "check-release",
    version,
    about = "Refuse to build when the release for the current version already has matching assets",
    long_about = None
)]
struct Cli {
    /// Asset name suffixes, e.g. '.exe' '-linux-x64.tar.gz'
    #[arg(value_name = "SUFFIX", allow_hyphen_values = true)]
    suffixes: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(outcome) => {
            tracing::debug!("check-release: passed {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<guard::Outcome, CheckError> {
    let suffixes = args::normalize_suffixes(cli.suffixes)?;
    let settings = config::load_settings().await.map_err(CheckError::Config)?;
    let versions = version::version_source(settings.version.clone(), &settings.repo);
    let releases = github::GitHubReleases::new(&settings).map_err(CheckError::Config)?;
    guard::check_release(&suffixes, &settings, versions.as_ref(), &releases).await
}
