use crate::aggregate::{
    count_commits_by_author, count_issues_by_opener, count_pull_requests_by_merger,
    count_pull_requests_by_opener,
};
use crate::model::StateFilter;
use crate::render::user_counts_to_text;
use crate::report::{render_report, RepositoryActivity};
use crate::source::{CacheSource, GitSource, RepositoryDataSource, SnapshotSource};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gdet")]
#[command(about = "Repository activity extraction: per-user counts and text reports")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, value_enum, env = "GDET_SOURCE", default_value_t = SourceKind::Snapshot, help = "Where repository data comes from")]
    pub source: SourceKind,

    #[arg(long, env = "GDET_PATH", help = "Snapshot file or local clone directory")]
    pub path: Option<PathBuf>,

    #[arg(long, env = "GDET_CACHE", help = "Path to cache directory")]
    pub cache: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    Snapshot,
    Cache,
    Git,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Role {
    /// Commits per author
    Author,
    /// Issues per opener
    Opener,
    /// Pull requests per opener
    PrOpener,
    /// Pull requests per merger
    Merger,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the data source is reachable
    Check,
    /// Print the full activity report
    Report {
        #[arg(help = "Repository as <owner>/<repo>")]
        repo: String,

        #[arg(long, help = "Write the report to this file instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Print per-user counts for one role
    Counts {
        #[arg(help = "Repository as <owner>/<repo>")]
        repo: String,

        #[arg(long, value_enum, default_value_t = Role::Author)]
        role: Role,
    },
    /// Load a snapshot file into the cache database
    Import {
        #[arg(help = "Snapshot JSON file")]
        snapshot: PathBuf,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Check => check(&self.common),
            Commands::Report { repo, output } => report(&self.common, &repo, output),
            Commands::Counts { repo, role } => counts(&self.common, &repo, role),
            Commands::Import { snapshot } => import(&self.common, snapshot),
        }
    }
}

fn open_source(common: &CommonArgs) -> Result<Box<dyn RepositoryDataSource>> {
    let source: Box<dyn RepositoryDataSource> = match common.source {
        SourceKind::Snapshot => {
            let path = common
                .path
                .as_ref()
                .context("--path is required for the snapshot source")?;
            Box::new(SnapshotSource::open(path))
        }
        SourceKind::Cache => Box::new(
            CacheSource::new(common.cache.as_deref()).context("Failed to initialize cache")?,
        ),
        SourceKind::Git => Box::new(
            GitSource::open(common.path.as_ref()).context("Failed to open git repository")?,
        ),
    };
    Ok(source)
}

fn check(common: &CommonArgs) -> Result<()> {
    let source = open_source(common)?;
    if source.check_connection() {
        eprintln!("{}", style("Successfully Established Connection").green());
        Ok(())
    } else {
        anyhow::bail!("Error Establishing Connection")
    }
}

fn report(common: &CommonArgs, repo: &str, output: Option<PathBuf>) -> Result<()> {
    let source = open_source(common)?;
    let activity = RepositoryActivity::collect(source.as_ref(), repo)
        .with_context(|| format!("Failed to collect activity for {repo}"))?;

    for failure in &activity.failures {
        eprintln!(
            "{} {} unavailable: {}",
            style("warning:").yellow(),
            failure.section,
            failure.reason
        );
    }

    let text = render_report(&activity);
    match output {
        Some(path) => std::fs::write(&path, text)
            .with_context(|| format!("Failed to write report to {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

fn counts(common: &CommonArgs, repo: &str, role: Role) -> Result<()> {
    let source = open_source(common)?;
    if !source.check_connection() {
        anyhow::bail!("Error Establishing Connection");
    }
    let repository = source
        .fetch_repository(repo)
        .with_context(|| format!("Failed to fetch repository {repo}"))?;

    let (counts, label) = match role {
        Role::Author => (
            count_commits_by_author(&source.fetch_commits(&repository)?),
            "Commit Count",
        ),
        Role::Opener => (
            count_issues_by_opener(&source.fetch_issues(&repository)?),
            "Issue Opened Count",
        ),
        Role::PrOpener => (
            count_pull_requests_by_opener(&source.fetch_pull_requests(&repository, StateFilter::All)?),
            "PR Opened Count",
        ),
        Role::Merger => (
            count_pull_requests_by_merger(&source.fetch_pull_requests(&repository, StateFilter::All)?),
            "PR Merged Count",
        ),
    };

    if counts.skipped() > 0 {
        tracing::info!("{} records had no {:?} and were not counted", counts.skipped(), role);
    }
    print!("{}", user_counts_to_text(&counts, label));
    Ok(())
}

fn import(common: &CommonArgs, snapshot: PathBuf) -> Result<()> {
    let data = SnapshotSource::load(&snapshot)
        .with_context(|| format!("Failed to read snapshot {}", snapshot.display()))?;
    let mut cache = CacheSource::new(common.cache.as_deref()).context("Failed to initialize cache")?;
    cache
        .store_snapshot(&data)
        .context("Failed to store snapshot in cache")?;
    eprintln!(
        "{} {}/{}",
        style("Imported").green(),
        data.repository.owner_name,
        data.repository.name
    );
    Ok(())
}
