use super::RepositoryDataSource;
use crate::error::{GdetError, Result};
use crate::model::{
    Branch, Commit, Issue, PullRequest, RepoSlug, Repository, RepositorySnapshot, ReviewComment,
    StateFilter, SCHEMA_VERSION,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Serves one repository from a JSON snapshot file.
pub struct SnapshotSource {
    path: PathBuf,
    snapshot: Option<RepositorySnapshot>,
}

impl SnapshotSource {
    /// Opens `path`. A missing or unreadable file is not an error here; it
    /// shows up as a failed connection check.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let snapshot = match Self::load(&path) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("could not load snapshot {}: {e}", path.display());
                None
            }
        };
        Self { path, snapshot }
    }

    pub fn from_snapshot(snapshot: RepositorySnapshot) -> Self {
        Self {
            path: PathBuf::new(),
            snapshot: Some(snapshot),
        }
    }

    pub fn load(path: &Path) -> Result<RepositorySnapshot> {
        let raw = fs::read_to_string(path)?;
        let snapshot: RepositorySnapshot = serde_json::from_str(&raw)?;
        if snapshot.version != SCHEMA_VERSION {
            return Err(GdetError::Parse(format!(
                "Snapshot version mismatch: expected {}, found {}",
                SCHEMA_VERSION, snapshot.version
            )));
        }
        Ok(snapshot)
    }

    fn snapshot_for(&self, repo: &Repository) -> Result<&RepositorySnapshot> {
        match &self.snapshot {
            Some(snapshot) if &snapshot.repository == repo => Ok(snapshot),
            Some(_) => Err(GdetError::NotFound(format!("{}/{}", repo.owner_name, repo.name))),
            None => Err(GdetError::Connection(format!(
                "Snapshot {} is not available",
                self.path.display()
            ))),
        }
    }
}

impl RepositoryDataSource for SnapshotSource {
    fn check_connection(&self) -> bool {
        self.snapshot.is_some()
    }

    fn fetch_repository(&self, qualified_name: &str) -> Result<Repository> {
        let slug = RepoSlug::parse(qualified_name)?;
        match &self.snapshot {
            Some(snapshot) if slug.matches(&snapshot.repository) => Ok(snapshot.repository.clone()),
            Some(_) => Err(GdetError::NotFound(slug.to_string())),
            None => Err(GdetError::Connection(format!(
                "Snapshot {} is not available",
                self.path.display()
            ))),
        }
    }

    fn fetch_commits(&self, repo: &Repository) -> Result<Vec<Commit>> {
        Ok(self.snapshot_for(repo)?.commits.clone())
    }

    fn fetch_issues(&self, repo: &Repository) -> Result<Vec<Issue>> {
        Ok(self.snapshot_for(repo)?.issues.clone())
    }

    fn fetch_pull_requests(&self, repo: &Repository, state: StateFilter) -> Result<Vec<PullRequest>> {
        Ok(self
            .snapshot_for(repo)?
            .pull_requests
            .iter()
            .filter(|pr| state.matches(pr.state))
            .cloned()
            .collect())
    }

    fn fetch_branches(&self, repo: &Repository) -> Result<Vec<Branch>> {
        Ok(self.snapshot_for(repo)?.branches.clone())
    }

    fn fetch_review_comments(&self, repo: &Repository) -> Result<Vec<ReviewComment>> {
        Ok(self.snapshot_for(repo)?.review_comments.clone())
    }
}
