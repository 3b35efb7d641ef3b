pub mod cache;
pub mod git;
pub mod snapshot;

pub use cache::CacheSource;
pub use git::GitSource;
pub use snapshot::SnapshotSource;

use crate::error::Result;
use crate::model::{Branch, Commit, Issue, PullRequest, Repository, ReviewComment, StateFilter};

/// Read-only access to the activity of hosted repositories. Sequences come
/// back in the order the backing store holds them.
pub trait RepositoryDataSource {
    fn check_connection(&self) -> bool;

    /// Looks up `<owner>/<repo>`, failing with `NotFound` when it is unknown.
    fn fetch_repository(&self, qualified_name: &str) -> Result<Repository>;

    fn fetch_commits(&self, repo: &Repository) -> Result<Vec<Commit>>;

    fn fetch_issues(&self, repo: &Repository) -> Result<Vec<Issue>>;

    fn fetch_pull_requests(&self, repo: &Repository, state: StateFilter) -> Result<Vec<PullRequest>>;

    fn fetch_branches(&self, repo: &Repository) -> Result<Vec<Branch>>;

    fn fetch_review_comments(&self, repo: &Repository) -> Result<Vec<ReviewComment>>;
}
