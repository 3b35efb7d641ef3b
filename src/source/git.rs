use super::RepositoryDataSource;
use crate::error::{GdetError, Result};
use crate::model::{
    Branch, Commit, Issue, PullRequest, RepoSlug, Repository, ReviewComment, StateFilter, User,
};
use chrono::DateTime;
use gix::{discover, ObjectId};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// A local clone. It knows its history and branches but nothing about the
/// issues, pull requests or review comments kept by the hosting service.
pub struct GitSource {
    repo: Option<gix::Repository>,
    path: PathBuf,
}

impl GitSource {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };

        let repo = match discover(&repo_path) {
            Ok(repo) => Some(repo),
            Err(e) => {
                tracing::warn!("no git repository at {}: {e}", repo_path.display());
                None
            }
        };
        let path = repo
            .as_ref()
            .map(|r| r.workdir().unwrap_or_else(|| r.path()).to_path_buf())
            .unwrap_or(repo_path);

        Ok(Self { repo, path })
    }

    fn repo(&self) -> Result<&gix::Repository> {
        self.repo.as_ref().ok_or_else(|| {
            GdetError::Connection(format!("No git repository at {}", self.path.display()))
        })
    }

    fn dir_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().trim_end_matches(".git").to_string())
    }

    fn collect_commits(&self) -> Result<Vec<Commit>> {
        let repo = self.repo()?;
        let mut head = repo.head()?;
        let head_commit = head.peel_to_commit_in_place()?;

        let mut commits = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack: VecDeque<ObjectId> = VecDeque::from([head_commit.id]);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Collecting commits...");

        while let Some(commit_id) = stack.pop_back() {
            if !seen.insert(commit_id) {
                continue;
            }

            let commit = repo.find_commit(commit_id)?;
            let author = commit.author()?;
            let secs = author.time()?.seconds;
            let authored_at = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| GdetError::InvalidDate(format!("Invalid timestamp: {secs}")))?;

            let name = author.name.to_string();
            let email = author.email.to_string();
            let author = if email.is_empty() && name.is_empty() {
                None
            } else if email.is_empty() {
                Some(User::new(name))
            } else {
                Some(User::new(email).with_display_name(name))
            };

            commits.push(Commit {
                author,
                authored_at,
                message: commit.message()?.title.to_string(),
            });

            for pid in commit.parent_ids() {
                stack.push_back(pid.into());
            }

            pb.inc(1);
        }

        pb.finish_and_clear();
        commits.sort_by(|a, b| b.authored_at.cmp(&a.authored_at));
        Ok(commits)
    }
}

impl RepositoryDataSource for GitSource {
    fn check_connection(&self) -> bool {
        self.repo.is_some()
    }

    fn fetch_repository(&self, qualified_name: &str) -> Result<Repository> {
        let slug = RepoSlug::parse(qualified_name)?;
        self.repo()?;
        if let Some(dir) = self.dir_name().filter(|d| !d.eq_ignore_ascii_case(&slug.name)) {
            tracing::debug!("clone directory '{dir}' differs from requested '{}'", slug.name);
        }
        Ok(Repository {
            name: slug.name,
            owner_name: slug.owner,
        })
    }

    fn fetch_commits(&self, _repo: &Repository) -> Result<Vec<Commit>> {
        self.collect_commits()
    }

    fn fetch_issues(&self, _repo: &Repository) -> Result<Vec<Issue>> {
        Ok(Vec::new())
    }

    fn fetch_pull_requests(&self, _repo: &Repository, _state: StateFilter) -> Result<Vec<PullRequest>> {
        Ok(Vec::new())
    }

    fn fetch_branches(&self, _repo: &Repository) -> Result<Vec<Branch>> {
        let repo = self.repo()?;
        let platform = repo
            .references()
            .map_err(|e| GdetError::GitRepo(format!("Failed to read references: {e}")))?;
        let iter = platform
            .local_branches()
            .map_err(|e| GdetError::GitRepo(format!("Failed to list branches: {e}")))?;

        let mut branches = Vec::new();
        for reference in iter {
            let reference =
                reference.map_err(|e| GdetError::GitRepo(format!("Failed to read branch: {e}")))?;
            let Some(id) = reference.try_id() else {
                continue;
            };
            branches.push(Branch {
                name: reference.name().shorten().to_string(),
                head_sha: id.to_string(),
            });
        }
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }

    fn fetch_review_comments(&self, _repo: &Repository) -> Result<Vec<ReviewComment>> {
        Ok(Vec::new())
    }
}
