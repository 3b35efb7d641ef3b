use crate::error::{GdetError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

pub const SCHEMA_VERSION: u32 = 1;

/// An account on the hosting service. Two users are the same user when their
/// logins match, whatever their display names say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl User {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.login == other.login
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.login.hash(state);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub author: Option<User>,
    pub authored_at: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub opener: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
}

impl PullRequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestState::Open => "open",
            PullRequestState::Closed => "closed",
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        match input {
            "open" => Ok(PullRequestState::Open),
            "closed" => Ok(PullRequestState::Closed),
            other => Err(GdetError::Parse(format!("Unknown pull request state '{other}'"))),
        }
    }
}

/// Which pull requests a fetch should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    Open,
    Closed,
    All,
}

impl StateFilter {
    pub fn matches(&self, state: PullRequestState) -> bool {
        match self {
            StateFilter::Open => state == PullRequestState::Open,
            StateFilter::Closed => state == PullRequestState::Closed,
            StateFilter::All => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub title: String,
    pub state: PullRequestState,
    pub opener: User,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub merger: Option<User>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    pub additions: u64,
    pub deletions: u64,
    pub commit_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub head_sha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewComment {
    pub author: User,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner_name: String,
}

/// A parsed `<owner>/<repo>` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn parse(input: &str) -> Result<Self> {
        let mut parts = input.trim().split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(GdetError::Parse(format!(
                "Expected <owner>/<repo>, got '{input}'"
            ))),
        }
    }

    pub fn matches(&self, repo: &Repository) -> bool {
        self.owner.eq_ignore_ascii_case(&repo.owner_name) && self.name.eq_ignore_ascii_case(&repo.name)
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Everything fetched for one repository, in the order the hosting API
/// returned it. This is the on-disk format read by the snapshot source and
/// imported into the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub repository: Repository,
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub pull_requests: Vec<PullRequest>,
    #[serde(default)]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub review_comments: Vec<ReviewComment>,
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

impl RepositorySnapshot {
    pub fn new(repository: Repository) -> Self {
        Self {
            version: SCHEMA_VERSION,
            repository,
            commits: Vec::new(),
            issues: Vec::new(),
            pull_requests: Vec::new(),
            branches: Vec::new(),
            review_comments: Vec::new(),
        }
    }
}
