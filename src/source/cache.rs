use super::RepositoryDataSource;
use crate::error::{GdetError, Result};
use crate::model::{
    Branch, Commit, Issue, PullRequest, PullRequestState, RepoSlug, Repository, RepositorySnapshot,
    ReviewComment, StateFilter, User, SCHEMA_VERSION,
};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// Previously fetched repository activity kept in a local SQLite database.
pub struct CacheSource {
    conn: Connection,
}

impl CacheSource {
    pub fn new<CP: AsRef<Path>>(cache_path: Option<CP>) -> Result<Self> {
        let cache_dir = match cache_path {
            Some(path) => path.as_ref().to_path_buf(),
            None => std::env::current_dir()?.join(".gdet"),
        };
        std::fs::create_dir_all(&cache_dir)?;
        let db_path = cache_dir.join("cache.db");
        tracing::debug!("opening cache at {}", db_path.display());
        let conn = Connection::open(&db_path)?;
        let mut cache = Self { conn };
        cache.initialize()?;
        Ok(cache)
    }

    pub fn in_memory() -> Result<Self> {
        let mut cache = Self {
            conn: Connection::open_in_memory()?,
        };
        cache.initialize()?;
        Ok(cache)
    }

    fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS repositories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                name TEXT NOT NULL,
                UNIQUE (owner, name)
            );
            CREATE TABLE IF NOT EXISTS commits (
                repo_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                author_login TEXT,
                author_name TEXT,
                authored_at INTEGER NOT NULL,
                message TEXT NOT NULL,
                PRIMARY KEY (repo_id, position),
                FOREIGN KEY (repo_id) REFERENCES repositories(id)
            );
            CREATE TABLE IF NOT EXISTS issues (
                repo_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                number INTEGER NOT NULL,
                title TEXT NOT NULL,
                opener_login TEXT NOT NULL,
                opener_name TEXT,
                PRIMARY KEY (repo_id, position),
                FOREIGN KEY (repo_id) REFERENCES repositories(id)
            );
            CREATE TABLE IF NOT EXISTS pull_requests (
                repo_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                title TEXT NOT NULL,
                state TEXT NOT NULL,
                opener_login TEXT NOT NULL,
                opener_name TEXT,
                created_at INTEGER NOT NULL,
                merger_login TEXT,
                merger_name TEXT,
                merged_at INTEGER,
                additions INTEGER NOT NULL,
                deletions INTEGER NOT NULL,
                commit_count INTEGER NOT NULL,
                PRIMARY KEY (repo_id, position),
                FOREIGN KEY (repo_id) REFERENCES repositories(id)
            );
            CREATE TABLE IF NOT EXISTS branches (
                repo_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                head_sha TEXT NOT NULL,
                PRIMARY KEY (repo_id, position),
                FOREIGN KEY (repo_id) REFERENCES repositories(id)
            );
            CREATE TABLE IF NOT EXISTS review_comments (
                repo_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                author_login TEXT NOT NULL,
                author_name TEXT,
                body TEXT NOT NULL,
                PRIMARY KEY (repo_id, position),
                FOREIGN KEY (repo_id) REFERENCES repositories(id)
            );
            CREATE INDEX IF NOT EXISTS idx_pull_requests_state ON pull_requests(repo_id, state);
            ",
        )?;
        self.check_schema_version()?;
        Ok(())
    }

    fn check_schema_version(&mut self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version == 0 {
            let set_stmt = format!("PRAGMA user_version = {SCHEMA_VERSION};");
            self.conn.execute_batch(&set_stmt)?;
        } else if user_version != SCHEMA_VERSION as i64 {
            return Err(GdetError::Cache(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, user_version
            )));
        }

        Ok(())
    }

    /// Replaces everything stored for the snapshot's repository.
    pub fn store_snapshot(&mut self, snapshot: &RepositorySnapshot) -> Result<()> {
        let tx = self.conn.transaction()?;
        let repo = &snapshot.repository;

        tx.execute(
            "INSERT OR IGNORE INTO repositories (owner, name) VALUES (?, ?)",
            params![repo.owner_name, repo.name],
        )?;
        let repo_id: i64 = tx.query_row(
            "SELECT id FROM repositories WHERE owner = ? AND name = ?",
            params![repo.owner_name, repo.name],
            |row| row.get(0),
        )?;

        for table in ["commits", "issues", "pull_requests", "branches", "review_comments"] {
            tx.execute(&format!("DELETE FROM {table} WHERE repo_id = ?"), params![repo_id])?;
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO commits (repo_id, position, author_login, author_name, authored_at, message)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for (position, c) in snapshot.commits.iter().enumerate() {
                stmt.execute(params![
                    repo_id,
                    position as i64,
                    c.author.as_ref().map(|u| &u.login),
                    c.author.as_ref().and_then(|u| u.display_name.as_ref()),
                    c.authored_at.timestamp(),
                    c.message
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO issues (repo_id, position, number, title, opener_login, opener_name)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for (position, i) in snapshot.issues.iter().enumerate() {
                stmt.execute(params![
                    repo_id,
                    position as i64,
                    i.number as i64,
                    i.title,
                    i.opener.login,
                    i.opener.display_name
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO pull_requests (repo_id, position, title, state, opener_login, opener_name,
                    created_at, merger_login, merger_name, merged_at, additions, deletions, commit_count)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for (position, pr) in snapshot.pull_requests.iter().enumerate() {
                stmt.execute(params![
                    repo_id,
                    position as i64,
                    pr.title,
                    pr.state.as_str(),
                    pr.opener.login,
                    pr.opener.display_name,
                    pr.created_at.timestamp(),
                    pr.merger.as_ref().map(|u| &u.login),
                    pr.merger.as_ref().and_then(|u| u.display_name.as_ref()),
                    pr.merged_at.map(|t| t.timestamp()),
                    pr.additions as i64,
                    pr.deletions as i64,
                    pr.commit_count as i64
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO branches (repo_id, position, name, head_sha) VALUES (?, ?, ?, ?)",
            )?;
            for (position, b) in snapshot.branches.iter().enumerate() {
                stmt.execute(params![repo_id, position as i64, b.name, b.head_sha])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO review_comments (repo_id, position, author_login, author_name, body)
                 VALUES (?, ?, ?, ?, ?)",
            )?;
            for (position, rc) in snapshot.review_comments.iter().enumerate() {
                stmt.execute(params![
                    repo_id,
                    position as i64,
                    rc.author.login,
                    rc.author.display_name,
                    rc.body
                ])?;
            }
        }

        tx.commit()?;
        tracing::info!(
            "cached {}/{}: {} commits, {} issues, {} pull requests",
            repo.owner_name,
            repo.name,
            snapshot.commits.len(),
            snapshot.issues.len(),
            snapshot.pull_requests.len()
        );
        Ok(())
    }

    fn repo_id(&self, repo: &Repository) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT id FROM repositories WHERE owner = ? AND name = ?",
                params![repo.owner_name, repo.name],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| GdetError::NotFound(format!("{}/{}", repo.owner_name, repo.name)))
    }

    fn query_list<T, F>(&self, sql: &str, repo: &Repository, map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let repo_id = self.repo_id(repo)?;
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![repo_id], map)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ts: i64 = row.get(idx)?;
    Utc.timestamp_opt(ts, 0).single().ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(idx, "timestamp".to_string(), rusqlite::types::Type::Integer)
    })
}

fn optional_timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let ts: Option<i64> = row.get(idx)?;
    ts.map(|ts| {
        Utc.timestamp_opt(ts, 0).single().ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(idx, "timestamp".to_string(), rusqlite::types::Type::Integer)
        })
    })
    .transpose()
}

fn user_at(row: &Row<'_>, login_idx: usize) -> rusqlite::Result<Option<User>> {
    let login: Option<String> = row.get(login_idx)?;
    let display_name: Option<String> = row.get(login_idx + 1)?;
    Ok(login.map(|login| User { login, display_name }))
}

fn required_user_at(row: &Row<'_>, login_idx: usize) -> rusqlite::Result<User> {
    Ok(User {
        login: row.get(login_idx)?,
        display_name: row.get(login_idx + 1)?,
    })
}

impl RepositoryDataSource for CacheSource {
    fn check_connection(&self) -> bool {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }

    fn fetch_repository(&self, qualified_name: &str) -> Result<Repository> {
        let slug = RepoSlug::parse(qualified_name)?;
        self.conn
            .query_row(
                "SELECT owner, name FROM repositories
                 WHERE owner = ? COLLATE NOCASE AND name = ? COLLATE NOCASE",
                params![slug.owner, slug.name],
                |row| {
                    Ok(Repository {
                        owner_name: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| GdetError::NotFound(slug.to_string()))
    }

    fn fetch_commits(&self, repo: &Repository) -> Result<Vec<Commit>> {
        self.query_list(
            "SELECT author_login, author_name, authored_at, message FROM commits
             WHERE repo_id = ? ORDER BY position",
            repo,
            |row| {
                Ok(Commit {
                    author: user_at(row, 0)?,
                    authored_at: timestamp_at(row, 2)?,
                    message: row.get(3)?,
                })
            },
        )
    }

    fn fetch_issues(&self, repo: &Repository) -> Result<Vec<Issue>> {
        self.query_list(
            "SELECT number, title, opener_login, opener_name FROM issues
             WHERE repo_id = ? ORDER BY position",
            repo,
            |row| {
                let number: i64 = row.get(0)?;
                Ok(Issue {
                    number: number as u64,
                    title: row.get(1)?,
                    opener: required_user_at(row, 2)?,
                })
            },
        )
    }

    fn fetch_pull_requests(&self, repo: &Repository, state: StateFilter) -> Result<Vec<PullRequest>> {
        let rows = self.query_list(
            "SELECT title, state, opener_login, opener_name, created_at, merger_login, merger_name,
                    merged_at, additions, deletions, commit_count
             FROM pull_requests WHERE repo_id = ? ORDER BY position",
            repo,
            |row| {
                let raw_state: String = row.get(1)?;
                let additions: i64 = row.get(8)?;
                let deletions: i64 = row.get(9)?;
                let commit_count: i64 = row.get(10)?;
                Ok((
                    raw_state,
                    PullRequest {
                        title: row.get(0)?,
                        state: PullRequestState::Open,
                        opener: required_user_at(row, 2)?,
                        created_at: timestamp_at(row, 4)?,
                        merger: user_at(row, 5)?,
                        merged_at: optional_timestamp_at(row, 7)?,
                        additions: additions as u64,
                        deletions: deletions as u64,
                        commit_count: commit_count as u64,
                    },
                ))
            },
        )?;

        let mut pull_requests = Vec::with_capacity(rows.len());
        for (raw_state, mut pr) in rows {
            pr.state = PullRequestState::parse(&raw_state)?;
            if state.matches(pr.state) {
                pull_requests.push(pr);
            }
        }
        Ok(pull_requests)
    }

    fn fetch_branches(&self, repo: &Repository) -> Result<Vec<Branch>> {
        self.query_list(
            "SELECT name, head_sha FROM branches WHERE repo_id = ? ORDER BY position",
            repo,
            |row| {
                Ok(Branch {
                    name: row.get(0)?,
                    head_sha: row.get(1)?,
                })
            },
        )
    }

    fn fetch_review_comments(&self, repo: &Repository) -> Result<Vec<ReviewComment>> {
        self.query_list(
            "SELECT author_login, author_name, body FROM review_comments
             WHERE repo_id = ? ORDER BY position",
            repo,
            |row| {
                Ok(ReviewComment {
                    author: required_user_at(row, 0)?,
                    body: row.get(2)?,
                })
            },
        )
    }
}
