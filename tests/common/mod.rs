#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use gdet::model::{
    Branch, Commit, Issue, PullRequest, PullRequestState, Repository, RepositorySnapshot,
    ReviewComment, User,
};

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn taylor() -> User {
    User::new("tedwards").with_display_name("Taylor Edwards")
}

pub fn jay() -> User {
    User::new("jfenwick").with_display_name("Jay Fenwick")
}

pub fn gurney() -> User {
    User::new("gbuchanan").with_display_name("Gurney Buchanan")
}

pub fn repository() -> Repository {
    Repository {
        name: "GDET-Tremendous-Trio".to_string(),
        owner_name: "CompassSoftware".to_string(),
    }
}

pub fn commit(author: Option<User>, when: DateTime<Utc>, message: &str) -> Commit {
    Commit {
        author,
        authored_at: when,
        message: message.to_string(),
    }
}

pub fn merged_pr(title: &str, opener: User, merger: User) -> PullRequest {
    PullRequest {
        title: title.to_string(),
        state: PullRequestState::Closed,
        opener,
        created_at: at(2019, 1, 20),
        merger: Some(merger),
        merged_at: Some(at(2019, 1, 21)),
        additions: 88,
        deletions: 1,
        commit_count: 1,
    }
}

pub fn open_pr(title: &str, opener: User) -> PullRequest {
    PullRequest {
        title: title.to_string(),
        state: PullRequestState::Open,
        opener,
        created_at: at(2019, 2, 1),
        merger: None,
        merged_at: None,
        additions: 3,
        deletions: 0,
        commit_count: 2,
    }
}

pub fn snapshot() -> RepositorySnapshot {
    let mut snapshot = RepositorySnapshot::new(repository());
    snapshot.commits = vec![
        commit(Some(taylor()), at(2019, 1, 16), "Initial Project Setup"),
        commit(Some(jay()), at(2019, 1, 15), "Initial commit"),
        commit(Some(taylor()), at(2019, 1, 17), "Add tool skeleton"),
    ];
    snapshot.issues = vec![Issue {
        number: 1,
        title: "Write connection check".to_string(),
        opener: jay(),
    }];
    snapshot.pull_requests = vec![
        merged_pr("Add commit listing", taylor(), gurney()),
        open_pr("Add branches", jay()),
    ];
    snapshot.branches = vec![Branch {
        name: "master".to_string(),
        head_sha: "3f2a9c0d".to_string(),
    }];
    snapshot.review_comments = vec![ReviewComment {
        author: gurney(),
        body: "Looks good to me.".to_string(),
    }];
    snapshot
}

pub fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

pub fn git(dir: &Path, args: &[&str]) {
    git_with_env(dir, args, &[]);
}

pub fn git_with_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) {
    assert!(Command::new("git")
        .args(args)
        .envs(env.iter().copied())
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git").args(args).current_dir(dir).output().unwrap();
    assert!(out.status.success());
    String::from_utf8(out.stdout).unwrap().trim().to_string()
}

pub fn init_git_repo(dir: &Path) {
    git(dir, &["init"]);
    git(dir, &["config", "core.autocrlf", "false"]);
    git(dir, &["config", "user.email", "tedwards@example.com"]);
    git(dir, &["config", "user.name", "Taylor Edwards"]);
}

fn write_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();
}

pub fn commit_file(dir: &Path, name: &str, content: &str) {
    write_file(dir, name, content);
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", &format!("add {name}")]);
}

/// Commits with separate author and committer dates, in any format git accepts.
pub fn commit_file_dated(dir: &Path, name: &str, content: &str, authored: &str, committed: &str) {
    write_file(dir, name, content);
    git(dir, &["add", "."]);
    git_with_env(
        dir,
        &["commit", "-m", &format!("add {name}")],
        &[("GIT_AUTHOR_DATE", authored), ("GIT_COMMITTER_DATE", committed)],
    );
}
