mod common;

use common::*;
use gdet::error::{GdetError, Result};
use gdet::model::{
    Branch, Commit, Issue, PullRequest, Repository, RepositorySnapshot, ReviewComment, StateFilter,
};
use gdet::report::{banner, render_report, RepositoryActivity, Section};
use gdet::source::{CacheSource, RepositoryDataSource, SnapshotSource};
use pretty_assertions::assert_eq;

/// Serves the fixture snapshot but fails every commit fetch.
struct FlakyCommits {
    inner: SnapshotSource,
    connected: bool,
}

impl FlakyCommits {
    fn new(connected: bool) -> Self {
        Self {
            inner: SnapshotSource::from_snapshot(snapshot()),
            connected,
        }
    }
}

impl RepositoryDataSource for FlakyCommits {
    fn check_connection(&self) -> bool {
        self.connected
    }

    fn fetch_repository(&self, qualified_name: &str) -> Result<Repository> {
        self.inner.fetch_repository(qualified_name)
    }

    fn fetch_commits(&self, _repo: &Repository) -> Result<Vec<Commit>> {
        Err(GdetError::Connection("rate limited".to_string()))
    }

    fn fetch_issues(&self, repo: &Repository) -> Result<Vec<Issue>> {
        self.inner.fetch_issues(repo)
    }

    fn fetch_pull_requests(&self, repo: &Repository, state: StateFilter) -> Result<Vec<PullRequest>> {
        self.inner.fetch_pull_requests(repo, state)
    }

    fn fetch_branches(&self, repo: &Repository) -> Result<Vec<Branch>> {
        self.inner.fetch_branches(repo)
    }

    fn fetch_review_comments(&self, repo: &Repository) -> Result<Vec<ReviewComment>> {
        self.inner.fetch_review_comments(repo)
    }
}

#[test]
fn banner_layout() {
    let line = "*".repeat(32);
    assert_eq!(banner("COMMITS"), format!("{line}\n\nCOMMITS\n{line}\n\n\n"));
}

#[test]
fn collect_splits_pull_requests_by_state() {
    let source = SnapshotSource::from_snapshot(snapshot());
    let activity = RepositoryActivity::collect(&source, "CompassSoftware/GDET-Tremendous-Trio").unwrap();

    assert_eq!(activity.commits.len(), 3);
    assert_eq!(activity.open_pull_requests.len(), 1);
    assert_eq!(activity.closed_pull_requests.len(), 1);
    assert_eq!(activity.pull_requests().count(), 2);
    assert!(activity.failures.is_empty());
}

#[test]
fn failed_fetch_becomes_empty_section_with_failure_recorded() {
    let source = FlakyCommits::new(true);
    let activity = RepositoryActivity::collect(&source, "CompassSoftware/GDET-Tremendous-Trio").unwrap();

    assert!(activity.commits.is_empty());
    assert_eq!(activity.failures.len(), 1);
    assert_eq!(activity.failures[0].section, Section::Commits);
    assert!(activity.failures[0].reason.contains("rate limited"));

    let report = render_report(&activity);
    assert!(report.contains("ISSUES"));
    assert!(report.contains("#1 Write connection check"));
}

#[test]
fn collect_refuses_without_connection() {
    let source = FlakyCommits::new(false);
    let err = RepositoryActivity::collect(&source, "CompassSoftware/GDET-Tremendous-Trio").unwrap_err();
    assert!(matches!(err, GdetError::Connection(_)));
}

#[test]
fn unknown_repository_is_not_found() {
    let source = SnapshotSource::from_snapshot(snapshot());
    let err = RepositoryActivity::collect(&source, "CompassSoftware/other").unwrap_err();
    assert!(matches!(err, GdetError::NotFound(_)));

    let err = RepositoryActivity::collect(&source, "no-slash").unwrap_err();
    assert!(matches!(err, GdetError::Parse(_)));
}

#[test]
fn report_sections_appear_in_order() {
    let source = SnapshotSource::from_snapshot(snapshot());
    let activity = RepositoryActivity::collect(&source, "compasssoftware/gdet-tremendous-trio").unwrap();
    let report = render_report(&activity);

    assert!(report.starts_with(
        "--------------------------------\nGDET-Tremendous-Trio\nOwned by: CompassSoftware\n"
    ));

    let sections = [
        "\nCOMMITS\n",
        "\nISSUES\n",
        "\nCOMMIT-COUNT-PER-USER\n",
        "\nPULL-REQUEST-OPENED-COUNT-PER-USER\n",
        "\nPULL-REQUEST-MERGED-COUNT-PER-USER\n",
        "\nPull Requests\n",
        "Open Pull Requests\n",
        "Closed Pull Requests\n",
        "\nPull Request Review Comments\n",
        "\nBranches\n",
    ];
    let positions: Vec<usize> = sections
        .iter()
        .map(|s| report.find(s).unwrap_or_else(|| panic!("missing section {s:?}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");

    assert!(report.contains("User: Gurney Buchanan         PR Merged Count: 1\n"));
    assert!(report.contains("Merged By: Gurney Buchanan\n"));
    assert!(!report.contains("Add branches\n"));
}

#[test]
fn cache_preserves_order_and_optional_fields() {
    let mut cache = CacheSource::in_memory().unwrap();
    cache.store_snapshot(&snapshot()).unwrap();
    assert!(cache.check_connection());

    let repo = cache.fetch_repository("CompassSoftware/GDET-Tremendous-Trio").unwrap();
    assert_eq!(repo, repository());

    let commits = cache.fetch_commits(&repo).unwrap();
    let messages: Vec<&str> = commits.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, vec!["Initial Project Setup", "Initial commit", "Add tool skeleton"]);
    assert_eq!(commits[0].authored_at, at(2019, 1, 16));
    assert_eq!(
        commits[1].author.as_ref().and_then(|u| u.display_name.as_deref()),
        Some("Jay Fenwick")
    );

    let open = cache.fetch_pull_requests(&repo, StateFilter::Open).unwrap();
    assert_eq!(open.len(), 1);
    assert!(open[0].merger.is_none());
    assert!(open[0].merged_at.is_none());

    let closed = cache.fetch_pull_requests(&repo, StateFilter::Closed).unwrap();
    assert_eq!(closed[0].additions, 88);
    assert_eq!(closed[0].merged_at, Some(at(2019, 1, 21)));

    assert_eq!(cache.fetch_pull_requests(&repo, StateFilter::All).unwrap().len(), 2);
    assert_eq!(cache.fetch_branches(&repo).unwrap()[0].head_sha, "3f2a9c0d");
    assert_eq!(cache.fetch_review_comments(&repo).unwrap()[0].body, "Looks good to me.");
}

#[test]
fn cache_import_replaces_previous_data() {
    let mut cache = CacheSource::in_memory().unwrap();
    cache.store_snapshot(&snapshot()).unwrap();

    let mut smaller = RepositorySnapshot::new(repository());
    smaller.commits = vec![commit(None, at(2021, 5, 5), "squash")];
    cache.store_snapshot(&smaller).unwrap();

    let repo = repository();
    let commits = cache.fetch_commits(&repo).unwrap();
    assert_eq!(commits.len(), 1);
    assert!(commits[0].author.is_none());
    assert!(cache.fetch_issues(&repo).unwrap().is_empty());
}

#[test]
fn cache_and_snapshot_render_identically() {
    let mut cache = CacheSource::in_memory().unwrap();
    cache.store_snapshot(&snapshot()).unwrap();
    let snapshot_source = SnapshotSource::from_snapshot(snapshot());

    let name = "CompassSoftware/GDET-Tremendous-Trio";
    let from_cache = render_report(&RepositoryActivity::collect(&cache, name).unwrap());
    let from_snapshot = render_report(&RepositoryActivity::collect(&snapshot_source, name).unwrap());
    assert_eq!(from_cache, from_snapshot);
}

#[test]
fn missing_snapshot_file_fails_connection_check() {
    let dir = tempfile::tempdir().unwrap();
    let source = SnapshotSource::open(dir.path().join("absent.json"));
    assert!(!source.check_connection());
}

#[test]
fn out_of_range_merge_date_is_an_error_not_unmerged() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = CacheSource::new(Some(dir.path())).unwrap();
    cache.store_snapshot(&snapshot()).unwrap();

    let conn = rusqlite::Connection::open(dir.path().join("cache.db")).unwrap();
    conn.execute("UPDATE pull_requests SET merged_at = ?", [i64::MAX])
        .unwrap();
    drop(conn);

    let repo = repository();
    assert!(cache.fetch_pull_requests(&repo, StateFilter::Closed).is_err());

    let conn = rusqlite::Connection::open(dir.path().join("cache.db")).unwrap();
    conn.execute("UPDATE pull_requests SET merged_at = NULL, created_at = ?", [i64::MAX])
        .unwrap();
    drop(conn);
    assert!(cache.fetch_pull_requests(&repo, StateFilter::Closed).is_err());
}
