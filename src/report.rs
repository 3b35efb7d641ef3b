use crate::aggregate::{
    count_commits_by_author, count_pull_requests_by_merger, count_pull_requests_by_opener,
};
use crate::error::{GdetError, Result};
use crate::model::{Branch, Commit, Issue, PullRequest, Repository, ReviewComment, StateFilter};
use crate::render::{
    branches_to_text, commits_to_text, issues_to_text, pull_requests_to_text,
    repository_metadata, review_comments_to_text, rule, user_counts_to_text, NARROW,
};
use crate::source::RepositoryDataSource;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Commits,
    Issues,
    OpenPullRequests,
    ClosedPullRequests,
    ReviewComments,
    Branches,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Commits => "commits",
            Section::Issues => "issues",
            Section::OpenPullRequests => "open pull requests",
            Section::ClosedPullRequests => "closed pull requests",
            Section::ReviewComments => "review comments",
            Section::Branches => "branches",
        };
        f.write_str(name)
    }
}

/// A list fetch that failed and was replaced by an empty list.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub section: Section,
    pub reason: String,
}

/// Everything one report needs, fetched up front.
#[derive(Debug, Clone)]
pub struct RepositoryActivity {
    pub repository: Repository,
    pub commits: Vec<Commit>,
    pub issues: Vec<Issue>,
    pub open_pull_requests: Vec<PullRequest>,
    pub closed_pull_requests: Vec<PullRequest>,
    pub review_comments: Vec<ReviewComment>,
    pub branches: Vec<Branch>,
    pub failures: Vec<FetchFailure>,
}

impl RepositoryActivity {
    pub fn collect(source: &dyn RepositoryDataSource, qualified_name: &str) -> Result<Self> {
        if !source.check_connection() {
            return Err(GdetError::Connection("Error Establishing Connection".to_string()));
        }
        let repository = source.fetch_repository(qualified_name)?;

        let mut failures = Vec::new();
        let commits = or_empty(Section::Commits, source.fetch_commits(&repository), &mut failures);
        let issues = or_empty(Section::Issues, source.fetch_issues(&repository), &mut failures);
        let open_pull_requests = or_empty(
            Section::OpenPullRequests,
            source.fetch_pull_requests(&repository, StateFilter::Open),
            &mut failures,
        );
        let closed_pull_requests = or_empty(
            Section::ClosedPullRequests,
            source.fetch_pull_requests(&repository, StateFilter::Closed),
            &mut failures,
        );
        let review_comments = or_empty(
            Section::ReviewComments,
            source.fetch_review_comments(&repository),
            &mut failures,
        );
        let branches = or_empty(Section::Branches, source.fetch_branches(&repository), &mut failures);

        Ok(Self {
            repository,
            commits,
            issues,
            open_pull_requests,
            closed_pull_requests,
            review_comments,
            branches,
            failures,
        })
    }

    pub fn pull_requests(&self) -> impl Iterator<Item = &PullRequest> + '_ {
        self.open_pull_requests
            .iter()
            .chain(self.closed_pull_requests.iter())
    }
}

fn or_empty<T>(section: Section, fetched: Result<Vec<T>>, failures: &mut Vec<FetchFailure>) -> Vec<T> {
    match fetched {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("failed to fetch {section}: {e}");
            failures.push(FetchFailure {
                section,
                reason: e.to_string(),
            });
            Vec::new()
        }
    }
}

pub fn banner(name: &str) -> String {
    let line = rule(NARROW, '*');
    format!("{line}\n\n{name}\n{line}\n\n\n")
}

pub fn render_report(activity: &RepositoryActivity) -> String {
    let mut out = repository_metadata(Some(&activity.repository));

    out.push_str(&banner("COMMITS"));
    out.push_str(&commits_to_text(&activity.commits));

    out.push_str(&banner("ISSUES"));
    out.push_str(&issues_to_text(&activity.issues));

    out.push_str(&banner("COMMIT-COUNT-PER-USER"));
    out.push_str(&user_counts_to_text(
        &count_commits_by_author(&activity.commits),
        "Commit Count",
    ));

    out.push_str(&banner("PULL-REQUEST-OPENED-COUNT-PER-USER"));
    out.push_str(&user_counts_to_text(
        &count_pull_requests_by_opener(activity.pull_requests()),
        "PR Opened Count",
    ));

    out.push_str(&banner("PULL-REQUEST-MERGED-COUNT-PER-USER"));
    out.push_str(&user_counts_to_text(
        &count_pull_requests_by_merger(activity.pull_requests()),
        "PR Merged Count",
    ));

    out.push_str(&banner("Pull Requests"));
    out.push_str("Open Pull Requests\n");
    out.push_str(&pull_requests_to_text(&activity.open_pull_requests));
    out.push_str("Closed Pull Requests\n");
    out.push_str(&pull_requests_to_text(&activity.closed_pull_requests));

    out.push_str(&banner("Pull Request Review Comments"));
    out.push_str(&review_comments_to_text(&activity.review_comments));

    out.push_str(&banner("Branches"));
    out.push_str(&branches_to_text(&activity.branches));

    out
}
