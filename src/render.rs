use crate::aggregate::UserCounts;
use crate::identity::resolve_name;
use crate::model::{Branch, Commit, Issue, PullRequest, Repository, ReviewComment};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;
use thiserror::Error;

pub const NARROW: usize = 32;
pub const WIDE: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Pull request '{title}' has no merge information")]
    Unmerged { title: String },
}

pub fn rule(width: usize, fill: char) -> String {
    std::iter::repeat_n(fill, width).collect()
}

/// Long-form timestamp in the local timezone, e.g. `Tue Jan 15 10:00:00 +00:00 2019`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%a %b %d %H:%M:%S %Z %Y")
        .to_string()
}

fn block(width: usize, body: &str) -> String {
    let line = rule(width, '-');
    format!("{line}\n{body}{line}\n\n")
}

pub fn repository_metadata(repo: Option<&Repository>) -> String {
    let line = rule(NARROW, '-');
    match repo {
        Some(repo) => format!("{line}\n{}\nOwned by: {}\n{line}\n", repo.name, repo.owner_name),
        None => format!("{line}\n{line}\n"),
    }
}

pub fn commit_to_text(commit: &Commit) -> String {
    let body = format!(
        "{}\n{}\n{}\n",
        resolve_name(commit.author.as_ref()),
        format_timestamp(&commit.authored_at),
        commit.message
    );
    block(NARROW, &body)
}

pub fn issue_to_text(issue: &Issue) -> String {
    let body = format!(
        "#{} {}\n{}\n",
        issue.number,
        issue.title,
        resolve_name(Some(&issue.opener))
    );
    block(NARROW, &body)
}

/// Renders a merged pull request. A pull request without a merger or merge
/// date cannot fill the merge lines and is rejected.
pub fn pull_request_to_text(pr: &PullRequest) -> Result<String, RenderError> {
    let (merger, merged_at) = match (pr.merger.as_ref(), pr.merged_at.as_ref()) {
        (Some(merger), Some(merged_at)) => (merger, merged_at),
        _ => {
            return Err(RenderError::Unmerged {
                title: pr.title.clone(),
            })
        }
    };

    let mut body = String::new();
    let _ = writeln!(body, "{}", pr.title);
    let _ = writeln!(body, "Created By: {}", resolve_name(Some(&pr.opener)));
    let _ = writeln!(body, "Created Date: {}", format_timestamp(&pr.created_at));
    let _ = writeln!(body, "Merged By: {}", resolve_name(Some(merger)));
    let _ = writeln!(body, "Merged Date:{}", format_timestamp(merged_at));
    body.push('\n');
    let _ = writeln!(body, "Additions: {}", pr.additions);
    let _ = writeln!(body, "Deletions: {}", pr.deletions);
    let _ = writeln!(body, "Number of Commits: {}", pr.commit_count);
    Ok(block(WIDE, &body))
}

pub fn branch_to_text(branch: &Branch) -> String {
    block(WIDE, &format!("{}\nSHA: {}\n", branch.name, branch.head_sha))
}

pub fn review_comment_to_text(comment: &ReviewComment) -> String {
    let body = format!(
        "Comment Created By: {}\n{}\n",
        resolve_name(Some(&comment.author)),
        comment.body
    );
    block(WIDE, &body)
}

pub fn commits_to_text(commits: &[Commit]) -> String {
    commits.iter().map(commit_to_text).collect()
}

pub fn issues_to_text(issues: &[Issue]) -> String {
    issues.iter().map(issue_to_text).collect()
}

/// Concatenates the renderable pull requests; unmerged ones are left out.
pub fn pull_requests_to_text(pull_requests: &[PullRequest]) -> String {
    pull_requests
        .iter()
        .filter_map(|pr| match pull_request_to_text(pr) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!("omitting pull request from report: {e}");
                None
            }
        })
        .collect()
}

pub fn branches_to_text(branches: &[Branch]) -> String {
    branches.iter().map(branch_to_text).collect()
}

pub fn review_comments_to_text(comments: &[ReviewComment]) -> String {
    comments.iter().map(review_comment_to_text).collect()
}

pub fn user_counts_to_text(counts: &UserCounts, label: &str) -> String {
    let mut out = String::new();
    for (user, count) in counts.iter() {
        let _ = writeln!(out, "User: {:<20}    {label}: {count}", resolve_name(Some(user)));
    }
    out
}
