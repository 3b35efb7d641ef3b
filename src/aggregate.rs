use crate::model::{Commit, Issue, PullRequest, User};
use std::collections::HashMap;

/// Per-user counts, ordered by the first time each user was seen.
#[derive(Debug, Clone, Default)]
pub struct UserCounts {
    entries: Vec<(User, usize)>,
    index: HashMap<String, usize>,
    skipped: usize,
}

impl UserCounts {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, user: &User) {
        match self.index.get(&user.login) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(user.login.clone(), self.entries.len());
                self.entries.push((user.clone(), 1));
            }
        }
    }

    pub fn get(&self, login: &str) -> Option<usize> {
        self.index.get(login).map(|&slot| self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&User, usize)> + '_ {
        self.entries.iter().map(|(user, count)| (user, *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Items whose role holder was absent and therefore went uncounted.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

pub fn count_by<'a, T, I, F>(items: I, role_of: F) -> UserCounts
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Option<&User>,
{
    let mut counts = UserCounts::new();
    for item in items {
        match role_of(item) {
            Some(user) => counts.record(user),
            None => counts.skipped += 1,
        }
    }
    counts
}

pub fn count_commits_by_author(commits: &[Commit]) -> UserCounts {
    count_by(commits, |c| c.author.as_ref())
}

pub fn count_issues_by_opener(issues: &[Issue]) -> UserCounts {
    count_by(issues, |i| Some(&i.opener))
}

pub fn count_pull_requests_by_opener<'a, I>(pull_requests: I) -> UserCounts
where
    I: IntoIterator<Item = &'a PullRequest>,
{
    count_by(pull_requests, |pr| Some(&pr.opener))
}

pub fn count_pull_requests_by_merger<'a, I>(pull_requests: I) -> UserCounts
where
    I: IntoIterator<Item = &'a PullRequest>,
{
    count_by(pull_requests, |pr| pr.merger.as_ref())
}
