// Changes the process working directory, so it lives in its own test binary.
mod common;

use common::*;
use gdet::source::{GitSource, RepositoryDataSource};
use tempfile::tempdir;

#[test]
fn explicit_path_does_not_need_working_directory() {
    let clone = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(clone.path());
    commit_file(clone.path(), "a.txt", "a\n");

    let original = std::env::current_dir().unwrap();
    let gone = tempdir().unwrap();
    std::env::set_current_dir(gone.path()).unwrap();
    let gone_path = gone.path().to_path_buf();
    gone.close().unwrap();
    assert!(std::env::current_dir().is_err(), "{} still readable", gone_path.display());

    let opened = GitSource::open(Some(clone.path()));
    std::env::set_current_dir(&original).unwrap();

    assert!(opened.is_ok(), "open failed without a working directory");
    let source = GitSource::open(Some(clone.path())).unwrap();
    assert!(source.check_connection());
}
