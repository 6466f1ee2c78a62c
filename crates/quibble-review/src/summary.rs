use quibble_core::PullRequestInfo;

/// Render the summary comment posted once before any file is reviewed.
///
/// # Examples
///
/// ```
/// use quibble_core::PullRequestInfo;
/// use quibble_review::summary::summarize;
///
/// let pr = PullRequestInfo {
///     number: 42,
///     author: "Mona Lisa".into(),
///     commits: 3,
///     additions: 120,
///     deletions: 8,
///     changed_files: 4,
/// };
/// let text = summarize(&pr);
/// assert!(text.contains("**Mona Lisa**"));
/// assert!(text.contains("**Additions**: 120"));
/// ```
pub fn summarize(pr: &PullRequestInfo) -> String {
    format!(
        "Starting review process for this pull request sent by **{author}**\n\
         **Commits** in this pull request: {commits}\n\
         \n\
         **Additions**: {additions}\n\
         **Changed** files: {changed_files}\n\
         **Deletions**: {deletions}\n",
        author = pr.author,
        commits = pr.commits,
        additions = pr.additions,
        changed_files = pr.changed_files,
        deletions = pr.deletions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_has_fixed_layout() {
        let pr = PullRequestInfo {
            number: 7,
            author: "octocat".into(),
            commits: 2,
            additions: 10,
            deletions: 5,
            changed_files: 3,
        };
        assert_eq!(
            summarize(&pr),
            "Starting review process for this pull request sent by **octocat**\n\
             **Commits** in this pull request: 2\n\
             \n\
             **Additions**: 10\n\
             **Changed** files: 3\n\
             **Deletions**: 5\n"
        );
    }
}
