use std::fmt;
use std::str::FromStr;

use crate::error::QuibbleError;

/// A repository identifier in `owner/repo` form.
///
/// # Examples
///
/// ```
/// use quibble_core::RepoSlug;
///
/// let slug: RepoSlug = "octocat/hello-world".parse().unwrap();
/// assert_eq!(slug.owner, "octocat");
/// assert_eq!(slug.repo, "hello-world");
/// assert_eq!(slug.to_string(), "octocat/hello-world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    /// Account or organization owning the repository.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl FromStr for RepoSlug {
    type Err = QuibbleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            QuibbleError::Config(format!(
                "invalid repository '{s}', expected owner/repo"
            ))
        };
        let (owner, repo) = s.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Read-only snapshot of a pull request's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestInfo {
    /// Pull request number.
    pub number: u64,
    /// Display name of the author, or their login when no name is set.
    pub author: String,
    /// Number of commits in the pull request.
    pub commits: u64,
    /// Lines added.
    pub additions: u64,
    /// Lines deleted.
    pub deletions: u64,
    /// Number of files changed.
    pub changed_files: u64,
}

/// One commit of a pull request and the files it touched, in host order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Commit revision.
    pub sha: String,
    /// Paths of the files changed by this commit.
    pub files: Vec<String>,
}

/// A changed file's content at a specific commit.
///
/// # Examples
///
/// ```
/// use quibble_core::ChangedFile;
///
/// let file = ChangedFile {
///     filename: "src/lib.rs".into(),
///     content: b"fn main() {}".to_vec(),
/// };
/// assert_eq!(file.text(), "fn main() {}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Path of the file in the repository.
    pub filename: String,
    /// Raw bytes of the file.
    pub content: Vec<u8>,
}

impl ChangedFile {
    /// File content as text; invalid UTF-8 sequences are replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Outcome of reviewing a single changed file.
///
/// Every processed file produces exactly one of these, and each one is
/// rendered into exactly one pull request comment.
///
/// # Examples
///
/// ```
/// use quibble_core::FileReview;
///
/// let ok = FileReview::Reviewed {
///     filename: "a.py".into(),
///     response: "Looks fine.".into(),
/// };
/// assert_eq!(ok.to_comment(), "ChatGPT's review about `a.py` file:\n Looks fine.");
///
/// let failed = FileReview::Failed {
///     filename: "b.py".into(),
///     error: "slow down".into(),
/// };
/// assert!(failed.to_comment().contains("**b.py**"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileReview {
    /// The model answered; `response` is its text, verbatim.
    Reviewed { filename: String, response: String },
    /// Fetching the file or calling the model failed.
    Failed { filename: String, error: String },
}

impl FileReview {
    /// Path of the reviewed file.
    pub fn filename(&self) -> &str {
        match self {
            Self::Reviewed { filename, .. } | Self::Failed { filename, .. } => filename,
        }
    }

    /// Whether the model produced a review for the file.
    pub fn is_reviewed(&self) -> bool {
        matches!(self, Self::Reviewed { .. })
    }

    /// Render the comment body posted to the pull request.
    pub fn to_comment(&self) -> String {
        match self {
            Self::Reviewed { filename, response } => {
                format!("ChatGPT's review about `{filename}` file:\n {response}")
            }
            Self::Failed { filename, error } => format!(
                "\u{1f6a8} Fail code review process for file **{filename}**.\n\n`{error}`"
            ),
        }
    }
}
