use std::fmt;

use quibble_core::{CommitInfo, FileReview, QuibbleError, ReviewConfig};
use tracing::{debug, info, warn};

use crate::github::PullRequestHost;
use crate::llm::{ChatMessage, CompletionProvider, CompletionRequest};
use crate::prompt;
use crate::summary;

/// Counts gathered during a review run.
///
/// # Examples
///
/// ```
/// use quibble_review::pipeline::ReviewReport;
///
/// let report = ReviewReport {
///     commits: 1,
///     files_reviewed: 2,
///     files_failed: 1,
///     comments_posted: 4,
///     comments_failed: 0,
/// };
/// assert_eq!(report.files_processed(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewReport {
    /// Commits walked.
    pub commits: usize,
    /// Files the model reviewed.
    pub files_reviewed: usize,
    /// Files whose fetch or completion failed.
    pub files_failed: usize,
    /// Comments posted, including the summary.
    pub comments_posted: usize,
    /// Per-file comments that could not be posted.
    pub comments_failed: usize,
}

impl ReviewReport {
    /// Files processed, successful or not.
    pub fn files_processed(&self) -> usize {
        self.files_reviewed + self.files_failed
    }
}

impl fmt::Display for ReviewReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Commits: {} | Files: {} (reviewed: {}, failed: {}) | Comments: {} (failed to post: {})",
            self.commits,
            self.files_processed(),
            self.files_reviewed,
            self.files_failed,
            self.comments_posted,
            self.comments_failed,
        )
    }
}

/// Review orchestrator that drives the full run for one pull request.
///
/// Posts a summary, then walks commits and their files in host order,
/// posting exactly one comment per file. Files are not deduplicated across
/// commits: a path touched by three commits is reviewed three times.
pub struct ReviewPipeline<H, C> {
    host: H,
    llm: C,
    config: ReviewConfig,
}

impl<H: PullRequestHost, C: CompletionProvider> ReviewPipeline<H, C> {
    /// Create a new pipeline from a host, a completion provider, and a review config.
    pub fn new(host: H, llm: C, config: ReviewConfig) -> Self {
        Self { host, llm, config }
    }

    /// Run the review.
    ///
    /// # Errors
    ///
    /// Returns [`QuibbleError::NotFound`] if the pull request does not exist,
    /// or any error from posting the summary or listing commits. Per-file
    /// failures are reported as comments and never returned.
    pub async fn run(&self) -> Result<ReviewReport, QuibbleError> {
        let number = self.config.pull_request_id;
        if let Some(lang) = &self.config.dev_lang {
            debug!(%lang, "language hint given; the review prompt does not use it");
        }

        let pr = self.host.pull_request(number).await?;
        info!(number, author = %pr.author, "reviewing pull request");

        self.host.post_comment(number, &summary::summarize(&pr)).await?;
        let mut report = ReviewReport {
            comments_posted: 1,
            ..ReviewReport::default()
        };

        let commits = self.host.commits(number).await?;
        report.commits = commits.len();

        for commit in &commits {
            debug!(sha = %commit.sha, files = commit.files.len(), "reviewing commit");
            for filename in &commit.files {
                let review = self.review_file(commit, filename).await;
                if review.is_reviewed() {
                    report.files_reviewed += 1;
                } else {
                    report.files_failed += 1;
                }

                match self.host.post_comment(number, &review.to_comment()).await {
                    Ok(()) => report.comments_posted += 1,
                    Err(e) => {
                        warn!(%filename, error = %e, "failed to post review comment");
                        report.comments_failed += 1;
                    }
                }
            }
        }

        info!(%report, "review finished");
        Ok(report)
    }

    /// Fetch one file at `commit` and ask the model to review it.
    async fn review_file(&self, commit: &CommitInfo, filename: &str) -> FileReview {
        match self.try_review_file(commit, filename).await {
            Ok(response) => FileReview::Reviewed {
                filename: filename.to_string(),
                response,
            },
            Err(e) => {
                warn!(%filename, sha = %commit.sha, error = %e, "file review failed");
                FileReview::Failed {
                    filename: filename.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    async fn try_review_file(
        &self,
        commit: &CommitInfo,
        filename: &str,
    ) -> Result<String, QuibbleError> {
        let file = self.host.file_content(filename, &commit.sha).await?;
        let request = CompletionRequest {
            model: self.config.model_name.clone(),
            messages: vec![ChatMessage::user(prompt::build_file_message(
                &self.config.prompt_text,
                &file.text(),
            ))],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        self.llm.complete(&request).await
    }
}
