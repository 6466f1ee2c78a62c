use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use quibble_core::{ChangedFile, CommitInfo, PullRequestInfo, QuibbleError};
use tracing::info;

use crate::github::PullRequestHost;

/// Host wrapper that reads from the real host but writes comments to a
/// local sink instead of posting them.
///
/// # Examples
///
/// ```
/// use quibble_review::dry_run::DryRunHost;
/// # use quibble_review::github::GitHubClient;
/// # #[tokio::main] async fn main() {
/// # let github = GitHubClient::new("t", "o/r".parse().unwrap(), None).unwrap();
/// let host = DryRunHost::new(github, std::io::stdout());
/// # }
/// ```
pub struct DryRunHost<H, W> {
    inner: H,
    sink: Mutex<W>,
}

impl<H, W> DryRunHost<H, W> {
    /// Wrap `inner`, writing would-be comments to `sink`.
    pub fn new(inner: H, sink: W) -> Self {
        Self {
            inner,
            sink: Mutex::new(sink),
        }
    }

    /// Unwrap into the inner host and the sink.
    pub fn into_parts(self) -> (H, W) {
        let sink = self
            .sink
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        (self.inner, sink)
    }
}

#[async_trait]
impl<H, W> PullRequestHost for DryRunHost<H, W>
where
    H: PullRequestHost,
    W: Write + Send,
{
    async fn pull_request(&self, number: u64) -> Result<PullRequestInfo, QuibbleError> {
        self.inner.pull_request(number).await
    }

    async fn commits(&self, number: u64) -> Result<Vec<CommitInfo>, QuibbleError> {
        self.inner.commits(number).await
    }

    async fn file_content(&self, filename: &str, sha: &str) -> Result<ChangedFile, QuibbleError> {
        self.inner.file_content(filename, sha).await
    }

    async fn post_comment(&self, number: u64, body: &str) -> Result<(), QuibbleError> {
        info!(number, "dry run: not posting comment");
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| QuibbleError::GitHub("dry-run output lock poisoned".into()))?;
        writeln!(sink, "--- comment on #{number} ---\n{body}\n")?;
        sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticHost;

    #[async_trait]
    impl PullRequestHost for StaticHost {
        async fn pull_request(&self, number: u64) -> Result<PullRequestInfo, QuibbleError> {
            Ok(PullRequestInfo {
                number,
                author: "octocat".into(),
                commits: 0,
                additions: 0,
                deletions: 0,
                changed_files: 0,
            })
        }

        async fn commits(&self, _number: u64) -> Result<Vec<CommitInfo>, QuibbleError> {
            Ok(Vec::new())
        }

        async fn file_content(
            &self,
            filename: &str,
            _sha: &str,
        ) -> Result<ChangedFile, QuibbleError> {
            Ok(ChangedFile {
                filename: filename.into(),
                content: Vec::new(),
            })
        }

        async fn post_comment(&self, _number: u64, _body: &str) -> Result<(), QuibbleError> {
            panic!("dry run must not reach the inner host");
        }
    }

    #[tokio::test]
    async fn comments_go_to_sink() {
        let host = DryRunHost::new(StaticHost, Vec::new());
        host.post_comment(3, "hello").await.unwrap();
        let (_, sink) = host.into_parts();
        let text = String::from_utf8(sink).unwrap();
        assert_eq!(text, "--- comment on #3 ---\nhello\n\n");
    }

    #[tokio::test]
    async fn reads_delegate_to_inner_host() {
        let host = DryRunHost::new(StaticHost, Vec::new());
        let pr = host.pull_request(11).await.unwrap();
        assert_eq!(pr.number, 11);
        assert!(host.commits(11).await.unwrap().is_empty());
    }
}
