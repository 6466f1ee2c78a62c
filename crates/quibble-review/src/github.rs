use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use quibble_core::{ChangedFile, CommitInfo, PullRequestInfo, QuibbleError, RepoSlug};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_API_URL: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-').remove(b'_');

/// The source-control host a review reads from and comments on.
///
/// Every call is scoped to the repository the host was built for.
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    /// Fetch pull request metadata.
    ///
    /// Returns [`QuibbleError::NotFound`] when the pull request does not exist.
    async fn pull_request(&self, number: u64) -> Result<PullRequestInfo, QuibbleError>;

    /// List the pull request's commits with their changed files, in host order.
    async fn commits(&self, number: u64) -> Result<Vec<CommitInfo>, QuibbleError>;

    /// Fetch a file's content at revision `sha`.
    async fn file_content(&self, filename: &str, sha: &str) -> Result<ChangedFile, QuibbleError>;

    /// Post a comment on the pull request's conversation thread.
    async fn post_comment(&self, number: u64, body: &str) -> Result<(), QuibbleError>;
}

/// GitHub REST client for one repository.
///
/// # Examples
///
/// ```
/// use quibble_core::RepoSlug;
/// use quibble_review::github::GitHubClient;
///
/// # #[tokio::main] async fn main() {
/// let repo: RepoSlug = "octocat/hello-world".parse().unwrap();
/// let client = GitHubClient::new("ghp_xxxx", repo, None).unwrap();
/// assert_eq!(client.repo().owner, "octocat");
/// # }
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    token: String,
    api_url: String,
    repo: RepoSlug,
}

impl GitHubClient {
    /// Create a client for `repo`, optionally against a GitHub Enterprise API root.
    ///
    /// # Errors
    ///
    /// Returns [`QuibbleError::Config`] for an unusable API URL, or
    /// [`QuibbleError::GitHub`] if the client cannot be built.
    pub fn new(token: &str, repo: RepoSlug, api_url: Option<&str>) -> Result<Self, QuibbleError> {
        let api_url = api_url
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        let mut builder = octocrab::Octocrab::builder().personal_token(token.to_string());
        if api_url != DEFAULT_API_URL {
            builder = builder
                .base_uri(api_url.as_str())
                .map_err(|e| QuibbleError::Config(format!("invalid GitHub API URL '{api_url}': {e}")))?;
        }
        let octocrab = builder
            .build()
            .map_err(|e| QuibbleError::GitHub(format!("failed to create GitHub client: {e}")))?;

        Ok(Self {
            octocrab,
            http: reqwest::Client::new(),
            token: token.to_string(),
            api_url,
            repo,
        })
    }

    /// The repository this client is scoped to.
    pub fn repo(&self) -> &RepoSlug {
        &self.repo
    }

    fn repo_route(&self, tail: &str) -> String {
        format!("/repos/{}/{}/{tail}", self.repo.owner, self.repo.repo)
    }

    fn contents_url(&self, filename: &str) -> String {
        let path = filename
            .split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/repos/{}/{}/contents/{path}",
            self.api_url, self.repo.owner, self.repo.repo
        )
    }

    async fn author_name(&self, login: &str) -> String {
        let route = format!("/users/{login}");
        match self.octocrab.get::<UserResponse, _, ()>(route, None).await {
            Ok(user) => user
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(user.login),
            Err(e) => {
                debug!(%login, error = %e, "falling back to login for author name");
                login.to_string()
            }
        }
    }

    async fn commit_files(&self, sha: &str) -> Result<Vec<String>, QuibbleError> {
        let route = self.repo_route(&format!("commits/{sha}"));
        let mut files = Vec::new();
        for page in 1.. {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let commit: CommitResponse = self
                .octocrab
                .get(&route, Some(&params))
                .await
                .map_err(|e| QuibbleError::GitHub(format!("failed to fetch commit {sha}: {e}")))?;
            let count = commit.files.len();
            files.extend(commit.files.into_iter().map(|f| f.filename));
            if count < PER_PAGE as usize {
                break;
            }
        }
        Ok(files)
    }
}

#[derive(Serialize)]
struct PageParams {
    per_page: u32,
    page: u32,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    number: u64,
    user: Option<UserRef>,
    #[serde(default)]
    commits: u64,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    changed_files: u64,
}

#[derive(Debug, Deserialize)]
struct UserRef {
    login: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    files: Vec<CommitFile>,
}

#[derive(Debug, Deserialize)]
struct CommitFile {
    filename: String,
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

#[async_trait]
impl PullRequestHost for GitHubClient {
    async fn pull_request(&self, number: u64) -> Result<PullRequestInfo, QuibbleError> {
        let route = self.repo_route(&format!("pulls/{number}"));
        let pr: PullResponse = self
            .octocrab
            .get::<PullResponse, _, ()>(route, None)
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    QuibbleError::NotFound(format!("pull request #{number} in {}", self.repo))
                } else {
                    QuibbleError::GitHub(format!("failed to fetch pull request #{number}: {e}"))
                }
            })?;

        let author = match &pr.user {
            Some(user) => self.author_name(&user.login).await,
            None => "ghost".to_string(),
        };

        Ok(PullRequestInfo {
            number: pr.number,
            author,
            commits: pr.commits,
            additions: pr.additions,
            deletions: pr.deletions,
            changed_files: pr.changed_files,
        })
    }

    async fn commits(&self, number: u64) -> Result<Vec<CommitInfo>, QuibbleError> {
        let route = self.repo_route(&format!("pulls/{number}/commits"));
        let mut shas = Vec::new();
        for page in 1.. {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<CommitRef> = self
                .octocrab
                .get(&route, Some(&params))
                .await
                .map_err(|e| QuibbleError::GitHub(format!("failed to list commits: {e}")))?;
            let count = batch.len();
            shas.extend(batch.into_iter().map(|c| c.sha));
            if count < PER_PAGE as usize {
                break;
            }
        }

        let mut commits = Vec::with_capacity(shas.len());
        for sha in shas {
            let files = self.commit_files(&sha).await?;
            debug!(%sha, files = files.len(), "listed commit files");
            commits.push(CommitInfo { sha, files });
        }
        Ok(commits)
    }

    async fn file_content(&self, filename: &str, sha: &str) -> Result<ChangedFile, QuibbleError> {
        let response = self
            .http
            .get(self.contents_url(filename))
            .query(&[("ref", sha)])
            .header("Accept", "application/vnd.github.raw")
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "quibble")
            .send()
            .await
            .map_err(|e| QuibbleError::GitHub(format!("failed to fetch {filename}: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(QuibbleError::NotFound(format!("{filename} at {sha}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuibbleError::GitHub(format!(
                "GitHub API error {status}: {body}"
            )));
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| QuibbleError::GitHub(format!("failed to read {filename}: {e}")))?;

        Ok(ChangedFile {
            filename: filename.to_string(),
            content: content.to_vec(),
        })
    }

    async fn post_comment(&self, number: u64, body: &str) -> Result<(), QuibbleError> {
        let route = self.repo_route(&format!("issues/{number}/comments"));
        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&serde_json::json!({ "body": body })))
            .await
            .map_err(|e| QuibbleError::GitHub(format!("failed to post comment: {e}")))?;
        Ok(())
    }
}
