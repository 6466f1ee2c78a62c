use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::QuibbleError;
use crate::types::RepoSlug;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".quibble.toml";

/// Top-level configuration loaded from `.quibble.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
/// The binary folds flags and environment into this record before building a
/// [`ReviewConfig`].
///
/// # Examples
///
/// ```
/// use quibble_core::QuibbleConfig;
///
/// let config = QuibbleConfig::default();
/// assert_eq!(config.llm.model, "gpt-3.5-turbo");
/// assert_eq!(config.llm.max_tokens, 4096);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuibbleConfig {
    /// Completion provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// GitHub settings.
    #[serde(default)]
    pub github: GitHubConfig,
}

impl QuibbleConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`QuibbleError::Io`] if the file cannot be read, or
    /// [`QuibbleError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, QuibbleError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`QuibbleError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use quibble_core::QuibbleConfig;
    ///
    /// let toml = r#"
    /// [llm]
    /// model = "gpt-4o-mini"
    /// "#;
    /// let config = QuibbleConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.llm.model, "gpt-4o-mini");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, QuibbleError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Completion provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: f32,
    /// Maximum number of tokens to generate per review.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
}

fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        }
    }
}

impl LlmConfig {
    /// The API key, or a configuration error naming where to set it.
    ///
    /// # Errors
    ///
    /// Returns [`QuibbleError::Config`] when no key is configured.
    pub fn require_api_key(&self) -> Result<&str, QuibbleError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(QuibbleError::Config(
                "no completion API key. Pass --openai-api-key or set OPENAI_API_KEY".into(),
            )),
        }
    }
}

/// GitHub configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Token used for every GitHub API call.
    pub token: Option<String>,
    /// Repository holding the pull request, as `owner/repo`.
    pub repository: Option<String>,
    /// API root, for GitHub Enterprise installations.
    pub api_url: Option<String>,
}

impl GitHubConfig {
    /// The token, or a configuration error naming where to set it.
    ///
    /// # Errors
    ///
    /// Returns [`QuibbleError::Config`] when no token is configured.
    pub fn require_token(&self) -> Result<&str, QuibbleError> {
        match self.token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(QuibbleError::Config(
                "no GitHub token. Pass --github-token or set GITHUB_TOKEN".into(),
            )),
        }
    }

    /// The repository slug, parsed.
    ///
    /// # Errors
    ///
    /// Returns [`QuibbleError::Config`] when the repository is unset or not
    /// in `owner/repo` form.
    ///
    /// # Examples
    ///
    /// ```
    /// use quibble_core::GitHubConfig;
    ///
    /// let config = GitHubConfig {
    ///     repository: Some("octocat/hello-world".into()),
    ///     ..GitHubConfig::default()
    /// };
    /// assert_eq!(config.repository_slug().unwrap().repo, "hello-world");
    /// ```
    pub fn repository_slug(&self) -> Result<RepoSlug, QuibbleError> {
        let Some(repository) = self.repository.as_deref() else {
            return Err(QuibbleError::Config(
                "no repository. Pass --repository or set GITHUB_REPOSITORY".into(),
            ));
        };
        repository.parse()
    }
}

/// Unvalidated review parameters as given on the command line.
///
/// `None` means "not given"; the value then comes from [`LlmConfig`].
#[derive(Debug, Clone, Default)]
pub struct RawReviewArgs {
    /// Pull request number.
    pub pr_id: String,
    /// Model identifier.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<String>,
    /// Maximum number of tokens to generate.
    pub max_tokens: Option<String>,
    /// Language hint for the reviewed code.
    pub dev_lang: Option<String>,
}

/// Validated settings for one review run. Immutable once built.
///
/// # Examples
///
/// ```
/// use quibble_core::{LlmConfig, RawReviewArgs, ReviewConfig};
///
/// let raw = RawReviewArgs {
///     pr_id: "42".into(),
///     temperature: Some("0.5".into()),
///     ..RawReviewArgs::default()
/// };
/// let config = ReviewConfig::build(&raw, &LlmConfig::default(), "Review this".into()).unwrap();
/// assert_eq!(config.pull_request_id, 42);
/// assert_eq!(config.temperature, 0.5);
/// assert_eq!(config.model_name, "gpt-3.5-turbo");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewConfig {
    /// Pull request number.
    pub pull_request_id: u64,
    /// Instruction text sent ahead of every file.
    pub prompt_text: String,
    /// Sampling temperature, 0.0 to 2.0.
    pub temperature: f32,
    /// Maximum number of tokens to generate per file.
    pub max_tokens: u32,
    /// Model identifier.
    pub model_name: String,
    /// Language hint. Carried for logging; the prompt does not use it.
    pub dev_lang: Option<String>,
}

impl ReviewConfig {
    /// Validate `raw` against the file/default values in `llm`.
    ///
    /// # Errors
    ///
    /// Returns [`QuibbleError::Config`] if the PR id is not a positive
    /// integer, the temperature is not a number in 0.0 to 2.0, max tokens is
    /// not a positive integer, or the model name is empty.
    pub fn build(
        raw: &RawReviewArgs,
        llm: &LlmConfig,
        prompt_text: String,
    ) -> Result<Self, QuibbleError> {
        let pull_request_id = parse_pr_id(&raw.pr_id)?;

        let temperature = match raw.temperature.as_deref() {
            Some(t) => t.trim().parse::<f32>().map_err(|_| {
                QuibbleError::Config(format!("invalid temperature '{t}': expected a number"))
            })?,
            None => llm.temperature,
        };
        if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
            return Err(QuibbleError::Config(format!(
                "temperature {temperature} out of range, expected 0.0 to 2.0"
            )));
        }

        let max_tokens = match raw.max_tokens.as_deref() {
            Some(m) => m.trim().parse::<u32>().map_err(|_| {
                QuibbleError::Config(format!(
                    "invalid max tokens '{m}': expected a positive integer"
                ))
            })?,
            None => llm.max_tokens,
        };
        if max_tokens == 0 {
            return Err(QuibbleError::Config("max tokens must be greater than 0".into()));
        }

        let model_name = raw.model.clone().unwrap_or_else(|| llm.model.clone());
        if model_name.trim().is_empty() {
            return Err(QuibbleError::Config("model name must not be empty".into()));
        }

        Ok(Self {
            pull_request_id,
            prompt_text,
            temperature,
            max_tokens,
            model_name,
            dev_lang: raw.dev_lang.clone().filter(|l| !l.trim().is_empty()),
        })
    }
}

fn parse_pr_id(raw: &str) -> Result<u64, QuibbleError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(QuibbleError::Config(format!(
            "invalid pull request id '{raw}': expected a positive integer"
        ))),
        Ok(id) => Ok(id),
    }
}
