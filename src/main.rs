use std::path::{Path, PathBuf};

use clap::Parser;
use miette::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quibble_core::{QuibbleConfig, RawReviewArgs, ReviewConfig, DEFAULT_CONFIG_FILE};
use quibble_review::dry_run::DryRunHost;
use quibble_review::github::GitHubClient;
use quibble_review::llm::LlmClient;
use quibble_review::pipeline::{ReviewPipeline, ReviewReport};

#[derive(Parser)]
#[command(
    name = "quibble",
    version,
    about = "Review every file of a GitHub pull request with an LLM",
    long_about = "Review every file of a GitHub pull request with an LLM.\n\n\
                   Posts a summary comment, then one comment per changed file of every\n\
                   commit in the pull request with the model's review of that file.\n\
                   Files that fail to fetch or review get an error comment instead.\n\n\
                   Examples:\n  \
                     GITHUB_REPOSITORY=owner/repo quibble --github-pr-id 42\n  \
                     quibble --repository owner/repo --github-pr-id 42 --dry-run\n  \
                     quibble --github-pr-id 42 --openai-engine gpt-4o-mini --openai-temperature 0.5"
)]
struct Cli {
    /// API key for the completion provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// GitHub token used to read the pull request and post comments
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Number of the pull request to review
    #[arg(long)]
    github_pr_id: String,

    /// Language of the reviewed code (informational)
    #[arg(long)]
    dev_lang: Option<String>,

    /// Model to use (default: gpt-3.5-turbo)
    #[arg(long)]
    openai_engine: Option<String>,

    /// Sampling temperature, 0.0 to 2.0 (default: 0.0)
    #[arg(long)]
    openai_temperature: Option<String>,

    /// Maximum number of tokens to generate per file (default: 4096)
    #[arg(long)]
    openai_max_tokens: Option<String>,

    /// Repository holding the pull request (format: owner/repo)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// GitHub API root, for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL")]
    github_api_url: Option<String>,

    /// Base URL of an OpenAI-compatible completion API
    #[arg(long, env = "OPENAI_BASE_URL")]
    openai_base_url: Option<String>,

    /// Path to configuration file (default: .quibble.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print comments to stdout instead of posting them
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn raw_review_args(&self) -> RawReviewArgs {
        RawReviewArgs {
            pr_id: self.github_pr_id.clone(),
            model: self.openai_engine.clone(),
            temperature: self.openai_temperature.clone(),
            max_tokens: self.openai_max_tokens.clone(),
            dev_lang: self.dev_lang.clone(),
        }
    }

    /// Fold flags and environment over the file configuration.
    fn apply_overrides(&self, config: &mut QuibbleConfig) {
        if let Some(key) = &self.openai_api_key {
            config.llm.api_key = Some(key.clone());
        }
        if let Some(url) = &self.openai_base_url {
            config.llm.base_url = Some(url.clone());
        }
        if let Some(token) = &self.github_token {
            config.github.token = Some(token.clone());
        }
        if let Some(repository) = &self.repository {
            config.github.repository = Some(repository.clone());
        }
        if let Some(url) = &self.github_api_url {
            config.github.api_url = Some(url.clone());
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<QuibbleConfig> {
    let config = match path {
        Some(path) => QuibbleConfig::from_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                QuibbleConfig::from_file(default_path)?
            } else {
                QuibbleConfig::default()
            }
        }
    };
    Ok(config)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(config: &QuibbleConfig, review: ReviewConfig, dry_run: bool) -> Result<ReviewReport> {
    let repo = config.github.repository_slug()?;
    let token = config.github.require_token()?;
    config.llm.require_api_key()?;
    info!(%repo, model = %review.model_name, "configuration resolved");

    let github = GitHubClient::new(token, repo, config.github.api_url.as_deref())?;
    let llm = LlmClient::new(&config.llm)?;

    let report = if dry_run {
        let host = DryRunHost::new(github, std::io::stdout());
        ReviewPipeline::new(host, llm, review).run().await?
    } else {
        ReviewPipeline::new(github, llm, review).run().await?
    };
    Ok(report)
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let review = quibble_review::prompt::build_config(&cli.raw_review_args(), &config.llm)?;

    let report = run(&config, review, cli.dry_run).await?;
    if cli.verbose {
        eprintln!("{report}");
    }

    Ok(())
}
