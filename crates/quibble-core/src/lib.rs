//! Core types, configuration, and error handling for quibble.
//!
//! This crate provides the shared foundation used by the review crate and
//! the `quibble` binary:
//! - [`QuibbleError`] — unified error type using `thiserror`
//! - [`QuibbleConfig`] — layered configuration loaded from `.quibble.toml`
//! - [`ReviewConfig`] — the validated, immutable settings of a single run
//! - Shared records: [`RepoSlug`], [`PullRequestInfo`], [`CommitInfo`],
//!   [`ChangedFile`], [`FileReview`]

mod config;
mod error;
mod types;

pub use config::{
    GitHubConfig, LlmConfig, QuibbleConfig, RawReviewArgs, ReviewConfig, DEFAULT_CONFIG_FILE,
};
pub use error::QuibbleError;
pub use types::{ChangedFile, CommitInfo, FileReview, PullRequestInfo, RepoSlug};

/// A convenience `Result` type for quibble operations.
pub type Result<T> = std::result::Result<T, QuibbleError>;
