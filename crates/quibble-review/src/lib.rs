//! Pull request review orchestration.
//!
//! Provides the review pipeline: GitHub and completion clients behind the
//! [`github::PullRequestHost`] and [`llm::CompletionProvider`] seams, the
//! fixed review prompt, the PR summary comment, and the orchestrator that
//! posts one comment per changed file.

pub mod dry_run;
pub mod github;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod summary;
