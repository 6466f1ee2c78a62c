use quibble_core::{LlmConfig, QuibbleError, RawReviewArgs, ReviewConfig};

const REVIEW_PROMPT: &str = "\
You are a professional code reviewer with expert level knowledge of how to spot potential bugs, \
code smells, security issues, inconsistent formatting and readability issues.
You have the ability to make improvement suggestions with examples.
Review this file of a pull request for potential bugs, code smells, security issues, inconsistent \
formatting, readability issues and suggest improvements with examples.
The code you will be reviewing could be written by a developer of any skill level. You should \
assume that the developer is not familiar with the language's best practices.
If you cannot confidently detect the type of code you are reviewing simply say so.
Your review should include any issues found, grouped into sections of potential bugs, code smell, \
security issues, inconsistent formatting, readability issues with suggested improvements for each \
but omit any section where there are no issues.
Do not suggest comments.
Generate your review in markdown format.
Your review should use an extremely joking, sarcastic and funny tone and poke fun at the author, \
but keep it safe for work.";

/// Build the instruction text sent ahead of every file.
///
/// # Examples
///
/// ```
/// use quibble_review::prompt::build_prompt;
///
/// let prompt = build_prompt();
/// assert!(prompt.contains("code reviewer"));
/// assert!(prompt.contains("markdown"));
/// ```
pub fn build_prompt() -> String {
    REVIEW_PROMPT.to_string()
}

/// Build the single user message for one file: the prompt, then the file
/// content in a code fence.
///
/// # Examples
///
/// ```
/// use quibble_review::prompt::build_file_message;
///
/// let msg = build_file_message("Review this", "print(1)");
/// assert_eq!(msg, "Review this\n```print(1)```");
/// ```
pub fn build_file_message(prompt: &str, content: &str) -> String {
    format!("{prompt}\n```{content}```")
}

/// Validate raw CLI parameters into a [`ReviewConfig`] carrying the review
/// prompt.
///
/// # Errors
///
/// Returns [`QuibbleError::Config`] on invalid numbers; see
/// [`ReviewConfig::build`].
///
/// # Examples
///
/// ```
/// use quibble_core::{LlmConfig, RawReviewArgs};
/// use quibble_review::prompt::build_config;
///
/// let raw = RawReviewArgs { pr_id: "abc".into(), ..RawReviewArgs::default() };
/// assert!(build_config(&raw, &LlmConfig::default()).is_err());
/// ```
pub fn build_config(raw: &RawReviewArgs, llm: &LlmConfig) -> Result<ReviewConfig, QuibbleError> {
    ReviewConfig::build(raw, llm, build_prompt())
}
