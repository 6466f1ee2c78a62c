/// Errors that can occur while reviewing a pull request.
///
/// Library crates use this type directly; the binary hands it to `miette`
/// at the boundary.
///
/// # Examples
///
/// ```
/// use quibble_core::QuibbleError;
///
/// let err = QuibbleError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum QuibbleError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(help("run 'quibble --help' to see the accepted flags and environment variables"))]
    Config(String),

    /// A repository or pull request does not exist on the host.
    #[error("not found: {0}")]
    NotFound(String),

    /// GitHub API failure.
    #[error("GitHub error: {0}")]
    GitHub(String),

    /// Completion API or response error.
    #[error("completion error: {0}")]
    Completion(String),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
