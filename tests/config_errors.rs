use std::path::Path;
use std::process::{Command, Output};

/// Run `quibble` in `dir` with a clean environment and an unroutable API root,
/// so any attempted network call would fail loudly rather than reach GitHub.
fn quibble(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_quibble"));
    cmd.args(args)
        .current_dir(dir)
        .env_remove("OPENAI_API_KEY")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("RUST_LOG")
        .env("GITHUB_API_URL", "http://127.0.0.1:9")
        .env("NO_COLOR", "1");
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().unwrap()
}

const CREDENTIALS: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "sk-test"),
    ("GITHUB_TOKEN", "ghp_test"),
    ("GITHUB_REPOSITORY", "octocat/hello-world"),
];

#[test]
fn non_numeric_pr_id_fails_before_network() {
    let dir = tempfile::tempdir().unwrap();
    let output = quibble(dir.path(), &["--github-pr-id", "abc"], CREDENTIALS);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'abc'"), "unexpected stderr: {stderr}");
    assert!(!stderr.contains("GitHub error"), "unexpected stderr: {stderr}");
}

#[test]
fn out_of_range_temperature_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = quibble(
        dir.path(),
        &["--github-pr-id", "42", "--openai-temperature", "hot"],
        CREDENTIALS,
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'hot'"), "unexpected stderr: {stderr}");
}

#[test]
fn missing_repository_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = quibble(
        dir.path(),
        &["--github-pr-id", "42"],
        &[("OPENAI_API_KEY", "sk-test"), ("GITHUB_TOKEN", "ghp_test")],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GITHUB_REPOSITORY"), "unexpected stderr: {stderr}");
}

#[test]
fn missing_github_token_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = quibble(
        dir.path(),
        &["--github-pr-id", "42"],
        &[
            ("OPENAI_API_KEY", "sk-test"),
            ("GITHUB_REPOSITORY", "octocat/hello-world"),
        ],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GITHUB_TOKEN"), "unexpected stderr: {stderr}");
}

#[test]
fn missing_pr_id_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = quibble(dir.path(), &[], CREDENTIALS);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".quibble.toml"), "{{invalid}}").unwrap();

    let output = quibble(dir.path(), &["--github-pr-id", "42"], CREDENTIALS);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TOML"), "unexpected stderr: {stderr}");
}

#[test]
fn config_file_values_are_validated() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".quibble.toml"),
        "[llm]\nmax_tokens = 0\n",
    )
    .unwrap();

    let output = quibble(dir.path(), &["--github-pr-id", "42"], CREDENTIALS);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tokens"), "unexpected stderr: {stderr}");
}
