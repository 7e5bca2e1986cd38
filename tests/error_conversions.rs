use branchsync::config::ConfigError;
use branchsync::error::{AppError, GitError};
use std::error::Error;

#[test]
fn test_git_error_converts_to_app_error() {
    let app_err: AppError = GitError::NotARepository.into();
    assert!(matches!(app_err, AppError::Git(_)));
}

#[test]
fn test_config_error_converts_to_app_error() {
    let app_err: AppError = ConfigError::DirectoryNotFound.into();
    assert!(matches!(app_err, AppError::Config(_)));
}

#[test]
fn test_io_error_converts_to_app_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
    let app_err: AppError = io_err.into();
    assert!(matches!(app_err, AppError::Io(_)));
}

/// Test that error source is preserved through the wrapper
#[test]
fn test_error_source_preserved() {
    let git_err = GitError::Spawn {
        program: "git".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
    };
    assert!(git_err.source().is_some());

    let app_err: AppError = git_err.into();
    assert!(app_err.source().is_some());
}

#[test]
fn test_command_failed_message_includes_output() {
    let err = GitError::CommandFailed {
        command: "push -u origin translations".to_string(),
        exit_code: 1,
        output: "error: failed to push some refs\n".to_string(),
    };

    let msg = err.to_string();
    assert!(msg.contains("git push -u origin translations"));
    assert!(msg.contains("exit code 1"));
    assert!(msg.ends_with("failed to push some refs"));
    assert_eq!(err.output(), Some("error: failed to push some refs\n"));
}

#[test]
fn test_fetch_auth_message_points_at_credentials() {
    let err = GitError::FetchAuth {
        remote: "origin".to_string(),
        message: "fatal: protocol error: bad line length character: Perm".to_string(),
    };

    let msg = err.to_string();
    assert!(msg.contains("origin"));
    assert!(msg.contains("protocol error"));
    assert!(msg.contains("Check git remote access/authentication"));
    assert!(err.output().is_none());
}

#[test]
fn test_fetch_auth_message_format() {
    let err = GitError::FetchAuth {
        remote: "origin".to_string(),
        message: "fatal: protocol error: bad line length character: Perm".to_string(),
    };

    assert_eq!(
        format!("ERROR: {}", err),
        "ERROR: Fetching 'origin' failed: fatal: protocol error: bad line length \
         character: Perm. Check git remote access/authentication."
    );
}
