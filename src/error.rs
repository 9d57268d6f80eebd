use thiserror::Error;

/// Unified error type for release-flow operations
///
/// Only contract violations end up here. Discovery problems (a tag listing
/// that failed, a scope branch that does not exist) are reported as
/// [`crate::boundary::BoundaryWarning`] next to a best-effort value instead.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Pattern error: {0}")]
    Pattern(String),

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Unsupported operation: {0}")]
    Operation(String),

    #[error("Configuration file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in release-flow
pub type Result<T> = std::result::Result<T, FlowError>;

impl FlowError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        FlowError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        FlowError::Version(msg.into())
    }

    /// Create a naming-template error with context
    pub fn pattern(msg: impl Into<String>) -> Self {
        FlowError::Pattern(msg.into())
    }

    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        FlowError::Branch(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        FlowError::Tag(msg.into())
    }

    /// Create an unsupported-operation error with context
    pub fn operation(msg: impl Into<String>) -> Self {
        FlowError::Operation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlowError::config("tag_prefix must not be empty");
        assert_eq!(
            err.to_string(),
            "Configuration error: tag_prefix must not be empty"
        );
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("tag_prefix = ").unwrap_err();
        let err: FlowError = toml_err.into();
        assert!(err.to_string().starts_with("Configuration file is not valid TOML"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (FlowError::config("x"), "Configuration error"),
            (FlowError::version("x"), "Version parsing error"),
            (FlowError::pattern("x"), "Pattern error"),
            (FlowError::branch("x"), "Branch error"),
            (FlowError::tag("x"), "Tag error"),
            (FlowError::operation("x"), "Unsupported operation"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
