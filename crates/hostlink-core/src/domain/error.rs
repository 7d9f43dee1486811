//! Domain-level error taxonomy for hostlink.

/// Hostlink domain errors.
///
/// Failures in this subsystem never abort rendering of surrounding text.
/// Callers degrade to "render without enrichment" or "skip one entry".
#[derive(Debug, thiserror::Error)]
pub enum HostlinkError {
    #[error("invalid remote configuration: {0}")]
    Configuration(String),

    #[error("failed to compile autolink pattern for prefix {prefix:?}: {source}")]
    PatternCompile {
        prefix: String,
        #[source]
        source: regex::Error,
    },

    #[error("hosting resolution failed: {0}")]
    Resolution(String),

    #[error("git error: {0}")]
    Git(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hostlink domain operations.
pub type Result<T> = std::result::Result<T, HostlinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HostlinkError::Configuration("bad matcher".to_string());
        assert!(err.to_string().contains("invalid remote configuration"));

        let err = HostlinkError::Git("not a repository".to_string());
        assert!(err.to_string().contains("git error"));
    }

    #[test]
    fn test_pattern_compile_error_carries_prefix() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = HostlinkError::PatternCompile {
            prefix: "JIRA-".to_string(),
            source,
        };
        assert!(err.to_string().contains("JIRA-"));
    }
}
