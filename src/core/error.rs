use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Comprehensive error types for linkscout operations
#[derive(Debug)]
pub enum LinkScoutError {
    /// IO error on a specific file (reading input, creating output)
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Directory enumeration error
    FileWalking(ignore::Error),

    /// Configuration error
    Config(String),

    /// Invalid argument error
    InvalidArgument(String),

    /// Browser process could not be started
    BrowserLaunch(String),

    /// A running browser failed a control command
    Browser(String),

    /// A page could not be created or navigated
    Navigation { url: String, reason: String },

    /// A bounded wait expired
    Timeout { what: String, after: Duration },

    /// JSON serialization error
    Json(serde_json::Error),
}

impl LinkScoutError {
    /// Wrap an IO error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LinkScoutError::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors that only affect one source (a file in a walk, a URL in a list).
    ///
    /// Everything else ends the run. A failed directory enumeration is not
    /// recoverable; unreadable files inside a walk are reported separately.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LinkScoutError::Io { .. }
                | LinkScoutError::BrowserLaunch(_)
                | LinkScoutError::Browser(_)
                | LinkScoutError::Navigation { .. }
                | LinkScoutError::Timeout { .. }
        )
    }
}

impl fmt::Display for LinkScoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkScoutError::Io { path, source } => {
                write!(f, "IO error on '{}': {source}", path.display())
            }
            LinkScoutError::FileWalking(err) => write!(f, "File walking error: {err}"),
            LinkScoutError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LinkScoutError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            LinkScoutError::BrowserLaunch(msg) => write!(f, "Browser launch error: {msg}"),
            LinkScoutError::Browser(msg) => write!(f, "Browser error: {msg}"),
            LinkScoutError::Navigation { url, reason } => {
                write!(f, "Navigation error for {url}: {reason}")
            }
            LinkScoutError::Timeout { what, after } => {
                write!(f, "Timeout: {what} did not finish within {}ms", after.as_millis())
            }
            LinkScoutError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for LinkScoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LinkScoutError::Io { source, .. } => Some(source),
            LinkScoutError::FileWalking(err) => Some(err),
            LinkScoutError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ignore::Error> for LinkScoutError {
    fn from(err: ignore::Error) -> Self {
        LinkScoutError::FileWalking(err)
    }
}

impl From<serde_json::Error> for LinkScoutError {
    fn from(err: serde_json::Error) -> Self {
        LinkScoutError::Json(err)
    }
}

impl From<chromiumoxide::error::CdpError> for LinkScoutError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        LinkScoutError::Browser(err.to_string())
    }
}

/// Type alias for Results using LinkScoutError
pub type Result<T> = std::result::Result<T, LinkScoutError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let config_error = LinkScoutError::Config("Invalid timeout".to_string());
        assert_eq!(
            format!("{config_error}"),
            "Configuration error: Invalid timeout"
        );

        let nav_error = LinkScoutError::Navigation {
            url: "https://example.com".to_string(),
            reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        };
        assert_eq!(
            format!("{nav_error}"),
            "Navigation error for https://example.com: net::ERR_NAME_NOT_RESOLVED"
        );
    }

    #[test]
    fn test_io_error_display_contains_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = LinkScoutError::io("/tmp/nope.js", io_error);

        let display = format!("{error}");
        assert!(display.contains("/tmp/nope.js"));
        assert!(display.contains("missing"));
    }

    #[test]
    fn test_timeout_display() {
        let error = LinkScoutError::Timeout {
            what: "page load".to_string(),
            after: Duration::from_secs(2),
        };
        assert_eq!(
            format!("{error}"),
            "Timeout: page load did not finish within 2000ms"
        );
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let error = LinkScoutError::from(json_error);

        match error {
            LinkScoutError::Json(_) => {} // Expected
            _ => panic!("Expected Json variant"),
        }
    }

    #[test]
    fn test_error_source() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let error = LinkScoutError::io("file.txt", io_error);
        assert!(error.source().is_some());

        let config_error = LinkScoutError::Config("test".to_string());
        assert!(config_error.source().is_none());
    }

    #[test]
    fn test_recoverable_errors() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(LinkScoutError::io("a", io_error).is_recoverable());
        assert!(LinkScoutError::Browser("crashed".to_string()).is_recoverable());
        assert!(LinkScoutError::BrowserLaunch("no chrome".to_string()).is_recoverable());
        assert!(!LinkScoutError::Config("bad".to_string()).is_recoverable());
        assert!(!LinkScoutError::InvalidArgument("bad".to_string()).is_recoverable());
    }

    #[test]
    fn test_walk_errors_are_not_recoverable() {
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = LinkScoutError::from(ignore::Error::Io(denied));

        assert!(matches!(error, LinkScoutError::FileWalking(_)));
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LinkScoutError>();
    }
}
