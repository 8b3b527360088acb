use std::path::PathBuf;

/// Exit codes used by the binary
pub mod exit_codes {
    pub const GENERAL_ERROR: i32 = 1;
    pub const CONNECTION_FAILURE: i32 = 2;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Empty or malformed user input
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("server '{name}' already exists in category '{category}'")]
    DuplicateEntry { category: String, name: String },

    #[error("{0} not found")]
    NotFound(String),

    /// The persisted registry could not be parsed. Never overwritten.
    #[error("registry file {} is corrupt: {reason}", .path.display())]
    ConfigCorrupt { path: PathBuf, reason: String },

    /// The persisted registry exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("connection to {target} failed ({})", exit_status(.code))]
    ConnectionFailure { target: String, code: Option<i32> },

    #[error("failed to start '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Fatal errors end the session; the rest are reported and the session goes on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigCorrupt { .. } | Self::Read { .. } | Self::Io(_)
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailure { .. } | Self::Launch { .. } => exit_codes::CONNECTION_FAILURE,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors() {
        let corrupt = Error::ConfigCorrupt {
            path: PathBuf::from("/tmp/servers.json"),
            reason: "expected value".into(),
        };
        assert!(corrupt.is_fatal());
        let unreadable = Error::Read {
            path: PathBuf::from("/tmp/servers.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(unreadable.is_fatal());
        assert!(unreadable.to_string().starts_with("failed to read /tmp/servers.json"));
        assert!(!Error::NotFound("category 'Work'".into()).is_fatal());
        assert!(!Error::validation("name", "must not be empty").is_fatal());
    }

    #[test]
    fn connection_failure_message() {
        let err = Error::ConnectionFailure {
            target: "alice@host1".into(),
            code: Some(255),
        };
        assert_eq!(
            err.to_string(),
            "connection to alice@host1 failed (exit code 255)"
        );
        assert_eq!(err.exit_code(), exit_codes::CONNECTION_FAILURE);
    }
}
