use thiserror::Error;

/// Every recoverable failure a command can report. State is unchanged
/// whenever one of these is returned.
#[derive(Error, Debug)]
pub enum FsError {
    #[error("name too long (max {max} chars): {name}")]
    NameTooLong { name: String, max: usize },
    #[error("invalid name: '{0}'")]
    InvalidName(String),
    #[error("'{0}' already exists in current directory")]
    DuplicateName(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("'{0}' is not a directory")]
    NotADirectory(String),
    #[error("'{0}' is a directory")]
    IsADirectory(String),
    #[error("directory '{0}' is not empty")]
    DirectoryNotEmpty(String),
    #[error("not enough disk space to append (need {needed} blocks, {free} free)")]
    DiskFull { needed: usize, free: usize },
    #[error("no free blocks left")]
    OutOfSpace,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("filesystem corrupt: {0}")]
    Corrupt(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("shell i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_cause() {
        let err = FsError::from(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(err.to_string(), "shell i/o failed: pipe closed");
    }
}
