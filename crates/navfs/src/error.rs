// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by drivers, watchers and path construction.
///
/// Paths are carried as the virtual path the caller used, not the
/// host path a backend may have mapped it to.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Filesystem unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Watch error at {path}: {source}")]
    Watch {
        path: String,
        #[source]
        source: notify::Error,
    },

    #[error("Host error at {path}: {message}")]
    Host { path: String, message: String },
}

/// Coarse classification used by callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    WrongKind,
    Unavailable,
    InvalidInput,
    Unknown,
}

impl Error {
    pub fn not_found<P: AsRef<str>>(path: P) -> Self {
        Error::NotFound(path.as_ref().to_string())
    }

    pub fn not_a_directory<P: AsRef<str>>(path: P) -> Self {
        Error::NotADirectory(path.as_ref().to_string())
    }

    pub fn not_a_file<P: AsRef<str>>(path: P) -> Self {
        Error::NotAFile(path.as_ref().to_string())
    }

    pub fn unavailable<S: AsRef<str>>(what: S) -> Self {
        Error::Unavailable(what.as_ref().to_string())
    }

    pub fn invalid_path<P: AsRef<str>, R: Into<String>>(path: P, reason: R) -> Self {
        Error::InvalidPath {
            path: path.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_config<M: Into<String>>(message: M) -> Self {
        Error::InvalidConfig(message.into())
    }

    pub fn persistence<M: Into<String>>(message: M) -> Self {
        Error::Persistence {
            message: message.into(),
        }
    }

    pub fn host<P: AsRef<str>, M: Into<String>>(path: P, message: M) -> Self {
        Error::Host {
            path: path.as_ref().to_string(),
            message: message.into(),
        }
    }

    /// Map a host I/O error onto the driver taxonomy.
    ///
    /// `path` is the virtual path reported back to the caller.
    pub fn from_io<P: AsRef<str>>(path: P, err: io::Error) -> Self {
        let path = path.as_ref();
        match err.kind() {
            io::ErrorKind::NotFound => Error::not_found(path),
            io::ErrorKind::NotADirectory => Error::not_a_directory(path),
            io::ErrorKind::IsADirectory => Error::not_a_file(path),
            _ => Error::Io {
                path: path.to_string(),
                source: err,
            },
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::NotADirectory(_) | Error::NotAFile(_) => ErrorKind::WrongKind,
            Error::Unavailable(_) => ErrorKind::Unavailable,
            Error::InvalidPath { .. } | Error::InvalidConfig(_) => ErrorKind::InvalidInput,
            Error::Persistence { .. }
            | Error::Io { .. }
            | Error::Watch { .. }
            | Error::Host { .. } => ErrorKind::Unknown,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
