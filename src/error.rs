// Copyright (C) 2026 by GiGa infosystems

//! The errors that abort generating a changelog

use crate::Revision;
use crate::manifest::ParseError;
use thiserror::Error;

/// Every error is terminal for a run, there is no partial report.
#[derive(Debug, Error)]
pub enum Error {
    #[error("revisions must not be empty")]
    InvalidRevision,
    #[error("invalid repository URL {url:?}: {reason}")]
    InvalidRepositoryUrl { url: String, reason: String },
    #[error("unable to find commit `{revision}`")]
    RevisionNotFound { revision: Revision },
    #[error("failed to resolve revision `{revision}`")]
    ResolveFailed {
        revision: Revision,
        #[source]
        source: Box<Error>,
    },
    #[error("failed to query the commit history")]
    HistoryQueryFailed(#[source] Box<Error>),
    #[error("`{path}` does not exist at `{revision}`")]
    FileNotFound { revision: Revision, path: String },
    #[error("failed to fetch `{path}` at `{revision}`")]
    FetchFailed {
        revision: Revision,
        path: String,
        #[source]
        source: Box<Error>,
    },
    #[error("failed to parse `{name}`")]
    ManifestParse {
        name: String,
        #[source]
        source: ParseError,
    },
    #[error("backend request failed: {0}")]
    Transport(String),
}

impl Error {
    /// Wrap an error returned while querying the history
    ///
    /// Errors that already are history failures are passed through.
    pub fn history(error: Error) -> Self {
        match error {
            Error::HistoryQueryFailed(_) => error,
            other => Error::HistoryQueryFailed(Box::new(other)),
        }
    }

    /// Wrap an error returned while resolving `revision`
    ///
    /// A revision that doesn't exist is passed through.
    pub fn resolve(revision: &Revision, error: Error) -> Self {
        match error {
            Error::RevisionNotFound { .. } | Error::ResolveFailed { .. } => error,
            other => Error::ResolveFailed {
                revision: revision.clone(),
                source: Box::new(other),
            },
        }
    }

    /// Wrap an error returned while fetching `path` at `revision`
    ///
    /// A file that doesn't exist is passed through.
    pub fn fetch(revision: &Revision, path: &str, error: Error) -> Self {
        match error {
            Error::FileNotFound { .. } | Error::FetchFailed { .. } => error,
            other => Error::FetchFailed {
                revision: revision.clone(),
                path: path.to_owned(),
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn revision(revision: &str) -> Revision {
        Revision::new(revision).unwrap()
    }

    #[test]
    fn step_failures_name_the_step() {
        let transport = || Error::Transport("HTTP 502 from https://api.github.com/graphql".to_owned());

        let error = Error::resolve(&revision("v1.0"), transport());
        assert_eq!(error.to_string(), "failed to resolve revision `v1.0`");
        assert_eq!(
            error.source().map(ToString::to_string).as_deref(),
            Some("backend request failed: HTTP 502 from https://api.github.com/graphql")
        );

        let error = Error::fetch(&revision("v1.0"), "go.mod", transport());
        assert_eq!(error.to_string(), "failed to fetch `go.mod` at `v1.0`");
        assert!(error.source().is_some());
    }

    #[test]
    fn not_found_errors_are_passed_through() {
        let error = Error::resolve(
            &revision("v1.0"),
            Error::RevisionNotFound {
                revision: revision("v1.0"),
            },
        );
        assert!(matches!(error, Error::RevisionNotFound { .. }));

        let error = Error::fetch(
            &revision("v1.0"),
            "go.mod",
            Error::FileNotFound {
                revision: revision("v1.0"),
                path: "go.mod".to_owned(),
            },
        );
        assert!(matches!(error, Error::FileNotFound { .. }));

        let error = Error::history(Error::history(Error::Transport("reset".to_owned())));
        assert!(matches!(error, Error::HistoryQueryFailed(ref source) if matches!(**source, Error::Transport(_))));
    }
}
