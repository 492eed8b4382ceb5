// Copyright (C) 2026 by GiGa infosystems

//! The interface to the repository hosting backend, see [`Backend`]

use crate::Revision;
use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The owner & name of a hosted repository
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct RepositoryCoordinates {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepositoryCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A revision resolved to the commit it points to
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ResolvedRevision {
    /// The full commit ID
    pub oid: String,
    pub committed_date: DateTime<Utc>,
}

/// A single commit of the history
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CommitRecord {
    pub oid: String,
    pub message: String,
}

impl CommitRecord {
    /// The first line of the commit message
    pub fn headline(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// A repository hosting backend.
///
/// Every method is a single request/response exchange (apart from draining paginated results),
/// nothing gets retried or cached. Not finding the requested object is reported separately from
/// failing to talk to the backend.
pub trait Backend {
    /// Resolve a revision to its commit, failing with [`Error::RevisionNotFound`] if the backend
    /// has no matching object.
    fn resolve(
        &self,
        repository: &RepositoryCoordinates,
        revision: &Revision,
    ) -> Result<ResolvedRevision, Error>;

    /// List all commits on `branch` committed within `since..=until`, in the order of the
    /// backend.
    fn history(
        &self,
        repository: &RepositoryCoordinates,
        branch: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CommitRecord>, Error>;

    /// Fetch the contents of the file at `path` as of `revision`, failing with
    /// [`Error::FileNotFound`] if it doesn't exist.
    fn fetch_file(
        &self,
        repository: &RepositoryCoordinates,
        revision: &Revision,
        path: &str,
    ) -> Result<Vec<u8>, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_is_the_first_line() {
        let commit = CommitRecord {
            oid: "abc".to_owned(),
            message: "Bump deps\n\nLonger explanation".to_owned(),
        };
        assert_eq!(commit.headline(), "Bump deps");

        let empty = CommitRecord {
            oid: "abc".to_owned(),
            message: String::new(),
        };
        assert_eq!(empty.headline(), "");
    }
}
