// Copyright (C) 2026 by GiGa infosystems

//! `gomod-changelog` is an application that generates a changelog between two revisions of a
//! repository hosted on GitHub, together with the changes to its `go.mod` file.
//!
//! The order of operations is:
//! * Resolve both revisions to their commit & commit date with a [`backend::Backend`]
//! * Fetch the commit history between both commit dates
//! * Fetch & parse the `go.mod` at both revisions with [`manifest::parse`]
//! * Get the differences between both manifests with [`diff::ManifestDiff`]
//!
//! All of this is sequenced by [`changelog::Changelog::generate`], and turned into text with
//! [`render`].
//!
//! The history is a date-bounded query on a single branch, not a graph difference between both
//! revisions. Merges & rebases can make commits show up (or not show up) unexpectedly.

use serde::Serialize;
use std::{fmt, str::FromStr};

/// A revision expression (such as a commit ID, a branch or a tag)
///
/// This is only checked to be non-empty, the backend is the sole authority on whether it is
/// valid.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn new(revision: impl Into<String>) -> Result<Self, error::Error> {
        let revision = revision.into();
        if revision.trim().is_empty() {
            return Err(error::Error::InvalidRevision);
        }
        Ok(Revision(revision))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The expression for the blob at `path` as of this revision (`revision:path`)
    pub fn file_expression(&self, path: &str) -> String {
        format!("{}:{}", self.0, path.trim_start_matches('/'))
    }
}

impl FromStr for Revision {
    type Err = error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Revision::new(s)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub mod backend;
pub mod changelog;
pub mod config;
pub mod diff;
pub mod error;
pub mod github;
pub mod manifest;
pub mod render;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_revisions_are_rejected() {
        assert!(matches!(
            Revision::new(""),
            Err(error::Error::InvalidRevision)
        ));
        assert!(matches!(
            "  ".parse::<Revision>(),
            Err(error::Error::InvalidRevision)
        ));
    }

    #[test]
    fn file_expression_joins_revision_and_path() {
        let revision = Revision::new("v1.2.0").unwrap();
        assert_eq!(revision.file_expression("go.mod"), "v1.2.0:go.mod");
        assert_eq!(revision.file_expression("/tools/go.mod"), "v1.2.0:tools/go.mod");
    }
}
