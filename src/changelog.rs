// Copyright (C) 2026 by GiGa infosystems

//! Assemble a [`Changelog`] from the data of a [`Backend`]

use crate::Revision;
use crate::backend::{Backend, CommitRecord, ResolvedRevision};
use crate::config::Config;
use crate::diff::ManifestDiff;
use crate::error::Error;
use crate::manifest::{self, ParsedManifest};
use serde::Serialize;
use tracing::{debug, info};

/// A revision as given by the user, together with the commit it resolved to
#[derive(Clone, Debug, Serialize)]
pub struct RevisionBound {
    pub revision: Revision,
    pub oid: String,
    pub committed_date: chrono::DateTime<chrono::Utc>,
}

impl RevisionBound {
    fn new(revision: &Revision, resolved: ResolvedRevision) -> Self {
        RevisionBound {
            revision: revision.clone(),
            oid: resolved.oid,
            committed_date: resolved.committed_date,
        }
    }

    /// Whether `commit` is the commit this bound refers to
    fn is(&self, commit: &CommitRecord) -> bool {
        commit.oid == self.oid || commit.oid == self.revision.as_str()
    }
}

/// Everything shown in the final report
#[derive(Clone, Debug, Serialize)]
pub struct Changelog {
    pub from: RevisionBound,
    pub to: RevisionBound,
    /// The commits after `from` up to & including `to`, in the order of the backend
    pub commits: Vec<CommitRecord>,
    /// The path of the diffed `go.mod`
    pub manifest_path: String,
    #[serde(flatten)]
    pub diff: ManifestDiff,
}

impl Changelog {
    /// Generate the changelog between `from` & `to`.
    ///
    /// Every request is made one after the other, and the first failing one aborts the whole
    /// run.
    pub fn generate(
        backend: &impl Backend,
        config: &Config,
        from: &Revision,
        to: &Revision,
    ) -> Result<Self, Error> {
        let repository = &config.repository;

        let resolve = |revision: &Revision| {
            backend
                .resolve(repository, revision)
                .map(|resolved| RevisionBound::new(revision, resolved))
                .map_err(|error| Error::resolve(revision, error))
        };
        let from = resolve(from)?;
        let to = resolve(to)?;
        info!(
            "generating changelog for {repository} from {} ({}) to {} ({})",
            from.oid, from.committed_date, to.oid, to.committed_date
        );

        // NOTE: The history query includes commits at the `since` date, so the commit `from`
        // points to shows up here. Commit dates can collide, so it's excluded by ID.
        let commits = backend
            .history(
                repository,
                &config.branch,
                from.committed_date,
                to.committed_date,
            )
            .map_err(Error::history)?
            .into_iter()
            .filter(|commit| !from.is(commit))
            .collect::<Vec<_>>();
        debug!("{} commits in range", commits.len());

        let old = Self::fetch_manifest(backend, config, &from.revision)?;
        let new = Self::fetch_manifest(backend, config, &to.revision)?;
        let diff = ManifestDiff::between(&old, &new);
        debug!("{} dependency changes", diff.changes.len());

        Ok(Changelog {
            from,
            to,
            commits,
            manifest_path: config.manifest_path.clone(),
            diff,
        })
    }

    fn fetch_manifest(
        backend: &impl Backend,
        config: &Config,
        revision: &Revision,
    ) -> Result<ParsedManifest, Error> {
        let contents = backend
            .fetch_file(&config.repository, revision, &config.manifest_path)
            .map_err(|error| Error::fetch(revision, &config.manifest_path, error))?;
        manifest::parse(&contents).map_err(|source| Error::ManifestParse {
            name: revision.file_expression(&config.manifest_path),
            source,
        })
    }
}
