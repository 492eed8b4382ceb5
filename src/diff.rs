// Copyright (C) 2026 by GiGa infosystems

//! Generate a diff between two [`ParsedManifest`]s, see [`ManifestDiff::between`].

use crate::manifest::{ParsedManifest, Requirement};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A change of the `go` directive
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ToolchainChange {
    pub old_version: String,
    pub new_version: String,
}

/// A change to a single requirement, keyed by its module path
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DependencyChange {
    VersionChanged {
        path: String,
        old_version: String,
        new_version: String,
    },
    Removed {
        path: String,
    },
    Added {
        path: String,
    },
}

impl DependencyChange {
    pub fn path(&self) -> &str {
        match self {
            DependencyChange::VersionChanged { path, .. }
            | DependencyChange::Removed { path }
            | DependencyChange::Added { path } => path,
        }
    }
}

/// The differences between two manifests
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
pub struct ManifestDiff {
    /// Only present if both manifests declare a `go` version and they differ textually
    pub toolchain: Option<ToolchainChange>,
    /// Version changes & removals in the order of the old manifest, followed by additions in the
    /// order of the new manifest
    pub changes: Vec<DependencyChange>,
}

impl ManifestDiff {
    /// Returns the differences between two [`ParsedManifest`]s.
    ///
    /// Versions are compared as plain strings. If a manifest lists a path more than once, the
    /// first occurrence is the one compared against.
    pub fn between(old: &ParsedManifest, new: &ParsedManifest) -> Self {
        let toolchain = match (&old.go_version, &new.go_version) {
            (Some(old_version), Some(new_version)) if old_version != new_version => {
                Some(ToolchainChange {
                    old_version: old_version.clone(),
                    new_version: new_version.clone(),
                })
            }
            _ => None,
        };

        let mut new_by_path = HashMap::<&str, &Requirement>::new();
        for requirement in &new.requirements {
            new_by_path
                .entry(requirement.path.as_str())
                .or_insert(requirement);
        }

        let mut seen_old = HashSet::new();
        let changed_or_removed = old
            .requirements
            .iter()
            .filter(|requirement| seen_old.insert(requirement.path.as_str()))
            .filter_map(|requirement| match new_by_path.get(requirement.path.as_str()) {
                None => Some(DependencyChange::Removed {
                    path: requirement.path.clone(),
                }),
                Some(new) if new.version != requirement.version => {
                    Some(DependencyChange::VersionChanged {
                        path: requirement.path.clone(),
                        old_version: requirement.version.clone(),
                        new_version: new.version.clone(),
                    })
                }
                Some(_) => None,
            })
            .collect::<Vec<_>>();

        let mut seen_new = HashSet::new();
        let added = new
            .requirements
            .iter()
            .filter(|requirement| !seen_old.contains(requirement.path.as_str()))
            .filter(|requirement| seen_new.insert(requirement.path.as_str()))
            .map(|requirement| DependencyChange::Added {
                path: requirement.path.clone(),
            });

        let mut changes = changed_or_removed;
        changes.extend(added);

        ManifestDiff { toolchain, changes }
    }

    pub fn is_empty(&self) -> bool {
        self.toolchain.is_none() && self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn manifest(go_version: Option<&str>, requirements: &[(&str, &str)]) -> ParsedManifest {
        ParsedManifest {
            go_version: go_version.map(str::to_owned),
            requirements: requirements
                .iter()
                .map(|(path, version)| Requirement {
                    path: (*path).to_owned(),
                    version: (*version).to_owned(),
                    indirect: false,
                })
                .collect(),
            ..ParsedManifest::default()
        }
    }

    fn removed(path: &str) -> DependencyChange {
        DependencyChange::Removed {
            path: path.to_owned(),
        }
    }

    fn added(path: &str) -> DependencyChange {
        DependencyChange::Added {
            path: path.to_owned(),
        }
    }

    fn changed(path: &str, old_version: &str, new_version: &str) -> DependencyChange {
        DependencyChange::VersionChanged {
            path: path.to_owned(),
            old_version: old_version.to_owned(),
            new_version: new_version.to_owned(),
        }
    }

    #[test]
    fn classifies_removed_changed_and_added() {
        let old = manifest(Some("1.20"), &[("mod/x", "1.0"), ("mod/y", "2.0")]);
        let new = manifest(Some("1.21"), &[("mod/y", "2.1"), ("mod/z", "1.0")]);

        assert_eq!(
            ManifestDiff::between(&old, &new),
            ManifestDiff {
                toolchain: Some(ToolchainChange {
                    old_version: "1.20".to_owned(),
                    new_version: "1.21".to_owned(),
                }),
                changes: vec![
                    removed("mod/x"),
                    changed("mod/y", "2.0", "2.1"),
                    added("mod/z")
                ],
            }
        );
    }

    #[test]
    fn diffing_a_manifest_with_itself_is_empty() {
        let manifest = manifest(Some("1.21"), &[("a", "v1.0.0"), ("b", "v0.3.1")]);
        let diff = ManifestDiff::between(&manifest, &manifest);
        assert!(diff.is_empty());
        assert_eq!(diff, ManifestDiff::default());
    }

    #[test]
    fn order_follows_the_respective_manifest() {
        let old = manifest(
            None,
            &[("c", "1"), ("a", "1"), ("gone2", "1"), ("b", "1"), ("gone1", "1")],
        );
        let new = manifest(
            None,
            &[("new2", "1"), ("b", "2"), ("a", "2"), ("new1", "1"), ("c", "1")],
        );

        assert_eq!(
            ManifestDiff::between(&old, &new).changes,
            vec![
                changed("a", "1", "2"),
                removed("gone2"),
                changed("b", "1", "2"),
                removed("gone1"),
                added("new2"),
                added("new1"),
            ]
        );
    }

    #[test]
    fn empty_side_degenerates_to_all_added_or_removed() {
        let empty = manifest(Some("1.21"), &[]);
        let full = manifest(Some("1.21"), &[("a", "1"), ("b", "2")]);

        assert_eq!(
            ManifestDiff::between(&empty, &full).changes,
            vec![added("a"), added("b")]
        );
        assert_eq!(
            ManifestDiff::between(&full, &empty).changes,
            vec![removed("a"), removed("b")]
        );
    }

    #[test]
    fn toolchain_changes_need_both_versions() {
        let with = manifest(Some("1.21"), &[]);
        let without = manifest(None, &[]);

        assert_eq!(ManifestDiff::between(&with, &without).toolchain, None);
        assert_eq!(ManifestDiff::between(&without, &with).toolchain, None);
        assert_eq!(ManifestDiff::between(&without, &without).toolchain, None);
    }

    #[test]
    fn toolchain_versions_are_compared_textually() {
        // Semantically a downgrade, still reported
        let old = manifest(Some("1.21.0"), &[]);
        let new = manifest(Some("1.21"), &[]);
        assert_eq!(
            ManifestDiff::between(&old, &new).toolchain,
            Some(ToolchainChange {
                old_version: "1.21.0".to_owned(),
                new_version: "1.21".to_owned(),
            })
        );
    }

    #[test]
    fn versions_are_compared_textually() {
        let old = manifest(None, &[("a", "v1.0.0"), ("b", "v1.0.0+incompatible")]);
        let new = manifest(None, &[("a", "v1.0.0"), ("b", "v1.0.0")]);
        assert_eq!(
            ManifestDiff::between(&old, &new).changes,
            vec![changed("b", "v1.0.0+incompatible", "v1.0.0")]
        );
    }

    #[test]
    fn duplicate_paths_use_the_first_occurrence() {
        let old = manifest(None, &[("a", "1"), ("a", "2"), ("gone", "1"), ("gone", "1")]);
        let new = manifest(None, &[("a", "1"), ("a", "3"), ("new", "1"), ("new", "2")]);

        assert_eq!(
            ManifestDiff::between(&old, &new).changes,
            vec![removed("gone"), added("new")]
        );
    }

    #[test]
    fn no_path_is_reported_twice() {
        let old = manifest(None, &[("a", "1"), ("b", "1"), ("c", "1")]);
        let new = manifest(None, &[("b", "2"), ("c", "1"), ("d", "1")]);
        let diff = ManifestDiff::between(&old, &new);

        let mut paths = diff.changes.iter().map(DependencyChange::path).collect::<Vec<_>>();
        let total = paths.len();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), total);
        assert_eq!(paths, ["a", "b", "d"]);
    }
}
