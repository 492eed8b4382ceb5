// Copyright (C) 2026 by GiGa infosystems

//! The immutable configuration for a single run

use crate::backend::RepositoryCoordinates;
use crate::error::Error;
use ureq::http::Uri;

/// The GraphQL endpoint of the public GitHub instance
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";
/// The host of the public GitHub instance
pub const DEFAULT_HOST: &str = "github.com";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_MANIFEST_PATH: &str = "go.mod";

/// Everything needed to talk to the backend & locate the data in it
#[derive(Clone, Debug)]
pub struct Config {
    pub repository: RepositoryCoordinates,
    /// The GraphQL endpoint to send queries to
    pub endpoint: String,
    pub token: String,
    /// The branch the history is queried on
    pub branch: String,
    /// The path of the `go.mod` relative to the repository root
    pub manifest_path: String,
}

/// A repository URL split into its coordinates and the endpoint serving it
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RepositoryUrl {
    pub repository: RepositoryCoordinates,
    pub endpoint: String,
}

impl RepositoryUrl {
    /// Parse a repository URL such as `https://github.com/owner/name`.
    ///
    /// Hosts other than `github.com` are treated as GitHub Enterprise instances serving their
    /// GraphQL API at `/api/graphql`.
    pub fn parse(url: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| Error::InvalidRepositoryUrl {
            url: url.to_owned(),
            reason: reason.to_owned(),
        };

        let uri = url
            .parse::<Uri>()
            .map_err(|error| invalid(&error.to_string()))?;
        let scheme = uri.scheme_str().ok_or_else(|| invalid("missing scheme"))?;
        let authority = uri
            .authority()
            .ok_or_else(|| invalid("missing host"))?
            .as_str();

        let mut segments = uri.path().trim_matches('/').split('/');
        let (Some(owner), Some(name)) = (segments.next(), segments.next()) else {
            return Err(invalid("expected a path of the form `/owner/name`"));
        };
        if owner.is_empty() || name.is_empty() {
            return Err(invalid("expected a path of the form `/owner/name`"));
        }
        let name = name.strip_suffix(".git").unwrap_or(name);

        let endpoint = if uri.host() == Some(DEFAULT_HOST) {
            DEFAULT_ENDPOINT.to_owned()
        } else {
            format!("{scheme}://{authority}/api/graphql")
        };

        Ok(RepositoryUrl {
            repository: RepositoryCoordinates {
                owner: owner.to_owned(),
                name: name.to_owned(),
            },
            endpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn public_github_urls_use_the_default_endpoint() {
        let url = RepositoryUrl::parse("https://github.com/sapcc/keppel").unwrap();
        assert_eq!(
            url,
            RepositoryUrl {
                repository: RepositoryCoordinates {
                    owner: "sapcc".to_owned(),
                    name: "keppel".to_owned(),
                },
                endpoint: DEFAULT_ENDPOINT.to_owned(),
            }
        );
    }

    #[test]
    fn enterprise_urls_use_their_own_endpoint() {
        let url = RepositoryUrl::parse("https://github.example.com:8443/team/tool.git/").unwrap();
        assert_eq!(url.repository.owner, "team");
        assert_eq!(url.repository.name, "tool");
        assert_eq!(url.endpoint, "https://github.example.com:8443/api/graphql");
    }

    #[test]
    fn extra_path_segments_are_ignored() {
        let url = RepositoryUrl::parse("https://github.com/sapcc/keppel/tree/master").unwrap();
        assert_eq!(url.repository.to_string(), "sapcc/keppel");
    }

    #[test]
    fn urls_without_owner_and_name_are_rejected() {
        for url in ["https://github.com/", "https://github.com/sapcc", "github.com/a/b"] {
            assert!(
                matches!(
                    RepositoryUrl::parse(url),
                    Err(Error::InvalidRepositoryUrl { .. })
                ),
                "{url} should be rejected"
            );
        }
    }
}
