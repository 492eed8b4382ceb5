// Copyright (C) 2026 by GiGa infosystems

//! A [`Backend`] talking to the GitHub GraphQL API

use crate::Revision;
use crate::backend::{Backend, CommitRecord, RepositoryCoordinates, ResolvedRevision};
use crate::config::Config;
use crate::error::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

const USER_AGENT: &str = concat!("gomod-changelog/", env!("CARGO_PKG_VERSION"));

/// The number of commits requested per history page (the maximum GitHub allows)
const HISTORY_PAGE_SIZE: u32 = 100;

const RESOLVE_QUERY: &str = r"
query($owner: String!, $name: String!, $expression: String!) {
  repository(owner: $owner, name: $name) {
    object(expression: $expression) {
      ... on Commit { oid committedDate }
      ... on Tag { target { ... on Commit { oid committedDate } } }
    }
  }
}";

const HISTORY_QUERY: &str = r"
query($owner: String!, $name: String!, $branch: String!, $since: GitTimestamp!, $until: GitTimestamp!, $first: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    object(expression: $branch) {
      ... on Commit {
        history(since: $since, until: $until, first: $first, after: $cursor) {
          nodes { oid message }
          pageInfo { hasNextPage endCursor }
        }
      }
    }
  }
}";

const BLOB_QUERY: &str = r"
query($owner: String!, $name: String!, $expression: String!) {
  repository(owner: $owner, name: $name) {
    object(expression: $expression) {
      ... on Blob { isBinary text }
    }
  }
}";

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct RepositoryData<T> {
    repository: Option<RepositoryObject<T>>,
}

#[derive(Deserialize)]
struct RepositoryObject<T> {
    object: Option<T>,
}

/// A commit, or an annotated tag pointing to one
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitObject {
    oid: Option<String>,
    committed_date: Option<DateTime<Utc>>,
    target: Option<Box<CommitObject>>,
}

impl CommitObject {
    fn peel(self) -> Option<ResolvedRevision> {
        match (self.oid, self.committed_date) {
            (Some(oid), Some(committed_date)) => Some(ResolvedRevision {
                oid,
                committed_date,
            }),
            _ => self.target.and_then(|target| target.peel()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryConnection {
    nodes: Vec<CommitRecord>,
    page_info: PageInfo,
}

#[derive(Deserialize)]
struct HistoryObject {
    history: Option<HistoryConnection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobObject {
    is_binary: Option<bool>,
    text: Option<String>,
}

fn git_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A client for the GraphQL API of github.com or a GitHub Enterprise instance
pub struct GitHubBackend {
    endpoint: String,
    token: String,
    agent: ureq::Agent,
}

impl GitHubBackend {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        GitHubBackend {
            endpoint: endpoint.into(),
            token: token.into(),
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        GitHubBackend::new(config.endpoint.clone(), config.token.clone())
    }

    /// Run a GraphQL query, failing on HTTP errors & on any errors reported in the response
    fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, Error> {
        let body = json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .agent
            .post(&self.endpoint)
            .header("Authorization", &format!("bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .send_json(&body);

        let mut response = match response {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(code)) => {
                return Err(Error::Transport(format!(
                    "HTTP {code} from {}",
                    self.endpoint
                )));
            }
            Err(error) => return Err(Error::Transport(error.to_string())),
        };

        let response = response
            .body_mut()
            .read_json::<GraphQlResponse<T>>()
            .map_err(|error| Error::Transport(format!("invalid GraphQL response: {error}")))?;

        if !response.errors.is_empty() {
            let messages = response
                .errors
                .iter()
                .map(|error| error.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::Transport(messages));
        }

        response
            .data
            .ok_or_else(|| Error::Transport("GraphQL response contained no data".to_owned()))
    }

    /// Look up `object(expression: ...)` in a repository
    fn object<T: DeserializeOwned>(
        &self,
        repository: &RepositoryCoordinates,
        query: &str,
        mut variables: serde_json::Value,
    ) -> Result<Option<T>, Error> {
        variables["owner"] = json!(repository.owner);
        variables["name"] = json!(repository.name);

        let data = self.query::<RepositoryData<T>>(query, variables)?;
        let repository_object = data
            .repository
            .ok_or_else(|| Error::Transport(format!("repository {repository} not found")))?;
        Ok(repository_object.object)
    }

    fn history_pages(
        &self,
        repository: &RepositoryCoordinates,
        branch: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CommitRecord>, Error> {
        let mut commits = Vec::new();
        let mut cursor = None::<String>;

        loop {
            let object = self.object::<HistoryObject>(
                repository,
                HISTORY_QUERY,
                json!({
                    "branch": branch,
                    "since": git_timestamp(since),
                    "until": git_timestamp(until),
                    "first": HISTORY_PAGE_SIZE,
                    "cursor": cursor,
                }),
            )?;

            let history = object
                .and_then(|object| object.history)
                .ok_or_else(|| Error::Transport(format!("branch `{branch}` not found")))?;

            debug!("received {} commits", history.nodes.len());
            commits.extend(history.nodes);

            match history.page_info {
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(end_cursor),
                } => cursor = Some(end_cursor),
                _ => break,
            }
        }

        Ok(commits)
    }
}

impl Backend for GitHubBackend {
    fn resolve(
        &self,
        repository: &RepositoryCoordinates,
        revision: &Revision,
    ) -> Result<ResolvedRevision, Error> {
        debug!("resolving `{revision}` in {repository}");
        let object = self.object::<CommitObject>(
            repository,
            RESOLVE_QUERY,
            json!({ "expression": revision.as_str() }),
        )?;

        object
            .and_then(CommitObject::peel)
            .ok_or_else(|| Error::RevisionNotFound {
                revision: revision.clone(),
            })
    }

    fn history(
        &self,
        repository: &RepositoryCoordinates,
        branch: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CommitRecord>, Error> {
        debug!("querying history of `{branch}` in {repository} from {since} to {until}");
        self.history_pages(repository, branch, since, until)
            .map_err(Error::history)
    }

    fn fetch_file(
        &self,
        repository: &RepositoryCoordinates,
        revision: &Revision,
        path: &str,
    ) -> Result<Vec<u8>, Error> {
        let expression = revision.file_expression(path);
        debug!("fetching `{expression}` from {repository}");

        let not_found = || Error::FileNotFound {
            revision: revision.clone(),
            path: path.to_owned(),
        };

        let blob = self
            .object::<BlobObject>(repository, BLOB_QUERY, json!({ "expression": expression }))?
            .ok_or_else(not_found)?;

        match blob {
            BlobObject {
                is_binary: None, ..
            } => Err(not_found()),
            BlobObject {
                text: Some(text), ..
            } => {
                debug!("received {} bytes", text.len());
                Ok(text.into_bytes())
            }
            BlobObject { text: None, .. } => Err(Error::Transport(format!(
                "`{expression}` is a binary file"
            ))),
        }
    }
}
