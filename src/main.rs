// Copyright (C) 2026 by GiGa infosystems

use std::path::PathBuf;

use clap::Parser;
use color_eyre::{
    Result,
    eyre::{Report, WrapErr, bail},
};

use gomod_changelog::Revision;
use gomod_changelog::backend::RepositoryCoordinates;
use gomod_changelog::changelog::Changelog;
use gomod_changelog::config::{
    Config, DEFAULT_BRANCH, DEFAULT_ENDPOINT, DEFAULT_MANIFEST_PATH, RepositoryUrl,
};
use gomod_changelog::github::GitHubBackend;
use gomod_changelog::render::{Renderer, TemplateContext};

/// This program prints the commits between two revisions of a GitHub repository, followed by the
/// changes made to its `go.mod` file (`go` version & required modules).
///
/// The commits are taken from the history of `--branch` between the commit dates of both
/// revisions, excluding the older revision itself.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The older revision (commit ID, branch or tag)
    from: Revision,
    /// The newer revision (commit ID, branch or tag)
    to: Revision,
    /// A personal GitHub access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,
    /// The path to the `go.mod` file in the repository
    #[arg(long, default_value = DEFAULT_MANIFEST_PATH)]
    go_mod_file: String,
    /// The branch to generate the changelog for
    #[arg(long, default_value = DEFAULT_BRANCH)]
    branch: String,
    /// The owner of the repository
    #[arg(long)]
    repo_owner: Option<String>,
    /// The name of the repository
    #[arg(long)]
    repo_name: Option<String>,
    /// The URL of the repository, overrides `--repo-owner` and `--repo-name`
    ///
    /// Hosts other than `github.com` are queried as GitHub Enterprise instances.
    #[arg(long)]
    repo_url: Option<String>,
    /// Disable color output
    #[arg(long)]
    no_color: bool,
    /// The path to a directory containing a `changelog.jinja` minijinja template
    ///
    /// The template replaces the built-in output format. Its context contains `from` & `to`
    /// (with `revision`, `oid` & `committed_date`), `commits` (with `oid` & `message`),
    /// `manifest_path`, `toolchain` (with `old_version` & `new_version`, if the `go` version
    /// changed) and `changes` (with `kind` being one of `version_changed`, `removed` or `added`,
    /// `path`, and `old_version` & `new_version` for version changes).
    ///
    /// Extra functions implemented:
    /// * `headline` (filter): The first line of a commit message
    #[arg(short = 'T', long, verbatim_doc_comment)]
    template_path: Option<PathBuf>,
    /// Log the requests made to GitHub (see also `GOMOD_CHANGELOG_LOG`)
    #[arg(short, long)]
    verbose: bool,
}

struct AppContext {
    config: Config,
    from: Revision,
    to: Revision,
    renderer: Renderer,
}

impl TryFrom<Args> for AppContext {
    type Error = Report;

    fn try_from(args: Args) -> Result<Self> {
        let (repository, endpoint) = match (args.repo_url, args.repo_owner, args.repo_name) {
            (Some(url), _, _) => {
                let url = RepositoryUrl::parse(&url)?;
                (url.repository, url.endpoint)
            }
            (None, Some(owner), Some(name)) => (
                RepositoryCoordinates { owner, name },
                DEFAULT_ENDPOINT.to_owned(),
            ),
            _ => bail!("Either `--repo-url` or `--repo-owner` & `--repo-name` are required"),
        };

        let colors = !args.no_color && console::colors_enabled();
        let renderer = Renderer::new(colors, TemplateContext::init(args.template_path)?);

        Ok(AppContext {
            config: Config {
                repository,
                endpoint,
                token: args.github_token,
                branch: args.branch,
                manifest_path: args.go_mod_file,
            },
            from: args.from,
            to: args.to,
            renderer,
        })
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("GOMOD_CHANGELOG_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(args.verbose);

    let ctx = AppContext::try_from(args)?;
    let backend = GitHubBackend::from_config(&ctx.config);

    // NOTE: Nothing is printed before everything was fetched, a failure at any step means no
    // output at all
    let changelog = Changelog::generate(&backend, &ctx.config, &ctx.from, &ctx.to)
        .wrap_err_with(|| {
            format!(
                "Failed to generate the changelog for {}",
                ctx.config.repository
            )
        })?;

    print!("{}", ctx.renderer.render(&changelog)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(args: &[&str]) -> Result<AppContext> {
        let args = Args::try_parse_from(
            ["gomod-changelog", "--github-token", "secret"]
                .iter()
                .chain(args),
        )?;
        AppContext::try_from(args)
    }

    #[test]
    fn owner_and_name_use_the_public_endpoint() {
        let ctx = context(&["--repo-owner", "sapcc", "--repo-name", "keppel", "v1", "v2"]).unwrap();
        assert_eq!(ctx.config.repository.to_string(), "sapcc/keppel");
        assert_eq!(ctx.config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(ctx.config.branch, "master");
        assert_eq!(ctx.config.manifest_path, "go.mod");
        assert_eq!(ctx.from.as_str(), "v1");
        assert_eq!(ctx.to.as_str(), "v2");
    }

    #[test]
    fn repository_url_overrides_owner_and_name() {
        let ctx = context(&[
            "--repo-owner",
            "sapcc",
            "--repo-name",
            "keppel",
            "--repo-url",
            "https://github.example.com/team/tool",
            "--branch",
            "main",
            "--go-mod-file",
            "tools/go.mod",
            "v1",
            "v2",
        ])
        .unwrap();
        assert_eq!(ctx.config.repository.to_string(), "team/tool");
        assert_eq!(ctx.config.endpoint, "https://github.example.com/api/graphql");
        assert_eq!(ctx.config.branch, "main");
        assert_eq!(ctx.config.manifest_path, "tools/go.mod");
    }

    #[test]
    fn repository_url_overrides_an_incomplete_owner_and_name() {
        let ctx = context(&[
            "--repo-url",
            "https://github.com/sapcc/keppel.git",
            "--repo-owner",
            "someone",
            "v1",
            "v2",
        ])
        .unwrap();
        assert_eq!(ctx.config.repository.to_string(), "sapcc/keppel");
        assert_eq!(ctx.config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn a_repository_is_required() {
        assert!(context(&["v1", "v2"]).is_err());
        assert!(context(&["--repo-owner", "sapcc", "v1", "v2"]).is_err());
        assert!(context(&["--repo-name", "keppel", "v1", "v2"]).is_err());
    }

    #[test]
    fn both_revisions_are_required() {
        assert!(context(&["--repo-owner", "sapcc", "--repo-name", "keppel", "v1"]).is_err());
        assert!(context(&["--repo-owner", "sapcc", "--repo-name", "keppel", "", "v2"]).is_err());
    }
}
