// Copyright (C) 2026 by GiGa infosystems

//! Turn a [`Changelog`] into the text shown to the user, either with the built-in format or a
//! user supplied [minijinja] template

use crate::changelog::Changelog;
use crate::diff::DependencyChange;
use color_eyre::{Result, eyre::bail};
use console::Style;
use std::fmt::Write;
use std::path::PathBuf;

/// User supplied templates, if any
pub enum TemplateContext {
    Minijinja {
        path: PathBuf,
        jinja: Box<minijinja::Environment<'static>>,
    },
    OnlyDefaults,
}

impl TemplateContext {
    /// The name of the template replacing the built-in format
    pub const CHANGELOG: &str = "changelog.jinja";

    pub fn init(path: Option<PathBuf>) -> Result<Self> {
        match path {
            None => Ok(TemplateContext::OnlyDefaults),
            Some(path) => {
                if !path.is_dir() {
                    bail!("Template directory doesn't exist");
                }

                let mut jinja = minijinja::Environment::new();
                jinja.set_loader(minijinja::path_loader(&path));
                jinja.add_filter("headline", |message: String| {
                    message.lines().next().unwrap_or_default().to_owned()
                });

                Ok(TemplateContext::Minijinja {
                    path,
                    jinja: Box::new(jinja),
                })
            }
        }
    }

    fn render(&self, name: &str, changelog: &Changelog) -> Result<Option<String>> {
        match self {
            TemplateContext::Minijinja { path, jinja } if path.join(name).is_file() => {
                Ok(Some(jinja.get_template(name)?.render(changelog)?))
            }
            TemplateContext::Minijinja { .. } | TemplateContext::OnlyDefaults => Ok(None),
        }
    }
}

/// The styles used by the built-in format
struct Styles {
    message: Style,
    changed: Style,
    removed: Style,
    added: Style,
}

impl Styles {
    fn new(colors: bool) -> Self {
        let style = || Style::new().force_styling(colors);
        Styles {
            message: style().yellow(),
            changed: style().yellow(),
            removed: style().red(),
            added: style().green(),
        }
    }
}

pub struct Renderer {
    colors: bool,
    templates: TemplateContext,
}

impl Renderer {
    pub fn new(colors: bool, templates: TemplateContext) -> Self {
        Renderer { colors, templates }
    }

    /// Render with the `changelog.jinja` template if there is one, otherwise with
    /// [`render_text`]
    pub fn render(&self, changelog: &Changelog) -> Result<String> {
        match self.templates.render(TemplateContext::CHANGELOG, changelog)? {
            Some(out) => Ok(out),
            None => Ok(render_text(changelog, self.colors)),
        }
    }
}

/// The built-in format: one line per commit, then one line per change to the manifest
pub fn render_text(changelog: &Changelog, colors: bool) -> String {
    let styles = Styles::new(colors);
    let mut out = String::new();

    // NOTE: Writing to a `String` can't fail
    let _ = writeln!(out, "Changelog:");
    for commit in &changelog.commits {
        let _ = writeln!(
            out,
            "  {} {}",
            commit.oid,
            styles.message.apply_to(commit.headline())
        );
    }

    let _ = writeln!(out, "Changes in {}:", changelog.manifest_path);
    if let Some(ref toolchain) = changelog.diff.toolchain {
        let line = format!(
            "go version changed from {} to {}",
            toolchain.old_version, toolchain.new_version
        );
        let _ = writeln!(out, "  {}", styles.changed.apply_to(line));
    }

    for change in &changelog.diff.changes {
        let _ = match change {
            DependencyChange::VersionChanged {
                path,
                old_version,
                new_version,
            } => writeln!(
                out,
                "  {} version changed from {old_version} to {new_version}",
                styles.changed.apply_to(path)
            ),
            DependencyChange::Removed { path } => {
                writeln!(out, "  {} removed", styles.removed.apply_to(path))
            }
            DependencyChange::Added { path } => {
                writeln!(out, "  {} added", styles.added.apply_to(path))
            }
        };
    }

    out
}
