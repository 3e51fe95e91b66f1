use std::path::{Component, Path};

use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, warn};

/// Project ignore file read from the scan root.
pub const IGNORE_FILE: &str = ".gitignore";

/// Scratch directory d2f creates under the root (logs, in-flight snapshots).
pub const TEMP_DIR: &str = ".d2f_tmp";

pub const DEFAULT_OUTPUT_FILE: &str = "d2f_dump.txt";

/// Always excluded, whatever the project ignore file says.
pub const BUILTIN_EXCLUDES: &[&str] = &[
    ".git",
    "node_modules",
    ".env",
    "dist",
    "out",
    TEMP_DIR,
    DEFAULT_OUTPUT_FILE,
];

/// Exclusion predicate over root-relative paths.
///
/// The built-in floor and the project's ignore file are compiled into two
/// separate matchers so that a negated project pattern (`!node_modules`)
/// can never re-include something from the floor.
pub struct IgnoreMatcher {
    builtin: Gitignore,
    project: Gitignore,
    /// Literal root-relative paths (custom output files), never globs.
    extra: Vec<String>,
}

impl IgnoreMatcher {
    pub fn build(root: &Path) -> Result<Self> {
        Self::with_extra_excludes(root, &[])
    }

    /// Like [`IgnoreMatcher::build`], with additional files added to the
    /// non-negotiable floor (for instance a custom output file).
    ///
    /// Extra entries are literal paths relative to `root`, the same way the
    /// exporter resolves them with `root.join(..)`. Glob and comment syntax
    /// has no meaning here, so `notes[1].md` or `#out.txt` match only that
    /// exact file.
    pub fn with_extra_excludes(root: &Path, extra: &[String]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in BUILTIN_EXCLUDES {
            builder
                .add_line(None, pattern)
                .with_context(|| format!("invalid built-in exclude '{pattern}'"))?;
        }
        let builtin = builder
            .build()
            .context("failed to compile built-in excludes")?;

        let extra = extra
            .iter()
            .filter_map(|name| {
                let normalized = normalize_extra(root, name);
                if normalized.is_none() {
                    debug!(name = %name, "extra exclude is outside the root, nothing to skip");
                }
                normalized
            })
            .collect();

        Ok(Self {
            builtin,
            project: load_project_ignore(root),
            extra,
        })
    }

    /// Returns true when `relative_path` (or any of its parent directories)
    /// is excluded. Directories and files go through the same test.
    pub fn ignores(&self, relative_path: &str, is_dir: bool) -> bool {
        if relative_path.is_empty() {
            return false;
        }

        if self.extra.iter().any(|extra| {
            relative_path == extra
                || relative_path
                    .strip_prefix(extra.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        }) {
            return true;
        }

        let path = Path::new(relative_path);
        self.builtin
            .matched_path_or_any_parents(path, is_dir)
            .is_ignore()
            || self
                .project
                .matched_path_or_any_parents(path, is_dir)
                .is_ignore()
    }

    pub fn project_rule_count(&self) -> usize {
        self.project.num_ignores() as usize + self.project.num_whitelists() as usize
    }
}

/// Turns a user-supplied file name into the `/`-separated path the scanner
/// would report for it, or `None` if it does not land inside `root`.
fn normalize_extra(root: &Path, name: &str) -> Option<String> {
    let path = Path::new(name);
    let path = if path.is_absolute() {
        path.strip_prefix(root).ok()?
    } else {
        path
    };

    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

fn load_project_ignore(root: &Path) -> Gitignore {
    let ignore_path = root.join(IGNORE_FILE);
    if !ignore_path.is_file() {
        debug!(path = %ignore_path.display(), "no project ignore file");
        return Gitignore::empty();
    }

    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(&ignore_path) {
        // Bad lines are reported but the valid ones are still kept.
        warn!(path = %ignore_path.display(), error = %err, "problem reading ignore file");
    }

    match builder.build() {
        Ok(gitignore) => gitignore,
        Err(err) => {
            warn!(path = %ignore_path.display(), error = %err, "ignoring unusable ignore file");
            Gitignore::empty()
        }
    }
}
