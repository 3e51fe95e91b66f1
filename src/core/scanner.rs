use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use super::binary::is_binary_path;
use super::ignore_rules::IgnoreMatcher;
use super::types::FileDescriptor;

/// Depth-first walk over a project root.
///
/// At every level sub-directories come before files and each group is in
/// case-sensitive byte order of the entry name. Symlinks are not followed,
/// so a link to a directory shows up as a plain file entry.
pub struct TreeScanner<'a> {
    root: PathBuf,
    matcher: &'a IgnoreMatcher,
}

impl<'a> TreeScanner<'a> {
    pub fn new(root: impl Into<PathBuf>, matcher: &'a IgnoreMatcher) -> Self {
        Self {
            root: root.into(),
            matcher,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts a fresh walk. Every call re-reads the file system.
    pub fn scan(&self) -> Scan<'_> {
        let root = self.root.clone();
        let matcher = self.matcher;
        let filter_root = root.clone();

        let walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by(compare_entries)
            .into_iter()
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                match relative_path(&filter_root, entry.path()) {
                    Some(rel) => !matcher.ignores(&rel, entry.file_type().is_dir()),
                    None => {
                        // Could not be named, selected or exported faithfully.
                        warn!(
                            path = %entry.path().display(),
                            "skipping entry with a non UTF-8 name"
                        );
                        false
                    }
                }
            });

        Scan {
            root,
            inner: Box::new(walker),
        }
    }
}

/// Lazy sequence of [`FileDescriptor`]s produced by [`TreeScanner::scan`].
pub struct Scan<'a> {
    root: PathBuf,
    inner: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + 'a>,
}

impl Iterator for Scan<'_> {
    type Item = FileDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    // An unreadable directory contributes nothing; siblings still get walked.
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    warn!(path = %path, error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if entry.depth() == 0 || entry.file_type().is_dir() {
                continue;
            }

            let Some(path) = relative_path(&self.root, entry.path()) else {
                continue;
            };

            return Some(FileDescriptor {
                is_binary: is_binary_path(entry.path()),
                path,
            });
        }
    }
}

fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.file_type().is_dir();
    let b_dir = b.file_type().is_dir();
    b_dir
        .cmp(&a_dir)
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Root-relative path with `/` separators.
///
/// `None` if `path` is not under `root` or any component is not valid UTF-8.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let segments = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(segments.join("/"))
}
