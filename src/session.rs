use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::{
    is_sensitive, DisplayRow, FileDescriptor, IgnoreMatcher, SelectionState, SelectionStatus,
    SessionError, ToggleOutcome, TreeScanner,
};
use crate::export::SnapshotExporter;

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub file_count: usize,
    pub total_tokens: u64,
}

/// One interactive run: the scanned file list and what the user picked.
///
/// Every mutation takes `&mut self`, so a toggle (stat, then update) always
/// finishes before the next one can start.
pub struct Session {
    root: PathBuf,
    files: Vec<FileDescriptor>,
    selection: SelectionState,
}

impl Session {
    /// Scans `root` and starts with nothing selected.
    ///
    /// Fails only if the root itself cannot be listed; unreadable
    /// sub-directories are skipped by the scanner.
    pub fn open(root: impl Into<PathBuf>, matcher: &IgnoreMatcher) -> Result<Self, SessionError> {
        let root = root.into();
        fs::read_dir(&root).map_err(|source| SessionError::UnreadableRoot {
            path: root.clone(),
            source,
        })?;

        let files: Vec<FileDescriptor> = TreeScanner::new(&root, matcher).scan().collect();
        info!(
            root = %root.display(),
            files = files.len(),
            ignore_rules = matcher.project_rule_count(),
            "scan complete"
        );

        Ok(Self::with_files(root, files))
    }

    pub fn with_files(root: impl Into<PathBuf>, files: Vec<FileDescriptor>) -> Self {
        let root = root.into();
        Self {
            selection: SelectionState::new(&root),
            root,
            files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn status(&self) -> SelectionStatus {
        self.selection.status()
    }

    pub fn row(&self, index: usize) -> Option<DisplayRow<'_>> {
        self.files.get(index).map(|file| DisplayRow {
            path: &file.path,
            selected: self.selection.is_selected(&file.path),
            sensitive: is_sensitive(&file.path),
            is_binary: file.is_binary,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = DisplayRow<'_>> + '_ {
        (0..self.files.len()).filter_map(|i| self.row(i))
    }

    /// Toggles the file at `index` in the scanned list, refusing sensitive files.
    pub fn toggle(&mut self, index: usize) -> Result<ToggleOutcome, SessionError> {
        let file = self
            .files
            .get(index)
            .ok_or(SessionError::NoSuchFile(index))?;

        if is_sensitive(&file.path) {
            debug!(path = %file.path, "refused sensitive file");
            return Err(SessionError::SensitiveFile(file.path.clone()));
        }

        Ok(self.selection.toggle_file(&file.path))
    }

    /// Selects every scanned file that is not sensitive. Returns how many.
    pub fn select_all(&mut self) -> usize {
        let safe: Vec<&str> = self
            .files
            .iter()
            .map(|f| f.path.as_str())
            .filter(|p| !is_sensitive(p))
            .collect();

        self.selection.select_all(&safe);
        debug!(
            selected = safe.len(),
            tokens = self.selection.total_tokens(),
            "selected all"
        );
        safe.len()
    }

    pub fn clear(&mut self) {
        self.selection.clear_selection();
    }

    /// Hands the sorted selection to `exporter`.
    ///
    /// An empty selection is rejected without calling the exporter. The
    /// selection is left as it was whether or not the export succeeds.
    pub fn export(&self, exporter: &dyn SnapshotExporter) -> Result<ExportReport, SessionError> {
        if self.selection.is_empty() {
            return Err(SessionError::NothingSelected);
        }

        let files = self.selection.sorted_selection();
        let path = exporter.export(&self.root, &files)?;

        Ok(ExportReport {
            path,
            file_count: files.len(),
            total_tokens: self.selection.total_tokens(),
        })
    }
}
