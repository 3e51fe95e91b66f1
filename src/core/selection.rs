use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

use super::types::{SelectionStatus, ToggleOutcome};

/// Bytes per estimated token.
///
/// This is a coarse sizing heuristic, not a tokenizer: a file costs
/// `ceil(bytes / 4)` tokens regardless of its contents.
pub const BYTES_PER_TOKEN: u64 = 4;

/// The set of selected files and the running token estimate for them.
///
/// Each selected path remembers the cost it was charged when it was added,
/// and deselecting subtracts exactly that amount. `total_tokens` is therefore
/// always the sum of the recorded costs, even if a file changes size on disk
/// while it is selected.
#[derive(Debug)]
pub struct SelectionState {
    root: PathBuf,
    selected: HashMap<String, u64>,
    total_tokens: u64,
}

impl SelectionState {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            selected: HashMap::new(),
            total_tokens: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Flips `path` in or out of the selection.
    pub fn toggle_file(&mut self, path: &str) -> ToggleOutcome {
        if let Some(cost) = self.selected.remove(path) {
            self.total_tokens -= cost;
            return ToggleOutcome::Deselected;
        }

        let cost = self.estimate_tokens(path);
        self.selected.insert(path.to_string(), cost);
        self.total_tokens += cost;
        ToggleOutcome::Selected
    }

    /// Replaces the selection with exactly `paths`.
    ///
    /// Files are costed in parallel and the total is summed once every cost
    /// is known. Callers are expected to have filtered out sensitive files.
    pub fn select_all<S: AsRef<str> + Sync>(&mut self, paths: &[S]) {
        let selected: HashMap<String, u64> = paths
            .par_iter()
            .map(|p| {
                let path = p.as_ref();
                (path.to_string(), self.estimate_tokens(path))
            })
            .collect();

        self.total_tokens = selected.values().sum();
        self.selected = selected;
    }

    pub fn clear_selection(&mut self) {
        self.selected = HashMap::new();
        self.total_tokens = 0;
    }

    /// Estimated token cost of `path`, or zero if it cannot be stat'ed.
    pub fn estimate_tokens(&self, path: &str) -> u64 {
        match fs::metadata(self.root.join(path)) {
            Ok(metadata) => metadata.len().div_ceil(BYTES_PER_TOKEN),
            Err(err) => {
                debug!(path, error = %err, "could not stat file, counting as zero tokens");
                0
            }
        }
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selected.contains_key(path)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn status(&self) -> SelectionStatus {
        SelectionStatus {
            selected_count: self.selected.len(),
            total_tokens: self.total_tokens,
        }
    }

    /// Selected paths in ascending lexical order, independent of toggle order.
    pub fn sorted_selection(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.selected.keys().cloned().collect();
        paths.sort();
        paths
    }
}
