/// A file discovered by the scanner.
///
/// `path` is relative to the scan root and always uses `/` between segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileDescriptor {
    pub path: String,
    pub is_binary: bool,
}

/// Live counters the UI polls after every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStatus {
    pub selected_count: usize,
    pub total_tokens: u64,
}

impl SelectionStatus {
    pub fn level(&self, warn_tokens: u64, danger_tokens: u64) -> TokenLevel {
        if self.total_tokens > danger_tokens {
            TokenLevel::Danger
        } else if self.total_tokens > warn_tokens {
            TokenLevel::Warn
        } else {
            TokenLevel::Ok
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLevel {
    Ok,
    Warn,
    Danger,
}

/// What the picker needs to draw a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow<'a> {
    pub path: &'a str,
    pub selected: bool,
    pub sensitive: bool,
    pub is_binary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
}

impl ToggleOutcome {
    pub fn is_selected(self) -> bool {
        matches!(self, ToggleOutcome::Selected)
    }
}
