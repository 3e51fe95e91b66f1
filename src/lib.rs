pub mod core;
pub mod export;
pub mod session;
pub mod tui;

pub use core::{
    get_config_path, is_binary_path, is_sensitive, load_config, Config, DisplayRow,
    FileDescriptor, IgnoreMatcher, SelectionState, SelectionStatus, SessionError, TokenLevel,
    ToggleOutcome, TreeScanner,
};
pub use export::{FileSnapshotExporter, SnapshotExporter};
pub use session::{ExportReport, Session};
pub use tui::FilePicker;
