pub mod binary;
pub mod config;
pub mod error;
pub mod ignore_rules;
pub mod scanner;
pub mod selection;
pub mod sensitivity;
pub mod types;

pub use binary::is_binary_path;
pub use config::{get_config_path, load_config, load_config_from, save_config_to, Config};
pub use error::SessionError;
pub use ignore_rules::{IgnoreMatcher, BUILTIN_EXCLUDES, DEFAULT_OUTPUT_FILE, TEMP_DIR};
pub use scanner::{Scan, TreeScanner};
pub use selection::SelectionState;
pub use sensitivity::is_sensitive;
pub use types::{DisplayRow, FileDescriptor, SelectionStatus, TokenLevel, ToggleOutcome};
