use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "d2f",
    about = "Pick files from a project and dump them into a single snapshot",
    version
)]
pub struct Cli {
    /// Project directory to browse
    #[arg(default_value = ".", value_parser = validate_dir)]
    pub path: PathBuf,

    /// Snapshot file name, written inside the project directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print the scanned files and exit
    #[arg(long, conflicts_with = "all")]
    pub list: bool,

    /// Export every non-sensitive file without opening the picker
    #[arg(long)]
    pub all: bool,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the config file path and exit
    #[arg(long)]
    pub config_path: bool,

    /// Write a config file with default values if none exists, then exit
    #[arg(long)]
    pub init_config: bool,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        !self.list && !self.all
    }
}

fn validate_dir(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_dir() {
        Ok(path)
    } else if path.exists() {
        Err(format!("'{s}' is not a directory"))
    } else {
        Err(format!("Path '{s}' does not exist"))
    }
}
