use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::core::{is_binary_path, TEMP_DIR};

/// Receives the final, sorted selection and turns it into a snapshot.
pub trait SnapshotExporter {
    /// `files` are root-relative and already in ascending order.
    /// Returns where the snapshot was written.
    fn export(&self, root: &Path, files: &[String]) -> Result<PathBuf>;
}

/// Writes every selected file into one text file at the project root.
pub struct FileSnapshotExporter {
    output_file: String,
}

impl FileSnapshotExporter {
    pub fn new(output_file: impl Into<String>) -> Self {
        Self {
            output_file: output_file.into(),
        }
    }
}

impl SnapshotExporter for FileSnapshotExporter {
    fn export(&self, root: &Path, files: &[String]) -> Result<PathBuf> {
        let tmp_dir = root.join(TEMP_DIR);
        fs::create_dir_all(&tmp_dir)
            .with_context(|| format!("failed to create {}", tmp_dir.display()))?;

        // Written next to the target first so a failed export never leaves a
        // half-written snapshot behind.
        let tmp = NamedTempFile::new_in(&tmp_dir)?;
        {
            let mut out = BufWriter::new(tmp.as_file());
            write_snapshot(&mut out, root, files)?;
            out.flush()?;
        }

        let target = root.join(&self.output_file);
        tmp.persist(&target)
            .with_context(|| format!("failed to write {}", target.display()))?;

        info!(files = files.len(), path = %target.display(), "snapshot written");
        Ok(target)
    }
}

fn write_snapshot<W: Write>(out: &mut W, root: &Path, files: &[String]) -> Result<()> {
    writeln!(out, "Snapshot of {}", root.display())?;
    writeln!(out, "Files: {}", files.len())?;
    writeln!(out)?;

    writeln!(out, "Directory Structure:")?;
    write_tree(out, files)?;

    for file in files {
        writeln!(out)?;
        writeln!(out, "File: {file}")?;
        writeln!(out, "{}", "=".repeat(48))?;

        if is_binary_path(Path::new(file)) {
            writeln!(out, "[binary file omitted]")?;
            continue;
        }

        match fs::read(root.join(file)) {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes);
                out.write_all(content.as_bytes())?;
                if !content.ends_with('\n') {
                    writeln!(out)?;
                }
            }
            Err(err) => {
                warn!(path = %file, error = %err, "could not read selected file");
                writeln!(out, "[unreadable: {err}]")?;
            }
        }
    }

    Ok(())
}

fn write_tree<W: Write>(out: &mut W, files: &[String]) -> Result<()> {
    let mut current_path: Vec<&str> = vec![];
    for file in files {
        let components: Vec<&str> = file.split('/').collect();

        for (i, component) in components.iter().enumerate() {
            if i >= current_path.len() || *component != current_path[i] {
                let prefix = "  ".repeat(i);
                if i == components.len() - 1 {
                    writeln!(out, "{prefix}└── {component}")?;
                } else {
                    writeln!(out, "{prefix}├── {component}/")?;
                }
                // Once a level differs, everything below it is new too.
                current_path.truncate(i);
            }
        }

        current_path = components;
    }
    Ok(())
}
