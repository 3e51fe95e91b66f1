use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use d2f::{
    is_sensitive, FileSnapshotExporter, IgnoreMatcher, SelectionState, SelectionStatus, Session,
    SessionError, SnapshotExporter, ToggleOutcome, TreeScanner,
};
use tempfile::{tempdir, TempDir};

fn setup_test_directory(files: &[(&str, &str)]) -> Result<TempDir> {
    let dir = tempdir()?;
    for (path, content) in files {
        let full_path = dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, content)?;
    }
    Ok(dir)
}

#[derive(Default)]
struct RecordingExporter {
    calls: RefCell<Vec<(PathBuf, Vec<String>)>>,
}

impl SnapshotExporter for RecordingExporter {
    fn export(&self, root: &Path, files: &[String]) -> Result<PathBuf> {
        self.calls
            .borrow_mut()
            .push((root.to_path_buf(), files.to_vec()));
        Ok(root.join("recorded.txt"))
    }
}

mod scan_tests {
    use super::*;

    #[test]
    fn test_scan_yields_only_unignored_files_in_order() -> Result<()> {
        let dir = setup_test_directory(&[
            ("a.txt", "12345678"),
            ("secret.key", "k"),
            ("node_modules/x.js", "module.exports = 1;"),
        ])?;
        let matcher = IgnoreMatcher::build(dir.path())?;

        let paths: Vec<_> = TreeScanner::new(dir.path(), &matcher)
            .scan()
            .map(|f| f.path)
            .collect();

        assert_eq!(paths, vec!["a.txt", "secret.key"]);
        Ok(())
    }

    #[test]
    fn test_nothing_under_excluded_directories() -> Result<()> {
        let dir = setup_test_directory(&[
            ("src/app.rs", ""),
            ("src/generated/big.rs", ""),
            ("pkg/node_modules/dep/index.js", ""),
            ("pkg/dist/out.js", ""),
            (".git/HEAD", ""),
            (".d2f_tmp/d2f.log", ""),
            ("d2f_dump.txt", ""),
            (".env", "TOKEN=1"),
            (".gitignore", "generated/\n*.tmp\n"),
            ("scratch.tmp", ""),
        ])?;
        let matcher = IgnoreMatcher::build(dir.path())?;
        let files: Vec<_> = TreeScanner::new(dir.path(), &matcher).scan().collect();

        for file in &files {
            assert!(
                !matcher.ignores(&file.path, false),
                "Scanned an ignored file: {}",
                file.path
            );
            for excluded in ["node_modules", "dist", ".git", ".d2f_tmp", "generated"] {
                assert!(
                    !file.path.split('/').any(|seg| seg == excluded),
                    "Found file from excluded directory: {}",
                    file.path
                );
            }
        }

        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/app.rs", ".gitignore"]);
        Ok(())
    }

    #[test]
    fn test_repeated_scans_agree() -> Result<()> {
        let dir = setup_test_directory(&[
            ("Zed.md", ""),
            ("abc.md", ""),
            ("lib/B.rs", ""),
            ("lib/a.rs", ""),
            ("Lib2/x.rs", ""),
        ])?;
        let matcher = IgnoreMatcher::build(dir.path())?;
        let scanner = TreeScanner::new(dir.path(), &matcher);

        let first: Vec<_> = scanner.scan().map(|f| f.path).collect();
        for _ in 0..3 {
            let again: Vec<_> = scanner.scan().map(|f| f.path).collect();
            assert_eq!(first, again);
        }
        assert_eq!(
            first,
            vec!["Lib2/x.rs", "lib/B.rs", "lib/a.rs", "Zed.md", "abc.md"]
        );
        Ok(())
    }
}

mod selection_tests {
    use super::*;

    #[test]
    fn test_sensitive_file_cannot_be_selected() -> Result<()> {
        let dir = setup_test_directory(&[
            ("a.txt", "12345678"),
            ("secret.key", "k"),
            ("node_modules/x.js", ""),
        ])?;
        let matcher = IgnoreMatcher::build(dir.path())?;
        let mut session = Session::open(dir.path(), &matcher)?;

        assert!(is_sensitive(&session.files()[1].path));
        assert!(matches!(
            session.toggle(1),
            Err(SessionError::SensitiveFile(_))
        ));
        assert!(!session.selection().is_selected("secret.key"));

        assert_eq!(session.toggle(0)?, ToggleOutcome::Selected);
        assert_eq!(session.status().total_tokens, 2);
        assert_eq!(session.toggle(0)?, ToggleOutcome::Deselected);
        assert_eq!(session.status(), SelectionStatus::default());

        Ok(())
    }

    #[test]
    fn test_select_all_sums_rounded_costs() -> Result<()> {
        let dir = setup_test_directory(&[("a.txt", "12345678"), ("b.txt", "1234567890123")])?;
        let mut state = SelectionState::new(dir.path());

        state.select_all(&["a.txt", "b.txt"]);
        assert_eq!(state.total_tokens(), 6);

        state.clear_selection();
        assert_eq!(state.status(), SelectionStatus::default());
        Ok(())
    }

    #[test]
    fn test_sensitivity_ignores_directory_depth() {
        for name in ["id.pem", ".env.test", "my_secret.txt", "notes.md"] {
            let expected = is_sensitive(name);
            for prefix in ["", "a/", "a/b/", "deeply/nested/dir/"] {
                assert_eq!(is_sensitive(&format!("{prefix}{name}")), expected);
            }
        }
    }
}

mod export_tests {
    use super::*;

    #[test]
    fn test_empty_selection_never_reaches_exporter() -> Result<()> {
        let dir = setup_test_directory(&[("a.txt", "a")])?;
        let matcher = IgnoreMatcher::build(dir.path())?;
        let session = Session::open(dir.path(), &matcher)?;
        let exporter = RecordingExporter::default();

        assert!(matches!(
            session.export(&exporter),
            Err(SessionError::NothingSelected)
        ));
        assert!(exporter.calls.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn test_export_receives_sorted_selection() -> Result<()> {
        let dir = setup_test_directory(&[("a.txt", "12345678"), ("b.txt", "1234567890123")])?;
        let matcher = IgnoreMatcher::build(dir.path())?;
        let mut session = Session::open(dir.path(), &matcher)?;

        session.toggle(1)?;
        session.toggle(0)?;

        let exporter = RecordingExporter::default();
        let report = session.export(&exporter)?;

        let calls = exporter.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, dir.path());
        assert_eq!(calls[0].1, vec!["a.txt", "b.txt"]);
        assert_eq!(report.file_count, 2);
        assert_eq!(report.total_tokens, 6);
        Ok(())
    }

    #[test]
    fn test_snapshot_is_not_rescanned() -> Result<()> {
        let dir = setup_test_directory(&[("a.txt", "hello"), ("b.txt", "world")])?;
        let matcher = IgnoreMatcher::build(dir.path())?;
        let mut session = Session::open(dir.path(), &matcher)?;
        session.select_all();

        let written = session.export(&FileSnapshotExporter::new("d2f_dump.txt"))?;
        assert!(written.path.exists());

        let rescanned = Session::open(dir.path(), &matcher)?;
        let paths: Vec<_> = rescanned.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "b.txt"]);
        Ok(())
    }

    #[test]
    fn test_custom_output_names_are_not_rescanned() -> Result<()> {
        for name in ["./ctx.txt", "notes[1].md", "#ctx.txt", "!ctx.txt"] {
            let dir = setup_test_directory(&[("a.txt", "hello"), ("notes1.md", "keep me")])?;
            let matcher = IgnoreMatcher::with_extra_excludes(dir.path(), &[name.to_string()])?;
            let mut session = Session::open(dir.path(), &matcher)?;
            session.select_all();

            let written = session.export(&FileSnapshotExporter::new(name))?;
            assert!(written.path.exists(), "Failed for output name: {name}");

            let rescanned = Session::open(dir.path(), &matcher)?;
            let paths: Vec<_> = rescanned.files().iter().map(|f| f.path.as_str()).collect();
            assert_eq!(
                paths,
                vec!["a.txt", "notes1.md"],
                "Failed for output name: {name}"
            );
        }
        Ok(())
    }
}
