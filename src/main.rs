mod cli;

use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use num_format::{Locale, ToFormattedString};
use tracing_subscriber::EnvFilter;

use d2f::core::{get_config_path, load_config, save_config_to, Config, IgnoreMatcher, TEMP_DIR};
use d2f::{FilePicker, FileSnapshotExporter, Session};

use crate::cli::Cli;

fn main() -> Result<()> {
    let args = Cli::parse();

    if args.config_path {
        println!("{}", get_config_path()?.display());
        return Ok(());
    }

    if args.init_config {
        let path = get_config_path()?;
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            save_config_to(&path, &Config::default())?;
            println!("Configuration saved to {}", path.display());
        }
        return Ok(());
    }

    let mut config = load_config()?;
    if let Some(output) = &args.output {
        config.output_file = output.clone();
    }

    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("cannot resolve {}", args.path.display()))?;

    init_logging(&args, &root)?;

    let matcher = IgnoreMatcher::with_extra_excludes(&root, &config.extra_excludes())?;
    let session = open_session(&root, &matcher)?;
    let exporter = FileSnapshotExporter::new(config.output_file.clone());

    if args.list {
        print_listing(&session);
    } else if args.all {
        export_all(session, &exporter)?;
    } else {
        FilePicker::new(session, &exporter, config).run()?;
    }

    Ok(())
}

fn init_logging(args: &Cli, root: &Path) -> Result<()> {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env("D2F_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    if args.is_interactive() {
        // The picker owns the terminal, so logs go to a file under the root.
        let log_dir = root.join(TEMP_DIR);
        fs::create_dir_all(&log_dir)
            .with_context(|| format!("failed to create {}", log_dir.display()))?;
        let log_file = File::create(log_dir.join("d2f.log"))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(log_file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn open_session(root: &Path, matcher: &IgnoreMatcher) -> Result<Session> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("invalid spinner template")?,
    );
    pb.set_message("Scanning files...");

    let session = Session::open(root, matcher);
    pb.finish_and_clear();
    session.map_err(Into::into)
}

fn print_listing(session: &Session) {
    for row in session.rows() {
        if row.sensitive {
            println!("{} {}", row.path, style("[sensitive]").red().bold());
        } else if row.is_binary {
            println!("{} {}", style(row.path).dim(), style("[binary]").dim());
        } else {
            println!("{}", row.path);
        }
    }
    println!(
        "\n{} {}",
        style("Total files:").green().bold(),
        session.files().len()
    );
}

fn export_all(mut session: Session, exporter: &FileSnapshotExporter) -> Result<()> {
    let selected = session.select_all();
    let report = session.export(exporter)?;

    println!(
        "{} {} files, ~{} tokens",
        style("Exported").green().bold(),
        selected,
        report.total_tokens.to_formatted_string(&Locale::en)
    );
    println!("Snapshot written to: {}", report.path.display());
    Ok(())
}
