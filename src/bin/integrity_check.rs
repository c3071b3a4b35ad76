//! File integrity monitor for the portal deployment tree.
//!
//! Hashes every monitored file into a baseline, then reports files that were
//! modified, added, or deleted since the baseline was taken. Intended to run
//! from cron; a non-zero exit code means the tree changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const BASELINE_FILE: &str = ".file-hashes.json";
const LOG_FILE: &str = "integrity-log.txt";

const MONITOR_EXTENSIONS: &[&str] = &["html", "css", "js", "json", "toml"];

/// State files the server rewrites at runtime, plus our own artifacts.
const EXCLUDED: &[&str] = &[
    "visitor-data.json",
    "users.db",
    BASELINE_FILE,
    LOG_FILE,
    "target",
    "node_modules",
    ".git",
];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileRecord {
    hash: String,
    size: u64,
    modified: String,
}

type Baseline = BTreeMap<String, FileRecord>;

#[derive(Debug, Default)]
struct Report {
    total: usize,
    modified: Vec<String>,
    added: Vec<String>,
    deleted: Vec<String>,
}

impl Report {
    fn is_clean(&self) -> bool {
        self.modified.is_empty() && self.added.is_empty() && self.deleted.is_empty()
    }
}

fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("info".parse().expect("directive")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let base = args
        .iter()
        .find(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    if args.iter().any(|arg| arg == "--init") {
        match write_baseline(&base) {
            Ok(count) => {
                log_event(&base, &format!("initialized hashes for {count} files"), false);
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("failed to initialize baseline: {err}");
                ExitCode::FAILURE
            }
        }
    } else if args.iter().any(|arg| arg == "--check") {
        match check_integrity(&base) {
            Ok(report) => {
                print_summary(&report);
                if report.is_clean() {
                    log_event(&base, "all files intact, no modifications detected", false);
                    ExitCode::SUCCESS
                } else {
                    log_event(&base, "integrity check failed, tree has changed", true);
                    ExitCode::FAILURE
                }
            }
            Err(err) => {
                error!("integrity check could not run: {err}");
                ExitCode::FAILURE
            }
        }
    } else if args.iter().any(|arg| arg == "--update") {
        match write_baseline(&base) {
            Ok(count) => {
                log_event(&base, &format!("baseline updated, {count} files"), false);
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("failed to update baseline: {err}");
                ExitCode::FAILURE
            }
        }
    } else {
        println!(
            "File integrity monitor\n\n\
             Usage:\n\
             \x20 integrity_check [BASE_DIR] --init     Generate the initial file hashes\n\
             \x20 integrity_check [BASE_DIR] --check    Check for unauthorized modifications\n\
             \x20 integrity_check [BASE_DIR] --update   Update hashes after legitimate changes\n\n\
             Recommended cron job (check every hour):\n\
             \x20 0 * * * * cd /srv/osint-portal && integrity_check --check"
        );
        ExitCode::SUCCESS
    }
}

fn write_baseline(base: &Path) -> std::io::Result<usize> {
    let mut baseline = Baseline::new();
    for file in monitored_files(base) {
        let full = base.join(&file);
        let Ok(content) = std::fs::read(&full) else {
            continue;
        };
        let meta = std::fs::metadata(&full)?;
        let modified: DateTime<Utc> = meta
            .modified()
            .map(DateTime::from)
            .unwrap_or_else(|_| Utc::now());
        baseline.insert(
            file,
            FileRecord {
                hash: hex::encode(Sha256::digest(&content)),
                size: meta.len(),
                modified: modified.to_rfc3339(),
            },
        );
    }

    let payload = serde_json::to_vec_pretty(&baseline)?;
    std::fs::write(base.join(BASELINE_FILE), payload)?;
    Ok(baseline.len())
}

fn check_integrity(base: &Path) -> std::io::Result<Report> {
    let bytes = std::fs::read(base.join(BASELINE_FILE)).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            std::io::Error::other("baseline not found, run with --init first")
        } else {
            err
        }
    })?;
    let baseline: Baseline = serde_json::from_slice(&bytes)?;

    let mut report = Report {
        total: baseline.len(),
        ..Report::default()
    };

    for (file, record) in &baseline {
        let full = base.join(file);
        match std::fs::read(&full) {
            Ok(content) => {
                let hash = hex::encode(Sha256::digest(&content));
                if hash != record.hash {
                    log_event(base, &format!("file MODIFIED: {file}"), true);
                    report.modified.push(file.clone());
                }
            }
            Err(_) => {
                log_event(base, &format!("file DELETED: {file}"), true);
                report.deleted.push(file.clone());
            }
        }
    }

    for file in monitored_files(base) {
        if !baseline.contains_key(&file) {
            log_event(base, &format!("new file ADDED: {file}"), true);
            report.added.push(file);
        }
    }

    Ok(report)
}

/// Relative paths of every file under `base` with a monitored extension,
/// skipping the exclusion list.
fn monitored_files(base: &Path) -> Vec<String> {
    let mut files = Vec::new();
    walk(base, base, &mut files);
    files.sort();
    files
}

fn walk(base: &Path, dir: &Path, files: &mut Vec<String>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("cannot read directory {}: {err}", dir.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let relative = match path.strip_prefix(base) {
            Ok(relative) => relative.to_string_lossy().to_string(),
            Err(_) => continue,
        };
        if EXCLUDED.iter().any(|excluded| relative.contains(excluded)) {
            continue;
        }

        if path.is_dir() {
            walk(base, &path, files);
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| MONITOR_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        {
            files.push(relative);
        }
    }
}

fn print_summary(report: &Report) {
    println!("========== INTEGRITY CHECK SUMMARY ==========");
    println!("Total files monitored: {}", report.total);
    println!("Modified files: {}", report.modified.len());
    println!("New files: {}", report.added.len());
    println!("Deleted files: {}", report.deleted.len());

    for (label, files) in [
        ("Modified", &report.modified),
        ("New", &report.added),
        ("Deleted", &report.deleted),
    ] {
        if !files.is_empty() {
            println!("\n{label} files:");
            for file in files {
                println!("  - {file}");
            }
        }
    }
}

/// Append to the audit log next to the baseline; logging problems are not
/// allowed to abort a check.
fn log_event(base: &Path, message: &str, alert: bool) {
    if alert {
        warn!("{message}");
    } else {
        info!("{message}");
    }

    let line = format!(
        "[{}] {}{message}\n",
        Utc::now().to_rfc3339(),
        if alert { "ALERT: " } else { "" }
    );
    let path = base.join(LOG_FILE);
    let result = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| std::io::Write::write_all(&mut file, line.as_bytes()));
    if let Err(err) = result {
        error!("failed to write audit log: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "integrity_{tag}_{}_{nanos}",
            std::process::id()
        ));
        std::fs::create_dir_all(dir.join("public")).unwrap();
        dir
    }

    #[test]
    fn clean_tree_passes_the_check() {
        let base = scratch_dir("clean");
        std::fs::write(base.join("public/index.html"), "<html></html>").unwrap();
        std::fs::write(base.join("config.toml"), "port = 8080").unwrap();

        assert_eq!(write_baseline(&base).unwrap(), 2);
        let report = check_integrity(&base).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.total, 2);

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn modified_added_and_deleted_files_are_reported() {
        let base = scratch_dir("drift");
        std::fs::write(base.join("public/index.html"), "<html></html>").unwrap();
        std::fs::write(base.join("public/app.js"), "let x = 1;").unwrap();
        write_baseline(&base).unwrap();

        std::fs::write(base.join("public/index.html"), "<html>tampered</html>").unwrap();
        std::fs::remove_file(base.join("public/app.js")).unwrap();
        std::fs::write(base.join("public/evil.js"), "alert(1)").unwrap();

        let report = check_integrity(&base).unwrap();
        assert_eq!(report.modified, vec!["public/index.html".to_string()]);
        assert_eq!(report.deleted, vec!["public/app.js".to_string()]);
        assert_eq!(report.added, vec!["public/evil.js".to_string()]);
        assert!(!report.is_clean());

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn state_files_and_unmonitored_extensions_are_skipped() {
        let base = scratch_dir("excluded");
        std::fs::write(base.join("visitor-data.json"), "{}").unwrap();
        std::fs::write(base.join("users.db"), "sqlite").unwrap();
        std::fs::write(base.join("notes.txt"), "not monitored").unwrap();
        std::fs::write(base.join("public/index.html"), "<html></html>").unwrap();

        let files = monitored_files(&base);
        assert_eq!(files, vec!["public/index.html".to_string()]);

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn missing_baseline_is_an_error() {
        let base = scratch_dir("nobaseline");
        assert!(check_integrity(&base).is_err());
        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn update_rewrites_the_baseline() {
        let base = scratch_dir("update");
        std::fs::write(base.join("public/index.html"), "<html></html>").unwrap();
        write_baseline(&base).unwrap();

        std::fs::write(base.join("public/index.html"), "<html>v2</html>").unwrap();
        assert!(!check_integrity(&base).unwrap().is_clean());

        write_baseline(&base).unwrap();
        assert!(check_integrity(&base).unwrap().is_clean());

        let _ = std::fs::remove_dir_all(&base);
    }
}
