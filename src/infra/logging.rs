// ============================================================
// Layer 6 — Logging Setup
// ============================================================
// Installs the global tracing subscriber:
//
//   - console layer, always
//   - file layer (plain text, appended) when --save-dir is set
//
// The filter is `imagenet_eval=info` unless RUST_LOG is set, in
// which case RUST_LOG replaces it entirely.
//
// After the subscriber is up, the run header is written: whether
// the log file existed before, the script arguments, and the
// requested package versions.

use anyhow::{Context, Result};
use std::{
    fmt::Debug,
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when RUST_LOG is not set
const DEFAULT_DIRECTIVE: &str = "imagenet_eval=info";

/// Versions this binary can vouch for
const KNOWN_PACKAGES: &[(&str, &str)] = &[(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))];

/// `<save_dir>/<file_name>`, or None when file logging is off
pub fn log_file_path(save_dir: &str, file_name: &str) -> Option<PathBuf> {
    let save_dir = save_dir.trim();
    if save_dir.is_empty() || file_name.trim().is_empty() {
        None
    } else {
        Some(Path::new(save_dir).join(file_name.trim()))
    }
}

/// Comma separated list → trimmed, non-empty names
pub fn split_packages(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// One header line per requested package
pub fn package_lines(log_packages: &str) -> Vec<String> {
    split_packages(log_packages)
        .into_iter()
        .map(|name| {
            match KNOWN_PACKAGES.iter().find(|(known, _)| *known == name) {
                Some((_, version)) => format!("{name}: {version}"),
                None               => format!("{name}: version not recorded in this build"),
            }
        })
        .collect()
}

/// Open `path` for appending, creating its directory if needed.
///
/// The flag tells whether the file existed before this call.
pub fn open_log_file(path: &Path) -> Result<(File, bool)> {
    let existed = path.exists();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create log directory '{}'", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open log file '{}'", path.display()))?;
    Ok((file, existed))
}

/// Console-only subscriber, for commands that write no log file
pub fn init_console() -> Result<()> {
    tracing_subscriber::registry()
        .with(default_filter()?)
        .with(fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Cannot install logger: {e}"))
}

/// Install console + optional file logging and write the run header.
///
/// Returns the log file path (if any) and whether that file
/// already existed before this run.
pub fn initialize_logging(
    save_dir:          &str,
    file_name:         &str,
    script_args:       &impl Debug,
    log_packages:      &str,
    log_pip_packages:  &str,
) -> Result<(Option<PathBuf>, bool)> {
    let path = log_file_path(save_dir, file_name);

    let (file_layer, existed) = match &path {
        Some(p) => {
            let (file, existed) = open_log_file(p)?;
            (Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))), existed)
        }
        None => (None, false),
    };

    tracing_subscriber::registry()
        .with(default_filter()?)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Cannot install logger: {e}"))?;

    if existed {
        tracing::info!("--------------------------------");
    }
    tracing::info!("Script arguments: {:?}", script_args);
    for line in package_lines(log_packages) {
        tracing::info!("Package {}", line);
    }
    let pip = split_packages(log_pip_packages);
    if !pip.is_empty() {
        tracing::info!("Requested external packages: {}", pip.join(", "));
    }
    tracing::info!(
        "Platform: {} ({}), {} threads",
        std::env::consts::OS,
        std::env::consts::ARCH,
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    );

    Ok((path, existed))
}

fn default_filter() -> Result<EnvFilter> {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())
}

fn filter_from(rust_log: Option<&str>) -> Result<EnvFilter> {
    let directives = rust_log
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVE);
    EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid log filter '{directives}'"))
}
