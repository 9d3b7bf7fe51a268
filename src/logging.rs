//! Initialisation du journal.
//!
//! Deux sorties : stderr (couleurs) et, si configuré, un fichier ouvert en
//! ajout sans séquences ANSI. `RUST_LOG` prime sur `logging.level`.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;
use crate::error::ShellError;
use crate::paths;

/// Installe le subscriber global. À appeler une seule fois.
pub fn init(config: &LoggingConfig) -> Result<(), ShellError> {
    let filter = build_filter(&config.level, std::env::var("RUST_LOG").ok().as_deref());

    let file_layer = match config.file.as_deref().filter(|p| !p.as_os_str().is_empty()) {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|_| ShellError::LoggingInit)
}

/// Filtre effectif : `RUST_LOG` s'il est valide, sinon le niveau configuré,
/// sinon `info`.
fn build_filter(level: &str, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn open_log_file(path: &Path) -> Result<File, ShellError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        paths::ensure_dir(parent);
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ShellError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}
