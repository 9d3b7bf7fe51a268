//! Erreurs fatales de démarrage.
//!
//! Seules les erreurs qui empêchent la fenêtre de s'ouvrir passent par ici.
//! Un échec de chargement de page n'est jamais une erreur : il se traduit par
//! une page d'erreur locale (voir [`crate::error_page`]).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("event loop failure: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("cannot create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("logging already initialized")]
    LoggingInit,

    #[error("invalid URL '{input}': {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("engine resources not found (searched: {searched})")]
    ResourcesNotFound { searched: String },

    #[error("rendering context: {0}")]
    Rendering(String),

    #[error("toolbar renderer: {0}")]
    Chrome(String),

    #[error("TLS crypto provider already installed")]
    CryptoProvider,
}
