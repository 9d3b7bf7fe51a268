//! Point d'entrée de Lanterne.
//!
//! Usage :
//!   lanterne [URL] [--switch[=valeur]...]
//!
//! Exemples :
//!   cargo run                                   → charge `general.default_url`
//!   cargo run -- https://servo.org              → charge servo.org
//!   cargo run -- wikipedia.org                  → ajoute https:// automatiquement
//!   cargo run -- --remote-debugging-port=6000   → devtools sur le port 6000

use std::process::ExitCode;

use tracing::{error, info, warn};
use winit::event_loop::EventLoop;

use lanterne::app::{self, BrowserApp, CommandLine};
use lanterne::browser::App;
use lanterne::config::{Config, ConfigSource};
use lanterne::error::ShellError;
use lanterne::process::ProcessRole;
use lanterne::servo_glue::ShellEvent;
use lanterne::{logging, paths, resources};

fn main() -> ExitCode {
    // ── 0. Processus de contenu : pas de fenêtre ───────────────────────
    if let ProcessRole::Content { token } = ProcessRole::from_env() {
        servo::run_content_process(token);
        return ExitCode::SUCCESS;
    }

    // ── 1. Configuration et journal ────────────────────────────────────
    let (config, source) = Config::load();
    if let Err(e) = logging::init(&config.logging) {
        eprintln!("lanterne: {e}");
    }
    source.log();
    // Premier lancement : fichier éditable avec les valeurs par défaut.
    if matches!(source, ConfigSource::Defaults)
        && let Err(e) = config.save()
    {
        warn!("Cannot write default config: {e}");
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> Result<(), ShellError> {
    #[cfg(debug_assertions)]
    warn!("Running in DEBUG mode, pages will load slowly. Use `cargo run --release`.");

    // ── 2. Provider crypto TLS ─────────────────────────────────────────
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| ShellError::CryptoProvider)?;

    // ── 3. Ligne de commande ───────────────────────────────────────────
    let mut command_line = CommandLine::from_args(std::env::args().skip(1));
    BrowserApp::new(&config).on_before_command_line_processing(None, &mut command_line);

    // ── 4. Profil Servo ────────────────────────────────────────────────
    let profile = &config.engine.user_data_dir;
    if !paths::ensure_dir(profile) {
        warn!(dir = %profile.display(), "Cannot create profile directory");
    }

    // ── 5. Lecteur de ressources Servo ─────────────────────────────────
    resources::init(&config.general.locale)?;

    // ── 6. URL de départ ───────────────────────────────────────────────
    let url = app::initial_url(&command_line, &config.general.default_url)?;
    info!(%url, "Starting");

    // ── 7. Boucle d'événements Winit ───────────────────────────────────
    let event_loop = EventLoop::<ShellEvent>::with_user_event().build()?;
    let mut app = App::new(&event_loop, config, command_line, url);
    event_loop.run_app(&mut app)?;

    match app {
        App::Failed(e) => Err(e),
        _ => Ok(()),
    }
}
