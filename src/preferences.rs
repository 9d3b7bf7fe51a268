//! Préférences et options de démarrage du moteur Servo.
//!
//! Construit un [`servo::Preferences`] à partir de la configuration et de la
//! ligne de commande :
//! - pools de threads dimensionnés sur le nombre de cœurs (bornés)
//! - cache HTTP, user-agent, fond de page
//! - serveur devtools sur `--remote-debugging-port`
//! - fonctions web de `[features]`, WebGPU sur `--enable-gpu`
//!
//! et un [`servo::Opts`] : dossier de profil, multiprocessus.

use tracing::{debug, info};

use crate::app::{CommandLine, switches};
use crate::config::Config;

/// Builds Servo `Preferences` for this machine and configuration.
#[allow(clippy::field_reassign_with_default)]
pub fn build_servo_preferences(config: &Config, command_line: &CommandLine) -> servo::Preferences {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get() as i64)
        .unwrap_or(4);

    let mut prefs = servo::Preferences::default();

    // ── Threads ───────────────────────────────────────────────────────────
    prefs.layout_threads = if config.engine.layout_threads > 0 {
        config.engine.layout_threads
    } else {
        cpus.min(8)
    };
    prefs.threadpools_async_runtime_workers_max = (cpus * 2).min(16);
    prefs.threadpools_image_cache_workers_max = cpus.min(8);
    prefs.threadpools_webrender_workers_max = (cpus / 2).clamp(2, 8);
    prefs.threadpools_resource_workers_max = cpus.min(8);

    // ── Réseau et rendu ───────────────────────────────────────────────────
    prefs.network_http_cache_size = config.engine.cache_size;
    prefs.gfx_precache_shaders = config.engine.precache_shaders;
    if !config.engine.user_agent.is_empty() {
        prefs.user_agent = config.engine.user_agent.clone();
    }
    prefs.shell_background_color_rgba = config.background_rgba().map(f64::from);

    // ── Devtools ──────────────────────────────────────────────────────────
    if let Some(port) = command_line.switch_value_parsed::<u16>(switches::REMOTE_DEBUGGING_PORT) {
        prefs.devtools_server_enabled = true;
        prefs.devtools_server_port = i64::from(port);
    }

    // ── Fonctions web ─────────────────────────────────────────────────────
    // localStorage n'a pas de préférence : voir BrowserApp::on_context_created.
    let features = &config.features;
    prefs.dom_async_clipboard_enabled = features.javascript_access_clipboard;
    prefs.dom_clipboardevent_enabled = features.javascript_dom_paste;
    prefs.dom_indexeddb_enabled = features.databases;
    prefs.dom_webgl2_enabled = features.webgl;
    prefs.dom_webgpu_enabled = command_line.has_switch(switches::ENABLE_GPU);
    if command_line.has_switch(switches::EXPERIMENTAL_WEB_PLATFORM) {
        prefs.dom_intersection_observer_enabled = true;
        prefs.dom_offscreen_canvas_enabled = true;
    }

    debug!(features = ?config.features, "Feature toggles");
    info!(
        cpus,
        layout_threads = prefs.layout_threads,
        cache_size = prefs.network_http_cache_size,
        devtools = prefs.devtools_server_enabled,
        "Servo preferences configured"
    );

    prefs
}

/// Options de démarrage de Servo.
#[allow(clippy::field_reassign_with_default)]
pub fn build_servo_opts(config: &Config, command_line: &CommandLine) -> servo::Opts {
    let mut opts = servo::Opts::default();
    opts.config_dir = Some(config.engine.user_data_dir.clone());
    opts.multiprocess = command_line.has_switch(switches::MULTIPROCESS);
    info!(
        config_dir = %config.engine.user_data_dir.display(),
        multiprocess = opts.multiprocess,
        "Servo options configured"
    );
    opts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::BrowserApp;

    fn defaults() -> servo::Preferences {
        build_servo_preferences(&Config::default(), &CommandLine::new())
    }

    #[test]
    fn test_preferences_layout_threads_bounded() {
        let prefs = defaults();
        assert!(prefs.layout_threads >= 1);
        assert!(prefs.layout_threads <= 8);
    }

    #[test]
    fn test_preferences_layout_threads_from_config() {
        let mut config = Config::default();
        config.engine.layout_threads = 3;
        let prefs = build_servo_preferences(&config, &CommandLine::new());
        assert_eq!(prefs.layout_threads, 3);
    }

    #[test]
    fn test_preferences_cache_and_shaders() {
        let prefs = defaults();
        assert_eq!(prefs.network_http_cache_size, 50_000);
        assert!(prefs.gfx_precache_shaders);
    }

    #[test]
    fn test_preferences_webrender_workers_bounded() {
        let prefs = defaults();
        assert!(prefs.threadpools_webrender_workers_max >= 2);
        assert!(prefs.threadpools_webrender_workers_max <= 8);
    }

    #[test]
    fn test_preferences_user_agent_override() {
        let mut config = Config::default();
        config.engine.user_agent = "Lanterne/1.0".to_string();
        let prefs = build_servo_preferences(&config, &CommandLine::new());
        assert_eq!(prefs.user_agent, "Lanterne/1.0");

        // Vide : valeur par défaut de Servo
        assert!(!defaults().user_agent.is_empty());
    }

    #[test]
    fn test_preferences_background_white() {
        assert_eq!(defaults().shell_background_color_rgba, [1.0; 4]);
    }

    #[test]
    fn test_preferences_devtools_from_switch() {
        assert!(!defaults().devtools_server_enabled);

        let cmd = CommandLine::from_args(["--remote-debugging-port=9222"]);
        let prefs = build_servo_preferences(&Config::default(), &cmd);
        assert!(prefs.devtools_server_enabled);
        assert_eq!(prefs.devtools_server_port, 9222);
    }

    /// Ligne de commande telle que `main` la prépare.
    fn startup_command_line(config: &Config) -> CommandLine {
        let mut cmd = CommandLine::new();
        BrowserApp::new(config).on_before_command_line_processing(None, &mut cmd);
        cmd
    }

    #[test]
    fn test_preferences_webgl_toggle() {
        let mut config = Config::default();
        config.features.webgl = false;
        let prefs = build_servo_preferences(&config, &CommandLine::new());
        assert!(!prefs.dom_webgl2_enabled);
        assert!(defaults().dom_webgl2_enabled);
    }

    #[test]
    fn test_preferences_clipboard_flags() {
        let prefs = defaults();
        assert!(prefs.dom_async_clipboard_enabled);
        assert!(prefs.dom_clipboardevent_enabled);

        let mut config = Config::default();
        config.features.javascript_access_clipboard = false;
        config.features.javascript_dom_paste = false;
        let prefs = build_servo_preferences(&config, &CommandLine::new());
        assert!(!prefs.dom_async_clipboard_enabled);
        assert!(!prefs.dom_clipboardevent_enabled);
    }

    #[test]
    fn test_preferences_databases_flag() {
        assert!(defaults().dom_indexeddb_enabled);

        let mut config = Config::default();
        config.features.databases = false;
        let prefs = build_servo_preferences(&config, &CommandLine::new());
        assert!(!prefs.dom_indexeddb_enabled);
    }

    #[test]
    fn test_preferences_startup_switches() {
        let config = Config::default();
        let prefs = build_servo_preferences(&config, &startup_command_line(&config));
        assert!(prefs.dom_webgpu_enabled);
        assert!(prefs.dom_intersection_observer_enabled);
        assert!(prefs.dom_offscreen_canvas_enabled);
        assert!(prefs.devtools_server_enabled);
        assert_eq!(prefs.devtools_server_port, 9222);

        assert!(!defaults().dom_webgpu_enabled);
    }

    #[test]
    fn test_opts_profile_dir_and_multiprocess() {
        let mut config = Config::default();
        let opts = build_servo_opts(&config, &startup_command_line(&config));
        assert_eq!(opts.config_dir, Some(std::path::PathBuf::from("./user_data")));
        assert!(!opts.multiprocess);

        config.engine.multiprocess = true;
        config.engine.user_data_dir = "/tmp/lanterne-profile".into();
        let opts = build_servo_opts(&config, &startup_command_line(&config));
        assert_eq!(opts.config_dir, Some(std::path::PathBuf::from("/tmp/lanterne-profile")));
        assert!(opts.multiprocess);
    }
}
