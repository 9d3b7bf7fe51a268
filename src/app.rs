//! Handler d'application : switches de ligne de commande et liaison script.
//!
//! Deux points d'entrée :
//!
//! - [`BrowserApp::on_before_command_line_processing`] ajoute les switches
//!   fixes avant que le moteur ne lise la ligne de commande.
//! - [`BrowserApp::on_context_created`] fournit le script injecté dans chaque
//!   contexte de script : un objet global `lanterne` en lecture seule.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::ShellError;

// ─────────────────────────────────────────────────────────────────────────────
// CommandLine
// ─────────────────────────────────────────────────────────────────────────────

/// Ligne de commande : switches `--name[=value]` et arguments positionnels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    switches: BTreeMap<String, Option<String>>,
    arguments: Vec<String>,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse les arguments, sans le nom du programme.
    ///
    /// `--` termine les switches : la suite est positionnelle.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cmd = Self::new();
        let mut only_positional = false;
        for arg in args {
            let arg = arg.into();
            if only_positional {
                cmd.arguments.push(arg);
                continue;
            }
            if arg == "--" {
                only_positional = true;
                continue;
            }
            match arg.strip_prefix("--") {
                Some(switch) if !switch.is_empty() => match switch.split_once('=') {
                    Some((name, value)) => cmd.append_switch_with_value(name, value),
                    None => cmd.append_switch(switch),
                },
                _ => cmd.arguments.push(arg),
            }
        }
        cmd
    }

    /// Ajoute un switch sans valeur. Un switch déjà présent est conservé.
    pub fn append_switch(&mut self, name: &str) {
        self.switches.entry(name.to_string()).or_insert(None);
    }

    /// Ajoute un switch avec valeur. Une valeur fournie par l'utilisateur
    /// n'est pas écrasée.
    pub fn append_switch_with_value(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let entry = self.switches.entry(name.to_string()).or_insert(None);
        if entry.is_none() {
            *entry = Some(value);
        }
    }

    pub fn has_switch(&self, name: &str) -> bool {
        self.switches.contains_key(name)
    }

    pub fn switch_value(&self, name: &str) -> Option<&str> {
        self.switches.get(name)?.as_deref()
    }

    /// Valeur d'un switch interprétée comme entier.
    pub fn switch_value_parsed<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.switch_value(name)?.parse().ok()
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn switches(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.switches
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.switches() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match value {
                Some(v) => write!(f, "--{name}={v}")?,
                None => write!(f, "--{name}")?,
            }
        }
        for arg in &self.arguments {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// URL de départ : premier argument positionnel, sinon `default_url`.
/// Sans schéma, `https://` est ajouté.
pub fn initial_url(command_line: &CommandLine, default_url: &str) -> Result<Url, ShellError> {
    let input = command_line
        .arguments()
        .first()
        .map(String::as_str)
        .unwrap_or(default_url)
        .trim();

    if let Ok(url) = Url::parse(input) {
        return Ok(url);
    }
    Url::parse(&format!("https://{input}")).map_err(|source| ShellError::InvalidUrl {
        input: input.to_string(),
        source,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// BrowserApp
// ─────────────────────────────────────────────────────────────────────────────

/// Plateforme rapportée au script de la page.
pub fn platform_name() -> &'static str {
    if cfg!(windows) {
        "windows"
    } else if cfg!(target_os = "macos") {
        "macos"
    } else {
        "linux"
    }
}

/// Noms des switches lus par la coquille.
pub mod switches {
    /// Port du serveur devtools de Servo.
    pub const REMOTE_DEBUGGING_PORT: &str = "remote-debugging-port";
    /// WebGPU.
    pub const ENABLE_GPU: &str = "enable-gpu";
    pub const EXPERIMENTAL_WEB_PLATFORM: &str = "enable-experimental-web-platform-features";
    /// Contenu des pages dans des processus séparés.
    pub const MULTIPROCESS: &str = "multiprocess";
}

/// Handler d'application, pour le processus principal comme pour les
/// processus auxiliaires.
#[derive(Debug, Clone)]
pub struct BrowserApp {
    remote_debugging_port: u16,
    multiprocess: bool,
    local_storage: bool,
}

impl BrowserApp {
    pub fn new(config: &Config) -> Self {
        Self {
            remote_debugging_port: config.engine.remote_debugging_port,
            multiprocess: config.engine.multiprocess,
            local_storage: config.features.local_storage,
        }
    }

    /// Ajoute les switches fixes sans écraser ceux de l'utilisateur.
    /// `process_type` vaut `None` pour le processus principal.
    pub fn on_before_command_line_processing(
        &self,
        process_type: Option<&str>,
        command_line: &mut CommandLine,
    ) {
        command_line.append_switch(switches::ENABLE_GPU);
        command_line.append_switch(switches::EXPERIMENTAL_WEB_PLATFORM);
        command_line.append_switch_with_value(
            switches::REMOTE_DEBUGGING_PORT,
            self.remote_debugging_port.to_string(),
        );
        if self.multiprocess {
            command_line.append_switch(switches::MULTIPROCESS);
        }

        debug!(process_type = process_type.unwrap_or("browser"), %command_line, "Command line");
    }

    /// Script à exécuter à la création de chaque contexte de script.
    pub fn on_context_created(&self) -> String {
        let mut script = browser_api_script(env!("CARGO_PKG_VERSION"), platform_name());
        if !self.local_storage {
            script.push_str(STORAGE_BLOCKER);
        }
        script
    }
}

/// Rend `localStorage` et `sessionStorage` inaccessibles, comme un
/// navigateur dont le stockage est désactivé.
const STORAGE_BLOCKER: &str = "(function () {\
   ['localStorage', 'sessionStorage'].forEach(function (name) {\
     try {\
       Object.defineProperty(window, name, {\
         get: function () { throw new DOMException('Storage is disabled', 'SecurityError'); },\
         configurable: false\
       });\
     } catch (e) {}\
   });\
 })();";

/// Définit `window.lanterne = { version, platform }`, propriétés en lecture
/// seule, sans écraser une définition existante.
pub fn browser_api_script(version: &str, platform: &str) -> String {
    let version = js_string(&format!("Lanterne {version}"));
    let platform = js_string(platform);
    format!(
        "(function () {{\
           if (Object.prototype.hasOwnProperty.call(window, 'lanterne')) return;\
           var api = {{}};\
           Object.defineProperty(api, 'version', {{ value: {version}, enumerable: true }});\
           Object.defineProperty(api, 'platform', {{ value: {platform}, enumerable: true }});\
           Object.defineProperty(window, 'lanterne', \
             {{ value: Object.freeze(api), enumerable: true }});\
         }})();"
    )
}

/// Littéral de chaîne JavaScript entre guillemets simples.
fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '<' => out.push_str("\\x3c"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
