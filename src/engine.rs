//! Frontière avec le moteur embarqué.
//!
//! Le moteur (Servo en production, un mock en test) est vu à travers deux
//! traits : [`Browser`] pour une instance de navigation et [`MessageLoop`]
//! pour la boucle d'événements de l'hôte. Les rappels du moteur sont
//! regroupés en traits de capacité (`LifeSpanHandler`, `DisplayHandler`, ...)
//! que [`crate::client::BrowserClient`] implémente tous.
//!
//! Chaque méthode de capacité a une implémentation par défaut neutre, comme
//! un handler qu'on n'enregistrerait pas.

use std::fmt;
use std::hash::Hash;

use url::Url;

use crate::context_menu::{CommandId, MenuModel};
use crate::downloads::{BeforeDownloadCallback, DownloadItem};
use crate::paths;

// ─────────────────────────────────────────────────────────────────────────────
// Handles moteur
// ─────────────────────────────────────────────────────────────────────────────

/// Handle vers une instance de navigation du moteur.
///
/// Les clones désignent la même instance. L'identité passe par [`Browser::id`].
pub trait Browser: Clone {
    type Id: Copy + Eq + Hash + fmt::Debug;

    fn id(&self) -> Self::Id;
    fn url(&self) -> Option<Url>;

    fn load_url(&self, url: &Url);
    fn reload(&self);
    fn reload_ignore_cache(&self);
    fn stop_load(&self);

    fn can_go_back(&self) -> bool;
    fn can_go_forward(&self) -> bool;
    fn go_back(&self);
    fn go_forward(&self);

    fn show_dev_tools(&self);
    fn close_dev_tools(&self);
    fn view_source(&self);
    fn copy_url(&self);

    /// Demande la fermeture. La confirmation arrive plus tard par
    /// [`LifeSpanHandler::on_before_close`].
    fn close(&self, force: bool);
}

/// Boucle de messages de l'hôte.
pub trait MessageLoop {
    /// Demande la sortie de la boucle. Appelé une seule fois, quand le
    /// dernier navigateur est fermé.
    fn quit(&self);
}

// ─────────────────────────────────────────────────────────────────────────────
// Types d'événements
// ─────────────────────────────────────────────────────────────────────────────

/// Disposition demandée pour l'ouverture d'une nouvelle fenêtre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOpenDisposition {
    Unknown,
    CurrentTab,
    SingletonTab,
    NewForegroundTab,
    NewBackgroundTab,
    NewPopup,
    NewWindow,
    SaveToDisk,
    OffTheRecord,
    IgnoreAction,
}

/// Réponse à une demande de popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupDecision {
    /// Le moteur crée la nouvelle fenêtre.
    Allow,
    /// Création annulée ; la cible a pu être chargée ailleurs.
    Cancel,
}

/// Code d'erreur réseau, valeurs alignées sur la table net_error de Chromium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorCode {
    Failed,
    Aborted,
    FileNotFound,
    TimedOut,
    ConnectionRefused,
    NameNotResolved,
    UnknownUrlScheme,
    Other(i32),
}

impl LoadErrorCode {
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Failed => -2,
            Self::Aborted => -3,
            Self::FileNotFound => -6,
            Self::TimedOut => -7,
            Self::ConnectionRefused => -102,
            Self::NameNotResolved => -105,
            Self::UnknownUrlScheme => -302,
            Self::Other(code) => code,
        }
    }

    pub fn from_i32(code: i32) -> Self {
        match code {
            -2 => Self::Failed,
            -3 => Self::Aborted,
            -6 => Self::FileNotFound,
            -7 => Self::TimedOut,
            -102 => Self::ConnectionRefused,
            -105 => Self::NameNotResolved,
            -302 => Self::UnknownUrlScheme,
            other => Self::Other(other),
        }
    }

    /// Texte par défaut, au format `ERR_*`.
    pub fn default_text(self) -> &'static str {
        match self {
            Self::Failed => "ERR_FAILED",
            Self::Aborted => "ERR_ABORTED",
            Self::FileNotFound => "ERR_FILE_NOT_FOUND",
            Self::TimedOut => "ERR_TIMED_OUT",
            Self::ConnectionRefused => "ERR_CONNECTION_REFUSED",
            Self::NameNotResolved => "ERR_NAME_NOT_RESOLVED",
            Self::UnknownUrlScheme => "ERR_UNKNOWN_URL_SCHEME",
            Self::Other(_) => "ERR_UNEXPECTED",
        }
    }
}

impl fmt::Display for LoadErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

/// Échec de chargement d'un frame principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub code: LoadErrorCode,
    pub text: String,
    /// URL demandée, telle que le moteur l'a reçue (pas forcément parsable).
    pub failed_url: String,
}

impl LoadError {
    pub fn new(code: LoadErrorCode, failed_url: impl Into<String>) -> Self {
        Self {
            code,
            text: code.default_text().to_string(),
            failed_url: failed_url.into(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Détecte les URLs qui ne peuvent pas aboutir avant de les confier au
    /// moteur : schéma non supporté, fichier local absent.
    pub fn for_unreachable(url: &Url) -> Option<Self> {
        match url.scheme() {
            "http" | "https" | "data" | "about" | "blob" | "view-source" | "resource"
            | "ws" | "wss" => None,
            "file" => {
                let exists = url
                    .to_file_path()
                    .map(|p| paths::file_exists(&p))
                    .unwrap_or(false);
                (!exists).then(|| Self::new(LoadErrorCode::FileNotFound, url.as_str()))
            }
            _ => Some(Self::new(LoadErrorCode::UnknownUrlScheme, url.as_str())),
        }
    }
}

/// Type d'événement clavier, dans l'ordre où le moteur les émet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    RawKeyDown,
    KeyDown,
    KeyUp,
    Char,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Événement clavier réduit à ce que la table de raccourcis consulte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub modifiers: KeyModifiers,
    /// Code de touche virtuelle Windows (`'A'` = 0x41, F5 = 0x74, ...).
    pub windows_key_code: i32,
}

/// Issue du pré-traitement clavier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Consommé : le moteur ne voit pas l'événement.
    Handled,
    /// Non consommé mais reconnu comme raccourci : l'UI doit réagir.
    Shortcut(crate::shortcuts::Shortcut),
    NotHandled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Debug,
    Log,
    Info,
    Warning,
    Error,
}

// ─────────────────────────────────────────────────────────────────────────────
// Capacités
// ─────────────────────────────────────────────────────────────────────────────

pub trait LifeSpanHandler<B: Browser> {
    fn on_before_popup(
        &self,
        _browser: &B,
        _target_url: &Url,
        _disposition: WindowOpenDisposition,
    ) -> PopupDecision {
        PopupDecision::Allow
    }

    fn on_after_created(&self, _browser: B) {}

    /// `true` annule la fermeture.
    fn do_close(&self, _browser: &B) -> bool {
        false
    }

    fn on_before_close(&self, _browser: &B) {}
}

pub trait DisplayHandler<B: Browser> {
    /// Retourne le titre de fenêtre à afficher.
    fn on_title_change(&self, _browser: &B, title: Option<&str>) -> String {
        title.unwrap_or_default().to_string()
    }

    /// Retourne l'URL à afficher dans la barre d'adresse, si elle change.
    fn on_address_change(&self, _browser: &B, _url: &Url, _is_main_frame: bool) -> Option<Url> {
        None
    }

    fn on_fullscreen_mode_change(&self, _browser: &B, _fullscreen: bool) {}

    /// `true` supprime l'affichage par défaut du message.
    fn on_console_message(
        &self,
        _browser: &B,
        _level: ConsoleLevel,
        _message: &str,
        _source: &str,
        _line: u32,
    ) -> bool {
        false
    }
}

pub trait LoadHandler<B: Browser> {
    fn on_loading_state_change(
        &self,
        _browser: &B,
        _is_loading: bool,
        _can_go_back: bool,
        _can_go_forward: bool,
    ) {
    }

    fn on_load_start(&self, _browser: &B, _url: &Url) {}

    fn on_load_end(&self, _browser: &B, _http_status: Option<u16>) {}

    /// `true` si une page de substitution a été chargée.
    fn on_load_error(&self, _browser: &B, _error: &LoadError) -> bool {
        false
    }
}

pub trait RequestHandler<B: Browser> {
    /// `true` annule la navigation.
    fn on_before_browse(
        &self,
        _browser: &B,
        _url: &Url,
        _user_gesture: bool,
        _is_redirect: bool,
    ) -> bool {
        false
    }
}

pub trait ContextMenuHandler<B: Browser> {
    fn on_before_context_menu(&self, _browser: &B, _model: &mut MenuModel) {}

    /// `true` si la commande a été exécutée.
    fn on_context_menu_command(&self, _browser: &B, _command: CommandId) -> bool {
        false
    }
}

pub trait KeyboardHandler<B: Browser> {
    fn on_pre_key_event(&self, _browser: &B, _event: &KeyEvent) -> KeyOutcome {
        KeyOutcome::NotHandled
    }

    /// Après dispatch au moteur. `true` consomme l'événement.
    fn on_key_event(&self, _browser: &B, _event: &KeyEvent) -> bool {
        false
    }
}

pub trait DownloadHandler<B: Browser> {
    fn can_download(&self, _browser: &B, _url: &Url, _method: &str) -> bool {
        false
    }

    fn on_before_download(
        &self,
        _browser: &B,
        _item: &DownloadItem,
        _suggested_name: &str,
        _callback: &dyn BeforeDownloadCallback,
    ) {
    }

    fn on_download_updated(&self, _browser: &B, _item: &DownloadItem) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock (tests)
// ─────────────────────────────────────────────────────────────────────────────
