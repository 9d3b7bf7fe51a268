//! Client navigateur : implémente toutes les capacités de rappel du moteur.
//!
//! Le client tient le registre des navigateurs ouverts et décide :
//!
//! - des popups (rabattues dans l'onglet qui les demande)
//! - des échecs de chargement (page d'erreur en URI `data:`)
//! - des raccourcis clavier, du menu contextuel et des téléchargements
//!
//! Tout tourne sur le thread UI. L'état vit dans des `Cell`/`RefCell` sans
//! verrou ; le client n'est pas `Send`.

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::context_menu::{CommandId, MenuModel};
use crate::data_uri::data_uri;
use crate::downloads::{BeforeDownloadCallback, DownloadItem, DownloadState};
use crate::engine::{
    Browser, ConsoleLevel, ContextMenuHandler, DisplayHandler, DownloadHandler, KeyEvent,
    KeyOutcome, KeyboardHandler, LifeSpanHandler, LoadError, LoadErrorCode, LoadHandler,
    MessageLoop, PopupDecision, RequestHandler, WindowOpenDisposition,
};
use crate::error_page;
use crate::shortcuts::Shortcut;

/// Nombre de navigateurs vivants dans le processus. Diagnostic uniquement.
static BROWSER_COUNT: AtomicUsize = AtomicUsize::new(0);

pub fn browser_count() -> usize {
    BROWSER_COUNT.load(Ordering::Relaxed)
}

pub struct BrowserClient<B: Browser> {
    browsers: RefCell<Vec<B>>,
    main_browser: RefCell<Option<B>>,
    is_closing: Cell<bool>,
    message_loop: Box<dyn MessageLoop>,
    app_name: String,
    locale: String,
}

impl<B: Browser> BrowserClient<B> {
    pub fn new(
        message_loop: Box<dyn MessageLoop>,
        app_name: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            browsers: RefCell::new(Vec::new()),
            main_browser: RefCell::new(None),
            is_closing: Cell::new(false),
            message_loop,
            app_name: app_name.into(),
            locale: locale.into(),
        }
    }

    /// Premier navigateur créé, tant qu'il reste au moins un navigateur.
    pub fn main_browser(&self) -> Option<B> {
        self.main_browser.borrow().clone()
    }

    pub fn browsers(&self) -> Vec<B> {
        self.browsers.borrow().clone()
    }

    pub fn find_browser(&self, id: B::Id) -> Option<B> {
        self.browsers.borrow().iter().find(|b| b.id() == id).cloned()
    }

    pub fn is_closing(&self) -> bool {
        self.is_closing.get()
    }

    pub fn is_empty(&self) -> bool {
        self.browsers.borrow().is_empty()
    }

    /// Demande la fermeture de tous les navigateurs.
    ///
    /// Sans `force`, un appel pendant une fermeture déjà engagée est ignoré.
    /// Les appels hors du thread UI passent par
    /// [`UiThread::run_or_post`](crate::ui_thread::UiThread::run_or_post).
    pub fn close_all_browsers(&self, force: bool) {
        if self.is_closing.get() && !force {
            debug!("Close already in progress");
            return;
        }
        // Copie : `close` peut rappeler `on_before_close` de façon synchrone.
        let browsers = self.browsers();
        if browsers.is_empty() {
            return;
        }
        info!(count = browsers.len(), force, "Closing all browsers");
        for browser in &browsers {
            browser.close(force);
        }
    }

    fn window_title(&self, page_title: Option<&str>) -> String {
        match page_title.map(str::trim) {
            Some(title) if !title.is_empty() => format!("{title} - {}", self.app_name),
            _ => self.app_name.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cycle de vie
// ─────────────────────────────────────────────────────────────────────────────

impl<B: Browser> LifeSpanHandler<B> for BrowserClient<B> {
    fn on_before_popup(
        &self,
        browser: &B,
        target_url: &Url,
        disposition: WindowOpenDisposition,
    ) -> PopupDecision {
        match disposition {
            WindowOpenDisposition::NewPopup | WindowOpenDisposition::NewWindow => {
                debug!(url = %target_url, ?disposition, "Popup redirected to current browser");
                browser.load_url(target_url);
                PopupDecision::Cancel
            }
            _ => PopupDecision::Allow,
        }
    }

    fn on_after_created(&self, browser: B) {
        let id = browser.id();
        {
            let mut browsers = self.browsers.borrow_mut();
            if browsers.iter().any(|b| b.id() == id) {
                warn!(?id, "Browser already registered");
                return;
            }
            browsers.push(browser.clone());
        }
        BROWSER_COUNT.fetch_add(1, Ordering::Relaxed);

        let mut main = self.main_browser.borrow_mut();
        if main.is_none() {
            *main = Some(browser);
        }
        debug!(?id, alive = browser_count(), "Browser created");
    }

    fn do_close(&self, _browser: &B) -> bool {
        if self.browsers.borrow().len() == 1 {
            self.is_closing.set(true);
        }
        false
    }

    fn on_before_close(&self, browser: &B) {
        let id = browser.id();
        let now_empty = {
            let mut browsers = self.browsers.borrow_mut();
            let Some(pos) = browsers.iter().position(|b| b.id() == id) else {
                warn!(?id, "Close notification for unknown browser");
                return;
            };
            browsers.remove(pos);
            browsers.is_empty()
        };
        BROWSER_COUNT.fetch_sub(1, Ordering::Relaxed);
        debug!(?id, alive = browser_count(), "Browser closed");

        if now_empty {
            *self.main_browser.borrow_mut() = None;
            info!("Last browser closed, quitting message loop");
            self.message_loop.quit();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Affichage
// ─────────────────────────────────────────────────────────────────────────────

impl<B: Browser> DisplayHandler<B> for BrowserClient<B> {
    fn on_title_change(&self, _browser: &B, title: Option<&str>) -> String {
        self.window_title(title)
    }

    fn on_address_change(&self, _browser: &B, url: &Url, is_main_frame: bool) -> Option<Url> {
        is_main_frame.then(|| url.clone())
    }

    fn on_fullscreen_mode_change(&self, browser: &B, fullscreen: bool) {
        debug!(id = ?browser.id(), fullscreen, "Fullscreen mode changed");
    }

    fn on_console_message(
        &self,
        _browser: &B,
        level: ConsoleLevel,
        message: &str,
        source: &str,
        line: u32,
    ) -> bool {
        match level {
            ConsoleLevel::Debug => debug!(target: "console", source, line, "{message}"),
            ConsoleLevel::Log | ConsoleLevel::Info => {
                info!(target: "console", source, line, "{message}")
            }
            ConsoleLevel::Warning => warn!(target: "console", source, line, "{message}"),
            ConsoleLevel::Error => error!(target: "console", source, line, "{message}"),
        }
        false
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chargement
// ─────────────────────────────────────────────────────────────────────────────

impl<B: Browser> LoadHandler<B> for BrowserClient<B> {
    fn on_loading_state_change(
        &self,
        browser: &B,
        is_loading: bool,
        can_go_back: bool,
        can_go_forward: bool,
    ) {
        trace!(id = ?browser.id(), is_loading, can_go_back, can_go_forward, "Loading state");
    }

    fn on_load_start(&self, browser: &B, url: &Url) {
        debug!(id = ?browser.id(), url = %url, "Load started");
    }

    fn on_load_end(&self, browser: &B, http_status: Option<u16>) {
        debug!(id = ?browser.id(), ?http_status, "Load finished");
    }

    fn on_load_error(&self, browser: &B, error: &LoadError) -> bool {
        if error.code == LoadErrorCode::Aborted {
            return false;
        }
        // Une page d'erreur qui échoue ne doit pas en produire une autre.
        if error.failed_url.starts_with("data:") {
            warn!(code = %error.code, "Error page failed to load");
            return false;
        }

        warn!(url = %error.failed_url, code = %error.code, text = %error.text, "Load failed");
        let html = error_page::render(error, &self.locale);
        match Url::parse(&data_uri(html.as_bytes(), "text/html")) {
            Ok(url) => {
                browser.load_url(&url);
                true
            }
            Err(e) => {
                error!(error = %e, "Cannot build error page URL");
                false
            }
        }
    }
}

impl<B: Browser> RequestHandler<B> for BrowserClient<B> {
    fn on_before_browse(
        &self,
        _browser: &B,
        url: &Url,
        user_gesture: bool,
        is_redirect: bool,
    ) -> bool {
        trace!(url = %url, user_gesture, is_redirect, "Navigation allowed");
        false
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Menu contextuel
// ─────────────────────────────────────────────────────────────────────────────

impl<B: Browser> ContextMenuHandler<B> for BrowserClient<B> {
    fn on_before_context_menu(&self, _browser: &B, model: &mut MenuModel) {
        if model.count() > 0 {
            model.add_separator();
        }
        model.add_item(CommandId::RELOAD_PAGE, "Reload");
        model.add_item(CommandId::VIEW_SOURCE, "View Page Source");
        model.add_separator();
        model.add_item(CommandId::OPEN_DEVTOOLS, "Inspect Element");
        model.add_item(CommandId::COPY_URL, "Copy URL");
    }

    fn on_context_menu_command(&self, browser: &B, command: CommandId) -> bool {
        match command {
            CommandId::VIEW_SOURCE => browser.view_source(),
            CommandId::OPEN_DEVTOOLS => browser.show_dev_tools(),
            CommandId::CLOSE_DEVTOOLS => browser.close_dev_tools(),
            CommandId::RELOAD_PAGE => browser.reload(),
            CommandId::COPY_URL => browser.copy_url(),
            _ => return false,
        }
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clavier
// ─────────────────────────────────────────────────────────────────────────────

impl<B: Browser> KeyboardHandler<B> for BrowserClient<B> {
    fn on_pre_key_event(&self, browser: &B, event: &KeyEvent) -> KeyOutcome {
        let Some(shortcut) = Shortcut::match_event(event) else {
            return KeyOutcome::NotHandled;
        };
        debug!(?shortcut, "Keyboard shortcut");

        match shortcut {
            Shortcut::Reload => browser.reload(),
            Shortcut::HardReload => browser.reload_ignore_cache(),
            Shortcut::DevTools => browser.show_dev_tools(),
            Shortcut::FocusAddressBar => return KeyOutcome::Shortcut(shortcut),
            Shortcut::CloseBrowser => browser.close(false),
            Shortcut::Back => {
                if browser.can_go_back() {
                    browser.go_back();
                }
            }
            Shortcut::Forward => {
                if browser.can_go_forward() {
                    browser.go_forward();
                }
            }
        }
        KeyOutcome::Handled
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Téléchargements
// ─────────────────────────────────────────────────────────────────────────────

impl<B: Browser> DownloadHandler<B> for BrowserClient<B> {
    fn can_download(&self, _browser: &B, url: &Url, method: &str) -> bool {
        debug!(url = %url, method, "Download permitted");
        true
    }

    fn on_before_download(
        &self,
        _browser: &B,
        item: &DownloadItem,
        suggested_name: &str,
        callback: &dyn BeforeDownloadCallback,
    ) {
        info!(id = item.id, url = %item.url, suggested_name, "Download requested");
        callback.proceed(None, true);
    }

    fn on_download_updated(&self, _browser: &B, item: &DownloadItem) {
        match item.state {
            DownloadState::Complete => {
                info!(id = item.id, path = ?item.full_path, "Download complete")
            }
            DownloadState::Canceled => info!(id = item.id, "Download canceled"),
            DownloadState::Interrupted => warn!(id = item.id, "Download interrupted"),
            DownloadState::InProgress => trace!(
                id = item.id,
                received = item.received_bytes,
                percent = ?item.percent_complete(),
                "Download progress"
            ),
        }
    }
}
