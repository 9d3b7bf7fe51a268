//! Couche d'intégration entre Servo et le client du navigateur.
//!
//! 1. **[`Waker`] / [`ShellEvent`]** : le pont `Send + Sync` entre les threads
//!    internes de Servo et le thread principal Winit.
//!
//! 2. **[`ShellProxy`]** : [`ShellEvent`] adressés au thread UI depuis
//!    n'importe quel thread (voir [`crate::ui_thread`]).
//!
//! 3. **[`ServoBrowser`]** : une `WebView` vue à travers le trait
//!    [`Browser`](crate::engine::Browser).
//!
//! 4. **[`WebViewDelegate`] pour [`AppState`]** : traduit les callbacks Servo
//!    en appels aux capacités du [`BrowserClient`](crate::client::BrowserClient).

use std::cell::Cell;
use std::rc::Rc;

use servo::{
    ConsoleLogLevel, LoadStatus, NavigationRequest, WebResourceLoad, WebResourceResponse, WebView,
    WebViewBuilder, WebViewDelegate, WebViewId,
};
use tracing::{debug, info, warn};
use url::Url;
use winit::event_loop::{EventLoop, EventLoopProxy};

use crate::browser::AppState;
use crate::ui_thread::{UiSink, UiThread};
use crate::popups;
use crate::engine::{
    Browser, ConsoleLevel, DisplayHandler, LifeSpanHandler, LoadError, LoadErrorCode, LoadHandler,
    MessageLoop, PopupDecision, RequestHandler, WindowOpenDisposition,
};

// ─────────────────────────────────────────────────────────────────────────────
// Waker : pont Servo → Winit
// ─────────────────────────────────────────────────────────────────────────────

/// Événements reçus par la boucle Winit dans `user_event()`.
#[derive(Debug, Clone)]
pub enum ShellEvent {
    /// Servo a du travail pour le thread principal.
    Wake,
    /// Fermeture d'un navigateur, demandée par [`Browser::close`].
    CloseBrowser { id: WebViewId, force: bool },
    /// Fermeture de tous les navigateurs, depuis n'importe quel thread.
    CloseAllBrowsers { force: bool },
}

/// Pont thread-safe entre les threads internes de Servo et la boucle
/// d'événements Winit.
///
/// `Clone + Send + Sync` car `EventLoopProxy` l'est, ce qu'exige
/// `EventLoopWaker: 'static + Send + Sync`.
#[derive(Clone)]
pub struct Waker(EventLoopProxy<ShellEvent>);

impl Waker {
    pub fn new(event_loop: &EventLoop<ShellEvent>) -> Self {
        Self(event_loop.create_proxy())
    }
}

impl embedder_traits::EventLoopWaker for Waker {
    fn clone_box(&self) -> Box<dyn embedder_traits::EventLoopWaker> {
        Box::new(Self(self.0.clone()))
    }

    fn wake(&self) {
        if let Err(error) = self.0.send_event(ShellEvent::Wake) {
            warn!(?error, "Échec du réveil de la boucle d'événements Winit");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ShellProxy : fermeture inter-threads
// ─────────────────────────────────────────────────────────────────────────────

/// Poignée `Send` pour adresser des [`ShellEvent`] au thread UI.
pub type ShellProxy = UiThread<EventLoopProxy<ShellEvent>>;

pub fn shell_proxy(event_loop: &EventLoop<ShellEvent>) -> ShellProxy {
    UiThread::new(event_loop.create_proxy())
}

impl UiSink<ShellEvent> for EventLoopProxy<ShellEvent> {
    fn post(&self, event: ShellEvent) -> bool {
        match self.send_event(event) {
            Ok(()) => true,
            Err(error) => {
                warn!(?error, "Event loop closed");
                false
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// QuitFlag : MessageLoop côté Winit
// ─────────────────────────────────────────────────────────────────────────────

/// Levé par le client quand le dernier navigateur se ferme. La boucle Winit
/// le consulte après chaque événement et appelle `exit()`.
#[derive(Clone, Default)]
pub struct QuitFlag(Rc<Cell<bool>>);

impl QuitFlag {
    pub fn is_set(&self) -> bool {
        self.0.get()
    }
}

impl MessageLoop for QuitFlag {
    fn quit(&self) {
        self.0.set(true);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ServoBrowser
// ─────────────────────────────────────────────────────────────────────────────

/// État de navigation suivi depuis les notifications Servo.
#[derive(Default)]
pub struct NavState {
    pub can_go_back: Cell<bool>,
    pub can_go_forward: Cell<bool>,
    pub loading: Cell<bool>,
}

/// Une `WebView` Servo derrière le trait [`Browser`].
#[derive(Clone)]
pub struct ServoBrowser {
    webview: WebView,
    nav: Rc<NavState>,
    proxy: ShellProxy,
    devtools_port: Option<u16>,
}

impl ServoBrowser {
    pub fn new(webview: WebView, proxy: ShellProxy, devtools_port: Option<u16>) -> Self {
        Self {
            webview,
            nav: Rc::new(NavState::default()),
            proxy,
            devtools_port,
        }
    }

    pub fn webview(&self) -> &WebView {
        &self.webview
    }

    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    pub fn is_loading(&self) -> bool {
        self.nav.loading.get()
    }
}

impl Browser for ServoBrowser {
    type Id = WebViewId;

    fn id(&self) -> WebViewId {
        self.webview.id()
    }

    fn url(&self) -> Option<Url> {
        self.webview.url()
    }

    fn load_url(&self, url: &Url) {
        self.webview.load(url.clone());
    }

    fn reload(&self) {
        self.webview.reload();
    }

    fn reload_ignore_cache(&self) {
        // Servo n'expose pas de rechargement sans cache.
        debug!("Hard reload requested, falling back to reload");
        self.webview.reload();
    }

    fn stop_load(&self) {
        self.webview.evaluate_javascript("window.stop()", |_| {});
    }

    fn can_go_back(&self) -> bool {
        self.nav.can_go_back.get()
    }

    fn can_go_forward(&self) -> bool {
        self.nav.can_go_forward.get()
    }

    fn go_back(&self) {
        self.webview.go_back(1);
    }

    fn go_forward(&self) {
        self.webview.go_forward(1);
    }

    fn show_dev_tools(&self) {
        match self.devtools_port {
            Some(port) => info!(
                port,
                "Devtools server listening, \
                 connect with Firefox about:debugging to localhost:{port}"
            ),
            None => warn!("Devtools server disabled (no --remote-debugging-port)"),
        }
    }

    fn close_dev_tools(&self) {
        debug!("Devtools run in an external client, nothing to close");
    }

    fn view_source(&self) {
        let Some(url) = self.webview.url() else {
            return;
        };
        match Url::parse(&format!("view-source:{url}")) {
            Ok(source) => self.webview.load(source),
            Err(e) => warn!(%url, "Cannot build view-source URL: {e}"),
        }
    }

    fn copy_url(&self) {
        let Some(url) = self.webview.url() else {
            return;
        };
        match arboard::Clipboard::new().and_then(|mut c| c.set_text(url.to_string())) {
            Ok(()) => debug!(%url, "URL copied"),
            Err(e) => warn!("Clipboard unavailable: {e}"),
        }
    }

    /// Asynchrone, comme la fermeture d'un navigateur par le moteur : le
    /// client peut appeler `close` pendant qu'il parcourt son registre.
    fn close(&self, force: bool) {
        self.proxy.post(ShellEvent::CloseBrowser { id: self.id(), force });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WebViewDelegate : callbacks Servo → client
// ─────────────────────────────────────────────────────────────────────────────

/// Exécute `f` sans laisser une panique remonter dans Servo.
fn guarded(what: &str, f: impl FnOnce()) {
    if std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).is_err() {
        warn!(callback = what, "Panic in webview delegate");
    }
}

fn console_level(level: ConsoleLogLevel) -> ConsoleLevel {
    match level {
        ConsoleLogLevel::Debug => ConsoleLevel::Debug,
        ConsoleLogLevel::Info => ConsoleLevel::Info,
        ConsoleLogLevel::Warn => ConsoleLevel::Warning,
        ConsoleLogLevel::Error => ConsoleLevel::Error,
        _ => ConsoleLevel::Log,
    }
}

impl WebViewDelegate for AppState {
    fn notify_new_frame_ready(&self, _webview: WebView) {
        guarded("new_frame_ready", || self.window.request_redraw());
    }

    fn notify_url_changed(&self, webview: WebView, url: Url) {
        guarded("url_changed", || {
            if popups::settles_popup(&url)
                && self.drop_pending_popup(&webview, "document shown without a page request")
            {
                return;
            }
            let Some(browser) = self.browser_for(&webview) else {
                return;
            };
            if let Some(shown) = self.client.on_address_change(&browser, &url, true) {
                self.urlbar.borrow_mut().set_url(&shown);
                self.window.request_redraw();
            }
        });
    }

    fn notify_page_title_changed(&self, webview: WebView, title: Option<String>) {
        guarded("page_title_changed", || {
            let Some(browser) = self.browser_for(&webview) else {
                return;
            };
            let title = self.client.on_title_change(&browser, title.as_deref());
            self.window.set_title(&title);
        });
    }

    fn notify_load_status_changed(&self, webview: WebView, status: LoadStatus) {
        guarded("load_status_changed", || {
            if matches!(status, LoadStatus::Complete)
                && webview.url().is_some_and(|url| popups::settles_popup(&url))
                && self.drop_pending_popup(&webview, "load completed without a page request")
            {
                return;
            }
            let Some(browser) = self.browser_for(&webview) else {
                return;
            };
            let loading = !matches!(status, LoadStatus::Complete);
            match status {
                LoadStatus::Started => {
                    if let Some(url) = browser.url() {
                        self.client.on_load_start(&browser, &url);
                    }
                }
                LoadStatus::Complete => self.client.on_load_end(&browser, None),
                _ => {}
            }
            if browser.nav().loading.replace(loading) != loading {
                self.client.on_loading_state_change(
                    &browser,
                    loading,
                    browser.can_go_back(),
                    browser.can_go_forward(),
                );
                self.window.request_redraw();
            }
        });
    }

    fn notify_history_changed(&self, webview: WebView, entries: Vec<Url>, current: usize) {
        guarded("history_changed", || {
            let Some(browser) = self.browser_for(&webview) else {
                return;
            };
            let nav = browser.nav();
            nav.can_go_back.set(current > 0);
            nav.can_go_forward.set(current + 1 < entries.len());
            self.client.on_loading_state_change(
                &browser,
                nav.loading.get(),
                nav.can_go_back.get(),
                nav.can_go_forward.get(),
            );
            self.window.request_redraw();
        });
    }

    fn show_console_message(&self, webview: WebView, level: ConsoleLogLevel, message: String) {
        guarded("console_message", || {
            if let Some(browser) = self.browser_for(&webview) {
                let source = browser.url().map(|u| u.to_string()).unwrap_or_default();
                self.client
                    .on_console_message(&browser, console_level(level), &message, &source, 0);
            }
        });
    }

    fn notify_crashed(&self, webview: WebView, reason: String, _backtrace: Option<String>) {
        guarded("crashed", || {
            let Some(browser) = self.browser_for(&webview) else {
                return;
            };
            let failed_url = browser.url().map(|u| u.to_string()).unwrap_or_default();
            warn!(%failed_url, %reason, "Content process crashed");
            let error = LoadError::new(LoadErrorCode::Failed, failed_url).with_text(reason);
            self.client.on_load_error(&browser, &error);
        });
    }

    fn notify_closed(&self, webview: WebView) {
        guarded("closed", || {
            if let Some(browser) = self.browser_for(&webview) {
                self.finish_close(&browser);
            } else {
                self.drop_pending_popup(&webview, "closed before its first page");
            }
        });
    }

    /// `window.open()` : on crée une webview auxiliaire jamais affichée. Sa
    /// première requête de page révèle l'URL cible, routée par
    /// `on_before_popup` (voir `load_web_resource`).
    fn request_open_auxiliary_webview(&self, parent: WebView) -> Option<WebView> {
        let parent = self.browser_for(&parent)?;
        let popup = WebViewBuilder::new_auxiliary(&self.servo, self.webview_context())
            .delegate(self.self_rc()?)
            .build();
        debug!(parent = ?parent.id(), popup = ?popup.id(), "Auxiliary webview pending");
        self.pending_popups
            .borrow_mut()
            .insert(popup.id(), (popup.clone(), parent));
        Some(popup)
    }

    fn request_navigation(&self, webview: WebView, navigation_request: NavigationRequest) {
        let deny = self
            .browser_for(&webview)
            .is_some_and(|browser| {
                self.client
                    .on_before_browse(&browser, &navigation_request.url, true, false)
            });
        if deny {
            navigation_request.deny();
        } else {
            navigation_request.allow();
        }
    }

    fn load_web_resource(&self, webview: WebView, load: WebResourceLoad) {
        guarded("load_web_resource", || {
            let request = load.request();
            if !request.is_for_main_frame {
                return;
            }
            let url = request.url.clone();

            // Première page d'une popup : rabattue selon le client.
            if let Some(parent) = self.take_pending_popup(&webview) {
                let decision =
                    self.client
                        .on_before_popup(&parent, &url, WindowOpenDisposition::NewPopup);
                if decision == PopupDecision::Cancel {
                    load.intercept(WebResourceResponse::new(url)).cancel();
                    return;
                }
                self.adopt_popup(webview.clone());
            }

            let Some(browser) = self.browser_for(&webview) else {
                return;
            };
            if let Some(error) = LoadError::for_unreachable(&url) {
                load.intercept(WebResourceResponse::new(url)).cancel();
                self.client.on_load_error(&browser, &error);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_levels() {
        assert_eq!(console_level(ConsoleLogLevel::Warn), ConsoleLevel::Warning);
        assert_eq!(console_level(ConsoleLogLevel::Error), ConsoleLevel::Error);
        assert_eq!(console_level(ConsoleLogLevel::Log), ConsoleLevel::Log);
    }

    #[test]
    fn test_quit_flag() {
        let flag = QuitFlag::default();
        let shared = flag.clone();
        assert!(!flag.is_set());
        shared.quit();
        assert!(flag.is_set());
    }

    #[test]
    fn test_guarded_swallows_panic() {
        guarded("test", || panic!("boom"));
    }
}
