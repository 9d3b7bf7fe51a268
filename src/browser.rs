//! Boucle d'événements Winit et gestion du cycle de vie du navigateur.
//!
//! ## Pattern "Two-Phase App"
//!
//! Winit 0.30 impose que les fenêtres soient créées à l'intérieur du callback
//! `resumed()`, et non dans `main()`. Mais Servo a besoin d'un handle de fenêtre
//! pour créer son `WindowRenderingContext`. D'où un enum à plusieurs états :
//!
//! ```text
//! App::Initial(Startup)  →  [resumed()]  →  App::Running(Rc<AppState>)
//!                                       ↘  App::Failed(ShellError)
//! ```
//!
//! ## Flux de communication
//!
//! ```text
//! Threads Servo ── wake() ──► EventLoopProxy::send_event(ShellEvent::Wake)
//! ShellProxy    ── close  ──► ShellEvent::CloseBrowser / CloseAllBrowsers
//!                                   │
//!                                   ▼
//!                  Winit EventLoop (thread principal)
//!                    └─ user_event() → servo.spin_event_loop() / fermetures
//!                          └─ WebViewDelegate → BrowserClient
//! ```
//!
//! La boucle se termine quand le client lève le [`QuitFlag`] : le dernier
//! navigateur vient de se fermer.
//!
//! ## Architecture du rendu
//!
//! ```text
//! Window (1280x800)
//! ┌──────────────────────────────────────┐
//! │ < > R [ adresse                    ] │  Chrome (40px), GL direct
//! ├──────────────────────────────────────┤
//! │ Servo WebView, OffscreenRenderCtx    │
//! │ blitté dans la zone restante         │
//! └──────────────────────────────────────┘
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use euclid::Scale;
use servo::{InputEvent, WheelDelta, WheelEvent, WheelMode};
use servo::{MouseButton as ServoMouseButton, MouseButtonAction, MouseButtonEvent};
use servo::{MouseLeftViewportEvent, MouseMoveEvent};
use servo::{
    OffscreenRenderingContext, RenderingContext, Servo, ServoBuilder, UserContentManager,
    UserScript, WebView, WebViewBuilder, WebViewId, WindowRenderingContext,
};
use tracing::{debug, error, info, warn};
use url::Url;
use webrender_api::units::DevicePoint;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{
    ElementState, KeyEvent as WinitKeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta,
    WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::Window;

use crate::app::{BrowserApp, CommandLine, switches};
use crate::chrome::{ChromeFrame, ChromeRenderer, ChromeTarget};
use crate::client::BrowserClient;
use crate::config::Config;
use crate::context_menu::{self, CommandId, ContextMenuOverlay, NavigationState};
use crate::engine::{
    Browser, ContextMenuHandler, KeyOutcome, KeyboardHandler, LifeSpanHandler,
};
use crate::error::ShellError;
use crate::keyutils;
use crate::popups::PendingPopups;
use crate::preferences::{build_servo_opts, build_servo_preferences};
use crate::rendering;
use crate::servo_glue::{self, QuitFlag, ServoBrowser, ShellEvent, ShellProxy, Waker};
use crate::shortcuts::Shortcut;
use crate::urlbar::UrlBar;

/// Pas d'une ligne de molette, en pixels.
const LINE_HEIGHT: f32 = 76.0;

// ─────────────────────────────────────────────────────────────────────────────
// AppState : état partagé entre Winit et Servo
// ─────────────────────────────────────────────────────────────────────────────

/// État partagé de l'application, créé lors de `resumed()`.
///
/// Encapsulé dans `Rc` : `WebViewDelegate` attend un `Rc<dyn WebViewDelegate>`
/// et tout vit sur le thread principal.
pub struct AppState {
    this: Weak<AppState>,

    pub window: Window,
    pub servo: Servo,

    /// Contexte fenêtre : chrome et blit du FBO.
    pub window_rendering_context: Rc<WindowRenderingContext>,
    /// Contexte offscreen dans lequel Servo peint les webviews.
    pub offscreen_context: Rc<OffscreenRenderingContext>,
    /// Scripts injectés dans chaque contexte de script.
    user_content: Rc<UserContentManager>,

    /// Registre des navigateurs et capacités. Le dernier est affiché.
    pub client: BrowserClient<ServoBrowser>,
    /// Webviews auxiliaires (`window.open`) en attente de leur URL cible,
    /// avec le navigateur qui les a demandées.
    pub pending_popups: RefCell<PendingPopups<WebViewId, (WebView, ServoBrowser)>>,
    pub quit: QuitFlag,
    pub proxy: ShellProxy,
    devtools_port: Option<u16>,

    pub urlbar: RefCell<UrlBar>,
    pub chrome: RefCell<ChromeRenderer>,
    pub context_menu: RefCell<Option<ContextMenuOverlay>>,
    pub hovered: Cell<Option<ChromeTarget>>,

    /// Position courante du curseur en pixels physiques de la fenêtre.
    pub cursor_position: Cell<DevicePoint>,
    pub modifiers: Cell<ModifiersState>,
}

impl AppState {
    pub(crate) fn self_rc(&self) -> Option<Rc<AppState>> {
        self.this.upgrade()
    }

    pub(crate) fn webview_context(&self) -> Rc<dyn RenderingContext> {
        self.offscreen_context.clone()
    }

    fn chrome_height(&self) -> f32 {
        self.chrome.borrow().height() as f32
    }

    pub fn browser_for(&self, webview: &WebView) -> Option<ServoBrowser> {
        self.client.find_browser(webview.id())
    }

    /// Navigateur affiché : le plus récent.
    pub fn active_browser(&self) -> Option<ServoBrowser> {
        self.client.browsers().pop()
    }

    fn nav_state(&self) -> NavigationState {
        self.active_browser()
            .map(|b| NavigationState {
                can_go_back: b.can_go_back(),
                can_go_forward: b.can_go_forward(),
                is_loading: b.is_loading(),
            })
            .unwrap_or_default()
    }

    // ── Navigateurs ─────────────────────────────────────────────────────

    /// Crée une webview sur `url` et l'enregistre auprès du client.
    pub fn create_browser(&self, url: Url) -> Option<ServoBrowser> {
        let delegate = self.self_rc()?;
        let webview = WebViewBuilder::new(&self.servo, self.webview_context())
            .url(url)
            .hidpi_scale_factor(Scale::new(self.window.scale_factor() as f32))
            .user_content_manager(self.user_content.clone())
            .delegate(delegate)
            .build();
        let browser = ServoBrowser::new(webview, self.proxy.clone(), self.devtools_port);
        self.client.on_after_created(browser.clone());
        Some(browser)
    }

    pub(crate) fn take_pending_popup(&self, webview: &WebView) -> Option<ServoBrowser> {
        let (_, parent) = self.pending_popups.borrow_mut().take(webview.id())?;
        Some(parent)
    }

    /// Abandonne une popup en attente. La webview est libérée avec la
    /// dernière référence.
    pub(crate) fn drop_pending_popup(&self, webview: &WebView, reason: &str) -> bool {
        let dropped = self.take_pending_popup(webview).is_some();
        if dropped {
            debug!(popup = ?webview.id(), reason, "Pending popup dropped");
        }
        dropped
    }

    /// Une popup autorisée devient un navigateur à part entière.
    pub(crate) fn adopt_popup(&self, webview: WebView) {
        let browser = ServoBrowser::new(webview, self.proxy.clone(), self.devtools_port);
        self.client.on_after_created(browser);
        self.window.request_redraw();
    }

    /// Fermeture demandée par `Browser::close` (via `ShellEvent`).
    fn handle_close_request(&self, id: WebViewId, force: bool) {
        match self.client.find_browser(id) {
            Some(browser) => {
                debug!(?id, force, "Close requested");
                self.finish_close(&browser);
            }
            None => debug!(?id, "Close request for unknown browser"),
        }
    }

    /// Retire `browser` du registre. La webview est libérée avec la
    /// dernière référence.
    pub(crate) fn finish_close(&self, browser: &ServoBrowser) {
        if self.client.do_close(browser) {
            return;
        }
        self.client.on_before_close(browser);

        let id = browser.id();
        let orphans = self
            .pending_popups
            .borrow_mut()
            .retain(|(_, parent)| parent.id() != id);
        if orphans > 0 {
            debug!(?id, orphans, "Pending popups of closed browser dropped");
        }

        if let Some(active) = self.active_browser()
            && let Some(url) = active.url()
        {
            self.urlbar.borrow_mut().set_url(&url);
        }
        self.window.request_redraw();
    }

    // ── Commandes ───────────────────────────────────────────────────────

    fn navigate(&self, url: Url) {
        if let Some(browser) = self.active_browser() {
            info!(%url, "Navigate");
            browser.load_url(&url);
        }
    }

    fn run_chrome_target(&self, target: ChromeTarget) {
        match target {
            ChromeTarget::AddressBar => self.urlbar.borrow_mut().focus(),
            ChromeTarget::Back | ChromeTarget::Forward | ChromeTarget::ReloadStop => {
                let Some(browser) = self.active_browser() else {
                    return;
                };
                let nav = self.nav_state();
                let command = match target {
                    ChromeTarget::Back => CommandId::BACK,
                    ChromeTarget::Forward => CommandId::FORWARD,
                    _ if nav.is_loading => CommandId::STOPLOAD,
                    _ => CommandId::RELOAD,
                };
                context_menu::run_builtin_command(&browser, command);
            }
        }
        self.window.request_redraw();
    }

    fn open_context_menu(&self, at: DevicePoint) {
        let Some(browser) = self.active_browser() else {
            return;
        };
        let mut model = context_menu::default_model(self.nav_state());
        self.client.on_before_context_menu(&browser, &mut model);

        let size = self.window.inner_size();
        let overlay = ContextMenuOverlay::open(
            model,
            (at.x, at.y),
            (size.width as f32, size.height as f32),
        );
        *self.context_menu.borrow_mut() = Some(overlay);
        self.window.request_redraw();
    }

    fn execute_menu_command(&self, command: CommandId) {
        let Some(browser) = self.active_browser() else {
            return;
        };
        if !self.client.on_context_menu_command(&browser, command)
            && !context_menu::run_builtin_command(&browser, command)
        {
            warn!(command = command.0, "Unhandled context menu command");
        }
    }

    // ── Rendu ───────────────────────────────────────────────────────────

    fn redraw(&self) {
        let inner_size = self.window.inner_size();
        let chrome_h = self.chrome.borrow().height();

        // 1. Servo peint dans le FBO offscreen
        if let Some(browser) = self.active_browser() {
            browser.webview().paint();
        }

        // 2. Blit du FBO dans la zone sous la barre (origine GL en bas à gauche)
        self.window_rendering_context.prepare_for_rendering();
        if let Some(blit) = self.offscreen_context.render_to_parent_callback() {
            let gl = self.window_rendering_context.glow_gl_api();
            let content = rendering::content_size(inner_size, chrome_h);
            let target_rect = euclid::default::Rect::new(
                euclid::default::Point2D::new(0, 0),
                euclid::default::Size2D::new(content.width as i32, content.height as i32),
            );
            blit(&gl, target_rect);
        }

        // 3. Barre d'outils et menu
        let urlbar = self.urlbar.borrow();
        let menu = self.context_menu.borrow();
        let frame = ChromeFrame {
            width: inner_size.width,
            height: inner_size.height,
            address: urlbar.display_text(),
            focused: urlbar.is_focused(),
            cursor: urlbar.is_focused().then(|| urlbar.cursor_char_offset()),
            nav: self.nav_state(),
            hovered: self.hovered.get(),
            menu: menu.as_ref(),
        };
        // SAFETY: le contexte fenêtre est courant depuis prepare_for_rendering.
        unsafe { self.chrome.borrow().draw(&frame) };

        // 4. Présenter
        self.window_rendering_context.present();
    }

    // ── Événements fenêtre ──────────────────────────────────────────────

    fn handle_window_event(&self, event: WindowEvent) {
        let chrome_h = self.chrome_height();

        match event {
            WindowEvent::CloseRequested => {
                info!("Window close requested");
                self.close_all_browsers(false);
            }

            WindowEvent::RedrawRequested => self.redraw(),

            WindowEvent::Resized(new_size) => {
                self.window_rendering_context.resize(new_size);
                self.offscreen_context
                    .resize(rendering::content_size(new_size, chrome_h as u32));
                self.context_menu.borrow_mut().take();
                self.window.request_redraw();
            }

            WindowEvent::ModifiersChanged(new_modifiers) => {
                self.modifiers.set(new_modifiers.state());
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let pos = self.cursor_position.get();
                if pos.y < chrome_h || self.context_menu.borrow().is_some() {
                    return;
                }
                let (x, y, mode) = match delta {
                    MouseScrollDelta::LineDelta(dx, dy) => (
                        (dx * LINE_HEIGHT) as f64,
                        (dy * LINE_HEIGHT) as f64,
                        WheelMode::DeltaLine,
                    ),
                    MouseScrollDelta::PixelDelta(delta) => {
                        (delta.x, delta.y, WheelMode::DeltaPixel)
                    }
                };
                if let Some(browser) = self.active_browser() {
                    let adjusted = DevicePoint::new(pos.x, pos.y - chrome_h);
                    browser.webview().notify_input_event(InputEvent::Wheel(WheelEvent::new(
                        WheelDelta { x, y, z: 0.0, mode },
                        adjusted.into(),
                    )));
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let point = DevicePoint::new(position.x as f32, position.y as f32);
                self.cursor_position.set(point);

                if let Some(menu) = self.context_menu.borrow_mut().as_mut() {
                    if menu.update_hover(point.x, point.y) {
                        self.window.request_redraw();
                    }
                    return;
                }

                let hovered = if point.y < chrome_h {
                    self.chrome
                        .borrow()
                        .layout(self.window.inner_size().width)
                        .hit_test(point.x, point.y)
                } else {
                    None
                };
                if self.hovered.replace(hovered) != hovered {
                    self.window.request_redraw();
                }

                if point.y >= chrome_h
                    && let Some(browser) = self.active_browser()
                {
                    let adjusted = DevicePoint::new(point.x, point.y - chrome_h);
                    let event = MouseMoveEvent::new(adjusted.into());
                    browser
                        .webview()
                        .notify_input_event(InputEvent::MouseMove(event));
                }
            }

            WindowEvent::CursorLeft { .. } => {
                if self.hovered.take().is_some() {
                    self.window.request_redraw();
                }
                if let Some(browser) = self.active_browser() {
                    browser.webview().notify_input_event(InputEvent::MouseLeftViewport(
                        MouseLeftViewportEvent::default(),
                    ));
                }
            }

            WindowEvent::MouseInput {
                state: btn_state,
                button,
                ..
            } => self.handle_mouse_button(btn_state, button, chrome_h),

            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event),

            _ => (),
        }
    }

    fn handle_mouse_button(
        &self,
        btn_state: ElementState,
        button: WinitMouseButton,
        chrome_h: f32,
    ) {
        let pos = self.cursor_position.get();
        let pressed = btn_state == ElementState::Pressed;

        // ── Menu ouvert : il capture tous les clics ──────────────────
        let open_menu = self.context_menu.borrow().clone();
        if let Some(menu) = open_menu {
            if pressed {
                let command = menu
                    .item_at(pos.x, pos.y)
                    .and_then(|index| menu.model.command_at(index));
                self.context_menu.borrow_mut().take();
                if let Some(command) = command {
                    self.execute_menu_command(command);
                }
                self.window.request_redraw();
            }
            return;
        }

        // ── Barre d'outils ────────────────────────────────────────────
        if pos.y < chrome_h {
            if pressed && button == WinitMouseButton::Left {
                let target = self
                    .chrome
                    .borrow()
                    .layout(self.window.inner_size().width)
                    .hit_test(pos.x, pos.y);
                match target {
                    Some(target) => self.run_chrome_target(target),
                    None => {
                        self.urlbar.borrow_mut().unfocus();
                        self.window.request_redraw();
                    }
                }
            }
            return;
        }

        // ── Zone webview ──────────────────────────────────────────────
        if pressed && self.urlbar.borrow().is_focused() {
            self.urlbar.borrow_mut().unfocus();
            self.window.request_redraw();
        }
        if button == WinitMouseButton::Right {
            if pressed {
                self.open_context_menu(pos);
            }
            return;
        }

        let Some(browser) = self.active_browser() else {
            return;
        };
        let servo_button = match button {
            WinitMouseButton::Left => ServoMouseButton::Left,
            WinitMouseButton::Right => ServoMouseButton::Right,
            WinitMouseButton::Middle => ServoMouseButton::Middle,
            WinitMouseButton::Back => ServoMouseButton::Back,
            WinitMouseButton::Forward => ServoMouseButton::Forward,
            WinitMouseButton::Other(id) => ServoMouseButton::Other(id),
        };
        let action = if pressed {
            MouseButtonAction::Down
        } else {
            MouseButtonAction::Up
        };
        let adjusted = DevicePoint::new(pos.x, pos.y - chrome_h);
        browser.webview().notify_input_event(InputEvent::MouseButton(MouseButtonEvent::new(
            action,
            servo_button,
            adjusted.into(),
        )));
    }

    fn handle_key(&self, event: &WinitKeyEvent) {
        let mods = self.modifiers.get();
        let Some(browser) = self.active_browser() else {
            return;
        };

        // ── Raccourcis, avant tout le reste ──────────────────────────
        let shell_event =
            keyutils::shell_key_event(event.state, &event.logical_key, &event.physical_key, mods);
        match self.client.on_pre_key_event(&browser, &shell_event) {
            KeyOutcome::Handled => {
                self.window.request_redraw();
                return;
            }
            KeyOutcome::Shortcut(Shortcut::FocusAddressBar) => {
                self.urlbar.borrow_mut().focus();
                self.window.request_redraw();
                return;
            }
            KeyOutcome::Shortcut(_) | KeyOutcome::NotHandled => {}
        }

        if event.state == ElementState::Pressed
            && self.context_menu.borrow().is_some()
            && event.logical_key == Key::Named(NamedKey::Escape)
        {
            self.context_menu.borrow_mut().take();
            self.window.request_redraw();
            return;
        }

        // ── Barre d'adresse focusée : consomme les touches ───────────
        if self.urlbar.borrow().is_focused() {
            if event.state == ElementState::Pressed {
                self.edit_address_bar(event, mods);
                self.window.request_redraw();
            }
            return;
        }

        // ── Vers Servo ───────────────────────────────────────────────
        let keyboard_event = keyutils::keyboard_event_from_winit(event, mods);
        browser
            .webview()
            .notify_input_event(InputEvent::Keyboard(keyboard_event));
        self.client.on_key_event(&browser, &shell_event);
    }

    fn edit_address_bar(&self, event: &WinitKeyEvent, mods: ModifiersState) {
        let mut urlbar = self.urlbar.borrow_mut();
        match &event.logical_key {
            Key::Named(NamedKey::Enter) => {
                if let Some(url) = urlbar.submit() {
                    drop(urlbar);
                    self.navigate(url);
                }
            }
            Key::Named(NamedKey::Escape) => urlbar.unfocus(),
            Key::Named(NamedKey::Backspace) => urlbar.backspace(),
            Key::Named(NamedKey::Delete) => urlbar.delete(),
            Key::Named(NamedKey::ArrowLeft) => urlbar.move_cursor_left(),
            Key::Named(NamedKey::ArrowRight) => urlbar.move_cursor_right(),
            Key::Named(NamedKey::Home) => urlbar.home(),
            Key::Named(NamedKey::End) => urlbar.end(),
            Key::Named(NamedKey::Space) => urlbar.insert_char(' '),
            Key::Character(c) => {
                if mods.control_key() && c.eq_ignore_ascii_case("a") {
                    urlbar.select_all();
                } else if !mods.control_key() && !mods.alt_key() {
                    for ch in c.chars() {
                        urlbar.insert_char(ch);
                    }
                }
            }
            _ => {}
        }
    }

    /// Ferme tous les navigateurs. Tout de suite sur le thread UI, sinon
    /// via la boucle d'événements.
    pub fn close_all_browsers(&self, force: bool) {
        let event = ShellEvent::CloseAllBrowsers { force };
        let dispatch = self.proxy.run_or_post(event, |event| self.handle_shell_event(event));
        debug!(?dispatch, force, "Close all browsers");
    }

    fn handle_shell_event(&self, event: ShellEvent) {
        match event {
            ShellEvent::Wake => self.servo.spin_event_loop(),
            ShellEvent::CloseBrowser { id, force } => self.handle_close_request(id, force),
            ShellEvent::CloseAllBrowsers { force } => self.client.close_all_browsers(force),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App : enum deux phases
// ─────────────────────────────────────────────────────────────────────────────

/// Tout ce qu'il faut pour démarrer dans `resumed()`.
pub struct Startup {
    waker: Waker,
    proxy: ShellProxy,
    config: Config,
    command_line: CommandLine,
    initial_url: Url,
}

/// Application à deux phases de vie.
pub enum App {
    /// Pré-initialisation : on attend que Winit appelle `resumed()`.
    Initial(Box<Startup>),
    /// Le navigateur est actif.
    Running(Rc<AppState>),
    /// Le démarrage a échoué, la boucle est en train de sortir.
    Failed(ShellError),
}

impl App {
    pub fn new(
        event_loop: &EventLoop<ShellEvent>,
        config: Config,
        command_line: CommandLine,
        initial_url: Url,
    ) -> Self {
        Self::Initial(Box::new(Startup {
            waker: Waker::new(event_loop),
            proxy: servo_glue::shell_proxy(event_loop),
            config,
            command_line,
            initial_url,
        }))
    }
}

fn start(event_loop: &ActiveEventLoop, startup: &Startup) -> Result<Rc<AppState>, ShellError> {
    let config = &startup.config;

    // ── 1. Fenêtre ──────────────────────────────────────────────────
    let window_attributes = Window::default_attributes()
        .with_title(&config.general.window_title)
        .with_inner_size(LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ));
    let window = event_loop.create_window(window_attributes)?;

    let display_handle = event_loop
        .display_handle()
        .map_err(|e| ShellError::Rendering(format!("display handle: {e}")))?;
    let window_handle = window
        .window_handle()
        .map_err(|e| ShellError::Rendering(format!("window handle: {e}")))?;

    // ── 2. Contextes de rendu ───────────────────────────────────────
    let window_rendering_context =
        rendering::create_rendering_context(display_handle, window_handle, window.inner_size())?;
    let offscreen_context = rendering::create_webview_context(
        &window_rendering_context,
        rendering::content_size(window.inner_size(), config.chrome.height),
    );

    // ── 3. Chrome ───────────────────────────────────────────────────
    let gl = window_rendering_context.glow_gl_api();
    // SAFETY: le contexte fenêtre vient d'être rendu courant.
    let chrome_renderer = unsafe { ChromeRenderer::new(gl, &config.chrome)? };

    // ── 4. Servo ────────────────────────────────────────────────────
    let servo = ServoBuilder::default()
        .opts(build_servo_opts(config, &startup.command_line))
        .preferences(build_servo_preferences(config, &startup.command_line))
        .event_loop_waker(Box::new(startup.waker.clone()))
        .build();

    let user_content = Rc::new(UserContentManager::new(&servo));
    let script = BrowserApp::new(config).on_context_created();
    user_content.add_script(Rc::new(UserScript::from(script.as_str())));

    // ── 5. AppState ─────────────────────────────────────────────────
    let quit = QuitFlag::default();
    let devtools_port = startup
        .command_line
        .switch_value_parsed::<u16>(switches::REMOTE_DEBUGGING_PORT);
    let app_state = Rc::new_cyclic(|this| AppState {
        this: this.clone(),
        window,
        servo,
        window_rendering_context,
        offscreen_context,
        user_content,
        client: BrowserClient::new(
            Box::new(quit.clone()),
            config.general.window_title.clone(),
            config.general.locale.clone(),
        ),
        pending_popups: RefCell::new(PendingPopups::new()),
        quit,
        proxy: startup.proxy.clone(),
        devtools_port,
        urlbar: RefCell::new(UrlBar::new(config.search.engine_url.clone())),
        chrome: RefCell::new(chrome_renderer),
        context_menu: RefCell::new(None),
        hovered: Cell::new(None),
        cursor_position: Cell::new(DevicePoint::zero()),
        modifiers: Cell::new(ModifiersState::default()),
    });

    // ── 6. Navigateur initial ───────────────────────────────────────
    app_state.urlbar.borrow_mut().set_url(&startup.initial_url);
    app_state.create_browser(startup.initial_url.clone());
    info!(url = %startup.initial_url, "Browser started");

    Ok(app_state)
}

// ─────────────────────────────────────────────────────────────────────────────
// ApplicationHandler : dispatch des événements Winit
// ─────────────────────────────────────────────────────────────────────────────

impl ApplicationHandler<ShellEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Self::Initial(startup) = self else {
            return;
        };
        *self = match start(event_loop, startup) {
            Ok(state) => Self::Running(state),
            Err(e) => {
                error!("Startup failed: {e}");
                event_loop.exit();
                Self::Failed(e)
            }
        };
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ShellEvent) {
        let Self::Running(state) = self else {
            return;
        };
        let state = state.clone();
        state.handle_shell_event(event);
        if state.quit.is_set() {
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Self::Running(state) = self else {
            return;
        };
        let state = state.clone();

        // Toujours faire tourner la boucle Servo en premier.
        state.servo.spin_event_loop();
        state.handle_window_event(event);

        if state.quit.is_set() {
            event_loop.exit();
        }
    }
}
