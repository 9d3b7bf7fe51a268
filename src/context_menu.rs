//! Menu contextuel : modèle, commandes et géométrie de l'overlay.
//!
//! Le modèle part des entrées intégrées (précédent, suivant, recharger ou
//! arrêter) puis le client y ajoute ses propres entrées via
//! [`ContextMenuHandler::on_before_context_menu`](crate::engine::ContextMenuHandler).
//! L'overlay est dessiné par [`crate::chrome`] sous le curseur.

use crate::engine::Browser;

/// Identifiant de commande. Les valeurs `< USER_FIRST` sont réservées aux
/// entrées intégrées.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(pub i32);

impl CommandId {
    pub const BACK: Self = Self(100);
    pub const FORWARD: Self = Self(101);
    pub const RELOAD: Self = Self(102);
    pub const RELOAD_NOCACHE: Self = Self(103);
    pub const STOPLOAD: Self = Self(104);

    pub const USER_FIRST: Self = Self(26500);
    pub const VIEW_SOURCE: Self = Self(26500);
    pub const OPEN_DEVTOOLS: Self = Self(26501);
    pub const CLOSE_DEVTOOLS: Self = Self(26502);
    pub const RELOAD_PAGE: Self = Self(26503);
    pub const COPY_URL: Self = Self(26504);

    pub fn is_user(self) -> bool {
        self.0 >= Self::USER_FIRST.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Command {
        id: CommandId,
        label: String,
        enabled: bool,
    },
    Separator,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuModel {
    items: Vec<MenuItem>,
}

impl MenuModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn add_item(&mut self, id: CommandId, label: impl Into<String>) {
        self.add_item_enabled(id, label, true);
    }

    pub fn add_item_enabled(&mut self, id: CommandId, label: impl Into<String>, enabled: bool) {
        self.items.push(MenuItem::Command {
            id,
            label: label.into(),
            enabled,
        });
    }

    pub fn add_separator(&mut self) {
        self.items.push(MenuItem::Separator);
    }

    /// Commande à l'index `index`, si c'est une entrée active.
    pub fn command_at(&self, index: usize) -> Option<CommandId> {
        match self.items.get(index)? {
            MenuItem::Command {
                id, enabled: true, ..
            } => Some(*id),
            _ => None,
        }
    }
}

/// État de navigation utilisé pour activer les entrées intégrées.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub is_loading: bool,
}

/// Entrées intégrées, avant l'ajout des entrées du client.
pub fn default_model(nav: NavigationState) -> MenuModel {
    let mut model = MenuModel::new();
    model.add_item_enabled(CommandId::BACK, "Back", nav.can_go_back);
    model.add_item_enabled(CommandId::FORWARD, "Forward", nav.can_go_forward);
    if nav.is_loading {
        model.add_item(CommandId::STOPLOAD, "Stop");
    } else {
        model.add_item(CommandId::RELOAD, "Reload");
    }
    model
}

/// Exécute une commande intégrée. `false` si `id` n'en est pas une.
pub fn run_builtin_command<B: Browser>(browser: &B, id: CommandId) -> bool {
    match id {
        CommandId::BACK => {
            if browser.can_go_back() {
                browser.go_back();
            }
        }
        CommandId::FORWARD => {
            if browser.can_go_forward() {
                browser.go_forward();
            }
        }
        CommandId::RELOAD => browser.reload(),
        CommandId::RELOAD_NOCACHE => browser.reload_ignore_cache(),
        CommandId::STOPLOAD => browser.stop_load(),
        _ => return false,
    }
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay
// ─────────────────────────────────────────────────────────────────────────────

pub const MENU_WIDTH: f32 = 200.0;
pub const ITEM_HEIGHT: f32 = 24.0;
pub const SEPARATOR_HEIGHT: f32 = 9.0;
pub const MENU_PADDING: f32 = 4.0;

/// Menu ouvert à l'écran, en pixels physiques de la fenêtre.
#[derive(Debug, Clone)]
pub struct ContextMenuOverlay {
    pub model: MenuModel,
    pub origin: (f32, f32),
    pub hovered: Option<usize>,
}

impl ContextMenuOverlay {
    /// Ouvre le menu en `at`, recalé pour rester dans `viewport`.
    pub fn open(model: MenuModel, at: (f32, f32), viewport: (f32, f32)) -> Self {
        let (w, h) = (MENU_WIDTH, content_height(&model));
        let x = at.0.min(viewport.0 - w).max(0.0);
        let y = at.1.min(viewport.1 - h).max(0.0);
        Self {
            model,
            origin: (x, y),
            hovered: None,
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (MENU_WIDTH, content_height(&self.model))
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (w, h) = self.size();
        x >= self.origin.0 && x < self.origin.0 + w && y >= self.origin.1 && y < self.origin.1 + h
    }

    /// Rectangle `(x, y, hauteur)` de chaque entrée, dans l'ordre du modèle.
    pub fn item_rects(&self) -> Vec<(f32, f32, f32)> {
        let mut y = self.origin.1 + MENU_PADDING;
        self.model
            .items()
            .iter()
            .map(|item| {
                let h = match item {
                    MenuItem::Command { .. } => ITEM_HEIGHT,
                    MenuItem::Separator => SEPARATOR_HEIGHT,
                };
                let rect = (self.origin.0, y, h);
                y += h;
                rect
            })
            .collect()
    }

    /// Index de l'entrée sous `(x, y)`. Les séparateurs ne comptent pas.
    pub fn item_at(&self, x: f32, y: f32) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        self.item_rects()
            .iter()
            .position(|&(_, top, h)| y >= top && y < top + h)
            .filter(|&i| matches!(self.model.items()[i], MenuItem::Command { .. }))
    }

    pub fn update_hover(&mut self, x: f32, y: f32) -> bool {
        let hovered = self.item_at(x, y);
        let changed = hovered != self.hovered;
        self.hovered = hovered;
        changed
    }
}

fn content_height(model: &MenuModel) -> f32 {
    let items: f32 = model
        .items()
        .iter()
        .map(|item| match item {
            MenuItem::Command { .. } => ITEM_HEIGHT,
            MenuItem::Separator => SEPARATOR_HEIGHT,
        })
        .sum();
    items + 2.0 * MENU_PADDING
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::{Call, MockBrowser};

    // ── model ──

    #[test]
    fn test_default_model_idle() {
        let model = default_model(NavigationState {
            can_go_back: true,
            ..Default::default()
        });
        assert_eq!(model.count(), 3);
        assert_eq!(model.command_at(0), Some(CommandId::BACK));
        // Forward désactivé
        assert_eq!(model.command_at(1), None);
        assert_eq!(model.command_at(2), Some(CommandId::RELOAD));
    }

    #[test]
    fn test_default_model_loading_offers_stop() {
        let model = default_model(NavigationState {
            is_loading: true,
            ..Default::default()
        });
        assert_eq!(model.command_at(2), Some(CommandId::STOPLOAD));
    }

    #[test]
    fn test_user_ids() {
        assert!(CommandId::VIEW_SOURCE.is_user());
        assert!(CommandId::COPY_URL.is_user());
        assert!(!CommandId::RELOAD.is_user());
    }

    // ── builtin commands ──

    #[test]
    fn test_builtin_back_respects_history() {
        let b = MockBrowser::new(1);
        assert!(run_builtin_command(&b, CommandId::BACK));
        assert!(b.calls().is_empty());

        let b = MockBrowser::new(2).with_history(true, false);
        assert!(run_builtin_command(&b, CommandId::BACK));
        assert_eq!(b.calls(), vec![Call::GoBack]);
    }

    #[test]
    fn test_builtin_reload_variants() {
        let b = MockBrowser::new(1);
        run_builtin_command(&b, CommandId::RELOAD);
        run_builtin_command(&b, CommandId::RELOAD_NOCACHE);
        run_builtin_command(&b, CommandId::STOPLOAD);
        assert_eq!(
            b.calls(),
            vec![Call::Reload, Call::ReloadIgnoreCache, Call::StopLoad]
        );
    }

    #[test]
    fn test_builtin_rejects_user_ids() {
        let b = MockBrowser::new(1);
        assert!(!run_builtin_command(&b, CommandId::VIEW_SOURCE));
        assert!(b.calls().is_empty());
    }

    // ── overlay ──

    fn sample_overlay() -> ContextMenuOverlay {
        let mut model = MenuModel::new();
        model.add_item(CommandId::RELOAD_PAGE, "Reload");
        model.add_separator();
        model.add_item(CommandId::COPY_URL, "Copy URL");
        ContextMenuOverlay::open(model, (100.0, 100.0), (1280.0, 800.0))
    }

    #[test]
    fn test_overlay_hit_test() {
        let overlay = sample_overlay();
        let first = 100.0 + MENU_PADDING + 1.0;
        assert_eq!(overlay.item_at(110.0, first), Some(0));
        // Séparateur
        assert_eq!(overlay.item_at(110.0, first + ITEM_HEIGHT + 2.0), None);
        let third = first + ITEM_HEIGHT + SEPARATOR_HEIGHT;
        assert_eq!(overlay.item_at(110.0, third), Some(2));
        // Hors du menu
        assert_eq!(overlay.item_at(50.0, first), None);
    }

    #[test]
    fn test_overlay_clamped_to_viewport() {
        let mut model = MenuModel::new();
        model.add_item(CommandId::RELOAD_PAGE, "Reload");
        let overlay = ContextMenuOverlay::open(model, (1270.0, 795.0), (1280.0, 800.0));
        let (w, h) = overlay.size();
        assert!(overlay.origin.0 + w <= 1280.0);
        assert!(overlay.origin.1 + h <= 800.0);
    }

    #[test]
    fn test_overlay_hover_change() {
        let mut overlay = sample_overlay();
        let y = 100.0 + MENU_PADDING + 1.0;
        assert!(overlay.update_hover(110.0, y));
        assert!(!overlay.update_hover(111.0, y));
        assert_eq!(overlay.hovered, Some(0));
    }
}
