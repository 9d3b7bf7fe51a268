//! Table des raccourcis clavier du navigateur.
//!
//! Seuls les événements `RawKeyDown` sont considérés. La première entrée
//! qui correspond gagne :
//!
//! | Accord                    | Action                                 |
//! |---------------------------|----------------------------------------|
//! | `Ctrl+R` / `F5`           | recharger (`Shift` : sans cache)       |
//! | `Ctrl+Shift+I` / `F12`    | outils de développement                |
//! | `Ctrl+L`                  | focus barre d'adresse (laissé à l'UI)  |
//! | `Ctrl+W`                  | fermer le navigateur                   |
//! | `Alt+←` / `Alt+→`         | précédent / suivant                    |
//!
//! `F5` et `F12` correspondent quels que soient les modificateurs.

use crate::engine::{KeyEvent, KeyEventKind};

/// Codes de touches virtuelles Windows utilisés par la table.
pub mod vk {
    pub const LEFT: i32 = 0x25;
    pub const RIGHT: i32 = 0x27;
    pub const F5: i32 = 0x74;
    pub const F12: i32 = 0x7B;
    pub const I: i32 = b'I' as i32;
    pub const L: i32 = b'L' as i32;
    pub const R: i32 = b'R' as i32;
    pub const W: i32 = b'W' as i32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Reload,
    HardReload,
    DevTools,
    FocusAddressBar,
    CloseBrowser,
    Back,
    Forward,
}

impl Shortcut {
    /// Cherche l'accord correspondant à `event`.
    pub fn match_event(event: &KeyEvent) -> Option<Self> {
        if event.kind != KeyEventKind::RawKeyDown {
            return None;
        }

        let m = event.modifiers;
        let key = event.windows_key_code;

        if (m.ctrl && key == vk::R) || key == vk::F5 {
            return Some(if m.shift { Self::HardReload } else { Self::Reload });
        }
        if (m.ctrl && m.shift && key == vk::I) || key == vk::F12 {
            return Some(Self::DevTools);
        }
        if m.ctrl && key == vk::L {
            return Some(Self::FocusAddressBar);
        }
        if m.ctrl && key == vk::W {
            return Some(Self::CloseBrowser);
        }
        if m.alt && key == vk::LEFT {
            return Some(Self::Back);
        }
        if m.alt && key == vk::RIGHT {
            return Some(Self::Forward);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::KeyModifiers;

    fn raw(key: i32, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            kind: KeyEventKind::RawKeyDown,
            modifiers,
            windows_key_code: key,
        }
    }

    const NONE: KeyModifiers = KeyModifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };
    const CTRL: KeyModifiers = KeyModifiers { ctrl: true, ..NONE };
    const CTRL_SHIFT: KeyModifiers = KeyModifiers {
        ctrl: true,
        shift: true,
        ..NONE
    };
    const SHIFT: KeyModifiers = KeyModifiers { shift: true, ..NONE };
    const ALT: KeyModifiers = KeyModifiers { alt: true, ..NONE };

    // ── reload ──

    #[test]
    fn test_ctrl_r_reloads() {
        assert_eq!(Shortcut::match_event(&raw(vk::R, CTRL)), Some(Shortcut::Reload));
    }

    #[test]
    fn test_ctrl_shift_r_hard_reloads() {
        assert_eq!(
            Shortcut::match_event(&raw(vk::R, CTRL_SHIFT)),
            Some(Shortcut::HardReload)
        );
    }

    #[test]
    fn test_f5_with_and_without_shift() {
        assert_eq!(Shortcut::match_event(&raw(vk::F5, NONE)), Some(Shortcut::Reload));
        assert_eq!(
            Shortcut::match_event(&raw(vk::F5, SHIFT)),
            Some(Shortcut::HardReload)
        );
    }

    #[test]
    fn test_plain_r_is_not_a_shortcut() {
        assert_eq!(Shortcut::match_event(&raw(vk::R, NONE)), None);
    }

    // ── devtools ──

    #[test]
    fn test_f12_regardless_of_modifiers() {
        for m in [NONE, CTRL, SHIFT, ALT, CTRL_SHIFT] {
            assert_eq!(Shortcut::match_event(&raw(vk::F12, m)), Some(Shortcut::DevTools));
        }
    }

    #[test]
    fn test_ctrl_shift_i_devtools() {
        assert_eq!(
            Shortcut::match_event(&raw(vk::I, CTRL_SHIFT)),
            Some(Shortcut::DevTools)
        );
        assert_eq!(Shortcut::match_event(&raw(vk::I, CTRL)), None);
    }

    // ── other chords ──

    #[test]
    fn test_ctrl_l_and_ctrl_w() {
        assert_eq!(
            Shortcut::match_event(&raw(vk::L, CTRL)),
            Some(Shortcut::FocusAddressBar)
        );
        assert_eq!(
            Shortcut::match_event(&raw(vk::W, CTRL)),
            Some(Shortcut::CloseBrowser)
        );
    }

    #[test]
    fn test_alt_arrows() {
        assert_eq!(Shortcut::match_event(&raw(vk::LEFT, ALT)), Some(Shortcut::Back));
        assert_eq!(Shortcut::match_event(&raw(vk::RIGHT, ALT)), Some(Shortcut::Forward));
        assert_eq!(Shortcut::match_event(&raw(vk::LEFT, NONE)), None);
    }

    #[test]
    fn test_only_raw_key_down() {
        for kind in [KeyEventKind::KeyDown, KeyEventKind::KeyUp, KeyEventKind::Char] {
            let event = KeyEvent {
                kind,
                modifiers: NONE,
                windows_key_code: vk::F5,
            };
            assert_eq!(Shortcut::match_event(&event), None);
        }
    }
}
