//! Conversion des événements clavier Winit.
//!
//! Deux cibles :
//!
//! - [`shell_key_event`] : l'événement réduit que consulte la table de
//!   raccourcis (type d'événement, modificateurs, code de touche virtuelle
//!   Windows).
//! - [`keyboard_event_from_winit`] : le `KeyboardEvent` complet transmis à
//!   Servo (types `keyboard_types` ré-exportés par `servo::`).
//!
//! Les noms de touches Winit et `keyboard_types` suivent tous deux la
//! spécification UI Events ; la conversion passe donc par le nom de la
//! variante, avec quelques exceptions explicites.

use winit::event::ElementState;
use winit::keyboard::{
    Key as WinitKey, KeyCode, ModifiersState, NamedKey as WinitNamedKey, PhysicalKey,
};

use crate::engine::{KeyEvent, KeyEventKind, KeyModifiers};

// ─────────────────────────────────────────────────────────────────────────────
// Événement réduit
// ─────────────────────────────────────────────────────────────────────────────

/// Construit l'événement consulté par la table de raccourcis.
///
/// Un appui donne `RawKeyDown`, un relâchement `KeyUp`.
pub fn shell_key_event(
    state: ElementState,
    logical_key: &WinitKey,
    physical_key: &PhysicalKey,
    mods: ModifiersState,
) -> KeyEvent {
    KeyEvent {
        kind: match state {
            ElementState::Pressed => KeyEventKind::RawKeyDown,
            ElementState::Released => KeyEventKind::KeyUp,
        },
        modifiers: KeyModifiers {
            ctrl: mods.control_key(),
            shift: mods.shift_key(),
            alt: mods.alt_key(),
            meta: mods.super_key(),
        },
        windows_key_code: windows_key_code(logical_key, physical_key),
    }
}

const LETTER_CODES: [KeyCode; 26] = [
    KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
    KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
    KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
    KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
    KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
    KeyCode::KeyZ,
];

const DIGIT_CODES: [KeyCode; 10] = [
    KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
    KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
];

const FUNCTION_KEYS: [WinitNamedKey; 24] = [
    WinitNamedKey::F1, WinitNamedKey::F2, WinitNamedKey::F3, WinitNamedKey::F4,
    WinitNamedKey::F5, WinitNamedKey::F6, WinitNamedKey::F7, WinitNamedKey::F8,
    WinitNamedKey::F9, WinitNamedKey::F10, WinitNamedKey::F11, WinitNamedKey::F12,
    WinitNamedKey::F13, WinitNamedKey::F14, WinitNamedKey::F15, WinitNamedKey::F16,
    WinitNamedKey::F17, WinitNamedKey::F18, WinitNamedKey::F19, WinitNamedKey::F20,
    WinitNamedKey::F21, WinitNamedKey::F22, WinitNamedKey::F23, WinitNamedKey::F24,
];

const FUNCTION_CODES: [KeyCode; 24] = [
    KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
    KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
    KeyCode::F13, KeyCode::F14, KeyCode::F15, KeyCode::F16, KeyCode::F17, KeyCode::F18,
    KeyCode::F19, KeyCode::F20, KeyCode::F21, KeyCode::F22, KeyCode::F23, KeyCode::F24,
];

/// Code de touche virtuelle Windows (`VK_*`), 0 si inconnu.
///
/// Les lettres et chiffres suivent la touche logique (disposition du
/// clavier) ; le reste retombe sur la touche physique.
pub fn windows_key_code(logical_key: &WinitKey, physical_key: &PhysicalKey) -> i32 {
    match logical_key {
        WinitKey::Character(s) => {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next())
                && c.is_ascii_alphanumeric()
            {
                return c.to_ascii_uppercase() as i32;
            }
        }
        WinitKey::Named(named) => {
            if let Some(code) = named_key_vk(*named) {
                return code;
            }
        }
        _ => {}
    }
    physical_key_vk(physical_key).unwrap_or(0)
}

fn named_key_vk(key: WinitNamedKey) -> Option<i32> {
    if let Some(i) = FUNCTION_KEYS.iter().position(|&k| k == key) {
        return Some(0x70 + i as i32);
    }
    let code = match key {
        WinitNamedKey::Backspace => 0x08,
        WinitNamedKey::Tab => 0x09,
        WinitNamedKey::Enter => 0x0D,
        WinitNamedKey::Shift => 0x10,
        WinitNamedKey::Control => 0x11,
        WinitNamedKey::Alt => 0x12,
        WinitNamedKey::Pause => 0x13,
        WinitNamedKey::CapsLock => 0x14,
        WinitNamedKey::Escape => 0x1B,
        WinitNamedKey::Space => 0x20,
        WinitNamedKey::PageUp => 0x21,
        WinitNamedKey::PageDown => 0x22,
        WinitNamedKey::End => 0x23,
        WinitNamedKey::Home => 0x24,
        WinitNamedKey::ArrowLeft => 0x25,
        WinitNamedKey::ArrowUp => 0x26,
        WinitNamedKey::ArrowRight => 0x27,
        WinitNamedKey::ArrowDown => 0x28,
        WinitNamedKey::Insert => 0x2D,
        WinitNamedKey::Delete => 0x2E,
        WinitNamedKey::BrowserBack => 0xA6,
        WinitNamedKey::BrowserForward => 0xA7,
        WinitNamedKey::BrowserRefresh => 0xA8,
        _ => return None,
    };
    Some(code)
}

fn physical_key_vk(physical_key: &PhysicalKey) -> Option<i32> {
    let PhysicalKey::Code(code) = physical_key else {
        return None;
    };
    if let Some(i) = LETTER_CODES.iter().position(|c| c == code) {
        return Some(b'A' as i32 + i as i32);
    }
    if let Some(i) = DIGIT_CODES.iter().position(|c| c == code) {
        return Some(b'0' as i32 + i as i32);
    }
    if let Some(i) = FUNCTION_CODES.iter().position(|c| c == code) {
        return Some(0x70 + i as i32);
    }
    let vk = match code {
        KeyCode::Backspace => 0x08,
        KeyCode::Tab => 0x09,
        KeyCode::Enter | KeyCode::NumpadEnter => 0x0D,
        KeyCode::Escape => 0x1B,
        KeyCode::Space => 0x20,
        KeyCode::PageUp => 0x21,
        KeyCode::PageDown => 0x22,
        KeyCode::End => 0x23,
        KeyCode::Home => 0x24,
        KeyCode::ArrowLeft => 0x25,
        KeyCode::ArrowUp => 0x26,
        KeyCode::ArrowRight => 0x27,
        KeyCode::ArrowDown => 0x28,
        KeyCode::Insert => 0x2D,
        KeyCode::Delete => 0x2E,
        _ => return None,
    };
    Some(vk)
}

// ─────────────────────────────────────────────────────────────────────────────
// Événement Servo
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "servo")]
pub use servo_keys::keyboard_event_from_winit;

#[cfg(feature = "servo")]
mod servo_keys {
    use servo::{Code, Key, KeyState, KeyboardEvent, Location, Modifiers, NamedKey};
    use winit::event::ElementState;
    use winit::keyboard::{
        Key as WinitKey, KeyCode, KeyLocation as WinitKeyLocation, ModifiersState,
        NamedKey as WinitNamedKey, PhysicalKey,
    };

    /// Convertit un `KeyEvent` Winit + état des modificateurs en `KeyboardEvent` Servo.
    pub fn keyboard_event_from_winit(
        key_event: &winit::event::KeyEvent,
        state: ModifiersState,
    ) -> KeyboardEvent {
        KeyboardEvent::new_without_event(
            key_state_from_winit(key_event.state),
            key_from_winit(&key_event.logical_key),
            code_from_winit(&key_event.physical_key),
            location_from_winit(key_event.location),
            modifiers_from_winit(state),
            false,
            false,
        )
    }

    pub(super) fn key_state_from_winit(state: ElementState) -> KeyState {
        match state {
            ElementState::Pressed => KeyState::Down,
            ElementState::Released => KeyState::Up,
        }
    }

    pub(super) fn key_from_winit(logical_key: &WinitKey) -> Key {
        match logical_key {
            WinitKey::Character(string) => Key::Character(string.to_string()),
            // Espace n'est pas une touche nommée côté `keyboard_types`.
            WinitKey::Named(WinitNamedKey::Space) => Key::Character(" ".to_string()),
            WinitKey::Named(named) => format!("{named:?}")
                .parse::<NamedKey>()
                .map(Key::Named)
                .unwrap_or(Key::Named(NamedKey::Unidentified)),
            WinitKey::Unidentified(_) | WinitKey::Dead(_) => Key::Named(NamedKey::Unidentified),
        }
    }

    pub(super) fn location_from_winit(location: WinitKeyLocation) -> Location {
        match location {
            WinitKeyLocation::Left => Location::Left,
            WinitKeyLocation::Numpad => Location::Numpad,
            WinitKeyLocation::Right => Location::Right,
            WinitKeyLocation::Standard => Location::Standard,
        }
    }

    #[allow(deprecated)]
    pub(super) fn code_from_winit(physical_key: &PhysicalKey) -> Code {
        let key_code = match physical_key {
            PhysicalKey::Code(key_code) => *key_code,
            PhysicalKey::Unidentified(_) => return Code::Unidentified,
        };
        match key_code {
            KeyCode::Meta => Code::Super,
            KeyCode::SuperLeft => Code::MetaLeft,
            KeyCode::SuperRight => Code::MetaRight,
            other => format!("{other:?}")
                .parse::<Code>()
                .unwrap_or(Code::Unidentified),
        }
    }

    pub(super) fn modifiers_from_winit(mods: ModifiersState) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        modifiers.set(Modifiers::CONTROL, mods.control_key());
        modifiers.set(Modifiers::SHIFT, mods.shift_key());
        modifiers.set(Modifiers::ALT, mods.alt_key());
        modifiers.set(Modifiers::META, mods.super_key());
        modifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::{Shortcut, vk};

    fn character(s: &str) -> WinitKey {
        WinitKey::Character(s.into())
    }

    const NO_PHYSICAL: PhysicalKey =
        PhysicalKey::Unidentified(winit::keyboard::NativeKeyCode::Unidentified);

    // ── windows_key_code ──────────────────────────────────────────────

    #[test]
    fn test_letters_use_uppercase_code() {
        assert_eq!(windows_key_code(&character("r"), &NO_PHYSICAL), vk::R);
        assert_eq!(windows_key_code(&character("R"), &NO_PHYSICAL), vk::R);
        assert_eq!(windows_key_code(&character("7"), &NO_PHYSICAL), b'7' as i32);
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(
            windows_key_code(&WinitKey::Named(WinitNamedKey::F5), &NO_PHYSICAL),
            vk::F5
        );
        assert_eq!(
            windows_key_code(&WinitKey::Named(WinitNamedKey::F12), &NO_PHYSICAL),
            vk::F12
        );
        assert_eq!(
            windows_key_code(&WinitKey::Named(WinitNamedKey::ArrowLeft), &NO_PHYSICAL),
            vk::LEFT
        );
        assert_eq!(
            windows_key_code(&WinitKey::Named(WinitNamedKey::ArrowRight), &NO_PHYSICAL),
            vk::RIGHT
        );
    }

    #[test]
    fn test_physical_fallback() {
        // Ctrl+L peut produire un caractère de contrôle : la touche physique tranche.
        assert_eq!(
            windows_key_code(&character("\u{c}"), &PhysicalKey::Code(KeyCode::KeyL)),
            vk::L
        );
        assert_eq!(
            windows_key_code(&WinitKey::Dead(None), &PhysicalKey::Code(KeyCode::F5)),
            vk::F5
        );
        assert_eq!(windows_key_code(&WinitKey::Dead(None), &NO_PHYSICAL), 0);
    }

    // ── shell_key_event ───────────────────────────────────────────────

    #[test]
    fn test_shell_event_feeds_shortcut_table() {
        let event = shell_key_event(
            ElementState::Pressed,
            &character("r"),
            &PhysicalKey::Code(KeyCode::KeyR),
            ModifiersState::CONTROL | ModifiersState::SHIFT,
        );
        assert_eq!(event.kind, KeyEventKind::RawKeyDown);
        assert!(event.modifiers.ctrl && event.modifiers.shift);
        assert_eq!(Shortcut::match_event(&event), Some(Shortcut::HardReload));
    }

    #[test]
    fn test_release_is_key_up() {
        let event = shell_key_event(
            ElementState::Released,
            &WinitKey::Named(WinitNamedKey::F5),
            &NO_PHYSICAL,
            ModifiersState::empty(),
        );
        assert_eq!(event.kind, KeyEventKind::KeyUp);
        assert_eq!(Shortcut::match_event(&event), None);
    }

    #[test]
    fn test_super_maps_to_meta() {
        let event = shell_key_event(
            ElementState::Pressed,
            &character("a"),
            &NO_PHYSICAL,
            ModifiersState::SUPER,
        );
        assert!(event.modifiers.meta);
        assert!(!event.modifiers.ctrl);
    }

    // ── conversion Servo ──────────────────────────────────────────────

    #[cfg(feature = "servo")]
    mod servo_conversion {
        use servo::{Code, Key, KeyState, Location, Modifiers, NamedKey};
        use winit::event::ElementState;
        use winit::keyboard::{
            Key as WinitKey, KeyCode, KeyLocation as WinitKeyLocation, ModifiersState,
            NamedKey as WinitNamedKey, PhysicalKey,
        };

        use super::super::servo_keys::*;

        #[test]
        fn test_key_state() {
            assert_eq!(key_state_from_winit(ElementState::Pressed), KeyState::Down);
            assert_eq!(key_state_from_winit(ElementState::Released), KeyState::Up);
        }

        #[test]
        fn test_named_keys_by_name() {
            let pairs = [
                (WinitNamedKey::Enter, NamedKey::Enter),
                (WinitNamedKey::ArrowLeft, NamedKey::ArrowLeft),
                (WinitNamedKey::F5, NamedKey::F5),
                (WinitNamedKey::Escape, NamedKey::Escape),
                (WinitNamedKey::Meta, NamedKey::Meta),
            ];
            for (winit_key, servo_key) in pairs {
                assert_eq!(key_from_winit(&WinitKey::Named(winit_key)), Key::Named(servo_key));
            }
        }

        #[test]
        fn test_space_is_character() {
            assert_eq!(
                key_from_winit(&WinitKey::Named(WinitNamedKey::Space)),
                Key::Character(" ".to_string())
            );
        }

        #[test]
        fn test_dead_key_unidentified() {
            assert_eq!(
                key_from_winit(&WinitKey::Dead(None)),
                Key::Named(NamedKey::Unidentified)
            );
        }

        #[test]
        fn test_codes() {
            assert_eq!(code_from_winit(&PhysicalKey::Code(KeyCode::KeyA)), Code::KeyA);
            assert_eq!(code_from_winit(&PhysicalKey::Code(KeyCode::Digit7)), Code::Digit7);
            assert_eq!(
                code_from_winit(&PhysicalKey::Code(KeyCode::SuperLeft)),
                Code::MetaLeft
            );
            assert_eq!(
                code_from_winit(&PhysicalKey::Code(KeyCode::SuperRight)),
                Code::MetaRight
            );
        }

        #[test]
        fn test_location() {
            assert_eq!(location_from_winit(WinitKeyLocation::Numpad), Location::Numpad);
            assert_eq!(location_from_winit(WinitKeyLocation::Left), Location::Left);
        }

        #[test]
        fn test_modifiers_super_maps_to_meta() {
            let result = modifiers_from_winit(ModifiersState::SUPER | ModifiersState::CONTROL);
            assert!(result.contains(Modifiers::META));
            assert!(result.contains(Modifiers::CONTROL));
            assert!(!result.contains(Modifiers::ALT));
        }
    }
}
