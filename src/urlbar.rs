//! Barre d'adresse : machine à états pour l'édition de texte et la navigation.
//!
//! Gère le texte saisi, la position du curseur, le focus, et la résolution
//! de la saisie en URL ou en recherche.
//!
//! Aucune dépendance graphique : ce module est purement logique.

use url::Url;

/// Texte affiché pour une URL : sans caractères invisibles.
fn display_url(url: &Url) -> String {
    url.as_str()
        .chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'..='\u{200D}'
                    | '\u{2060}'
                    | '\u{FEFF}'
                    | '\u{034F}'
                    | '\u{2028}'
                    | '\u{2029}'
            )
        })
        .collect()
}

/// État du focus de la barre d'URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlBarFocus {
    /// La barre n'a pas le focus : les événements clavier vont à Servo.
    Unfocused,
    /// Vient d'être focusée (Ctrl+L ou clic) : tout le texte est sélectionné.
    /// La prochaine frappe remplace tout le contenu.
    Focused,
    /// L'utilisateur est en train de taper: édition caractère par caractère.
    Editing,
}

/// Machine à états de la barre d'adresse.
#[derive(Debug)]
pub struct UrlBar {
    /// Texte affiché / édité dans la barre.
    text: String,
    /// Position du curseur en offset d'octets dans `text`.
    cursor: usize,
    /// État de focus actuel.
    focus: UrlBarFocus,
    /// URL courante de la page (mise à jour par `on_address_change`).
    current_url: Option<Url>,
    /// Préfixe de recherche, la requête encodée est ajoutée à la fin.
    search_url: String,
}

impl UrlBar {
    pub fn new(search_url: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            focus: UrlBarFocus::Unfocused,
            current_url: None,
            search_url: search_url.into(),
        }
    }

    /// Met à jour l'URL affichée. Sans effet sur le texte pendant l'édition.
    ///
    /// Les pages d'erreur (`data:`) gardent l'URL précédente affichée.
    pub fn set_url(&mut self, url: &Url) {
        if url.scheme() == "data" {
            return;
        }
        self.current_url = Some(url.clone());
        if self.focus == UrlBarFocus::Unfocused {
            self.text = display_url(url);
            self.cursor = self.text.len();
        }
    }

    pub fn current_url(&self) -> Option<&Url> {
        self.current_url.as_ref()
    }

    /// Focus la barre (Ctrl+L ou clic). Sélectionne tout le texte.
    pub fn focus(&mut self) {
        self.focus = UrlBarFocus::Focused;
        self.cursor = self.text.len();
    }

    /// Retire le focus (Escape). Restaure l'URL courante.
    pub fn unfocus(&mut self) {
        self.focus = UrlBarFocus::Unfocused;
        if let Some(ref url) = self.current_url {
            self.text = display_url(url);
            self.cursor = self.text.len();
        }
    }

    /// Insère un caractère à la position du curseur.
    /// Si on est en mode Focused (select-all), remplace tout le texte d'abord.
    pub fn insert_char(&mut self, c: char) {
        if self.focus == UrlBarFocus::Focused {
            self.text.clear();
            self.cursor = 0;
            self.focus = UrlBarFocus::Editing;
        }
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Supprime le caractère avant le curseur (Backspace).
    pub fn backspace(&mut self) {
        if self.focus == UrlBarFocus::Focused {
            // Select-all + backspace = tout effacer
            self.text.clear();
            self.cursor = 0;
            self.focus = UrlBarFocus::Editing;
            return;
        }
        if self.cursor > 0 {
            // Reculer au début du caractère précédent
            let prev = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    /// Supprime le caractère après le curseur (Delete).
    pub fn delete(&mut self) {
        if self.focus == UrlBarFocus::Focused {
            self.text.clear();
            self.cursor = 0;
            self.focus = UrlBarFocus::Editing;
            return;
        }
        if self.cursor < self.text.len() {
            let next = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
            self.text.drain(self.cursor..next);
        }
    }

    /// Déplace le curseur d'un caractère vers la gauche.
    pub fn move_cursor_left(&mut self) {
        if self.focus == UrlBarFocus::Focused {
            self.focus = UrlBarFocus::Editing;
            self.cursor = 0;
            return;
        }
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    /// Déplace le curseur d'un caractère vers la droite.
    pub fn move_cursor_right(&mut self) {
        if self.focus == UrlBarFocus::Focused {
            self.focus = UrlBarFocus::Editing;
            // cursor already at end
            return;
        }
        if self.cursor < self.text.len() {
            self.cursor = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
        }
    }

    /// Place le curseur au début du texte (Home).
    pub fn home(&mut self) {
        if self.focus == UrlBarFocus::Focused {
            self.focus = UrlBarFocus::Editing;
        }
        self.cursor = 0;
    }

    /// Place le curseur à la fin du texte (End).
    pub fn end(&mut self) {
        if self.focus == UrlBarFocus::Focused {
            self.focus = UrlBarFocus::Editing;
        }
        self.cursor = self.text.len();
    }

    /// Sélectionne tout le texte (Ctrl+A).
    pub fn select_all(&mut self) {
        self.focus = UrlBarFocus::Focused;
        self.cursor = self.text.len();
    }

    /// Valide la saisie (Enter). Retourne l'URL vers laquelle naviguer.
    pub fn submit(&mut self) -> Option<Url> {
        let input = self.text.trim();
        if input.is_empty() {
            return None;
        }
        let url = resolve_input(input, &self.search_url);
        self.focus = UrlBarFocus::Unfocused;
        url
    }

    /// Retourne `true` si la barre a le focus (doit consommer le clavier).
    pub fn is_focused(&self) -> bool {
        self.focus != UrlBarFocus::Unfocused
    }

    /// Texte à afficher dans la barre.
    pub fn display_text(&self) -> &str {
        &self.text
    }

    /// Position du curseur en octets.
    pub fn cursor_pos(&self) -> usize {
        self.cursor
    }

    /// Nombre de caractères avant le curseur (pour le rendu).
    pub fn cursor_char_offset(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }
}

/// Résolution de la saisie utilisateur en URL.
///
/// - Une URL avec un schéma connu est utilisée telle quelle.
/// - Une entrée avec un point et sans espace (`wikipedia.org`), ou
///   `localhost[:port]`, reçoit `https://` (`http://` pour localhost).
/// - Le reste devient une recherche.
pub fn resolve_input(input: &str, search_url: &str) -> Option<Url> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(input)
        && matches!(
            url.scheme(),
            "http" | "https" | "file" | "data" | "about" | "view-source"
        )
    {
        return Some(url);
    }

    if input == "localhost" || input.starts_with("localhost:") || input.starts_with("localhost/") {
        return Url::parse(&format!("http://{input}")).ok();
    }

    if input.contains('.')
        && !input.contains(' ')
        && let Ok(url) = Url::parse(&format!("https://{input}"))
    {
        return Some(url);
    }

    let encoded: String = url::form_urlencoded::byte_serialize(input.as_bytes()).collect();
    Url::parse(&format!("{search_url}{encoded}")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = "https://www.google.com/search?q=";

    fn bar() -> UrlBar {
        UrlBar::new(SEARCH)
    }

    // ── display ──

    #[test]
    fn test_display_unchanged_for_plain_url() {
        let url = Url::parse("https://example.com/path?query=value").unwrap();
        assert_eq!(display_url(&url), "https://example.com/path?query=value");
    }

    #[test]
    fn test_set_url_ignored_while_editing() {
        let mut urlbar = bar();
        urlbar.set_url(&Url::parse("https://a.example/").unwrap());
        urlbar.focus();
        urlbar.insert_char('x');
        urlbar.set_url(&Url::parse("https://b.example/").unwrap());
        assert_eq!(urlbar.display_text(), "x");
        urlbar.unfocus();
        assert_eq!(urlbar.display_text(), "https://b.example/");
    }

    #[test]
    fn test_error_page_keeps_failed_address() {
        let mut urlbar = bar();
        urlbar.set_url(&Url::parse("https://nowhere.invalid/").unwrap());
        urlbar.set_url(&Url::parse("data:text/html;base64,AAAA").unwrap());
        assert_eq!(urlbar.display_text(), "https://nowhere.invalid/");
    }

    // ── editing ──

    #[test]
    fn test_focus_then_type_replaces_text() {
        let mut urlbar = bar();
        urlbar.set_url(&Url::parse("https://example.com/").unwrap());
        urlbar.focus();
        assert!(urlbar.is_focused());
        urlbar.insert_char('a');
        assert_eq!(urlbar.display_text(), "a");
        assert_eq!(urlbar.cursor_char_offset(), 1);
    }

    #[test]
    fn test_cursor_moves_over_multibyte() {
        let mut urlbar = bar();
        urlbar.focus();
        for c in "héé".chars() {
            urlbar.insert_char(c);
        }
        urlbar.move_cursor_left();
        urlbar.backspace();
        assert_eq!(urlbar.display_text(), "hé");
        assert_eq!(urlbar.cursor_char_offset(), 1);
        urlbar.home();
        urlbar.delete();
        assert_eq!(urlbar.display_text(), "é");
    }

    #[test]
    fn test_submit_unfocuses() {
        let mut urlbar = bar();
        urlbar.focus();
        for c in "servo.org".chars() {
            urlbar.insert_char(c);
        }
        let url = urlbar.submit().unwrap();
        assert_eq!(url.as_str(), "https://servo.org/");
        assert!(!urlbar.is_focused());
    }

    #[test]
    fn test_submit_empty_is_none() {
        let mut urlbar = bar();
        urlbar.focus();
        assert!(urlbar.submit().is_none());
    }

    // ── resolve_input ──

    #[test]
    fn test_resolve_input_https() {
        let result = resolve_input("google.com", SEARCH).unwrap();
        assert_eq!(result.scheme(), "https");
        assert_eq!(result.host_str(), Some("google.com"));
    }

    #[test]
    fn test_resolve_input_keeps_scheme() {
        assert_eq!(
            resolve_input("http://example.com/a", SEARCH).unwrap().as_str(),
            "http://example.com/a"
        );
        assert_eq!(
            resolve_input("file:///tmp/a.html", SEARCH).unwrap().scheme(),
            "file"
        );
    }

    #[test]
    fn test_resolve_input_localhost() {
        assert_eq!(
            resolve_input("localhost:8000", SEARCH).unwrap().as_str(),
            "http://localhost:8000/"
        );
    }

    #[test]
    fn test_resolve_input_search() {
        let result = resolve_input("hello world", SEARCH).unwrap();
        assert_eq!(result.as_str(), "https://www.google.com/search?q=hello+world");
    }
}
