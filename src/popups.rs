//! Popups (`window.open`) en attente de leur première page.
//!
//! Une entrée vit jusqu'au premier de ces événements :
//!
//! - la requête de page principale de la popup (routée par le client)
//! - la popup affiche un document sans cette requête
//! - la popup se ferme
//! - le navigateur qui l'a ouverte se ferme

use url::Url;

/// Popups en attente, indexées par l'identifiant de leur vue.
#[derive(Debug)]
pub struct PendingPopups<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for PendingPopups<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq + Copy, V> PendingPopups<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: K) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    /// Remplace une entrée existante pour la même clé.
    pub fn insert(&mut self, key: K, value: V) {
        self.take(key);
        self.entries.push((key, value));
    }

    pub fn take(&mut self, key: K) -> Option<V> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Retire les entrées que `keep` rejette. Renvoie le nombre retiré.
    pub fn retain(&mut self, mut keep: impl FnMut(&V) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(_, v)| keep(v));
        before - self.entries.len()
    }
}

/// `about:blank` est le document initial d'une popup, affiché avant sa
/// vraie navigation : il ne la règle pas.
pub fn settles_popup(url: &Url) -> bool {
    url.as_str() != "about:blank"
}
