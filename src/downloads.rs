//! Téléchargements : description d'un élément et rappel de confirmation.

use std::path::PathBuf;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    InProgress,
    Complete,
    Canceled,
    Interrupted,
}

/// Élément de téléchargement tel que le moteur le rapporte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadItem {
    pub id: u32,
    pub url: Url,
    pub mime_type: String,
    pub received_bytes: u64,
    /// `None` si le serveur n'annonce pas de taille.
    pub total_bytes: Option<u64>,
    pub state: DownloadState,
    pub full_path: Option<PathBuf>,
}

impl DownloadItem {
    pub fn new(id: u32, url: Url) -> Self {
        Self {
            id,
            url,
            mime_type: String::new(),
            received_bytes: 0,
            total_bytes: None,
            state: DownloadState::InProgress,
            full_path: None,
        }
    }

    /// Progression en pourcents, si la taille totale est connue.
    pub fn percent_complete(&self) -> Option<u8> {
        let total = self.total_bytes.filter(|&t| t > 0)?;
        let pct = self.received_bytes.min(total) * 100 / total;
        Some(pct as u8)
    }
}

/// Réponse à `on_before_download`.
pub trait BeforeDownloadCallback {
    /// Poursuit le téléchargement. `path` à `None` garde le nom suggéré ;
    /// `show_dialog` demande un dialogue d'enregistrement.
    fn proceed(&self, path: Option<PathBuf>, show_dialog: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_complete() {
        let mut item = DownloadItem::new(1, Url::parse("https://a/file.zip").unwrap());
        assert_eq!(item.percent_complete(), None);
        item.total_bytes = Some(200);
        item.received_bytes = 50;
        assert_eq!(item.percent_complete(), Some(25));
        item.received_bytes = 500;
        assert_eq!(item.percent_complete(), Some(100));
    }

    #[test]
    fn test_zero_total_is_unknown() {
        let mut item = DownloadItem::new(1, Url::parse("https://a/empty").unwrap());
        item.total_bytes = Some(0);
        assert_eq!(item.percent_complete(), None);
    }
}
