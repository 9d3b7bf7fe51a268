//! Lecteur de ressources Servo.
//!
//! Servo a besoin d'un ensemble de fichiers de ressources (préférences,
//! certificats, domaines publics, etc.). L'embedder fournit une
//! implémentation de `ResourceReaderMethods` enregistrée via
//! `servo::resources::set()`.
//!
//! Le dossier est résolu une seule fois par [`paths::resources_dir`].
//! `neterror.html` est remplacé par la page d'erreur de la coquille : les
//! échecs réseau que Servo gère lui-même (DNS, connexion, TLS) affichent
//! ainsi la même page que ceux interceptés par le client.

use std::fs;
use std::path::{Path, PathBuf};

use servo::resources::{self, Resource};
use tracing::{error, info};

use crate::error::ShellError;
use crate::error_page;
use crate::paths;

/// Initialise le lecteur de ressources Servo.
///
/// **Doit être appelé avant `ServoBuilder::build()`**.
pub fn init(locale: &str) -> Result<PathBuf, ShellError> {
    let dir = paths::resources_dir()
        .and_then(|dir| dir.canonicalize().ok())
        .ok_or_else(|| ShellError::ResourcesNotFound {
            searched: "SERVO_RESOURCES_PATH, <exe>/resources, <project>/resources, ./resources"
                .to_string(),
        })?;
    info!(dir = %dir.display(), "Engine resources");
    resources::set(Box::new(ResourceReader {
        dir: dir.clone(),
        locale: locale.to_string(),
    }));
    Ok(dir)
}

struct ResourceReader {
    /// Chemin canonique.
    dir: PathBuf,
    /// Langue de la page d'erreur réseau.
    locale: String,
}

impl resources::ResourceReaderMethods for ResourceReader {
    fn read(&self, file: Resource) -> Vec<u8> {
        if matches!(file, Resource::NetErrorHTML) {
            return error_page::engine_template(&self.locale).into_bytes();
        }
        let Some(path) = resolve_within(&self.dir, file.filename()) else {
            error!(file = file.filename(), "Resource outside resources directory or missing");
            return Vec::new();
        };
        fs::read(&path).unwrap_or_else(|e| {
            error!(path = %path.display(), "Cannot read resource: {e}");
            Vec::new()
        })
    }

    fn sandbox_access_files_dirs(&self) -> Vec<PathBuf> {
        vec![self.dir.clone()]
    }

    fn sandbox_access_files(&self) -> Vec<PathBuf> {
        vec![]
    }
}

/// Chemin canonique de `name` sous `dir`, ou `None` s'il n'existe pas ou
/// s'en échappe (`..`, lien symbolique).
fn resolve_within(dir: &Path, name: &str) -> Option<PathBuf> {
    let canonical = dir.join(name).canonicalize().ok()?;
    canonical.starts_with(dir).then_some(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_within_accepts_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().canonicalize().unwrap();
        fs::write(dir.join("prefs.json"), b"{}").unwrap();
        assert_eq!(
            resolve_within(&dir, "prefs.json"),
            Some(dir.join("prefs.json"))
        );
    }

    #[test]
    fn test_resolve_within_rejects_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().canonicalize().unwrap().join("resources");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.parent().unwrap().join("secret"), b"x").unwrap();
        assert_eq!(resolve_within(&dir, "../secret"), None);
    }

    #[test]
    fn test_resolve_within_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().canonicalize().unwrap();
        assert_eq!(resolve_within(&dir, "absent.txt"), None);
    }

    #[test]
    fn test_reader_returns_empty_on_missing() {
        use servo::resources::ResourceReaderMethods;
        let tmp = tempfile::tempdir().unwrap();
        let reader = ResourceReader {
            dir: tmp.path().canonicalize().unwrap(),
            locale: "en-US".to_string(),
        };
        assert!(reader.read(Resource::Preferences).is_empty());
        assert_eq!(reader.sandbox_access_files_dirs(), vec![reader.dir.clone()]);
    }

    #[test]
    fn test_reader_serves_shell_error_page() {
        use servo::resources::ResourceReaderMethods;
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().canonicalize().unwrap();
        // Le fichier livré avec Servo est ignoré
        fs::write(dir.join(Resource::NetErrorHTML.filename()), b"servo page ${reason}").unwrap();
        let reader = ResourceReader {
            dir,
            locale: "de-DE".to_string(),
        };

        let page = String::from_utf8(reader.read(Resource::NetErrorHTML)).unwrap();
        assert!(page.contains("This page isn't working"));
        assert!(page.contains(error_page::ENGINE_REASON));
        assert!(page.contains("<html lang=\"de-DE\">"));
        assert!(!page.contains("servo page"));
    }
}
