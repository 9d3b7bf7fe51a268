//! Chemins par plateforme et petits utilitaires de système de fichiers.
//!
//! - [`application_dir`] : dossier de l'exécutable
//! - [`resources_dir`] : ressources du moteur et de la barre d'outils
//! - [`user_data_dir`] : dossier de données utilisateur, créé à la demande
//!
//! Toutes les fonctions rapportent l'échec par `bool` / `Option` : l'appelant
//! journalise et continue.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Nom du dossier de données (en minuscules sous XDG).
const APP_DIR_NAME: &str = "Lanterne";

/// Dossier contenant l'exécutable courant.
pub fn application_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent().map(Path::to_path_buf)
}

/// Dossier des ressources, premier existant parmi :
///
/// 1. `SERVO_RESOURCES_PATH`
/// 2. `<app>/resources` (ou `<app>/../Resources` dans un bundle macOS)
/// 3. `<projet>/resources` quand l'exécutable est dans `target/<profil>/`
/// 4. `./resources`
pub fn resources_dir() -> Option<PathBuf> {
    resource_dir_candidates(
        std::env::var_os("SERVO_RESOURCES_PATH").map(PathBuf::from),
        application_dir(),
        std::env::current_dir().ok(),
    )
    .into_iter()
    .find(|dir| dir.is_dir())
}

/// Candidats dans l'ordre de recherche.
pub fn resource_dir_candidates(
    env_override: Option<PathBuf>,
    app_dir: Option<PathBuf>,
    cwd: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = env_override.into_iter().collect();
    if let Some(app_dir) = app_dir {
        candidates.push(resources_dir_from(&app_dir));
        if let Some(target) = app_dir.parent()
            && target.file_name().is_some_and(|n| n == "target")
            && let Some(root) = target.parent()
        {
            candidates.push(root.join("resources"));
        }
    }
    if let Some(cwd) = cwd {
        candidates.push(cwd.join("resources"));
    }
    candidates
}

fn resources_dir_from(app_dir: &Path) -> PathBuf {
    if cfg!(target_os = "macos") {
        // <bundle>.app/Contents/MacOS/<exe> → <bundle>.app/Contents/Resources
        app_dir.join("..").join("Resources")
    } else {
        app_dir.join("resources")
    }
}

/// Dossier de données utilisateur par plateforme, créé s'il n'existe pas.
///
/// - Windows : `%LOCALAPPDATA%\Lanterne`
/// - macOS : `~/Library/Application Support/Lanterne`
/// - autres : `$XDG_CONFIG_HOME/lanterne` ou `~/.config/lanterne`
///
/// Retourne `None` si la base n'est pas résolue ou si la création échoue.
pub fn user_data_dir() -> Option<PathBuf> {
    let dir = platform_user_data_dir()?;
    ensure_dir(&dir).then_some(dir)
}

#[cfg(windows)]
fn platform_user_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|base| base.join(APP_DIR_NAME))
}

#[cfg(target_os = "macos")]
fn platform_user_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|base| base.join(APP_DIR_NAME))
}

#[cfg(not(any(windows, target_os = "macos")))]
fn platform_user_data_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(APP_DIR_NAME.to_lowercase()))
}

/// `true` si `path` désigne un fichier ou un dossier existant.
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// Crée `path` et ses parents s'ils n'existent pas.
///
/// Idempotent : un dossier déjà présent donne `true`. Un chemin vide donne
/// `false` sans toucher au disque.
pub fn ensure_dir(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return false;
    }
    if path.is_dir() {
        return true;
    }
    match fs::create_dir_all(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Directory created");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot create directory");
            false
        }
    }
}

/// Lit un fichier binaire depuis [`resources_dir`].
///
/// Les noms qui sortent du dossier (`..`, chemins absolus) sont refusés.
pub fn load_binary_resource(name: &str) -> Option<Vec<u8>> {
    let dir = resources_dir()?;
    load_binary_resource_from(&dir, name)
}

fn load_binary_resource_from(dir: &Path, name: &str) -> Option<Vec<u8>> {
    let relative = Path::new(name);
    if relative.is_absolute()
        || relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
    {
        warn!(name, "Resource name rejected");
        return None;
    }

    let path = dir.join(relative);
    match fs::read(&path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Resource not loaded");
            None
        }
    }
}
