//! Factory pour le contexte de rendu GPU.
//!
//! Isole la création du `WindowRenderingContext` (surfman/OpenGL) du reste
//! de la fenêtre. Un contexte offscreen dérivé sert à la vue web, placée
//! sous la barre d'outils.

use std::rc::Rc;

use servo::{OffscreenRenderingContext, RenderingContext, WindowRenderingContext};
use winit::dpi::PhysicalSize;
use winit::raw_window_handle::{DisplayHandle, WindowHandle};

use crate::error::ShellError;

/// Crée un contexte de rendu hardware lié à la fenêtre.
///
/// Le contexte est rendu courant avant d'être retourné, ce qui est requis
/// avant de le passer à `WebViewBuilder`.
pub fn create_rendering_context(
    display_handle: DisplayHandle<'_>,
    window_handle: WindowHandle<'_>,
    size: PhysicalSize<u32>,
) -> Result<Rc<WindowRenderingContext>, ShellError> {
    let rendering_context = WindowRenderingContext::new(display_handle, window_handle, size)
        .map_err(|e| ShellError::Rendering(format!("{e:?}")))?;

    rendering_context
        .make_current()
        .map_err(|e| ShellError::Rendering(format!("make_current: {e:?}")))?;

    Ok(Rc::new(rendering_context))
}

/// Contexte offscreen de la vue web, de la taille de la zone de contenu.
pub fn create_webview_context(
    window_context: &Rc<WindowRenderingContext>,
    content_size: PhysicalSize<u32>,
) -> Rc<OffscreenRenderingContext> {
    let offscreen = window_context.offscreen_context(content_size);
    Rc::new(offscreen)
}

/// Taille de la zone de contenu : la fenêtre moins la barre d'outils.
pub fn content_size(window: PhysicalSize<u32>, chrome_height: u32) -> PhysicalSize<u32> {
    PhysicalSize::new(window.width.max(1), window.height.saturating_sub(chrome_height).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_size_excludes_toolbar() {
        let size = content_size(PhysicalSize::new(1280, 800), 40);
        assert_eq!(size, PhysicalSize::new(1280, 760));
    }

    #[test]
    fn test_content_size_never_zero() {
        assert_eq!(content_size(PhysicalSize::new(0, 20), 40), PhysicalSize::new(1, 1));
    }
}
