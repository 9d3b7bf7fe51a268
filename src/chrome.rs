//! Rendu GPU de la barre d'outils et du menu contextuel.
//!
//! Utilise `glow` pour les appels OpenGL et `fontdue` pour la rastérisation
//! CPU des glyphes. Les glyphes sont pré-rendus dans un atlas texture au
//! démarrage, puis dessinés comme des quads texturés à chaque frame.
//!
//! La géométrie de la barre ([`ToolbarLayout`]) ne dépend pas de GL : elle
//! sert aussi au hit-test des clics souris.

use std::collections::HashMap;
use std::sync::Arc;

use glow::HasContext;
use tracing::warn;

use crate::config::{ChromeColors, ChromeConfig};
use crate::context_menu::{ContextMenuOverlay, MENU_PADDING, MENU_WIDTH, MenuItem, NavigationState};
use crate::error::ShellError;
use crate::paths;

/// Hauteur du chrome en pixels physiques (valeur par défaut).
pub const CHROME_HEIGHT: u32 = 40;

/// Vertex shader GLES 300 es.
const VERTEX_SHADER: &str = r#"#version 300 es
precision mediump float;
layout(location = 0) in vec2 a_position;
layout(location = 1) in vec2 a_uv;
uniform mat4 u_projection;
out vec2 v_uv;
void main() {
    gl_Position = u_projection * vec4(a_position, 0.0, 1.0);
    v_uv = a_uv;
}
"#;

/// Fragment shader GLES 300 es.
const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec2 v_uv;
uniform sampler2D u_texture;
uniform vec4 u_color;
uniform bool u_use_texture;
out vec4 fragColor;
void main() {
    if (u_use_texture) {
        float alpha = texture(u_texture, v_uv).r;
        fragColor = vec4(u_color.rgb, u_color.a * alpha);
    } else {
        fragColor = u_color;
    }
}
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Zone cliquable de la barre d'outils.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeTarget {
    Back,
    Forward,
    ReloadStop,
    AddressBar,
}

/// Rectangle `x, y, w, h` en pixels physiques.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// Géométrie de la barre : trois boutons puis le champ d'adresse.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarLayout {
    pub back: Rect,
    pub forward: Rect,
    pub reload: Rect,
    pub address: Rect,
}

impl ToolbarLayout {
    pub fn new(window_width: u32, config: &ChromeConfig) -> Self {
        let m = config.bar_margin;
        let h = config.height as f32 - m * 2.0;
        let bw = config.button_width;

        let button = |i: f32| Rect {
            x: m + i * (bw + m),
            y: m,
            w: bw,
            h,
        };
        let back = button(0.0);
        let forward = button(1.0);
        let reload = button(2.0);

        let address_x = reload.x + bw + m;
        let address = Rect {
            x: address_x,
            y: m,
            w: (window_width as f32 - address_x - m).max(0.0),
            h,
        };

        Self {
            back,
            forward,
            reload,
            address,
        }
    }

    /// Cible sous le point `(x, y)`, hors barre : `None`.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<ChromeTarget> {
        [
            (self.back, ChromeTarget::Back),
            (self.forward, ChromeTarget::Forward),
            (self.reload, ChromeTarget::ReloadStop),
            (self.address, ChromeTarget::AddressBar),
        ]
        .into_iter()
        .find(|(rect, _)| rect.contains(x, y))
        .map(|(_, target)| target)
    }
}

/// Tout ce qu'une frame du chrome doit afficher.
#[derive(Debug, Clone, Copy)]
pub struct ChromeFrame<'a> {
    pub width: u32,
    pub height: u32,
    pub address: &'a str,
    pub focused: bool,
    pub cursor: Option<usize>,
    pub nav: NavigationState,
    pub hovered: Option<ChromeTarget>,
    pub menu: Option<&'a ContextMenuOverlay>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Glyph atlas
// ─────────────────────────────────────────────────────────────────────────────

/// Informations par glyphe dans l'atlas.
#[derive(Debug, Clone, Copy)]
struct GlyphInfo {
    atlas_x: u32,
    atlas_y: u32,
    width: u32,
    height: u32,
    advance_x: f32,
    offset_x: f32,
    /// Offset Y depuis la ligne de base (positif = vers le haut).
    offset_y: f32,
}

/// Glyphe rastérisé, avant packing.
struct RasterGlyph {
    c: char,
    width: u32,
    height: u32,
    advance_x: f32,
    xmin: i32,
    ymin: i32,
    bitmap: Vec<u8>,
}

/// Atlas de glyphes pré-rendus.
struct GlyphAtlas {
    width: u32,
    height: u32,
    glyphs: HashMap<char, GlyphInfo>,
    pixels: Vec<u8>,
}

const ATLAS_WIDTH: u32 = 512;

impl GlyphAtlas {
    fn build(font: &fontdue::Font, font_size: f32) -> Self {
        let glyphs = (32u8..=126)
            .map(|b| {
                let c = b as char;
                let (metrics, bitmap) = font.rasterize(c, font_size);
                RasterGlyph {
                    c,
                    width: metrics.width as u32,
                    height: metrics.height as u32,
                    advance_x: metrics.advance_width,
                    xmin: metrics.xmin,
                    ymin: metrics.ymin,
                    bitmap,
                }
            })
            .collect();
        Self::pack(glyphs)
    }

    /// Packing simple : rangées de gauche à droite.
    fn pack(rasterized: Vec<RasterGlyph>) -> Self {
        let mut glyphs = HashMap::new();
        let (mut x, mut y, mut row_height) = (0u32, 0u32, 0u32);

        for g in &rasterized {
            if x + g.width > ATLAS_WIDTH {
                x = 0;
                y += row_height + 1;
                row_height = 0;
            }
            row_height = row_height.max(g.height);
            glyphs.insert(
                g.c,
                GlyphInfo {
                    atlas_x: x,
                    atlas_y: y,
                    width: g.width,
                    height: g.height,
                    advance_x: g.advance_x,
                    offset_x: g.xmin as f32,
                    offset_y: g.ymin as f32,
                },
            );
            x += g.width + 1;
        }

        let height = (y + row_height + 1).next_power_of_two().max(64);
        let mut pixels = vec![0u8; (ATLAS_WIDTH * height) as usize];
        for g in &rasterized {
            let info = &glyphs[&g.c];
            for row in 0..info.height {
                for col in 0..info.width {
                    let src = (row * info.width + col) as usize;
                    let dst = ((info.atlas_y + row) * ATLAS_WIDTH + info.atlas_x + col) as usize;
                    if let (Some(&v), Some(p)) = (g.bitmap.get(src), pixels.get_mut(dst)) {
                        *p = v;
                    }
                }
            }
        }

        Self {
            width: ATLAS_WIDTH,
            height,
            glyphs,
            pixels,
        }
    }

    /// Avance d'un caractère. Hors atlas : la largeur d'un espace.
    fn advance(&self, c: char, font_size: f32) -> f32 {
        self.glyphs
            .get(&c)
            .or_else(|| self.glyphs.get(&' '))
            .map(|g| g.advance_x)
            .unwrap_or(font_size * 0.5)
    }

    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|c| self.advance(c, font_size)).sum()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Renderer OpenGL de la barre d'outils et du menu contextuel.
pub struct ChromeRenderer {
    gl: Arc<glow::Context>,
    program: glow::Program,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    atlas_texture: glow::Texture,
    /// Absent si la police n'a pas pu être chargée : pas de texte.
    atlas: Option<GlyphAtlas>,
    u_projection: glow::UniformLocation,
    u_color: glow::UniformLocation,
    u_use_texture: glow::UniformLocation,
    u_texture: glow::UniformLocation,
    config: ChromeConfig,
}

fn gl_err(what: &str) -> impl FnOnce(String) -> ShellError + '_ {
    move |e| ShellError::Chrome(format!("{what}: {e}"))
}

fn load_font(name: &str) -> Option<fontdue::Font> {
    let bytes = paths::load_binary_resource(name)?;
    match fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!(font = name, "Police illisible: {e}");
            None
        }
    }
}

#[allow(unsafe_op_in_unsafe_fn)]
impl ChromeRenderer {
    /// Crée le renderer. Doit être appelé avec un contexte GL actif.
    ///
    /// # Safety
    /// Appelle des fonctions OpenGL.
    pub unsafe fn new(gl: Arc<glow::Context>, config: &ChromeConfig) -> Result<Self, ShellError> {
        let program = Self::link_program(&gl)?;

        let uniform = |name: &str| {
            gl.get_uniform_location(program, name)
                .ok_or_else(|| ShellError::Chrome(format!("uniform {name} introuvable")))
        };
        let u_projection = uniform("u_projection")?;
        let u_color = uniform("u_color")?;
        let u_use_texture = uniform("u_use_texture")?;
        let u_texture = uniform("u_texture")?;

        // Vertex layout: [x, y, u, v] x 6 vertices (2 triangles)
        let vao = gl.create_vertex_array().map_err(gl_err("vertex array"))?;
        gl.bind_vertex_array(Some(vao));
        let vbo = gl.create_buffer().map_err(gl_err("buffer"))?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        let float = std::mem::size_of::<f32>() as i32;
        gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, 4 * float, 0);
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, 4 * float, 2 * float);
        gl.enable_vertex_attrib_array(1);
        gl.bind_vertex_array(None);

        let atlas = match load_font(&config.font) {
            Some(font) => Some(GlyphAtlas::build(&font, config.font_size)),
            None => {
                warn!(font = %config.font, "Police absente, barre d'outils sans texte");
                None
            }
        };

        let atlas_texture = gl.create_texture().map_err(gl_err("texture"))?;
        if let Some(atlas) = &atlas {
            gl.bind_texture(glow::TEXTURE_2D, Some(atlas_texture));
            for (param, value) in [
                (glow::TEXTURE_MIN_FILTER, glow::LINEAR),
                (glow::TEXTURE_MAG_FILTER, glow::LINEAR),
                (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE),
                (glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE),
            ] {
                gl.tex_parameter_i32(glow::TEXTURE_2D, param, value as i32);
            }
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::R8 as i32,
                atlas.width as i32,
                atlas.height as i32,
                0,
                glow::RED,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(&atlas.pixels)),
            );
        }

        Ok(Self {
            gl,
            program,
            vao,
            vbo,
            atlas_texture,
            atlas,
            u_projection,
            u_color,
            u_use_texture,
            u_texture,
            config: config.clone(),
        })
    }

    unsafe fn link_program(gl: &glow::Context) -> Result<glow::Program, ShellError> {
        let compile = |kind: u32, source: &str| -> Result<glow::Shader, ShellError> {
            let shader = gl.create_shader(kind).map_err(gl_err("shader"))?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                return Err(ShellError::Chrome(gl.get_shader_info_log(shader)));
            }
            Ok(shader)
        };
        let vs = compile(glow::VERTEX_SHADER, VERTEX_SHADER)?;
        let fs = compile(glow::FRAGMENT_SHADER, FRAGMENT_SHADER)?;

        let program = gl.create_program().map_err(gl_err("program"))?;
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);
        gl.delete_shader(vs);
        gl.delete_shader(fs);
        if !gl.get_program_link_status(program) {
            return Err(ShellError::Chrome(gl.get_program_info_log(program)));
        }
        Ok(program)
    }

    pub fn layout(&self, window_width: u32) -> ToolbarLayout {
        ToolbarLayout::new(window_width, &self.config)
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Dessine la barre d'outils puis, s'il est ouvert, le menu contextuel.
    ///
    /// # Safety
    /// Appelle des fonctions OpenGL.
    pub unsafe fn draw(&self, frame: &ChromeFrame<'_>) {
        let gl = &self.gl;
        let w = frame.width as f32;
        let h = frame.height as f32;
        let ch = self.config.height as f32;
        let colors = &self.config.colors;
        let layout = self.layout(frame.width);

        // ── Sauvegarder l'état GL ────────────────────────────────────────
        let prev_blend = gl.is_enabled(glow::BLEND);
        let prev_depth = gl.is_enabled(glow::DEPTH_TEST);
        let prev_scissor = gl.is_enabled(glow::SCISSOR_TEST);

        gl.viewport(0, 0, frame.width as i32, frame.height as i32);
        gl.disable(glow::DEPTH_TEST);
        gl.disable(glow::SCISSOR_TEST);
        gl.enable(glow::BLEND);
        gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        gl.use_program(Some(self.program));

        // Projection orthographique, origine en haut à gauche.
        #[rustfmt::skip]
        let projection: [f32; 16] = [
            2.0 / w,  0.0,       0.0, 0.0,
            0.0,     -2.0 / h,   0.0, 0.0,
            0.0,      0.0,      -1.0, 0.0,
           -1.0,      1.0,       0.0, 1.0,
        ];
        gl.uniform_matrix_4_f32_slice(Some(&self.u_projection), false, &projection);
        gl.uniform_1_i32(Some(&self.u_texture), 0);
        gl.bind_vertex_array(Some(self.vao));
        gl.active_texture(glow::TEXTURE0);
        gl.bind_texture(glow::TEXTURE_2D, Some(self.atlas_texture));

        // ── 1. Fond ──────────────────────────────────────────────────────
        let bg = if frame.focused {
            colors.background_focused
        } else {
            colors.background
        };
        self.draw_rect(0.0, 0.0, w, ch, bg);

        // ── 2. Boutons ───────────────────────────────────────────────────
        let reload_label = if frame.nav.is_loading { "x" } else { "R" };
        for (rect, target, label, enabled) in [
            (layout.back, ChromeTarget::Back, "<", frame.nav.can_go_back),
            (layout.forward, ChromeTarget::Forward, ">", frame.nav.can_go_forward),
            (layout.reload, ChromeTarget::ReloadStop, reload_label, true),
        ] {
            if enabled && frame.hovered == Some(target) {
                self.draw_rect(rect.x, rect.y, rect.w, rect.h, colors.button_hover);
            }
            let color = if enabled { colors.text } else { colors.text_disabled };
            let tw = self.text_width(label);
            let x = rect.x + (rect.w - tw) / 2.0;
            self.draw_text(label, x, (0.0, ch), rect.x + rect.w, color, None);
        }

        // ── 3. Champ d'adresse ───────────────────────────────────────────
        let bar = layout.address;
        self.draw_rect(bar.x, bar.y, bar.w, bar.h, colors.bar_border);
        self.draw_rect(bar.x + 1.0, bar.y + 1.0, bar.w - 2.0, bar.h - 2.0, colors.bar_background);

        let text_x = bar.x + self.config.bar_h_pad + self.config.text_left_pad;
        let max_x = bar.x + bar.w - self.config.bar_h_pad;
        let cursor_x =
            self.draw_text(frame.address, text_x, (0.0, ch), max_x, colors.text, frame.cursor);

        if frame.focused && let Some(cx) = cursor_x {
            let cursor_h = self.config.font_size + 4.0;
            self.draw_rect(cx, (ch - cursor_h) / 2.0, 2.0, cursor_h, colors.cursor);
        }

        // ── 4. Indicateur de chargement ──────────────────────────────────
        if frame.nav.is_loading {
            self.draw_rect(0.0, ch - 2.0, w, 2.0, colors.loading);
        }

        // ── 5. Menu contextuel ───────────────────────────────────────────
        if let Some(menu) = frame.menu {
            self.draw_menu(menu, colors);
        }

        // ── Restaurer l'état GL ──────────────────────────────────────────
        gl.bind_vertex_array(None);
        gl.use_program(None);
        if prev_depth {
            gl.enable(glow::DEPTH_TEST);
        }
        if !prev_blend {
            gl.disable(glow::BLEND);
        }
        if prev_scissor {
            gl.enable(glow::SCISSOR_TEST);
        }
    }

    unsafe fn draw_menu(&self, menu: &ContextMenuOverlay, colors: &ChromeColors) {
        let (mw, mh) = menu.size();
        let (mx, my) = menu.origin;
        self.draw_rect(mx - 1.0, my - 1.0, mw + 2.0, mh + 2.0, colors.bar_border);
        self.draw_rect(mx, my, mw, mh, colors.menu_background);

        let rows = menu.model.items().iter().zip(menu.item_rects());
        for (index, (item, (x, y, h))) in rows.enumerate() {
            match item {
                MenuItem::Separator => {
                    let width = MENU_WIDTH - 2.0 * MENU_PADDING;
                    self.draw_rect(x + MENU_PADDING, y + h / 2.0, width, 1.0, colors.bar_border);
                }
                MenuItem::Command { label, enabled, .. } => {
                    if *enabled && menu.hovered == Some(index) {
                        self.draw_rect(x, y, MENU_WIDTH, h, colors.menu_highlight);
                    }
                    let color = if *enabled { colors.text } else { colors.text_disabled };
                    let text_x = x + 3.0 * MENU_PADDING;
                    self.draw_text(label, text_x, (y, h), x + MENU_WIDTH, color, None);
                }
            }
        }
    }

    fn text_width(&self, text: &str) -> f32 {
        self.atlas
            .as_ref()
            .map(|a| a.text_width(text, self.config.font_size))
            .unwrap_or(0.0)
    }

    /// Dessine `text` centré verticalement dans la bande `(top, hauteur)`.
    /// Retourne la position X du curseur si `cursor` est atteint.
    unsafe fn draw_text(
        &self,
        text: &str,
        x: f32,
        band: (f32, f32),
        max_x: f32,
        color: [f32; 4],
        cursor: Option<usize>,
    ) -> Option<f32> {
        let font_size = self.config.font_size;
        let baseline = band.0 + band.1 / 2.0 + font_size / 3.0;
        let mut pen_x = x;
        let mut cursor_x = (cursor == Some(0)).then_some(pen_x);

        let Some(atlas) = &self.atlas else {
            return cursor_x;
        };

        for (i, c) in text.chars().enumerate() {
            if pen_x > max_x {
                break;
            }
            if let Some(glyph) = atlas.glyphs.get(&c)
                && glyph.width > 0
                && glyph.height > 0
            {
                let gy = baseline - glyph.offset_y - glyph.height as f32;
                self.draw_glyph(atlas, glyph, pen_x + glyph.offset_x, gy, color);
            }
            pen_x += atlas.advance(c, font_size);
            if cursor == Some(i + 1) {
                cursor_x = Some(pen_x);
            }
        }
        cursor_x
    }

    /// Dessine un rectangle de couleur unie.
    unsafe fn draw_rect(&self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
        self.gl.uniform_1_i32(Some(&self.u_use_texture), 0);
        self.gl.uniform_4_f32_slice(Some(&self.u_color), &color);
        self.draw_quad(x, y, w, h, [0.0; 4]);
    }

    unsafe fn draw_glyph(
        &self,
        atlas: &GlyphAtlas,
        glyph: &GlyphInfo,
        x: f32,
        y: f32,
        color: [f32; 4],
    ) {
        self.gl.uniform_1_i32(Some(&self.u_use_texture), 1);
        self.gl.uniform_4_f32_slice(Some(&self.u_color), &color);

        let aw = atlas.width as f32;
        let ah = atlas.height as f32;
        let uv = [
            glyph.atlas_x as f32 / aw,
            glyph.atlas_y as f32 / ah,
            (glyph.atlas_x + glyph.width) as f32 / aw,
            (glyph.atlas_y + glyph.height) as f32 / ah,
        ];
        self.draw_quad(x, y, glyph.width as f32, glyph.height as f32, uv);
    }

    /// Deux triangles, `uv = [u0, v0, u1, v1]`.
    unsafe fn draw_quad(&self, x: f32, y: f32, w: f32, h: f32, uv: [f32; 4]) {
        let [u0, v0, u1, v1] = uv;
        #[rustfmt::skip]
        let vertices: [f32; 24] = [
            x,     y,     u0, v0,
            x + w, y,     u1, v0,
            x + w, y + h, u1, v1,
            x,     y,     u0, v0,
            x + w, y + h, u1, v1,
            x,     y + h, u0, v1,
        ];
        let gl = &self.gl;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, f32_bytes(&vertices), glow::DYNAMIC_DRAW);
        gl.draw_arrays(glow::TRIANGLES, 0, 6);
    }
}

impl Drop for ChromeRenderer {
    fn drop(&mut self) {
        // SAFETY: objets créés sur ce contexte dans `new`.
        unsafe {
            self.gl.delete_program(self.program);
            self.gl.delete_vertex_array(self.vao);
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_texture(self.atlas_texture);
        }
    }
}

/// Vue `[u8]` d'un slice `[f32]` pour l'upload GL.
fn f32_bytes(data: &[f32]) -> &[u8] {
    // SAFETY: f32 n'a pas de padding et u8 a un alignement de 1.
    unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, std::mem::size_of_val(data)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(c: char, width: u32, height: u32) -> RasterGlyph {
        RasterGlyph {
            c,
            width,
            height,
            advance_x: width as f32 + 1.0,
            xmin: 0,
            ymin: -1,
            bitmap: vec![255; (width * height) as usize],
        }
    }

    fn test_atlas() -> GlyphAtlas {
        let glyphs = (33u8..=126)
            .map(|b| raster(b as char, 10 + (b as u32 % 7), 14 + (b as u32 % 5)))
            .chain(std::iter::once(raster(' ', 0, 0)))
            .collect();
        GlyphAtlas::pack(glyphs)
    }

    // ── atlas ──

    #[test]
    fn test_atlas_dimensions() {
        let atlas = test_atlas();
        assert_eq!(atlas.width, 512);
        assert!(atlas.height >= 64);
        assert!(atlas.height.is_power_of_two());
        assert_eq!(atlas.pixels.len(), (atlas.width * atlas.height) as usize);
    }

    #[test]
    fn test_glyphs_within_bounds_and_disjoint() {
        let atlas = test_atlas();
        let glyphs: Vec<_> = atlas.glyphs.values().filter(|g| g.width > 0).collect();
        for g in &glyphs {
            assert!(g.atlas_x + g.width <= atlas.width);
            assert!(g.atlas_y + g.height <= atlas.height);
        }
        for (i, a) in glyphs.iter().enumerate() {
            for b in &glyphs[i + 1..] {
                let overlap_x =
                    a.atlas_x < b.atlas_x + b.width && b.atlas_x < a.atlas_x + a.width;
                let overlap_y =
                    a.atlas_y < b.atlas_y + b.height && b.atlas_y < a.atlas_y + a.height;
                assert!(!(overlap_x && overlap_y));
            }
        }
    }

    #[test]
    fn test_bitmap_copied_into_atlas() {
        let atlas = test_atlas();
        let a = atlas.glyphs[&'A'];
        let idx = (a.atlas_y * atlas.width + a.atlas_x) as usize;
        assert_eq!(atlas.pixels[idx], 255);
    }

    #[test]
    fn test_unknown_char_advances_like_space() {
        let atlas = test_atlas();
        assert_eq!(atlas.advance('é', 16.0), atlas.glyphs[&' '].advance_x);
        assert_eq!(atlas.text_width("", 16.0), 0.0);
    }

    #[test]
    fn test_f32_bytes_length() {
        assert_eq!(f32_bytes(&[1.0, 2.0]).len(), 8);
    }

    // ── layout ──

    #[test]
    fn test_layout_buttons_then_address() {
        let config = ChromeConfig::default();
        let layout = ToolbarLayout::new(1280, &config);
        assert!(layout.back.x < layout.forward.x);
        assert!(layout.forward.x < layout.reload.x);
        assert!(layout.reload.x + layout.reload.w <= layout.address.x);
        assert_eq!(layout.address.x + layout.address.w, 1280.0 - config.bar_margin);
        assert_eq!(layout.back.h, CHROME_HEIGHT as f32 - 2.0 * config.bar_margin);
    }

    #[test]
    fn test_hit_test() {
        let layout = ToolbarLayout::new(1280, &ChromeConfig::default());
        let center = |r: Rect| (r.x + r.w / 2.0, r.y + r.h / 2.0);

        let (x, y) = center(layout.back);
        assert_eq!(layout.hit_test(x, y), Some(ChromeTarget::Back));
        let (x, y) = center(layout.forward);
        assert_eq!(layout.hit_test(x, y), Some(ChromeTarget::Forward));
        let (x, y) = center(layout.reload);
        assert_eq!(layout.hit_test(x, y), Some(ChromeTarget::ReloadStop));
        let (x, y) = center(layout.address);
        assert_eq!(layout.hit_test(x, y), Some(ChromeTarget::AddressBar));

        assert_eq!(layout.hit_test(1.0, 1.0), None);
        assert_eq!(layout.hit_test(600.0, 200.0), None);
    }

    #[test]
    fn test_narrow_window_address_not_negative() {
        let layout = ToolbarLayout::new(50, &ChromeConfig::default());
        assert_eq!(layout.address.w, 0.0);
    }

    #[test]
    fn test_chrome_height_is_40() {
        assert_eq!(CHROME_HEIGHT, 40);
        assert_eq!(ChromeConfig::default().height, CHROME_HEIGHT);
    }
}
