use crate::{
    layout::render::blend_pixel,
    models::{FontDescriptor, FontSlant, FontWeight},
};
use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A font instance at one pixel size.
pub trait CardFont: Send + Sync {
    fn size(&self) -> f32;

    /// Advance width of `text` in pixels.
    fn text_width(&self, text: &str) -> f32;

    fn line_height(&self) -> f32;

    /// Draws `text` with its top-left corner at (`x`, `y`).
    fn draw_text(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>);
}

/// Resolves a descriptor and size to something drawable. Never fails: when no
/// face can be loaded a built-in fixed-metric font is returned instead.
pub trait FontProvider: Send + Sync {
    fn resolve(&self, descriptor: &FontDescriptor, size: f32) -> Arc<dyn CardFont>;
}

pub struct TrueTypeFont {
    font: Arc<Font<'static>>,
    size: f32,
}

impl TrueTypeFont {
    pub fn new(font: Arc<Font<'static>>, size: f32) -> Self {
        Self { font, size }
    }

    fn scale(&self) -> Scale {
        Scale::uniform(self.size)
    }
}

impl CardFont for TrueTypeFont {
    fn size(&self) -> f32 {
        self.size
    }

    fn text_width(&self, text: &str) -> f32 {
        self.font
            .layout(text, self.scale(), point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn line_height(&self) -> f32 {
        let vm = self.font.v_metrics(self.scale());
        (vm.ascent - vm.descent + vm.line_gap).ceil()
    }

    fn draw_text(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        let scale = self.scale();
        let baseline = y as f32 + self.font.v_metrics(scale).ascent;
        let (width, height) = canvas.dimensions();

        for glyph in self.font.layout(text, scale, point(x as f32, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                    return;
                }
                blend_pixel(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
            });
        }
    }
}

/// Monospace stand-in with exact, host-independent metrics. Glyphs render as boxes.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetricFont {
    size: f32,
}

impl FixedMetricFont {
    pub const ADVANCE_RATIO: f32 = 0.6;
    pub const LINE_RATIO: f32 = 1.2;

    pub fn new(size: f32) -> Self {
        Self { size }
    }

    fn advance(&self) -> f32 {
        self.size * Self::ADVANCE_RATIO
    }
}

impl CardFont for FixedMetricFont {
    fn size(&self) -> f32 {
        self.size
    }

    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance()
    }

    fn line_height(&self) -> f32 {
        (self.size * Self::LINE_RATIO).ceil()
    }

    fn draw_text(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        let advance = self.advance();
        let glyph_w = (advance * 0.8).max(1.0);
        let glyph_h = (self.size * 0.7).max(1.0);
        let top = y as f32 + self.size * 0.25;
        let (width, height) = canvas.dimensions();

        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = x as f32 + i as f32 * advance + advance * 0.1;
            let x0 = left.max(0.0) as u32;
            let y0 = top.max(0.0) as u32;
            let x1 = ((left + glyph_w).max(0.0) as u32).min(width);
            let y1 = ((top + glyph_h).max(0.0) as u32).min(height);
            for py in y0..y1 {
                for px in x0..x1 {
                    blend_pixel(canvas.get_pixel_mut(px, py), color, 1.0);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FixedMetricFontProvider;

impl FontProvider for FixedMetricFontProvider {
    fn resolve(&self, _descriptor: &FontDescriptor, size: f32) -> Arc<dyn CardFont> {
        Arc::new(FixedMetricFont::new(size))
    }
}

const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/truetype/noto",
    "/usr/share/fonts/noto",
    "/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
    "C:\\Windows\\Fonts",
];

fn candidate_files(weight: FontWeight, slant: FontSlant) -> &'static [&'static str] {
    match (weight, slant) {
        (FontWeight::Bold, FontSlant::Upright) => &[
            "DejaVuSans-Bold.ttf",
            "LiberationSans-Bold.ttf",
            "NotoSans-Bold.ttf",
            "Arial Bold.ttf",
            "arialbd.ttf",
        ],
        (FontWeight::Bold, FontSlant::Italic) => &[
            "DejaVuSans-BoldOblique.ttf",
            "LiberationSans-BoldItalic.ttf",
            "NotoSans-BoldItalic.ttf",
            "Arial Bold Italic.ttf",
            "arialbi.ttf",
        ],
        (FontWeight::Regular, FontSlant::Italic) => &[
            "DejaVuSans-Oblique.ttf",
            "LiberationSans-Italic.ttf",
            "NotoSans-Italic.ttf",
            "Arial Italic.ttf",
            "ariali.ttf",
        ],
        (FontWeight::Regular, FontSlant::Upright) => &[
            "DejaVuSans.ttf",
            "LiberationSans-Regular.ttf",
            "NotoSans-Regular.ttf",
            "Arial.ttf",
            "arial.ttf",
        ],
    }
}

/// Looks up TrueType faces on the host, trying explicit files first, then the
/// well-known font directories.
pub struct SystemFontProvider {
    overrides: HashMap<FontDescriptor, PathBuf>,
    search_dirs: Vec<PathBuf>,
    cache: Mutex<HashMap<FontDescriptor, Option<Arc<Font<'static>>>>>,
}

impl Default for SystemFontProvider {
    fn default() -> Self {
        Self {
            overrides: HashMap::new(),
            search_dirs: FONT_DIRS.iter().map(PathBuf::from).collect(),
            cache: Mutex::new(HashMap::new()),
        }
    }
}

impl SystemFontProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_file(mut self, descriptor: FontDescriptor, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(descriptor, path.into());
        self
    }

    fn candidates(&self, descriptor: &FontDescriptor) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.overrides.get(descriptor).cloned().into_iter().collect();
        for dir in &self.search_dirs {
            for file in candidate_files(descriptor.weight, descriptor.slant) {
                paths.push(dir.join(file));
            }
        }
        paths
    }

    fn load_face(path: &Path) -> Option<Font<'static>> {
        let bytes = std::fs::read(path).ok()?;
        Font::try_from_vec(bytes)
    }

    fn face(&self, descriptor: &FontDescriptor) -> Option<Arc<Font<'static>>> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.get(descriptor) {
            return cached.clone();
        }

        let face = self.candidates(descriptor).into_iter().find_map(|path| {
            let face = Self::load_face(&path)?;
            log::debug!("Font {:?} resolved to {}", descriptor, path.display());
            Some(Arc::new(face))
        });
        if face.is_none() {
            log::warn!(
                "No TrueType face found for {:?}; using fixed-metric fallback",
                descriptor
            );
        }
        cache.insert(descriptor.clone(), face.clone());
        face
    }
}

impl FontProvider for SystemFontProvider {
    fn resolve(&self, descriptor: &FontDescriptor, size: f32) -> Arc<dyn CardFont> {
        match self.face(descriptor) {
            Some(face) => Arc::new(TrueTypeFont::new(face, size)),
            None => Arc::new(FixedMetricFont::new(size)),
        }
    }
}
