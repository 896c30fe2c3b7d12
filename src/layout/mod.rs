pub mod fit;
pub mod font;
pub mod render;
pub mod score;
pub mod wrap;

use crate::{
    config::{LayoutConfig, ScoringConfig},
    models::{
        Alignment, BlockKind, CardArtifact, CardStatus, FontDescriptor, FontSlant, FontWeight,
        LayoutResult,
    },
};
use image::RgbaImage;
use std::sync::Arc;

pub use fit::{BlockSpec, FitState, Fitter};
pub use font::{CardFont, FixedMetricFont, FixedMetricFontProvider, FontProvider, SystemFontProvider};
pub use render::Placement;
pub use score::{legibility_score, overflow_flags};
pub use wrap::wrap_text;

/// Fits headword, meaning and example onto a background and scores the result.
///
/// Holds no per-card state; one engine can compose any number of cards.
#[derive(Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    scoring: ScoringConfig,
    fonts: Arc<dyn FontProvider>,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig, scoring: ScoringConfig, fonts: Arc<dyn FontProvider>) -> Self {
        Self {
            config,
            scoring,
            fonts,
        }
    }

    /// Engine using the host's TrueType fonts.
    pub fn with_system_fonts(config: LayoutConfig, scoring: ScoringConfig) -> Self {
        Self::new(config, scoring, Arc::new(SystemFontProvider::new()))
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub(crate) fn specs<'a>(
        &self,
        word: &'a str,
        meaning: &'a str,
        example: &'a str,
    ) -> [BlockSpec<'a>; 3] {
        let c = &self.config;
        [
            BlockSpec {
                kind: BlockKind::Headword,
                text: word,
                font: FontDescriptor::sans(FontWeight::Bold, FontSlant::Upright),
                base_size: c.headword_size,
                min_size: c.headword_min_size,
                alignment: Alignment::Center,
            },
            BlockSpec {
                kind: BlockKind::Meaning,
                text: meaning,
                font: FontDescriptor::sans(FontWeight::Regular, FontSlant::Upright),
                base_size: c.meaning_size,
                min_size: c.meaning_min_size,
                alignment: Alignment::Center,
            },
            BlockSpec {
                kind: BlockKind::Example,
                text: example,
                font: FontDescriptor::sans(FontWeight::Regular, FontSlant::Italic),
                base_size: c.example_size,
                min_size: c.example_min_size,
                alignment: Alignment::Left,
            },
        ]
    }

    /// Text layout only: no pixels are touched.
    pub fn layout(
        &self,
        word: &str,
        meaning: &str,
        example: &str,
        width: u32,
        height: u32,
    ) -> LayoutResult {
        let (width, height) = (width.max(1), height.max(1));
        Fitter::new(self.fonts.as_ref(), &self.config, &self.scoring, width, height)
            .fit(self.specs(word, meaning, example))
    }

    /// Normalizes the background to `width`x`height`, fits and draws the three
    /// blocks, and scores the layout. Always produces a card; overflow shows up
    /// in the score instead of as an error.
    pub fn compose(
        &self,
        background: &RgbaImage,
        word: &str,
        meaning: &str,
        example: &str,
        width: u32,
        height: u32,
    ) -> CardArtifact {
        let (width, height) = (width.max(1), height.max(1));
        let mut canvas = if background.width() == 0 || background.height() == 0 {
            log::warn!("Empty background; composing onto a black canvas");
            RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]))
        } else {
            render::normalize_canvas(
                background,
                width,
                height,
                self.config.contrast,
                self.config.saturation,
            )
        };

        let layout = self.layout(word, meaning, example, width, height);
        self.draw(&mut canvas, &layout, width, height);

        let score = legibility_score(layout.block_heights(), height, &layout.overflow, &self.scoring);
        let status = CardStatus::from_score(score, self.scoring.good_threshold);
        log::info!(
            "Composed '{}' at {}x{}: scale={:.3} after {} attempt(s), score={} ({})",
            word,
            width,
            height,
            layout.scale,
            layout.attempts.len(),
            score,
            status
        );

        CardArtifact {
            image: canvas,
            score,
            status,
            layout,
        }
    }

    fn draw(&self, canvas: &mut RgbaImage, layout: &LayoutResult, width: u32, height: u32) {
        let column_width = width as f32 * self.config.wrap_width_ratio;
        let column_left = (width as f32 - column_width) / 2.0;
        let pad = self.config.band_padding as f32;
        let place = |top: f32| Placement {
            top,
            column_left,
            column_width,
        };

        let headword_top = height as f32 * self.config.headword_anchor;
        let meaning_top = if layout.headword.is_empty() {
            headword_top
        } else {
            headword_top + layout.headword.height + 2.0 * pad
        };
        let example_top = height as f32 * self.config.example_anchor;

        for (block, top) in [
            (&layout.headword, headword_top),
            (&layout.meaning, meaning_top),
            (&layout.example, example_top),
        ] {
            let font = self.fonts.resolve(&block.font, block.size_pt);
            render::draw_block(canvas, block, font.as_ref(), place(top), &self.config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FitOutcome;
    use image::Rgba;

    fn engine() -> LayoutEngine {
        LayoutEngine::new(
            LayoutConfig::default(),
            ScoringConfig::default(),
            Arc::new(FixedMetricFontProvider),
        )
    }

    fn background(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    const WORD: &str = "buy";
    const MEANING: &str = "take mainly by using money";
    const EXAMPLE: &str = "he buys milk every morning from the corner store after his jog";

    #[test]
    fn test_buy_card_end_to_end() {
        let engine = engine();
        let card = engine.compose(&background(512, 512), WORD, MEANING, EXAMPLE, 512, 512);

        assert_eq!(card.image.dimensions(), (512, 512));
        assert!(card.layout.attempts.len() <= 8);
        assert!(card.layout.scale <= 1.0 && card.layout.scale > 0.0);
        assert!(card.score <= 100);

        let expected = legibility_score(
            card.layout.block_heights(),
            512,
            &card.layout.overflow,
            engine.scoring(),
        );
        assert_eq!(card.score, expected);
        if card.layout.overflow.example {
            assert!(card.score <= 90);
        }
        if card.layout.outcome == FitOutcome::Exhausted {
            assert!(card.layout.total_height > 512.0 * 0.9);
        }
    }

    #[test]
    fn test_buy_card_fits_on_square_1024() {
        let card = engine().compose(&background(300, 200), WORD, MEANING, EXAMPLE, 1024, 1024);
        assert_eq!(card.layout.outcome, FitOutcome::Accepted);
        assert_eq!(card.layout.scale, 1.0);
        assert!(!card.layout.overflow.example);
        assert_eq!(card.score, 100);
        assert_eq!(card.status, CardStatus::Good);
        assert_eq!(card.image.dimensions(), (1024, 1024));
    }

    #[test]
    fn test_compose_is_idempotent() {
        let engine = engine();
        let bg = background(512, 512);
        let a = engine.compose(&bg, WORD, MEANING, EXAMPLE, 512, 512);
        let b = engine.compose(&bg, WORD, MEANING, EXAMPLE, 512, 512);

        assert_eq!(a.layout, b.layout);
        assert_eq!(a.score, b.score);
        assert_eq!(a.image, b.image);
    }

    #[test]
    fn test_pathological_text_still_composes() {
        let engine = engine();
        let huge = "overflowing ".repeat(500);
        let card = engine.compose(&background(64, 64), &huge, &huge, &huge, 320, 240);

        assert_eq!(card.layout.outcome, FitOutcome::Exhausted);
        assert_eq!(card.layout.attempts.len(), 8);
        assert!(card.layout.overflow.example);
        assert_eq!(card.score, 0);
        assert_eq!(card.status, CardStatus::Overflow);
    }

    #[test]
    fn test_empty_text_is_clean_card() {
        let card = engine().compose(&background(64, 64), "", "", "", 256, 256);
        assert_eq!(card.score, 100);
        assert!(card.layout.blocks().iter().all(|b| b.lines.is_empty()));
    }

    #[test]
    fn test_empty_background_is_tolerated() {
        let card = engine().compose(&RgbaImage::new(0, 0), WORD, MEANING, EXAMPLE, 128, 96);
        assert_eq!(card.image.dimensions(), (128, 96));
    }

    #[test]
    fn test_bands_darken_behind_text() {
        let bg = RgbaImage::from_pixel(400, 400, Rgba([200, 200, 200, 255]));
        let card = engine().compose(&bg, "", "", "walk", 400, 400);
        // left edge of the example band, outside any glyph
        let column_left = (400.0 - 400.0 * 0.88) / 2.0;
        let y = (400.0 * 0.72) as u32 + 1;
        let inside = card.image.get_pixel(column_left as u32 - 4, y);
        let outside = card.image.get_pixel(column_left as u32 - 4, 20);
        assert!(inside.0[0] < outside.0[0]);
    }
}
