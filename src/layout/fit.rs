use crate::{
    config::{LayoutConfig, ScoringConfig},
    layout::{font::FontProvider, score::overflow_flags, wrap::wrap_text},
    models::{
        Alignment, BlockKind, FitAttempt, FitOutcome, FontDescriptor, LayoutResult, TextBlock,
    },
};

/// What to lay out for one block, before any scale is applied.
#[derive(Debug, Clone)]
pub struct BlockSpec<'a> {
    pub kind: BlockKind,
    pub text: &'a str,
    pub font: FontDescriptor,
    pub base_size: f32,
    pub min_size: f32,
    pub alignment: Alignment,
}

impl BlockSpec<'_> {
    pub fn size_at(&self, scale: f32) -> f32 {
        (self.base_size * scale).max(self.min_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitState {
    Try { attempt: usize, scale: f32 },
    Accepted,
    Exhausted,
}

impl FitState {
    /// Transition out of `Try` after measuring an attempt.
    pub fn next(self, fits: bool, config: &LayoutConfig) -> FitState {
        match self {
            FitState::Try { attempt, scale } => {
                if fits {
                    FitState::Accepted
                } else if attempt >= config.max_attempts {
                    FitState::Exhausted
                } else {
                    FitState::Try {
                        attempt: attempt + 1,
                        scale: scale * config.shrink_factor,
                    }
                }
            }
            terminal => terminal,
        }
    }
}

pub struct Fitter<'a> {
    fonts: &'a dyn FontProvider,
    config: &'a LayoutConfig,
    scoring: &'a ScoringConfig,
    width: u32,
    height: u32,
}

struct Measured {
    blocks: [TextBlock; 3],
    total_height: f32,
}

impl<'a> Fitter<'a> {
    pub fn new(
        fonts: &'a dyn FontProvider,
        config: &'a LayoutConfig,
        scoring: &'a ScoringConfig,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            fonts,
            config,
            scoring,
            width,
            height,
        }
    }

    pub fn wrap_width(&self) -> f32 {
        self.width as f32 * self.config.wrap_width_ratio
    }

    pub fn height_budget(&self) -> f32 {
        self.height as f32 * self.config.fit_height_ratio
    }

    pub fn build_block(&self, spec: &BlockSpec<'_>, scale: f32) -> TextBlock {
        let size = spec.size_at(scale);
        let font = self.fonts.resolve(&spec.font, size);
        let lines = wrap_text(spec.text, font.as_ref(), self.wrap_width());
        let line_height = font.line_height();
        // Every line carries the gap, the last one included.
        let height = lines.len() as f32 * (line_height + self.config.line_gap);

        TextBlock {
            kind: spec.kind,
            source: spec.text.to_string(),
            font: spec.font.clone(),
            size_pt: size,
            lines,
            line_height,
            height,
            alignment: spec.alignment,
        }
    }

    fn measure(&self, specs: &[BlockSpec<'_>; 3], scale: f32) -> Measured {
        let blocks = [
            self.build_block(&specs[0], scale),
            self.build_block(&specs[1], scale),
            self.build_block(&specs[2], scale),
        ];
        let total_height =
            blocks.iter().map(|b| b.height).sum::<f32>() + self.config.margin_budget;
        Measured {
            blocks,
            total_height,
        }
    }

    /// Shrinks until the three blocks plus the margin budget fit the height
    /// budget, giving up after `max_attempts` and keeping the smallest attempt.
    pub fn fit(&self, specs: [BlockSpec<'_>; 3]) -> LayoutResult {
        let budget = self.height_budget();
        let mut attempts = Vec::with_capacity(self.config.max_attempts);
        let (mut attempt, mut scale) = (1, 1.0);

        loop {
            let measured = self.measure(&specs, scale);
            let fits = measured.total_height <= budget;
            attempts.push(FitAttempt {
                scale,
                total_height: measured.total_height,
                fits,
            });
            log::debug!(
                "Fit attempt {}: scale={:.3}, total={:.1}px, budget={:.1}px",
                attempt,
                scale,
                measured.total_height,
                budget
            );

            match (FitState::Try { attempt, scale }).next(fits, self.config) {
                FitState::Try {
                    attempt: next_attempt,
                    scale: next_scale,
                } => {
                    attempt = next_attempt;
                    scale = next_scale;
                }
                FitState::Accepted => {
                    return self.finish(measured, scale, attempts, FitOutcome::Accepted)
                }
                FitState::Exhausted => {
                    return self.finish(measured, scale, attempts, FitOutcome::Exhausted)
                }
            }
        }
    }

    fn finish(
        &self,
        measured: Measured,
        scale: f32,
        attempts: Vec<FitAttempt>,
        outcome: FitOutcome,
    ) -> LayoutResult {
        let [headword, meaning, example] = measured.blocks;
        let overflow = overflow_flags(&headword, &meaning, &example, self.height, self.scoring);
        if outcome == FitOutcome::Exhausted {
            log::warn!(
                "Text still overflows after {} attempts (total {:.1}px > {:.1}px)",
                attempts.len(),
                measured.total_height,
                self.height_budget()
            );
        }

        LayoutResult {
            scale,
            headword,
            meaning,
            example,
            total_height: measured.total_height,
            overflow,
            attempts,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{font::FixedMetricFontProvider, LayoutEngine};
    use std::sync::Arc;

    fn specs<'a>(word: &'a str, meaning: &'a str, example: &'a str) -> [BlockSpec<'a>; 3] {
        LayoutEngine::new(
            LayoutConfig::default(),
            ScoringConfig::default(),
            Arc::new(FixedMetricFontProvider),
        )
        .specs(word, meaning, example)
    }

    #[test]
    fn test_state_transitions() {
        let config = LayoutConfig::default();
        let start = FitState::Try {
            attempt: 1,
            scale: 1.0,
        };
        assert_eq!(start.next(true, &config), FitState::Accepted);
        assert_eq!(
            start.next(false, &config),
            FitState::Try {
                attempt: 2,
                scale: 0.9
            }
        );
        let last = FitState::Try {
            attempt: 8,
            scale: 0.5,
        };
        assert_eq!(last.next(false, &config), FitState::Exhausted);
        assert_eq!(FitState::Accepted.next(false, &config), FitState::Accepted);
    }

    #[test]
    fn test_short_text_accepted_at_full_scale() {
        let (config, scoring) = (LayoutConfig::default(), ScoringConfig::default());
        let fitter = Fitter::new(&FixedMetricFontProvider, &config, &scoring, 1024, 1024);
        let result = fitter.fit(specs("buy", "pay for", "I buy milk."));

        assert_eq!(result.outcome, FitOutcome::Accepted);
        assert_eq!(result.scale, 1.0);
        assert_eq!(result.attempts.len(), 1);
        assert_eq!(result.headword.lines, vec!["buy"]);
        // 64pt fixed font: 77px line + 6px gap
        assert_eq!(result.headword.height, 83.0);
    }

    #[test]
    fn test_long_text_exhausts_and_heights_never_grow() {
        let (config, scoring) = (LayoutConfig::default(), ScoringConfig::default());
        let example = "word ".repeat(400);
        let fitter = Fitter::new(&FixedMetricFontProvider, &config, &scoring, 512, 512);
        let result = fitter.fit(specs("buy", "take mainly by using money", &example));

        assert_eq!(result.outcome, FitOutcome::Exhausted);
        assert_eq!(result.attempts.len(), config.max_attempts);
        assert!(result.attempts.iter().all(|a| !a.fits));
        for pair in result.attempts.windows(2) {
            assert!(pair[1].scale < pair[0].scale);
            assert!(pair[1].total_height <= pair[0].total_height);
        }
        assert!(result.overflow.example);
        assert!(!result.overflow.headword);
        assert_eq!(result.example.size_pt, config.example_min_size.max(30.0 * result.scale));
    }

    #[test]
    fn test_empty_strings_are_zero_height() {
        let (config, scoring) = (LayoutConfig::default(), ScoringConfig::default());
        let fitter = Fitter::new(&FixedMetricFontProvider, &config, &scoring, 512, 512);
        let result = fitter.fit(specs("", "", ""));
        assert_eq!(result.outcome, FitOutcome::Accepted);
        assert!(result.blocks().iter().all(|b| b.is_empty() && b.height == 0.0));
        assert_eq!(result.total_height, config.margin_budget);
    }

    #[test]
    fn test_sizes_clamped_to_minimum() {
        let all = specs("a", "b", "c");
        let spec = &all[0];
        assert_eq!(spec.size_at(1.0), 64.0);
        assert_eq!(spec.size_at(0.1), 28.0);
    }
}
