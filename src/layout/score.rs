use crate::{
    config::ScoringConfig,
    models::{BlockOverflow, TextBlock},
};

fn exceeds(block: &TextBlock, ratio: Option<f32>, canvas_height: f32) -> bool {
    ratio.map_or(false, |r| block.height > r * canvas_height)
}

/// Flags blocks taller than their configured share of the canvas. Only blocks
/// with a ratio set are checked.
pub fn overflow_flags(
    headword: &TextBlock,
    meaning: &TextBlock,
    example: &TextBlock,
    canvas_height: u32,
    scoring: &ScoringConfig,
) -> BlockOverflow {
    let h = canvas_height as f32;
    BlockOverflow {
        headword: exceeds(headword, scoring.headword_overflow_ratio, h),
        meaning: exceeds(meaning, scoring.meaning_overflow_ratio, h),
        example: exceeds(example, scoring.example_overflow_ratio, h),
    }
}

/// 0..=100 legibility score from the summed block heights alone.
///
/// Full marks once the residual margin reaches `full_margin_ratio` of the
/// canvas height, zero when the blocks fill it, then a flat penalty per
/// overflowing block.
pub fn legibility_score(
    block_heights: f32,
    canvas_height: u32,
    overflow: &BlockOverflow,
    scoring: &ScoringConfig,
) -> u8 {
    let h = canvas_height.max(1) as f32;
    let margin = h - block_heights;
    let full = (scoring.full_margin_ratio * h).max(f32::EPSILON);
    let base = 100.0 * (margin / full).clamp(0.0, 1.0);
    let penalty = (scoring.overflow_penalty * overflow.count() as i32) as f32;
    (base - penalty).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Alignment, BlockKind, FontDescriptor, FontSlant, FontWeight};

    fn block(height: f32) -> TextBlock {
        TextBlock {
            kind: BlockKind::Example,
            source: String::new(),
            font: FontDescriptor::sans(FontWeight::Regular, FontSlant::Italic),
            size_pt: 16.0,
            lines: vec![],
            line_height: 0.0,
            height,
            alignment: Alignment::Left,
        }
    }

    #[test]
    fn test_full_marks_with_ten_percent_margin() {
        let scoring = ScoringConfig::default();
        let none = BlockOverflow::default();
        assert_eq!(legibility_score(0.0, 512, &none, &scoring), 100);
        assert_eq!(legibility_score(460.8, 512, &none, &scoring), 100);
        assert_eq!(legibility_score(512.0, 512, &none, &scoring), 0);
        assert_eq!(legibility_score(900.0, 512, &none, &scoring), 0);
        assert_eq!(legibility_score(486.4, 512, &none, &scoring), 50);
    }

    #[test]
    fn test_penalty_and_clamp() {
        let scoring = ScoringConfig::default();
        let flagged = BlockOverflow {
            example: true,
            ..Default::default()
        };
        assert_eq!(legibility_score(100.0, 512, &flagged, &scoring), 90);
        assert_eq!(legibility_score(510.0, 512, &flagged, &scoring), 0);

        let all = BlockOverflow {
            headword: true,
            meaning: true,
            example: true,
        };
        assert_eq!(legibility_score(0.0, 512, &all, &scoring), 70);
    }

    #[test]
    fn test_score_is_monotone_in_height() {
        let scoring = ScoringConfig::default();
        let none = BlockOverflow::default();
        let mut previous = 100;
        for height in (0..700).step_by(7) {
            let score = legibility_score(height as f32, 512, &none, &scoring);
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_only_example_is_checked_by_default() {
        let scoring = ScoringConfig::default();
        let tall = block(400.0);
        let flags = overflow_flags(&tall, &tall, &tall, 512, &scoring);
        assert!(!flags.headword);
        assert!(!flags.meaning);
        assert!(flags.example);

        let ok = block(153.0);
        assert!(!overflow_flags(&ok, &ok, &ok, 512, &scoring).example);
        let over = block(154.0);
        assert!(overflow_flags(&over, &over, &over, 512, &scoring).example);
    }
}
