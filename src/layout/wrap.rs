use crate::layout::font::CardFont;

/// Greedy, word-granular wrap. A word wider than `max_width` gets a line of its
/// own rather than being split.
pub fn wrap_text(text: &str, font: &dyn CardFont, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if font.text_width(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font::FixedMetricFont;

    fn normalized(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_lines_fit_and_reconstruct() {
        let font = FixedMetricFont::new(10.0);
        let texts = [
            "he buys milk every morning from the corner store after his jog",
            "  leading and   trailing\twhitespace\n  ",
            "a b c d e f g h i j k l m n o p",
            "one",
        ];
        for text in texts {
            for max_width in [60.0, 90.0, 150.0, 400.0] {
                let widest = text
                    .split_whitespace()
                    .map(|w| font.text_width(w))
                    .fold(0.0, f32::max);
                let lines = wrap_text(text, &font, max_width);
                assert!(lines.iter().all(|l| !l.is_empty()));
                assert_eq!(lines.join(" "), normalized(text));
                if max_width >= widest {
                    assert!(lines.iter().all(|l| font.text_width(l) <= max_width));
                }
            }
        }
    }

    #[test]
    fn test_long_word_sits_alone() {
        let font = FixedMetricFont::new(10.0);
        let lines = wrap_text("go antidisestablishmentarianism now", &font, 60.0);
        assert_eq!(lines, vec!["go", "antidisestablishmentarianism", "now"]);
    }

    #[test]
    fn test_empty_input() {
        let font = FixedMetricFont::new(10.0);
        assert!(wrap_text("", &font, 100.0).is_empty());
        assert!(wrap_text("   \n\t", &font, 100.0).is_empty());
    }

    #[test]
    fn test_wrap_is_pure() {
        let font = FixedMetricFont::new(14.0);
        let text = "take mainly by using money";
        assert_eq!(
            wrap_text(text, &font, 120.0),
            wrap_text(text, &font, 120.0)
        );
    }
}
