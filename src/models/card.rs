use crate::models::LayoutResult;
use image::RgbaImage;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct CardInput {
    pub word: String,
    pub index: u32,
    pub concept: String,
    pub meaning: String,
    pub example: String,
    pub width: u32,
    pub height: u32,
}

impl CardInput {
    pub fn new(
        word: impl Into<String>,
        index: u32,
        concept: impl Into<String>,
        meaning: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            index,
            concept: concept.into(),
            meaning: meaning.into(),
            example: example.into(),
            width: 512,
            height: 512,
        }
    }

    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// File stem shared by the image and its metadata record.
    pub fn artifact_stem(&self) -> String {
        format!("{}_{}", self.index, slug(&self.concept))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStatus {
    Good,
    Overflow,
}

impl CardStatus {
    pub fn from_score(score: u8, threshold: u8) -> Self {
        if score >= threshold {
            CardStatus::Good
        } else {
            CardStatus::Overflow
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardStatus::Good => "✅ good",
            CardStatus::Overflow => "⚠️ overflow",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for CardStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A composited card and how legible it came out.
#[derive(Debug, Clone)]
pub struct CardArtifact {
    pub image: RgbaImage,
    pub score: u8,
    pub status: CardStatus,
    pub layout: LayoutResult,
}

impl CardArtifact {
    pub fn metadata(&self, input: &CardInput) -> CardMetadata {
        CardMetadata {
            index: input.index,
            concept: slug(&input.concept),
            meaning: input.meaning.clone(),
            example: input.example.clone(),
            score: self.score,
            status: self.status,
        }
    }
}

/// Sidecar record consumed by the legibility report.
#[derive(Debug, Clone, Serialize)]
pub struct CardMetadata {
    pub index: u32,
    pub concept: String,
    pub meaning: String,
    pub example: String,
    pub score: u8,
    pub status: CardStatus,
}

/// Filesystem-safe concept identifier.
pub fn slug(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    let dashed = lowered.split_whitespace().collect::<Vec<_>>().join("-");
    let cleaned: String = dashed
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "concept".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("  Pay For  Goods "), "pay-for-goods");
        assert_eq!(slug("buy/purchase!"), "buypurchase");
        assert_eq!(slug("snake_case ok"), "snake_case-ok");
        assert_eq!(slug("買う"), "concept");
        assert_eq!(slug(""), "concept");
    }

    #[test]
    fn test_status_threshold() {
        assert_eq!(CardStatus::from_score(80, 80), CardStatus::Good);
        assert_eq!(CardStatus::from_score(79, 80), CardStatus::Overflow);
        assert_eq!(CardStatus::Good.to_string(), "✅ good");
    }

    #[test]
    fn test_metadata_shape() {
        let meta = CardMetadata {
            index: 3,
            concept: "purchase".into(),
            meaning: "take by paying".into(),
            example: "he buys milk".into(),
            score: 90,
            status: CardStatus::Good,
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["index"], 3);
        assert_eq!(value["concept"], "purchase");
        assert_eq!(value["score"], 90);
        assert_eq!(value["status"], "✅ good");
    }

    #[test]
    fn test_artifact_stem() {
        let input = CardInput::new("buy", 2, "Money Exchange", "m", "e");
        assert_eq!(input.artifact_stem(), "2_money-exchange");
    }
}
