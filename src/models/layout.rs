use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSlant {
    Upright,
    Italic,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: String,
    pub weight: FontWeight,
    pub slant: FontSlant,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, weight: FontWeight, slant: FontSlant) -> Self {
        Self {
            family: family.into(),
            weight,
            slant,
        }
    }

    pub fn sans(weight: FontWeight, slant: FontSlant) -> Self {
        Self::new("sans", weight, slant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Center,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Headword,
    Meaning,
    Example,
}

/// A wrapped run of text at one font size. Each fitting attempt builds new blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub source: String,
    pub font: FontDescriptor,
    pub size_pt: f32,
    pub lines: Vec<String>,
    pub line_height: f32,
    /// Occupied height: every line contributes its line height plus the inter-line gap.
    pub height: f32,
    pub alignment: Alignment,
}

impl TextBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitAttempt {
    pub scale: f32,
    pub total_height: f32,
    pub fits: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FitOutcome {
    Accepted,
    /// Every attempt overflowed; the smallest one was kept.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BlockOverflow {
    pub headword: bool,
    pub meaning: bool,
    pub example: bool,
}

impl BlockOverflow {
    pub fn count(&self) -> usize {
        [self.headword, self.meaning, self.example]
            .iter()
            .filter(|flag| **flag)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub scale: f32,
    pub headword: TextBlock,
    pub meaning: TextBlock,
    pub example: TextBlock,
    /// Sum of block heights plus the layout margin budget.
    pub total_height: f32,
    pub overflow: BlockOverflow,
    pub attempts: Vec<FitAttempt>,
    pub outcome: FitOutcome,
}

impl LayoutResult {
    pub fn blocks(&self) -> [&TextBlock; 3] {
        [&self.headword, &self.meaning, &self.example]
    }

    pub fn block_heights(&self) -> f32 {
        self.blocks().iter().map(|b| b.height).sum()
    }
}
