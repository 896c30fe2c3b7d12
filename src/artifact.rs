use crate::{
    error::Result,
    models::{CardArtifact, CardInput},
};
use image::{codecs::jpeg::JpegEncoder, DynamicImage, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

pub const JPEG_QUALITY: u8 = 95;
pub const META_DIR: &str = ".meta";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCard {
    pub image_path: PathBuf,
    pub metadata_path: PathBuf,
}

pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(&rgb)?;
    Ok(bytes)
}

impl CardArtifact {
    /// Writes `{outdir}/{stem}.jpg` and `{outdir}/.meta/{stem}.json`, replacing
    /// any earlier render of the same card.
    pub fn save(&self, input: &CardInput, outdir: impl AsRef<Path>) -> Result<SavedCard> {
        let outdir = outdir.as_ref();
        let stem = input.artifact_stem();
        let meta_dir = outdir.join(META_DIR);
        fs::create_dir_all(&meta_dir)?;

        let image_path = outdir.join(format!("{}.jpg", stem));
        fs::write(&image_path, encode_jpeg(&self.image, JPEG_QUALITY)?)?;

        let metadata_path = meta_dir.join(format!("{}.json", stem));
        let json = serde_json::to_string_pretty(&self.metadata(input))?;
        fs::write(&metadata_path, json)?;

        log::info!(
            "Saved card {} (score {}, {})",
            image_path.display(),
            self.score,
            self.status
        );
        Ok(SavedCard {
            image_path,
            metadata_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, ScoringConfig};
    use crate::layout::{FixedMetricFontProvider, LayoutEngine};
    use image::Rgba;
    use std::sync::Arc;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vocabcard-{}-{}", name, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_save_writes_image_and_metadata() {
        let engine = LayoutEngine::new(
            LayoutConfig::default(),
            ScoringConfig::default(),
            Arc::new(FixedMetricFontProvider),
        );
        let input = CardInput::new("buy", 1, "Pay Money", "take by paying", "日本語の例文 buy now")
            .with_canvas(256, 256);
        let bg = RgbaImage::from_pixel(32, 32, Rgba([10, 120, 40, 255]));
        let card = engine.compose(&bg, &input.word, &input.meaning, &input.example, 256, 256);

        let dir = temp_dir("save");
        let saved = card.save(&input, &dir).unwrap();
        assert_eq!(saved.image_path, dir.join("1_pay-money.jpg"));
        assert_eq!(saved.metadata_path, dir.join(".meta").join("1_pay-money.json"));

        let decoded = image::open(&saved.image_path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (256, 256));

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&saved.metadata_path).unwrap()).unwrap();
        assert_eq!(meta["index"], 1);
        assert_eq!(meta["concept"], "pay-money");
        assert_eq!(meta["example"], "日本語の例文 buy now");
        assert_eq!(meta["score"], card.score);
        assert_eq!(meta["status"], card.status.label());

        // re-rendering overwrites in place
        card.save(&input, &dir).unwrap();
        assert_eq!(fs::read_dir(dir.join(".meta")).unwrap().count(), 1);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_jpeg_is_valid() {
        let img = RgbaImage::from_pixel(16, 8, Rgba([255, 0, 0, 255]));
        let bytes = encode_jpeg(&img, JPEG_QUALITY).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
