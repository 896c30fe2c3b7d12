use crate::models::CanvasSize;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dashscope-intl.aliyuncs.com/api/v1";
pub const DEFAULT_MODEL: &str = "qwen-image-plus";

#[derive(Debug, Clone)]
pub struct DashScopeConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub size: CanvasSize,
    pub samples: u32,
    pub negative_prompt: Option<String>,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub submit_timeout: Duration,
    pub status_timeout: Duration,
}

impl Default for DashScopeConfig {
    fn default() -> Self {
        DashScopeConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            size: CanvasSize::default(),
            samples: 1,
            negative_prompt: None,
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(180),
            submit_timeout: Duration::from_secs(120),
            status_timeout: Duration::from_secs(60),
        }
    }
}

impl DashScopeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secs = |key: &str, fallback: Duration| {
            env::var(key)
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|s| *s > 0.0)
                .map(Duration::from_secs_f64)
                .unwrap_or(fallback)
        };

        DashScopeConfig {
            api_key: env::var("DASHSCOPE_API_KEY").ok(),
            base_url: env::var("DASHSCOPE_BASE_URL").unwrap_or(defaults.base_url),
            model: env::var("DASHSCOPE_MODEL").unwrap_or(defaults.model),
            size: env::var("DASHSCOPE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.size),
            samples: defaults.samples,
            negative_prompt: env::var("DASHSCOPE_NEGATIVE_PROMPT")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            poll_interval: secs("DASHSCOPE_POLL_INTERVAL_SECS", defaults.poll_interval),
            timeout: secs("DASHSCOPE_TIMEOUT_SECS", defaults.timeout),
            submit_timeout: defaults.submit_timeout,
            status_timeout: defaults.status_timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_size(mut self, size: CanvasSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_polling(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.timeout = timeout;
        self
    }
}

/// Font sizes and geometry used by the fitting loop and the compositor.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub headword_size: f32,
    pub meaning_size: f32,
    pub example_size: f32,
    pub headword_min_size: f32,
    pub meaning_min_size: f32,
    pub example_min_size: f32,
    /// Fraction of canvas width a wrapped line may occupy.
    pub wrap_width_ratio: f32,
    /// Fraction of canvas height the blocks plus margin budget must fit in.
    pub fit_height_ratio: f32,
    pub line_gap: f32,
    pub margin_budget: f32,
    pub shrink_factor: f32,
    pub max_attempts: usize,
    pub headword_anchor: f32,
    pub example_anchor: f32,
    pub band_padding: u32,
    pub band_alpha: u8,
    pub shadow_offset: i32,
    pub contrast: f32,
    pub saturation: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            headword_size: 64.0,
            meaning_size: 34.0,
            example_size: 30.0,
            headword_min_size: 28.0,
            meaning_min_size: 18.0,
            example_min_size: 16.0,
            wrap_width_ratio: 0.88,
            fit_height_ratio: 0.90,
            line_gap: 6.0,
            margin_budget: 200.0,
            shrink_factor: 0.9,
            max_attempts: 8,
            headword_anchor: 0.12,
            example_anchor: 0.72,
            band_padding: 12,
            band_alpha: 140,
            shadow_offset: 2,
            contrast: 1.10,
            saturation: 1.05,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_sizes(mut self, headword: f32, meaning: f32, example: f32) -> Self {
        self.headword_size = headword;
        self.meaning_size = meaning;
        self.example_size = example;
        self
    }

    pub fn with_min_sizes(mut self, headword: f32, meaning: f32, example: f32) -> Self {
        self.headword_min_size = headword;
        self.meaning_min_size = meaning;
        self.example_min_size = example;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

/// Legibility score constants. These are empirical and kept tunable.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Residual margin (as a fraction of canvas height) that earns full marks.
    pub full_margin_ratio: f32,
    pub overflow_penalty: i32,
    pub headword_overflow_ratio: Option<f32>,
    pub meaning_overflow_ratio: Option<f32>,
    pub example_overflow_ratio: Option<f32>,
    pub good_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            full_margin_ratio: 0.10,
            overflow_penalty: 10,
            headword_overflow_ratio: None,
            meaning_overflow_ratio: None,
            example_overflow_ratio: Some(0.30),
            good_threshold: 80,
        }
    }
}

impl ScoringConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_good_threshold(mut self, threshold: u8) -> Self {
        self.good_threshold = threshold.min(100);
        self
    }

    pub fn with_overflow_penalty(mut self, penalty: i32) -> Self {
        self.overflow_penalty = penalty;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardConfig {
    pub dashscope: DashScopeConfig,
    pub layout: LayoutConfig,
    pub scoring: ScoringConfig,
}

impl CardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        CardConfig {
            dashscope: DashScopeConfig::from_env(),
            layout: LayoutConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }

    pub fn with_dashscope(mut self, config: DashScopeConfig) -> Self {
        self.dashscope = config;
        self
    }

    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    pub fn with_scoring(mut self, config: ScoringConfig) -> Self {
        self.scoring = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_card_layout() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.max_attempts, 8);
        assert_eq!(layout.band_alpha, 140);
        assert!((layout.wrap_width_ratio - 0.88).abs() < f32::EPSILON);

        let scoring = ScoringConfig::default();
        assert_eq!(scoring.example_overflow_ratio, Some(0.30));
        assert!(scoring.headword_overflow_ratio.is_none());
        assert_eq!(scoring.good_threshold, 80);
    }

    #[test]
    fn test_dashscope_builder() {
        let config = DashScopeConfig::new()
            .with_api_key("sk-test")
            .with_model("wan2.2-t2i-flash")
            .with_size(CanvasSize::Landscape1664x928)
            .with_polling(Duration::from_millis(10), Duration::from_secs(1));

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "wan2.2-t2i-flash");
        assert_eq!(config.size.to_string(), "1664*928");
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_max_attempts_never_zero() {
        assert_eq!(LayoutConfig::new().with_max_attempts(0).max_attempts, 1);
    }
}
