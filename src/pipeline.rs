use crate::{
    config::CardConfig,
    dashscope::{DashScopeClient, TaskBackend},
    error::Result,
    layout::{FontProvider, LayoutEngine},
    logger::Timer,
    models::{CardArtifact, CardInput},
};
use std::sync::Arc;

/// Background prompt built from the example sentence.
pub fn background_prompt(example: &str) -> String {
    format!(
        "Cinematic illustration that reflects the interaction between subject and object in the sentence. \
         No text. Balanced lighting. Detailed, realistic background. Sentence: '{}'",
        example.trim()
    )
}

/// Acquires a background and composes one card on it.
#[derive(Clone)]
pub struct CardRenderer {
    client: DashScopeClient,
    engine: LayoutEngine,
}

impl CardRenderer {
    pub fn new(config: CardConfig) -> Result<Self> {
        let client = DashScopeClient::new(config.dashscope)?;
        let engine = LayoutEngine::with_system_fonts(config.layout, config.scoring);
        Ok(Self { client, engine })
    }

    pub fn with_parts(
        config: CardConfig,
        backend: Arc<dyn TaskBackend>,
        fonts: Arc<dyn FontProvider>,
    ) -> Self {
        Self {
            client: DashScopeClient::with_backend(config.dashscope, backend),
            engine: LayoutEngine::new(config.layout, config.scoring, fonts),
        }
    }

    pub fn client(&self) -> &DashScopeClient {
        &self.client
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    pub async fn render(&self, input: &CardInput) -> Result<CardArtifact> {
        let _timer = Timer::new(&format!("card {}", input.artifact_stem()));
        log::info!("Rendering card #{} for '{}'", input.index, input.word);

        let background = self
            .client
            .generate_background(background_prompt(&input.example))
            .await?;

        Ok(self.engine.compose(
            &background,
            &input.word,
            &input.meaning,
            &input.example,
            input.width,
            input.height,
        ))
    }
}
