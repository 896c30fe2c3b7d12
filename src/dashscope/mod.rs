pub mod backend;
pub mod http;
pub mod image_client;

use crate::{config::DashScopeConfig, error::Result, models::GenerationRequest};
use image::RgbaImage;
use std::sync::Arc;

pub use backend::TaskBackend;
pub use http::DashScopeBackend;
pub use image_client::ImageClient;

/// Image client plus the request defaults it was configured with.
#[derive(Clone)]
pub struct DashScopeClient {
    image_client: ImageClient,
    config: DashScopeConfig,
}

impl DashScopeClient {
    pub fn new(config: DashScopeConfig) -> Result<Self> {
        let backend = DashScopeBackend::new(&config)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    pub fn with_backend(config: DashScopeConfig, backend: Arc<dyn TaskBackend>) -> Self {
        Self {
            image_client: ImageClient::new(backend),
            config,
        }
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn config(&self) -> &DashScopeConfig {
        &self.config
    }

    /// A request for `prompt` using the configured model, size and negative prompt.
    pub fn request(&self, prompt: impl Into<String>) -> GenerationRequest {
        GenerationRequest::new(prompt, self.config.model.clone())
            .with_size(self.config.size)
            .with_samples(self.config.samples)
            .with_negative_prompt(self.config.negative_prompt.clone())
    }

    pub async fn generate_background(&self, prompt: impl Into<String>) -> Result<RgbaImage> {
        let request = self.request(prompt);
        self.image_client
            .acquire(&request, self.config.poll_interval, self.config.timeout)
            .await
    }
}
