use crate::{
    error::Result,
    models::{GenerationRequest, GenerationTask},
};
use async_trait::async_trait;

/// The two task calls of an async image-synthesis service, plus the result download.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Submits the request and returns the server-side task id.
    async fn create_task(&self, request: &GenerationRequest) -> Result<String>;

    async fn get_task(&self, task_id: &str) -> Result<GenerationTask>;

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}
