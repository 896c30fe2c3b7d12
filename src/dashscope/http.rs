use crate::{
    config::DashScopeConfig,
    dashscope::backend::TaskBackend,
    error::{CardError, Result},
    models::{GenerationRequest, GenerationTask, TaskEnvelope, TaskStatus},
};
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use std::time::Duration;

const T2I_PATH: &str = "services/aigc/text2image/image-synthesis";
const TASK_PATH: &str = "tasks";
const ASYNC_HEADER: &str = "X-DashScope-Async";

pub struct DashScopeBackend {
    client: Client,
    base_url: String,
    api_key: String,
    submit_timeout: Duration,
    status_timeout: Duration,
}

impl DashScopeBackend {
    pub fn new(config: &DashScopeConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CardError::Config("DashScope API key is required".into()))?;

        Ok(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            submit_timeout: config.submit_timeout,
            status_timeout: config.status_timeout,
        })
    }

    fn build_headers(&self, async_required: bool) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key)
            .parse()
            .map_err(|_| CardError::Config("API key is not a valid header value".into()))?;
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if async_required {
            headers.insert(ASYNC_HEADER, header::HeaderValue::from_static("enable"));
        }
        Ok(headers)
    }

    /// HTTP-level failures surface before any task-level interpretation.
    async fn check_status(response: Response, call: &str) -> Result<Response> {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            log::error!("DashScope {} error {}: {}", call, status.as_u16(), body);
            return Err(CardError::Transport {
                status: Some(status.as_u16()),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_envelope(response: Response) -> Result<TaskEnvelope> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| CardError::MalformedResponse(format!("{}: {}", e, text)))
    }
}

#[async_trait]
impl TaskBackend for DashScopeBackend {
    async fn create_task(&self, request: &GenerationRequest) -> Result<String> {
        let url = format!("{}/{}", self.base_url, T2I_PATH);
        log::info!(
            "Submitting text2image task: model={}, size={}",
            request.model(),
            request.size()
        );
        log::debug!("Prompt: {}", request.prompt());

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers(true)?)
            .timeout(self.submit_timeout)
            .json(&request.to_payload())
            .send()
            .await?;
        let response = Self::check_status(response, "create-task").await?;
        let envelope = Self::parse_envelope(response).await?;

        envelope
            .output
            .and_then(|o| o.task_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                CardError::MalformedResponse(format!(
                    "create-task response missing task_id (request_id: {})",
                    envelope.request_id.as_deref().unwrap_or("unknown")
                ))
            })
    }

    async fn get_task(&self, task_id: &str) -> Result<GenerationTask> {
        let url = format!("{}/{}/{}", self.base_url, TASK_PATH, task_id);
        let response = self
            .client
            .get(&url)
            .headers(self.build_headers(false)?)
            .timeout(self.status_timeout)
            .send()
            .await?;
        let response = Self::check_status(response, "get-task").await?;
        let envelope = Self::parse_envelope(response).await?;
        let output = envelope.output.unwrap_or_default();

        Ok(GenerationTask {
            task_id: output.task_id.unwrap_or_else(|| task_id.to_string()),
            status: output.task_status.unwrap_or(TaskStatus::Unknown),
            results: output.results.filter(|r| !r.is_empty()),
            code: output.code,
            message: output.message,
        })
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(self.submit_timeout)
            .send()
            .await?;
        let response = Self::check_status(response, "image download").await?;
        Ok(response.bytes().await?.to_vec())
    }
}
