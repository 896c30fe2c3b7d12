use crate::{
    dashscope::backend::TaskBackend,
    error::{CardError, Result},
    models::{GenerationRequest, GenerationTask, TaskStatus},
};
use image::RgbaImage;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone)]
pub struct ImageClient {
    backend: Arc<dyn TaskBackend>,
}

impl ImageClient {
    pub fn new(backend: Arc<dyn TaskBackend>) -> Self {
        Self { backend }
    }

    /// Submits `request`, polls at a fixed interval until the task is terminal or
    /// `timeout` elapses, then downloads and decodes the first result as RGBA.
    ///
    /// Timing out only stops local waiting; the server-side task keeps running.
    pub async fn acquire(
        &self,
        request: &GenerationRequest,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<RgbaImage> {
        let task_id = self.backend.create_task(request).await?;
        log::info!("DashScope task created: {}", task_id);

        let url = self.wait_for_result(&task_id, poll_interval, timeout).await?;
        log::debug!("Downloading result for task {}: {}", task_id, url);

        let bytes = self.backend.fetch_image(&url).await?;
        let image = image::load_from_memory(&bytes)?.to_rgba8();
        log::info!(
            "Background decoded: {}x{} ({} bytes)",
            image.width(),
            image.height(),
            bytes.len()
        );
        Ok(image)
    }

    async fn wait_for_result(
        &self,
        task_id: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<String> {
        let deadline = Instant::now() + timeout;
        let mut last_status: Option<TaskStatus> = None;

        while Instant::now() < deadline {
            // A status call still in flight at the deadline is abandoned.
            let task = match tokio::time::timeout_at(deadline, self.backend.get_task(task_id)).await
            {
                Ok(task) => task?,
                Err(_) => break,
            };
            if status_changed(&mut last_status, task.status) {
                log::info!("[DashScope] task {} status: {}", task_id, task.status);
            }

            if let Some(url) = Self::terminal_result(&task)? {
                return Ok(url);
            }
            tokio::time::sleep_until((Instant::now() + poll_interval).min(deadline)).await;
        }

        log::warn!(
            "Gave up on task {} after {:.1}s (last status: {})",
            task_id,
            timeout.as_secs_f64(),
            last_status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "never polled".into())
        );
        Err(CardError::GenerationTimeout {
            task_id: task_id.to_string(),
        })
    }

    /// `Ok(None)` while the task is still in flight.
    fn terminal_result(task: &GenerationTask) -> Result<Option<String>> {
        match task.status {
            TaskStatus::Succeeded => {
                if task.results.as_ref().map_or(true, |r| r.is_empty()) {
                    return Err(CardError::MalformedResponse(format!(
                        "task {} SUCCEEDED but returned no results",
                        task.task_id
                    )));
                }
                task.result_url().map(|u| Some(u.to_string())).ok_or_else(|| {
                    CardError::MalformedResponse(format!(
                        "task {} result is missing a url",
                        task.task_id
                    ))
                })
            }
            TaskStatus::Failed | TaskStatus::Canceled => {
                log::error!(
                    "DashScope task {} {}: {:?} {:?}",
                    task.task_id,
                    task.status,
                    task.code,
                    task.message
                );
                Err(CardError::GenerationFailed {
                    code: task.code.clone(),
                    message: task.message.clone(),
                })
            }
            TaskStatus::Pending | TaskStatus::Running | TaskStatus::Unknown => Ok(None),
        }
    }
}

/// Records `status` and reports whether it differs from the previous observation.
fn status_changed(last: &mut Option<TaskStatus>, status: TaskStatus) -> bool {
    if *last == Some(status) {
        return false;
    }
    *last = Some(status);
    true
}
