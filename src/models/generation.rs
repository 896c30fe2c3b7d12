use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output sizes accepted by the text2image backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CanvasSize {
    #[default]
    Square1024,
    Square1328,
    Landscape1664x928,
    Portrait928x1664,
    Landscape1472x1140,
    Portrait1140x1472,
    Landscape1280x720,
    Portrait720x1280,
}

impl CanvasSize {
    pub const ALL: [CanvasSize; 8] = [
        CanvasSize::Square1024,
        CanvasSize::Square1328,
        CanvasSize::Landscape1664x928,
        CanvasSize::Portrait928x1664,
        CanvasSize::Landscape1472x1140,
        CanvasSize::Portrait1140x1472,
        CanvasSize::Landscape1280x720,
        CanvasSize::Portrait720x1280,
    ];

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            CanvasSize::Square1024 => (1024, 1024),
            CanvasSize::Square1328 => (1328, 1328),
            CanvasSize::Landscape1664x928 => (1664, 928),
            CanvasSize::Portrait928x1664 => (928, 1664),
            CanvasSize::Landscape1472x1140 => (1472, 1140),
            CanvasSize::Portrait1140x1472 => (1140, 1472),
            CanvasSize::Landscape1280x720 => (1280, 720),
            CanvasSize::Portrait720x1280 => (720, 1280),
        }
    }

    pub fn from_dimensions(width: u32, height: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|size| size.dimensions() == (width, height))
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "{}*{}", w, h)
    }
}

impl FromStr for CanvasSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(|c: char| c == '*' || c == 'x' || c == 'X')
            .ok_or_else(|| format!("invalid size: {}", s))?;
        let w: u32 = w.trim().parse().map_err(|_| format!("invalid width: {}", s))?;
        let h: u32 = h.trim().parse().map_err(|_| format!("invalid height: {}", s))?;
        Self::from_dimensions(w, h).ok_or_else(|| format!("size not supported by backend: {}", s))
    }
}

impl Serialize for CanvasSize {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A text2image submission. Built once and never changed after submission.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    model: String,
    size: CanvasSize,
    samples: u32,
    negative_prompt: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            size: CanvasSize::default(),
            samples: 1,
            negative_prompt: None,
        }
    }

    pub fn with_size(mut self, size: CanvasSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples.max(1);
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: Option<String>) -> Self {
        self.negative_prompt = negative_prompt.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn negative_prompt(&self) -> Option<&str> {
        self.negative_prompt.as_deref()
    }

    /// Wire body for the create-task call.
    pub fn to_payload(&self) -> CreateTaskPayload<'_> {
        CreateTaskPayload {
            model: &self.model,
            input: CreateTaskInput {
                prompt: &self.prompt,
                negative_prompt: self.negative_prompt.as_deref(),
            },
            parameters: CreateTaskParameters {
                size: self.size,
                n: self.samples,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateTaskPayload<'a> {
    pub model: &'a str,
    pub input: CreateTaskInput<'a>,
    pub parameters: CreateTaskParameters,
}

#[derive(Debug, Serialize)]
pub struct CreateTaskInput<'a> {
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct CreateTaskParameters {
    pub size: CanvasSize,
    pub n: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Canceled
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Succeeded => "SUCCEEDED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Canceled => "CANCELED",
            TaskStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// One observation of a server-side task.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationTask {
    pub task_id: String,
    pub status: TaskStatus,
    /// `None` when the backend returned no results at all.
    pub results: Option<Vec<TaskResult>>,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl GenerationTask {
    pub fn new(task_id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            task_id: task_id.into(),
            status,
            results: None,
            code: None,
            message: None,
        }
    }

    pub fn with_result_url(mut self, url: impl Into<String>) -> Self {
        self.results
            .get_or_insert_with(Vec::new)
            .push(TaskResult { url: Some(url.into()) });
        self
    }

    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self.message = Some(message.into());
        self
    }

    /// URL of the first result, if the backend returned one.
    pub fn result_url(&self) -> Option<&str> {
        self.results
            .as_ref()
            .and_then(|r| r.first())
            .and_then(|r| r.url.as_deref())
            .filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub url: Option<String>,
}

/// Envelope shared by create-task and get-task responses.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskEnvelope {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub output: Option<TaskOutput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskOutput {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub task_status: Option<TaskStatus>,
    #[serde(default)]
    pub results: Option<Vec<TaskResult>>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
