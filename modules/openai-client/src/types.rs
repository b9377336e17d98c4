use serde::{Deserialize, Serialize};

// --- Chat completions ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: String) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

impl ChatResponse {
    /// Content of the first choice, if any.
    pub fn content(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.message.content)
    }
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// --- Files API ---

#[derive(Debug, Deserialize)]
pub struct FileObject {
    pub id: String,
    pub filename: String,
    pub purpose: String,
}

// --- Batch API ---

#[derive(Debug, Clone, Deserialize)]
pub struct BatchData {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub output_file_id: Option<String>,
}

/// Batch lifecycle states, parsed from the wire's status string. Anything
/// the parser does not recognize lands in `Other` so callers can decide how
/// to treat new states instead of failing on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    Validating,
    InProgress,
    Finalizing,
    Completed,
    Failed,
    Expired,
    Cancelling,
    Cancelled,
    Other(String),
}

impl BatchStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "validating" => BatchStatus::Validating,
            "in_progress" => BatchStatus::InProgress,
            "finalizing" => BatchStatus::Finalizing,
            "completed" => BatchStatus::Completed,
            "failed" => BatchStatus::Failed,
            "expired" => BatchStatus::Expired,
            "cancelling" | "canceling" => BatchStatus::Cancelling,
            "cancelled" => BatchStatus::Cancelled,
            other => BatchStatus::Other(other.to_string()),
        }
    }

    /// Terminal states that will never produce usable output.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            BatchStatus::Failed
                | BatchStatus::Expired
                | BatchStatus::Cancelling
                | BatchStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            BatchStatus::Validating => "validating",
            BatchStatus::InProgress => "in_progress",
            BatchStatus::Finalizing => "finalizing",
            BatchStatus::Completed => "completed",
            BatchStatus::Failed => "failed",
            BatchStatus::Expired => "expired",
            BatchStatus::Cancelling => "cancelling",
            BatchStatus::Cancelled => "cancelled",
            BatchStatus::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request line of a batch input file.
#[derive(Debug, Serialize)]
pub struct BatchRequestItem {
    pub custom_id: String,
    pub method: String,
    pub url: String,
    pub body: ChatRequest,
}

impl BatchRequestItem {
    /// A chat-completion request line addressed by `custom_id`.
    pub fn chat(custom_id: String, body: ChatRequest) -> Self {
        Self {
            custom_id,
            method: "POST".to_string(),
            url: "/v1/chat/completions".to_string(),
            body,
        }
    }
}

/// One line of a batch output file.
#[derive(Debug, Deserialize)]
pub struct BatchOutputLine {
    pub custom_id: String,
    #[serde(default)]
    pub response: Option<BatchItemResponse>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct BatchItemResponse {
    pub status_code: u16,
    #[serde(default)]
    pub body: Option<ChatResponse>,
}

/// Parse a batch output file. Malformed lines are logged and dropped; they
/// carry no usable correlation token.
pub fn parse_output_jsonl(content: &str) -> Vec<BatchOutputLine> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<BatchOutputLine>(line) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(error = %err, "Skipping unparseable batch output line");
                None
            }
        })
        .collect()
}
