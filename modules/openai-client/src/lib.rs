pub mod error;
pub mod retry;
pub mod types;

pub use error::{OpenAiError, Result};
pub use retry::RetryPolicy;
pub use types::{
    parse_output_jsonl, BatchData, BatchOutputLine, BatchRequestItem, BatchStatus, ChatMessage,
    ChatRequest, ChatResponse, FileObject,
};

const BASE_URL: &str = "https://api.openai.com/v1";

/// Completion window accepted by the Batch API.
const COMPLETION_WINDOW: &str = "24h";

pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Upload a JSONL request file for batch processing.
    pub async fn upload_batch_file(&self, filename: &str, jsonl: String) -> Result<FileObject> {
        tracing::info!(filename, bytes = jsonl.len(), "Uploading batch input file");

        let part = reqwest::multipart::Part::text(jsonl)
            .file_name(filename.to_string())
            .mime_str("application/jsonl")?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", "batch")
            .part("file", part);

        let url = format!("{}/files", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let file: FileObject = resp.json().await?;
        Ok(file)
    }

    /// Create a batch over an uploaded request file. Returns immediately
    /// with the job in its initial state.
    pub async fn create_batch(&self, input_file_id: &str) -> Result<BatchData> {
        let body = serde_json::json!({
            "input_file_id": input_file_id,
            "endpoint": "/v1/chat/completions",
            "completion_window": COMPLETION_WINDOW,
        });

        let url = format!("{}/batches", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let batch: BatchData = resp.json().await?;
        tracing::info!(batch_id = %batch.id, status = %batch.status, "Batch created");
        Ok(batch)
    }

    /// Fetch the current state of a batch.
    pub async fn get_batch(&self, batch_id: &str) -> Result<BatchData> {
        let url = format!("{}/batches/{}", self.base_url, batch_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let batch: BatchData = resp.json().await?;
        Ok(batch)
    }

    /// Download the raw content of a file (batch output is JSONL text).
    pub async fn file_content(&self, file_id: &str) -> Result<String> {
        let url = format!("{}/files/{}/content", self.base_url, file_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.text().await?)
    }

    /// Single synchronous chat completion.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        tracing::debug!(model = %request.model, "Chat completion request");

        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let response: ChatResponse = resp.json().await?;
        Ok(response)
    }
}
