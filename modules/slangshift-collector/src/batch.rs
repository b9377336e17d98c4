//! Batch classification lifecycle: one job covers every collected record,
//! submitted as a JSONL file and polled until it reaches a terminal state.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use openai_client::{BatchStatus, OpenAiClient};
use slangshift_common::Record;
use tracing::{info, warn};

use crate::prompt;

const POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Name the request file is uploaded under.
const BATCH_INPUT_FILENAME: &str = "classification_requests.jsonl";

/// The classification job boundary. Production talks to the OpenAI Batch
/// API through it; tests drive the poller with scripted implementations.
#[async_trait]
pub trait ClassificationService: Send + Sync {
    /// Upload the JSONL request payload and start a job, returning its id.
    async fn submit(&self, jsonl: String) -> Result<String>;

    /// Current status of a job.
    async fn status(&self, job_id: &str) -> Result<BatchStatus>;

    /// Raw JSONL output of a finished job.
    async fn fetch_output(&self, job_id: &str) -> Result<String>;
}

#[async_trait]
impl ClassificationService for OpenAiClient {
    async fn submit(&self, jsonl: String) -> Result<String> {
        let file = self.upload_batch_file(BATCH_INPUT_FILENAME, jsonl).await?;
        let batch = self.create_batch(&file.id).await?;
        Ok(batch.id)
    }

    async fn status(&self, job_id: &str) -> Result<BatchStatus> {
        let batch = self.get_batch(job_id).await?;
        Ok(BatchStatus::parse(&batch.status))
    }

    async fn fetch_output(&self, job_id: &str) -> Result<String> {
        let batch = self.get_batch(job_id).await?;
        let output_file_id = batch
            .output_file_id
            .ok_or_else(|| anyhow!("Batch {} has no output file", batch.id))?;
        Ok(self.file_content(&output_file_id).await?)
    }
}

/// Build the request payload for every record and start one job.
pub async fn submit_records<S>(service: &S, records: &[Record]) -> Result<String>
where
    S: ClassificationService + ?Sized,
{
    let requests = prompt::build_batch_requests(records)?;
    let jsonl = prompt::to_jsonl(&requests)?;

    info!(records = records.len(), "Submitting classification batch");
    let job_id = service
        .submit(jsonl)
        .await
        .context("Batch submission failed")?;
    info!(job_id = %job_id, "Classification job started");
    Ok(job_id)
}

/// How often to poll a job, and how long to keep at it.
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub interval: Duration,
    /// Give up with `StillPending` once this much time has passed.
    /// `None` waits for a terminal state however long it takes.
    pub deadline: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            deadline: None,
        }
    }
}

/// What polling a job ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed,
    /// Terminal state that will never yield output.
    Failed(String),
    /// The deadline passed while the job was still running.
    StillPending,
}

/// Poll until the job completes or fails. Statuses the client has never
/// seen are treated as transient: log and keep waiting rather than give up
/// on a job that may still finish.
pub async fn wait_for_completion<S>(
    service: &S,
    job_id: &str,
    options: &PollOptions,
) -> Result<BatchOutcome>
where
    S: ClassificationService + ?Sized,
{
    let started = Instant::now();

    loop {
        match service.status(job_id).await? {
            BatchStatus::Completed => {
                info!(job_id, "Classification job completed");
                return Ok(BatchOutcome::Completed);
            }
            status if status.is_failure() => {
                warn!(job_id, status = %status, "Classification job terminated without output");
                return Ok(BatchOutcome::Failed(status.as_str().to_string()));
            }
            BatchStatus::Other(status) => {
                warn!(job_id, status = %status, "Unrecognized job status, still waiting");
            }
            status => {
                info!(
                    job_id,
                    status = %status,
                    next_check_secs = options.interval.as_secs(),
                    "Job in progress"
                );
            }
        }

        if let Some(deadline) = options.deadline {
            if started.elapsed() >= deadline {
                info!(job_id, "Deadline reached with the job still pending");
                return Ok(BatchOutcome::StillPending);
            }
        }
        tokio::time::sleep(options.interval).await;
    }
}
