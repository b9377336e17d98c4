//! Integration tests for the classification pipeline: batch submission,
//! the completion poller, and correlation back onto session records.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tempfile::TempDir;
use uuid::Uuid;

use openai_client::BatchStatus;
use slangshift_collector::batch::{
    self, BatchOutcome, ClassificationService, PollOptions,
};
use slangshift_collector::correlate;
use slangshift_collector::session::Session;
use slangshift_common::{Classification, Platform, Record};

// ---------------------------------------------------------------------------
// Scripted service
// ---------------------------------------------------------------------------

struct ScriptedService {
    submitted: Mutex<Vec<String>>,
    statuses: Mutex<VecDeque<BatchStatus>>,
    /// Served once the scripted statuses run out.
    fallback: BatchStatus,
    output: String,
    polls: AtomicUsize,
}

impl ScriptedService {
    fn with_statuses(statuses: Vec<BatchStatus>, fallback: BatchStatus) -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            statuses: Mutex::new(statuses.into()),
            fallback,
            output: String::new(),
            polls: AtomicUsize::new(0),
        }
    }

    fn with_output(output: String) -> Self {
        let mut service = Self::with_statuses(vec![], BatchStatus::Completed);
        service.output = output;
        service
    }

    fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassificationService for ScriptedService {
    async fn submit(&self, jsonl: String) -> Result<String> {
        self.submitted.lock().unwrap().push(jsonl);
        Ok("job-1".to_string())
    }

    async fn status(&self, _job_id: &str) -> Result<BatchStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }

    async fn fetch_output(&self, _job_id: &str) -> Result<String> {
        Ok(self.output.clone())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn record(keyword: &str, platform: Platform) -> Record {
    Record {
        correlation_id: Uuid::new_v4(),
        native_id: Uuid::new_v4().to_string(),
        text: format!("people keep saying {keyword} around here"),
        url: "https://example.com/post".to_string(),
        created_at: None,
        username: "tester".to_string(),
        subreddit: None,
        platform,
        keyword: keyword.to_string(),
        classification: Classification::Unclassified,
    }
}

fn reply_line(id: Uuid, content: &str) -> String {
    format!(
        r#"{{"custom_id":"{id}","response":{{"status_code":200,"body":{{"choices":[{{"message":{{"content":"{content}"}}}}]}}}}}}"#
    )
}

fn failed_line(id: Uuid) -> String {
    format!(r#"{{"custom_id":"{id}","response":{{"status_code":500,"body":null}}}}"#)
}

fn fast_poll() -> PollOptions {
    PollOptions {
        interval: Duration::from_millis(1),
        deadline: None,
    }
}

// ---------------------------------------------------------------------------
// Poller state machine
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poller_waits_through_progress_states_until_completed() {
    let service = ScriptedService::with_statuses(
        vec![
            BatchStatus::Validating,
            BatchStatus::InProgress,
            BatchStatus::Finalizing,
            BatchStatus::Completed,
        ],
        BatchStatus::Completed,
    );

    let outcome = batch::wait_for_completion(&service, "job-1", &fast_poll())
        .await
        .unwrap();

    assert_eq!(outcome, BatchOutcome::Completed);
    assert_eq!(service.poll_count(), 4);
}

#[tokio::test]
async fn poller_treats_unknown_statuses_as_transient() {
    let service = ScriptedService::with_statuses(
        vec![
            BatchStatus::parse("warming_up"),
            BatchStatus::InProgress,
            BatchStatus::Completed,
        ],
        BatchStatus::Completed,
    );

    let outcome = batch::wait_for_completion(&service, "job-1", &fast_poll())
        .await
        .unwrap();

    assert_eq!(outcome, BatchOutcome::Completed);
    assert_eq!(service.poll_count(), 3);
}

#[tokio::test]
async fn poller_reports_terminal_failures() {
    let service = ScriptedService::with_statuses(
        vec![BatchStatus::InProgress, BatchStatus::Expired],
        BatchStatus::Expired,
    );

    let outcome = batch::wait_for_completion(&service, "job-1", &fast_poll())
        .await
        .unwrap();

    assert_eq!(outcome, BatchOutcome::Failed("expired".to_string()));
}

#[tokio::test]
async fn poller_deadline_ends_with_still_pending() {
    let service =
        ScriptedService::with_statuses(vec![BatchStatus::InProgress], BatchStatus::InProgress);

    let options = PollOptions {
        interval: Duration::from_millis(1),
        deadline: Some(Duration::ZERO),
    };
    let outcome = batch::wait_for_completion(&service, "job-1", &options)
        .await
        .unwrap();

    assert_eq!(outcome, BatchOutcome::StillPending);
    assert_eq!(service.poll_count(), 1);
}

// ---------------------------------------------------------------------------
// Submission payload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submission_covers_every_record_exactly_once() {
    let records = vec![
        record("slay", Platform::Reddit),
        record("lit", Platform::Twitter),
        record("karen", Platform::Reddit),
    ];
    let service = ScriptedService::with_output(String::new());

    let job_id = batch::submit_records(&service, &records).await.unwrap();
    assert_eq!(job_id, "job-1");

    let submitted = service.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);

    let lines: Vec<serde_json::Value> = submitted[0]
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), records.len());

    let expected: HashSet<String> = records
        .iter()
        .map(|r| r.correlation_id.to_string())
        .collect();
    let actual: HashSet<String> = lines
        .iter()
        .map(|line| line["custom_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(actual, expected);

    for line in &lines {
        assert_eq!(line["url"], "/v1/chat/completions");
        assert_eq!(line["body"]["max_tokens"], 1);
        let prompt = line["body"]["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.starts_with("Classify usage of"));
        assert!(prompt.ends_with("Respond with ONLY one word:"));
    }
}

// ---------------------------------------------------------------------------
// End-to-end correlation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completed_job_produces_classified_files_and_summary() {
    let dir = TempDir::new().unwrap();
    let session = Session::create(dir.path()).unwrap();

    let slay = vec![record("slay", Platform::Reddit), record("slay", Platform::Reddit)];
    let lit = vec![record("lit", Platform::Twitter)];
    session.write_raw("slay", Platform::Reddit, &slay).unwrap();
    session.write_raw("lit", Platform::Twitter, &lit).unwrap();

    // First record answered, second failed inside the batch, third never
    // came back at all.
    let output = format!(
        "{}\n{}\n",
        reply_line(slay[0].correlation_id, "old"),
        failed_line(slay[1].correlation_id),
    );
    let service = ScriptedService::with_output(output);

    let stats = correlate::correlate_job(&session, &service, "job-1")
        .await
        .unwrap();

    let slay_stats = stats.get("slay", Platform::Reddit).unwrap();
    assert_eq!(slay_stats.total, 2);
    assert_eq!(slay_stats.old, 1);
    assert_eq!(slay_stats.error, 1);
    assert_eq!(slay_stats.old_pct, Some(50.0));

    let lit_stats = stats.get("lit", Platform::Twitter).unwrap();
    assert_eq!(lit_stats.total, 1);
    assert_eq!(lit_stats.error, 1);

    // Classified files land under processed/.
    let processed = session.processed_dir();
    assert!(processed.join("slay_reddit_classified.json").is_file());
    assert!(processed.join("lit_twitter_classified.json").is_file());
    assert!(processed.join("summary_stats.json").is_file());

    let all: Vec<Record> = serde_json::from_str(
        &std::fs::read_to_string(processed.join("all_classified.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(all.len(), 3);
    for record in &all {
        assert_ne!(record.classification, Classification::Unclassified);
    }

    let by_id: std::collections::HashMap<Uuid, Classification> = all
        .iter()
        .map(|r| (r.correlation_id, r.classification))
        .collect();
    assert_eq!(by_id[&slay[0].correlation_id], Classification::Old);
    assert_eq!(by_id[&slay[1].correlation_id], Classification::Error);
    assert_eq!(by_id[&lit[0].correlation_id], Classification::Error);
}
