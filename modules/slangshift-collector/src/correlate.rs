//! Correlates batch output back onto the collected records and writes the
//! classified files plus summary statistics.
//!
//! Correlation is by correlation id alone: a record whose id never comes
//! back, or comes back as a failed item, is labelled `Error` rather than
//! dropped, so the classified set always covers every collected record.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use openai_client::{parse_output_jsonl, OpenAiClient, RetryPolicy};
use slangshift_common::{Classification, Platform, Record};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::batch::ClassificationService;
use crate::prompt;
use crate::session::Session;
use crate::stats::SummaryStats;

/// What the batch reported for one correlation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Raw model reply, not yet normalized to a label.
    Reply(String),
    /// The item failed inside the batch.
    Failed,
}

/// Index batch output by correlation id. Lines whose custom id is not a
/// parseable correlation id are logged and dropped; they cannot be matched
/// to any record.
pub fn parse_outcomes(output_jsonl: &str) -> HashMap<Uuid, ItemOutcome> {
    let mut outcomes = HashMap::new();

    for line in parse_output_jsonl(output_jsonl) {
        let Ok(id) = Uuid::parse_str(&line.custom_id) else {
            warn!(custom_id = %line.custom_id, "Output line has no parseable correlation id");
            continue;
        };

        let outcome = match line.response {
            Some(response) if response.status_code == 200 => {
                match response.body.and_then(|body| body.content()) {
                    Some(content) => ItemOutcome::Reply(content),
                    None => ItemOutcome::Failed,
                }
            }
            _ => ItemOutcome::Failed,
        };
        outcomes.insert(id, outcome);
    }
    outcomes
}

/// Label every record from the outcome map. Pure: no I/O, no mutation of
/// the inputs.
pub fn classify_records(records: &[Record], outcomes: &HashMap<Uuid, ItemOutcome>) -> Vec<Record> {
    records
        .iter()
        .map(|record| {
            let classification = match outcomes.get(&record.correlation_id) {
                Some(ItemOutcome::Reply(raw)) => Classification::from_model_output(raw),
                Some(ItemOutcome::Failed) => Classification::Error,
                None => Classification::Error,
            };
            Record {
                classification,
                ..record.clone()
            }
        })
        .collect()
}

/// Write per-pair classified files, the combined file, and the summary.
pub fn write_outputs(session: &Session, classified: &[Record]) -> Result<SummaryStats> {
    let mut groups: BTreeMap<(String, Platform), Vec<Record>> = BTreeMap::new();
    for record in classified {
        groups
            .entry((record.keyword.clone(), record.platform))
            .or_default()
            .push(record.clone());
    }

    for ((keyword, platform), records) in &groups {
        session.write_classified(keyword, *platform, records)?;
    }
    session.write_all_classified(classified)?;

    let stats = SummaryStats::compute(classified);
    session.write_summary(&stats)?;

    info!(
        records = classified.len(),
        pairs = groups.len(),
        "Wrote classified records and summary"
    );
    Ok(stats)
}

/// Full correlation pass for a completed job: fetch its output, label the
/// session's raw records, and write everything under `processed/`.
pub async fn correlate_job<S>(session: &Session, service: &S, job_id: &str) -> Result<SummaryStats>
where
    S: ClassificationService + ?Sized,
{
    let records = session.load_all_raw()?;
    let output = service.fetch_output(job_id).await?;
    let outcomes = parse_outcomes(&output);

    info!(
        records = records.len(),
        outcomes = outcomes.len(),
        job_id,
        "Correlating batch output"
    );

    let classified = classify_records(&records, &outcomes);
    write_outputs(session, &classified)
}

/// Classify records one chat completion at a time instead of via a batch
/// job. Slower and costlier, but the labels come back immediately; meant
/// for small sessions. Per-item failures become `Error` labels after the
/// retry policy gives up.
pub async fn classify_all_sync(
    client: &OpenAiClient,
    policy: &RetryPolicy,
    records: &[Record],
) -> Result<Vec<Record>> {
    let mut classified = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let request = prompt::chat_request(record)?;

        let classification = match policy.run(|| client.chat(&request)).await {
            Ok(response) => match response.content() {
                Some(content) => Classification::from_model_output(&content),
                None => Classification::Error,
            },
            Err(err) => {
                warn!(
                    correlation_id = %record.correlation_id,
                    error = %err,
                    "Classification request failed"
                );
                Classification::Error
            }
        };

        debug!(
            done = index + 1,
            total = records.len(),
            label = %classification,
            "Classified record"
        );
        classified.push(Record {
            classification,
            ..record.clone()
        });
    }

    Ok(classified)
}
