//! Run the classification stage against an already-collected session.
//!
//! Usage:
//!   classify-session <SESSION_DIR>                submit a batch and wait
//!   classify-session <SESSION_DIR> --job <ID>     resume an existing batch
//!   classify-session <SESSION_DIR> --sync         one completion per record

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use openai_client::{OpenAiClient, RetryPolicy};
use slangshift_collector::batch::{self, BatchOutcome, PollOptions};
use slangshift_collector::correlate;
use slangshift_collector::session::Session;
use slangshift_common::Config;

#[derive(Parser)]
#[command(
    name = "classify-session",
    about = "Classify the raw records of an existing collection session"
)]
struct Cli {
    /// Session directory holding raw record files
    session: PathBuf,

    /// Correlate an already-submitted batch job instead of starting a new one
    #[arg(long, conflicts_with = "sync")]
    job: Option<String>,

    /// Classify with one chat completion per record instead of a batch job
    #[arg(long)]
    sync: bool,

    /// Seconds between batch status checks
    #[arg(long, default_value_t = 300)]
    poll_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::classify_from_env();
    let session = Session::resume(&cli.session)?;

    let records = session.load_all_raw()?;
    if records.is_empty() {
        bail!("Session {} holds no raw records", cli.session.display());
    }
    info!(records = records.len(), session = %session.root().display(), "Loaded raw records");

    let client = OpenAiClient::new(config.openai_api_key.clone());

    if cli.sync {
        let classified =
            correlate::classify_all_sync(&client, &RetryPolicy::default(), &records).await?;
        let stats = correlate::write_outputs(&session, &classified)?;
        info!("{stats}");
        return Ok(());
    }

    let job_id = match cli.job {
        Some(id) => {
            info!(job_id = %id, "Resuming existing classification job");
            id
        }
        None => batch::submit_records(&client, &records).await?,
    };

    let options = PollOptions {
        interval: Duration::from_secs(cli.poll_secs),
        deadline: None,
    };
    match batch::wait_for_completion(&client, &job_id, &options).await? {
        BatchOutcome::Completed => {
            let stats = correlate::correlate_job(&session, &client, &job_id).await?;
            info!("{stats}");
        }
        BatchOutcome::Failed(status) => {
            bail!("Classification job {job_id} ended as '{status}'");
        }
        BatchOutcome::StillPending => {
            bail!("Classification job {job_id} is still pending");
        }
    }

    Ok(())
}
