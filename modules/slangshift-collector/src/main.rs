use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use browserless_client::BrowserlessClient;
use openai_client::OpenAiClient;
use reddit_client::{RedditClient, RedditCredentials};
use slangshift_collector::batch::{self, BatchOutcome, PollOptions};
use slangshift_collector::checkpoint::CheckpointStore;
use slangshift_collector::collect::Collector;
use slangshift_collector::correlate;
use slangshift_collector::session::Session;
use slangshift_collector::sources::{FeedSource, ForumSource};
use slangshift_common::{keywords, Config, Platform};

#[derive(Parser)]
#[command(
    name = "slangshift",
    about = "Collect slang usage from Reddit and X, then classify old vs new senses"
)]
struct Cli {
    /// Resume collection into an existing session directory
    #[arg(long)]
    session: Option<PathBuf>,

    /// Stop after collection; leave classification for classify-session
    #[arg(long)]
    skip_classify: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Slangshift collector starting...");

    let config = Config::from_env();
    config.log_redacted();

    let session = match cli.session {
        Some(ref path) => Session::resume(path)?,
        None => Session::create(Path::new(&config.output_dir))?,
    };
    info!(session = %session.root().display(), "Session ready");

    let checkpoints = CheckpointStore::new(session.checkpoints_dir());

    // Sources
    let reddit = RedditClient::login(&RedditCredentials {
        client_id: config.reddit_client_id.clone(),
        client_secret: config.reddit_client_secret.clone(),
        username: config.reddit_username.clone(),
        password: config.reddit_password.clone(),
        user_agent: config.reddit_user_agent.clone(),
    })
    .await?;
    let forum = ForumSource::new(reddit);
    let feed = FeedSource::new(BrowserlessClient::new(
        &config.browserless_url,
        config.browserless_token.as_deref(),
    ));

    let feed_collector = Collector::new(
        &feed,
        &checkpoints,
        config.target_count,
        config.checkpoint_interval,
    );
    let forum_collector = Collector::new(
        &forum,
        &checkpoints,
        config.target_count,
        config.checkpoint_interval,
    );

    // Collection: feed first, then forum, per keyword
    for def in keywords::keyword_set() {
        let records = feed_collector.collect(def.term).await?;
        session.write_raw(def.term, Platform::Twitter, &records)?;

        let records = forum_collector.collect(def.term).await?;
        session.write_raw(def.term, Platform::Reddit, &records)?;
    }

    if cli.skip_classify {
        info!(
            session = %session.root().display(),
            "Collection done, classification skipped"
        );
        return Ok(());
    }

    // Classification
    let records = session.load_all_raw()?;
    if records.is_empty() {
        bail!("Nothing was collected, so there is nothing to classify");
    }

    let service = OpenAiClient::new(config.openai_api_key.clone());
    let job_id = batch::submit_records(&service, &records).await?;

    match batch::wait_for_completion(&service, &job_id, &PollOptions::default()).await? {
        BatchOutcome::Completed => {
            let stats = correlate::correlate_job(&session, &service, &job_id).await?;
            info!("{stats}");
            info!(session = %session.root().display(), "Run complete");
        }
        BatchOutcome::Failed(status) => {
            bail!(
                "Classification job {job_id} ended as '{status}'; raw records are kept in {}",
                session.root().display()
            );
        }
        BatchOutcome::StillPending => {
            bail!("Classification job {job_id} is still pending; rerun classify-session later");
        }
    }

    Ok(())
}
