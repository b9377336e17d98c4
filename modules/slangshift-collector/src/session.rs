//! Session directories own every artifact of one collection run: raw
//! records, checkpoints, and classified output all live under one
//! timestamped root, so parallel runs never interleave files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use slangshift_common::{Platform, Record};
use tracing::info;

use crate::stats::SummaryStats;

pub struct Session {
    root: PathBuf,
}

impl Session {
    /// Create a fresh timestamped session directory under `output_dir`.
    pub fn create(output_dir: &Path) -> Result<Self> {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let root = output_dir.join(format!("session_{stamp}"));
        let session = Self { root };
        for dir in [session.raw_dir(), session.processed_dir(), session.checkpoints_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        info!(session = %session.root.display(), "Created session");
        Ok(session)
    }

    /// Reopen an existing session directory, e.g. to resume collection or
    /// classify already-collected records.
    pub fn resume(root: &Path) -> Result<Self> {
        if !root.join("raw").is_dir() {
            bail!("{} is not a session directory (missing raw/)", root.display());
        }
        let session = Self {
            root: root.to_path_buf(),
        };
        for dir in [session.processed_dir(), session.checkpoints_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        info!(session = %session.root.display(), "Resumed session");
        Ok(session)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("processed")
    }

    pub fn checkpoints_dir(&self) -> PathBuf {
        self.root.join("checkpoints")
    }

    /// Write collected records for one (keyword, platform) pair.
    pub fn write_raw(&self, keyword: &str, platform: Platform, records: &[Record]) -> Result<()> {
        let path = self.raw_dir().join(format!("{keyword}_{platform}.json"));
        write_json(&path, &records)?;
        info!(path = %path.display(), count = records.len(), "Wrote raw records");
        Ok(())
    }

    /// Load every raw record file in the session, in stable path order.
    pub fn load_all_raw(&self) -> Result<Vec<Record>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(self.raw_dir())
            .with_context(|| format!("Failed to read {}", self.raw_dir().display()))?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        paths.sort();

        let mut records = Vec::new();
        for path in paths {
            let data = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let batch: Vec<Record> = serde_json::from_str(&data)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            records.extend(batch);
        }
        Ok(records)
    }

    /// Write classified records for one (keyword, platform) pair.
    pub fn write_classified(
        &self,
        keyword: &str,
        platform: Platform,
        records: &[Record],
    ) -> Result<()> {
        let path = self
            .processed_dir()
            .join(format!("{keyword}_{platform}_classified.json"));
        write_json(&path, &records)
    }

    /// Write the combined classified record set.
    pub fn write_all_classified(&self, records: &[Record]) -> Result<()> {
        write_json(&self.processed_dir().join("all_classified.json"), &records)
    }

    /// Write the per-keyword, per-platform summary.
    pub fn write_summary(&self, stats: &SummaryStats) -> Result<()> {
        write_json(&self.processed_dir().join("summary_stats.json"), stats)
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use slangshift_common::Classification;
    use uuid::Uuid;

    use super::*;

    fn record(native_id: &str, platform: Platform) -> Record {
        Record {
            correlation_id: Uuid::new_v4(),
            native_id: native_id.to_string(),
            text: "some collected text".to_string(),
            url: format!("https://example.com/{native_id}"),
            created_at: None,
            username: "user".to_string(),
            subreddit: None,
            platform,
            keyword: "slay".to_string(),
            classification: Classification::Unclassified,
        }
    }

    #[test]
    fn create_lays_out_directories() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::create(dir.path()).unwrap();
        assert!(session.raw_dir().is_dir());
        assert!(session.processed_dir().is_dir());
        assert!(session.checkpoints_dir().is_dir());
        assert!(session
            .root()
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("session_"));
    }

    #[test]
    fn raw_records_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::create(dir.path()).unwrap();

        let reddit = vec![record("r1", Platform::Reddit), record("r2", Platform::Reddit)];
        let twitter = vec![record("t1", Platform::Twitter)];
        session.write_raw("slay", Platform::Reddit, &reddit).unwrap();
        session.write_raw("slay", Platform::Twitter, &twitter).unwrap();

        let loaded = session.load_all_raw().unwrap();
        assert_eq!(loaded.len(), 3);
        // reddit sorts before twitter in path order
        assert_eq!(loaded[0].native_id, "r1");
        assert_eq!(loaded[2].native_id, "t1");
    }

    #[test]
    fn resume_rejects_non_session_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Session::resume(dir.path()).is_err());
    }

    #[test]
    fn resume_reopens_created_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::create(dir.path()).unwrap();
        session
            .write_raw("lit", Platform::Reddit, &[record("x", Platform::Reddit)])
            .unwrap();

        let reopened = Session::resume(session.root()).unwrap();
        assert_eq!(reopened.load_all_raw().unwrap().len(), 1);
    }
}
