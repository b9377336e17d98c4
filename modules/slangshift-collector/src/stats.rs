//! Per-keyword, per-platform summary statistics, recomputed wholesale from
//! the classified record set on every run.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use slangshift_common::{Classification, Platform, Record};

/// Counts and derived percentages for one (keyword, platform) cell.
/// Percentages are omitted entirely when the cell is empty.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub total: u32,
    pub old: u32,
    pub new: u32,
    pub unknown: u32,
    pub error: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_pct: Option<f64>,
}

impl ClassCounts {
    fn add(&mut self, classification: Classification) {
        self.total += 1;
        match classification {
            Classification::Old => self.old += 1,
            Classification::New => self.new += 1,
            Classification::Unknown => self.unknown += 1,
            // A record that never received a label counts as an error.
            Classification::Error | Classification::Unclassified => self.error += 1,
        }
    }

    fn finish(&mut self) {
        if self.total == 0 {
            return;
        }
        self.old_pct = Some(pct(self.old, self.total));
        self.new_pct = Some(pct(self.new, self.total));
        self.unknown_pct = Some(pct(self.unknown, self.total));
        self.error_pct = Some(pct(self.error, self.total));
    }
}

/// Percentage rounded to one decimal place.
fn pct(count: u32, total: u32) -> f64 {
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

/// keyword -> platform -> counts. BTreeMaps keep the serialized key order
/// stable across runs.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats(pub BTreeMap<String, BTreeMap<String, ClassCounts>>);

impl SummaryStats {
    pub fn compute(records: &[Record]) -> Self {
        let mut stats = SummaryStats::default();
        for record in records {
            stats
                .0
                .entry(record.keyword.clone())
                .or_default()
                .entry(record.platform.to_string())
                .or_default()
                .add(record.classification);
        }
        for platforms in stats.0.values_mut() {
            for counts in platforms.values_mut() {
                counts.finish();
            }
        }
        stats
    }

    pub fn get(&self, keyword: &str, platform: Platform) -> Option<&ClassCounts> {
        self.0.get(keyword)?.get(platform.as_str())
    }
}

impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Classification Summary ===")?;
        for (keyword, platforms) in &self.0 {
            for (platform, c) in platforms {
                writeln!(
                    f,
                    "  {keyword:<12} {platform:<8} total={:<5} old={:<5} new={:<5} unknown={:<5} error={}",
                    c.total, c.old, c.new, c.unknown, c.error
                )?;
            }
        }
        write!(f, "==============================")
    }
}

#[cfg(test)]
mod tests {
    use slangshift_common::Classification;
    use uuid::Uuid;

    use super::*;

    fn record(keyword: &str, platform: Platform, classification: Classification) -> Record {
        Record {
            correlation_id: Uuid::new_v4(),
            native_id: Uuid::new_v4().to_string(),
            text: "some text".to_string(),
            url: "https://example.com".to_string(),
            created_at: None,
            username: "user".to_string(),
            subreddit: None,
            platform,
            keyword: keyword.to_string(),
            classification,
        }
    }

    #[test]
    fn counts_land_in_their_cells() {
        let records = vec![
            record("slay", Platform::Reddit, Classification::Old),
            record("slay", Platform::Reddit, Classification::New),
            record("slay", Platform::Twitter, Classification::New),
            record("lit", Platform::Reddit, Classification::Error),
        ];

        let stats = SummaryStats::compute(&records);

        let slay_reddit = stats.get("slay", Platform::Reddit).unwrap();
        assert_eq!(slay_reddit.total, 2);
        assert_eq!(slay_reddit.old, 1);
        assert_eq!(slay_reddit.new, 1);

        let slay_twitter = stats.get("slay", Platform::Twitter).unwrap();
        assert_eq!(slay_twitter.total, 1);
        assert_eq!(slay_twitter.new, 1);

        let lit_reddit = stats.get("lit", Platform::Reddit).unwrap();
        assert_eq!(lit_reddit.error, 1);
        assert!(stats.get("lit", Platform::Twitter).is_none());
    }

    #[test]
    fn percentages_round_to_one_decimal_and_sum_near_hundred() {
        let records = vec![
            record("sigma", Platform::Twitter, Classification::Old),
            record("sigma", Platform::Twitter, Classification::New),
            record("sigma", Platform::Twitter, Classification::Unknown),
        ];

        let stats = SummaryStats::compute(&records);
        let counts = stats.get("sigma", Platform::Twitter).unwrap();

        assert_eq!(counts.old_pct, Some(33.3));
        assert_eq!(counts.new_pct, Some(33.3));
        assert_eq!(counts.unknown_pct, Some(33.3));
        assert_eq!(counts.error_pct, Some(0.0));

        let sum = counts.old_pct.unwrap()
            + counts.new_pct.unwrap()
            + counts.unknown_pct.unwrap()
            + counts.error_pct.unwrap();
        assert!((sum - 100.0).abs() < 0.4, "percentages sum to {sum}");
    }

    #[test]
    fn empty_cell_serializes_without_percentages() {
        let counts = ClassCounts::default();
        let json = serde_json::to_value(&counts).unwrap();

        assert_eq!(json["total"], 0);
        assert!(json.get("old_pct").is_none());
        assert!(json.get("error_pct").is_none());
    }

    #[test]
    fn serialized_shape_nests_keyword_then_platform() {
        let records = vec![record("karen", Platform::Reddit, Classification::Old)];
        let json = serde_json::to_value(SummaryStats::compute(&records)).unwrap();

        assert_eq!(json["karen"]["reddit"]["total"], 1);
        assert_eq!(json["karen"]["reddit"]["old_pct"], 100.0);
    }
}
