//! Classification request construction. Every record becomes one
//! single-word chat completion, addressed by its correlation id.

use anyhow::{bail, Result};
use openai_client::{BatchRequestItem, ChatMessage, ChatRequest};
use slangshift_common::{keywords, KeywordDef, Record};

/// Model used for every classification request.
pub const MODEL: &str = "gpt-4o-mini";

const TEMPERATURE: f32 = 0.1;

/// The reply is a single label, so one token is all the model gets.
const MAX_TOKENS: u32 = 1;

/// Render the classification prompt for one post.
pub fn classification_prompt(keyword: &str, text: &str, def: &KeywordDef) -> String {
    format!(
        "Classify usage of \"{keyword}\" in this text as:\n\
         - 'old' for meaning: \"{old}\"\n\
         - 'new' for meaning: \"{new}\"\n\
         - 'unknown' if unclear\n\
         \n\
         Text: {text}\n\
         \n\
         Respond with ONLY one word:",
        old = def.old_sense,
        new = def.new_sense,
    )
}

/// Chat request for one record. A keyword without a registered sense pair
/// is a configuration error, not a per-item failure, so it aborts the
/// whole build.
pub fn chat_request(record: &Record) -> Result<ChatRequest> {
    let Some(def) = keywords::find(&record.keyword) else {
        bail!("No sense pair registered for keyword '{}'", record.keyword);
    };

    Ok(ChatRequest {
        model: MODEL.to_string(),
        messages: vec![ChatMessage::user(classification_prompt(
            &record.keyword,
            &record.text,
            &def,
        ))],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    })
}

/// One batch request line per record, keyed by its correlation id.
pub fn build_batch_requests(records: &[Record]) -> Result<Vec<BatchRequestItem>> {
    records
        .iter()
        .map(|record| {
            Ok(BatchRequestItem::chat(
                record.correlation_id.to_string(),
                chat_request(record)?,
            ))
        })
        .collect()
}

/// Serialize request items as the JSONL payload the Files API expects.
pub fn to_jsonl(items: &[BatchRequestItem]) -> Result<String> {
    let mut out = String::with_capacity(items.len() * 256);
    for item in items {
        out.push_str(&serde_json::to_string(item)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use slangshift_common::{Classification, Platform};
    use uuid::Uuid;

    use super::*;

    fn record(keyword: &str, text: &str) -> Record {
        Record {
            correlation_id: Uuid::new_v4(),
            native_id: "n1".to_string(),
            text: text.to_string(),
            url: "https://example.com/1".to_string(),
            created_at: None,
            username: "user".to_string(),
            subreddit: None,
            platform: Platform::Reddit,
            keyword: keyword.to_string(),
            classification: Classification::Unclassified,
        }
    }

    #[test]
    fn prompt_names_keyword_both_senses_and_text() {
        let def = keywords::find("slay").unwrap();
        let prompt = classification_prompt("slay", "that outfit slays", &def);

        assert!(prompt.starts_with("Classify usage of \"slay\" in this text as:"));
        assert!(prompt.contains(&format!("- 'old' for meaning: \"{}\"", def.old_sense)));
        assert!(prompt.contains(&format!("- 'new' for meaning: \"{}\"", def.new_sense)));
        assert!(prompt.contains("- 'unknown' if unclear"));
        assert!(prompt.contains("Text: that outfit slays"));
        assert!(prompt.ends_with("Respond with ONLY one word:"));
    }

    #[test]
    fn chat_request_uses_fixed_model_and_one_token() {
        let request = chat_request(&record("lit", "the party was lit")).unwrap();

        assert_eq!(request.model, MODEL);
        assert_eq!(request.max_tokens, 1);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
    }

    #[test]
    fn unknown_keyword_fails_the_build() {
        let records = vec![record("slay", "slay queen"), record("yeet", "yeet it")];
        let err = build_batch_requests(&records).unwrap_err();
        assert!(err.to_string().contains("yeet"));
    }

    #[test]
    fn jsonl_has_one_line_per_record_keyed_by_correlation_id() {
        let records = vec![record("slay", "slay one"), record("karen", "ok karen")];
        let items = build_batch_requests(&records).unwrap();
        let jsonl = to_jsonl(&items).unwrap();

        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);

        for (line, record) in lines.iter().zip(&records) {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(
                parsed["custom_id"],
                record.correlation_id.to_string().as_str()
            );
            assert_eq!(parsed["method"], "POST");
            assert_eq!(parsed["url"], "/v1/chat/completions");
            assert_eq!(parsed["body"]["model"], MODEL);
        }
    }
}
