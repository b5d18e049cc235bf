//! Response reconciler: turns the model's `{plan, copy}` reply into a
//! `GenerationResult`.
//!
//! Never fails: a reply that is not the expected JSON object is kept whole as
//! the copy, since discarding a usable draft is worse than losing the plan.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::strip_json_fences;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationResult {
    pub plan: String,
    pub copy: String,
}

impl GenerationResult {
    pub fn is_usable(&self) -> bool {
        !self.copy.trim().is_empty()
    }
}

/// Wire shape of the reply; `plan` may be absent or null.
#[derive(Debug, Deserialize)]
struct ReplyFields {
    plan: Option<String>,
    copy: String,
}

/// Replaces every literal backslash-n pair with a real line break. Models often
/// emit escaped newlines when revising multi-line text inside a JSON string.
pub fn repair_newlines(text: &str) -> String {
    if text.contains("\\n") {
        text.replace("\\n", "\n")
    } else {
        text.to_string()
    }
}

pub fn reconcile(raw: &str) -> GenerationResult {
    let cleaned = strip_json_fences(raw);

    let (plan, copy) = match serde_json::from_str::<ReplyFields>(cleaned) {
        Ok(parsed) => (parsed.plan.unwrap_or_default(), parsed.copy),
        Err(e) => {
            warn!("Generation reply is not a {{plan, copy}} object ({e}); using whole reply as copy");
            (String::new(), raw.to_string())
        }
    };

    GenerationResult {
        plan: plan.trim().to_string(),
        copy: repair_newlines(copy.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_reply_extracts_both_fields() {
        let result = reconcile(r###"{"plan": " - hook first ", "copy": "## Subject\nHello"}"###);
        assert_eq!(result.plan, "- hook first");
        assert_eq!(result.copy, "## Subject\nHello");
    }

    #[test]
    fn test_fenced_json_reply_parses() {
        let raw = "```json\n{\"plan\":\"outline\",\"copy\":\"## Headline\\nBuy now\"}\n```";
        let result = reconcile(raw);
        assert_eq!(result.plan, "outline");
        assert_eq!(result.copy, "## Headline\nBuy now");
    }

    #[test]
    fn test_missing_or_null_plan_defaults_to_empty() {
        let result = reconcile(r#"{"copy": "Just copy"}"#);
        assert_eq!(result.plan, "");
        assert_eq!(result.copy, "Just copy");

        let result = reconcile(r#"{"plan": null, "copy": "Still copy"}"#);
        assert_eq!(result.plan, "");
        assert_eq!(result.copy, "Still copy");
    }

    #[test]
    fn test_non_json_reply_becomes_copy() {
        let raw = "## Subject\nHello there, this is not JSON.";
        let result = reconcile(raw);
        assert_eq!(result.plan, "");
        assert_eq!(result.copy, raw);
        assert!(result.is_usable());
    }

    #[test]
    fn test_json_without_copy_field_falls_back_to_raw_text() {
        let raw = r#"{"plan": "only a plan"}"#;
        let result = reconcile(raw);
        assert_eq!(result.plan, "");
        assert_eq!(result.copy, raw);
    }

    #[test]
    fn test_empty_reply_is_not_usable() {
        let result = reconcile("");
        assert!(!result.is_usable());
    }

    #[test]
    fn test_literal_backslash_n_sequences_become_line_breaks() {
        // JSON-escaped backslash: the decoded copy holds the two characters `\` `n`
        let raw = r###"{"plan": "", "copy": "## Subject\\nHello\\n*Past performance...*"}"###;
        let result = reconcile(raw);
        assert_eq!(result.copy, "## Subject\nHello\n*Past performance...*");
        assert!(!result.copy.contains("\\n"));
    }

    #[test]
    fn test_repair_also_applies_to_fallback_copy() {
        let result = reconcile("Line one\\nLine two");
        assert_eq!(result.copy, "Line one\nLine two");
    }

    #[test]
    fn test_repair_newlines_is_idempotent() {
        for input in ["a\\nb", "a\\\\nb", "no escapes", "\\n\\n\\n", "mixed\nreal\\nfake"] {
            let once = repair_newlines(input);
            assert_eq!(repair_newlines(&once), once, "input {input:?}");
        }
    }
}
