//! Self-QA loop: one critique, and at most one revision, per generation.
//!
//! Drafts shorter than half the bucket's minimum skip the model critique and
//! get a locally written "expand" instruction instead.

use serde::Serialize;
use tracing::{info, warn};

use crate::generation::prompts::{
    fill_template, CRITIQUE_PROMPT_TEMPLATE, CRITIQUE_SYSTEM, LENGTH_CRITIQUE_TEMPLATE,
    REVISE_PROMPT_TEMPLATE, REVISE_SYSTEM,
};
use crate::llm_client::{ChatMessage, ChatRequest, DispatchOutcome, LlmClient, ProviderKind};
use crate::models::campaign::{CopyType, LengthBucket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QaVerdict {
    /// Critique said PASS; draft kept as is.
    Passed,
    Revised,
    /// Revise call produced nothing usable; draft kept as is.
    RevisionEmpty,
    /// Critique call failed; no revision attempted.
    Inconclusive,
    /// QA disabled for this run.
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct QaReport {
    pub copy: String,
    pub critique: Option<String>,
    pub verdict: QaVerdict,
    pub model_calls: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

impl QaReport {
    pub fn skipped(draft: &str) -> Self {
        Self {
            copy: draft.to_string(),
            critique: None,
            verdict: QaVerdict::Skipped,
            model_calls: 0,
            notices: Vec::new(),
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The local critique, when the draft is too short to be worth a model review.
pub fn length_gate(draft: &str, length: LengthBucket) -> Option<String> {
    let words = word_count(draft);
    let min = length.min_words() as usize;
    if words * 2 < min {
        Some(
            LENGTH_CRITIQUE_TEMPLATE
                .replace("{word_count}", &words.to_string())
                .replace("{min_words}", &min.to_string()),
        )
    } else {
        None
    }
}

fn is_pass(critique: &str) -> bool {
    critique.to_ascii_uppercase().contains("PASS")
}

pub async fn self_qa(
    llm: &LlmClient,
    provider: ProviderKind,
    draft: &str,
    copy_type: CopyType,
    length: LengthBucket,
) -> QaReport {
    let mut notices = Vec::new();
    let mut model_calls = 0;

    let critique = match length_gate(draft, length) {
        Some(local) => {
            info!("Self-QA length gate fired: {local}");
            local
        }
        None => {
            let request = ChatRequest::new(vec![
                ChatMessage::system(CRITIQUE_SYSTEM),
                ChatMessage::user(
                    fill_template(
                        CRITIQUE_PROMPT_TEMPLATE,
                        &[("copy_type", copy_type.label()), ("draft", draft)],
                    ),
                ),
            ]);
            model_calls += 1;
            match llm.dispatch(provider, &request).await {
                DispatchOutcome::Reply(text) => text,
                outcome => {
                    outcome.into_text("Self-QA critique", &mut notices);
                    warn!("Self-QA critique unavailable; keeping the draft unrevised");
                    return QaReport {
                        copy: draft.to_string(),
                        critique: None,
                        verdict: QaVerdict::Inconclusive,
                        model_calls,
                        notices,
                    };
                }
            }
        }
    };

    if is_pass(&critique) {
        return QaReport {
            copy: draft.to_string(),
            critique: Some(critique),
            verdict: QaVerdict::Passed,
            model_calls,
            notices,
        };
    }

    let request = ChatRequest::new(vec![
        ChatMessage::system(REVISE_SYSTEM),
        ChatMessage::user(
            fill_template(
                REVISE_PROMPT_TEMPLATE,
                &[("fixes", critique.as_str()), ("draft", draft)],
            ),
        ),
    ]);
    model_calls += 1;
    let revised = llm
        .dispatch(provider, &request)
        .await
        .into_text("Self-QA revision", &mut notices);
    let revised = revised.trim();

    let (copy, verdict) = if revised.is_empty() {
        (draft.to_string(), QaVerdict::RevisionEmpty)
    } else {
        (revised.to_string(), QaVerdict::Revised)
    };
    info!("Self-QA finished: {verdict:?} after {model_calls} model call(s)");

    QaReport {
        copy,
        critique: Some(critique),
        verdict,
        model_calls,
        notices,
    }
}
