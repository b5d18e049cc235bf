//! Variant generator: alternative headlines/subject lines and CTA labels for a
//! finished draft. Unlike generation, a malformed reply is an error here.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::{
    fill_template, VARIANTS_PROMPT_TEMPLATE, VARIANTS_SYSTEM, VARIANTS_TEMPERATURE,
};
use crate::llm_client::{
    strip_json_fences, ChatMessage, ChatRequest, DispatchOutcome, LlmClient, ProviderKind,
};

pub const DEFAULT_VARIANT_COUNT: usize = 5;
pub const MAX_VARIANT_COUNT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantSet {
    pub headlines: Vec<String>,
    pub ctas: Vec<String>,
}

impl VariantSet {
    fn truncate(&mut self, n: usize) {
        self.headlines.truncate(n);
        self.ctas.truncate(n);
    }
}

pub fn validate_count(n: usize) -> Result<usize, AppError> {
    if (1..=MAX_VARIANT_COUNT).contains(&n) {
        Ok(n)
    } else {
        Err(AppError::Validation(format!(
            "variant count must be between 1 and {MAX_VARIANT_COUNT}, got {n}"
        )))
    }
}

pub fn parse_variants(raw: &str, n: usize) -> Result<VariantSet, AppError> {
    let mut set: VariantSet = serde_json::from_str(strip_json_fences(raw))
        .map_err(|e| AppError::Parse(format!("variant reply is not valid JSON: {e}")))?;
    set.truncate(n);
    Ok(set)
}

/// Returns `Ok(None)` when every attempt failed; the reason is pushed to `notices`.
pub async fn generate_variants(
    llm: &LlmClient,
    provider: ProviderKind,
    copy: &str,
    n: usize,
    notices: &mut Vec<String>,
) -> Result<Option<VariantSet>, AppError> {
    if copy.trim().is_empty() {
        return Err(AppError::Validation(
            "Generate copy before asking for variants".to_string(),
        ));
    }
    let n = validate_count(n)?;
    llm.ensure_available(provider)?;

    let request = ChatRequest::new(vec![
        ChatMessage::system(VARIANTS_SYSTEM),
        ChatMessage::user(
            fill_template(
                VARIANTS_PROMPT_TEMPLATE,
                &[("n", n.to_string().as_str()), ("copy", copy)],
            ),
        ),
    ])
    .json()
    .with_temperature(VARIANTS_TEMPERATURE);

    let raw = match llm.dispatch(provider, &request).await {
        DispatchOutcome::Reply(text) => text,
        outcome => {
            outcome.into_text("Variant generation", notices);
            return Ok(None);
        }
    };

    let set = parse_variants(&raw, n)?;
    info!(
        "Generated {} headline and {} CTA variants",
        set.headlines.len(),
        set.ctas.len()
    );
    Ok(Some(set))
}
