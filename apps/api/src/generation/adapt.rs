//! Country adaptation: rewrites finished copy for another market.

use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::{fill_template, ADAPT_PROMPT_TEMPLATE};
use crate::llm_client::prompts::copy_chief_system;
use crate::llm_client::{ChatMessage, ChatRequest, LlmClient, ProviderKind};
use crate::models::campaign::Country;

pub fn adapt_messages(original: &str, target: Country) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(copy_chief_system(target.rules())),
        ChatMessage::user(
            fill_template(
                ADAPT_PROMPT_TEMPLATE,
                &[("target", target.name()), ("original", original)],
            ),
        ),
    ]
}

/// Plain-text passthrough. An exhausted dispatch returns an empty string and
/// leaves a notice.
pub async fn adapt_copy(
    llm: &LlmClient,
    provider: ProviderKind,
    original: &str,
    source: Country,
    target: Country,
    notices: &mut Vec<String>,
) -> Result<String, AppError> {
    if original.trim().is_empty() {
        return Err(AppError::Validation(
            "There is no copy to adapt".to_string(),
        ));
    }
    if source == target {
        return Err(AppError::Validation(format!(
            "Target country must differ from source ({})",
            source.name()
        )));
    }
    llm.ensure_available(provider)?;

    info!("Adapting copy from {} to {}", source.name(), target.name());
    let request = ChatRequest::new(adapt_messages(original, target));
    let adapted = llm
        .dispatch(provider, &request)
        .await
        .into_text("Adaptation", notices);

    Ok(adapted.trim().to_string())
}
