//! Copy generation: orchestrates one generate or update action on a session.
//!
//! Flow: validate → provider pre-flight → assemble prompt → dispatch (JSON mode)
//!       → reconcile → self-QA → optional critique feedback → commit to session.
//!
//! The session is only written when a usable draft comes back. Dispatch
//! exhaustion leaves it untouched and reports a notice instead of an error.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::assembler::generation_messages;
use crate::generation::prompts::{FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM};
use crate::generation::reconcile::{reconcile, repair_newlines, GenerationResult};
use crate::generation::self_qa::{self_qa, QaReport};
use crate::generation::trait_rules::TraitConfigMap;
use crate::llm_client::{ChatMessage, ChatRequest, LlmClient, ProviderKind};
use crate::models::campaign::{
    CampaignBrief, CopyType, Country, GenerationRequest, LengthBucket, TraitInput, TraitScores,
};
use crate::models::session::Session;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body shared by generate and update.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateParams {
    /// Falls back to the configured default provider.
    #[serde(default)]
    pub provider: Option<ProviderKind>,
    pub copy_type: CopyType,
    pub country: Country,
    pub length: LengthBucket,
    /// Omitted traits mean the default slider panel.
    #[serde(default)]
    pub traits: Option<TraitInput>,
    #[serde(default)]
    pub brief: CampaignBrief,
    #[serde(default)]
    pub show_critique: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Fresh,
    /// Rewrites the session's current copy under new trait settings.
    Revision,
}

/// Per-process switches that shape every generation.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub default_provider: ProviderKind,
    pub auto_qa: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub provider: ProviderKind,
    pub copy: String,
    pub plan: String,
    pub qa: Option<QaReport>,
    pub feedback: Option<String>,
    pub notices: Vec<String>,
}

impl GenerationOutcome {
    fn empty(provider: ProviderKind, notices: Vec<String>) -> Self {
        Self {
            provider,
            copy: String::new(),
            plan: String::new(),
            qa: None,
            feedback: None,
            notices,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Checks everything that can be checked without a network call.
pub fn prepare_request(
    params: GenerateParams,
    mode: GenerationMode,
    session: &Session,
) -> Result<GenerationRequest, AppError> {
    if !params.brief.is_ready() {
        return Err(AppError::Validation(
            "Campaign brief needs both a hook and details".to_string(),
        ));
    }

    let traits = match params.traits.filter(|t| !t.is_empty()) {
        None => TraitScores::default_panel(),
        Some(input) => input.into_scores().map_err(|bad| {
            AppError::Validation(format!(
                "Trait scores must be between 1 and 10: {}",
                bad.join(", ")
            ))
        })?,
    };

    let original_copy = match mode {
        GenerationMode::Fresh => None,
        GenerationMode::Revision if session.has_copy() => Some(session.current_copy.clone()),
        GenerationMode::Revision => {
            return Err(AppError::Validation(
                "Generate copy before updating it".to_string(),
            ))
        }
    };

    Ok(GenerationRequest {
        copy_type: params.copy_type,
        country: params.country,
        length: params.length,
        traits,
        brief: params.brief,
        original_copy,
    })
}

pub async fn generate_copy(
    llm: &LlmClient,
    traits: &TraitConfigMap,
    options: PipelineOptions,
    session: &mut Session,
    params: GenerateParams,
    mode: GenerationMode,
) -> Result<GenerationOutcome, AppError> {
    let provider = params.provider.unwrap_or(options.default_provider);
    let show_critique = params.show_critique;
    let request = prepare_request(params, mode, session)?;
    llm.ensure_available(provider)?;

    info!(
        "Generating {} for {} ({}) via {provider}: {} traits, revision={}",
        request.copy_type.label(),
        request.country.name(),
        request.length.label(),
        request.traits.len(),
        request.is_revision()
    );

    let mut notices = Vec::new();
    let chat = ChatRequest::new(generation_messages(&request, traits)).json();
    let raw = llm
        .dispatch(provider, &chat)
        .await
        .into_text("Generation", &mut notices);
    if raw.trim().is_empty() {
        return Ok(GenerationOutcome::empty(provider, notices));
    }

    let draft = reconcile(&raw);
    if !draft.is_usable() {
        warn!("Generation reply held no copy; session left unchanged");
        notices.push("The model returned no copy. Try again.".to_string());
        return Ok(GenerationOutcome::empty(provider, notices));
    }

    let qa = if options.auto_qa {
        let mut report =
            self_qa(llm, provider, &draft.copy, request.copy_type, request.length).await;
        notices.append(&mut report.notices);
        report
    } else {
        QaReport::skipped(&draft.copy)
    };

    let result = GenerationResult {
        plan: draft.plan,
        copy: repair_newlines(&qa.copy),
    };

    let feedback = if show_critique {
        critique_feedback(llm, provider, &result.copy, &mut notices).await
    } else {
        None
    };

    session.record_generation(result.clone(), request.length);
    info!(
        "Session {} updated: {} words, QA verdict {:?}",
        session.id,
        result.copy.split_whitespace().count(),
        qa.verdict
    );

    Ok(GenerationOutcome {
        provider,
        copy: result.copy,
        plan: result.plan,
        qa: Some(qa),
        feedback,
        notices,
    })
}

/// Three-bullet strength / weakness / improvement note on the final draft.
pub async fn critique_feedback(
    llm: &LlmClient,
    provider: ProviderKind,
    copy: &str,
    notices: &mut Vec<String>,
) -> Option<String> {
    let request = ChatRequest::new(vec![
        ChatMessage::system(FEEDBACK_SYSTEM),
        ChatMessage::user(FEEDBACK_PROMPT_TEMPLATE.replace("{draft}", copy)),
    ]);
    let text = llm
        .dispatch(provider, &request)
        .await
        .into_text("Critique feedback", notices);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::self_qa::QaVerdict;
    use crate::generation::trait_rules::tests::sample_config;
    use crate::llm_client::testing::{client_with, server_error, ScriptedProvider};

    const OPTIONS: PipelineOptions = PipelineOptions {
        default_provider: ProviderKind::OpenAi,
        auto_qa: true,
    };

    fn words(n: usize) -> String {
        vec!["invest"; n].join(" ")
    }

    fn traits(value: serde_json::Value) -> TraitInput {
        serde_json::from_value(value).unwrap()
    }

    fn params() -> GenerateParams {
        GenerateParams {
            provider: None,
            copy_type: CopyType::Email,
            country: Country::Australia,
            length: LengthBucket::Short,
            traits: Some(traits(serde_json::json!({
                "Urgency": 5, "Data_Richness": 5, "Social_Proof": 5, "Comparative_Framing": 5,
                "Imagery": 5, "Conversational_Tone": 5, "FOMO": 5, "Repetition": 5
            }))),
            brief: CampaignBrief {
                hook: "Midnight deadline".into(),
                details: "Silver Pass".into(),
                ..Default::default()
            },
            show_critique: false,
        }
    }

    fn reply(plan: &str, copy: &str) -> String {
        serde_json::json!({ "plan": plan, "copy": copy }).to_string()
    }

    #[tokio::test]
    async fn test_passing_draft_is_committed_verbatim() {
        let copy = format!("## Subject\nHello\n{}\n*Past performance...*", words(146));
        let provider =
            ScriptedProvider::replying(ProviderKind::OpenAi, &[reply("- hook", &copy).as_str(), "PASS"]);
        let llm = client_with(provider.clone());
        let mut session = Session::new();

        let outcome = generate_copy(&llm, &sample_config(), OPTIONS, &mut session, params(), GenerationMode::Fresh)
            .await
            .unwrap();

        assert_eq!(outcome.copy, copy);
        let count = outcome.copy.split_whitespace().count();
        assert!((100..=220).contains(&count), "{count} words");
        assert_eq!(outcome.qa.as_ref().unwrap().verdict, QaVerdict::Passed);
        assert_eq!(session.current_copy, copy);
        assert_eq!(session.current_plan, "- hook");
        assert_eq!(provider.calls(), 2);
        assert!(provider.requests()[0].json_mode);
    }

    #[tokio::test]
    async fn test_short_draft_goes_through_length_gate_revision() {
        let draft = words(40);
        let provider = ScriptedProvider::replying(
            ProviderKind::OpenAi,
            &[reply("p", &draft).as_str(), "A much longer revised draft"],
        );
        let llm = client_with(provider.clone());
        let mut session = Session::new();

        let outcome = generate_copy(&llm, &sample_config(), OPTIONS, &mut session, params(), GenerationMode::Fresh)
            .await
            .unwrap();

        let qa = outcome.qa.unwrap();
        assert_eq!(qa.verdict, QaVerdict::Revised);
        assert!(qa.critique.unwrap().starts_with("- Draft is only 40 words (Target: 100)"));
        assert_eq!(outcome.copy, "A much longer revised draft");
        assert_eq!(provider.calls(), 2, "generation plus revise, no model critique");
    }

    #[tokio::test]
    async fn test_revision_mode_embeds_current_copy_and_repairs_newlines() {
        let provider = ScriptedProvider::replying(
            ProviderKind::OpenAi,
            &[r###"{"plan": "", "copy": "## Subject\\nNew body\\nSign-off"}"###],
        );
        let llm = client_with(provider.clone());
        let mut session = Session::new();
        session.record_generation(
            GenerationResult {
                plan: String::new(),
                copy: "## Subject\nOld body".into(),
            },
            LengthBucket::Short,
        );
        let options = PipelineOptions { auto_qa: false, ..OPTIONS };

        let outcome = generate_copy(&llm, &sample_config(), options, &mut session, params(), GenerationMode::Revision)
            .await
            .unwrap();

        assert_eq!(outcome.copy, "## Subject\nNew body\nSign-off");
        assert_eq!(outcome.qa.unwrap().verdict, QaVerdict::Skipped);
        let prompt = &provider.requests()[0].messages[1].content;
        assert!(prompt.contains("### ORIGINAL COPY TO REVISE\n## Subject\nOld body"));
    }

    #[tokio::test]
    async fn test_revision_without_current_copy_is_rejected() {
        let provider = ScriptedProvider::replying(ProviderKind::OpenAi, &[]);
        let llm = client_with(provider.clone());
        let mut session = Session::new();

        let err = generate_copy(&llm, &sample_config(), OPTIONS, &mut session, params(), GenerationMode::Revision)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_call() {
        let provider = ScriptedProvider::replying(ProviderKind::OpenAi, &[]);
        let llm = client_with(provider.clone());
        let mut session = Session::new();

        let mut missing_hook = params();
        missing_hook.brief.hook = "  ".into();
        let mut too_high = params();
        too_high.traits = Some(traits(serde_json::json!({ "Urgency": 11 })));
        let mut way_too_high = params();
        way_too_high.traits = Some(traits(serde_json::json!({ "Urgency": 300 })));
        let mut negative = params();
        negative.traits = Some(traits(serde_json::json!({ "FOMO": -1 })));

        for p in [missing_hook, too_high, way_too_high, negative] {
            let err = generate_copy(&llm, &sample_config(), OPTIONS, &mut session, p, GenerationMode::Fresh)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }

        let mut gemini = params();
        gemini.provider = Some(ProviderKind::Gemini);
        let err = generate_copy(&llm, &sample_config(), OPTIONS, &mut session, gemini, GenerationMode::Fresh)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProviderUnavailable(ProviderKind::Gemini)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_generation_leaves_session_untouched() {
        let provider = ScriptedProvider::new(
            ProviderKind::OpenAi,
            vec![Err(server_error()), Err(server_error()), Err(server_error())],
        );
        let llm = client_with(provider.clone());
        let mut session = Session::new();
        session.record_adaptation("kept".into());

        let outcome = generate_copy(&llm, &sample_config(), OPTIONS, &mut session, params(), GenerationMode::Fresh)
            .await
            .unwrap();

        assert!(outcome.copy.is_empty());
        assert!(outcome.qa.is_none());
        assert_eq!(outcome.notices.len(), 1);
        assert!(!session.has_copy());
        assert_eq!(session.adapted_copy, "kept");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_show_critique_adds_feedback() {
        let provider = ScriptedProvider::replying(
            ProviderKind::OpenAi,
            &[reply("p", &words(150)).as_str(), " - Strong hook\n- Weak CTA\n- Add proof "],
        );
        let llm = client_with(provider.clone());
        let mut session = Session::new();
        let mut p = params();
        p.show_critique = true;
        let options = PipelineOptions { auto_qa: false, ..OPTIONS };

        let outcome = generate_copy(&llm, &sample_config(), options, &mut session, p, GenerationMode::Fresh)
            .await
            .unwrap();

        assert_eq!(
            outcome.feedback.as_deref(),
            Some("- Strong hook\n- Weak CTA\n- Add proof")
        );
        assert_eq!(provider.requests()[1].messages[0].content, FEEDBACK_SYSTEM);
    }

    #[tokio::test]
    async fn test_new_generation_drops_previous_variants() {
        let provider = ScriptedProvider::replying(ProviderKind::OpenAi, &[reply("", &words(150)).as_str()]);
        let llm = client_with(provider);
        let mut session = Session::new();
        session.record_variants(crate::generation::variants::VariantSet {
            headlines: vec!["old".into()],
            ctas: vec!["old".into()],
        });
        let options = PipelineOptions { auto_qa: false, ..OPTIONS };

        generate_copy(&llm, &sample_config(), options, &mut session, params(), GenerationMode::Fresh)
            .await
            .unwrap();

        assert!(session.variant_set.is_none());
        assert_eq!(session.selected_length, Some(LengthBucket::Short));
    }
}
