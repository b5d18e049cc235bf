//! Prompt assembler: composes the instruction block for one generation.
//!
//! Section order is fixed: trait guide, worked example(s), structure, hard
//! requirements, campaign brief, length, revision block, formatting constraint.
//! Pure string composition, so identical requests give identical bytes.

use crate::generation::prompts::{
    EMAIL_EXAMPLE, EMAIL_STRUCTURE, EMAIL_WINNER, END_INSTRUCTIONS, FORMATTING_CONSTRAINT,
    GENERATION_TASK, REVISION_TEMPLATE, SALES_PAGE_EXAMPLE, SALES_PAGE_STRUCTURE,
    SALES_PAGE_WINNER,
};
use crate::generation::tone::trait_guide;
use crate::generation::trait_rules::{allows_exemplar, compile_rules, TraitConfigMap};
use crate::llm_client::prompts::copy_chief_system;
use crate::llm_client::ChatMessage;
use crate::models::campaign::{CampaignBrief, CopyType, GenerationRequest, LengthBucket};

pub fn structure_for(copy_type: CopyType) -> &'static str {
    match copy_type {
        CopyType::Email => EMAIL_STRUCTURE,
        CopyType::SalesPage => SALES_PAGE_STRUCTURE,
    }
}

fn exemplar_for(copy_type: CopyType, with_winner: bool) -> String {
    let (example, winner) = match copy_type {
        CopyType::Email => (EMAIL_EXAMPLE, EMAIL_WINNER),
        CopyType::SalesPage => (SALES_PAGE_EXAMPLE, SALES_PAGE_WINNER),
    };
    if with_winner {
        format!("{example}\n\n{winner}")
    } else {
        example.to_string()
    }
}

fn brief_line(label: &str, value: &str) -> String {
    if value.trim().is_empty() {
        String::new()
    } else {
        format!("- {label}: {value}\n")
    }
}

fn brief_block(brief: &CampaignBrief) -> String {
    let offer = if brief.has_offer() {
        format!(
            "Special {} (Retail {}), Term {}",
            brief.offer_price, brief.retail_price, brief.offer_term
        )
    } else {
        String::new()
    };

    let mut block = String::from("#### Campaign Brief\n");
    block.push_str(&brief_line("Hook", &brief.hook));
    block.push_str(&brief_line("Details", &brief.details));
    block.push_str(&brief_line("Offer", &offer));
    block.push_str(&brief_line("Reports", &brief.reports));
    block.push_str(&brief_line("Stocks to Tease", &brief.stocks_to_tease));
    block.push_str(&brief_line("Quotes/News", &brief.quotes_news));
    block.trim_end().to_string()
}

pub fn length_block(length: LengthBucket) -> String {
    match length.bounds() {
        (min, Some(max)) => {
            format!("#### Length Requirement\nWrite between **{min} and {max} words**.")
        }
        (min, None) => format!("#### Length Requirement\nWrite **at least {min} words**."),
    }
}

/// Builds the instruction block for `request`.
pub fn build_prompt(request: &GenerationRequest, config: &TraitConfigMap) -> String {
    let mut sections: Vec<String> = Vec::with_capacity(8);

    sections.push(trait_guide(&request.traits, config));
    sections.push(exemplar_for(
        request.copy_type,
        allows_exemplar(&request.traits, config),
    ));
    sections.push(format!(
        "#### Structure to Follow\n{}",
        structure_for(request.copy_type)
    ));

    let hard_rules = compile_rules(&request.traits, config);
    if !hard_rules.is_empty() {
        sections.push(format!("#### Hard Requirements\n{}", hard_rules.join("\n")));
    }

    sections.push(brief_block(&request.brief));
    sections.push(length_block(request.length));

    if let Some(original) = &request.original_copy {
        sections.push(REVISION_TEMPLATE.replace("{original}", original));
    }

    sections.push(FORMATTING_CONSTRAINT.to_string());
    sections.push(END_INSTRUCTIONS.to_string());

    sections
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// System + user messages for a generate or update request.
pub fn generation_messages(request: &GenerationRequest, config: &TraitConfigMap) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(copy_chief_system(request.country.rules())),
        ChatMessage::user(format!(
            "{GENERATION_TASK}\n\n{}",
            build_prompt(request, config)
        )),
    ]
}
