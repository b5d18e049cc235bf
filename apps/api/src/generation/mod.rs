// Copy generation engine.
// Implements: trait rules, prompt assembly, reconciliation, self-QA, variants, adaptation.
// All LLM calls go through llm_client; nothing here talks to a provider API directly.

pub mod adapt;
pub mod assembler;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod reconcile;
pub mod self_qa;
pub mod tone;
pub mod trait_rules;
pub mod variants;
