// Script generation: request building, the LLM round trip, tolerant JSON
// recovery and result-contract validation.
// All LLM calls go through llm_client; no direct Anthropic calls here.

pub mod contract;
pub mod generator;
pub mod handlers;
pub mod normalizer;
pub mod prompts;
pub mod request;
