// Screening engine.
// Implements: criteria parsing/projection, candidate scoring, the match
// pipeline, and the batch endpoint.
// All LLM calls go through llm_client — no direct Ollama calls here.

pub mod criteria;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod scorer;
