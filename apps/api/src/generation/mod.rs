// Text generation: prompt selection, sampling parameters, generator-facing handlers.
// All model calls go through llm_client; nothing here talks HTTP directly.

pub mod handlers;
pub mod prompt_source;
pub mod sampling;
