// Deck generation: outline parsing, the generation pipeline and its HTTP handler.
// All AI calls go through llm_client via the OutlineSource trait.

pub mod generator;
pub mod handlers;
pub mod outline;
