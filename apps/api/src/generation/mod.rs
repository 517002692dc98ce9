// Résumé generation: backend client, clarification loop, payload normalizer,
// pipeline state machine and its presentation policy.
// Every call to the generation backend goes through `client::GenerationBackend`.

pub mod clarification;
pub mod client;
pub mod handlers;
pub mod normalizer;
pub mod pipeline;
pub mod presentation;
