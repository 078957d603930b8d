//! The registry resolves model references to callable handles. It is an
//! in-memory catalog populated at startup from a static seed table and from
//! configured OpenAI-compatible providers, then kept current by refreshing
//! from each provider's live model listing.
//!
//! A model is referenced by a "model key" naming both the provider and the
//! model:
//! ```text
//! <model key> := <provider identifier> "/" <model identifier>
//! ```
//!
//! For example, `ollama/llama3.1:8b` or `together/meta-llama/Llama-3.3-70B`.
//! Only the first '/' separates the provider from the model.
//!
//! References the registry cannot satisfy resolve to a fallback model. Live
//! refreshes are throttled to one every five minutes unless forced, and
//! concurrent refreshes share a single round of provider requests.

pub(crate) mod catalog;
mod defaults;
pub(crate) mod directory;
pub(crate) mod populate;
pub(crate) mod refresh;
pub(crate) mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub(crate) use registry::{ModelKey, Registry};
