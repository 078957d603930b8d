//! An umbrella module for the OpenAI provider

pub(super) mod api;
mod provider;

pub(crate) use self::provider::OpenAIProvider;
