//! Completion backend and the pipeline actor
//!
//! - [`CompletionClient`] sends two-turn chat requests to an OpenAI-compatible
//!   API, routing judge calls to the fixed judge model
//! - [`spawn_pipeline_actor`] runs generation and evaluation off the UI thread

mod actor;
mod client;
#[cfg(test)]
pub(crate) mod fake;

pub use actor::{PipelineActorHandle, PipelineCommand, PipelineEvent, spawn_pipeline_actor};
pub use client::{Backend, CompletionClient};
