//! Prompt templates: loading and rendering

mod library;
mod render;

pub use library::{PromptLibrary, PromptPair};
pub use render::{FieldSource, Template, render};
