//! Prompt domain
//!
//! Templates for the extraction request sent to every provider.

mod template;

pub use template::PromptTemplate;
