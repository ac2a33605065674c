//! Schema domain
//!
//! The Schema Contract lists the fields every provider is asked for. It is
//! compiled once per session into an [`OutputContract`] that describes and
//! enforces the per-field response shape.

mod contract;
mod field;
pub mod output;

pub use contract::SchemaContract;
pub use field::{Field, ValueKind};
pub use output::OutputContract;
