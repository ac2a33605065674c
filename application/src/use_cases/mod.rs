//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod accept_value;
pub mod compare;
pub mod run_extraction;

#[cfg(test)]
pub(crate) mod testing;
