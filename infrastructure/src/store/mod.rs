//! Extraction store implementations

mod memory;

pub use memory::InMemoryExtractionStore;
