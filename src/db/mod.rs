//! Competition and assignment storage.

pub mod memory;

pub use memory::{CompetitionStore, SeedData};
