//! Cross-run consensus concepts used by the meta-ensemble.

pub mod tier;

pub use tier::{ConfidenceTier, ConsensusTally};
