//! Source file loading.

mod loader;

pub use loader::{SourceFileLoader, SourceLoadError};
