//! mp3wav-core: shared errors, configuration, and conversion request types.
//!
//! This crate is the foundational dependency for the other mp3wav crates.

pub mod config;
pub mod error;
pub mod request;

// Re-export the most commonly used items at the crate root.
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use request::{
    ConversionFailure, ConversionReport, ConversionRequest, ConversionResult, InputSpec,
    OutputSpec, OutputTarget,
};
