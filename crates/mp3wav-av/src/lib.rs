//! # mp3wav-av
//!
//! Decoder staging and process execution for mp3wav.
//!
//! This crate provides:
//!
//! - **Decoder providers** ([`StagedDecoder`], [`SystemDecoder`]) -- yield an
//!   executable mpg123 path, copying the bundled binary into a writable
//!   directory when needed.
//! - **Command execution** ([`ToolCommand`]) -- async argument-vector builder
//!   with optional timeout and a shell-escaped display form.
//! - **Output handles** ([`OutputFile`]) -- caller-given or generated output
//!   paths with drop-based cleanup.
//! - **Conversion** ([`Converter`]) -- the MP3 to WAV workflow.

pub mod command;
pub mod convert;
pub mod locator;
pub mod output;

// ---- Re-exports for convenience ----

pub use command::{shell_quote, ToolCommand, ToolOutput};
pub use convert::{Converter, ConverterSettings};
pub use locator::{
    check_decoder, provider_from_config, resolve_bundled, DecoderInfo, DecoderProvider,
    StagedDecoder, SystemDecoder,
};
pub use output::OutputFile;
