//! mp3wav - convert MP3 files to WAV through a staged mpg123 decoder
//!
//! This library crate exposes the configuration loader for integration
//! testing. The conversion workflow lives in `mp3wav-av`.

pub mod config;

pub use mp3wav_av::{Converter, ConverterSettings, StagedDecoder, SystemDecoder};
pub use mp3wav_core::{ConversionReport, ConversionRequest, ConversionResult, Error, ErrorKind};
