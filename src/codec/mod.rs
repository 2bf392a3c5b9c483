//! Ingest payload codec
//!
//! Normalizes sensor payloads of several historical wire shapes into
//! [`Sample`] records.

pub mod decoder;
mod packed;
pub mod sample;

pub use decoder::{DecoderStats, FieldWarning, PayloadDecoder, PayloadFormat};
pub use sample::{Field, Sample, SampleBuilder};
