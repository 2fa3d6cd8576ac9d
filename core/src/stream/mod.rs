//! stream/mod.rs
//! Encode/decode pipelines and the public entry point.

pub mod io;
pub mod encode;
pub mod decode;
pub mod core;

pub use io::{InputSource, OutputSink};
pub use encode::{run_encode_pipeline, EncodePhase, EnvelopeOptions, EnvelopeStats, EnvelopeWriter, Signer};
pub use decode::{run_decode_pipeline, DecodePhase, DecodedMessage, MessageLayers, SignerLookup};
pub use self::core::PgpFormat;
