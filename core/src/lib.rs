//! pgp-core
//!
//! Streaming OpenPGP (v6 profile) message encoding and decoding.
//! Encode wraps plaintext as literal data, optionally signs it, compresses,
//! encrypts to one recipient and optionally armors the result. Decode
//! reverses the layers and verifies any one-pass signature.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod provider;
pub mod config;

// Building blocks
pub mod crypto;
pub mod compression;
pub mod armor;
pub mod packet;
pub mod keys;
pub mod signature;
pub mod telemetry;

// Pipelines
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::{CallOverrides, FormatConfig};
    pub use crate::keys::{KeyMaterial, KeyResolver, KeySource, LockParams, MemoryKeyring, PublicKeyMaterial};
    pub use crate::packet::LiteralMetadata;
    pub use crate::signature::{SignatureStatus, VerifiedSignature};
    pub use crate::stream::{DecodedMessage, InputSource, MessageLayers, OutputSink, PgpFormat};
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::PgpError;
}
