//! crypto/mod.rs
//! Primitives: AES-GCM, HKDF, hashing, X25519 session key wrapping.

pub mod types;
pub mod aead;
pub mod kdf;
pub mod digest;
pub mod ecdh;

pub use types::*;
pub use aead::*;
pub use kdf::*;
pub use self::digest::*;
pub use ecdh::*;
