//! keys/mod.rs
//! Key material, passphrase protection and key resolution.

pub mod fingerprint;
pub mod protect;
pub mod material;
pub mod keyring;
pub mod resolver;

pub use fingerprint::Fingerprint;
pub use protect::{LockParams, LockedSecret};
pub use keyring::KeyringFile;
pub use material::{KeyMaterial, PublicKeyMaterial, UnlockedKey};
pub use resolver::{KeyResolver, KeySource, MemoryKeyring};
