//! compression/mod.rs
//! Deflate-family codecs for the compressed data packet.

pub mod types;
pub mod stream;

pub use types::*;
pub use stream::*;
