//! armor/mod.rs
//! ASCII armor for PGP MESSAGE blocks.

pub mod encode;
pub mod decode;

pub use encode::{ArmorSink, ArmorWriter};
pub use decode::{ArmorReader, MessageSource};
