//! packet/mod.rs
//! OpenPGP packet framing and the packet types this crate reads and writes.

pub mod types;
pub mod header;
pub mod writer;
pub mod reader;
pub mod literal;
pub mod one_pass;
pub mod signature;
pub mod pkesk;
pub mod seipd;

pub use types::*;
pub use header::{read_header, write_header, write_length, write_packet};
pub use writer::PacketWriter;
pub use reader::{read_body_to_vec, BodyReader};
pub use literal::{LiteralFormat, LiteralMetadata, LiteralWriter};
pub use one_pass::OnePassSignature;
pub use signature::{SignaturePacket, Subpacket};
pub use pkesk::{Pkesk, Recipient};
pub use seipd::{AeadReader, AeadWriter, SeipdHeader};
