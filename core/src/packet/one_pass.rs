//! packet/one_pass.rs
//! v6 one-pass signature packet.
//!
//! [6][sig type][hash][pk alg][salt len][salt][fingerprint 32][last flag]

use std::io::{self, Cursor, Read, Write};

use byteorder::ReadBytesExt;

use crate::constants::{FINGERPRINT_LEN, OPS_VERSION_6};
use crate::crypto::types::{HashAlgorithm, PublicKeyAlgorithm};
use crate::keys::fingerprint::Fingerprint;
use crate::packet::header::write_packet;
use crate::packet::types::Tag;
use crate::types::PgpError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OnePassSignature {
    pub sig_type: u8,
    pub hash: HashAlgorithm,
    pub pubkey: PublicKeyAlgorithm,
    pub salt: Vec<u8>,
    pub issuer: Fingerprint,
    /// Set when no further one-pass signature packet follows.
    pub last: bool,
}

impl OnePassSignature {
    pub fn to_body(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + self.salt.len() + FINGERPRINT_LEN);
        out.push(OPS_VERSION_6);
        out.push(self.sig_type);
        out.push(self.hash.id());
        out.push(self.pubkey.id());
        out.push(self.salt.len() as u8);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(self.issuer.as_bytes());
        out.push(self.last as u8);
        out
    }

    pub fn write_packet<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        write_packet(w, Tag::OnePassSignature, &self.to_body())
    }

    pub fn parse(body: &[u8]) -> Result<Self, PgpError> {
        let mut r = Cursor::new(body);
        let version = r.read_u8()?;
        match version {
            OPS_VERSION_6 => {}
            3 => return Err(PgpError::UnsupportedAlgorithm("one-pass signature v3".into())),
            v => return Err(PgpError::MalformedMessage(format!("unknown one-pass signature version {}", v))),
        }
        let sig_type = r.read_u8()?;
        let hash = HashAlgorithm::from_id(r.read_u8()?)?;
        let pubkey = PublicKeyAlgorithm::from_id(r.read_u8()?)?;
        let salt_len = r.read_u8()? as usize;
        if salt_len != hash.salt_len() {
            return Err(PgpError::MalformedMessage(format!(
                "one-pass signature salt is {} bytes, {:?} needs {}",
                salt_len,
                hash,
                hash.salt_len()
            )));
        }
        let mut salt = vec![0u8; salt_len];
        r.read_exact(&mut salt)?;
        let mut fp = [0u8; FINGERPRINT_LEN];
        r.read_exact(&mut fp)?;
        let last = r.read_u8()? != 0;
        if (r.position() as usize) != body.len() {
            return Err(PgpError::MalformedMessage("trailing bytes in one-pass signature".into()));
        }
        Ok(Self { sig_type, hash, pubkey, salt, issuer: Fingerprint(fp), last })
    }
}
