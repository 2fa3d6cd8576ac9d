//! packet/pkesk.rs
//! v6 public-key encrypted session key packet (X25519 only).
//!
//! [6][n][key version][fingerprint n-1][alg 25][ephemeral 32][m][wrapped key m]
//! n = 0 marks an anonymous recipient.

use std::io::{self, Cursor, Read, Write};

use byteorder::ReadBytesExt;

use crate::constants::{CURVE25519_KEY_LEN, KEY_VERSION_6, PKESK_VERSION_6};
use crate::crypto::types::PublicKeyAlgorithm;
use crate::keys::fingerprint::Fingerprint;
use crate::packet::header::write_packet;
use crate::packet::types::Tag;
use crate::types::PgpError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recipient {
    Anonymous,
    Key { version: u8, fingerprint: Vec<u8> },
}

impl Recipient {
    /// True when the packet may be for the key with this v6 fingerprint.
    pub fn matches(&self, fp: &Fingerprint) -> bool {
        match self {
            Recipient::Anonymous => true,
            Recipient::Key { version, fingerprint } => {
                *version == KEY_VERSION_6 && fingerprint.as_slice() == fp.as_bytes()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pkesk {
    pub recipient: Recipient,
    pub algorithm: PublicKeyAlgorithm,
    pub ephemeral: [u8; CURVE25519_KEY_LEN],
    pub wrapped: Vec<u8>,
}

impl Pkesk {
    pub fn for_key(fp: &Fingerprint, ephemeral: [u8; CURVE25519_KEY_LEN], wrapped: Vec<u8>) -> Self {
        Self {
            recipient: Recipient::Key { version: KEY_VERSION_6, fingerprint: fp.as_bytes().to_vec() },
            algorithm: PublicKeyAlgorithm::X25519,
            ephemeral,
            wrapped,
        }
    }

    pub fn to_body(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(72 + self.wrapped.len());
        out.push(PKESK_VERSION_6);
        match &self.recipient {
            Recipient::Anonymous => out.push(0),
            Recipient::Key { version, fingerprint } => {
                out.push((fingerprint.len() + 1) as u8);
                out.push(*version);
                out.extend_from_slice(fingerprint);
            }
        }
        out.push(self.algorithm.id());
        out.extend_from_slice(&self.ephemeral);
        out.push(self.wrapped.len() as u8);
        out.extend_from_slice(&self.wrapped);
        out
    }

    pub fn write_packet<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        write_packet(w, Tag::PublicKeyEncryptedSessionKey, &self.to_body())
    }

    pub fn parse(body: &[u8]) -> Result<Self, PgpError> {
        let mut r = Cursor::new(body);
        match r.read_u8()? {
            PKESK_VERSION_6 => {}
            3 => return Err(PgpError::UnsupportedAlgorithm("session key packet v3".into())),
            v => return Err(PgpError::MalformedMessage(format!("unknown session key packet version {}", v))),
        }
        let n = r.read_u8()? as usize;
        let recipient = if n == 0 {
            Recipient::Anonymous
        } else {
            let version = r.read_u8()?;
            let mut fingerprint = vec![0u8; n - 1];
            r.read_exact(&mut fingerprint)?;
            Recipient::Key { version, fingerprint }
        };
        let algorithm = PublicKeyAlgorithm::from_id(r.read_u8()?)?;
        if algorithm != PublicKeyAlgorithm::X25519 {
            return Err(PgpError::UnsupportedAlgorithm(format!("session key encrypted with {:?}", algorithm)));
        }
        let mut ephemeral = [0u8; CURVE25519_KEY_LEN];
        r.read_exact(&mut ephemeral)?;
        let m = r.read_u8()? as usize;
        let mut wrapped = vec![0u8; m];
        r.read_exact(&mut wrapped)?;
        if (r.position() as usize) != body.len() {
            return Err(PgpError::MalformedMessage("trailing bytes in session key packet".into()));
        }
        Ok(Self { recipient, algorithm, ephemeral, wrapped })
    }
}
