//! packet/signature.rs
//! v6 signature packet and its subpackets.
//!
//! [6][type][pk alg][hash][BE32 hashed len][hashed subpackets]
//! [BE32 unhashed len][unhashed subpackets][left16 2][salt len][salt][sig 64]

use std::io::{self, Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt};

use crate::constants::{subpacket_ids, ED25519_SIGNATURE_LEN, FINGERPRINT_LEN, KEY_VERSION_6, SIGNATURE_VERSION_6};
use crate::crypto::types::{HashAlgorithm, PublicKeyAlgorithm};
use crate::keys::fingerprint::Fingerprint;
use crate::packet::header::write_packet;
use crate::packet::types::Tag;
use crate::types::PgpError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subpacket {
    pub critical: bool,
    pub kind: u8,
    pub data: Vec<u8>,
}

impl Subpacket {
    pub fn creation_time(ts: u32) -> Self {
        Self { critical: true, kind: subpacket_ids::CREATION_TIME, data: ts.to_be_bytes().to_vec() }
    }

    pub fn issuer_fingerprint(fp: &Fingerprint) -> Self {
        let mut data = Vec::with_capacity(1 + FINGERPRINT_LEN);
        data.push(KEY_VERSION_6);
        data.extend_from_slice(fp.as_bytes());
        Self { critical: false, kind: subpacket_ids::ISSUER_FINGERPRINT, data }
    }

    pub fn signer_user_id(user_id: &str) -> Self {
        Self { critical: false, kind: subpacket_ids::SIGNER_USER_ID, data: user_id.as_bytes().to_vec() }
    }

    /// Subpacket types this crate interprets.
    pub fn is_known(&self) -> bool {
        matches!(
            self.kind,
            subpacket_ids::CREATION_TIME | subpacket_ids::ISSUER_FINGERPRINT | subpacket_ids::SIGNER_USER_ID
        )
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        let len = self.data.len() + 1;
        if len < 192 {
            out.push(len as u8);
        } else if len < 8384 {
            let v = len - 192;
            out.push(((v >> 8) + 192) as u8);
            out.push((v & 0xFF) as u8);
        } else {
            out.push(0xFF);
            out.extend_from_slice(&(len as u32).to_be_bytes());
        }
        out.push(if self.critical { 0x80 | self.kind } else { self.kind });
        out.extend_from_slice(&self.data);
    }
}

fn encode_area(subpackets: &[Subpacket]) -> Vec<u8> {
    let mut out = Vec::new();
    for sp in subpackets {
        sp.write_to(&mut out);
    }
    out
}

fn parse_area(area: &[u8]) -> Result<Vec<Subpacket>, PgpError> {
    let mut r = Cursor::new(area);
    let mut out = Vec::new();
    while (r.position() as usize) < area.len() {
        let first = r.read_u8()?;
        let len = match first {
            0..=191 => first as usize,
            192..=254 => ((first as usize - 192) << 8) + r.read_u8()? as usize + 192,
            255 => r.read_u32::<BigEndian>()? as usize,
        };
        if len == 0 {
            return Err(PgpError::MalformedMessage("zero-length signature subpacket".into()));
        }
        let remaining = area.len() - r.position() as usize;
        if len > remaining {
            return Err(PgpError::MalformedMessage(format!(
                "signature subpacket length {} exceeds remaining area {}",
                len, remaining
            )));
        }
        let kind = r.read_u8()?;
        let mut data = vec![0u8; len - 1];
        r.read_exact(&mut data)?;
        out.push(Subpacket { critical: kind & 0x80 != 0, kind: kind & 0x7F, data });
    }
    Ok(out)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignaturePacket {
    pub sig_type: u8,
    pub pubkey: PublicKeyAlgorithm,
    pub hash: HashAlgorithm,
    pub hashed: Vec<Subpacket>,
    pub unhashed: Vec<Subpacket>,
    pub left16: [u8; 2],
    pub salt: Vec<u8>,
    pub signature: [u8; ED25519_SIGNATURE_LEN],
}

impl SignaturePacket {
    /// Version, type, algorithms and hashed area: the part covered by the hash.
    pub fn hashed_prefix(&self) -> Vec<u8> {
        let area = encode_area(&self.hashed);
        let mut out = Vec::with_capacity(8 + area.len());
        out.push(SIGNATURE_VERSION_6);
        out.push(self.sig_type);
        out.push(self.pubkey.id());
        out.push(self.hash.id());
        out.extend_from_slice(&(area.len() as u32).to_be_bytes());
        out.extend_from_slice(&area);
        out
    }

    /// Trailer hashed after the prefix: 0x06 0xFF BE32(prefix length).
    pub fn hash_trailer(prefix_len: usize) -> [u8; 6] {
        let len = (prefix_len as u32).to_be_bytes();
        [SIGNATURE_VERSION_6, 0xFF, len[0], len[1], len[2], len[3]]
    }

    pub fn to_body(&self) -> Vec<u8> {
        let mut out = self.hashed_prefix();
        let unhashed = encode_area(&self.unhashed);
        out.extend_from_slice(&(unhashed.len() as u32).to_be_bytes());
        out.extend_from_slice(&unhashed);
        out.extend_from_slice(&self.left16);
        out.push(self.salt.len() as u8);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.signature);
        out
    }

    pub fn write_packet<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        write_packet(w, Tag::Signature, &self.to_body())
    }

    pub fn parse(body: &[u8]) -> Result<Self, PgpError> {
        let mut r = Cursor::new(body);
        match r.read_u8()? {
            SIGNATURE_VERSION_6 => {}
            v @ (3 | 4) => return Err(PgpError::UnsupportedAlgorithm(format!("signature v{}", v))),
            v => return Err(PgpError::MalformedMessage(format!("unknown signature version {}", v))),
        }
        let sig_type = r.read_u8()?;
        let pubkey = PublicKeyAlgorithm::from_id(r.read_u8()?)?;
        if pubkey != PublicKeyAlgorithm::Ed25519 {
            return Err(PgpError::UnsupportedAlgorithm(format!("signature made with {:?}", pubkey)));
        }
        let hash = HashAlgorithm::from_id(r.read_u8()?)?;

        let hashed = read_area(&mut r)?;
        let unhashed = read_area(&mut r)?;

        let mut left16 = [0u8; 2];
        r.read_exact(&mut left16)?;
        let salt_len = r.read_u8()? as usize;
        if salt_len != hash.salt_len() {
            return Err(PgpError::MalformedMessage(format!(
                "signature salt is {} bytes, {:?} needs {}",
                salt_len,
                hash,
                hash.salt_len()
            )));
        }
        let mut salt = vec![0u8; salt_len];
        r.read_exact(&mut salt)?;
        let mut signature = [0u8; ED25519_SIGNATURE_LEN];
        r.read_exact(&mut signature)?;
        if (r.position() as usize) != body.len() {
            return Err(PgpError::MalformedMessage("trailing bytes in signature packet".into()));
        }

        Ok(Self {
            sig_type,
            pubkey,
            hash,
            hashed: parse_area(&hashed)?,
            unhashed: parse_area(&unhashed)?,
            left16,
            salt,
            signature,
        })
    }

    fn find_hashed(&self, kind: u8) -> Option<&Subpacket> {
        self.hashed.iter().find(|sp| sp.kind == kind)
    }

    pub fn creation_time(&self) -> Option<u32> {
        let sp = self.find_hashed(subpacket_ids::CREATION_TIME)?;
        let bytes: [u8; 4] = sp.data.as_slice().try_into().ok()?;
        Some(u32::from_be_bytes(bytes))
    }

    /// Issuer fingerprint, hashed area first, then unhashed.
    pub fn issuer_fingerprint(&self) -> Option<Fingerprint> {
        let sp = self
            .find_hashed(subpacket_ids::ISSUER_FINGERPRINT)
            .or_else(|| self.unhashed.iter().find(|sp| sp.kind == subpacket_ids::ISSUER_FINGERPRINT))?;
        match sp.data.split_first() {
            Some((&KEY_VERSION_6, fp)) => Fingerprint::from_slice(fp),
            _ => None,
        }
    }

    pub fn signer_user_id(&self) -> Option<String> {
        self.find_hashed(subpacket_ids::SIGNER_USER_ID)
            .map(|sp| String::from_utf8_lossy(&sp.data).into_owned())
    }
}

fn read_area(r: &mut Cursor<&[u8]>) -> Result<Vec<u8>, PgpError> {
    let len = r.read_u32::<BigEndian>()? as u64;
    let left = r.get_ref().len() as u64 - r.position();
    if len > left {
        return Err(PgpError::MalformedMessage("subpacket area overruns signature packet".into()));
    }
    let mut area = vec![0u8; len as usize];
    r.read_exact(&mut area)?;
    Ok(area)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SignaturePacket {
        SignaturePacket {
            sig_type: 0,
            pubkey: PublicKeyAlgorithm::Ed25519,
            hash: HashAlgorithm::Sha512,
            hashed: vec![
                Subpacket::creation_time(1_700_000_000),
                Subpacket::issuer_fingerprint(&Fingerprint([7; 32])),
                Subpacket::signer_user_id("alice@example.org"),
            ],
            unhashed: vec![],
            left16: [0xAB, 0xCD],
            salt: vec![1; 32],
            signature: [2; 64],
        }
    }

    #[test]
    fn hashed_prefix_layout() {
        let prefix = sample().hashed_prefix();
        assert_eq!(&prefix[..4], &[6, 0, 27, 10]);
        // creation time subpacket is [5, 0x82, t4]
        assert_eq!(&prefix[8..10], &[5, 0x82]);
        assert_eq!(SignaturePacket::hash_trailer(prefix.len())[..2], [0x06, 0xFF]);
    }

    #[test]
    fn accessors_read_subpackets() {
        let parsed = SignaturePacket::parse(&sample().to_body()).unwrap();
        assert_eq!(parsed, sample());
        assert_eq!(parsed.creation_time(), Some(1_700_000_000));
        assert_eq!(parsed.issuer_fingerprint(), Some(Fingerprint([7; 32])));
        assert_eq!(parsed.signer_user_id().as_deref(), Some("alice@example.org"));
    }

    #[test]
    fn long_subpacket_uses_two_octet_length() {
        let sp = Subpacket::signer_user_id(&"u".repeat(300));
        let mut out = Vec::new();
        sp.write_to(&mut out);
        assert_eq!(out[0], 192);
        assert_eq!(parse_area(&out).unwrap(), vec![sp]);
    }

    #[test]
    fn oversized_subpacket_length_is_malformed() {
        // Five-octet length claiming 4 GiB over a three-byte area.
        let area = [255u8, 0xFF, 0xFF, 0xFF, 0xFF, 2, 0, 0];
        assert!(matches!(parse_area(&area), Err(PgpError::MalformedMessage(_))));
        // One-octet length one past the end.
        assert!(matches!(parse_area(&[4u8, 2, 0, 0]), Err(PgpError::MalformedMessage(_))));
    }

    #[test]
    fn v4_signature_is_unsupported() {
        let mut body = sample().to_body();
        body[0] = 4;
        assert!(matches!(SignaturePacket::parse(&body), Err(PgpError::UnsupportedAlgorithm(_))));
    }
}
