//! packet/seipd.rs
//! Symmetrically encrypted integrity protected data, version 2 (AEAD).
//!
//! Body: [2][sym][aead][chunk octet][salt 32] then chunks of ciphertext||tag,
//! then one final tag over the total plaintext length.
//!
//! Key schedule:
//!   ad              = [0xD2, 2, sym, aead, chunk octet]
//!   key || iv       = HKDF-SHA256(ikm = session key, salt, info = ad)
//!   nonce(i)        = iv || BE64(i)
//!   final tag       = seal("", nonce(#chunks), ad || BE64(total plaintext))

use std::io::{self, Read, Write};

use byteorder::ReadBytesExt;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::constants::{AEAD_TAG_LEN, MAX_CHUNK_SIZE_OCTET, SEIPD_SALT_LEN, SEIPD_VERSION_2};
use crate::crypto::aead::{chunk_nonce, AeadImpl};
use crate::crypto::kdf::derive_message_keys;
use crate::crypto::types::{AeadAlgorithm, SymmetricAlgorithm};
use crate::packet::types::Tag;
use crate::types::PgpError;
use crate::utils::ct_eq;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeipdHeader {
    pub symmetric: SymmetricAlgorithm,
    pub aead: AeadAlgorithm,
    pub chunk_octet: u8,
    pub salt: [u8; SEIPD_SALT_LEN],
}

impl SeipdHeader {
    /// Fresh AES-GCM header with a random salt.
    pub fn new(symmetric: SymmetricAlgorithm, chunk_octet: u8) -> Result<Self, PgpError> {
        if chunk_octet > MAX_CHUNK_SIZE_OCTET {
            return Err(PgpError::Config(format!("chunk size octet {} exceeds {}", chunk_octet, MAX_CHUNK_SIZE_OCTET)));
        }
        let mut salt = [0u8; SEIPD_SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Ok(Self { symmetric, aead: AeadAlgorithm::Gcm, chunk_octet, salt })
    }

    pub fn with_aead(mut self, aead: AeadAlgorithm) -> Self {
        self.aead = aead;
        self
    }

    pub fn chunk_size(&self) -> usize {
        1usize << (self.chunk_octet as u32 + 6)
    }

    pub fn associated_data(&self) -> [u8; 5] {
        [
            0xC0 | Tag::SymEncryptedIntegrityProtectedData as u8,
            SEIPD_VERSION_2,
            self.symmetric.id(),
            self.aead.id(),
            self.chunk_octet,
        ]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + SEIPD_SALT_LEN);
        out.push(SEIPD_VERSION_2);
        out.push(self.symmetric.id());
        out.push(self.aead.id());
        out.push(self.chunk_octet);
        out.extend_from_slice(&self.salt);
        out
    }

    pub fn read<R: Read>(r: &mut R) -> Result<Self, PgpError> {
        match r.read_u8()? {
            SEIPD_VERSION_2 => {}
            1 => return Err(PgpError::UnsupportedAlgorithm("encrypted data packet v1 (MDC)".into())),
            v => return Err(PgpError::MalformedMessage(format!("unknown encrypted data packet version {}", v))),
        }
        let symmetric = SymmetricAlgorithm::from_id(r.read_u8()?)?;
        let aead = AeadAlgorithm::from_id(r.read_u8()?)?;
        let chunk_octet = r.read_u8()?;
        if chunk_octet > MAX_CHUNK_SIZE_OCTET {
            return Err(PgpError::MalformedMessage(format!("chunk size octet {} out of range", chunk_octet)));
        }
        let mut salt = [0u8; SEIPD_SALT_LEN];
        r.read_exact(&mut salt)?;
        Ok(Self { symmetric, aead, chunk_octet, salt })
    }

    fn chunk_cipher(&self, session_key: &[u8]) -> Result<ChunkCipher, PgpError> {
        if session_key.len() != self.symmetric.key_len() {
            return Err(PgpError::DecryptionFailed(format!(
                "session key is {} bytes, {:?} needs {}",
                session_key.len(),
                self.symmetric,
                self.symmetric.key_len()
            )));
        }
        let ad = self.associated_data();
        let keys = derive_message_keys(session_key, &self.salt, &ad, self.symmetric.key_len(), self.aead.iv_len())?;
        let aead = AeadImpl::for_mode(self.aead, self.symmetric, &keys.key)?;
        Ok(ChunkCipher { aead, iv: keys.iv, ad })
    }
}

struct ChunkCipher {
    aead: AeadImpl,
    iv: Vec<u8>,
    ad: [u8; 5],
}

impl ChunkCipher {
    fn final_ad(&self, total: u64) -> [u8; 13] {
        let mut ad = [0u8; 13];
        ad[..5].copy_from_slice(&self.ad);
        ad[5..].copy_from_slice(&total.to_be_bytes());
        ad
    }

    fn seal_chunk(&self, index: u64, plaintext: &[u8]) -> Result<Vec<u8>, PgpError> {
        self.aead.seal(&chunk_nonce(&self.iv, index), &self.ad, plaintext)
    }

    fn open_chunk(&self, index: u64, ciphertext: &[u8]) -> Result<Vec<u8>, PgpError> {
        self.aead.open(&chunk_nonce(&self.iv, index), &self.ad, ciphertext).map_err(|_| {
            PgpError::DecryptionFailed(format!("authentication failed for chunk {}", index))
        })
    }

    fn final_tag(&self, index: u64, total: u64) -> Result<Vec<u8>, PgpError> {
        self.aead.seal(&chunk_nonce(&self.iv, index), &self.final_ad(total), &[])
    }

    fn check_final_tag(&self, index: u64, total: u64, tag: &[u8]) -> Result<(), PgpError> {
        let expected = self.final_tag(index, total)?;
        if !ct_eq(&expected, tag) {
            return Err(PgpError::DecryptionFailed("final authentication tag mismatch".into()));
        }
        Ok(())
    }
}

/// Encrypts plaintext into AEAD chunks; writes the packet body (header fields included).
pub struct AeadWriter<W: Write> {
    inner: W,
    cipher: ChunkCipher,
    chunk_size: usize,
    buf: Vec<u8>,
    index: u64,
    total: u64,
}

impl<W: Write> AeadWriter<W> {
    pub fn new(mut inner: W, header: &SeipdHeader, session_key: &[u8]) -> Result<Self, PgpError> {
        let cipher = header.chunk_cipher(session_key)?;
        inner.write_all(&header.to_bytes())?;
        let chunk_size = header.chunk_size();
        Ok(Self { inner, cipher, chunk_size, buf: Vec::with_capacity(chunk_size), index: 0, total: 0 })
    }

    fn seal_buffered(&mut self) -> io::Result<()> {
        let sealed = self.cipher.seal_chunk(self.index, &self.buf).map_err(PgpError::into_io)?;
        self.inner.write_all(&sealed)?;
        self.total += self.buf.len() as u64;
        self.index += 1;
        self.buf.clear();
        Ok(())
    }

    /// Seal the last partial chunk, append the final tag, return `(inner, chunks)`.
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        if !self.buf.is_empty() {
            self.seal_buffered()?;
        }
        let tag = self.cipher.final_tag(self.index, self.total).map_err(PgpError::into_io)?;
        self.inner.write_all(&tag)?;
        Ok((self.inner, self.index))
    }
}

impl<W: Write> Write for AeadWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut consumed = 0;
        while consumed < data.len() {
            if self.buf.len() == self.chunk_size {
                self.seal_buffered()?;
            }
            let take = (self.chunk_size - self.buf.len()).min(data.len() - consumed);
            self.buf.extend_from_slice(&data[consumed..consumed + take]);
            consumed += take;
        }
        Ok(consumed)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Decrypts and authenticates AEAD chunks from a packet body.
///
/// Holds back one chunk plus two tags so the last chunk is only released
/// once the final tag has been checked.
pub struct AeadReader<R: Read> {
    inner: R,
    cipher: ChunkCipher,
    chunk_size: usize,
    pending: Vec<u8>,
    out: Vec<u8>,
    out_pos: usize,
    index: u64,
    total: u64,
    eof: bool,
    done: bool,
}

impl<R: Read> AeadReader<R> {
    /// `inner` must be positioned just after the packet's header fields.
    pub fn new(inner: R, header: &SeipdHeader, session_key: &[u8]) -> Result<Self, PgpError> {
        let cipher = header.chunk_cipher(session_key)?;
        let chunk_size = header.chunk_size();
        Ok(Self {
            inner,
            cipher,
            chunk_size,
            pending: Vec::with_capacity(chunk_size + 2 * AEAD_TAG_LEN),
            out: Vec::new(),
            out_pos: 0,
            index: 0,
            total: 0,
            eof: false,
            done: false,
        })
    }

    pub fn chunks_read(&self) -> u64 {
        self.index
    }

    fn fill(&mut self) -> io::Result<()> {
        let window = self.chunk_size + 2 * AEAD_TAG_LEN;
        while self.pending.len() < window && !self.eof {
            let start = self.pending.len();
            self.pending.resize(window, 0);
            match self.inner.read(&mut self.pending[start..]) {
                Ok(0) => {
                    self.pending.truncate(start);
                    self.eof = true;
                }
                Ok(n) => self.pending.truncate(start + n),
                Err(e) => {
                    self.pending.truncate(start);
                    if e.kind() != io::ErrorKind::Interrupted {
                        return Err(e);
                    }
                }
            }
        }

        let sealed_chunk = self.chunk_size + AEAD_TAG_LEN;
        if self.pending.len() >= window {
            self.out = self.cipher.open_chunk(self.index, &self.pending[..sealed_chunk]).map_err(PgpError::into_io)?;
            self.pending.drain(..sealed_chunk);
        } else {
            if self.pending.len() < AEAD_TAG_LEN {
                return Err(PgpError::DecryptionFailed("encrypted data truncated".into()).into_io());
            }
            let split = self.pending.len() - AEAD_TAG_LEN;
            let mut last = Vec::new();
            if split > 0 {
                last = self.cipher.open_chunk(self.index, &self.pending[..split]).map_err(PgpError::into_io)?;
                self.index += 1;
                self.total += last.len() as u64;
            }
            self.cipher
                .check_final_tag(self.index, self.total, &self.pending[split..])
                .map_err(PgpError::into_io)?;
            self.pending.clear();
            self.done = true;
            self.out = last;
            self.out_pos = 0;
            return Ok(());
        }
        self.index += 1;
        self.total += self.out.len() as u64;
        self.out_pos = 0;
        Ok(())
    }
}

impl<R: Read> Read for AeadReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.out_pos < self.out.len() {
                let n = (self.out.len() - self.out_pos).min(buf.len());
                buf[..n].copy_from_slice(&self.out[self.out_pos..self.out_pos + n]);
                self.out_pos += n;
                return Ok(n);
            }
            if self.done || buf.is_empty() {
                return Ok(0);
            }
            self.fill()?;
        }
    }
}
