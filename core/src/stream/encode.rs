//! stream/encode.rs
//! Encode pipeline: plaintext -> literal -> (signed) -> compressed -> AEAD -> armor.
//!
//! Writer chain, outermost first:
//!   LiteralWriter -> EnvelopeWriter [ CompressWriter -> compressed PacketWriter
//!   -> AeadWriter -> SEIPD PacketWriter -> ArmorSink -> output ]
//!
//! Every stage owns the next one and returns it from `finish`, so closing
//! runs innermost-to-outermost. On an early error the chain is dropped and
//! no signature packet is written.

use std::fmt;
use std::io::{self, Read, Write};
use std::time::Instant;

use byteorder::WriteBytesExt;
use log::debug;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::armor::encode::ArmorSink;
use crate::compression::stream::CompressWriter;
use crate::compression::types::CompressionAlgorithm;
use crate::config::CallConfig;
use crate::crypto::ecdh::wrap_session_key;
use crate::crypto::types::{AeadAlgorithm, SymmetricAlgorithm};
use crate::keys::material::{PublicKeyMaterial, UnlockedKey};
use crate::packet::literal::LiteralWriter;
use crate::packet::pkesk::Pkesk;
use crate::packet::seipd::{AeadWriter, SeipdHeader};
use crate::packet::types::Tag;
use crate::packet::writer::PacketWriter;
use crate::signature::sign::SignatureContext;
use crate::stream::io::Counted;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::PgpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodePhase {
    Start,
    KeyResolved,
    StreamsOpened,
    SignerInitialized,
    LiteralOpened,
    Streaming,
    LiteralClosed,
    SignatureEmitted,
    StreamsClosed,
    Done,
}

impl fmt::Display for EncodePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EncodePhase::Start             => "start",
            EncodePhase::KeyResolved       => "key-resolved",
            EncodePhase::StreamsOpened     => "streams-opened",
            EncodePhase::SignerInitialized => "signer-initialized",
            EncodePhase::LiteralOpened     => "literal-opened",
            EncodePhase::Streaming         => "streaming",
            EncodePhase::LiteralClosed     => "literal-closed",
            EncodePhase::SignatureEmitted  => "signature-emitted",
            EncodePhase::StreamsClosed     => "streams-closed",
            EncodePhase::Done              => "done",
        };
        f.write_str(name)
    }
}

pub(crate) fn enter_encode(phase: EncodePhase) {
    debug!("[ENCODE] -> {}", phase);
}

/// Envelope parameters taken from the resolved call configuration.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeOptions {
    pub armored: bool,
    pub symmetric: SymmetricAlgorithm,
    pub aead: AeadAlgorithm,
    pub compression: CompressionAlgorithm,
    pub chunk_size_octet: u8,
}

impl From<&CallConfig> for EnvelopeOptions {
    fn from(call: &CallConfig) -> Self {
        Self {
            armored: call.armored,
            symmetric: call.algorithms.symmetric,
            aead: call.algorithms.aead,
            compression: call.algorithms.compression,
            chunk_size_octet: call.chunk_size_octet,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvelopeStats {
    pub bytes_compressed: u64,
    pub bytes_ciphertext: u64,
    pub aead_chunks: u64,
}

type Sink<W> = ArmorSink<Counted<W>>;
type Encrypted<W> = AeadWriter<PacketWriter<Sink<W>>>;
type Compressed<W> = CompressWriter<Counted<PacketWriter<Encrypted<W>>>>;

/// Encrypted, compressed envelope for one recipient.
///
/// Bytes written go into the compressed data packet; callers write the
/// one-pass signature, literal and signature packets through it.
pub struct EnvelopeWriter<W: Write> {
    stage: Compressed<W>,
}

impl<W: Write> EnvelopeWriter<W> {
    /// Writes the session key packet and opens the encrypted and compressed layers.
    pub fn open(output: W, recipient: &PublicKeyMaterial, opts: &EnvelopeOptions) -> Result<Self, PgpError> {
        let mut sink = ArmorSink::new(Counted::new(output), opts.armored)?;

        let mut session_key = Zeroizing::new(vec![0u8; opts.symmetric.key_len()]);
        OsRng.fill_bytes(&mut session_key);
        let wrapped = wrap_session_key(recipient.encryption_key_bytes(), &session_key)?;
        Pkesk::for_key(&recipient.encryption_fingerprint(), wrapped.ephemeral, wrapped.wrapped)
            .write_packet(&mut sink)?;

        let seipd = PacketWriter::new(sink, Tag::SymEncryptedIntegrityProtectedData)?;
        let header = SeipdHeader::new(opts.symmetric, opts.chunk_size_octet)?.with_aead(opts.aead);
        let aead = AeadWriter::new(seipd, &header, &session_key)?;

        let mut compressed = PacketWriter::new(aead, Tag::CompressedData)?;
        compressed.write_u8(opts.compression.id())?;
        let stage = CompressWriter::new(opts.compression, Counted::new(compressed))?;

        debug!(
            "[ENCODE] envelope for {} ({}): {:?}/{:?}, {:?}, armored={}",
            recipient.user_id(),
            recipient.encryption_fingerprint(),
            opts.symmetric,
            opts.aead,
            opts.compression,
            opts.armored
        );
        Ok(Self { stage })
    }

    /// Close every layer and return the output writer.
    pub fn finish(self) -> Result<(W, EnvelopeStats), PgpError> {
        let counted = self.stage.finish()?;
        let (compressed, bytes_compressed) = counted.into_parts();
        let aead = compressed.finish()?;
        let (seipd, aead_chunks) = aead.finish()?;
        let sink = seipd.finish()?;
        let counted = sink.finish()?;
        let (mut output, bytes_ciphertext) = counted.into_parts();
        output.flush()?;
        Ok((output, EnvelopeStats { bytes_compressed, bytes_ciphertext, aead_chunks }))
    }
}

impl<W: Write> Write for EnvelopeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stage.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stage.flush()
    }
}

/// Signer for one call: unlocked key plus the user id placed in the signature.
pub struct Signer<'a> {
    pub key: &'a UnlockedKey,
    pub user_id: &'a str,
}

/// Run the full encode chain. Keys are already resolved.
pub fn run_encode_pipeline<R: Read, W: Write>(
    call: &CallConfig,
    recipient: &PublicKeyMaterial,
    signer: Option<Signer<'_>>,
    mut input: R,
    output: W,
) -> Result<TelemetrySnapshot, PgpError> {
    let mut timer = TelemetryTimer::new();
    let mut counters = TelemetryCounters::default();

    let mut envelope = EnvelopeWriter::open(output, recipient, &EnvelopeOptions::from(call))?;
    counters.add_packet(Tag::PublicKeyEncryptedSessionKey);
    enter_encode(EncodePhase::StreamsOpened);

    let mut signature = match signer {
        Some(s) => {
            let ctx = SignatureContext::new(s.key, s.user_id, call.algorithms.hash)?;
            ctx.one_pass().write_packet(&mut envelope)?;
            counters.add_packet(Tag::OnePassSignature);
            enter_encode(EncodePhase::SignerInitialized);
            Some(ctx)
        }
        None => None,
    };

    let literal_meta = call.literal_metadata();
    let mut literal = LiteralWriter::new(&mut envelope, &literal_meta)?;
    enter_encode(EncodePhase::LiteralOpened);

    enter_encode(EncodePhase::Streaming);
    let mut buf = vec![0u8; call.buffer_size];
    loop {
        let t = Instant::now();
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        timer.add_stage_time(Stage::Read, t.elapsed());

        let t = Instant::now();
        literal.write_all(&buf[..n])?;
        literal.flush()?;
        timer.add_stage_time(Stage::Write, t.elapsed());

        if let Some(ctx) = signature.as_mut() {
            timer.time(Stage::Sign, || ctx.update(&buf[..n]));
        }
        counters.add_plaintext(n);
    }

    literal.finish()?;
    counters.add_packet(Tag::LiteralData);
    enter_encode(EncodePhase::LiteralClosed);

    if let Some(ctx) = signature.take() {
        timer.time(Stage::Sign, || -> Result<(), PgpError> {
            ctx.finalize()?.write_packet(&mut envelope)?;
            Ok(())
        })?;
        counters.add_packet(Tag::Signature);
        enter_encode(EncodePhase::SignatureEmitted);
    }

    let t = Instant::now();
    let (_output, stats) = envelope.finish()?;
    timer.add_stage_time(Stage::Finalize, t.elapsed());
    counters.add_packet(Tag::CompressedData);
    counters.add_packet(Tag::SymEncryptedIntegrityProtectedData);
    counters.bytes_compressed = stats.bytes_compressed;
    counters.bytes_ciphertext = stats.bytes_ciphertext;
    counters.aead_chunks = stats.aead_chunks;
    enter_encode(EncodePhase::StreamsClosed);

    drop(input);
    timer.finish();
    enter_encode(EncodePhase::Done);
    Ok(TelemetrySnapshot::from(&counters, &timer))
}
