//! stream/decode.rs
//! Decode pipeline: (armor) -> session key -> AEAD -> decompress -> literal (+ signature).
//!
//! Every layer is read through a bounded reader borrowed from the one below,
//! so after the literal (and signature) are consumed each layer can be drained
//! in turn. Draining the AEAD reader checks the final authentication tag;
//! nothing is returned before that succeeds.

use std::fmt;
use std::io::{self, Read};
use std::time::Instant;

use bitflags::bitflags;
use byteorder::ReadBytesExt;
use log::{debug, warn};

use crate::armor::decode::MessageSource;
use crate::compression::stream::DecompressReader;
use crate::compression::types::CompressionAlgorithm;
use crate::config::CallConfig;
use crate::constants::MAX_CONTROL_PACKET_LEN;
use crate::crypto::ecdh::unwrap_session_key;
use crate::keys::material::{PublicKeyMaterial, UnlockedKey};
use crate::packet::header::read_header;
use crate::packet::literal::LiteralMetadata;
use crate::packet::one_pass::OnePassSignature;
use crate::packet::pkesk::Pkesk;
use crate::packet::reader::{read_body_to_vec, BodyReader};
use crate::packet::seipd::{AeadReader, SeipdHeader};
use crate::packet::signature::SignaturePacket;
use crate::packet::types::{PacketHeader, Tag};
use crate::signature::verify::SignatureVerifier;
use crate::signature::SignatureStatus;
use crate::stream::io::Counted;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::PgpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePhase {
    Start,
    KeyResolved,
    EncryptedDataParsed,
    SessionDecrypted,
    Decompressed,
    SignatureMarkerChecked,
    LiteralParsed,
    PayloadExtracted,
    VerifyIfSigned,
    Done,
}

impl fmt::Display for DecodePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecodePhase::Start                  => "start",
            DecodePhase::KeyResolved            => "key-resolved",
            DecodePhase::EncryptedDataParsed    => "encrypted-data-parsed",
            DecodePhase::SessionDecrypted       => "session-decrypted",
            DecodePhase::Decompressed           => "decompressed",
            DecodePhase::SignatureMarkerChecked => "signature-marker-checked",
            DecodePhase::LiteralParsed          => "literal-parsed",
            DecodePhase::PayloadExtracted       => "payload-extracted",
            DecodePhase::VerifyIfSigned         => "verify-if-signed",
            DecodePhase::Done                   => "done",
        };
        f.write_str(name)
    }
}

pub(crate) fn enter_decode(phase: DecodePhase) {
    debug!("[DECODE] -> {}", phase);
}

bitflags! {
    /// Layers observed while decoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MessageLayers: u8 {
        const ARMORED    = 0x01;
        const MARKER     = 0x02;
        const COMPRESSED = 0x04;
        const SIGNED     = 0x08;
    }
}

/// Result of a successful decode.
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    pub plaintext: Vec<u8>,
    pub literal: LiteralMetadata,
    pub signature: SignatureStatus,
    pub layers: MessageLayers,
    pub telemetry: TelemetrySnapshot,
}

/// Looks up the expected signer once a one-pass signature has been seen.
pub type SignerLookup<'a> = dyn FnMut() -> Result<PublicKeyMaterial, PgpError> + 'a;

fn next_header<R: Read>(r: &mut R, what: &str) -> Result<PacketHeader, PgpError> {
    read_header(r)?.ok_or_else(|| PgpError::MalformedMessage(format!("message ends before {}", what)))
}

fn expect(header: &PacketHeader, tag: Tag) -> Result<(), PgpError> {
    if header.is(tag) {
        return Ok(());
    }
    Err(PgpError::MalformedMessage(format!("expected {:?} packet, found tag {}", tag, header.tag)))
}

/// Read past marker/padding packets to the session key packet, then to the encrypted data.
fn read_session_key_packets<R: Read>(
    source: &mut R,
    layers: &mut MessageLayers,
    counters: &mut TelemetryCounters,
) -> Result<(Pkesk, PacketHeader), PgpError> {
    let mut pkesk = None;
    loop {
        let header = next_header(source, "encrypted data")?;
        match header.tag() {
            Some(tag @ (Tag::Marker | Tag::Padding)) => {
                if tag == Tag::Marker {
                    *layers |= MessageLayers::MARKER;
                }
                BodyReader::new(&mut *source, header.length).skip_rest()?;
                counters.add_packet(tag);
            }
            Some(Tag::PublicKeyEncryptedSessionKey) => {
                if pkesk.is_some() {
                    return Err(PgpError::MalformedMessage(
                        "messages with more than one recipient are not supported".into(),
                    ));
                }
                let body = read_body_to_vec(&mut *source, &header, MAX_CONTROL_PACKET_LEN)?;
                pkesk = Some(Pkesk::parse(&body)?);
                counters.add_packet(Tag::PublicKeyEncryptedSessionKey);
            }
            Some(Tag::SymEncryptedIntegrityProtectedData) => {
                let pkesk = pkesk.ok_or_else(|| {
                    PgpError::MalformedMessage("encrypted data without a session key packet".into())
                })?;
                return Ok((pkesk, header));
            }
            Some(Tag::SymmetricallyEncryptedData) => {
                return Err(PgpError::UnsupportedAlgorithm(
                    "encrypted data without integrity protection".into(),
                ));
            }
            _ => {
                return Err(PgpError::MalformedMessage(format!(
                    "expected encrypted data, found packet tag {}",
                    header.tag
                )))
            }
        }
    }
}

/// Run the full decode chain. The decryption key is already unlocked.
pub fn run_decode_pipeline<R: Read>(
    call: &CallConfig,
    key: &UnlockedKey,
    signer_lookup: &mut SignerLookup<'_>,
    input: R,
) -> Result<DecodedMessage, PgpError> {
    let mut timer = TelemetryTimer::new();
    let mut counters = TelemetryCounters::default();
    let mut layers = MessageLayers::empty();

    let t = Instant::now();
    let mut source = MessageSource::detect(Counted::new(input))?;
    if source.is_armored() {
        layers |= MessageLayers::ARMORED;
    }

    let (pkesk, seipd_header) = read_session_key_packets(&mut source, &mut layers, &mut counters)?;
    enter_decode(DecodePhase::EncryptedDataParsed);

    let fingerprint = key.public().encryption_fingerprint();
    if !pkesk.recipient.matches(&fingerprint) {
        return Err(PgpError::MissingKey(format!(
            "message is not encrypted to {} ({})",
            key.public().user_id(),
            fingerprint
        )));
    }
    let session_key = unwrap_session_key(
        key.decryption_secret(),
        key.public().encryption_key_bytes(),
        &pkesk.ephemeral,
        &pkesk.wrapped,
    )?;

    let mut seipd_body = BodyReader::new(&mut source, seipd_header.length);
    let seipd = SeipdHeader::read(&mut seipd_body)?;
    let mut plain = AeadReader::new(&mut seipd_body, &seipd, &session_key)?;
    counters.add_packet(Tag::SymEncryptedIntegrityProtectedData);
    enter_decode(DecodePhase::SessionDecrypted);

    let comp_header = next_header(&mut plain, "compressed data")?;
    expect(&comp_header, Tag::CompressedData)?;
    let mut comp_body = BodyReader::new(&mut plain, comp_header.length);
    let algorithm = CompressionAlgorithm::from_id(comp_body.read_u8()?)?;
    if algorithm != CompressionAlgorithm::Uncompressed {
        layers |= MessageLayers::COMPRESSED;
    }
    counters.add_packet(Tag::CompressedData);
    let mut comp_counted = Counted::new(&mut comp_body);
    let mut inner = DecompressReader::new(algorithm, &mut comp_counted)?;
    timer.add_stage_time(Stage::Decrypt, t.elapsed());
    enter_decode(DecodePhase::Decompressed);

    let mut header = next_header(&mut inner, "literal data")?;
    let mut verifier = None;
    if header.is(Tag::OnePassSignature) {
        let t = Instant::now();
        let body = read_body_to_vec(&mut inner, &header, MAX_CONTROL_PACKET_LEN)?;
        let ops = OnePassSignature::parse(&body)?;
        counters.add_packet(Tag::OnePassSignature);
        if !ops.last {
            return Err(PgpError::MalformedMessage("nested one-pass signatures are not supported".into()));
        }
        let signer = signer_lookup()?;
        verifier = Some(SignatureVerifier::new(ops, &signer)?);
        layers |= MessageLayers::SIGNED;
        timer.add_stage_time(Stage::Verify, t.elapsed());
        header = next_header(&mut inner, "literal data")?;
    }
    enter_decode(DecodePhase::SignatureMarkerChecked);

    expect(&header, Tag::LiteralData)?;
    let t = Instant::now();
    let (literal, plaintext) = {
        let mut body = BodyReader::new(&mut inner, header.length);
        let literal = LiteralMetadata::read_header(&mut body)?;
        debug!(
            "[DECODE] literal {:?} name={:?} modified={:?}",
            literal.format,
            literal.file_name,
            literal.modified()
        );
        enter_decode(DecodePhase::LiteralParsed);
        let mut plaintext = Vec::new();
        body.read_to_end(&mut plaintext)?;
        (literal, plaintext)
    };
    counters.add_packet(Tag::LiteralData);
    counters.add_plaintext(plaintext.len());
    timer.add_stage_time(Stage::Read, t.elapsed());
    enter_decode(DecodePhase::PayloadExtracted);

    let signature = match verifier {
        Some(mut v) => {
            let t = Instant::now();
            v.update(&plaintext);
            let sig_header = next_header(&mut inner, "signature")?;
            expect(&sig_header, Tag::Signature)?;
            let body = read_body_to_vec(&mut inner, &sig_header, MAX_CONTROL_PACKET_LEN)?;
            let packet = SignaturePacket::parse(&body)?;
            counters.add_packet(Tag::Signature);
            let verified = v.verify(&packet)?;
            timer.add_stage_time(Stage::Verify, t.elapsed());
            SignatureStatus::Verified(verified)
        }
        None if call.require_signature => {
            return Err(PgpError::SignatureVerificationFailed("message is not signed".into()));
        }
        None => SignatureStatus::Unsigned,
    };
    enter_decode(DecodePhase::VerifyIfSigned);

    // Drain every layer so the final AEAD tag is checked.
    let t = Instant::now();
    let trailing = io::copy(&mut inner, &mut io::sink())?;
    drop(inner);
    let (rest, consumed) = comp_counted.into_parts();
    counters.bytes_compressed = consumed + rest.skip_rest()?;
    drop(comp_body);
    io::copy(&mut plain, &mut io::sink())?;
    counters.aead_chunks = plain.chunks_read();
    drop(plain);
    seipd_body.skip_rest()?;
    drop(seipd_body);
    if trailing > 0 {
        warn!("[DECODE] {} bytes of trailing packet data after the literal were ignored", trailing);
    }
    while let Some(extra) = read_header(&mut source)? {
        debug!("[DECODE] skipping trailing packet with tag {}", extra.tag);
        BodyReader::new(&mut source, extra.length).skip_rest()?;
        counters.packets_skipped += 1;
    }
    counters.bytes_ciphertext = source.into_inner().count();
    timer.add_stage_time(Stage::Finalize, t.elapsed());

    timer.finish();
    enter_decode(DecodePhase::Done);
    Ok(DecodedMessage {
        plaintext,
        literal,
        signature,
        layers,
        telemetry: TelemetrySnapshot::from(&counters, &timer),
    })
}
