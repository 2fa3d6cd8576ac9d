// End-to-end encode -> decode through `PgpFormat`.
//
// * round trips: empty, small, multi-chunk, armored and binary
// * signing: verified, skipped on partial credentials, tampered, wrong signer
// * key policy: missing recipient, missing private key, wrong passphrase
// * integrity: flipped ciphertext and final tag bytes

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use pgp_core::config::{CallOverrides, FormatConfig};
    use pgp_core::keys::{KeyMaterial, LockParams, MemoryKeyring};
    use pgp_core::packet::{read_header, BodyLength, LiteralMetadata, LiteralWriter, Tag};
    use pgp_core::signature::{SignatureContext, SignatureStatus};
    use pgp_core::stream::{EnvelopeOptions, EnvelopeWriter, MessageLayers, PgpFormat};
    use pgp_core::telemetry::Stage;
    use pgp_core::types::PgpError;

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------
    const CREATED: u32 = 1_700_000_000;

    fn alice() -> KeyMaterial {
        KeyMaterial::from_secrets("Alice <alice@example.org>", CREATED, &[0x11; 32], &[0x12; 32], "alice-pass", LockParams::light())
            .unwrap()
    }

    fn bob() -> KeyMaterial {
        KeyMaterial::from_secrets("Bob <bob@example.org>", CREATED, &[0x21; 32], &[0x22; 32], "bob-pass", LockParams::light())
            .unwrap()
    }

    fn keyring() -> MemoryKeyring {
        MemoryKeyring::new().with_key(alice()).with_key(bob())
    }

    fn format() -> PgpFormat {
        let _ = env_logger::builder().is_test(true).try_init();
        PgpFormat::new(FormatConfig::default()).unwrap()
    }

    fn to_alice() -> CallOverrides {
        CallOverrides::new().key_user_id("alice@example.org")
    }

    fn as_alice() -> CallOverrides {
        CallOverrides::new().key_user_id("alice@example.org").password("alice-pass")
    }

    fn encode(fmt: &PgpFormat, ring: &MemoryKeyring, ov: &CallOverrides, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        fmt.encode(ring, ov, Cursor::new(data.to_vec()), &mut out).unwrap();
        out
    }

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    /// Offset of the first ciphertext byte in a binary message.
    fn first_ciphertext_offset(wire: &[u8]) -> usize {
        let mut cur = wire;
        let pkesk = read_header(&mut cur).unwrap().unwrap();
        assert!(pkesk.is(Tag::PublicKeyEncryptedSessionKey));
        let len = match pkesk.length {
            BodyLength::Fixed(n) => n as usize,
            other => panic!("unexpected PKESK length {:?}", other),
        };
        cur = &cur[len..];
        let seipd = read_header(&mut cur).unwrap().unwrap();
        assert!(seipd.is(Tag::SymEncryptedIntegrityProtectedData));
        // version, cipher, aead, chunk octet, salt
        wire.len() - cur.len() + 4 + 32
    }

    // ------------------------------------------------------------
    // Round trips
    // ------------------------------------------------------------
    #[test]
    fn roundtrip_small_binary() {
        let fmt = format();
        let ring = keyring();
        let data = b"attack at dawn".to_vec();

        let wire = encode(&fmt, &ring, &to_alice(), &data);
        assert_eq!(wire[0], 0xC0 | 1, "message starts with a session key packet");

        let msg = fmt.decode(&ring, &as_alice(), Cursor::new(wire)).unwrap();
        assert_eq!(msg.plaintext, data);
        assert_eq!(msg.signature, SignatureStatus::Unsigned);
        assert!(msg.literal.is_console());
        assert!(msg.layers.contains(MessageLayers::COMPRESSED));
        assert!(!msg.layers.contains(MessageLayers::ARMORED));
    }

    #[test]
    fn roundtrip_empty_payload() {
        let fmt = format();
        let ring = keyring();
        let wire = encode(&fmt, &ring, &to_alice(), b"");
        let msg = fmt.decode(&ring, &as_alice(), Cursor::new(wire)).unwrap();
        assert!(msg.plaintext.is_empty());
        assert_eq!(msg.telemetry.counters.bytes_plaintext, 0);
    }

    #[test]
    fn roundtrip_large_payload_multi_chunk() {
        let fmt = format();
        let ring = keyring();
        // Well above the working buffer, AEAD chunk and partial part sizes.
        let data = sample(600_000);
        let ov = to_alice().compression_algorithm(0);

        let mut out = Vec::new();
        let snap = fmt.encode(&ring, &ov, Cursor::new(data.clone()), &mut out).unwrap();
        assert!(snap.counters.aead_chunks > 1);
        assert_eq!(snap.counters.bytes_plaintext, data.len() as u64);
        assert_eq!(snap.counters.bytes_ciphertext, out.len() as u64);

        let msg = fmt.decode(&ring, &as_alice(), Cursor::new(out)).unwrap();
        assert_eq!(msg.plaintext, data);
        assert_eq!(msg.telemetry.counters.aead_chunks, snap.counters.aead_chunks);
    }

    #[test]
    fn roundtrip_every_cipher_and_compression() {
        let fmt = format();
        let ring = keyring();
        let data = sample(20_000);
        for sym in [7u8, 8, 9] {
            for comp in [0u8, 1, 2] {
                let ov = to_alice().symmetric_algorithm(sym).compression_algorithm(comp);
                let wire = encode(&fmt, &ring, &ov, &data);
                let msg = fmt.decode(&ring, &as_alice(), Cursor::new(wire)).unwrap();
                assert_eq!(msg.plaintext, data, "cipher {} compression {}", sym, comp);
            }
        }
    }

    /// AEAD mode octet of the encrypted data packet.
    fn seipd_aead_id(wire: &[u8]) -> u8 {
        wire[first_ciphertext_offset(wire) - 32 - 2]
    }

    fn roundtrip_in_mode(aead_id: u8) {
        let fmt = format();
        let ring = keyring();
        // Several 64 KiB chunks plus a short tail, signed.
        let data = sample(200_000);
        let ov = to_alice()
            .aead_algorithm(aead_id)
            .compression_algorithm(0)
            .signature_key_user_id("bob@example.org")
            .signature_password("bob-pass");
        let wire = encode(&fmt, &ring, &ov, &data);
        assert_eq!(seipd_aead_id(&wire), aead_id);

        let dec = as_alice().signature_key_user_id("bob@example.org");
        let msg = fmt.decode(&ring, &dec, Cursor::new(wire.clone())).unwrap();
        assert_eq!(msg.plaintext, data);
        assert!(msg.signature.is_verified());
        assert!(msg.telemetry.counters.aead_chunks > 1);

        let mut flipped = wire;
        let at = first_ciphertext_offset(&flipped) + 100;
        flipped[at] ^= 0x40;
        let err = fmt.decode(&ring, &dec, Cursor::new(flipped)).unwrap_err();
        assert!(matches!(err, PgpError::DecryptionFailed(_)), "{:?}", err);
    }

    #[test]
    fn roundtrip_ocb_mode() {
        roundtrip_in_mode(2);
    }

    #[test]
    fn roundtrip_eax_mode() {
        roundtrip_in_mode(1);
    }

    #[test]
    fn default_mode_is_gcm() {
        let fmt = format();
        let ring = keyring();
        let wire = encode(&fmt, &ring, &to_alice(), b"gcm");
        assert_eq!(seipd_aead_id(&wire), 3);
        assert!(matches!(
            fmt.encode(&ring, &to_alice().aead_algorithm(4), Cursor::new(vec![1]), &mut Vec::new()),
            Err(PgpError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn armored_and_binary_decode_to_same_plaintext() {
        let fmt = format();
        let ring = keyring();
        let data = sample(5_000);

        let binary = encode(&fmt, &ring, &to_alice(), &data);
        let armored = encode(&fmt, &ring, &to_alice().armored(true), &data);

        let text = String::from_utf8(armored.clone()).unwrap();
        assert!(text.starts_with("-----BEGIN PGP MESSAGE-----"));
        assert!(text.trim_end().ends_with("-----END PGP MESSAGE-----"));

        let a = fmt.decode(&ring, &as_alice(), Cursor::new(armored)).unwrap();
        let b = fmt.decode(&ring, &as_alice(), Cursor::new(binary)).unwrap();
        assert_eq!(a.plaintext, data);
        assert_eq!(b.plaintext, data);
        assert!(a.layers.contains(MessageLayers::ARMORED));
        assert!(!b.layers.contains(MessageLayers::ARMORED));
    }

    #[test]
    fn literal_file_name_is_carried() {
        let fmt = format();
        let ring = keyring();
        let wire = encode(&fmt, &ring, &to_alice().file_name("report.csv"), b"a,b\n1,2\n");
        let msg = fmt.decode(&ring, &as_alice(), Cursor::new(wire)).unwrap();
        assert_eq!(msg.literal.file_name, "report.csv");
        assert!(!msg.literal.is_console());
    }

    #[test]
    fn marker_packet_before_message_is_skipped() {
        let fmt = format();
        let ring = keyring();
        let wire = encode(&fmt, &ring, &to_alice(), b"hello");

        let mut with_marker = vec![0xC0 | 10, 3, b'P', b'G', b'P'];
        with_marker.extend_from_slice(&wire);
        let msg = fmt.decode(&ring, &as_alice(), Cursor::new(with_marker)).unwrap();
        assert_eq!(msg.plaintext, b"hello");
        assert!(msg.layers.contains(MessageLayers::MARKER));
    }

    // ------------------------------------------------------------
    // Signing
    // ------------------------------------------------------------
    #[test]
    fn signed_roundtrip_verifies() {
        let fmt = format();
        let ring = keyring();
        let data = sample(50_000);
        let ov = to_alice().signature_key_user_id("bob@example.org").signature_password("bob-pass");

        let mut wire = Vec::new();
        let snap = fmt.encode(&ring, &ov, Cursor::new(data.clone()), &mut wire).unwrap();
        assert!(snap.has_all_stages(&[Stage::Sign]));
        let unsigned = fmt.encode(&ring, &to_alice(), Cursor::new(data.clone()), &mut Vec::new()).unwrap();
        assert!(!unsigned.has_all_stages(&[Stage::Sign]));

        let dec = as_alice().signature_key_user_id("bob@example.org");
        let msg = fmt.decode(&ring, &dec, Cursor::new(wire)).unwrap();

        assert_eq!(msg.plaintext, data);
        assert!(msg.layers.contains(MessageLayers::SIGNED));
        match msg.signature {
            SignatureStatus::Verified(v) => {
                assert_eq!(v.signer, bob().public().signing_fingerprint());
                assert_eq!(v.user_id.as_deref(), Some("bob@example.org"));
                assert!(v.created.is_some());
            }
            other => panic!("expected verified signature, got {:?}", other),
        }
    }

    #[test]
    fn partial_signer_credentials_skip_signing() {
        let fmt = format();
        let ring = keyring();
        // Signer user id without passphrase.
        let ov = to_alice().signature_key_user_id("bob@example.org");

        let mut out = Vec::new();
        let snap = fmt.encode(&ring, &ov, Cursor::new(b"unsigned".to_vec()), &mut out).unwrap();
        assert_eq!(snap.counters.packets_one_pass, 0);
        assert_eq!(snap.counters.packets_signature, 0);

        let msg = fmt.decode(&ring, &as_alice(), Cursor::new(out)).unwrap();
        assert_eq!(msg.plaintext, b"unsigned");
        assert_eq!(msg.signature, SignatureStatus::Unsigned);
    }

    #[test]
    fn wrong_signer_passphrase_is_bad_passphrase() {
        let fmt = format();
        let ring = keyring();
        let ov = to_alice().signature_key_user_id("bob@example.org").signature_password("nope");
        let mut out = Vec::new();
        let err = fmt.encode(&ring, &ov, Cursor::new(b"x".to_vec()), &mut out).unwrap_err();
        assert!(matches!(err, PgpError::BadPassphrase(_)), "{:?}", err);
        assert!(out.is_empty(), "nothing is written before keys are resolved");
    }

    #[test]
    fn unknown_signer_is_missing_key() {
        let fmt = format();
        let ring = keyring();
        let ov = to_alice().signature_key_user_id("carol@example.org").signature_password("pw");
        let err = fmt.encode(&ring, &ov, Cursor::new(b"x".to_vec()), Vec::new()).unwrap_err();
        assert!(matches!(err, PgpError::MissingKey(_)), "{:?}", err);
    }

    #[test]
    fn verifying_against_other_signer_fails() {
        let fmt = format();
        let ring = keyring();
        let ov = to_alice().signature_key_user_id("bob@example.org").signature_password("bob-pass");
        let wire = encode(&fmt, &ring, &ov, b"signed by bob");

        let dec = as_alice().signature_key_user_id("alice@example.org");
        let err = fmt.decode(&ring, &dec, Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, PgpError::SignatureVerificationFailed(_)), "{:?}", err);
    }

    #[test]
    fn corrupted_signature_is_rejected() {
        let ring = keyring();
        let recipient = alice().public().clone();
        let signer = bob().unlock("bob-pass").unwrap();
        let data = b"payload covered by a broken signature";

        // Hand-assembled message whose signature has one flipped bit.
        let opts = EnvelopeOptions {
            armored: false,
            symmetric: pgp_core::crypto::SymmetricAlgorithm::Aes256,
            aead: pgp_core::crypto::AeadAlgorithm::Gcm,
            compression: pgp_core::compression::CompressionAlgorithm::Zip,
            chunk_size_octet: 10,
        };
        let mut env = EnvelopeWriter::open(Vec::new(), &recipient, &opts).unwrap();
        let mut ctx = SignatureContext::new(&signer, "bob@example.org", pgp_core::crypto::HashAlgorithm::Sha256).unwrap();
        ctx.one_pass().write_packet(&mut env).unwrap();
        {
            let mut lit = LiteralWriter::new(&mut env, &LiteralMetadata::console()).unwrap();
            lit.write_all(data).unwrap();
            lit.finish().unwrap();
        }
        ctx.update(data);
        let mut sig = ctx.finalize().unwrap();
        sig.signature[10] ^= 0x01;
        sig.write_packet(&mut env).unwrap();
        let (wire, _) = env.finish().unwrap();

        let fmt = format();
        let dec = as_alice().signature_key_user_id("bob@example.org");
        let err = fmt.decode(&ring, &dec, Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, PgpError::SignatureVerificationFailed(_)), "{:?}", err);
    }

    #[test]
    fn require_signature_rejects_unsigned() {
        let fmt = format();
        let ring = keyring();
        let wire = encode(&fmt, &ring, &to_alice(), b"plain");
        let err = fmt
            .decode(&ring, &as_alice().require_signature(true), Cursor::new(wire))
            .unwrap_err();
        assert!(matches!(err, PgpError::SignatureVerificationFailed(_)));
    }

    // ------------------------------------------------------------
    // Key policy
    // ------------------------------------------------------------
    #[test]
    fn encode_without_recipient_is_missing_key() {
        let fmt = format();
        let ring = keyring();
        let err = fmt
            .encode(&ring, &CallOverrides::new().key_user_id("nobody"), Cursor::new(vec![1]), Vec::new())
            .unwrap_err();
        assert!(matches!(err, PgpError::MissingKey(_)));

        let err = fmt.encode(&ring, &CallOverrides::new(), Cursor::new(vec![1]), Vec::new()).unwrap_err();
        assert!(matches!(err, PgpError::MissingKey(_)));
    }

    #[test]
    fn decode_without_private_key_is_missing_key() {
        let fmt = format();
        let ring = keyring();
        let wire = encode(&fmt, &ring, &to_alice(), b"secret");

        let public_only = MemoryKeyring::new().with_public(alice().public().clone());
        let err = fmt.decode(&public_only, &as_alice(), Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, PgpError::MissingKey(_)));
    }

    #[test]
    fn decode_with_wrong_passphrase_is_missing_key() {
        let fmt = format();
        let ring = keyring();
        let wire = encode(&fmt, &ring, &to_alice(), b"secret");
        let ov = CallOverrides::new().key_user_id("alice@example.org").password("wrong");
        let err = fmt.decode(&ring, &ov, Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, PgpError::MissingKey(_)));
    }

    #[test]
    fn decode_with_other_recipient_key_is_missing_key() {
        let fmt = format();
        let ring = keyring();
        let wire = encode(&fmt, &ring, &to_alice(), b"for alice only");
        let ov = CallOverrides::new().key_user_id("bob@example.org").password("bob-pass");
        let err = fmt.decode(&ring, &ov, Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, PgpError::MissingKey(_)));
    }

    // ------------------------------------------------------------
    // Integrity and structure
    // ------------------------------------------------------------
    #[test]
    fn flipped_ciphertext_bit_fails_decryption() {
        let fmt = format();
        let ring = keyring();
        let mut wire = encode(&fmt, &ring, &to_alice(), &sample(300));
        let at = first_ciphertext_offset(&wire) + 3;
        wire[at] ^= 0x04;
        let err = fmt.decode(&ring, &as_alice(), Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, PgpError::DecryptionFailed(_)), "{:?}", err);
    }

    #[test]
    fn flipped_final_tag_fails_decryption() {
        let fmt = format();
        let ring = keyring();
        let mut wire = encode(&fmt, &ring, &to_alice(), &sample(300));
        let last = wire.len() - 1;
        wire[last] ^= 0x80;
        let err = fmt.decode(&ring, &as_alice(), Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, PgpError::DecryptionFailed(_)), "{:?}", err);
    }

    #[test]
    fn truncated_message_is_rejected() {
        let fmt = format();
        let ring = keyring();
        let wire = encode(&fmt, &ring, &to_alice(), &sample(30_000));
        let cut = wire[..wire.len() - 40].to_vec();
        assert!(fmt.decode(&ring, &as_alice(), Cursor::new(cut)).is_err());
    }

    #[test]
    fn two_session_key_packets_are_malformed() {
        let fmt = format();
        let ring = keyring();
        let wire = encode(&fmt, &ring, &to_alice(), b"x");

        let mut cur = &wire[..];
        let h = read_header(&mut cur).unwrap().unwrap();
        let body_len = match h.length {
            BodyLength::Fixed(n) => n as usize,
            other => panic!("unexpected length {:?}", other),
        };
        let pkesk_len = wire.len() - cur.len() + body_len;
        let mut doubled = wire[..pkesk_len].to_vec();
        doubled.extend_from_slice(&wire);

        let err = fmt.decode(&ring, &as_alice(), Cursor::new(doubled)).unwrap_err();
        assert!(matches!(err, PgpError::MalformedMessage(_)), "{:?}", err);
    }

    #[test]
    fn garbage_and_empty_inputs_are_malformed() {
        let fmt = format();
        let ring = keyring();
        let err = fmt.decode(&ring, &as_alice(), Cursor::new(Vec::new())).unwrap_err();
        assert!(matches!(err, PgpError::MalformedMessage(_)));

        // Literal packet where encrypted data is expected.
        let err = fmt
            .decode(&ring, &as_alice(), Cursor::new(vec![0xC0 | 11, 1, b'b']))
            .unwrap_err();
        assert!(matches!(err, PgpError::MalformedMessage(_)));
    }

    #[test]
    fn unprotected_encrypted_data_is_unsupported() {
        let fmt = format();
        let ring = keyring();
        let err = fmt
            .decode(&ring, &as_alice(), Cursor::new(vec![0xC0 | 9, 2, 0, 0]))
            .unwrap_err();
        assert!(matches!(err, PgpError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn unsupported_algorithm_ids_fail_before_output() {
        let fmt = format();
        let ring = keyring();
        let mut out = Vec::new();
        let err = fmt
            .encode(&ring, &to_alice().symmetric_algorithm(3), Cursor::new(vec![1]), &mut out)
            .unwrap_err();
        assert!(matches!(err, PgpError::UnsupportedAlgorithm(_)));
        let err = fmt
            .encode(&ring, &to_alice().hash_algorithm(2), Cursor::new(vec![1]), &mut out)
            .unwrap_err();
        assert!(matches!(err, PgpError::UnsupportedAlgorithm(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn stream_sources_and_sinks() {
        use std::sync::{Arc, Mutex};
        use pgp_core::stream::{InputSource, OutputSink};

        let fmt = format();
        let ring = keyring();
        let cipher = Arc::new(Mutex::new(Vec::new()));
        fmt.encode_stream(
            &ring,
            &to_alice(),
            InputSource::Memory(b"via sinks".to_vec()),
            OutputSink::Memory(cipher.clone()),
        )
        .unwrap();

        let wire = cipher.lock().unwrap().clone();
        let plain = Arc::new(Mutex::new(Vec::new()));
        let msg = fmt
            .decode_stream(&ring, &as_alice(), InputSource::Memory(wire), OutputSink::Memory(plain.clone()))
            .unwrap();
        assert_eq!(msg.plaintext, b"via sinks");
        assert_eq!(plain.lock().unwrap().as_slice(), b"via sinks");
    }

    // Yields `total` bytes without ever holding them, counting what was handed out.
    struct LazyInput {
        total: u64,
        read: std::sync::Arc<std::sync::atomic::AtomicU64>,
    }

    impl std::io::Read for LazyInput {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            use std::sync::atomic::Ordering;
            let done = self.read.load(Ordering::SeqCst);
            let n = (self.total - done).min(buf.len() as u64) as usize;
            for (i, b) in buf[..n].iter_mut().enumerate() {
                *b = ((done + i as u64) * 31 % 251) as u8;
            }
            self.read.fetch_add(n as u64, Ordering::SeqCst);
            Ok(n)
        }
    }

    // Tracks the widest gap between plaintext read and ciphertext emitted.
    struct LagWriter {
        read: std::sync::Arc<std::sync::atomic::AtomicU64>,
        written: u64,
        max_lag: std::sync::Arc<std::sync::atomic::AtomicU64>,
    }

    impl Write for LagWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            use std::sync::atomic::Ordering;
            self.written += buf.len() as u64;
            let lag = self.read.load(Ordering::SeqCst).saturating_sub(self.written);
            self.max_lag.fetch_max(lag, Ordering::SeqCst);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn encode_memory_stays_bounded_for_large_input() {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::sync::Arc;
        use pgp_core::stream::{InputSource, OutputSink};

        const TOTAL: u64 = 16 * 1024 * 1024;
        // One AEAD chunk, the read buffer and one partial-length part, with slack.
        const BOUND: u64 = 256 * 1024;

        let fmt = format();
        let ring = keyring();
        let read = Arc::new(AtomicU64::new(0));
        let max_lag = Arc::new(AtomicU64::new(0));
        let input = LazyInput { total: TOTAL, read: read.clone() };
        let output = LagWriter { read: read.clone(), written: 0, max_lag: max_lag.clone() };

        let snap = fmt
            .encode_stream(
                &ring,
                &to_alice().compression_algorithm(0),
                InputSource::Reader(Box::new(input)),
                OutputSink::Writer(Box::new(output)),
            )
            .unwrap();

        assert_eq!(read.load(Ordering::SeqCst), TOTAL);
        assert_eq!(snap.counters.bytes_plaintext, TOTAL);
        assert!(snap.counters.aead_chunks > 1);
        let lag = max_lag.load(Ordering::SeqCst);
        assert!(lag < BOUND, "encoder buffered {} bytes, bound is {}", lag, BOUND);
    }
}

#[cfg(test)]
mod roundtrip_props {
    use std::io::Cursor;

    use proptest::prelude::*;

    use pgp_core::config::{CallOverrides, FormatConfig};
    use pgp_core::keys::{KeyMaterial, LockParams, MemoryKeyring};
    use pgp_core::stream::PgpFormat;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn any_payload_roundtrips(data in proptest::collection::vec(any::<u8>(), 0..40_000), armored in any::<bool>()) {
            let key = KeyMaterial::from_secrets("Prop <prop@example.org>", 1_700_000_000, &[7; 32], &[8; 32], "pw", LockParams::light()).unwrap();
            let ring = MemoryKeyring::new().with_key(key);
            let fmt = PgpFormat::new(FormatConfig::default()).unwrap();

            let mut wire = Vec::new();
            let ov = CallOverrides::new().key_user_id("prop").armored(armored);
            fmt.encode(&ring, &ov, Cursor::new(data.clone()), &mut wire).unwrap();

            let msg = fmt.decode(&ring, &CallOverrides::new().key_user_id("prop").password("pw"), Cursor::new(wire)).unwrap();
            prop_assert_eq!(msg.plaintext, data);
        }
    }
}
