// One-pass signing and verification outside the message pipeline.

#[cfg(test)]
mod tests {
    use pgp_core::crypto::HashAlgorithm;
    use pgp_core::keys::{KeyMaterial, LockParams};
    use pgp_core::packet::{OnePassSignature, SignaturePacket, Subpacket};
    use pgp_core::signature::{SignatureContext, SignatureVerifier};
    use pgp_core::types::PgpError;

    fn signer() -> KeyMaterial {
        KeyMaterial::from_secrets("Sig <sig@example.org>", 1_650_000_000, &[9; 32], &[10; 32], "pw", LockParams::light())
            .unwrap()
    }

    fn sign(key: &KeyMaterial, hash: HashAlgorithm, data: &[u8]) -> (OnePassSignature, SignaturePacket) {
        let unlocked = key.unlock("pw").unwrap();
        let mut ctx = SignatureContext::new(&unlocked, "sig@example.org", hash).unwrap();
        let ops = ctx.one_pass();
        for piece in data.chunks(5) {
            ctx.update(piece);
        }
        assert_eq!(ctx.data_len(), data.len() as u64);
        (ops, ctx.finalize().unwrap())
    }

    fn verify(key: &KeyMaterial, ops: OnePassSignature, sig: &SignaturePacket, data: &[u8]) -> Result<(), PgpError> {
        let mut v = SignatureVerifier::new(ops, key.public())?;
        v.update(data);
        v.verify(sig).map(|_| ())
    }

    #[test]
    fn sign_then_verify_every_hash() {
        let key = signer();
        for hash in [HashAlgorithm::Sha256, HashAlgorithm::Sha384, HashAlgorithm::Sha512] {
            let (ops, sig) = sign(&key, hash, b"the quick brown fox");
            assert_eq!(ops.salt.len(), hash.salt_len());
            assert_eq!(sig.salt, ops.salt);

            let parsed = SignaturePacket::parse(&sig.to_body()).unwrap();
            assert_eq!(parsed, sig);
            verify(&key, ops, &parsed, b"the quick brown fox").unwrap();
        }
    }

    #[test]
    fn signature_carries_subpackets() {
        let key = signer();
        let (_, sig) = sign(&key, HashAlgorithm::Sha256, b"x");
        assert_eq!(sig.issuer_fingerprint(), Some(key.public().signing_fingerprint()));
        assert_eq!(sig.signer_user_id().as_deref(), Some("sig@example.org"));
        assert!(sig.creation_time().is_some());
        assert!(sig.hashed.iter().any(|sp| sp.critical));
    }

    #[test]
    fn altered_data_fails() {
        let key = signer();
        let (ops, sig) = sign(&key, HashAlgorithm::Sha256, b"original");
        let err = verify(&key, ops, &sig, b"0riginal").unwrap_err();
        assert!(matches!(err, PgpError::SignatureVerificationFailed(_)));
    }

    #[test]
    fn flipped_signature_bit_fails() {
        let key = signer();
        let (ops, mut sig) = sign(&key, HashAlgorithm::Sha256, b"payload");
        sig.signature[40] ^= 0x02;
        let err = verify(&key, ops, &sig, b"payload").unwrap_err();
        assert!(matches!(err, PgpError::SignatureVerificationFailed(_)));
    }

    #[test]
    fn unknown_critical_subpacket_fails() {
        let key = signer();
        let (ops, mut sig) = sign(&key, HashAlgorithm::Sha256, b"payload");
        sig.hashed.push(Subpacket { critical: true, kind: 99, data: vec![1] });
        let err = verify(&key, ops, &sig, b"payload").unwrap_err();
        assert!(matches!(err, PgpError::SignatureVerificationFailed(_)));
    }

    #[test]
    fn other_signer_is_rejected_up_front() {
        let key = signer();
        let other =
            KeyMaterial::from_secrets("Other <o@example.org>", 1_650_000_000, &[11; 32], &[12; 32], "pw", LockParams::light())
                .unwrap();
        let (ops, _) = sign(&key, HashAlgorithm::Sha256, b"payload");
        assert!(matches!(
            SignatureVerifier::new(ops, other.public()),
            Err(PgpError::SignatureVerificationFailed(_))
        ));
    }

    #[test]
    fn older_signature_versions_are_unsupported() {
        let mut body = vec![4u8, 0, 22, 8];
        body.extend_from_slice(&[0; 8]);
        assert!(matches!(SignaturePacket::parse(&body), Err(PgpError::UnsupportedAlgorithm(_))));
    }
}
