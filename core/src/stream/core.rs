//! stream/core.rs
//! Public entry points: key resolution, call configuration and the two pipelines.

use std::io::{Read, Write};
use std::time::Instant;

use log::{debug, info, warn};

use crate::config::{CallConfig, CallOverrides, FormatConfig};
use crate::keys::material::{PublicKeyMaterial, UnlockedKey};
use crate::keys::resolver::KeyResolver;
use crate::provider;
use crate::stream::decode::{enter_decode, run_decode_pipeline, DecodePhase, DecodedMessage};
use crate::stream::encode::{enter_encode, run_encode_pipeline, EncodePhase, Signer};
use crate::stream::io::{open_input, open_output, InputSource, OutputSink};
use crate::telemetry::{Stage, TelemetrySnapshot};
use crate::types::PgpError;

/// Encoder/decoder bound to one static configuration.
///
/// Holds no per-call state; one instance may serve concurrent callers.
#[derive(Debug, Clone)]
pub struct PgpFormat {
    config: FormatConfig,
}

impl Default for PgpFormat {
    fn default() -> Self {
        provider::install();
        Self { config: FormatConfig::default() }
    }
}

impl PgpFormat {
    pub fn new(config: FormatConfig) -> Result<Self, PgpError> {
        config.validate()?;
        provider::install();
        Ok(Self { config })
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Encrypt (and optionally sign) `input` into `output`.
    ///
    /// On error the output may hold a partial message and must be discarded.
    pub fn encode<R: Read, W: Write>(
        &self,
        resolver: &dyn KeyResolver,
        overrides: &CallOverrides,
        input: R,
        output: W,
    ) -> Result<TelemetrySnapshot, PgpError> {
        let call = self.config.resolve(overrides)?;
        enter_encode(EncodePhase::Start);

        let t = Instant::now();
        let recipient = resolve_recipient(resolver, &call)?;
        let signer = resolve_signer(resolver, &call)?;
        let keys_time = t.elapsed();
        enter_encode(EncodePhase::KeyResolved);

        let signer_ref = signer
            .as_ref()
            .map(|(key, user_id)| Signer { key, user_id: user_id.as_str() });
        let mut snapshot = run_encode_pipeline(&call, &recipient, signer_ref, input, output).map_err(|e| {
            warn!("[ENCODE] failed ({}): {}", e.kind_name(), e);
            e
        })?;
        snapshot.add_outer_stage(Stage::Keys, keys_time);
        info!(
            "[ENCODE] {} plaintext bytes -> {} output bytes for {}{}",
            snapshot.counters.bytes_plaintext,
            snapshot.counters.bytes_ciphertext,
            recipient.user_id(),
            if signer.is_some() { " (signed)" } else { "" }
        );
        Ok(snapshot)
    }

    /// Decrypt `input`, verifying an embedded signature if there is one.
    ///
    /// Plaintext is only returned once decryption, integrity and signature
    /// checks have all passed.
    pub fn decode<R: Read>(
        &self,
        resolver: &dyn KeyResolver,
        overrides: &CallOverrides,
        input: R,
    ) -> Result<DecodedMessage, PgpError> {
        let call = self.config.resolve(overrides)?;
        enter_decode(DecodePhase::Start);

        let t = Instant::now();
        let key = resolve_decryption_key(resolver, &call)?;
        let keys_time = t.elapsed();
        enter_decode(DecodePhase::KeyResolved);

        let mut lookup = || resolve_verifier(resolver, &call);
        let mut result = run_decode_pipeline(&call, &key, &mut lookup, input);
        if let Ok(msg) = result.as_mut() {
            msg.telemetry.add_outer_stage(Stage::Keys, keys_time);
        }
        match &result {
            Ok(msg) => info!(
                "[DECODE] {} plaintext bytes recovered, signature {}",
                msg.plaintext.len(),
                if msg.signature.is_verified() { "verified" } else { "absent" }
            ),
            Err(PgpError::SignatureVerificationFailed(reason)) => {
                warn!("[DECODE] signature verification failed: {}", reason)
            }
            Err(e) => debug!("[DECODE] failed ({}): {}", e.kind_name(), e),
        }
        result
    }

    /// Encode between normalized sources and sinks.
    pub fn encode_stream(
        &self,
        resolver: &dyn KeyResolver,
        overrides: &CallOverrides,
        input: InputSource,
        output: OutputSink,
    ) -> Result<TelemetrySnapshot, PgpError> {
        let reader = open_input(input)?;
        let writer = open_output(output)?;
        self.encode(resolver, overrides, reader, writer)
    }

    /// Decode from a normalized source; the verified plaintext goes to `output`.
    pub fn decode_stream(
        &self,
        resolver: &dyn KeyResolver,
        overrides: &CallOverrides,
        input: InputSource,
        output: OutputSink,
    ) -> Result<DecodedMessage, PgpError> {
        let reader = open_input(input)?;
        let msg = self.decode(resolver, overrides, reader)?;
        let mut writer = open_output(output)?;
        writer.write_all(&msg.plaintext)?;
        writer.flush()?;
        Ok(msg)
    }
}

fn key_user_id(call: &CallConfig) -> Result<&str, PgpError> {
    call.key_user_id
        .as_deref()
        .ok_or_else(|| PgpError::MissingKey("no key user id configured".into()))
}

fn resolve_recipient(resolver: &dyn KeyResolver, call: &CallConfig) -> Result<PublicKeyMaterial, PgpError> {
    let user_id = key_user_id(call)?;
    resolver
        .public_key(&call.key_source, user_id)?
        .ok_or_else(|| PgpError::MissingKey(format!("no public key for '{}'", user_id)))
}

/// Signer key and user id, or `None` when signer credentials are incomplete.
fn resolve_signer(resolver: &dyn KeyResolver, call: &CallConfig) -> Result<Option<(UnlockedKey, String)>, PgpError> {
    let creds = match &call.signer {
        Some(c) => c,
        None => {
            if call.signing_skipped {
                warn!("[ENCODE] signer credentials incomplete, message will not be signed");
            }
            return Ok(None);
        }
    };
    let pair = resolver
        .key_pair(&creds.source, &creds.user_id)?
        .ok_or_else(|| PgpError::MissingKey(format!("no signing key for '{}'", creds.user_id)))?;
    let key = pair.unlock(&creds.passphrase)?;
    Ok(Some((key, creds.user_id.clone())))
}

fn resolve_decryption_key(resolver: &dyn KeyResolver, call: &CallConfig) -> Result<UnlockedKey, PgpError> {
    let user_id = key_user_id(call)?;
    let pair = resolver
        .key_pair(&call.key_source, user_id)?
        .ok_or_else(|| PgpError::MissingKey(format!("no private key for '{}'", user_id)))?;
    let passphrase = call.password.as_deref().unwrap_or_default();
    pair.unlock(passphrase).map_err(|e| match e {
        PgpError::BadPassphrase(reason) => {
            PgpError::MissingKey(format!("private key for '{}' could not be unlocked: {}", user_id, reason))
        }
        other => other,
    })
}

fn resolve_verifier(resolver: &dyn KeyResolver, call: &CallConfig) -> Result<PublicKeyMaterial, PgpError> {
    let (source, user_id) = call
        .verifier
        .as_ref()
        .ok_or_else(|| PgpError::MissingKey("message is signed but no signer user id is configured".into()))?;
    resolver
        .public_key(source, user_id)?
        .ok_or_else(|| PgpError::MissingKey(format!("no verification key for '{}'", user_id)))
}
