//! Ed25519 signature verification, used for guarantor, assurance, and dispute
//! judgement signatures.
//!
//! Thin wrappers around `ed25519_consensus::{SigningKey, VerificationKey}`. Unlike the
//! ring-VRF, Ed25519 has no external dependency that needs mocking out, so the state
//! transition function calls the real primitive directly.

use ed25519_consensus::{Signature, VerificationKey};

use crate::error::{CryptoError, Result};

/// Verify a single Ed25519 judgement signature over `context ‖ target`.
///
/// `public_key` and `signature` are raw 32- and 64-byte encodings respectively, as they
/// appear in the judgement extrinsic.
pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &[u8; 64]) -> Result<()> {
    let vk = VerificationKey::try_from(*public_key).map_err(|_| CryptoError::MalformedKey)?;
    let sig = Signature::try_from(*signature).map_err(|_| CryptoError::MalformedSignature)?;
    vk.verify(&sig, message)
        .map_err(|_| CryptoError::BadSignature)
}

/// Batch-verify a set of judgement signatures, preserving input order and aborting at
/// the first failure.
pub fn batch_verify(
    entries: &[(&[u8; 32], &[u8], &[u8; 64])],
) -> Result<()> {
    for (idx_public_key, message, signature) in entries {
        verify(idx_public_key, message, signature).map_err(|_| CryptoError::BadSignature)?;
    }
    Ok(())
}

/// Sign a message with a seed-derived Ed25519 signing key. Used only by tests to
/// produce fixtures; production judgement signatures originate off-chain.
#[cfg(any(test, feature = "test-signing"))]
pub fn sign(seed: &[u8; 32], message: &[u8]) -> ([u8; 32], [u8; 64]) {
    use ed25519_consensus::SigningKey;
    let sk = SigningKey::from(*seed);
    let vk = sk.verification_key();
    let sig = sk.sign(message);
    (vk.to_bytes(), sig.to_bytes())
}
