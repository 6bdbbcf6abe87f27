use thiserror::Error;

/// Errors raised at the crypto capability boundary. The STF maps these onto the
/// specific consensus-error variant of the operation that invoked the verifier, keeping
/// the index of the first failing item when verifying a batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("ring-VRF proof invalid at batch index {0}")]
    BadRingProof(usize),

    #[error("ed25519 signature invalid")]
    BadSignature,

    #[error("malformed public key")]
    MalformedKey,

    #[error("malformed signature encoding")]
    MalformedSignature,

    #[error("ring commitment does not match the expected validator set")]
    RingCommitmentMismatch,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
