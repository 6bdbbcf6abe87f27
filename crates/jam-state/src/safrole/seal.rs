//! Block-seal verification and the fallback key sequence.

use jam_crypto::{CryptoError, RingVrfInput, RingVrfVerifier};
use jam_primitives::hash::Hash;

use crate::error::{Result, StfError};
use crate::safrole::tickets::Ticket;
use crate::shuffle::fisher_yates_shuffle;
use crate::types::ValidatorDescriptor;

const SEAL_CONTEXT: &[u8] = b"jam_block_seal";

/// γ.s: either a slot-indexed sequence of epoch tickets, or a fallback sequence of
/// raw Bandersnatch keys when the ticket accumulator did not fill by the epoch
/// boundary. Either way its length always equals the epoch length.
#[derive(Debug, Clone)]
pub enum SealKeys {
    Tickets(Vec<Ticket>),
    Fallback(Vec<[u8; 32]>),
}

impl SealKeys {
    pub fn len(&self) -> usize {
        match self {
            SealKeys::Tickets(t) => t.len(),
            SealKeys::Fallback(k) => k.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the fallback key sequence for an epoch: Fisher-Yates shuffle the active
/// validator set's Bandersnatch keys with `entropy`, then cycle through the permuted
/// list to produce exactly `epoch_length` entries (the shuffle's natural output length
/// is the validator count, which need not equal the epoch length).
pub fn fallback_key_sequence(
    entropy: &Hash,
    active_validators: &[ValidatorDescriptor],
    epoch_length: u32,
) -> Vec<[u8; 32]> {
    let keys: Vec<[u8; 32]> = active_validators.iter().map(|v| v.bandersnatch).collect();
    if keys.is_empty() {
        return Vec::new();
    }
    let shuffled = fisher_yates_shuffle(entropy, &keys);
    let n = shuffled.len();
    (0..epoch_length as usize).map(|i| shuffled[i % n]).collect()
}

fn seal_message(eta3: &Hash, attempt: u8) -> Vec<u8> {
    let mut message = Vec::with_capacity(SEAL_CONTEXT.len() + 32 + 1);
    message.extend_from_slice(SEAL_CONTEXT);
    message.extend_from_slice(eta3);
    message.push(attempt);
    message
}

/// Verify a block's seal signature against the epoch's seal key sequence at
/// `slot_in_epoch`, and return the VRF output to fold into `η₀`.
///
/// In ticket mode, the signature must reproduce the ticket id already committed at
/// that slot index. In fallback mode, the signature is checked against the same
/// ring commitment with attempt fixed at zero; there is no ticket id to cross-check
/// against, since the slot's claim to produce *is* the fallback key itself.
pub fn verify_seal(
    seal_keys: &SealKeys,
    slot_in_epoch: u32,
    eta3: &Hash,
    ring_commitment: &[u8],
    signature: &[u8],
    verifier: &dyn RingVrfVerifier,
) -> Result<Hash> {
    let index = slot_in_epoch as usize;
    if index >= seal_keys.len() {
        return Err(StfError::BadSealIndex);
    }

    let attempt = match seal_keys {
        SealKeys::Tickets(tickets) => tickets[index].attempt,
        SealKeys::Fallback(_) => 0,
    };

    let input = RingVrfInput {
        message: seal_message(eta3, attempt),
        signature: signature.to_vec(),
    };
    let outputs = verifier
        .batch_verify(ring_commitment, std::slice::from_ref(&input))
        .map_err(|err| match err {
            CryptoError::BadRingProof(_) => StfError::BadSeal,
            other => StfError::Crypto(other),
        })?;
    let output = outputs[0];

    if let SealKeys::Tickets(tickets) = seal_keys {
        if output != tickets[index].id {
            return Err(StfError::BadSeal);
        }
    }

    Ok(output)
}
