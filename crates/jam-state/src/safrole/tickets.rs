//! Ticket submission, ordering, and accumulation.

use jam_crypto::{CryptoError, RingVrfInput, RingVrfVerifier};
use jam_primitives::hash::Hash;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, StfError};

pub type TicketId = Hash;

/// A ticket envelope as submitted in a block extrinsic: an attempt byte and an opaque
/// ring-VRF signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketEnvelope {
    pub attempt: u8,
    pub signature: Vec<u8>,
}

/// A verified ticket: its VRF-output id and the attempt that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub attempt: u8,
}

const TICKET_SEAL_CONTEXT: &[u8] = b"jam_ticket_seal";

fn ticket_message(eta2: &Hash, attempt: u8) -> Vec<u8> {
    let mut message = Vec::with_capacity(TICKET_SEAL_CONTEXT.len() + 32 + 1);
    message.extend_from_slice(TICKET_SEAL_CONTEXT);
    message.extend_from_slice(eta2);
    message.push(attempt);
    message
}

/// Process a batch of ticket envelopes against the accumulator `gamma_a` (kept sorted
/// ascending by id throughout). Validates the submission window, attempt bounds, batch
/// size, ring-VRF proofs (batched), strict ascending order, and duplicate rejection,
/// then merges newly-verified tickets into the accumulator.
pub fn process_tickets(
    gamma_a: &mut Vec<Ticket>,
    envelopes: &[TicketEnvelope],
    config: &Config,
    slot_in_epoch: u32,
    eta2: &Hash,
    ring_commitment: &[u8],
    verifier: &dyn RingVrfVerifier,
) -> Result<()> {
    if envelopes.is_empty() {
        return Ok(());
    }

    if slot_in_epoch >= config.ticket_submission_end_epoch_slot {
        return Err(StfError::UnexpectedTicket(0));
    }

    if envelopes.len() > config.max_tickets_per_extrinsic {
        return Err(StfError::TooManyTicketsInExtrinsic(envelopes.len()));
    }

    for (index, envelope) in envelopes.iter().enumerate() {
        if envelope.attempt as u32 >= config.max_ticket_entries_per_validator {
            return Err(StfError::BadTicketAttempt {
                index,
                attempt: envelope.attempt as u32,
            });
        }
    }

    let inputs: Vec<RingVrfInput> = envelopes
        .iter()
        .map(|envelope| RingVrfInput {
            message: ticket_message(eta2, envelope.attempt),
            signature: envelope.signature.clone(),
        })
        .collect();

    let ids = verifier
        .batch_verify(ring_commitment, &inputs)
        .map_err(|err| match err {
            CryptoError::BadRingProof(index) => StfError::BadTicketProof(index),
            other => StfError::Crypto(other),
        })?;

    let mut last_id: Option<TicketId> = None;
    for (index, id) in ids.iter().enumerate() {
        if let Some(last) = last_id {
            if *id == last {
                return Err(StfError::DuplicateTicket(index));
            }
            if *id < last {
                return Err(StfError::BadTicketOrder(index));
            }
        }
        if gamma_a.binary_search_by(|t| t.id.cmp(id)).is_ok() {
            return Err(StfError::DuplicateTicket(index));
        }
        last_id = Some(*id);
    }

    for (id, envelope) in ids.into_iter().zip(envelopes.iter()) {
        let insert_at = gamma_a
            .binary_search_by(|t| t.id.cmp(&id))
            .expect_err("duplicate ids were already rejected above");
        gamma_a.insert(
            insert_at,
            Ticket {
                id,
                attempt: envelope.attempt,
            },
        );
    }

    Ok(())
}

/// Select the top `epoch_length` tickets (by ascending id) at the epoch boundary.
/// Returns `None` if the accumulator did not fill, in which case the caller falls back
/// to the Fisher-Yates key sequence.
pub fn select_epoch_tickets(gamma_a: &[Ticket], epoch_length: usize) -> Option<Vec<Ticket>> {
    if gamma_a.len() < epoch_length {
        return None;
    }
    Some(gamma_a[..epoch_length].to_vec())
}
