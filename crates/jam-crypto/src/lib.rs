//! Capability interfaces for the two cryptographic primitives the state transition
//! function depends on: ring-VRF ticket/seal verification and Ed25519 judgement
//! verification.

pub mod ed25519;
pub mod error;
pub mod ring_vrf;

pub use error::{CryptoError, Result};
pub use ring_vrf::{BandersnatchRingVerifier, MockRingVerifier, RingVrfInput, RingVrfVerifier};
