//! The JAM data model: hashes, slots, validator descriptors, and the small id types
//! threaded through every sub-transition.

use jam_primitives::hash::Hash;
use parity_scale_codec::{Decode, Encode, Error as CodecError, Input, Output};
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

pub type Slot = u32;
pub type ValidatorIndex = u16;
pub type CoreIndex = u16;
pub type ServiceId = u32;
pub type Balance = u64;
pub type Gas = u64;

/// η: the ordered 4-tuple of entropy pool entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct EntropyPool {
    pub eta: [Hash; 4],
}

impl EntropyPool {
    pub fn new(genesis: Hash) -> Self {
        Self {
            eta: [genesis; 4],
        }
    }

    /// `η₀ ← H(η₀ ‖ headerHash)` (every block).
    pub fn advance(&mut self, header_hash: &Hash) {
        self.eta[0] = jam_primitives::hash::update_entropy(&self.eta[0], header_hash);
    }

    /// `(η₀, η₁, η₂, η₃) ← (η₀, prev η₀, prev η₁, prev η₂)` (epoch boundary).
    pub fn rotate_epoch(&mut self) {
        self.eta = [self.eta[0], self.eta[0], self.eta[1], self.eta[2]];
    }
}

/// A validator descriptor: Bandersnatch key, Ed25519 key, BLS key, and an opaque
/// metadata blob. Sizes match the real JAM key material (BLS: 144 bytes compressed,
/// metadata: 128 bytes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorDescriptor {
    pub bandersnatch: [u8; 32],
    pub ed25519: [u8; 32],
    #[serde(with = "BigArray")]
    pub bls: [u8; 144],
    #[serde(with = "BigArray")]
    pub metadata: [u8; 128],
}

impl ValidatorDescriptor {
    pub fn zero() -> Self {
        Self {
            bandersnatch: [0u8; 32],
            ed25519: [0u8; 32],
            bls: [0u8; 144],
            metadata: [0u8; 128],
        }
    }
}

// parity-scale-codec's array support covers up to 32 elements natively; BLS (144) and
// metadata (128) blobs are encoded manually since they fall outside that range.
impl Encode for ValidatorDescriptor {
    fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
        dest.write(&self.bandersnatch);
        dest.write(&self.ed25519);
        dest.write(&self.bls);
        dest.write(&self.metadata);
    }
}

impl Decode for ValidatorDescriptor {
    fn decode<I: Input>(input: &mut I) -> Result<Self, CodecError> {
        let mut bandersnatch = [0u8; 32];
        input.read(&mut bandersnatch)?;
        let mut ed25519 = [0u8; 32];
        input.read(&mut ed25519)?;
        let mut bls = [0u8; 144];
        input.read(&mut bls)?;
        let mut metadata = [0u8; 128];
        input.read(&mut metadata)?;
        Ok(Self {
            bandersnatch,
            ed25519,
            bls,
            metadata,
        })
    }
}
