//! Error taxonomy: validation, consensus, resource, and internal kinds. Every
//! sub-transition returns `Result<_, StfError>`; the top-level STF aborts on the first
//! error and discards σ′, so no partial state is ever committed.

use thiserror::Error;

/// The coarse error kind, used by callers (e.g. the conformance harness) to decide
/// whether a failure is the block producer's fault, a protocol violation, resource
/// exhaustion, or a programming error that should never reach production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Consensus,
    Resource,
    Internal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StfError {
    // --- envelope (internal) ---
    #[error("base state field not populated: {0}")]
    UninitializedBaseField(&'static str),
    #[error("state slot already installed: {0}")]
    StateTransitioned(&'static str),

    // --- time / entropy (validation) ---
    #[error("slot must strictly advance: {from} -> {to}")]
    SlotMustAdvance { from: u32, to: u32 },

    // --- Safrole / tickets (consensus) ---
    #[error("ticket submitted outside the submission window, at extrinsic index {0}")]
    UnexpectedTicket(usize),
    #[error("ticket attempt {attempt} at extrinsic index {index} exceeds the configured maximum")]
    BadTicketAttempt { index: usize, attempt: u32 },
    #[error("ticket extrinsic has {0} entries, exceeding the per-block maximum")]
    TooManyTicketsInExtrinsic(usize),
    #[error("ring-VRF proof invalid at extrinsic index {0}")]
    BadTicketProof(usize),
    #[error("duplicate ticket id at extrinsic index {0}")]
    DuplicateTicket(usize),
    #[error("ticket ids are not strictly ascending at extrinsic index {0}")]
    BadTicketOrder(usize),
    #[error("seal key sequence length does not match the epoch length")]
    BadSealKeySequenceLength,
    #[error("seal slot index falls outside the seal key sequence")]
    BadSealIndex,
    #[error("block seal does not match the claimed ticket or fallback key")]
    BadSeal,

    // --- recent history / reports (consensus) ---
    #[error("work-package hash already present in recent history")]
    DuplicatePackage,
    #[error("work-package hash duplicated within the guarantee batch")]
    DuplicatePackageInGuarantees,
    #[error("core {0} already has an engaged pending report")]
    CoreEngaged(u16),
    #[error("report dependency could not be resolved")]
    DependencyMissing,
    #[error("segment-root lookup did not resolve")]
    SegmentRootLookupInvalid,
    #[error("report names more dependencies than the configured maximum")]
    TooManyDependencies,
    #[error("authorizer not present in core {0}'s pool at the report slot")]
    NotAuthorized(u16),
    #[error("guarantor signature does not map to the report's assigned core")]
    BadGuarantorAssignment,
    #[error("guarantee slot falls outside the valid rotation window")]
    BadGuaranteeSlot,

    // --- disputes (consensus) ---
    #[error("judgement signer age is neither the current nor the prior epoch")]
    BadJudgementAge,
    #[error("vote count matches no good/bad/wonky threshold")]
    BadVoteSplit,
    #[error("offender key already reported")]
    OffenderAlreadyReported,
    #[error("target hash already judged")]
    AlreadyJudged,
    #[error("verdicts, culprits, or faults are not in strictly ascending order")]
    BadExtrinsicOrder,
    #[error("bad vote split: positive votes require at least one fault")]
    GoodVerdictMissingFault,
    #[error("bad vote split: zero positive votes requires at least two culprits")]
    BadVerdictMissingCulprits,

    // --- service accounts (consensus) ---
    #[error("service {0} does not have sufficient balance for this transfer")]
    InsufficientFunds(u32),
    #[error("service {0} is not present in the service state")]
    UnknownService(u32),

    // --- resource exhaustion ---
    #[error("bounded container '{0}' would exceed its configured capacity")]
    CapacityExceeded(&'static str),

    // --- crypto capability failures, mapped onto the calling operation ---
    #[error(transparent)]
    Crypto(#[from] jam_crypto::CryptoError),
}

impl StfError {
    pub fn kind(&self) -> ErrorKind {
        use StfError::*;
        match self {
            UninitializedBaseField(_) | StateTransitioned(_) => ErrorKind::Internal,
            CapacityExceeded(_) => ErrorKind::Resource,
            SlotMustAdvance { .. } => ErrorKind::Validation,
            UnexpectedTicket(_)
            | BadTicketAttempt { .. }
            | TooManyTicketsInExtrinsic(_)
            | BadTicketProof(_)
            | DuplicateTicket(_)
            | BadTicketOrder(_)
            | BadSealKeySequenceLength
            | BadSealIndex
            | BadSeal
            | DuplicatePackage
            | DuplicatePackageInGuarantees
            | CoreEngaged(_)
            | DependencyMissing
            | SegmentRootLookupInvalid
            | TooManyDependencies
            | NotAuthorized(_)
            | BadGuarantorAssignment
            | BadGuaranteeSlot
            | BadJudgementAge
            | BadVoteSplit
            | OffenderAlreadyReported
            | AlreadyJudged
            | BadExtrinsicOrder
            | GoodVerdictMissingFault
            | BadVerdictMissingCulprits
            | InsufficientFunds(_)
            | UnknownService(_)
            | Crypto(_) => ErrorKind::Consensus,
        }
    }
}

pub type Result<T> = std::result::Result<T, StfError>;
