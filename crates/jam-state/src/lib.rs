//! The JAM block-import state transition function.
//!
//! [`stf::import_block`] is the single entry point: given a prior [`envelope::JamState`]
//! and a [`stf::Block`], it runs time/entropy advance, Safrole (tickets, epoch
//! rotation, seal verification), the work-report pipeline (guarantees, assurances,
//! accumulation), and disputes, in that order, and returns the posterior state or the
//! first error encountered.

pub mod accumulated;
pub mod assign;
pub mod authorizers;
pub mod config;
pub mod disputes;
pub mod envelope;
pub mod error;
pub mod genesis;
pub mod history;
pub mod merklize;
pub mod privileged;
pub mod reports;
pub mod safrole;
pub mod services;
pub mod shuffle;
pub mod stats;
pub mod stf;
pub mod types;

pub use config::Config;
pub use envelope::JamState;
pub use error::{ErrorKind, Result, StfError};
pub use stf::{import_block, Block, Extrinsics, Header};
