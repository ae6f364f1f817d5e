//! Token Launch
//!
//! Everything needed to put a new SPL token with Metaplex metadata on chain:
//! address derivation, instruction encoding, transaction assembly and
//! vanity mint keypairs.

pub mod builder;
pub mod metadata;
pub mod pda;
pub mod vanity;

use thiserror::Error;

pub use builder::{serialize_transaction, CurveLaunch, LaunchTransactionBuilder};
pub use pda::{bonding_curve_pda, curve_pda, metadata_pda};
pub use vanity::{VanityConfig, VanityGrinder, VanityOutcome};

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to build instruction: {0}")]
    Instruction(String),
    #[error("Failed to sign transaction: {0}")]
    Signing(String),
    #[error("Failed to serialize: {0}")]
    Serialization(String),
}
