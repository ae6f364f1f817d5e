pub mod rpc;
pub mod wallet;

pub use rpc::{SolanaClient, SolanaClientError};
pub use wallet::{decode_keypair, encode_keypair, WalletError, WalletManager};
