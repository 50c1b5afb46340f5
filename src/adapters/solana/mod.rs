pub mod keyfile;
pub mod rpc;

pub use keyfile::{load_keypair, load_mint, save_keypair, save_mint, KeyfileError};
pub use rpc::{SolanaClient, SolanaClientError};
