//! Mint Identity
//!
//! The keypair of the token mint. Produced by the vanity search, consumed by
//! the launch (co-signs the create transaction) and by the exit (mint address).

use std::fmt;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer as _};

pub struct MintIdentity {
    keypair: Keypair,
}

impl MintIdentity {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn address(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Base58 secret key, the format wallet tools import
    pub fn secret_base58(&self) -> String {
        bs58::encode(self.keypair.to_bytes()).into_string()
    }

    pub fn into_keypair(self) -> Keypair {
        self.keypair
    }
}

impl From<Keypair> for MintIdentity {
    fn from(keypair: Keypair) -> Self {
        Self::new(keypair)
    }
}

impl fmt::Debug for MintIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintIdentity")
            .field("address", &self.address())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_roundtrips_through_base58() {
        let mint = MintIdentity::new(Keypair::new());
        let bytes = bs58::decode(mint.secret_base58()).into_vec().unwrap();
        let restored = Keypair::try_from(bytes.as_slice()).unwrap();

        assert_eq!(restored.pubkey(), mint.pubkey());
    }

    #[test]
    fn test_debug_shows_address_only() {
        let mint = MintIdentity::new(Keypair::new());
        let debug = format!("{:?}", mint);
        assert!(debug.contains(&mint.address()));
        assert!(!debug.contains(&mint.secret_base58()));
    }
}
