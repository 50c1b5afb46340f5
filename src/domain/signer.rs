//! Signers
//!
//! In-memory signing wallets loaded for a single orchestration run.
//! Key material is never printed: `Debug` shows the address and role only.

use std::fmt;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer as _};

/// Role a wallet plays in a launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignerRole {
    /// The single wallet that issues the token-create instruction
    Creator,
    /// A wallet that buys in alongside the creator and sells out on exit
    Backing,
}

/// A signing wallet held for the duration of one run
pub struct Signer {
    keypair: Keypair,
    role: SignerRole,
}

impl Signer {
    pub fn new(keypair: Keypair, role: SignerRole) -> Self {
        Self { keypair, role }
    }

    /// Generate a fresh random signer (tests and dry runs)
    pub fn new_random(role: SignerRole) -> Self {
        Self::new(Keypair::new(), role)
    }

    /// Same key, different role
    pub fn with_role(self, role: SignerRole) -> Self {
        Self { role, ..self }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Base58 public address
    pub fn address(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    pub fn role(&self) -> SignerRole {
        self.role
    }

    pub fn is_creator(&self) -> bool {
        self.role == SignerRole::Creator
    }

    /// Key material for transaction signing
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address())
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_key_material() {
        let signer = Signer::new_random(SignerRole::Backing);
        let secret = bs58::encode(signer.keypair().to_bytes()).into_string();
        let debug = format!("{:?}", signer);

        assert!(debug.contains(&signer.address()));
        assert!(!debug.contains(&secret));
    }

    #[test]
    fn test_role_helpers() {
        assert!(Signer::new_random(SignerRole::Creator).is_creator());
        assert!(!Signer::new_random(SignerRole::Backing).is_creator());
    }
}
