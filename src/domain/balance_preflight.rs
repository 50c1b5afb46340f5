//! Balance Preflight
//!
//! Checks every planned wallet holds its intended spend plus a fixed buffer
//! (network fee + rent-exemption minimum) before anything is built or sent.
//! Pure: balances come from the caller, results are positional.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use super::amount::{lamports_to_sol, sol_to_lamports, AmountError};
use super::signer::Signer;

/// Default buffer: 0.01 SOL
pub const DEFAULT_BUFFER_LAMPORTS: u64 = 10_000_000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PreflightError {
    #[error("{signers} signers but {amounts} amounts")]
    LengthMismatch { signers: usize, amounts: usize },

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
}

/// Outcome for one wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceCheckResult {
    pub address: Pubkey,
    pub current_lamports: u64,
    pub required_lamports: u64,
    pub sufficient: bool,
}

impl BalanceCheckResult {
    pub fn shortfall_lamports(&self) -> u64 {
        self.required_lamports.saturating_sub(self.current_lamports)
    }

    pub fn current_sol(&self) -> Decimal {
        lamports_to_sol(self.current_lamports)
    }

    pub fn required_sol(&self) -> Decimal {
        lamports_to_sol(self.required_lamports)
    }
}

impl fmt::Display for BalanceCheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: has {} SOL, needs {} SOL",
            self.address,
            self.current_sol(),
            self.required_sol()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancePreflight {
    buffer_lamports: u64,
}

impl Default for BalancePreflight {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_LAMPORTS)
    }
}

impl BalancePreflight {
    pub fn new(buffer_lamports: u64) -> Self {
        Self { buffer_lamports }
    }

    pub fn with_buffer_sol(buffer_sol: Decimal) -> Result<Self, PreflightError> {
        Ok(Self::new(sol_to_lamports(buffer_sol)?))
    }

    pub fn buffer_lamports(&self) -> u64 {
        self.buffer_lamports
    }

    /// One result per signer; a wallet missing from `balances` reads as empty
    pub fn check(
        &self,
        signers: &[&Signer],
        amounts: &[Decimal],
        balances: &HashMap<Pubkey, u64>,
    ) -> Result<Vec<BalanceCheckResult>, PreflightError> {
        if signers.len() != amounts.len() {
            return Err(PreflightError::LengthMismatch {
                signers: signers.len(),
                amounts: amounts.len(),
            });
        }

        signers
            .iter()
            .zip(amounts)
            .map(|(signer, amount)| {
                let address = signer.pubkey();
                let spend = sol_to_lamports(*amount)?;
                let required = spend.saturating_add(self.buffer_lamports);
                let current = balances.get(&address).copied().unwrap_or(0);

                Ok(BalanceCheckResult {
                    address,
                    current_lamports: current,
                    required_lamports: required,
                    sufficient: current >= required,
                })
            })
            .collect()
    }
}

/// Results that failed the check
pub fn shortfalls(results: &[BalanceCheckResult]) -> Vec<BalanceCheckResult> {
    results.iter().filter(|r| !r.sufficient).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::domain::signer::SignerRole;

    fn two_signers() -> (Signer, Signer) {
        (
            Signer::new_random(SignerRole::Backing),
            Signer::new_random(SignerRole::Backing),
        )
    }

    #[test]
    fn test_sufficient_and_insufficient() {
        let (a, b) = two_signers();
        let preflight = BalancePreflight::with_buffer_sol(dec!(0.01)).unwrap();
        let balances = HashMap::from([
            (a.pubkey(), sol_to_lamports(dec!(1.0)).unwrap()),
            (b.pubkey(), sol_to_lamports(dec!(0.005)).unwrap()),
        ]);

        let results = preflight
            .check(&[&a, &b], &[dec!(0.5), dec!(0.5)], &balances)
            .unwrap();

        assert!(results[0].sufficient);
        assert!(!results[1].sufficient);
        assert_eq!(results[1].required_sol(), dec!(0.51));
        assert_eq!(results[1].shortfall_lamports(), 505_000_000);

        let short = shortfalls(&results);
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].address, b.pubkey());
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let (a, _) = two_signers();
        let preflight = BalancePreflight::with_buffer_sol(dec!(0.01)).unwrap();
        let balances = HashMap::from([(a.pubkey(), sol_to_lamports(dec!(0.51)).unwrap())]);

        let results = preflight.check(&[&a], &[dec!(0.5)], &balances).unwrap();
        assert!(results[0].sufficient);

        let balances = HashMap::from([(a.pubkey(), sol_to_lamports(dec!(0.51)).unwrap() - 1)]);
        let results = preflight.check(&[&a], &[dec!(0.5)], &balances).unwrap();
        assert!(!results[0].sufficient);
    }

    #[test]
    fn test_check_is_pure() {
        let (a, b) = two_signers();
        let preflight = BalancePreflight::default();
        let balances = HashMap::from([(a.pubkey(), 42), (b.pubkey(), 5_000_000_000)]);

        let first = preflight.check(&[&a, &b], &[dec!(1), dec!(2)], &balances).unwrap();
        let second = preflight.check(&[&a, &b], &[dec!(1), dec!(2)], &balances).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_balance_reads_as_zero() {
        let (a, _) = two_signers();
        let results = BalancePreflight::default()
            .check(&[&a], &[dec!(0)], &HashMap::new())
            .unwrap();
        assert_eq!(results[0].current_lamports, 0);
        assert!(!results[0].sufficient);
    }

    #[test]
    fn test_length_mismatch() {
        let (a, b) = two_signers();
        let err = BalancePreflight::default()
            .check(&[&a, &b], &[dec!(1)], &HashMap::new())
            .unwrap_err();
        assert_eq!(err, PreflightError::LengthMismatch { signers: 2, amounts: 1 });
    }
}
