//! Trade Amounts
//!
//! SOL-denominated amounts are exact decimals. Drawn buy amounts are rounded
//! to two places; balances are compared in lamports.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use super::signer::Signer;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Decimal places kept on drawn SOL amounts
pub const AMOUNT_DECIMALS: u32 = 2;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    Negative(Decimal),

    #[error("Invalid range: min {min} > max {max}")]
    InvertedRange { min: Decimal, max: Decimal },

    #[error("Range [{min}, {max}] contains no amount with two decimal places")]
    RangeTooNarrow { min: Decimal, max: Decimal },

    #[error("Sell percentage must be 1-100, got {0}")]
    InvalidPercent(u8),

    #[error("Amount {0} SOL does not fit in lamports")]
    Overflow(Decimal),
}

/// Amount carried by a trade intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAmount {
    /// Fixed SOL spend
    Sol(Decimal),
    /// Share of current token holdings, 1-100
    PercentOfHoldings(u8),
}

impl TradeAmount {
    /// SOL this intent spends up front (sells spend nothing)
    pub fn sol_spend(&self) -> Decimal {
        match self {
            TradeAmount::Sol(sol) => *sol,
            TradeAmount::PercentOfHoldings(_) => Decimal::ZERO,
        }
    }

    pub fn is_sol(&self) -> bool {
        matches!(self, TradeAmount::Sol(_))
    }
}

impl fmt::Display for TradeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAmount::Sol(sol) => write!(f, "{} SOL", sol),
            TradeAmount::PercentOfHoldings(pct) => write!(f, "{}%", pct),
        }
    }
}

/// How each wallet's amount is chosen
#[derive(Debug, Clone, PartialEq)]
pub enum AmountPolicy {
    /// Uniform random SOL amount in [min, max], two decimal places
    UniformSol { min: Decimal, max: Decimal },
    /// Same percentage of holdings for every wallet
    PercentOfHoldings(u8),
}

impl AmountPolicy {
    /// Uniform policy; bounds are tightened onto the two-decimal grid
    pub fn uniform(min: Decimal, max: Decimal) -> Result<Self, AmountError> {
        if min.is_sign_negative() && !min.is_zero() {
            return Err(AmountError::Negative(min));
        }
        if min > max {
            return Err(AmountError::InvertedRange { min, max });
        }

        let lo = min.round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::ToPositiveInfinity);
        let hi = max.round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::ToNegativeInfinity);
        if lo > hi {
            return Err(AmountError::RangeTooNarrow { min, max });
        }

        Ok(AmountPolicy::UniformSol { min: lo, max: hi })
    }

    pub fn percent(pct: u8) -> Result<Self, AmountError> {
        if pct == 0 || pct > 100 {
            return Err(AmountError::InvalidPercent(pct));
        }
        Ok(AmountPolicy::PercentOfHoldings(pct))
    }

    /// Draw one amount
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> TradeAmount {
        match self {
            AmountPolicy::UniformSol { min, max } => {
                let unit = Decimal::from_f64(rng.gen::<f64>()).unwrap_or(Decimal::ZERO);
                let raw = *min + (*max - *min) * unit;
                let mut amount = raw
                    .round_dp(AMOUNT_DECIMALS)
                    .clamp(*min, *max);
                amount.rescale(AMOUNT_DECIMALS);
                TradeAmount::Sol(amount)
            }
            AmountPolicy::PercentOfHoldings(pct) => TradeAmount::PercentOfHoldings(*pct),
        }
    }
}

/// Amounts drawn once per wallet and reused for preview, preflight and submission
#[derive(Debug, Clone, Default)]
pub struct AmountPlan {
    amounts: HashMap<Pubkey, TradeAmount>,
    order: Vec<Pubkey>,
}

impl AmountPlan {
    pub fn draw<'a, I, R>(policy: &AmountPolicy, signers: I, rng: &mut R) -> Self
    where
        I: IntoIterator<Item = &'a Signer>,
        R: Rng + ?Sized,
    {
        let mut plan = Self::default();
        for signer in signers {
            plan.insert(signer.pubkey(), policy.draw(rng));
        }
        plan
    }

    /// Set a wallet's amount (first insertion fixes display order)
    pub fn insert(&mut self, wallet: Pubkey, amount: TradeAmount) {
        if self.amounts.insert(wallet, amount).is_none() {
            self.order.push(wallet);
        }
    }

    pub fn get(&self, wallet: &Pubkey) -> Option<TradeAmount> {
        self.amounts.get(wallet).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Pubkey, TradeAmount)> {
        self.order.iter().filter_map(|k| self.amounts.get(k).map(|a| (k, *a)))
    }

    /// Total SOL spend across the plan
    pub fn total_sol(&self) -> Decimal {
        self.amounts.values().map(|a| a.sol_spend()).sum()
    }
}

/// Convert SOL to lamports (rounded to the nearest lamport)
pub fn sol_to_lamports(sol: Decimal) -> Result<u64, AmountError> {
    if sol.is_sign_negative() && !sol.is_zero() {
        return Err(AmountError::Negative(sol));
    }
    sol.checked_mul(Decimal::from(LAMPORTS_PER_SOL))
        .map(|l| l.round())
        .and_then(|l| l.to_u64())
        .ok_or(AmountError::Overflow(sol))
}

pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(lamports as i128, 9).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    use crate::domain::signer::SignerRole;

    #[test]
    fn test_uniform_draws_stay_in_range_with_two_decimals() {
        let policy = AmountPolicy::uniform(dec!(0.1), dec!(1.5)).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..2_000 {
            match policy.draw(&mut rng) {
                TradeAmount::Sol(amount) => {
                    assert!(amount >= dec!(0.1) && amount <= dec!(1.5), "{}", amount);
                    assert_eq!(amount.scale(), 2);
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_uniform_degenerate_range() {
        let policy = AmountPolicy::uniform(dec!(0.25), dec!(0.25)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(policy.draw(&mut rng), TradeAmount::Sol(dec!(0.25)));
    }

    #[test]
    fn test_uniform_off_grid_bounds_tightened() {
        let policy = AmountPolicy::uniform(dec!(0.101), dec!(0.129)).unwrap();
        assert_eq!(
            policy,
            AmountPolicy::UniformSol { min: dec!(0.11), max: dec!(0.12) }
        );

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let amount = policy.draw(&mut rng).sol_spend();
            assert!(amount >= dec!(0.101) && amount <= dec!(0.129));
        }
    }

    #[test]
    fn test_uniform_rejects_bad_ranges() {
        assert!(matches!(
            AmountPolicy::uniform(dec!(2), dec!(1)),
            Err(AmountError::InvertedRange { .. })
        ));
        assert!(matches!(
            AmountPolicy::uniform(dec!(0.121), dec!(0.124)),
            Err(AmountError::RangeTooNarrow { .. })
        ));
        assert!(matches!(
            AmountPolicy::uniform(dec!(-1), dec!(1)),
            Err(AmountError::Negative(_))
        ));
    }

    #[test]
    fn test_percent_policy() {
        assert!(AmountPolicy::percent(0).is_err());
        assert!(AmountPolicy::percent(101).is_err());

        let policy = AmountPolicy::percent(50).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let amount = policy.draw(&mut rng);
        assert_eq!(amount, TradeAmount::PercentOfHoldings(50));
        assert_eq!(amount.sol_spend(), Decimal::ZERO);
        assert_eq!(amount.to_string(), "50%");
    }

    #[test]
    fn test_plan_draws_once_per_wallet() {
        let signers: Vec<Signer> = (0..5)
            .map(|_| Signer::new_random(SignerRole::Backing))
            .collect();
        let policy = AmountPolicy::uniform(dec!(1), dec!(5)).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let plan = AmountPlan::draw(&policy, signers.iter(), &mut rng);

        assert_eq!(plan.len(), 5);
        let from_iter: Decimal = plan.iter().map(|(_, a)| a.sol_spend()).sum();
        assert_eq!(from_iter, plan.total_sol());
        for signer in &signers {
            assert!(plan.get(&signer.pubkey()).is_some());
        }
        let order: Vec<Pubkey> = plan.iter().map(|(k, _)| *k).collect();
        let expected: Vec<Pubkey> = signers.iter().map(|s| s.pubkey()).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_lamport_conversions() {
        assert_eq!(sol_to_lamports(dec!(0.51)).unwrap(), 510_000_000);
        assert_eq!(sol_to_lamports(dec!(0.01)).unwrap(), 10_000_000);
        assert_eq!(
            sol_to_lamports(dec!(0.5)).unwrap() + sol_to_lamports(dec!(0.01)).unwrap(),
            sol_to_lamports(dec!(0.51)).unwrap()
        );
        assert_eq!(lamports_to_sol(1_500_000_000), dec!(1.5));
        assert!(sol_to_lamports(dec!(-0.1)).is_err());
    }
}
