//! Bundle Builder
//!
//! Turns a planned group into trade intents. The creator's launch intent is a
//! create with the token payload and its own fee tier (tighter slippage,
//! higher priority fee); backing intents share the trade tier. Amounts come
//! from an `AmountPlan` drawn once per run, never redrawn here.

use rust_decimal_macros::dec;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use super::amount::{AmountPlan, TradeAmount};
use super::group_planner::PlannedGroup;
use super::intent::{FeeTier, TokenPayload, TradeAction, TradeIntent, Venue};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("No amount drawn for wallet {0}")]
    MissingAmount(Pubkey),

    #[error("Launch intent for {0} needs a SOL amount")]
    NonSolLaunchAmount(Pubkey),
}

/// Which phase the group is built for
#[derive(Debug, Clone, Copy)]
pub enum BundleRole<'a> {
    /// Creator creates the token, backing wallets buy
    Launch(&'a TokenPayload),
    /// Every wallet sells
    Exit,
}

/// Intents for one bundle, creator intent first in group 0
#[derive(Debug, Clone)]
pub struct SubmissionGroup {
    pub index: usize,
    pub intents: Vec<TradeIntent>,
}

impl SubmissionGroup {
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn count(&self, action: TradeAction) -> usize {
        self.intents.iter().filter(|i| i.action == action).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleBuilder {
    create_tier: FeeTier,
    trade_tier: FeeTier,
    venue: Venue,
}

impl Default for BundleBuilder {
    fn default() -> Self {
        Self {
            create_tier: FeeTier::new(1_000, dec!(0.0001)),
            trade_tier: FeeTier::new(5_000, dec!(0.00005)),
            venue: Venue::Pump,
        }
    }
}

impl BundleBuilder {
    pub fn new(create_tier: FeeTier, trade_tier: FeeTier, venue: Venue) -> Self {
        Self {
            create_tier,
            trade_tier,
            venue,
        }
    }

    pub fn create_tier(&self) -> FeeTier {
        self.create_tier
    }

    pub fn trade_tier(&self) -> FeeTier {
        self.trade_tier
    }

    pub fn build(
        &self,
        group: &PlannedGroup<'_>,
        role: BundleRole<'_>,
        plan: &AmountPlan,
        mint: &Pubkey,
    ) -> Result<SubmissionGroup, BuildError> {
        let intents = group
            .members
            .iter()
            .map(|signer| {
                let wallet = signer.pubkey();
                let amount = plan.get(&wallet).ok_or(BuildError::MissingAmount(wallet))?;

                let (action, fee, token) = match role {
                    BundleRole::Launch(token) if signer.is_creator() => {
                        (TradeAction::Create, self.create_tier, Some(token.clone()))
                    }
                    BundleRole::Launch(_) => (TradeAction::Buy, self.trade_tier, None),
                    BundleRole::Exit => (TradeAction::Sell, self.trade_tier, None),
                };

                if action != TradeAction::Sell && !matches!(amount, TradeAmount::Sol(_)) {
                    return Err(BuildError::NonSolLaunchAmount(wallet));
                }

                Ok(TradeIntent {
                    signer: wallet,
                    action,
                    mint: *mint,
                    amount,
                    fee,
                    venue: self.venue,
                    token,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SubmissionGroup {
            index: group.index,
            intents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::domain::amount::AmountPolicy;
    use crate::domain::group_planner::GroupPlanner;
    use crate::domain::signer::{Signer, SignerRole};

    fn token() -> TokenPayload {
        TokenPayload {
            name: "Test".into(),
            symbol: "TST".into(),
            uri: "https://ipfs.io/ipfs/test".into(),
        }
    }

    fn signers(n: usize) -> (Signer, Vec<Signer>) {
        (
            Signer::new_random(SignerRole::Creator),
            (0..n).map(|_| Signer::new_random(SignerRole::Backing)).collect(),
        )
    }

    #[test]
    fn test_launch_groups_for_nine_backing() {
        let (creator, backing) = signers(9);
        let groups = GroupPlanner::default().plan(&creator, &backing);
        let policy = AmountPolicy::uniform(dec!(0.1), dec!(1)).unwrap();
        let plan = AmountPlan::draw(
            &policy,
            std::iter::once(&creator).chain(backing.iter()),
            &mut StdRng::seed_from_u64(9),
        );
        let mint = Pubkey::new_unique();
        let payload = token();
        let builder = BundleBuilder::default();

        let g0 = builder.build(&groups[0], BundleRole::Launch(&payload), &plan, &mint).unwrap();
        let g1 = builder.build(&groups[1], BundleRole::Launch(&payload), &plan, &mint).unwrap();

        assert_eq!(g0.count(TradeAction::Create), 1);
        assert_eq!(g0.count(TradeAction::Buy), 4);
        assert!(g0.intents[0].is_create());
        assert_eq!(g0.intents[0].token.as_ref(), Some(&payload));
        assert_eq!(g1.count(TradeAction::Buy), 5);
        assert_eq!(g1.index, 1);
        assert!(g0.intents.iter().chain(g1.intents.iter()).all(|i| i.mint == mint));
    }

    #[test]
    fn test_create_tier_distinct_from_trade_tier() {
        let (creator, backing) = signers(2);
        let groups = GroupPlanner::default().plan(&creator, &backing);
        let plan = AmountPlan::draw(
            &AmountPolicy::uniform(dec!(1), dec!(2)).unwrap(),
            std::iter::once(&creator).chain(backing.iter()),
            &mut StdRng::seed_from_u64(1),
        );
        let payload = token();
        let builder = BundleBuilder::default();
        let group = builder
            .build(&groups[0], BundleRole::Launch(&payload), &plan, &Pubkey::new_unique())
            .unwrap();

        let create = &group.intents[0];
        let buy = &group.intents[1];
        assert!(create.fee.slippage_bps < buy.fee.slippage_bps);
        assert!(create.fee.priority_fee_sol > buy.fee.priority_fee_sol);
        assert_eq!(group.intents[1].fee, group.intents[2].fee);
        assert!(buy.token.is_none());
    }

    #[test]
    fn test_amounts_taken_from_plan() {
        let (creator, backing) = signers(4);
        let groups = GroupPlanner::default().plan(&creator, &backing);
        let plan = AmountPlan::draw(
            &AmountPolicy::uniform(dec!(0.5), dec!(3)).unwrap(),
            std::iter::once(&creator).chain(backing.iter()),
            &mut StdRng::seed_from_u64(5),
        );
        let payload = token();
        let group = BundleBuilder::default()
            .build(&groups[0], BundleRole::Launch(&payload), &plan, &Pubkey::new_unique())
            .unwrap();

        for intent in &group.intents {
            assert_eq!(Some(intent.amount), plan.get(&intent.signer));
        }
    }

    #[test]
    fn test_exit_builds_sells_including_creator() {
        let (creator, backing) = signers(6);
        let groups = GroupPlanner::default().plan(&creator, &backing);
        let plan = AmountPlan::draw(
            &AmountPolicy::percent(100).unwrap(),
            std::iter::once(&creator).chain(backing.iter()),
            &mut StdRng::seed_from_u64(0),
        );
        let builder = BundleBuilder::default();
        let mint = Pubkey::new_unique();

        let built: Vec<SubmissionGroup> = groups
            .iter()
            .map(|g| builder.build(g, BundleRole::Exit, &plan, &mint).unwrap())
            .collect();

        let sells: usize = built.iter().map(|g| g.count(TradeAction::Sell)).sum();
        assert_eq!(sells, 7);
        assert_eq!(built[0].intents[0].signer, creator.pubkey());
        assert!(built
            .iter()
            .flat_map(|g| g.intents.iter())
            .all(|i| i.amount == TradeAmount::PercentOfHoldings(100)));
    }

    #[test]
    fn test_missing_amount() {
        let (creator, backing) = signers(1);
        let groups = GroupPlanner::default().plan(&creator, &backing);
        let payload = token();
        let err = BundleBuilder::default()
            .build(&groups[0], BundleRole::Launch(&payload), &AmountPlan::default(), &Pubkey::new_unique())
            .unwrap_err();
        assert_eq!(err, BuildError::MissingAmount(creator.pubkey()));
    }

    #[test]
    fn test_launch_rejects_percent_amounts() {
        let (creator, backing) = signers(1);
        let groups = GroupPlanner::default().plan(&creator, &backing);
        let plan = AmountPlan::draw(
            &AmountPolicy::percent(50).unwrap(),
            std::iter::once(&creator).chain(backing.iter()),
            &mut StdRng::seed_from_u64(0),
        );
        let payload = token();
        let err = BundleBuilder::default()
            .build(&groups[0], BundleRole::Launch(&payload), &plan, &Pubkey::new_unique())
            .unwrap_err();
        assert!(matches!(err, BuildError::NonSolLaunchAmount(_)));
    }
}
