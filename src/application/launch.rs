//! Launch Orchestrator
//!
//! Drives the buy-in: load wallets, draw amounts once, preflight every
//! wallet, plan and build groups, then submit with the mint co-signing the
//! create. Nothing touches the network before preflight passes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

use super::error::{GroupReceipt, LaunchError, RunFailure};
use super::session::{Phase, RunSession, RunState};
use super::steps;
use super::submitter::BundleSubmitter;
use crate::domain::amount::{AmountPlan, AmountPolicy};
use crate::domain::balance_preflight::{BalanceCheckResult, BalancePreflight};
use crate::domain::bundle_builder::{BundleBuilder, BundleRole};
use crate::domain::group_planner::GroupPlanner;
use crate::domain::intent::TokenPayload;
use crate::domain::keypair_pool::KeypairPool;
use crate::domain::mint::MintIdentity;
use crate::ports::balances::BalanceSourcePort;
use crate::ports::wallet_store::WalletStorePort;

/// Outcome of a completed launch
#[derive(Debug, Clone)]
pub struct LaunchReport {
    pub mint: Pubkey,
    pub state: RunState,
    pub receipts: Vec<GroupReceipt>,
    /// SOL committed across create and buys
    pub total_sol: Decimal,
    pub wallets: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl LaunchReport {
    pub fn transaction_count(&self) -> usize {
        self.receipts.iter().map(|r| r.signatures.len()).sum()
    }
}

pub struct LaunchOrchestrator {
    wallet_store: Arc<dyn WalletStorePort>,
    balances: Arc<dyn BalanceSourcePort>,
    submitter: BundleSubmitter,
    planner: GroupPlanner,
    builder: BundleBuilder,
    preflight: BalancePreflight,
    policy: AmountPolicy,
    seed: Option<u64>,
}

impl LaunchOrchestrator {
    pub fn new(
        wallet_store: Arc<dyn WalletStorePort>,
        balances: Arc<dyn BalanceSourcePort>,
        submitter: BundleSubmitter,
        policy: AmountPolicy,
    ) -> Self {
        Self {
            wallet_store,
            balances,
            submitter,
            planner: GroupPlanner::default(),
            builder: BundleBuilder::default(),
            preflight: BalancePreflight::default(),
            policy,
            seed: None,
        }
    }

    pub fn with_planner(mut self, planner: GroupPlanner) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_builder(mut self, builder: BundleBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_preflight(mut self, preflight: BalancePreflight) -> Self {
        self.preflight = preflight;
        self
    }

    /// Fixed seed for amount draws
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn policy(&self) -> &AmountPolicy {
        &self.policy
    }

    /// Run the full launch
    ///
    /// On a submission failure the returned `RunFailure` carries the groups
    /// that were already accepted.
    pub async fn run(
        &self,
        mint: &MintIdentity,
        token: &TokenPayload,
    ) -> Result<LaunchReport, RunFailure> {
        let mut session = RunSession::new(Phase::Launch);
        tracing::info!(mint = %mint.pubkey(), name = %token.name, symbol = %token.symbol, "Starting launch");

        match self.execute(&mut session, mint, token).await {
            Ok(report) => Ok(report),
            Err(failure) => {
                session.fail(&failure.error);
                Err(failure)
            }
        }
    }

    /// Preflight with freshly drawn amounts, without building or submitting
    pub async fn check_balances(&self) -> Result<Vec<BalanceCheckResult>, LaunchError> {
        let pool = KeypairPool::load(self.wallet_store.as_ref()).await?;
        let plan = self.draw_amounts(&pool);
        steps::log_preview(&plan);
        steps::check_balances(&pool, &plan, self.balances.as_ref(), &self.preflight).await
    }

    async fn execute(
        &self,
        session: &mut RunSession,
        mint: &MintIdentity,
        token: &TokenPayload,
    ) -> Result<LaunchReport, RunFailure> {
        let pool = steps::load_wallets(session, self.wallet_store.as_ref()).await?;

        let plan = self.draw_amounts(&pool);
        steps::log_preview(&plan);

        steps::verify_balances(session, &pool, &plan, self.balances.as_ref(), &self.preflight)
            .await?;

        let planned = steps::plan_groups(session, &self.planner, &pool)?;
        let groups = steps::build_groups(
            session,
            &self.builder,
            &planned,
            BundleRole::Launch(token),
            &plan,
            &mint.pubkey(),
        )?;

        session.advance(RunState::Submitting)?;
        let receipts = self.submitter.submit(&groups, &pool, Some(mint)).await?;
        session.advance(RunState::Done)?;

        Ok(LaunchReport {
            mint: mint.pubkey(),
            state: session.state(),
            receipts,
            total_sol: plan.total_sol(),
            wallets: pool.len(),
            started_at: session.started_at(),
            finished_at: Utc::now(),
        })
    }

    fn draw_amounts(&self, pool: &KeypairPool) -> AmountPlan {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        AmountPlan::draw(&self.policy, pool.all(), &mut rng)
    }
}
