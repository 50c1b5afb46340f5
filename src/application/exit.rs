//! Exit Orchestrator
//!
//! Sells out of a launched token from every wallet, creator included, using
//! the same grouping and submission path as the launch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use solana_sdk::pubkey::Pubkey;

use super::error::{GroupReceipt, RunFailure};
use super::session::{Phase, RunSession, RunState};
use super::steps;
use super::submitter::BundleSubmitter;
use crate::domain::amount::{AmountError, AmountPlan, AmountPolicy};
use crate::domain::balance_preflight::BalancePreflight;
use crate::domain::bundle_builder::{BundleBuilder, BundleRole};
use crate::domain::group_planner::GroupPlanner;
use crate::ports::balances::BalanceSourcePort;
use crate::ports::wallet_store::WalletStorePort;

pub const DEFAULT_SELL_PERCENT: u8 = 100;

#[derive(Debug, Clone)]
pub struct ExitReport {
    pub mint: Pubkey,
    pub state: RunState,
    pub receipts: Vec<GroupReceipt>,
    pub percent: u8,
    pub wallets: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct ExitOrchestrator {
    wallet_store: Arc<dyn WalletStorePort>,
    balances: Arc<dyn BalanceSourcePort>,
    submitter: BundleSubmitter,
    planner: GroupPlanner,
    builder: BundleBuilder,
    preflight: BalancePreflight,
    percent: u8,
}

impl ExitOrchestrator {
    pub fn new(
        wallet_store: Arc<dyn WalletStorePort>,
        balances: Arc<dyn BalanceSourcePort>,
        submitter: BundleSubmitter,
    ) -> Self {
        Self {
            wallet_store,
            balances,
            submitter,
            planner: GroupPlanner::default(),
            builder: BundleBuilder::default(),
            preflight: BalancePreflight::default(),
            percent: DEFAULT_SELL_PERCENT,
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

    /// Share of holdings each wallet sells, 1-100
    pub fn with_percent(mut self, percent: u8) -> Result<Self, AmountError> {
        AmountPolicy::percent(percent)?;
        self.percent = percent;
        Ok(self)
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub async fn run(&self, mint: &Pubkey) -> Result<ExitReport, RunFailure> {
        let mut session = RunSession::new(Phase::Exit);
        tracing::info!(mint = %mint, percent = self.percent, "Starting exit");

        match self.execute(&mut session, mint).await {
            Ok(report) => Ok(report),
            Err(failure) => {
                session.fail(&failure.error);
                Err(failure)
            }
        }
    }

    async fn execute(&self, session: &mut RunSession, mint: &Pubkey) -> Result<ExitReport, RunFailure> {
        let pool = steps::load_wallets(session, self.wallet_store.as_ref()).await?;

        let policy = AmountPolicy::PercentOfHoldings(self.percent);
        let plan = AmountPlan::draw(&policy, pool.all(), &mut rand::thread_rng());

        // Sells spend nothing up front; every wallet still needs the fee buffer
        steps::verify_balances(session, &pool, &plan, self.balances.as_ref(), &self.preflight)
            .await?;

        let planned = steps::plan_groups(session, &self.planner, &pool)?;
        let groups = steps::build_groups(session, &self.builder, &planned, BundleRole::Exit, &plan, mint)?;

        session.advance(RunState::Submitting)?;
        let receipts = self.submitter.submit(&groups, &pool, None).await?;
        session.advance(RunState::Done)?;

        Ok(ExitReport {
            mint: *mint,
            state: session.state(),
            receipts,
            percent: self.percent,
            wallets: pool.len(),
            started_at: session.started_at(),
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use solana_sdk::signature::{Keypair, Signer as _};

    use crate::application::error::LaunchError;
    use crate::domain::amount::TradeAmount;
    use crate::domain::intent::TradeAction;
    use crate::ports::mocks::{MockBalanceSource, MockCompiler, MockRelay, MockWalletStore};
    use crate::ports::wallet_store::{WalletRecord, WalletSet};

    fn record(keypair: &Keypair) -> WalletRecord {
        WalletRecord::new(
            keypair.pubkey().to_string(),
            bs58::encode(keypair.to_bytes()).into_string(),
        )
    }

    fn wallets(backing: usize) -> (WalletSet, Vec<Pubkey>) {
        let creator = Keypair::new();
        let backing: Vec<Keypair> = (0..backing).map(|_| Keypair::new()).collect();
        let mut addresses = vec![creator.pubkey()];
        addresses.extend(backing.iter().map(|k| k.pubkey()));
        (
            WalletSet {
                creator: Some(record(&creator)),
                backing: backing.iter().map(record).collect(),
            },
            addresses,
        )
    }

    fn orchestrator(
        set: WalletSet,
        balances: MockBalanceSource,
        compiler: Arc<MockCompiler>,
        relay: Arc<MockRelay>,
    ) -> ExitOrchestrator {
        let submitter = BundleSubmitter::new(compiler, relay).with_inter_group_delay(Duration::ZERO);
        ExitOrchestrator::new(Arc::new(MockWalletStore::new(set)), Arc::new(balances), submitter)
    }

    #[tokio::test]
    async fn test_exit_sells_from_every_wallet() {
        let (set, addresses) = wallets(6);
        let compiler = Arc::new(MockCompiler::new());
        let relay = Arc::new(MockRelay::new());
        let exit = orchestrator(
            set,
            MockBalanceSource::new().with_uniform(&addresses, 20_000_000),
            compiler.clone(),
            relay.clone(),
        )
        .with_percent(50)
        .unwrap();
        let mint = Pubkey::new_unique();

        let report = exit.run(&mint).await.unwrap();

        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.receipts.len(), 2);
        let intents: Vec<_> = compiler.get_calls().into_iter().flatten().collect();
        assert_eq!(intents.len(), 7);
        assert!(intents.iter().all(|i| i.action == TradeAction::Sell));
        assert!(intents.iter().all(|i| i.amount == TradeAmount::PercentOfHoldings(50)));
        assert!(intents.iter().all(|i| i.mint == mint));
        assert_eq!(intents[0].signer, addresses[0]);
    }

    #[tokio::test]
    async fn test_exit_requires_fee_buffer() {
        let (set, addresses) = wallets(2);
        let compiler = Arc::new(MockCompiler::new());
        let relay = Arc::new(MockRelay::new());
        let balances = MockBalanceSource::new()
            .with_uniform(&addresses, 10_000_000)
            .with_balance(addresses[1], 9_999_999);
        let exit = orchestrator(set, balances, compiler.clone(), relay);

        let failure = exit.run(&Pubkey::new_unique()).await.unwrap_err();

        assert!(matches!(
            &failure.error,
            LaunchError::InsufficientFunds { shortfalls } if shortfalls.len() == 1
        ));
        assert_eq!(compiler.call_count(), 0);
    }

    #[tokio::test]
    async fn test_compile_failure_aborts_exit() {
        let (set, addresses) = wallets(9);
        let compiler = Arc::new(MockCompiler::new().failing_on(1, 400, "Bad Request"));
        let relay = Arc::new(MockRelay::new());
        let exit = orchestrator(
            set,
            MockBalanceSource::new().with_uniform(&addresses, 20_000_000),
            compiler,
            relay.clone(),
        );

        let failure = exit.run(&Pubkey::new_unique()).await.unwrap_err();

        assert_eq!(failure.completed.len(), 1);
        assert!(matches!(
            failure.error,
            LaunchError::CompileFailed { group: 1, status: Some(400), .. }
        ));
        assert_eq!(relay.bundle_count(), 1);
    }

    #[test]
    fn test_percent_bounds() {
        let (set, _) = wallets(1);
        let make = || {
            orchestrator(
                set.clone(),
                MockBalanceSource::new(),
                Arc::new(MockCompiler::new()),
                Arc::new(MockRelay::new()),
            )
        };
        assert!(make().with_percent(0).is_err());
        assert!(make().with_percent(101).is_err());
        assert_eq!(make().with_percent(25).unwrap().percent(), 25);
    }
}
