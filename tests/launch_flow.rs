//! Launch Flow Integration Tests
//!
//! Drives the launch and exit orchestrators end-to-end through the public
//! in-memory ports:
//! 1. Grouping and intent construction for a 1 + 9 wallet pool
//! 2. Preflight shortfalls stop the run before any network call
//! 3. Vanity search cancellation and mint hand-off into a launch
//! 4. Partial submission failures keep accepted groups
//!
//! All tests are deterministic (no real network calls) and use mock ports.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use rust_decimal_macros::dec;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer as _};

use launch_bundler::adapters::wallet_store::{CachedBalances, JsonWalletStore};
use launch_bundler::application::{
    BundleSubmitter, ExitOrchestrator, LaunchError, LaunchOrchestrator, RunState, VanityConfig,
    VanityError, VanitySearch,
};
use launch_bundler::domain::{
    AmountPlan, AmountPolicy, BalancePreflight, BundleBuilder, BundleRole, GroupPlanner,
    KeypairPool, MintIdentity, Signer, SignerRole, TokenPayload, TradeAction, TradeAmount,
};
use launch_bundler::ports::mocks::{MockBalanceSource, MockCompiler, MockRelay, MockWalletStore};
use launch_bundler::ports::{WalletRecord, WalletSet};

// ============================================================================
// Test Fixtures
// ============================================================================

const ONE_SOL: u64 = 1_000_000_000;

fn record(keypair: &Keypair) -> WalletRecord {
    WalletRecord::new(
        keypair.pubkey().to_string(),
        bs58::encode(keypair.to_bytes()).into_string(),
    )
}

/// Wallet set with one creator and `backing` backing wallets, plus every address
fn create_wallets(backing: usize) -> (WalletSet, Vec<Pubkey>) {
    let creator = Keypair::new();
    let backing: Vec<Keypair> = (0..backing).map(|_| Keypair::new()).collect();

    let mut addresses = vec![creator.pubkey()];
    addresses.extend(backing.iter().map(|k| k.pubkey()));

    let set = WalletSet {
        creator: Some(record(&creator)),
        backing: backing.iter().map(record).collect(),
    };
    (set, addresses)
}

fn create_token() -> TokenPayload {
    TokenPayload {
        name: "Integration".to_string(),
        symbol: "INTG".to_string(),
        uri: "https://ipfs.io/ipfs/integration".to_string(),
    }
}

fn submitter(compiler: &Arc<MockCompiler>, relay: &Arc<MockRelay>) -> BundleSubmitter {
    BundleSubmitter::new(compiler.clone(), relay.clone()).with_inter_group_delay(Duration::ZERO)
}

fn pool(backing: usize) -> KeypairPool {
    KeypairPool::new(
        Signer::new_random(SignerRole::Creator),
        (0..backing).map(|_| Signer::new_random(SignerRole::Backing)).collect(),
    )
    .unwrap()
}

// ============================================================================
// Scenario A: 1 creator + 9 backing
// ============================================================================

#[test]
fn test_scenario_a_groups_and_intents() {
    let pool = pool(9);
    let planner = GroupPlanner::default();
    let planned = planner.plan_pool(&pool);

    let sizes: Vec<usize> = planned.iter().map(|g| g.len()).collect();
    assert_eq!(sizes, vec![5, 5]);

    let policy = AmountPolicy::uniform(dec!(0.1), dec!(0.3)).unwrap();
    let plan = AmountPlan::draw(&policy, pool.all(), &mut rand::thread_rng());
    let token = create_token();
    let mint = Pubkey::new_unique();
    let builder = BundleBuilder::default();

    let first = builder.build(&planned[0], BundleRole::Launch(&token), &plan, &mint).unwrap();
    assert_eq!(first.count(TradeAction::Create), 1);
    assert_eq!(first.count(TradeAction::Buy), 4);
    assert_eq!(first.intents[0].signer, pool.creator().pubkey());

    let second = builder.build(&planned[1], BundleRole::Launch(&token), &plan, &mint).unwrap();
    assert_eq!(second.count(TradeAction::Buy), 5);
}

#[test]
fn test_planning_is_idempotent() {
    let pool = pool(13);
    let planner = GroupPlanner::default();

    let first: Vec<Vec<Pubkey>> = planner
        .plan_pool(&pool)
        .iter()
        .map(|g| g.members.iter().map(|s| s.pubkey()).collect())
        .collect();
    let second: Vec<Vec<Pubkey>> = planner
        .plan_pool(&pool)
        .iter()
        .map(|g| g.members.iter().map(|s| s.pubkey()).collect())
        .collect();

    assert_eq!(first, second);
    assert_eq!(first.iter().map(Vec::len).collect::<Vec<_>>(), vec![5, 5, 4]);
}

// ============================================================================
// Scenario B: preflight shortfall
// ============================================================================

#[test]
fn test_scenario_b_preflight() {
    let a = Signer::new_random(SignerRole::Backing);
    let b = Signer::new_random(SignerRole::Backing);
    let balances = HashMap::from([(a.pubkey(), ONE_SOL), (b.pubkey(), 5_000_000)]);

    let preflight = BalancePreflight::with_buffer_sol(dec!(0.01)).unwrap();
    let results = preflight
        .check(&[&a, &b], &[dec!(0.5), dec!(0.5)], &balances)
        .unwrap();

    assert!(results[0].sufficient);
    assert!(!results[1].sufficient);
    assert_eq!(results[1].required_lamports, 510_000_000);
}

#[tokio::test]
async fn test_launch_shortfall_lists_every_wallet_and_sends_nothing() {
    let (set, addresses) = create_wallets(5);
    let balances = MockBalanceSource::new()
        .with_uniform(&addresses, ONE_SOL)
        .with_balance(addresses[1], 0)
        .with_balance(addresses[4], 1_000);
    let compiler = Arc::new(MockCompiler::new());
    let relay = Arc::new(MockRelay::new());

    let launch = LaunchOrchestrator::new(
        Arc::new(MockWalletStore::new(set)),
        Arc::new(balances),
        submitter(&compiler, &relay),
        AmountPolicy::uniform(dec!(0.1), dec!(0.2)).unwrap(),
    );

    let failure = launch
        .run(&MintIdentity::new(Keypair::new()), &create_token())
        .await
        .unwrap_err();

    let LaunchError::InsufficientFunds { shortfalls } = &failure.error else {
        panic!("unexpected error: {}", failure.error);
    };
    let short: Vec<Pubkey> = shortfalls.iter().map(|r| r.address).collect();
    assert_eq!(short, vec![addresses[1], addresses[4]]);
    assert!(failure.error.is_pre_submission());
    assert_eq!(compiler.call_count(), 0);
    assert_eq!(relay.bundle_count(), 0);
}

// ============================================================================
// Scenario C: vanity search
// ============================================================================

#[tokio::test]
async fn test_scenario_c_stop_cancels_search() {
    let search = Arc::new(VanitySearch::new(VanityConfig {
        max_workers: 2,
        batch_size: 1_000,
    }));

    let stopper = Arc::clone(&search);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        stopper.stop();
    });

    // Long enough that no worker finds it before the stop
    let result = search.search("zzzzzzzzzz", |_| {}).await;

    assert!(matches!(result, Err(VanityError::SearchCanceled)));
    assert_eq!(search.active_workers(), 0);
    assert!(!search.is_running());
}

#[tokio::test]
async fn test_vanity_mint_signs_the_create() {
    let search = VanitySearch::new(VanityConfig::default());
    let found = search.search("", |_| {}).await.unwrap();
    assert_eq!(found.attempts, 1);
    let mint_address = found.mint.pubkey();

    let (set, addresses) = create_wallets(2);
    let compiler = Arc::new(MockCompiler::new());
    let relay = Arc::new(MockRelay::new());
    let launch = LaunchOrchestrator::new(
        Arc::new(MockWalletStore::new(set)),
        Arc::new(MockBalanceSource::new().with_uniform(&addresses, ONE_SOL)),
        submitter(&compiler, &relay),
        AmountPolicy::uniform(dec!(0.1), dec!(0.2)).unwrap(),
    );

    let report = launch.run(&found.mint, &create_token()).await.unwrap();
    assert_eq!(report.mint, mint_address);

    let bundles = relay.get_bundles();
    let create = &bundles[0][0];
    assert_eq!(create.signatures.len(), 2);
    assert!(create.verify_with_results().iter().all(|ok| *ok));
    assert!(create.message.static_account_keys().contains(&mint_address));
}

// ============================================================================
// End-to-end launch and exit
// ============================================================================

#[tokio::test]
async fn test_launch_then_exit_same_pool() {
    let (set, addresses) = create_wallets(9);
    let store = Arc::new(MockWalletStore::new(set));
    let balances = Arc::new(MockBalanceSource::new().with_uniform(&addresses, ONE_SOL));
    let compiler = Arc::new(MockCompiler::new());
    let relay = Arc::new(MockRelay::new());
    let mint = MintIdentity::new(Keypair::new());

    let launch = LaunchOrchestrator::new(
        store.clone(),
        balances.clone(),
        submitter(&compiler, &relay),
        AmountPolicy::uniform(dec!(0.1), dec!(0.5)).unwrap(),
    )
    .with_seed(42);
    let launched = launch.run(&mint, &create_token()).await.unwrap();

    assert_eq!(launched.state, RunState::Done);
    assert_eq!(launched.transaction_count(), 10);

    let two_places = Regex::new(r"^0\.\d{2}$").unwrap();
    for amount in compiler.get_calls().iter().flatten().map(|i| i.amount) {
        let TradeAmount::Sol(sol) = amount else {
            panic!("launch amounts are SOL");
        };
        assert!(sol >= dec!(0.1) && sol <= dec!(0.5));
        assert!(two_places.is_match(&sol.to_string()), "{sol}");
    }

    let explorer = Regex::new(r"^https://solscan\.io/tx/[1-9A-HJ-NP-Za-km-z]{64,88}$").unwrap();
    for receipt in &launched.receipts {
        assert!(receipt.explorer_links().iter().all(|link| explorer.is_match(link)));
    }

    let exit = ExitOrchestrator::new(store.clone(), balances, submitter(&compiler, &relay));
    let exited = exit.run(&mint.pubkey()).await.unwrap();

    assert_eq!(exited.state, RunState::Done);
    assert_eq!(exited.receipts.len(), 2);
    assert_eq!(store.load_count(), 2);
    assert_eq!(relay.bundle_count(), 4);

    let sells: Vec<_> = compiler.get_calls()[2..].iter().flatten().cloned().collect();
    assert_eq!(sells.len(), 10);
    assert!(sells.iter().all(|i| i.action == TradeAction::Sell));
    assert!(sells.iter().all(|i| i.token.is_none()));
}

#[tokio::test]
async fn test_no_signer_appears_twice_per_phase() {
    let (set, addresses) = create_wallets(12);
    let compiler = Arc::new(MockCompiler::new());
    let relay = Arc::new(MockRelay::new());
    let launch = LaunchOrchestrator::new(
        Arc::new(MockWalletStore::new(set)),
        Arc::new(MockBalanceSource::new().with_uniform(&addresses, ONE_SOL)),
        submitter(&compiler, &relay),
        AmountPolicy::uniform(dec!(0.1), dec!(0.2)).unwrap(),
    );

    launch
        .run(&MintIdentity::new(Keypair::new()), &create_token())
        .await
        .unwrap();

    let mut signers: Vec<Pubkey> = compiler.get_calls().iter().flatten().map(|i| i.signer).collect();
    assert_eq!(signers.len(), 13);
    signers.sort();
    signers.dedup();
    assert_eq!(signers.len(), 13);
}

#[tokio::test]
async fn test_wallet_store_edits_are_picked_up_between_runs() {
    let (set, addresses) = create_wallets(2);
    let (bigger, more) = create_wallets(6);
    let store = Arc::new(MockWalletStore::new(set));
    let balances = Arc::new(
        MockBalanceSource::new()
            .with_uniform(&addresses, ONE_SOL)
            .with_uniform(&more, ONE_SOL),
    );
    let compiler = Arc::new(MockCompiler::new());
    let relay = Arc::new(MockRelay::new());
    let exit = ExitOrchestrator::new(store.clone(), balances, submitter(&compiler, &relay));

    let first = exit.run(&Pubkey::new_unique()).await.unwrap();
    store.replace(bigger);
    let second = exit.run(&Pubkey::new_unique()).await.unwrap();

    assert_eq!(first.wallets, 3);
    assert_eq!(second.wallets, 7);
}

#[tokio::test]
async fn test_partial_failure_keeps_accepted_groups() {
    let (set, addresses) = create_wallets(14);
    let compiler = Arc::new(MockCompiler::new().failing_on(2, 503, "Service Unavailable"));
    let relay = Arc::new(MockRelay::new());
    let launch = LaunchOrchestrator::new(
        Arc::new(MockWalletStore::new(set)),
        Arc::new(MockBalanceSource::new().with_uniform(&addresses, ONE_SOL)),
        submitter(&compiler, &relay),
        AmountPolicy::uniform(dec!(0.1), dec!(0.2)).unwrap(),
    );

    let failure = launch
        .run(&MintIdentity::new(Keypair::new()), &create_token())
        .await
        .unwrap_err();

    assert!(failure.is_partial());
    assert_eq!(failure.completed.len(), 2);
    assert_eq!(relay.bundle_count(), 2);
    assert!(matches!(
        failure.error,
        LaunchError::CompileFailed { group: 2, status: Some(503), .. }
    ));
    assert!(failure.to_string().contains("not rolled back"));
}

#[tokio::test]
async fn test_json_store_with_cached_balances() {
    let creator = Keypair::new();
    let backing: Vec<Keypair> = (0..3).map(|_| Keypair::new()).collect();

    let mut entries = vec![serde_json::json!({
        "public_key": creator.pubkey().to_string(),
        "private_key": bs58::encode(creator.to_bytes()).into_string(),
        "sol_balance": 2.0,
        "wallet_group": "Dev",
    })];
    for keypair in &backing {
        entries.push(serde_json::json!({
            "public_key": keypair.pubkey().to_string(),
            "private_key": bs58::encode(keypair.to_bytes()).into_string(),
            "sol_balance": 0.5,
            "wallet_group": "backing",
        }));
    }

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&entries).unwrap().as_bytes())
        .unwrap();

    let store: Arc<JsonWalletStore> = Arc::new(JsonWalletStore::new(file.path()));
    let balances = Arc::new(CachedBalances::new(store.clone()));
    let compiler = Arc::new(MockCompiler::new());
    let relay = Arc::new(MockRelay::new());

    let launch = LaunchOrchestrator::new(
        store,
        balances,
        submitter(&compiler, &relay),
        AmountPolicy::uniform(dec!(0.1), dec!(0.3)).unwrap(),
    );
    let report = launch
        .run(&MintIdentity::new(Keypair::new()), &create_token())
        .await
        .unwrap();

    assert_eq!(report.wallets, 4);
    assert_eq!(report.receipts.len(), 1);
    assert_eq!(compiler.get_calls()[0][0].signer, creator.pubkey());
}
